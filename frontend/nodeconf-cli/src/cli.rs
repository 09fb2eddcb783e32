use clap::{Parser, Subcommand};

/// Node flags (`--conf`, `--port`, ...) are not declared here; they are added
/// from the option catalog at startup and must come before the subcommand.
#[derive(Debug, Parser)]
#[command(name = "nodeconf", about = "Resolve and inspect node configuration")]
pub struct Cli {
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Also read options from `<PREFIX>_<NAME>` environment variables.
    #[arg(long, value_name = "PREFIX")]
    pub env_prefix: Option<String>,

    #[arg(long, default_value_t = ',')]
    pub list_delimiter: char,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the effective configuration (the default).
    Show {
        #[arg(long)]
        json: bool,
        #[arg(long)]
        only_set: bool,
    },
    /// Resolve and report errors without printing values.
    Check,
    /// Resolve, then re-resolve on SIGHUP and print what changed.
    Watch {
        #[arg(long)]
        json: bool,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::Show {
            json: false,
            only_set: false,
        }
    }
}
