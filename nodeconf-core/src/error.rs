use std::path::PathBuf;

use thiserror::Error;

use crate::options::OptionKind;
use crate::sources::Origin;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Two spellings of one option. Raised by the registry for colliding
    /// names, and by the resolver when one source writes an option twice.
    #[error(
        "duplicate option name '{name}' (already used by '{existing}'){}",
        origin_suffix(.origin)
    )]
    DuplicateOption {
        name: String,
        existing: String,
        origin: Option<Origin>,
    },

    #[error("unknown option '{name}'{}", origin_suffix(.origin))]
    UnknownOption {
        name: String,
        origin: Option<Origin>,
    },

    #[error("failed to read config file '{}': {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{}': {message}", .path.display())]
    FileParse { path: PathBuf, message: String },

    #[error(
        "invalid value for option '{name}'{}: expected {expected}, got '{got}'",
        origin_suffix(.origin)
    )]
    TypeMismatch {
        name: String,
        expected: OptionKind,
        got: String,
        origin: Option<Origin>,
    },
}

impl Error {
    pub(crate) fn unknown(name: impl Into<String>, origin: Option<Origin>) -> Self {
        Self::UnknownOption {
            name: name.into(),
            origin,
        }
    }

    /// Attributes a name-level error to the source that caused it.
    pub(crate) fn at_origin(self, source_origin: Origin) -> Self {
        match self {
            Self::UnknownOption { name, .. } => Self::UnknownOption {
                name,
                origin: Some(source_origin),
            },
            Self::TypeMismatch {
                name,
                expected,
                got,
                ..
            } => Self::TypeMismatch {
                name,
                expected,
                got,
                origin: Some(source_origin),
            },
            other => other,
        }
    }

    /// Canonical (or offending) option name carried by the error, if any.
    pub fn option_name(&self) -> Option<&str> {
        match self {
            Self::DuplicateOption { name, .. }
            | Self::UnknownOption { name, .. }
            | Self::TypeMismatch { name, .. } => Some(name),
            Self::FileRead { .. } | Self::FileParse { .. } => None,
        }
    }

    pub fn origin(&self) -> Option<Origin> {
        match self {
            Self::DuplicateOption { origin, .. }
            | Self::UnknownOption { origin, .. }
            | Self::TypeMismatch { origin, .. } => *origin,
            Self::FileRead { .. } | Self::FileParse { .. } => Some(Origin::File),
        }
    }
}

fn origin_suffix(origin: &Option<Origin>) -> String {
    match origin {
        Some(origin) => format!(" (from {origin})"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::options::OptionKind;
    use crate::sources::Origin;

    #[test]
    fn messages_name_option_and_origin() {
        let error = Error::TypeMismatch {
            name: "port".to_owned(),
            expected: OptionKind::Integer,
            got: "eighty".to_owned(),
            origin: Some(Origin::File),
        };
        let message = error.to_string();
        assert!(message.contains("'port'"));
        assert!(message.contains("from file"));
        assert!(message.contains("expected integer"));
        assert!(message.contains("'eighty'"));
        assert_eq!(error.option_name(), Some("port"));
    }

    #[test]
    fn query_errors_have_no_origin_suffix() {
        let error = Error::unknown("nope", None);
        assert_eq!(error.to_string(), "unknown option 'nope'");
        assert_eq!(error.origin(), None);
    }
}
