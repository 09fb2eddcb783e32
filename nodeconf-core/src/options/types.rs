use std::fmt;
use std::time::Duration;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionKind {
    Bool,
    Integer,
    Float,
    Duration,
    String,
    StringList,
}

impl OptionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Duration => "duration",
            Self::String => "string",
            Self::StringList => "string-list",
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed option value. Equality is structural, so two resolutions of the
/// same inputs compare equal value by value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Duration(Duration),
    String(String),
    StringList(Vec<String>),
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::Bool(_) => OptionKind::Bool,
            Self::Integer(_) => OptionKind::Integer,
            Self::Float(_) => OptionKind::Float,
            Self::Duration(_) => OptionKind::Duration,
            Self::String(_) => OptionKind::String,
            Self::StringList(_) => OptionKind::StringList,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::StringList(values) => Some(values),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Duration(value) => f.write_str(&format_duration(*value)),
            Self::String(value) => f.write_str(value),
            Self::StringList(values) => f.write_str(&values.join(",")),
        }
    }
}

impl Serialize for OptionValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(value) => serializer.serialize_bool(*value),
            Self::Integer(value) => serializer.serialize_i64(*value),
            Self::Float(value) => serializer.serialize_f64(*value),
            Self::Duration(value) => serializer.serialize_str(&format_duration(*value)),
            Self::String(value) => serializer.serialize_str(value),
            Self::StringList(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

/// Renders a duration in the same grammar the validator accepts, e.g.
/// `1h0m30s`, `1.5s`, `250ms`.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_owned();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", with_fraction(nanos, 1_000));
    }
    if nanos < 1_000_000_000 {
        return format!("{}ms", with_fraction(nanos, 1_000_000));
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let remaining = nanos - u128::from(hours * 3_600 + minutes * 60) * 1_000_000_000;

    let mut rendered = String::new();
    if hours > 0 {
        rendered.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        rendered.push_str(&format!("{minutes}m"));
    }
    rendered.push_str(&with_fraction(remaining, 1_000_000_000));
    rendered.push('s');
    rendered
}

fn with_fraction(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let fraction = value % unit;
    if fraction == 0 {
        return whole.to_string();
    }
    let width = unit.to_string().len() - 1;
    let digits = format!("{fraction:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionDescriptor {
    name: String,
    default: OptionValue,
    aliases: Vec<String>,
    usage: String,
}

impl OptionDescriptor {
    pub fn new(name: impl Into<String>, default: OptionValue) -> Self {
        Self {
            name: name.into(),
            default,
            aliases: Vec::new(),
            usage: String::new(),
        }
    }

    pub fn bool(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, OptionValue::Bool(default))
    }

    pub fn integer(name: impl Into<String>, default: i64) -> Self {
        Self::new(name, OptionValue::Integer(default))
    }

    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::new(name, OptionValue::Float(default))
    }

    pub fn duration(name: impl Into<String>, default: Duration) -> Self {
        Self::new(name, OptionValue::Duration(default))
    }

    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, OptionValue::String(default.into()))
    }

    pub fn string_list<I, S>(name: impl Into<String>, default: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            OptionValue::StringList(default.into_iter().map(Into::into).collect()),
        )
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OptionKind {
        self.default.kind()
    }

    pub fn default_value(&self) -> &OptionValue {
        &self.default
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }
}
