//! Format-neutral view of a configuration document.
//!
//! Every supported file format is lowered into [`DocumentNode`] first, so the
//! flattening rules (dotted keys, scalar leaves, string sequences) are written
//! once and behave the same for YAML, TOML and JSON.

use std::collections::HashSet;
use std::path::Path;

use super::RawValue;

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentNode {
    Scalar(String),
    Sequence(Vec<DocumentNode>),
    Mapping(Vec<(String, DocumentNode)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
    Json,
}

impl DocumentFormat {
    /// Picks the format from the file extension; anything unrecognised is
    /// read as YAML, the node's native config format.
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or_default();
        match extension.to_ascii_lowercase().as_str() {
            "toml" => Self::Toml,
            "json" => Self::Json,
            _ => Self::Yaml,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Json => "json",
        }
    }

    pub fn parse(self, contents: &str) -> Result<DocumentNode, String> {
        match self {
            Self::Yaml => {
                let value = serde_yaml::from_str::<serde_yaml::Value>(contents)
                    .map_err(|err| format!("invalid YAML: {err}"))?;
                from_yaml(value)
            }
            Self::Toml => {
                let value = contents
                    .parse::<toml::Table>()
                    .map_err(|err| format!("invalid TOML: {err}"))?;
                Ok(from_toml(toml::Value::Table(value)))
            }
            Self::Json => {
                let value = serde_json::from_str::<serde_json::Value>(contents)
                    .map_err(|err| format!("invalid JSON: {err}"))?;
                Ok(from_json(value))
            }
        }
    }
}

fn from_yaml(value: serde_yaml::Value) -> Result<DocumentNode, String> {
    use serde_yaml::Value;

    Ok(match value {
        Value::Null => DocumentNode::Scalar(String::new()),
        Value::Bool(value) => DocumentNode::Scalar(value.to_string()),
        Value::Number(value) => DocumentNode::Scalar(value.to_string()),
        Value::String(value) => DocumentNode::Scalar(value),
        Value::Sequence(items) => DocumentNode::Sequence(
            items
                .into_iter()
                .map(from_yaml)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Mapping(mapping) => {
            let mut entries = Vec::with_capacity(mapping.len());
            for (key, value) in mapping {
                let key = match key {
                    Value::String(key) => key,
                    Value::Number(key) => key.to_string(),
                    Value::Bool(key) => key.to_string(),
                    other => return Err(format!("unsupported mapping key {other:?}")),
                };
                entries.push((key, from_yaml(value)?));
            }
            DocumentNode::Mapping(entries)
        }
        Value::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

fn from_toml(value: toml::Value) -> DocumentNode {
    use toml::Value;

    match value {
        Value::String(value) => DocumentNode::Scalar(value),
        Value::Integer(value) => DocumentNode::Scalar(value.to_string()),
        Value::Float(value) => DocumentNode::Scalar(value.to_string()),
        Value::Boolean(value) => DocumentNode::Scalar(value.to_string()),
        Value::Datetime(value) => DocumentNode::Scalar(value.to_string()),
        Value::Array(items) => DocumentNode::Sequence(items.into_iter().map(from_toml).collect()),
        Value::Table(table) => DocumentNode::Mapping(
            table
                .into_iter()
                .map(|(key, value)| (key, from_toml(value)))
                .collect(),
        ),
    }
}

fn from_json(value: serde_json::Value) -> DocumentNode {
    use serde_json::Value;

    match value {
        Value::Null => DocumentNode::Scalar(String::new()),
        Value::Bool(value) => DocumentNode::Scalar(value.to_string()),
        Value::Number(value) => DocumentNode::Scalar(value.to_string()),
        Value::String(value) => DocumentNode::Scalar(value),
        Value::Array(items) => DocumentNode::Sequence(items.into_iter().map(from_json).collect()),
        Value::Object(object) => DocumentNode::Mapping(
            object
                .into_iter()
                .map(|(key, value)| (key, from_json(value)))
                .collect(),
        ),
    }
}

/// Flattens nested mappings into `(dotted.key, value)` pairs in document
/// order. `a: {b: 1}` and `a.b: 1` name the same option; writing both is an
/// error rather than a silent overwrite.
pub fn flatten(root: DocumentNode) -> Result<Vec<(String, RawValue)>, String> {
    let entries = match root {
        DocumentNode::Mapping(entries) => entries,
        // An empty file parses to null.
        DocumentNode::Scalar(value) if value.is_empty() => return Ok(Vec::new()),
        _ => return Err("document root must be a mapping".to_owned()),
    };

    let mut flattened = Vec::new();
    let mut seen = HashSet::new();
    flatten_into("", entries, &mut flattened, &mut seen)?;
    Ok(flattened)
}

fn flatten_into(
    prefix: &str,
    entries: Vec<(String, DocumentNode)>,
    out: &mut Vec<(String, RawValue)>,
    seen: &mut HashSet<String>,
) -> Result<(), String> {
    for (key, node) in entries {
        let key = key.trim();
        if key.is_empty() {
            return Err(format!("empty key under '{prefix}'"));
        }
        let path = if prefix.is_empty() {
            key.to_owned()
        } else {
            format!("{prefix}.{key}")
        };

        match node {
            DocumentNode::Mapping(children) => flatten_into(&path, children, out, seen)?,
            DocumentNode::Scalar(value) => push_unique(path, RawValue::Scalar(value), out, seen)?,
            DocumentNode::Sequence(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    let DocumentNode::Scalar(value) = item else {
                        return Err(format!("key '{path}': list items must be scalar values"));
                    };
                    values.push(value);
                }
                push_unique(path, RawValue::Sequence(values), out, seen)?;
            }
        }
    }
    Ok(())
}

fn push_unique(
    path: String,
    value: RawValue,
    out: &mut Vec<(String, RawValue)>,
    seen: &mut HashSet<String>,
) -> Result<(), String> {
    if !seen.insert(path.clone()) {
        return Err(format!("key '{path}' is defined more than once"));
    }
    out.push((path, value));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{flatten, DocumentFormat};
    use crate::sources::RawValue;

    fn flat(format: DocumentFormat, contents: &str) -> Vec<(String, RawValue)> {
        let node = format.parse(contents).expect("document should parse");
        flatten(node).expect("document should flatten")
    }

    #[test]
    fn selects_format_by_extension() {
        for (path, format) in [
            ("a/node.toml", DocumentFormat::Toml),
            ("node.JSON", DocumentFormat::Json),
            ("node.yml", DocumentFormat::Yaml),
            ("node.conf", DocumentFormat::Yaml),
        ] {
            assert_eq!(DocumentFormat::from_path(Path::new(path)), format, "{path}");
        }
    }

    #[test]
    fn flattens_nested_yaml_with_dots() {
        let entries = flat(
            DocumentFormat::Yaml,
            "ntp:\n  disable: true\n  server: pool.ntp.org:123\n\
             port: 8000\nbootnodes:\n  - kni://a\n  - kni://b\n",
        );
        assert_eq!(
            entries,
            vec![
                ("ntp.disable".to_owned(), RawValue::from("true")),
                ("ntp.server".to_owned(), RawValue::from("pool.ntp.org:123")),
                ("port".to_owned(), RawValue::from("8000")),
                (
                    "bootnodes".to_owned(),
                    RawValue::from(vec!["kni://a".to_owned(), "kni://b".to_owned()])
                ),
            ]
        );
    }

    #[test]
    fn accepts_dotted_keys_and_null_leaves() {
        let entries = flat(DocumentFormat::Yaml, "txpool.pricelimit: 25\ndocroot:\n");
        assert_eq!(entries[0].0, "txpool.pricelimit");
        assert_eq!(entries[1], ("docroot".to_owned(), RawValue::from("")));
    }

    #[test]
    fn flattens_toml_and_json_the_same_way() {
        let toml = flat(DocumentFormat::Toml, "[txpool]\npricelimit = 25\n");
        let json = flat(DocumentFormat::Json, r#"{"txpool": {"pricelimit": 25}}"#);
        assert_eq!(toml, json);
        assert_eq!(
            toml[0],
            ("txpool.pricelimit".to_owned(), RawValue::from("25"))
        );
    }

    #[test]
    fn rejects_duplicate_flattened_keys() {
        let node = DocumentFormat::Yaml
            .parse("txpool:\n  pricelimit: 1\ntxpool.pricelimit: 2\n")
            .expect("yaml parses");
        let error = flatten(node).expect_err("duplicate should fail");
        assert!(error.contains("txpool.pricelimit"));
    }

    #[test]
    fn rejects_non_mapping_root_and_nested_lists() {
        let root = DocumentFormat::Yaml
            .parse("- a\n- b\n")
            .expect("yaml parses");
        assert!(flatten(root).is_err());

        let empty = DocumentFormat::Yaml.parse("").expect("empty yaml parses");
        assert!(flatten(empty).expect("empty document is valid").is_empty());

        let nested = DocumentFormat::Yaml
            .parse("bootnodes:\n  - host: a\n")
            .expect("yaml parses");
        let error = flatten(nested).expect_err("nested list should fail");
        assert!(error.contains("bootnodes"));
    }

    #[test]
    fn reports_syntax_errors() {
        let error = DocumentFormat::Yaml
            .parse("port: [8000\n")
            .expect_err("broken yaml should fail");
        assert!(error.starts_with("invalid YAML"));
    }
}
