use std::path::{Path, PathBuf};

use super::document::{flatten, DocumentFormat};
use super::{ConfigSource, Origin, RawEntry};
use crate::error::{Error, Result};

/// Declarative config file. The file is opened, read fully and closed inside
/// `load`; nothing is kept open between loads.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    format: DocumentFormat,
    contents: Option<String>,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = DocumentFormat::from_path(&path);
        Self {
            path,
            format,
            contents: None,
        }
    }

    /// A file source over contents already in memory; `path` is only used to
    /// label errors.
    pub fn from_contents(
        path: impl Into<PathBuf>,
        contents: impl Into<String>,
        format: DocumentFormat,
    ) -> Self {
        Self {
            path: path.into(),
            format,
            contents: Some(contents.into()),
        }
    }

    pub fn with_format(mut self, format: DocumentFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String> {
        if let Some(contents) = &self.contents {
            return Ok(contents.clone());
        }
        let bytes = std::fs::read(&self.path).map_err(|source| Error::FileRead {
            path: self.path.clone(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|err| Error::FileParse {
            path: self.path.clone(),
            message: format!("file is not valid UTF-8: {}", err.utf8_error()),
        })
    }
}

impl ConfigSource for FileSource {
    fn origin(&self) -> Origin {
        Origin::File
    }

    fn load(&self) -> Result<Vec<RawEntry>> {
        let contents = self.read()?;
        let parse_error = |message: String| Error::FileParse {
            path: self.path.clone(),
            message,
        };

        let document = self.format.parse(&contents).map_err(parse_error)?;
        let entries = flatten(document).map_err(parse_error)?;

        tracing::debug!(
            path = %self.path.display(),
            format = self.format.as_str(),
            entries = entries.len(),
            "loaded config file"
        );

        Ok(entries
            .into_iter()
            .map(|(name, value)| RawEntry::new(name, value, Origin::File))
            .collect())
    }

    fn describe(&self) -> String {
        format!("file '{}'", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::Builder;

    use super::FileSource;
    use crate::error::Error;
    use crate::sources::{ConfigSource, DocumentFormat, Origin, RawValue};

    #[test]
    fn loads_yaml_file_from_disk() {
        let mut file = Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("temp file");
        file.write_all(b"ntp:\n  disable: true\nport: 8000\n")
            .expect("write fixture");

        let entries = FileSource::new(file.path())
            .load()
            .expect("file should load");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "ntp.disable");
        assert_eq!(entries[0].origin, Origin::File);
        assert_eq!(entries[1].value, RawValue::from("8000"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let error = FileSource::new("/definitely/not/here/node.yaml")
            .load()
            .expect_err("missing file should fail");
        assert!(matches!(error, Error::FileRead { .. }));
        assert_eq!(error.origin(), Some(Origin::File));
    }

    #[test]
    fn non_utf8_contents_are_a_parse_error() {
        let mut file = Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("temp file");
        file.write_all(&[b'p', b':', b' ', 0xff, 0xfe, b'\n'])
            .expect("write fixture");

        let error = FileSource::new(file.path())
            .load()
            .expect_err("invalid utf-8 should fail");
        match error {
            Error::FileParse { message, .. } => assert!(message.contains("UTF-8")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let error = FileSource::from_contents("node.yaml", "port: [8000\n", DocumentFormat::Yaml)
            .load()
            .expect_err("broken yaml should fail");
        match error {
            Error::FileParse { path, message } => {
                assert_eq!(path.to_str(), Some("node.yaml"));
                assert!(message.contains("YAML"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn scalar_root_is_a_parse_error() {
        let error = FileSource::from_contents("node.json", "42", DocumentFormat::Json)
            .load()
            .expect_err("scalar root should fail");
        assert!(matches!(error, Error::FileParse { .. }));
    }
}
