//! Append-only JSON Lines files.
//!
//! One record per line. A missing file reads as empty; a line that fails to
//! parse is skipped with a warning so a single torn write never loses the
//! rest of the history.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::KeywordError;

#[derive(Debug, Clone)]
pub(crate) struct JsonlFile {
    path: PathBuf,
}

impl JsonlFile {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>, KeywordError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(KeywordError::io(&self.path, err)),
        };
        let mut records = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(err) => warn!(
                    path = %self.path.display(),
                    line = idx + 1,
                    error = %err,
                    "jsonl_line_skipped"
                ),
            }
        }
        Ok(records)
    }

    pub(crate) fn append<T: Serialize>(&self, record: &T) -> Result<(), KeywordError> {
        let mut line =
            serde_json::to_string(record).map_err(|e| KeywordError::Encode(e.to_string()))?;
        line.push('\n');
        self.ensure_parent()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| KeywordError::io(&self.path, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| KeywordError::io(&self.path, e))
    }

    /// Replace the whole file, via a sibling temp file and a rename.
    pub(crate) fn rewrite<T: Serialize>(&self, records: &[T]) -> Result<(), KeywordError> {
        let mut out = String::new();
        for record in records {
            out.push_str(
                &serde_json::to_string(record).map_err(|e| KeywordError::Encode(e.to_string()))?,
            );
            out.push('\n');
        }
        self.ensure_parent()?;
        let mut tmp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "records.jsonl".into());
        tmp_name.push(".tmp");
        let tmp = self.path.with_file_name(tmp_name);
        fs::write(&tmp, out).map_err(|e| KeywordError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| KeywordError::io(&self.path, e))
    }

    fn ensure_parent(&self) -> Result<(), KeywordError> {
        match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => fs::create_dir_all(parent).map_err(|e| KeywordError::io(parent, e)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Row {
        n: u32,
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonlFile::new(dir.path().join("none.jsonl"));
        assert!(file.load::<Row>().unwrap().is_empty());
    }

    #[test]
    fn append_then_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let file = JsonlFile::new(dir.path().join("nested/rows.jsonl"));
        file.append(&Row { n: 1 }).unwrap();
        file.append(&Row { n: 2 }).unwrap();
        assert_eq!(file.load::<Row>().unwrap(), vec![Row { n: 1 }, Row { n: 2 }]);

        file.rewrite(&[Row { n: 3 }]).unwrap();
        assert_eq!(file.load::<Row>().unwrap(), vec![Row { n: 3 }]);
    }

    #[test]
    fn corrupt_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        fs::write(&path, "{\"n\":1}\nnot json\n\n{\"n\":4}\n").unwrap();
        let rows = JsonlFile::new(&path).load::<Row>().unwrap();
        assert_eq!(rows, vec![Row { n: 1 }, Row { n: 4 }]);
    }
}
