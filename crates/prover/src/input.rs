//! Loading corpus fragments and candidate patterns from JSON files.
//!
//! Both inputs are flat JSON arrays of strings.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use substring_circuits::Corpus;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not a JSON array of strings: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read a JSON array of strings.
pub fn load_string_array(path: &Path) -> Result<Vec<String>, InputError> {
    let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| InputError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load corpus fragments, concatenate them in order and truncate to `max_len`.
pub fn load_corpus(path: &Path, max_len: usize) -> Result<Corpus, InputError> {
    let fragments = load_string_array(path)?;
    let corpus = Corpus::from_fragments(&fragments, max_len);
    info!(
        fragments = fragments.len(),
        chars = corpus.len(),
        "loaded corpus"
    );
    Ok(corpus)
}

/// Load candidate patterns, in file order.
pub fn load_patterns(path: &Path) -> Result<Vec<String>, InputError> {
    let patterns = load_string_array(path)?;
    info!(patterns = patterns.len(), "loaded patterns");
    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_corpus_concatenates_and_truncates() {
        let file = write_file(r#"["CN=a.example", "CN=b.example"]"#);
        let corpus = load_corpus(file.path(), 16).unwrap();
        assert_eq!(corpus.to_string(), "CN=a.exampleCN=b");
    }

    #[test]
    fn test_load_patterns_keeps_order_and_empties() {
        let file = write_file(r#"["b", "", "a"]"#);
        assert_eq!(load_patterns(file.path()).unwrap(), vec!["b", "", "a"]);
    }

    #[test]
    fn test_not_an_array() {
        let file = write_file(r#"{"a": 1}"#);
        assert!(matches!(
            load_patterns(file.path()),
            Err(InputError::Json { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_patterns(Path::new("/nonexistent/patterns.json")),
            Err(InputError::Io { .. })
        ));
    }
}
