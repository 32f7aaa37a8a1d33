use async_trait::async_trait;
use glob::glob;
use std::path::{Path, PathBuf};

use crate::connectors::{RecordSource, SourceType};
use crate::utils::{
    error::{EngineResult, SourceError},
    types::Record,
};

/// File system source reading JSON arrays of records
pub struct FileSource {
    location: String,
    supported_extensions: Vec<String>,
}

impl FileSource {
    /// Create a source for a file path or glob pattern
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            supported_extensions: vec!["json".to_string()],
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn is_pattern(&self) -> bool {
        self.location.contains('*') || self.location.contains('?')
    }

    /// Check if a file extension is supported
    fn is_supported_extension(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                self.supported_extensions.iter().any(|s| s.eq_ignore_ascii_case(&ext))
            })
            .unwrap_or(false)
    }

    /// Resolve the location to concrete files, in path order for patterns
    fn resolve_paths(&self) -> EngineResult<Vec<PathBuf>> {
        if !self.is_pattern() {
            let path = PathBuf::from(&self.location);
            if !path.is_file() {
                return Err(SourceError::NotFound(self.location.clone()).into());
            }
            return Ok(vec![path]);
        }

        let entries = glob(&self.location)
            .map_err(|e| SourceError::Malformed(format!("invalid pattern '{}': {}", self.location, e)))?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .filter(|path| path.is_file() && self.is_supported_extension(path))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(SourceError::NotFound(format!(
                "no files found matching pattern: {}",
                self.location
            ))
            .into());
        }

        Ok(paths)
    }

    /// Parse one JSON file into records
    async fn read_file(path: &Path) -> EngineResult<Vec<Record>> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
            _ => SourceError::Io(format!("failed to read {}: {}", path.display(), e)),
        })?;

        let records: Vec<Record> = serde_json::from_str(&content)
            .map_err(|e| SourceError::Malformed(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), records = records.len(), "parsed data file");
        Ok(records)
    }
}

#[async_trait]
impl RecordSource for FileSource {
    async fn load_all(&self) -> EngineResult<Vec<Record>> {
        let mut records = Vec::new();
        for path in self.resolve_paths()? {
            records.extend(Self::read_file(&path).await?);
        }
        Ok(records)
    }

    fn source_type(&self) -> SourceType {
        SourceType::File
    }

    fn describe(&self) -> String {
        format!("file:{}", self.location)
    }
}
