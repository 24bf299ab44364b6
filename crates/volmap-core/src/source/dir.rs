use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::{CountrySource, SourceError};
use crate::countries::is_valid_code;
use crate::models::{CountryRecord, RawCountryRecord};

/// Default data directory, relative to the working directory
pub const DEFAULT_DATA_DIR: &str = "data/volunteers/countries";

/// Reads and writes `{dir}/{CODE}.json`
#[derive(Debug, Clone)]
pub struct DirSource {
    dir: PathBuf,
}

impl DirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn record_path(&self, code: &str) -> PathBuf {
        self.dir.join(format!("{}.json", code))
    }

    /// Path for `code`, refusing anything that is not an ISO-2 code
    fn checked_path(&self, code: &str) -> Result<PathBuf, SourceError> {
        if !is_valid_code(code) {
            return Err(SourceError::InvalidCode(code.to_string()));
        }
        Ok(self.record_path(code))
    }
}

#[async_trait]
impl CountrySource for DirSource {
    async fn fetch(&self, code: &str) -> Result<RawCountryRecord, SourceError> {
        let path = self.checked_path(code)?;
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::NotFound(path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), bytes = contents.len(), "Read country file");
        Ok(serde_json::from_str(&contents)?)
    }

    async fn store(&self, record: &CountryRecord) -> Result<(), SourceError> {
        let path = self.checked_path(&record.country_code)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let contents = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, contents).await?;
        debug!(path = %path.display(), volunteers = record.volunteers.len(), "Wrote country file");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("data directory {}", self.dir.display())
    }
}
