//! Per-year animal count log.

use biosim_core::{Result, SpeciesCounts};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const HEADER: &str = "year,herbivores,carnivores";

/// Comma-separated log with one line per simulated year
#[derive(Debug)]
pub struct CountLog {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CountLog {
    /// Create (or truncate) the log at `path` and write the header
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "{}", HEADER)?;
        writer.flush()?;
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines are flushed as they are written so the file can be followed
    /// while the simulation runs.
    pub fn record(&mut self, year: u32, counts: SpeciesCounts) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{}",
            year, counts.herbivores, counts.carnivores
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_log_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.csv");

        let mut log = CountLog::create(&path).unwrap();
        log.record(1, SpeciesCounts { herbivores: 50, carnivores: 0 })
            .unwrap();
        log.record(2, SpeciesCounts { herbivores: 61, carnivores: 5 })
            .unwrap();
        assert_eq!(log.path(), path.as_path());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "year,herbivores,carnivores\n1,50,0\n2,61,5\n");
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("counts.csv");
        assert!(matches!(
            CountLog::create(path),
            Err(biosim_core::Error::Io(_))
        ));
    }
}
