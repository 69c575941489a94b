//! Append-only lookup log: one JSON object per successful lookup.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use havadurumu_weather::WeatherSnapshot;
use serde::Serialize;
use serde_json::ser::Formatter;

use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct WeatherLog {
    path: PathBuf,
}

impl WeatherLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `snapshot` as a single line and flush.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the file cannot be opened or written.
    pub fn append(&self, snapshot: &WeatherSnapshot) -> Result<(), StoreError> {
        let mut line = Vec::new();
        snapshot.serialize(&mut serde_json::Serializer::with_formatter(
            &mut line,
            SpacedFormatter,
        ))?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        file.flush()?;

        tracing::debug!("Logged lookup for {} to {}", snapshot.city, self.path.display());
        Ok(())
    }
}

/// Single-line JSON with `", "` between items and `": "` after keys.
struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }
}
