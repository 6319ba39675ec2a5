//! Streaming readers for the IMDb TSV dumps.
//!
//! Every extractor reads through [`TsvRows`], which reuses one record buffer
//! for the whole file and deserializes rows borrowing from it. Rows that fail
//! to deserialize are counted and skipped; only I/O failures abort a stage.

pub mod movies;
pub mod people;
pub mod principals;
pub mod ratings;

use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use crate::constants::{NULL_SENTINEL, inputs, limits};
use crate::domain::events::{EventBus, Stage};
use crate::error::{BuildError, Result};

/// Settings shared by all extractors.
#[derive(Clone)]
pub struct ExtractContext {
    pub bus: EventBus,
    /// Upper bound on rows a materializing extractor may keep.
    pub max_rows: Option<usize>,
    pub progress_interval: u64,
}

impl Default for ExtractContext {
    fn default() -> Self {
        Self {
            bus: EventBus::default(),
            max_rows: None,
            progress_interval: limits::DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Data rows read, header excluded.
    pub read: u64,
    pub kept: u64,
    /// Rows dropped because they were malformed.
    pub skipped: u64,
}

impl ExtractStats {
    /// Rows that parsed fine but did not pass the stage's filter.
    #[must_use]
    pub const fn filtered(&self) -> u64 {
        self.read
            .saturating_sub(self.kept)
            .saturating_sub(self.skipped)
    }
}

/// A stage's output table together with its counters.
#[derive(Debug)]
pub struct Extracted<T> {
    pub table: T,
    pub stats: ExtractStats,
}

/// Source file name for a stage, used in error messages.
#[must_use]
pub const fn source_file(stage: Stage) -> &'static str {
    match stage {
        Stage::Ratings => inputs::RATINGS,
        Stage::Movies => inputs::TITLES,
        Stage::People => inputs::NAMES,
        Stage::Links => inputs::PRINCIPALS,
        _ => "",
    }
}

pub fn open_input(dir: &Path, file: &str) -> Result<File> {
    Ok(File::open(dir.join(file))?)
}

/// `None` for the null sentinel or a blank field.
#[must_use]
pub fn non_null(value: &str) -> Option<&str> {
    let value = value.trim();
    if value.is_empty() || value == NULL_SENTINEL {
        None
    } else {
        Some(value)
    }
}

/// Splits a comma list field, dropping blanks and null sentinels.
pub fn split_list(value: &str) -> impl Iterator<Item = &str> {
    non_null(value)
        .into_iter()
        .flat_map(|v| v.split(','))
        .filter_map(non_null)
}

pub(crate) struct TsvRows<R> {
    reader: csv::Reader<R>,
    headers: StringRecord,
    record: StringRecord,
    stage: Stage,
    ctx: ExtractContext,
    stats: ExtractStats,
}

impl<R: Read> TsvRows<R> {
    /// Reads the header row and checks that `required` columns exist.
    pub fn new(
        reader: R,
        stage: Stage,
        required: &[&'static str],
        ctx: &ExtractContext,
    ) -> Result<Self> {
        // IMDb fields are never quoted but titles contain bare quotes.
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .quoting(false)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        for &column in required {
            if !headers.iter().any(|h| h == column) {
                return Err(BuildError::MissingColumn {
                    file: source_file(stage).to_string(),
                    column,
                });
            }
        }

        Ok(Self {
            reader,
            headers,
            record: StringRecord::new(),
            stage,
            ctx: ctx.clone(),
            stats: ExtractStats::default(),
        })
    }

    /// Index of a header column. Only valid for columns checked in `new`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Moves to the next data row. Returns `false` at end of input.
    pub fn advance(&mut self) -> Result<bool> {
        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(true) => break,
                Ok(false) => return Ok(false),
                Err(e) if e.is_io_error() => return Err(e.into()),
                // Invalid UTF-8 and similar only poison this one row.
                Err(_) => {
                    self.stats.read += 1;
                    self.stats.skipped += 1;
                }
            }
        }

        self.stats.read += 1;
        if self.ctx.progress_interval > 0 && self.stats.read % self.ctx.progress_interval == 0 {
            self.ctx.bus.progress(self.stage, self.stats.read);
        }
        Ok(true)
    }

    /// Deserializes the current row, or counts it as skipped.
    pub fn parse<'a, T: Deserialize<'a>>(&'a mut self) -> Option<T> {
        match self.record.deserialize(Some(&self.headers)) {
            Ok(row) => Some(row),
            Err(_) => {
                self.stats.skipped += 1;
                None
            }
        }
    }

    pub fn field(&self, index: usize) -> Option<&str> {
        self.record.get(index)
    }

    pub fn skip(&mut self) {
        self.stats.skipped += 1;
    }

    /// Fails once a materialized table outgrows the configured limit.
    pub fn check_limit(&self, len: usize) -> Result<()> {
        match self.ctx.max_rows {
            Some(limit) if len > limit => Err(BuildError::RowLimitExceeded {
                stage: self.stage,
                limit,
            }),
            _ => Ok(()),
        }
    }

    pub fn finish(mut self, kept: usize) -> ExtractStats {
        self.stats.kept = kept as u64;
        if self.stats.skipped > 0 {
            debug!(
                stage = %self.stage,
                skipped = self.stats.skipped,
                "Skipped malformed rows"
            );
        }
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_null_treats_sentinel_and_blank_as_absent() {
        assert_eq!(non_null("\\N"), None);
        assert_eq!(non_null("  "), None);
        assert_eq!(non_null("1999"), Some("1999"));
    }

    #[test]
    fn split_list_drops_empty_entries() {
        let items: Vec<_> = split_list("tt1,,tt2, ").collect();
        assert_eq!(items, vec!["tt1", "tt2"]);
        assert_eq!(split_list("\\N").count(), 0);
        assert_eq!(split_list("").count(), 0);
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let tsv = "tconst\tnumVotes\ntt1\t10\n";
        let err = TsvRows::new(
            tsv.as_bytes(),
            Stage::Ratings,
            &["tconst", "averageRating"],
            &ExtractContext::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(
            err,
            BuildError::MissingColumn {
                column: "averageRating",
                ..
            }
        ));
    }

    #[test]
    fn stats_filtered_is_remainder() {
        let stats = ExtractStats {
            read: 10,
            kept: 6,
            skipped: 1,
        };
        assert_eq!(stats.filtered(), 3);
    }
}
