use super::IdentifierSource;
use crate::{Error, Result};
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Identifier source backed by a file with one identifier per line.
///
/// The file is read once, up front. Lines are trimmed and blank lines are
/// skipped. When every line has been handed out, [`get`](Self::get) keeps
/// returning [`Error::SourceExhausted`].
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    lines: VecDeque<String>,
}

impl FileSource {
    /// Reads every identifier from the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be opened or read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Reads every identifier from `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on a read failure, including invalid UTF-8.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut lines = VecDeque::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push_back(trimmed.to_owned());
            }
        }
        Ok(Self { lines })
    }

    /// Identifiers not yet handed out.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl IdentifierSource for FileSource {
    fn get(&mut self) -> Result<String> {
        self.lines.pop_front().ok_or(Error::SourceExhausted)
    }
}
