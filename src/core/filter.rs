/*!
 * Line classification for chunk output
 *
 * Entries are recognized and filtered by plain substring containment on raw
 * line bytes, not by parsing XML. An exclusion name that happens to occur in
 * an attribute value or in text drops that line too.
 */

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while building a line filter
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Exclusion rule must not be empty")]
    EmptyExclusion,

    #[error("Entry marker must not be empty")]
    EmptyMarker,

    #[error("Failed to read exclusion file '{path}': {source}")]
    FileReadError {
        path: String,
        source: std::io::Error,
    },
}

/// Outcome of classifying one source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDecision {
    /// Line is copied to output
    Keep,
    /// Line is empty or whitespace only
    Blank,
    /// Line contains an exclusion substring
    Excluded,
}

/// Entry marker plus the exclusion set, shared read-only by every worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFilter {
    entry_marker: Vec<u8>,
    exclusions: Vec<Vec<u8>>,
}

impl LineFilter {
    /// Create a filter from an entry marker and exclusion substrings
    pub fn new<I, S>(entry_marker: &str, exclusions: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if entry_marker.is_empty() {
            return Err(FilterError::EmptyMarker);
        }

        let mut filter = LineFilter {
            entry_marker: entry_marker.as_bytes().to_vec(),
            exclusions: Vec::new(),
        };
        for exclusion in exclusions {
            filter.add_exclusion(exclusion.as_ref())?;
        }
        Ok(filter)
    }

    /// Add one exclusion; duplicates are ignored
    pub fn add_exclusion(&mut self, exclusion: &str) -> Result<(), FilterError> {
        if exclusion.is_empty() {
            return Err(FilterError::EmptyExclusion);
        }
        let bytes = exclusion.as_bytes().to_vec();
        if !self.exclusions.contains(&bytes) {
            self.exclusions.push(bytes);
        }
        Ok(())
    }

    /// Load exclusions from a file
    ///
    /// One exclusion per line. Blank lines and lines starting with `#` are
    /// skipped; surrounding whitespace is trimmed.
    pub fn add_exclusions_from_file(&mut self, path: &Path) -> Result<usize, FilterError> {
        let file = File::open(path).map_err(|e| FilterError::FileReadError {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut added = 0;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| FilterError::FileReadError {
                path: path.display().to_string(),
                source: e,
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            self.add_exclusion(trimmed)?;
            added += 1;
        }
        Ok(added)
    }

    /// True when the line opens an entry
    pub fn is_entry_start(&self, line: &[u8]) -> bool {
        contains(line, &self.entry_marker)
    }

    /// Classify a line for output
    pub fn classify(&self, line: &[u8]) -> LineDecision {
        if is_blank(line) {
            LineDecision::Blank
        } else if self.exclusions.iter().any(|e| contains(line, e)) {
            LineDecision::Excluded
        } else {
            LineDecision::Keep
        }
    }

    /// The entry marker as text
    pub fn entry_marker(&self) -> String {
        String::from_utf8_lossy(&self.entry_marker).into_owned()
    }

    /// Number of exclusion substrings
    pub fn exclusion_count(&self) -> usize {
        self.exclusions.len()
    }
}

/// Whitespace-only or empty
///
/// Valid UTF-8 is checked against Unicode whitespace, so a line holding only
/// NBSP or U+2028 is blank. Other bytes fall back to ASCII whitespace.
fn is_blank(line: &[u8]) -> bool {
    match std::str::from_utf8(line) {
        Ok(text) => text.chars().all(char::is_whitespace),
        Err(_) => line.iter().all(|b| b.is_ascii_whitespace() || *b == 0x0b),
    }
}

/// Byte substring search
fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}
