/*!
 * Prolog capture and root-element bookkeeping
 *
 * The prolog is every line before the first entry: the XML declaration and
 * the root start tag. It is written verbatim at the top of every chunk but
 * the first, and the root name it carries gives the closing line written
 * at the bottom of every chunk that stops before end of file.
 */

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::filter::LineFilter;
use crate::error::{Result, SplitError};

/// Read size when scanning backward from end of file for the trailer
const TRAILER_WINDOW: u64 = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prolog {
    text: Vec<u8>,
    root: String,
}

impl Prolog {
    /// Capture the prolog of a file on disk
    pub fn from_file(path: &Path, filter: &LineFilter) -> Result<Self> {
        let file = File::open(path).map_err(|e| SplitError::SourceUnreadable {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::extract(&mut BufReader::new(file), filter)?.ok_or_else(|| SplitError::NoEntries {
            path: path.to_path_buf(),
            marker: filter.entry_marker(),
        })
    }

    /// Read lines until the first entry line; `None` if there is no entry
    pub fn extract<R: BufRead>(reader: &mut R, filter: &LineFilter) -> Result<Option<Self>> {
        let mut text = Vec::new();
        let mut line = Vec::new();

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(None);
            }
            if filter.is_entry_start(&line) {
                break;
            }
            text.extend_from_slice(&line);
        }

        Self::from_bytes(text).map(Some)
    }

    /// Wrap already captured prolog text
    pub fn from_bytes(text: Vec<u8>) -> Result<Self> {
        let root = root_element_name(&text).ok_or(SplitError::MissingRootElement)?;
        Ok(Prolog { text, root })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.text
    }

    /// Name of the root element
    pub fn root_name(&self) -> &str {
        &self.root
    }

    /// `</root>`
    pub fn closing_tag(&self) -> String {
        format!("</{}>", self.root)
    }

    /// `</root>` plus newline, as written at the end of a stopped chunk
    pub fn closing_line(&self) -> String {
        format!("</{}>\n", self.root)
    }

    /// Check the source ends with the root closing tag
    ///
    /// The last chunk never gets a synthesized closing line; it relies on the
    /// source's own trailer falling inside its range.
    pub fn verify_trailer<R: Read + Seek>(&self, reader: &mut R, size: u64) -> Result<()> {
        let tag = self.closing_tag();
        let content_end = last_content_byte(reader, size)?;

        let tag_len = tag.len() as u64;
        if content_end >= tag_len {
            reader.seek(SeekFrom::Start(content_end - tag_len))?;
            let mut found = vec![0u8; tag.len()];
            reader.read_exact(&mut found)?;
            if found == tag.as_bytes() {
                return Ok(());
            }
        }
        Err(SplitError::MissingTrailer { expected: tag })
    }
}

/// Offset just past the last non-whitespace byte, or 0 for a blank source
fn last_content_byte<R: Read + Seek>(reader: &mut R, size: u64) -> Result<u64> {
    let mut window = vec![0u8; TRAILER_WINDOW as usize];
    let mut end = size;

    while end > 0 {
        let from = end.saturating_sub(TRAILER_WINDOW);
        let buf = &mut window[..(end - from) as usize];
        reader.seek(SeekFrom::Start(from))?;
        reader.read_exact(buf)?;
        if let Some(p) = buf.iter().rposition(|b| !b.is_ascii_whitespace() && *b != 0x0b) {
            return Ok(from + p as u64 + 1);
        }
        end = from;
    }
    Ok(0)
}

/// Name of the first element start tag in `text`
///
/// Declarations (`<?...?>`), comments and `<!DOCTYPE ...>` are skipped.
pub fn root_element_name(text: &[u8]) -> Option<String> {
    let mut i = 0;
    while i < text.len() {
        if text[i] != b'<' {
            i += 1;
            continue;
        }

        let rest = &text[i + 1..];
        if rest.starts_with(b"!--") {
            i += match find(rest, b"-->") {
                Some(p) => p + 4,
                None => return None,
            };
            continue;
        }
        match rest.first() {
            Some(b'?') | Some(b'!') | Some(b'/') | None => {
                i += 1;
                continue;
            }
            _ => {}
        }

        let name_len = rest
            .iter()
            .position(|b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
            .unwrap_or(rest.len());
        if name_len == 0 {
            i += 1;
            continue;
        }
        return Some(String::from_utf8_lossy(&rest[..name_len]).into_owned());
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
