/*!
 * Line-aligned chunk planning
 *
 * A naive `size / num_chunks` partition is moved forward to the end of the
 * line each nominal boundary falls in, so no line is ever split between two
 * chunks. The last chunk absorbs the rounding remainder and any drift.
 */

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use serde::Serialize;

use crate::error::{Result, SplitError};

/// One byte range `[start, end)` of the source, 1-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Chunk {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl Chunk {
    /// Number of bytes in the range
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Ordered, non-overlapping chunks covering `[0, size)` exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkPlan {
    size: u64,
    chunks: Vec<Chunk>,
}

impl ChunkPlan {
    /// Plan a file on disk
    pub fn for_file(path: &Path, num_chunks: usize) -> Result<Self> {
        let file = File::open(path).map_err(|e| SplitError::SourceUnreadable {
            path: path.to_path_buf(),
            source: e,
        })?;
        let size = file.metadata()?.len();
        Self::compute(&mut BufReader::new(file), size, num_chunks)
    }

    /// Plan `size` bytes readable through `reader` into `num_chunks` ranges
    pub fn compute<R: BufRead + Seek>(reader: &mut R, size: u64, num_chunks: usize) -> Result<Self> {
        if num_chunks == 0 || num_chunks as u64 > size {
            return Err(SplitError::PlanDegenerate { num_chunks, size });
        }

        let step = size / num_chunks as u64;
        let mut chunks = Vec::with_capacity(num_chunks);
        let mut start = 0u64;
        let mut end = step;
        let mut skipped = Vec::new();

        for index in 1..num_chunks {
            let boundary = if end >= size {
                size
            } else {
                reader.seek(SeekFrom::Start(end))?;
                skipped.clear();
                end + reader.read_until(b'\n', &mut skipped)? as u64
            };

            chunks.push(Chunk {
                index,
                start,
                end: boundary,
            });
            start = boundary;
            end = start + step;
        }

        chunks.push(Chunk {
            index: num_chunks,
            start,
            end: size,
        });

        Ok(ChunkPlan { size, chunks })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Total source size the plan covers
    pub fn size(&self) -> u64 {
        self.size
    }
}
