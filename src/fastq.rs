//! Minimal FASTQ support: gz-aware reading, id extraction, and
//! filtering by read id.

use crate::errors::{DehostError, Result};
use flate2::read::MultiGzDecoder;
use itertools::Itertools;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read as ioRead, Write};
use std::path::Path;

/// One FASTQ record. The description is stored without its leading `@`.
#[derive(Debug, PartialEq, Clone)]
pub struct FastqRecord {
    pub desc: String,
    pub seq: String,
    pub qual: String,
}

impl FastqRecord {
    /// The read id: the description up to the first whitespace.
    pub fn id(&self) -> &str {
        self.desc.split_whitespace().next().unwrap_or("")
    }
}

pub fn open_fastq_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    fn is_gzipped(path: &Path) -> bool {
        let path_str = path.to_string_lossy().to_lowercase();
        path_str.ends_with(".gz") || path_str.ends_with(".gzip")
    }
    let file = File::open(path).map_err(|e| DehostError::file_io(path, e))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_some() {
            Ok(BufReader::new(Box::new(gz_decoder)))
        } else {
            Err(DehostError::InvalidGzip {
                path: path.to_path_buf(),
            })
        }
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}

/// Iterator over the 4-line records of a FASTQ stream. The separator
/// line is consumed and discarded; a stream whose line count is not a
/// multiple of 4 is rejected.
pub struct FastqReader<R: BufRead> {
    lines: Lines<R>,
    line_number: usize,
}

impl<R: BufRead> FastqReader<R> {
    pub fn new(reader: R) -> Self {
        FastqReader {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    fn read_line_error(&self, offset: usize, source: std::io::Error) -> DehostError {
        DehostError::ReadLine {
            line: self.line_number + offset,
            source,
        }
    }

    fn next_record(&mut self) -> Result<Option<FastqRecord>> {
        let desc = match self.lines.next() {
            None => return Ok(None),
            Some(line) => line.map_err(|e| self.read_line_error(1, e))?,
        };
        let record_start = self.line_number + 1;
        let (seq, _sep, qual) = match self.lines.next_tuple() {
            Some((seq, sep, qual)) => (
                seq.map_err(|e| self.read_line_error(2, e))?,
                sep.map_err(|e| self.read_line_error(3, e))?,
                qual.map_err(|e| self.read_line_error(4, e))?,
            ),
            None => {
                return Err(DehostError::Fastq {
                    line: record_start,
                    reason: "incomplete record: line count is not a multiple of 4".to_string(),
                })
            }
        };
        let desc = desc
            .strip_prefix('@')
            .ok_or_else(|| DehostError::Fastq {
                line: record_start,
                reason: format!("description does not start with '@': '{desc}'"),
            })?
            .to_string();
        self.line_number += 4;
        Ok(Some(FastqRecord { desc, seq, qual }))
    }
}

impl<R: BufRead> Iterator for FastqReader<R> {
    type Item = Result<FastqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Ids of all records in a FASTQ file, in file order.
pub fn read_ids(path: &Path) -> Result<Vec<String>> {
    FastqReader::new(open_fastq_reader(path)?)
        .map(|record| record.map(|r| r.id().to_string()))
        .collect()
}

pub fn write_record<W: Write>(writer: &mut W, record: &FastqRecord) -> std::io::Result<()> {
    writeln!(writer, "@{}", record.desc)?;
    writeln!(writer, "{}", record.seq)?;
    writeln!(writer, "+")?;
    writeln!(writer, "{}", record.qual)
}

/// Copy the records whose id is in `keep` from `reader` to `writer`,
/// preserving input order. Returns the number of records written.
pub fn filter_fastq<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    keep: &HashSet<String>,
) -> Result<usize> {
    let mut written = 0;
    for record in FastqReader::new(reader) {
        let record = record?;
        if keep.contains(record.id()) {
            write_record(writer, &record)?;
            written += 1;
        }
    }
    Ok(written)
}
