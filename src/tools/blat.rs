//! blat runs on FASTA input, so each mate is converted with seqtk
//! before alignment. Hits come back as a PSL table.

use crate::errors::{DehostError, Result};
use crate::tools::{annotate_by_membership, require_path_param, run_shell, HostTool, ReadAnnotation};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Minimum PSL match count for a hit to count as human.
const MIN_SCORE: i64 = 50;
/// 1-based PSL columns: match count and query name.
const MATCHES_COLUMN: usize = 1;
const QNAME_COLUMN: usize = 10;

pub struct Blat {
    index: PathBuf,
}

impl Blat {
    pub fn new(params: Option<&Map<String, Value>>) -> Result<Self> {
        Ok(Blat {
            index: require_path_param(params, "blat", "index")?,
        })
    }

    /// Align one mate and collect the query names of qualifying hits.
    fn aligned_ids(&self, fastq: &Path) -> Result<HashSet<String>> {
        let fasta = NamedTempFile::new()?;
        run_shell(
            "blat",
            &format!("seqtk seq -a {} > {}", fastq.display(), fasta.path().display()),
        )?;
        let psl = NamedTempFile::new()?;
        run_shell(
            "blat",
            &format!(
                "blat -minScore={} -fastMap {} {} {}",
                MIN_SCORE,
                self.index.display(),
                fasta.path().display(),
                psl.path().display()
            ),
        )?;
        let file = File::open(psl.path()).map_err(|e| DehostError::file_io(psl.path(), e))?;
        parse_psl_hits(BufReader::new(file), MIN_SCORE)
    }
}

impl HostTool for Blat {
    fn name(&self) -> &'static str {
        "blat"
    }

    fn get_human_annotation(&self, r1: &Path, r2: &Path) -> Result<Vec<ReadAnnotation>> {
        let mut mapped = self.aligned_ids(r1)?;
        mapped.extend(self.aligned_ids(r2)?);
        annotate_by_membership(r1, &mapped)
    }
}

/// Query names of PSL rows whose match count reaches `min_matches`.
/// The header block is recognized by its non-numeric first column.
fn parse_psl_hits<R: BufRead>(reader: R, min_matches: i64) -> Result<HashSet<String>> {
    let mut hits = HashSet::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DehostError::ReadLine {
            line: line_number + 1,
            source: e,
        })?;
        let fields: Vec<&str> = line.split('\t').collect();
        let matches: i64 = match fields[MATCHES_COLUMN - 1].trim().parse() {
            Ok(matches) => matches,
            Err(_) => continue,
        };
        if matches < min_matches {
            continue;
        }
        let qname = fields
            .get(QNAME_COLUMN - 1)
            .ok_or_else(|| DehostError::PslRow { line: line.clone() })?;
        hits.insert(qname.to_string());
    }
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn psl_row(matches: i64, qname: &str) -> String {
        format!(
            "{matches}\t1\t0\t0\t0\t0\t0\t0\t+\t{qname}\t150\t0\t150\tchr1\t248956422\t100\t250\t1\t150,\t0,\t100,"
        )
    }

    const PSL_HEADER: &str = "psLayout version 3\n\n\
        match\tmis- \trep. \tN's\tQ gap\tQ gap\tT gap\tT gap\tstrand\tQ        \tQ   \tQ    \tQ  \tT        \tT   \tT    \tT  \tblock\tblockSizes \tqStarts\t tStarts\n\
             \tmatch\tmatch\t   \tcount\tbases\tcount\tbases\t      \tname     \tsize\tstart\tend\tname     \tsize\tstart\tend\tcount\n\
        ---------------------------------------------------------------------------------------------------------------------------------------------------------------\n";

    #[test]
    fn test_header_block_is_skipped() {
        let psl = format!("{}{}\n", PSL_HEADER, psl_row(120, "q1"));
        let hits = parse_psl_hits(Cursor::new(psl), MIN_SCORE).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits.contains("q1"));
    }

    #[test]
    fn test_low_scoring_rows_are_dropped() {
        let psl = format!("{}\n{}\n", psl_row(49, "weak"), psl_row(50, "strong"));
        let hits = parse_psl_hits(Cursor::new(psl), MIN_SCORE).unwrap();
        assert!(!hits.contains("weak"));
        assert!(hits.contains("strong"));
    }

    #[test]
    fn test_numeric_row_without_query_name_is_an_error() {
        let result = parse_psl_hits(Cursor::new("120\t1\t0\n".to_string()), MIN_SCORE);
        assert!(matches!(result, Err(DehostError::PslRow { .. })));
    }

    #[test]
    fn test_empty_psl_yields_no_hits() {
        let hits = parse_psl_hits(Cursor::new("".to_string()), MIN_SCORE).unwrap();
        assert!(hits.is_empty());
    }
}
