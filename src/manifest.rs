//! Parsers for the two run inputs: the sample manifest and the tool
//! list.

use crate::errors::{DehostError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One paired-end sample named by the manifest.
#[derive(Debug, PartialEq, Clone)]
pub struct Sample {
    pub name: String,
    pub r1: PathBuf,
    pub r2: PathBuf,
}

const EXPECTED_FIELD_COUNT: usize = 3;

pub fn load_samples(path: &Path) -> Result<Vec<Sample>> {
    let file = File::open(path).map_err(|e| DehostError::file_io(path, e))?;
    parse_samples(BufReader::new(file))
}

/// Parse tab-separated `name R1 R2` rows. Both FASTQ paths of every
/// row must point at existing files; blank lines are skipped.
pub fn parse_samples<R: BufRead>(reader: R) -> Result<Vec<Sample>> {
    let mut samples = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DehostError::ReadLine {
            line: line_number + 1,
            source: e,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != EXPECTED_FIELD_COUNT {
            return Err(DehostError::Manifest {
                line: line_number + 1,
                reason: format!(
                    "expected {} tab-separated fields in the format 'name r1 r2', found {}",
                    EXPECTED_FIELD_COUNT,
                    fields.len()
                ),
            });
        }
        let sample = Sample {
            name: fields[0].to_string(),
            r1: PathBuf::from(fields[1]),
            r2: PathBuf::from(fields[2]),
        };
        for fastq in [&sample.r1, &sample.r2] {
            if !fastq.is_file() {
                return Err(DehostError::MissingInput {
                    line: line_number + 1,
                    path: fastq.clone(),
                });
            }
        }
        samples.push(sample);
    }
    if samples.is_empty() {
        return Err(DehostError::EmptyManifest);
    }
    Ok(samples)
}

pub fn load_tool_names(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| DehostError::file_io(path, e))?;
    parse_tool_names(BufReader::new(file))
}

/// Parse the tool list, one name per line. Blank lines are skipped and
/// an empty list is an error.
pub fn parse_tool_names<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DehostError::ReadLine {
            line: line_number + 1,
            source: e,
        })?;
        let name = line.trim();
        if !name.is_empty() {
            names.push(name.to_string());
        }
    }
    if names.is_empty() {
        return Err(DehostError::EmptyToolList);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn fastq_pair(dir: &Path, sample: &str) -> (PathBuf, PathBuf) {
        let r1 = dir.join(format!("{sample}-R1.fastq"));
        let r2 = dir.join(format!("{sample}-R2.fastq"));
        std::fs::write(&r1, "@r1\nACGT\n+\nFFFF\n").unwrap();
        std::fs::write(&r2, "@r1\nTTTT\n+\nFFFF\n").unwrap();
        (r1, r2)
    }

    #[test]
    fn test_parses_samples_in_manifest_order() {
        let dir = tempfile::tempdir().unwrap();
        let (a1, a2) = fastq_pair(dir.path(), "a");
        let (b1, b2) = fastq_pair(dir.path(), "b");
        let manifest = format!(
            "a\t{}\t{}\nb\t{}\t{}\n",
            a1.display(),
            a2.display(),
            b1.display(),
            b2.display()
        );
        let samples = parse_samples(Cursor::new(manifest)).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].name, "a");
        assert_eq!(samples[0].r1, a1);
        assert_eq!(samples[1].name, "b");
        assert_eq!(samples[1].r2, b2);
    }

    #[test]
    fn test_empty_manifest_is_an_error() {
        let result = parse_samples(Cursor::new("".to_string()));
        assert!(matches!(result, Err(DehostError::EmptyManifest)));
    }

    #[test]
    fn test_wrong_field_count_names_the_line() {
        let dir = tempfile::tempdir().unwrap();
        let (a1, a2) = fastq_pair(dir.path(), "a");
        let manifest = format!("a\t{}\t{}\nb\tonly_one_path\n", a1.display(), a2.display());
        match parse_samples(Cursor::new(manifest)) {
            Err(DehostError::Manifest { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("found 2"));
            }
            other => panic!("expected manifest error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_fastq_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (a1, _) = fastq_pair(dir.path(), "a");
        let missing = dir.path().join("no.fq");
        let manifest = format!("a\t{}\t{}\n", a1.display(), missing.display());
        match parse_samples(Cursor::new(manifest)) {
            Err(DehostError::MissingInput { line, path }) => {
                assert_eq!(line, 1);
                assert_eq!(path, missing);
            }
            other => panic!("expected missing input error, got {other:?}"),
        }
    }

    #[test]
    fn test_parses_tool_names_skipping_blanks() {
        let names = parse_tool_names(Cursor::new("bwa\n\nsnap\n".to_string())).unwrap();
        assert_eq!(names, vec!["bwa", "snap"]);
    }

    #[test]
    fn test_empty_tool_list_is_an_error() {
        let result = parse_tool_names(Cursor::new("\n\n".to_string()));
        assert!(matches!(result, Err(DehostError::EmptyToolList)));
    }
}
