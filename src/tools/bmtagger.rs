//! The bmtagger family: bmfilter writes a per-read tag table, while
//! the bmtagger.sh wrapper writes the human read ids one per line.

use crate::errors::{DehostError, Result};
use crate::fastq;
use crate::tools::{annotate_by_membership, require_path_param, run_shell, HostTool, ReadAnnotation};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

const TAG_FIELD_COUNT: usize = 2;
const HUMAN_TAG: &str = "H";

pub struct Bmfilter {
    bitmask: PathBuf,
}

impl Bmfilter {
    pub fn new(params: Option<&Map<String, Value>>) -> Result<Self> {
        Ok(Bmfilter {
            bitmask: require_path_param(params, "bmfilter", "bitmask")?,
        })
    }
}

impl HostTool for Bmfilter {
    fn name(&self) -> &'static str {
        "bmfilter"
    }

    fn get_human_annotation(&self, r1: &Path, r2: &Path) -> Result<Vec<ReadAnnotation>> {
        let output = NamedTempFile::new()?;
        let command = format!(
            "bmfilter -1 {} -2 {} -q 1 -T -b {} -o {}",
            r1.display(),
            r2.display(),
            self.bitmask.display(),
            output.path().display()
        );
        run_shell("bmfilter", &command)?;
        // bmfilter appends its own suffix, leaving the extra file
        // outside the temp handle's control.
        let tag_path = PathBuf::from(format!("{}.tag", output.path().display()));
        let annotations = annotate_from_tag_table(&tag_path, r1);
        let _ = std::fs::remove_file(&tag_path);
        annotations
    }
}

fn annotate_from_tag_table(tag_path: &Path, r1: &Path) -> Result<Vec<ReadAnnotation>> {
    let file = File::open(tag_path).map_err(|e| DehostError::file_io(tag_path, e))?;
    let tags = parse_tag_table(BufReader::new(file))?;
    Ok(fastq::read_ids(r1)?
        .into_iter()
        .map(|read_id| {
            let is_human = tags.get(&read_id).copied().unwrap_or(false);
            ReadAnnotation { read_id, is_human }
        })
        .collect())
}

/// Parse the two-column tag table; the first line is a header. The
/// value records whether the read was tagged human.
fn parse_tag_table<R: BufRead>(reader: R) -> Result<HashMap<String, bool>> {
    let mut tags = HashMap::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DehostError::ReadLine {
            line: line_number + 1,
            source: e,
        })?;
        if line_number == 0 {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != TAG_FIELD_COUNT {
            return Err(DehostError::TagRow {
                found: fields.len(),
                line,
            });
        }
        tags.insert(fields[0].to_string(), fields[1] == HUMAN_TAG);
    }
    Ok(tags)
}

pub struct Bmtagger {
    bitmask: PathBuf,
    srprism: PathBuf,
}

impl Bmtagger {
    pub fn new(params: Option<&Map<String, Value>>) -> Result<Self> {
        Ok(Bmtagger {
            bitmask: require_path_param(params, "bmtagger", "bitmask")?,
            srprism: require_path_param(params, "bmtagger", "srprism")?,
        })
    }
}

impl HostTool for Bmtagger {
    fn name(&self) -> &'static str {
        "bmtagger"
    }

    fn get_human_annotation(&self, r1: &Path, r2: &Path) -> Result<Vec<ReadAnnotation>> {
        let output = NamedTempFile::new()?;
        let workdir = TempDir::new()?;
        let command = format!(
            "bmtagger.sh -b {} -x {} -1 {} -2 {} -q 1 -T {} -o {}",
            self.bitmask.display(),
            self.srprism.display(),
            r1.display(),
            r2.display(),
            workdir.path().display(),
            output.path().display()
        );
        run_shell("bmtagger", &command)?;
        let file =
            File::open(output.path()).map_err(|e| DehostError::file_io(output.path(), e))?;
        let mapped = parse_id_lines(BufReader::new(file))?;
        annotate_by_membership(r1, &mapped)
    }
}

/// Read ids listed one per line; blank lines are skipped.
fn parse_id_lines<R: BufRead>(reader: R) -> Result<HashSet<String>> {
    let mut ids = HashSet::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DehostError::ReadLine {
            line: line_number + 1,
            source: e,
        })?;
        let id = line.trim_end();
        if !id.is_empty() {
            ids.insert(id.to_string());
        }
    }
    Ok(ids)
}
