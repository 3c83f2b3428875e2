//! Aligners that report their hits as SAM: snap, bwa, and bowtie2.
//! Each stages a SAM file in a temporary location and keeps the reads
//! whose alignments pass the classification thresholds.

use crate::classify::{mapped_read_ids, Thresholds};
use crate::errors::{DehostError, Result};
use crate::tools::{annotate_by_membership, require_path_param, run_shell, HostTool, ReadAnnotation};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn mapped_ids_from_sam(
    tool: &'static str,
    command: &str,
    sam_path: &Path,
    thresholds: &Thresholds,
) -> Result<HashSet<String>> {
    run_shell(tool, command)?;
    let file = File::open(sam_path).map_err(|e| DehostError::file_io(sam_path, e))?;
    mapped_read_ids(BufReader::new(file), thresholds)
}

pub struct Snap {
    index: PathBuf,
    thresholds: Thresholds,
}

impl Snap {
    pub fn new(params: Option<&Map<String, Value>>) -> Result<Self> {
        Ok(Snap {
            index: require_path_param(params, "snap", "index")?,
            thresholds: Thresholds::default(),
        })
    }
}

impl HostTool for Snap {
    fn name(&self) -> &'static str {
        "snap"
    }

    fn get_human_annotation(&self, r1: &Path, r2: &Path) -> Result<Vec<ReadAnnotation>> {
        let sam = NamedTempFile::new()?;
        let command = format!(
            "snap paired {} {} {} -o -sam {}",
            self.index.display(),
            r1.display(),
            r2.display(),
            sam.path().display()
        );
        let mapped = mapped_ids_from_sam("snap", &command, sam.path(), &self.thresholds)?;
        annotate_by_membership(r1, &mapped)
    }
}

pub struct Bwa {
    index: PathBuf,
    thresholds: Thresholds,
}

impl Bwa {
    pub fn new(params: Option<&Map<String, Value>>) -> Result<Self> {
        Ok(Bwa {
            index: require_path_param(params, "bwa", "index")?,
            thresholds: Thresholds::default(),
        })
    }
}

impl HostTool for Bwa {
    fn name(&self) -> &'static str {
        "bwa"
    }

    fn get_human_annotation(&self, r1: &Path, r2: &Path) -> Result<Vec<ReadAnnotation>> {
        let sam = NamedTempFile::new()?;
        let command = format!(
            "bwa mem -M {} {} {} > {}",
            self.index.display(),
            r1.display(),
            r2.display(),
            sam.path().display()
        );
        let mapped = mapped_ids_from_sam("bwa", &command, sam.path(), &self.thresholds)?;
        annotate_by_membership(r1, &mapped)
    }
}

pub struct Bowtie {
    index: PathBuf,
    thresholds: Thresholds,
}

impl Bowtie {
    pub fn new(params: Option<&Map<String, Value>>) -> Result<Self> {
        Ok(Bowtie {
            index: require_path_param(params, "bowtie", "index")?,
            thresholds: Thresholds::default(),
        })
    }
}

impl HostTool for Bowtie {
    fn name(&self) -> &'static str {
        "bowtie"
    }

    fn get_human_annotation(&self, r1: &Path, r2: &Path) -> Result<Vec<ReadAnnotation>> {
        let sam = NamedTempFile::new()?;
        let command = format!(
            "bowtie2 --local --very-sensitive-local -1 {} -2 {} -x {} -S {}",
            r1.display(),
            r2.display(),
            self.index.display(),
            sam.path().display()
        );
        let mapped = mapped_ids_from_sam("bowtie", &command, sam.path(), &self.thresholds)?;
        annotate_by_membership(r1, &mapped)
    }
}
