//! Drives the comparison: every tool annotates every sample, each
//! tool/sample pair gets host-depleted FASTQ files, and all calls are
//! collected into one long-format table.

use crate::errors::{DehostError, Result};
use crate::fastq;
use crate::manifest::Sample;
use crate::tools::{HostTool, ReadAnnotation};
use itertools::Itertools;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One call of the result table.
#[derive(Debug, PartialEq, Clone)]
pub struct ResultRow {
    pub tool: String,
    pub sample: String,
    pub read_id: String,
    pub is_human: bool,
}

const RESULT_HEADER: &str = "tool\tsample\tread_id\tis_human";

/// Annotate every sample with every tool. Samples are processed in
/// manifest order and each one runs through the full tool list before
/// the next starts.
pub fn run(
    samples: &[Sample],
    tools: &[Box<dyn HostTool>],
    out_dir: &Path,
    output_name: &str,
) -> Result<()> {
    log::info!(
        "Comparing {} tools on {} samples: {}",
        tools.len(),
        samples.len(),
        tools.iter().map(|tool| tool.name()).join(", ")
    );
    let mut results = Vec::new();
    for sample in samples {
        check_mates_consistent(sample)?;
        for tool in tools {
            log::info!("Annotating sample '{}' with '{}'", sample.name, tool.name());
            let annotations = tool.get_human_annotation(&sample.r1, &sample.r2)?;
            write_filtered_fastqs(tool.name(), sample, &annotations, out_dir)?;
            results.extend(annotations.into_iter().map(|annotation| ResultRow {
                tool: tool.name().to_string(),
                sample: sample.name.clone(),
                read_id: annotation.read_id,
                is_human: annotation.is_human,
            }));
        }
    }
    let table_path = out_dir.join(output_name);
    write_results(&table_path, &results)?;
    log::info!(
        "Wrote {} calls to {}",
        results.len(),
        table_path.display()
    );
    Ok(())
}

/// R1 and R2 must contain the same read ids, in any order.
fn check_mates_consistent(sample: &Sample) -> Result<()> {
    let r1_ids: HashSet<String> = fastq::read_ids(&sample.r1)?.into_iter().collect();
    let r2_ids: HashSet<String> = fastq::read_ids(&sample.r2)?.into_iter().collect();
    if r1_ids != r2_ids {
        return Err(DehostError::MateMismatch {
            sample: sample.name.clone(),
            r1: sample.r1.clone(),
            r2: sample.r2.clone(),
        });
    }
    Ok(())
}

/// Write both mates of a tool/sample pair with the human reads
/// removed.
fn write_filtered_fastqs(
    tool: &str,
    sample: &Sample,
    annotations: &[ReadAnnotation],
    out_dir: &Path,
) -> Result<()> {
    let keep: HashSet<String> = annotations
        .iter()
        .filter(|annotation| !annotation.is_human)
        .map(|annotation| annotation.read_id.clone())
        .collect();
    for (mate, input) in [("R1", &sample.r1), ("R2", &sample.r2)] {
        let output = out_dir.join(format!("{}_{}-{}.fastq", tool, sample.name, mate));
        let reader = fastq::open_fastq_reader(input)?;
        let file = File::create(&output).map_err(|e| DehostError::file_io(&output, e))?;
        let mut writer = BufWriter::new(file);
        let written = fastq::filter_fastq(reader, &mut writer, &keep)?;
        writer.flush()?;
        log::debug!("{}: kept {} reads", output.display(), written);
    }
    Ok(())
}

fn write_results(path: &Path, results: &[ResultRow]) -> Result<()> {
    let file = File::create(path).map_err(|e| DehostError::file_io(path, e))?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "{RESULT_HEADER}")?;
    for row in results {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            row.tool, row.sample, row.read_id, row.is_human as u8
        )?;
    }
    writer.flush()?;
    Ok(())
}
