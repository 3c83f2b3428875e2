//! The filtering tools under comparison. Each tool annotates every
//! read of a sample as human or non-human; external aligners run as
//! shell subprocesses against temporary output files.

mod blat;
mod bmtagger;
mod sam_aligners;
mod synthetic;

pub use blat::Blat;
pub use bmtagger::{Bmfilter, Bmtagger};
pub use sam_aligners::{Bowtie, Bwa, Snap};
pub use synthetic::{AllHuman, NoneHuman, RandomHuman};

use crate::errors::{DehostError, Result};
use crate::fastq;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Human/non-human call for one read id.
#[derive(Debug, PartialEq, Clone)]
pub struct ReadAnnotation {
    pub read_id: String,
    pub is_human: bool,
}

/// A human-read detection tool. Implementations return one annotation
/// per R1 read id, in R1's read order.
pub trait HostTool {
    fn name(&self) -> &'static str;
    fn get_human_annotation(&self, r1: &Path, r2: &Path) -> Result<Vec<ReadAnnotation>>;
}

/// Per-tool parameter maps, keyed by tool name.
pub type ToolParameters = HashMap<String, Map<String, Value>>;

pub fn load_tool_parameters(path: &Path) -> Result<ToolParameters> {
    let file = File::open(path).map_err(|e| DehostError::file_io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| DehostError::ToolParameters {
        path: path.to_path_buf(),
        source,
    })
}

/// Instantiate the named tools, handing each its parameter map.
pub fn create_tools(names: &[String], parameters: &ToolParameters) -> Result<Vec<Box<dyn HostTool>>> {
    names
        .iter()
        .map(|name| create_tool(name, parameters.get(name.as_str())))
        .collect()
}

fn create_tool(name: &str, params: Option<&Map<String, Value>>) -> Result<Box<dyn HostTool>> {
    let tool: Box<dyn HostTool> = match name {
        "snap" => Box::new(Snap::new(params)?),
        "bwa" => Box::new(Bwa::new(params)?),
        "bowtie" => Box::new(Bowtie::new(params)?),
        "blat" => Box::new(Blat::new(params)?),
        "bmfilter" => Box::new(Bmfilter::new(params)?),
        "bmtagger" => Box::new(Bmtagger::new(params)?),
        "random_human" => Box::new(RandomHuman::new(params)?),
        "all_human" => Box::new(AllHuman),
        "none_human" => Box::new(NoneHuman),
        _ => {
            return Err(DehostError::UnknownTool {
                name: name.to_string(),
            })
        }
    };
    Ok(tool)
}

/// Fetch a required path-valued parameter from a tool's map.
pub(crate) fn require_path_param(
    params: Option<&Map<String, Value>>,
    tool: &'static str,
    key: &'static str,
) -> Result<PathBuf> {
    let value = params
        .and_then(|map| map.get(key))
        .ok_or_else(|| DehostError::MissingToolParameter {
            tool: tool.to_string(),
            parameter: key.to_string(),
        })?;
    match value {
        Value::String(path) => Ok(PathBuf::from(path)),
        other => Err(DehostError::InvalidToolParameter {
            tool: tool.to_string(),
            parameter: key.to_string(),
            reason: format!("expected a path string, got {other}"),
        }),
    }
}

/// Run a tool's shell command, failing on non-zero exit.
pub(crate) fn run_shell(tool: &'static str, command: &str) -> Result<()> {
    log::debug!("[{tool}] running command: {command}");
    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .status()
        .map_err(|source| DehostError::CommandLaunch {
            tool: tool.to_string(),
            source,
        })?;
    if !status.success() {
        return Err(DehostError::CommandFailed {
            tool: tool.to_string(),
            command: command.to_string(),
            status,
        });
    }
    Ok(())
}

/// One annotation per R1 read id, in R1 order; a read is human when
/// its id is in `mapped`.
pub(crate) fn annotate_by_membership(
    r1: &Path,
    mapped: &HashSet<String>,
) -> Result<Vec<ReadAnnotation>> {
    Ok(fastq::read_ids(r1)?
        .into_iter()
        .map(|read_id| {
            let is_human = mapped.contains(&read_id);
            ReadAnnotation { read_id, is_human }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_from_json(json: &str) -> ToolParameters {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_unknown_tool_is_an_error() {
        let result = create_tools(&["hisat".to_string()], &ToolParameters::new());
        assert!(matches!(result, Err(DehostError::UnknownTool { name }) if name == "hisat"));
    }

    #[test]
    fn test_creates_every_known_tool() {
        let params = params_from_json(
            r#"{
                "snap": {"index": "/ref/snap"},
                "bwa": {"index": "/ref/bwa.fa"},
                "bowtie": {"index": "/ref/bt2"},
                "blat": {"index": "/ref/hg38.2bit"},
                "bmfilter": {"bitmask": "/ref/hg38.bm"},
                "bmtagger": {"bitmask": "/ref/hg38.bm", "srprism": "/ref/hg38.sr"},
                "random_human": {"percent_human": 50}
            }"#,
        );
        let names: Vec<String> = [
            "snap",
            "bwa",
            "bowtie",
            "blat",
            "bmfilter",
            "bmtagger",
            "random_human",
            "all_human",
            "none_human",
        ]
        .iter()
        .map(|n| n.to_string())
        .collect();
        let tools = create_tools(&names, &params).unwrap();
        let created: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(created, names);
    }

    #[test]
    fn test_missing_required_parameter_is_an_error() {
        let result = create_tools(&["snap".to_string()], &ToolParameters::new());
        match result {
            Err(DehostError::MissingToolParameter { tool, parameter }) => {
                assert_eq!(tool, "snap");
                assert_eq!(parameter, "index");
            }
            Err(other) => panic!("expected missing parameter error, got {other}"),
            Ok(_) => panic!("expected missing parameter error"),
        }
    }

    #[test]
    fn test_non_string_path_parameter_is_an_error() {
        let params = params_from_json(r#"{"bwa": {"index": 42}}"#);
        let result = create_tools(&["bwa".to_string()], &params);
        assert!(matches!(
            result,
            Err(DehostError::InvalidToolParameter { .. })
        ));
    }

    #[test]
    fn test_load_tool_parameters_rejects_non_object_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parameters.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(matches!(
            load_tool_parameters(&path),
            Err(DehostError::ToolParameters { .. })
        ));
    }

    #[test]
    fn test_load_tool_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parameters.json");
        std::fs::write(&path, r#"{"snap": {"index": "/ref/snap"}}"#).unwrap();
        let params = load_tool_parameters(&path).unwrap();
        assert_eq!(
            params["snap"]["index"],
            Value::String("/ref/snap".to_string())
        );
    }

    #[test]
    fn test_annotate_by_membership_follows_r1_order() {
        let dir = tempfile::tempdir().unwrap();
        let r1 = dir.path().join("s-R1.fastq");
        std::fs::write(&r1, "@b\nAC\n+\nFF\n@a\nGT\n+\nFF\n").unwrap();
        let mapped: HashSet<String> = ["a".to_string()].into_iter().collect();
        let annotations = annotate_by_membership(&r1, &mapped).unwrap();
        assert_eq!(
            annotations,
            vec![
                ReadAnnotation {
                    read_id: "b".to_string(),
                    is_human: false,
                },
                ReadAnnotation {
                    read_id: "a".to_string(),
                    is_human: true,
                },
            ]
        );
    }
}
