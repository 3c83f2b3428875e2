//! Synthetic tools for calibrating the comparison: they annotate
//! reads without running anything external.

use crate::errors::{DehostError, Result};
use crate::fastq;
use crate::tools::{HostTool, ReadAnnotation};
use rand::Rng;
use serde_json::{Map, Value};
use std::path::Path;

fn annotate_with<F: FnMut(String) -> ReadAnnotation>(
    r1: &Path,
    annotate: F,
) -> Result<Vec<ReadAnnotation>> {
    Ok(fastq::read_ids(r1)?.into_iter().map(annotate).collect())
}

/// Marks each read human with probability `percent_human / 100`.
pub struct RandomHuman {
    fraction_human: f64,
}

impl RandomHuman {
    pub fn new(params: Option<&Map<String, Value>>) -> Result<Self> {
        let percent = params
            .and_then(|map| map.get("percent_human"))
            .ok_or_else(|| DehostError::MissingToolParameter {
                tool: "random_human".to_string(),
                parameter: "percent_human".to_string(),
            })?;
        let percent = percent
            .as_f64()
            .ok_or_else(|| DehostError::InvalidToolParameter {
                tool: "random_human".to_string(),
                parameter: "percent_human".to_string(),
                reason: format!("expected a number, got {percent}"),
            })?;
        if !(0.0..=100.0).contains(&percent) {
            return Err(DehostError::InvalidToolParameter {
                tool: "random_human".to_string(),
                parameter: "percent_human".to_string(),
                reason: format!("must be between 0 and 100, got {percent}"),
            });
        }
        Ok(RandomHuman {
            fraction_human: percent / 100.0,
        })
    }
}

impl HostTool for RandomHuman {
    fn name(&self) -> &'static str {
        "random_human"
    }

    fn get_human_annotation(&self, r1: &Path, _r2: &Path) -> Result<Vec<ReadAnnotation>> {
        let mut rng = rand::rng();
        annotate_with(r1, |read_id| ReadAnnotation {
            read_id,
            is_human: rng.random_bool(self.fraction_human),
        })
    }
}

/// Marks every read human.
pub struct AllHuman;

impl HostTool for AllHuman {
    fn name(&self) -> &'static str {
        "all_human"
    }

    fn get_human_annotation(&self, r1: &Path, _r2: &Path) -> Result<Vec<ReadAnnotation>> {
        annotate_with(r1, |read_id| ReadAnnotation {
            read_id,
            is_human: true,
        })
    }
}

/// Marks every read non-human.
pub struct NoneHuman;

impl HostTool for NoneHuman {
    fn name(&self) -> &'static str {
        "none_human"
    }

    fn get_human_annotation(&self, r1: &Path, _r2: &Path) -> Result<Vec<ReadAnnotation>> {
        annotate_with(r1, |read_id| ReadAnnotation {
            read_id,
            is_human: false,
        })
    }
}
