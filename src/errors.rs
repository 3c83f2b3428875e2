//! Error types shared across the pipeline.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, DehostError>;

/// Error type covering configuration, input validation, parsing, and
/// external tool failures
#[derive(Error, Debug)]
pub enum DehostError {
    /// Tool list names a tool this binary does not know
    #[error("No tool named '{name}' is available")]
    UnknownTool { name: String },

    /// A required entry is missing from the tool's parameter map
    #[error("Tool '{tool}' requires parameter '{parameter}'")]
    MissingToolParameter { tool: String, parameter: String },

    /// A parameter is present but unusable
    #[error("Invalid value for '{tool}' parameter '{parameter}': {reason}")]
    InvalidToolParameter {
        tool: String,
        parameter: String,
        reason: String,
    },

    /// Tool list file contains no tool names
    #[error("Tool list contains no tool names")]
    EmptyToolList,

    /// Sample manifest contains no samples
    #[error("Sample manifest contains no samples")]
    EmptyManifest,

    /// A manifest row is malformed
    #[error("Sample manifest line {line}: {reason}")]
    Manifest { line: usize, reason: String },

    /// A manifest row references a FASTQ file that does not exist
    #[error("Sample manifest line {}: FASTQ file does not exist: {}", .line, .path.display())]
    MissingInput { line: usize, path: PathBuf },

    /// R1 and R2 of a sample do not hold the same read ids
    #[error("Sample '{}': read ids in {} and {} do not match", .sample, .r1.display(), .r2.display())]
    MateMismatch {
        sample: String,
        r1: PathBuf,
        r2: PathBuf,
    },

    /// A `.gz` file does not start with a gzip header
    #[error("Invalid gzip header: {}", .path.display())]
    InvalidGzip { path: PathBuf },

    /// CIGAR string that does not decompose into count/operation tokens
    #[error("Malformed CIGAR string: '{cigar}'")]
    Cigar { cigar: String },

    /// SAM alignment line that cannot be interpreted
    #[error("Malformed SAM record: {reason}: '{line}'")]
    SamRecord { reason: String, line: String },

    /// Tag table row with the wrong number of columns
    #[error("Expected 2 tab-separated fields in tag row, found {found}: '{line}'")]
    TagRow { found: usize, line: String },

    /// Structurally invalid FASTQ content
    #[error("Invalid FASTQ record at line {line}: {reason}")]
    Fastq { line: usize, reason: String },

    /// PSL alignment row that passed the header filter but is incomplete
    #[error("Malformed PSL row: '{line}'")]
    PslRow { line: String },

    /// Tool parameter file that is not the expected JSON shape
    #[error("Cannot parse tool parameters {}: {}", .path.display(), .source)]
    ToolParameters {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// I/O failure while reading a line-oriented stream
    #[error("Error reading line {line}: {source}")]
    ReadLine {
        line: usize,
        #[source]
        source: std::io::Error,
    },

    /// The shell command for an external tool could not be started
    #[error("Cannot launch command for tool '{tool}': {source}")]
    CommandLaunch {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// An external tool ran and exited unsuccessfully
    #[error("Tool '{tool}' failed with {status}: {command}")]
    CommandFailed {
        tool: String,
        command: String,
        status: ExitStatus,
    },

    /// I/O failure on a named file
    #[error("File {}: {}", .path.display(), .source)]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure with no file context of its own
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DehostError {
    pub fn file_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DehostError::FileIo {
            path: path.into(),
            source,
        }
    }
}
