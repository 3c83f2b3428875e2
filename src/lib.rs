pub mod classify;
pub mod cli;
pub mod errors;
pub mod fastq;
pub mod manifest;
pub mod pipeline;
pub mod tools;
pub mod utils;
