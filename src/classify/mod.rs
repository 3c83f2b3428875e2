mod cigar;
mod classifier;
mod sam;

pub use cigar::{parse_cigar, read_stats, CigarOp, ReadStats};
pub use classifier::{is_mapped, Thresholds};
pub use sam::mapped_read_ids;
