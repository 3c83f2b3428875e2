use crate::errors::{DehostError, Result};

/// One count/operation token of a CIGAR string.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CigarOp {
    pub len: i64,
    pub op: char,
}

/// Alignment statistics of a single mapped record.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ReadStats {
    pub alignment_length: i64,
    pub identities: i64,
}

/// Decompose a CIGAR string into its tokens. Every token must be a run
/// of digits followed by one operation character.
pub fn parse_cigar(cigar: &str) -> Result<Vec<CigarOp>> {
    let mut ops = Vec::new();
    let mut chars = cigar.chars().peekable();
    while let Some(&first) = chars.peek() {
        if !first.is_ascii_digit() {
            return Err(DehostError::Cigar {
                cigar: cigar.to_string(),
            });
        }
        let mut len: i64 = 0;
        while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
            len = len * 10 + digit as i64;
            chars.next();
        }
        match chars.next() {
            Some(op) => ops.push(CigarOp { len, op }),
            None => {
                return Err(DehostError::Cigar {
                    cigar: cigar.to_string(),
                })
            }
        }
    }
    if ops.is_empty() {
        return Err(DehostError::Cigar {
            cigar: cigar.to_string(),
        });
    }
    Ok(ops)
}

fn clip_total(ops: &[CigarOp], clip: char) -> i64 {
    ops.iter().filter(|o| o.op == clip).map(|o| o.len).sum()
}

/// Derive alignment length and identity count from parsed CIGAR tokens.
///
/// The alignment length is the sum of all token counts minus clipped
/// bases, where clipping is only charged when the CIGAR starts with a
/// clip token: a leading soft clip discounts every `S` token, otherwise
/// a leading hard clip discounts every `H` token. Identities are the
/// matched bases minus the reported mismatches and may go negative.
pub fn read_stats(ops: &[CigarOp], mismatches: i64) -> ReadStats {
    let total: i64 = ops.iter().map(|o| o.len).sum();
    let clipped = match ops.first() {
        Some(first) if first.op == 'S' => clip_total(ops, 'S'),
        Some(first) if first.op == 'H' => clip_total(ops, 'H'),
        _ => 0,
    };
    let matched = ops
        .iter()
        .filter(|o| o.op == 'M')
        .map(|o| o.len)
        .sum::<i64>();
    ReadStats {
        alignment_length: total - clipped,
        identities: matched - mismatches,
    }
}
