use crate::classify::cigar::{parse_cigar, read_stats};
use crate::classify::classifier::{is_mapped, Thresholds};
use crate::errors::{DehostError, Result};
use std::collections::HashSet;
use std::io::BufRead;

/// FLAG bit set on records without an alignment.
const FLAG_UNMAPPED: u16 = 0x4;
/// Mandatory columns of a SAM alignment line.
const MANDATORY_FIELDS: usize = 11;
/// Optional columns searched for the aligner's mismatch tag.
const MISMATCH_SCAN_COLUMNS: std::ops::Range<usize> = 11..15;
const MISMATCH_TAG: &str = "XM:i:";

#[derive(Debug, PartialEq)]
struct SamRecord {
    qname: String,
    cigar: String,
    mismatches: i64,
}

/// Collect the query names of all records whose alignment passes the
/// thresholds. Header lines and unmapped records are skipped; a name
/// qualifies as soon as any one of its records does.
pub fn mapped_read_ids<R: BufRead>(reader: R, thresholds: &Thresholds) -> Result<HashSet<String>> {
    let mut mapped = HashSet::new();
    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DehostError::ReadLine {
            line: line_number + 1,
            source: e,
        })?;
        if line.is_empty() || line.starts_with('@') {
            continue;
        }
        let record = match parse_record(&line)? {
            Some(record) => record,
            None => continue,
        };
        let ops = parse_cigar(&record.cigar)?;
        if is_mapped(&read_stats(&ops, record.mismatches), thresholds) {
            mapped.insert(record.qname);
        }
    }
    Ok(mapped)
}

/// Parse one alignment line; unmapped records come back as None.
fn parse_record(line: &str) -> Result<Option<SamRecord>> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < MANDATORY_FIELDS {
        return Err(DehostError::SamRecord {
            reason: format!(
                "expected at least {} tab-separated fields, found {}",
                MANDATORY_FIELDS,
                fields.len()
            ),
            line: line.to_string(),
        });
    }
    let flag: u16 = fields[1].parse().map_err(|_| DehostError::SamRecord {
        reason: format!("FLAG is not an integer: '{}'", fields[1]),
        line: line.to_string(),
    })?;
    if flag & FLAG_UNMAPPED != 0 {
        return Ok(None);
    }
    Ok(Some(SamRecord {
        qname: fields[0].to_string(),
        cigar: fields[5].to_string(),
        mismatches: parse_mismatches(&fields),
    }))
}

/// The value of the first `XM:i:<int>` tag within the scanned columns,
/// defaulting to 0 when no such tag is present.
fn parse_mismatches(fields: &[&str]) -> i64 {
    fields
        .iter()
        .take(MISMATCH_SCAN_COLUMNS.end)
        .skip(MISMATCH_SCAN_COLUMNS.start)
        .find_map(|field| {
            field
                .strip_prefix(MISMATCH_TAG)
                .and_then(|value| value.parse().ok())
        })
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sam_line(qname: &str, flag: u16, cigar: &str, tags: &[&str]) -> String {
        let mut fields = vec![
            qname.to_string(),
            flag.to_string(),
            "chr1".to_string(),
            "100".to_string(),
            "60".to_string(),
            cigar.to_string(),
            "=".to_string(),
            "250".to_string(),
            "150".to_string(),
            "A".to_string(),
            "F".to_string(),
        ];
        fields.extend(tags.iter().map(|t| t.to_string()));
        fields.join("\t")
    }

    fn ids_of(sam: &str) -> HashSet<String> {
        mapped_read_ids(Cursor::new(sam.to_string()), &Thresholds::default()).unwrap()
    }

    #[test]
    fn test_headers_and_unmapped_records_are_skipped() {
        let sam = format!(
            "@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:248956422\n{}\n{}\n",
            sam_line("mapped", 0, "100M", &[]),
            sam_line("unmapped", 4, "*", &[]),
        );
        let ids = ids_of(&sam);
        assert!(ids.contains("mapped"));
        assert!(!ids.contains("unmapped"));
    }

    #[test]
    fn test_mismatch_tag_is_honored() {
        // 60 identities over 100 aligned bases passes, 40 does not.
        let sam = format!(
            "{}\n{}\n",
            sam_line("ok", 0, "100M", &["AS:i:90", "XM:i:40"]),
            sam_line("noisy", 0, "100M", &["XM:i:60"]),
        );
        let ids = ids_of(&sam);
        assert!(ids.contains("ok"));
        assert!(!ids.contains("noisy"));
    }

    #[test]
    fn test_mismatch_tag_outside_scan_window_is_ignored() {
        let tags = ["t1:i:1", "t2:i:2", "t3:i:3", "t4:i:4", "XM:i:60"];
        let sam = sam_line("r1", 0, "100M", &tags);
        assert!(ids_of(&sam).contains("r1"));
    }

    #[test]
    fn test_soft_clipped_alignment_falls_below_length_cutoff() {
        let sam = sam_line("r1", 0, "10S90M", &[]);
        assert!(ids_of(&sam).is_empty());
    }

    #[test]
    fn test_any_qualifying_record_maps_the_name() {
        let sam = format!(
            "{}\n{}\n",
            sam_line("r1", 0, "50M", &[]),
            sam_line("r1", 256, "100M", &[]),
        );
        let ids = ids_of(&sam);
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("r1"));
    }

    #[test]
    fn test_short_line_is_an_error() {
        let result = mapped_read_ids(
            Cursor::new("r1\t0\tchr1\n".to_string()),
            &Thresholds::default(),
        );
        assert!(matches!(result, Err(DehostError::SamRecord { .. })));
    }

    #[test]
    fn test_bad_flag_is_an_error() {
        let line = sam_line("r1", 0, "100M", &[]).replace("r1\t0\t", "r1\tx\t");
        let result = mapped_read_ids(Cursor::new(line), &Thresholds::default());
        assert!(matches!(result, Err(DehostError::SamRecord { .. })));
    }

    #[test]
    fn test_mapped_record_with_invalid_cigar_is_an_error() {
        let sam = sam_line("r1", 0, "*", &[]);
        let result = mapped_read_ids(Cursor::new(sam), &Thresholds::default());
        assert!(matches!(result, Err(DehostError::Cigar { .. })));
    }
}
