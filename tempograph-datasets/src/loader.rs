//! Raw edge-file canonicalization.
//!
//! Turns raw dataset bytes into a canonical, timestamp-sorted edge sequence:
//! header and comment lines are skipped, self-loops are silently dropped,
//! endpoint pairs are ordered smaller-first, and ties in the stable sort
//! keep their original file order. Any malformed data row aborts the load.

use chrono::NaiveDate;
use tempograph_core::{Edge, TimedEdge, VertexId};
use tracing::{debug, instrument};

use crate::errors::DatasetError;
use crate::registry::{Delimiter, FormatDescriptor, TimestampDecode};

/// Canonical, timestamp-sorted edge records plus the instance vertex count.
#[derive(Clone, Debug)]
pub struct EdgeSequence {
    /// Records sorted by timestamp; ties keep raw-file order.
    pub records: Vec<TimedEdge>,
    /// `max vertex id + 1` over all records.
    pub vertex_count: u64,
}

/// Parses raw dataset bytes according to a format descriptor.
///
/// # Errors
/// Returns [`DatasetError`] when the bytes are not UTF-8, a data row is
/// malformed (missing fields, non-numeric ids or timestamps), or no usable
/// edge survives filtering.
#[instrument(name = "datasets.load_edges", skip(format, bytes), fields(bytes = bytes.len()))]
pub fn load_edges(format: &FormatDescriptor, bytes: &[u8]) -> Result<EdgeSequence, DatasetError> {
    let text = std::str::from_utf8(bytes)?;
    // Some raw exports carry a UTF-8 BOM.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut records = Vec::new();
    let mut max_vertex: VertexId = 0;
    let mut dropped_self_loops: u64 = 0;

    for (index, line) in text.lines().enumerate().skip(format.skip_lines) {
        let line_number = index + 1;
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(marker) = format.comment_marker {
            if trimmed.starts_with(marker) {
                continue;
            }
        }

        let fields = split_fields(trimmed, format.delimiter);
        let u = parse_vertex(&fields, 0, line_number)?;
        let v = parse_vertex(&fields, 1, line_number)?;
        let timestamp = parse_timestamp(&fields, format, line_number)?;

        let Some(edge) = Edge::new(u, v) else {
            dropped_self_loops += 1;
            continue;
        };
        max_vertex = max_vertex.max(edge.larger());
        records.push(TimedEdge::new(edge, timestamp));
    }

    if records.is_empty() {
        return Err(DatasetError::EmptyDataset);
    }
    // Stable sort: equal timestamps keep their file order.
    records.sort_by_key(|record| record.timestamp);

    debug!(
        records = records.len(),
        dropped_self_loops, "raw edge file canonicalized"
    );
    Ok(EdgeSequence {
        records,
        vertex_count: max_vertex + 1,
    })
}

fn split_fields(line: &str, delimiter: Delimiter) -> Vec<&str> {
    match delimiter {
        Delimiter::Comma => line.split(',').collect(),
        Delimiter::Tab => line.split('\t').collect(),
        Delimiter::Whitespace => line.split_whitespace().collect(),
    }
}

fn field<'a>(
    fields: &[&'a str],
    column: usize,
    line: usize,
) -> Result<&'a str, DatasetError> {
    fields
        .get(column)
        .copied()
        .ok_or_else(|| DatasetError::MalformedRow {
            line,
            message: format!("expected at least {} fields, got {}", column + 1, fields.len()),
        })
}

fn parse_vertex(fields: &[&str], column: usize, line: usize) -> Result<VertexId, DatasetError> {
    let raw = field(fields, column, line)?;
    raw.trim().parse().map_err(|_| DatasetError::MalformedRow {
        line,
        message: format!("vertex id `{raw}` is not a non-negative integer"),
    })
}

fn parse_timestamp(
    fields: &[&str],
    format: &FormatDescriptor,
    line: usize,
) -> Result<i64, DatasetError> {
    let raw = field(fields, format.timestamp_column, line)?.trim();
    match format.decode {
        TimestampDecode::Seconds | TimestampDecode::Year => {
            raw.parse().map_err(|_| DatasetError::MalformedRow {
                line,
                message: format!("timestamp `{raw}` is not an integer"),
            })
        }
        TimestampDecode::FloatSeconds => {
            let seconds: f64 = raw.parse().map_err(|_| DatasetError::MalformedRow {
                line,
                message: format!("timestamp `{raw}` is not a number"),
            })?;
            #[expect(
                clippy::cast_possible_truncation,
                reason = "float timestamps are truncated toward zero by contract"
            )]
            let truncated = seconds.trunc() as i64;
            Ok(truncated)
        }
        TimestampDecode::IsoDate => decode_iso_date(raw, line),
    }
}

/// Decodes `YYYY-MM-DD` at UTC midnight. UTC keeps the output independent of
/// the host timezone.
fn decode_iso_date(raw: &str, line: usize) -> Result<i64, DatasetError> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|error| {
        DatasetError::MalformedRow {
            line,
            message: format!("timestamp `{raw}` is not a YYYY-MM-DD date: {error}"),
        }
    })?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(|| DatasetError::MalformedRow {
        line,
        message: format!("date `{raw}` has no UTC midnight"),
    })?;
    Ok(midnight.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    const COMMA_SECONDS: FormatDescriptor = FormatDescriptor {
        delimiter: Delimiter::Comma,
        skip_lines: 0,
        timestamp_column: 2,
        decode: TimestampDecode::Seconds,
        comment_marker: None,
    };

    fn endpoints(sequence: &EdgeSequence) -> Vec<(u64, u64, i64)> {
        sequence
            .records
            .iter()
            .map(|record| {
                let (u, v) = record.edge.endpoints();
                (u, v, record.timestamp)
            })
            .collect()
    }

    #[test]
    fn canonicalizes_sorts_and_counts_vertices() {
        let raw = b"5,1,30\n2,3,10\n7,7,20\n1,4,10\n";
        let sequence = load_edges(&COMMA_SECONDS, raw).expect("well-formed input loads");
        // The self-loop 7,7 is dropped; ties at t=10 keep file order.
        assert_eq!(
            endpoints(&sequence),
            vec![(2, 3, 10), (1, 4, 10), (1, 5, 30)]
        );
        assert_eq!(sequence.vertex_count, 6);
    }

    #[test]
    fn strips_a_leading_byte_order_mark() {
        let raw = "\u{feff}1,2,5\n".as_bytes();
        let sequence = load_edges(&COMMA_SECONDS, raw).expect("BOM input loads");
        assert_eq!(endpoints(&sequence), vec![(1, 2, 5)]);
    }

    #[test]
    fn skips_configured_header_lines() {
        let format = FormatDescriptor {
            delimiter: Delimiter::Whitespace,
            skip_lines: 1,
            timestamp_column: 3,
            decode: TimestampDecode::Seconds,
            comment_marker: None,
        };
        let raw = b"% nodes edges weights times\n4 2 1 100\n3 9 1 50\n";
        let sequence = load_edges(&format, raw).expect("header is skipped");
        assert_eq!(endpoints(&sequence), vec![(3, 9, 50), (2, 4, 100)]);
    }

    #[test]
    fn skips_comment_lines() {
        let format = FormatDescriptor {
            delimiter: Delimiter::Whitespace,
            skip_lines: 0,
            timestamp_column: 3,
            decode: TimestampDecode::Seconds,
            comment_marker: Some('%'),
        };
        let raw = b"% sym positive\n1 2 1 7\n% another comment\n2 3 1 8\n";
        let sequence = load_edges(&format, raw).expect("comments are skipped");
        assert_eq!(sequence.records.len(), 2);
    }

    #[test]
    fn truncates_float_timestamps_toward_zero() {
        let format = FormatDescriptor {
            decode: TimestampDecode::FloatSeconds,
            ..COMMA_SECONDS
        };
        let raw = b"1,2,1089.9\n2,3,17.2\n";
        let sequence = load_edges(&format, raw).expect("float input loads");
        assert_eq!(endpoints(&sequence), vec![(2, 3, 17), (1, 2, 1089)]);
    }

    #[test]
    fn decodes_iso_dates_at_utc_midnight() {
        let format = FormatDescriptor {
            delimiter: Delimiter::Tab,
            skip_lines: 0,
            timestamp_column: 2,
            decode: TimestampDecode::IsoDate,
            comment_marker: None,
        };
        let raw = b"1\t2\t1970-01-02\n2\t3\t2007-03-15\n";
        let sequence = load_edges(&format, raw).expect("date input loads");
        assert_eq!(
            endpoints(&sequence),
            vec![(1, 2, 86_400), (2, 3, 1_173_916_800)]
        );
    }

    #[test]
    fn decodes_calendar_years_directly() {
        let format = FormatDescriptor {
            decode: TimestampDecode::Year,
            ..COMMA_SECONDS
        };
        let raw = b"10,20,1998\n";
        let sequence = load_edges(&format, raw).expect("year input loads");
        assert_eq!(endpoints(&sequence), vec![(10, 20, 1998)]);
    }

    #[rstest]
    #[case::missing_field(b"1,2\n".as_slice(), 1)]
    #[case::non_numeric_id(b"1,2,3\nx,2,3\n".as_slice(), 2)]
    #[case::non_numeric_timestamp(b"1,2,soon\n".as_slice(), 1)]
    fn malformed_rows_abort_with_line_numbers(#[case] raw: &[u8], #[case] expected_line: usize) {
        let err = load_edges(&COMMA_SECONDS, raw).expect_err("malformed rows must fail");
        assert!(
            matches!(err, DatasetError::MalformedRow { line, .. } if line == expected_line),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn all_self_loops_is_an_empty_dataset() {
        let err = load_edges(&COMMA_SECONDS, b"3,3,1\n").expect_err("no usable edges");
        assert!(matches!(err, DatasetError::EmptyDataset));
    }
}
