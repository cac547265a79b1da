//! Delimited-text parsing into a column-major [`ParsedTable`].

use dose_core::error::IngestError;
use dose_core::models::ParsedTable;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse `bytes` as comma-separated text with a header row.
///
/// Cells are trimmed and blank lines skipped. Every record must have as many
/// fields as the header; a ragged record, an unterminated quote, invalid
/// UTF-8 or an input with no header at all is a [`IngestError::Parse`].
/// A header with no data rows is a valid, empty table.
pub fn parse_table(bytes: &[u8]) -> Result<ParsedTable, IngestError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(IngestError::Parse("No columns to parse from file".to_string()));
    }

    // The csv reader accepts an open quote running to end of input.
    if ends_inside_quotes(bytes) {
        return Err(IngestError::Parse(
            "unterminated quoted field".to_string(),
        ));
    }

    // Record widths are checked below so whitespace-only lines can be skipped.
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IngestError::Parse(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(IngestError::Parse("No columns to parse from file".to_string()));
    }

    let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::Parse(e.to_string()))?;
        if is_blank_record(&record) {
            continue;
        }
        if record.len() != headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(IngestError::Parse(format!(
                "line {}: found record with {} fields, but the header has {} fields",
                line,
                record.len(),
                headers.len()
            )));
        }
        for (column, cell) in columns.iter_mut().zip(record.iter()) {
            column.push(cell.to_string());
        }
    }

    Ok(ParsedTable { headers, columns })
}

/// A line holding only whitespace, which trims to a single empty field.
fn is_blank_record(record: &csv::StringRecord) -> bool {
    record.len() == 1 && record[0].is_empty()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Whether the input ends inside a quoted field.
///
/// A quote only opens a quoted field at the start of a field; anywhere else
/// it is a literal character, as the csv reader treats it.
fn ends_inside_quotes(bytes: &[u8]) -> bool {
    let mut state = QuoteState::FieldStart;
    for &b in bytes {
        state = match (state, b) {
            (QuoteState::FieldStart, b'"') => QuoteState::Quoted,
            (QuoteState::Quoted, b'"') => QuoteState::QuoteInQuoted,
            (QuoteState::Quoted, _) => QuoteState::Quoted,
            // `""` is an escaped quote.
            (QuoteState::QuoteInQuoted, b'"') => QuoteState::Quoted,
            (_, b',' | b'\n' | b'\r') => QuoteState::FieldStart,
            _ => QuoteState::Unquoted,
        };
    }
    state == QuoteState::Quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_table() {
        let table = parse_table(b"elapsed_time,dose\n0,1.0\n60,2.5\n120,4.0\n").unwrap();
        assert_eq!(table.headers, vec!["elapsed_time", "dose"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column(0).unwrap(), &["0", "60", "120"]);
        assert_eq!(table.column(1).unwrap(), &["1.0", "2.5", "4.0"]);
    }

    #[test]
    fn test_parse_trims_cells_and_headers() {
        let table = parse_table(b" time , dose \n 0 , 1.5 \n").unwrap();
        assert_eq!(table.headers, vec!["time", "dose"]);
        assert_eq!(table.column(1).unwrap(), &["1.5"]);
    }

    #[test]
    fn test_parse_strips_bom() {
        let table = parse_table(b"\xEF\xBB\xBFtime,dose\n0,1\n").unwrap();
        assert_eq!(table.headers[0], "time");
    }

    #[test]
    fn test_parse_quoted_fields() {
        let table = parse_table(b"\"time, s\",dose\n\"0\",\"1,5\"\n").unwrap();
        assert_eq!(table.headers[0], "time, s");
        assert_eq!(table.column(1).unwrap(), &["1,5"]);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let table = parse_table(b"time,dose\n0,1\n\n60,2\n").unwrap();
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_parse_header_only_is_empty_table() {
        let table = parse_table(b"time,dose\n").unwrap();
        assert_eq!(table.headers.len(), 2);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_parse_empty_input_fails() {
        assert!(matches!(parse_table(b""), Err(IngestError::Parse(_))));
        assert!(matches!(parse_table(b"  \n\n"), Err(IngestError::Parse(_))));
    }

    #[test]
    fn test_parse_ragged_rows_fail() {
        let err = parse_table(b"time,dose\n0,1,2\n").unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)));
        let err = parse_table(b"time,dose\n0\n").unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)));
    }

    #[test]
    fn test_parse_unterminated_quote_fails() {
        let err = parse_table(b"time,dose\n\"0,1\n60,2\n").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_parse_unterminated_quote_after_escaped_quote_fails() {
        let err = parse_table(b"time,dose,note\n0,1,\"say \"\"hi\"\"\n").unwrap_err();
        assert!(err.to_string().contains("unterminated"));
    }

    #[test]
    fn test_parse_stray_quote_inside_unquoted_field() {
        let table = parse_table(b"time,dose,note\n0,1.0,5\" tall\n60,2.0,x\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column(2).unwrap(), &["5\" tall", "x"]);
        assert_eq!(table.column(1).unwrap(), &["1.0", "2.0"]);
    }

    #[test]
    fn test_parse_escaped_quotes_in_quoted_field() {
        let table = parse_table(b"time,dose,note\n0,1,\"a \"\"b\"\" c\"\n").unwrap();
        assert_eq!(table.column(2).unwrap(), &["a \"b\" c"]);
    }

    #[test]
    fn test_parse_skips_whitespace_only_lines() {
        let table = parse_table(b"time,dose\n0,1\n   \n60,2\n\t\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column(0).unwrap(), &["0", "60"]);
    }

    #[test]
    fn test_parse_ragged_row_names_line() {
        let err = parse_table(b"time,dose\n0,1\n60,2,3\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_parse_invalid_utf8_fails() {
        let err = parse_table(b"time,dose\n0,\xFF\xFE\n").unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)));
    }
}
