//! Line-oriented tokenizer for the comma-delimited source format.
//!
//! Quoting rules:
//!   - `"` toggles a quoted span; the quote characters are not emitted.
//!   - `""` inside a quoted span is one literal quote.
//!   - Commas inside a quoted span belong to the field.
//!   - Whitespace outside quoted spans is trimmed from both ends.
//!   - An unclosed quote closes implicitly at end of line.

use crate::error::{MonitorError, MonitorResult};

/// One non-blank data line, split into fields.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// 1-based position relative to the header line.
    pub row: usize,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub header: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

/// Split a single line into fields. Never fails.
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = FieldBuf::default();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                chars.next();
                field.text.push('"');
            }
            '"' => {
                in_quotes = !in_quotes;
                if in_quotes {
                    field.open_quote();
                } else {
                    field.close_quote();
                }
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut field).finish()),
            _ => field.text.push(ch),
        }
    }
    if in_quotes {
        field.close_quote();
    }
    fields.push(field.finish());
    fields
}

/// Parse a whole document: normalise line endings, drop blank lines,
/// take the first non-blank line as the header.
pub fn parse_document(text: &str) -> MonitorResult<ParsedDocument> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines = normalized
        .split('\n')
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (header_index, header_line) = lines.next().ok_or(MonitorError::EmptyDocument)?;
    let header = parse_line(header_line);

    let rows = lines
        .map(|(index, line)| ParsedRow {
            row: index - header_index,
            fields: parse_line(line),
        })
        .collect();

    Ok(ParsedDocument { header, rows })
}

/// Accumulates one field and remembers which byte range came from quoted
/// spans, so trimming only touches the unquoted edges.
#[derive(Default)]
struct FieldBuf {
    text: String,
    quoted_from: Option<usize>,
    quoted_to: usize,
}

impl FieldBuf {
    fn open_quote(&mut self) {
        if self.quoted_from.is_none() {
            self.quoted_from = Some(self.text.len());
        }
    }

    fn close_quote(&mut self) {
        self.quoted_to = self.text.len();
    }

    fn finish(self) -> String {
        match self.quoted_from {
            None => self.text.trim().to_string(),
            Some(from) => {
                let to = self.quoted_to.max(from);
                let mut out = String::with_capacity(self.text.len());
                out.push_str(self.text[..from].trim_start());
                out.push_str(&self.text[from..to]);
                out.push_str(self.text[to..].trim_end());
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_fields_and_trims() {
        assert_eq!(parse_line(" 1 ,PAYMENT,  9839.64"), vec!["1", "PAYMENT", "9839.64"]);
    }

    #[test]
    fn quoted_commas_stay_in_field() {
        assert_eq!(
            parse_line(r#"a,"b, c",d"#),
            vec!["a", "b, c", "d"]
        );
    }

    #[test]
    fn doubled_quote_is_literal() {
        assert_eq!(
            parse_line(r#""say ""hi""",x"#),
            vec![r#"say "hi""#, "x"]
        );
    }

    #[test]
    fn whitespace_inside_quotes_is_kept() {
        assert_eq!(parse_line(r#"  "  padded  "  ,y"#), vec!["  padded  ", "y"]);
    }

    #[test]
    fn unclosed_quote_closes_at_end_of_line() {
        assert_eq!(parse_line(r#"a,"open, still open"#), vec!["a", "open, still open"]);
    }

    #[test]
    fn empty_fields_are_preserved() {
        assert_eq!(parse_line("a,,c,"), vec!["a", "", "c", ""]);
    }

    #[test]
    fn document_skips_blank_lines_and_normalises_endings() {
        let doc = parse_document("h1,h2\r\n\r\n1,2\r3,4\n   \n5,6\n").unwrap();
        assert_eq!(doc.header, vec!["h1", "h2"]);
        let fields: Vec<Vec<String>> = doc.rows.iter().map(|r| r.fields.clone()).collect();
        assert_eq!(fields, vec![vec!["1", "2"], vec!["3", "4"], vec!["5", "6"]]);
        let rows: Vec<usize> = doc.rows.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![2, 3, 5]);
    }

    #[test]
    fn leading_blank_lines_before_header() {
        let doc = parse_document("\n\nstep,type\n1,PAYMENT").unwrap();
        assert_eq!(doc.header, vec!["step", "type"]);
        assert_eq!(doc.rows[0].row, 1);
    }

    #[test]
    fn blank_document_is_rejected() {
        assert!(matches!(parse_document(" \n\r\n"), Err(MonitorError::EmptyDocument)));
    }
}
