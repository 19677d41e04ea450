// src/csv.rs
//
// Just enough CSV for the ledger file: `"`-quoting with `""` escapes, LF or
// CRLF line ends, blank lines ignored.

use std::io::{self, Write};

pub const SEP: char = ',';

/// One parsed row and the (1-based) line it started on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

/* ---------------- Parsing ---------------- */

#[derive(Default)]
struct RowBuilder {
    fields: Vec<String>,
    field: String,
    quoted: bool,
    start_line: usize,
}

impl RowBuilder {
    fn end_field(&mut self) {
        self.fields.push(std::mem::take(&mut self.field));
    }

    /// Close the row; a row holding a single empty field is a blank line.
    fn end_row(&mut self, out: &mut Vec<Record>) {
        self.end_field();
        let fields = std::mem::take(&mut self.fields);
        if fields.len() > 1 || !fields[0].is_empty() {
            out.push(Record { line: self.start_line, fields });
        }
    }
}

/// Parse `text` into records. `Err(line)` means a quoted field opened on
/// `line` never closed: for an append-only file, a cut-short last write.
pub fn parse_records(text: &str, sep: char) -> Result<Vec<Record>, usize> {
    let mut out = Vec::new();
    let mut b = RowBuilder { start_line: 1, ..RowBuilder::default() };
    let mut line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if b.quoted {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    b.field.push('"');
                }
                '"' => b.quoted = false,
                _ => {
                    if ch == '\n' {
                        line += 1;
                    }
                    b.field.push(ch);
                }
            }
            continue;
        }
        match ch {
            '"' => b.quoted = true,
            '\r' | '\n' => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                b.end_row(&mut out);
                line += 1;
                b.start_line = line;
            }
            c if c == sep => b.end_field(),
            c => b.field.push(c),
        }
    }

    if b.quoted {
        return Err(b.start_line);
    }
    if !b.field.is_empty() || !b.fields.is_empty() {
        b.end_row(&mut out);
    }
    Ok(out)
}

/* ---------------- Writing ---------------- */

fn quote(cell: &str, sep: char) -> std::borrow::Cow<'_, str> {
    if cell.contains([sep, '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\"")).into()
    } else {
        cell.into()
    }
}

/// Write one newline-terminated row.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S], sep: char) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            write!(w, "{sep}")?;
        }
        w.write_all(quote(cell.as_ref(), sep).as_bytes())?;
    }
    w.write_all(b"\n")
}

/// One row as bytes, so the ledger can append it with a single write.
pub fn row_bytes<S: AsRef<str>>(row: &[S], sep: char) -> Vec<u8> {
    let mut buf = Vec::with_capacity(32);
    // Vec<u8> as io::Write never errors.
    let _ = write_row(&mut buf, row, sep);
    buf
}
