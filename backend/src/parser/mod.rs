//! Delimited text parser with encoding auto-detection.
//!
//! Turns raw bytes into a header row plus trimmed string cells. No
//! membership-specific logic here; column mapping happens in the pipeline.

use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Default field separator of membership change files.
pub const DEFAULT_DELIMITER: char = ';';

const UTF8_BOM: char = '\u{feff}';

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Column headers, trimmed
    pub headers: Vec<String>,
    /// Data rows; each row has exactly `headers.len()` cells
    pub rows: Vec<Vec<String>>,
    /// Detected encoding
    pub encoding: String,
    /// Delimiter used
    pub delimiter: char,
}

impl ParseResult {
    /// Position of a column in the header row.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let content = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(e) => return Err(CsvError::EncodingError(e.to_string())),
        },
        // WHATWG maps the latin-1 labels onto windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        // Unknown charset: keep what UTF-8 can make of it
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };

    Ok(content
        .strip_prefix(UTF8_BOM)
        .map(str::to_string)
        .unwrap_or(content))
}

/// Parse decoded text with an explicit delimiter.
///
/// Every cell is trimmed and short rows are padded with blanks. Lines that
/// are empty after trimming are skipped; a line of bare delimiters is kept
/// as a row of blanks. Extra cells beyond the header are only tolerated
/// when they are blank.
pub fn parse_str(content: &str, delimiter: char) -> CsvResult<(Vec<String>, Vec<Vec<String>>)> {
    if !delimiter.is_ascii() {
        return Err(CsvError::ParseError(format!(
            "Delimiter '{}' is not a single-byte character",
            delimiter
        )));
    }

    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::EmptyFile);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() == 1 && record[0].is_empty() {
            continue;
        }

        if record.iter().skip(headers.len()).any(|cell| !cell.is_empty()) {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(CsvError::ParseError(format!(
                "Expected {} fields in line {}, saw {}",
                headers.len(),
                line,
                record.len()
            )));
        }

        let row = (0..headers.len())
            .map(|i| record.get(i).unwrap_or("").to_string())
            .collect();
        rows.push(row);
    }

    Ok((headers, rows))
}

/// Parse CSV bytes with encoding auto-detection.
pub fn parse_bytes(bytes: &[u8], delimiter: char) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    // Valid UTF-8 wins over a statistical guess
    let encoding = if std::str::from_utf8(bytes).is_ok() {
        "utf-8".to_string()
    } else {
        detect_encoding(bytes)
    };
    let content = decode_content(bytes, &encoding)?;
    let (headers, rows) = parse_str(&content, delimiter)?;

    Ok(ParseResult {
        headers,
        rows,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file with encoding auto-detection.
pub fn parse_file<P: AsRef<Path>>(path: P, delimiter: char) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes(&bytes, delimiter)
}
