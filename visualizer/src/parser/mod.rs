//! CSV loader with encoding and delimiter auto-detection.
//!
//! Rows are checked against the fixed [`SCHEMA`] while they are read: a
//! missing header fails before any row is touched, a cell that does not fit
//! its semantic type fails with line, column and value.

use std::path::Path;

use crate::logs::log_warning;
use crate::models::{Field, FieldKind, Record, SCHEMA};

/// CSV parsing error with context
#[derive(Debug, Clone)]
pub struct CsvError {
    pub line: usize,
    pub column: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

impl std::fmt::Display for CsvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.column, &self.value) {
            (Some(col), Some(val)) => {
                write!(f, "Line {}, column '{}' (value '{}'): {}", self.line, col, val, self.message)
            }
            (Some(col), None) => {
                write!(f, "Line {}, column '{}': {}", self.line, col, self.message)
            }
            _ => {
                write!(f, "Line {}: {}", self.line, self.message)
            }
        }
    }
}

impl std::error::Error for CsvError {}

impl CsvError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Whether this error is a missing-header lookup failure.
    pub fn is_missing_column(&self) -> bool {
        self.line == 1 && self.column.is_some() && self.message == "Missing column"
    }
}

impl From<csv::Error> for CsvError {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
        CsvError::new(line, e.to_string())
    }
}

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed, schema-checked records
    pub records: Vec<Record>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
    /// Column headers as found in the file
    pub headers: Vec<String>,
    /// Header columns that are not part of the schema
    pub ignored_columns: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "iso-8859-15" | "latin-9" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        // encoding_rs treats Latin-1 as its superset windows-1252
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        "iso-8859-15" | "latin-9" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        // Unknown charset: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Map every schema field to its header position.
///
/// Fails on the first schema column absent from `headers`.
pub fn resolve_headers(headers: &[String]) -> Result<Vec<(Field, FieldKind, usize)>, CsvError> {
    SCHEMA
        .iter()
        .map(|&(field, kind)| {
            headers
                .iter()
                .position(|h| h == field.name())
                .map(|idx| (field, kind, idx))
                .ok_or_else(|| CsvError::new(1, "Missing column").with_column(field.name()))
        })
        .collect()
}

/// Parse one cell according to its semantic type.
pub fn parse_cell(field: Field, kind: FieldKind, raw: &str, line: usize) -> Result<f64, CsvError> {
    let raw = raw.trim().trim_matches('"');
    let fail = |message: &str| {
        CsvError::new(line, message)
            .with_column(field.name())
            .with_value(raw)
    };

    if raw.is_empty() {
        return Err(fail("Missing value"));
    }

    let value: f64 = raw.parse().map_err(|_| fail("Not a number"))?;
    if !value.is_finite() {
        return Err(fail("Not a finite number"));
    }

    if kind.is_integral() && value.fract() != 0.0 {
        return Err(fail("Expected an integer code"));
    }
    if kind == FieldKind::Binary && value != 0.0 && value != 1.0 {
        return Err(fail("Expected 0 or 1"));
    }

    Ok(value)
}

/// Parse CSV text with an explicit delimiter into schema-checked records.
///
/// # Example
/// ```ignore
/// let (headers, records) = parse_str(content, ',')?;
/// println!("{} columns, {} records", headers.len(), records.len());
/// ```
pub fn parse_str(content: &str, delimiter: char) -> Result<(Vec<String>, Vec<Record>), CsvError> {
    if content.trim().is_empty() {
        return Err(CsvError::new(1, "Empty CSV file"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_matches('"').to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::new(1, "No headers found"));
    }

    let columns = resolve_headers(&headers)?;

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        let line = row
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        let mut record = Record::empty(line);
        for &(field, kind, col) in &columns {
            let raw = row.get(col).unwrap_or("");
            record.set(field, parse_cell(field, kind, raw, line)?);
        }
        records.push(record);
    }

    Ok((headers, records))
}

/// Parse a CSV file with auto-detection of encoding and delimiter.
///
/// # Example
/// ```ignore
/// let result = parse_csv_file_auto("medical_examination.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Records: {}", result.records.len());
/// ```
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> Result<ParseResult, CsvError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| CsvError::new(0, format!("Cannot read file '{}': {}", path.display(), e)))?;

    parse_bytes_auto(&bytes)
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> Result<ParseResult, CsvError> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    parse_string_with_metadata(&content, delimiter, encoding)
}

/// Parse CSV string with explicit delimiter and return metadata.
pub fn parse_string_with_metadata(
    content: &str,
    delimiter: char,
    encoding: String,
) -> Result<ParseResult, CsvError> {
    let (headers, records) = parse_str(content, delimiter)?;

    let ignored_columns: Vec<String> = headers
        .iter()
        .filter(|h| !SCHEMA.iter().any(|(f, _)| f.name() == h.as_str()))
        .cloned()
        .collect();
    for col in &ignored_columns {
        log_warning(format!("Ignoring column '{}' (not in schema)", col));
    }

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
        ignored_columns,
    })
}
