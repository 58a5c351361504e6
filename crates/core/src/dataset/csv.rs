//! Naive CSV parsing for uploaded datasets
//!
//! Comma-separated, no quoting or escaping. The first non-blank line is the
//! header; every later non-blank line is one row. Short rows are padded with
//! empty cells to the header width, long rows are truncated.

use crate::error::{Error, Result};

/// A parsed dataset, held only for the lifetime of one session.
///
/// Replaced wholesale on every upload, never persisted.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

        let header_line = lines
            .next()
            .ok_or_else(|| Error::Csv("CSV file is empty.".to_string()))?;

        let headers: Vec<String> = header_line
            .split(',')
            .map(|h| h.trim().to_string())
            .collect();

        for (i, name) in headers.iter().enumerate() {
            if headers[..i].contains(name) {
                return Err(Error::Csv(format!("Duplicate column name: {}", name)));
            }
        }

        let width = headers.len();
        let rows = lines
            .map(|line| {
                let mut cells: Vec<String> =
                    line.split(',').map(|v| v.trim().to_string()).collect();
                cells.resize(width, String::new());
                cells
            })
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let col = self.headers.iter().position(|h| h == column)?;
        self.rows.get(row).map(|r| r[col].as_str())
    }

    /// First `n` rows, for the preview table.
    pub fn preview(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(n)]
    }
}
