// src/records/mod.rs
//! The Record Set: column-aligned rows extracted from the source table.
//!
//! Every row carries exactly one cell per header, in header order. Rows that
//! do not fit are rejected at insertion time, so consumers never see ragged
//! data.

pub mod filter;
pub mod stats;

use std::fmt;

use crate::extractors::coerce::{role_for_header, ColumnRole};

/// A single cell, free text until its column is coerced.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// Coerced value; `None` is the missing marker.
    Number(Option<f64>),
}

impl Cell {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => *n,
            Cell::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            Cell::Number(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(Some(n)) => f.write_str(&format_number(*n)),
            Cell::Number(None) => Ok(()),
        }
    }
}

/// Integral values print without a fractional part, everything else as-is.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub(crate) fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordSet {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl RecordSet {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    /// Appends a row of raw cell text. Returns `false` (and stores nothing)
    /// when the cell count differs from the header count.
    pub fn push_row(&mut self, cells: Vec<String>) -> bool {
        if cells.len() != self.headers.len() {
            return false;
        }
        self.rows.push(Row {
            cells: cells.into_iter().map(Cell::Text).collect(),
        });
        true
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Position of the column with exactly this header text.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell of `row` under the column named `column`.
    pub fn value<'a>(&self, row: &'a Row, column: &str) -> Option<&'a Cell> {
        self.column_index(column).and_then(|i| row.get(i))
    }

    pub fn column_role(&self, index: usize) -> Option<ColumnRole> {
        self.headers.get(index).and_then(|h| role_for_header(h))
    }

    /// First column carrying `role`, if any.
    pub fn role_column(&self, role: ColumnRole) -> Option<usize> {
        (0..self.headers.len()).find(|&i| self.column_role(i) == Some(role))
    }

    /// New set with the same headers and only the rows accepted by `keep`.
    pub fn filtered<F>(&self, mut keep: F) -> RecordSet
    where
        F: FnMut(&Row) -> bool,
    {
        RecordSet {
            headers: self.headers.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
