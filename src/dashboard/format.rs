// src/dashboard/format.rs
//! Plain-text building blocks: number formatting, aligned tables, bar charts.

use std::fmt;

use crate::extractors::coerce::ColumnRole;
use crate::records::{Cell, RecordSet};

const MAX_CELL_WIDTH: usize = 40;
const BAR_WIDTH: usize = 40;

/// Rounds to a whole number and groups thousands with commas.
pub fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// How a cell is shown in the data table.
pub fn display_cell(cell: &Cell, role: Option<ColumnRole>) -> String {
    match (cell, role) {
        (Cell::Number(Some(n)), Some(ColumnRole::Revenue)) => format!("${} M", n.trunc() as i64),
        (Cell::Number(Some(n)), _) => format!("{}", n.trunc() as i64),
        (Cell::Number(None), _) => String::new(),
        (Cell::Text(s), _) => truncate(s, MAX_CELL_WIDTH),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max - 1).collect();
        cut.push('…');
        cut
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

/// Column-aligned table of every row, header first.
pub struct Table<'a>(pub &'a RecordSet);

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let records = self.0;
        let roles: Vec<Option<ColumnRole>> =
            (0..records.headers().len()).map(|i| records.column_role(i)).collect();

        let body: Vec<Vec<String>> = records
            .iter()
            .map(|row| {
                row.cells()
                    .iter()
                    .zip(&roles)
                    .map(|(cell, role)| display_cell(cell, *role))
                    .collect()
            })
            .collect();

        let headers: Vec<String> = records.headers().iter().map(|h| truncate(h, MAX_CELL_WIDTH)).collect();
        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                body.iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| pad(c, *w))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        writeln!(f, "{}", line(&headers))?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        writeln!(f, "{}", rule.join("-+-"))?;
        for row in &body {
            writeln!(f, "{}", line(row))?;
        }
        Ok(())
    }
}

/// Horizontal bars scaled to the largest value.
pub struct BarChart<'a> {
    pub title: &'a str,
    pub entries: &'a [(String, f64)],
}

impl fmt::Display for BarChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;

        let label_width = self
            .entries
            .iter()
            .map(|(label, _)| truncate(label, MAX_CELL_WIDTH).chars().count())
            .max()
            .unwrap_or(0);
        let max = self.entries.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);

        for (label, value) in self.entries {
            let len = if max > 0.0 {
                ((value / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            writeln!(
                f,
                "  {} {} {}",
                pad(&truncate(label, MAX_CELL_WIDTH), label_width),
                "█".repeat(len.max(usize::from(*value > 0.0))),
                group_thousands(*value)
            )?;
        }
        Ok(())
    }
}
