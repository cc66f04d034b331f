// src/records/stats.rs
use std::collections::HashSet;

use super::{Cell, RecordSet};
use crate::extractors::coerce::ColumnRole;

/// Headline metrics. Each optional figure is present only when its column exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_companies: usize,
    pub total_revenue: Option<f64>,
    pub total_employees: Option<f64>,
    pub industries: Option<usize>,
}

/// Sum of present values in the first column with `role`; missing cells are skipped.
pub fn column_sum(set: &RecordSet, role: ColumnRole) -> Option<f64> {
    let col = set.role_column(role)?;
    Some(
        set.iter()
            .filter_map(|row| row.get(col).and_then(Cell::as_number))
            .sum(),
    )
}

pub fn summarize(set: &RecordSet) -> Summary {
    let industries = set.role_column(ColumnRole::Industry).map(|col| {
        set.iter()
            .filter_map(|row| row.get(col).and_then(Cell::as_text))
            .collect::<HashSet<_>>()
            .len()
    });

    Summary {
        total_companies: set.len(),
        total_revenue: column_sum(set, ColumnRole::Revenue),
        total_employees: column_sum(set, ColumnRole::Employees),
        industries,
    }
}

/// Up to `n` (name, value) pairs with the largest values in the `role`
/// column, rows with a missing value skipped. Ties keep table order.
/// `None` when the name or value column is absent.
pub fn top_by(set: &RecordSet, role: ColumnRole, n: usize) -> Option<Vec<(String, f64)>> {
    let value_col = set.role_column(role)?;
    let name_col = set.role_column(ColumnRole::Name)?;

    let mut ranked: Vec<(String, f64)> = set
        .iter()
        .filter_map(|row| {
            let value = row.get(value_col).and_then(Cell::as_number)?;
            let name = row.get(name_col).map(|c| c.to_string()).unwrap_or_default();
            Some((name, value))
        })
        .collect();

    // Stable sort, so equal values stay in table order.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(n);
    Some(ranked)
}

/// Row count per industry, most frequent first; ties by first appearance.
pub fn industry_distribution(set: &RecordSet) -> Option<Vec<(String, usize)>> {
    let col = set.role_column(ColumnRole::Industry)?;

    let mut counts: Vec<(String, usize)> = Vec::new();
    for industry in set.iter().filter_map(|row| row.get(col).and_then(Cell::as_text)) {
        match counts.iter_mut().find(|(name, _)| name == industry) {
            Some((_, count)) => *count += 1,
            None => counts.push((industry.to_string(), 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Some(counts)
}
