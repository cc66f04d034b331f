// src/records/filter.rs
use serde::Serialize;

use super::{Cell, RecordSet};
use crate::extractors::coerce::ColumnRole;

/// Sentinel industry choice that disables the industry filter.
pub const ALL_INDUSTRIES: &str = "All";

/// User-selected narrowing of the Record Set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filters {
    /// Exact industry to keep; `None` keeps every industry.
    pub industry: Option<String>,
    /// Minimum revenue (same unit as the revenue column).
    pub min_revenue: f64,
}

impl Default for Filters {
    fn default() -> Self {
        Self { industry: None, min_revenue: 0.0 }
    }
}

impl Filters {
    pub fn new(industry: &str, min_revenue: f64) -> Self {
        let mut filters = Self { industry: None, min_revenue };
        filters.set_industry(industry);
        filters
    }

    /// `All` (any case) clears the industry filter.
    pub fn set_industry(&mut self, industry: &str) {
        let industry = industry.trim();
        self.industry = if industry.is_empty() || industry.eq_ignore_ascii_case(ALL_INDUSTRIES) {
            None
        } else {
            Some(industry.to_string())
        };
    }

    /// Rows passing every filter whose column exists in `set`.
    ///
    /// The revenue threshold is always applied when a revenue column is
    /// present, so rows with a missing revenue drop out even at 0.
    pub fn apply(&self, set: &RecordSet) -> RecordSet {
        let industry_col = set.role_column(ColumnRole::Industry);
        let revenue_col = set.role_column(ColumnRole::Revenue);

        set.filtered(|row| {
            let industry_ok = match (&self.industry, industry_col) {
                (Some(wanted), Some(col)) => {
                    matches!(row.get(col), Some(Cell::Text(v)) if v == wanted)
                }
                _ => true,
            };
            let revenue_ok = match revenue_col {
                Some(col) => row
                    .get(col)
                    .and_then(Cell::as_number)
                    .is_some_and(|v| v >= self.min_revenue),
                None => true,
            };
            industry_ok && revenue_ok
        })
    }
}

/// Distinct industry values, sorted, for building the selection list.
pub fn available_industries(set: &RecordSet) -> Vec<String> {
    let Some(col) = set.role_column(ColumnRole::Industry) else {
        return Vec::new();
    };
    let mut industries: Vec<String> = set
        .iter()
        .filter_map(|row| row.get(col).and_then(Cell::as_text))
        .map(str::to_string)
        .collect();
    industries.sort();
    industries.dedup();
    industries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::coerce::coerce_numeric_columns;

    fn sample() -> RecordSet {
        let mut set = RecordSet::new(
            ["Name", "Industry", "Revenue (USD millions)"].map(String::from).to_vec(),
        );
        for (name, industry, revenue) in [
            ("Small Co", "Retail", "100"),
            ("Big Co", "Energy", "5,000"),
            ("Mystery Co", "Retail", "n/a"),
            ("Huge Co", "Retail", "$9,000"),
        ] {
            set.push_row(vec![name.into(), industry.into(), revenue.into()]);
        }
        coerce_numeric_columns(&mut set);
        set
    }

    fn names(set: &RecordSet) -> Vec<String> {
        set.iter()
            .filter_map(|r| set.value(r, "Name").and_then(Cell::as_text).map(String::from))
            .collect()
    }

    #[test]
    fn minimum_revenue_keeps_rows_at_or_above_threshold() {
        let filtered = Filters::new(ALL_INDUSTRIES, 1000.0).apply(&sample());
        assert_eq!(names(&filtered), ["Big Co", "Huge Co"]);
    }

    #[test]
    fn missing_revenue_never_passes() {
        let filtered = Filters::default().apply(&sample());
        assert_eq!(names(&filtered), ["Small Co", "Big Co", "Huge Co"]);
    }

    #[test]
    fn industry_filter_is_exact_and_all_disables_it() {
        let retail = Filters::new("Retail", 0.0).apply(&sample());
        assert_eq!(names(&retail), ["Small Co", "Huge Co"]);

        let mut filters = Filters::new("retail", 0.0);
        assert!(filters.apply(&sample()).is_empty());
        filters.set_industry("all");
        assert_eq!(filters.industry, None);
        assert_eq!(filters.apply(&sample()).len(), 3);
    }

    #[test]
    fn filters_without_matching_columns_keep_everything() {
        let mut set = RecordSet::new(vec!["Name".to_string()]);
        set.push_row(vec!["Solo".into()]);
        assert_eq!(Filters::new("Retail", 1e9).apply(&set).len(), 1);
    }

    #[test]
    fn industries_are_sorted_and_unique() {
        assert_eq!(available_industries(&sample()), ["Energy", "Retail"]);
    }
}
