// src/extractors/coerce.rs

// --- Imports ---
use crate::records::{Cell, RecordSet};
use once_cell::sync::Lazy;
use regex::Regex;

/// Semantic kind of a column, derived from its header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Monetary figures, coerced to decimal numbers.
    Revenue,
    /// Headcounts, coerced to whole numbers.
    Employees,
    Industry,
    Name,
}

impl ColumnRole {
    /// Whether cells of this column are converted to numbers.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnRole::Revenue | ColumnRole::Employees)
    }
}

// --- Role Table ---
// Ordered; the first rule with a keyword contained in the lowercased header wins.
static ROLE_RULES: &[(&[&str], ColumnRole)] = &[
    (&["revenue", "usd"], ColumnRole::Revenue),
    (&["employee"], ColumnRole::Employees),
    (&["industry", "sector"], ColumnRole::Industry),
    (&["name", "company"], ColumnRole::Name),
];

// --- Regex Patterns (Lazy Static) ---
static REVENUE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+\.?\d*").expect("Failed to compile REVENUE_NUMBER_RE")
});

static EMPLOYEE_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+").expect("Failed to compile EMPLOYEE_NUMBER_RE")
});

/// Role of the column with this header, if any rule matches.
pub fn role_for_header(header: &str) -> Option<ColumnRole> {
    let lowered = header.to_lowercase();
    ROLE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, role)| *role)
}

fn is_currency_symbol(c: char) -> bool {
    matches!(c, '$' | '€' | '£' | '¥')
}

/// First number in a revenue cell after dropping separators, currency
/// symbols and whitespace. `None` when nothing numeric is left.
pub fn coerce_revenue(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|&c| c != ',' && !is_currency_symbol(c) && !c.is_whitespace())
        .collect();
    REVENUE_NUMBER_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// First run of digits in an employee cell after dropping separators and whitespace.
pub fn coerce_employees(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|&c| c != ',' && !c.is_whitespace())
        .collect();
    EMPLOYEE_NUMBER_RE
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Converts every text cell of the numeric columns in place.
/// Cells without a usable number become missing; this never fails.
/// Returns how many cells ended up missing.
pub fn coerce_numeric_columns(set: &mut RecordSet) -> usize {
    let targets: Vec<(usize, ColumnRole)> = (0..set.headers().len())
        .filter_map(|i| set.column_role(i).filter(|r| r.is_numeric()).map(|r| (i, r)))
        .collect();

    let mut nulled = 0;
    for row in set.rows_mut() {
        for &(index, role) in &targets {
            let Some(cell) = row.cell_mut(index) else { continue };
            let Cell::Text(raw) = cell else { continue };
            let value = match role {
                ColumnRole::Revenue => coerce_revenue(raw),
                _ => coerce_employees(raw),
            };
            if value.is_none() {
                tracing::debug!("No numeric value in '{}', marking missing", raw);
                nulled += 1;
            }
            *cell = Cell::Number(value);
        }
    }

    for &(index, role) in &targets {
        tracing::debug!("Coerced column '{}' as {:?}", set.headers()[index], role);
    }
    nulled
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_follow_rule_order() {
        assert_eq!(role_for_header("Revenue (USD millions)"), Some(ColumnRole::Revenue));
        assert_eq!(role_for_header("Revenue growth"), Some(ColumnRole::Revenue));
        assert_eq!(role_for_header("USD"), Some(ColumnRole::Revenue));
        assert_eq!(role_for_header("Employees"), Some(ColumnRole::Employees));
        assert_eq!(role_for_header("Industry"), Some(ColumnRole::Industry));
        assert_eq!(role_for_header("Sector"), Some(ColumnRole::Industry));
        assert_eq!(role_for_header("Company name"), Some(ColumnRole::Name));
        assert_eq!(role_for_header("Headquarters"), None);
        assert_eq!(role_for_header("Rank"), None);
    }

    #[test]
    fn revenue_strips_currency_and_separators() {
        assert_eq!(coerce_revenue("$12,345"), Some(12345.0));
        assert_eq!(coerce_revenue("$500,000"), Some(500000.0));
        assert_eq!(coerce_revenue("611,289.5"), Some(611289.5));
        assert_eq!(coerce_revenue("US$ 1 234"), Some(1234.0));
    }

    #[test]
    fn revenue_takes_first_numeric_substring() {
        assert_eq!(coerce_revenue("approx. 42.7 bn (2023)"), Some(42.7));
        assert_eq!(coerce_revenue("7."), Some(7.0));
    }

    #[test]
    fn employees_take_leading_digits_only() {
        assert_eq!(coerce_employees("1,000"), Some(1000.0));
        assert_eq!(coerce_employees("120,000"), Some(120000.0));
        assert_eq!(coerce_employees("2,100,000 employees"), Some(2100000.0));
        assert_eq!(coerce_employees("12.5"), Some(12.0));
    }

    #[test]
    fn cells_without_digits_become_missing() {
        assert_eq!(coerce_revenue("N/A"), None);
        assert_eq!(coerce_employees("N/A"), None);
        assert_eq!(coerce_revenue(""), None);
    }

    #[test]
    fn overflowing_digit_runs_become_missing() {
        let huge = "9".repeat(400);
        assert_eq!(coerce_revenue(&huge), None);
        assert_eq!(coerce_employees(&huge), None);
        assert_eq!(coerce_revenue(&format!("${}.5", huge)), None);
    }

    #[test]
    fn coercion_touches_only_numeric_columns() {
        let mut set = RecordSet::new(vec![
            "Name".to_string(),
            "Revenue (USD millions)".to_string(),
            "Employees".to_string(),
        ]);
        set.push_row(vec!["Acme 2000".into(), "$500,000".into(), "N/A".into()]);

        let nulled = coerce_numeric_columns(&mut set);
        let row = &set.rows()[0];
        assert_eq!(nulled, 1);
        assert_eq!(row.get(0), Some(&Cell::Text("Acme 2000".into())));
        assert_eq!(row.get(1), Some(&Cell::Number(Some(500000.0))));
        assert_eq!(row.get(2), Some(&Cell::Number(None)));

        // Already-coerced cells are left alone on a second pass.
        let snapshot = set.clone();
        assert_eq!(coerce_numeric_columns(&mut set), 0);
        assert_eq!(set, snapshot);
    }
}
