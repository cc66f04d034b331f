// src/dashboard/mod.rs
//! Text dashboard over a scraped Record Set.

pub mod format;

use std::fmt;

use crate::extractors::coerce::ColumnRole;
use crate::records::filter::{available_industries, Filters, ALL_INDUSTRIES};
use crate::records::stats::{industry_distribution, summarize, top_by};
use crate::records::RecordSet;
use self::format::{group_thousands, BarChart, Table};

const SECTION_RULE: &str = "----------------------------------------";

/// Options controlling what the dashboard shows.
#[derive(Debug, Clone)]
pub struct DashboardOptions {
    pub filters: Filters,
    /// Entries per ranking chart.
    pub top: usize,
}

/// Full dashboard: metrics over `records`, then the filtered table and charts.
pub struct Dashboard<'a> {
    pub records: &'a RecordSet,
    pub filtered: &'a RecordSet,
    pub options: &'a DashboardOptions,
}

impl fmt::Display for Dashboard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Successfully scraped data for {} companies!", self.records.len())?;
        write!(f, "{}", Metrics(self.records))?;

        writeln!(f, "{}", SECTION_RULE)?;
        write_filter_state(f, self.records, &self.options.filters)?;

        writeln!(f, "{}", SECTION_RULE)?;
        writeln!(f, "Company Data")?;
        write!(f, "{}", Table(self.filtered))?;

        if !self.filtered.is_empty() {
            writeln!(f, "{}", SECTION_RULE)?;
            write!(f, "{}", Charts { filtered: self.filtered, top: self.options.top })?;
        }

        writeln!(f, "{}", SECTION_RULE)?;
        writeln!(f, "Dataset contains {} companies", self.filtered.len())
    }
}

/// Headline metrics, each shown only when its column exists.
pub struct Metrics<'a>(pub &'a RecordSet);

impl fmt::Display for Metrics<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = summarize(self.0);
        writeln!(f, "Total Companies: {}", summary.total_companies)?;
        if let Some(revenue) = summary.total_revenue {
            writeln!(f, "Total Revenue:   ${}M", group_thousands(revenue))?;
        }
        if let Some(employees) = summary.total_employees {
            writeln!(f, "Total Employees: {}", group_thousands(employees))?;
        }
        if let Some(industries) = summary.industries {
            writeln!(f, "Industries:      {}", industries)?;
        }
        Ok(())
    }
}

fn write_filter_state(f: &mut fmt::Formatter<'_>, records: &RecordSet, filters: &Filters) -> fmt::Result {
    writeln!(f, "Filter Data")?;
    if records.role_column(ColumnRole::Industry).is_some() {
        let mut choices = vec![ALL_INDUSTRIES.to_string()];
        choices.extend(available_industries(records));
        writeln!(
            f,
            "  Industry: {} (choices: {})",
            filters.industry.as_deref().unwrap_or(ALL_INDUSTRIES),
            choices.join(", ")
        )?;
    }
    if records.role_column(ColumnRole::Revenue).is_some() {
        writeln!(f, "  Minimum Revenue (USD millions): {}", group_thousands(filters.min_revenue))?;
    }
    Ok(())
}

fn write_missing_columns(f: &mut fmt::Formatter<'_>, records: &RecordSet, what: &str) -> fmt::Result {
    writeln!(
        f,
        "  Could not find {} column(s). Available columns: {}",
        what,
        records.headers().join(", ")
    )
}

/// The three ranking/distribution charts.
pub struct Charts<'a> {
    pub filtered: &'a RecordSet,
    pub top: usize,
}

impl fmt::Display for Charts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (filtered, top) = (self.filtered, self.top);

        match top_by(filtered, ColumnRole::Revenue, top) {
            Some(entries) if !entries.is_empty() => {
                let title = format!("Top {} Companies by Revenue (USD millions)", top);
                write!(f, "{}", BarChart { title: &title, entries: &entries })?;
            }
            Some(_) => writeln!(f, "  No valid numeric revenue data found")?,
            None => write_missing_columns(f, filtered, "revenue or name")?,
        }

        match industry_distribution(filtered) {
            Some(counts) if !counts.is_empty() => {
                let entries: Vec<(String, f64)> =
                    counts.into_iter().map(|(name, n)| (name, n as f64)).collect();
                write!(f, "{}", BarChart { title: "Industry Distribution", entries: &entries })?;
            }
            Some(_) => writeln!(f, "  No industry data found")?,
            None => write_missing_columns(f, filtered, "industry")?,
        }

        match top_by(filtered, ColumnRole::Employees, top) {
            Some(entries) if !entries.is_empty() => {
                let title = format!("Top {} Employers", top);
                write!(f, "{}", BarChart { title: &title, entries: &entries })?;
            }
            Some(_) => writeln!(f, "  No valid employee data found")?,
            None => write_missing_columns(f, filtered, "employees or name")?,
        }

        Ok(())
    }
}

/// Single failure state shown when the fetch or extraction fails.
pub struct Failure<'a>(pub &'a str);

impl fmt::Display for Failure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Failed to scrape data. Please try refreshing.")?;
        writeln!(f, "  Error: {}", self.0)?;
        writeln!(f, "Possible reasons:")?;
        writeln!(f, "  - Wikipedia page structure has changed")?;
        writeln!(f, "  - Network connectivity issues")?;
        writeln!(f, "  - Rate limiting from Wikipedia")
    }
}
