// src/extractors/table.rs

// --- Imports ---
use crate::extractors::coerce::coerce_numeric_columns;
use crate::records::RecordSet;
use crate::utils::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
const DATA_TABLE_CSS: &str = "table.wikitable.sortable";

static DATA_TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(DATA_TABLE_CSS).expect("Failed to compile DATA_TABLE_SELECTOR")
});

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("tr").expect("Failed to compile ROW_SELECTOR")
});

// --- Regex Patterns (Lazy Static) ---
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE")
});

// Citation markers like [1], [23]
static CITATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\d+\]").expect("Failed to compile CITATION_RE")
});

/// Turns the first sortable data table of a page into a coerced Record Set.
#[derive(Debug, Default)]
pub struct TableExtractor;

impl TableExtractor {
    pub fn new() -> Self { Self {} }

    /// Locates the table, reads headers and rows, then coerces numeric columns.
    /// Ragged rows are dropped; only a missing table or header row is an error.
    pub fn extract_record_set(&self, html_content: &str) -> Result<RecordSet, ExtractError> {
        // 1. Parse the HTML document
        let document = Html::parse_document(html_content);

        // 2. Locate the first sortable data table
        let table = document
            .select(&DATA_TABLE_SELECTOR)
            .next()
            .ok_or_else(|| ExtractError::TableNotFound(DATA_TABLE_CSS.to_string()))?;
        tracing::debug!("Found data table element: {:?}", table.id());

        // 3. Header row defines column order and count
        let mut rows = self.own_rows(table);
        let header_row = rows.next().ok_or(ExtractError::EmptyHeader)?;
        let headers = self.header_cells(header_row);
        if headers.is_empty() {
            return Err(ExtractError::EmptyHeader);
        }
        tracing::debug!("Extracted {} headers: {:?}", headers.len(), headers);

        // 4. Data rows, keyed by the header sequence
        let mut record_set = RecordSet::new(headers);
        let mut dropped = 0usize;
        for (offset, tr) in rows.enumerate() {
            let cells = self.row_cells(tr);
            let count = cells.len();
            if !record_set.push_row(cells) {
                dropped += 1;
                tracing::debug!(
                    "Dropping row {} with {} cells (expected {})",
                    offset + 1,
                    count,
                    record_set.headers().len()
                );
            }
        }

        // 5. Numeric coercion; never fails
        let nulled = coerce_numeric_columns(&mut record_set);

        tracing::info!(
            "Extracted {} rows ({} dropped, {} numeric cells missing)",
            record_set.len(),
            dropped,
            nulled
        );
        Ok(record_set)
    }

    /// Rows belonging to `table` itself, skipping rows of nested tables.
    fn own_rows<'a>(&self, table: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let table_id = table.id();
        table
            .select(&ROW_SELECTOR)
            .filter(move |tr| enclosing_table(*tr).map(|t| t.id()) == Some(table_id))
    }

    /// Header cell texts of the first row, whitespace-normalized.
    fn header_cells(&self, header_row: ElementRef) -> Vec<String> {
        cell_elements(header_row)
            .filter(|c| c.value().name() == "th")
            .map(|th| normalize_whitespace(&element_text(th)))
            .collect()
    }

    /// Every header or data cell of a body row, cleaned.
    fn row_cells(&self, tr: ElementRef) -> Vec<String> {
        cell_elements(tr)
            .map(|cell| clean_cell_text(&element_text(cell)))
            .collect()
    }
}

fn enclosing_table(tr: ElementRef) -> Option<ElementRef> {
    tr.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}

fn cell_elements<'a>(tr: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    tr.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "td" | "th"))
}

fn element_text(el: ElementRef) -> String {
    el.text().collect::<String>()
}

/// Collapses whitespace runs to single spaces and trims.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text, " ").trim().to_string()
}

/// Whitespace normalization plus removal of citation markers.
pub fn clean_cell_text(text: &str) -> String {
    let normalized = normalize_whitespace(text);
    CITATION_RE.replace_all(&normalized, "").trim().to_string()
}
