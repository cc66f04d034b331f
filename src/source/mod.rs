// src/source/mod.rs
pub mod client;

/// The page the dashboard scrapes unless `--url` overrides it.
pub const DEFAULT_SOURCE_URL: &str =
    "https://en.wikipedia.org/wiki/List_of_largest_companies_in_the_United_States_by_revenue";
