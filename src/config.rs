use clap::Parser;

use crate::data::loader::DataSource;
use crate::data::model::{AUTHOR_COLUMN, COUNTRY_COLUMN, INSTITUTION_COLUMN, RANK_COLUMN};
use crate::data::stats::SummaryOptions;

/// Published export of the author ranking table.
pub const DEFAULT_SOURCE_URL: &str =
    "https://drive.google.com/uc?id=1Eyaz5WozXoqHu-6X82Dc5GlwHbI99-7g";

/// Columns shown in the results table, when present.
pub const DISPLAY_COLUMNS: [&str; 4] = [AUTHOR_COLUMN, INSTITUTION_COLUMN, RANK_COLUMN, COUNTRY_COLUMN];

#[derive(Debug, Parser)]
#[command(version, about = "Filter and chart academic author rankings")]
pub struct Cli {
    /// CSV URL, or a local .csv / .json / .parquet file
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    pub source: String,

    /// Length of the country and institution rankings
    #[arg(long, default_value_t = 5)]
    pub top_n: usize,

    /// Number of bins in the rank histogram
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..))]
    pub histogram_bins: u16,
}

/// Resolved settings for one run of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub source: DataSource,
    pub summary: SummaryOptions,
    pub display_columns: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: DataSource::Url(DEFAULT_SOURCE_URL.to_string()),
            summary: SummaryOptions::default(),
            display_columns: DISPLAY_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl From<Cli> for DashboardConfig {
    fn from(cli: Cli) -> Self {
        let defaults = Self::default();
        Self {
            source: DataSource::parse(&cli.source),
            summary: SummaryOptions {
                top_n: cli.top_n,
                histogram_bins: cli.histogram_bins as usize,
                ..defaults.summary
            },
            ..defaults
        }
    }
}
