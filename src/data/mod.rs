/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  remote .csv / local .csv .json .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse → AuthorTable, "Unknown" for missing names
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  at most one load per session
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  country → institution → author → FilteredView
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  counts, rankings, means, map counts → AggregateSummary
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
