/// Data layer: core types, loading/cleaning, and aggregation.
///
/// Architecture:
/// ```text
///  movies.csv (remote URI or local file)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch + parse → quality report, drop incomplete rows
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ MovieTable  │  Vec<MovieRecord>, unique-value indexes, immutable
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  engine   │  (table, FilterSelection) → derived views, pure
///   └──────────┘
/// ```

pub mod engine;
pub mod loader;
pub mod model;
