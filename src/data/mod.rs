/// Data layer: tables, the lock/temperature join, and bucket summaries.
///
/// Architecture:
/// ```text
///  archive entry bytes (.xlsx / .csv / .json / .parquet)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  lock table → TimeSet, temperature table → selected rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ summary   │  selected rows → bucket counts → text
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
