/// Data layer: core types, loading, and type classification.
///
/// Architecture:
/// ```text
///     data.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table (per-column dtype inference)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<Column>, each Vec<Value> of one dtype
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  dtype → categorical / numerical name lists
///   └──────────┘
/// ```

pub mod classify;
pub mod loader;
pub mod model;
