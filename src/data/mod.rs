/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet       (file absent)
///        │                                   │
///        ▼                                   ▼
///   ┌──────────┐                        ┌─────────┐
///   │  loader   │  parse → RawRecord     │  synth  │
///   └──────────┘                        └─────────┘
///        │            clean (drop incomplete rows)
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<Observation>, distinct values
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ filter/aggregate  │  Selection → ViewBundle  (view::render)
///   └──────────────────┘
/// ```

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod synth;
pub mod view;
