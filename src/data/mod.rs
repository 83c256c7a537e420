/// Data layer: core types, loading, and preprocessing.
///
/// Architecture:
/// ```text
///  .parquet / .json / .csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SstaDataset
///   └──────────┘
///        │
///        ▼
///   ┌─────────────┐
///   │ SstaDataset  │  (space × time) matrix, coordinate axes
///   └─────────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ preprocess  │  zero non-finite entries, normalize
///   └────────────┘
/// ```

pub mod loader;
pub mod model;
pub mod preprocess;
