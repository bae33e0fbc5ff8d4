//! Data layer: observation tables, loading, and CCDF group selection.
//!
//! Architecture:
//! ```text
//!  .csv / .tsv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  discover files, parse → label → ObservationTable
//!   └──────────┘
//!        │
//!        ▼
//!   ┌─────────────────┐
//!   │ LabeledDatasets │  BTreeMap<label, ObservationTable>
//!   └─────────────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter  │  match dataset labels to CCDF groups by prefix
//!   └──────────┘
//! ```

pub mod loader;
pub mod model;
pub mod filter;
