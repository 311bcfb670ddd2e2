//! # plantfuse
//!
//! Multi-organ score fusion for plant identification.
//!
//! **Purpose:** Combine per-organ (entire plant, leaf, flower) class scores into
//! a single score vector per sample, predict the top-1 class, and measure
//! accuracy. AUTO mode searches integer weight ratios and max-pooling for the
//! best-performing fusion.
//!
//! **Architecture:** `table` → `fusion` → `evaluate` → `search`, with
//! `ingest`/`output` on the file boundary and `pipeline` tying a run together.

pub mod error;
pub mod evaluate;
pub mod fusion;
pub mod ingest;
pub mod mode;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod table;

pub use error::{Error, Result};
pub use evaluate::{evaluate, Accuracy};
pub use fusion::{fuse, Strategy, Weights};
pub use mode::RunMode;
pub use search::{search, search_parallel, SearchOutcome};
pub use table::{Organ, Sample, SampleTable};
