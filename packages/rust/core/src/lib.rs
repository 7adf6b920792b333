//! Batch orchestration and domain logic for ContentFactory.
//!
//! This crate ties together table loading, related-link resolution, prompt
//! generation, markup conversion and artifact writing into one batch run
//! (see [`run_batch`]).

pub mod paths;
pub mod pipeline;
pub mod related;
pub mod table;

pub use paths::{full_url, slugify};
pub use pipeline::{BatchConfig, BatchProgress, BatchResult, SilentProgress, run_batch};
pub use related::related_links;
pub use table::{TableSchema, TopicTable, load_table, parse_table};
