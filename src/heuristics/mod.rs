//! Local text heuristics used by the extraction orchestrator.
//!
//! Pure functions, no async and no network. The keyword tables are hand-tuned
//! and kept verbatim; they are routing signals, not classifiers.

pub mod dish;
pub mod generic;
pub mod labels;
pub mod quantity;

pub use dish::is_likely_dish;
pub use generic::is_generic_list;
pub use labels::extract_from_vision;
pub use quantity::estimate_quantity;
