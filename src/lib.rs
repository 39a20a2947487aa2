//! Accessible-events reconciliation pipeline.
//!
//! Merges event listings from a venue scraper, a manually maintained
//! spreadsheet, and a staff-curated monthly sheet into one deduplicated
//! staged set, enriches it against venue and category reference tables,
//! classifies publishability, and exports the approved subset to a public
//! feed. Runs are idempotent: re-running over unchanged inputs rewrites the
//! same outputs.

pub mod categories;
pub mod constants;
pub mod domain;
pub mod error;
pub mod keys;
pub mod logging;
pub mod normalize;
pub mod pipeline;
pub mod schedule;
pub mod sheet;
pub mod sync;
pub mod venues;
