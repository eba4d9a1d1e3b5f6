//! Whole-file transformations built on the batch and file model.
//!
//! - [`segment_file`] splits a file into a credit-only and a debit-only file.
//! - [`merge_files`] packs the batches of many files into as few files as
//!   the [`MergeOpts`] ceilings allow.

mod merge;
mod segment;

pub use merge::{MergeOpts, Merged, Placement, merge_files};
pub use segment::{SegmentConfig, segment_file};
