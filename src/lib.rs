//! # Near-Duplicate Image Finder
//!
//! Finds visually similar images in a directory and clusters them.
//!
//! ## How It Works
//! Every image gets a difference-hash fingerprint. Fingerprints are split
//! into LSH bands so that only images agreeing exactly on some band are
//! compared. Candidates scoring strictly above the similarity threshold
//! are reported and merged into clusters with union-find.
//!
//! ## Architecture
//! - `core` - The detection engine
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - Error types
//!
//! ## Example
//! ```rust,ignore
//! let pairs = near_dup_finder::find_near_duplicates("photos", 0.9, 16, 16, false)?;
//! for group in near_dup_finder::group_similar_images(&pairs) {
//!     println!("{:?}", group.photos);
//! }
//! ```

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use crate::core::comparator::{DuplicateGroup, NearDuplicate};
pub use crate::core::pipeline::{
    find_near_duplicates, group_similar_images, Pipeline, PipelineBuilder, PipelineConfig,
    PipelineResult, SkippedFile,
};
pub use crate::core::remover::{delete_files, DeletionReport};
pub use error::{DuplicateFinderError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG` wins
/// when set; otherwise `verbose` selects `debug` over `warn`. Calling it
/// twice keeps the first subscriber.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
