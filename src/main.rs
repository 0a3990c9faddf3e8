//! # near-dup CLI
//!
//! Command-line interface for the near-duplicate image finder.
//!
//! ## Usage
//! ```bash
//! near-dup scan ~/Photos --threshold 0.9
//! near-dup scan ~/Photos --recursive --output json
//! ```

mod cli;

use near_dup_finder::Result;

fn main() -> Result<()> {
    cli::run()
}
