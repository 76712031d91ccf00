//! Output generation for one-shot runs.
//!
//! # Submodules
//!
//! - [`json`]: Writes the analysis payload to a dated JSON file
//! - [`text`]: Plain-text feed status and digest for the terminal

pub mod json;
pub mod text;
