//! Utility functions and structures.

pub mod amp;
pub mod compile;
pub mod minify;
pub mod path;
pub mod pipeline;
pub mod targets;
