//! Stylesheet compilers.

pub mod scss;
