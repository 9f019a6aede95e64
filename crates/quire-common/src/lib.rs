//! Common utilities for the quire layout engine.
//!
//! This crate provides shared infrastructure used by all quire components:
//! - **Warning System** - deduplicated reports of unsupported features

pub mod warning;
