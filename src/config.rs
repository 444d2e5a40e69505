//! Configuration module.
//!
//! Re-exports the term-decor-config crate so callers can use `crate::config::*`.

pub use term_decor_config::*;
