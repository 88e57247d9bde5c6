//! Core traits for qbreview storage backends.

mod kv_store;

pub use kv_store::*;
