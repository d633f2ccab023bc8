//! Core types and trait definitions for the offline title catalog.
//!
//! This crate is deliberately free of HTTP and database dependencies. It
//! describes the two source datasets, how their rows are projected into the
//! title table, and the read-side [`catalog::TitleCatalog`] abstraction.

// Native `async fn` in traits; see `catalog`.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod dataset;
pub mod error;
pub mod metadata;
pub mod progress;
pub mod stage;
pub mod title;
pub mod tsv;

pub use error::{Error, Result};
