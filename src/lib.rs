//! Core library for `calltally`.
//!
//! This crate records one immutable [`record::CallRecord`] per observed call
//! to a named service endpoint and answers aggregate queries over the
//! accumulated history: the most recently recorded call, the most-called
//! endpoint, and per-endpoint call counts. Persistence sits behind the
//! [`store::CallStore`] trait; a sqlite-backed store and an in-memory store
//! are provided. The surrounding request-handling layer (HTTP routing,
//! process startup) is expected to live outside this crate.
pub mod aggregator;
pub mod config;
pub mod error;
pub mod logger;
pub mod record;
pub mod recorder;
pub mod store;

pub use aggregator::Aggregator;
pub use record::{CallRecord, EndpointCount};
pub use recorder::Recorder;
