//! Level-2 order book maintenance with crossed-book detection.
//!
//! The `book` module is the core: it loads a snapshot, applies ordered diff
//! batches, and reports when best bid >= best ask. The rest is plumbing
//! around it: a feed adapter, a single-writer engine, and a cross sink.

pub mod book;
pub mod config;
pub mod engine;
pub mod errors;
pub mod feed;
pub mod models;
pub mod sink;
pub mod utils;
