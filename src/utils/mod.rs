//! # Utility Modules
//!
//! Supporting utilities for compression, logging, and metrics.
//!
//! ## Components
//! - **Compression**: the `Compressor` capability plus LZ4 and Zstd providers
//! - **Logging**: Structured logging configuration
//! - **Metrics**: Thread-safe observability counters
//!
//! ## Security
//! - Decompression bomb protection (16MB limit)

pub mod compression;
pub mod logging;
pub mod metrics;
