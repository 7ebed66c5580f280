//! Observability and Metrics
//!
//! Counters for codec throughput and failures, plus a drop-timer for
//! measuring individual operations.
//!
//! Uses atomic counters for thread-safe metrics collection.

use crate::error::CodecError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Metrics collector for codec operations
#[derive(Debug)]
pub struct Metrics {
    /// Successful encode calls
    pub encodes_total: AtomicU64,
    /// Successful decode calls
    pub decodes_total: AtomicU64,
    /// Bytes produced by encode calls
    pub bytes_encoded: AtomicU64,
    /// Bytes consumed by decode calls
    pub bytes_decoded: AtomicU64,
    /// Failed encode calls
    pub encode_errors: AtomicU64,
    /// Failed decode calls
    pub decode_errors: AtomicU64,
    /// Decodes rejected by the content hash
    pub integrity_failures: AtomicU64,
    /// Calls aborted by the nesting ceiling
    pub nesting_failures: AtomicU64,
    /// Decodes whose frames did not fit the expected shape
    pub shape_failures: AtomicU64,
    /// Buffers passed through the compressor
    pub compression_total: AtomicU64,
    /// Buffers passed through the decompressor
    pub decompression_total: AtomicU64,
    /// Buffers sent by the transfer helpers
    pub buffers_sent: AtomicU64,
    /// Buffers received by the transfer helpers
    pub buffers_received: AtomicU64,
    /// Start time for uptime calculation
    start_time: Instant,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            encodes_total: AtomicU64::new(0),
            decodes_total: AtomicU64::new(0),
            bytes_encoded: AtomicU64::new(0),
            bytes_decoded: AtomicU64::new(0),
            encode_errors: AtomicU64::new(0),
            decode_errors: AtomicU64::new(0),
            integrity_failures: AtomicU64::new(0),
            nesting_failures: AtomicU64::new(0),
            shape_failures: AtomicU64::new(0),
            compression_total: AtomicU64::new(0),
            decompression_total: AtomicU64::new(0),
            buffers_sent: AtomicU64::new(0),
            buffers_received: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a successful encode producing `byte_count` bytes
    pub fn encode_success(&self, byte_count: u64) {
        self.encodes_total.fetch_add(1, Ordering::Relaxed);
        self.bytes_encoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a successful decode of `byte_count` bytes
    pub fn decode_success(&self, byte_count: u64) {
        self.decodes_total.fetch_add(1, Ordering::Relaxed);
        self.bytes_decoded.fetch_add(byte_count, Ordering::Relaxed);
    }

    /// Record a failed encode
    pub fn encode_failed(&self, error: &CodecError) {
        self.encode_errors.fetch_add(1, Ordering::Relaxed);
        self.classify(error);
    }

    /// Record a failed decode
    pub fn decode_failed(&self, error: &CodecError) {
        self.decode_errors.fetch_add(1, Ordering::Relaxed);
        self.classify(error);
    }

    fn classify(&self, error: &CodecError) {
        let counter = match error {
            CodecError::IntegrityMismatch => &self.integrity_failures,
            CodecError::NestingExceeded { .. } => &self.nesting_failures,
            CodecError::ShapeMismatch(_) | CodecError::Truncated { .. } => &self.shape_failures,
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a compression pass
    pub fn compression_attempt(&self) {
        self.compression_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a decompression pass
    pub fn decompression_attempt(&self) {
        self.decompression_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a buffer sent over a transport
    pub fn buffer_sent(&self) {
        self.buffers_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a buffer received over a transport
    pub fn buffer_received(&self) {
        self.buffers_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            encodes_total: self.encodes_total.load(Ordering::Relaxed),
            decodes_total: self.decodes_total.load(Ordering::Relaxed),
            bytes_encoded: self.bytes_encoded.load(Ordering::Relaxed),
            bytes_decoded: self.bytes_decoded.load(Ordering::Relaxed),
            encode_errors: self.encode_errors.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            integrity_failures: self.integrity_failures.load(Ordering::Relaxed),
            nesting_failures: self.nesting_failures.load(Ordering::Relaxed),
            shape_failures: self.shape_failures.load(Ordering::Relaxed),
            compression_total: self.compression_total.load(Ordering::Relaxed),
            decompression_total: self.decompression_total.load(Ordering::Relaxed),
            buffers_sent: self.buffers_sent.load(Ordering::Relaxed),
            buffers_received: self.buffers_received.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    /// Log current metrics
    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            encodes_total = snapshot.encodes_total,
            decodes_total = snapshot.decodes_total,
            bytes_encoded = snapshot.bytes_encoded,
            bytes_decoded = snapshot.bytes_decoded,
            encode_errors = snapshot.encode_errors,
            decode_errors = snapshot.decode_errors,
            integrity_failures = snapshot.integrity_failures,
            nesting_failures = snapshot.nesting_failures,
            shape_failures = snapshot.shape_failures,
            compression_total = snapshot.compression_total,
            decompression_total = snapshot.decompression_total,
            buffers_sent = snapshot.buffers_sent,
            buffers_received = snapshot.buffers_received,
            uptime_seconds = snapshot.uptime_seconds,
            "Codec metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub encodes_total: u64,
    pub decodes_total: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
    pub encode_errors: u64,
    pub decode_errors: u64,
    pub integrity_failures: u64,
    pub nesting_failures: u64,
    pub shape_failures: u64,
    pub compression_total: u64,
    pub decompression_total: u64,
    pub buffers_sent: u64,
    pub buffers_received: u64,
    pub uptime_seconds: u64,
}

/// Global metrics instance (lazy static for simplicity)
static METRICS: once_cell::sync::Lazy<Metrics> = once_cell::sync::Lazy::new(Metrics::new);

/// Get the global metrics instance
pub fn global_metrics() -> &'static Metrics {
    &METRICS
}

/// Initialize metrics collection (call once at startup)
pub fn init_metrics() {
    let _ = global_metrics();
    info!("Metrics collection initialized");
}

/// Timer for measuring operation duration
pub struct Timer {
    start: Instant,
    operation: &'static str,
}

impl Timer {
    /// Start timing an operation
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        debug!(
            operation = self.operation,
            duration_us = duration.as_micros() as u64,
            "Operation completed"
        );
    }
}
