//! # Transfer Helpers
//!
//! Moves encoded buffers over reliable byte streams.
//!
//! An encoded buffer carries no length hint for the transport, so one
//! connection carries exactly one buffer: the sender writes it and shuts down
//! its write half, and the receiver reads until the peer closes.
//!
//! ## Components
//! - **Stream**: generic `AsyncRead`/`AsyncWrite` send and receive with a size cap
//! - **TCP**: one-shot listener and sender used by the `transfer` demo

pub mod stream;
pub mod tcp;
