//! # Integrity Envelope
//!
//! `sealed = body || md5(body)`
//!
//! The 16-byte digest is recomputed on decode and compared byte-for-byte with
//! the stored one. It detects corruption in transit; it is not a MAC and offers
//! no protection against deliberate tampering by someone who can recompute it.

use crate::core::frame::LENGTH_PREFIX_SIZE;
use crate::error::{CodecError, Result};
use md5::{Digest, Md5};
use tracing::warn;

/// Size of the content digest in bytes
pub const DIGEST_SIZE: usize = 16;

/// Compute the content digest of `body`
pub fn digest(body: &[u8]) -> [u8; DIGEST_SIZE] {
    let mut out = [0u8; DIGEST_SIZE];
    out.copy_from_slice(&Md5::digest(body));
    out
}

/// Append the digest of `body` to it
pub fn seal(mut body: Vec<u8>) -> Vec<u8> {
    let hash = digest(&body);
    body.extend_from_slice(&hash);
    body
}

/// Verify a sealed buffer and return the body it protects.
///
/// # Errors
/// - `CodecError::Truncated` if the buffer cannot hold a frame header and a digest
/// - `CodecError::IntegrityMismatch` if the recomputed digest differs
pub fn open(sealed: &[u8]) -> Result<&[u8]> {
    let minimum = LENGTH_PREFIX_SIZE + DIGEST_SIZE;
    if sealed.len() < minimum {
        return Err(CodecError::Truncated {
            needed: minimum,
            available: sealed.len(),
        });
    }

    let (body, stored) = sealed.split_at(sealed.len() - DIGEST_SIZE);
    if digest(body).as_slice() != stored {
        warn!(body_len = body.len(), "Content hash mismatch");
        return Err(CodecError::IntegrityMismatch);
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // RFC 1321 test vector
        assert_eq!(
            digest(b"abc"),
            [
                0x90, 0x01, 0x50, 0x98, 0x3c, 0xd2, 0x4f, 0xb0, 0xd6, 0x96, 0x3f, 0x7d, 0x28, 0xe1,
                0x7f, 0x72
            ]
        );
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_seal_then_open() {
        let body = vec![3, 0, 0, 0, 1, 2, 3];
        let sealed = seal(body.clone());
        assert_eq!(sealed.len(), body.len() + DIGEST_SIZE);
        assert_eq!(open(&sealed).unwrap(), body.as_slice());
    }

    #[test]
    fn test_every_flipped_byte_detected() {
        let sealed = seal(vec![4, 0, 0, 0, 9, 8, 7, 6]);
        for i in 0..sealed.len() {
            let mut corrupted = sealed.clone();
            corrupted[i] ^= 0x01;
            assert!(
                matches!(open(&corrupted), Err(CodecError::IntegrityMismatch)),
                "flip at {i} went undetected"
            );
        }
    }

    #[test]
    fn test_short_buffer_rejected() {
        let result = open(&[0u8; 19]);
        assert!(matches!(
            result,
            Err(CodecError::Truncated {
                needed: 20,
                available: 19
            })
        ));
    }
}
