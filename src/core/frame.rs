//! # Frames
//!
//! The fundamental wire unit: a 4-byte little-endian length followed by exactly
//! that many payload bytes.
//!
//! ```text
//! [Length(4, LE)] [Payload(Length)]
//! ```
//!
//! A zero-length frame is the null marker. Composite payloads (sequences and
//! records) are themselves a concatenation of frames, so a decoder never has to
//! look past a payload to know where the frame ends.

use crate::error::{CodecError, Result};
use bytes::{Buf, BufMut};

/// Size of the length prefix in bytes
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// The null marker frame
pub const NULL_FRAME: [u8; LENGTH_PREFIX_SIZE] = [0; LENGTH_PREFIX_SIZE];

#[inline]
fn frame_length(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| CodecError::OversizedFrame(len))
}

/// Append a complete frame carrying `payload` to `out`.
///
/// # Errors
/// Returns `CodecError::OversizedFrame` if the payload cannot be described by a
/// 32-bit length.
pub fn write_frame(out: &mut Vec<u8>, payload: &[u8]) -> Result<()> {
    out.put_u32_le(frame_length(payload.len())?);
    out.put_slice(payload);
    Ok(())
}

/// Append the null marker frame to `out`.
#[inline]
pub fn write_null(out: &mut Vec<u8>) {
    out.put_slice(&NULL_FRAME);
}

/// Reserve a length prefix and return its offset for [`finish_frame`].
#[inline]
pub(crate) fn begin_frame(out: &mut Vec<u8>) -> usize {
    let at = out.len();
    out.put_slice(&NULL_FRAME);
    at
}

/// Patch the length prefix reserved at `at` with the number of bytes written since.
pub(crate) fn finish_frame(out: &mut [u8], at: usize) -> Result<()> {
    let payload_len = out.len() - at - LENGTH_PREFIX_SIZE;
    let len = frame_length(payload_len)?;
    out[at..at + LENGTH_PREFIX_SIZE].copy_from_slice(&len.to_le_bytes());
    Ok(())
}

/// Split one frame off the front of `buf`, returning its payload and the remainder.
///
/// # Errors
/// Returns `CodecError::Truncated` if the header or the payload runs past the
/// end of `buf`.
pub fn read_frame(buf: &[u8]) -> Result<(&[u8], &[u8])> {
    if buf.len() < LENGTH_PREFIX_SIZE {
        return Err(CodecError::Truncated {
            needed: LENGTH_PREFIX_SIZE,
            available: buf.len(),
        });
    }

    let mut header = &buf[..LENGTH_PREFIX_SIZE];
    let len = header.get_u32_le() as usize;
    let rest = &buf[LENGTH_PREFIX_SIZE..];

    if rest.len() < len {
        return Err(CodecError::Truncated {
            needed: len,
            available: rest.len(),
        });
    }

    Ok(rest.split_at(len))
}

/// Iterator over the consecutive frames of a composite payload, yielding each
/// frame's payload.
///
/// Stops after the first error.
pub struct Frames<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        match read_frame(self.rest) {
            Ok((payload, rest)) => {
                self.rest = rest;
                Some(Ok(payload))
            }
            Err(e) => {
                self.rest = &[];
                Some(Err(e))
            }
        }
    }
}

/// Iterate over the frames packed into `payload`.
pub fn frames(payload: &[u8]) -> Frames<'_> {
    Frames { rest: payload }
}

/// Split `payload` into its sub-frame payloads.
pub fn split_frames(payload: &[u8]) -> Result<Vec<&[u8]>> {
    frames(payload).collect()
}
