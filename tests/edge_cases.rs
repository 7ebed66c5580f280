#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Edge-case tests for corrupted buffers, nesting limits and converters
//! Tests boundary conditions, error scenarios and resource limits

use framewire::core::codec::Codec;
use framewire::core::integrity;
use framewire::error::CodecError;
use framewire::utils::metrics::global_metrics;
use framewire::wire_record;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default, PartialEq)]
struct Node {
    value: u32,
    next: Option<Box<Node>>,
}

wire_record! {
    Node { value: u32, next: Option<Box<Node>> }
}

#[derive(Debug, Default)]
struct Link {
    id: u32,
    next: Option<Rc<RefCell<Link>>>,
}

wire_record! {
    Link { id: u32, next: Option<Rc<RefCell<Link>>> }
}

/// A chain of `levels` nested records
fn chain(levels: u32) -> Node {
    let mut node = Node {
        value: levels,
        next: None,
    };
    for value in (1..levels).rev() {
        node = Node {
            value,
            next: Some(Box::new(node)),
        };
    }
    node
}

// ============================================================================
// INTEGRITY
// ============================================================================

#[test]
fn test_every_flipped_byte_detected() {
    let codec = Codec::plain();
    let bytes = codec.encode(&vec![10u16, 20, 30]).unwrap();

    for i in 0..bytes.len() {
        let mut corrupted = bytes.clone();
        corrupted[i] ^= 0x80;
        match codec.decode::<Vec<u16>>(&corrupted) {
            Err(CodecError::IntegrityMismatch) => {}
            other => panic!("flip at byte {i} gave {other:?}"),
        }
    }
}

#[test]
fn test_corrupted_compressed_buffer_fails() {
    let codec = Codec::default();
    let mut bytes = codec.encode(&"integrity".repeat(20)).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    assert!(codec.decode::<String>(&bytes).is_err());
}

#[test]
fn test_short_buffer_is_truncated() {
    let codec = Codec::plain();
    assert!(matches!(
        codec.decode::<u32>(&[1, 2, 3]),
        Err(CodecError::Truncated { .. })
    ));
    assert!(matches!(
        codec.decode::<u32>(&[]),
        Err(CodecError::Truncated { .. })
    ));
}

#[test]
fn test_frame_longer_than_body_is_truncated() {
    let codec = Codec::plain();
    // Root frame claims 10 bytes but carries 2; the hash itself is valid
    let sealed = integrity::seal(vec![10, 0, 0, 0, 1, 2]);
    assert!(matches!(
        codec.decode::<Vec<u8>>(&sealed),
        Err(CodecError::Truncated {
            needed: 10,
            available: 2
        })
    ));
}

#[test]
fn test_inner_frame_overrun_is_truncated() {
    let codec = Codec::plain();
    // Sequence payload holding one element frame that claims 9 bytes
    let sealed = integrity::seal(vec![6, 0, 0, 0, 9, 0, 0, 0, 1, 2]);
    assert!(matches!(
        codec.decode::<Vec<u8>>(&sealed),
        Err(CodecError::Truncated { .. })
    ));
}

// ============================================================================
// NESTING CEILING
// ============================================================================

#[test]
fn test_exactly_at_ceiling_succeeds() {
    let codec = Codec::plain();
    let node = chain(8);
    let bytes = codec.encode(&node).unwrap();
    assert_eq!(codec.decode::<Node>(&bytes).unwrap(), node);
}

#[test]
fn test_one_past_ceiling_fails() {
    let codec = Codec::plain();
    assert!(matches!(
        codec.encode(&chain(9)),
        Err(CodecError::NestingExceeded {
            depth: 9,
            ceiling: 8
        })
    ));
}

#[test]
fn test_custom_ceiling() {
    let shallow = Codec::plain().with_nesting_ceiling(3);
    assert!(shallow.encode(&chain(3)).is_ok());
    assert!(matches!(
        shallow.encode(&chain(4)),
        Err(CodecError::NestingExceeded { .. })
    ));

    let deep = Codec::plain().with_nesting_ceiling(32);
    let bytes = deep.encode(&chain(30)).unwrap();
    assert_eq!(deep.decode::<Node>(&bytes).unwrap(), chain(30));
}

#[test]
fn test_decode_enforces_ceiling() {
    let deep = Codec::plain().with_nesting_ceiling(16);
    let bytes = deep.encode(&chain(12)).unwrap();

    let strict = Codec::plain();
    assert!(matches!(
        strict.decode::<Node>(&bytes),
        Err(CodecError::NestingExceeded { .. })
    ));
}

#[test]
fn test_nested_sequences_count_levels() {
    let codec = Codec::plain();
    let eight: Vec<Vec<Vec<Vec<Vec<Vec<Vec<Vec<u8>>>>>>>> =
        vec![vec![vec![vec![vec![vec![vec![vec![1]]]]]]]];
    assert!(codec.encode(&eight).is_ok());

    let nine = vec![eight];
    assert!(matches!(
        codec.encode(&nine),
        Err(CodecError::NestingExceeded { .. })
    ));
}

#[test]
fn test_cycle_stopped_by_ceiling() {
    let codec = Codec::plain();
    let link = Rc::new(RefCell::new(Link { id: 1, next: None }));
    link.borrow_mut().next = Some(Rc::clone(&link));

    let result = codec.encode(&link);

    // break the cycle so the test does not leak
    link.borrow_mut().next = None;
    assert!(matches!(result, Err(CodecError::NestingExceeded { .. })));
}

#[test]
fn test_shared_acyclic_cells_roundtrip() {
    let codec = Codec::plain();
    let tail = Rc::new(RefCell::new(Link { id: 2, next: None }));
    let head = Rc::new(RefCell::new(Link {
        id: 1,
        next: Some(Rc::clone(&tail)),
    }));

    let bytes = codec.encode(&head).unwrap();
    let decoded: Rc<RefCell<Link>> = codec.decode(&bytes).unwrap();
    let decoded = decoded.borrow();
    assert_eq!(decoded.id, 1);
    assert_eq!(decoded.next.as_ref().map(|n| n.borrow().id), Some(2));
}

#[test]
fn test_mutably_borrowed_cell_rejected() {
    let codec = Codec::plain();
    let link = Rc::new(RefCell::new(Link::default()));
    let _guard = link.borrow_mut();
    assert!(matches!(
        codec.encode(&link),
        Err(CodecError::UnsupportedValue(_))
    ));
}

// ============================================================================
// CONVERTERS
// ============================================================================

#[test]
fn test_converter_error_propagates() {
    let mut codec = Codec::plain();
    codec.register::<u16, _, _>(
        |_| Err(CodecError::UnsupportedValue("u16 refused".into())),
        |_| Ok(0),
    );
    assert!(matches!(
        codec.encode(&vec![1u16]),
        Err(CodecError::UnsupportedValue(_))
    ));
}

#[test]
fn test_later_registration_replaces_earlier() {
    let mut codec = Codec::plain();
    codec.register::<u32, _, _>(|_| Ok(vec![1]), |_| Ok(1));
    codec.register::<u32, _, _>(|_| Ok(vec![2]), |_| Ok(2));

    let bytes = codec.encode(&77u32).unwrap();
    assert_eq!(&bytes[..5], &[1, 0, 0, 0, 2]);
    assert_eq!(codec.decode::<u32>(&bytes).unwrap(), 2);
    assert_eq!(codec.registry().len(), 2);
}

#[test]
fn test_converter_overrides_sequence_framing() {
    let mut codec = Codec::plain();
    codec.register::<Vec<u8>, _, _>(|bytes| Ok(bytes.clone()), |bytes| Ok(bytes.to_vec()));

    let blob = vec![0xDEu8, 0xAD, 0xBE, 0xEF];
    let bytes = codec.encode(&blob).unwrap();
    // one flat frame instead of four element frames
    assert_eq!(&bytes[..8], &[4, 0, 0, 0, 0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(codec.decode::<Vec<u8>>(&bytes).unwrap(), blob);
}

#[test]
fn test_absorb_overwrites_on_collision() {
    let mut target = Codec::plain();
    target.register::<u8, _, _>(|_| Ok(vec![b'a']), |_| Ok(b'a'));

    let mut source = Codec::plain();
    source.register::<u8, _, _>(|_| Ok(vec![b'b']), |_| Ok(b'b'));
    source.register::<i8, _, _>(|v| Ok(vec![*v as u8]), |b| Ok(b[0] as i8));

    target.absorb(&source);
    assert!(target.registry().contains::<i8>());
    let bytes = target.encode(&0u8).unwrap();
    assert_eq!(target.decode::<u8>(&bytes).unwrap(), b'b');
}

#[test]
fn test_invalid_utf8_rejected() {
    let codec = Codec::plain();
    let sealed = integrity::seal(vec![2, 0, 0, 0, 0xC3, 0x28]);
    assert!(matches!(
        codec.decode::<String>(&sealed),
        Err(CodecError::ShapeMismatch(_))
    ));
}

#[test]
fn test_invalid_bool_rejected() {
    let codec = Codec::plain();
    let sealed = integrity::seal(vec![1, 0, 0, 0, 7]);
    assert!(matches!(
        codec.decode::<bool>(&sealed),
        Err(CodecError::ShapeMismatch(_))
    ));
}

// ============================================================================
// METRICS
// ============================================================================

#[test]
fn test_codec_updates_global_counters() {
    let codec = Codec::plain();
    let before = global_metrics().snapshot();

    let mut bytes = codec.encode(&vec![1u32, 2, 3]).unwrap();
    assert!(codec.decode::<Vec<u32>>(&bytes).is_ok());
    bytes[4] ^= 0x01;
    assert!(codec.decode::<Vec<u32>>(&bytes).is_err());
    assert!(codec.encode(&chain(9)).is_err());

    let after = global_metrics().snapshot();
    assert!(after.encodes_total > before.encodes_total);
    assert!(after.decodes_total > before.decodes_total);
    assert!(after.bytes_encoded >= before.bytes_encoded + bytes.len() as u64);
    assert!(after.integrity_failures > before.integrity_failures);
    assert!(after.decode_errors > before.decode_errors);
    assert!(after.nesting_failures > before.nesting_failures);
    assert!(after.encode_errors > before.encode_errors);
}

#[test]
fn test_compression_counters_follow_toggle() {
    let mut codec = Codec::default();
    let before = global_metrics().snapshot();

    let bytes = codec.encode(&"counted".repeat(8)).unwrap();
    codec.decode::<String>(&bytes).unwrap();

    let after = global_metrics().snapshot();
    assert!(after.compression_total > before.compression_total);
    assert!(after.decompression_total > before.decompression_total);

    codec.set_compressing(false);
    let bytes = codec.encode(&"plain".to_string()).unwrap();
    assert_eq!(codec.decode::<String>(&bytes).unwrap(), "plain");
}
