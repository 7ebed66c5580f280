//! Round-trip tests across every supported shape

#![allow(clippy::unwrap_used, clippy::expect_used)]

use framewire::core::codec::Codec;
use framewire::error::CodecError;
use framewire::utils::compression::{BuiltinCompressor, Compressor};
use framewire::wire_record;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq)]
struct Sample {
    i: i32,
    s: String,
    ints: Vec<i32>,
    nested: Option<Box<Sample>>,
}

wire_record! {
    Sample { i: i32, s: String, ints: Vec<i32>, nested: Option<Box<Sample>> }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Inventory {
    owner: String,
    counts: BTreeMap<String, u32>,
    tags: BTreeSet<String>,
    location: (f64, f64),
    active: bool,
    grade: char,
}

wire_record! {
    Inventory {
        owner: String,
        counts: BTreeMap<String, u32>,
        tags: BTreeSet<String>,
        location: (f64, f64),
        active: bool,
        grade: char,
    }
}

fn sample() -> Sample {
    Sample {
        i: 999,
        s: "somestring".to_string(),
        ints: vec![3, 5, 1112, i32::MAX, i32::MIN],
        nested: Some(Box::new(Sample {
            i: 1134,
            s: String::new(),
            ints: vec![1, 1, 1],
            nested: None,
        })),
    }
}

fn codecs() -> Vec<(&'static str, Codec)> {
    vec![
        ("plain", Codec::plain()),
        ("lz4", Codec::default()),
        (
            "zstd",
            Codec::new(Some(Arc::new(BuiltinCompressor::zstd(3)) as Arc<dyn Compressor>)),
        ),
    ]
}

#[test]
fn test_sample_roundtrip_every_compressor() {
    for (name, codec) in codecs() {
        let bytes = codec.encode(&sample()).expect(name);
        let decoded: Sample = codec.decode(&bytes).expect(name);
        assert_eq!(decoded, sample(), "{name}");
        assert_eq!(decoded.ints.len(), 5);
        assert_eq!(decoded.nested.as_ref().map(|n| n.i), Some(1134));
    }
}

#[test]
fn test_sample_array_roundtrip() {
    let codec = Codec::default();
    let samples = vec![sample(), sample(), Sample::default()];
    let bytes = codec.encode(&samples).unwrap();
    let decoded: Vec<Sample> = codec.decode(&bytes).unwrap();
    assert_eq!(decoded.len(), 3);
    assert_eq!(decoded[0], sample());
    assert_eq!(decoded[1], sample());
    assert_eq!(decoded[2], Sample::default());
}

#[test]
fn test_mixed_record_roundtrip() {
    let codec = Codec::default();
    let inventory = Inventory {
        owner: "depot-7".into(),
        counts: [("bolts".to_string(), 40), ("nuts".to_string(), 12)]
            .into_iter()
            .collect(),
        tags: ["metal", "small"].iter().map(|t| t.to_string()).collect(),
        location: (51.5, -0.12),
        active: true,
        grade: 'Ω',
    };

    let bytes = codec.encode(&inventory).unwrap();
    assert_eq!(codec.decode::<Inventory>(&bytes).unwrap(), inventory);
}

#[test]
fn test_primitive_roundtrips() {
    let codec = Codec::plain();

    macro_rules! check {
        ($($value:expr => $ty:ty),* $(,)?) => {
            $(
                let bytes = codec.encode(&$value).unwrap();
                assert_eq!(codec.decode::<$ty>(&bytes).unwrap(), $value);
            )*
        };
    }

    check!(
        u8::MAX => u8,
        -7i16 => i16,
        u32::MAX => u32,
        i64::MIN => i64,
        u128::MAX => u128,
        1.5f32 => f32,
        -2.25f64 => f64,
        true => bool,
        'z' => char,
        usize::MAX => usize,
    );
}

#[test]
fn test_collection_roundtrips() {
    let codec = Codec::default();

    let deque: VecDeque<u16> = (0..50).collect();
    let bytes = codec.encode(&deque).unwrap();
    assert_eq!(codec.decode::<VecDeque<u16>>(&bytes).unwrap(), deque);

    let set: HashSet<i64> = [-1, 0, 1, 1 << 40].into_iter().collect();
    let bytes = codec.encode(&set).unwrap();
    assert_eq!(codec.decode::<HashSet<i64>>(&bytes).unwrap(), set);

    let map: HashMap<u8, Vec<String>> = [
        (1, vec!["a".to_string()]),
        (2, vec!["b".to_string(), "c".to_string()]),
    ]
    .into_iter()
    .collect();
    let bytes = codec.encode(&map).unwrap();
    assert_eq!(codec.decode::<HashMap<u8, Vec<String>>>(&bytes).unwrap(), map);

    let array = [7u32, 8, 9];
    let bytes = codec.encode(&array).unwrap();
    assert_eq!(codec.decode::<[u32; 3]>(&bytes).unwrap(), array);

    let matrix = vec![vec![1u8, 2], vec![3], vec![4, 5, 6]];
    let bytes = codec.encode(&matrix).unwrap();
    assert_eq!(codec.decode::<Vec<Vec<u8>>>(&bytes).unwrap(), matrix);
}

#[test]
fn test_sequence_length_preserved() {
    let codec = Codec::plain();
    for len in [1usize, 2, 17, 300] {
        let values: Vec<u64> = (0..len as u64).collect();
        let bytes = codec.encode(&values).unwrap();
        let decoded: Vec<u64> = codec.decode(&bytes).unwrap();
        assert_eq!(decoded.len(), len);
        assert_eq!(decoded, values);
    }
}

#[derive(Debug, Default, PartialEq)]
struct ZetaFirst {
    zeta: u32,
    alpha: String,
    mid: Vec<u8>,
}

wire_record! {
    ZetaFirst { zeta: u32, alpha: String, mid: Vec<u8> }
}

#[derive(Debug, Default, PartialEq)]
struct AlphaFirst {
    alpha: String,
    mid: Vec<u8>,
    zeta: u32,
}

wire_record! {
    AlphaFirst { alpha: String, mid: Vec<u8>, zeta: u32 }
}

#[test]
fn test_field_declaration_order_does_not_change_bytes() {
    let codec = Codec::plain();
    let first = codec
        .encode(&ZetaFirst {
            zeta: 9,
            alpha: "a".to_string(),
            mid: vec![1, 2],
        })
        .unwrap();
    let second = codec
        .encode(&AlphaFirst {
            alpha: "a".to_string(),
            mid: vec![1, 2],
            zeta: 9,
        })
        .unwrap();
    assert_eq!(first, second);

    let swapped: AlphaFirst = codec.decode(&first).unwrap();
    assert_eq!(swapped.zeta, 9);
    assert_eq!(swapped.alpha, "a");
}

#[test]
fn test_pointer_wrappers_are_transparent() {
    let codec = Codec::plain();
    let boxed = codec.encode(&Box::new(41u32)).unwrap();
    let shared = codec.encode(&Arc::new(41u32)).unwrap();
    let bare = codec.encode(&41u32).unwrap();
    assert_eq!(boxed, bare);
    assert_eq!(shared, bare);
    assert_eq!(*codec.decode::<Arc<u32>>(&bare).unwrap(), 41);
}

// A zero-length frame is shared by absent values and empty values, and both
// decode to the target's absent value.
#[test]
fn test_null_and_empty_decode_alike() {
    let codec = Codec::plain();

    let none = codec.encode(&None::<Vec<i32>>).unwrap();
    let empty = codec.encode(&Vec::<i32>::new()).unwrap();
    assert_eq!(none, empty);

    assert_eq!(codec.decode::<Vec<i32>>(&none).unwrap(), Vec::<i32>::new());
    assert_eq!(codec.decode::<Option<Vec<i32>>>(&empty).unwrap(), None);
    assert_eq!(
        codec
            .decode::<Option<String>>(&codec.encode(&Some(String::new())).unwrap())
            .unwrap(),
        None
    );
    assert_eq!(
        codec
            .decode::<Option<i32>>(&codec.encode(&Some(0i32)).unwrap())
            .unwrap(),
        Some(0)
    );
    assert_eq!(codec.decode::<Sample>(&none).unwrap(), Sample::default());
    assert_eq!(codec.decode::<(u8, u8)>(&none).unwrap(), (0, 0));
    assert_eq!(codec.decode::<[u8; 2]>(&none).unwrap(), [0, 0]);
    assert_eq!(
        codec.decode::<[String; 3]>(&none).unwrap(),
        [String::new(), String::new(), String::new()]
    );
}

#[test]
fn test_mismatched_compression_setting_fails() {
    let bytes = Codec::default().encode(&sample()).unwrap();
    let result = Codec::plain().decode::<Sample>(&bytes);
    assert!(result.is_err());
}

#[test]
fn test_wrong_shape_rejected() {
    let codec = Codec::plain();
    let bytes = codec.encode(&(1u8, 2u8, 3u8)).unwrap();
    assert!(matches!(
        codec.decode::<(u8, u8)>(&bytes),
        Err(CodecError::ShapeMismatch(_))
    ));

    let bytes = codec.encode(&5u64).unwrap();
    assert!(matches!(
        codec.decode::<u32>(&bytes),
        Err(CodecError::ShapeMismatch(_))
    ));
}
