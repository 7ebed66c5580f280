#![no_main]

use framewire::core::codec::Codec;
use framewire::core::integrity;
use framewire::wire_record;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct Target {
    id: u64,
    name: String,
    children: Vec<Target>,
    attrs: BTreeMap<String, i32>,
}

wire_record! {
    Target { id: u64, name: String, children: Vec<Target>, attrs: BTreeMap<String, i32> }
}

fuzz_target!(|data: &[u8]| {
    // Raw input almost always fails the hash check; exercise that path
    let _ = Codec::plain().decode::<Target>(data);
    let _ = Codec::default().decode::<Target>(data);

    // Seal the input so the frame parser sees it
    let sealed = integrity::seal(data.to_vec());
    let _ = Codec::plain().decode::<Target>(&sealed);
    let _ = Codec::plain().decode::<Vec<Option<String>>>(&sealed);
    let _ = Codec::plain().decode::<(u32, [u8; 4], char)>(&sealed);
});
