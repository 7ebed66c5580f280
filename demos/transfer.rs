//! Example: End-to-end transfer over loopback TCP
//!
//! Encodes an array of nested records, sends it to a one-shot listener,
//! decodes both the received and the original buffer, and checks that all
//! three renderings agree.
//!
//! Configuration is read from `FRAMEWIRE_*` environment variables, e.g.
//! `FRAMEWIRE_COMPRESSION_KIND=zstd`.
//!
//! Run with: `cargo run --example transfer`

#![allow(clippy::uninlined_format_args)]

use framewire::config::FramewireConfig;
use framewire::core::codec::Codec;
use framewire::transport::tcp::{bind, connect_and_send, serve_once};
use framewire::utils::logging::init_logging;
use framewire::utils::metrics::{global_metrics, init_metrics};
use framewire::wire_record;
use std::collections::HashSet;

#[derive(Debug, Default, Clone, PartialEq)]
struct Sample {
    i: i32,
    s: String,
    ints: Vec<i32>,
    something: i32,
    obj: Option<Box<Sample>>,
}

wire_record! {
    Sample { i: i32, s: String, ints: Vec<i32>, something: i32, obj: Option<Box<Sample>> }
}

fn test_data() -> Vec<Sample> {
    let first = Sample {
        i: 999,
        s: "somestring".to_string(),
        ints: vec![3, 5, 1112, i32::MAX, i32::MIN],
        something: 14,
        obj: Some(Box::new(Sample {
            i: 1134,
            ints: vec![1, 1, 1],
            ..Sample::default()
        })),
    };

    vec![
        first,
        Sample {
            i: 1010,
            s: "str".to_string(),
            ..Sample::default()
        },
    ]
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = FramewireConfig::from_env()?;
    // bind an ephemeral port unless one was configured
    if std::env::var("FRAMEWIRE_ADDRESS").is_err() {
        config.transport.address = "127.0.0.1:0".to_string();
    }

    init_logging(&config.logging)?;
    init_metrics();

    let codec = Codec::from_config(&config.codec, &config.compression)?;
    let data = test_data();
    let sending = codec.encode(&data)?;
    println!(
        "Encoded {} records into {} bytes (compression: {})",
        data.len(),
        sending.len(),
        codec.compressing()
    );

    let listener = bind(&config.transport).await?;
    let addr = listener.local_addr()?;

    let sender_codec = codec.clone();
    let sender_config = config.transport.clone();
    let sender_data = data.clone();
    let sender = tokio::spawn(async move {
        connect_and_send(addr, &sender_codec, &sender_data, &sender_config).await
    });

    let (received, peer): (Vec<Sample>, _) = serve_once(&listener, &codec, &config.transport).await?;
    sender.await??;
    println!("Received {} records from {}", received.len(), peer);

    let mut renderings = HashSet::new();
    renderings.insert(format!("{:?}", data));
    renderings.insert(format!("{:?}", received));
    renderings.insert(format!("{:?}", codec.decode::<Vec<Sample>>(&sending)?));

    println!(
        "{}",
        if renderings.len() == 1 {
            "all data equal"
        } else {
            "something went wrong"
        }
    );

    global_metrics().log_metrics();
    Ok(())
}
