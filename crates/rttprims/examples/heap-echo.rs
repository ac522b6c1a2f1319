//! Control block over heap storage, with the target and the probe on two threads.
//!
//! Run with:
//!   cargo run --example heap-echo --features acquire-release

use std::thread;

use rttprims::block::ConfigError;
use rttprims::{ChannelConfig, ChannelMode, ControlBlock, ControlBlockConfig, Region};

fn main() -> Result<(), ConfigError> {
    let config = ControlBlockConfig::new(
        [ChannelConfig::new(32).with_name(c"Replies")],
        [ChannelConfig::new(16)
            .with_mode(ChannelMode::BlockIfFull)
            .with_name(c"Commands")],
    );
    let mut up = vec![0u8; 32];
    let mut down = vec![0u8; 16];
    let mut block = ControlBlock::try_new(
        &config,
        [Region::from_slice(&mut up)],
        [Region::from_slice(&mut down)],
    )?;
    let (mut target, mut probe) = block.split();

    thread::scope(|s| {
        s.spawn(move || {
            let mut cmd = [0u8; 4];
            loop {
                let got = target.read::<0>(&mut cmd);
                let reply = got.to_ascii_uppercase();
                target.write::<0>(&reply);
                if reply == b"QUIT" {
                    break;
                }
            }
        });

        for cmd in [b"ping", b"stat", b"quit"] {
            probe.write::<0>(cmd);
            let mut reply = [0u8; 4];
            let reply = probe.read::<0>(&mut reply);
            println!("{} -> {}", String::from_utf8_lossy(cmd), String::from_utf8_lossy(reply));
        }
    });

    Ok(())
}
