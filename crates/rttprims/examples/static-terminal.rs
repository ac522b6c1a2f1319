//! A static control block with one skip-mode terminal, drained in-process.
//!
//! Run with:
//!   cargo run --example static-terminal
//!
//! On a real target the `Probe` half is the debug probe reading RAM; here the
//! same program plays both roles.

use rttprims::{ChannelBuffer, ChannelConfig, ChannelMode, ControlBlock, ControlBlockConfig};

const CONFIG: ControlBlockConfig<1, 0> = ControlBlockConfig::new(
    [ChannelConfig::new(64)
        .with_mode(ChannelMode::NoBlockSkip)
        .with_name(c"Terminal")],
    [],
);

static TERMINAL: ChannelBuffer<64> = ChannelBuffer::new();
// SAFETY: TERMINAL backs this one channel and nothing else.
static RTT: ControlBlock<'static, 1, 0> =
    ControlBlock::new(&CONFIG, [unsafe { TERMINAL.region() }], []);

fn main() {
    // SAFETY: this is the only place that creates ports for RTT.
    let (mut target, mut probe) = unsafe { (RTT.target(), RTT.probe()) };

    for line in ["boot\n", "sensors ready\n", "entering main loop\n"] {
        let dropped = target.write::<0>(line.as_bytes());
        if !dropped.is_empty() {
            eprintln!("dropped {} bytes", dropped.len());
        }
    }

    let record = &RTT.up_channels()[0];
    eprintln!(
        "control block at {:p}, {} bytes pending in {:?}",
        &RTT,
        record.bytes_available(),
        record.name()
    );

    let mut buf = [0u8; 64];
    let available = record.bytes_available() as usize;
    let text = probe.read::<0>(&mut buf[..available]);
    print!("{}", String::from_utf8_lossy(text));
}
