use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use rttprims_block::{layout, ControlBlock, ControlBlockConfig};
use rttprims_ring::{ChannelConfig, ChannelMode, Region};

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

#[test]
fn blocking_write_completes_against_slow_reader() {
    let config = ControlBlockConfig::new([ChannelConfig::new(16)], []);
    let mut storage = vec![0u8; 16];
    let mut block = ControlBlock::new(&config, [Region::from_slice(&mut storage)], []);
    let (mut target, mut probe) = block.split();
    let message = pattern(20);

    let received = thread::scope(|s| {
        let reader = s.spawn(move || {
            let mut received = Vec::new();
            let mut byte = [0u8; 1];
            while received.len() < 20 {
                received.extend_from_slice(probe.read::<0>(&mut byte));
            }
            received
        });
        assert!(target.write::<0>(&message).is_empty());
        reader.join().expect("reader thread should not panic")
    });

    assert_eq!(received, message);
}

#[test]
fn down_channel_echo() {
    let config = ControlBlockConfig::new(
        [ChannelConfig::new(32)],
        [ChannelConfig::new(8).with_mode(ChannelMode::BlockIfFull)],
    );
    let (mut up, mut down) = (vec![0u8; 32], vec![0u8; 8]);
    let mut block = ControlBlock::new(
        &config,
        [Region::from_slice(&mut up)],
        [Region::from_slice(&mut down)],
    );
    let (mut target, mut probe) = block.split();

    let echoed = thread::scope(|s| {
        s.spawn(move || {
            let mut cmd = [0u8; 4];
            for _ in 0..3 {
                let got = target.read::<0>(&mut cmd);
                let reply = got.to_vec();
                assert!(target.write::<0>(&reply).is_empty());
            }
        });

        let mut echoed = Vec::new();
        for cmd in [b"ping", b"pong", b"quit"] {
            assert!(probe.write::<0>(cmd).is_empty());
            let mut reply = [0u8; 4];
            echoed.push(probe.read::<0>(&mut reply).to_vec());
        }
        echoed
    });

    assert_eq!(echoed, [b"ping".to_vec(), b"pong".to_vec(), b"quit".to_vec()]);
}

#[test]
fn odd_capacity_stream_survives_wraparound() {
    const TOTAL: usize = 20_000;
    let config = ControlBlockConfig::up_only(ChannelMode::BlockIfFull, [17]);
    let mut storage = vec![0u8; 17];
    let mut block = ControlBlock::new(&config, [Region::from_slice(&mut storage)], []);
    let (mut target, mut probe) = block.split();
    let stream = pattern(TOTAL);

    let received = thread::scope(|s| {
        let writer = s.spawn(|| {
            let mut offset = 0;
            let mut chunk = 1;
            while offset < TOTAL {
                let end = (offset + chunk).min(TOTAL);
                assert!(target.write::<0>(&stream[offset..end]).is_empty());
                offset = end;
                chunk = chunk % 23 + 1;
            }
        });

        let mut received = Vec::with_capacity(TOTAL);
        let mut chunk = 5;
        while received.len() < TOTAL {
            let want = chunk.min(TOTAL - received.len());
            let mut into = vec![0u8; want];
            received.extend_from_slice(probe.read::<0>(&mut into));
            chunk = chunk % 13 + 1;
        }
        writer.join().expect("writer thread should not panic");
        received
    });

    assert_eq!(received.len(), TOTAL);
    assert!(received == stream, "stream arrived out of order");
}

#[test]
fn trim_mode_never_exceeds_usable_capacity() {
    let config = ControlBlockConfig::up_only(ChannelMode::NoBlockTrim, [16]);
    let mut storage = vec![0u8; 16];
    let mut block = ControlBlock::new(&config, [Region::from_slice(&mut storage)], []);
    let (mut target, mut probe) = block.split();

    thread::scope(|s| {
        s.spawn(move || {
            for round in 0..500u32 {
                let data = [round as u8; 9];
                let _ = target.write::<0>(&data);
                let in_flight = target.block().up_channels()[0].bytes_available();
                assert!(in_flight <= 15, "{in_flight} bytes in flight");
            }
        });
        s.spawn(move || {
            let mut into = [0u8; 7];
            for _ in 0..500 {
                let _ = probe.read::<0>(&mut into);
            }
        });
    });
}

#[test]
fn snapshots_run_alongside_transfers() {
    const TOTAL: usize = 4_000;
    let config = ControlBlockConfig::up_only(ChannelMode::BlockIfFull, [32]);
    let mut storage = vec![0u8; 32];
    let mut block = ControlBlock::new(&config, [Region::from_slice(&mut storage)], []);
    let (mut target, mut probe) = block.split();
    let view = target.block();
    let stream = pattern(TOTAL);
    let drained = AtomicBool::new(false);

    thread::scope(|s| {
        s.spawn(|| assert!(target.write::<0>(&stream).is_empty()));
        s.spawn(|| {
            let mut received = 0;
            let mut into = [0u8; 7];
            while received < TOTAL {
                received += probe.read::<0>(&mut into).len();
            }
            drained.store(true, Ordering::Release);
        });

        let word = |bytes: &[u8], at: usize| {
            u32::from_ne_bytes(bytes[at..at + 4].try_into().expect("4 bytes"))
        };
        let record = layout::RECORDS_OFFSET + 2 * size_of::<usize>();
        let mut image = [0u8; ControlBlock::<'static, 1, 0>::SIZE];
        let mut taken = 0;
        while taken == 0 || !drained.load(Ordering::Acquire) {
            let bytes = view.snapshot(&mut image).expect("image should fit the block");
            assert_eq!(&bytes[..10], b"SEGGER RTT");
            assert_eq!(word(bytes, layout::UP_COUNT_OFFSET), 1);
            assert_eq!(word(bytes, record), 32);
            assert!(word(bytes, record + 4) < 32);
            assert!(word(bytes, record + 8) < 32);
            taken += 1;
        }
    });
}
