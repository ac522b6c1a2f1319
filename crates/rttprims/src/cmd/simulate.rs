use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

use bytes::BytesMut;
use rttprims_block::{ControlBlock, ControlBlockConfig, Probe, Target};
use rttprims_ring::{ChannelConfig, ChannelMode, Region};
use serde::Serialize;

use crate::cmd::SimulateArgs;
use crate::exit::{config_error, io_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS, USAGE};
use crate::output::{preview, print_json, table, OutputFormat};

/// Size of the probe-to-target command channel.
const DOWN_CAPACITY: u32 = 16;

#[derive(Debug, Serialize)]
struct SimulateOutput {
    schema_id: &'static str,
    capacity: u32,
    mode: &'static str,
    messages: u32,
    message_size: u32,
    chunk: u32,
    offered_bytes: u64,
    delivered_bytes: u64,
    dropped_bytes: u64,
    truncated_messages: u32,
    intact: bool,
    command: String,
    elapsed_ms: u128,
}

struct Transfer {
    accepted: BytesMut,
    delivered: BytesMut,
    truncated: u32,
}

pub fn run(args: SimulateArgs, format: OutputFormat) -> CliResult<i32> {
    if args.command.is_empty() || args.command.len() >= DOWN_CAPACITY as usize {
        return Err(CliError::new(
            USAGE,
            format!(
                "--command must be 1 to {} bytes",
                DOWN_CAPACITY.saturating_sub(1)
            ),
        ));
    }

    let output = simulate(&args)?;
    print_simulate(&output, format);

    if output.intact {
        Ok(SUCCESS)
    } else {
        Ok(FAILURE)
    }
}

fn simulate(args: &SimulateArgs) -> CliResult<SimulateOutput> {
    let config = ControlBlockConfig::new(
        [ChannelConfig::new(args.capacity)
            .with_mode(args.mode)
            .with_name(c"Terminal")],
        [ChannelConfig::new(DOWN_CAPACITY)
            .with_mode(ChannelMode::NoBlockTrim)
            .with_name(c"Terminal")],
    );
    let mut up = vec![0u8; args.capacity as usize];
    let mut down = vec![0u8; DOWN_CAPACITY as usize];
    let mut block = ControlBlock::try_new(
        &config,
        [Region::from_slice(&mut up)],
        [Region::from_slice(&mut down)],
    )
    .map_err(|err| config_error("control block", err))?;

    tracing::info!(
        capacity = args.capacity,
        mode = args.mode.name(),
        messages = args.messages,
        message_size = args.message_size,
        "simulation started"
    );

    let started = Instant::now();
    let (mut target, mut probe) = block.split();
    let transfer = stream(args, &mut target, &mut probe)?;
    let elapsed_ms = started.elapsed().as_millis();

    let command = echo_command(args.command.as_bytes(), &mut target, &mut probe);

    let offered_bytes = u64::from(args.messages) * u64::from(args.message_size);
    let accepted_bytes = transfer.accepted.len() as u64;
    let intact = transfer.delivered == transfer.accepted;
    if !intact {
        tracing::warn!(
            accepted = accepted_bytes,
            delivered = transfer.delivered.len(),
            "delivered stream differs from accepted bytes"
        );
    }
    tracing::info!(
        offered = offered_bytes,
        delivered = transfer.delivered.len(),
        truncated = transfer.truncated,
        elapsed_ms,
        "simulation finished"
    );

    Ok(SimulateOutput {
        schema_id: "https://schemas.3leaps.dev/rttprims/cli/v1/simulate-report.schema.json",
        capacity: args.capacity,
        mode: args.mode.name(),
        messages: args.messages,
        message_size: args.message_size,
        chunk: args.chunk,
        offered_bytes,
        delivered_bytes: transfer.delivered.len() as u64,
        dropped_bytes: offered_bytes.saturating_sub(accepted_bytes),
        truncated_messages: transfer.truncated,
        intact,
        command,
        elapsed_ms,
    })
}

/// Run the target writer and the probe reader on separate threads.
fn stream(
    args: &SimulateArgs,
    target: &mut Target<'_, '_, 1, 1>,
    probe: &mut Probe<'_, '_, 1, 1>,
) -> CliResult<Transfer> {
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        let writer = thread::Builder::new()
            .name("target".to_owned())
            .spawn_scoped(s, || {
                let mut accepted = BytesMut::new();
                let mut truncated = 0;
                for seq in 0..args.messages {
                    let msg = message(seq, args.message_size as usize);
                    let rest = target.write::<0>(&msg);
                    if !rest.is_empty() {
                        truncated += 1;
                        tracing::debug!(seq, unwritten = rest.len(), "message not fully written");
                    }
                    accepted.extend_from_slice(&msg[..msg.len() - rest.len()]);
                }
                done.store(true, Ordering::Release);
                (accepted, truncated)
            })
            .map_err(|err| io_error("spawn target thread", err))?;

        let delivered = drain(probe, args.chunk as usize, &done);
        let (accepted, truncated) = writer
            .join()
            .map_err(|_| CliError::new(INTERNAL, "target writer thread panicked"))?;

        Ok(Transfer {
            accepted,
            delivered,
            truncated,
        })
    })
}

/// Read the up channel until the writer has finished and the ring is empty.
///
/// Each read asks for no more than is already available, so it never spins
/// whatever the channel mode.
fn drain(probe: &mut Probe<'_, '_, 1, 1>, chunk: usize, done: &AtomicBool) -> BytesMut {
    let mut delivered = BytesMut::new();
    let mut buf = vec![0u8; chunk];
    loop {
        let available = probe.block().up_channels()[0].bytes_available() as usize;
        if available == 0 {
            if done.load(Ordering::Acquire) && probe.block().up_channels()[0].is_empty() {
                break;
            }
            thread::yield_now();
            continue;
        }
        let want = available.min(chunk);
        delivered.extend_from_slice(probe.read::<0>(&mut buf[..want]));
    }
    delivered
}

/// Send `command` down and return what the target side received.
fn echo_command(
    command: &[u8],
    target: &mut Target<'_, '_, 1, 1>,
    probe: &mut Probe<'_, '_, 1, 1>,
) -> String {
    let rest = probe.write::<0>(command);
    if !rest.is_empty() {
        tracing::warn!(unsent = rest.len(), "command did not fit the down channel");
    }
    let mut buf = [0u8; DOWN_CAPACITY as usize];
    let received = target.read::<0>(&mut buf);
    tracing::debug!(len = received.len(), "command received by target");
    preview(received)
}

/// Message `seq`: a byte pattern that differs between neighbouring messages.
fn message(seq: u32, size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| ((seq as usize).wrapping_mul(7).wrapping_add(i) % 251) as u8)
        .collect()
}

fn print_simulate(output: &SimulateOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table => {
            let mut t = table(["METRIC", "VALUE"]);
            let rows = [
                ("capacity", output.capacity.to_string()),
                ("mode", output.mode.to_string()),
                ("messages", output.messages.to_string()),
                ("message size", output.message_size.to_string()),
                ("read chunk", output.chunk.to_string()),
                ("offered bytes", output.offered_bytes.to_string()),
                ("delivered bytes", output.delivered_bytes.to_string()),
                ("dropped bytes", output.dropped_bytes.to_string()),
                ("truncated messages", output.truncated_messages.to_string()),
                ("intact", output.intact.to_string()),
                ("command echo", output.command.clone()),
                ("elapsed ms", output.elapsed_ms.to_string()),
            ];
            for (name, value) in rows {
                t.add_row(vec![name.to_string(), value]);
            }
            println!("{t}");
        }
        OutputFormat::Pretty => {
            println!(
                "mode={} capacity={} offered={} delivered={} dropped={} intact={} command={:?}",
                output.mode,
                output.capacity,
                output.offered_bytes,
                output.delivered_bytes,
                output.dropped_bytes,
                output.intact,
                output.command
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(capacity: u32, mode: ChannelMode, messages: u32, message_size: u32) -> SimulateArgs {
        SimulateArgs {
            capacity,
            mode,
            messages,
            message_size,
            chunk: 5,
            command: "ping".to_string(),
        }
    }

    #[test]
    fn block_mode_delivers_everything() {
        let out = simulate(&args(17, ChannelMode::BlockIfFull, 200, 13)).expect("simulate");
        assert_eq!(out.offered_bytes, 2600);
        assert_eq!(out.delivered_bytes, 2600);
        assert_eq!(out.dropped_bytes, 0);
        assert_eq!(out.truncated_messages, 0);
        assert!(out.intact);
        assert_eq!(out.command, "ping");
    }

    #[test]
    fn skip_mode_drops_oversized_messages_whole() {
        // A 20-byte message can never fit 15 usable bytes.
        let out = simulate(&args(16, ChannelMode::NoBlockSkip, 10, 20)).expect("simulate");
        assert_eq!(out.delivered_bytes, 0);
        assert_eq!(out.dropped_bytes, 200);
        assert_eq!(out.truncated_messages, 10);
        assert!(out.intact);
    }

    #[test]
    fn trim_mode_stream_is_intact() {
        let out = simulate(&args(32, ChannelMode::NoBlockTrim, 500, 9)).expect("simulate");
        assert_eq!(out.delivered_bytes + out.dropped_bytes, out.offered_bytes);
        assert!(out.intact);
    }

    #[test]
    fn messages_differ_between_neighbours() {
        assert_ne!(message(0, 8), message(1, 8));
        assert_eq!(message(3, 4).len(), 4);
    }
}
