use std::fs;
use std::io::Read;
use std::path::Path;

use rttprims_block::layout::{self, field};
use rttprims_block::{ControlBlockId, Direction};
use rttprims_ring::ChannelMode;
use serde::{Deserialize, Serialize};

use crate::cmd::LayoutArgs;
use crate::exit::{
    config_error, io_error, json_error, mode_error, CliError, CliResult, DATA_INVALID, SUCCESS,
};
use crate::output::{print_json, table, OutputFormat};

/// Upper bound on a configuration file.
const MAX_CONFIG_BYTES: u64 = 64 * 1024;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutFile {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    up: Vec<ChannelEntry>,
    #[serde(default)]
    down: Vec<ChannelEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChannelEntry {
    #[serde(default)]
    name: Option<String>,
    size: u32,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Debug, Serialize)]
struct FieldOffsets {
    name: usize,
    buffer: usize,
    size: usize,
    write: usize,
    read: usize,
    mode: usize,
}

#[derive(Debug, Serialize)]
struct RecordLayout {
    direction: String,
    index: usize,
    name: Option<String>,
    size: u32,
    mode: &'static str,
    mode_code: u32,
    offset: usize,
    fields: FieldOffsets,
}

#[derive(Debug, Serialize)]
struct LayoutOutput {
    schema_id: &'static str,
    id: String,
    pointer_width: u32,
    header_size: usize,
    up_count: usize,
    down_count: usize,
    block_size: usize,
    storage_bytes: u64,
    records: Vec<RecordLayout>,
}

pub fn run(args: LayoutArgs, format: OutputFormat) -> CliResult<i32> {
    let file = match &args.config {
        Some(path) => load_config(path)?,
        None => default_config(),
    };
    let output = describe(&file)?;
    tracing::debug!(
        up = output.up_count,
        down = output.down_count,
        size = output.block_size,
        "layout computed"
    );
    print_layout(&output, format);
    Ok(SUCCESS)
}

fn default_config() -> LayoutFile {
    LayoutFile {
        id: None,
        up: vec![ChannelEntry {
            name: Some("Terminal".to_string()),
            size: 1024,
            mode: Some(ChannelMode::NoBlockTrim.name().to_string()),
        }],
        down: vec![ChannelEntry {
            name: Some("Terminal".to_string()),
            size: 16,
            mode: Some(ChannelMode::BlockIfFull.name().to_string()),
        }],
    }
}

fn load_config(path: &Path) -> CliResult<LayoutFile> {
    let context = format!("read {}", path.display());
    let file = fs::File::open(path).map_err(|err| io_error(&context, err))?;
    let mut text = String::new();
    file.take(MAX_CONFIG_BYTES + 1)
        .read_to_string(&mut text)
        .map_err(|err| io_error(&context, err))?;
    if text.len() as u64 > MAX_CONFIG_BYTES {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{context}: configuration exceeds {MAX_CONFIG_BYTES} bytes"),
        ));
    }
    serde_json::from_str(&text).map_err(|err| json_error(&format!("parse {}", path.display()), err))
}

fn describe(file: &LayoutFile) -> CliResult<LayoutOutput> {
    let id = match &file.id {
        Some(text) => ControlBlockId::from_prefix(text.as_bytes())
            .map_err(|err| config_error("identifier", err))?,
        None => ControlBlockId::DEFAULT,
    };

    let mut records = Vec::with_capacity(file.up.len() + file.down.len());
    let channels = file
        .up
        .iter()
        .enumerate()
        .map(|(i, entry)| (Direction::Up, i, entry))
        .chain(file.down.iter().enumerate().map(|(i, entry)| (Direction::Down, i, entry)));

    for (direction, index, entry) in channels {
        let mode = match &entry.mode {
            Some(text) => text
                .parse::<ChannelMode>()
                .map_err(|err| mode_error(&format!("{direction} channel {index}"), err))?,
            None => ChannelMode::default(),
        };
        if entry.name.as_deref().is_some_and(|name| name.contains('\0')) {
            return Err(CliError::new(
                DATA_INVALID,
                format!("{direction} channel {index}: name contains a NUL byte"),
            ));
        }
        let offset = layout::record_offset(records.len());
        records.push(RecordLayout {
            direction: direction.to_string(),
            index,
            name: entry.name.clone(),
            size: entry.size,
            mode: mode.name(),
            mode_code: mode.code(),
            offset,
            fields: FieldOffsets {
                name: offset + field::NAME,
                buffer: offset + field::BUFFER,
                size: offset + field::SIZE,
                write: offset + field::WRITE,
                read: offset + field::READ,
                mode: offset + field::MODE,
            },
        });
    }

    Ok(LayoutOutput {
        schema_id: "https://schemas.3leaps.dev/rttprims/cli/v1/layout.schema.json",
        id: String::from_utf8_lossy(id.trimmed()).into_owned(),
        pointer_width: 4,
        header_size: layout::HEADER_SIZE,
        up_count: file.up.len(),
        down_count: file.down.len(),
        block_size: layout::block_size(file.up.len(), file.down.len()),
        storage_bytes: records.iter().map(|r| u64::from(r.size)).sum(),
        records,
    })
}

fn print_layout(output: &LayoutOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table => {
            let mut header = table(["FIELD", "OFFSET", "BYTES", "VALUE"]);
            header.add_row(vec![
                "id".to_string(),
                layout::ID_OFFSET.to_string(),
                layout::ID_LEN.to_string(),
                output.id.clone(),
            ]);
            header.add_row(vec![
                "up count".to_string(),
                layout::UP_COUNT_OFFSET.to_string(),
                "4".to_string(),
                output.up_count.to_string(),
            ]);
            header.add_row(vec![
                "down count".to_string(),
                layout::DOWN_COUNT_OFFSET.to_string(),
                "4".to_string(),
                output.down_count.to_string(),
            ]);
            println!("{header}");

            let mut records = table(["CHANNEL", "NAME", "SIZE", "MODE", "OFFSET", "WRITE", "READ"]);
            for r in &output.records {
                records.add_row(vec![
                    format!("{} {}", r.direction, r.index),
                    r.name.clone().unwrap_or_else(|| "-".to_string()),
                    r.size.to_string(),
                    format!("{} ({})", r.mode, r.mode_code),
                    r.offset.to_string(),
                    r.fields.write.to_string(),
                    r.fields.read.to_string(),
                ]);
            }
            println!("{records}");
            println!(
                "block size: {} bytes, channel storage: {} bytes",
                output.block_size, output.storage_bytes
            );
        }
        OutputFormat::Pretty => {
            println!(
                "id={:?} up={} down={} block_size={} storage={}",
                output.id,
                output.up_count,
                output.down_count,
                output.block_size,
                output.storage_bytes
            );
            for r in &output.records {
                println!(
                    "{} {} name={} size={} mode={} offset={} write@{} read@{}",
                    r.direction,
                    r.index,
                    r.name.as_deref().unwrap_or("-"),
                    r.size,
                    r.mode,
                    r.offset,
                    r.fields.write,
                    r.fields.read
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_two_terminal_channels() {
        let out = describe(&default_config()).expect("default config should describe");
        assert_eq!(out.id, "SEGGER RTT");
        assert_eq!(out.block_size, 72);
        assert_eq!(out.storage_bytes, 1040);
        assert_eq!(out.records[0].mode_code, 1);
        assert_eq!(out.records[1].direction, "down");
        assert_eq!(out.records[1].offset, 48);
        assert_eq!(out.records[1].fields.mode, 68);
    }

    #[test]
    fn missing_mode_defaults_to_block() {
        let file: LayoutFile =
            serde_json::from_str(r#"{"up":[{"size":256}]}"#).expect("config should parse");
        let out = describe(&file).expect("config should describe");
        assert_eq!(out.records[0].mode, "block");
        assert_eq!(out.down_count, 0);
    }

    #[test]
    fn oversized_identifier_rejected() {
        let file: LayoutFile = serde_json::from_str(r#"{"id":"THIS IDENTIFIER IS TOO LONG"}"#)
            .expect("config should parse");
        let err = describe(&file).expect_err("long id should fail");
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn unknown_mode_rejected() {
        let file: LayoutFile = serde_json::from_str(r#"{"down":[{"size":16,"mode":"drop"}]}"#)
            .expect("config should parse");
        let err = describe(&file).expect_err("unknown mode should fail");
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("down channel 0"));
    }

    #[test]
    fn unknown_fields_rejected() {
        let err = serde_json::from_str::<LayoutFile>(r#"{"up":[],"extra":1}"#)
            .expect_err("unknown field should fail");
        assert_eq!(json_error("parse", err).code, DATA_INVALID);
    }
}
