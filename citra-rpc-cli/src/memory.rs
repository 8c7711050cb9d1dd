//! Guest memory commands: read, write.

use std::io::Write;

use anyhow::{Context, Result, bail};
use citra_rpc::Client;
use serde::Serialize;

/// Arguments for `citra-rpc read`.
#[derive(clap::Args)]
pub struct ReadArgs {
    /// Start address (decimal or 0x-prefixed hex).
    #[arg(value_parser = parse_address)]
    pub address: u32,

    /// Number of bytes to read.
    pub len: usize,

    /// Output format.
    #[arg(long, default_value = "hex")]
    pub format: ReadFormat,
}

/// Arguments for `citra-rpc write`.
#[derive(clap::Args)]
pub struct WriteArgs {
    /// Start address (decimal or 0x-prefixed hex).
    #[arg(value_parser = parse_address)]
    pub address: u32,

    /// Bytes to write as hex, e.g. `deadbeef` or `de ad be ef`.
    #[arg(required = true, num_args = 1..)]
    pub data: Vec<String>,
}

/// Output format for `citra-rpc read`.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ReadFormat {
    /// Hex dump with addresses.
    #[default]
    Hex,
    /// JSON object with address and byte array.
    Json,
    /// Raw bytes to stdout.
    Raw,
}

/// JSON shape of a memory read.
#[derive(Serialize)]
struct Dump<'a> {
    address: u32,
    data: &'a [u8],
}

pub fn read(c: &mut Client, args: &ReadArgs) -> Result<()> {
    let Some(data) = c.read_memory(args.address, args.len)? else {
        bail!(
            "emulator rejected the read of {} bytes at {:#010x}",
            args.len,
            args.address
        );
    };
    tracing::debug!(len = data.len(), "read complete");

    match args.format {
        ReadFormat::Hex => print!("{}", hexdump(args.address, &data)),
        ReadFormat::Json => {
            let dump = Dump {
                address: args.address,
                data: &data,
            };
            println!("{}", serde_json::to_string(&dump)?);
        }
        ReadFormat::Raw => {
            let mut out = std::io::stdout().lock();
            out.write_all(&data)?;
            out.flush()?;
        }
    }
    Ok(())
}

pub fn write(c: &mut Client, args: &WriteArgs) -> Result<()> {
    let data = parse_hex(&args.data.concat())?;
    if !c.write_memory(args.address, &data)? {
        bail!(
            "emulator rejected the write of {} bytes at {:#010x}",
            data.len(),
            args.address
        );
    }
    println!("{} bytes written at {:#010x}", data.len(), args.address);
    Ok(())
}

/// Parses a decimal or `0x`-prefixed hex address.
fn parse_address(s: &str) -> Result<u32> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(&hex.replace('_', ""), 16),
        None => s.replace('_', "").parse(),
    };
    parsed.with_context(|| format!("invalid address: {s}"))
}

/// Decodes a hex string, ignoring whitespace.
fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let digits: Vec<u8> = s.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if digits.len() % 2 != 0 {
        bail!("hex data has an odd number of digits");
    }
    digits
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).context("hex data is not ASCII")?;
            u8::from_str_radix(pair, 16).with_context(|| format!("invalid hex byte: {pair}"))
        })
        .collect()
}

/// Formats `data` as 16-byte rows prefixed with their address.
fn hexdump(base: u32, data: &[u8]) -> String {
    let mut out = String::new();
    let mut addr = base;
    for row in data.chunks(16) {
        let bytes: Vec<String> = row.iter().map(|b| format!("{b:02x}")).collect();
        out.push_str(&format!("{addr:08x}: {}\n", bytes.join(" ")));
        addr = addr.wrapping_add(16);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses() {
        assert_eq!(parse_address("4096").unwrap(), 0x1000);
        assert_eq!(parse_address("0x0010_0000").unwrap(), 0x0010_0000);
        assert_eq!(parse_address("0XFF").unwrap(), 255);
        assert!(parse_address("0x1_0000_0000").is_err());
        assert!(parse_address("zz").is_err());
    }

    #[test]
    fn hex_data() {
        assert_eq!(parse_hex("deadBEEF").unwrap(), [0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(parse_hex("00 ff").unwrap(), [0x00, 0xFF]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("gg").is_err());
    }

    #[test]
    fn dump_rows() {
        let data: Vec<u8> = (0..18).collect();
        let dump = hexdump(0x1000, &data);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "00001000: 00 01 02 03 04 05 06 07 08 09 0a 0b 0c 0d 0e 0f"
        );
        assert_eq!(lines[1], "00001010: 10 11");
    }

    #[test]
    fn dump_address_wraps() {
        let dump = hexdump(0xFFFF_FFF8, &[0xAB; 20]);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[1], "00000008: ab ab ab ab");
        assert!(hexdump(0, &[]).is_empty());
    }
}
