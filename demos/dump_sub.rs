extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate trackable;
extern crate vobsub_pes;

use clap::{App, Arg};
use std::fs;
use trackable::error::Failure;
use vobsub_pes::pes::{PACK_HEADER_LEN, PES_START_CODE_LEN, PES_STREAM_ID_LEN};
use vobsub_pes::sub::{SpuDecoder, SubParser};
use vobsub_pes::ReassemblerConfig;

const PACK_START: [u8; 4] = [0x00, 0x00, 0x01, 0xBA];
const PES_START: [u8; 4] = [0x00, 0x00, 0x01, 0xBD];

/// Offset of the PTS/DTS flags byte from the start of the PES frame.
const PES_FLAGS_OFFSET: usize = PES_START_CODE_LEN + PES_STREAM_ID_LEN + 2 + 1;

/// Offsets, at or after `start`, of pack headers followed by a private
/// stream 1 frame that starts a new subtitle packet.
fn packet_offsets(bytes: &[u8], start: usize, config: &ReassemblerConfig) -> Vec<u64> {
    (start..bytes.len())
        .filter(|&i| {
            let h = &bytes[i..];
            if h.len() < PACK_HEADER_LEN || h[..4] != PACK_START {
                return false;
            }
            let stuffing = if config.honor_pack_stuffing {
                usize::from(h[PACK_HEADER_LEN - 1] & 0b111)
            } else {
                0
            };
            let pes = match h.get(PACK_HEADER_LEN + stuffing..) {
                Some(pes) => pes,
                None => return false,
            };
            pes.len() > PES_FLAGS_OFFSET
                && pes[..4] == PES_START
                && (pes[PES_FLAGS_OFFSET] >> 6) & 0b11 == 0b10
        })
        .map(|i| i as u64)
        .collect()
}

fn main() {
    env_logger::init();
    let matches = App::new("dump_sub")
        .arg(
            Arg::with_name("FILE")
                .help("VobSub *.sub file")
                .index(1)
                .required(true),
        )
        .arg(
            Arg::with_name("OFFSET")
                .long("offset")
                .short("o")
                .takes_value(true)
                .default_value("0")
                .help("Byte offset to start walking from"),
        )
        .arg(
            Arg::with_name("MAX")
                .long("max")
                .short("m")
                .takes_value(true)
                .help("Maximum number of subtitles to print"),
        )
        .get_matches();

    let path = matches.value_of("FILE").unwrap();
    let start = track_try_unwrap!(matches
        .value_of("OFFSET")
        .unwrap()
        .parse::<usize>()
        .map_err(Failure::from_error));
    let max = matches
        .value_of("MAX")
        .map(|v| track_try_unwrap!(v.parse::<usize>().map_err(Failure::from_error)))
        .unwrap_or(usize::MAX);

    let config = ReassemblerConfig::from_env();
    let bytes = track_try_unwrap!(fs::read(path).map_err(Failure::from_error));
    let offsets = packet_offsets(&bytes, start, &config);

    let mut parser = SubParser::open_with_config(path, SpuDecoder::new(), config);
    if !parser.is_valid() {
        eprintln!("Cannot open {}", path);
        std::process::exit(1);
    }

    for offset in offsets.into_iter().take(max) {
        match parser.parse(offset) {
            Ok(next) => println!(
                "@{:#010x}..{:#010x} {:>6}ms-{:>6}ms {}x{}",
                offset,
                next,
                parser.begin_time().unwrap_or(0),
                parser
                    .end_time()
                    .map_or_else(|| "?".to_owned(), |t| t.to_string()),
                parser.subtitle_width().unwrap_or(0),
                parser.subtitle_height().unwrap_or(0)
            ),
            Err(e) => eprintln!("@{:#010x} {}", offset, e),
        }
        parser.advance_temp_file_index();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(stuffing: u8) -> Vec<u8> {
        let mut bytes = PACK_START.to_vec();
        bytes.extend_from_slice(&[0x44, 0x00, 0x04, 0x00, 0x04, 0x01, 0x01, 0x89, 0xC3]);
        bytes.push(0xF8 | stuffing);
        bytes.extend((0..stuffing).map(|_| 0xFF));
        bytes
    }

    fn frame(stuffing: u8, new_packet: bool) -> Vec<u8> {
        let mut bytes = pack(stuffing);
        bytes.extend_from_slice(&PES_START);
        bytes.extend_from_slice(&[0x00, 0x08, 0x81, if new_packet { 0x80 } else { 0x00 }, 0x00]);
        bytes.extend_from_slice(&[0x20, 0x00, 0x04, 0x00, 0x00]);
        bytes
    }

    #[test]
    fn scan_from_start_offset() {
        let mut bytes = frame(0, true);
        let second = bytes.len();
        bytes.extend(frame(0, false));
        let third = bytes.len();
        bytes.extend(frame(0, true));
        let fourth = bytes.len();
        bytes.extend(frame(0, true));

        let config = ReassemblerConfig::new();
        assert_eq!(
            packet_offsets(&bytes, 0, &config),
            vec![0, third as u64, fourth as u64]
        );
        assert_eq!(
            packet_offsets(&bytes, second, &config),
            vec![third as u64, fourth as u64]
        );
        assert_eq!(packet_offsets(&bytes, third, &config).len(), 2);
        assert!(packet_offsets(&bytes, bytes.len(), &config).is_empty());
    }

    #[test]
    fn scan_with_pack_stuffing() {
        let mut bytes = frame(3, true);
        let second = bytes.len();
        bytes.extend(frame(2, true));

        let plain = ReassemblerConfig::new();
        assert!(packet_offsets(&bytes, 0, &plain).is_empty());

        let stuffed = ReassemblerConfig::new().honor_pack_stuffing(true);
        assert_eq!(
            packet_offsets(&bytes, 0, &stuffed),
            vec![0, second as u64]
        );
    }
}
