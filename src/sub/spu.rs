//! DVD subpicture unit (SPU) control section decoding.
//!
//! A subpicture unit starts with two big-endian 16-bit words: the total size
//! of the unit and the offset of its first control sequence. Run-length
//! encoded bitmap data sits between the two, and is left undecoded here.
use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, Cursor, Read};
use trackable::error::ErrorKindExt;

use util;
use {Error, ErrorKind, Result};

use super::decoder::{Palette, SubtitleDecoder};

/// Length of the SPU header (unit size and control offset).
const SPU_HEADER_LEN: usize = 4;

const CMD_FORCE: u8 = 0x00;
const CMD_START: u8 = 0x01;
const CMD_STOP: u8 = 0x02;
const CMD_COLORS: u8 = 0x03;
const CMD_ALPHA: u8 = 0x04;
const CMD_AREA: u8 = 0x05;
const CMD_FIELD_OFFSETS: u8 = 0x06;
const CMD_END: u8 = 0xFF;

/// Display area of a subtitle, with right and bottom coordinates inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    /// Leftmost column.
    pub x1: u16,
    /// Rightmost column.
    pub x2: u16,
    /// Top row.
    pub y1: u16,
    /// Bottom row.
    pub y2: u16,
}
impl Area {
    fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut b = [0; 6];
        track!(reader.read_exact(&mut b).map_err(decode_error))?;
        let area = Area {
            x1: u16::from(b[0]) << 4 | u16::from(b[1]) >> 4,
            x2: u16::from(b[1] & 0x0F) << 8 | u16::from(b[2]),
            y1: u16::from(b[3]) << 4 | u16::from(b[4]) >> 4,
            y2: u16::from(b[4] & 0x0F) << 8 | u16::from(b[5]),
        };
        track_assert!(
            area.x1 <= area.x2 && area.y1 <= area.y2,
            ErrorKind::DecodeFailed,
            "Invalid subtitle area: {:?}",
            area
        );
        Ok(area)
    }

    /// Returns the width of the area.
    pub fn width(&self) -> u16 {
        self.x2 + 1 - self.x1
    }

    /// Returns the height of the area.
    pub fn height(&self) -> u16 {
        self.y2 + 1 - self.y1
    }
}

/// A [`SubtitleDecoder`](trait.SubtitleDecoder.html) that interprets the SPU
/// control sequences: timing, display area, colours and field offsets.
#[derive(Debug, Default)]
pub struct SpuDecoder {
    packet: Vec<u8>,
    control_offset: usize,
    begin_time: Option<u32>,
    end_time: Option<u32>,
    forced: bool,
    color_indexes: Option<[u8; 4]>,
    alpha: Option<[u8; 4]>,
    area: Option<Area>,
    field_offsets: Option<[u16; 2]>,
    data_parsed: bool,
    palette: Option<Palette>,
    temp_file_index: u32,
}
impl SpuDecoder {
    /// Makes a new `SpuDecoder` instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the subtitle must be shown even when subtitles are off.
    pub fn forced(&self) -> bool {
        self.forced
    }

    /// Returns the four palette indexes (background, pattern, emphasis 1, emphasis 2).
    pub fn color_indexes(&self) -> Option<[u8; 4]> {
        self.color_indexes
    }

    /// Returns the four 4-bit alpha values matching `color_indexes`.
    pub fn alpha(&self) -> Option<[u8; 4]> {
        self.alpha
    }

    /// Returns the display area.
    pub fn area(&self) -> Option<Area> {
        self.area
    }

    /// Returns the offsets of the top and bottom field RLE data.
    ///
    /// Only set once the data section has been validated.
    pub fn field_offsets(&self) -> Option<[u16; 2]> {
        if self.data_parsed {
            self.field_offsets
        } else {
            None
        }
    }

    /// Returns the four colours of the subtitle, resolved through the palette.
    pub fn colors(&self) -> Option<[u32; 4]> {
        let palette = self.palette.as_ref()?;
        let indexes = self.color_indexes?;
        let mut colors = [0; 4];
        for (c, &i) in colors.iter_mut().zip(indexes.iter()) {
            *c = palette[usize::from(i)];
        }
        Some(colors)
    }

    fn clear(&mut self) {
        self.packet.clear();
        self.control_offset = 0;
        self.begin_time = None;
        self.end_time = None;
        self.forced = false;
        self.color_indexes = None;
        self.alpha = None;
        self.area = None;
        self.field_offsets = None;
        self.data_parsed = false;
    }

    /// Parses one control sequence and returns the offset of the next one.
    fn parse_control_sequence(&mut self, offset: usize) -> Result<usize> {
        let mut reader = Cursor::new(&self.packet[offset..]);
        let date = track!(reader.read_u16::<BigEndian>().map_err(decode_error))?;
        let next = track!(reader.read_u16::<BigEndian>().map_err(decode_error))?;
        let time = delay_to_millis(date);
        trace!(
            "Control sequence at 0x{:x}: date={}, next=0x{:x}",
            offset,
            date,
            next
        );

        loop {
            let command = track!(reader.read_u8().map_err(decode_error))?;
            match command {
                CMD_FORCE => self.forced = true,
                CMD_START => self.begin_time = self.begin_time.or(Some(time)),
                CMD_STOP => self.end_time = self.end_time.or(Some(time)),
                CMD_COLORS => {
                    let nibbles = track!(read_nibbles(&mut reader))?;
                    self.color_indexes = self.color_indexes.or(Some(nibbles));
                }
                CMD_ALPHA => {
                    let nibbles = track!(read_nibbles(&mut reader))?;
                    self.alpha = self.alpha.or(Some(nibbles));
                }
                CMD_AREA => {
                    let area = track!(Area::read_from(&mut reader))?;
                    self.area = self.area.or(Some(area));
                }
                CMD_FIELD_OFFSETS => {
                    let top = track!(reader.read_u16::<BigEndian>().map_err(decode_error))?;
                    let bottom = track!(reader.read_u16::<BigEndian>().map_err(decode_error))?;
                    self.field_offsets = Some([top, bottom]);
                }
                CMD_END => break,
                _ => {
                    // The `next` field still locates the following sequence.
                    warn!(
                        "Unsupported SPU command 0x{:02x} at 0x{:x}",
                        command,
                        offset + reader.position() as usize - 1
                    );
                    break;
                }
            }
        }
        Ok(usize::from(next))
    }
}
impl SubtitleDecoder for SpuDecoder {
    fn init(&mut self, packet: &[u8]) {
        self.clear();
        self.packet.extend_from_slice(packet);
    }

    fn parse_control_section(&mut self) -> Result<()> {
        track_assert!(
            self.packet.len() >= SPU_HEADER_LEN,
            ErrorKind::DecodeFailed,
            "Subtitle packet too short: {} bytes",
            self.packet.len()
        );
        let unit_size = util::read_be(&self.packet[0..2]) as usize;
        if unit_size != self.packet.len() {
            warn!(
                "SPU size mismatch: header={}, packet={}",
                unit_size,
                self.packet.len()
            );
        }

        let mut offset = util::read_be(&self.packet[2..4]) as usize;
        track_assert!(
            SPU_HEADER_LEN <= offset && offset < self.packet.len(),
            ErrorKind::DecodeFailed,
            "Control offset 0x{:x} outside packet of 0x{:x} bytes",
            offset,
            self.packet.len()
        );
        self.control_offset = offset;

        loop {
            let next = track!(self.parse_control_sequence(offset))?;
            if next == offset {
                break;
            }
            track_assert!(
                offset < next && next < self.packet.len(),
                ErrorKind::DecodeFailed,
                "Bad next control sequence offset: current=0x{:x}, next=0x{:x}",
                offset,
                next
            );
            offset = next;
        }

        track_assert!(
            self.begin_time.is_some(),
            ErrorKind::DecodeFailed,
            "No start time for subtitle"
        );
        debug!(
            "SPU control section: begin={:?}, end={:?}, area={:?}",
            self.begin_time, self.end_time, self.area
        );
        Ok(())
    }

    fn data_packet_size(&self) -> usize {
        self.control_offset
    }

    fn parse_data_section(&mut self) -> Result<()> {
        let area = track_assert_some!(self.area, ErrorKind::DecodeFailed, "No subtitle area");
        let offsets = track_assert_some!(
            self.field_offsets,
            ErrorKind::DecodeFailed,
            "No RLE field offsets"
        );
        let top = usize::from(offsets[0]);
        let bottom = usize::from(offsets[1]);
        track_assert!(
            SPU_HEADER_LEN <= top && top <= bottom && bottom < self.control_offset,
            ErrorKind::DecodeFailed,
            "Invalid RLE field offsets: top=0x{:x}, bottom=0x{:x}, control=0x{:x}",
            top,
            bottom,
            self.control_offset
        );
        self.data_parsed = true;
        debug!("SPU data section: {}x{}", area.width(), area.height());
        Ok(())
    }

    fn reset(&mut self) {
        self.clear();
    }

    fn begin_time(&self) -> Option<u32> {
        self.begin_time
    }

    fn end_time(&self) -> Option<u32> {
        self.end_time
    }

    fn width(&self) -> Option<u16> {
        self.area.map(|a| a.width())
    }

    fn height(&self) -> Option<u16> {
        self.area.map(|a| a.height())
    }

    fn set_palette(&mut self, palette: &Palette) {
        self.palette = Some(*palette);
    }

    fn temp_file_index(&self) -> u32 {
        self.temp_file_index
    }

    fn advance_temp_file_index(&mut self) {
        self.temp_file_index = self.temp_file_index.wrapping_add(1);
    }
}

/// Converts an SPU delay (1024/90000 s units) to milliseconds.
fn delay_to_millis(date: u16) -> u32 {
    (u32::from(date) << 10) / 90
}

fn read_nibbles<R: Read>(mut reader: R) -> Result<[u8; 4]> {
    let mut b = [0; 2];
    track!(reader.read_exact(&mut b).map_err(decode_error))?;
    Ok([b[0] >> 4, b[0] & 0x0F, b[1] >> 4, b[1] & 0x0F])
}

fn decode_error(e: io::Error) -> Error {
    ErrorKind::DecodeFailed.cause(e).into()
}
