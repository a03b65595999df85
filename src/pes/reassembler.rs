use std::io::{Read, Seek, SeekFrom};

use util;
use {Error, ErrorKind, ReassemblerConfig, Result};

use super::header::{read_exact, FrameHeader};

/// Length of the size field that opens every subtitle packet.
const SUBTITLE_PACKET_SIZE_LEN: usize = 2;

/// A (possibly partially) reassembled subtitle packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitlePacket {
    declared_len: usize,
    data: Vec<u8>,
}
impl SubtitlePacket {
    fn with_declared_len(declared_len: usize) -> Result<Self> {
        let mut data = Vec::new();
        track_assert!(
            data.try_reserve_exact(declared_len).is_ok(),
            ErrorKind::OutOfMemory,
            "Cannot allocate a subtitle packet of {} bytes",
            declared_len
        );
        Ok(SubtitlePacket { declared_len, data })
    }

    /// Returns the packet length declared by the first frame.
    pub fn declared_len(&self) -> usize {
        self.declared_len
    }

    /// Returns the number of bytes collected so far.
    pub fn filled_len(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of bytes still missing.
    pub fn remaining_len(&self) -> usize {
        self.declared_len - self.data.len()
    }

    /// Returns `true` if every declared byte has been collected.
    pub fn is_complete(&self) -> bool {
        self.data.len() == self.declared_len
    }

    /// Returns the collected bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Converts `SubtitlePacket` into the collected bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Outcome of a successful reassembly step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The packet needs more frames.
    Continue,

    /// The packet is complete.
    Complete,
}

/// The result of [`PesReassembler::advance`](struct.PesReassembler.html#method.advance).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Whether the current packet is complete.
    pub progress: Progress,

    /// The read position after the consumed frame, i.e. where the next frame starts.
    pub cursor: u64,
}

/// Reassembles subtitle packets spread over consecutive PES frames.
///
/// A frame whose PTS/DTS flags are `0b10` starts a new packet, whose total
/// length is given by the first two payload bytes. Any other frame continues
/// the current packet. Completion is detected purely by comparing the bytes
/// collected against the declared length.
#[derive(Debug, Default)]
pub struct PesReassembler {
    config: ReassemblerConfig,
    packet: Option<SubtitlePacket>,
}
impl PesReassembler {
    /// Makes a new `PesReassembler` instance.
    pub fn new(config: ReassemblerConfig) -> Self {
        PesReassembler {
            config,
            packet: None,
        }
    }

    /// Returns the configuration of this reassembler.
    pub fn config(&self) -> &ReassemblerConfig {
        &self.config
    }

    /// Returns the packet under construction (or the last completed one).
    pub fn packet(&self) -> Option<&SubtitlePacket> {
        self.packet.as_ref()
    }

    /// Takes the current packet out of the reassembler.
    pub fn take_packet(&mut self) -> Option<SubtitlePacket> {
        self.packet.take()
    }

    /// Discards the current packet.
    pub fn reset(&mut self) {
        self.packet = None;
    }

    /// Consumes the frame starting at `cursor` and appends its payload to the current packet.
    ///
    /// # Errors
    ///
    /// - `ErrorKind::InvalidInput`: a new packet declares a zero length, a
    ///   continuation frame arrives with no packet started, or the source ends
    ///   early.
    /// - `ErrorKind::OutOfMemory`: the declared packet cannot be allocated.
    ///
    /// A partially filled packet is left untouched when a step fails.
    pub fn advance<R: Read + Seek>(&mut self, source: &mut R, cursor: u64) -> Result<Step> {
        track!(source.seek(SeekFrom::Start(cursor)).map_err(Error::from))?;
        let header = track!(
            FrameHeader::read_from(&mut *source, &self.config),
            "cursor={}",
            cursor
        )?;

        if header.new_packet {
            let mut size = [0; SUBTITLE_PACKET_SIZE_LEN];
            track!(read_exact(&mut *source, &mut size))?;
            track!(source
                .seek(SeekFrom::Current(-(SUBTITLE_PACKET_SIZE_LEN as i64)))
                .map_err(Error::from))?;

            let declared_len = util::read_be(&size) as usize;
            debug!("New subtitle packet: {} bytes at offset {}", declared_len, cursor);
            track_assert!(
                declared_len > 0,
                ErrorKind::InvalidInput,
                "Empty subtitle packet at offset {}",
                cursor
            );
            if let Some(old) = self.packet.take() {
                if !old.is_complete() {
                    warn!(
                        "Discarding unfinished subtitle packet: {}/{} bytes",
                        old.filled_len(),
                        old.declared_len()
                    );
                }
            }
            self.packet = Some(track!(SubtitlePacket::with_declared_len(declared_len))?);
        }

        let available = track!(header.payload_len())?;
        let packet = track_assert_some!(
            self.packet.as_mut(),
            ErrorKind::InvalidInput,
            "Continuation frame without a preceding new packet at offset {}",
            cursor
        );

        let needed = packet.remaining_len();
        let (read_size, progress) = if available >= needed {
            (needed, Progress::Complete)
        } else {
            (available, Progress::Continue)
        };

        let start = packet.data.len();
        packet.data.resize(start + read_size, 0);
        if let Err(e) = read_exact(&mut *source, &mut packet.data[start..]) {
            packet.data.truncate(start);
            return Err(track!(e));
        }

        let cursor = track!(source.seek(SeekFrom::Current(0)).map_err(Error::from))?;
        debug!(
            "Subtitle packet {}/{} bytes, next frame at {} ({:?})",
            packet.filled_len(),
            packet.declared_len(),
            cursor,
            progress
        );
        Ok(Step { progress, cursor })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    const PREFIX: [u8; 18] = [
        0x00, 0x00, 0x01, 0xBA, 0x44, 0x00, 0x04, 0x00, 0x04, 0x01, 0x01, 0x89, 0xC3, 0xF8,
        0x00, 0x00, 0x01, 0xBD,
    ];

    fn frame(new_packet: bool, payload: &[u8]) -> Vec<u8> {
        let mut bytes = PREFIX.to_vec();
        let len = 2 + 1 + 2 + 1 + payload.len();
        bytes.extend_from_slice(&[(len >> 8) as u8, len as u8]);
        bytes.extend_from_slice(&[0x81, if new_packet { 0x80 } else { 0x00 }, 0x02]);
        bytes.extend_from_slice(&[0x11, 0x22, 0x20]);
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn single_frame_packet() {
        let payload = [0x00, 0x06, 0xA1, 0xA2, 0xA3, 0xA4, 0xEE, 0xEE];
        let bytes = frame(true, &payload);
        let mut source = Cursor::new(bytes.clone());
        let mut reassembler = PesReassembler::default();

        let step = reassembler.advance(&mut source, 0).unwrap();
        assert_eq!(step.progress, Progress::Complete);
        assert_eq!(step.cursor as usize, bytes.len() - 2);

        let packet = reassembler.packet().unwrap();
        assert!(packet.is_complete());
        assert_eq!(packet.data(), &payload[..6]);
    }

    #[test]
    fn packet_split_over_two_frames() {
        let mut bytes = frame(true, &[0x00, 0x07, 0xB1, 0xB2]);
        let second = bytes.len() as u64;
        bytes.extend(frame(false, &[0xB3, 0xB4, 0xB5]));
        let mut source = Cursor::new(bytes.clone());
        let mut reassembler = PesReassembler::default();

        let step = reassembler.advance(&mut source, 0).unwrap();
        assert_eq!(
            step,
            Step {
                progress: Progress::Continue,
                cursor: second,
            }
        );
        assert_eq!(reassembler.packet().unwrap().filled_len(), 4);

        let step = reassembler.advance(&mut source, step.cursor).unwrap();
        assert_eq!(step.progress, Progress::Complete);
        assert_eq!(step.cursor as usize, bytes.len());
        assert_eq!(
            reassembler.packet().unwrap().data(),
            &[0x00, 0x07, 0xB1, 0xB2, 0xB3, 0xB4, 0xB5]
        );
    }

    #[test]
    fn continuation_without_packet() {
        let mut source = Cursor::new(frame(false, &[0x01, 0x02, 0x03]));
        let mut reassembler = PesReassembler::default();

        let e = reassembler.advance(&mut source, 0).unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::InvalidInput);
        assert!(reassembler.packet().is_none());
    }

    #[test]
    fn zero_length_packet() {
        let mut source = Cursor::new(frame(true, &[0x00, 0x00, 0x03]));
        let mut reassembler = PesReassembler::default();

        let e = reassembler.advance(&mut source, 0).unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn truncated_payload_keeps_partial_packet() {
        let mut bytes = frame(true, &[0x00, 0x08, 0xC1, 0xC2]);
        let second = bytes.len() as u64;
        let mut tail = frame(false, &[0xC3, 0xC4, 0xC5, 0xC6]);
        tail.truncate(tail.len() - 2);
        bytes.extend(tail);
        let mut source = Cursor::new(bytes);
        let mut reassembler = PesReassembler::default();

        assert_eq!(
            reassembler.advance(&mut source, 0).unwrap().progress,
            Progress::Continue
        );
        let e = reassembler.advance(&mut source, second).unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::InvalidInput);
        assert_eq!(reassembler.packet().unwrap().data(), &[0x00, 0x08, 0xC1, 0xC2]);
    }

    #[test]
    fn new_packet_replaces_unfinished_one() {
        let mut bytes = frame(true, &[0x00, 0x10, 0xD1]);
        let second = bytes.len() as u64;
        bytes.extend(frame(true, &[0x00, 0x03, 0xD2]));
        let mut source = Cursor::new(bytes);
        let mut reassembler = PesReassembler::default();

        reassembler.advance(&mut source, 0).unwrap();
        let step = reassembler.advance(&mut source, second).unwrap();
        assert_eq!(step.progress, Progress::Complete);
        assert_eq!(reassembler.packet().unwrap().data(), &[0x00, 0x03, 0xD2]);
    }

    #[test]
    fn empty_source() {
        let mut source = Cursor::new(Vec::new());
        let mut reassembler = PesReassembler::default();

        let e = reassembler.advance(&mut source, 0).unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::InvalidInput);
    }
}
