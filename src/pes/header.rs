use byteorder::{BigEndian, ReadBytesExt};
use std::io::{self, Read};

use es::{StreamId, SubstreamId};
use {Error, ErrorKind, ReassemblerConfig, Result};

/// Length of an MPEG-2 pack header without stuffing (`00 00 01 BA` plus 10 bytes).
pub const PACK_HEADER_LEN: usize = 14;

/// Length of the PES start code prefix (`00 00 01`).
pub const PES_START_CODE_LEN: usize = 3;

/// Length of the PES stream identifier.
pub const PES_STREAM_ID_LEN: usize = 1;

/// Bytes following the packet length field that are not payload:
/// the two flag bytes, the header data length byte and the substream id.
const FIXED_HEADER_OVERHEAD: i32 = 2 + 1 + 1;

/// The header of a single PES frame, as seen by the subtitle reassembler.
///
/// Reading a header consumes everything up to the first payload byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// Stream identifier following the PES start code. Not validated.
    pub stream_id: StreamId,

    /// `PES_packet_length`: the number of bytes following this field.
    pub packet_len: u16,

    /// `true` if the PTS/DTS flags are `0b10`, i.e. the frame starts a new subtitle packet.
    pub new_packet: bool,

    /// `PES_header_data_length`.
    pub remain_header_len: u8,

    /// The byte trailing the optional header.
    pub substream_id: SubstreamId,
}
impl FrameHeader {
    /// Reads a pack header prefix and a PES frame header from `reader`.
    pub fn read_from<R: Read>(mut reader: R, config: &ReassemblerConfig) -> Result<Self> {
        let mut pack = [0; PACK_HEADER_LEN];
        track!(read_exact(&mut reader, &mut pack))?;
        if config.honor_pack_stuffing {
            let stuffing = u64::from(pack[PACK_HEADER_LEN - 1] & 0b111);
            track!(skip(&mut reader, stuffing))?;
        }

        let mut start = [0; PES_START_CODE_LEN + PES_STREAM_ID_LEN];
        track!(read_exact(&mut reader, &mut start))?;
        let stream_id = StreamId::new(start[PES_START_CODE_LEN]);
        if !stream_id.is_private_stream_1() {
            warn!("Unexpected stream id: 0x{:02X}", stream_id.as_u8());
        }

        let packet_len = track!(reader.read_u16::<BigEndian>().map_err(Error::from))?;

        let mut flags = [0; 2];
        track!(read_exact(&mut reader, &mut flags))?;
        let new_packet = (flags[1] >> 6) & 0b11 == 0b10;

        let remain_header_len = track!(reader.read_u8().map_err(Error::from))?;
        track!(skip(&mut reader, u64::from(remain_header_len)))?;
        let substream_byte = track!(reader.read_u8().map_err(Error::from))?;
        let substream_id = match SubstreamId::new_subpicture(substream_byte) {
            Ok(id) => id,
            Err(e) => {
                warn!("{}", e);
                SubstreamId::new(substream_byte)
            }
        };

        let header = FrameHeader {
            stream_id,
            packet_len,
            new_packet,
            remain_header_len,
            substream_id,
        };
        trace!("Read {:?}", header);
        Ok(header)
    }

    /// Returns the number of payload bytes carried by this frame.
    ///
    /// # Errors
    ///
    /// If `packet_len` is too small to hold the header fields, it will return an `ErrorKind::InvalidInput` error.
    pub fn payload_len(&self) -> Result<usize> {
        let available =
            i32::from(self.packet_len) - FIXED_HEADER_OVERHEAD - i32::from(self.remain_header_len);
        track_assert!(
            available >= 0,
            ErrorKind::InvalidInput,
            "PES packet length too small: packet_len={}, remain_header_len={}",
            self.packet_len,
            self.remain_header_len
        );
        Ok(available as usize)
    }
}

pub(crate) fn read_exact<R: Read>(mut reader: R, buf: &mut [u8]) -> Result<()> {
    track!(reader.read_exact(buf).map_err(Error::from))
}

fn skip<R: Read>(reader: R, len: u64) -> Result<()> {
    let skipped = track!(io::copy(&mut reader.take(len), &mut io::sink()).map_err(Error::from))?;
    track_assert_eq!(skipped, len, ErrorKind::InvalidInput);
    Ok(())
}
