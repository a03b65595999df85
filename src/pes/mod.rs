//! Packetized elementary stream frames carrying subtitle packets.
//!
//! # References
//!
//! - [Packetized elementary stream](https://en.wikipedia.org/wiki/Packetized_elementary_stream)
//! - [PES header](http://dvd.sourceforge.net/dvdinfo/pes-hdr.html)
pub use self::header::{FrameHeader, PACK_HEADER_LEN, PES_START_CODE_LEN, PES_STREAM_ID_LEN};
pub use self::reassembler::{PesReassembler, Progress, Step, SubtitlePacket};

mod header;
mod reassembler;
