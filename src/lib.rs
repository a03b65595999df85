//! Reassembly of VobSub subtitle packets from MPEG-2 Program Stream files.
//!
//! A `*.sub` file is a Program Stream whose PES frames carry fragments of
//! DVD subpicture units. [`PesReassembler`](pes/struct.PesReassembler.html)
//! stitches those fragments back into one contiguous packet, and
//! [`SubParser`](sub/struct.SubParser.html) drives it and hands finished
//! packets to a [`SubtitleDecoder`](sub/trait.SubtitleDecoder.html).
//!
//! # References
//!
//! - [MPEG program stream](https://en.wikipedia.org/wiki/MPEG_program_stream)
//! - [PES header](http://dvd.sourceforge.net/dvdinfo/pes-hdr.html)
//! - [DVD subtitles](http://sam.zoy.org/writings/dvd/subtitles/)
#![warn(missing_docs)]
extern crate byteorder;
#[macro_use]
extern crate log;
#[macro_use]
extern crate trackable;

pub use config::ReassemblerConfig;
pub use error::{Error, ErrorKind};

pub mod es;
pub mod pes;
pub mod sub;
pub mod util;

mod config;
mod error;

/// This crate specific `Result` type.
pub type Result<T> = std::result::Result<T, Error>;
