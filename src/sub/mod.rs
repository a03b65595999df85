//! Subtitle track parsing on top of the PES reassembler.
pub use self::decoder::{Palette, SubtitleDecoder};
pub use self::parser::SubParser;
pub use self::spu::{Area, SpuDecoder};

mod decoder;
mod parser;
mod spu;
