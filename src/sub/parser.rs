use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use pes::{PesReassembler, Progress, SubtitlePacket};
use {ErrorKind, ReassemblerConfig, Result};

use super::decoder::{Palette, SubtitleDecoder};

/// Size of the SPU header. A data section no larger than this holds no bitmap.
const MIN_DATA_PACKET_SIZE: usize = 4;

/// Reads VobSub subtitle packets out of a `*.sub` file.
///
/// Each call to [`parse`](#method.parse) reassembles one subtitle packet
/// starting at the given offset and hands it to the decoder. A parser whose
/// source could not be opened stays invalid: every `parse` fails with
/// `ErrorKind::NotInitialized` and every accessor returns `None`.
///
/// A `SubParser` is not meant to be shared between threads.
#[derive(Debug)]
pub struct SubParser<R, D> {
    source: Option<R>,
    decoder: Option<D>,
    reassembler: PesReassembler,
    cursor: Option<u64>,
}
impl<D: SubtitleDecoder> SubParser<File, D> {
    /// Opens the subtitle file at `path` with the default configuration.
    pub fn open<P: AsRef<Path>>(path: P, decoder: D) -> Self {
        Self::open_with_config(path, decoder, ReassemblerConfig::default())
    }

    /// Opens the subtitle file at `path`.
    ///
    /// Never fails: if `path` is empty or cannot be opened, the returned
    /// parser is invalid (see [`is_valid`](#method.is_valid)).
    pub fn open_with_config<P: AsRef<Path>>(
        path: P,
        decoder: D,
        config: ReassemblerConfig,
    ) -> Self {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            error!("Subtitle path is empty");
            return Self::invalid(config);
        }
        match File::open(path) {
            Ok(file) => Self::with_config(file, decoder, config),
            Err(e) => {
                error!("Cannot open {}: {}", path.display(), e);
                Self::invalid(config)
            }
        }
    }
}
impl<R: Read + Seek, D: SubtitleDecoder> SubParser<R, D> {
    /// Makes a new `SubParser` instance reading from `source`.
    pub fn new(source: R, decoder: D) -> Self {
        Self::with_config(source, decoder, ReassemblerConfig::default())
    }

    /// Makes a new `SubParser` instance with the given configuration.
    pub fn with_config(source: R, decoder: D, config: ReassemblerConfig) -> Self {
        SubParser {
            source: Some(source),
            decoder: Some(decoder),
            reassembler: PesReassembler::new(config),
            cursor: None,
        }
    }

    fn invalid(config: ReassemblerConfig) -> Self {
        SubParser {
            source: None,
            decoder: None,
            reassembler: PesReassembler::new(config),
            cursor: None,
        }
    }

    /// Returns `true` if the byte source was opened successfully.
    pub fn is_valid(&self) -> bool {
        self.source.is_some()
    }

    /// Reassembles the subtitle packet whose first frame starts at `offset`
    /// and decodes it.
    ///
    /// Returns the offset right after the consumed payload, where the next
    /// call should resume.
    ///
    /// # Errors
    ///
    /// - `ErrorKind::NotInitialized`: the parser is invalid.
    /// - `ErrorKind::InvalidInput` / `ErrorKind::OutOfMemory`: reassembly failed.
    /// - `ErrorKind::DecodeFailed`: the decoder rejected the packet. The decoder
    ///   is reset, but the consumed frames stay consumed: [`cursor`](#method.cursor)
    ///   still reports the advanced offset.
    pub fn parse(&mut self, offset: u64) -> Result<u64> {
        let source = track_assert_some!(
            self.source.as_mut(),
            ErrorKind::NotInitialized,
            "Subtitle source is not open"
        );
        debug!("Parse from offset {}", offset);

        let max_frames = self.reassembler.config().max_frames_per_packet;
        let mut cursor = offset;
        let mut frames = 0;
        loop {
            let step = track!(self.reassembler.advance(source, cursor), "offset={}", offset)?;
            cursor = step.cursor;
            self.cursor = Some(cursor);
            frames += 1;
            match step.progress {
                Progress::Complete => break,
                Progress::Continue => {
                    if let Some(max) = max_frames {
                        track_assert!(
                            frames < max,
                            ErrorKind::InvalidInput,
                            "Subtitle packet at offset {} spans more than {} frames",
                            offset,
                            max
                        );
                    }
                }
            }
        }

        let packet = track_assert_some!(self.reassembler.packet(), ErrorKind::Other);
        debug!(
            "Reassembled {} byte subtitle packet from {} frame(s)",
            packet.filled_len(),
            frames
        );

        let decoder = track_assert_some!(self.decoder.as_mut(), ErrorKind::NotInitialized);
        decoder.init(packet.data());
        if let Err(e) = decode(decoder) {
            decoder.reset();
            return Err(track!(e));
        }
        Ok(cursor)
    }

    /// Returns the offset reached by the last successful reassembly step.
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }
}
impl<R, D: SubtitleDecoder> SubParser<R, D> {
    /// Returns the last reassembled (or partially reassembled) packet.
    pub fn packet(&self) -> Option<&SubtitlePacket> {
        self.reassembler.packet()
    }

    /// Returns a reference to the decoder, if the parser is valid.
    pub fn decoder(&self) -> Option<&D> {
        self.decoder.as_ref()
    }

    /// Returns the decoder's temporary output file index.
    pub fn temp_file_index(&self) -> Option<u32> {
        self.decoder.as_ref().map(|d| d.temp_file_index())
    }

    /// Advances the decoder's temporary output file index.
    pub fn advance_temp_file_index(&mut self) {
        if let Some(d) = self.decoder.as_mut() {
            d.advance_temp_file_index();
        }
    }

    /// Returns the begin time of the last decoded subtitle.
    pub fn begin_time(&self) -> Option<u32> {
        self.decoder.as_ref().and_then(|d| d.begin_time())
    }

    /// Returns the end time of the last decoded subtitle.
    pub fn end_time(&self) -> Option<u32> {
        self.decoder.as_ref().and_then(|d| d.end_time())
    }

    /// Returns the width of the last decoded subtitle.
    pub fn subtitle_width(&self) -> Option<u16> {
        self.decoder.as_ref().and_then(|d| d.width())
    }

    /// Returns the height of the last decoded subtitle.
    pub fn subtitle_height(&self) -> Option<u16> {
        self.decoder.as_ref().and_then(|d| d.height())
    }

    /// Sets the palette used by the decoder.
    pub fn set_palette(&mut self, palette: &Palette) {
        if let Some(d) = self.decoder.as_mut() {
            d.set_palette(palette);
        }
    }

    /// Returns `true` if the decoder may be handed a new packet.
    ///
    /// An invalid parser has nothing to wait for and is always ready.
    pub fn is_buffer_ready(&self) -> bool {
        self.decoder.as_ref().map_or(true, |d| d.is_buffer_ready())
    }
}

fn decode<D: SubtitleDecoder>(decoder: &mut D) -> Result<()> {
    track!(decoder.parse_control_section())?;
    if decoder.data_packet_size() > MIN_DATA_PACKET_SIZE {
        track!(decoder.parse_data_section())?;
    }
    Ok(())
}
