use Result;

/// A 16-entry colour lookup table, as found in the `palette:` line of an `*.idx` file.
pub type Palette = [u32; 16];

/// The `SubtitleDecoder` trait is the contract between [`SubParser`](struct.SubParser.html)
/// and whatever turns a reassembled subtitle packet into displayable data.
///
/// Times are milliseconds relative to the presentation time stamp of the
/// packet. Accessors return `None` until a packet providing the value has
/// been parsed.
pub trait SubtitleDecoder {
    /// Loads a complete subtitle packet, discarding any previous one.
    fn init(&mut self, packet: &[u8]);

    /// Parses the control section of the loaded packet.
    fn parse_control_section(&mut self) -> Result<()>;

    /// Returns the size of the data section declared by the packet header
    /// (including the 4-byte header itself).
    ///
    /// Only meaningful after `parse_control_section` succeeded.
    fn data_packet_size(&self) -> usize;

    /// Parses the data section of the loaded packet.
    fn parse_data_section(&mut self) -> Result<()>;

    /// Releases the loaded packet and everything parsed from it.
    fn reset(&mut self);

    /// Returns the time at which the subtitle is shown.
    fn begin_time(&self) -> Option<u32>;

    /// Returns the time at which the subtitle is hidden.
    fn end_time(&self) -> Option<u32>;

    /// Returns the width of the subtitle bitmap.
    fn width(&self) -> Option<u16>;

    /// Returns the height of the subtitle bitmap.
    fn height(&self) -> Option<u16>;

    /// Sets the colour lookup table used to resolve the subtitle's colours.
    fn set_palette(&mut self, palette: &Palette);

    /// Returns the index of the next temporary output file.
    fn temp_file_index(&self) -> u32;

    /// Advances the temporary output file index.
    fn advance_temp_file_index(&mut self);

    /// Returns `true` if the decoder may be handed a new packet.
    ///
    /// Decoders without an output buffer of their own are always ready.
    fn is_buffer_ready(&self) -> bool {
        true
    }
}
