use {ErrorKind, Result};

/// PES stream identifier (the byte following the `00 00 01` start code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(u8);
impl StreamId {
    /// Private stream 1, which carries DVD subpictures.
    pub const PRIVATE_STREAM_1: u8 = 0xBD;

    /// Makes a new `StreamId` instance.
    pub fn new(id: u8) -> Self {
        StreamId(id)
    }

    /// Returns the value of the identifier.
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Returns `true` if this is private stream 1, otherwise `false`.
    pub fn is_private_stream_1(&self) -> bool {
        self.0 == Self::PRIVATE_STREAM_1
    }
}

/// Substream identifier: the first payload byte of a private stream 1 frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubstreamId(u8);
impl SubstreamId {
    /// Minimum value of the identifiers for subpicture streams.
    pub const SUBPICTURE_MIN: u8 = 0x20;

    /// Maximum value of the identifiers for subpicture streams.
    pub const SUBPICTURE_MAX: u8 = 0x3F;

    /// Makes a new `SubstreamId` instance.
    pub fn new(id: u8) -> Self {
        SubstreamId(id)
    }

    /// Makes a new `SubstreamId` instance for a subpicture stream.
    ///
    /// # Errors
    ///
    /// If `id` is not between `SUBPICTURE_MIN` and `SUBPICTURE_MAX`, it will return an `ErrorKind::InvalidInput` error.
    pub fn new_subpicture(id: u8) -> Result<Self> {
        track_assert!(
            Self::SUBPICTURE_MIN <= id && id <= Self::SUBPICTURE_MAX,
            ErrorKind::InvalidInput,
            "Not a subpicture ID: {}",
            id
        );
        Ok(SubstreamId(id))
    }

    /// Returns the value of the identifier.
    pub fn as_u8(&self) -> u8 {
        self.0
    }

    /// Returns `true` if it is a subpicture identifier, otherwise `false`.
    pub fn is_subpicture(&self) -> bool {
        Self::SUBPICTURE_MIN <= self.0 && self.0 <= Self::SUBPICTURE_MAX
    }

    /// Returns the subtitle track number (`0..=31`), if this is a subpicture stream.
    pub fn track(&self) -> Option<u8> {
        if self.is_subpicture() {
            Some(self.0 - Self::SUBPICTURE_MIN)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_stream_ids() {
        assert!(StreamId::new(0xBD).is_private_stream_1());
        assert!(!StreamId::new(0xE0).is_private_stream_1());
    }

    #[test]
    fn classify_substream_ids() {
        assert_eq!(SubstreamId::new(0x20).track(), Some(0));
        assert_eq!(SubstreamId::new(0x3F).track(), Some(31));
        assert_eq!(SubstreamId::new(0x80).track(), None);
        assert!(SubstreamId::new_subpicture(0x21).is_ok());

        let e = SubstreamId::new_subpicture(0x80).unwrap_err();
        assert_eq!(*e.kind(), ErrorKind::InvalidInput);
    }
}
