use std::io;
use trackable::error::TrackableError;
use trackable::error::{ErrorKind as TrackableErrorKind, ErrorKindExt};

/// This crate specific `Error` type.
#[derive(Debug, Clone)]
pub struct Error(TrackableError<ErrorKind>);
#[allow(deprecated)]
derive_traits_for_trackable_error_newtype!(Error, ErrorKind);
impl From<io::Error> for Error {
    fn from(f: io::Error) -> Self {
        if f.kind() == io::ErrorKind::UnexpectedEof {
            ErrorKind::InvalidInput.cause(f).into()
        } else {
            ErrorKind::Other.cause(f).into()
        }
    }
}

/// Possible error kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The byte source could not be opened, so the parser never became usable.
    NotInitialized,

    /// Malformed or truncated stream data.
    InvalidInput,

    /// The buffer for a declared subtitle packet could not be allocated.
    OutOfMemory,

    /// The subtitle decoder rejected a reassembled packet.
    DecodeFailed,

    /// Other errors (e.g., a failing seek).
    Other,
}
impl TrackableErrorKind for ErrorKind {}
