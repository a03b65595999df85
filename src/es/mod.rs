//! Elementary stream identifiers found in Program Stream PES frames.
pub use self::stream_id::{StreamId, SubstreamId};

mod stream_id;
