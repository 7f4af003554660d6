//! Efficode - compact wire codec for agent-to-agent messages
//!
//! A message is an op code plus a parameter set, framed as a single line:
//!
//! - `@DID:{"id":"abc"}` identity claims with a JSON body
//! - `#REQ?a=1&b=2` requests and data with a query-string body
//! - `!ACK:{"status":"ok"}` acknowledgments and errors with a JSON body
//!
//! Large DATA content is carried as `EFFICODE:` followed by
//! base64(encodeURIComponent(text)), which peers reverse with
//! decodeURIComponent(atob(data)).
//!
//! ## Features
//!
//! - **Framing**: prefix dispatch, first-separator splitting, lenient body parsing
//! - **Compression hook**: size-triggered, transparent to both ends
//! - **Self-extracting packets**: content bundled with its syntax guide
//! - **Gateway**: optional HTTP service with metrics and structured logging
//!
//! ## Quick Start
//!
//! ```rust
//! use efficode::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let codec = EfficodeCodec::default();
//!
//!     let wire = codec.encode_message(&Message::data("hello", "text"))?;
//!     assert_eq!(wire, "#DATA?content=hello&type=text");
//!
//!     let message = codec.decode_message(&wire)?;
//!     assert_eq!(message.content().as_deref(), Some("hello"));
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod observability;
pub mod protocol;

pub use config::Config;
pub use error::{CodecError, Result};
pub use protocol::{decode, encode};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{CodecError, CompressionError, FramingError, Result};
    pub use crate::observability::CodecMetrics;
    pub use crate::protocol::{
        Codec, Compressor, EfficodeCodec, Message, MessageClass, MessageHandler, OpCode, Params,
        SelfExtractingPacket,
    };
}
