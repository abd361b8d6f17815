//! Continuation envelope
//!
//! A continuation is the only state a handler keeps between invocations.
//! The host treats it as opaque bytes; on the wire it is a small JSON
//! envelope carrying a version number next to the handler's own context:
//!
//! ```text
//! {"version":1,"context":{...}}
//! ```
//!
//! Decoding refuses envelopes written for another version instead of
//! guessing at a shape it does not know.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// State a handler carries across invocations of one operation
pub trait Continuation: Serialize + DeserializeOwned + Default {
    /// Shape version; bump whenever the serialized form changes
    const VERSION: u32;
}

#[derive(Serialize)]
struct EnvelopeRef<'a, C> {
    version: u32,
    context: &'a C,
}

#[derive(Deserialize)]
struct RawEnvelope {
    version: u32,
    context: serde_json::Value,
}

/// Serialize a continuation into its versioned envelope
pub fn encode<C: Continuation>(context: &C) -> Result<String> {
    let envelope = EnvelopeRef {
        version: C::VERSION,
        context,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a continuation from its versioned envelope
pub fn decode<C: Continuation>(raw: &str) -> Result<C> {
    let envelope: RawEnvelope = serde_json::from_str(raw)?;
    if envelope.version != C::VERSION {
        return Err(Error::UnsupportedVersion {
            found: envelope.version,
            expected: C::VERSION,
        });
    }
    Ok(serde_json::from_value(envelope.context)?)
}
