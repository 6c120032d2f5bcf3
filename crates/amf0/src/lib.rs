//! A minimal AMF0 encoder and decoder.
//!
//! This crate implements only the wire primitives that appear on the RTMP
//! command channel: number, boolean, string, null, typed object and strict
//! array. References, ECMA arrays, dates, XML documents and the AMF3
//! switch-over marker are intentionally unsupported.
//!
//! # Examples
//!
//! ```rust
//! use amf0::decoder::Amf0Decoder;
//! use amf0::encoder::Amf0Encoder;
//!
//! let mut buf = Vec::new();
//! Amf0Encoder::encode_number(&mut buf, 1.0).unwrap();
//!
//! let mut decoder = Amf0Decoder::new(&buf);
//! assert_eq!(decoder.decode_number().unwrap(), 1.0);
//! ```
#![deny(unsafe_code)]
#![deny(unreachable_pub)]

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod value;

pub use decoder::Amf0Decoder;
pub use encoder::Amf0Encoder;
pub use error::{Amf0Error, Result};
pub use value::{Amf0Object, Amf0Value};

/// AMF0 marker types.
///
/// Defined by:
/// - AMF0 spec, 2.1.
#[derive(Debug, PartialEq, Eq, Clone, Copy, num_derive::FromPrimitive)]
#[repr(u8)]
pub enum Amf0Marker {
    /// number-marker
    Number = 0x00,
    /// boolean-marker
    Boolean = 0x01,
    /// string-marker
    String = 0x02,
    /// object-marker
    Object = 0x03,
    /// null-marker
    Null = 0x05,
    /// undefined-marker
    Undefined = 0x06,
    /// ecma-array-marker
    EcmaArray = 0x08,
    /// object-end-marker
    ObjectEnd = 0x09,
    /// strict-array-marker
    StrictArray = 0x0a,
}
