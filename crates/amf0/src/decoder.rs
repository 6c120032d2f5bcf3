//! AMF0 decoder.

use std::io::{self, Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};
use num_traits::FromPrimitive;

use crate::{Amf0Array, Amf0Error, Amf0Marker, Amf0Object, Amf0Value};

/// AMF0 decoder over an in-memory byte slice.
///
/// The command channel never needs to decode more than one message at a
/// time out of an already-reassembled chunk payload, so the decoder just
/// borrows a slice rather than owning a `Bytes`.
pub struct Amf0Decoder<'a> {
    cursor: Cursor<&'a [u8]>,
    next_marker: Option<Amf0Marker>,
}

impl<'a> Amf0Decoder<'a> {
    /// Creates a new decoder over `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(buf),
            next_marker: None,
        }
    }

    /// Returns `true` if there are unread bytes left in the buffer.
    pub fn has_remaining(&self) -> bool {
        self.cursor.position() < self.cursor.get_ref().len() as u64
    }

    fn read_marker(&mut self) -> Result<Amf0Marker, Amf0Error> {
        if let Some(marker) = self.next_marker.take() {
            return Ok(marker);
        }

        let marker = self.cursor.read_u8().map_err(eof)?;
        Amf0Marker::from_u8(marker).ok_or(Amf0Error::UnknownMarker(marker))
    }

    /// Peeks the next marker without consuming it.
    pub fn peek_marker(&mut self) -> Result<Amf0Marker, Amf0Error> {
        let marker = self.read_marker()?;
        self.next_marker = Some(marker);
        Ok(marker)
    }

    fn expect_marker(&mut self, expect: &'static [Amf0Marker]) -> Result<Amf0Marker, Amf0Error> {
        let marker = self.read_marker()?;

        if expect.contains(&marker) {
            Ok(marker)
        } else {
            Err(Amf0Error::UnexpectedType { expected: expect, got: marker })
        }
    }

    /// Decodes a number.
    pub fn decode_number(&mut self) -> Result<f64, Amf0Error> {
        self.expect_marker(&[Amf0Marker::Number])?;
        self.cursor.read_f64::<BigEndian>().map_err(eof)
    }

    /// Decodes a boolean.
    pub fn decode_boolean(&mut self) -> Result<bool, Amf0Error> {
        self.expect_marker(&[Amf0Marker::Boolean])?;
        Ok(self.cursor.read_u8().map_err(eof)? != 0)
    }

    fn decode_raw_string(&mut self) -> Result<String, Amf0Error> {
        let len = self.cursor.read_u16::<BigEndian>().map_err(eof)? as usize;
        let mut bytes = vec![0u8; len];
        self.cursor.read_exact(&mut bytes).map_err(eof)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Decodes a string.
    pub fn decode_string(&mut self) -> Result<String, Amf0Error> {
        self.expect_marker(&[Amf0Marker::String])?;
        self.decode_raw_string()
    }

    /// Decodes the Null (or Undefined) value.
    pub fn decode_null(&mut self) -> Result<(), Amf0Error> {
        self.expect_marker(&[Amf0Marker::Null, Amf0Marker::Undefined])?;
        Ok(())
    }

    /// Decodes an Object value.
    ///
    /// Object keys are plain length-prefixed strings with no leading
    /// marker, terminated by an empty key followed by the object-end
    /// marker.
    pub fn decode_object(&mut self) -> Result<Amf0Object, Amf0Error> {
        self.expect_marker(&[Amf0Marker::Object])?;

        let mut object = Vec::new();

        loop {
            let key = self.decode_raw_string()?;

            if key.is_empty() && self.peek_marker()? == Amf0Marker::ObjectEnd {
                self.next_marker = None;
                break;
            }

            let value = self.decode_value()?;
            object.push((key, value));
        }

        Ok(object)
    }

    /// Decodes a StrictArray value.
    pub fn decode_array(&mut self) -> Result<Amf0Array, Amf0Error> {
        self.expect_marker(&[Amf0Marker::StrictArray])?;
        let len = self.cursor.read_u32::<BigEndian>().map_err(eof)? as usize;

        let mut values = Vec::with_capacity(len.min(4096));
        for _ in 0..len {
            values.push(self.decode_value()?);
        }

        Ok(values)
    }

    /// Decodes an arbitrary value, dispatching on the next marker.
    pub fn decode_value(&mut self) -> Result<Amf0Value, Amf0Error> {
        match self.peek_marker()? {
            Amf0Marker::Number => self.decode_number().map(Amf0Value::Number),
            Amf0Marker::Boolean => self.decode_boolean().map(Amf0Value::Boolean),
            Amf0Marker::String => self.decode_string().map(Amf0Value::String),
            Amf0Marker::Object => self.decode_object().map(Amf0Value::Object),
            Amf0Marker::Null | Amf0Marker::Undefined => self.decode_null().map(|()| Amf0Value::Null),
            Amf0Marker::StrictArray => self.decode_array().map(Amf0Value::Array),
            marker @ (Amf0Marker::EcmaArray | Amf0Marker::ObjectEnd) => Err(Amf0Error::UnsupportedMarker(marker)),
        }
    }

    /// Decodes values until the buffer is exhausted.
    pub fn decode_all(&mut self) -> Result<Vec<Amf0Value>, Amf0Error> {
        let mut values = Vec::new();
        while self.has_remaining() {
            values.push(self.decode_value()?);
        }
        Ok(values)
    }
}

fn eof(err: io::Error) -> Amf0Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Amf0Error::UnexpectedEof
    } else {
        Amf0Error::Io(err)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;
    use crate::encoder::Amf0Encoder;

    #[test]
    fn decode_number_round_trip() {
        let mut buf = Vec::new();
        Amf0Encoder::encode_number(&mut buf, 3.5).unwrap();
        assert_eq!(Amf0Decoder::new(&buf).decode_number().unwrap(), 3.5);
    }

    #[test]
    fn decode_string_round_trip() {
        let mut buf = Vec::new();
        Amf0Encoder::encode_string(&mut buf, "connect").unwrap();
        assert_eq!(Amf0Decoder::new(&buf).decode_string().unwrap(), "connect");
    }

    #[test]
    fn decode_object_with_mixed_values() {
        #[rustfmt::skip]
        let bytes = [
            Amf0Marker::Object as u8,
            0x00, 0x01, b'a',
            Amf0Marker::Boolean as u8, 0x01,
            0x00, 0x00, Amf0Marker::ObjectEnd as u8,
        ];

        let object = Amf0Decoder::new(&bytes).decode_object().unwrap();
        assert_eq!(object, vec![("a".to_string(), Amf0Value::Boolean(true))]);
    }

    #[test]
    fn decode_unexpected_type() {
        let mut buf = Vec::new();
        Amf0Encoder::encode_null(&mut buf).unwrap();
        let err = Amf0Decoder::new(&buf).decode_number().unwrap_err();
        assert!(matches!(err, Amf0Error::UnexpectedType { .. }));
    }

    #[test]
    fn decode_all_sequence() {
        let mut buf = Vec::new();
        Amf0Encoder::encode_string(&mut buf, "_result").unwrap();
        Amf0Encoder::encode_number(&mut buf, 1.0).unwrap();
        Amf0Encoder::encode_null(&mut buf).unwrap();

        let values = Amf0Decoder::new(&buf).decode_all().unwrap();
        assert_eq!(
            values,
            vec![Amf0Value::String("_result".into()), Amf0Value::Number(1.0), Amf0Value::Null]
        );
    }
}
