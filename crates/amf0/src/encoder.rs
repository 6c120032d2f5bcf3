//! AMF0 encoder.

use std::io;

use byteorder::{BigEndian, WriteBytesExt};

use crate::{Amf0Array, Amf0Error, Amf0Marker, Amf0Object, Amf0Value};

/// Stateless AMF0 encoder.
///
/// Every method takes the destination writer directly rather than owning
/// it, since an encoded command is usually just a handful of calls glued
/// together into one chunk payload buffer.
pub struct Amf0Encoder;

impl Amf0Encoder {
    /// Encodes a [`bool`] as an AMF0 boolean value.
    pub fn encode_boolean(writer: &mut impl io::Write, value: bool) -> Result<(), Amf0Error> {
        writer.write_u8(Amf0Marker::Boolean as u8)?;
        writer.write_u8(value as u8)?;
        Ok(())
    }

    /// Encodes a [`f64`] as an AMF0 number value.
    pub fn encode_number(writer: &mut impl io::Write, value: f64) -> Result<(), Amf0Error> {
        writer.write_u8(Amf0Marker::Number as u8)?;
        writer.write_f64::<BigEndian>(value)?;
        Ok(())
    }

    /// Encodes a [`str`] as an AMF0 string value.
    ///
    /// Fails with [`Amf0Error::TooLong`] if the string is longer than
    /// `u16::MAX` bytes; this codec does not emit the AMF0 long-string
    /// marker since nothing on the RTMP command channel needs it.
    pub fn encode_string(writer: &mut impl io::Write, value: &str) -> Result<(), Amf0Error> {
        let len: u16 = value.len().try_into()?;

        writer.write_u8(Amf0Marker::String as u8)?;
        writer.write_u16::<BigEndian>(len)?;
        writer.write_all(value.as_bytes())?;
        Ok(())
    }

    /// Encodes the AMF0 Null value.
    pub fn encode_null(writer: &mut impl io::Write) -> Result<(), Amf0Error> {
        writer.write_u8(Amf0Marker::Null as u8)?;
        Ok(())
    }

    fn encode_object_key(writer: &mut impl io::Write, key: &str) -> Result<(), Amf0Error> {
        let len: u16 = key.len().try_into()?;
        writer.write_u16::<BigEndian>(len)?;
        writer.write_all(key.as_bytes())?;
        Ok(())
    }

    /// Encodes an [`Amf0Object`] as an AMF0 Object value.
    pub fn encode_object(writer: &mut impl io::Write, values: &Amf0Object) -> Result<(), Amf0Error> {
        writer.write_u8(Amf0Marker::Object as u8)?;

        for (key, value) in values {
            Self::encode_object_key(writer, key)?;
            Self::encode_value(writer, value)?;
        }

        writer.write_u24::<BigEndian>(Amf0Marker::ObjectEnd as u32)?;
        Ok(())
    }

    /// Encodes an [`Amf0Array`] as an AMF0 StrictArray value.
    pub fn encode_array(writer: &mut impl io::Write, values: &Amf0Array) -> Result<(), Amf0Error> {
        let len: u32 = values.len().try_into()?;
        writer.write_u8(Amf0Marker::StrictArray as u8)?;
        writer.write_u32::<BigEndian>(len)?;

        for value in values {
            Self::encode_value(writer, value)?;
        }

        Ok(())
    }

    /// Encodes an arbitrary [`Amf0Value`], dispatching on its variant.
    pub fn encode_value(writer: &mut impl io::Write, value: &Amf0Value) -> Result<(), Amf0Error> {
        match value {
            Amf0Value::Number(n) => Self::encode_number(writer, *n),
            Amf0Value::Boolean(b) => Self::encode_boolean(writer, *b),
            Amf0Value::String(s) => Self::encode_string(writer, s),
            Amf0Value::Object(o) => Self::encode_object(writer, o),
            Amf0Value::Null => Self::encode_null(writer),
            Amf0Value::Array(a) => Self::encode_array(writer, a),
        }
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;
    use crate::decoder::Amf0Decoder;

    #[test]
    fn encode_number() {
        let mut buf = Vec::new();
        Amf0Encoder::encode_number(&mut buf, 1.0).unwrap();
        assert_eq!(buf, [0x00, 0x3F, 0xF0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn encode_boolean() {
        let mut buf = Vec::new();
        Amf0Encoder::encode_boolean(&mut buf, true).unwrap();
        assert_eq!(buf, [0x01, 0x01]);
    }

    #[test]
    fn encode_string() {
        let mut buf = Vec::new();
        Amf0Encoder::encode_string(&mut buf, "abc").unwrap();
        assert_eq!(buf, [0x02, 0x00, 0x03, b'a', b'b', b'c']);
    }

    #[test]
    fn encode_string_too_long() {
        let mut buf = Vec::new();
        let value = "a".repeat(u16::MAX as usize + 1);
        let err = Amf0Encoder::encode_string(&mut buf, &value).unwrap_err();
        assert!(matches!(err, Amf0Error::TooLong(_)));
    }

    #[test]
    fn encode_object_round_trip() {
        let mut buf = Vec::new();
        let object: Amf0Object = vec![("app".into(), Amf0Value::String("live".into())), ("flushType".into(), true.into())];
        Amf0Encoder::encode_object(&mut buf, &object).unwrap();

        let mut decoder = Amf0Decoder::new(&buf[..]);
        assert_eq!(decoder.decode_object().unwrap(), object);
    }

    #[test]
    fn encode_array_round_trip() {
        let mut buf = Vec::new();
        let array: Amf0Array = vec![Amf0Value::Number(1.0), Amf0Value::Null];
        Amf0Encoder::encode_array(&mut buf, &array).unwrap();

        let mut decoder = Amf0Decoder::new(&buf[..]);
        assert_eq!(decoder.decode_array().unwrap(), array);
    }
}
