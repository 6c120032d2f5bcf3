//! The `publish` and `deleteStream` NetStream commands (legacy RTMP spec,
//! 7.2.2).

use std::fmt;
use std::str::FromStr;

use amf0::{Amf0Encoder, Amf0Value};

use super::CommandError;

/// The `publish` command's publishing type argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishingType {
    /// Publishes live data without recording it.
    Live,
    /// Publishes and records a new file, replacing any existing one.
    Record,
    /// Publishes and appends to an existing file.
    Append,
}

impl FromStr for PublishingType {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Self::Live),
            "record" => Ok(Self::Record),
            "append" => Ok(Self::Append),
            other => Err(CommandError::InvalidPublishingType(other.to_string())),
        }
    }
}

impl fmt::Display for PublishingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Record => write!(f, "record"),
            Self::Append => write!(f, "append"),
        }
    }
}

/// Writes a `publish` command's AMF0 argument list: a `null` command
/// object, the publishing name, and the publishing type.
pub fn encode_publish(
    writer: &mut impl std::io::Write,
    publishing_name: &str,
    publishing_type: PublishingType,
    transaction_id: f64,
) -> Result<(), CommandError> {
    Amf0Encoder::encode_string(writer, "publish")?;
    Amf0Encoder::encode_number(writer, transaction_id)?;
    Amf0Encoder::encode_null(writer)?;
    Amf0Encoder::encode_string(writer, publishing_name)?;
    Amf0Encoder::encode_string(writer, &publishing_type.to_string())?;

    Ok(())
}

/// Writes a `deleteStream` command's AMF0 argument list: a `null` command
/// object and the message stream id to delete.
pub fn encode_delete_stream(writer: &mut impl std::io::Write, stream_id: f64, transaction_id: f64) -> Result<(), CommandError> {
    Amf0Encoder::encode_string(writer, "deleteStream")?;
    Amf0Encoder::encode_number(writer, transaction_id)?;
    Amf0Encoder::encode_null(writer)?;
    Amf0Encoder::encode_number(writer, stream_id)?;

    Ok(())
}

/// Writes an `@setDataFrame` / `onMetaData` message used to carry stream
/// metadata (width, height, codec ids, frame rate, ...).
pub fn encode_set_data_frame(writer: &mut impl std::io::Write, metadata: &[(String, Amf0Value)]) -> Result<(), CommandError> {
    Amf0Encoder::encode_string(writer, "@setDataFrame")?;
    Amf0Encoder::encode_string(writer, "onMetaData")?;
    Amf0Encoder::encode_object(writer, metadata)?;

    Ok(())
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parses_publishing_type() {
        assert_eq!("live".parse::<PublishingType>().unwrap(), PublishingType::Live);
        assert!("bogus".parse::<PublishingType>().is_err());
    }

    #[test]
    fn encodes_publish() {
        let mut buf = Vec::new();
        encode_publish(&mut buf, "stream-key", PublishingType::Live, 3.0).unwrap();

        let mut decoder = amf0::Amf0Decoder::new(&buf);
        assert_eq!(decoder.decode_string().unwrap(), "publish");
        assert_eq!(decoder.decode_number().unwrap(), 3.0);
        decoder.decode_null().unwrap();
        assert_eq!(decoder.decode_string().unwrap(), "stream-key");
        assert_eq!(decoder.decode_string().unwrap(), "live");
    }

    #[test]
    fn encodes_delete_stream() {
        let mut buf = Vec::new();
        encode_delete_stream(&mut buf, 1.0, 5.0).unwrap();

        let mut decoder = amf0::Amf0Decoder::new(&buf);
        assert_eq!(decoder.decode_string().unwrap(), "deleteStream");
        assert_eq!(decoder.decode_number().unwrap(), 5.0);
        decoder.decode_null().unwrap();
        assert_eq!(decoder.decode_number().unwrap(), 1.0);
    }
}
