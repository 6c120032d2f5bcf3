//! The `connect` and `createStream` NetConnection commands (legacy RTMP
//! spec, 7.2.1) and their `_result`/`_error` replies.

use amf0::{Amf0Encoder, Amf0Value};

use super::CommandError;
use crate::command_messages::CommandResultLevel;

/// Writes a `connect` command's AMF0 argument list: the command object
/// plus, per the legacy spec, no further arguments.
///
/// Defined by:
/// - Legacy RTMP spec, 7.2.1.1
pub fn encode_connect(writer: &mut impl std::io::Write, app: &str, tc_url: &str, transaction_id: f64) -> Result<(), CommandError> {
    Amf0Encoder::encode_string(writer, "connect")?;
    Amf0Encoder::encode_number(writer, transaction_id)?;

    let command_object: Vec<(String, Amf0Value)> = vec![
        ("app".to_string(), Amf0Value::String(app.to_string())),
        ("type".to_string(), Amf0Value::String("nonprivate".to_string())),
        ("flashVer".to_string(), Amf0Value::String("FMLE/3.0 (compatible; rtmp-client)".to_string())),
        ("tcUrl".to_string(), Amf0Value::String(tc_url.to_string())),
    ];
    Amf0Encoder::encode_object(writer, &command_object)?;

    Ok(())
}

/// Writes a `createStream` command's AMF0 argument list: a `null` command
/// object and no further arguments.
///
/// Defined by:
/// - Legacy RTMP spec, 7.2.1.3
pub fn encode_create_stream(writer: &mut impl std::io::Write, transaction_id: f64) -> Result<(), CommandError> {
    Amf0Encoder::encode_string(writer, "createStream")?;
    Amf0Encoder::encode_number(writer, transaction_id)?;
    Amf0Encoder::encode_null(writer)?;

    Ok(())
}

/// The server's reply to a successful `connect`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectResult {
    /// `NetConnection.Connect.Success` or another `level`/`code` pair; see
    /// [`crate::command_messages::on_status::codes`].
    pub level: CommandResultLevel,
    /// The `code` field of the information object.
    pub code: String,
    /// The `description` field of the information object, if present.
    pub description: Option<String>,
}

impl ConnectResult {
    /// Parses a `_result` reply to `connect` out of its raw AMF0 argument
    /// list: `[properties, information]`.
    pub fn from_values(values: &[Amf0Value]) -> Result<Self, CommandError> {
        let information = values
            .get(1)
            .and_then(Amf0Value::as_object)
            .ok_or(CommandError::MalformedReply("connect", "missing information object"))?;

        let level = information
            .iter()
            .find(|(k, _)| k == "level")
            .and_then(|(_, v)| v.as_str())
            .ok_or(CommandError::MalformedReply("connect", "missing level"))?
            .parse()
            .unwrap();
        let code = information
            .iter()
            .find(|(k, _)| k == "code")
            .and_then(|(_, v)| v.as_str())
            .ok_or(CommandError::MalformedReply("connect", "missing code"))?
            .to_string();
        let description = information
            .iter()
            .find(|(k, _)| k == "description")
            .and_then(|(_, v)| v.as_str())
            .map(str::to_string);

        Ok(Self { level, code, description })
    }
}

/// The server's reply to a successful `createStream`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreateStreamResult {
    /// The message stream id the server assigned, used on every subsequent
    /// `publish`/media/`deleteStream` message.
    pub stream_id: f64,
}

impl CreateStreamResult {
    /// Parses a `_result` reply to `createStream` out of its raw AMF0
    /// argument list: `[null, stream_id]`.
    pub fn from_values(values: &[Amf0Value]) -> Result<Self, CommandError> {
        let stream_id = values
            .get(1)
            .and_then(Amf0Value::as_number)
            .ok_or(CommandError::MalformedReply("createStream", "missing stream id"))?;

        Ok(Self { stream_id })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn encodes_connect() {
        let mut buf = Vec::new();
        encode_connect(&mut buf, "live", "rtmp://example.com/live", 1.0).unwrap();

        let mut decoder = amf0::Amf0Decoder::new(&buf);
        assert_eq!(decoder.decode_string().unwrap(), "connect");
        assert_eq!(decoder.decode_number().unwrap(), 1.0);
        let object = Amf0Value::Object(decoder.decode_object().unwrap());
        assert_eq!(object.get("app"), Some(&Amf0Value::String("live".to_string())));
        assert_eq!(object.get("tcUrl"), Some(&Amf0Value::String("rtmp://example.com/live".to_string())));
    }

    #[test]
    fn parses_connect_result() {
        let values = vec![
            Amf0Value::Null,
            Amf0Value::Object(vec![
                ("level".to_string(), Amf0Value::String("status".to_string())),
                ("code".to_string(), Amf0Value::String("NetConnection.Connect.Success".to_string())),
                ("description".to_string(), Amf0Value::String("ok".to_string())),
            ]),
        ];
        let result = ConnectResult::from_values(&values).unwrap();
        assert_eq!(result.level, CommandResultLevel::Status);
        assert_eq!(result.code, "NetConnection.Connect.Success");
        assert_eq!(result.description.as_deref(), Some("ok"));
    }

    #[test]
    fn parses_create_stream_result() {
        let values = vec![Amf0Value::Null, Amf0Value::Number(1.0)];
        let result = CreateStreamResult::from_values(&values).unwrap();
        assert_eq!(result.stream_id, 1.0);
    }
}
