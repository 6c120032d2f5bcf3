//! `onStatus` events (legacy RTMP spec, 7.2.2), sent by the server in
//! response to `publish` and when a stream's state otherwise changes.

use amf0::Amf0Value;

use super::{CommandError, CommandResultLevel};

/// A parsed `onStatus` event.
#[derive(Debug, Clone, PartialEq)]
pub struct OnStatus {
    /// The information object's `code`, e.g. [`codes::NET_STREAM_PUBLISH_START`].
    pub code: String,
    /// The information object's `description`, if present.
    pub description: Option<String>,
    /// The information object's `level`.
    pub level: CommandResultLevel,
}

impl OnStatus {
    /// Parses an `onStatus` event out of its raw AMF0 argument list:
    /// `[null, information]`.
    pub fn from_values(values: &[Amf0Value]) -> Result<Self, CommandError> {
        let information = values
            .get(1)
            .and_then(Amf0Value::as_object)
            .ok_or(CommandError::MalformedReply("onStatus", "missing information object"))?;

        let code = information
            .iter()
            .find(|(k, _)| k == "code")
            .and_then(|(_, v)| v.as_str())
            .ok_or(CommandError::MalformedReply("onStatus", "missing code"))?
            .to_string();
        let level = information
            .iter()
            .find(|(k, _)| k == "level")
            .and_then(|(_, v)| v.as_str())
            .ok_or(CommandError::MalformedReply("onStatus", "missing level"))?
            .parse()
            .unwrap();
        let description = information
            .iter()
            .find(|(k, _)| k == "description")
            .and_then(|(_, v)| v.as_str())
            .map(str::to_string);

        Ok(Self { code, description, level })
    }

    /// Returns true if this is a strict `NetStream.Publish.Start` success
    /// notification: `code` matches exactly and `level` is `"status"`.
    ///
    /// A server is free to send other `onStatus` events (warnings,
    /// `NetStream.Publish.BadName`, ...) in response to `publish`; this
    /// client only treats the exact combination as a publish success.
    pub fn is_publish_success(&self) -> bool {
        self.code == codes::NET_STREAM_PUBLISH_START && self.level == CommandResultLevel::Status
    }
}

/// `onStatus`/`_result`/`_error` information-object `code` values this
/// client recognizes.
#[allow(unused)]
pub mod codes {
    pub const NET_CONNECTION_CALL_FAILED: &str = "NetConnection.Call.Failed";
    pub const NET_CONNECTION_CONNECT_APP_SHUTDOWN: &str = "NetConnection.Connect.AppShutdown";
    pub const NET_CONNECTION_CONNECT_CLOSED: &str = "NetConnection.Connect.Closed";
    pub const NET_CONNECTION_CONNECT_FAILED: &str = "NetConnection.Connect.Failed";
    pub const NET_CONNECTION_CONNECT_REJECTED: &str = "NetConnection.Connect.Rejected";
    pub const NET_CONNECTION_CONNECT_SUCCESS: &str = "NetConnection.Connect.Success";
    pub const NET_CONNECTION_CONNECT_RECONNECT_REQUEST: &str = "NetConnection.Connect.ReconnectRequest";
    pub const NET_CONNECTION_PROXY_NOT_RESPONDING: &str = "NetConnection.Proxy.NotResponding";

    pub const NET_STREAM_PUBLISH_START: &str = "NetStream.Publish.Start";
    pub const NET_STREAM_PUBLISH_BAD_NAME: &str = "NetStream.Publish.BadName";
    pub const NET_STREAM_DELETE_STREAM_SUCCESS: &str = "NetStream.DeleteStream.Suceess";
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    fn status(code: &str, level: &str) -> Vec<Amf0Value> {
        vec![
            Amf0Value::Null,
            Amf0Value::Object(vec![
                ("level".to_string(), Amf0Value::String(level.to_string())),
                ("code".to_string(), Amf0Value::String(code.to_string())),
            ]),
        ]
    }

    #[test]
    fn recognizes_strict_publish_success() {
        let on_status = OnStatus::from_values(&status(codes::NET_STREAM_PUBLISH_START, "status")).unwrap();
        assert!(on_status.is_publish_success());
    }

    #[test]
    fn rejects_wrong_level_as_publish_success() {
        let on_status = OnStatus::from_values(&status(codes::NET_STREAM_PUBLISH_START, "warning")).unwrap();
        assert!(!on_status.is_publish_success());
    }

    #[test]
    fn rejects_bad_name_as_publish_success() {
        let on_status = OnStatus::from_values(&status(codes::NET_STREAM_PUBLISH_BAD_NAME, "error")).unwrap();
        assert!(!on_status.is_publish_success());
    }
}
