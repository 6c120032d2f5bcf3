//! AMF0 command messages: `connect`, `createStream`, `publish`,
//! `deleteStream`, and the `_result`/`_error`/`onStatus` replies a server
//! sends back for them.

use std::fmt;
use std::str::FromStr;

pub mod error;
pub mod netconnection;
pub mod netstream;
pub mod on_status;

pub use error::CommandError;
pub use netconnection::{ConnectResult, CreateStreamResult};
pub use netstream::PublishingType;
pub use on_status::OnStatus;

/// NetStream onStatus level (7.2.2) and NetConnection connect result level
/// (7.2.1.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResultLevel {
    /// Warning level. Not further explained in any spec.
    Warning,
    /// Status level. Used by [`OnStatus`] commands.
    Status,
    /// Error level. Not further explained in any spec.
    Error,
    /// Any other level a peer sent.
    Unknown(String),
}

impl FromStr for CommandResultLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "warning" => Ok(Self::Warning),
            "status" => Ok(Self::Status),
            "error" => Ok(Self::Error),
            _ => Ok(Self::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for CommandResultLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Status => write!(f, "status"),
            Self::Error => write!(f, "error"),
            Self::Unknown(s) => write!(f, "{s}"),
        }
    }
}

/// A command message decoded only as far as its name, transaction id and
/// raw AMF0 argument list. Callers match `transaction_id` against their own
/// outstanding requests to decide how to interpret `values`.
#[derive(Debug, Clone)]
pub struct RawCommand {
    /// The command name, e.g. `"_result"`, `"_error"`, `"onStatus"`.
    pub command_name: String,
    /// Transaction id this is a reply to, or 0 for commands that don't use one.
    pub transaction_id: f64,
    /// Every AMF0 value after the transaction id.
    pub values: Vec<amf0::Amf0Value>,
}

impl RawCommand {
    /// Decodes a command name, transaction id and argument list from an
    /// AMF0 command message payload.
    pub fn read(payload: &[u8]) -> Result<Self, CommandError> {
        let mut decoder = amf0::Amf0Decoder::new(payload);

        let command_name = decoder.decode_string()?;
        let transaction_id = decoder.decode_number()?;
        let values = decoder.decode_all()?;

        Ok(Self {
            command_name,
            transaction_id,
            values,
        })
    }
}

/// A server reply to an AMF0 command this client sent, distinguished by its
/// command name (`_result`/`_error`) and matched back up by transaction id.
#[derive(Debug, Clone)]
pub enum CommandReply {
    /// Reply to `connect`.
    ConnectResult(ConnectResult),
    /// Reply to `createStream`.
    CreateStreamResult(CreateStreamResult),
    /// `connect`, `createStream` or `publish` was rejected.
    Error {
        /// The command this is a reply to, if recognizable.
        command_name: String,
        /// The `info` object's `code`, if present.
        code: Option<String>,
        /// The `info` object's `description`, if present.
        description: Option<String>,
    },
    /// An `onStatus` event for the published stream.
    OnStatus(OnStatus),
    /// Any other command this client does not act on.
    Other {
        /// The command name.
        command_name: String,
    },
}

impl CommandReply {
    /// Classifies a decoded command reply.
    ///
    /// A `_result`/`_error` reply's payload shape doesn't repeat the
    /// command name it answers, so `pending_result_for` names the
    /// outstanding request (`"connect"` or `"createStream"`) the caller is
    /// expecting a reply to, to disambiguate.
    pub fn classify(raw: &RawCommand, pending_result_for: Option<&str>) -> Result<Self, CommandError> {
        match raw.command_name.as_str() {
            "_result" => match pending_result_for {
                Some("connect") => Ok(Self::ConnectResult(ConnectResult::from_values(&raw.values)?)),
                Some("createStream") => Ok(Self::CreateStreamResult(CreateStreamResult::from_values(&raw.values)?)),
                _ => Ok(Self::Other {
                    command_name: raw.command_name.clone(),
                }),
            },
            "_error" => {
                let info = raw.values.get(1).and_then(amf0::Amf0Value::as_object);
                let field = |name: &str| {
                    info.and_then(|o| o.iter().find(|(k, _)| k == name))
                        .and_then(|(_, v)| v.as_str())
                        .map(str::to_string)
                };
                Ok(Self::Error {
                    command_name: pending_result_for.unwrap_or("unknown").to_string(),
                    code: field("code"),
                    description: field("description"),
                })
            }
            "onStatus" => Ok(Self::OnStatus(OnStatus::from_values(&raw.values)?)),
            other => Ok(Self::Other {
                command_name: other.to_string(),
            }),
        }
    }
}
