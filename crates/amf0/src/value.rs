//! AMF0 value types.

/// An AMF0 object: an ordered list of key/value pairs.
///
/// AMF0 objects preserve insertion order on the wire, so this is a `Vec`
/// rather than a map.
pub type Amf0Object = Vec<(String, Amf0Value)>;

/// An AMF0 strict array.
pub type Amf0Array = Vec<Amf0Value>;

/// Any AMF0 value this codec knows how to decode.
#[derive(Debug, PartialEq, Clone)]
pub enum Amf0Value {
    /// AMF0 Number.
    Number(f64),
    /// AMF0 Boolean.
    Boolean(bool),
    /// AMF0 String.
    String(String),
    /// AMF0 Object.
    Object(Amf0Object),
    /// AMF0 Null.
    Null,
    /// AMF0 StrictArray.
    Array(Amf0Array),
}

impl Amf0Value {
    /// Returns the value as a `&str` if it is a [`Amf0Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Amf0Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the value as an `f64` if it is a [`Amf0Value::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Amf0Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the value's properties if it is a [`Amf0Value::Object`].
    pub fn as_object(&self) -> Option<&[(String, Amf0Value)]> {
        match self {
            Amf0Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Looks up a key in a [`Amf0Value::Object`], returning `None` for any
    /// other variant or a missing key.
    pub fn get(&self, key: &str) -> Option<&Amf0Value> {
        self.as_object()?.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl From<f64> for Amf0Value {
    fn from(value: f64) -> Self {
        Amf0Value::Number(value)
    }
}

impl From<bool> for Amf0Value {
    fn from(value: bool) -> Self {
        Amf0Value::Boolean(value)
    }
}

impl From<String> for Amf0Value {
    fn from(value: String) -> Self {
        Amf0Value::String(value)
    }
}

impl From<&str> for Amf0Value {
    fn from(value: &str) -> Self {
        Amf0Value::String(value.to_owned())
    }
}
