//! Parsing of `rtmp://` publish URLs.

use crate::error::RtmpError;

/// Default RTMP port, used when the URL does not specify one.
pub const DEFAULT_PORT: u16 = 1935;

/// A parsed `rtmp://` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtmpUrl {
    /// Host to resolve and connect to.
    pub host: String,
    /// TCP port to connect to.
    pub port: u16,
    /// The application name: the path component with the leading slash
    /// stripped. This is what gets sent as `connect`'s `app` parameter.
    pub app: String,
    /// The full, original URL string, sent verbatim as `connect`'s `tcUrl`.
    pub tc_url: String,
}

impl RtmpUrl {
    /// Parses `input` as an `rtmp://host[:port]/app[/...]` URL.
    ///
    /// Only the `rtmp` scheme is accepted; `rtmps`/`rtmpe` and anything else
    /// fail with [`RtmpError::BadUrl`].
    pub fn parse(input: &str) -> Result<Self, RtmpError> {
        let parsed = url::Url::parse(input).map_err(|e| RtmpError::BadUrl(e.to_string()))?;

        if parsed.scheme() != "rtmp" {
            return Err(RtmpError::BadUrl(format!("unsupported scheme: {}", parsed.scheme())));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| RtmpError::BadUrl("missing host".to_string()))?
            .to_string();
        let port = parsed.port().unwrap_or(DEFAULT_PORT);
        let app = parsed.path().trim_start_matches('/').to_string();

        Ok(Self {
            host,
            port,
            app,
            tc_url: input.to_string(),
        })
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn parses_host_port_and_app() {
        let url = RtmpUrl::parse("rtmp://example.com:1935/live/stream-key").unwrap();
        assert_eq!(url.host, "example.com");
        assert_eq!(url.port, 1935);
        assert_eq!(url.app, "live/stream-key");
        assert_eq!(url.tc_url, "rtmp://example.com:1935/live/stream-key");
    }

    #[test]
    fn defaults_to_standard_port() {
        let url = RtmpUrl::parse("rtmp://example.com/live").unwrap();
        assert_eq!(url.port, 1935);
    }

    #[test]
    fn rejects_non_rtmp_scheme() {
        let err = RtmpUrl::parse("https://example.com/live").unwrap_err();
        assert!(matches!(err, RtmpError::BadUrl(_)));
    }

    #[test]
    fn rejects_missing_host() {
        let err = RtmpUrl::parse("rtmp:///live").unwrap_err();
        assert!(matches!(err, RtmpError::BadUrl(_)));
    }
}
