#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server requested unsupported rtmp version: {0}")]
    UnsupportedVersion(u8),
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HandshakeError::UnsupportedVersion(9);
        assert_eq!(err.to_string(), "server requested unsupported rtmp version: 9");
    }
}
