//! Error types for the signing crate.

use thiserror::Error;

/// Errors that can occur during transaction signing operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid chain id: {0}")]
    InvalidChainId(u64),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid gas parameters: {0}")]
    InvalidGas(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid nonce: {0}")]
    InvalidNonce(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("signing error: {0}")]
    SigningError(String),

    #[error("signature recovery error: {0}")]
    RecoveryError(String),

    #[error("rlp encoding error: {0}")]
    RlpEncodingError(String),

    #[error("rlp decoding error: {0}")]
    RlpDecodingError(String),

    #[error("invalid typed data: {0}")]
    TypedDataError(String),

    #[error("hex decoding error: {0}")]
    HexError(String),

    #[error("json error: {0}")]
    JsonError(String),
}

impl From<hex::FromHexError> for Error {
    fn from(err: hex::FromHexError) -> Self {
        Error::HexError(err.to_string())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_chain_id_display() {
        let err = Error::InvalidChainId(0);
        assert_eq!(err.to_string(), "invalid chain id: 0");
    }

    #[test]
    fn test_invalid_address_display() {
        let err = Error::InvalidAddress("bad".to_string());
        assert_eq!(err.to_string(), "invalid address: bad");
    }

    #[test]
    fn test_invalid_gas_display() {
        let err = Error::InvalidGas("too low".to_string());
        assert_eq!(err.to_string(), "invalid gas parameters: too low");
    }

    #[test]
    fn test_invalid_value_display() {
        let err = Error::InvalidValue("negative".to_string());
        assert_eq!(err.to_string(), "invalid value: negative");
    }

    #[test]
    fn test_invalid_nonce_display() {
        let err = Error::InvalidNonce("too high".to_string());
        assert_eq!(err.to_string(), "invalid nonce: too high");
    }

    #[test]
    fn test_validation_error_display() {
        let err = Error::ValidationError("bad fee".to_string());
        assert_eq!(err.to_string(), "validation error: bad fee");
    }

    #[test]
    fn test_signing_error_display() {
        let err = Error::SigningError("key error".to_string());
        assert_eq!(err.to_string(), "signing error: key error");
    }

    #[test]
    fn test_recovery_error_display() {
        let err = Error::RecoveryError("bad recid".to_string());
        assert_eq!(err.to_string(), "signature recovery error: bad recid");
    }

    #[test]
    fn test_rlp_encoding_error_display() {
        let err = Error::RlpEncodingError("bad list".to_string());
        assert_eq!(err.to_string(), "rlp encoding error: bad list");
    }

    #[test]
    fn test_rlp_decoding_error_display() {
        let err = Error::RlpDecodingError("truncated".to_string());
        assert_eq!(err.to_string(), "rlp decoding error: truncated");
    }

    #[test]
    fn test_typed_data_error_display() {
        let err = Error::TypedDataError("missing field".to_string());
        assert_eq!(err.to_string(), "invalid typed data: missing field");
    }

    #[test]
    fn test_hex_error_display() {
        let err = Error::HexError("odd length".to_string());
        assert_eq!(err.to_string(), "hex decoding error: odd length");
    }

    #[test]
    fn test_json_error_display() {
        let err = Error::JsonError("unexpected token".to_string());
        assert_eq!(err.to_string(), "json error: unexpected token");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }

    #[test]
    fn test_from_hex_error() {
        let hex_err = hex::decode("xyz").unwrap_err();
        let err: Error = hex_err.into();
        assert!(matches!(err, Error::HexError(_)));
    }
}
