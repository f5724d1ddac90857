use thiserror::Error;

/// Failure classes for the vault client.
///
/// Every variant carries a plain string so errors stay `Clone` and can ride
/// inside application messages. None of these is fatal: validation failures
/// are surfaced before a request is sent, and transport/response failures
/// are reconciled by the coordinator that triggered the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// The selected file is not an image; rejected before any request.
    #[error("{0} is not an image file")]
    NotAnImage(String),

    /// The request never completed (network unreachable, connection reset).
    #[error("request failed: {0}")]
    Transport(String),

    /// The service answered with something we could not interpret.
    #[error("unexpected response: {0}")]
    BadResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = VaultError::NotAnImage("notes.txt".to_string());
        assert_eq!(err.to_string(), "notes.txt is not an image file");
    }
}
