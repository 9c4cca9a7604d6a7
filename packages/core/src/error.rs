use std::fmt;
use thiserror::Error;

/// Fatal errors: bad configuration, failed primitives, invalid caller input.
///
/// Decapsulation never returns this type. Authentication and decode failures
/// on the receiving side collapse into [`Rejected`].
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),
    #[error("Key generation failed: {0}")]
    KeyGenerationError(String),
    #[error("Signing failed: {0}")]
    SigningError(String),
    #[error("Signature verification failed: {0}")]
    SignatureVerificationError(String),
    #[error("Key agreement failed: {0}")]
    KeyAgreementError(String),
    #[error("Cipher operation failed: {0}")]
    CipherError(String),
    #[error("Key wrapping failed: {0}")]
    KeyWrapError(String),
    #[error("Random generation failed: {0}")]
    RandomError(String),
    #[error("Invalid input: {0}")]
    InvalidInputError(String),
    #[error("Key pair pool is closed")]
    PoolClosed,
}

impl From<ed25519_dalek::SignatureError> for CryptoError {
    fn from(err: ed25519_dalek::SignatureError) -> Self {
        CryptoError::SigningError(err.to_string())
    }
}

impl From<rand::Error> for CryptoError {
    fn from(err: rand::Error) -> Self {
        CryptoError::RandomError(err.to_string())
    }
}

/// Opaque decapsulation / decryption failure.
///
/// Deliberately carries no reason: a MAC mismatch, a bad signature, a failed
/// unwrap and a truncated buffer all look the same to the caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("decapsulation rejected")]
pub struct Rejected;

/// Failed ratchet decapsulation.
///
/// The conversation state passed in is handed back untouched so that a forged
/// or corrupted message cannot desynchronize the conversation.
pub struct RatchetRejected<S> {
    state: S,
}

impl<S> RatchetRejected<S> {
    pub(crate) fn new(state: S) -> Self {
        Self { state }
    }

    /// Recover the state that was passed to the failed call.
    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S> fmt::Debug for RatchetRejected<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RatchetRejected")
    }
}

impl<S> fmt::Display for RatchetRejected<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Rejected, f)
    }
}

impl<S> std::error::Error for RatchetRejected<S> {}
