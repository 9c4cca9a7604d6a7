//! Data Encapsulation Mechanisms
//!
//! [`CommittingDem`]: симметричное шифрование, где пара (ciphertext, tag)
//! является связывающим обязательством на (key, message, label).

use crate::crypto::keys::SecretKey;
use crate::error::{CryptoError, Rejected};

pub mod siv;

/// Результат `enc`: `iv || ciphertext` и отдельный тег
///
/// Both parts must be transmitted. The tag is also what a sender feeds into
/// a tag-binding KEM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittingCiphertext {
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Compactly committing authenticated encryption
pub trait CommittingDem {
    fn key_gen(&self) -> Result<SecretKey, CryptoError>;

    fn enc(
        &self,
        key: &SecretKey,
        message: &[u8],
        label: &[u8],
    ) -> Result<CommittingCiphertext, CryptoError>;

    /// Returns the plaintext only when the tag commits to it under `key`
    /// and `label`; a recovered plaintext that fails the check is wiped.
    fn dec(
        &self,
        key: &SecretKey,
        ciphertext: &[u8],
        label: &[u8],
        tag: &[u8],
    ) -> Result<Vec<u8>, Rejected>;
}
