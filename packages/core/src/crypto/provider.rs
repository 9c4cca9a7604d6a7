//! Defines the CryptoProvider trait for crypto-agility.

use crate::crypto::SuiteID;
use crate::error::CryptoError;
use core::fmt::Debug;
use zeroize::Zeroizing;

/// Output size of [`CryptoProvider::hash`] and [`CryptoProvider::mac`].
pub const DIGEST_LEN: usize = 32;

/// Trait that formalizes every primitive the combiners rely on.
///
/// The combiners in this crate never touch a curve, a block cipher or a hash
/// directly. They only go through this trait, so a different suite can be
/// plugged in without changing any protocol logic.
pub trait CryptoProvider: Send + Sync + 'static {
    // Associated types for key representation
    type KemPublicKey: Debug + Clone + PartialEq + Send + Sync + 'static;
    type KemPrivateKey: Clone + Send + Sync + 'static;
    type SignaturePublicKey: Debug + Clone + Send + Sync + 'static;
    type SignaturePrivateKey: Clone + Send + Sync + 'static;

    /// Generates a new Diffie-Hellman key pair.
    fn generate_kem_keys() -> Result<(Self::KemPrivateKey, Self::KemPublicKey), CryptoError>;

    /// Derives a KEM public key from a KEM private key.
    fn kem_public_key(private_key: &Self::KemPrivateKey) -> Self::KemPublicKey;

    /// Encodes a public key in its transmitted form.
    fn encode_public_key(public_key: &Self::KemPublicKey) -> Vec<u8>;

    /// Parses a transmitted public key.
    fn decode_public_key(encoded: &[u8]) -> Result<Self::KemPublicKey, CryptoError>;

    /// Raw private key bytes. Only used to fingerprint keys in logs.
    fn private_key_bytes(private_key: &Self::KemPrivateKey) -> Zeroizing<Vec<u8>>;

    /// Performs Diffie-Hellman key agreement.
    ///
    /// Fails on a non-contributory result (low-order peer point).
    fn diffie_hellman(
        private_key: &Self::KemPrivateKey,
        public_key: &Self::KemPublicKey,
    ) -> Result<Zeroizing<[u8; DIGEST_LEN]>, CryptoError>;

    /// Generates a new Signature key pair.
    fn generate_signature_keys(
    ) -> Result<(Self::SignaturePrivateKey, Self::SignaturePublicKey), CryptoError>;

    /// Signs a message with the given private key.
    fn sign(private_key: &Self::SignaturePrivateKey, message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Verifies a signature with the given public key.
    fn verify(
        public_key: &Self::SignaturePublicKey,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), CryptoError>;

    /// Hashes the concatenation of `chunks`.
    fn hash(chunks: &[&[u8]]) -> [u8; DIGEST_LEN];

    /// Keyed MAC over `data`.
    fn mac(key: &[u8], data: &[u8]) -> Result<[u8; DIGEST_LEN], CryptoError>;

    /// Applies the counter-mode keystream for (`key`, `iv`) to `data`.
    /// Encryption and decryption are the same operation.
    fn ctr_keystream(key: &[u8], iv: &[u8], data: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Wraps `key` under the key-encryption key `kek`.
    fn wrap_key(kek: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Unwraps and authenticates a wrapped key.
    fn unwrap_key(kek: &[u8], wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError>;

    /// Generates `len` cryptographically secure random bytes.
    fn random_bytes(len: usize) -> Result<Vec<u8>, CryptoError>;

    /// Returns the SuiteID associated with this CryptoProvider.
    fn suite_id() -> SuiteID;
}
