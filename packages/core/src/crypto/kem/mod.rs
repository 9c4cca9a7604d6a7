//! Key Encapsulation Mechanisms
//!
//! Каждое семейство - trait (точка расширения) плюс реализация:
//!
//! | Trait | Реализация | Назначение |
//! |-------|------------|------------|
//! | [`Kem`] | [`basic::DhKem`] | ECDH KEM без аутентификации |
//! | [`Kem`] | [`rsa::RsaKem`] | RSA-KEM (textbook RSA) |
//! | [`Akem`] | [`auth::DhAkem`] | неявная аутентификация (static + ephemeral ECDH) |
//! | [`Akem`] | [`signed::SignedAkem`] | явная аутентификация подписью |
//! | [`tag::TagKem`] | [`tag::MacTagKem`] | привязка внешнего тега через MAC |
//! | [`multi::MultiKem`] | [`multi::WrappingMultiKem`] | конверт для N получателей |
//!
//! Decapsulation never raises: every decode or authentication failure is
//! reported as the opaque [`Rejected`].

use crate::crypto::keys::{KeyPair, SecretKey};
use crate::error::{CryptoError, Rejected};

pub mod auth;
pub mod basic;
pub mod multi;
pub mod rsa;
pub mod signed;
pub mod tag;

/// Encapsulated key as transmitted
pub type Encapsulation = Vec<u8>;

/// Unauthenticated KEM
pub trait Kem {
    type PublicKey;
    type PrivateKey;

    fn key_gen(&self) -> Result<KeyPair<Self::PublicKey, Self::PrivateKey>, CryptoError>;

    /// Fresh key plus its encapsulation for `recipient`.
    fn encap(&self, recipient: &Self::PublicKey) -> Result<(SecretKey, Encapsulation), CryptoError>;

    fn decap(
        &self,
        private_key: &Self::PrivateKey,
        encapsulated: &[u8],
    ) -> Result<SecretKey, Rejected>;
}

/// Authenticated KEM: the recipient also learns who sent the key
pub trait Akem {
    type PublicKey;
    type PrivateKey;

    fn key_gen(&self) -> Result<KeyPair<Self::PublicKey, Self::PrivateKey>, CryptoError>;

    fn auth_encap(
        &self,
        sender: &Self::PrivateKey,
        recipient: &Self::PublicKey,
    ) -> Result<(SecretKey, Encapsulation), CryptoError>;

    fn auth_decap(
        &self,
        recipient: &Self::PrivateKey,
        sender: &Self::PublicKey,
        encapsulated: &[u8],
    ) -> Result<SecretKey, Rejected>;
}
