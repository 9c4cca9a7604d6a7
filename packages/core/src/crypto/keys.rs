// Ключевой материал
// Пары ключей, симметричные ключи и составные ключи для SignedAkem

use crate::crypto::provider::{CryptoProvider, DIGEST_LEN};
use crate::error::CryptoError;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Пара ключей: публичная и приватная половины
///
/// Вызывающий владеет обеими половинами. `Debug` никогда не печатает
/// приватную часть.
#[derive(Clone)]
pub struct KeyPair<Pub, Priv> {
    pub public_key: Pub,
    pub private_key: Priv,
}

impl<Pub, Priv> KeyPair<Pub, Priv> {
    pub fn new(public_key: Pub, private_key: Priv) -> Self {
        Self {
            public_key,
            private_key,
        }
    }
}

impl<Pub: fmt::Debug, Priv> fmt::Debug for KeyPair<Pub, Priv> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// DH пара ключей конкретного набора
pub type KemKeyPair<P> =
    KeyPair<<P as CryptoProvider>::KemPublicKey, <P as CryptoProvider>::KemPrivateKey>;

/// Пара ключей подписи конкретного набора
pub type SignatureKeyPair<P> = KeyPair<
    <P as CryptoProvider>::SignaturePublicKey,
    <P as CryptoProvider>::SignaturePrivateKey,
>;

/// Сгенерировать DH пару напрямую через провайдер (без пула)
pub fn generate_kem_key_pair<P: CryptoProvider>() -> Result<KemKeyPair<P>, CryptoError> {
    let (private_key, public_key) = P::generate_kem_keys()?;
    Ok(KeyPair::new(public_key, private_key))
}

/// Сгенерировать пару ключей подписи
pub fn generate_signature_key_pair<P: CryptoProvider>() -> Result<SignatureKeyPair<P>, CryptoError> {
    let (private_key, public_key) = P::generate_signature_keys()?;
    Ok(KeyPair::new(public_key, private_key))
}

/// Симметричный 256-битный ключ
///
/// Всегда выводится внутри крейта, вызывающий не выбирает байты сам.
/// Обнуляется при drop, сравнение за постоянное время.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; DIGEST_LEN]);

impl SecretKey {
    pub(crate) fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Copies a key out of a buffer of exactly `DIGEST_LEN` bytes.
    pub(crate) fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; DIGEST_LEN] = bytes.try_into().ok()?;
        Some(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for SecretKey {}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// Публичный ключ SignedAkem: KEM половина + половина проверки подписи
pub struct SignedPublicKey<P: CryptoProvider> {
    pub kem: P::KemPublicKey,
    pub verifying: P::SignaturePublicKey,
}

/// Приватный ключ SignedAkem: KEM половина + половина подписи
pub struct SignedPrivateKey<P: CryptoProvider> {
    pub kem: P::KemPrivateKey,
    pub signing: P::SignaturePrivateKey,
}

impl<P: CryptoProvider> Clone for SignedPublicKey<P> {
    fn clone(&self) -> Self {
        Self {
            kem: self.kem.clone(),
            verifying: self.verifying.clone(),
        }
    }
}

impl<P: CryptoProvider> Clone for SignedPrivateKey<P> {
    fn clone(&self) -> Self {
        Self {
            kem: self.kem.clone(),
            signing: self.signing.clone(),
        }
    }
}

impl<P: CryptoProvider> fmt::Debug for SignedPublicKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedPublicKey")
            .field("kem", &self.kem)
            .field("verifying", &self.verifying)
            .finish()
    }
}

/// Составная пара ключей SignedAkem
pub type SignedKeyPair<P> = KeyPair<SignedPublicKey<P>, SignedPrivateKey<P>>;
