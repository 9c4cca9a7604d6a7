//! RSA-KEM (textbook RSA)
//!
//! ```text
//! encap(n, e):  r ← [2, n)
//!               ek  = r^e mod n        (big-endian, длина модуля)
//!               key = H(r)             (минимальный big-endian r)
//!
//! decap(d, ek): r = ek^d mod n,  key = H(r)
//! ```
//!
//! Как и у [`DhKem`](super::basic::DhKem), неверный закрытый ключ даёт
//! другой ключ, а не ошибку. Отвергаются только конверты неверной длины и
//! значения вне `[0, n)`.

use super::{Encapsulation, Kem};
use crate::config::{Config, MIN_RSA_MODULUS_BITS};
use crate::crypto::keys::{KeyPair, SecretKey};
use crate::crypto::provider::CryptoProvider;
use crate::error::{CryptoError, Rejected};
use rand::rngs::OsRng;
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use std::marker::PhantomData;
use tracing::{debug, trace};
use zeroize::Zeroizing;

/// RSA пара ключей
pub type RsaKeyPair = KeyPair<RsaPublicKey, RsaPrivateKey>;

/// RSA-KEM; хэш и случайность берутся у провайдера `P`
pub struct RsaKem<P: CryptoProvider> {
    modulus_bits: usize,
    _provider: PhantomData<P>,
}

impl<P: CryptoProvider> RsaKem<P> {
    /// Размер модуля из глобальной конфигурации
    pub fn new() -> Result<Self, CryptoError> {
        let config = Config::global();
        config.validate()?;
        Self::with_modulus_bits(config.rsa_modulus_bits)
    }

    pub fn with_modulus_bits(modulus_bits: usize) -> Result<Self, CryptoError> {
        if modulus_bits < MIN_RSA_MODULUS_BITS {
            return Err(CryptoError::ConfigurationError(format!(
                "RSA modulus must be at least {} bits, got {}",
                MIN_RSA_MODULUS_BITS, modulus_bits
            )));
        }
        Ok(Self {
            modulus_bits,
            _provider: PhantomData,
        })
    }

    pub fn modulus_bits(&self) -> usize {
        self.modulus_bits
    }

    /// Равномерный r в [2, n): отбраковка по битовой длине модуля
    fn sample(modulus: &BigUint) -> Result<BigUint, CryptoError> {
        let bits = modulus.bits() as usize;
        let len = (bits + 7) / 8;
        let top_mask = 0xFFu8 >> (len * 8 - bits);
        let two = BigUint::from(2u8);

        loop {
            let mut bytes = Zeroizing::new(P::random_bytes(len)?);
            bytes[0] &= top_mask;
            let candidate = BigUint::from_bytes_be(&bytes);
            if candidate >= two && &candidate < modulus {
                return Ok(candidate);
            }
        }
    }

    fn derive(r: &BigUint) -> SecretKey {
        let bytes = Zeroizing::new(r.to_bytes_be());
        SecretKey::from_bytes(P::hash(&[&bytes[..]]))
    }
}

/// Big-endian с ведущими нулями до длины модуля
fn to_fixed_be(value: &BigUint, len: usize) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    let mut out = vec![0u8; len.saturating_sub(bytes.len())];
    out.extend_from_slice(&bytes);
    out
}

impl<P: CryptoProvider> Kem for RsaKem<P> {
    type PublicKey = RsaPublicKey;
    type PrivateKey = RsaPrivateKey;

    fn key_gen(&self) -> Result<RsaKeyPair, CryptoError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, self.modulus_bits)
            .map_err(|e| CryptoError::KeyGenerationError(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);

        debug!(target: "crypto::rsa_kem", bits = self.modulus_bits, "RSA key pair generated");
        Ok(KeyPair::new(public_key, private_key))
    }

    fn encap(&self, recipient: &RsaPublicKey) -> Result<(SecretKey, Encapsulation), CryptoError> {
        let modulus = recipient.n();
        let r = Self::sample(modulus)?;
        let encapsulated = to_fixed_be(&r.modpow(recipient.e(), modulus), recipient.size());

        trace!(target: "crypto::rsa_kem", len = encapsulated.len(), "Encapsulated key");
        Ok((Self::derive(&r), encapsulated))
    }

    fn decap(&self, private_key: &RsaPrivateKey, encapsulated: &[u8]) -> Result<SecretKey, Rejected> {
        if encapsulated.len() != private_key.size() {
            debug!(
                target: "crypto::rsa_kem",
                len = encapsulated.len(),
                expected = private_key.size(),
                "Decapsulation rejected: wrong length"
            );
            return Err(Rejected);
        }

        let c = BigUint::from_bytes_be(encapsulated);
        if &c >= private_key.n() {
            debug!(target: "crypto::rsa_kem", "Decapsulation rejected: value not below modulus");
            return Err(Rejected);
        }

        let r = c.modpow(private_key.d(), private_key.n());
        Ok(Self::derive(&r))
    }
}
