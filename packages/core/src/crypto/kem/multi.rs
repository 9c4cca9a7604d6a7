//! Multi-recipient KEM (envelope encryption)
//!
//! Один случайный ключ данных, обёрнутый отдельно для каждого получателя.
//!
//! ```text
//! u16 count
//! count × { u16 kek_len, kek_encapsulation, u16 wrapped_len, wrapped_data_key }
//! ```
//!
//! No recipient identifier is transmitted. The decoder parses all `count`
//! records, requires them to cover the envelope exactly, then returns the
//! first record that unwraps.

use super::{Encapsulation, Kem};
use crate::config::Config;
use crate::crypto::keys::{KeyPair, SecretKey};
use crate::crypto::provider::{CryptoProvider, DIGEST_LEN};
use crate::error::{CryptoError, Rejected};
use crate::protocol::wire::{WireReader, WireWriter};
use std::marker::PhantomData;
use tracing::{debug, trace};

/// KEM delivering one key to many recipients
pub trait MultiKem {
    type PublicKey;
    type PrivateKey;

    fn key_gen(&self) -> Result<KeyPair<Self::PublicKey, Self::PrivateKey>, CryptoError>;

    fn encap(&self, recipients: &[Self::PublicKey]) -> Result<(SecretKey, Encapsulation), CryptoError>;

    fn decap(&self, private_key: &Self::PrivateKey, envelope: &[u8]) -> Result<SecretKey, Rejected>;
}

/// Конверт с key wrap поверх любого [`Kem`]
pub struct WrappingMultiKem<K, P: CryptoProvider> {
    kem: K,
    max_recipients: usize,
    _provider: PhantomData<P>,
}

impl<K: Kem, P: CryptoProvider> WrappingMultiKem<K, P> {
    /// Потолок получателей из глобальной конфигурации
    pub fn new(kem: K) -> Result<Self, CryptoError> {
        Config::global().validate()?;
        Self::with_max_recipients(kem, Config::global().multi_kem_max_recipients)
    }

    pub fn with_max_recipients(kem: K, max_recipients: usize) -> Result<Self, CryptoError> {
        if max_recipients == 0 || max_recipients > u16::MAX as usize {
            return Err(CryptoError::ConfigurationError(format!(
                "Multi-recipient ceiling must be within 1..={}, got {}",
                u16::MAX,
                max_recipients
            )));
        }
        Ok(Self {
            kem,
            max_recipients,
            _provider: PhantomData,
        })
    }

    pub fn max_recipients(&self) -> usize {
        self.max_recipients
    }

    fn try_record(
        &self,
        private_key: &K::PrivateKey,
        encapsulated_kek: &[u8],
        wrapped: &[u8],
    ) -> Option<SecretKey> {
        let kek = self.kem.decap(private_key, encapsulated_kek).ok()?;
        let data_key = P::unwrap_key(kek.as_bytes(), wrapped).ok()?;
        SecretKey::from_slice(&data_key)
    }
}

impl<K: Kem, P: CryptoProvider> MultiKem for WrappingMultiKem<K, P> {
    type PublicKey = K::PublicKey;
    type PrivateKey = K::PrivateKey;

    fn key_gen(&self) -> Result<KeyPair<K::PublicKey, K::PrivateKey>, CryptoError> {
        self.kem.key_gen()
    }

    fn encap(&self, recipients: &[K::PublicKey]) -> Result<(SecretKey, Encapsulation), CryptoError> {
        if recipients.is_empty() {
            return Err(CryptoError::InvalidInputError(
                "At least one recipient is required".to_string(),
            ));
        }
        // конверт, который собственный декодер отверг бы
        if recipients.len() > self.max_recipients {
            return Err(CryptoError::InvalidInputError(format!(
                "{} recipients exceed the ceiling of {}",
                recipients.len(),
                self.max_recipients
            )));
        }
        let count = u16::try_from(recipients.len()).map_err(|_| {
            CryptoError::InvalidInputError("Recipient count does not fit u16".to_string())
        })?;

        let random = zeroize::Zeroizing::new(P::random_bytes(DIGEST_LEN)?);
        let data_key = SecretKey::from_slice(&random).ok_or_else(|| {
            CryptoError::RandomError("Short read from random source".to_string())
        })?;

        let mut writer = WireWriter::with_capacity(2 + recipients.len() * 96);
        writer.put_u16(count);

        for recipient in recipients {
            let (kek, encapsulated_kek) = self.kem.encap(recipient)?;
            let wrapped = P::wrap_key(kek.as_bytes(), data_key.as_bytes())?;
            writer.put_u16_prefixed(&encapsulated_kek)?;
            writer.put_u16_prefixed(&wrapped)?;
        }

        debug!(target: "crypto::multi_kem", recipients = recipients.len(), "Envelope built");
        Ok((data_key, writer.into_bytes()))
    }

    fn decap(&self, private_key: &K::PrivateKey, envelope: &[u8]) -> Result<SecretKey, Rejected> {
        let mut reader = WireReader::new(envelope);
        let count = reader.get_u16().ok_or_else(|| {
            debug!(target: "crypto::multi_kem", "Envelope rejected: truncated count");
            Rejected
        })? as usize;

        if count > self.max_recipients {
            debug!(
                target: "crypto::multi_kem",
                count,
                ceiling = self.max_recipients,
                "Envelope rejected: recipient count over ceiling"
            );
            return Err(Rejected);
        }

        let mut records = Vec::with_capacity(count);
        for index in 0..count {
            match (reader.get_u16_prefixed(), reader.get_u16_prefixed()) {
                (Some(encapsulated_kek), Some(wrapped)) => records.push((encapsulated_kek, wrapped)),
                _ => {
                    debug!(target: "crypto::multi_kem", index, "Envelope rejected: truncated record");
                    return Err(Rejected);
                }
            }
        }
        if reader.remaining() != 0 {
            debug!(
                target: "crypto::multi_kem",
                trailing = reader.remaining(),
                "Envelope rejected: trailing bytes"
            );
            return Err(Rejected);
        }

        for (encapsulated_kek, wrapped) in records {
            if let Some(key) = self.try_record(private_key, encapsulated_kek, wrapped) {
                trace!(target: "crypto::multi_kem", "Envelope record unwrapped");
                return Ok(key);
            }
        }

        debug!(target: "crypto::multi_kem", count, "Envelope rejected: no record unwrapped");
        Err(Rejected)
    }
}
