//! RatchetKem: ratcheting replyable KEM
//!
//! ## Wire format
//!
//! ```text
//! u16 epk_len, encoded ephemeral public key
//! u16 count
//! count × { u16 wrapped_len, wrapped data key }
//! ```
//!
//! Records carry no recipient identifier; their order follows the sender's
//! remote key list. The receiver parses all `count` records and rejects an
//! envelope they do not cover exactly before trying any unwrap.
//!
//! ## Key derivation
//!
//! For each remote key `R` the sender computes
//! `wrap_key = H(DH(e, R) || DH(local, R) || enc(E) || tag)` and wraps the
//! state's data key under it. The receiver uses the first remote key of its
//! own state for the static term, so with more than one remote it only
//! decapsulates messages whose sender is that first key.

use super::ReplyableKem;
use crate::config::Config;
use crate::crypto::keys::{KemKeyPair, SecretKey};
use crate::crypto::pool::KeyPairPool;
use crate::crypto::provider::{CryptoProvider, DIGEST_LEN};
use crate::error::{CryptoError, RatchetRejected};
use crate::protocol::wire::{WireReader, WireWriter};
use crate::utils::logging::fingerprint;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use zeroize::Zeroizing;

/// Состояние разговора
///
/// Не реализует `Clone`: каждое состояние используется ровно один раз.
pub struct ConversationState<P: CryptoProvider> {
    local: P::KemPrivateKey,
    remotes: Vec<P::KemPublicKey>,
    ephemeral: KemKeyPair<P>,
    data_key: SecretKey,
}

impl<P: CryptoProvider> ConversationState<P> {
    pub fn key(&self) -> &SecretKey {
        &self.data_key
    }

    pub fn remote_public_keys(&self) -> &[P::KemPublicKey] {
        &self.remotes
    }

    /// Ephemeral public key the next `auth_encap` will publish.
    pub fn ephemeral_public_key(&self) -> &P::KemPublicKey {
        &self.ephemeral.public_key
    }

    #[cfg(test)]
    pub(crate) fn duplicate(&self) -> Self {
        Self {
            local: self.local.clone(),
            remotes: self.remotes.clone(),
            ephemeral: self.ephemeral.clone(),
            data_key: self.data_key.clone(),
        }
    }
}

impl<P: CryptoProvider> fmt::Debug for ConversationState<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationState")
            .field("local", &fingerprint(&P::private_key_bytes(&self.local)))
            .field(
                "remote",
                &self
                    .remotes
                    .first()
                    .map(|remote| fingerprint(&P::encode_public_key(remote))),
            )
            .field("remote_count", &self.remotes.len())
            .field(
                "ephemeral_private",
                &fingerprint(&P::private_key_bytes(&self.ephemeral.private_key)),
            )
            .field(
                "ephemeral_public",
                &fingerprint(&P::encode_public_key(&self.ephemeral.public_key)),
            )
            .finish()
    }
}

/// Ratcheting KEM поверх [`CryptoProvider`]
pub struct RatchetKem<P: CryptoProvider> {
    pool: Arc<KeyPairPool<P>>,
    max_recipients: usize,
}

impl<P: CryptoProvider> RatchetKem<P> {
    pub fn new() -> Result<Self, CryptoError> {
        Config::global().validate()?;
        Ok(Self::with_pool(Arc::new(KeyPairPool::new()?)))
    }

    /// Ратчет поверх общего пула эфемерных пар
    pub fn with_pool(pool: Arc<KeyPairPool<P>>) -> Self {
        Self {
            pool,
            max_recipients: Config::global().ratchet_max_recipients,
        }
    }

    fn begin_owned(
        &self,
        local: P::KemPrivateKey,
        remotes: Vec<P::KemPublicKey>,
    ) -> Result<ConversationState<P>, CryptoError> {
        if remotes.is_empty() {
            return Err(CryptoError::InvalidInputError(
                "A conversation needs at least one remote key".to_string(),
            ));
        }
        if remotes.len() > self.max_recipients {
            return Err(CryptoError::InvalidInputError(format!(
                "{} remote keys exceed the limit of {}",
                remotes.len(),
                self.max_recipients
            )));
        }

        let ephemeral = self.pool.key_gen()?;
        let seed = Zeroizing::new(P::random_bytes(DIGEST_LEN)?);
        let data_key = SecretKey::from_slice(&seed).ok_or_else(|| {
            CryptoError::RandomError("Short read from random source".to_string())
        })?;

        let state = ConversationState {
            local,
            remotes,
            ephemeral,
            data_key,
        };
        trace!(target: "crypto::ratchet", state = ?state, "Conversation state created");
        Ok(state)
    }

    fn wrap_key(
        ephemeral_secret: &[u8],
        static_secret: &[u8],
        encoded_ephemeral: &[u8],
        tag: &[u8],
    ) -> Zeroizing<[u8; DIGEST_LEN]> {
        Zeroizing::new(P::hash(&[
            ephemeral_secret,
            static_secret,
            encoded_ephemeral,
            tag,
        ]))
    }

    /// Разобрать конверт и развернуть ключ, не трогая состояние
    fn open(
        state: &ConversationState<P>,
        encapsulated: &[u8],
        tag: &[u8],
    ) -> Result<(P::KemPublicKey, SecretKey), &'static str> {
        let mut reader = WireReader::new(encapsulated);
        let encoded = reader.get_u16_prefixed().ok_or("truncated ephemeral key")?;
        let ephemeral_public =
            P::decode_public_key(encoded).map_err(|_| "undecodable ephemeral key")?;
        let count = reader.get_u16().ok_or("truncated record count")?;
        let records = (0..count)
            .map(|_| reader.get_u16_prefixed())
            .collect::<Option<Vec<_>>>()
            .ok_or("truncated record")?;
        if reader.remaining() != 0 {
            return Err("trailing bytes after records");
        }

        let remote = state.remotes.first().ok_or("state has no remote key")?;
        let ephemeral_secret = P::diffie_hellman(&state.local, &ephemeral_public)
            .map_err(|_| "ephemeral key agreement failed")?;
        let static_secret =
            P::diffie_hellman(&state.local, remote).map_err(|_| "static key agreement failed")?;
        let wrap_key = Self::wrap_key(&ephemeral_secret[..], &static_secret[..], encoded, tag);

        for wrapped in records {
            if let Ok(data_key) = P::unwrap_key(&wrap_key[..], wrapped) {
                if let Some(key) = SecretKey::from_slice(&data_key) {
                    return Ok((ephemeral_public, key));
                }
            }
        }

        Err("no record unwrapped")
    }
}

impl<P: CryptoProvider> ReplyableKem for RatchetKem<P> {
    type PublicKey = P::KemPublicKey;
    type PrivateKey = P::KemPrivateKey;
    type State = ConversationState<P>;

    fn begin(
        &self,
        local: &P::KemPrivateKey,
        remotes: &[P::KemPublicKey],
    ) -> Result<ConversationState<P>, CryptoError> {
        self.begin_owned(local.clone(), remotes.to_vec())
    }

    fn key<'a>(&self, state: &'a ConversationState<P>) -> &'a SecretKey {
        state.key()
    }

    fn auth_encap(
        &self,
        state: ConversationState<P>,
        tag: &[u8],
    ) -> Result<(ConversationState<P>, Vec<u8>), CryptoError> {
        let encoded = P::encode_public_key(&state.ephemeral.public_key);
        let count = u16::try_from(state.remotes.len()).map_err(|_| {
            CryptoError::InvalidInputError("Remote key count does not fit u16".to_string())
        })?;

        let mut writer = WireWriter::with_capacity(4 + encoded.len() + state.remotes.len() * 42);
        writer.put_u16_prefixed(&encoded)?;
        writer.put_u16(count);

        for remote in &state.remotes {
            let ephemeral_secret = P::diffie_hellman(&state.ephemeral.private_key, remote)?;
            let static_secret = P::diffie_hellman(&state.local, remote)?;
            let wrap_key = Self::wrap_key(&ephemeral_secret[..], &static_secret[..], &encoded, tag);
            let wrapped = P::wrap_key(&wrap_key[..], state.data_key.as_bytes())?;
            writer.put_u16_prefixed(&wrapped)?;
        }

        // ratchet: эфемерный ключ становится новым локальным
        let ConversationState {
            remotes, ephemeral, ..
        } = state;
        let next = self.begin_owned(ephemeral.private_key, remotes)?;

        debug!(target: "crypto::ratchet", recipients = count, "Ratchet advanced after send");
        Ok((next, writer.into_bytes()))
    }

    fn auth_decap(
        &self,
        state: ConversationState<P>,
        encapsulated: &[u8],
        tag: &[u8],
    ) -> Result<(ConversationState<P>, SecretKey), RatchetRejected<ConversationState<P>>> {
        let (ephemeral_public, key) = match Self::open(&state, encapsulated, tag) {
            Ok(opened) => opened,
            Err(reason) => {
                debug!(target: "crypto::ratchet", reason, "Ratchet decapsulation rejected");
                return Err(RatchetRejected::new(state));
            }
        };

        // эфемерный ключ отправителя становится адресатом ответа
        let next = match self.begin_owned(state.local.clone(), vec![ephemeral_public]) {
            Ok(next) => next,
            Err(e) => {
                warn!(target: "crypto::ratchet", error = %e, "Ratchet could not advance after receive");
                return Err(RatchetRejected::new(state));
            }
        };

        debug!(target: "crypto::ratchet", "Ratchet advanced after receive");
        Ok((next, key))
    }
}
