//! Replyable (ratcheting) KEM
//!
//! Каждая операция потребляет состояние разговора и возвращает новое.
//! Повторное использование старого состояния невозможно: оно перемещено.
//!
//! ## Dataflow Example
//!
//! ```text
//! Alice                                         Bob
//! -----                                         ---
//! a0 = begin(a, [B])                            b0 = begin(b, [A])
//! k = key(a0); (ct, tag) = DEM.enc(k, m1)
//! (a1, ek) = auth_encap(a0, tag)  ───────────▶  (b1, k) = auth_decap(b0, ek, tag)
//!   a1 = begin(e_a0, [B])                         b1 = begin(b, [E_a0])
//!                                               k = key(b1); (ct, tag) = DEM.enc(k, m2)
//! (a2, k) = auth_decap(a1, ek, tag)  ◀───────── (b2, ek) = auth_encap(b1, tag)
//!   a2 = begin(e_a0, [E_b1])                      b2 = begin(e_b1, [E_a0])
//! ```
//!
//! После каждого хода предыдущий эфемерный секрет больше не нужен и
//! уничтожается вместе со старым состоянием (forward secrecy).

use crate::crypto::keys::SecretKey;
use crate::error::{CryptoError, RatchetRejected};

pub mod conversation;

pub use conversation::{ConversationState, RatchetKem};

/// Stateful KEM where every message carries the key for the reply
pub trait ReplyableKem {
    type PublicKey;
    type PrivateKey;
    type State;

    /// Start a conversation, or accept an unsolicited first message.
    fn begin(
        &self,
        local: &Self::PrivateKey,
        remotes: &[Self::PublicKey],
    ) -> Result<Self::State, CryptoError>;

    /// Data key the next outgoing message must be encrypted under.
    fn key<'a>(&self, state: &'a Self::State) -> &'a SecretKey;

    fn auth_encap(
        &self,
        state: Self::State,
        tag: &[u8],
    ) -> Result<(Self::State, Vec<u8>), CryptoError>;

    /// On failure the input state comes back untouched inside the error.
    fn auth_decap(
        &self,
        state: Self::State,
        encapsulated: &[u8],
        tag: &[u8],
    ) -> Result<(Self::State, SecretKey), RatchetRejected<Self::State>>;
}
