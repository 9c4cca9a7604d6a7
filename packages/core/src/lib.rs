// KEM/DEM Core
// Authenticated, tag-binding, multi-recipient and ratcheting KEMs

#![warn(clippy::all)]

// Модули
pub mod config;
pub mod crypto;
pub mod error;
pub mod protocol;
pub mod utils;

// Re-exports для удобства
pub use crypto::dem::{siv::SivDem, CommittingCiphertext, CommittingDem};
pub use crypto::kem::auth::DhAkem;
pub use crypto::kem::basic::DhKem;
pub use crypto::kem::multi::{MultiKem, WrappingMultiKem};
pub use crypto::kem::rsa::RsaKem;
pub use crypto::kem::signed::SignedAkem;
pub use crypto::kem::tag::{MacTagKem, TagKem};
pub use crypto::kem::{Akem, Kem};
pub use crypto::keys::{KemKeyPair, KeyPair, SecretKey};
pub use crypto::pool::KeyPairPool;
pub use crypto::ratchet::{ConversationState, RatchetKem, ReplyableKem};
pub use crypto::suites::classic::ClassicSuiteProvider;
pub use error::{CryptoError, RatchetRejected, Rejected};
