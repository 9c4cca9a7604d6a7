//! Comprehensive tests for the KEM/DEM composition layer
//!
//! This test suite covers:
//! - Classic Suite Provider (X25519, Ed25519, AES-256-CTR, AES-KW)
//! - Composed KEM → DEM → tag binding flow
//! - Ratcheting conversation (four-message exchange)
//! - Multi-recipient envelopes
//! - Commitment and tamper sensitivity

use kemdem_core::crypto::keys::KeyPair;
use kemdem_core::crypto::one_time_mac;
use kemdem_core::crypto::CryptoProvider;
use kemdem_core::{
    Akem, ClassicSuiteProvider, CommittingDem, ConversationState, DhKem, KeyPairPool,
    MacTagKem, MultiKem, RatchetKem, Rejected, ReplyableKem, SignedAkem, SivDem, TagKem,
    WrappingMultiKem,
};
use proptest::prelude::*;
use std::sync::Arc;

type Suite = ClassicSuiteProvider;

fn shared_kem() -> DhKem<Suite> {
    DhKem::with_pool(Arc::new(KeyPairPool::with_capacity(16).unwrap()))
}

fn dem() -> SivDem<Suite> {
    SivDem::new().unwrap()
}

/// Test that ClassicSuiteProvider encodes public keys as 44-byte SPKI
#[test]
fn test_classic_suite_public_key_encoding() {
    let (_, public_key) = Suite::generate_kem_keys().unwrap();
    let encoded = Suite::encode_public_key(&public_key);

    assert_eq!(encoded.len(), 44, "Encoded public key should be 44 bytes");
    let decoded = Suite::decode_public_key(&encoded);
    assert!(decoded.is_ok(), "Encoded key should decode");
    assert_eq!(decoded.unwrap(), public_key);
}

/// Test signature creation and verification
#[test]
fn test_classic_suite_sign_verify() {
    let (signing_key, verifying_key) = Suite::generate_signature_keys().unwrap();
    let message = b"Hello, KEM/DEM!";

    let signature = Suite::sign(&signing_key, message).unwrap();
    assert_eq!(signature.len(), 64, "Signature should be 64 bytes");

    let verify_result = Suite::verify(&verifying_key, message, &signature);
    assert!(verify_result.is_ok(), "Signature verification failed");

    let wrong = Suite::verify(&verifying_key, b"Modified message", &signature);
    assert!(wrong.is_err(), "Verification should fail with wrong message");
}

/// Test the full sender/receiver flow: TagKem key → DEM → bind DEM tag
#[test]
fn test_tag_kem_with_committing_dem() {
    let tag_kem = MacTagKem::<_, Suite>::new(shared_kem());
    let dem = dem();
    let bob = tag_kem.key_gen().unwrap();

    // Sender
    let (key, pending) = tag_kem.key(&bob.public_key).unwrap();
    let sealed = dem.enc(&key, b"hello bob", b"v1").unwrap();
    let encapsulated = tag_kem.encap(pending, &sealed.tag).unwrap();

    // Receiver
    let key = tag_kem
        .decap(&bob.private_key, &encapsulated, &sealed.tag)
        .expect("Decapsulation should succeed with the matching tag");
    let plaintext = dem
        .dec(&key, &sealed.ciphertext, b"v1", &sealed.tag)
        .expect("Decryption should succeed");
    assert_eq!(plaintext, b"hello bob");
}

/// Test that an envelope cannot be spliced onto another ciphertext
#[test]
fn test_tag_kem_rejects_spliced_ciphertext() {
    let tag_kem = MacTagKem::<_, Suite>::new(shared_kem());
    let dem = dem();
    let bob = tag_kem.key_gen().unwrap();

    let (key, pending) = tag_kem.key(&bob.public_key).unwrap();
    let original = dem.enc(&key, b"original", b"").unwrap();
    let encapsulated = tag_kem.encap(pending, &original.tag).unwrap();

    let other = dem.enc(&key, b"substituted", b"").unwrap();
    assert_eq!(
        tag_kem.decap(&bob.private_key, &encapsulated, &other.tag),
        Err(Rejected),
        "Envelope must only open with the tag it was bound to"
    );
}

/// Test the scripted four-message ratchet conversation A→B, B→A, A→B, B→A
#[test]
fn test_ratchet_four_message_conversation() {
    let ratchet = RatchetKem::<Suite>::with_pool(Arc::new(KeyPairPool::with_capacity(8).unwrap()));
    let dem = dem();
    let alice = ratchet_identity();
    let bob = ratchet_identity();

    let mut alice_state = ratchet.begin(&alice.private_key, &[bob.public_key]).unwrap();
    let mut bob_state = ratchet.begin(&bob.private_key, &[alice.public_key]).unwrap();

    let script: [(&[u8], bool); 4] = [
        (&b"A1: hi bob"[..], true),
        (&b"B1: hi alice"[..], false),
        (&b"A2: how are you"[..], true),
        (&b"B2: fine"[..], false),
    ];

    for (message, alice_sends) in script {
        let (sender, receiver) = if alice_sends {
            (alice_state, bob_state)
        } else {
            (bob_state, alice_state)
        };

        let (sender, wire) = send(&ratchet, &dem, sender, message);
        let (receiver, plaintext) = receive(&ratchet, &dem, receiver, &wire)
            .expect("Receiver state from the previous turn must open the message");
        assert_eq!(plaintext, message);

        if alice_sends {
            alice_state = sender;
            bob_state = receiver;
        } else {
            bob_state = sender;
            alice_state = receiver;
        }
    }
}

/// Test that a state from an earlier turn cannot open a later message
#[test]
fn test_ratchet_superseded_state_fails() {
    let ratchet = RatchetKem::<Suite>::with_pool(Arc::new(KeyPairPool::with_capacity(8).unwrap()));
    let dem = dem();
    let alice = ratchet_identity();
    let bob = ratchet_identity();

    let alice_state = ratchet.begin(&alice.private_key, &[bob.public_key]).unwrap();
    let bob_state = ratchet.begin(&bob.private_key, &[alice.public_key]).unwrap();

    let (alice_state, wire) = send(&ratchet, &dem, alice_state, b"first");
    let (bob_state, _) = receive(&ratchet, &dem, bob_state, &wire).unwrap();
    let (bob_state, wire) = send(&ratchet, &dem, bob_state, b"reply");
    let (alice_state, _) = receive(&ratchet, &dem, alice_state, &wire).unwrap();
    let (_alice_state, wire) = send(&ratchet, &dem, alice_state, b"third");

    // Состояние с теми же ключами, что и у Bob до первого хода
    let initial_bob = ratchet.begin(&bob.private_key, &[alice.public_key]).unwrap();
    assert!(
        receive(&ratchet, &dem, initial_bob, &wire).is_none(),
        "A superseded state must not open a later message"
    );

    assert!(receive(&ratchet, &dem, bob_state, &wire).is_some());
}

/// Test that a failed decapsulation hands back a state that still works
#[test]
fn test_ratchet_failure_does_not_desynchronize() {
    let ratchet = RatchetKem::<Suite>::with_pool(Arc::new(KeyPairPool::with_capacity(8).unwrap()));
    let alice = ratchet_identity();
    let bob = ratchet_identity();

    let alice_state = ratchet.begin(&alice.private_key, &[bob.public_key]).unwrap();
    let bob_state = ratchet.begin(&bob.private_key, &[alice.public_key]).unwrap();
    let expected = ratchet.key(&alice_state).clone();

    let (_, encapsulated) = ratchet.auth_encap(alice_state, b"tag").unwrap();

    let mut forged = encapsulated.clone();
    let last = forged.len() - 1;
    forged[last] ^= 0x01;

    let bob_state = ratchet
        .auth_decap(bob_state, &forged, b"tag")
        .unwrap_err()
        .into_state();
    let (_, key) = ratchet
        .auth_decap(bob_state, &encapsulated, b"tag")
        .expect("Genuine message must still open after a forged one");
    assert_eq!(key, expected);
}

/// Test that k recipients share one key and the (k+1)th outsider fails
#[test]
fn test_multi_kem_recipients() {
    let multi = WrappingMultiKem::<_, Suite>::new(shared_kem()).unwrap();
    let members: Vec<_> = (0..5).map(|_| multi.key_gen().unwrap()).collect();
    let publics: Vec<_> = members.iter().map(|m| m.public_key).collect();

    let (key, envelope) = multi.encap(&publics).unwrap();
    for member in &members {
        assert_eq!(
            multi.decap(&member.private_key, &envelope).unwrap(),
            key,
            "Every recipient must recover the same data key"
        );
    }

    let outsider = multi.key_gen().unwrap();
    assert_eq!(multi.decap(&outsider.private_key, &envelope), Err(Rejected));
}

/// Test that a multi-recipient envelope declaring too many records is refused
#[test]
fn test_multi_kem_ceiling() {
    let multi = WrappingMultiKem::<_, Suite>::new(shared_kem()).unwrap();
    let member = multi.key_gen().unwrap();

    let envelope = u16::MAX.to_le_bytes();
    assert_eq!(multi.decap(&member.private_key, &envelope), Err(Rejected));
}

/// Test signed AKEM end to end with the committing DEM
#[test]
fn test_signed_akem_with_dem() {
    let akem = SignedAkem::<_, Suite>::new(shared_kem());
    let dem = dem();
    let alice = akem.key_gen().unwrap();
    let bob = akem.key_gen().unwrap();

    let (key, encapsulated) = akem.auth_encap(&alice.private_key, &bob.public_key).unwrap();
    let sealed = dem.enc(&key, b"signed hello", b"").unwrap();

    let key = akem
        .auth_decap(&bob.private_key, &alice.public_key, &encapsulated)
        .unwrap();
    assert_eq!(
        dem.dec(&key, &sealed.ciphertext, b"", &sealed.tag).unwrap(),
        b"signed hello"
    );
}

/// Test the standalone Poly1305 fixed vector (RFC 8439 §2.5.2)
#[test]
fn test_poly1305_fixed_vector() {
    let key: [u8; 32] =
        hex::decode("85d6be7857556d337f4452fe42d506a80103808afb0db2fd4abff6af4149f51b")
            .unwrap()
            .try_into()
            .unwrap();
    let tag = one_time_mac::compute(&key, b"Cryptographic Forum Research Group");
    assert_eq!(hex::encode(tag), "a8061dc1305136c6c22b8baf0c0127a9");
}

/// Test that the committing DEM round-trips an empty message and label
#[test]
fn test_dem_empty_message_and_label() {
    let dem = dem();
    let key = dem.key_gen().unwrap();
    let sealed = dem.enc(&key, b"", b"").unwrap();
    assert!(dem.dec(&key, &sealed.ciphertext, b"", &sealed.tag).unwrap().is_empty());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Flipping any bit of ciphertext, tag or label makes decryption fail
    #[test]
    fn prop_dem_tamper_sensitivity(
        message in proptest::collection::vec(any::<u8>(), 0..64),
        label in proptest::collection::vec(any::<u8>(), 0..16),
        target in 0usize..3,
        position in any::<usize>(),
        bit in 0u8..8,
    ) {
        let dem = dem();
        let key = dem.key_gen().unwrap();
        let sealed = dem.enc(&key, &message, &label).unwrap();

        let mut ciphertext = sealed.ciphertext.clone();
        let mut tag = sealed.tag.clone();
        let mut label_bytes = label.clone();

        let buffer = match target {
            0 => &mut ciphertext,
            1 => &mut tag,
            _ => &mut label_bytes,
        };
        if buffer.is_empty() {
            label_bytes.push(0);
        } else {
            let index = position % buffer.len();
            buffer[index] ^= 1 << bit;
        }

        prop_assert_eq!(dem.dec(&key, &ciphertext, &label_bytes, &tag), Err(Rejected));
    }

    /// Flipping any bit of a tag-bound encapsulation makes decapsulation fail
    #[test]
    fn prop_tag_kem_tamper_sensitivity(
        tag in proptest::collection::vec(any::<u8>(), 0..48),
        position in any::<usize>(),
        bit in 0u8..8,
    ) {
        let tag_kem = MacTagKem::<_, Suite>::new(shared_kem());
        let bob = tag_kem.key_gen().unwrap();

        let (_, pending) = tag_kem.key(&bob.public_key).unwrap();
        let mut encapsulated = tag_kem.encap(pending, &tag).unwrap();
        let index = position % encapsulated.len();
        encapsulated[index] ^= 1 << bit;

        prop_assert_eq!(tag_kem.decap(&bob.private_key, &encapsulated, &tag), Err(Rejected));
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Сообщение на проводе: KEM конверт + DEM шифртекст + тег
struct Wire {
    encapsulated: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
}

fn ratchet_identity() -> KeyPair<
    <Suite as CryptoProvider>::KemPublicKey,
    <Suite as CryptoProvider>::KemPrivateKey,
> {
    let (private_key, public_key) = Suite::generate_kem_keys().unwrap();
    KeyPair::new(public_key, private_key)
}

fn send(
    ratchet: &RatchetKem<Suite>,
    dem: &SivDem<Suite>,
    state: ConversationState<Suite>,
    message: &[u8],
) -> (ConversationState<Suite>, Wire) {
    let sealed = dem.enc(ratchet.key(&state), message, b"").unwrap();
    let (state, encapsulated) = ratchet.auth_encap(state, &sealed.tag).unwrap();
    (
        state,
        Wire {
            encapsulated,
            ciphertext: sealed.ciphertext,
            tag: sealed.tag,
        },
    )
}

fn receive(
    ratchet: &RatchetKem<Suite>,
    dem: &SivDem<Suite>,
    state: ConversationState<Suite>,
    wire: &Wire,
) -> Option<(ConversationState<Suite>, Vec<u8>)> {
    let (state, key) = ratchet
        .auth_decap(state, &wire.encapsulated, &wire.tag)
        .ok()?;
    let plaintext = dem.dec(&key, &wire.ciphertext, b"", &wire.tag).ok()?;
    Some((state, plaintext))
}
