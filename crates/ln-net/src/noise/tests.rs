// BOLT 8 appendix vectors

use crate::{
    HandshakePhase, HandshakeState, NoiseError, Role, Transport, ACT_ONE_SIZE, ACT_THREE_SIZE,
    ACT_TWO_SIZE, ENCRYPTED_LENGTH_SIZE, MAC_SIZE, MAX_MESSAGE_SIZE,
};

const RESPONDER_STATIC_PUB: &str =
    "028d7500dd4c12685d1f568b4c2b5048e8534b873319f3a8daa612b469132ec7f7";
const INITIATOR_STATIC_PUB: &str =
    "034f355bdcb7cc0af728ef3cceb9615d90684bb5b2ca5f859ab0f0b704075871aa";

const ACT_ONE: &str = "00036360e856310ce5d294e8be33fc807077dc56ac80d95d9cd4ddbd21325eff73f70df6086551151f58b8afe6c195782c6a";
const ACT_TWO: &str = "0002466d7fcae563e5cb09a0d1870bb580344804617879a14949cf22285f1bae3f276e2470b93aac583c9ef6eafca3f730ae";
const ACT_THREE: &str = "00b9e3a702e93e3a9948c2ed6e5fd7590a6e1c3a0344cfc9d5b57357049aa22355361aa02e55a8fc28fef5bd6d71ad0c38228dc68b1c466263b47fdf31e560e139ba";

const INITIATOR_SEND_KEY: &str = "969ab31b4d288cedf6218839b27a3e2140827047f2c0f01bf5c04435d43511a9";
const INITIATOR_RECV_KEY: &str = "bb9020b8965f4df047e07f955f3c4b88418984aadc5cdb35096b9ea8fa5c3442";
const FINAL_CK: &str = "919219dbb2920afa8db80f9a51787a840bcf111ed8d588caf9ab4be716e42b01";

fn decode(s: &str) -> Vec<u8> {
    hex::decode(s).unwrap()
}

fn decode_key(s: &str) -> Option<[u8; 32]> {
    Some(decode(s).try_into().unwrap())
}

fn initiator() -> HandshakeState {
    HandshakeState::initiator(&[0x11; 32], &decode(RESPONDER_STATIC_PUB))
        .unwrap()
        .with_ephemeral(&[0x12; 32])
        .unwrap()
}

fn responder() -> HandshakeState {
    HandshakeState::responder(&[0x21; 32])
        .unwrap()
        .with_ephemeral(&[0x22; 32])
        .unwrap()
}

/// Initiator that has already sent act one.
fn initiator_after_act_one() -> HandshakeState {
    let mut initiator = initiator();
    let mut act_one = [0u8; ACT_ONE_SIZE];
    initiator.write_message(&[], &mut act_one).unwrap();
    initiator
}

/// Responder that has already answered act one.
fn responder_after_act_two() -> HandshakeState {
    let mut responder = responder();
    responder.read_message(&decode(ACT_ONE), &mut []).unwrap();
    let mut act_two = [0u8; ACT_TWO_SIZE];
    responder.write_message(&[], &mut act_two).unwrap();
    responder
}

fn golden_transports() -> (Transport, Transport) {
    let mut initiator = initiator();
    let mut responder = responder();
    let mut act_one = [0u8; ACT_ONE_SIZE];
    let mut act_two = [0u8; ACT_TWO_SIZE];
    let mut act_three = [0u8; ACT_THREE_SIZE];

    initiator.write_message(&[], &mut act_one).unwrap();
    responder.read_message(&act_one, &mut []).unwrap();
    responder.write_message(&[], &mut act_two).unwrap();
    initiator.read_message(&act_two, &mut []).unwrap();
    let sent = initiator.write_message(&[], &mut act_three).unwrap();
    let received = responder.read_message(&act_three, &mut []).unwrap();
    (sent.transport.unwrap(), received.transport.unwrap())
}

fn assert_poisoned(state: &mut HandshakeState) {
    assert_eq!(state.phase(), HandshakePhase::Failed);
    assert_eq!(state.handshake_hash(), None);
    let mut buffer = [0u8; ACT_THREE_SIZE];
    assert_eq!(state.write_message(&[], &mut buffer).unwrap_err(), NoiseError::HandshakeFailed);
    assert_eq!(state.read_message(&buffer, &mut []).unwrap_err(), NoiseError::HandshakeFailed);
}

#[test]
fn initiator_successful_handshake() {
    let mut initiator = initiator();
    assert_eq!(initiator.next_message_len(0), Some(ACT_ONE_SIZE));
    assert_eq!(
        initiator.remote_static().map(|key| key.to_string()).as_deref(),
        Some(RESPONDER_STATIC_PUB)
    );

    let mut act_one = [0u8; ACT_ONE_SIZE];
    let result = initiator.write_message(&[], &mut act_one).unwrap();
    assert_eq!(result.size, ACT_ONE_SIZE);
    assert!(result.transport.is_none());
    assert_eq!(act_one.to_vec(), decode(ACT_ONE));
    assert_eq!(initiator.phase(), HandshakePhase::AwaitingAct2);

    let result = initiator.read_message(&decode(ACT_TWO), &mut []).unwrap();
    assert_eq!(result.size, ACT_TWO_SIZE);
    assert!(result.handshake_hash.is_none());
    assert_eq!(initiator.next_message_len(0), Some(ACT_THREE_SIZE));

    let mut act_three = [0u8; ACT_THREE_SIZE];
    let result = initiator.write_message(&[], &mut act_three).unwrap();
    assert_eq!(act_three.to_vec(), decode(ACT_THREE));
    assert!(initiator.is_complete());
    assert_eq!(initiator.next_message_len(0), None);

    let transport = result.transport.unwrap();
    assert_eq!(result.handshake_hash.as_ref(), Some(transport.handshake_hash()));
    assert_eq!(transport.remote_static().to_string(), RESPONDER_STATIC_PUB);
    let (sending, receiving) = transport.ciphers();
    assert_eq!(sending.key_bytes(), decode_key(INITIATOR_SEND_KEY));
    assert_eq!(receiving.key_bytes(), decode_key(INITIATOR_RECV_KEY));
    assert_eq!(sending.chaining_key_bytes(), decode_key(FINAL_CK));
    assert_eq!(receiving.chaining_key_bytes(), decode_key(FINAL_CK));
}

#[test]
fn responder_successful_handshake() {
    let mut responder = responder();
    assert_eq!(responder.role(), Role::Responder);
    assert!(!responder.is_my_turn());
    assert!(responder.remote_static().is_none());

    let result = responder.read_message(&decode(ACT_ONE), &mut []).unwrap();
    assert_eq!(result.size, ACT_ONE_SIZE);
    assert!(responder.is_my_turn());

    let mut act_two = [0u8; ACT_TWO_SIZE];
    responder.write_message(&[], &mut act_two).unwrap();
    assert_eq!(act_two.to_vec(), decode(ACT_TWO));

    let result = responder.read_message(&decode(ACT_THREE), &mut []).unwrap();
    assert_eq!(result.size, ACT_THREE_SIZE);
    let transport = result.transport.unwrap();
    assert_eq!(transport.remote_static().to_string(), INITIATOR_STATIC_PUB);
    let (sending, receiving) = transport.ciphers();
    assert_eq!(sending.key_bytes(), decode_key(INITIATOR_RECV_KEY));
    assert_eq!(receiving.key_bytes(), decode_key(INITIATOR_SEND_KEY));
}

#[test]
fn both_sides_agree_on_handshake_hash() {
    let (initiator, responder) = golden_transports();
    assert_eq!(initiator.handshake_hash(), responder.handshake_hash());
}

#[test]
fn initiator_act_two_failures() {
    let cases = [
        (
            "0102466d7fcae563e5cb09a0d1870bb580344804617879a14949cf22285f1bae3f276e2470b93aac583c9ef6eafca3f730ae",
            NoiseError::InvalidVersion(1),
        ),
        (
            "0004466d7fcae563e5cb09a0d1870bb580344804617879a14949cf22285f1bae3f276e2470b93aac583c9ef6eafca3f730ae",
            NoiseError::InvalidPublicKey,
        ),
        (
            "0002466d7fcae563e5cb09a0d1870bb580344804617879a14949cf22285f1bae3f276e2470b93aac583c9ef6eafca3f730af",
            NoiseError::DecryptionFailed,
        ),
    ];
    for (act_two, error) in cases {
        let mut initiator = initiator_after_act_one();
        assert_eq!(initiator.read_message(&decode(act_two), &mut []).unwrap_err(), error);
        assert_poisoned(&mut initiator);
    }
}

#[test]
fn responder_act_one_failures() {
    let cases = [
        (
            "01036360e856310ce5d294e8be33fc807077dc56ac80d95d9cd4ddbd21325eff73f70df6086551151f58b8afe6c195782c6a",
            NoiseError::InvalidVersion(1),
        ),
        (
            "00046360e856310ce5d294e8be33fc807077dc56ac80d95d9cd4ddbd21325eff73f70df6086551151f58b8afe6c195782c6a",
            NoiseError::InvalidPublicKey,
        ),
        (
            "00036360e856310ce5d294e8be33fc807077dc56ac80d95d9cd4ddbd21325eff73f70df6086551151f58b8afe6c195782c6b",
            NoiseError::DecryptionFailed,
        ),
    ];
    for (act_one, error) in cases {
        let mut responder = responder();
        assert_eq!(responder.read_message(&decode(act_one), &mut []).unwrap_err(), error);
        assert_poisoned(&mut responder);
    }
}

#[test]
fn responder_act_three_failures() {
    let cases = [
        (
            "01b9e3a702e93e3a9948c2ed6e5fd7590a6e1c3a0344cfc9d5b57357049aa22355361aa02e55a8fc28fef5bd6d71ad0c38228dc68b1c466263b47fdf31e560e139ba",
            NoiseError::InvalidVersion(1),
        ),
        (
            "00c9e3a702e93e3a9948c2ed6e5fd7590a6e1c3a0344cfc9d5b57357049aa22355361aa02e55a8fc28fef5bd6d71ad0c38228dc68b1c466263b47fdf31e560e139ba",
            NoiseError::DecryptionFailed,
        ),
        (
            "00bfe3a702e93e3a9948c2ed6e5fd7590a6e1c3a0344cfc9d5b57357049aa2235536ad09a8ee351870c2bb7f78b754a26c6cef79a98d25139c856d7efd252c2ae73c",
            NoiseError::InvalidPublicKey,
        ),
        (
            "00b9e3a702e93e3a9948c2ed6e5fd7590a6e1c3a0344cfc9d5b57357049aa22355361aa02e55a8fc28fef5bd6d71ad0c38228dc68b1c466263b47fdf31e560e139bb",
            NoiseError::DecryptionFailed,
        ),
    ];
    for (act_three, error) in cases {
        let mut responder = responder_after_act_two();
        assert_eq!(responder.read_message(&decode(act_three), &mut []).unwrap_err(), error);
        assert_poisoned(&mut responder);
    }
}

#[test]
fn message_encryption_with_rekeying() {
    let (mut initiator, mut responder) = golden_transports();
    let expected = [
        (0, "cf2b30ddf0cf3f80e7c35a6e6730b59fe802473180f396d88a8fb0db8cbcf25d2f214cf9ea1d95"),
        (1, "72887022101f0b6753e0c7de21657d35a4cb2a1f5cde2650528bbc8f837d0f0d7ad833b1a256a1"),
        (500, "178cb9d7387190fa34db9c2d50027d21793c9bc2d40b1e14dcf30ebeeeb220f48364f7a4c68bf8"),
        (501, "1b186c57d44eb6de4c057c49940d79bb838a145cb528d6e8fd26dbe50a60ca2c104b56b60e45bd"),
        (1000, "4a2f3cc3b5e78ddb83dcb426d9863d9d9a723b0337c89dd0b005d89f8d3c05c52b76b29b740f09"),
        (1001, "2ecd8c8a5629d0d02ab457a0fdd0f7b90a192cd46be5ecb6ca570bfc5e268338b1a16cf4ef2d36"),
    ];

    let mut checked = 0;
    for i in 0..=1001 {
        let frame = initiator.write_message(b"hello").unwrap();
        assert_eq!(frame.len(), ENCRYPTED_LENGTH_SIZE + 5 + MAC_SIZE);
        if let Some((_, output)) = expected.iter().find(|(index, _)| *index == i) {
            assert_eq!(hex::encode(&frame), *output, "output {i}");
            checked += 1;
        }
        assert_eq!(responder.read_message(&frame).unwrap(), b"hello");
        assert_eq!(initiator.sending_nonce(), responder.receiving_nonce());
    }
    assert_eq!(checked, expected.len());
}

#[test]
fn random_ephemerals_round_trip() {
    let responder_pub = decode(RESPONDER_STATIC_PUB);
    let mut initiator = HandshakeState::initiator(&[0x11; 32], &responder_pub).unwrap();
    let mut responder = HandshakeState::responder(&[0x21; 32]).unwrap();
    let mut act_one = [0u8; ACT_ONE_SIZE];
    let mut act_two = [0u8; ACT_TWO_SIZE];
    let mut act_three = [0u8; ACT_THREE_SIZE];

    initiator.write_message(&[], &mut act_one).unwrap();
    assert_ne!(act_one.to_vec(), decode(ACT_ONE));
    responder.read_message(&act_one, &mut []).unwrap();
    assert_eq!(initiator.handshake_hash(), responder.handshake_hash());
    responder.write_message(&[], &mut act_two).unwrap();
    initiator.read_message(&act_two, &mut []).unwrap();
    let mut initiator = initiator.write_message(&[], &mut act_three).unwrap().transport.unwrap();
    let mut responder = responder.read_message(&act_three, &mut []).unwrap().transport.unwrap();

    assert_eq!(initiator.handshake_hash(), responder.handshake_hash());
    let frame = responder.write_message(b"hello from responder").unwrap();
    assert_eq!(initiator.read_message(&frame).unwrap(), b"hello from responder");
    let frame = initiator.write_message(b"hello from initiator").unwrap();
    assert_eq!(responder.read_message(&frame).unwrap(), b"hello from initiator");
}

#[test]
fn handshake_payloads_are_carried() {
    let mut initiator = initiator();
    let mut responder = responder();
    assert_eq!(initiator.next_message_len(3), Some(ACT_ONE_SIZE + 3));

    let mut act_one = [0u8; ACT_ONE_SIZE + 3];
    initiator.write_message(b"abc", &mut act_one).unwrap();
    let mut payload = [0u8; 3];
    responder.read_message(&act_one, &mut payload).unwrap();
    assert_eq!(&payload, b"abc");
}

#[test]
fn turn_discipline() {
    let mut initiator = initiator();
    assert_eq!(
        initiator.read_message(&decode(ACT_TWO), &mut []).unwrap_err(),
        NoiseError::OutOfTurn
    );
    assert_poisoned(&mut initiator);

    let mut responder = responder();
    let mut buffer = [0u8; ACT_TWO_SIZE];
    assert_eq!(responder.write_message(&[], &mut buffer).unwrap_err(), NoiseError::OutOfTurn);

    let mut initiator = initiator_after_act_one();
    assert!(!initiator.is_my_turn());
    let mut buffer = [0u8; ACT_THREE_SIZE];
    assert_eq!(initiator.write_message(&[], &mut buffer).unwrap_err(), NoiseError::OutOfTurn);
}

#[test]
fn completed_handshake_rejects_further_acts() {
    let mut initiator = initiator_after_act_one();
    initiator.read_message(&decode(ACT_TWO), &mut []).unwrap();
    let mut act_three = [0u8; ACT_THREE_SIZE];
    initiator.write_message(&[], &mut act_three).unwrap();

    assert_eq!(
        initiator.write_message(&[], &mut act_three).unwrap_err(),
        NoiseError::HandshakeAlreadyComplete
    );
    assert_eq!(
        initiator.read_message(&act_three, &mut []).unwrap_err(),
        NoiseError::HandshakeAlreadyComplete
    );
    assert_eq!(initiator.phase(), HandshakePhase::Complete);
}

#[test]
fn size_errors() {
    let mut initiator = initiator();
    let mut short = [0u8; ACT_ONE_SIZE - 1];
    assert_eq!(
        initiator.write_message(&[], &mut short).unwrap_err(),
        NoiseError::MessageTooLarge { size: ACT_ONE_SIZE, max: ACT_ONE_SIZE - 1 }
    );
    assert_poisoned(&mut initiator);

    let mut initiator = self::initiator();
    let payload = vec![0u8; MAX_MESSAGE_SIZE];
    let mut buffer = vec![0u8; MAX_MESSAGE_SIZE + ACT_ONE_SIZE];
    assert_eq!(
        initiator.write_message(&payload, &mut buffer).unwrap_err(),
        NoiseError::MessageTooLarge { size: MAX_MESSAGE_SIZE + ACT_ONE_SIZE, max: MAX_MESSAGE_SIZE }
    );

    let mut responder = responder();
    let act_one = decode(ACT_ONE);
    assert_eq!(
        responder.read_message(&act_one[..ACT_ONE_SIZE - 1], &mut []).unwrap_err(),
        NoiseError::InvalidMessageLength { expected: ACT_ONE_SIZE, actual: ACT_ONE_SIZE - 1 }
    );

    let mut responder = self::responder();
    let mut oversized_payload = [0u8; 1];
    assert_eq!(
        responder.read_message(&act_one, &mut oversized_payload).unwrap_err(),
        NoiseError::InvalidMessageLength { expected: ACT_ONE_SIZE + 1, actual: ACT_ONE_SIZE }
    );
}

#[test]
fn invalid_key_material() {
    let responder_pub = decode(RESPONDER_STATIC_PUB);
    let cases = [
        HandshakeState::initiator(&[0x11; 32], &[]),
        HandshakeState::initiator(&[0x11; 31], &responder_pub),
        HandshakeState::initiator(&[0x00; 32], &responder_pub),
        HandshakeState::initiator(&[0xff; 32], &responder_pub),
        HandshakeState::initiator(&[0x11; 32], &responder_pub[1..]),
        HandshakeState::new(Role::Responder, &[0x21; 32], &[0x04; 33]),
    ];
    for case in cases {
        assert_eq!(case.unwrap_err(), NoiseError::InvalidKeyMaterial);
    }

    let initiator = HandshakeState::initiator(&[0x11; 32], &responder_pub).unwrap();
    assert_eq!(
        initiator.with_ephemeral(&[0u8; 32]).unwrap_err(),
        NoiseError::InvalidKeyMaterial
    );
}

#[test]
fn responder_pins_remote_static() {
    let mut pinned =
        HandshakeState::new(Role::Responder, &[0x21; 32], &decode(INITIATOR_STATIC_PUB))
            .unwrap()
            .with_ephemeral(&[0x22; 32])
            .unwrap();
    pinned.read_message(&decode(ACT_ONE), &mut []).unwrap();
    let mut act_two = [0u8; ACT_TWO_SIZE];
    pinned.write_message(&[], &mut act_two).unwrap();
    let transport = pinned.read_message(&decode(ACT_THREE), &mut []).unwrap().transport.unwrap();
    assert_eq!(transport.remote_static().to_string(), INITIATOR_STATIC_PUB);

    // Some other valid node id.
    let other = decode(RESPONDER_STATIC_PUB);
    let mut pinned = HandshakeState::new(Role::Responder, &[0x21; 32], &other)
        .unwrap()
        .with_ephemeral(&[0x22; 32])
        .unwrap();
    pinned.read_message(&decode(ACT_ONE), &mut []).unwrap();
    pinned.write_message(&[], &mut act_two).unwrap();
    assert_eq!(
        pinned.read_message(&decode(ACT_THREE), &mut []).unwrap_err(),
        NoiseError::RemoteStaticMismatch
    );
    assert_poisoned(&mut pinned);
}

#[test]
fn transport_frame_order() {
    let (mut initiator, mut responder) = golden_transports();
    let frame = initiator.write_message(b"ordered").unwrap();
    let (header, body) = frame.split_at(ENCRYPTED_LENGTH_SIZE);

    assert_eq!(responder.read_message_payload(body).unwrap_err(), NoiseError::FrameOutOfOrder);
    assert_eq!(responder.read_message_length(header).unwrap(), 7);
    assert_eq!(responder.read_message_length(header).unwrap_err(), NoiseError::FrameOutOfOrder);
    assert_eq!(
        responder.read_message_payload(&body[1..]).unwrap_err(),
        NoiseError::InvalidMessageLength { expected: 7 + MAC_SIZE, actual: 6 + MAC_SIZE }
    );
    assert_eq!(responder.read_message_payload(body).unwrap(), b"ordered");
    assert_eq!(responder.receiving_nonce(), 2);
}

#[test]
fn transport_rejects_tampering() {
    let (mut initiator, mut responder) = golden_transports();
    let mut frame = initiator.write_message(b"tamper").unwrap();
    let last = frame.len() - 1;
    frame[last] ^= 0x01;
    assert_eq!(responder.read_message(&frame).unwrap_err(), NoiseError::DecryptionFailed);

    let (mut initiator, mut responder) = golden_transports();
    let mut frame = initiator.write_message(b"tamper").unwrap();
    frame[0] ^= 0x01;
    assert_eq!(
        responder.read_message_length(&frame[..ENCRYPTED_LENGTH_SIZE]).unwrap_err(),
        NoiseError::DecryptionFailed
    );
    assert_eq!(responder.receiving_nonce(), 0);
}

#[test]
fn transport_stops_reading_after_failed_authentication() {
    let (mut initiator, mut responder) = golden_transports();
    let frame = initiator.write_message(b"genuine").unwrap();
    let (header, body) = frame.split_at(ENCRYPTED_LENGTH_SIZE);
    let mut forged = body.to_vec();
    forged[0] ^= 0x80;

    assert_eq!(responder.read_message_length(header).unwrap(), 7);
    assert_eq!(
        responder.read_message_payload(&forged).unwrap_err(),
        NoiseError::DecryptionFailed
    );
    assert_eq!(responder.receiving_nonce(), 1);

    // The genuine body under the same nonce is refused too.
    assert_eq!(
        responder.read_message_payload(body).unwrap_err(),
        NoiseError::DecryptionFailed
    );
    assert_eq!(responder.read_message_length(header).unwrap_err(), NoiseError::DecryptionFailed);
    assert_eq!(responder.read_message(&frame).unwrap_err(), NoiseError::DecryptionFailed);
    assert_eq!(responder.receiving_nonce(), 1);

    // Sending is unaffected.
    let reply = responder.write_message(b"bye").unwrap();
    assert_eq!(initiator.read_message(&reply).unwrap(), b"bye");
}

#[test]
fn transport_payload_limits() {
    let (mut initiator, mut responder) = golden_transports();
    assert_eq!(
        initiator.write_message(&vec![0u8; MAX_MESSAGE_SIZE + 1]).unwrap_err(),
        NoiseError::PayloadTooLarge(MAX_MESSAGE_SIZE + 1)
    );
    assert_eq!(initiator.sending_nonce(), 0);

    let largest = vec![0x5au8; MAX_MESSAGE_SIZE];
    let frame = initiator.write_message(&largest).unwrap();
    assert_eq!(frame.len(), ENCRYPTED_LENGTH_SIZE + MAX_MESSAGE_SIZE + MAC_SIZE);
    assert_eq!(responder.read_message(&frame).unwrap(), largest);

    let frame = initiator.write_message(&[]).unwrap();
    assert_eq!(frame.len(), ENCRYPTED_LENGTH_SIZE + MAC_SIZE);
    assert!(responder.read_message(&frame).unwrap().is_empty());
    assert_eq!(
        responder.read_message(&frame[..ENCRYPTED_LENGTH_SIZE - 1]).unwrap_err(),
        NoiseError::InvalidMessageLength {
            expected: ENCRYPTED_LENGTH_SIZE,
            actual: ENCRYPTED_LENGTH_SIZE - 1,
        }
    );
}
