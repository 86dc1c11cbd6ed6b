//! Property tests for the frame codec and the resynchronizing decoder

use hexapod_protocol::frame::{encode, try_decode, RxBuffer, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
use hexapod_protocol::Packet;
use proptest::prelude::*;

fn buffer_from(bytes: &[u8]) -> RxBuffer {
    RxBuffer::from_slice(bytes).unwrap()
}

/// Idle line after the interesting bytes. A corrupted or garbage LEN may
/// claim up to `MAX_FRAME_SIZE` bytes; the decoder only rejects it once that
/// many bytes have arrived.
const IDLE: [u8; MAX_FRAME_SIZE] = [0u8; MAX_FRAME_SIZE];

fn payload() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=MAX_PAYLOAD_SIZE)
}

proptest! {
    #[test]
    fn roundtrip_consumes_exactly_one_frame(seq in any::<u16>(), cmd in any::<u8>(), payload in payload()) {
        let frame = encode(seq, cmd, &payload).unwrap();
        let mut buffer = buffer_from(&frame);

        let packet = try_decode(&mut buffer).unwrap();
        prop_assert_eq!(packet.seq, seq);
        prop_assert_eq!(packet.cmd, cmd);
        prop_assert_eq!(&packet.payload[..], &payload[..]);
        prop_assert!(buffer.is_empty());
    }

    #[test]
    fn single_bit_flip_is_rejected(
        seq in any::<u16>(),
        cmd in any::<u8>(),
        payload in prop::collection::vec(any::<u8>(), 0..64),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let original = encode(seq, cmd, &payload).unwrap();
        let follower = encode(seq.wrapping_add(1), cmd, &[0x55]).unwrap();

        // Flip a bit anywhere in LEN..=CRC_HI
        let index = 1 + position.index(original.len() - 2);
        let mut corrupted = original.clone();
        corrupted[index] ^= 1 << bit;

        let mut stream = Vec::new();
        stream.extend_from_slice(&corrupted);
        stream.extend_from_slice(&follower);
        stream.extend_from_slice(&IDLE);

        // Feed byte by byte, as a transport would
        let mut buffer = RxBuffer::new();
        let mut decoded = Vec::new();
        for &byte in &stream {
            buffer.push(byte).unwrap();
            while let Some(packet) = try_decode(&mut buffer) {
                decoded.push(packet);
            }
        }

        let expected = Packet::new(seq.wrapping_add(1), cmd, &[0x55]).unwrap();
        prop_assert!(!decoded.iter().any(|p| p.seq == seq && p.cmd == cmd && p.payload[..] == payload[..]));
        prop_assert_eq!(decoded.last(), Some(&expected));
    }

    #[test]
    fn resync_after_arbitrary_garbage(
        garbage in prop::collection::vec(prop_oneof![Just(0x7Eu8), Just(0x7Fu8), any::<u8>()], 0..64),
        seq in any::<u16>(),
        cmd in any::<u8>(),
        payload in prop::collection::vec(any::<u8>(), 0..32),
    ) {
        let frame = encode(seq, cmd, &payload).unwrap();
        let expected = Packet::new(seq, cmd, &payload).unwrap();

        let mut buffer = RxBuffer::new();
        let mut decoded = Vec::new();
        for &byte in garbage.iter().chain(frame.iter()).chain(IDLE.iter()) {
            buffer.push(byte).unwrap();
            while let Some(packet) = try_decode(&mut buffer) {
                decoded.push(packet);
            }
        }

        prop_assert_eq!(decoded.last(), Some(&expected));
    }

    #[test]
    fn partial_frame_is_never_consumed(seq in any::<u16>(), cmd in any::<u8>(), payload in payload()) {
        let frame = encode(seq, cmd, &payload).unwrap();
        let mut buffer = RxBuffer::new();

        for (i, &byte) in frame.iter().enumerate() {
            buffer.push(byte).unwrap();
            let result = try_decode(&mut buffer);
            if i + 1 < frame.len() {
                prop_assert!(result.is_none());
                prop_assert_eq!(&buffer[..], &frame[..=i]);
            } else {
                prop_assert_eq!(result.map(|p| p.seq), Some(seq));
            }
        }
        prop_assert!(buffer.is_empty());
    }
}

#[test]
fn back_to_back_frames_decode_in_order() {
    let mut buffer = RxBuffer::new();
    for seq in 0..4u16 {
        buffer
            .extend_from_slice(&encode(seq, 0x05, &[seq as u8]).unwrap())
            .unwrap();
    }

    for seq in 0..4u16 {
        let packet = try_decode(&mut buffer).unwrap();
        assert_eq!(packet.seq, seq);
        assert_eq!(&packet.payload[..], &[seq as u8]);
    }
    assert!(try_decode(&mut buffer).is_none());
}
