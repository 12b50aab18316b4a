use qrfountain::compress::Identity;
use qrfountain::{Block, Decoder, Encoder, Error, Xoshiro256};
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256StarStar;

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 + i / 7) as u8).collect()
}

fn decode_with_loss(encoder: &Encoder, seed: u64, keep_one_in: usize) -> (Vec<u8>, usize) {
    let mut decoder = Decoder::default();
    let rng = Xoshiro256StarStar::seed_from_u64(seed);
    for (pulled, block) in encoder.blocks(rng).enumerate() {
        if pulled % keep_one_in != 0 {
            continue;
        }
        if decoder.receive_bytes(&block.to_bytes()).unwrap() {
            return (decoder.message(&Identity).unwrap().unwrap(), pulled + 1);
        }
    }
    unreachable!("block streams never end")
}

#[test]
fn test_any_slice_size() {
    let data = payload(777);
    for slice_size in [1, 3, 50, 776, 777, 778, 4096] {
        let encoder = Encoder::new(&data, slice_size).unwrap();
        assert_eq!(encoder.slice_count(), data.len().div_ceil(slice_size));
        let (decoded, _) = decode_with_loss(&encoder, slice_size as u64, 1);
        assert_eq!(decoded, data);
    }
}

#[test]
fn test_heavy_loss() {
    let data = payload(5000);
    let encoder = Encoder::new(&data, 100).unwrap();
    let (decoded, pulled) = decode_with_loss(&encoder, 7, 5);
    assert_eq!(decoded, data);
    assert!(pulled >= 5 * (encoder.slice_count() - 1));
}

#[test]
fn test_shared_encoder_across_threads() {
    let data = payload(4000);
    let encoder = Encoder::new(&data, 128).unwrap();
    let decoded: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4_u64)
            .map(|seed| {
                let encoder = &encoder;
                scope.spawn(move || decode_with_loss(encoder, seed, 2).0)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(decoded.iter().all(|d| *d == data));
}

#[test]
fn test_interleaved_streams_decode_together() {
    let data = payload(2048);
    let encoder = Encoder::new(&data, 64).unwrap();
    let mut left = encoder.blocks(Xoshiro256::from("left"));
    let mut right = encoder.blocks(Xoshiro256::from("right"));
    let mut decoder = Decoder::default();
    loop {
        let (Some(a), Some(b)) = (left.next(), right.next()) else {
            unreachable!()
        };
        decoder.receive(a).unwrap();
        if decoder.receive(b).unwrap() {
            break;
        }
    }
    assert_eq!(decoder.message(&Identity).unwrap().unwrap(), data);
}

#[test]
fn test_corrupted_wire_is_reported() {
    let encoder = Encoder::new(&payload(300), 30).unwrap();
    let mut wire = encoder.create_block(&[2, 9]).unwrap().to_bytes();
    // Point the second index past k.
    wire[8..12].copy_from_slice(&10_u32.to_be_bytes());
    assert!(matches!(
        Block::from_bytes(&wire),
        Err(Error::MalformedBlock(_))
    ));
    let mut decoder = Decoder::default();
    assert!(decoder.receive_bytes(&wire).is_err());
    assert_eq!(decoder.received_count(), 0);
}
