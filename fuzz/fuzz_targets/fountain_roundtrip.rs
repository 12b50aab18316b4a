use honggfuzz::fuzz;

use qrfountain::compress::Identity;
use qrfountain::{Decoder, Encoder, Xoshiro256};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Some(&first) = data.first() else {
                return;
            };
            let slice_size = 1 + usize::from(first);
            let encoder = Encoder::new(data, slice_size).unwrap();
            let mut decoder = Decoder::default();
            for block in encoder.blocks(Xoshiro256::from(data)) {
                if decoder.receive_bytes(&block.to_bytes()).unwrap() {
                    break;
                }
            }
            assert_eq!(decoder.message(&Identity).unwrap().unwrap(), data);
        });
    }
}
