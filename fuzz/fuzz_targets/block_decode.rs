use honggfuzz::fuzz;

use qrfountain::{Block, Decoder};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            if let Ok(block) = Block::from_bytes(data) {
                let wire = block.to_bytes();
                assert_eq!(Block::from_bytes(&wire).unwrap(), block);
            }
            Decoder::default().receive_bytes(data).ok();
        });
    }
}
