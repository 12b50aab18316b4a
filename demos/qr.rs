use base64::Engine;
use qrcode::QrCode;
use qrfountain::{Config, Encoder, Xoshiro256};

use std::io::Write;

fn main() {
    let message = std::env::args().next_back().unwrap();
    let config = Config::default().with_slice_size(32);
    let encoder = Encoder::from_config(message.as_bytes(), &config).unwrap();
    let mut stdout = std::io::stdout();
    for block in encoder.blocks(Xoshiro256::from(message.as_str())) {
        let text = base64::prelude::BASE64_STANDARD.encode(block.to_bytes());
        let code = QrCode::new(&text).unwrap();
        let string = code
            .render::<char>()
            .quiet_zone(false)
            .module_dimensions(2, 1)
            .build();
        stdout.write_all(format!("{string}\n").as_bytes()).unwrap();
        stdout
            .write_all(format!("{text}\n\n\n\n").as_bytes())
            .unwrap();
        stdout.flush().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1000));
    }
}
