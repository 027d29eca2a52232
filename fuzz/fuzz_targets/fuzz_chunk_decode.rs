#![no_main]

use libfuzzer_sys::fuzz_target;
use unidex::data::Chunk;

fuzz_target!(|data: &[u8]| {
    // Decoding must reject bad chunks without panicking, and accepted
    // chunks must encode back to something that decodes the same
    if let Ok(chunk) = Chunk::from_json(0x41, data) {
        let bytes = chunk.to_json().unwrap();
        assert_eq!(Chunk::from_json(0x41, &bytes).unwrap(), chunk);
    }
});
