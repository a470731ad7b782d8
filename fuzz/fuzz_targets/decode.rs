#![no_main]

use jitdebug::jit::MethodRecord;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = MethodRecord::parse(data) {
        let _ = record.decode();
    }
});
