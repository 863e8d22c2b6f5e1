#![no_main]

use aqimc::{Aqimc, KeySchedule};
use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;

static KEYS: Lazy<Vec<KeySchedule>> = Lazy::new(|| {
    [
        ["KEYA", "KEYB", "DDCFA", "PERMUTE"],
        ["KEYA", "KEYB", "MATRIX", "PERMUTE"],
        ["KEYA", "KEYB", "JUMPSOVERLAZYDOG", "PERMUTE"],
    ]
    .iter()
    .map(|k| KeySchedule::derive(k[0], k[1], k[2], k[3]).unwrap())
    .collect()
});

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let keys = &KEYS[data[0] as usize % KEYS.len()];
    let text = String::from_utf8_lossy(&data[1..]);

    let _ = Aqimc::new().decrypt(&text, keys);
});
