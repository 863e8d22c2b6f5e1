#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // five NUL-separated fields: plaintext, key1..key4
    let text = String::from_utf8_lossy(data);
    let mut fields = text.split('\0');
    let (Some(pt), Some(k1), Some(k2), Some(k3), Some(k4)) =
        (fields.next(), fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return;
    };

    let Ok(ct) = aqimc::encrypt(pt, k1, k2, k3, k4) else {
        return;
    };
    let back = aqimc::decrypt(&ct.text, k1, k2, k3, k4).unwrap();
    let expected: String = pt
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    assert_eq!(back.text, expected);
});
