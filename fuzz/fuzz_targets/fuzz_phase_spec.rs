#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);
    let _ = allocation_validate::parse_phase_spec(&s);
    let _ = allocation_validate::parse_numeric_list(&s);
});
