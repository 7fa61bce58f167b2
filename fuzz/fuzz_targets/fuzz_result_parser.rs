#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(groups) = yacs::parse_results(data) {
        for group in &groups {
            let _ = group.to_string();
        }
    }
});
