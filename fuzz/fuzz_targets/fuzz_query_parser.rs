#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Any input either parses or returns an error; neither may panic
    if let Ok(query) = yacs::parse_query(data) {
        let _ = query.to_args();
        let _ = query.to_string();
    }
});
