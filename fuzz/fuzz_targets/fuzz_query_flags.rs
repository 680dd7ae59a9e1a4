#![no_main]
use action_trace::TraceFlags;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(query) = std::str::from_utf8(data) {
        let flags = TraceFlags::from_query(query);
        if !query.contains("showDebugTrace") {
            assert!(!flags.enabled);
        }
    }
});
