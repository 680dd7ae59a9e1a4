#![no_main]
use action_trace::hooks::{dump_args, HookValue};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) {
        let args = vec![HookValue::from(json)];
        let out = dump_args(&args);
        assert!(out.starts_with("Array\n(\n"));
        assert!(out.ends_with(")\n"));
    }
});
