#![no_main]

use libfuzzer_sys::fuzz_target;

use rigstream_state::ExpressionSet;
use rigstream_wire::{decode_control_values, decode_tracker_frame, deserialize, serialize};

fuzz_target!(|data: &[u8]| {
    let _ = decode_tracker_frame(data);

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = decode_control_values(text);

    // Anything that decodes must survive a second trip unchanged
    if let Ok(set) = deserialize::<ExpressionSet>(text) {
        let again = deserialize::<ExpressionSet>(&serialize(&set)).expect("re-decode");
        assert_eq!(serialize(&again), serialize(&set));
    }
});
