#![no_main]

use libfuzzer_sys::fuzz_target;

use rigstream_state::ExpressionStore;

fuzz_target!(|text: &str| {
    let mut store = ExpressionStore::from_template().expect("template");
    let before = store.clone();

    match store.load(text) {
        Ok(()) => {
            // Every expression carries one value per control
            let controls = store.controls().len();
            assert!(store.expressions().iter().all(|e| e.values.len() == controls));
        }
        Err(_) => assert_eq!(store, before),
    }
});
