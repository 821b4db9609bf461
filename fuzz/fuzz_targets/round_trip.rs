#![no_main]

use libfuzzer_sys::fuzz_target;
use stack_config_edit::{ConfigDocument, ConfigValue};

fuzz_target!(|data: &[u8]| {
    // Skip extremely large inputs to avoid timeout
    if data.len() > 1_000_000 {
        return;
    }

    let Ok(mut doc) = ConfigDocument::parse(Some(data)) else {
        return;
    };
    assert_eq!(doc.serialize(), data, "unedited document must round-trip");

    let Ok(keys) = doc.keys("") else {
        return;
    };
    if let Some(first) = keys.first() {
        doc.set("", first, &ConfigValue::secure("AAAB=="), 1).ok();
        assert_eq!(
            doc.get("", first).ok().flatten(),
            Some(ConfigValue::secure("AAAB=="))
        );
        doc.delete("", first).ok();
    }
});
