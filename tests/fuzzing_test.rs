//! Seeded fuzzing of parsing and editing.
//!
//! Inputs are generated from a fixed seed so failures are reproducible.

use std::panic;
use stack_config_edit::{ConfigDocument, ConfigValue, Parse};

/// Simple pseudo-random number generator for reproducible tests
struct SimpleRng {
    state: usize,
}

impl SimpleRng {
    fn new(seed: usize) -> Self {
        SimpleRng { state: seed }
    }

    fn next(&mut self) -> usize {
        self.state = self.state.wrapping_mul(1103515245).wrapping_add(12345);
        (self.state / 65536) % 32768
    }
}

/// Config-like text, valid or not.
fn generate_random_config(seed: usize, lines: usize) -> String {
    let mut rng = SimpleRng::new(seed);
    let mut yaml = String::new();

    for _ in 0..lines {
        yaml.push_str(&"  ".repeat(rng.next() % 4));
        match rng.next() % 12 {
            0 => yaml.push_str(&format!("key{}: value{}", rng.next() % 10, rng.next() % 100)),
            1 => yaml.push_str(&format!("key{}:", rng.next() % 10)),
            2 => yaml.push_str(&format!("secure: AAAB{}==", rng.next() % 1000)),
            3 => yaml.push_str(&format!("- item{}", rng.next() % 10)),
            4 => yaml.push_str("# comment"),
            5 => yaml.push_str("{a: 1, b: {secure: X}}"),
            6 => yaml.push_str("[1, 2"),
            7 => yaml.push_str("'quoted: value'"),
            8 => yaml.push_str("\"escaped \\\" value"),
            9 => yaml.push_str("cert: |"),
            10 => yaml.push_str("---"),
            _ => yaml.push_str("\t: ?"),
        }
        yaml.push_str(if rng.next() % 4 == 0 { "\r\n" } else { "\n" });
    }

    yaml
}

#[test]
fn test_fuzz_parse_is_lossless() {
    for seed in 0..200 {
        for lines in [5, 20, 60] {
            let yaml = generate_random_config(seed, lines);

            let result = panic::catch_unwind(|| Parse::parse_yaml(&yaml).tree().to_string());

            match result {
                Ok(text) => assert_eq!(text, yaml, "seed {}, {} lines", seed, lines),
                Err(_) => panic!("Parser panicked on seed {}, {} lines", seed, lines),
            }
        }
    }
}

#[test]
fn test_fuzz_edits_never_panic() {
    let values = [
        ConfigValue::plain("v"),
        ConfigValue::secure("AAAB=="),
        ConfigValue::plain("multi\nline\n"),
        ConfigValue::secure("needs: quotes"),
    ];
    for seed in 0..200 {
        let yaml = generate_random_config(seed, 15);
        let Ok(mut doc) = yaml.parse::<ConfigDocument>() else {
            continue;
        };
        let mut rng = SimpleRng::new(seed + 1000);
        for _ in 0..10 {
            let path = ["", "key0", "key1.key2"][rng.next() % 3];
            let key = format!("key{}", rng.next() % 10);
            if rng.next() % 3 == 0 {
                let _ = doc.delete(path, &key);
            } else {
                let value = &values[rng.next() % values.len()];
                let column = doc.entry_column(path).ok().flatten().unwrap_or(1);
                if doc.set(path, &key, value, column).is_ok() {
                    assert_eq!(doc.get(path, &key).unwrap(), Some(value.clone()));
                }
            }
            let _ = doc.serialize();
        }
    }
}

#[test]
fn test_fuzz_random_bytes() {
    let mut rng = SimpleRng::new(7);
    for _ in 0..200 {
        let bytes: Vec<u8> = (0..rng.next() % 200).map(|_| (rng.next() % 256) as u8).collect();
        let result = panic::catch_unwind(|| {
            if let Ok(doc) = ConfigDocument::parse(Some(bytes.as_slice())) {
                assert_eq!(doc.serialize(), bytes);
            }
        });
        assert!(result.is_ok(), "panicked on {:?}", bytes);
    }
}
