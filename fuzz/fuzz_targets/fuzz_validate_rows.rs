#![no_main]

use allocation_validate::{EntityKind, Target, ValidationContext, parse_rows, validate};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    clients: String,
    workers: String,
    tasks: String,
}

fuzz_target!(|input: Input| {
    let ctx = ValidationContext::new()
        .with_data(EntityKind::Client, parse_rows(&input.clients).unwrap_or_default())
        .with_data(EntityKind::Worker, parse_rows(&input.workers).unwrap_or_default())
        .with_data(EntityKind::Task, parse_rows(&input.tasks).unwrap_or_default());

    for kind in EntityKind::ALL {
        let first = validate(&ctx, Target::Data(kind));
        let second = validate(&ctx, Target::Data(kind));
        assert_eq!(first, second);
    }
});
