#![no_main]

use allocation_validate::{EntityKind, Rule, ValidationContext, parse_rows, validate_rules};
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    groups: Vec<Vec<u16>>,
    chain: u16,
    tasks: String,
}

fuzz_target!(|input: Input| {
    let mut rules: Vec<Rule> = input
        .groups
        .iter()
        .map(|group| Rule::co_run("fuzz", group.iter().map(|t| format!("T{}", t))))
        .collect();
    rules.extend(
        (0..input.chain).map(|i| Rule::co_run("chain", [format!("C{}", i), format!("C{}", i + 1)])),
    );
    let tasks = parse_rows(&input.tasks).unwrap_or_default();
    let ctx = ValidationContext::new().with_data(EntityKind::Task, tasks);
    let _ = validate_rules(&ctx, &rules);
});
