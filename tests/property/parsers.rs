use allocation_validate::primitives::{parse_numeric_list, parse_phase_spec};
use proptest::prelude::*;

fn join(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn brackets_are_optional(values in prop::collection::vec(any::<i64>(), 1..12)) {
        let bare = join(&values);
        let bracketed = format!("[{}]", bare);
        prop_assert_eq!(parse_numeric_list(&bare).unwrap(), values.clone());
        prop_assert_eq!(parse_numeric_list(&bracketed).unwrap(), values);
    }

    #[test]
    fn whitespace_around_tokens_is_ignored(values in prop::collection::vec(0i64..1000, 1..8)) {
        let spaced = format!(
            " [ {} ] ",
            values.iter().map(|v| format!("  {} ", v)).collect::<Vec<_>>().join(",")
        );
        prop_assert_eq!(parse_numeric_list(&spaced).unwrap(), values);
    }

    #[test]
    fn any_alphabetic_token_fails(
        values in prop::collection::vec(0i64..100, 0..5),
        bad in "[a-z]{1,5}",
    ) {
        let mut tokens: Vec<String> = values.iter().map(i64::to_string).collect();
        tokens.push(bad);
        prop_assert!(parse_numeric_list(&tokens.join(",")).is_err());
    }

    #[test]
    fn range_expands_inclusively(start in 1i64..500, width in 0i64..50) {
        let end = start + width;
        let phases = parse_phase_spec(&format!("{}-{}", start, end)).unwrap();
        prop_assert_eq!(phases, (start..=end).collect::<Vec<_>>());
    }

    #[test]
    fn reversed_range_fails(start in 2i64..500, gap in 1i64..50) {
        let end = (start - gap).max(1);
        prop_assume!(end < start);
        let spec = format!("{}-{}", start, end);
        prop_assert!(parse_phase_spec(&spec).is_err());
    }

    #[test]
    fn list_form_matches_numeric_list(values in prop::collection::vec(1i64..100, 0..8)) {
        let spec = format!("[{}]", join(&values));
        prop_assert_eq!(parse_phase_spec(&spec).unwrap(), parse_numeric_list(&spec).unwrap());
    }

    #[test]
    fn arbitrary_input_never_panics(s in "\\PC{0,30}") {
        let _ = parse_numeric_list(&s);
        let _ = parse_phase_spec(&s);
    }
}

#[test]
fn documented_examples() {
    assert_eq!(parse_numeric_list("[1,2,3]").unwrap(), vec![1, 2, 3]);
    assert_eq!(parse_numeric_list("1,2,3").unwrap(), vec![1, 2, 3]);
    assert_eq!(parse_numeric_list("  ").unwrap(), Vec::<i64>::new());
    assert_eq!(parse_numeric_list("[]").unwrap(), Vec::<i64>::new());
    assert_eq!(parse_phase_spec("1-3").unwrap(), vec![1, 2, 3]);
    assert_eq!(parse_phase_spec(" 2 - 2 ").unwrap(), vec![2]);
    assert_eq!(parse_phase_spec("[1,-2]").unwrap(), vec![1, -2]);
    assert!(parse_phase_spec("3-1").is_err());
    assert!(parse_phase_spec("0-2").is_err());
    assert!(parse_phase_spec("-2").is_err());
    assert!(parse_phase_spec("1-2-3").is_err());
    assert!(parse_phase_spec("1-100000").is_err());
}
