use allocation_validate::*;
use proptest::prelude::*;

fn arb_client() -> impl Strategy<Value = Row> {
    (
        "C[0-9]{1,2}",
        prop_oneof![
            (-2i64..9).prop_map(Cell::from),
            "[a-z0-9]{0,3}".prop_map(Cell::from),
            Just(Cell::Absent),
        ],
        "(T[0-9],?){0,3}",
        prop_oneof![Just(String::new()), Just("{}".to_string()), Just("{bad".to_string())],
    )
        .prop_map(|(id, priority, requested, attributes)| {
            Row::new()
                .with("ClientID", id)
                .with("ClientName", "n")
                .with("PriorityLevel", priority)
                .with("RequestedTaskIDs", requested)
                .with("GroupTag", "g")
                .with("AttributesJSON", attributes)
        })
}

fn arb_task() -> impl Strategy<Value = Row> {
    (
        "T[0-9]",
        "[a-c](,[a-c]){0,2}",
        prop_oneof!["[1-4]-[1-6]", "\\[[0-5](,[0-5]){0,2}\\]", "[a-z]{0,2}"],
        -1i64..4,
        0i64..4,
    )
        .prop_map(|(id, skills, phases, duration, max_concurrent)| {
            Row::new()
                .with("TaskID", id)
                .with("TaskName", "n")
                .with("Category", "c")
                .with("Duration", duration)
                .with("RequiredSkills", skills)
                .with("PreferredPhases", phases)
                .with("MaxConcurrent", max_concurrent)
        })
}

fn arb_worker() -> impl Strategy<Value = Row> {
    ("W[0-9]", "[a-c](,[a-c]){0,2}", "\\[[1-5](,[1-5]){0,3}\\]", 0i64..5).prop_map(
        |(id, skills, slots, max_load)| {
            Row::new()
                .with("WorkerID", id)
                .with("WorkerName", "n")
                .with("Skills", skills)
                .with("AvailableSlots", slots)
                .with("MaxLoadPerPhase", max_load)
                .with("WorkerGroup", "g")
                .with("QualificationLevel", 1i64)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn validate_data_is_idempotent(
        clients in prop::collection::vec(arb_client(), 0..6),
        workers in prop::collection::vec(arb_worker(), 0..6),
        tasks in prop::collection::vec(arb_task(), 0..6),
    ) {
        let ctx = ValidationContext::new()
            .with_data(EntityKind::Client, clients)
            .with_data(EntityKind::Worker, workers)
            .with_data(EntityKind::Task, tasks);
        for kind in EntityKind::ALL {
            let first = validate(&ctx, Target::Data(kind));
            let second = validate(&ctx, Target::Data(kind));
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn unique_ids_never_flag_identity(ids in prop::collection::btree_set(0u32..10_000, 0..20)) {
        let rows: Vec<Row> = ids
            .iter()
            .map(|id| Row::new().with("TaskID", i64::from(*id)))
            .collect();
        let report = validate_data(&ValidationContext::new(), EntityKind::Task, &rows);
        prop_assert!(report
            .diagnostics
            .iter()
            .all(|d| d.check != Check::DuplicateId && d.check != Check::MissingId));
    }

    #[test]
    fn missing_columns_listed_exactly(mask in prop::collection::vec(any::<bool>(), 7), rows in 1usize..5) {
        let columns = schema::required_columns(EntityKind::Task);
        let row: Row = columns
            .iter()
            .zip(&mask)
            .filter(|(_, keep)| **keep)
            .map(|(c, _)| (c.to_string(), Cell::from("1")))
            .collect();
        let expected: Vec<&str> = columns
            .iter()
            .zip(&mask)
            .filter(|(_, keep)| !**keep)
            .map(|(c, _)| *c)
            .collect();

        let report = validate_data(&ValidationContext::new(), EntityKind::Task, &vec![row; rows]);
        let missing: Vec<_> = report.dataset_level().filter(|d| d.check == Check::MissingColumns).collect();
        if expected.is_empty() {
            prop_assert!(missing.is_empty());
        } else {
            prop_assert_eq!(missing.len(), 1);
            let expected_message = format!("Missing required columns: {}", expected.join(", "));
            prop_assert_eq!(&missing[0].message, &expected_message);
        }
    }

    #[test]
    fn rule_checks_are_idempotent(
        tasks in prop::collection::vec(arb_task(), 0..6),
        groups in prop::collection::vec(prop::collection::vec("T[0-9]", 0..4), 0..5),
    ) {
        let rules: Vec<Rule> = groups
            .into_iter()
            .enumerate()
            .map(|(i, tasks)| Rule::co_run(format!("r{}", i), tasks))
            .collect();
        let ctx = ValidationContext::new().with_data(EntityKind::Task, tasks);
        let first = validate_rules(&ctx, &rules);
        let second = validate_rules(&ctx, &rules);
        prop_assert!(first.dataset_level().count() == first.len());
        prop_assert_eq!(first, second);
    }
}
