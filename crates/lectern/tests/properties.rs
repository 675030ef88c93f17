//! Property tests over arbitrary command lines.

use lectern::dispatcher::normalize;
use lectern::{CommandDefinition, CommandFramework};
use lectern_testkit::fixtures::{self, ADMIN_PERMISSION};
use lectern_testkit::strategies::{arb_command_line, arb_input, arb_label};
use lectern_testkit::{RecordingExecutor, TestInvoker};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn framework(recorder: &RecordingExecutor) -> CommandFramework {
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::tp_command(recorder)).unwrap();
    framework.register(fixtures::admin_command(recorder)).unwrap();
    framework.register(fixtures::say_command(recorder)).unwrap();
    framework
}

proptest! {
    #[test]
    fn executors_only_run_on_success(input in arb_input()) {
        let recorder = RecordingExecutor::new();
        let framework = framework(&recorder);

        let report = framework.dispatch(&input, &TestInvoker::player("Alex"));
        let expected_calls = usize::from(report.outcome.is_ok());
        prop_assert_eq!(recorder.count(), expected_calls);
        if report.outcome.is_err() {
            prop_assert!(report.message.is_some());
        }
    }

    #[test]
    fn integers_round_trip_through_tp(x in any::<i32>()) {
        let recorder = RecordingExecutor::new();
        let framework = framework(&recorder);

        framework.execute(&format!("tp {x}"), &TestInvoker::player("Alex")).unwrap();
        prop_assert_eq!(
            recorder.last().unwrap().arguments.integer("x").unwrap(),
            i64::from(x)
        );
    }

    #[test]
    fn suggestions_are_sorted_and_match_the_token(input in arb_command_line()) {
        let recorder = RecordingExecutor::new();
        let framework = framework(&recorder);
        let invoker = TestInvoker::player("Alex").with_permission(ADMIN_PERMISSION);

        let suggestions = framework.suggest(&input, &invoker);
        let token = input.get(suggestions.start..);
        prop_assert!(token.is_some());
        let token = token.unwrap_or_default().to_lowercase();

        let mut sorted = suggestions.candidates.clone();
        sorted.sort();
        sorted.dedup();
        prop_assert_eq!(&sorted, &suggestions.candidates);
        for candidate in &suggestions.candidates {
            prop_assert!(candidate.to_lowercase().starts_with(&token));
        }
    }

    #[test]
    fn resolution_is_invoker_independent(input in arb_command_line()) {
        let recorder = RecordingExecutor::new();
        let framework = framework(&recorder);
        let dispatcher = framework.dispatcher();

        let before = dispatcher.resolve(&input);
        let _ = framework.execute(&input, &TestInvoker::console());
        let _ = framework.execute(&input, &TestInvoker::player("Alex"));
        let after = dispatcher.resolve(&input);
        prop_assert_eq!(before.is_resolved(), after.is_resolved());
        prop_assert_eq!(&before.requirements, &after.requirements);
    }

    #[test]
    fn distinct_roots_never_cross_invoke(
        (first, second) in (arb_label(), arb_label()).prop_filter("distinct", |(a, b)| a != b),
        x in any::<i32>(),
    ) {
        let (framework, _) = fixtures::framework();
        let first_recorder = RecordingExecutor::new();
        let second_recorder = RecordingExecutor::new();
        for (label, recorder) in [(&first, &first_recorder), (&second, &second_recorder)] {
            framework
                .register(
                    CommandDefinition::new(label.as_str())
                        .argument("x", "integer")
                        .executes_with(recorder.executor()),
                )
                .unwrap();
        }

        framework.execute(&format!("{first} {x}"), &TestInvoker::player("Alex")).unwrap();
        prop_assert_eq!(first_recorder.count(), 1);
        prop_assert_eq!(second_recorder.count(), 0);
    }

    #[test]
    fn cache_hits_are_observationally_identical(input in arb_input()) {
        let recorder = RecordingExecutor::new();
        let framework = framework(&recorder);
        let alex = TestInvoker::player("Alex");

        let cold = framework.dispatch(&input, &alex);
        let warm = framework.dispatch(&input, &alex);
        prop_assert_eq!(cold, warm);
    }

    #[test]
    fn mutations_invalidate_every_cached_signature(
        inputs in prop::collection::vec(arb_command_line(), 1..8),
    ) {
        let recorder = RecordingExecutor::new();
        let framework = framework(&recorder);
        let dispatcher = framework.dispatcher();
        for input in &inputs {
            dispatcher.resolve(input);
        }

        framework.registry().unregister("say").unwrap();
        let hits_before = dispatcher.cache().stats().hits;
        let mut seen = BTreeSet::new();
        for input in &inputs {
            if seen.insert(normalize(input)) {
                dispatcher.resolve(input);
            }
        }
        prop_assert_eq!(dispatcher.cache().stats().hits, hits_before);
    }
}
