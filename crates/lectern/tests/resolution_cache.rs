//! Resolution cache behaviour seen through the dispatcher.

use lectern::dispatcher::normalize;
use lectern::{tree, CommandDefinition, CommandReply, DispatchError, UsageKind};
use lectern_core::FrameworkConfig;
use lectern_testkit::fixtures::{self, ADMIN_PERMISSION};
use lectern_testkit::{RecordingExecutor, TestInvoker};

#[test]
fn repeated_input_hits_the_cache() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::tp_command(&recorder)).unwrap();
    let dispatcher = framework.dispatcher();

    let first = dispatcher.resolve("tp 5");
    let second = dispatcher.resolve("/tp 5 ");
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    let stats = dispatcher.cache().stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
}

#[test]
fn cached_results_match_fresh_parses() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::tp_command(&recorder)).unwrap();
    framework.register(fixtures::admin_command(&recorder)).unwrap();
    let dispatcher = framework.dispatcher();

    for input in ["tp 5", "tp", "tp x", "admin player get Steve", "admin nope", "warp"] {
        dispatcher.resolve(input);
        let cached = dispatcher.resolve(input);
        let fresh = tree::parse(&framework.registry().snapshot().tree, normalize(input));
        assert_eq!(cached.is_resolved(), fresh.is_resolved(), "{input}");
        assert_eq!(cached.requirements, fresh.requirements, "{input}");
    }
}

#[test]
fn registration_invalidates_cached_failures() {
    let (framework, _) = fixtures::framework();
    let alex = TestInvoker::player("Alex");

    let err = framework.execute("warp", &alex).unwrap_err();
    assert_eq!(err.as_usage().unwrap().kind, UsageKind::UnknownCommand);

    framework
        .register(CommandDefinition::new("warp").executes(|_| Ok(CommandReply::message("whoosh"))))
        .unwrap();
    assert_eq!(
        framework.execute("warp", &alex).unwrap().text().unwrap(),
        "whoosh"
    );
}

#[test]
fn unregistering_invalidates_cached_successes() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::tp_command(&recorder)).unwrap();
    let alex = TestInvoker::player("Alex");

    framework.execute("teleport 1", &alex).unwrap();
    framework.registry().unregister("teleport").unwrap();

    let err = framework.execute("teleport 1", &alex).unwrap_err();
    assert_eq!(err.as_usage().unwrap().kind, UsageKind::UnknownCommand);
    assert_eq!(recorder.count(), 1);
}

#[test]
fn cached_entries_are_checked_per_invoker() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::admin_command(&recorder)).unwrap();

    let admin = TestInvoker::player("Root").with_permission(ADMIN_PERMISSION);
    framework.execute("admin player get Steve", &admin).unwrap();

    let err = framework
        .execute("admin player get Steve", &TestInvoker::player("Alex"))
        .unwrap_err();
    assert!(matches!(err, DispatchError::PermissionDenied(_)));
    assert_eq!(recorder.count(), 1);
}

#[test]
fn tiny_cache_still_resolves_correctly() {
    let config = FrameworkConfig::from_toml_str("[cache]\ncapacity = 1\n").unwrap();
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework_with(config);
    framework.register(fixtures::tp_command(&recorder)).unwrap();
    let alex = TestInvoker::player("Alex");

    for x in [1, 2, 1, 3, 2] {
        framework.execute(&format!("tp {x}"), &alex).unwrap();
        assert_eq!(recorder.last().unwrap().arguments.integer("x").unwrap(), x);
    }
    assert_eq!(framework.dispatcher().cache().len(), 1);
    assert!(framework.dispatcher().cache().stats().evictions >= 4);
}
