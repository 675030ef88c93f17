//! End-to-end dispatch through the framework facade.

use assert_matches::assert_matches;
use lectern::{
    CommandDefinition, CommandReply, DispatchError, ExpectedToken, LecternError, RegistryError,
    UsageKind, MAX_COOLDOWN, SWEEP_INTERVAL,
};
use lectern_core::{EntitySelector, FrameworkConfig, Invoker};
use lectern_testkit::fixtures::{self, ADMIN_PERMISSION, ADMIN_SET_PERMISSION};
use lectern_testkit::{RecordingExecutor, TestInvoker};
use std::time::Duration;

#[test]
fn tp_binds_typed_argument() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::tp_command(&recorder)).unwrap();

    let alex = TestInvoker::player("Alex");
    framework.execute("tp 5", &alex).unwrap();

    let call = recorder.last().unwrap();
    assert_eq!(call.invoker, alex.id());
    assert_eq!(call.label, "tp");
    assert_eq!(call.command, "tp");
    assert_eq!(call.route, "");
    assert_eq!(call.arguments.integer("x").unwrap(), 5);
}

#[test]
fn alias_with_slash_reaches_same_executor() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::tp_command(&recorder)).unwrap();

    framework
        .execute("  /TELEPORT -3 ", &TestInvoker::player("Alex"))
        .unwrap();

    let call = recorder.last().unwrap();
    assert_eq!(call.label, "teleport");
    assert_eq!(call.command, "tp");
    assert_eq!(call.arguments.integer("x").unwrap(), -3);
}

#[test]
fn missing_argument_is_reported_without_running() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::tp_command(&recorder)).unwrap();

    let err = framework.execute("tp", &TestInvoker::player("Alex")).unwrap_err();
    let usage = err.as_usage().unwrap();
    assert_eq!(usage.kind, UsageKind::Incomplete);
    assert_eq!(usage.cursor, 2);
    assert_eq!(
        usage.expected,
        vec![ExpectedToken::Argument {
            name: "x".to_string(),
            signature: "integer".to_string(),
        }]
    );
    assert_eq!(recorder.count(), 0);
}

#[test]
fn invalid_argument_message_names_the_input() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::tp_command(&recorder)).unwrap();

    let report = framework.dispatch("tp abc", &TestInvoker::player("Alex"));
    assert!(!report.is_success());
    assert_eq!(
        report.message.unwrap().to_plain(),
        "Could not parse \"abc\". expected a whole number"
    );
}

#[test]
fn unknown_command_message() {
    let (framework, _) = fixtures::framework();
    let report = framework.dispatch("warp home", &TestInvoker::player("Alex"));
    assert_matches!(
        &report.outcome,
        Err(DispatchError::Usage(usage)) if usage.kind == UsageKind::UnknownCommand
    );
    assert_eq!(report.message.unwrap().to_plain(), "Unknown command warp.");
}

#[test]
fn silent_success_has_no_message() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::tp_command(&recorder)).unwrap();

    let report = framework.dispatch("tp 1", &TestInvoker::player("Alex"));
    assert!(report.is_success());
    assert!(report.message.is_none());
}

#[test]
fn greedy_argument_takes_the_rest() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::say_command(&recorder)).unwrap();

    framework
        .execute("say hello there world", &TestInvoker::player("Alex"))
        .unwrap();
    assert_eq!(
        recorder.last().unwrap().arguments.text("message").unwrap(),
        "hello there world"
    );
}

#[test]
fn command_permission_guards_every_route() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::admin_command(&recorder)).unwrap();

    let err = framework
        .execute("admin reload", &TestInvoker::player("Alex"))
        .unwrap_err();
    assert_matches!(err, DispatchError::PermissionDenied(denied) if denied.permission.as_str() == ADMIN_PERMISSION);
    assert_eq!(recorder.count(), 0);
}

#[test]
fn route_permission_is_checked_on_the_path() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::admin_command(&recorder)).unwrap();

    let moderator = TestInvoker::player("Mod").with_permission(ADMIN_PERMISSION);
    let err = framework
        .execute("admin player set Steve creative", &moderator)
        .unwrap_err();
    assert_matches!(err, DispatchError::PermissionDenied(denied) if denied.permission.as_str() == ADMIN_SET_PERMISSION);

    framework.execute("admin player get Steve", &moderator).unwrap();
    assert_eq!(recorder.count(), 1);
}

#[test]
fn hidden_branches_are_not_listed_as_expected() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::admin_command(&recorder)).unwrap();

    let moderator = TestInvoker::player("Mod").with_permission(ADMIN_PERMISSION);
    let err = framework.execute("admin player", &moderator).unwrap_err();
    assert_eq!(
        err.as_usage().unwrap().expected,
        vec![ExpectedToken::Literal("get".to_string())]
    );

    let admin = moderator.with_permission(ADMIN_SET_PERMISSION);
    let err = framework.execute("admin player", &admin).unwrap_err();
    assert_eq!(
        err.as_usage().unwrap().expected,
        vec![
            ExpectedToken::Literal("get".to_string()),
            ExpectedToken::Literal("set".to_string()),
        ]
    );
}

#[test]
fn full_admin_route_binds_selector_and_choice() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::admin_command(&recorder)).unwrap();

    let admin = TestInvoker::player("Root").with_permissions([ADMIN_PERMISSION, ADMIN_SET_PERMISSION]);
    framework
        .execute("admin player set Steve CREATIVE", &admin)
        .unwrap();

    let call = recorder.last().unwrap();
    assert_eq!(call.route, "player set");
    assert_eq!(
        call.arguments.selector("target").unwrap(),
        EntitySelector::Named("Steve".to_string())
    );
    assert_eq!(call.arguments.choice("mode").unwrap(), "creative");
}

#[test]
fn cooldown_is_per_invoker_and_expires() {
    let recorder = RecordingExecutor::new();
    let (framework, clock) = fixtures::framework();
    framework.register(fixtures::admin_command(&recorder)).unwrap();

    let alex = TestInvoker::player("Alex").with_permission(ADMIN_PERMISSION);
    let steve = TestInvoker::player("Steve").with_permission(ADMIN_PERMISSION);

    framework.execute("admin reload", &alex).unwrap();
    clock.advance(Duration::from_secs(4));

    let report = framework.dispatch("admin reload", &alex);
    assert_matches!(
        report.outcome,
        Err(DispatchError::CooldownActive { remaining, .. }) if remaining == Duration::from_secs(6)
    );
    assert_eq!(
        report.message.unwrap().to_plain(),
        "You must wait 6s before using this command again."
    );

    framework.execute("admin reload", &steve).unwrap();

    clock.advance(Duration::from_secs(6));
    framework.execute("admin reload", &alex).unwrap();
    assert_eq!(recorder.count(), 3);
}

#[test]
fn cooldowns_can_be_disabled() {
    let recorder = RecordingExecutor::new();
    let mut config = FrameworkConfig::default();
    config.cooldowns.enabled = false;
    let (framework, _) = fixtures::framework_with(config);
    framework.register(fixtures::admin_command(&recorder)).unwrap();

    let alex = TestInvoker::player("Alex").with_permission(ADMIN_PERMISSION);
    framework.execute("admin reload", &alex).unwrap();
    framework.execute("admin reload", &alex).unwrap();
    assert_eq!(recorder.count(), 2);
}

#[test]
fn oversized_cooldown_is_rejected_at_registration() {
    let (framework, _) = fixtures::framework();
    let err = framework
        .register(
            CommandDefinition::new("once")
                .cooldown(Duration::from_secs(u64::MAX))
                .executes(|_| Ok(CommandReply::Silent)),
        )
        .unwrap_err();
    assert_matches!(err, LecternError::Registry(RegistryError::Malformed(_)));
    assert!(!framework.registry().contains("once"));
}

#[test]
fn longest_cooldown_dispatches_without_overflow() {
    let (framework, clock) = fixtures::framework();
    framework
        .register(
            CommandDefinition::new("daily")
                .cooldown(MAX_COOLDOWN)
                .executes(|_| Ok(CommandReply::Silent)),
        )
        .unwrap();

    let alex = TestInvoker::player("Alex");
    assert!(framework.dispatch("daily", &alex).is_success());

    let report = framework.dispatch("daily", &alex);
    assert_matches!(
        report.outcome,
        Err(DispatchError::CooldownActive { remaining, .. }) if remaining == MAX_COOLDOWN
    );
    assert_eq!(
        report.message.unwrap().to_plain(),
        format!(
            "You must wait {}s before using this command again.",
            MAX_COOLDOWN.as_secs()
        )
    );

    clock.advance(MAX_COOLDOWN);
    assert!(framework.dispatch("daily", &alex).is_success());
}

#[test]
fn expired_cooldowns_do_not_accumulate() {
    let recorder = RecordingExecutor::new();
    let (framework, clock) = fixtures::framework();
    framework.register(fixtures::admin_command(&recorder)).unwrap();
    let cooldowns = framework.dispatcher().cooldowns();

    for index in 0..200 {
        let invoker =
            TestInvoker::player(format!("player{index}")).with_permission(ADMIN_PERMISSION);
        framework.execute("admin reload", &invoker).unwrap();
    }
    assert_eq!(cooldowns.len(), 200);

    clock.advance(SWEEP_INTERVAL.max(fixtures::RELOAD_COOLDOWN));
    let late = TestInvoker::player("Late").with_permission(ADMIN_PERMISSION);
    framework.execute("admin reload", &late).unwrap();
    assert_eq!(cooldowns.len(), 1);
    assert_eq!(recorder.count(), 201);
}

#[test]
fn player_only_commands_reject_console() {
    let (framework, _) = fixtures::framework();
    framework
        .register(
            CommandDefinition::new("home")
                .player_only()
                .executes(|_| Ok(CommandReply::message("Welcome home"))),
        )
        .unwrap();

    let report = framework.dispatch("home", &TestInvoker::console());
    assert_matches!(report.outcome, Err(DispatchError::PlayersOnly { .. }));
    assert_eq!(
        report.message.unwrap().to_plain(),
        "Only players can use this command."
    );

    let report = framework.dispatch("home", &TestInvoker::player("Alex"));
    assert_eq!(report.message.unwrap().to_plain(), "Welcome home");
}

#[test]
fn executor_errors_and_panics_become_internal_failures() {
    let (framework, _) = fixtures::framework();
    framework
        .register(CommandDefinition::new("fail").executes(|_| Err(anyhow::anyhow!("disk full"))))
        .unwrap();
    framework
        .register(CommandDefinition::new("boom").executes(|_| panic!("boom")))
        .unwrap();

    let alex = TestInvoker::player("Alex");
    assert_matches!(
        framework.execute("fail", &alex),
        Err(DispatchError::Internal { message, .. }) if message == "disk full"
    );
    assert_matches!(
        framework.execute("boom", &alex),
        Err(DispatchError::Internal { message, .. }) if message == "executor panicked"
    );

    let report = framework.dispatch("fail", &alex);
    assert_eq!(
        report.message.unwrap().to_plain(),
        "An internal error occurred while executing the command."
    );
}

#[test]
fn locale_overrides_apply_per_invoker() {
    let config = FrameworkConfig::from_toml_str(
        r#"
        [messages.locales.pt_br]
        unknown_command = "<red>Comando desconhecido <white>{label}</white>."
        "#,
    )
    .unwrap();
    let (framework, _) = fixtures::framework_with(config);

    let english = framework.dispatch("warp", &TestInvoker::player("Alex"));
    assert_eq!(english.message.unwrap().to_plain(), "Unknown command warp.");

    let brazilian = framework.dispatch("warp", &TestInvoker::player("Ana").with_locale("pt-BR"));
    assert_eq!(
        brazilian.message.unwrap().to_plain(),
        "Comando desconhecido warp."
    );
}

#[test]
fn concurrent_invocations_do_not_share_state() {
    let recorder = RecordingExecutor::new();
    let (framework, _) = fixtures::framework();
    framework.register(fixtures::tp_command(&recorder)).unwrap();

    let invokers: Vec<TestInvoker> = (0..8)
        .map(|i| TestInvoker::player(format!("Player{i}")))
        .collect();

    std::thread::scope(|scope| {
        for (i, invoker) in invokers.iter().enumerate() {
            let framework = &framework;
            scope.spawn(move || {
                for round in 0..50 {
                    let x = i as i64 * 1000 + round;
                    framework.execute(&format!("tp {x}"), invoker).unwrap();
                }
            });
        }
    });

    let calls = recorder.calls();
    assert_eq!(calls.len(), 8 * 50);
    for call in calls {
        let x = call.arguments.integer("x").unwrap();
        let owner = &invokers[(x / 1000) as usize];
        assert_eq!(call.invoker, owner.id(), "tp {x} was attributed to the wrong invoker");
    }
}
