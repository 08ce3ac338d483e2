//! Integration test: drive an `EditorAdapter` over the in-memory platform
//! through registration, mounting, user edits, reconfiguration, remote
//! schema delivery and unmounting.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::json;
use yedit_core::{
    ConfigurationError, DiagnosticSource, DiagnosticsConfiguration, DialectVersion, EditorProps,
    EditorSessionInit, LanguageId, PathPattern, SchemaAssociation, SchemaId, SessionError,
};
use yedit_editor::{
    AdapterError, Delivery, DiagnosticsEngine, EditorAdapter, EngineRegistry, MemoryPlatform,
    SessionState, Surface,
};
use yedit_schema::{
    kubernetes_schema_id, CompletionKind, FetchError, InMemoryFetcher, MissReason, Resolution,
    ResolutionLayer,
};

// ─── Helpers ─────────────────────────────────────────────────────────

fn id(s: &str) -> SchemaId {
    SchemaId::new(s).unwrap()
}

fn pat(s: &str) -> PathPattern {
    PathPattern::new(s).unwrap()
}

fn adapter() -> (EditorAdapter<MemoryPlatform>, MemoryPlatform, Arc<EngineRegistry>) {
    let platform = MemoryPlatform::new();
    let registry = Arc::new(EngineRegistry::new());
    let adapter = EditorAdapter::with_engine(platform.clone(), registry.clone());
    (adapter, platform, registry)
}

fn pipeline_config() -> DiagnosticsConfiguration {
    DiagnosticsConfiguration {
        schema_associations: vec![SchemaAssociation::inline(
            id("s1"),
            vec![pat("*.pipeline.yaml")],
            json!({"type": "object"}),
        )],
        kubernetes_mode: false,
        ..DiagnosticsConfiguration::default()
    }
}

fn port_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "name": {"type": "string", "description": "Service name."},
            "port": {"type": "integer"},
            "mode": {"enum": ["fast", "safe"]}
        },
        "required": ["name"]
    })
}

fn remote_config() -> DiagnosticsConfiguration {
    DiagnosticsConfiguration {
        allow_remote_schema_fetch: true,
        schema_associations: vec![SchemaAssociation::remote(id("remote"), vec![])],
        ..DiagnosticsConfiguration::default()
    }
}

fn recorder(adapter: &mut EditorAdapter<MemoryPlatform>) -> Rc<RefCell<Vec<String>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    adapter.on_content_changed(move |text| sink.borrow_mut().push(text.to_string()));
    seen
}

fn schema_diagnostics(adapter: &EditorAdapter<MemoryPlatform>) -> usize {
    adapter
        .diagnostics()
        .iter()
        .filter(|d| d.source == DiagnosticSource::Schema)
        .count()
}

// ─── Initialization ──────────────────────────────────────────────────

#[test]
fn test_duplicate_identity_registers_nothing() {
    let (adapter, _, registry) = adapter();
    let config = DiagnosticsConfiguration {
        schema_associations: vec![
            SchemaAssociation::inline(id("dup"), vec![], json!({})),
            SchemaAssociation::inline(id("dup"), vec![pat("*.yaml")], json!({})),
        ],
        ..DiagnosticsConfiguration::default()
    };
    let err = adapter.initialize(config).unwrap_err();
    assert!(matches!(
        err,
        AdapterError::Configuration(ConfigurationError::DuplicateSchemaId { first: 0, second: 1, .. })
    ));
    assert_eq!(registry.generation(&LanguageId::yaml()), None);
}

#[test]
fn test_failed_initialize_keeps_previous_registration() {
    let (adapter, _, registry) = adapter();
    let first = adapter.initialize(pipeline_config()).unwrap();
    let bad = DiagnosticsConfiguration {
        schema_associations: vec![SchemaAssociation::inline(
            id("bad"),
            vec![],
            json!({"type": "nonsense"}),
        )],
        ..DiagnosticsConfiguration::default()
    };
    assert!(adapter.initialize(bad).is_err());
    assert_eq!(registry.generation(&LanguageId::yaml()), Some(first.generation));
}

#[test]
fn test_mount_without_initialize_fails() {
    let (mut adapter, platform, _) = adapter();
    let err = adapter
        .mount(EditorSessionInit::with_content("a: 1\n"))
        .unwrap_err();
    assert_eq!(err, AdapterError::NotInitialized(LanguageId::yaml()));
    assert_eq!(platform.mount_count(), 0);
    assert_eq!(adapter.state(), SessionState::Unmounted);
}

#[test]
fn test_sessions_share_language_registration() {
    let platform = MemoryPlatform::new();
    let registry = Arc::new(EngineRegistry::new());
    let first = EditorAdapter::with_engine(platform.clone(), registry.clone());
    first.initialize(pipeline_config()).unwrap();

    let mut second = EditorAdapter::with_engine(platform, registry.clone());
    second
        .mount(EditorSessionInit::with_content("a: 1\n").at_path("x.pipeline.yaml"))
        .unwrap();
    assert_eq!(second.resolution().unwrap().governing(), Some(&id("s1")));

    let mut other = EditorAdapter::with_engine(MemoryPlatform::new(), registry)
        .with_language(LanguageId::new("yaml-strict"));
    assert!(matches!(
        other.mount(EditorSessionInit::default()),
        Err(AdapterError::NotInitialized(_))
    ));
}

// ─── Mounting ────────────────────────────────────────────────────────

#[test]
fn test_mount_applies_read_only_after_creation() {
    let (mut adapter, platform, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    let handle = adapter
        .mount(EditorSessionInit::with_content("a: 1\n").read_only(true))
        .unwrap();

    let surface = platform.last_surface().unwrap();
    assert!(surface.is_read_only());
    assert_eq!(surface.option_updates().len(), 1);
    assert_eq!(surface.listener_count(), 1);
    assert_eq!(surface.value(), "a: 1\n");
    assert!(handle.path.starts_with("inmemory://model/"));
    assert_eq!(handle.session, adapter.session_id());
    assert_eq!(adapter.state(), SessionState::Mounted);
    assert!(adapter.is_read_only());
}

#[test]
fn test_mount_twice_is_invalid_transition() {
    let (mut adapter, platform, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    adapter.mount(EditorSessionInit::default()).unwrap();
    let err = adapter.mount(EditorSessionInit::default()).unwrap_err();
    assert!(matches!(err, AdapterError::Session(SessionError::InvalidTransition { .. })));
    assert_eq!(platform.mount_count(), 1);
}

#[test]
fn test_platform_failure_leaves_session_unmounted() {
    let (mut adapter, platform, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    platform.fail_next_mount("container detached");
    assert!(matches!(
        adapter.mount(EditorSessionInit::default()),
        Err(AdapterError::Platform(_))
    ));
    assert_eq!(adapter.state(), SessionState::Unmounted);
    adapter.mount(EditorSessionInit::default()).unwrap();
}

#[test]
fn test_mount_from_props() {
    let props = EditorProps::from_yaml_str(
        "\
value: \"name: 3\\n\"
readOnly: true
path: svc.yaml
schemas:
  - identity: svc
    pathPatterns: [\"svc.yaml\"]
    body:
      properties:
        name: {type: string}
",
    )
    .unwrap();
    let (mut adapter, platform, _) = adapter();
    adapter.initialize(props.diagnostics_configuration()).unwrap();
    adapter.mount(props.session_init()).unwrap();
    assert!(platform.last_surface().unwrap().is_read_only());
    assert_eq!(adapter.path(), "svc.yaml");
    assert_eq!(schema_diagnostics(&adapter), 1);
}

// ─── Resolution ──────────────────────────────────────────────────────

#[test]
fn test_pipeline_scenario() {
    let (mut adapter, _, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    adapter
        .mount(EditorSessionInit::with_content("steps: []\n").at_path("a.pipeline.yaml"))
        .unwrap();
    assert_eq!(
        adapter.resolution(),
        Some(Resolution::Governed {
            schema: id("s1"),
            layer: ResolutionLayer::Explicit
        })
    );
    adapter.unmount().unwrap();

    adapter
        .mount(EditorSessionInit::with_content("hello world\n").at_path("b.txt"))
        .unwrap();
    assert_eq!(adapter.resolution(), Some(Resolution::Miss(MissReason::NoMatch)));
    assert_eq!(schema_diagnostics(&adapter), 0);
}

#[test]
fn test_pattern_beats_earlier_catch_all() {
    let (mut adapter, _, _) = adapter();
    adapter
        .initialize(DiagnosticsConfiguration {
            schema_associations: vec![
                SchemaAssociation::inline(id("B"), vec![], json!({})),
                SchemaAssociation::inline(id("A"), vec![pat("*.svc.yaml")], json!({})),
            ],
            ..DiagnosticsConfiguration::default()
        })
        .unwrap();
    adapter
        .mount(EditorSessionInit::default().at_path("api.svc.yaml"))
        .unwrap();
    assert_eq!(adapter.resolution().unwrap().governing(), Some(&id("A")));
    adapter.unmount().unwrap();

    adapter
        .mount(EditorSessionInit::default().at_path("other.yaml"))
        .unwrap();
    assert_eq!(
        adapter.resolution(),
        Some(Resolution::Governed {
            schema: id("B"),
            layer: ResolutionLayer::CatchAll
        })
    );
}

#[test]
fn test_kubernetes_layer_only_without_explicit_match() {
    let manifest = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cfg\n";
    let config = DiagnosticsConfiguration {
        kubernetes_mode: true,
        schema_associations: vec![SchemaAssociation::inline(
            id("s1"),
            vec![pat("*.pipeline.yaml")],
            json!({"type": "object"}),
        )],
        ..DiagnosticsConfiguration::default()
    };
    let (mut adapter, _, _) = adapter();
    adapter.initialize(config).unwrap();

    adapter
        .mount(EditorSessionInit::with_content(manifest).at_path("a.pipeline.yaml"))
        .unwrap();
    assert_eq!(adapter.resolution().unwrap().governing(), Some(&id("s1")));
    adapter.unmount().unwrap();

    adapter
        .mount(EditorSessionInit::with_content(manifest).at_path("deploy/cfg.yaml"))
        .unwrap();
    assert_eq!(
        adapter.resolution(),
        Some(Resolution::Governed {
            schema: kubernetes_schema_id(),
            layer: ResolutionLayer::Kubernetes
        })
    );
    assert!(adapter.diagnostics().is_empty());
}

#[test]
fn test_remote_fetch_disabled_is_miss_not_failure() {
    let (mut adapter, _, _) = adapter();
    let mut config = remote_config();
    config.allow_remote_schema_fetch = false;
    adapter.initialize(config).unwrap();
    adapter
        .mount(EditorSessionInit::with_content("port: x\n").at_path("a.yaml"))
        .unwrap();
    assert_eq!(
        adapter.resolution(),
        Some(Resolution::Miss(MissReason::RemoteFetchDisabled(id("remote"))))
    );
    assert!(adapter.diagnostics().is_empty());
    assert!(adapter.take_fetch_requests().is_empty());
}

// ─── Change notifications ────────────────────────────────────────────

#[test]
fn test_user_edits_notify_with_full_text() {
    let (mut adapter, platform, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    let seen = recorder(&mut adapter);
    adapter
        .mount(EditorSessionInit::with_content("a: 1\n"))
        .unwrap();
    let surface = platform.last_surface().unwrap();

    assert!(surface.simulate_typing("b: 2\n"));
    assert!(surface.simulate_typing("c: 3\n"));
    assert_eq!(
        *seen.borrow(),
        vec!["a: 1\nb: 2\n".to_string(), "a: 1\nb: 2\nc: 3\n".to_string()]
    );
    assert_eq!(adapter.content(), "a: 1\nb: 2\nc: 3\n");
    assert_eq!(adapter.content_len(), 15);
}

#[test]
fn test_no_notification_for_read_only_toggle_or_replacement() {
    let (mut adapter, platform, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    let seen = recorder(&mut adapter);
    adapter.mount(EditorSessionInit::with_content("a: 1\n")).unwrap();

    adapter.set_read_only(true).unwrap();
    adapter.set_read_only(false).unwrap();
    adapter.replace_content("reset: true\n").unwrap();

    assert!(seen.borrow().is_empty());
    assert_eq!(platform.last_surface().unwrap().value(), "reset: true\n");
    assert_eq!(adapter.content(), "reset: true\n");
}

#[test]
fn test_read_only_makes_input_a_no_op() {
    let (mut adapter, platform, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    let seen = recorder(&mut adapter);
    adapter.mount(EditorSessionInit::with_content("a: 1\n")).unwrap();
    let surface = platform.last_surface().unwrap();

    adapter.set_read_only(true).unwrap();
    assert!(!surface.simulate_input("changed"));
    assert_eq!(adapter.content(), "a: 1\n");
    assert!(seen.borrow().is_empty());

    adapter.set_read_only(false).unwrap();
    assert!(surface.simulate_input("changed"));
    assert_eq!(*seen.borrow(), vec!["changed".to_string()]);
}

#[test]
fn test_undefined_payload_normalized_to_empty() {
    let (mut adapter, platform, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    let seen = recorder(&mut adapter);
    adapter.mount(EditorSessionInit::with_content("a: 1\n")).unwrap();
    assert!(platform.last_surface().unwrap().simulate_clear());
    assert_eq!(*seen.borrow(), vec![String::new()]);
    assert_eq!(adapter.content_len(), 0);
}

#[test]
fn test_no_notification_after_unmount() {
    let (mut adapter, platform, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    let seen = recorder(&mut adapter);
    adapter.mount(EditorSessionInit::with_content("a: 1\n")).unwrap();
    let surface = platform.last_surface().unwrap();
    adapter.unmount().unwrap();
    assert!(surface.is_disposed());
    assert!(!surface.simulate_input("late"));
    assert!(seen.borrow().is_empty());
    assert!(matches!(adapter.replace_content("x"), Err(AdapterError::NotMounted)));
}

// ─── Diagnostics ─────────────────────────────────────────────────────

#[test]
fn test_edits_revalidate_on_tick() {
    let (mut adapter, platform, _) = adapter();
    adapter
        .initialize(DiagnosticsConfiguration {
            schema_associations: vec![SchemaAssociation::inline(id("svc"), vec![], port_schema())],
            ..DiagnosticsConfiguration::default()
        })
        .unwrap();
    adapter.mount(EditorSessionInit::with_content("name: api\n")).unwrap();
    assert!(adapter.diagnostics().is_empty());
    assert!(!adapter.tick());

    let surface = platform.last_surface().unwrap();
    surface.simulate_typing("port: http\n");
    assert!(adapter.diagnostics().is_empty());
    assert!(adapter.tick());
    let diagnostics = adapter.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].range.start.line, 1);
    assert_eq!(diagnostics[0].schema, Some(id("svc")));
    assert_eq!(surface.markers(), diagnostics);
    assert!(!adapter.tick());
}

#[test]
fn test_syntax_error_positioned() {
    let (mut adapter, _, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    adapter
        .mount(EditorSessionInit::with_content("a: 1\nb: [unclosed\n").at_path("b.txt"))
        .unwrap();
    let diagnostics = adapter.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].source, DiagnosticSource::Syntax);
    assert!(diagnostics[0].is_error());
    assert!(diagnostics[0].range.start.line >= 1);
}

#[test]
fn test_yaml_1_1_booleans() {
    let schema = json!({"properties": {"enabled": {"type": "boolean"}}});
    let config = |dialect| DiagnosticsConfiguration {
        dialect_version: dialect,
        schema_associations: vec![SchemaAssociation::inline(id("flags"), vec![], schema.clone())],
        ..DiagnosticsConfiguration::default()
    };

    let (mut adapter, _, _) = adapter();
    adapter.initialize(config(DialectVersion::V1_1)).unwrap();
    adapter.mount(EditorSessionInit::with_content("enabled: yes\n")).unwrap();
    assert!(adapter.diagnostics().is_empty());

    adapter.reconfigure(config(DialectVersion::V1_2)).unwrap();
    assert_eq!(schema_diagnostics(&adapter), 1);
}

#[test]
fn test_hover_and_completion() {
    let (mut adapter, _, _) = adapter();
    adapter
        .initialize(DiagnosticsConfiguration {
            schema_associations: vec![SchemaAssociation::inline(id("svc"), vec![], port_schema())],
            ..DiagnosticsConfiguration::default()
        })
        .unwrap();
    assert!(adapter.hover(0, 1).is_none());
    adapter
        .mount(EditorSessionInit::with_content("name: api\n\n"))
        .unwrap();

    let hover = adapter.hover(0, 1).unwrap();
    assert!(hover.contents.contains("Service name."));
    assert_eq!(hover.schema, id("svc"));

    let labels: Vec<String> = adapter
        .completions(1, 0)
        .into_iter()
        .filter(|c| c.kind == CompletionKind::Property)
        .map(|c| c.label)
        .collect();
    assert!(labels.contains(&"port".to_string()));
    assert!(labels.contains(&"mode".to_string()));
    assert!(!labels.contains(&"name".to_string()));
}

#[test]
fn test_format_document_is_a_user_edit() {
    let (mut adapter, _, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    let seen = recorder(&mut adapter);
    adapter
        .mount(EditorSessionInit::with_content("a: 1   \n\n\n").read_only(true))
        .unwrap();
    assert!(!adapter.format_document().unwrap());

    adapter.set_read_only(false).unwrap();
    assert!(adapter.format_document().unwrap());
    assert_eq!(adapter.content(), "a: 1\n");
    assert_eq!(*seen.borrow(), vec!["a: 1\n".to_string()]);
    assert!(!adapter.format_document().unwrap());
}

// ─── Reconfiguration ─────────────────────────────────────────────────

#[test]
fn test_reconfigure_invalidates_cached_resolution() {
    let (mut adapter, _, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    adapter
        .mount(EditorSessionInit::with_content("a: 1\n").at_path("a.pipeline.yaml"))
        .unwrap();
    let before = adapter.generation();
    assert_eq!(adapter.resolution().unwrap().governing(), Some(&id("s1")));

    adapter
        .reconfigure(DiagnosticsConfiguration {
            schema_associations: vec![SchemaAssociation::inline(
                id("s2"),
                vec![pat("a.*.yaml")],
                json!({"type": "object"}),
            )],
            ..DiagnosticsConfiguration::default()
        })
        .unwrap();
    assert_eq!(adapter.resolution().unwrap().governing(), Some(&id("s2")));
    assert_eq!(adapter.generation(), before + 1);
    assert_eq!(adapter.state(), SessionState::Mounted);
}

#[test]
fn test_rejected_reconfigure_keeps_previous_configuration() {
    let (mut adapter, _, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    adapter
        .mount(EditorSessionInit::default().at_path("a.pipeline.yaml"))
        .unwrap();
    let before = adapter.generation();

    let mut bad = pipeline_config();
    bad.schema_associations.push(SchemaAssociation::inline(id("s1"), vec![], json!({})));
    assert!(matches!(
        adapter.reconfigure(bad),
        Err(AdapterError::Configuration(ConfigurationError::DuplicateSchemaId { .. }))
    ));
    assert_eq!(adapter.state(), SessionState::Mounted);
    assert_eq!(adapter.generation(), before);
    assert_eq!(adapter.resolution().unwrap().governing(), Some(&id("s1")));
}

#[test]
fn test_transitions_are_recorded() {
    let (mut adapter, _, _) = adapter();
    adapter.initialize(pipeline_config()).unwrap();
    assert!(matches!(
        adapter.reconfigure(pipeline_config()),
        Err(AdapterError::Session(_))
    ));
    adapter.mount(EditorSessionInit::default()).unwrap();
    adapter.reconfigure(pipeline_config()).unwrap();
    adapter.unmount().unwrap();
    assert!(matches!(adapter.unmount(), Err(AdapterError::Session(_))));

    let states: Vec<SessionState> = adapter.transitions().iter().map(|t| t.to_state).collect();
    assert_eq!(
        states,
        vec![
            SessionState::Mounted,
            SessionState::ConfigChanging,
            SessionState::Mounted,
            SessionState::Unmounted,
        ]
    );
}

// ─── Remote fetch ────────────────────────────────────────────────────

#[test]
fn test_remote_fetch_applied_while_current() {
    let (mut adapter, _, _) = adapter();
    adapter.initialize(remote_config()).unwrap();
    adapter
        .mount(EditorSessionInit::with_content("port: x\n").at_path("a.yaml"))
        .unwrap();
    assert!(matches!(adapter.resolution(), Some(Resolution::AwaitingFetch { .. })));

    let fetcher = InMemoryFetcher::new()
        .with(id("remote"), json!({"properties": {"port": {"type": "integer"}}}));
    assert_eq!(adapter.run_pending_fetches(&fetcher), vec![Delivery::Applied]);
    assert_eq!(schema_diagnostics(&adapter), 1);
    assert!(adapter.take_fetch_requests().is_empty());
}

#[test]
fn test_remote_fetch_failure_is_warning() {
    let (mut adapter, _, _) = adapter();
    adapter.initialize(remote_config()).unwrap();
    adapter
        .mount(EditorSessionInit::with_content("port: x\n").at_path("a.yaml"))
        .unwrap();
    let deliveries = adapter.run_pending_fetches(&InMemoryFetcher::new());
    assert_eq!(deliveries, vec![Delivery::Applied]);
    let diagnostics = adapter.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].source, DiagnosticSource::SchemaFetch);
    assert!(!diagnostics[0].is_error());
}

#[test]
fn test_late_fetch_after_unmount_discarded() {
    let (mut adapter, _, _) = adapter();
    adapter.initialize(remote_config()).unwrap();
    adapter
        .mount(EditorSessionInit::with_content("port: x\n").at_path("a.yaml"))
        .unwrap();
    let requests = adapter.take_fetch_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].schema, id("remote"));

    adapter.unmount().unwrap();
    let delivery = adapter.deliver_fetch(
        &requests[0],
        Ok(json!({"properties": {"port": {"type": "integer"}}})),
    );
    assert_eq!(delivery, Delivery::Discarded);
    assert!(adapter.diagnostics().is_empty());
}

#[test]
fn test_late_fetch_after_reconfigure_discarded() {
    let (mut adapter, _, _) = adapter();
    adapter.initialize(remote_config()).unwrap();
    adapter
        .mount(EditorSessionInit::with_content("port: x\n").at_path("a.yaml"))
        .unwrap();
    let stale = adapter.take_fetch_requests();

    adapter.reconfigure(remote_config()).unwrap();
    assert_eq!(
        adapter.deliver_fetch(&stale[0], Err(FetchError::NotFound("remote".into()))),
        Delivery::Discarded
    );
    assert!(adapter.diagnostics().is_empty());

    let fresh = adapter.take_fetch_requests();
    assert_eq!(fresh.len(), 1);
    assert_eq!(fresh[0].ticket.generation, adapter.generation());
}

#[test]
fn test_reinitialize_while_mounted_requeues_fetch() {
    let (mut adapter, _, _) = adapter();
    adapter.initialize(remote_config()).unwrap();
    adapter
        .mount(EditorSessionInit::with_content("port: x\n").at_path("a.yaml"))
        .unwrap();
    let fetcher = InMemoryFetcher::new()
        .with(id("remote"), json!({"properties": {"port": {"type": "integer"}}}));
    assert_eq!(adapter.run_pending_fetches(&fetcher), vec![Delivery::Applied]);
    assert_eq!(schema_diagnostics(&adapter), 1);

    // The replacement registration has an empty fetch cache.
    adapter.initialize(remote_config()).unwrap();
    adapter.replace_content("port: y\n").unwrap();
    assert!(matches!(adapter.resolution(), Some(Resolution::AwaitingFetch { .. })));
    let requests = adapter.take_fetch_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].schema, id("remote"));

    let delivery = adapter.deliver_fetch(
        &requests[0],
        Ok(json!({"properties": {"port": {"type": "integer"}}})),
    );
    assert_eq!(delivery, Delivery::Applied);
    assert_eq!(schema_diagnostics(&adapter), 1);
}

#[test]
fn test_registration_replaced_by_other_session_requeues_fetch() {
    let (mut first, platform, registry) = adapter();
    first.initialize(remote_config()).unwrap();
    first
        .mount(EditorSessionInit::with_content("port: x\n").at_path("a.yaml"))
        .unwrap();
    assert_eq!(first.take_fetch_requests().len(), 1);

    let second = EditorAdapter::with_engine(platform, registry);
    second.initialize(remote_config()).unwrap();

    first.replace_content("port: y\n").unwrap();
    assert_eq!(first.take_fetch_requests().len(), 1);
}
