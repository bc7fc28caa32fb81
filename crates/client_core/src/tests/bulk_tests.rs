use super::*;
use crate::{
    error::ServiceError,
    generator::GeneratorPanel,
    test_utils::{api_for, broken_clipboard, working_clipboard, MockTransport},
};
use serde_json::{json, Value};
use shared::{domain::CharacterSet, error::ValidationError, protocol::endpoints};
use tempfile::tempdir;

fn bulk_responder(endpoint: &str, body: Option<&Value>) -> Result<Value, ServiceError> {
    match endpoint {
        endpoints::GENERATE_BULK => {
            let body = body.expect("bulk body");
            let count = body["count"].as_u64().unwrap_or_default();
            let length = body["length"].as_u64().unwrap_or_default() as usize;
            let passwords: Vec<String> = (0..count)
                .map(|i| format!("{i}").repeat(length).chars().take(length).collect())
                .collect();
            Ok(json!({ "passwords": passwords }))
        }
        endpoints::ENTROPY_CALCULATE => Ok(json!({ "entropy": 1.0, "rating": "Weak" })),
        other => Err(ServiceError::status(404, format!("no route {other}"))),
    }
}

struct Fixture {
    transport: Arc<MockTransport>,
    generator: Arc<GeneratorPanel>,
    bulk: Arc<BulkWorkflowController>,
    notifications: NotificationCenter,
}

fn fixture_with(
    transport: Arc<MockTransport>,
    clipboard: ClipboardService,
    download_dir: &Path,
) -> Fixture {
    let notifications = NotificationCenter::new();
    let clipboard = Arc::new(clipboard);
    let api = api_for(&transport);
    let generator = GeneratorPanel::new(
        api.clone(),
        Arc::clone(&clipboard),
        notifications.clone(),
        Duration::from_millis(250),
    );
    let bulk = BulkWorkflowController::new(
        api,
        clipboard,
        notifications.clone(),
        generator.selection(),
        download_dir,
    );
    Fixture {
        transport,
        generator,
        bulk,
        notifications,
    }
}

fn fixture() -> Fixture {
    fixture_with(
        MockTransport::new(bulk_responder),
        working_clipboard().0,
        Path::new("."),
    )
}

#[tokio::test(start_paused = true)]
async fn generating_requires_open_dialog() {
    let f = fixture();
    assert_eq!(f.bulk.generate_bulk().await, Err(PanelError::ModalClosed));
    assert!(f.transport.calls().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn open_seeds_length_from_generator_after_shown() {
    let f = fixture();
    f.generator.set_length(24).await;

    f.bulk.open().await;
    assert!(f.bulk.is_visible());
    let view = f.bulk.view().await;
    assert_eq!(view.modal, ModalState::Open);
    assert_eq!(view.length, 24);
    assert_eq!(view.count, DEFAULT_BULK_COUNT);
    assert!(view.heading().is_none());
}

#[tokio::test(start_paused = true)]
async fn modal_signals_once_shown() {
    let modal = Modal::default();
    let shown = modal.show();
    assert!(modal.is_visible());
    shown.await.expect("shown signal");
    modal.hide();
    assert!(!modal.is_visible());
}

#[tokio::test(start_paused = true)]
async fn out_of_range_counts_never_reach_the_service() {
    let f = fixture();
    f.bulk.open().await;

    for count in [0, 51] {
        f.bulk.set_count(count).await;
        let err = f.bulk.generate_bulk().await.expect_err("must fail");
        assert_eq!(
            err,
            PanelError::Validation(ValidationError::BulkCountOutOfRange { count })
        );
    }

    assert!(f.transport.calls_to(endpoints::GENERATE_BULK).await.is_empty());
    let active = f.notifications.active();
    assert_eq!(active.len(), 2);
    assert!(active
        .iter()
        .all(|n| n.severity == Severity::Warning && n.message == "Count must be between 1 and 50"));
    assert_eq!(f.bulk.view().await.modal, ModalState::Open);
}

#[tokio::test(start_paused = true)]
async fn no_character_set_is_a_warning() {
    let f = fixture();
    for set in CharacterSet::ALL {
        f.generator.set_option(set, false).await;
    }
    f.bulk.open().await;

    let err = f.bulk.generate_bulk().await.expect_err("must fail");
    assert_eq!(err, PanelError::Validation(ValidationError::NoCharacterSet));
    assert!(f.transport.calls_to(endpoints::GENERATE_BULK).await.is_empty());
    assert_eq!(f.notifications.active()[0].severity, Severity::Warning);
}

#[tokio::test(start_paused = true)]
async fn generated_list_uses_generator_options_and_dialog_length() {
    let f = fixture();
    f.generator.set_option(CharacterSet::Symbols, false).await;
    f.bulk.open().await;
    f.bulk.set_count(3).await;
    f.bulk.set_length(8).await;

    assert_eq!(f.bulk.generate_bulk().await, Ok(3));

    let calls = f.transport.calls_to(endpoints::GENERATE_BULK).await;
    assert_eq!(calls.len(), 1);
    let body = calls[0].body.as_ref().unwrap();
    assert_eq!(body["count"], 3);
    assert_eq!(body["length"], 8);
    assert_eq!(body["options"]["symbols"], false);

    let view = f.bulk.view().await;
    assert_eq!(view.results, vec!["00000000", "11111111", "22222222"]);
    assert_eq!(view.heading().as_deref(), Some("✓ Generated 3 Passwords"));
    assert!(view.confirm_enabled);
    assert_eq!(view.confirm_label, CONFIRM_LABEL);
    assert_eq!(f.notifications.active()[0].message, "✓ Generated 3 passwords!");
}

#[tokio::test(start_paused = true)]
async fn confirm_is_disabled_while_generating() {
    let transport = MockTransport::with_delay(bulk_responder, |_, _| Duration::from_millis(500));
    let f = fixture_with(transport, working_clipboard().0, Path::new("."));
    f.bulk.open().await;
    f.bulk.set_count(5).await;

    let pending = tokio::spawn({
        let bulk = Arc::clone(&f.bulk);
        async move { bulk.generate_bulk().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    let view = f.bulk.view().await;
    assert_eq!(view.modal, ModalState::Generating);
    assert!(!view.confirm_enabled);
    assert_eq!(view.confirm_label, "Generating 5 passwords...");
    assert_eq!(f.bulk.generate_bulk().await, Err(PanelError::Busy));

    assert_eq!(pending.await.expect("join"), Ok(5));
    assert_eq!(f.bulk.view().await.modal, ModalState::Open);
}

#[tokio::test(start_paused = true)]
async fn failure_keeps_previous_list() {
    let failing = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let switch = Arc::clone(&failing);
    let transport = MockTransport::new(move |endpoint, body| {
        if switch.load(Ordering::SeqCst) {
            Err(ServiceError::status(500, "entropy pool drained"))
        } else {
            bulk_responder(endpoint, body)
        }
    });
    let f = fixture_with(transport, working_clipboard().0, Path::new("."));
    f.bulk.open().await;
    f.bulk.set_count(2).await;
    f.bulk.generate_bulk().await.expect("first batch");

    failing.store(true, Ordering::SeqCst);
    assert!(f.bulk.generate_bulk().await.is_err());

    let view = f.bulk.view().await;
    assert_eq!(view.results.len(), 2);
    assert!(view.confirm_enabled);
    assert!(f
        .notifications
        .active()
        .iter()
        .any(|n| n.message == "Error: entropy pool drained" && n.severity == Severity::Error));
}

#[tokio::test(start_paused = true)]
async fn copy_all_joins_in_display_order() {
    let (clipboard, written) = working_clipboard();
    let f = fixture_with(MockTransport::new(bulk_responder), clipboard, Path::new("."));
    assert!(!f.bulk.copy_all().await);

    f.bulk.open().await;
    f.bulk.set_count(3).await;
    f.bulk.set_length(4).await;
    f.bulk.generate_bulk().await.expect("generate");

    assert!(f.bulk.copy_all().await);
    assert_eq!(
        written.lock().unwrap().as_slice(),
        ["0000\n1111\n2222".to_string()]
    );
    assert!(f
        .notifications
        .active()
        .iter()
        .any(|n| n.message == "✓ Copied 3 passwords!"));
}

#[tokio::test(start_paused = true)]
async fn copy_all_failure_is_reported() {
    let f = fixture_with(
        MockTransport::new(bulk_responder),
        broken_clipboard(),
        Path::new("."),
    );
    f.bulk.open().await;
    f.bulk.set_count(1).await;
    f.bulk.generate_bulk().await.expect("generate");

    assert!(!f.bulk.copy_all().await);
    assert!(f
        .notifications
        .active()
        .iter()
        .any(|n| n.message == "Failed to copy passwords" && n.severity == Severity::Error));
}

#[tokio::test(start_paused = true)]
async fn item_copy_feedback_resets() {
    let (clipboard, written) = working_clipboard();
    let f = fixture_with(MockTransport::new(bulk_responder), clipboard, Path::new("."));
    f.bulk.open().await;
    f.bulk.set_count(2).await;
    f.bulk.set_length(3).await;
    f.bulk.generate_bulk().await.expect("generate");

    assert!(f.bulk.copy_item(1).await);
    assert!(!f.bulk.copy_item(9).await);
    assert_eq!(written.lock().unwrap().as_slice(), ["111".to_string()]);
    assert_eq!(f.bulk.view().await.copied_item, Some(1));

    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(f.bulk.view().await.copied_item, None);
}

#[tokio::test]
async fn download_writes_newline_separated_file() {
    let dir = tempdir().expect("tempdir");
    let target = dir.path().join("exports");
    let f = fixture_with(MockTransport::new(bulk_responder), working_clipboard().0, &target);

    assert!(matches!(f.bulk.download().await, Err(ExportError::Empty)));

    f.bulk.open().await;
    f.bulk.set_count(2).await;
    f.bulk.set_length(2).await;
    f.bulk.generate_bulk().await.expect("generate");

    let path = f.bulk.download().await.expect("download");
    assert_eq!(path.parent(), Some(target.as_path()));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("secure-passwords-"));
    assert!(name.ends_with(".txt"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "00\n11");
    assert!(f
        .notifications
        .active()
        .iter()
        .any(|n| n.message == "✓ Passwords downloaded!"));
}

#[tokio::test(start_paused = true)]
async fn close_discards_results() {
    let f = fixture();
    f.bulk.open().await;
    f.bulk.set_count(2).await;
    f.bulk.generate_bulk().await.expect("generate");

    f.bulk.close().await;
    assert!(!f.bulk.is_visible());
    let view = f.bulk.view().await;
    assert_eq!(view.modal, ModalState::Closed);
    assert!(view.results.is_empty());
    assert!(view.heading().is_none());
}

#[tokio::test(start_paused = true)]
async fn results_arriving_after_close_are_dropped() {
    let transport = MockTransport::with_delay(bulk_responder, |_, _| Duration::from_millis(500));
    let f = fixture_with(transport, working_clipboard().0, Path::new("."));
    f.bulk.open().await;

    let pending = tokio::spawn({
        let bulk = Arc::clone(&f.bulk);
        async move { bulk.generate_bulk().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    f.bulk.close().await;

    assert_eq!(pending.await.expect("join"), Err(PanelError::Superseded));
    let view = f.bulk.view().await;
    assert_eq!(view.modal, ModalState::Closed);
    assert!(view.results.is_empty());
    assert!(f.notifications.active().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reopening_during_flight_keeps_one_request_and_drops_the_stale_list() {
    let transport = MockTransport::with_delay(bulk_responder, |_, _| Duration::from_millis(500));
    let f = fixture_with(transport, working_clipboard().0, Path::new("."));
    f.bulk.open().await;
    f.bulk.set_count(3).await;

    let first = tokio::spawn({
        let bulk = Arc::clone(&f.bulk);
        async move { bulk.generate_bulk().await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    f.bulk.close().await;
    f.bulk.open().await;
    f.bulk.set_count(5).await;

    assert_eq!(f.bulk.generate_bulk().await, Err(PanelError::Busy));
    assert!(!f.bulk.view().await.confirm_enabled);
    assert_eq!(f.transport.calls_to(endpoints::GENERATE_BULK).await.len(), 1);

    assert_eq!(first.await.expect("join"), Err(PanelError::Superseded));
    let view = f.bulk.view().await;
    assert_eq!(view.modal, ModalState::Open);
    assert!(view.results.is_empty());
    assert!(view.confirm_enabled);

    assert_eq!(f.bulk.generate_bulk().await, Ok(5));
    assert_eq!(f.bulk.view().await.results.len(), 5);
    assert_eq!(f.transport.calls_to(endpoints::GENERATE_BULK).await.len(), 2);
}

#[test]
fn join_keeps_order() {
    let passwords = vec!["b".to_string(), "a".to_string()];
    assert_eq!(join_passwords(&passwords), "b\na");
}
