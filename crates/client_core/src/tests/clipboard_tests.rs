use super::*;
use crate::test_utils::{FakeClipboard, FakeFallback, FallbackStats};
use std::{
    sync::{atomic::Ordering, mpsc, Arc, Mutex},
    time::Duration,
};

fn service(
    primary_fails: bool,
    fail_stage: bool,
    fail_copy: bool,
) -> (Arc<ClipboardService>, Arc<Mutex<Vec<String>>>, Arc<FallbackStats>) {
    let written = Arc::new(Mutex::new(Vec::new()));
    let stats = Arc::new(FallbackStats::default());
    let service = ClipboardService::new(
        Box::new(FakeClipboard {
            fail: primary_fails,
            written: Arc::clone(&written),
        }),
        Box::new(FakeFallback {
            fail_stage,
            fail_copy,
            stats: Arc::clone(&stats),
        }),
    );
    (Arc::new(service), written, stats)
}

/// Primary tier that blocks its thread until the test releases it.
struct GatedClipboard {
    release: Mutex<mpsc::Receiver<()>>,
    written: Arc<Mutex<Vec<String>>>,
}

impl ClipboardBackend for GatedClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        let release = self.release.lock().expect("gate lock");
        release
            .recv_timeout(Duration::from_secs(2))
            .map_err(|_| ClipboardError::Unavailable("never released".to_string()))?;
        self.written.lock().expect("clipboard lock").push(text.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn primary_clipboard_is_used_first() {
    let (service, written, stats) = service(false, false, false);
    assert!(service.copy("s3cret").await);
    assert_eq!(written.lock().unwrap().as_slice(), ["s3cret".to_string()]);
    assert_eq!(stats.staged.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fallback_copies_when_primary_is_denied() {
    let (service, written, stats) = service(true, false, false);
    assert!(service.copy("s3cret").await);
    assert!(written.lock().unwrap().is_empty());
    assert_eq!(stats.copied.lock().unwrap().as_slice(), ["s3cret".to_string()]);
    assert_eq!(stats.staged.load(Ordering::SeqCst), 1);
    assert_eq!(stats.live.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn staging_is_torn_down_even_when_fallback_fails() {
    let (service, _written, stats) = service(true, false, true);
    assert!(!service.copy("s3cret").await);
    assert_eq!(stats.staged.load(Ordering::SeqCst), 1);
    assert_eq!(stats.live.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn both_tiers_failing_reports_false() {
    let (service, _written, stats) = service(true, true, false);
    assert!(!service.copy("s3cret").await);
    assert_eq!(stats.staged.load(Ordering::SeqCst), 0);
}

// Single-threaded runtime: the release below can only be sent if the
// blocked clipboard write is off the runtime thread.
#[tokio::test(flavor = "current_thread")]
async fn slow_clipboard_does_not_stall_the_runtime() {
    let (release, gate) = mpsc::channel();
    let written = Arc::new(Mutex::new(Vec::new()));
    let service = Arc::new(ClipboardService::new(
        Box::new(GatedClipboard {
            release: Mutex::new(gate),
            written: Arc::clone(&written),
        }),
        Box::new(FakeFallback {
            fail_stage: true,
            fail_copy: true,
            stats: Arc::new(FallbackStats::default()),
        }),
    ));

    let copy = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.copy("s3cret").await }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!copy.is_finished());
    release.send(()).expect("gate open");

    assert!(copy.await.expect("join"));
    assert_eq!(written.lock().unwrap().as_slice(), ["s3cret".to_string()]);
}

#[test]
fn command_fallback_has_candidates_for_this_platform() {
    let fallback = CommandFallback::for_platform();
    assert!(!fallback.candidates.is_empty());
}
