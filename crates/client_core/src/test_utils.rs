//! Shared fakes for controller tests.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex as StdMutex,
    },
    time::Duration,
};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    clipboard::{ClipboardBackend, ClipboardError, ClipboardFallback, ClipboardService, StagedCopy},
    error::ServiceError,
    transport::{PasswordServiceApi, Transport},
};

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: String,
    pub method: Method,
    pub body: Option<Value>,
}

type Responder = Box<dyn Fn(&str, Option<&Value>) -> Result<Value, ServiceError> + Send + Sync>;
type Delay = Box<dyn Fn(&str, Option<&Value>) -> Duration + Send + Sync>;

pub struct MockTransport {
    calls: Mutex<Vec<RecordedCall>>,
    responder: Responder,
    delay: Delay,
}

impl MockTransport {
    pub fn new(
        responder: impl Fn(&str, Option<&Value>) -> Result<Value, ServiceError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Self::with_delay(responder, |_, _| Duration::ZERO)
    }

    pub fn with_delay(
        responder: impl Fn(&str, Option<&Value>) -> Result<Value, ServiceError> + Send + Sync + 'static,
        delay: impl Fn(&str, Option<&Value>) -> Duration + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
            delay: Box::new(delay),
        })
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }

    pub async fn calls_to(&self, endpoint: &str) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|call| call.endpoint == endpoint)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn call(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<Value>,
    ) -> Result<Value, ServiceError> {
        self.calls.lock().await.push(RecordedCall {
            endpoint: endpoint.to_string(),
            method,
            body: body.clone(),
        });
        let delay = (self.delay)(endpoint, body.as_ref());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        (self.responder)(endpoint, body.as_ref())
    }
}

pub fn api_for(transport: &Arc<MockTransport>) -> PasswordServiceApi {
    PasswordServiceApi::new(transport.clone())
}

pub struct FakeClipboard {
    pub fail: bool,
    pub written: Arc<StdMutex<Vec<String>>>,
}

impl ClipboardBackend for FakeClipboard {
    fn set_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::Denied("permission denied".to_string()));
        }
        self.written
            .lock()
            .expect("clipboard lock")
            .push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FallbackStats {
    pub staged: AtomicUsize,
    pub live: AtomicUsize,
    pub copied: StdMutex<Vec<String>>,
}

pub struct FakeFallback {
    pub fail_stage: bool,
    pub fail_copy: bool,
    pub stats: Arc<FallbackStats>,
}

struct FakeStaged {
    text: String,
    fail: bool,
    stats: Arc<FallbackStats>,
}

impl StagedCopy for FakeStaged {
    fn copy_selection(&mut self) -> Result<(), ClipboardError> {
        if self.fail {
            return Err(ClipboardError::Fallback("copy command rejected".to_string()));
        }
        self.stats
            .copied
            .lock()
            .expect("fallback lock")
            .push(self.text.clone());
        Ok(())
    }
}

impl Drop for FakeStaged {
    fn drop(&mut self) {
        self.stats.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ClipboardFallback for FakeFallback {
    fn stage<'a>(&'a self, text: &str) -> Result<Box<dyn StagedCopy + 'a>, ClipboardError> {
        if self.fail_stage {
            return Err(ClipboardError::Fallback("no staging support".to_string()));
        }
        self.stats.staged.fetch_add(1, Ordering::SeqCst);
        self.stats.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeStaged {
            text: text.to_string(),
            fail: self.fail_copy,
            stats: Arc::clone(&self.stats),
        }))
    }
}

/// Clipboard whose primary tier always succeeds; returns what was written.
pub fn working_clipboard() -> (ClipboardService, Arc<StdMutex<Vec<String>>>) {
    let written = Arc::new(StdMutex::new(Vec::new()));
    let service = ClipboardService::new(
        Box::new(FakeClipboard {
            fail: false,
            written: Arc::clone(&written),
        }),
        Box::new(FakeFallback {
            fail_stage: true,
            fail_copy: true,
            stats: Arc::new(FallbackStats::default()),
        }),
    );
    (service, written)
}

pub fn broken_clipboard() -> ClipboardService {
    ClipboardService::new(
        Box::new(FakeClipboard {
            fail: true,
            written: Arc::new(StdMutex::new(Vec::new())),
        }),
        Box::new(FakeFallback {
            fail_stage: true,
            fail_copy: true,
            stats: Arc::new(FallbackStats::default()),
        }),
    )
}
