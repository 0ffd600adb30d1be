//! Delivery policy: direct send, then one inject-and-retry

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use lexi_types::{MessageResponse, PageMessage, TabId};

use crate::router::{DeliveryError, MessageRouter, TabMessenger};

const TAB: TabId = TabId(7);

#[derive(Default)]
struct FakeMessenger {
    loaded: AtomicBool,
    /// Whether injecting actually brings a renderer up
    inject_works: bool,
    inject_blocked: bool,
    unknown_tab: bool,
    sends: AtomicUsize,
    injects: AtomicUsize,
}

#[async_trait]
impl TabMessenger for FakeMessenger {
    async fn send(&self, tab: TabId, _message: PageMessage) -> Result<MessageResponse, DeliveryError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if self.unknown_tab {
            return Err(DeliveryError::UnknownTab(tab));
        }
        if self.loaded.load(Ordering::SeqCst) {
            Ok(MessageResponse::ok())
        } else {
            Err(DeliveryError::NotInitialized(tab))
        }
    }

    async fn inject(&self, tab: TabId) -> Result<(), DeliveryError> {
        self.injects.fetch_add(1, Ordering::SeqCst);
        if self.inject_blocked {
            return Err(DeliveryError::InjectionBlocked(tab));
        }
        if self.inject_works {
            self.loaded.store(true, Ordering::SeqCst);
        }
        Ok(())
    }
}

fn loading() -> PageMessage {
    PageMessage::ShowLoading {
        selected_text: "word".to_string(),
        lookup_id: None,
    }
}

fn router(messenger: &Arc<FakeMessenger>) -> MessageRouter {
    MessageRouter::new(messenger.clone(), Duration::from_millis(100))
}

#[tokio::test(start_paused = true)]
async fn loaded_renderer_gets_message_directly() {
    let messenger = Arc::new(FakeMessenger::default());
    messenger.loaded.store(true, Ordering::SeqCst);

    let response = router(&messenger).deliver(TAB, loading()).await;

    assert_eq!(response, Some(MessageResponse::ok()));
    assert_eq!(messenger.sends.load(Ordering::SeqCst), 1);
    assert_eq!(messenger.injects.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn missing_renderer_is_injected_then_retried_after_grace() {
    let messenger = Arc::new(FakeMessenger {
        inject_works: true,
        ..Default::default()
    });

    let start = tokio::time::Instant::now();
    let response = router(&messenger).deliver(TAB, loading()).await;

    assert_eq!(response, Some(MessageResponse::ok()));
    assert_eq!(messenger.sends.load(Ordering::SeqCst), 2);
    assert_eq!(messenger.injects.load(Ordering::SeqCst), 1);
    assert!(start.elapsed() >= Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn failed_retry_is_swallowed_without_further_attempts() {
    let messenger = Arc::new(FakeMessenger::default());

    let response = router(&messenger).deliver(TAB, loading()).await;

    assert_eq!(response, None);
    assert_eq!(messenger.sends.load(Ordering::SeqCst), 2);
    assert_eq!(messenger.injects.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn blocked_injection_skips_retry() {
    let messenger = Arc::new(FakeMessenger {
        inject_blocked: true,
        ..Default::default()
    });

    let response = router(&messenger).deliver(TAB, loading()).await;

    assert_eq!(response, None);
    assert_eq!(messenger.sends.load(Ordering::SeqCst), 1);
    assert_eq!(messenger.injects.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn other_failures_do_not_inject() {
    let messenger = Arc::new(FakeMessenger {
        unknown_tab: true,
        ..Default::default()
    });

    let response = router(&messenger).deliver(TAB, loading()).await;

    assert_eq!(response, None);
    assert_eq!(messenger.sends.load(Ordering::SeqCst), 1);
    assert_eq!(messenger.injects.load(Ordering::SeqCst), 0);
}
