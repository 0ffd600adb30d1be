use kanal::AsyncReceiver;
use lexi_types::TabId;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::lookup::{LookupContext, handle_shortcut};

/// Events flowing into the background event loop
#[derive(Debug)]
pub enum AppEvent {
    /// The lookup shortcut fired while `tab` was active. `done` fires once that
    /// lookup has finished.
    Shortcut {
        tab: TabId,
        done: Option<oneshot::Sender<()>>,
    },
}

/// Background main loop
pub async fn event_loop(
    ctx: LookupContext,
    events: AsyncReceiver<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    tracing::info!("[EVENT_LOOP] Waiting for events");
    loop {
        let event = tokio::select! {
            event = events.recv() => event?,
            _ = cancel.cancelled() => {
                tracing::info!("[EVENT_LOOP] Shutdown requested");
                return Ok(());
            }
        };

        handle_event(&ctx, event);
    }
}

fn handle_event(ctx: &LookupContext, event: AppEvent) {
    match event {
        AppEvent::Shortcut { tab, done } => {
            tracing::debug!("[EVENT_LOOP] Shortcut in {}", tab);

            // Lookups aren't serialized; a newer one supersedes on the page
            let ctx = ctx.clone();
            tokio::spawn(async move {
                handle_shortcut(&ctx, tab).await;
                if let Some(done) = done {
                    let _ = done.send(());
                }
            });
        }
    }
}
