use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::{AppEvent, event_loop};
use crate::lookup::LookupContext;

/// Application controller for task spawning and lifecycle
pub struct AppController {
    events: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    cancel_token: CancellationToken,
}

impl Default for AppController {
    fn default() -> Self {
        Self::new()
    }
}

impl AppController {
    pub fn new() -> Self {
        Self {
            events: kanal::bounded_async(64),
            cancel_token: CancellationToken::new(),
        }
    }

    /// Where shortcut presses are sent
    pub fn events(&self) -> AsyncSender<AppEvent> {
        self.events.0.clone()
    }

    pub fn spawn_tasks(&self, ctx: LookupContext) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        tasks.spawn(event_loop(
            ctx,
            self.events.1.clone(),
            self.cancel_token.child_token(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
