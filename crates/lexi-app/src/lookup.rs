use std::sync::Arc;

use anyhow::Context;
use lexi_core::{Sanitizer, capture_text};
use lexi_dictionary::DefinitionProvider;
use lexi_types::{LookupId, PageMessage, TabId};
use tracing::Instrument;
use uuid::Uuid;

use crate::router::MessageRouter;
use crate::state::AppState;
use crate::tabs::SelectionSource;

/// Shown when the lookup itself blew up rather than the fetch
const UNEXPECTED_ERROR: &str = "Something went wrong while looking that up";

/// Everything one lookup needs; cheap to clone into a task
#[derive(Clone)]
pub struct LookupContext {
    pub state: Arc<AppState>,
    pub selection: Arc<dyn SelectionSource>,
    pub router: MessageRouter,
    pub provider: Arc<dyn DefinitionProvider>,
}

/// Run one shortcut-triggered lookup in `tab`.
///
/// Never fails: unexpected errors become a best-effort `showError`.
pub async fn handle_shortcut(ctx: &LookupContext, tab: TabId) {
    let lookup_id = Uuid::new_v4();
    let span = tracing::info_span!("lookup", %tab, %lookup_id);

    async {
        if let Err(e) = run_lookup(ctx, tab, lookup_id).await {
            tracing::error!("Lookup failed: {:#}", e);
            ctx.router
                .deliver(
                    tab,
                    PageMessage::ShowError {
                        error: UNEXPECTED_ERROR.to_string(),
                        selected_text: None,
                        lookup_id: Some(lookup_id),
                    },
                )
                .await;
        }
    }
    .instrument(span)
    .await
}

async fn run_lookup(ctx: &LookupContext, tab: TabId, lookup_id: LookupId) -> anyhow::Result<()> {
    if !ctx.state.settings.is_enabled().context("reading settings")? {
        tracing::debug!("Extension disabled, ignoring shortcut");
        return Ok(());
    }

    let raw = ctx
        .selection
        .selected_text(tab)
        .await
        .context("capturing selection")?;
    let text = capture_text(raw.as_deref());
    if text.is_empty() {
        tracing::debug!("Nothing selected");
        return Ok(());
    }

    let max_chars = ctx.state.config.read().await.popup.max_selection_chars;
    let query = Sanitizer::new(max_chars).sanitize(&text);
    if query.is_empty() {
        tracing::debug!("Selection sanitized to nothing");
        return Ok(());
    }

    tracing::info!("Looking up '{}'", query);
    ctx.router
        .deliver(
            tab,
            PageMessage::ShowLoading {
                selected_text: query.clone(),
                lookup_id: Some(lookup_id),
            },
        )
        .await;

    let definition = ctx.provider.lookup(&query).await;
    tracing::info!(
        "Lookup of '{}' {}",
        query,
        if definition.is_success() { "found a definition" } else { "failed" }
    );

    ctx.router
        .deliver(
            tab,
            PageMessage::ShowDefinition {
                selected_text: query,
                definition,
                lookup_id: Some(lookup_id),
            },
        )
        .await;

    Ok(())
}
