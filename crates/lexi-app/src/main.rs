use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use lexi_config::Config;
use lexi_dictionary::{DefinitionProvider, FreeDictionaryClient};
use lexi_page::PageEvent;
use lexi_page::headless::MountedNode;
use lexi_types::TabId;
use serde::Serialize;
use tokio::signal;
use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use self::cli::{Cli, Command, Dismiss, LookupArgs};
use self::controller::AppController;
use self::events::AppEvent;
use self::lookup::LookupContext;
use self::router::MessageRouter;
use self::state::AppState;
use self::tabs::TabHub;

mod cli;
mod controller;
mod events;
mod lookup;
mod router;
mod shortcut;
mod state;
mod tabs;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = Config::new();

    match cli.command {
        Command::Lookup(args) => lookup(config, args).await,
        Command::Enable => set_enabled(config, true),
        Command::Disable => set_enabled(config, false),
        Command::Status => status(config),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr));

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[derive(Serialize)]
struct LookupReport {
    tab: TabId,
    popups: Vec<MountedNode>,
}

/// One lookup against a headless page, start to finish
async fn lookup(mut config: Config, args: LookupArgs) -> anyhow::Result<()> {
    if let Some(timeout_ms) = args.timeout_ms {
        config.dictionary.timeout_ms = timeout_ms;
    }

    let tabs = Arc::new(TabHub::new(&config));
    let page = args.page();
    let tab = if args.restricted {
        tabs.open_restricted(page.clone())
    } else {
        tabs.open(page.clone())
    };

    let provider = FreeDictionaryClient::from_config(&config.dictionary);
    tracing::debug!("Definitions from {}", provider.metadata().name);

    let ctx = LookupContext {
        selection: tabs.clone(),
        router: MessageRouter::new(tabs.clone(), config.router.redelivery_grace()),
        provider: Arc::new(provider),
        state: Arc::new(AppState::new(config)?),
    };

    let controller = AppController::new();
    let mut tasks = controller.spawn_tasks(ctx);

    let (done, finished) = oneshot::channel();
    controller
        .events()
        .send(AppEvent::Shortcut {
            tab,
            done: Some(done),
        })
        .await
        .context("event loop is not running")?;

    tokio::select! {
        result = finished => result.context("lookup task vanished")?,
        _ = signal::ctrl_c() => tracing::info!("Interrupted"),
    }

    if let Some(how) = args.dismiss {
        dismiss(&tabs, tab, how).await;
    }

    controller.shutdown();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("task exited with error: {e:#}"),
            Err(e) => tracing::error!("task panicked: {e}"),
        }
    }

    let report = LookupReport {
        tab,
        popups: page.popups(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn dismiss(tabs: &TabHub, tab: TabId, how: Dismiss) {
    let sent = match how {
        Dismiss::Escape => {
            tabs.dispatch(
                tab,
                PageEvent::KeyDown {
                    key: "Escape".to_string(),
                },
            )
            .await
        }
        Dismiss::ClickOutside => tabs.dispatch(tab, PageEvent::Click { x: 0.0, y: 0.0 }).await,
        Dismiss::Close => tabs.dispatch(tab, PageEvent::CloseClicked).await,
        Dismiss::Unload => tabs.unload(tab).await,
    };
    if let Err(e) = sent {
        tracing::warn!("Could not dismiss popup: {e}");
        return;
    }

    if let Some(page) = tabs.page(tab) {
        let closed = page.wait_for(|popups| popups.is_empty());
        if tokio::time::timeout(std::time::Duration::from_secs(1), closed)
            .await
            .is_err()
        {
            tracing::warn!("Popup still open after {how:?}");
        }
    }
}

fn set_enabled(config: Config, enabled: bool) -> anyhow::Result<()> {
    let state = AppState::new(config)?;
    state.settings.set_enabled(enabled)?;
    println!("Lookups {}", if enabled { "enabled" } else { "disabled" });
    Ok(())
}

fn status(config: Config) -> anyhow::Result<()> {
    let state = AppState::new(config)?;
    let enabled = state.settings.is_enabled()?;

    println!("enabled:  {enabled}");
    println!(
        "shortcut: {} ({})",
        shortcut::default_binding(),
        shortcut::LOOKUP_COMMAND
    );
    println!("settings: {}", state.settings.path().display());
    Ok(())
}
