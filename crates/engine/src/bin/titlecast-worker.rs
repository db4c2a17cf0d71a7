//! titlecast-worker: drives a title sink from presence events on stdin.
//!
//! Reads newline-delimited JSON presence events
//! (`{"account": "...", "activities": [...]}`), ticks the update engine at
//! frame cadence, and writes title commands to stdout (or a webhook).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Notify;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use titlecast_core::config::load_dotenv;
use titlecast_core::{Config, PresenceEvent};
use titlecast_engine::{StaticFeed, UpdateEngine};
use titlecast_rules::defaults::default_rules;
use titlecast_rules::loader::RuleSetLoader;
use titlecast_rules::SharedRuleSet;
use titlecast_sink::{SinkWorker, StdoutSink, TitleSink, WebhookSink};

// ── CLI ─────────────────────────────────────────────────────────────

/// Presence-to-title worker. Flags override the TITLECAST_* environment.
#[derive(Parser, Debug)]
#[command(name = "titlecast-worker", version, about)]
struct Cli {
    /// Only accept presence events for this account (exact match).
    #[arg(long, env = "TITLECAST_ACCOUNT")]
    account: Option<String>,

    /// YAML rule file. The built-in rules are used when unset.
    #[arg(long, env = "TITLECAST_RULES_FILE")]
    rules_file: Option<PathBuf>,

    /// Do not reload the rule file when it changes.
    #[arg(long)]
    no_watch: bool,

    /// POST titles to this URL instead of printing them.
    #[arg(long, env = "TITLECAST_WEBHOOK_URL")]
    webhook_url: Option<String>,

    #[arg(long, env = "TITLECAST_THROTTLE_MS")]
    throttle_ms: Option<u64>,

    #[arg(long, env = "TITLECAST_MAX_TITLE_LENGTH")]
    max_title_length: Option<usize>,

    /// Grant the gradient title feature.
    #[arg(long)]
    gradient_feature: bool,

    /// Start with title updates disabled.
    #[arg(long)]
    disabled: bool,

    /// Host tick interval in milliseconds.
    #[arg(long, env = "TITLECAST_TICK_MS", default_value_t = 16)]
    tick_ms: u64,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(account) = &self.account {
            config.engine.account = Some(account.clone()).filter(|a| !a.is_empty());
        }
        if let Some(path) = &self.rules_file {
            config.rules.file = Some(path.clone());
        }
        if self.no_watch {
            config.rules.watch = false;
        }
        if let Some(url) = &self.webhook_url {
            config.sink.webhook_url = Some(url.clone());
        }
        if let Some(ms) = self.throttle_ms {
            config.engine.throttle_ms = ms;
        }
        if let Some(max) = self.max_title_length {
            config.engine.max_title_length = max;
        }
        if self.gradient_feature {
            config.engine.gradient_feature = true;
        }
        if self.disabled {
            config.engine.enabled = false;
        }
    }
}

// ── Presence feed ───────────────────────────────────────────────────

/// Feed stdin events into the engine until EOF, then signal shutdown.
async fn read_presence(engine: Arc<UpdateEngine>, shutdown: Arc<Notify>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let result = loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(e) => break Err(e.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        match PresenceEvent::from_json_line(&line) {
            Ok(event) => {
                let outcome = engine.on_presence_snapshot(&event.account, &event.snapshot);
                debug!(account = %event.account, ?outcome, "presence event applied");
            }
            Err(e) => warn!(error = %e, "skipping malformed presence event"),
        }
    };

    shutdown.notify_one();
    result
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // stdout carries title commands, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    cli.apply(&mut config);
    config.log_summary();

    let rules = SharedRuleSet::new(default_rules());
    let _loader = match &config.rules.file {
        Some(path) => {
            let mut loader = RuleSetLoader::new(path.clone(), rules.clone());
            match loader.load() {
                Ok(count) => info!(path = %path.display(), count, "loaded rule file"),
                Err(e) => warn!(error = %e, path = %path.display(), "failed to load rule file, using defaults"),
            }
            if config.rules.watch {
                loader.watch()?;
            }
            Some(loader)
        }
        None => None,
    };

    let sink: Arc<dyn TitleSink> = match &config.sink.webhook_url {
        Some(url) => Arc::new(WebhookSink::new(url, HashMap::new())?),
        None => Arc::new(StdoutSink::new()),
    };
    let (handle, sink_task) = SinkWorker::spawn(sink);

    let engine = Arc::new(UpdateEngine::new(
        &config.engine,
        rules,
        handle.clone(),
        Arc::new(StaticFeed::new()),
    ));
    engine.start().await?;

    let shutdown = Arc::new(Notify::new());
    let feed_task = tokio::spawn(read_presence(engine.clone(), shutdown.clone()));

    let mut ticker = tokio::time::interval(Duration::from_millis(cli.tick_ms.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut last = Instant::now();

    info!(tick_ms = cli.tick_ms, "titlecast-worker running");
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                engine.on_tick(now - last);
                last = now;
            }
            _ = shutdown.notified() => {
                info!("presence feed closed");
                break;
            }
            _ = &mut ctrl_c => {
                info!("interrupt received");
                break;
            }
        }
    }

    engine.stop().await?;
    feed_task.abort();
    handle.shutdown();
    sink_task.await?;
    info!("titlecast-worker exited cleanly");

    Ok(())
}
