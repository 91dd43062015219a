//! # askany
//!
//! Terminal client for AskAny live Q&A sessions.
//!
//! - `create` starts a session and prints its share link
//! - `watch` mounts a session view and prints the list on every change
//! - `ask`, `upvote`, `answer`, `spotlight` and `mode` act on one session
//! - `stats` prints the aggregate counters
//! - `forget` drops the local cache of a session

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use askany_client::commands::session::{create_session, fetch_stats};
use askany_client::poller::start_stats_polling;
use askany_client::render::{render_notice, render_stats, render_view};
use askany_client::{
    ApiClient, ClientConfig, EventSink, QuestionDraft, SessionClient, ViewEvent,
};
use askany_shared::constants::APP_NAME;
use askany_shared::{QuestionId, SessionMode, SessionSlug};
use askany_store::{KeyValueStore, LocalState, MemoryStore, SqliteStore};

#[derive(Debug, Parser)]
#[command(name = "askany", version, about = "Terminal client for AskAny live Q&A sessions")]
struct Cli {
    /// REST API base URL (overrides ASKANY_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory for the local store (overrides ASKANY_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep local state in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a session owned by this client
    Create,
    /// Follow a session until it closes or Ctrl+C
    Watch {
        slug: SessionSlug,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Submit a question
    Ask {
        slug: SessionSlug,
        content: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        anonymous: bool,
    },
    /// Upvote a question
    Upvote { slug: SessionSlug, id: QuestionId },
    /// Mark a question answered (owner only)
    Answer { slug: SessionSlug, id: QuestionId },
    /// Toggle a question's spotlight (owner only)
    Spotlight { slug: SessionSlug, id: QuestionId },
    /// Set the session mode, or toggle it when omitted (owner only)
    Mode {
        slug: SessionSlug,
        mode: Option<SessionMode>,
    },
    /// Print aggregate stats
    Stats {
        /// Keep refreshing on the stats interval
        #[arg(long)]
        watch: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print the share link of a session
    Link { slug: SessionSlug },
    /// Drop everything stored locally for a session
    Forget { slug: SessionSlug },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,askany_client=info,askany_store=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    debug!("{} client v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.api_url {
        config = config
            .with_api_url(url)
            .with_context(|| format!("invalid --api-url {url:?}"))?;
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }

    let api = Arc::new(ApiClient::from_config(&config)?);
    let local = LocalState::new(open_store(&config, cli.ephemeral)?);

    match cli.command {
        Command::Create => {
            let slug = create_session(&api, &local).await?;
            println!("{slug}");
            println!("{}", config.share_link(&slug));
        }

        Command::Watch { slug, json } => watch(api, local, &config, slug, json).await?,

        Command::Ask {
            slug,
            content,
            name,
            anonymous,
        } => {
            let session = open_session(api, local, slug).await?;
            let mut draft = QuestionDraft::new(content);
            if let Some(name) = name {
                draft = draft.with_nickname(name);
            }
            if anonymous {
                draft = draft.anonymous();
            }
            let question = session.submit_question(draft).await?;
            println!("#{} {}", question.id, question.content);
        }

        Command::Upvote { slug, id } => {
            let session = open_session(api, local, slug).await?;
            let question = session.upvote(&id).await?;
            println!("#{} ^{}", question.id, question.upvote_count);
        }

        Command::Answer { slug, id } => {
            let session = open_session(api, local, slug).await?;
            let question = session.mark_answered(&id).await?;
            println!("#{} answered", question.id);
        }

        Command::Spotlight { slug, id } => {
            let session = open_session(api, local, slug).await?;
            let question = session.toggle_spotlight(&id).await?;
            let state = if question.spotlighted() { "on" } else { "off" };
            println!("#{} spotlight {state}", question.id);
        }

        Command::Mode { slug, mode } => {
            let session = open_session(api, local, slug).await?;
            let updated = match mode {
                Some(mode) => session.set_mode(mode).await?,
                None => session.toggle_mode().await?,
            };
            println!("{} is now in {} mode", updated.slug, updated.mode);
        }

        Command::Stats { watch, json } => {
            if watch {
                watch_stats(api, &config, json).await?;
            } else {
                let stats = fetch_stats(&api).await;
                if json {
                    println!("{}", serde_json::to_string(&stats)?);
                } else {
                    print!("{}", render_stats(&stats));
                }
            }
        }

        Command::Link { slug } => println!("{}", config.share_link(&slug)),

        Command::Forget { slug } => {
            local.forget_session(&slug)?;
            info!(slug = %slug, "local session data removed");
        }
    }

    Ok(())
}

fn open_store(config: &ClientConfig, ephemeral: bool) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    if ephemeral {
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = match &config.data_dir {
        Some(dir) => SqliteStore::open_in(dir)?,
        None => SqliteStore::new()?,
    };
    Ok(Arc::new(store))
}

/// Open a session and load it once so actions see the current list.
async fn open_session(
    api: Arc<ApiClient>,
    local: LocalState,
    slug: SessionSlug,
) -> anyhow::Result<SessionClient> {
    let session = SessionClient::open(api, local, slug.clone(), EventSink::disabled())?;
    session
        .refresh()
        .await
        .with_context(|| format!("could not load session {slug}"))?;
    Ok(session)
}

async fn watch(
    api: Arc<ApiClient>,
    local: LocalState,
    config: &ClientConfig,
    slug: SessionSlug,
    json: bool,
) -> anyhow::Result<()> {
    let (events, mut rx) = EventSink::channel();
    let session = Arc::new(SessionClient::open(api, local, slug.clone(), events)?);

    info!(slug = %slug, link = %config.share_link(&slug), "watching session");
    let handle = session.start_polling(config.poll_interval);

    let closed = tokio::select! {
        closed = print_events(&session, &mut rx, json) => closed?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, stopping");
            false
        }
    };

    handle.stop().await;

    if closed {
        bail!("session {slug} not found");
    }
    Ok(())
}

/// Print view events until the session closes. Returns `true` if it did.
async fn print_events(
    session: &SessionClient,
    rx: &mut mpsc::UnboundedReceiver<ViewEvent>,
    json: bool,
) -> anyhow::Result<bool> {
    while let Some(event) = rx.recv().await {
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            match &event {
                ViewEvent::Synced { .. } => print!("{}", render_view(&session.snapshot())),
                ViewEvent::Notice(notice) => eprintln!("{}", render_notice(notice)),
                ViewEvent::Closed { slug } => eprintln!("Session {slug} is gone"),
                ViewEvent::Stats(stats) => print!("{}", render_stats(stats)),
            }
        }
        if matches!(event, ViewEvent::Closed { .. }) {
            return Ok(true);
        }
    }
    Ok(false)
}

async fn watch_stats(api: Arc<ApiClient>, config: &ClientConfig, json: bool) -> anyhow::Result<()> {
    let (events, mut rx) = EventSink::channel();
    let handle = start_stats_polling(api, config.stats_interval, events);

    tokio::select! {
        _ = async {
            while let Some(event) = rx.recv().await {
                if let ViewEvent::Stats(stats) = event {
                    if json {
                        match serde_json::to_string(&stats) {
                            Ok(line) => println!("{line}"),
                            Err(e) => tracing::warn!(error = %e, "failed to encode stats"),
                        }
                    } else {
                        print!("{}", render_stats(&stats));
                    }
                }
            }
        } => {}
        _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, stopping"),
    }

    handle.stop().await;
    Ok(())
}
