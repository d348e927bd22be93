use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use sales_console::api::{Backend, HttpBackend};
use sales_console::config::ConsoleConfig;
use sales_console::connectors::integrations_overview;
use sales_console::leads::{LeadBoard, LeadFilter};
use sales_console::models::{Hotness, Role};
use sales_console::notify::TracingNotifier;
use sales_console::session::SessionContext;
use sales_console::wizard::TestChat;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ConsoleConfig::from_env()?;

    let session = SessionContext::new();
    match config.token.clone() {
        Some(token) => session.login(token).await,
        None => eprintln!("Warning: SALES_CONSOLE_TOKEN not set, every request will be refused"),
    }

    eprintln!("Sales console v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.api_url);
    eprintln!("   Commands: /status, /leads [hot|warm|cold], /reset, /quit");
    eprintln!("   Anything else is sent to the test chat.\n");

    let backend: Arc<dyn Backend> = Arc::new(HttpBackend::new(config, session.clone())?);
    let notifier = Arc::new(TracingNotifier);

    let greeting = match backend.get_config().await {
        Ok(remote) => remote.settings.greeting_message,
        Err(e) => {
            tracing::warn!(error = %e, "Could not load agent settings, using default greeting");
            None
        }
    };
    let mut chat = TestChat::new(greeting.as_deref());
    print_last(&chat);

    let mut leads = LeadBoard::new(backend.clone(), notifier);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            eprint!("> ");
            continue;
        }

        let mut words = line.split_whitespace();
        match words.next() {
            Some("/quit") => break,
            Some("/reset") => {
                chat.reset();
                print_last(&chat);
            }
            Some("/status") => match integrations_overview(backend.as_ref()).await {
                Ok(status) => {
                    let connected = status.connected();
                    if connected.is_empty() {
                        println!("No channels connected");
                    }
                    for kind in connected {
                        let identifier = status.get(kind).identifier.clone().unwrap_or_default();
                        println!("  {:<14} {identifier}", kind.to_string());
                    }
                }
                Err(e) => eprintln!("Error: {}", e.user_message()),
            },
            Some("/leads") => {
                let hotness = match words.next().map(str::parse::<Hotness>) {
                    None => None,
                    Some(Ok(h)) => Some(h),
                    Some(Err(e)) => {
                        eprintln!("{e}");
                        eprint!("> ");
                        continue;
                    }
                };
                if leads.load().await.is_ok() {
                    let filter = LeadFilter {
                        hotness,
                        ..Default::default()
                    };
                    for lead in leads.filter(&filter) {
                        println!(
                            "  {:<10} {:<20} {:<16} {:<10} {}",
                            lead.id,
                            lead.name.as_deref().unwrap_or("-"),
                            lead.phone.as_deref().unwrap_or("-"),
                            lead.status,
                            lead.product.as_deref().unwrap_or("-"),
                        );
                    }
                    let summary = leads.summary();
                    println!(
                        "hot {} / warm {} / cold {} / unrated {}",
                        summary.hot, summary.warm, summary.cold, summary.unrated
                    );
                }
            }
            _ => {
                chat.send(backend.as_ref(), line).await?;
                print_last(&chat);
            }
        }
        eprint!("> ");
    }

    session.logout().await;
    Ok(())
}

fn print_last(chat: &TestChat) {
    let Some(entry) = chat.transcript().last() else {
        return;
    };
    if entry.role != Role::Assistant {
        return;
    }
    if entry.is_error {
        println!("\n{}\n", entry.text);
        return;
    }
    println!("\n{}", entry.text);
    if let Some(debug) = &entry.debug {
        println!(
            "   stage: {}  hotness: {}  score: {}",
            debug.sales_stage.as_deref().unwrap_or("-"),
            debug.hotness.map(|h| format!("{h:?}")).unwrap_or_else(|| "-".into()),
            debug.score.map(|s| format!("{s:.0}")).unwrap_or_else(|| "-".into()),
        );
        if !debug.sources_used.is_empty() {
            println!("   sources: {}", debug.sources_used.join(", "));
        }
    }
    println!();
}
