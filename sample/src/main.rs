use std::sync::Arc;

use anyhow::{bail, Context, Result};
use apiclient_core::Dispatcher;
use apiclient_sample::{config_for, run_verb, BusyIndicator, DisplaySink, LogSink, Verb};
use clap::Parser;
use tokio::task::JoinSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "api-sample", about = "Send sample requests to an httpbin-compatible server")]
struct Cli {
    /// Server every request goes to.
    #[arg(long, env = "API_SAMPLE_BASE_URL", default_value = "https://httpbin.org")]
    base_url: String,
    /// Deadline for each request, in milliseconds.
    #[arg(long, default_value_t = 10_000)]
    timeout_ms: u64,
    /// Bearer token attached to every request.
    #[arg(long)]
    token: Option<String>,
    /// Verbs to send. All six when omitted.
    #[arg(value_enum)]
    verbs: Vec<Verb>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,apiclient_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let verbs = if cli.verbs.is_empty() {
        Verb::ALL.to_vec()
    } else {
        cli.verbs
    };

    let dispatcher = Dispatcher::new().context("creating dispatcher")?;
    let busy = BusyIndicator::new();
    let sink: Arc<dyn DisplaySink> = Arc::new(LogSink);

    // Each request runs detached; the join below only collects the verdicts.
    let mut tasks = JoinSet::new();
    for verb in verbs {
        let config = config_for(&cli.base_url, verb, cli.timeout_ms, cli.token.as_deref())
            .with_context(|| format!("building {verb} request"))?;
        tracing::info!("Sending {verb} request...");

        let dispatcher = dispatcher.clone();
        let hook = busy.hook();
        let sink = Arc::clone(&sink);
        tasks.spawn(async move { run_verb(&dispatcher, &config, verb, Some(&hook), sink.as_ref()).await });
    }

    let mut failed = 0usize;
    while let Some(joined) = tasks.join_next().await {
        if !joined.context("request task panicked")? {
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{failed} request(s) failed");
    }
    Ok(())
}
