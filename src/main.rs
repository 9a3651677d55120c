use std::process;

use caching_fetch::{
    config::{self, HydrateArgs, PrefetchArgs},
    fetch::{CachingFetch, FetchState},
    infra::{error::AppError, telemetry},
};
use serde::Serialize;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    let fetch = CachingFetch::from_settings(&settings)?;

    match cli_args.command {
        config::Command::Prefetch(args) => run_prefetch(fetch, args).await,
        config::Command::Hydrate(args) => run_hydrate(fetch, args).await,
    }
}

async fn run_prefetch(fetch: CachingFetch, args: PrefetchArgs) -> Result<(), AppError> {
    for key in &args.keys {
        fetch.preload_caching_fetch(key).await;
    }

    let snapshot = fetch.serialize_cache();
    if snapshot.is_fallback() {
        warn!(
            target = "caching_fetch::prefetch",
            "cache could not be encoded, emitting fallback payload"
        );
    }

    match args.output {
        Some(path) => {
            tokio::fs::write(&path, snapshot.text()).await?;
            info!(
                target = "caching_fetch::prefetch",
                entries = fetch.store().len(),
                path = %path.display(),
                "Wrote serialized cache"
            );
        }
        None => println!("{}", snapshot.text()),
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct KeyReport {
    key: String,
    #[serde(flatten)]
    state: FetchState,
}

async fn run_hydrate(fetch: CachingFetch, args: HydrateArgs) -> Result<(), AppError> {
    let serialized = tokio::fs::read_to_string(&args.input).await?;

    // A rejected payload leaves the store empty; every key is then fetched.
    if let Ok(entries) = fetch.initialize_cache(&serialized) {
        info!(
            target = "caching_fetch::hydrate",
            entries,
            path = %args.input.display(),
            "Initialized cache"
        );
    }

    let mut hooks: Vec<_> = args
        .keys
        .iter()
        .map(|key| fetch.use_caching_fetch(key.as_str()))
        .collect();

    let mut reports = Vec::with_capacity(hooks.len());
    for hook in &mut hooks {
        let state = hook.settled().await;
        reports.push(KeyReport {
            key: hook.key().to_string(),
            state,
        });
    }

    let rendered = serde_json::to_string_pretty(&reports)
        .map_err(|err| AppError::unexpected(format!("failed to render report: {err}")))?;
    println!("{rendered}");

    Ok(())
}
