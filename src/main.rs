#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::io;
use std::process;
use std::sync::Arc;

use anyhow::Error;
use anyhow::Result;
use domain::models::Action;
use domain::models::Event;
use domain::models::Prompts;
use domain::models::UiState;
use domain::services::EngineSession;
use domain::services::GenerationService;
use tokio::sync::mpsc;
use tokio::task;
use yansi::Paint;

use crate::application::cli;
use crate::application::cli::RunMode;
use crate::application::headless;
use crate::application::ui;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::actions::ActionsService;

fn handle_error(err: Error) {
    eprintln!(
            "{}",
            Paint::red(format!(
                "Oh no! Aleph has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {:#}",
                env!("CARGO_PKG_VERSION"),
                env!("VERGEN_GIT_DESCRIBE"),
                err
            ))
        );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

fn generation_from_config() -> Result<(Arc<EngineSession>, Prompts, GenerationService)> {
    let session = Arc::new(EngineSession::from_config()?);
    let prompts = Prompts::new(
        &Config::get(ConfigKey::SystemPrompt),
        &Config::get(ConfigKey::UserRequest),
    );
    let generation = GenerationService::new(
        session.clone(),
        prompts.clone(),
        Config::generation_options()?,
    );

    return Ok((session, prompts, generation));
}

async fn start_generate() -> Result<()> {
    let (_, _, generation) = generation_from_config()?;

    let res = headless::run(&generation, &mut io::stdout(), &mut io::stderr()).await;
    if let Err(err) = res {
        eprintln!("{}", Paint::red(err.to_string()));
        process::exit(1);
    }

    return Ok(());
}

async fn start_chat() -> Result<()> {
    let (session, prompts, generation) = generation_from_config()?;

    let mut initial_state = UiState::Idle;
    if let Err(err) = session.health_check().await {
        tracing::warn!(error = ?err, "Backend health check failed");
        initial_state = UiState::Error(format!("{err:#}"));
    }

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let generation = Arc::new(generation);
    let mut background_futures = task::JoinSet::new();
    background_futures.spawn(async move {
        return ActionsService::start(generation, event_tx, &mut action_rx).await;
    });

    let ui_future = ui::start(action_tx, event_rx, prompts, initial_state);

    let res = tokio::select!(
        res = background_futures.join_next() => match res {
            Some(Ok(res)) => res,
            Some(Err(err)) => Err(err.into()),
            None => Ok(()),
        },
        res = ui_future => res,
    );

    if res.is_err() {
        ui::destruct_terminal_for_panic();
    }

    return res;
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let debug_log_dir = env::var("ALEPH_LOG_DIR").unwrap_or_else(|_| {
        return dirs::cache_dir()
            .unwrap_or_else(|| return env::temp_dir())
            .join("aleph")
            .to_string_lossy()
            .to_string();
    });

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("aleph")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let run_mode = match cli::parse().await {
        Ok(run_mode) => run_mode,
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    let res = match run_mode {
        RunMode::Exit => Ok(()),
        RunMode::Generate => start_generate().await,
        RunMode::Chat => start_chat().await,
    };

    if let Err(err) = res {
        handle_error(err);
    }

    process::exit(0);
}
