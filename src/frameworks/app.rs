// Framework bootstrap: logging, wiring of the simulation core, and run/exit.

use crate::domain::geometry::{DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH};
use crate::domain::{
    DifficultyConfig, EndReason, InputSource, PresentationSink, RunReport, StartupError, TaskKind,
    TaskLauncher,
};
use crate::frameworks::cli::Cli;
use crate::frameworks::config;
use crate::interface_adapters::input::{IdleInput, KeyboardInput};
use crate::interface_adapters::report::{render_json, render_text};
use crate::interface_adapters::terminal::{HeadlessSink, TerminalSink};
use crate::use_cases::{
    LoopHandles, Publisher, ShutdownReport, Supervisor, TokioLauncher, World, WorldSettings,
    orchestrate, run_reloader, spawn_input_loop,
};

use clap::Parser;
use futures::FutureExt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::OpenOptions;
use std::io::Result;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

fn init_runtime(headless: bool) {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // The terminal belongs to the presentation sink while a run is interactive.
    let file = config::log_file().and_then(|path| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .inspect_err(|e| eprintln!("cannot open log file {}: {e}", path.display()))
            .ok()
    });
    let writer = match file {
        Some(file) => BoxMakeWriter::new(Mutex::new(file)),
        None if headless => BoxMakeWriter::new(std::io::stderr),
        None => BoxMakeWriter::new(std::io::sink),
    };

    if config::json_logs() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(writer)
            .json()
            .with_current_span(true)
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(writer)
            .with_ansi(false)
            .compact()
            .try_init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

#[derive(Debug, Clone, Copy)]
pub struct RunSettings {
    pub world: WorldSettings,
    pub frame_interval: Duration,
    pub input_poll: Duration,
    pub seed: Option<u64>,
}

impl RunSettings {
    pub fn new(difficulty: DifficultyConfig) -> Self {
        Self {
            world: WorldSettings::new(difficulty),
            frame_interval: config::frame_interval(),
            input_poll: config::input_poll(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub end: EndReason,
    pub report: RunReport,
    pub shutdown: ShutdownReport,
}

pub struct RunOutcome<S> {
    pub summary: RunSummary,
    pub sink: S,
}

/// Plays one run to completion and joins every task it started.
pub async fn run<S, I>(
    settings: RunSettings,
    sink: S,
    input: I,
) -> std::result::Result<RunOutcome<S>, StartupError>
where
    S: PresentationSink,
    I: InputSource + 'static,
{
    let world = World::new(settings.world);
    let launcher: Arc<dyn TaskLauncher> = Arc::new(TokioLauncher);

    let reloader = launcher
        .launch(TaskKind::Reloader, run_reloader(world.clone()).boxed())
        .map_err(|source| StartupError::LoopLaunch {
            name: "replenishment",
            source,
        })?;

    let input = match spawn_input_loop(
        world.clone(),
        launcher.clone(),
        input,
        settings.input_poll,
    ) {
        Ok(handle) => handle,
        Err(source) => {
            world.terminate(EndReason::Shutdown);
            let _ = reloader.await;
            return Err(StartupError::LoopLaunch {
                name: "input",
                source,
            });
        }
    };

    let rng = settings
        .seed
        .map(StdRng::seed_from_u64)
        .unwrap_or_else(StdRng::from_entropy);
    let mut supervisor = Supervisor::new(world.clone(), launcher, rng);
    let mut publisher = Publisher::new(world.clone(), sink);

    let end = orchestrate(&mut supervisor, &mut publisher, settings.frame_interval).await;
    let shutdown = supervisor
        .shutdown(LoopHandles {
            input: Some(input),
            reloader: Some(reloader),
        })
        .await;

    let report = RunReport::new(world.difficulty().level, world.counters());
    tracing::info!(
        score = report.score,
        destroyed = report.destroyed,
        escaped = report.escaped,
        verdict = ?report.verdict,
        "run finished"
    );

    Ok(RunOutcome {
        summary: RunSummary {
            end,
            report,
            shutdown,
        },
        sink: publisher.into_sink(),
    })
}

pub async fn run_with_config() -> Result<()> {
    let cli = Cli::parse();
    init_runtime(cli.headless);

    let mut settings = RunSettings::new(cli.difficulty.config());
    settings.seed = cli.seed;
    tracing::debug!(
        difficulty = %cli.difficulty,
        headless = cli.headless,
        frame_interval_ms = settings.frame_interval.as_millis(),
        input_poll_ms = settings.input_poll.as_millis(),
        "run configured"
    );

    let summary = if cli.headless {
        let sink = HeadlessSink::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT);
        run(settings, sink, IdleInput).await.map(|outcome| {
            tracing::debug!(frames = outcome.sink.frames(), "headless run presented");
            outcome.summary
        })
    } else {
        let sink = TerminalSink::new().map_err(|e| {
            let e = StartupError::Terminal(e);
            tracing::error!(error = %e, "run aborted");
            std::io::Error::other(e)
        })?;
        // Dropping the sink restores the terminal before the report is printed.
        run(settings, sink, KeyboardInput).await.map(|outcome| outcome.summary)
    }
    .map_err(|e| {
        tracing::error!(error = %e, "run aborted");
        std::io::Error::other(e)
    })?;

    let text = if cli.json {
        render_json(&summary.report).map_err(std::io::Error::other)?
    } else {
        render_text(&summary.report)
    };
    println!("{text}");
    Ok(())
}
