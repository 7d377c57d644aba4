use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use reportgen_core::{update, AppState, FileDescriptor, Msg, Phase};
use reportgen_engine::{check_health_blocking, EngineHandle};
use reportgen_logging::{report_info, report_warn};

use super::cli::{Cli, Command, GenerateArgs, HealthArgs};
use super::config::{self, ClientConfig};
use super::effects::EffectRunner;
use super::{logging, ui};

const TICK: Duration = Duration::from_millis(75);

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let loaded = config::load(cli.config.as_deref())?;
    logging::initialize(loaded.config.log_destination);
    if let Some(warning) = &loaded.warning {
        report_warn!("{}", warning);
    }

    match cli.command {
        Command::Generate(args) => generate(&loaded.config, &args),
        Command::Health(args) => health(&loaded.config, &args),
    }
}

fn generate(config: &ClientConfig, args: &GenerateArgs) -> anyhow::Result<()> {
    let settings = config.engine_settings(args.endpoint.as_deref());
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());
    let engine = EngineHandle::new(settings);
    let mut session = Session::new(EffectRunner::new(engine, output_dir));
    run_generate(&mut session, args)
}

/// Drives one request through the session: submit, follow the stages, export.
fn run_generate(session: &mut Session, args: &GenerateArgs) -> anyhow::Result<()> {
    let file = describe_file(&args.file)?;
    session.dispatch(Msg::FileSelected(file));
    if let Some(rejection) = session.runner.take_rejection() {
        bail!("{}: {rejection}", args.file.display());
    }
    session.dispatch(Msg::TopicChanged(args.topic.clone()));
    if !session.state.can_submit() {
        bail!("a non-empty --topic is required");
    }

    session.dispatch(Msg::SubmitClicked);
    let deadline = args
        .deadline_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    session.wait_for_outcome(deadline);

    match session.state.phase() {
        Phase::Succeeded(_) => {}
        Phase::Failed(err) => bail!("report generation failed: {err}"),
        _ => bail!("request cancelled after {}s", args.deadline_secs.unwrap_or(0)),
    }

    for format in args.format.formats() {
        session.dispatch(Msg::ExportRequested(*format));
    }
    if args.view {
        session.dispatch(Msg::ViewResultClicked);
        session.dispatch(Msg::OverlayClosed);
    }

    for path in session.runner.saved() {
        println!("Saved {}", path.display());
    }
    if let Some(failure) = session.runner.failures().first() {
        bail!("{failure}");
    }
    Ok(())
}

fn health(config: &ClientConfig, args: &HealthArgs) -> anyhow::Result<()> {
    let settings = config.client_settings(args.endpoint.as_deref());
    let report = check_health_blocking(&settings)
        .with_context(|| format!("health check against {} failed", settings.endpoint))?;

    let service = report.service.as_deref().unwrap_or("pipeline service");
    match report.version.as_deref() {
        Some(version) => println!("{service} {version}: {}", report.status),
        None => println!("{service}: {}", report.status),
    }
    if !report.is_healthy() {
        bail!("service reports status {:?}", report.status);
    }
    Ok(())
}

fn describe_file(path: &Path) -> anyhow::Result<FileDescriptor> {
    let meta =
        fs::metadata(path).with_context(|| format!("cannot read {}", path.display()))?;
    if !meta.is_file() {
        bail!("{} is not a file", path.display());
    }
    Ok(FileDescriptor::from_path(path, meta.len()))
}

/// Owns the state value and feeds it messages, the only place `update` is called.
struct Session {
    state: AppState,
    runner: EffectRunner,
    last_frame: Vec<String>,
}

impl Session {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            last_frame: Vec::new(),
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;

        self.runner.run(effects);
        if was_dirty {
            self.render(ui::render::render(&view));
        }
    }

    fn render(&mut self, frame: Vec<String>) {
        if frame == self.last_frame {
            return;
        }
        // Only the lines that changed, so progress reads like a log.
        for (i, line) in frame.iter().enumerate() {
            if self.last_frame.get(i) != Some(line) {
                println!("{line}");
            }
        }
        self.last_frame = frame;
    }

    /// Pumps engine events until the request ends or the deadline cancels it.
    fn wait_for_outcome(&mut self, deadline: Option<Instant>) {
        while self.state.in_flight().is_some() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                report_info!("Deadline reached, cancelling");
                self.dispatch(Msg::CancelClicked);
                break;
            }
            match self.runner.next_message(TICK) {
                Some(msg) => self.dispatch(msg),
                None => self.dispatch(Msg::Tick),
            }
        }
    }
}
