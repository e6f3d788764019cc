use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{self, ConfigError};
use crate::contract::{QueryResponse, SelectionDto};
use crate::core_service::{self, Launcher, Mode, ServiceError};
use crate::discovery::{DesktopEntryProvider, DiscoveryProvider, LineProvider, PathProvider};
use crate::logging;
use crate::session::{KeyAction, Selection, SessionEvent};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Service(#[from] ServiceError),
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Parser)]
#[command(name = "sift", version, about = "Filter and rank launcher candidates")]
pub struct CliOptions {
    #[arg(long, value_enum, default_value_t = Mode::Drun, help = "Candidate source.")]
    pub mode: Mode,

    #[arg(long, help = "Config file (TOML, or JSON5 for .json5/.json).")]
    pub config: Option<PathBuf>,

    #[arg(
        long = "option",
        short = 'o',
        value_name = "KEY=VALUE",
        help = "Override a config option, e.g. `--option matching-algorithm=fuzzy`."
    )]
    pub overrides: Vec<String>,

    #[arg(
        long,
        default_value = "",
        help = "Text typed into the search box, one keystroke per character."
    )]
    pub query: String,

    #[arg(long, default_value_t = 0, help = "Move the selection down this many times.")]
    pub down: usize,

    #[arg(long, help = "Submit the selection, print it, and record it in history.")]
    pub submit: bool,

    #[arg(long, help = "Print JSON instead of one name per line.")]
    pub json: bool,

    #[arg(
        long,
        value_name = "NAME",
        help = "Remove an entry from the history ledger and exit."
    )]
    pub forget: Option<String>,
}

pub fn parse_cli_args<I, T>(args: I) -> Result<CliOptions, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    CliOptions::try_parse_from(args)
}

pub fn load_config(options: &CliOptions) -> Result<config::Config, ConfigError> {
    let base = config::load(options.config.as_deref())?;
    let cfg = config::apply_overrides(base, &options.overrides)?;
    if let Err(error) = logging::init(&cfg.state_dir, cfg.log_level) {
        eprintln!("[sift] logging disabled: {error}");
    }
    Ok(cfg)
}

pub fn run_with_options(options: CliOptions, cfg: config::Config) -> Result<(), RuntimeError> {
    log::info!(
        "startup mode={} algorithm={} state_dir={}",
        options.mode.as_str(),
        cfg.matching_algorithm,
        cfg.state_dir.display()
    );

    let provider = provider_for(options.mode);
    let store = core_service::load_store(&cfg, options.mode, provider.as_ref())?;
    let mut launcher = Launcher::new(cfg, options.mode, store)?;

    if let Some(name) = &options.forget {
        let removed = launcher.forget(name)?;
        log::info!("forget {name:?}: removed={removed}");
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut event = SessionEvent::Continue;
    let keystrokes = options
        .query
        .chars()
        .map(KeyAction::Insert)
        .chain(std::iter::repeat(KeyAction::SelectNext).take(options.down));
    for action in keystrokes {
        event = launcher.handle(action);
        if event != SessionEvent::Continue {
            break;
        }
    }
    if options.submit && event == SessionEvent::Continue {
        event = launcher.handle(KeyAction::Submit);
    }

    match event {
        SessionEvent::Submit(selection) => {
            launcher.commit(&selection)?;
            write_selection(&mut out, selection, options.json)?;
        }
        SessionEvent::Cancel => {}
        SessionEvent::Continue if options.submit => {
            log::info!("submit with no selectable result");
        }
        SessionEvent::Continue => write_results(&mut out, &launcher, options.json)?,
    }
    out.flush()?;
    Ok(())
}

fn provider_for(mode: Mode) -> Box<dyn DiscoveryProvider> {
    match mode {
        Mode::Run => Box::new(PathProvider::from_env()),
        Mode::Drun => Box::new(DesktopEntryProvider::from_env()),
        Mode::Dmenu => Box::new(LineProvider::new(std::io::stdin().lock())),
    }
}

fn write_results(out: &mut impl Write, launcher: &Launcher, json: bool) -> Result<(), RuntimeError> {
    let session = launcher.session();
    if json {
        let response = QueryResponse::from_session(session);
        serde_json::to_writer(&mut *out, &response)?;
        writeln!(out)?;
        return Ok(());
    }

    let selected = session.selection();
    for (row_index, row) in session.visible_results().enumerate() {
        let marker = if row_index == selected { '>' } else { ' ' };
        writeln!(out, "{marker} {}", row.name)?;
    }
    Ok(())
}

fn write_selection(out: &mut impl Write, selection: Selection, json: bool) -> Result<(), RuntimeError> {
    if json {
        serde_json::to_writer(&mut *out, &SelectionDto::from(selection))?;
        writeln!(out)?;
        return Ok(());
    }
    match selection {
        Selection::Candidate { id, .. } => writeln!(out, "{id}")?,
        Selection::Text(text) => writeln!(out, "{text}")?,
    }
    Ok(())
}
