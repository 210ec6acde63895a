//! batinfo
//!
//! Battery status screen for Linux handhelds and laptops. Shows the charge
//! state, an estimate of the current charge and remaining time, and lets the
//! user enter the measured capacity and health of a replaced battery.
//!
//! `--once` prints the report to stdout instead of starting the TUI.

mod app;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use app::App;
use batinfo_config::{AppConfig, DeviceCatalog, OverrideStore, UserOverrides, user_config_dir};
use batinfo_estimate::{BatteryReport, ReportInputs};
use batinfo_hal::{ModelProbe, MockPower, PowerManager, PowerSnapshot, PowerSource};

const LOG_FILE: &str = "batinfo.log";

/// Battery status screen
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Environment variables prefixed with BATINFO_ override configuration values.")]
struct Args {
    /// Print the battery report and exit
    #[arg(long)]
    once: bool,

    /// Print the battery report as JSON and exit
    #[arg(long)]
    json: bool,

    /// Configuration file to load
    #[arg(short, long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
}

impl Args {
    /// Whether to print instead of starting the TUI
    fn print_only(&self) -> bool {
        self.once || self.json
    }
}

/// Setup logging to stderr, or to a file while the TUI owns the terminal
fn setup_logging(to_file: bool) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if !to_file {
        registry
            .with(fmt::layer().with_target(false).with_writer(io::stderr))
            .init();
        return;
    }

    let dir = user_config_dir();
    let file = std::fs::create_dir_all(&dir).and_then(|_| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE))
    });

    match file {
        Ok(file) => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        // Nowhere to write without corrupting the screen
        Err(_) => registry
            .with(fmt::layer().with_writer(io::sink))
            .init(),
    }
}

fn load_config(args: &Args) -> Result<AppConfig> {
    match &args.config_path {
        Some(path) => AppConfig::load_layered(Some(path.as_path()))
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => AppConfig::load_default().context("Failed to load configuration"),
    }
}

/// Bundled catalog unless an external one is configured; empty on failure
fn load_catalog(config: &AppConfig) -> DeviceCatalog {
    let result = match &config.catalog_path {
        Some(path) => DeviceCatalog::from_file(path),
        None => DeviceCatalog::bundled(),
    };

    result.unwrap_or_else(|e| {
        warn!("Failed to load device catalog: {}", e);
        DeviceCatalog::empty()
    })
}

fn power_source(config: &AppConfig) -> Result<Arc<dyn PowerSource>> {
    if config.mock_power {
        info!("Using mock power source");
        return Ok(Arc::new(MockPower::new()));
    }

    let power = PowerManager::with_config(config.power.clone())
        .context("Failed to initialize power supply")?;

    Ok(Arc::new(power))
}

/// Print the report once and exit
fn print_report(
    config: &AppConfig,
    catalog: &DeviceCatalog,
    model: Option<&str>,
    source: &dyn PowerSource,
    json: bool,
) -> Result<()> {
    let snapshot = source.snapshot().unwrap_or_else(|e| {
        warn!("Failed to read power state: {}", e);
        PowerSnapshot::default()
    });

    let store = OverrideStore::new(config.overrides_path());
    let overrides = store.load().unwrap_or_else(|e| {
        warn!("Failed to read overrides: {}", e);
        UserOverrides::default()
    });

    let report = BatteryReport::build(&ReportInputs {
        model,
        spec: catalog.resolve(model),
        snapshot: &snapshot,
        overrides: &overrides,
        language: config.language,
    });

    if json {
        let output = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{}", output);
    } else {
        print!("{}", report);
    }

    Ok(())
}

fn run_tui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app);

    // Restore terminal even if the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        app.on_tick();
        terminal.draw(|f| ui::draw_ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        app.should_quit = true;
                    } else {
                        app.handle_input(key.code);
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(!args.print_only());

    info!("batinfo v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(&args)?;
    let catalog = load_catalog(&config);
    let model = ModelProbe::default().detect(config.device_model.as_deref());
    let source = power_source(&config)?;

    if args.print_only() {
        return print_report(&config, &catalog, model.as_deref(), source.as_ref(), args.json);
    }

    let mut app = App::new(config, catalog, model, source);
    run_tui(&mut app)?;

    info!("batinfo exiting");
    Ok(())
}
