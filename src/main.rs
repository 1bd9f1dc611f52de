use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing::{error, info};

use envwatch::forward::SHUTDOWN_GRACE;
use envwatch::logging::{self, LogTarget};
use envwatch::source::{self, list_ports};
use envwatch::ui::Theme;
use envwatch::{
    events, headless, ui, App, Dashboard, DataSource, Forwarder, Overrides, RecordProcessor,
    Settings, SourceConfig,
};

#[derive(Parser, Debug)]
#[command(name = "envwatch")]
#[command(about = "Live terminal dashboard for serial environmental sensor telemetry")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial port (defaults to the only port present)
    #[arg(short, long, conflicts_with_all = ["connect", "replay"])]
    port: Option<String>,

    /// Serial baud rate
    #[arg(short, long)]
    baud: Option<u32>,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Read lines from a TCP serial bridge instead (host:port)
    #[arg(short, long, conflicts_with_all = ["replay"])]
    connect: Option<String>,

    /// Replay a captured file of JSON lines
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Backend host receiving POST /data
    #[arg(long)]
    host: Option<String>,

    /// Backend port
    #[arg(long)]
    backend_port: Option<u16>,

    /// Do not forward records to the backend
    #[arg(long)]
    no_forward: bool,

    /// Temperature warning threshold (°C)
    #[arg(long)]
    temp_warn: Option<f64>,

    /// Air quality warning threshold (ppm)
    #[arg(long)]
    air_warn: Option<f64>,

    /// Sound level warning threshold (dB)
    #[arg(long)]
    sound_warn: Option<f64>,

    /// Maximum points kept per chart (0 keeps everything)
    #[arg(long)]
    history_limit: Option<usize>,

    /// UI refresh interval in milliseconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// Run without the terminal UI, logging to stderr
    #[arg(long)]
    headless: bool,

    /// Log file used by the terminal UI
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.list_ports {
        return print_ports();
    }

    let settings = Settings::resolve(args.config.as_deref(), &args.overrides())
        .context("Invalid configuration")?;

    let target = if args.headless {
        LogTarget::Stderr
    } else {
        LogTarget::File(&settings.logging.file)
    };
    logging::init(&settings.logging.level, target)?;

    // Forwarding and async sources share one multi-threaded runtime;
    // the UI loop stays on the main thread.
    let rt = Runtime::new()?;
    let _guard = rt.enter();

    let config = args.source_config(&settings);
    let source = match rt.block_on(source::open(&config)) {
        Ok(source) => source,
        Err(e) => {
            error!("{}", e);
            return Err(e).context("Failed to open data source");
        }
    };
    info!("Reading from {}", source.description());

    let forwarder = if settings.backend.enabled {
        let forwarder = Forwarder::new(
            &settings.backend.host,
            settings.backend.port,
            rt.handle().clone(),
        );
        info!("Forwarding records to {}", forwarder.url());
        Some(forwarder)
    } else {
        info!("Forwarding disabled");
        None
    };

    let processor = RecordProcessor::new(settings.thresholds(), forwarder);
    let dashboard = Dashboard::new(settings.display.history_limit);
    let refresh = Duration::from_millis(settings.display.refresh_ms.max(10));

    if args.headless {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        rt.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                flag.store(true, Ordering::SeqCst);
            }
        });

        let mut app = App::with_theme(source, processor, dashboard, Theme::dark());
        headless::run(&mut app, refresh, &stop);
        Ok(())
    } else {
        run_tui(source, processor, dashboard, refresh)
    }
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            port: self.port.clone(),
            baud_rate: self.baud,
            host: self.host.clone(),
            backend_port: self.backend_port,
            no_forward: self.no_forward,
            temperature: self.temp_warn,
            air_quality: self.air_warn,
            sound_level: self.sound_warn,
            history_limit: self.history_limit,
            refresh_ms: self.refresh,
            log_file: self.log_file.clone(),
        }
    }

    fn source_config(&self, settings: &Settings) -> SourceConfig {
        if let Some(ref addr) = self.connect {
            SourceConfig::Tcp(addr.clone())
        } else if let Some(ref path) = self.replay {
            SourceConfig::Replay(path.clone())
        } else {
            SourceConfig::Serial {
                port: settings.serial.port.clone(),
                baud_rate: settings.serial.baud_rate,
            }
        }
    }
}

fn print_ports() -> Result<()> {
    let ports = list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found");
    }
    for port in ports {
        println!("{}", port);
    }
    Ok(())
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    processor: RecordProcessor,
    dashboard: Dashboard,
    refresh_interval: Duration,
) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let mut app = App::new(source, processor, dashboard);
    app.reload_data();

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.shutdown(SHUTDOWN_GRACE);
    info!(
        "Session ended: {} records, {} rejected lines",
        app.dashboard.applied, app.dashboard.rejected
    );
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(Event::Key(key)) = events::poll_event(refresh_interval)? {
            events::handle_key_event(app, key);
        }

        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
