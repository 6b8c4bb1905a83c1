// src/main.rs - watch-emu: run the watch firmware in a terminal
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use watch_emu::bridge::{Bridge, BridgeError, KeySource, NoKeys};
use watch_emu::config::{self, Config, ConfigError};
use watch_emu::display::Renderer;
use watch_emu::firmware::WatchFirmware;
use watch_emu::hardware::DeviceState;
use watch_emu::rtc::RtcSource;
use watch_emu::terminal::{self, CrosstermKeys, CrosstermMode, ModeSwitch, TerminalGuard};

#[derive(Parser, Debug)]
#[command(name = "watch-emu", about = "Run the GoodWatch firmware against an emulated LCD.")]
struct Cli {
    /// Path to a TOML config file (overrides defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Watchdog ticks per second
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=4))]
    tick_hz: Option<u32>,

    /// Log level written to stderr (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,

    /// Draw in the main screen instead of the alternate screen
    #[arg(long)]
    no_alt_screen: bool,

    /// Use raw mode and key polling even when stdin/stdout are not terminals
    #[arg(long)]
    force_tty: bool,
}

fn load(cli: &Cli) -> Result<Config, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            config::load_config(&path.to_string_lossy())?
        }
        None => Config::default(),
    };
    if let Some(hz) = cli.tick_hz {
        config.emulator.tick_hz = hz;
    }
    if cli.no_alt_screen {
        config.emulator.alt_screen = false;
    }
    config.validate()?;
    Ok(config)
}

/// One emulator session. The terminal guard, when there is one, is
/// dropped before this returns.
async fn run<M, W, S>(
    config: Config,
    mode: Option<M>,
    keys: Box<dyn KeySource>,
    sink: W,
    shutdown: S,
) -> Result<(), BridgeError>
where
    M: ModeSwitch,
    W: Write,
    S: Future<Output = ()>,
{
    let _guard = mode.map(TerminalGuard::enter).transpose()?;

    let renderer = Renderer::new(config.emulator.title.clone()).with_footer(config.keys.hint());
    let mut bridge = Bridge::new(
        WatchFirmware,
        DeviceState::new(config.device),
        RtcSource::host(),
        renderer,
        keys,
        sink,
        config.keys,
    );
    tracing::info!(
        "Running at {} Hz with capabilities {:?}",
        config.emulator.tick_hz,
        config.device
    );
    bridge.run_until(config.emulator.tick_period(), shutdown).await
}

/// Print the diagnostic for a finished session and pick the exit code.
fn report(result: Result<(), BridgeError>, diag: &mut impl Write) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = writeln!(diag, "watch-emu: {e}");
            ExitCode::from(1)
        }
    }
}

fn run_cli(cli: &Cli, diag: &mut impl Write) -> ExitCode {
    let config = match load(cli) {
        Ok(config) => config,
        Err(e) => {
            let _ = writeln!(diag, "watch-emu: {e}");
            return ExitCode::from(2);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            let _ = writeln!(diag, "watch-emu: cannot start runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let interactive = terminal::is_interactive(cli.force_tty);
    let mode = CrosstermMode {
        alt_screen: config.emulator.alt_screen,
    };
    let (mode, keys): (Option<CrosstermMode>, Box<dyn KeySource>) = if interactive {
        terminal::install_panic_hook(mode);
        (Some(mode), Box::new(CrosstermKeys))
    } else {
        tracing::info!("Not a terminal, running without key input");
        (None, Box::new(NoKeys))
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    let result = runtime.block_on(run(config, mode, keys, io::stdout(), shutdown));
    report(result, diag)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .init();
    run_cli(&cli, &mut io::stderr())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct EventLog(Arc<Mutex<Vec<String>>>);

    impl EventLog {
        fn events(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    impl ModeSwitch for EventLog {
        fn enter(&mut self) -> io::Result<()> {
            self.0.lock().unwrap().push("enter".into());
            Ok(())
        }
        fn restore(&mut self) -> io::Result<()> {
            self.0.lock().unwrap().push("restore".into());
            Ok(())
        }
    }

    // Diagnostic output shows up as a single "diag" event.
    impl Write for EventLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let mut events = self.0.lock().unwrap();
            if events.last().map(String::as_str) != Some("diag") {
                events.push("diag".into());
            }
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_config_error_exits_2() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[emulator]\ntick_hz = 10\n").unwrap();
        let cli = Cli::try_parse_from(["watch-emu", "--config", path.to_str().unwrap()]).unwrap();

        let mut diag = Vec::new();
        assert_eq!(run_cli(&cli, &mut diag), ExitCode::from(2));
        assert!(String::from_utf8(diag).unwrap().starts_with("watch-emu: "));
    }

    #[test]
    fn test_tick_rate_flag_is_bounded() {
        assert!(Cli::try_parse_from(["watch-emu", "--tick-hz", "5"]).is_err());
        assert!(Cli::try_parse_from(["watch-emu", "--tick-hz", "4"]).is_ok());
    }

    #[test]
    fn test_report_exit_codes() {
        let mut diag = Vec::new();
        assert_eq!(report(Ok(()), &mut diag), ExitCode::SUCCESS);
        assert!(diag.is_empty());
        assert_eq!(report(Err(BridgeError::FirmwareReturned), &mut diag), ExitCode::from(1));
        assert!(!diag.is_empty());
    }

    #[tokio::test]
    async fn test_diagnostic_printed_after_terminal_restored() {
        let log = EventLog::default();
        let result = run(
            Config::default(),
            Some(log.clone()),
            Box::new(NoKeys),
            BrokenSink,
            std::future::pending::<()>(),
        )
        .await;
        assert!(matches!(result, Err(BridgeError::Io(_))));

        let mut diag = log.clone();
        assert_eq!(report(result, &mut diag), ExitCode::from(1));
        assert_eq!(log.events(), ["enter", "restore", "diag"]);
    }
}
