use std::env;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement};

use chordmode::config;
use chordmode::Command;
use chordmode::logging::{self, LogConfig};
use chordmode::session::{Effect, HostEvent, Response, Session};

fn print_version() {
    println!("chordmode {}", env!("CARGO_PKG_VERSION"));
}

fn print_usage() {
    eprintln!("chordmode - Vim-style modal key handling in the terminal");
    eprintln!();
    eprintln!("Usage: chordmode [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("      --config <PATH>    Use this config file instead of the default");
    eprintln!("      --log-file <PATH>  Write logs to this file or directory");
    eprintln!("  -h, --help             Print this help message");
    eprintln!("  -V, --version          Print version information");
    eprintln!();
    eprintln!("Environment Variables:");
    eprintln!("  CHORDMODE_LOG          Log level or filter (e.g., debug)");
    eprintln!("  CHORDMODE_CONFIG_DIR   Config directory override");
    eprintln!();
    eprintln!("Configuration:");
    if let Some(path) = config::config_path() {
        eprintln!("  Config file: {}", path.display());
    }
    eprintln!();
    eprintln!("Press keys to see how they are interpreted; Ctrl+C exits.");
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args> {
    let mut parsed = Args::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag, Some(value.to_string())),
            None => (arg.as_str(), None),
        };
        match flag {
            "--config" | "--log-file" => {
                let value = match inline {
                    Some(value) => value,
                    None => iter
                        .next()
                        .cloned()
                        .with_context(|| format!("{flag} requires a path"))?,
                };
                if flag == "--config" {
                    parsed.config = Some(PathBuf::from(value));
                } else {
                    parsed.log_file = Some(PathBuf::from(value));
                }
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return Ok(());
    }

    if args.iter().any(|a| a == "-V" || a == "--version") {
        print_version();
        return Ok(());
    }

    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {err}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    let log_guard = logging::init(LogConfig {
        log_file_path: args.log_file,
    })
    .context("failed to initialize logging")?;

    let cfg = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config: {}", e);
            config::Config::default()
        }),
    };

    let session = Session::new(cfg).context("failed to start session")?;
    tracing::info!(log_file = %log_guard.log_file.display(), "chordmode started");

    run(session)
}

struct TerminalGuard {
    stdout: Stdout,
    reports_releases: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode; are you running in a real TTY?")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnableFocusChange, EnableMouseCapture)?;

        let reports_releases = supports_keyboard_enhancement().unwrap_or(false);
        if reports_releases {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        Ok(Self {
            stdout,
            reports_releases,
        })
    }

    fn println(&mut self, line: &str) -> Result<()> {
        write!(self.stdout, "\r\n{line}")?;
        self.stdout.flush()?;
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.reports_releases {
            let _ = execute!(self.stdout, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(self.stdout, DisableMouseCapture, DisableFocusChange);
        let _ = disable_raw_mode();
        let _ = self.stdout.flush();
    }
}

fn run(mut session: Session) -> Result<()> {
    let mut guard = TerminalGuard::new()?;
    guard.println("chordmode (press Ctrl+C to exit, ? for help)")?;
    guard.println(&status(&session))?;

    loop {
        let ev = event::read()?;
        if let Event::Key(key) = ev {
            let is_ctrl_c =
                key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL);
            if is_ctrl_c && key.kind != KeyEventKind::Release {
                break;
            }
        }

        let Some(host_event) = HostEvent::from_terminal(ev) else {
            continue;
        };
        let label = describe(&session, &host_event);
        let response = session.handle_event(host_event.clone());
        report(&mut guard, &session, &label, &response)?;

        // Terminals without release reporting never send keyups
        if let HostEvent::Key(key) = host_event {
            if !guard.reports_releases && key.kind == KeyEventKind::Press {
                let release = HostEvent::Key(KeyEvent {
                    kind: KeyEventKind::Release,
                    ..key
                });
                let response = session.handle_event(release);
                if !response.effects.is_empty() {
                    report(&mut guard, &session, "(keyup)", &response)?;
                }
            }
        }
    }

    Ok(())
}

fn describe(session: &Session, event: &HostEvent) -> String {
    match event {
        HostEvent::Key(key) => {
            let token = session.resolver().key_char(key);
            let token = if token.is_empty() {
                "(modifier)".to_string()
            } else {
                token
            };
            if key.kind == KeyEventKind::Release {
                format!("{token} up")
            } else {
                token
            }
        }
        other => other.kind().label().to_string(),
    }
}

fn status(session: &Session) -> String {
    let indicator = session.indicator().unwrap_or_default();
    let pending = session.pending_keys();
    if pending.is_empty() {
        format!("-- {indicator} --")
    } else {
        format!("-- {indicator} -- {pending}")
    }
}

fn report(
    guard: &mut TerminalGuard,
    session: &Session,
    label: &str,
    response: &Response,
) -> Result<()> {
    guard.println(&format!("{label:<12} {:?}", response.signal))?;
    for effect in &response.effects {
        match effect {
            Effect::Command(invocation) => {
                let count = invocation
                    .count
                    .map(|count| format!(" x{count}"))
                    .unwrap_or_default();
                guard.println(&format!(
                    "  => {}{count}  ({})",
                    invocation.command,
                    invocation.command.description()
                ))?;
            }
            Effect::ClearHover => guard.println("  => clear hover")?,
            Effect::ModeExited(name) => guard.println(&format!("  => left {name} mode"))?,
        }
    }
    let toggled_help = response
        .commands()
        .any(|invocation| invocation.command == Command::ShowHelp);
    if toggled_help && session.is_help_showing() {
        for line in session.help_lines() {
            guard.println(&line)?;
        }
    }
    guard.println(&status(session))?;
    Ok(())
}
