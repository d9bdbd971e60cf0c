//! DSKY CLI - Drive the keypad interpreter from a terminal.
//!
//! Usage:
//!   dsky [--config FILE] [--trace] [--keys TEXT] [--ticks N]
//!
//! Keys follow the serial keyboard: `v` VERB, `n` NOUN, digits, `+`/`-`,
//! Enter or space ENTER, `d` CLEAR. Esc or Ctrl-C quits.
//!
//! Examples:
//!   dsky                               # Interactive session
//!   dsky --keys "v16n36 "              # Show the clock, then interactive
//!   dsky --keys "v35 " --ticks 300     # Three seconds of bulb test, then exit

use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use log::info;
use tokio::sync::mpsc as tokio_mpsc;

use dsky_core::{
    ConsoleConfig, DisplayData, Dsky, DskyConsole, ExitReason, IndicatorPanel, LogicalKey, Track,
};

/// DSKY console CLI
#[derive(Parser, Debug)]
#[command(name = "dsky")]
#[command(about = "Run the DSKY keypad interpreter")]
struct Args {
    /// JSON console configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable dispatch tracing
    #[arg(short, long)]
    trace: bool,

    /// Keys to type before interactive input
    #[arg(short, long)]
    keys: Option<String>,

    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,
}

/// What the input task sends the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConsoleInput {
    Key(LogicalKey),
    Quit,
}

/// Channel-based console: keys arrive from the input task, frames go to
/// stdout.
struct ChannelConsole {
    /// Receiver for keyboard input
    key_rx: mpsc::Receiver<ConsoleInput>,
    /// Key levels still to be reported, one per tick
    pending: VecDeque<LogicalKey>,
    closed: bool,
    last_frame: Option<String>,
}

impl ChannelConsole {
    fn new(key_rx: mpsc::Receiver<ConsoleInput>) -> Self {
        Self {
            key_rx,
            pending: VecDeque::new(),
            closed: false,
            last_frame: None,
        }
    }

    /// A press is the key for one tick, then released.
    fn press(&mut self, key: LogicalKey) {
        self.pending.push_back(key);
        self.pending.push_back(LogicalKey::None);
    }

    fn queue_script(&mut self, keys: &str) {
        for ch in keys.chars() {
            self.press(LogicalKey::from_char(ch));
        }
    }
}

impl DskyConsole for ChannelConsole {
    fn poll_key(&mut self) -> LogicalKey {
        loop {
            match self.key_rx.try_recv() {
                Ok(ConsoleInput::Key(key)) => self.press(key),
                Ok(ConsoleInput::Quit) | Err(mpsc::TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
                Err(mpsc::TryRecvError::Empty) => break,
            }
        }
        self.pending.pop_front().unwrap_or_default()
    }

    fn render(&mut self, display: Option<&DisplayData>, indicators: &IndicatorPanel) {
        let frame = format_frame(display, indicators);
        if self.last_frame.as_deref() == Some(frame.as_str()) {
            return;
        }

        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = write!(handle, "\r{}\r\n", frame);
        let _ = handle.flush();
        self.last_frame = Some(frame);
    }

    fn sound(&mut self, track: Track) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = write!(handle, "\x07\r[sound: {:?}]\r\n", track);
        let _ = handle.flush();
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Sign plus six digits; digits whose mask bit is clear are blank, and an
/// empty mask blanks the whole register.
fn format_register(value: i32, mask: u8) -> String {
    if mask == 0 {
        return " ".repeat(7);
    }
    let sign = if value < 0 { '-' } else { '+' };
    let magnitude = value.unsigned_abs();
    let digits: String = (0..6)
        .rev()
        .map(|i| {
            if mask & (1 << i) == 0 {
                ' '
            } else {
                let d = (magnitude / 10u32.pow(i)) % 10;
                char::from_digit(d, 10).unwrap_or(' ')
            }
        })
        .collect();
    format!("{}{}", sign, digits)
}

fn format_frame(display: Option<&DisplayData>, indicators: &IndicatorPanel) -> String {
    let mut line = match display {
        Some(d) => format!(
            "PROG {:02}  VERB {:02}  NOUN {:02} | {} {} {}",
            d.prog,
            d.verb,
            d.noun,
            format_register(d.r1, d.r1_mask),
            format_register(d.r2, d.r2_mask),
            format_register(d.r3, d.r3_mask)
        ),
        None => format!(
            "PROG --  VERB --  NOUN -- | {} {} {}",
            format_register(0, 0),
            format_register(0, 0),
            format_register(0, 0)
        ),
    };

    let lamps: Vec<&str> = indicators
        .lit()
        .map(|(which, _)| which.label())
        .filter(|label| !label.is_empty())
        .collect();
    if !lamps.is_empty() {
        line.push_str(" | ");
        line.push_str(&lamps.join(", "));
    }
    line
}

/// Translate crossterm key events to console input.
fn translate_key(code: KeyCode, modifiers: KeyModifiers) -> Option<ConsoleInput> {
    if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
        return Some(ConsoleInput::Quit);
    }

    let key = match code {
        KeyCode::Esc => return Some(ConsoleInput::Quit),
        KeyCode::Char(c) => LogicalKey::from_char(c),
        KeyCode::Enter => LogicalKey::Enter,
        KeyCode::Backspace | KeyCode::Delete => LogicalKey::Clear,
        _ => LogicalKey::None,
    };
    (key != LogicalKey::None).then_some(ConsoleInput::Key(key))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ConsoleConfig::from_path(path).map_err(|e| {
            eprintln!("Failed to load {}: {}", path.display(), e);
            e
        })?,
        None => ConsoleConfig::default(),
    };

    let level = if args.trace || config.trace { "trace" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    // Create channel for keyboard input
    let (key_tx, key_rx) = mpsc::channel::<ConsoleInput>();

    // Create shutdown signal
    let (shutdown_tx, mut shutdown_rx) = tokio_mpsc::channel::<()>(1);

    let mut console = ChannelConsole::new(key_rx);
    if let Some(keys) = &args.keys {
        console.queue_script(keys);
    }

    // Enable raw mode (gracefully handle non-TTY)
    let raw_mode_enabled = enable_raw_mode().is_ok();

    let ticks = args.ticks;
    let start = chrono::Local::now().naive_local();

    // Run the machine in a blocking task
    let machine_handle = tokio::task::spawn_blocking(move || {
        let mut dsky = Dsky::from_config(console, &config, start);
        dsky.realtime = true;
        dsky.run(ticks)
    });

    // Spawn terminal input reader
    let input_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    break;
                }
                _ = tokio::time::sleep(Duration::from_millis(10)) => {
                    // Poll for terminal events
                    if event::poll(Duration::from_millis(0)).unwrap_or(false) {
                        if let Ok(Event::Key(key_event)) = event::read() {
                            if key_event.kind == KeyEventKind::Release {
                                continue;
                            }
                            if let Some(input) = translate_key(key_event.code, key_event.modifiers) {
                                let quit = input == ConsoleInput::Quit;
                                if key_tx.send(input).is_err() || quit {
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        }
    });

    // Wait for the machine to stop
    let info = machine_handle.await?;

    // Signal input handler to stop
    let _ = shutdown_tx.send(()).await;
    let _ = input_handle.await;

    // Disable raw mode if we enabled it
    if raw_mode_enabled {
        let _ = disable_raw_mode();
    }

    match info.reason {
        ExitReason::ConsoleClosed => info!("console closed after {} ticks", info.ticks),
        ExitReason::TickLimit => info!("stopped after {} ticks", info.ticks),
    }

    Ok(())
}
