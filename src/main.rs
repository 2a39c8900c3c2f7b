//! Incubator Control CLI
//!
//! Command-line control panel for the incubator, plus a host-side emulator
//! of the device command loop.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::EnvFilter;

use incubator_control::config::{DEFAULT_BAUD, DEFAULT_PORT, LinkConfig};
use incubator_control::controller::{
    CommandEmitter, CommandLink, ControlPanel, MemoryLink, SerialLink,
};
use incubator_control::device::{
    CommandLoop, ScriptedLines, SerialLineSource, ShutdownReason, SimulatedPwm,
};
use incubator_control::protocol::Channel;
use incubator_control::storage::{self, Settings};
use incubator_control::utils::parsing::{
    PanelInput, parse_channel, parse_panel_input, parse_toggle,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Incubator Control Tool
#[derive(Parser, Debug)]
#[command(name = "incubator-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Serial port of the device
    #[arg(short, long, global = true, default_value = DEFAULT_PORT)]
    port: String,

    /// Baud rate
    #[arg(short, long, global = true, default_value_t = DEFAULT_BAUD)]
    baud: u32,

    /// Settings file (default: <config dir>/incubator-control/settings.json)
    #[arg(short, long, global = true)]
    settings: Option<PathBuf>,

    /// Print commands instead of writing them to the serial port
    #[arg(long, global = true)]
    dry_run: bool,

    /// Show debug diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive control panel on the terminal
    Panel,

    /// Set one channel value
    Set {
        /// Channel: humidity, temperature, phototherapy, light (or H, T, P, L)
        channel: String,

        /// Percent for H/P/L, °C for T
        value: String,
    },

    /// Switch a channel on or off
    Toggle {
        /// Channel: humidity, phototherapy, light (or H, P, L)
        channel: String,

        /// on or off
        state: String,
    },

    /// Restore default settings and push them to the device
    Defaults,

    /// Show stored settings
    Show,

    /// Tell the device to zero its outputs and stop
    StopDevice,

    /// Run the device command loop on this host
    Device {
        /// Replay command lines from a file instead of reading the serial port
        #[arg(short, long)]
        replay: Option<PathBuf>,
    },
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let settings_path = match &args.settings {
        Some(path) => path.clone(),
        None => storage::default_settings_path().context("Failed to locate settings file")?,
    };

    match &args.command {
        Command::Show => return cmd_show(&settings_path),
        Command::Device { replay } => return cmd_device(&args, replay.as_deref()),
        _ => {}
    }

    if args.dry_run {
        let mut panel = open_panel(MemoryLink::new(), settings_path);
        let result = run_panel_command(&args.command, &mut panel);
        for line in panel.emitter().link().lines() {
            print!("→ {}", line);
        }
        result
    } else {
        let link = SerialLink::open(&LinkConfig::new(&args.port, args.baud));
        let mut panel = open_panel(link, settings_path);
        run_panel_command(&args.command, &mut panel)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Load settings (falling back to defaults) and wrap the link in a panel.
fn open_panel<L: CommandLink>(link: L, settings_path: PathBuf) -> ControlPanel<L> {
    let settings = storage::load_settings(&settings_path).unwrap_or_else(|e| {
        eprintln!("⚠️  {}. Using defaults.", e);
        Settings::default()
    });
    ControlPanel::new(settings, CommandEmitter::new(link), settings_path)
}

fn run_panel_command<L: CommandLink>(command: &Command, panel: &mut ControlPanel<L>) -> Result<()> {
    match command {
        Command::Panel => cmd_panel(panel),
        Command::Set { channel, value } => cmd_set(panel, channel, value),
        Command::Toggle { channel, state } => cmd_toggle(panel, channel, state),
        Command::Defaults => cmd_defaults(panel),
        Command::StopDevice => cmd_stop_device(panel),
        Command::Show | Command::Device { .. } => {
            bail!("{:?} does not drive the control panel", command)
        }
    }
}

// =============================================================================
// Panel Commands
// =============================================================================

fn cmd_show(settings_path: &Path) -> Result<()> {
    let settings = storage::load_settings(settings_path).context("Failed to load settings")?;
    println!("📄 {}", settings_path.display());
    print!("{}", settings);
    Ok(())
}

fn cmd_set<L: CommandLink>(panel: &mut ControlPanel<L>, channel: &str, value: &str) -> Result<()> {
    let channel = parse_channel(channel)?;

    if channel == Channel::Temperature {
        let celsius: f64 = value
            .parse()
            .with_context(|| format!("Invalid temperature '{}'", value))?;
        let sent = panel.set_temperature(celsius)?;
        println!("✅ Temperature set to {:.2}°C", sent);
    } else {
        let percent: u8 = value
            .parse()
            .with_context(|| format!("Invalid value '{}'. Use a whole number 0-100", value))?;
        let sent = panel.set_value(channel, percent)?;
        if sent != percent {
            println!("↑  {} raised to its minimum of {}%", channel, sent);
        }
        println!("✅ {} set to {}%", channel, sent);
    }

    panel.close();
    Ok(())
}

fn cmd_toggle<L: CommandLink>(panel: &mut ControlPanel<L>, channel: &str, state: &str) -> Result<()> {
    let channel = parse_channel(channel)?;
    let state = parse_toggle(state)?;

    panel.set_toggle(channel, state)?;
    println!("✅ {} switched {}", channel, state);

    panel.close();
    Ok(())
}

fn cmd_defaults<L: CommandLink>(panel: &mut ControlPanel<L>) -> Result<()> {
    panel
        .restore_defaults()
        .context("Failed to save default settings")?;
    println!("✅ Defaults restored:");
    print!("{}", panel.settings());

    panel.emitter_mut().close();
    Ok(())
}

fn cmd_stop_device<L: CommandLink>(panel: &mut ControlPanel<L>) -> Result<()> {
    panel.emitter_mut().send_exit();
    panel.emitter_mut().close();
    println!("🛑 Stop sent to device");
    Ok(())
}

fn cmd_panel<L: CommandLink>(panel: &mut ControlPanel<L>) -> Result<()> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        eprintln!("\nInterrupted. Press Enter to save and exit.");
    })
    .context("Failed to set Ctrl+C handler")?;

    if !panel.emitter().link().is_open() {
        println!("⚠️  Device not connected. Changes will be saved but not sent.");
    }

    panel.sync();
    println!("🎛️  Incubator control panel (type 'help' for commands)");
    print!("{}", panel.settings());

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    while !interrupted.load(Ordering::SeqCst) {
        let line = match lines.next() {
            Some(line) => line.context("Failed to read console input")?,
            None => break,
        };

        if interrupted.load(Ordering::SeqCst) {
            break;
        }

        let input = match parse_panel_input(&line) {
            Ok(input) => input,
            Err(e) => {
                eprintln!("❌ {}", e);
                continue;
            }
        };

        let outcome = match input {
            PanelInput::SetPercent(channel, value) => panel
                .set_value(channel, value)
                .map(|sent| println!("{} → {}%", channel, sent)),
            PanelInput::SetTemperature(celsius) => panel
                .set_temperature(celsius)
                .map(|sent| println!("Temperature → {:.2}°C", sent)),
            PanelInput::Toggle(channel, state) => panel
                .set_toggle(channel, state)
                .map(|_| println!("{} {}", channel, state)),
            PanelInput::Save => panel.save().map(|_| println!("💾 Settings saved")),
            PanelInput::Defaults => panel.restore_defaults().map(|_| {
                println!("↺  Defaults restored");
                print!("{}", panel.settings());
            }),
            PanelInput::Show => {
                print!("{}", panel.settings());
                Ok(())
            }
            PanelInput::Help => {
                print_panel_help();
                Ok(())
            }
            PanelInput::Quit => break,
            PanelInput::Nothing => Ok(()),
        };

        if let Err(e) = outcome {
            eprintln!("❌ {}", e);
        }
    }

    // Same order as closing the panel window: save, then release the port.
    panel.close();
    println!("👋 Settings saved to {}", panel.settings_path().display());
    Ok(())
}

fn print_panel_help() {
    println!("Commands:");
    println!("  <channel> <value>        set a value (e.g. 'light 60', 'T 37.5')");
    println!("  toggle <channel> on|off  switch humidity, phototherapy or light");
    println!("  show                     print current settings");
    println!("  save                     save settings");
    println!("  defaults                 restore default settings");
    println!("  quit                     save and exit");
    println!("Channels: humidity (H), temperature (T), phototherapy (P), light (L)");
}

// =============================================================================
// Device Emulator
// =============================================================================

fn cmd_device(args: &Args, replay: Option<&Path>) -> Result<()> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let mut device = CommandLoop::new(SimulatedPwm::new("light"), SimulatedPwm::new("phototherapy"));

    let reason = match replay {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read replay file {}", path.display()))?;
            println!("▶️  Replaying {}", path.display());
            device.run(&mut ScriptedLines::from_text(&text), &interrupted)
        }
        None => {
            let config = LinkConfig::new(&args.port, args.baud);
            let port = serialport::new(&config.port, config.baud)
                .timeout(config.timeout)
                .open()
                .with_context(|| format!("Failed to open {}", config.port))?;
            println!("📡 Listening on {} @ {} baud (Ctrl+C to stop)", config.port, config.baud);
            device.run(&mut SerialLineSource::new(port), &interrupted)
        }
    };

    match reason {
        ShutdownReason::ExitCommand => println!("🛑 exit_program received"),
        ShutdownReason::Interrupted => println!("\n🛑 Interrupted"),
        ShutdownReason::InputClosed => println!("⏹️  End of input"),
    }
    println!(
        "   Light duty: {} | Phototherapy duty: {} | Humidity: {}% | Temperature: {}°C",
        device.light_duty(),
        device.phototherapy_duty(),
        device.humidity(),
        device.temperature()
    );

    Ok(())
}
