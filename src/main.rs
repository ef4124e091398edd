//! Goalring CLI
//!
//! Usage:
//!   goalring --event tip-latest --amount 5      # Single host event
//!   goalring --chat "!add 10"                   # Single chat command (as broadcaster)
//!   goalring --interactive                      # Operator console
//!   goalring --serve                            # HTTP + WebSocket API
//!   goalring --config fields.json --store-dir ./progress --serve

use clap::Parser;
use colored::Colorize;
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use goalring::core::{run_server, FileStore, GoalEngine, MemoryStore, ProgressStore, RenderFrame};
use goalring::types::{
    resolve_config, ArcPreset, ChatMessage, ConfigOverrides, GoalConfig, InboundEvent,
    ProgressOutput, RawEvent, Sender,
};
use goalring::error::ConfigError;
use goalring::VERSION;

/// Login used for local chat commands
const CONSOLE_OPERATOR: &str = "operator";

#[derive(Parser, Debug)]
#[command(
    name = "goalring",
    version = VERSION,
    about = "Goalring - goal-progress engine for stream overlays",
    long_about = "Goalring accumulates progress toward a goal from stream events\n\
                  (follows, subscriptions, tips, cheers) and operator chat commands,\n\
                  and renders it as an arc.\n\n\
                  Modes:\n  \
                  --event        Apply one host event\n  \
                  --chat         Apply one chat line\n  \
                  --interactive  Operator console\n  \
                  --serve        HTTP + WebSocket API\n\n\
                  Chat commands:\n  \
                  !add <n>  !subtract <n>  !set <n>  !setprogress <n>  !setgoal <n>  !resetgoal"
)]
struct Args {
    /// Field-data JSON (goalValue, eventType, stopAtGoal, ...)
    #[arg(short, long)]
    config: Option<String>,

    /// Persist progress in this directory (default: in memory only)
    #[arg(long)]
    store_dir: Option<String>,

    /// Override the goal
    #[arg(long)]
    goal: Option<f64>,

    /// Arc shape: full, semicircle, wide_arc, horseshoe
    #[arg(long)]
    shape: Option<ArcPreset>,

    /// Apply one host event (e.g. subscriber-latest, tip-latest)
    #[arg(short, long)]
    event: Option<String>,

    /// Amount for tip/cheer events
    #[arg(long)]
    amount: Option<f64>,

    /// Apply one chat line
    #[arg(long)]
    chat: Option<String>,

    /// Sender of --chat (default: the channel owner)
    #[arg(long = "as")]
    sender: Option<String>,

    /// Treat the --chat sender as a moderator
    #[arg(long)]
    moderator: bool,

    /// Operator console - read events and commands from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Run as HTTP API server
    #[arg(short, long)]
    serve: bool,

    /// Server address (default: 127.0.0.1:3000)
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    // Quiet by default, RUST_LOG=info or RUST_LOG=debug for more
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if args.no_color {
        colored::control::set_override(false);
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Config error:".red(), e);
            std::process::exit(1);
        }
    };

    let store: Arc<dyn ProgressStore> = match &args.store_dir {
        Some(dir) => match FileStore::new(dir) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                eprintln!("{} {}", "Store error:".red(), e);
                std::process::exit(1);
            }
        },
        None => Arc::new(MemoryStore::new()),
    };

    let mut engine = GoalEngine::new(config, store);
    engine.restore().await;

    if args.serve {
        run_serve(&args, engine).await;
    } else if let Some(ref kind) = args.event {
        run_event(kind, &args, &mut engine).await;
    } else if let Some(ref text) = args.chat {
        run_chat(text, &args, &mut engine).await;
    } else {
        run_interactive(&args, &mut engine).await;
    }
}

/// RUST_LOG directives as given, `warn` when unset or invalid
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"))
}

/// Defaults ← config file ← command-line overrides. Only an unreadable
/// file fails; malformed JSON falls back to defaults.
fn load_config(args: &Args) -> Result<GoalConfig, ConfigError> {
    let mut overrides = match &args.config {
        Some(path) => match ConfigOverrides::load(path) {
            Ok(overrides) => overrides,
            Err(ConfigError::Parse(e)) => {
                tracing::warn!(path = %path, error = %e, "config is not valid JSON, using defaults");
                ConfigOverrides::default()
            }
            Err(e) => return Err(e),
        },
        None => ConfigOverrides::default(),
    };
    if args.goal.is_some() {
        overrides.goal_value = args.goal;
    }
    if args.shape.is_some() {
        overrides.shape = args.shape;
    }
    Ok(resolve_config(&GoalConfig::default(), &overrides))
}

/// Apply one host event
async fn run_event(kind: &str, args: &Args, engine: &mut GoalEngine) {
    let payload = match args.amount {
        Some(amount) => json!({ "amount": amount }),
        None => json!({}),
    };
    let event = InboundEvent::decode(&RawEvent::new(kind, payload));
    let output = engine.handle_event(&event);
    print_result(output.as_ref(), engine, args);
    engine.flush().await;
}

/// Apply one chat line
async fn run_chat(text: &str, args: &Args, engine: &mut GoalEngine) {
    let owner = CONSOLE_OPERATOR;
    let name = args.sender.as_deref().unwrap_or(owner);
    let message = ChatMessage::new(Sender::new(name, owner, args.moderator), text);
    let output = engine.handle_event(&InboundEvent::Message(message));
    print_result(output.as_ref(), engine, args);
    engine.flush().await;
}

/// Operator console
async fn run_interactive(args: &Args, engine: &mut GoalEngine) {
    print_header(engine, args.no_color);
    println!("Events:   follow | sub | tip <n> | cheer <n>");
    println!("Commands: !add <n> | !subtract <n> | !set <n> | !setgoal <n> | !resetgoal");
    println!("Console:  complete | state | frame | quit");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", format_prompt(engine, args.no_color));
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            println!("\nSession ended. Updates: {}", engine.update_count());
            break;
        }
        if line.is_empty() {
            continue;
        }

        match console_input(line) {
            ConsoleInput::Event(event) => {
                let output = engine.handle_event(&event);
                print_result(output.as_ref(), engine, args);
            }
            ConsoleInput::Complete => {
                let output = engine.set_current(engine.target());
                print_result(Some(&output), engine, args);
            }
            ConsoleInput::State => print_result(Some(&engine.current_output()), engine, args),
            ConsoleInput::Frame => print_frame(engine, args),
            ConsoleInput::Unknown => {
                println!("{}", "⚠ Unknown input - try 'sub', 'tip 5' or '!add 10'".yellow());
            }
        }
    }

    engine.flush().await;
}

/// One console line
enum ConsoleInput {
    Event(InboundEvent),
    Complete,
    State,
    Frame,
    Unknown,
}

fn console_input(line: &str) -> ConsoleInput {
    if line.starts_with('!') {
        let sender = Sender::new(CONSOLE_OPERATOR, CONSOLE_OPERATOR, false);
        return ConsoleInput::Event(InboundEvent::Message(ChatMessage::new(sender, line)));
    }

    let mut parts = line.split_whitespace();
    let word = parts.next().unwrap_or_default().to_lowercase();
    let amount = parts.next().and_then(goalring::core::command_parser::parse_number);

    match word.as_str() {
        "follow" | "follower" => ConsoleInput::Event(InboundEvent::Follower),
        "sub" | "subscriber" => ConsoleInput::Event(InboundEvent::Subscriber),
        "tip" | "donation" => ConsoleInput::Event(InboundEvent::Tip {
            amount: amount.unwrap_or(0.0),
        }),
        "cheer" => ConsoleInput::Event(InboundEvent::Cheer {
            amount: amount.unwrap_or(0.0),
        }),
        "complete" => ConsoleInput::Complete,
        "state" => ConsoleInput::State,
        "frame" => ConsoleInput::Frame,
        _ => ConsoleInput::Unknown,
    }
}

/// Print an engine outcome, or note that the input was ignored
fn print_result(output: Option<&ProgressOutput>, engine: &GoalEngine, args: &Args) {
    let Some(output) = output else {
        if args.json {
            println!("{}", json!({ "handled": false }));
        } else {
            println!("{}", "  (ignored)".dimmed());
        }
        return;
    };

    if args.json {
        match serde_json::to_string(output) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{} {}", "Serialization error:".red(), e),
        }
    } else if args.no_color {
        println!("{}", output.to_parseable_string());
    } else {
        println!("{}", output.to_terminal_string());
        if output.reason.is_goal_reached() {
            println!("{}", format!("  🎉 {}", output.reason.description()).green().bold());
        }
        let frame = RenderFrame::from_output(
            engine.config().shape,
            output,
            &engine.config().label_prefix,
        );
        println!("{}", format!("  {}", frame.summary()).dimmed());
    }
}

/// Print the render frame for the current state
fn print_frame(engine: &GoalEngine, args: &Args) {
    let frame = RenderFrame::from_output(
        engine.config().shape,
        &engine.current_output(),
        &engine.config().label_prefix,
    );
    if args.json {
        match serde_json::to_string_pretty(&frame) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{} {}", "Serialization error:".red(), e),
        }
        return;
    }
    println!("  shape:    {}", frame.preset);
    println!("  path:     {}", frame.path);
    println!("  length:   {:.2}", frame.total_length);
    println!("  offset:   {:.2}", frame.progress_offset);
    println!("  labels:   {}", frame.summary());
}

/// Print header
fn print_header(engine: &GoalEngine, no_color: bool) {
    let title = format!(
        "  Goalring v{} - {} ({})",
        VERSION,
        engine.config().title,
        engine.config().shape
    );
    println!("========================================");
    if no_color {
        println!("{}", title);
    } else {
        println!("{}", title.bold());
    }
    println!("========================================");
    println!();
}

/// Format console prompt
fn format_prompt(engine: &GoalEngine, no_color: bool) -> String {
    let phase = engine.phase();
    let state = engine.state();
    if no_color {
        format!("[{} {}/{}] > ", phase, state.current, state.target)
    } else {
        format!(
            "{}{} [{} {}/{}]{} > ",
            phase.color_code(),
            phase.emoji(),
            phase,
            state.current,
            state.target,
            goalring::types::GoalPhase::color_reset()
        )
    }
}

/// Run HTTP API server
async fn run_serve(args: &Args, engine: GoalEngine) {
    println!();
    println!("{}", format!("🎯 Goalring API Server v{}", VERSION).bold());
    println!();

    if let Err(e) = run_server(&args.addr, engine).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_keeps_requested_level() {
        assert_eq!(log_filter(Some("debug".to_string())).to_string(), "debug");
        assert_eq!(
            log_filter(Some("goalring=trace".to_string())).to_string(),
            "goalring=trace"
        );
    }

    #[test]
    fn test_log_filter_defaults_to_warn() {
        assert_eq!(log_filter(None).to_string(), "warn");
        assert_eq!(log_filter(Some("goalring=loud".to_string())).to_string(), "warn");
    }

    #[test]
    fn test_console_words() {
        assert!(matches!(
            console_input("tip 5"),
            ConsoleInput::Event(InboundEvent::Tip { amount }) if amount == 5.0
        ));
        assert!(matches!(console_input("complete"), ConsoleInput::Complete));
        assert!(matches!(console_input("dance"), ConsoleInput::Unknown));
    }
}
