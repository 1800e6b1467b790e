//! # cueline-cli
//!
//! Binary entry point for Cueline.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Configuration loading and validation
//! - Screenplay inspection via `cueline parse`
//! - Context window and next-speaker inspection via `cueline context`
//! - A line-driven rehearsal loop via `cueline rehearse`

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use cueline_core::{
    CuelineConfig, DriverUpdate, OwnedTurnSnapshot, RehearsalDriver, RehearsalSession,
    ScriptParser, SilenceOutcome, VoiceEvent,
};
use cueline_proto::{Confidence, Element, ElementType, ParsedScript, SessionStatus, SpeakerKind};
use std::collections::BTreeMap;
use std::io::{IsTerminal, stdout};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::debug;

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if stdout is a TTY
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorMode {
    /// Returns true if colors should be used based on mode and terminal detection.
    fn should_use_colors(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => stdout().is_terminal(),
        }
    }
}

/// Output format for inspection commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for programmatic access
    Json,
}

/// ANSI color codes for terminal output.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const MAGENTA: &str = "\x1b[35m";
}

/// Cueline - screenplay parsing and line rehearsal
#[derive(Parser, Debug)]
#[command(name = "cueline", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    // ─────────────────────────────────────────────────────────────────────────
    // Global options (available for all subcommands)
    // ─────────────────────────────────────────────────────────────────────────

    /// Path to configuration file
    #[arg(short, long, default_value = "cueline.yml", global = true)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output mode (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a screenplay text file and show its structure
    Parse(ParseArgs),

    /// Show the context window and next speaker at a cursor
    Context(ContextArgs),

    /// Rehearse a script interactively, one command per stdin line
    Rehearse(RehearseArgs),
}

/// Arguments for the parse subcommand.
#[derive(Parser, Debug)]
struct ParseArgs {
    /// Extracted screenplay text (pages separated by form feeds)
    file: PathBuf,

    /// Page count for the running time estimate (default: count form feeds)
    #[arg(long)]
    pages: Option<u32>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

/// Arguments for the context subcommand.
#[derive(Parser, Debug)]
struct ContextArgs {
    /// Extracted screenplay text
    file: PathBuf,

    /// Character played by the user
    #[arg(short, long)]
    user: String,

    /// Element index to inspect
    #[arg(long, default_value_t = 0)]
    cursor: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

/// Arguments for the rehearse subcommand.
#[derive(Parser, Debug)]
struct RehearseArgs {
    /// Extracted screenplay text
    file: PathBuf,

    /// Character played by the user
    #[arg(short, long)]
    user: String,

    /// Start with silence auto-advance disabled
    #[arg(long)]
    no_auto_advance: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays clean
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Parse(args) => parse_command(&config, cli.color, args),
        Commands::Context(args) => context_command(&config, cli.color, args),
        Commands::Rehearse(args) => rehearse_command(&config, cli.color, args).await,
    }
}

fn load_config(path: &Path) -> Result<CuelineConfig> {
    let config = if path.exists() {
        CuelineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        debug!(path = %path.display(), "Config file not found, using defaults");
        CuelineConfig::default()
    };

    let warnings = config.validate().context("Configuration validation failed")?;
    for warning in &warnings {
        eprintln!("{warning}");
    }

    Ok(config)
}

fn load_script(config: &CuelineConfig, path: &Path, pages: Option<u32>) -> Result<ParsedScript> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script from {}", path.display()))?;
    let parser = ScriptParser::new().with_config(config.parser);
    Ok(parser.parse_text(&text, pages))
}

fn start_session(config: &CuelineConfig, script: &ParsedScript, user: &str) -> Result<RehearsalSession> {
    if !script.is_speaking(user) {
        bail!(
            "Character '{user}' has no dialogue in this script (speaking: {})",
            script.speaking_characters.join(", ")
        );
    }

    let session = RehearsalSession::for_script(script, user, BTreeMap::new())?
        .with_auto_advance(config.timing.auto_advance);
    Ok(session)
}

// ─────────────────────────────────────────────────────────────────────────────
// parse
// ─────────────────────────────────────────────────────────────────────────────

fn parse_command(config: &CuelineConfig, color_mode: ColorMode, args: ParseArgs) -> Result<()> {
    let use_colors = color_mode.should_use_colors();
    let script = load_script(config, &args.file, args.pages)?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&script)?;
            println!("{json}");
        }
        OutputFormat::Table => {
            print_script_summary(&script, use_colors);
            if script.is_empty() {
                println!("No screenplay elements found.");
            } else {
                println!();
                print_elements_table(&script.elements, None, use_colors);
            }
        }
    }

    Ok(())
}

fn print_script_summary(script: &ParsedScript, use_colors: bool) {
    use colors::*;

    let list = |names: &[String]| {
        if names.is_empty() {
            "-".to_string()
        } else {
            names.join(", ")
        }
    };

    if use_colors {
        println!("{BOLD}{}{RESET}", script.title);
    } else {
        println!("{}", script.title);
    }
    println!("  Scenes:         {}", script.scene_count);
    println!("  Dialogue lines: {}", script.total_dialogue_lines);
    println!("  Speaking:       {}", list(&script.speaking_characters));
    println!("  Non-speaking:   {}", list(&script.non_speaking_characters));
    let line_counts: Vec<String> = script
        .speaking_characters
        .iter()
        .map(|name| format!("{name} {}", script.lines_for(name).count()))
        .collect();
    println!("  Lines:          {}", list(&line_counts));
    println!("  Running time:   {}", script.estimated_duration);

    let confidence_color = match script.confidence {
        Confidence::High => GREEN,
        Confidence::Medium => YELLOW,
        Confidence::Low => MAGENTA,
    };
    if use_colors {
        println!("  Confidence:     {confidence_color}{}{RESET}", script.confidence);
    } else {
        println!("  Confidence:     {}", script.confidence);
    }
}

fn print_elements_table(elements: &[Element], cursor: Option<usize>, use_colors: bool) {
    use colors::*;

    if use_colors {
        println!("{BOLD}{DIM}    # │ Line ID              │ Type          │ Character    │ Content{RESET}");
        println!("{DIM}──────┼──────────────────────┼───────────────┼──────────────┼─────────────────────{RESET}");
    } else {
        println!("    # | Line ID              | Type          | Character    | Content");
        println!("------|----------------------|---------------|--------------|---------------------");
    }

    for el in elements {
        let marker = if cursor == Some(el.element_index) { '>' } else { ' ' };
        let character = el.character_name.as_deref().unwrap_or("-");
        let content = truncate(&element_text(el), 60);

        if use_colors {
            let type_color = element_color(el.element_type);
            println!(
                "{marker}{DIM}{:>4}{RESET} │ {:<20} │ {type_color}{:<13}{RESET} │ {:<12} │ {}",
                el.element_index,
                truncate(&el.line_id, 20),
                el.element_type.as_str(),
                truncate(character, 12),
                content
            );
        } else {
            println!(
                "{marker}{:>4} | {:<20} | {:<13} | {:<12} | {}",
                el.element_index,
                truncate(&el.line_id, 20),
                el.element_type.as_str(),
                truncate(character, 12),
                content
            );
        }
    }
}

fn element_color(element_type: ElementType) -> &'static str {
    use colors::*;
    match element_type {
        ElementType::SceneHeading => CYAN,
        ElementType::Transition => MAGENTA,
        ElementType::CharacterCue => BOLD,
        ElementType::Dialogue => GREEN,
        ElementType::Action => DIM,
    }
}

/// Display text of an element, with the parenthetical folded into cues.
fn element_text(el: &Element) -> String {
    match (el.element_type, el.parenthetical.as_deref()) {
        (ElementType::CharacterCue, Some(direction)) => format!("{} ({direction})", el.content),
        _ => el.content.clone(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{head}…")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// context
// ─────────────────────────────────────────────────────────────────────────────

fn context_command(config: &CuelineConfig, color_mode: ColorMode, args: ContextArgs) -> Result<()> {
    let use_colors = color_mode.should_use_colors();
    let script = load_script(config, &args.file, None)?;
    let session = start_session(config, &script, &args.user)?.jump_to(args.cursor, script.elements.len())?;
    let snapshot = session.snapshot(&script.elements, &config.window);

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&snapshot)?;
            println!("{json}");
        }
        OutputFormat::Table => {
            let window = snapshot.window;
            println!(
                "Window [{}, {}) of {} elements, cursor {}",
                window.start, window.end, window.total, window.cursor
            );
            println!();
            print_elements_table(window.elements, Some(window.cursor), use_colors);
            println!();
            println!(
                "Next speaker: {}",
                speaker_label(&snapshot.next_speaker.character, snapshot.next_speaker.kind, use_colors)
            );
            if window.first_speaker_is_ai(session.ai_characters()) {
                println!("The scene partner opens this window.");
            }
        }
    }

    Ok(())
}

fn speaker_label(character: &str, kind: SpeakerKind, use_colors: bool) -> String {
    use colors::*;
    if !use_colors {
        return format!("{character} ({kind})");
    }
    let color = match kind {
        SpeakerKind::User => GREEN,
        SpeakerKind::Ai => CYAN,
        SpeakerKind::Unknown => DIM,
    };
    format!("{color}{character}{RESET} ({kind})")
}

// ─────────────────────────────────────────────────────────────────────────────
// rehearse
// ─────────────────────────────────────────────────────────────────────────────

const REHEARSE_HELP: &str = "\
Commands:
  n          next line
  b          previous line
  g <index>  jump to element
  p          pause / resume
  a          toggle auto-advance
  s <ms>     report <ms> of silence
  h          hold position
  d          scene partner finished its line
  l          show the current line
  q          finish the rehearsal";

async fn rehearse_command(config: &CuelineConfig, color_mode: ColorMode, args: RehearseArgs) -> Result<()> {
    let use_colors = color_mode.should_use_colors();
    let script = load_script(config, &args.file, None)?;

    let mut session = start_session(config, &script, &args.user)?;
    if args.no_auto_advance {
        session = session.set_auto_advance(false)?;
    }

    println!(
        "Rehearsing \"{}\" as {} (scene partner: {})",
        script.title,
        session.user_character(),
        session.ai_characters().join(", ")
    );
    println!("Type ? for commands.");

    let total = script.elements.len();
    let (driver, mut updates) = RehearsalDriver::new(session, script.elements, config);
    print_position(&driver.snapshot(), use_colors);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read command")? else {
                    break;
                };
                let keep_going = run_rehearsal_command(&driver, line.trim(), use_colors);
                drain_updates(&mut updates, use_colors);
                if !keep_going {
                    break;
                }
            }
            Some(update) = updates.recv() => print_update(&update, use_colors),
        }
    }

    driver.shutdown();
    drain_updates(&mut updates, use_colors);

    let session = driver.session();
    println!(
        "Stopped at element {} of {} ({})",
        session.cursor() + 1,
        total,
        session.status()
    );
    Ok(())
}

/// Runs one rehearsal command. Returns false when the rehearsal should end.
fn run_rehearsal_command(driver: &RehearsalDriver, input: &str, use_colors: bool) -> bool {
    let mut parts = input.split_whitespace();
    let Some(command) = parts.next() else {
        return true;
    };
    let arg = parts.next();

    let result = match command {
        "n" | "next" => driver.advance().map(drop),
        "b" | "back" => driver.rewind().map(drop),
        "p" | "pause" => driver.toggle_pause().map(drop),
        "a" | "auto" => {
            let enabled = !driver.session().auto_advance();
            driver.set_auto_advance(enabled).map(|s| {
                println!("Auto-advance {}", if s.auto_advance() { "on" } else { "off" });
            })
        }
        "s" | "silence" => {
            match arg.and_then(|ms| ms.parse::<u64>().ok()) {
                Some(ms) => {
                    if driver.report_silence(Duration::from_millis(ms)) == SilenceOutcome::Waiting {
                        println!("Still waiting.");
                    }
                }
                None => eprintln!("Usage: s <milliseconds>"),
            }
            Ok(())
        }
        "h" | "hold" => {
            driver.hold_position();
            println!("Holding position.");
            Ok(())
        }
        "d" | "done" => {
            driver.handle(VoiceEvent::AiTurnFinished);
            Ok(())
        }
        "g" | "goto" => match arg.and_then(|index| index.parse::<usize>().ok()) {
            Some(index) => driver.jump_to(index).map(drop),
            None => {
                eprintln!("Usage: g <index>");
                Ok(())
            }
        },
        "l" | "line" => {
            print_position(&driver.snapshot(), use_colors);
            Ok(())
        }
        "q" | "quit" => {
            if let Err(e) = driver.complete() {
                debug!(error = %e, "Rehearsal already finished");
            }
            return false;
        }
        "?" | "help" => {
            println!("{REHEARSE_HELP}");
            Ok(())
        }
        other => {
            eprintln!("Unknown command '{other}'. Type ? for commands.");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{e}");
    }
    true
}

fn drain_updates(updates: &mut UnboundedReceiver<DriverUpdate>, use_colors: bool) {
    while let Ok(update) = updates.try_recv() {
        print_update(&update, use_colors);
    }
}

fn print_update(update: &DriverUpdate, use_colors: bool) {
    use colors::*;
    match update {
        DriverUpdate::Moved(snapshot) => print_position(snapshot, use_colors),
        DriverUpdate::StatusChanged(SessionStatus::Paused) => println!("Paused."),
        DriverUpdate::StatusChanged(_) => println!("Resumed."),
        DriverUpdate::OfferHold => {
            if use_colors {
                println!("{YELLOW}Long pause.{RESET} Type h to hold position or n to move on.");
            } else {
                println!("Long pause. Type h to hold position or n to move on.");
            }
        }
        DriverUpdate::Completed => {
            if use_colors {
                println!("{GREEN}✓{RESET} Rehearsal complete");
            } else {
                println!("Rehearsal complete");
            }
        }
    }
}

fn print_position(snapshot: &OwnedTurnSnapshot, use_colors: bool) {
    use colors::*;
    let window = &snapshot.window;
    let current = window
        .cursor
        .checked_sub(window.start)
        .and_then(|offset| window.elements.get(offset));

    let Some(el) = current else {
        println!("[{}/{}] (no line)", window.cursor + 1, window.total);
        return;
    };

    let text = match (el.element_type, el.character_name.as_deref()) {
        (ElementType::Dialogue, Some(name)) => format!("{name}: {}", el.content),
        _ => element_text(el),
    };

    if use_colors {
        let type_color = element_color(el.element_type);
        println!("{DIM}[{}/{}]{RESET} {type_color}{text}{RESET}", window.cursor + 1, window.total);
    } else {
        println!("[{}/{}] {text}", window.cursor + 1, window.total);
    }
    println!(
        "        next: {}",
        speaker_label(&snapshot.next_speaker.character, snapshot.next_speaker.kind, use_colors)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_is_char_aware() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ééééééé", 4), "ééé…");
    }

    #[test]
    fn test_element_text_folds_parenthetical() {
        let cue = Element::new(ElementType::CharacterCue, 1, 1, "JOHN")
            .with_speech("JOHN", "Hi.")
            .with_parenthetical(Some("smiling".to_string()));
        assert_eq!(element_text(&cue), "JOHN (smiling)");

        let action = Element::new(ElementType::Action, 1, 2, "He waves.");
        assert_eq!(element_text(&action), "He waves.");
    }

    #[test]
    fn test_speaker_label_plain() {
        assert_eq!(speaker_label("MARY", SpeakerKind::Ai, false), "MARY (ai)");
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "cueline", "context", "script.txt", "--user", "JOHN", "--cursor", "3", "--format", "json", "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Context(args) => {
                assert_eq!(args.user, "JOHN");
                assert_eq!(args.cursor, 3);
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("expected context, got {other:?}"),
        }
    }
}
