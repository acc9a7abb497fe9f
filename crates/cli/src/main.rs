//! Offline console demo running a full conversation without any API keys
//!
//! Exercises the real state machine, slot manager, guardrails, and mock
//! backends. No language model, no telephony, no network calls.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use callflow_agent::{TurnCoordinator, TurnReply};
use callflow_config::load_settings;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    Booking,
    Info,
    Emergency,
}

impl Scenario {
    fn steps(self) -> &'static [&'static str] {
        match self {
            Self::Booking => &[
                "I need to book a plumber",
                "John Smith",
                "0412345678",
                "2025-03-15",
                "10:00",
                "42 Wallaby Way, Sydney",
                "Leaking kitchen tap",
                "yes",
                "no thanks, bye",
            ],
            Self::Info => &[
                "How much does electrical work cost?",
                "What about plumbing?",
                "no thanks, that's all",
            ],
            Self::Emergency => &["I have a gas leak!", "0400111222"],
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Info => "info",
            Self::Emergency => "emergency",
        }
    }
}

/// Offline console demo for the call-flow orchestrator
#[derive(Parser, Debug)]
#[command(name = "callflow", version, about)]
struct Args {
    /// Auto-play a pre-scripted scenario instead of interactive mode
    #[arg(long, value_enum)]
    scenario: Option<Scenario>,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn print_reply(reply: &TurnReply) {
    for message in &reply.messages {
        println!("[{}] {}", reply.persona.label(), message);
    }
    println!("  >> State: {}", reply.state);
}

fn print_summary(coordinator: &TurnCoordinator) {
    println!("{}", "=".repeat(60));
    println!("  State trace: {}", coordinator.state_trace().join(" -> "));
    let stats = coordinator.slots().stats();
    println!(
        "  Slot stats: attempts={} corrections={} filled={}/{} fill_rate={:.2}",
        stats.total_attempts,
        stats.total_corrections,
        stats.slots_filled,
        stats.slots_required,
        stats.fill_rate
    );
    println!("{}", "=".repeat(60));
}

fn run_scenario(mut coordinator: TurnCoordinator, scenario: Scenario) -> Result<()> {
    println!("{}", "=".repeat(60));
    println!("  CALL-FLOW ORCHESTRATOR - Scenario: {}", scenario.name());
    println!("{}", "=".repeat(60));

    let reply = coordinator.greet()?;
    print_reply(&reply);

    for step in scenario.steps() {
        if coordinator.is_terminal() {
            break;
        }
        println!("\n[Caller] {}", step);
        let reply = coordinator.process_turn(step)?;
        print_reply(&reply);
    }

    println!("\n  Scenario '{}' complete.", scenario.name());
    print_summary(&coordinator);
    Ok(())
}

fn run_interactive(mut coordinator: TurnCoordinator) -> Result<()> {
    println!("{}", "=".repeat(60));
    println!("  CALL-FLOW ORCHESTRATOR - Console Demo");
    println!("  Type 'quit' to exit");
    println!("{}", "=".repeat(60));

    let reply = coordinator.greet()?;
    print_reply(&reply);

    let stdin = io::stdin();
    while !coordinator.is_terminal() {
        print!("\n[Caller] ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("Session ended.");
            return Ok(());
        }

        let reply = coordinator.process_turn(input)?;
        print_reply(&reply);
    }

    println!("\n  Conversation complete.");
    print_summary(&coordinator);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = load_settings(args.config.as_deref())?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone())),
        )
        .init();

    println!("  Business: {}", settings.business.name);
    let coordinator = TurnCoordinator::new(settings);

    match args.scenario {
        Some(scenario) => run_scenario(coordinator, scenario),
        None => run_interactive(coordinator),
    }
}
