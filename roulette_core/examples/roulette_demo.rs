//! Coffee Roulette Demo - Several Rounds in the Terminal
//!
//! Forms consecutive rounds for a small team and shows how the history
//! steers each round away from compositions already used:
//!
//! 1. Pairs with an odd roster (leftover joins a trio)
//! 2. Strict pairs (leftover sits out, no repeats)
//! 3. Groups of three
//!
//! Run: `cargo run --example roulette_demo`

use roulette_core::{participants, Matchmaker, RoundConfig};
use roulette_env::SystemContext;

// ============================================================================
// ANSI COLOR CODES
// ============================================================================

mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BRIGHT_CYAN: &str = "\x1b[96m";
}

use colors::*;

const TEAM: [&str; 7] = [
    "ada@example.com",
    "grace@example.com",
    "linus@example.com",
    "barbara@example.com",
    "ken@example.com",
    "margaret@example.com",
    "dennis@example.com",
];

fn header(title: &str) {
    println!();
    println!("{BOLD}{BRIGHT_CYAN}━━━ {title} ━━━{RESET}");
}

fn play(title: &str, config: RoundConfig, rounds: usize) {
    header(title);

    let team = participants(TEAM);
    let mut matchmaker = Matchmaker::new(SystemContext::shared());

    for _ in 0..rounds {
        let report = match matchmaker.create_round_report(&team, &config) {
            Ok(report) => report,
            Err(e) => {
                println!("{YELLOW}error: {e}{RESET}");
                return;
            }
        };

        match report.round {
            Some(round) => {
                println!("{BOLD}Round {round}{RESET}");
                for group in &report.groups {
                    println!("  {GREEN}●{RESET} {group}");
                }
            }
            None => println!("{YELLOW}No fresh grouping left{RESET}"),
        }
        for id in &report.sitting_out {
            println!("  {DIM}○ {id} sits out{RESET}");
        }
    }

    let history = matchmaker.history();
    let pairs_met: usize = history
        .participants()
        .map(|(_, record)| record.contacts.len())
        .sum::<usize>()
        / 2;
    println!(
        "{DIM}{} participants recorded, {} distinct pairs met{RESET}",
        history.len(),
        pairs_met
    );
}

fn main() {
    println!("{BOLD}☕ Coffee Roulette{RESET} - {} participants", TEAM.len());

    play("Pairs, leftover joins a trio", RoundConfig::new(2), 4);
    play(
        "Strict pairs, leftover sits out",
        RoundConfig::new(2).with_odd_group(false),
        4,
    );
    play("Groups of three", RoundConfig::new(3), 3);
}
