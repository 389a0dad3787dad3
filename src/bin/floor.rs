// Pit Floor Runner — seedable end-to-end validation of the auction engine
// Writes results to floor-results/floor-{timestamp}.json
//
// Usage:
//   cargo run --release --bin floor                  # Run all scenarios (10 seeds each)
//   cargo run --release --bin floor -- --runs 3      # Quick mode
//   cargo run --release --bin floor -- --seed 42     # Custom base seed
//   cargo run --release --bin floor -- SWARM         # Filter by name

use num_traits::ToPrimitive;
use pit_engine::rivals::{poisson_arrivals, AutoBidder, RivalScheduler, RIVAL_NAMES};
use pit_engine::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal_macros::dec;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

// ─── Scenario Configuration ──────────────────────────────────────────────────

struct Scenario {
    name: &'static str,
    label: &'static str,
    rivals: usize,
    rival_credits: u32,
    /// Credits the player buys up front (bounded by the 10.00 balance).
    player_credits: u32,
    autobid: bool,
    collect_bonus: bool,
    /// Poisson rate of EXTRA rival strike attempts per second (0 = one
    /// attempt per second, the classic pacing).
    surge_lambda: f64,
    max_ticks: u64,
    params: AuctionParams,
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "CLASSIC_SNIPE", label: "Classic Snipe War",
            rivals: 4, rival_credits: 15, player_credits: 16,
            autobid: true, collect_bonus: false, surge_lambda: 0.0, max_ticks: 2_000,
            params: AuctionParams::default(),
        },
        Scenario {
            name: "BOT_SWARM", label: "Bot Swarm",
            rivals: 10, rival_credits: 20, player_credits: 16,
            autobid: false, collect_bonus: false, surge_lambda: 1.5, max_ticks: 5_000,
            params: AuctionParams::default(),
        },
        Scenario {
            name: "CREDIT_DROUGHT", label: "Credit Drought",
            rivals: 3, rival_credits: 1, player_credits: 2,
            autobid: true, collect_bonus: false, surge_lambda: 0.0, max_ticks: 500,
            params: AuctionParams::default(),
        },
        Scenario {
            name: "LONE_PLAYER", label: "Lone Player",
            rivals: 0, rival_credits: 0, player_credits: 5,
            autobid: true, collect_bonus: false, surge_lambda: 0.0, max_ticks: 200,
            params: AuctionParams::default(),
        },
        Scenario {
            name: "NO_BIDS", label: "Silent Expiry",
            rivals: 0, rival_credits: 0, player_credits: 0,
            autobid: false, collect_bonus: false, surge_lambda: 0.0, max_ticks: 50,
            params: AuctionParams::default(),
        },
        Scenario {
            // Player never bids, only snatches the lucky coin each cycle.
            name: "BONUS_HUNT", label: "Bonus Hunt",
            rivals: 4, rival_credits: 10, player_credits: 0,
            autobid: false, collect_bonus: true, surge_lambda: 0.0, max_ticks: 2_000,
            params: AuctionParams::default(),
        },
        Scenario {
            name: "HIGH_STAKES", label: "High Stakes",
            rivals: 6, rival_credits: 12, player_credits: 10,
            autobid: true, collect_bonus: false, surge_lambda: 0.8, max_ticks: 3_000,
            params: AuctionParams {
                starting_price: Lari(dec!(1.00)),
                increment: Lari(dec!(0.05)),
                bid_cost: Lari(dec!(1.00)),
                countdown_secs: 15,
                ..AuctionParams::default()
            },
        },
    ]
}

// ─── Per-run outcome ─────────────────────────────────────────────────────────

struct RunOutcome {
    ended: bool,
    price_exact: bool,
    conserved: bool,
    wallets_clean: bool,
    ticks_used: u64,
    bid_count: usize,
    final_price: f64,
    jackpot_triggered: bool,
}

impl RunOutcome {
    fn pass(&self) -> bool {
        self.ended && self.price_exact && self.conserved && self.wallets_clean
    }
}

fn run_once(scenario: &Scenario, seed: u64) -> RunOutcome {
    let store = Arc::new(InMemoryStore::new());
    let host = Arc::new(GameHost::with_seed(store, seed));

    let player = host.register_player("vako12");
    if scenario.player_credits > 0 {
        host.buy_credits(&player, scenario.player_credits)
            .expect("player can afford the opening credit pack");
    }
    let roster: Vec<UserId> = RIVAL_NAMES
        .iter()
        .take(scenario.rivals)
        .map(|name| host.register_rival(name, scenario.rival_credits))
        .collect();

    let auction = host
        .create_auction(scenario.label, "validation run", scenario.params.clone())
        .expect("scenario params are valid");

    let mut scheduler = RivalScheduler::new(ChaCha8Rng::seed_from_u64(seed ^ 0xA5A5_5A5A));
    let mut surge_rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5A5A_A5A5);
    let autobidder = AutoBidder::default();

    let mut ticks_used = 0u64;
    let mut ended = false;
    for _ in 0..scenario.max_ticks {
        let mut snapshot = host.tick(&auction).expect("auction registered");
        ticks_used += 1;
        if snapshot.phase.is_terminal() {
            ended = true;
            break;
        }
        // One strike attempt per second, plus a Poisson-distributed
        // surge of extra attempts when the scenario simulates a crowd.
        let attempts = 1 + poisson_arrivals(&mut surge_rng, scenario.surge_lambda);
        for _ in 0..attempts {
            if let Some(rival) = scheduler.decide(&snapshot, &roster) {
                if let Ok(updated) = host.place_bid(&auction, &rival) {
                    snapshot = updated;
                }
            }
        }
        if scenario.autobid {
            let credits = host.user(&player).map(|u| u.credits).unwrap_or(0);
            if autobidder.should_bid(&snapshot, credits) {
                let _ = host.place_bid(&auction, &player);
            }
        }
        if scenario.collect_bonus {
            let _ = host.collect_bonus(&auction, &player);
        }
    }

    let snapshot = host.snapshot(&auction).expect("auction registered");

    // Price invariant: derived price must be exact after any bid count.
    let expected = scenario.params.starting_price
        + scenario.params.increment * snapshot.bid_count as u64;
    let price_exact = snapshot.current_price == expected;

    // Conservation: pool payouts never exceed the pool.
    let conserved = match &snapshot.results {
        Some(results) => results.pool_payout_total() <= snapshot.prize_pool,
        None => snapshot.bid_count == 0 || !ended,
    };

    // No wallet may end negative (credits are unsigned by construction).
    let wallets_clean = host
        .leaderboard()
        .iter()
        .all(|user| user.balance >= Lari::zero());

    RunOutcome {
        ended,
        price_exact,
        conserved,
        wallets_clean,
        ticks_used,
        bid_count: snapshot.bid_count,
        final_price: snapshot.current_price.0.to_f64().unwrap_or(0.0),
        jackpot_triggered: snapshot
            .results
            .as_ref()
            .map(|r| r.jackpot_triggered)
            .unwrap_or(false),
    }
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ScenarioReport {
    name: String,
    label: String,
    runs: usize,
    passed: usize,
    pass_rate: f64,
    avg_ticks: f64,
    avg_bids: f64,
    avg_final_price: f64,
    jackpot_hits: usize,
    elapsed_ms: u128,
}

#[derive(Serialize)]
struct FloorReport {
    timestamp: String,
    version: &'static str,
    prng: &'static str,
    runs_per_scenario: usize,
    base_seed: u64,
    summary: Summary,
    scenarios: Vec<ScenarioReport>,
}

#[derive(Serialize)]
struct Summary {
    total: usize,
    passed: usize,
    failed: usize,
}

fn run_scenario(scenario: &Scenario, runs: usize, base_seed: u64) -> ScenarioReport {
    let start = Instant::now();
    let outcomes: Vec<RunOutcome> = (0..runs)
        .map(|i| run_once(scenario, base_seed + i as u64))
        .collect();

    let passed = outcomes.iter().filter(|o| o.pass()).count();
    let n = outcomes.len().max(1) as f64;
    ScenarioReport {
        name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        runs,
        passed,
        pass_rate: passed as f64 / n,
        avg_ticks: outcomes.iter().map(|o| o.ticks_used as f64).sum::<f64>() / n,
        avg_bids: outcomes.iter().map(|o| o.bid_count as f64).sum::<f64>() / n,
        avg_final_price: outcomes.iter().map(|o| o.final_price).sum::<f64>() / n,
        jackpot_hits: outcomes.iter().filter(|o| o.jackpot_triggered).count(),
        elapsed_ms: start.elapsed().as_millis(),
    }
}

// ─── CLI Parsing ─────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 10,
        seed: 0,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(10);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() {
    let cli = parse_args();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios
                .iter()
                .filter(|s| {
                    s.name.to_lowercase().contains(&f_lower)
                        || s.label.to_lowercase().contains(&f_lower)
                })
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    println!("\n  Pit Floor Runner v0.2.0");
    println!(
        "  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}",
        cli.runs, cli.seed
    );
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!(
        "  {:<24} {:>6} {:>8} {:>8} {:>10} {:>8} {:>7}",
        "Scenario", "Pass%", "Ticks", "Bids", "Price", "Jackpot", "Time"
    );
    println!("  {}", "-".repeat(78));

    let mut reports = Vec::new();
    for scenario in &to_run {
        let report = run_scenario(scenario, cli.runs, cli.seed);
        let status = if report.passed == report.runs { "PASS" } else { "FAIL" };
        println!(
            "  {:<24} {:>5.0}% {:>8.1} {:>8.1} {:>9.2}₾ {:>5}/{:<2} {:>5}ms  {}",
            report.label,
            report.pass_rate * 100.0,
            report.avg_ticks,
            report.avg_bids,
            report.avg_final_price,
            report.jackpot_hits,
            report.runs,
            report.elapsed_ms,
            status,
        );
        reports.push(report);
    }

    let total = reports.len();
    let passed = reports.iter().filter(|r| r.passed == r.runs).count();
    let failed = total - passed;
    println!("  {}", "-".repeat(78));
    println!("  Total: {}  Passed: {}  Failed: {}\n", total, passed, failed);

    // Write JSON report
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock before epoch")
        .as_millis();
    let timestamp = format!("{}", ts);

    let report = FloorReport {
        timestamp: timestamp.clone(),
        version: "0.2.0",
        prng: "ChaCha8Rng",
        runs_per_scenario: cli.runs,
        base_seed: cli.seed,
        summary: Summary { total, passed, failed },
        scenarios: reports,
    };

    let dir = std::path::Path::new("floor-results");
    if !dir.exists() {
        std::fs::create_dir_all(dir).expect("Failed to create floor-results/");
    }
    let path = dir.join(format!("floor-{}.json", timestamp));
    let json = serde_json::to_string_pretty(&report).expect("Failed to serialize");
    std::fs::write(&path, &json).expect("Failed to write report file");
    println!("  Results saved to: {}\n", path.display());

    if failed > 0 {
        std::process::exit(1);
    }
}
