// rinkcap entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file)
// 2. Load config
// 3. Load the player sheet into a pool
// 4. Recompute valuations and bids
// 5. Solve the managed team's roster
// 6. Print the report
//
// Usage: rinkcap [PLAYERS_CSV] [--json]; see `rinkcap --help`.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rinkcap_cli::cli::Args;
use rinkcap_cli::{import, report};
use rinkcap_core::config;
use rinkcap_core::pool::PlayerPool;
use rinkcap_core::session::AuctionSession;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 1. Initialize tracing
    init_tracing()?;
    info!("rinkcap starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams, {:.2} salary cap",
        config.league.name, config.league.num_teams, config.league.salary_cap
    );

    // 3. Load players
    let players_path = args
        .players
        .unwrap_or_else(|| PathBuf::from(&config.data_paths.players));
    let records = import::load_players(&players_path)
        .with_context(|| format!("failed to load players from {}", players_path.display()))?;
    let salary_cap = config.league.salary_cap;
    let mut session = AuctionSession::new(config, PlayerPool::from_records(records));

    // 4. Valuation
    let summary = session
        .recompute()
        .context("player pool is empty; nothing to value")?;
    let budgets = session.team_budgets();

    // 5. Optimization
    let outcome = session.optimize().context("roster optimization failed")?;

    // 6. Report
    if args.json {
        let json = report::RunReport::new(&summary, &budgets, &outcome)
            .to_json()
            .context("failed to serialize report")?;
        println!("{json}");
    } else {
        print!("{}", report::render_summary(&summary));
        println!();
        print!("{}", report::render_budgets(&budgets, salary_cap));
        println!();
        print!("{}", report::render_roster(&outcome));
    }

    info!("rinkcap finished: optimizer {}", outcome.label());
    Ok(())
}

/// Initialize tracing to log to `logs/rinkcap.log`; stdout carries the report.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("rinkcap.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rinkcap=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
