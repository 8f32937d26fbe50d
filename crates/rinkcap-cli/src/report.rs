// Plain-text and JSON rendering of a valuation run.

use std::fmt::Write;

use rinkcap_core::optimizer::RosterOutcome;
use rinkcap_core::pool::budget::TeamBudget;
use rinkcap_core::valuation::MarketSummary;
use serde::Serialize;

pub fn render_summary(summary: &MarketSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Market");
    let _ = writeln!(out, "  total pool         {:>10.2}", summary.total_pool);
    let _ = writeln!(out, "  committed salary   {:>10.2}", summary.committed_salary);
    let _ = writeln!(out, "  available to spend {:>10.2}", summary.available_to_spend);
    let _ = writeln!(out, "  draftable players  {:>10}", summary.player_count);
    let _ = writeln!(out, "  total z            {:>10.2}", summary.total_z);
    let _ = writeln!(out, "  reserve            {:>10.2}", summary.reserve);
    let _ = writeln!(out, "  rate per z         {:>10.3}", summary.rate);
    let _ = writeln!(out, "  sum of bids        {:>10.2}", summary.total_bid_sum);
    out
}

pub fn render_budgets(budgets: &[TeamBudget], salary_cap: f64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Budgets (cap {salary_cap:.2})");
    let _ = writeln!(
        out,
        "  {:<5} {:>9} {:>9} {:>8} {:>9} {:>9}  {:>3} {:>3} {:>3}",
        "TEAM", "SALARY", "AUCTION", "PENALTY", "SPENT", "LEFT", "F", "D", "G"
    );
    for b in budgets {
        let _ = writeln!(
            out,
            "  {:<5} {:>9.2} {:>9.2} {:>8.2} {:>9.2} {:>9.2}  {:>3} {:>3} {:>3}{}",
            b.code,
            b.committed_salary,
            b.auction_spending,
            b.penalty,
            b.total_spent,
            b.remaining,
            b.f_count,
            b.d_count,
            b.g_count,
            if b.is_over_cap() { "  OVER CAP" } else { "" }
        );
    }
    out
}

pub fn render_roster(outcome: &RosterOutcome) -> String {
    let mut out = String::new();
    match outcome {
        RosterOutcome::Optimal(roster) | RosterOutcome::Suboptimal(roster) => {
            let _ = writeln!(out, "Proposed roster for {} ({})", roster.team_code, outcome.label());
            for p in &roster.players {
                let _ = writeln!(
                    out,
                    "  {} {:<28} {:<6} {:>4} pts {:>7.2}{}",
                    p.position,
                    p.name,
                    p.league_team,
                    p.points,
                    p.total_cost,
                    if p.locked { "  (kept)" } else { "" }
                );
            }
            let _ = writeln!(
                out,
                "  total: {} points, cost {:.2}",
                roster.total_points, roster.total_cost
            );
        }
        RosterOutcome::Infeasible { reason } => {
            let _ = writeln!(out, "No feasible roster: {reason}");
        }
        RosterOutcome::TimeLimit => {
            let _ = writeln!(out, "Optimizer hit its time limit without a roster");
        }
        RosterOutcome::Failed(message) => {
            let _ = writeln!(out, "Optimizer failed: {message}");
        }
    }
    out
}

/// Machine-readable form of one run.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub summary: &'a MarketSummary,
    pub budgets: &'a [TeamBudget],
    pub outcome: &'static str,
    pub roster: Option<&'a rinkcap_core::optimizer::ProposedRoster>,
}

impl<'a> RunReport<'a> {
    pub fn new(
        summary: &'a MarketSummary,
        budgets: &'a [TeamBudget],
        outcome: &'a RosterOutcome,
    ) -> Self {
        RunReport {
            summary,
            budgets,
            outcome: outcome.label(),
            roster: outcome.roster(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
