//! Simulation report generation.

use serde::Serialize;

/// Outcome of one simulated campaign.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CampaignStats {
    pub seed: u64,
    pub highest_cleared: u32,
    pub runs_started: u64,
    pub runs_won: u64,
    pub deaths: u64,
    pub monsters_killed: u64,
    pub bosses_killed: u64,
    pub gold_earned: u64,
    pub ticks: u64,
    pub avg_hero_level: f64,
    pub reached_target: bool,
    pub timed_out: bool,
}

/// Aggregated results from multiple campaigns.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub num_runs: u32,
    pub campaigns_reaching_target: u32,
    pub campaigns_timed_out: u32,
    pub avg_highest_cleared: f64,
    pub best_highest_cleared: u32,
    pub avg_deaths: f64,
    pub avg_gold: f64,
    pub avg_ticks: f64,
    pub avg_hero_level: f64,
    /// Runs won / runs started across all campaigns
    pub win_rate: f64,
    pub campaigns: Vec<CampaignStats>,
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

impl SimReport {
    pub fn from_campaigns(campaigns: Vec<CampaignStats>) -> Self {
        let n = campaigns.len();
        let started: u64 = campaigns.iter().map(|c| c.runs_started).sum();
        let won: u64 = campaigns.iter().map(|c| c.runs_won).sum();

        Self {
            num_runs: n as u32,
            campaigns_reaching_target: campaigns.iter().filter(|c| c.reached_target).count() as u32,
            campaigns_timed_out: campaigns.iter().filter(|c| c.timed_out).count() as u32,
            avg_highest_cleared: mean(campaigns.iter().map(|c| c.highest_cleared as f64), n),
            best_highest_cleared: campaigns.iter().map(|c| c.highest_cleared).max().unwrap_or(0),
            avg_deaths: mean(campaigns.iter().map(|c| c.deaths as f64), n),
            avg_gold: mean(campaigns.iter().map(|c| c.gold_earned as f64), n),
            avg_ticks: mean(campaigns.iter().map(|c| c.ticks as f64), n),
            avg_hero_level: mean(campaigns.iter().map(|c| c.avg_hero_level), n),
            win_rate: if started == 0 {
                0.0
            } else {
                won as f64 / started as f64
            },
            campaigns,
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                  DUNGEON SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Campaigns: {} total, {} reached target, {} timed out\n\n",
            self.num_runs, self.campaigns_reaching_target, self.campaigns_timed_out
        ));

        report.push_str("── PROGRESSION ──────────────────────────────────────────────────\n");
        report.push_str(&format!(
            "  Avg Highest Cleared: {:.1} (best {})\n",
            self.avg_highest_cleared, self.best_highest_cleared
        ));
        report.push_str(&format!("  Avg Hero Level:      {:.1}\n", self.avg_hero_level));
        report.push_str(&format!("  Run Win Rate:        {:.1}%\n", self.win_rate * 100.0));
        report.push_str(&format!("  Avg Deaths:          {:.1}\n", self.avg_deaths));
        report.push_str(&format!("  Avg Gold Earned:     {:.0}\n", self.avg_gold));
        report.push_str(&format!("  Avg Ticks:           {:.0}\n\n", self.avg_ticks));

        report.push_str("── LEVEL REACHED ────────────────────────────────────────────────\n");
        let top = self.best_highest_cleared.max(1);
        for level in 1..=top.min(20) {
            let reached = self
                .campaigns
                .iter()
                .filter(|c| c.highest_cleared >= level)
                .count();
            let pct = if self.num_runs == 0 {
                0.0
            } else {
                reached as f64 / self.num_runs as f64 * 100.0
            };
            let bar = "█".repeat((pct / 5.0) as usize);
            report.push_str(&format!("  Level {:3}: {:>5.1}% {}\n", level, pct, bar));
        }
        report
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
