use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_gauge, register_gauge_vec, CounterVec, Gauge, GaugeVec};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::services::stats::StatsService;

lazy_static! {
    // ── Event counters ──────────────────────────────────────────────────────
    pub static ref PLAYER_MUTATIONS_COUNTER: CounterVec = register_counter_vec!(
        "academy_player_mutations_total",
        "Player create/update/delete requests by outcome",
        &["action", "outcome"]
    ).unwrap();

    // ── Roster gauges ───────────────────────────────────────────────────────
    pub static ref PLAYERS_GAUGE: Gauge = register_gauge!(
        "academy_players_total",
        "Registered players"
    ).unwrap();

    pub static ref ACTIVE_PLAYERS_GAUGE: Gauge = register_gauge!(
        "academy_players_active",
        "Players with status Active"
    ).unwrap();

    pub static ref RECENT_PLAYERS_GAUGE: Gauge = register_gauge!(
        "academy_players_recent",
        "Players registered in the last 30 days"
    ).unwrap();

    pub static ref POSITION_GAUGE: GaugeVec = register_gauge_vec!(
        "academy_players_by_position",
        "Active players per position",
        &["position"]
    ).unwrap();
}

pub fn record_mutation(action: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    PLAYER_MUTATIONS_COUNTER
        .with_label_values(&[action, outcome])
        .inc();
}

/// Spawn the background gauge collector.
pub fn start(pool: SqlitePool, interval: Duration) {
    tokio::spawn(async move {
        loop {
            if let Err(e) = collect(&pool).await {
                warn!("Metrics: collection failed: {}", e);
            }
            tokio::time::sleep(interval).await;
        }
    });
}

async fn collect(pool: &SqlitePool) -> anyhow::Result<()> {
    let stats = StatsService::academy_stats(pool).await?;

    PLAYERS_GAUGE.set(stats.total_players as f64);
    ACTIVE_PLAYERS_GAUGE.set(stats.active_players as f64);
    RECENT_PLAYERS_GAUGE.set(stats.recent_registrations as f64);

    // Positions that emptied out since the last pass must disappear
    POSITION_GAUGE.reset();
    for entry in &stats.positions_breakdown {
        POSITION_GAUGE
            .with_label_values(&[entry.position.as_str()])
            .set(entry.count as f64);
    }

    debug!("Metrics: collected for {} player(s)", stats.total_players);
    Ok(())
}
