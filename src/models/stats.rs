use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// Response of `GET /api/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct AcademyStats {
    pub total_players: i64,
    pub active_players: i64,
    pub inactive_players: i64,
    pub recent_registrations: i64,
    pub positions_breakdown: Vec<PositionCount>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PositionCount {
    pub position: String,
    pub count: i64,
}

/// The cached `academy_stats` row.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatsSnapshot {
    pub total_players: i64,
    pub active_players: i64,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub last_updated: NaiveDateTime,
}
