use sqlx::SqlitePool;
use tracing::warn;

use crate::models::stats::{AcademyStats, PositionCount, StatsSnapshot};

pub struct StatsService;

impl StatsService {
    /// Live roster aggregates. The three counts come from one statement so
    /// they always describe the same set of rows.
    pub async fn academy_stats(pool: &SqlitePool) -> anyhow::Result<AcademyStats> {
        let (total, active, recent): (i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'Active' THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN registration_date >= datetime('now', '-30 days')
                                      THEN 1 ELSE 0 END), 0)
             FROM players",
        )
        .fetch_one(pool)
        .await?;

        let positions = sqlx::query_as::<_, PositionCount>(
            "SELECT position, COUNT(*) AS count
             FROM players
             WHERE position IS NOT NULL AND position != '' AND status = 'Active'
             GROUP BY position
             ORDER BY position",
        )
        .fetch_all(pool)
        .await?;

        Ok(AcademyStats {
            total_players: total,
            active_players: active,
            inactive_players: total - active,
            recent_registrations: recent,
            positions_breakdown: positions,
        })
    }

    /// Recount the cached `academy_stats` row. Never fails the caller; a
    /// stale cache only affects the snapshot.
    pub async fn refresh_snapshot(pool: &SqlitePool) {
        let res = sqlx::query(
            "UPDATE academy_stats
             SET total_players  = (SELECT COUNT(*) FROM players),
                 active_players = (SELECT COUNT(*) FROM players WHERE status = 'Active'),
                 last_updated   = CURRENT_TIMESTAMP
             WHERE id = 1",
        )
        .execute(pool)
        .await;

        if let Err(e) = res {
            warn!("academy_stats refresh failed: {e}");
        }
    }

    pub async fn snapshot(pool: &SqlitePool) -> anyhow::Result<StatsSnapshot> {
        let snapshot = sqlx::query_as::<_, StatsSnapshot>(
            "SELECT total_players, active_players, last_updated FROM academy_stats WHERE id = 1",
        )
        .fetch_one(pool)
        .await?;
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use crate::models::player::{CreatePlayerRequest, PlayerStatus, UpdatePlayerRequest};
    use crate::services::players::PlayerService;
    use chrono::NaiveDate;

    fn request(first: &str, phone: &str, position: Option<&str>) -> CreatePlayerRequest {
        CreatePlayerRequest {
            first_name: Some(first.into()),
            last_name: Some("Tester".into()),
            date_of_birth: NaiveDate::from_ymd_opt(2011, 7, 22),
            phone: Some(phone.into()),
            position: position.map(Into::into),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_roster() {
        let pool = test_pool().await;
        let stats = StatsService::academy_stats(&pool).await.unwrap();
        assert_eq!(stats.total_players, 0);
        assert_eq!(stats.active_players, 0);
        assert_eq!(stats.inactive_players, 0);
        assert_eq!(stats.recent_registrations, 0);
        assert!(stats.positions_breakdown.is_empty());
    }

    #[tokio::test]
    async fn test_counts_and_breakdown() {
        let pool = test_pool().await;
        PlayerService::create(&pool, &request("A", "1", Some("Forward"))).await.unwrap();
        PlayerService::create(&pool, &request("B", "2", Some("Forward"))).await.unwrap();
        PlayerService::create(&pool, &request("C", "3", Some("Defender"))).await.unwrap();
        PlayerService::create(&pool, &request("D", "4", None)).await.unwrap();
        let suspended = PlayerService::create(&pool, &request("E", "5", Some("Goalkeeper")))
            .await
            .unwrap();

        let update = UpdatePlayerRequest {
            status: Some(PlayerStatus::Suspended),
            ..Default::default()
        };
        PlayerService::update(&pool, suspended, &update).await.unwrap();

        let stats = StatsService::academy_stats(&pool).await.unwrap();
        assert_eq!(stats.total_players, 5);
        assert_eq!(stats.active_players, 4);
        assert_eq!(stats.inactive_players, 1);
        assert_eq!(stats.total_players, stats.active_players + stats.inactive_players);
        assert_eq!(stats.recent_registrations, 5);
        assert!(stats.recent_registrations <= stats.total_players);

        let breakdown: Vec<(&str, i64)> = stats
            .positions_breakdown
            .iter()
            .map(|p| (p.position.as_str(), p.count))
            .collect();
        assert_eq!(breakdown, vec![("Defender", 1), ("Forward", 2)]);
    }

    #[tokio::test]
    async fn test_recent_window_excludes_old_registrations() {
        let pool = test_pool().await;
        let old = PlayerService::create(&pool, &request("Old", "1", None)).await.unwrap();
        PlayerService::create(&pool, &request("New", "2", None)).await.unwrap();

        sqlx::query("UPDATE players SET registration_date = datetime('now', '-45 days') WHERE player_id = ?")
            .bind(old)
            .execute(&pool)
            .await
            .unwrap();

        let stats = StatsService::academy_stats(&pool).await.unwrap();
        assert_eq!(stats.total_players, 2);
        assert_eq!(stats.recent_registrations, 1);
    }

    #[tokio::test]
    async fn test_snapshot_follows_mutations() {
        let pool = test_pool().await;
        let snapshot = StatsService::snapshot(&pool).await.unwrap();
        assert_eq!(snapshot.total_players, 0);

        let id = PlayerService::create(&pool, &request("A", "1", None)).await.unwrap();
        PlayerService::create(&pool, &request("B", "2", None)).await.unwrap();
        let snapshot = StatsService::snapshot(&pool).await.unwrap();
        assert_eq!(snapshot.total_players, 2);
        assert_eq!(snapshot.active_players, 2);

        PlayerService::delete(&pool, id).await.unwrap();
        let snapshot = StatsService::snapshot(&pool).await.unwrap();
        assert_eq!(snapshot.total_players, 1);
        assert_eq!(snapshot.active_players, 1);
    }
    #[tokio::test]
    async fn test_snapshot_follows_status_update() {
        let pool = test_pool().await;
        let id = PlayerService::create(&pool, &request("A", "1", None)).await.unwrap();
        PlayerService::create(&pool, &request("B", "2", None)).await.unwrap();
        let before = StatsService::snapshot(&pool).await.unwrap();
        assert_eq!(before.total_players, 2);
        assert_eq!(before.active_players, 2);

        let update = UpdatePlayerRequest {
            status: Some(PlayerStatus::Inactive),
            ..Default::default()
        };
        PlayerService::update(&pool, id, &update).await.unwrap();

        let after = StatsService::snapshot(&pool).await.unwrap();
        assert_eq!(after.total_players, 2);
        assert_eq!(after.active_players, 1);
    }
}
