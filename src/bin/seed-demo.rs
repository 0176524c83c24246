//! Demo roster seed script
//!
//! Seeds the player table with the academy's two sample registrations:
//! - Thabo Mthembu, Forward, jersey #10, joining fee paid
//! - Nomsa Dlamini, Midfielder
//!
//! Players whose phone number is already registered are skipped, so the
//! script can run repeatedly. A demo player whose jersey number is held by
//! someone else is added without a jersey.
//!
//! Usage:
//!   DATABASE_URL=sqlite://academy.db ./seed-demo [--reset]

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use academy_registry::{
    db,
    models::player::{CreatePlayerRequest, Gender, Player, StatusFilter},
    services::{players::PlayerService, stats::StatsService},
};

#[derive(Parser)]
#[command(name = "seed-demo", about = "Seed the academy database with demo players")]
struct Args {
    /// Delete every player before seeding
    #[arg(long)]
    reset: bool,
}

fn demo_players() -> Vec<CreatePlayerRequest> {
    vec![
        CreatePlayerRequest {
            first_name: Some("Thabo".into()),
            last_name: Some("Mthembu".into()),
            date_of_birth: NaiveDate::from_ymd_opt(2010, 3, 15),
            gender: Some(Gender::Male),
            position: Some("Forward".into()),
            email: Some("thabo@email.com".into()),
            phone: Some("0821234567".into()),
            parent_guardian_name: Some("Sarah Mthembu".into()),
            parent_phone: Some("0831234567".into()),
            emergency_contact: Some("0831234567".into()),
            address: Some("123 Soccer Street, Johannesburg".into()),
            jersey_number: Some(10),
            joining_fee_paid: Some(true),
            ..Default::default()
        },
        CreatePlayerRequest {
            first_name: Some("Nomsa".into()),
            last_name: Some("Dlamini".into()),
            date_of_birth: NaiveDate::from_ymd_opt(2011, 7, 22),
            gender: Some(Gender::Female),
            position: Some("Midfielder".into()),
            phone: Some("0827654321".into()),
            parent_guardian_name: Some("John Dlamini".into()),
            address: Some("456 Academy Road, Soweto".into()),
            ..Default::default()
        },
    ]
}

enum Seed {
    /// Phone number already registered
    Skip,
    Insert {
        player: CreatePlayerRequest,
        /// Jersey dropped because another player wears it
        cleared_jersey: Option<i64>,
    },
}

fn plan(mut player: CreatePlayerRequest, roster: &[Player]) -> Seed {
    let phone = player.phone.as_deref().unwrap_or_default();
    if roster.iter().any(|p| p.phone == phone) {
        return Seed::Skip;
    }

    let cleared_jersey = player
        .jersey_number
        .filter(|jersey| roster.iter().any(|p| p.jersey_number == Some(*jersey)));
    if cleared_jersey.is_some() {
        player.jersey_number = None;
    }
    Seed::Insert {
        player,
        cleared_jersey,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL required")?;

    println!("=== Seed Demo Roster ===");

    let pool = db::create_pool(&database_url, 1).await?;
    db::run_migrations(&pool)
        .await
        .context("Failed to apply migrations")?;

    if args.reset {
        println!("Removing existing players...");
        sqlx::query("DELETE FROM players")
            .execute(&pool)
            .await
            .context("Failed to clear players")?;
        StatsService::refresh_snapshot(&pool).await;
    }

    for player in demo_players() {
        let name = format!(
            "{} {}",
            player.first_name.as_deref().unwrap_or_default(),
            player.last_name.as_deref().unwrap_or_default()
        );

        let roster = PlayerService::list(&pool, StatusFilter::All)
            .await
            .context("Failed to load roster")?;
        let (player, cleared_jersey) = match plan(player, &roster) {
            Seed::Skip => {
                println!("  Skipping {name}: already registered");
                continue;
            }
            Seed::Insert {
                player,
                cleared_jersey,
            } => (player, cleared_jersey),
        };
        if let Some(jersey) = cleared_jersey {
            println!("  Jersey #{jersey} is taken; adding {name} without a jersey");
        }

        let id = PlayerService::create(&pool, &player)
            .await
            .with_context(|| format!("Failed to insert {name}"))?;
        println!("  Added {name} (id {id})");
    }

    let stats = StatsService::academy_stats(&pool).await?;
    println!("\nAcademy statistics:");
    println!("  Total players:  {}", stats.total_players);
    println!("  Active players: {}", stats.active_players);
    for entry in &stats.positions_breakdown {
        println!("  {:<12} {}", entry.position, entry.count);
    }

    let snapshot = StatsService::snapshot(&pool).await?;
    println!(
        "  Cached row:     {} total / {} active (updated {})",
        snapshot.total_players, snapshot.active_players, snapshot.last_updated
    );

    let found = PlayerService::search(&pool, "Thabo").await?;
    println!("\nSearch results for 'Thabo': {} found", found.len());

    println!("=== Done ===");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_registry::models::player::PlayerStatus;

    fn registered(phone: &str, jersey_number: Option<i64>) -> Player {
        let date_of_birth = NaiveDate::from_ymd_opt(2012, 1, 1).unwrap();
        Player {
            player_id: 1,
            first_name: "Existing".into(),
            last_name: "Player".into(),
            date_of_birth,
            age: 12,
            gender: Gender::Male,
            position: None,
            email: None,
            phone: phone.into(),
            parent_guardian_name: None,
            parent_phone: None,
            emergency_contact: None,
            address: None,
            medical_info: None,
            registration_date: date_of_birth.and_hms_opt(9, 0, 0).unwrap(),
            status: PlayerStatus::Active,
            jersey_number,
            joining_fee_paid: false,
            monthly_fee_paid: false,
            notes: None,
        }
    }

    fn thabo() -> CreatePlayerRequest {
        demo_players().remove(0)
    }

    #[test]
    fn test_plan_inserts_into_empty_roster() {
        match plan(thabo(), &[]) {
            Seed::Insert {
                player,
                cleared_jersey,
            } => {
                assert_eq!(player.jersey_number, Some(10));
                assert_eq!(cleared_jersey, None);
            }
            Seed::Skip => panic!("expected insert"),
        }
    }

    #[test]
    fn test_plan_skips_registered_phone() {
        let roster = [registered("0821234567", None)];
        assert!(matches!(plan(thabo(), &roster), Seed::Skip));
    }

    #[test]
    fn test_plan_clears_taken_jersey() {
        let roster = [registered("0800000000", Some(10))];
        match plan(thabo(), &roster) {
            Seed::Insert {
                player,
                cleared_jersey,
            } => {
                assert_eq!(player.jersey_number, None);
                assert_eq!(cleared_jersey, Some(10));
                assert_eq!(player.phone.as_deref(), Some("0821234567"));
            }
            Seed::Skip => panic!("expected insert"),
        }
    }

    #[test]
    fn test_plan_keeps_free_jersey() {
        let roster = [registered("0800000000", Some(7))];
        match plan(thabo(), &roster) {
            Seed::Insert {
                player,
                cleared_jersey,
            } => {
                assert_eq!(player.jersey_number, Some(10));
                assert_eq!(cleared_jersey, None);
            }
            Seed::Skip => panic!("expected insert"),
        }
    }
}
