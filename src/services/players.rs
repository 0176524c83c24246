use chrono::{Local, NaiveDate};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::info;

use crate::{
    models::player::{
        age_on, CreatePlayerRequest, Player, StatusFilter, UpdatePlayerRequest,
    },
    services::stats::StatsService,
};

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Jersey number {0} is already assigned to another player")]
    DuplicateJersey(i64),
    #[error("Player {0} not found")]
    NotFound(i64),
    #[error("No fields to update")]
    NothingToUpdate,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct PlayerService;

impl PlayerService {
    pub async fn create(pool: &SqlitePool, req: &CreatePlayerRequest) -> Result<i64, PlayerError> {
        let first_name = required_text(req.first_name.as_deref(), "first_name")?;
        let last_name = required_text(req.last_name.as_deref(), "last_name")?;
        let date_of_birth = req
            .date_of_birth
            .ok_or(PlayerError::MissingField("date_of_birth"))?;
        let phone = required_text(req.phone.as_deref(), "phone")?;

        let result = sqlx::query(
            "INSERT INTO players (
                first_name, last_name, date_of_birth, age, gender, position,
                email, phone, parent_guardian_name, parent_phone, emergency_contact,
                address, medical_info, status, jersey_number,
                joining_fee_paid, monthly_fee_paid, notes, search_key
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(date_of_birth)
        .bind(age_on(date_of_birth, today()))
        .bind(req.gender.unwrap_or_default())
        .bind(optional_text(req.position.as_deref()))
        .bind(optional_text(req.email.as_deref()))
        .bind(phone)
        .bind(optional_text(req.parent_guardian_name.as_deref()))
        .bind(optional_text(req.parent_phone.as_deref()))
        .bind(optional_text(req.emergency_contact.as_deref()))
        .bind(optional_text(req.address.as_deref()))
        .bind(optional_text(req.medical_info.as_deref()))
        .bind(req.status.unwrap_or_default())
        .bind(req.jersey_number)
        .bind(req.joining_fee_paid.unwrap_or(false))
        .bind(req.monthly_fee_paid.unwrap_or(false))
        .bind(optional_text(req.notes.as_deref()))
        .bind(search_key(
            first_name,
            last_name,
            optional_text(req.position.as_deref()),
            phone,
        ))
        .execute(pool)
        .await
        .map_err(|e| jersey_conflict(e, req.jersey_number))?;

        let player_id = result.last_insert_rowid();
        info!(player_id, "Player {first_name} {last_name} added");

        StatsService::refresh_snapshot(pool).await;
        Ok(player_id)
    }

    pub async fn list(pool: &SqlitePool, filter: StatusFilter) -> Result<Vec<Player>, PlayerError> {
        let players = match filter {
            StatusFilter::All => {
                sqlx::query_as::<_, Player>(
                    "SELECT * FROM players ORDER BY registration_date DESC, player_id DESC",
                )
                .fetch_all(pool)
                .await?
            }
            StatusFilter::Only(status) => {
                sqlx::query_as::<_, Player>(
                    "SELECT * FROM players WHERE status = ?
                     ORDER BY registration_date DESC, player_id DESC",
                )
                .bind(status)
                .fetch_all(pool)
                .await?
            }
        };
        Ok(with_current_ages(players))
    }

    pub async fn get(pool: &SqlitePool, player_id: i64) -> Result<Option<Player>, PlayerError> {
        let player = sqlx::query_as::<_, Player>("SELECT * FROM players WHERE player_id = ?")
            .bind(player_id)
            .fetch_optional(pool)
            .await?;
        Ok(player.map(|p| p.with_age_on(today())))
    }

    /// Case-insensitive substring match on first name, last name, full name,
    /// position and phone. Case folding is Unicode-aware, so "élodie" finds
    /// "Élodie".
    pub async fn search(pool: &SqlitePool, term: &str) -> Result<Vec<Player>, PlayerError> {
        let needle = term.to_lowercase();
        let players = sqlx::query_as::<_, Player>(
            "SELECT * FROM players
             WHERE ? = '' OR instr(search_key, ?) > 0
             ORDER BY first_name COLLATE NOCASE, last_name COLLATE NOCASE",
        )
        .bind(&needle)
        .bind(&needle)
        .fetch_all(pool)
        .await?;
        Ok(with_current_ages(players))
    }

    /// Write only the supplied columns. A new birth date re-derives `age` in
    /// the same statement.
    pub async fn update(
        pool: &SqlitePool,
        player_id: i64,
        req: &UpdatePlayerRequest,
    ) -> Result<(), PlayerError> {
        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE players SET ");
        let mut columns = builder.separated(", ");
        let mut touched = 0usize;
        let rekey = req.first_name.is_some()
            || req.last_name.is_some()
            || req.position.is_some()
            || req.phone.is_some();

        if let Some(v) = &req.first_name {
            columns.push("first_name = ").push_bind_unseparated(required_text(Some(v.as_str()), "first_name")?);
            touched += 1;
        }
        if let Some(v) = &req.last_name {
            columns.push("last_name = ").push_bind_unseparated(required_text(Some(v.as_str()), "last_name")?);
            touched += 1;
        }
        if let Some(dob) = req.date_of_birth {
            columns.push("date_of_birth = ").push_bind_unseparated(dob);
            columns.push("age = ").push_bind_unseparated(age_on(dob, today()));
            touched += 1;
        }
        if let Some(v) = req.gender {
            columns.push("gender = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = &req.phone {
            columns.push("phone = ").push_bind_unseparated(required_text(Some(v.as_str()), "phone")?);
            touched += 1;
        }
        if let Some(v) = req.status {
            columns.push("status = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = req.jersey_number {
            columns.push("jersey_number = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = req.joining_fee_paid {
            columns.push("joining_fee_paid = ").push_bind_unseparated(v);
            touched += 1;
        }
        if let Some(v) = req.monthly_fee_paid {
            columns.push("monthly_fee_paid = ").push_bind_unseparated(v);
            touched += 1;
        }

        let nullable_text = [
            ("position", &req.position),
            ("email", &req.email),
            ("parent_guardian_name", &req.parent_guardian_name),
            ("parent_phone", &req.parent_phone),
            ("emergency_contact", &req.emergency_contact),
            ("address", &req.address),
            ("medical_info", &req.medical_info),
            ("notes", &req.notes),
        ];
        for (column, value) in nullable_text {
            if let Some(v) = value {
                columns
                    .push(column)
                    .push_unseparated(" = ")
                    .push_bind_unseparated(optional_text(v.as_deref()));
                touched += 1;
            }
        }

        if touched == 0 {
            return Err(PlayerError::NothingToUpdate);
        }

        builder.push(" WHERE player_id = ").push_bind(player_id);

        let mut tx = pool.begin().await?;
        let result = builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| jersey_conflict(e, req.jersey_number.flatten()))?;

        if result.rows_affected() == 0 {
            return Err(PlayerError::NotFound(player_id));
        }
        if rekey {
            refresh_search_key(&mut tx, player_id).await?;
        }
        tx.commit().await?;

        info!(player_id, fields = touched, "Player updated");
        StatsService::refresh_snapshot(pool).await;
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, player_id: i64) -> Result<(), PlayerError> {
        let deleted: Option<(String, String)> = sqlx::query_as(
            "DELETE FROM players WHERE player_id = ? RETURNING first_name, last_name",
        )
        .bind(player_id)
        .fetch_optional(pool)
        .await?;

        let (first_name, last_name) = deleted.ok_or(PlayerError::NotFound(player_id))?;
        info!(player_id, "Player {first_name} {last_name} deleted");

        StatsService::refresh_snapshot(pool).await;
        Ok(())
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn with_current_ages(players: Vec<Player>) -> Vec<Player> {
    let today = today();
    players.into_iter().map(|p| p.with_age_on(today)).collect()
}

fn required_text<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, PlayerError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(PlayerError::MissingField(field))
}

/// Blank optional text is stored as NULL.
fn optional_text(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Text matched by `search`: full name, position and phone on separate
/// lines so a term never spans two fields.
fn search_key(first_name: &str, last_name: &str, position: Option<&str>, phone: &str) -> String {
    format!(
        "{first_name} {last_name}\n{}\n{phone}",
        position.unwrap_or_default()
    )
    .to_lowercase()
}

async fn refresh_search_key(conn: &mut SqliteConnection, player_id: i64) -> Result<(), sqlx::Error> {
    let (first_name, last_name, position, phone): (String, String, Option<String>, String) =
        sqlx::query_as("SELECT first_name, last_name, position, phone FROM players WHERE player_id = ?")
            .bind(player_id)
            .fetch_one(&mut *conn)
            .await?;

    sqlx::query("UPDATE players SET search_key = ? WHERE player_id = ?")
        .bind(search_key(&first_name, &last_name, position.as_deref(), &phone))
        .bind(player_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

fn jersey_conflict(err: sqlx::Error, jersey_number: Option<i64>) -> PlayerError {
    match (&err, jersey_number) {
        (sqlx::Error::Database(db), Some(number)) if db.is_unique_violation() => {
            PlayerError::DuplicateJersey(number)
        }
        _ => PlayerError::Database(err),
    }
}
