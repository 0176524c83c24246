use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum PlayerStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl PlayerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerStatus::Active => "Active",
            PlayerStatus::Inactive => "Inactive",
            PlayerStatus::Suspended => "Suspended",
        }
    }
}

impl std::fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `?status=` filter on the player list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Only(PlayerStatus),
    All,
}

impl Default for StatusFilter {
    fn default() -> Self {
        StatusFilter::Only(PlayerStatus::Active)
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        [
            PlayerStatus::Active,
            PlayerStatus::Inactive,
            PlayerStatus::Suspended,
        ]
        .into_iter()
        .find(|status| status.as_str().eq_ignore_ascii_case(s))
        .map(StatusFilter::Only)
        .or_else(|| s.eq_ignore_ascii_case("all").then_some(StatusFilter::All))
        .ok_or_else(|| anyhow::anyhow!("Unknown status filter: {s}"))
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Player {
    pub player_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub age: i64,
    pub gender: Gender,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: String,
    pub parent_guardian_name: Option<String>,
    pub parent_phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub address: Option<String>,
    pub medical_info: Option<String>,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub registration_date: NaiveDateTime,
    pub status: PlayerStatus,
    pub jersey_number: Option<i64>,
    pub joining_fee_paid: bool,
    pub monthly_fee_paid: bool,
    pub notes: Option<String>,
}

impl Player {
    /// Re-derive `age` from the birth date as of `today`.
    pub fn with_age_on(mut self, today: NaiveDate) -> Self {
        self.age = age_on(self.date_of_birth, today);
        self
    }
}

/// Whole years between `birth` and `today`, one less while this year's
/// birthday is still ahead.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i64 {
    let years = i64::from(today.year() - birth.year());
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years - 1
    } else {
        years
    }
}

/// Body of `POST /api/players`. Presence of the mandatory fields is checked by
/// the service so a missing one reports which field it was.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePlayerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub parent_guardian_name: Option<String>,
    pub parent_phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub address: Option<String>,
    pub medical_info: Option<String>,
    pub status: Option<PlayerStatus>,
    pub jersey_number: Option<i64>,
    pub joining_fee_paid: Option<bool>,
    pub monthly_fee_paid: Option<bool>,
    pub notes: Option<String>,
}

/// Body of `PUT /api/players/{id}`.
///
/// Absent keys are left untouched. On nullable columns an explicit `null`
/// clears the value (`Some(None)`).
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePlayerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "nullable")]
    pub position: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub email: Option<Option<String>>,
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub parent_guardian_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub parent_phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub emergency_contact: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub medical_info: Option<Option<String>>,
    pub status: Option<PlayerStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub jersey_number: Option<Option<i64>>,
    pub joining_fee_paid: Option<bool>,
    pub monthly_fee_paid: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_after_birthday() {
        assert_eq!(age_on(date(2010, 3, 15), date(2024, 6, 1)), 14);
    }

    #[test]
    fn test_age_before_birthday() {
        assert_eq!(age_on(date(2010, 3, 15), date(2024, 3, 14)), 13);
        assert_eq!(age_on(date(2010, 12, 31), date(2024, 1, 1)), 13);
    }

    #[test]
    fn test_age_on_birthday() {
        assert_eq!(age_on(date(2010, 3, 15), date(2024, 3, 15)), 14);
    }

    #[test]
    fn test_age_leap_day_birth() {
        // Feb 29 birthdays count as reached only once March starts in common years
        assert_eq!(age_on(date(2012, 2, 29), date(2023, 2, 28)), 10);
        assert_eq!(age_on(date(2012, 2, 29), date(2023, 3, 1)), 11);
        assert_eq!(age_on(date(2012, 2, 29), date(2024, 2, 29)), 12);
    }

    #[test]
    fn test_status_filter_parse() {
        assert_eq!(
            StatusFilter::from_str("Active").unwrap(),
            StatusFilter::Only(PlayerStatus::Active)
        );
        assert_eq!(
            StatusFilter::from_str("suspended").unwrap(),
            StatusFilter::Only(PlayerStatus::Suspended)
        );
        assert_eq!(StatusFilter::from_str("ALL").unwrap(), StatusFilter::All);
        assert!(StatusFilter::from_str("Retired").is_err());
        assert_eq!(StatusFilter::default(), StatusFilter::Only(PlayerStatus::Active));
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let req: UpdatePlayerRequest =
            serde_json::from_str(r#"{"email": null, "position": "Defender", "player_id": 7}"#)
                .unwrap();
        assert_eq!(req.email, Some(None));
        assert_eq!(req.position, Some(Some("Defender".to_string())));
        assert_eq!(req.notes, None);
        assert_eq!(req.jersey_number, None);
    }

    #[test]
    fn test_player_serializes_wire_formats() {
        let player = Player {
            player_id: 1,
            first_name: "Thabo".into(),
            last_name: "Mthembu".into(),
            date_of_birth: date(2010, 3, 15),
            age: 14,
            gender: Gender::Male,
            position: Some("Forward".into()),
            email: None,
            phone: "0821234567".into(),
            parent_guardian_name: None,
            parent_phone: None,
            emergency_contact: None,
            address: None,
            medical_info: None,
            registration_date: date(2024, 6, 1).and_hms_opt(9, 5, 7).unwrap(),
            status: PlayerStatus::Active,
            jersey_number: Some(10),
            joining_fee_paid: true,
            monthly_fee_paid: false,
            notes: None,
        };

        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["date_of_birth"], "2010-03-15");
        assert_eq!(json["registration_date"], "2024-06-01 09:05:07");
        assert_eq!(json["gender"], "Male");
        assert_eq!(json["status"], "Active");
        assert_eq!(json["jersey_number"], 10);
        assert!(json["email"].is_null());
    }
}
