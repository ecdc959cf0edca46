use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// School recorded for coaches created through the admin registration route.
pub const ADMIN_SCHOOL: &str = "Admin";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Coach {
    pub email: String,
    pub phone_number: Option<String>,
    pub school: String,
    pub first_name: String,
    pub last_name: String,
    pub admin: bool,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbCoach {
    pub id: Option<String>,
    pub phone_number: Option<String>,
    pub school: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub admin: Option<bool>,
}

impl From<DbCoach> for Coach {
    fn from(coach: DbCoach) -> Self {
        Self {
            email: coach.id.unwrap_or_default(),
            phone_number: coach.phone_number.filter(|phone| !phone.is_empty()),
            school: coach.school.unwrap_or_default(),
            first_name: coach.first_name.unwrap_or_default(),
            last_name: coach.last_name.unwrap_or_default(),
            admin: coach.admin.unwrap_or_default(),
        }
    }
}

/// Fields needed to insert a coach. The password is plaintext here and is
/// hashed by the persistence layer before it reaches the store.
#[derive(Debug, Clone)]
pub struct NewCoach {
    pub email: String,
    pub phone_number: Option<String>,
    pub school: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub admin: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Player {
    pub id: i64,
    pub coach_id: String,
    pub name: String,
    pub school: String,
    pub born_in: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbPlayer {
    pub id: Option<i64>,
    pub coach_id: Option<String>,
    pub name: Option<String>,
    pub school: Option<String>,
    pub born_in: Option<String>,
}

impl From<DbPlayer> for Player {
    fn from(player: DbPlayer) -> Self {
        Self {
            id: player.id.unwrap_or_default(),
            coach_id: player.coach_id.unwrap_or_default(),
            name: player.name.unwrap_or_default(),
            school: player.school.unwrap_or_default(),
            born_in: player.born_in.unwrap_or_default(),
        }
    }
}

/// Birth month and year stored as `MM/YYYY`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BornIn(String);

impl BornIn {
    pub fn is_valid_month(month: &str) -> bool {
        month.len() == 2 && month.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn is_valid_year(year: &str) -> bool {
        year.len() == 4 && year.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn from_parts(month: &str, year: &str) -> Result<Self, AppError> {
        if !Self::is_valid_month(month) {
            return Err(AppError::Validation(format!(
                "Month '{}' must be exactly two digits",
                month
            )));
        }

        if !Self::is_valid_year(year) {
            return Err(AppError::Validation(format!(
                "Year '{}' must be exactly four digits",
                year
            )));
        }

        Ok(Self(format!("{}/{}", month, year)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits a stored value back into month and year by fixed offsets.
    /// Values that are too short yield empty strings instead of panicking.
    pub fn split(born_in: &str) -> (&str, &str) {
        let month = born_in.get(0..2).unwrap_or_default();
        let year = born_in.get(3..7).unwrap_or_default();
        (month, year)
    }
}

impl std::fmt::Display for BornIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
