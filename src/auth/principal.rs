use chrono::{NaiveDateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use serde::Serialize;

use crate::models::Coach;

use super::{Permission, Role};

const TOKEN_LENGTH: usize = 48;

/// The authenticated coach behind the current request.
#[derive(Debug, Serialize, Clone)]
pub struct Principal {
    pub coach: Coach,
    pub role: Role,
    #[serde(skip)]
    pub session_token: String,
}

impl Principal {
    pub fn new(coach: Coach, session_token: String) -> Self {
        Self {
            role: Role::from_admin_flag(coach.admin),
            coach,
            session_token,
        }
    }

    pub fn email(&self) -> &str {
        &self.coach.email
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role.has_permission(permission)
    }

    /// Owners manage their own players; admins manage every roster.
    pub fn can_manage_player(&self, owner_email: &str) -> bool {
        (self.has_permission(Permission::ManageOwnRoster) && self.coach.email == owner_email)
            || self.has_permission(Permission::ManageAnyRoster)
    }
}

#[derive(Debug, Clone)]
pub struct CoachSession {
    pub id: i64,
    pub coach_id: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbCoachSession {
    pub id: Option<i64>,
    pub coach_id: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
}

impl From<DbCoachSession> for CoachSession {
    fn from(session: DbCoachSession) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: session.id.unwrap_or_default(),
            coach_id: session.coach_id.unwrap_or_default(),
            created_at: session.created_at.unwrap_or(now),
            // A row without an expiry is treated as already expired.
            expires_at: session.expires_at.unwrap_or(now),
        }
    }
}

impl CoachSession {
    pub fn generate_token() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LENGTH)
            .map(char::from)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now().naive_utc()
    }
}
