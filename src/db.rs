use crate::{
    auth::{
        CoachSession, DbCoachSession, hash_password, verify_password, verify_unknown_account,
    },
    error::AppError,
    models::{BornIn, Coach, DbCoach, DbPlayer, NewCoach, Player},
};
use chrono::{NaiveDateTime, Utc};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

const COACH_COLUMNS: &str = "id, phone_number, school, first_name, last_name, admin";
const PLAYER_COLUMNS: &str = "id, coach_id, name, school, born_in";

#[instrument]
pub async fn find_coach(pool: &Pool<Sqlite>, email: &str) -> Result<Option<Coach>, AppError> {
    info!("Finding coach by email");
    let row = sqlx::query_as::<_, DbCoach>(&format!(
        "SELECT {} FROM coaches WHERE id = ?",
        COACH_COLUMNS
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Coach::from))
}

#[instrument]
pub async fn get_coach(pool: &Pool<Sqlite>, email: &str) -> Result<Coach, AppError> {
    match find_coach(pool, email).await? {
        Some(coach) => Ok(coach),
        _ => Err(AppError::NotFound(format!(
            "Coach with email {} not found in database",
            email
        ))),
    }
}

#[instrument]
pub async fn get_all_coaches(pool: &Pool<Sqlite>) -> Result<Vec<Coach>, AppError> {
    info!("Getting all coaches");
    let rows = sqlx::query_as::<_, DbCoach>(&format!(
        "SELECT {} FROM coaches ORDER BY school, last_name, first_name",
        COACH_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Coach::from).collect())
}

/// Number of coaches and players, in that order.
#[instrument]
pub async fn count_records(pool: &Pool<Sqlite>) -> Result<(i64, i64), AppError> {
    let coaches: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coaches")
        .fetch_one(pool)
        .await?;
    let players: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM players")
        .fetch_one(pool)
        .await?;

    Ok((coaches, players))
}

#[instrument]
pub async fn admin_exists(pool: &Pool<Sqlite>) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM coaches WHERE admin = 1")
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

#[instrument(skip_all, fields(email = %coach.email, admin = coach.admin))]
pub async fn create_coach(pool: &Pool<Sqlite>, coach: &NewCoach) -> Result<(), AppError> {
    info!("Creating new coach");

    let hashed_password = hash_password(&coach.password)?;
    let phone_number = coach
        .phone_number
        .as_deref()
        .map(str::trim)
        .filter(|phone| !phone.is_empty());

    let res = sqlx::query(
        "INSERT INTO coaches (id, phone_number, school, first_name, last_name, password, admin)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&coach.email)
    .bind(phone_number)
    .bind(&coach.school)
    .bind(&coach.first_name)
    .bind(&coach.last_name)
    .bind(&hashed_password)
    .bind(coach.admin)
    .execute(pool)
    .await;

    match res {
        Ok(_) => Ok(()),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
            format!("Coach '{}' already exists", coach.email),
        )),
        Err(e) => Err(e.into()),
    }
}

/// Returns the coach only when the password verifies. A missing coach and a
/// wrong password are indistinguishable to the caller, and both pay for one
/// bcrypt verification.
#[instrument(skip_all, fields(email = %email))]
pub async fn authenticate_coach(
    pool: &Pool<Sqlite>,
    email: &str,
    password: &str,
) -> Result<Option<Coach>, AppError> {
    info!("Authenticating coach");
    let stored_hash: Option<String> =
        sqlx::query_scalar("SELECT password FROM coaches WHERE id = ?")
            .bind(email)
            .fetch_optional(pool)
            .await?;

    let verified = match stored_hash {
        Some(hash) => verify_password(password, &hash),
        None => verify_unknown_account(password),
    };

    if !verified {
        return Ok(None);
    }

    find_coach(pool, email).await
}

#[instrument(skip_all, fields(email = %email))]
pub async fn update_coach_password(
    pool: &Pool<Sqlite>,
    email: &str,
    new_password: &str,
) -> Result<(), AppError> {
    info!("Updating coach password");
    let hashed_password = hash_password(new_password)?;

    let res = sqlx::query("UPDATE coaches SET password = ? WHERE id = ?")
        .bind(&hashed_password)
        .bind(email)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Coach with email {} not found in database",
            email
        )));
    }

    Ok(())
}

#[instrument(skip(pool, coach), fields(coach = %coach.email))]
pub async fn create_player(
    pool: &Pool<Sqlite>,
    coach: &Coach,
    name: &str,
    born_in: &BornIn,
) -> Result<i64, AppError> {
    info!("Creating player");
    let res = sqlx::query(
        "INSERT INTO players (coach_id, name, school, born_in)
         VALUES (?, ?, ?, ?)",
    )
    .bind(&coach.email)
    .bind(name)
    .bind(&coach.school)
    .bind(born_in.as_str())
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn get_player(pool: &Pool<Sqlite>, id: i64) -> Result<Player, AppError> {
    info!("Getting player");
    let row = sqlx::query_as::<_, DbPlayer>(&format!(
        "SELECT {} FROM players WHERE id = ?",
        PLAYER_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(player) => Ok(Player::from(player)),
        _ => Err(AppError::NotFound(format!(
            "Player with id {} not found in database",
            id
        ))),
    }
}

#[instrument]
pub async fn get_players_for_coach(
    pool: &Pool<Sqlite>,
    coach_id: &str,
) -> Result<Vec<Player>, AppError> {
    info!("Getting roster for coach");
    let rows = sqlx::query_as::<_, DbPlayer>(&format!(
        "SELECT {} FROM players WHERE coach_id = ? ORDER BY name",
        PLAYER_COLUMNS
    ))
    .bind(coach_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Player::from).collect())
}

#[instrument]
pub async fn get_all_players(pool: &Pool<Sqlite>) -> Result<Vec<Player>, AppError> {
    info!("Getting all players");
    let rows = sqlx::query_as::<_, DbPlayer>(&format!(
        "SELECT {} FROM players ORDER BY school, name",
        PLAYER_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Player::from).collect())
}

#[instrument(skip(pool))]
pub async fn update_player(
    pool: &Pool<Sqlite>,
    id: i64,
    name: &str,
    born_in: &BornIn,
) -> Result<(), AppError> {
    info!("Updating player");
    let res = sqlx::query("UPDATE players SET name = ?, born_in = ? WHERE id = ?")
        .bind(name)
        .bind(born_in.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Player with id {} not found in database",
            id
        )));
    }

    Ok(())
}

#[instrument]
pub async fn delete_player(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting player");
    let res = sqlx::query("DELETE FROM players WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Player with id {} not found in database",
            id
        )));
    }

    Ok(())
}

#[instrument(skip(pool, token))]
pub async fn create_coach_session(
    pool: &Pool<Sqlite>,
    coach_id: &str,
    token: &str,
    expires_at: NaiveDateTime,
) -> Result<i64, AppError> {
    info!("Creating coach session");

    let res = sqlx::query(
        "INSERT INTO coach_sessions (coach_id, token, expires_at) VALUES (?, ?, ?)",
    )
    .bind(coach_id)
    .bind(token)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument(skip(pool, token))]
pub async fn get_session_by_token(
    pool: &Pool<Sqlite>,
    token: &str,
) -> Result<CoachSession, AppError> {
    info!("Getting session by token");

    let session = sqlx::query_as::<_, DbCoachSession>(
        "SELECT id, coach_id, created_at, expires_at FROM coach_sessions WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    match session {
        Some(session) => Ok(CoachSession::from(session)),
        _ => Err(AppError::Authentication(
            "Invalid session token".to_string(),
        )),
    }
}

#[instrument(skip(pool, token))]
pub async fn invalidate_session(pool: &Pool<Sqlite>, token: &str) -> Result<(), AppError> {
    info!("Invalidating session");

    sqlx::query("DELETE FROM coach_sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Drops every session of a coach except `keep_token`.
#[instrument(skip(pool, keep_token))]
pub async fn invalidate_other_sessions(
    pool: &Pool<Sqlite>,
    coach_id: &str,
    keep_token: &str,
) -> Result<u64, AppError> {
    info!("Invalidating other sessions for coach");

    let result = sqlx::query("DELETE FROM coach_sessions WHERE coach_id = ? AND token != ?")
        .bind(coach_id)
        .bind(keep_token)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[instrument(skip(pool))]
pub async fn clean_expired_sessions(pool: &Pool<Sqlite>) -> Result<u64, AppError> {
    info!("Cleaning expired sessions");

    let now = Utc::now().naive_utc();

    let result = sqlx::query("DELETE FROM coach_sessions WHERE expires_at < ?")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
