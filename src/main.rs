#[macro_use]
extern crate rocket;

mod admin;
mod auth;
mod db;
mod env;
mod error;
mod models;
mod roster;
mod routes;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use std::str::FromStr;

use admin::{add_coach, add_coach_page, admin_page, admin_page_post, view_records};
use auth::{forbidden, unauthorized};
use db::clean_expired_sessions;
use env::{AppConfig, load_environment};
use error::AppError;
use rocket::{Build, Rocket, tokio};
use roster::{add_player, edit_player, edit_player_page, remove_player, roster_page};
use routes::{
    account_page, change_password, health, login, login_page, logout, register_admin,
    register_page,
};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use telemetry::{TelemetryFairing, init_tracing};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Anyhow(anyhow::Error),
    #[error("{0}")]
    Figment(rocket::figment::Error),
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Launch error: {0}")]
    Launch(#[from] rocket::Error),
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

impl From<anyhow::Error> for Error {
    fn from(value: anyhow::Error) -> Self {
        Error::Anyhow(value)
    }
}

impl From<rocket::figment::Error> for Error {
    fn from(value: rocket::figment::Error) -> Self {
        Error::Figment(value)
    }
}

const SESSION_SWEEP_INTERVAL_SECS: u64 = 3600;

#[rocket::main]
async fn main() -> Result<(), Error> {
    let _telemetry = init_tracing();

    load_environment()?;
    let config = AppConfig::load()?;

    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;

    info!("Running database migrations...");
    if let Err(e) = sqlx::migrate!("./migrations").run(&pool).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed successfully");

    let pool_clone = pool.clone();

    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;

        loop {
            match clean_expired_sessions(&pool_clone).await {
                Ok(count) => {
                    if count > 0 {
                        info!("Cleaned up {} expired sessions", count);
                    }
                }
                Err(e) => {
                    error!("Failed to clean expired sessions: {}", e);
                }
            }

            tokio::time::sleep(tokio::time::Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS))
                .await;
        }
    });

    let _rocket = init_rocket(pool, config).await.launch().await?;

    Ok(())
}

pub async fn init_rocket(pool: SqlitePool, config: AppConfig) -> Rocket<Build> {
    info!("Starting school roster");

    rocket::build()
        .manage(pool)
        .manage(config)
        .mount(
            "/",
            routes![
                login_page,
                login,
                logout,
                register_page,
                register_admin,
                account_page,
                change_password,
                roster_page,
                add_player,
                edit_player_page,
                edit_player,
                remove_player,
                admin_page,
                admin_page_post,
                view_records,
                add_coach_page,
                add_coach,
                health,
            ],
        )
        .register("/", catchers![unauthorized, forbidden])
        .attach(TelemetryFairing)
}
