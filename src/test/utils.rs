#[cfg(test)]
pub mod test_db {
    use crate::db::{create_coach, create_player, get_coach};
    use crate::error::AppError;
    use crate::models::{BornIn, NewCoach};
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::{Pool, Sqlite};
    use std::collections::HashMap;
    use std::sync::Once;
    use tracing::log::LevelFilter;

    static INIT: Once = Once::new();
    pub static STANDARD_PASSWORD: &str = "password123";

    #[derive(Default)]
    pub struct TestDbBuilder {
        coaches: Vec<NewCoach>,
        players: Vec<TestPlayer>,
    }

    pub struct TestPlayer {
        pub coach_email: String,
        pub name: String,
        pub month: String,
        pub year: String,
    }

    impl TestDbBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn coach(self, email: &str, school: &str) -> Self {
            self.coach_with_password(email, school, STANDARD_PASSWORD)
        }

        pub fn coach_with_password(mut self, email: &str, school: &str, password: &str) -> Self {
            self.coaches.push(NewCoach {
                email: email.to_string(),
                phone_number: None,
                school: school.to_string(),
                first_name: "Test".to_string(),
                last_name: "Coach".to_string(),
                password: password.to_string(),
                admin: false,
            });
            self
        }

        pub fn admin(mut self, email: &str) -> Self {
            self.coaches.push(NewCoach {
                email: email.to_string(),
                phone_number: None,
                school: crate::models::ADMIN_SCHOOL.to_string(),
                first_name: "Test".to_string(),
                last_name: "Admin".to_string(),
                password: STANDARD_PASSWORD.to_string(),
                admin: true,
            });
            self
        }

        pub fn player(mut self, coach_email: &str, name: &str, month: &str, year: &str) -> Self {
            self.players.push(TestPlayer {
                coach_email: coach_email.to_string(),
                name: name.to_string(),
                month: month.to_string(),
                year: year.to_string(),
            });
            self
        }

        pub async fn build(self) -> Result<TestDb, AppError> {
            INIT.call_once(|| {
                let _ = env_logger::builder()
                    .filter_level(LevelFilter::Debug)
                    .is_test(true)
                    .try_init();
            });

            // A single long-lived connection, so every query sees the same
            // in-memory database.
            let pool = SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect("sqlite::memory:")
                .await?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| AppError::Internal(format!("Migration failed: {}", e)))?;

            for coach in &self.coaches {
                create_coach(&pool, coach).await?;
            }

            let mut player_id_map: HashMap<String, i64> = HashMap::new();

            for player in &self.players {
                let coach = get_coach(&pool, &player.coach_email).await?;
                let born_in = BornIn::from_parts(&player.month, &player.year)?;
                let id = create_player(&pool, &coach, &player.name, &born_in).await?;

                player_id_map.insert(player.name.clone(), id);
            }

            Ok(TestDb {
                pool,
                player_id_map,
            })
        }
    }

    pub struct TestDb {
        pub pool: Pool<Sqlite>,
        pub player_id_map: HashMap<String, i64>,
    }

    impl TestDb {
        pub fn player_id(&self, name: &str) -> i64 {
            self.player_id_map
                .get(name)
                .copied()
                .unwrap_or_else(|| panic!("No test player named {}", name))
        }
    }
}

#[cfg(test)]
pub mod test_utils {
    use rocket::http::{ContentType, Status};
    use rocket::local::asynchronous::Client;

    use crate::env::AppConfig;
    use crate::init_rocket;

    use super::test_db::{STANDARD_PASSWORD, TestDb, TestDbBuilder};

    pub const ADMIN_EMAIL: &str = "admin@roster.test";
    pub const LINCOLN_COACH: &str = "coach@lincoln.test";
    pub const JEFFERSON_COACH: &str = "coach@jefferson.test";

    /// One admin, two coaches at different schools, three players.
    pub async fn create_standard_test_db() -> TestDb {
        TestDbBuilder::new()
            .admin(ADMIN_EMAIL)
            .coach(LINCOLN_COACH, "Lincoln High")
            .coach(JEFFERSON_COACH, "Jefferson High")
            .player(LINCOLN_COACH, "Alex Rivera", "03", "2012")
            .player(LINCOLN_COACH, "Jordan Lee", "11", "2013")
            .player(JEFFERSON_COACH, "Casey Park", "07", "2014")
            .build()
            .await
            .expect("Failed to build test database")
    }

    pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
        let rocket = init_rocket(test_db.pool.clone(), AppConfig::default()).await;
        let client = Client::tracked(rocket)
            .await
            .expect("valid rocket instance");

        (client, test_db)
    }

    /// Posts the login form and returns the redirect target on success.
    pub async fn login_as(client: &Client, email: &str, password: &str) -> Option<String> {
        let response = client
            .post("/")
            .header(ContentType::Form)
            .body(format!("email={}&password={}", email, password))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::SeeOther);
        response.headers().get_one("Location").map(String::from)
    }

    pub async fn login_test_coach(client: &Client, email: &str) {
        let location = login_as(client, email, STANDARD_PASSWORD).await;
        assert_ne!(
            location.as_deref(),
            Some("/"),
            "Login for {} bounced back to the login page",
            email
        );
    }
}
