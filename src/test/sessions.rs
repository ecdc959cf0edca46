#[cfg(test)]
mod tests {
    use crate::{
        auth::CoachSession,
        db::{
            clean_expired_sessions, create_coach_session, get_session_by_token,
            invalidate_other_sessions, invalidate_session,
        },
        error::AppError,
        test::test_db::TestDbBuilder,
    };
    use chrono::{Duration, NaiveDateTime, Utc};
    use rocket::tokio;
    use sqlx::{Pool, Sqlite};
    use uuid::Uuid;

    const SESSION_COACH: &str = "sessions@lincoln.test";

    async fn create_test_session() -> (String, NaiveDateTime, Pool<Sqlite>) {
        let test_db = TestDbBuilder::new()
            .coach(SESSION_COACH, "Lincoln High")
            .build()
            .await
            .expect("Failed to build test database");

        let token = format!("test_token_{}", Uuid::new_v4());
        let expires_at = (Utc::now() + Duration::hours(1)).naive_utc();

        (token, expires_at, test_db.pool)
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let (token, expires_at, pool) = create_test_session().await;

        let session_id = create_coach_session(&pool, SESSION_COACH, &token, expires_at)
            .await
            .expect("Failed to create session");

        assert!(session_id > 0, "Session ID should be positive");

        let session = get_session_by_token(&pool, &token)
            .await
            .expect("Failed to get session");

        assert_eq!(session.coach_id, SESSION_COACH);
        assert!(session.id > 0);
        assert!(session.is_valid());

        let expires_diff =
            (session.expires_at.and_utc().timestamp() - expires_at.and_utc().timestamp()).abs();
        assert!(
            expires_diff <= 1,
            "Expiration timestamps should match within 1 second"
        );
    }

    #[tokio::test]
    async fn test_get_nonexistent_session() {
        let (_, _, pool) = create_test_session().await;

        let result = get_session_by_token(&pool, "nonexistent_token").await;

        match result {
            Err(AppError::Authentication(_)) => {}
            other => panic!("Expected authentication error, got {:?}", other.map(|s| s.id)),
        }
    }

    #[tokio::test]
    async fn test_invalidate_session() {
        let (token, expires_at, pool) = create_test_session().await;

        create_coach_session(&pool, SESSION_COACH, &token, expires_at)
            .await
            .unwrap();

        invalidate_session(&pool, &token).await.unwrap();

        assert!(get_session_by_token(&pool, &token).await.is_err());
    }

    #[tokio::test]
    async fn test_expired_session_is_not_valid_and_is_swept() {
        let (token, _, pool) = create_test_session().await;
        let expired_at = (Utc::now() - Duration::hours(1)).naive_utc();

        create_coach_session(&pool, SESSION_COACH, &token, expired_at)
            .await
            .unwrap();

        let live_token = format!("live_{}", Uuid::new_v4());
        let live_expiry = (Utc::now() + Duration::hours(1)).naive_utc();
        create_coach_session(&pool, SESSION_COACH, &live_token, live_expiry)
            .await
            .unwrap();

        let session = get_session_by_token(&pool, &token).await.unwrap();
        assert!(!session.is_valid());

        let removed = clean_expired_sessions(&pool).await.unwrap();
        assert_eq!(removed, 1);

        assert!(get_session_by_token(&pool, &token).await.is_err());
        assert!(get_session_by_token(&pool, &live_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalidate_other_sessions_keeps_current() {
        let (token, expires_at, pool) = create_test_session().await;

        create_coach_session(&pool, SESSION_COACH, &token, expires_at)
            .await
            .unwrap();

        let others: Vec<String> = (0..2)
            .map(|i| format!("other_{}_{}", i, Uuid::new_v4()))
            .collect();
        for other in &others {
            create_coach_session(&pool, SESSION_COACH, other, expires_at)
                .await
                .unwrap();
        }

        let dropped = invalidate_other_sessions(&pool, SESSION_COACH, &token)
            .await
            .unwrap();
        assert_eq!(dropped, 2);

        assert!(get_session_by_token(&pool, &token).await.is_ok());
        for other in &others {
            assert!(get_session_by_token(&pool, other).await.is_err());
        }
    }

    #[tokio::test]
    async fn test_sessions_are_removed_with_their_coach() {
        let (token, expires_at, pool) = create_test_session().await;

        create_coach_session(&pool, SESSION_COACH, &token, expires_at)
            .await
            .unwrap();

        sqlx::query("DELETE FROM coaches WHERE id = ?")
            .bind(SESSION_COACH)
            .execute(&pool)
            .await
            .unwrap();

        assert!(get_session_by_token(&pool, &token).await.is_err());
    }

    #[test]
    fn test_generated_tokens_are_distinct() {
        let first = CoachSession::generate_token();
        let second = CoachSession::generate_token();

        assert_eq!(first.len(), 48);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
