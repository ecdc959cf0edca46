#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};

    use crate::admin::{AddCoachView, AdminView, DataType, Listing, ListingView};
    use crate::db::{count_records, get_coach};
    use crate::routes::DUPLICATE_COACH;
    use crate::test::test_db::STANDARD_PASSWORD;
    use crate::test::test_utils::{
        ADMIN_EMAIL, LINCOLN_COACH, create_standard_test_db, login_as, login_test_coach,
        setup_test_client,
    };
    use crate::validation::ValidationResponse;

    const NEW_COACH_FORM: &str = "email=pat@roosevelt.test&phone_number=&school=Roosevelt+High\
        &first_name=Pat&last_name=Morgan&password=password123";

    #[test]
    fn test_data_type_from_query() {
        assert_eq!(DataType::from_query(Some("coaches")), DataType::Coaches);
        assert_eq!(DataType::from_query(Some("players")), DataType::Players);
        assert_eq!(DataType::from_query(Some("anything")), DataType::Players);
        assert_eq!(DataType::from_query(None), DataType::Players);
        assert_eq!(DataType::Coaches.header(), "Edit/View Coaches");
        assert_eq!(DataType::Players.header(), "All Players");
    }

    #[rocket::async_test]
    async fn test_admin_dashboard() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        login_test_coach(&client, ADMIN_EMAIL).await;

        for response in [
            client.get("/admin").dispatch().await,
            client.post("/admin").dispatch().await,
        ] {
            assert_eq!(response.status(), Status::Ok);

            let view: AdminView = response.into_json().await.unwrap();
            assert_eq!(view.admin.email, ADMIN_EMAIL);
            assert_eq!(view.coach_count, 3);
            assert_eq!(view.player_count, 3);
        }
    }

    #[rocket::async_test]
    async fn test_view_coaches() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        login_test_coach(&client, ADMIN_EMAIL).await;

        let response = client
            .get("/admin/players-and-coaches/view?data_type=coaches")
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        assert!(!body.contains("password"));
        assert!(!body.contains("$2"));

        let view: ListingView = serde_json::from_str(&body).unwrap();
        assert_eq!(view.header, "Edit/View Coaches");
        match view.listing {
            Listing::Coaches(coaches) => {
                assert_eq!(coaches.len(), 3);
                assert!(coaches.iter().any(|c| c.email == LINCOLN_COACH));
            }
            Listing::Players(_) => panic!("expected coaches"),
        }
    }

    #[rocket::async_test]
    async fn test_view_players_is_the_fallback() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        login_test_coach(&client, ADMIN_EMAIL).await;

        for uri in [
            "/admin/players-and-coaches/view?data_type=players",
            "/admin/players-and-coaches/view?data_type=whatever",
            "/admin/players-and-coaches/view",
        ] {
            let view: ListingView = client.get(uri).dispatch().await.into_json().await.unwrap();
            assert_eq!(view.header, "All Players");
            match view.listing {
                Listing::Players(players) => assert_eq!(players.len(), 3),
                Listing::Coaches(_) => panic!("{} should list players", uri),
            }
        }
    }

    #[rocket::async_test]
    async fn test_add_coach() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        login_test_coach(&client, ADMIN_EMAIL).await;

        let response = client
            .post("/admin/add_coach")
            .header(ContentType::Form)
            .body(NEW_COACH_FORM)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::SeeOther);
        assert_eq!(response.headers().get_one("Location"), Some("/admin"));

        let view: AdminView = client.get("/admin").dispatch().await.into_json().await.unwrap();
        let flash = view.flash.expect("expected a success flash");
        assert_eq!(flash.kind, "success");
        assert_eq!(flash.message, "Coach pat@roosevelt.test added.");
        assert_eq!(view.coach_count, 4);

        let coach = get_coach(&test_db.pool, "pat@roosevelt.test").await.unwrap();
        assert_eq!(coach.school, "Roosevelt High");
        assert_eq!(coach.phone_number, None);
        assert!(!coach.admin);

        client.get("/logout").dispatch().await;
        assert_eq!(
            login_as(&client, "pat@roosevelt.test", STANDARD_PASSWORD)
                .await
                .as_deref(),
            Some("/coach/")
        );
    }

    #[rocket::async_test]
    async fn test_add_duplicate_coach() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        login_test_coach(&client, ADMIN_EMAIL).await;

        let response = client
            .post("/admin/add_coach")
            .header(ContentType::Form)
            .body(format!(
                "email={}&school=Elsewhere&first_name=Dup&last_name=Licate&password=password123",
                LINCOLN_COACH
            ))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::SeeOther);
        assert_eq!(response.headers().get_one("Location"), Some("/admin/add_coach"));

        let view: AddCoachView = client
            .get("/admin/add_coach")
            .dispatch()
            .await
            .into_json()
            .await
            .unwrap();
        let flash = view.flash.expect("expected an error flash");
        assert_eq!(flash.kind, "error");
        assert_eq!(flash.message, DUPLICATE_COACH);

        let (coaches, _) = count_records(&test_db.pool).await.unwrap();
        assert_eq!(coaches, 3);

        let coach = get_coach(&test_db.pool, LINCOLN_COACH).await.unwrap();
        assert_eq!(coach.school, "Lincoln High");
    }

    #[rocket::async_test]
    async fn test_add_coach_validation() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        login_test_coach(&client, ADMIN_EMAIL).await;

        let long_school = "S".repeat(76);
        let response = client
            .post("/admin/add_coach")
            .header(ContentType::Form)
            .body(format!(
                "email=bad-email&school={}&first_name=&last_name=Morgan&password=short",
                long_school
            ))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::UnprocessableEntity);

        let body: ValidationResponse = response.into_json().await.unwrap();
        for field in ["email", "school", "first_name", "password"] {
            assert!(body.errors.contains_key(field), "missing error for {}", field);
        }
        assert!(!body.errors.contains_key("last_name"));
    }

    #[rocket::async_test]
    async fn test_coach_cannot_add_coaches() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        login_test_coach(&client, LINCOLN_COACH).await;

        let response = client
            .post("/admin/add_coach")
            .header(ContentType::Form)
            .body(NEW_COACH_FORM)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let (coaches, _) = count_records(&test_db.pool).await.unwrap();
        assert_eq!(coaches, 3);
    }
}
