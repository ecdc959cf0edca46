use chrono::Utc;
use rocket::form::Form;
use rocket::http::CookieJar;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::serde::json::Json;
use rocket::{FromForm, State};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::{CoachSession, Principal, Role, end_session, start_session};
use crate::db::{
    admin_exists, authenticate_coach, create_coach, create_coach_session,
    invalidate_other_sessions, update_coach_password,
};
use crate::env::AppConfig;
use crate::error::AppError;
use crate::models::{ADMIN_SCHOOL, Coach, NewCoach};
use crate::validation::{AppErrorExt, FlashView, FormValidateExt, Rejection, ToValidationResponse};

pub const INVALID_CREDENTIALS: &str = "That email and password combination is not correct.";
pub const DUPLICATE_COACH: &str = "A coach with that email is already registered.";

#[derive(FromForm, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginView {
    pub header: String,
    pub flash: Option<FlashView>,
    pub current_coach: Option<Coach>,
}

#[get("/")]
pub fn login_page(flash: Option<FlashMessage<'_>>, principal: Option<Principal>) -> Json<LoginView> {
    Json(LoginView {
        header: "Coach Login".to_string(),
        flash: FlashView::from_message(flash),
        current_coach: principal.map(|p| p.coach),
    })
}

#[post("/", data = "<form>")]
pub async fn login(
    form: Form<LoginForm>,
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    config: &State<AppConfig>,
) -> Result<Redirect, Rejection> {
    let credentials = form.validate_custom()?;
    info!("Login attempt: {}", &credentials.email);

    let coach = authenticate_coach(db, credentials.email.trim(), &credentials.password)
        .await
        .validate_custom()?;

    let Some(coach) = coach else {
        warn!("Login rejected for {}", &credentials.email);
        return Err(Rejection::flashed("/", INVALID_CREDENTIALS));
    };

    let token = CoachSession::generate_token();
    let expires_at = Utc::now() + chrono::Duration::hours(config.session_ttl_hours);

    create_coach_session(db, &coach.email, &token, expires_at.naive_utc())
        .await
        .validate_custom()?;

    start_session(cookies, token, config.session_ttl_hours);

    let role = Role::from_admin_flag(coach.admin);
    info!("{} login for {}", role, &coach.email);

    Ok(Redirect::to(role.landing_route()))
}

#[get("/logout")]
pub async fn logout(cookies: &CookieJar<'_>, db: &State<Pool<Sqlite>>) -> Redirect {
    end_session(cookies, Some(db.inner())).await;
    Redirect::to("/")
}

#[derive(FromForm, Validate)]
pub struct RegisterAdminForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct RegisterView {
    pub header: String,
    pub school: String,
    pub flash: Option<FlashView>,
}

/// Open while no admin exists; afterwards only an admin may register another.
async fn require_registration_access(
    db: &Pool<Sqlite>,
    principal: Option<&Principal>,
) -> Result<(), AppError> {
    if !admin_exists(db).await? {
        return Ok(());
    }

    match principal {
        Some(principal) if principal.role == Role::Admin => Ok(()),
        Some(_) => Err(AppError::Authorization(
            "Only an admin can register another admin".to_string(),
        )),
        None => Err(AppError::Authentication(
            "Log in as an admin to register another admin".to_string(),
        )),
    }
}

#[get("/register/register-coach")]
pub async fn register_page(
    flash: Option<FlashMessage<'_>>,
    principal: Option<Principal>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<RegisterView>, AppError> {
    require_registration_access(db, principal.as_ref()).await?;

    Ok(Json(RegisterView {
        header: "Register Admin".to_string(),
        school: ADMIN_SCHOOL.to_string(),
        flash: FlashView::from_message(flash),
    }))
}

#[post("/register/register-coach", data = "<form>")]
pub async fn register_admin(
    form: Form<RegisterAdminForm>,
    principal: Option<Principal>,
    db: &State<Pool<Sqlite>>,
) -> Result<Redirect, Rejection> {
    require_registration_access(db, principal.as_ref())
        .await
        .validate_custom()?;

    let registration = form.validate_custom()?;

    let new_admin = NewCoach {
        email: registration.email.trim().to_string(),
        phone_number: None,
        school: ADMIN_SCHOOL.to_string(),
        first_name: registration.first_name,
        last_name: registration.last_name,
        password: registration.password,
        admin: true,
    };

    match create_coach(db, &new_admin).await {
        Ok(()) => {
            info!("Registered admin {}", &new_admin.email);
            Ok(Redirect::to("/"))
        }
        Err(AppError::Conflict(msg)) => {
            warn!("Admin registration rejected: {}", msg);
            Err(Rejection::flashed("/register/register-coach", DUPLICATE_COACH))
        }
        Err(e) => Err(Rejection::from(e.to_validation_response())),
    }
}

#[derive(FromForm, Validate)]
pub struct ChangePasswordForm {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub confirm_password: String,
}

#[derive(Serialize, Deserialize)]
pub struct AccountView {
    pub header: String,
    pub coach: Coach,
    pub flash: Option<FlashView>,
}

#[get("/my-account")]
pub fn account_page(principal: Principal, flash: Option<FlashMessage<'_>>) -> Json<AccountView> {
    Json(AccountView {
        header: "My Account".to_string(),
        coach: principal.coach,
        flash: FlashView::from_message(flash),
    })
}

#[post("/my-account", data = "<form>")]
pub async fn change_password(
    form: Form<ChangePasswordForm>,
    principal: Principal,
    db: &State<Pool<Sqlite>>,
) -> Result<Flash<Redirect>, Rejection> {
    let change = form.validate_custom()?;

    let verified = authenticate_coach(db, principal.email(), &change.current_password)
        .await
        .validate_custom()?;

    if verified.is_none() {
        return Err(Rejection::flashed("/my-account", "Incorrect current password."));
    }

    if change.new_password != change.confirm_password {
        return Err(Rejection::flashed("/my-account", "Passwords do not match."));
    }

    if change.current_password == change.new_password {
        return Err(Rejection::flashed(
            "/my-account",
            "Password cannot be the same as previous password.",
        ));
    }

    update_coach_password(db, principal.email(), &change.new_password)
        .await
        .validate_custom()?;

    let dropped = invalidate_other_sessions(db, principal.email(), &principal.session_token)
        .await
        .validate_custom()?;
    info!(
        "Password changed for {}, ended {} other sessions",
        principal.email(),
        dropped
    );

    Ok(Flash::success(Redirect::to("/my-account"), "Password updated."))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
