use rocket::Request;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::Instrument;

use crate::db::{get_coach, get_session_by_token, invalidate_session};

use super::{Permission, Principal};

pub const SESSION_COOKIE: &str = "session_token";

/// Result of checking a (possibly absent) principal against a permission.
#[derive(Debug, Clone)]
pub enum Authorization {
    Allowed(Principal),
    Unauthenticated,
    Forbidden(Principal),
}

impl Authorization {
    pub fn evaluate(principal: Option<Principal>, permission: Permission) -> Self {
        match principal {
            None => Authorization::Unauthenticated,
            Some(principal) if principal.has_permission(permission) => {
                Authorization::Allowed(principal)
            }
            Some(principal) => Authorization::Forbidden(principal),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Authorization::Allowed(_) => Status::Ok,
            Authorization::Unauthenticated => Status::Unauthorized,
            Authorization::Forbidden(_) => Status::Forbidden,
        }
    }
}

async fn lookup_principal(request: &Request<'_>) -> Result<Principal, Status> {
    let token = request
        .cookies()
        .get_private(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(Status::Unauthorized)?;

    let db = match request.rocket().state::<SqlitePool>() {
        Some(pool) => pool,
        _ => {
            tracing::error!("Database pool not found in managed state");
            return Err(Status::InternalServerError);
        }
    };

    let session = match get_session_by_token(db, &token).await {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(error = ?err, "Invalid session token");
            return Err(Status::Unauthorized);
        }
    };

    if !session.is_valid() {
        tracing::warn!(coach_id = %session.coach_id, "Session token expired");
        return Err(Status::Unauthorized);
    }

    match get_coach(db, &session.coach_id).await {
        Ok(coach) => {
            tracing::info!(
                email = %coach.email,
                admin = %coach.admin,
                session_id = session.id,
                session_started = %session.created_at,
                "Coach authenticated via session token"
            );
            Ok(Principal::new(coach, token))
        }
        Err(err) => {
            tracing::error!(coach_id = %session.coach_id, error = ?err, "Failed to fetch coach for valid session");
            Err(Status::InternalServerError)
        }
    }
}

/// Resolves the principal once per request; later guards reuse the result.
async fn resolve_principal<'r>(request: &'r Request<'_>) -> &'r Result<Principal, Status> {
    request
        .local_cache_async(async { lookup_principal(request).await })
        .await
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Principal {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match resolve_principal(request)
            .instrument(tracing::info_span!("principal_guard"))
            .await
        {
            Ok(principal) => Outcome::Success(principal.clone()),
            Err(status) => Outcome::Error((*status, ())),
        }
    }
}

/// A principal holding the admin role.
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub Principal);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminPrincipal {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let principal = match resolve_principal(request)
            .instrument(tracing::info_span!("admin_guard"))
            .await
        {
            Ok(principal) => Some(principal.clone()),
            Err(status) if *status == Status::InternalServerError => {
                return Outcome::Error((*status, ()));
            }
            Err(_) => None,
        };

        match Authorization::evaluate(principal, Permission::ManageCoaches) {
            Authorization::Allowed(principal) => Outcome::Success(AdminPrincipal(principal)),
            Authorization::Forbidden(principal) => {
                tracing::warn!(
                    email = %principal.email(),
                    role = %principal.role,
                    uri = %request.uri(),
                    "Admin route refused"
                );
                Outcome::Error((Status::Forbidden, ()))
            }
            denied => Outcome::Error((denied.status(), ())),
        }
    }
}

pub fn start_session(cookies: &CookieJar<'_>, token: String, ttl_hours: i64) {
    cookies.add_private(
        Cookie::build((SESSION_COOKIE, token))
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(rocket::time::Duration::hours(ttl_hours)),
    );
}

/// Drops the caller's session row, if any, and removes the cookie.
pub async fn end_session(cookies: &CookieJar<'_>, db: Option<&SqlitePool>) {
    let token = cookies
        .get_private(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());

    if let (Some(token), Some(db)) = (token, db) {
        if let Err(e) = invalidate_session(db, &token).await {
            tracing::error!(error = ?e, "Failed to invalidate session");
        }
    }

    cookies.remove_private(Cookie::build(SESSION_COOKIE));
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessDeniedView {
    pub error: String,
    pub message: String,
    pub login_url: String,
}

impl AccessDeniedView {
    fn new(message: &str) -> Self {
        Self {
            error: "Access denied".to_string(),
            message: message.to_string(),
            login_url: "/".to_string(),
        }
    }
}

#[catch(401)]
pub async fn unauthorized(req: &Request<'_>) -> Custom<Json<AccessDeniedView>> {
    tracing::warn!(uri = %req.uri(), "Unauthorized access attempt");
    end_session(req.cookies(), req.rocket().state::<SqlitePool>()).await;

    Custom(
        Status::Unauthorized,
        Json(AccessDeniedView::new("Please log in to continue.")),
    )
}

#[catch(403)]
pub async fn forbidden(req: &Request<'_>) -> Custom<Json<AccessDeniedView>> {
    tracing::warn!(uri = %req.uri(), "Forbidden access attempt, ending session");
    end_session(req.cookies(), req.rocket().state::<SqlitePool>()).await;

    Custom(
        Status::Forbidden,
        Json(AccessDeniedView::new(
            "You do not have permission to view this page.",
        )),
    )
}
