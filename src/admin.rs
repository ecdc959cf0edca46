use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::serde::json::Json;
use rocket::{FromForm, State};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::AdminPrincipal;
use crate::db::{count_records, create_coach, get_all_coaches, get_all_players};
use crate::error::AppError;
use crate::models::{Coach, NewCoach, Player};
use crate::routes::DUPLICATE_COACH;
use crate::validation::{FlashView, FormValidateExt, Rejection, ToValidationResponse};

#[derive(Serialize, Deserialize)]
pub struct AdminView {
    pub header: String,
    pub admin: Coach,
    pub coach_count: i64,
    pub player_count: i64,
    pub flash: Option<FlashView>,
}

async fn dashboard(
    admin: AdminPrincipal,
    flash: Option<FlashMessage<'_>>,
    db: &Pool<Sqlite>,
) -> Result<Json<AdminView>, AppError> {
    let (coach_count, player_count) = count_records(db).await?;

    Ok(Json(AdminView {
        header: "Admin Dashboard".to_string(),
        admin: admin.0.coach,
        coach_count,
        player_count,
        flash: FlashView::from_message(flash),
    }))
}

#[get("/admin")]
pub async fn admin_page(
    admin: AdminPrincipal,
    flash: Option<FlashMessage<'_>>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<AdminView>, AppError> {
    dashboard(admin, flash, db).await
}

#[post("/admin")]
pub async fn admin_page_post(
    admin: AdminPrincipal,
    flash: Option<FlashMessage<'_>>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<AdminView>, AppError> {
    dashboard(admin, flash, db).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Coaches,
    Players,
}

impl DataType {
    /// Only `coaches` selects coaches; anything else lists players.
    pub fn from_query(data_type: Option<&str>) -> Self {
        match data_type {
            Some("coaches") => DataType::Coaches,
            _ => DataType::Players,
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            DataType::Coaches => "Edit/View Coaches",
            DataType::Players => "All Players",
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "data_type", content = "items", rename_all = "lowercase")]
pub enum Listing {
    Coaches(Vec<Coach>),
    Players(Vec<Player>),
}

#[derive(Serialize, Deserialize)]
pub struct ListingView {
    pub header: String,
    pub listing: Listing,
}

#[get("/admin/players-and-coaches/view?<data_type>")]
pub async fn view_records(
    data_type: Option<&str>,
    _admin: AdminPrincipal,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ListingView>, AppError> {
    let data_type = DataType::from_query(data_type);
    let listing = match data_type {
        DataType::Coaches => Listing::Coaches(get_all_coaches(db).await?),
        DataType::Players => Listing::Players(get_all_players(db).await?),
    };

    Ok(Json(ListingView {
        header: data_type.header().to_string(),
        listing,
    }))
}

#[derive(FromForm, Validate)]
pub struct AddCoachForm {
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,
    pub phone_number: Option<String>,
    #[validate(length(min = 1, max = 75, message = "School is required (75 characters max)"))]
    pub school: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct AddCoachView {
    pub header: String,
    pub flash: Option<FlashView>,
}

#[get("/admin/add_coach")]
pub fn add_coach_page(_admin: AdminPrincipal, flash: Option<FlashMessage<'_>>) -> Json<AddCoachView> {
    Json(AddCoachView {
        header: "Add Coach".to_string(),
        flash: FlashView::from_message(flash),
    })
}

#[post("/admin/add_coach", data = "<form>")]
pub async fn add_coach(
    admin: AdminPrincipal,
    form: Form<AddCoachForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Flash<Redirect>, Rejection> {
    let coach = form.validate_custom()?;

    let new_coach = NewCoach {
        email: coach.email.trim().to_string(),
        phone_number: coach.phone_number,
        school: coach.school.trim().to_string(),
        first_name: coach.first_name,
        last_name: coach.last_name,
        password: coach.password,
        admin: false,
    };

    match create_coach(db, &new_coach).await {
        Ok(()) => {
            info!("{} added coach {}", admin.0.email(), &new_coach.email);
            Ok(Flash::success(
                Redirect::to("/admin"),
                format!("Coach {} added.", new_coach.email),
            ))
        }
        Err(AppError::Conflict(msg)) => {
            warn!("Add coach rejected: {}", msg);
            Err(Rejection::flashed("/admin/add_coach", DUPLICATE_COACH))
        }
        Err(e) => Err(Rejection::from(e.to_validation_response())),
    }
}
