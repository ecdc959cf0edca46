use rocket::form::Form;
use rocket::http::Status;
use rocket::request::FlashMessage;
use rocket::response::Redirect;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{FromForm, State};
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::Principal;
use crate::db::{create_player, delete_player, get_player, get_players_for_coach, update_player};
use crate::error::AppError;
use crate::models::{BornIn, Coach, Player};
use crate::validation::{AppErrorExt, FlashView, FormValidateExt, Rejection, ValidationResponse};

const ROSTER_ROUTE: &str = "/coach/";

const NAME_MESSAGE: &str = "Name is required (50 characters max)";
const MONTH_MESSAGE: &str = "Month must be two digits, e.g. 07";
const YEAR_MESSAGE: &str = "Year must be four digits, e.g. 2015";

#[derive(FromForm, Validate)]
pub struct PlayerForm {
    #[validate(length(min = 1, max = 50, message = "Name is required (50 characters max)"))]
    pub name: String,
    #[validate(length(equal = 2, message = "Month must be two digits, e.g. 07"))]
    pub month: String,
    #[validate(length(equal = 4, message = "Year must be four digits, e.g. 2015"))]
    pub year: String,
}

impl PlayerForm {
    fn trimmed_name(&self) -> Result<&str, Custom<Json<ValidationResponse>>> {
        match self.name.trim() {
            "" => Err(field_error("name", NAME_MESSAGE)),
            name => Ok(name),
        }
    }

    /// Applies the digit checks the length validators cannot express.
    fn born_in(&self) -> Result<BornIn, Custom<Json<ValidationResponse>>> {
        let (month, year) = (self.month.trim(), self.year.trim());

        if !BornIn::is_valid_month(month) {
            return Err(field_error("month", MONTH_MESSAGE));
        }
        if !BornIn::is_valid_year(year) {
            return Err(field_error("year", YEAR_MESSAGE));
        }

        BornIn::from_parts(month, year).validate_custom()
    }
}

fn field_error(field: &str, message: &str) -> Custom<Json<ValidationResponse>> {
    Custom(
        Status::UnprocessableEntity,
        Json(ValidationResponse::with_error(field, message)),
    )
}

#[derive(Serialize, Deserialize)]
pub struct RosterView {
    pub header: String,
    pub coach: Coach,
    pub players: Vec<Player>,
    pub flash: Option<FlashView>,
}

#[get("/coach")]
pub async fn roster_page(
    principal: Principal,
    flash: Option<FlashMessage<'_>>,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<RosterView>, AppError> {
    let players = get_players_for_coach(db, principal.email()).await?;

    Ok(Json(RosterView {
        header: format!("{} Roster", principal.coach.school),
        coach: principal.coach,
        players,
        flash: FlashView::from_message(flash),
    }))
}

#[post("/coach", data = "<form>")]
pub async fn add_player(
    principal: Principal,
    form: Form<PlayerForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Redirect, Rejection> {
    let player = form.validate_custom()?;
    let name = player.trimmed_name()?;
    let born_in = player.born_in()?;

    let id = create_player(db, &principal.coach, name, &born_in)
        .await
        .validate_custom()?;
    info!("Added player {} to roster of {}", id, principal.email());

    Ok(Redirect::to(ROSTER_ROUTE))
}

/// Loads a player the principal is allowed to manage. Players owned by
/// someone else are reported as missing.
async fn managed_player(
    db: &Pool<Sqlite>,
    principal: &Principal,
    id: i64,
) -> Result<Player, AppError> {
    let player = get_player(db, id).await?;

    if !principal.can_manage_player(&player.coach_id) {
        warn!(
            "{} attempted to manage player {} owned by {}",
            principal.email(),
            id,
            &player.coach_id
        );
        return Err(AppError::NotFound(format!(
            "Player with id {} not found in database",
            id
        )));
    }

    Ok(player)
}

#[derive(Serialize, Deserialize)]
pub struct EditPlayerView {
    pub header: String,
    pub player: Player,
    pub month: String,
    pub year: String,
    pub email: Option<String>,
}

#[get("/edit?<email>&<id>")]
pub async fn edit_player_page(
    email: Option<String>,
    id: i64,
    principal: Principal,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<EditPlayerView>, AppError> {
    let player = managed_player(db, &principal, id).await?;
    let (month, year) = BornIn::split(&player.born_in);

    Ok(Json(EditPlayerView {
        header: "Edit Player".to_string(),
        month: month.to_string(),
        year: year.to_string(),
        player,
        email,
    }))
}

#[post("/edit?<email>&<id>", data = "<form>")]
pub async fn edit_player(
    email: Option<String>,
    id: i64,
    principal: Principal,
    form: Form<PlayerForm>,
    db: &State<Pool<Sqlite>>,
) -> Result<Redirect, Rejection> {
    let edit = form.validate_custom()?;
    let name = edit.trimmed_name()?;
    let born_in = edit.born_in()?;

    managed_player(db, &principal, id).await.validate_custom()?;

    update_player(db, id, name, &born_in)
        .await
        .validate_custom()?;
    info!(
        "Player {} updated by {} (requested for {:?})",
        id,
        principal.email(),
        email
    );

    Ok(Redirect::to(ROSTER_ROUTE))
}

#[get("/delete?<email>&<id>")]
pub async fn remove_player(
    email: Option<String>,
    id: i64,
    principal: Principal,
    db: &State<Pool<Sqlite>>,
) -> Result<Redirect, AppError> {
    managed_player(db, &principal, id).await?;

    delete_player(db, id).await?;
    info!(
        "Player {} deleted by {} (requested for {:?})",
        id,
        principal.email(),
        email
    );

    Ok(Redirect::to(ROSTER_ROUTE))
}
