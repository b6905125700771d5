use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use crate::db::DbConn;
use crate::models::{PublicProfile, Role};
use crate::routes::find_public_profile;
use crate::utils::{ApiError, ApiResponse};

#[openapi(tag = "Employer")]
#[get("/employer/<id>")]
pub async fn get_employer(
    db: &State<DbConn>,
    id: &str,
) -> Result<Json<ApiResponse<PublicProfile>>, ApiError> {
    let profile = find_public_profile(db, id, Role::Employer).await?;
    Ok(Json(ApiResponse::success(profile)))
}
