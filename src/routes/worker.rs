use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use crate::db::DbConn;
use crate::models::{PublicProfile, Role, WorkerSearchResponse, WorkerSummary};
use crate::routes::find_public_profile;
use crate::services::directory::{self, WorkerQuery};
use crate::utils::{ApiError, ApiResponse};

/// Directory search. Every filter is optional and `all` disables it.
#[openapi(tag = "Worker")]
#[get("/worker/search?<query..>")]
pub async fn search_workers(
    db: &State<DbConn>,
    query: WorkerQuery,
) -> Result<Json<ApiResponse<WorkerSearchResponse>>, ApiError> {
    let workers = db.users_by_role(Role::Worker).await?;
    let found: Vec<WorkerSummary> = directory::search(workers, &query)
        .iter()
        .filter_map(WorkerSummary::from_user)
        .collect();

    Ok(Json(ApiResponse::success(found.into())))
}

#[openapi(tag = "Worker")]
#[get("/worker/<id>")]
pub async fn get_worker(
    db: &State<DbConn>,
    id: &str,
) -> Result<Json<ApiResponse<PublicProfile>>, ApiError> {
    let profile = find_public_profile(db, id, Role::Worker).await?;
    Ok(Json(ApiResponse::success(profile)))
}
