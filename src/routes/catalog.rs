use rocket::serde::json::Json;
use rocket_okapi::openapi;
use crate::models::catalog::{self, AreaJobs};
use crate::utils::{ApiError, ApiResponse};

#[openapi(tag = "Catalog")]
#[get("/catalog/areas")]
pub fn get_areas() -> Json<ApiResponse<Vec<&'static str>>> {
    Json(ApiResponse::success(catalog::AREAS.to_vec()))
}

#[openapi(tag = "Catalog")]
#[get("/catalog/localities")]
pub fn get_localities() -> Json<ApiResponse<Vec<&'static str>>> {
    Json(ApiResponse::success(catalog::LOCALITIES.to_vec()))
}

/// Jobs grouped by area, or the jobs of a single area with `?area=`.
#[openapi(tag = "Catalog")]
#[get("/catalog/jobs?<area>")]
pub fn get_jobs(area: Option<&str>) -> Result<Json<ApiResponse<Vec<AreaJobs>>>, ApiError> {
    let Some(area) = area.filter(|a| !a.trim().is_empty()) else {
        return Ok(Json(ApiResponse::success(catalog::area_jobs())));
    };

    if !catalog::is_known_area(area) {
        return Err(ApiError::not_found(format!("Unknown work area: {}", area)));
    }

    Ok(Json(ApiResponse::success(vec![AreaJobs {
        area: area.to_string(),
        jobs: catalog::jobs_for(Some(area)).into_iter().map(str::to_string).collect(),
    }])))
}

#[cfg(test)]
mod tests {
    use rocket::http::Status;
    use serde_json::Value;

    use crate::test_support::client;

    #[rocket::async_test]
    async fn lists_areas_and_jobs() {
        let client = client().await;

        let response = client.get("/api/v1/catalog/areas").dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"].as_array().unwrap().len(), 6);

        let response = client.get("/api/v1/catalog/localities").dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert!(body["data"].as_array().unwrap().iter().any(|l| l == "Ñuñoa"));

        let response = client.get("/api/v1/catalog/jobs?area=Pintura").dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"][0]["area"], "Pintura");
        assert!(body["data"][0]["jobs"].as_array().unwrap().iter().any(|j| j == "Pintura interior"));

        let response = client.get("/api/v1/catalog/jobs?area=Astrologia").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
