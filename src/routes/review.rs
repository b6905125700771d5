use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use mongodb::bson::DateTime;
use crate::db::DbConn;
use crate::models::{is_valid_stars, CreateReviewDto, Review, ReviewResponse, MAX_STARS, MIN_STARS};
use crate::guards::AuthGuard;
use crate::routes::parse_id;
use crate::utils::{ApiError, ApiResponse};

/// Employers review workers and workers review employers. The subject's
/// rating and review count are updated together with the insert.
#[openapi(tag = "Review")]
#[post("/review/<subject_id>", data = "<dto>")]
pub async fn create_review(
    db: &State<DbConn>,
    auth: AuthGuard,
    subject_id: &str,
    dto: Json<CreateReviewDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if !is_valid_stars(dto.stars) {
        return Err(ApiError::bad_request(format!(
            "Stars must be between {} and {}",
            MIN_STARS, MAX_STARS
        )));
    }

    let subject_id = parse_id(subject_id, "User")?;
    let subject = db
        .find_user(&subject_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if subject.role() != auth.role.counterpart() {
        return Err(ApiError::forbidden(format!(
            "A {} can only review a {}",
            auth.role,
            auth.role.counterpart()
        )));
    }

    let review = Review {
        id: None,
        subject_id,
        author_id: auth.user_id,
        author_role: auth.role,
        stars: dto.stars,
        comment: dto.comment.trim().to_string(),
        created_at: DateTime::now(),
    };

    let (review, summary) = db.add_review(review).await?;
    log::info!(
        "Review for {} recorded; rating {:.2} over {} reviews",
        subject_id,
        summary.rating,
        summary.review_count
    );

    Ok(Json(ApiResponse::success_with_message(
        "Review submitted",
        serde_json::json!({
            "review": ReviewResponse::from(review),
            "rating": summary.rating,
            "review_count": summary.review_count,
        }),
    )))
}

/// Newest first.
#[openapi(tag = "Review")]
#[get("/review/<subject_id>")]
pub async fn list_reviews(
    db: &State<DbConn>,
    subject_id: &str,
) -> Result<Json<ApiResponse<Vec<ReviewResponse>>>, ApiError> {
    let subject_id = parse_id(subject_id, "User")?;
    let reviews = db.reviews_for(&subject_id).await?;

    Ok(Json(ApiResponse::success(
        reviews.into_iter().map(ReviewResponse::from).collect(),
    )))
}

#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};
    use serde_json::{json, Value};

    use crate::test_support::{bearer, client, employer_body, register, worker_body};

    #[rocket::async_test]
    async fn reviews_update_the_mean() {
        let client = client().await;
        let (employer, _) =
            register(&client, "employer", employer_body("carla@example.cl", "Carla", "Muñoz")).await;
        let (_, worker_id) =
            register(&client, "worker", worker_body("ana@example.cl", "Ana", "Soto", "Limpieza", "Providencia")).await;

        let mut last = Value::Null;
        for stars in [5, 4, 3, 5] {
            let response = client
                .post(format!("/api/v1/review/{}", worker_id))
                .header(ContentType::JSON)
                .header(bearer(&employer))
                .body(json!({ "stars": stars, "comment": "Muy puntual" }).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);
            last = response.into_json().await.unwrap();
        }
        assert_eq!(last["data"]["rating"], 4.25);
        assert_eq!(last["data"]["review_count"], 4);

        let response = client.get(format!("/api/v1/worker/{}", worker_id)).dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["rating"], 4.25);
        assert_eq!(body["data"]["review_count"], 4);

        let response = client.get(format!("/api/v1/review/{}", worker_id)).dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"].as_array().unwrap().len(), 4);
    }

    #[rocket::async_test]
    async fn stars_out_of_range_change_nothing() {
        let client = client().await;
        let (employer, _) =
            register(&client, "employer", employer_body("carla@example.cl", "Carla", "Muñoz")).await;
        let (_, worker_id) =
            register(&client, "worker", worker_body("ana@example.cl", "Ana", "Soto", "Limpieza", "Providencia")).await;

        for stars in [0, 6] {
            let response = client
                .post(format!("/api/v1/review/{}", worker_id))
                .header(ContentType::JSON)
                .header(bearer(&employer))
                .body(json!({ "stars": stars }).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::BadRequest);
        }

        let response = client.get(format!("/api/v1/worker/{}", worker_id)).dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"]["review_count"], 0);
    }

    #[rocket::async_test]
    async fn same_role_and_missing_subjects_are_refused() {
        let client = client().await;
        let (employer, _) =
            register(&client, "employer", employer_body("carla@example.cl", "Carla", "Muñoz")).await;
        let (_, other_employer) =
            register(&client, "employer", employer_body("otra@example.cl", "Otra", "Persona")).await;
        let (worker, _) =
            register(&client, "worker", worker_body("ana@example.cl", "Ana", "Soto", "Limpieza", "Providencia")).await;

        let response = client
            .post(format!("/api/v1/review/{}", other_employer))
            .header(ContentType::JSON)
            .header(bearer(&employer))
            .body(json!({ "stars": 4 }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let response = client
            .post(format!("/api/v1/review/{}", other_employer))
            .header(ContentType::JSON)
            .header(bearer(&worker))
            .body(json!({ "stars": 4 }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .post(format!("/api/v1/review/{}", mongodb::bson::oid::ObjectId::new()))
            .header(ContentType::JSON)
            .header(bearer(&worker))
            .body(json!({ "stars": 4 }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
