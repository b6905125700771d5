use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use mongodb::bson::DateTime;
use crate::db::DbConn;
use crate::models::{
    Agenda, Booking, BookingResponse, CreateBookingDto, EmployerBookingView, Role,
    UpdateBookingStatusDto, WorkerSummary, STATUS_PENDING,
};
use crate::guards::{EmployerGuard, WorkerGuard};
use crate::routes::parse_id;
use crate::utils::{ApiError, ApiResponse};

#[openapi(tag = "Booking")]
#[post("/booking/<worker_id>", data = "<dto>")]
pub async fn create_booking(
    db: &State<DbConn>,
    employer: EmployerGuard,
    worker_id: &str,
    dto: Json<CreateBookingDto>,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    let missing = dto.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::bad_request(format!(
            "Please fill in all required fields: {}",
            missing.join(", ")
        )));
    }

    let worker_id = parse_id(worker_id, "Worker")?;
    let worker = db
        .find_user(&worker_id)
        .await?
        .filter(|user| user.role() == Role::Worker)
        .ok_or_else(|| ApiError::not_found("Worker not found"))?;

    let dto = dto.into_inner();
    let now = DateTime::now();
    let booking = Booking {
        id: None,
        worker_id,
        employer_id: employer.auth.user_id,
        date: dto.date,
        start_time: dto.start_time,
        end_time: dto.end_time,
        address: dto.address,
        note: dto.note,
        status: STATUS_PENDING.to_string(),
        created_at: now,
        updated_at: now,
    };

    let booking = db.insert_booking(booking).await?;
    log::info!(
        "Booking {} created by {} for {}",
        booking.id.map(|id| id.to_hex()).unwrap_or_default(),
        employer.auth.user_id,
        worker.id_hex()
    );

    Ok(Json(ApiResponse::success_with_message(
        "Booking requested",
        booking.into(),
    )))
}

/// Bookings where the caller is the booked worker.
#[openapi(tag = "Booking")]
#[get("/booking/worker")]
pub async fn worker_bookings(
    db: &State<DbConn>,
    worker: WorkerGuard,
) -> Result<Json<ApiResponse<Vec<BookingResponse>>>, ApiError> {
    let bookings = db.bookings_for_worker(&worker.auth.user_id).await?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingResponse::from).collect(),
    )))
}

/// The employer's agenda: pending requests, accepted jobs in calendar order
/// and every booking with the worker's card.
#[openapi(tag = "Booking")]
#[get("/booking/employer")]
pub async fn employer_bookings(
    db: &State<DbConn>,
    employer: EmployerGuard,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let bookings = db.bookings_for_employer(&employer.auth.user_id).await?;
    let agenda = Agenda::from_bookings(&bookings);

    let mut views = Vec::with_capacity(bookings.len());
    for booking in bookings {
        let worker = db
            .find_user(&booking.worker_id)
            .await?
            .as_ref()
            .and_then(WorkerSummary::from_user);
        views.push(EmployerBookingView {
            booking: booking.into(),
            worker,
        });
    }

    let pending: Vec<BookingResponse> = agenda.pending.into_iter().map(Into::into).collect();
    let accepted: Vec<BookingResponse> = agenda.accepted.into_iter().map(Into::into).collect();

    Ok(Json(ApiResponse::success(serde_json::json!({
        "pending": pending,
        "accepted": accepted,
        "bookings": views,
    }))))
}

#[openapi(tag = "Booking")]
#[put("/booking/<id>/status", data = "<dto>")]
pub async fn update_booking_status(
    db: &State<DbConn>,
    worker: WorkerGuard,
    id: &str,
    dto: Json<UpdateBookingStatusDto>,
) -> Result<Json<ApiResponse<BookingResponse>>, ApiError> {
    let id = parse_id(id, "Booking")?;
    let booking = db
        .find_booking(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;

    if booking.worker_id != worker.auth.user_id {
        log::warn!("Worker {} tried to answer booking {}", worker.auth.user_id, id);
        return Err(ApiError::forbidden("Only the booked worker can answer this booking"));
    }

    let status = dto.decision.status();
    if !db.set_booking_status(&id, status).await? {
        return Err(ApiError::not_found("Booking not found"));
    }

    let booking = db
        .find_booking(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;

    Ok(Json(ApiResponse::success_with_message(
        format!("Booking {}", status),
        booking.into(),
    )))
}

#[cfg(test)]
mod tests {
    use rocket::http::{ContentType, Status};
    use serde_json::{json, Value};

    use crate::test_support::{bearer, client, employer_body, register, worker_body};

    fn booking_body(date: &str, start: &str) -> Value {
        json!({
            "date": date,
            "start_time": start,
            "end_time": "13:00",
            "address": "Av. Providencia 1234, depto 56",
            "note": "Traer escalera"
        })
    }

    #[rocket::async_test]
    async fn booking_stores_fields_verbatim() {
        let client = client().await;
        let (employer, _) =
            register(&client, "employer", employer_body("carla@example.cl", "Carla", "Muñoz")).await;
        let (worker, worker_id) =
            register(&client, "worker", worker_body("ana@example.cl", "Ana", "Soto", "Limpieza", "Providencia")).await;

        let response = client
            .post(format!("/api/v1/booking/{}", worker_id))
            .header(ContentType::JSON)
            .header(bearer(&employer))
            .body(booking_body("2025-03-01", "10:00").to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        let data = &body["data"];
        assert_eq!(data["date"], "2025-03-01");
        assert_eq!(data["start_time"], "10:00");
        assert_eq!(data["end_time"], "13:00");
        assert_eq!(data["address"], "Av. Providencia 1234, depto 56");
        assert_eq!(data["note"], "Traer escalera");
        assert_eq!(data["status"], "pendiente de aceptación");
        assert_eq!(data["worker_id"], worker_id.as_str());

        let response = client.get("/api/v1/booking/worker").header(bearer(&worker)).dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[rocket::async_test]
    async fn blank_field_is_rejected_without_storing() {
        let client = client().await;
        let (employer, _) =
            register(&client, "employer", employer_body("carla@example.cl", "Carla", "Muñoz")).await;
        let (worker, worker_id) =
            register(&client, "worker", worker_body("ana@example.cl", "Ana", "Soto", "Limpieza", "Providencia")).await;

        let mut body = booking_body("2025-03-01", "10:00");
        body["address"] = json!("   ");
        let response = client
            .post(format!("/api/v1/booking/{}", worker_id))
            .header(ContentType::JSON)
            .header(bearer(&employer))
            .body(body.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let response = client.get("/api/v1/booking/worker").header(bearer(&worker)).dispatch().await;
        let body: Value = response.into_json().await.unwrap();
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn only_employers_book_existing_workers() {
        let client = client().await;
        let (employer, employer_id) =
            register(&client, "employer", employer_body("carla@example.cl", "Carla", "Muñoz")).await;
        let (worker, worker_id) =
            register(&client, "worker", worker_body("ana@example.cl", "Ana", "Soto", "Limpieza", "Providencia")).await;

        let response = client
            .post(format!("/api/v1/booking/{}", worker_id))
            .header(ContentType::JSON)
            .header(bearer(&worker))
            .body(booking_body("2025-03-01", "10:00").to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let response = client
            .post(format!("/api/v1/booking/{}", employer_id))
            .header(ContentType::JSON)
            .header(bearer(&employer))
            .body(booking_body("2025-03-01", "10:00").to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn worker_accepts_and_employer_agenda_groups() {
        let client = client().await;
        let (employer, _) =
            register(&client, "employer", employer_body("carla@example.cl", "Carla", "Muñoz")).await;
        let (worker, worker_id) =
            register(&client, "worker", worker_body("ana@example.cl", "Ana", "Soto", "Limpieza", "Providencia")).await;
        let (intruder, _) =
            register(&client, "worker", worker_body("bob@example.cl", "Bob", "Reyes", "Pintura", "Ñuñoa")).await;

        let mut ids = Vec::new();
        for (date, start) in [("2025-03-02", "09:00"), ("2025-03-01", "15:00"), ("2025-03-01", "10:00")] {
            let response = client
                .post(format!("/api/v1/booking/{}", worker_id))
                .header(ContentType::JSON)
                .header(bearer(&employer))
                .body(booking_body(date, start).to_string())
                .dispatch()
                .await;
            let body: Value = response.into_json().await.unwrap();
            ids.push(body["data"]["id"].as_str().unwrap().to_string());
        }

        let response = client
            .put(format!("/api/v1/booking/{}/status", ids[0]))
            .header(ContentType::JSON)
            .header(bearer(&intruder))
            .body(json!({ "decision": "accept" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        for id in [&ids[0], &ids[2]] {
            let response = client
                .put(format!("/api/v1/booking/{}/status", id))
                .header(ContentType::JSON)
                .header(bearer(&worker))
                .body(json!({ "decision": "accept" }).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);
            let body: Value = response.into_json().await.unwrap();
            assert_eq!(body["data"]["status"], "aceptada");
        }

        let response = client.get("/api/v1/booking/employer").header(bearer(&employer)).dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        let data = &body["data"];

        let pending = data["pending"].as_array().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0]["id"], ids[1].as_str());

        let accepted: Vec<&str> = data["accepted"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["id"].as_str().unwrap())
            .collect();
        assert_eq!(accepted, vec![ids[2].as_str(), ids[0].as_str()]);

        let bookings = data["bookings"].as_array().unwrap();
        assert_eq!(bookings.len(), 3);
        assert_eq!(bookings[0]["worker"]["name"], "Ana");
    }

    #[rocket::async_test]
    async fn unknown_booking_is_not_found() {
        let client = client().await;
        let (worker, _) =
            register(&client, "worker", worker_body("ana@example.cl", "Ana", "Soto", "Limpieza", "Providencia")).await;

        let response = client
            .put(format!("/api/v1/booking/{}/status", mongodb::bson::oid::ObjectId::new()))
            .header(ContentType::JSON)
            .header(bearer(&worker))
            .body(json!({ "decision": "reject" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::NotFound);
    }
}
