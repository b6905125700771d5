#[macro_use]
extern crate rocket;

mod config;
mod db;
mod guards;
mod models;
mod routes;
mod services;
mod utils;

use dotenvy::dotenv;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::{FileServer, Options};
use rocket::http::{Header, Status};
use rocket::serde::json::{json, Value};
use rocket::{Build, Request, Response, Rocket};
use rocket_okapi::openapi_get_routes;
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};

use crate::config::Config;

/* ----------------------------- CORS ----------------------------- */

pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        if let Some(origin) = request.headers().get_one("Origin") {
            response.set_header(Header::new("Access-Control-Allow-Origin", origin));
        }

        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, OPTIONS",
        ));

        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization",
        ));

        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

/* ----------------------------- OPTIONS ----------------------------- */

#[options("/<_..>")]
fn options_handler() {}

/* ----------------------------- ERRORS ----------------------------- */

fn error_body(message: &str) -> Value {
    json!({
        "success": false,
        "message": message
    })
}

#[catch(400)]
fn bad_request() -> Value {
    error_body("Malformed request")
}

#[catch(401)]
fn unauthorized() -> Value {
    error_body("Authentication required")
}

#[catch(403)]
fn forbidden() -> Value {
    error_body("This action is not allowed for your role")
}

#[catch(404)]
fn not_found() -> Value {
    error_body("Resource not found (check /api/v1 prefix)")
}

#[catch(422)]
fn unprocessable(req: &Request) -> Value {
    log::warn!("Unprocessable body on {}", req.uri());
    error_body("Request body is not valid")
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request) -> Value {
    error_body(status.reason().unwrap_or("Request failed"))
}

#[catch(500)]
fn internal_error() -> Value {
    error_body("Internal server error")
}

/* ----------------------------- SWAGGER ----------------------------- */

fn swagger_config() -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: "/api/v1/openapi.json".to_string(),
        ..Default::default()
    }
}

/* ----------------------------- APP ----------------------------- */

/// Mounts routes, catchers and fairings. Storage is attached by the caller.
fn app(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(CORS)
        .mount("/", routes![options_handler])
        .mount(
            "/api/v1",
            openapi_get_routes![
                // Auth
                routes::auth::register,
                routes::auth::login,
                routes::auth::logout,
                routes::auth::current_user,
                // User
                routes::user::get_profile,
                routes::user::update_profile,
                routes::user::upload_photo,
                // Directory
                routes::worker::search_workers,
                routes::worker::get_worker,
                routes::employer::get_employer,
                // Bookings
                routes::booking::create_booking,
                routes::booking::worker_bookings,
                routes::booking::employer_bookings,
                routes::booking::update_booking_status,
                // Reviews
                routes::review::create_review,
                routes::review::list_reviews,
                // Catalog
                routes::catalog::get_areas,
                routes::catalog::get_localities,
                routes::catalog::get_jobs,
            ],
        )
        .mount("/uploads", FileServer::new(Config::uploads_dir(), Options::Missing))
        .mount("/api/docs", make_swagger_ui(&swagger_config()))
        .register(
            "/",
            catchers![
                bad_request,
                unauthorized,
                forbidden,
                not_found,
                unprocessable,
                internal_error,
                default_catcher
            ],
        )
}

/* ----------------------------- LAUNCH ----------------------------- */

#[launch]
fn rocket() -> Rocket<Build> {
    dotenv().ok();
    env_logger::init();

    let uploads = Config::uploads_dir();
    if let Err(e) = std::fs::create_dir_all(format!("{}/photos", uploads)) {
        log::error!("Could not create uploads directory {}: {}", uploads, e);
    }

    log::info!("🚀 Helpers API running");
    if Config::is_development() {
        log::info!("📚 Swagger UI → http://localhost:8000/api/docs");
    }

    app(rocket::build().attach(db::init()))
}


#[cfg(test)]
mod tests {
    use rocket::http::{Header, Status};
    use serde_json::Value;

    use crate::test_support::client;

    #[rocket::async_test]
    async fn unknown_route_gets_json_404() {
        let client = client().await;
        let response = client.get("/api/v1/nowhere").dispatch().await;
        assert_eq!(response.status(), Status::NotFound);
        let body: Value = response.into_json().await.unwrap();
        assert_eq!(body["success"], false);
    }

    #[rocket::async_test]
    async fn cors_echoes_origin() {
        let client = client().await;
        let response = client
            .get("/api/v1/catalog/areas")
            .header(Header::new("Origin", "http://localhost:5173"))
            .dispatch()
            .await;
        assert_eq!(
            response.headers().get_one("Access-Control-Allow-Origin"),
            Some("http://localhost:5173")
        );
    }

    #[rocket::async_test]
    async fn openapi_document_is_served() {
        let client = client().await;
        let response = client.get("/api/v1/openapi.json").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.unwrap();
        let paths = body["paths"].as_object().unwrap();
        assert!(paths.keys().any(|path| path.ends_with("/booking/{worker_id}")));
    }
}
