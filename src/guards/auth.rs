use rocket::request::{self, FromRequest, Request, Outcome};
use rocket::http::Status;
use rocket::State;
use mongodb::bson::oid::ObjectId;

use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use rocket_okapi::r#gen::OpenApiGenerator;

use crate::db::DbConn;
use crate::models::Role;
use crate::services::JwtService;

/// Bearer-token guard. The token must verify and its session must still exist.
pub struct AuthGuard {
    pub user_id: ObjectId,
    pub role: Role,
    pub session_id: String,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthGuard {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let Some(header) = req.headers().get_one("Authorization") else {
            return Outcome::Error((Status::Unauthorized, ()));
        };
        let token = header.trim_start_matches("Bearer ").trim();

        let claims = match JwtService::verify_token(token) {
            Ok(claims) => claims,
            Err(_) => return Outcome::Error((Status::Unauthorized, ())),
        };

        let Ok(user_id) = ObjectId::parse_str(&claims.sub) else {
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let db = match req.guard::<&State<DbConn>>().await {
            Outcome::Success(db) => db,
            _ => return Outcome::Error((Status::InternalServerError, ())),
        };

        match db.find_session(&claims.sid).await {
            Ok(Some(session)) if session.user_id == user_id && session.role == claims.role => {
                Outcome::Success(AuthGuard {
                    user_id,
                    role: session.role,
                    session_id: session.id,
                })
            }
            Ok(_) => Outcome::Error((Status::Unauthorized, ())),
            Err(e) => {
                log::error!("Session lookup failed: {}", e);
                Outcome::Error((Status::InternalServerError, ()))
            }
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for AuthGuard {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}
