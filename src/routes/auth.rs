use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use mongodb::bson::DateTime;
use crate::db::DbConn;
use crate::models::{
    EmployerDetails, LoginDto, RegisterDto, Role, RoleProfile, Session, User,
    UserResponse, WorkerDetails, DEFAULT_PHOTO,
};
use crate::guards::AuthGuard;
use crate::routes::{check_locality, check_specialties, check_work_area};
use crate::services::{JwtService, PasswordService};
use crate::utils::{normalize_email, require_fields, validate_email, ApiError, ApiResponse};

/// Builds the role-specific part of a new account, checking the fields that
/// only that role requires.
fn role_profile(role: Role, dto: &RegisterDto) -> Result<RoleProfile, ApiError> {
    match role {
        Role::Employer => Ok(RoleProfile::Employer(EmployerDetails {
            payment_method: dto.payment_method.clone().filter(|m| !m.trim().is_empty()),
        })),
        Role::Worker => {
            let bank = dto.bank.clone().unwrap_or_default();
            let work_area = dto.work_area.clone().unwrap_or_default();
            require_fields(&[("bank", bank.as_str()), ("work_area", work_area.as_str())])?;

            check_work_area(&work_area)?;
            check_specialties(&work_area, &dto.specialties)?;

            Ok(RoleProfile::Worker(WorkerDetails {
                specialties: dto.specialties.clone(),
                resume: String::new(),
                experiences: Vec::new(),
                certificates: Vec::new(),
                bank,
                work_area,
                availability: dto.availability.clone().unwrap_or_default(),
            }))
        }
    }
}

async fn open_session(db: &DbConn, user: &User) -> Result<String, ApiError> {
    let user_id = user
        .id
        .ok_or_else(|| ApiError::internal_error("User has no id"))?;
    let session = Session::open(user_id, user.role());
    db.insert_session(&session).await?;

    JwtService::generate_token(&session)
        .map_err(|e| ApiError::internal_error(format!("Failed to issue token: {}", e)))
}

/// --------------------
/// Register
/// --------------------
#[openapi(tag = "Auth")]
#[post("/auth/register/<role>", data = "<dto>")]
pub async fn register(
    db: &State<DbConn>,
    role: Role,
    dto: Json<RegisterDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    require_fields(&[
        ("name", dto.name.as_str()),
        ("surname", dto.surname.as_str()),
        ("national_id", dto.national_id.as_str()),
        ("address", dto.address.as_str()),
        ("locality", dto.locality.as_str()),
        ("email", dto.email.as_str()),
        ("password", dto.password.as_str()),
    ])?;

    let email = normalize_email(&dto.email);
    if !validate_email(&email) {
        return Err(ApiError::bad_request("Please enter a valid email"));
    }

    check_locality(dto.locality.trim())?;
    let profile = role_profile(role, &dto)?;

    if db.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("An account with this email already exists"));
    }

    let now = DateTime::now();
    let user = User {
        id: None,
        name: dto.name.trim().to_string(),
        surname: dto.surname.trim().to_string(),
        national_id: dto.national_id.trim().to_string(),
        address: dto.address.trim().to_string(),
        email,
        password_hash: PasswordService::hash(&dto.password).await?,
        photo: DEFAULT_PHOTO.to_string(),
        locality: dto.locality.trim().to_string(),
        biography: dto.biography.clone().unwrap_or_default(),
        rating: 0.0,
        review_count: 0,
        rating_total: 0,
        profile,
        created_at: now,
        updated_at: now,
    };

    let user = db.insert_user(user).await?;
    let token = open_session(db, &user).await?;
    log::info!("Registered {} {}", role, user.id_hex());

    Ok(Json(ApiResponse::success_with_message(
        "Registration successful",
        serde_json::json!({
            "token": token,
            "user": UserResponse::from(user),
        }),
    )))
}

/// --------------------
/// Login
/// --------------------
#[openapi(tag = "Auth")]
#[post("/auth/login/<role>", data = "<dto>")]
pub async fn login(
    db: &State<DbConn>,
    role: Role,
    dto: Json<LoginDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    require_fields(&[("email", dto.email.as_str()), ("password", dto.password.as_str())])?;

    let email = normalize_email(&dto.email);
    if !validate_email(&email) {
        return Err(ApiError::bad_request("Please enter a valid email"));
    }

    let user = db
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Incorrect email or password"))?;

    if !PasswordService::verify(&dto.password, &user.password_hash).await {
        return Err(ApiError::unauthorized("Incorrect email or password"));
    }

    if user.role() != role {
        log::warn!("{} account {} tried the {} login", user.role(), user.id_hex(), role);
        return Err(ApiError::unauthorized(match role {
            Role::Employer => "This account is not an employer account",
            Role::Worker => "This account is not a worker account",
        }));
    }

    let token = open_session(db, &user).await?;

    Ok(Json(ApiResponse::success_with_message(
        "Login successful",
        serde_json::json!({
            "token": token,
            "user": UserResponse::from(user),
        }),
    )))
}

/// --------------------
/// Logout
/// --------------------
#[openapi(tag = "Auth")]
#[post("/auth/logout")]
pub async fn logout(
    db: &State<DbConn>,
    auth: AuthGuard,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    db.delete_session(&auth.session_id).await?;

    Ok(Json(ApiResponse::success(serde_json::json!({
        "message": "Logged out"
    }))))
}

/// --------------------
/// Current user
/// --------------------
#[openapi(tag = "Auth")]
#[get("/auth/me")]
pub async fn current_user(
    db: &State<DbConn>,
    auth: AuthGuard,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = db
        .find_user(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User profile not found"))?;

    Ok(Json(ApiResponse::success(UserResponse::from(user))))
}
