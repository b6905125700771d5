use rocket::serde::json::Json;
use rocket::State;
use rocket_okapi::openapi;
use crate::db::DbConn;
use crate::models::{
    Role, RoleProfile, UpdateProfileDto, UpdateWorkerDetailsDto, UploadPhotoDto, UserChanges,
    UserResponse,
};
use crate::guards::AuthGuard;
use crate::routes::{check_locality, check_specialties, check_work_area};
use crate::services::{PasswordService, PhotoService};
use crate::utils::{normalize_email, validate_email, ApiError, ApiResponse};

fn non_blank(field: &str, value: &Option<String>) -> Result<Option<String>, ApiError> {
    match value.as_deref().map(str::trim) {
        Some("") => Err(ApiError::bad_request(format!("{} cannot be empty", field))),
        other => Ok(other.map(str::to_string)),
    }
}

/// Refuses details that belong to the other role.
fn check_role_fields(role: Role, dto: &UpdateProfileDto) -> Result<(), ApiError> {
    match (role, &dto.worker, &dto.employer) {
        (Role::Employer, Some(_), _) => Err(ApiError::bad_request(
            "Worker details cannot be set on an employer account",
        )),
        (Role::Worker, _, Some(_)) => Err(ApiError::bad_request(
            "Employer details cannot be set on a worker account",
        )),
        _ => Ok(()),
    }
}

fn check_worker_update(update: &UpdateWorkerDetailsDto) -> Result<(), ApiError> {
    non_blank("bank", &update.bank)?;
    if let Some(area) = non_blank("work_area", &update.work_area)? {
        check_work_area(&area)?;
    }
    Ok(())
}

/// Merges the role-specific part of an update into the stored profile.
fn merged_profile(
    current: &RoleProfile,
    dto: &UpdateProfileDto,
) -> Result<Option<RoleProfile>, ApiError> {
    match (current, &dto.worker, &dto.employer) {
        (RoleProfile::Employer(current), None, Some(update)) => {
            let mut details = current.clone();
            if let Some(ref method) = update.payment_method {
                details.payment_method = Some(method.trim().to_string()).filter(|m| !m.is_empty());
            }
            Ok(Some(RoleProfile::Employer(details)))
        }
        (RoleProfile::Worker(current), Some(update), None) => {
            let mut details = current.clone();

            if let Some(bank) = non_blank("bank", &update.bank)? {
                details.bank = bank;
            }
            if let Some(area) = non_blank("work_area", &update.work_area)? {
                details.work_area = area;
            }
            if let Some(ref specialties) = update.specialties {
                details.specialties = specialties.clone();
            }
            if update.work_area.is_some() || update.specialties.is_some() {
                check_specialties(&details.work_area, &details.specialties)?;
            }
            if let Some(ref resume) = update.resume {
                details.resume = resume.clone();
            }
            if let Some(ref experiences) = update.experiences {
                details.experiences = experiences.clone();
            }
            if let Some(ref certificates) = update.certificates {
                details.certificates = certificates.clone();
            }
            if let Some(ref availability) = update.availability {
                details.availability = availability.clone();
            }

            Ok(Some(RoleProfile::Worker(details)))
        }
        _ => Ok(None),
    }
}

#[openapi(tag = "User")]
#[get("/user/profile")]
pub async fn get_profile(
    db: &State<DbConn>,
    auth: AuthGuard,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = db
        .find_user(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ApiResponse::success(user.into())))
}

#[openapi(tag = "User")]
#[put("/user/profile", data = "<dto>")]
pub async fn update_profile(
    db: &State<DbConn>,
    auth: AuthGuard,
    dto: Json<UpdateProfileDto>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    check_role_fields(auth.role, &dto)?;
    if let Some(ref update) = dto.worker {
        check_worker_update(update)?;
    }

    let name = non_blank("name", &dto.name)?;
    let surname = non_blank("surname", &dto.surname)?;
    let national_id = non_blank("national_id", &dto.national_id)?;
    let address = non_blank("address", &dto.address)?;
    let locality = non_blank("locality", &dto.locality)?;
    if let Some(ref locality) = locality {
        check_locality(locality)?;
    }

    let email = match non_blank("email", &dto.email)? {
        Some(email) => {
            let email = normalize_email(&email);
            if !validate_email(&email) {
                return Err(ApiError::bad_request("Please enter a valid email"));
            }
            Some(email)
        }
        None => None,
    };

    let user = db
        .find_user(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    let profile = merged_profile(&user.profile, &dto)?;

    let password_hash = match dto.password.as_deref() {
        Some(password) if !password.is_empty() => Some(PasswordService::hash(password).await?),
        _ => None,
    };

    let changes = UserChanges {
        name,
        surname,
        national_id,
        address,
        email,
        password_hash,
        photo: None,
        locality,
        biography: dto.biography.clone(),
        profile,
    };

    let user = db
        .update_user(&auth.user_id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(ApiResponse::success_with_message(
        "Profile updated successfully",
        user.into(),
    )))
}

#[openapi(tag = "User")]
#[post("/user/photo", data = "<dto>")]
pub async fn upload_photo(
    db: &State<DbConn>,
    auth: AuthGuard,
    dto: Json<UploadPhotoDto>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let image = PhotoService::decode(&dto.data, dto.mime_type.as_deref())?;
    let previous = db
        .find_user(&auth.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?
        .photo;

    let url = PhotoService::store(&auth.user_id, &image).await?;
    if db
        .update_user(&auth.user_id, &UserChanges::photo(url.clone()))
        .await?
        .is_none()
    {
        PhotoService::remove(&url).await;
        return Err(ApiError::not_found("User not found"));
    }

    if !previous.is_empty() && previous != url {
        PhotoService::remove(&previous).await;
    }

    Ok(Json(ApiResponse::success_with_message(
        "Photo uploaded successfully",
        serde_json::json!({ "url": url }),
    )))
}
