pub mod auth;
pub mod booking;
pub mod catalog;
pub mod employer;
pub mod review;
pub mod user;
pub mod worker;

use mongodb::bson::oid::ObjectId;

use crate::db::DbConn;
use crate::models::{PublicProfile, Role};
use crate::utils::ApiError;

/// Ids that do not parse can never match a record, so they read as not found.
pub(crate) fn parse_id(id: &str, what: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(id).map_err(|_| ApiError::not_found(format!("{} not found", what)))
}

pub(crate) async fn find_public_profile(
    db: &DbConn,
    id: &str,
    role: Role,
) -> Result<PublicProfile, ApiError> {
    let what = match role {
        Role::Employer => "Employer",
        Role::Worker => "Worker",
    };
    let id = parse_id(id, what)?;

    db.find_user(&id)
        .await?
        .filter(|user| user.role() == role)
        .map(PublicProfile::from)
        .ok_or_else(|| ApiError::not_found(format!("{} not found", what)))
}

pub(crate) fn check_locality(locality: &str) -> Result<(), ApiError> {
    if crate::models::catalog::is_known_locality(locality) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!("Unknown locality: {}", locality)))
    }
}

pub(crate) fn check_work_area(area: &str) -> Result<(), ApiError> {
    if crate::models::catalog::is_known_area(area) {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!("Unknown work area: {}", area)))
    }
}

/// Every specialty must be one of the jobs listed for `area`.
pub(crate) fn check_specialties(area: &str, specialties: &[String]) -> Result<(), ApiError> {
    let unknown = crate::models::catalog::unknown_specialties(area, specialties);
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(ApiError::bad_request(format!(
            "Specialties not offered in {}: {}",
            area,
            unknown.join(", ")
        )))
    }
}
