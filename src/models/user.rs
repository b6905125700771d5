use mongodb::bson::{oid::ObjectId, DateTime};
use rocket::request::FromParam;
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars;
use rocket_okapi::okapi::schemars::JsonSchema;

pub const DEFAULT_PHOTO: &str = "/placeholder.svg";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employer,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employer => "employer",
            Role::Worker => "worker",
        }
    }

    /// The role whose members this role is allowed to review.
    pub fn counterpart(&self) -> Role {
        match self {
            Role::Employer => Role::Worker,
            Role::Worker => Role::Employer,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'a> FromParam<'a> for Role {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        match param.to_lowercase().as_str() {
            "employer" => Ok(Role::Employer),
            "worker" => Ok(Role::Worker),
            _ => Err(param),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
pub struct EmployerDetails {
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, JsonSchema)]
pub struct WorkerDetails {
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub resume: String,
    #[serde(default)]
    pub experiences: Vec<String>,
    #[serde(default)]
    pub certificates: Vec<String>,
    pub bank: String,
    pub work_area: String,
    #[serde(default)]
    pub availability: String,
}

/// Role-specific attributes. Each variant only carries the fields that are
/// valid for that role.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleProfile {
    Employer(EmployerDetails),
    Worker(WorkerDetails),
}

impl RoleProfile {
    pub fn role(&self) -> Role {
        match self {
            RoleProfile::Employer(_) => Role::Employer,
            RoleProfile::Worker(_) => Role::Worker,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub surname: String,
    pub national_id: String,
    pub address: String,
    pub email: String,
    pub password_hash: String,
    pub photo: String,
    pub locality: String,
    #[serde(default)]
    pub biography: String,
    pub rating: f64,
    pub review_count: i32,
    /// Sum of every star value received; `rating` is kept equal to
    /// `rating_total / review_count`.
    #[serde(default)]
    pub rating_total: i64,
    pub profile: RoleProfile,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }

    pub fn worker(&self) -> Option<&WorkerDetails> {
        match &self.profile {
            RoleProfile::Worker(details) => Some(details),
            RoleProfile::Employer(_) => None,
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Field-level changes applied to a stored user. `None` leaves the field as is.
#[derive(Debug, Default, Clone)]
pub struct UserChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub photo: Option<String>,
    pub locality: Option<String>,
    pub biography: Option<String>,
    pub profile: Option<RoleProfile>,
}

impl UserChanges {
    pub fn photo(url: String) -> Self {
        UserChanges {
            photo: Some(url),
            ..Default::default()
        }
    }

    pub fn apply(&self, user: &mut User) {
        if let Some(ref name) = self.name {
            user.name = name.clone();
        }
        if let Some(ref surname) = self.surname {
            user.surname = surname.clone();
        }
        if let Some(ref national_id) = self.national_id {
            user.national_id = national_id.clone();
        }
        if let Some(ref address) = self.address {
            user.address = address.clone();
        }
        if let Some(ref email) = self.email {
            user.email = email.clone();
        }
        if let Some(ref password_hash) = self.password_hash {
            user.password_hash = password_hash.clone();
        }
        if let Some(ref photo) = self.photo {
            user.photo = photo.clone();
        }
        if let Some(ref locality) = self.locality {
            user.locality = locality.clone();
        }
        if let Some(ref biography) = self.biography {
            user.biography = biography.clone();
        }
        if let Some(ref profile) = self.profile {
            user.profile = profile.clone();
        }
        user.updated_at = DateTime::now();
    }
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct RegisterDto {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surname: String,
    #[serde(default)]
    pub national_id: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub biography: Option<String>,

    // Employer
    pub payment_method: Option<String>,

    // Worker
    pub bank: Option<String>,
    pub work_area: Option<String>,
    pub availability: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LoginDto {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct UpdateWorkerDetailsDto {
    pub specialties: Option<Vec<String>>,
    pub resume: Option<String>,
    pub experiences: Option<Vec<String>>,
    pub certificates: Option<Vec<String>>,
    pub bank: Option<String>,
    pub work_area: Option<String>,
    pub availability: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct UpdateEmployerDetailsDto {
    pub payment_method: Option<String>,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct UpdateProfileDto {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub national_id: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub locality: Option<String>,
    pub biography: Option<String>,
    pub worker: Option<UpdateWorkerDetailsDto>,
    pub employer: Option<UpdateEmployerDetailsDto>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadPhotoDto {
    pub mime_type: Option<String>,
    /// Base64 payload or a full `data:` URI.
    pub data: String,
}

/// The owner's view of their account.
#[derive(Debug, Serialize, JsonSchema)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub national_id: String,
    pub address: String,
    pub email: String,
    pub photo: String,
    pub locality: String,
    pub biography: String,
    pub rating: f64,
    pub review_count: i32,
    pub profile: RoleProfile,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id_hex(),
            name: user.name,
            surname: user.surname,
            national_id: user.national_id,
            address: user.address,
            email: user.email,
            photo: user.photo,
            locality: user.locality,
            biography: user.biography,
            rating: user.rating,
            review_count: user.review_count,
            profile: user.profile,
        }
    }
}

/// What other users get to see.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PublicProfile {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub photo: String,
    pub locality: String,
    pub biography: String,
    pub rating: f64,
    pub review_count: i32,
    pub profile: RoleProfile,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        PublicProfile {
            id: user.id_hex(),
            name: user.name,
            surname: user.surname,
            photo: user.photo,
            locality: user.locality,
            biography: user.biography,
            rating: user.rating,
            review_count: user.review_count,
            profile: user.profile,
        }
    }
}

/// Compact worker card used in the directory and agenda listings.
#[derive(Debug, Serialize, JsonSchema)]
pub struct WorkerSummary {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub photo: String,
    pub locality: String,
    pub rating: f64,
    pub review_count: i32,
    pub work_area: String,
    pub specialties: Vec<String>,
    pub availability: String,
}

impl WorkerSummary {
    pub fn from_user(user: &User) -> Option<Self> {
        let details = user.worker()?;
        Some(WorkerSummary {
            id: user.id_hex(),
            name: user.name.clone(),
            surname: user.surname.clone(),
            photo: user.photo.clone(),
            locality: user.locality.clone(),
            rating: user.rating,
            review_count: user.review_count,
            work_area: details.work_area.clone(),
            specialties: details.specialties.clone(),
            availability: details.availability.clone(),
        })
    }
}

/// Directory search result.
#[derive(Debug, Serialize, JsonSchema)]
pub struct WorkerSearchResponse {
    pub workers: Vec<WorkerSummary>,
    pub total: usize,
}

impl From<Vec<WorkerSummary>> for WorkerSearchResponse {
    fn from(workers: Vec<WorkerSummary>) -> Self {
        WorkerSearchResponse {
            total: workers.len(),
            workers,
        }
    }
}
