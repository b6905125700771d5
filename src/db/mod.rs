pub mod memory;
pub mod mongo;

use std::sync::Arc;

use mongodb::bson::oid::ObjectId;
use rocket::fairing::AdHoc;

use crate::config::{Config, StorageKind};
use crate::models::{Booking, RatingSummary, Review, Role, Session, User, UserChanges};

pub use memory::InMemoryRepository;
pub use mongo::MongoRepository;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("duplicate value for {0}")]
    Duplicate(&'static str),

    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] mongodb::bson::ser::Error),
}

/// Persistence boundary for every collection the server owns.
#[rocket::async_trait]
pub trait Repository: Send + Sync {
    /// Fails with `StoreError::Duplicate("email")` when the email is taken.
    async fn insert_user(&self, user: User) -> Result<User, StoreError>;
    async fn find_user(&self, id: &ObjectId) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError>;
    /// Returns the updated user, or `None` when no user has that id.
    async fn update_user(&self, id: &ObjectId, changes: &UserChanges) -> Result<Option<User>, StoreError>;

    async fn insert_session(&self, session: &Session) -> Result<(), StoreError>;
    async fn find_session(&self, id: &str) -> Result<Option<Session>, StoreError>;
    async fn delete_session(&self, id: &str) -> Result<bool, StoreError>;

    async fn insert_booking(&self, booking: Booking) -> Result<Booking, StoreError>;
    async fn find_booking(&self, id: &ObjectId) -> Result<Option<Booking>, StoreError>;
    async fn bookings_for_worker(&self, worker_id: &ObjectId) -> Result<Vec<Booking>, StoreError>;
    async fn bookings_for_employer(&self, employer_id: &ObjectId) -> Result<Vec<Booking>, StoreError>;
    async fn set_booking_status(&self, id: &ObjectId, status: &str) -> Result<bool, StoreError>;

    /// Appends the review and folds its stars into the subject's aggregate
    /// in one atomic step. On failure the aggregate is left untouched and the
    /// review is not kept.
    async fn add_review(&self, review: Review) -> Result<(Review, RatingSummary), StoreError>;
    /// Newest first.
    async fn reviews_for(&self, subject_id: &ObjectId) -> Result<Vec<Review>, StoreError>;
}

pub type DbConn = Arc<dyn Repository>;

pub fn init() -> AdHoc {
    AdHoc::try_on_ignite("Storage", |rocket| async {
        match Config::storage() {
            StorageKind::Memory => {
                log::warn!("Using in-memory storage; data is lost on shutdown");
                let db: DbConn = Arc::new(InMemoryRepository::default());
                Ok(rocket.manage(db))
            }
            StorageKind::Mongo => {
                let uri = Config::mongodb_uri();
                match MongoRepository::connect(&uri, &Config::database_name()).await {
                    Ok(repository) => {
                        log::info!("✓ MongoDB connected successfully");
                        let db: DbConn = Arc::new(repository);
                        Ok(rocket.manage(db))
                    }
                    Err(e) => {
                        log::error!("✗ Failed to connect to MongoDB: {}", e);
                        Err(rocket)
                    }
                }
            }
        }
    })
}
