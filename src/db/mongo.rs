use mongodb::bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use rocket::futures::TryStreamExt;

use std::time::Duration;

use super::{Repository, StoreError};
use crate::config::Config;
use crate::models::{Booking, RatingSummary, Review, Role, Session, User, UserChanges};

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoRepository {
    db: Database,
}

impl MongoRepository {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, mongodb::error::Error> {
        let client = Client::with_uri_str(uri).await?;

        // Test connection
        client
            .database("admin")
            .run_command(doc! {"ping": 1}, None)
            .await?;

        let repository = MongoRepository {
            db: client.database(database),
        };
        repository.ensure_indexes().await?;
        Ok(repository)
    }

    async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users().create_index(unique_email, None).await?;

        let by_role = IndexModel::builder()
            .keys(doc! { "profile.role": 1 })
            .build();
        self.users().create_index(by_role, None).await?;

        // Sessions disappear once their tokens can no longer verify.
        let session_ttl = IndexModel::builder()
            .keys(doc! { "created_at": 1 })
            .options(
                IndexOptions::builder()
                    .expire_after(Duration::from_secs(Config::jwt_expiry().max(0) as u64))
                    .build(),
            )
            .build();
        self.sessions().create_index(session_ttl, None).await?;

        let by_subject = IndexModel::builder()
            .keys(doc! { "subject_id": 1, "created_at": -1 })
            .build();
        self.reviews().create_index(by_subject, None).await?;

        Ok(())
    }

    fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    fn sessions(&self) -> Collection<Session> {
        self.db.collection("sessions")
    }

    fn bookings(&self) -> Collection<Booking> {
        self.db.collection("bookings")
    }

    fn reviews(&self) -> Collection<Review> {
        self.db.collection("reviews")
    }

    async fn find_bookings(&self, filter: Document) -> Result<Vec<Booking>, StoreError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let bookings = self
            .bookings()
            .find(filter, options)
            .await?
            .try_collect()
            .await?;
        Ok(bookings)
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn update_document(changes: &UserChanges) -> Result<Document, StoreError> {
    let mut update_doc = doc! {
        "updated_at": DateTime::now()
    };

    if let Some(ref name) = changes.name {
        update_doc.insert("name", name);
    }
    if let Some(ref surname) = changes.surname {
        update_doc.insert("surname", surname);
    }
    if let Some(ref national_id) = changes.national_id {
        update_doc.insert("national_id", national_id);
    }
    if let Some(ref address) = changes.address {
        update_doc.insert("address", address);
    }
    if let Some(ref email) = changes.email {
        update_doc.insert("email", email);
    }
    if let Some(ref password_hash) = changes.password_hash {
        update_doc.insert("password_hash", password_hash);
    }
    if let Some(ref photo) = changes.photo {
        update_doc.insert("photo", photo);
    }
    if let Some(ref locality) = changes.locality {
        update_doc.insert("locality", locality);
    }
    if let Some(ref biography) = changes.biography {
        update_doc.insert("biography", biography);
    }
    if let Some(ref profile) = changes.profile {
        update_doc.insert("profile", mongodb::bson::to_bson(profile)?);
    }

    Ok(update_doc)
}

/// Pipeline update for a new review: the increment and the new mean are
/// computed by the server against the same document version.
fn review_aggregate_pipeline(stars: i64) -> Vec<Document> {
    vec![
        doc! {
            "$set": {
                "rating_total": { "$add": [{ "$ifNull": ["$rating_total", 0_i64] }, stars] },
                "review_count": { "$add": [{ "$ifNull": ["$review_count", 0] }, 1] },
                "updated_at": "$$NOW"
            }
        },
        doc! {
            "$set": {
                "rating": { "$divide": ["$rating_total", "$review_count"] }
            }
        },
    ]
}

#[rocket::async_trait]
impl Repository for MongoRepository {
    async fn insert_user(&self, mut user: User) -> Result<User, StoreError> {
        let result = self.users().insert_one(&user, None).await.map_err(|e| {
            if is_duplicate_key(&e) {
                StoreError::Duplicate("email")
            } else {
                StoreError::Database(e)
            }
        })?;

        user.id = result.inserted_id.as_object_id();
        Ok(user)
    }

    async fn find_user(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        Ok(self.users().find_one(doc! { "_id": id }, None).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users().find_one(doc! { "email": email }, None).await?)
    }

    async fn users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let users = self
            .users()
            .find(doc! { "profile.role": role.as_str() }, None)
            .await?
            .try_collect()
            .await?;
        Ok(users)
    }

    async fn update_user(&self, id: &ObjectId, changes: &UserChanges) -> Result<Option<User>, StoreError> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.users()
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": update_document(changes)? },
                options,
            )
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    StoreError::Duplicate("email")
                } else {
                    StoreError::Database(e)
                }
            })
    }

    async fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions().insert_one(session, None).await?;
        Ok(())
    }

    async fn find_session(&self, id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions().find_one(doc! { "_id": id }, None).await?)
    }

    async fn delete_session(&self, id: &str) -> Result<bool, StoreError> {
        let result = self.sessions().delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn insert_booking(&self, mut booking: Booking) -> Result<Booking, StoreError> {
        let result = self.bookings().insert_one(&booking, None).await?;
        booking.id = result.inserted_id.as_object_id();
        Ok(booking)
    }

    async fn find_booking(&self, id: &ObjectId) -> Result<Option<Booking>, StoreError> {
        Ok(self.bookings().find_one(doc! { "_id": id }, None).await?)
    }

    async fn bookings_for_worker(&self, worker_id: &ObjectId) -> Result<Vec<Booking>, StoreError> {
        self.find_bookings(doc! { "worker_id": worker_id }).await
    }

    async fn bookings_for_employer(&self, employer_id: &ObjectId) -> Result<Vec<Booking>, StoreError> {
        self.find_bookings(doc! { "employer_id": employer_id }).await
    }

    async fn set_booking_status(&self, id: &ObjectId, status: &str) -> Result<bool, StoreError> {
        let result = self
            .bookings()
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "status": status,
                        "updated_at": DateTime::now()
                    }
                },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn add_review(&self, mut review: Review) -> Result<(Review, RatingSummary), StoreError> {
        let result = self.reviews().insert_one(&review, None).await?;
        let review_id = result.inserted_id.as_object_id();
        review.id = review_id;

        let pipeline = review_aggregate_pipeline(i64::from(review.stars));
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let outcome = self
            .users()
            .find_one_and_update(doc! { "_id": review.subject_id }, pipeline, options)
            .await;

        let failure = match outcome {
            Ok(Some(user)) => {
                return Ok((review, RatingSummary::new(user.rating_total, user.review_count)));
            }
            Ok(None) => StoreError::NotFound,
            Err(e) => StoreError::Database(e),
        };

        if let Some(id) = review_id {
            if let Err(e) = self.reviews().delete_one(doc! { "_id": id }, None).await {
                log::error!("Failed to discard review {} after aggregate failure: {}", id, e);
            }
        }
        Err(failure)
    }

    async fn reviews_for(&self, subject_id: &ObjectId) -> Result<Vec<Review>, StoreError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();

        let reviews = self
            .reviews()
            .find(doc! { "subject_id": subject_id }, options)
            .await?
            .try_collect()
            .await?;
        Ok(reviews)
    }
}
