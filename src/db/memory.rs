use std::collections::HashMap;

use mongodb::bson::{oid::ObjectId, DateTime};
use tokio::sync::RwLock;

use super::{Repository, StoreError};
use crate::config::Config;
use crate::models::{Booking, RatingSummary, Review, Role, Session, User, UserChanges};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    sessions: HashMap<String, Session>,
    bookings: Vec<Booking>,
    reviews: Vec<Review>,
}

/// Process-local store with the same semantics as the MongoDB backend.
/// Records keep insertion order.
#[derive(Default)]
pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
}

fn newest_first<T>(mut items: Vec<T>, created_at: impl Fn(&T) -> DateTime) -> Vec<T> {
    items.reverse();
    items.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    items
}

#[rocket::async_trait]
impl Repository for InMemoryRepository {
    async fn insert_user(&self, mut user: User) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }

        user.id = Some(ObjectId::new());
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: &ObjectId) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id.as_ref() == Some(id)).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn users_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let state = self.state.read().await;
        Ok(state.users.iter().filter(|u| u.role() == role).cloned().collect())
    }

    async fn update_user(&self, id: &ObjectId, changes: &UserChanges) -> Result<Option<User>, StoreError> {
        let mut state = self.state.write().await;

        if let Some(ref email) = changes.email {
            if state
                .users
                .iter()
                .any(|u| &u.email == email && u.id.as_ref() != Some(id))
            {
                return Err(StoreError::Duplicate("email"));
            }
        }

        let Some(user) = state.users.iter_mut().find(|u| u.id.as_ref() == Some(id)) else {
            return Ok(None);
        };
        changes.apply(user);
        Ok(Some(user.clone()))
    }

    async fn insert_session(&self, session: &Session) -> Result<(), StoreError> {
        let ttl = Config::jwt_expiry();
        let now = DateTime::now();

        let mut state = self.state.write().await;
        state.sessions.retain(|_, s| !s.is_expired(ttl, now));
        state.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, id: &str) -> Result<Option<Session>, StoreError> {
        let state = self.state.read().await;
        let ttl = Config::jwt_expiry();
        Ok(state
            .sessions
            .get(id)
            .filter(|s| !s.is_expired(ttl, DateTime::now()))
            .cloned())
    }

    async fn delete_session(&self, id: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.sessions.remove(id).is_some())
    }

    async fn insert_booking(&self, mut booking: Booking) -> Result<Booking, StoreError> {
        let mut state = self.state.write().await;
        booking.id = Some(ObjectId::new());
        state.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn find_booking(&self, id: &ObjectId) -> Result<Option<Booking>, StoreError> {
        let state = self.state.read().await;
        Ok(state.bookings.iter().find(|b| b.id.as_ref() == Some(id)).cloned())
    }

    async fn bookings_for_worker(&self, worker_id: &ObjectId) -> Result<Vec<Booking>, StoreError> {
        let state = self.state.read().await;
        let bookings: Vec<Booking> = state
            .bookings
            .iter()
            .filter(|b| &b.worker_id == worker_id)
            .cloned()
            .collect();
        Ok(newest_first(bookings, |b| b.created_at))
    }

    async fn bookings_for_employer(&self, employer_id: &ObjectId) -> Result<Vec<Booking>, StoreError> {
        let state = self.state.read().await;
        let bookings: Vec<Booking> = state
            .bookings
            .iter()
            .filter(|b| &b.employer_id == employer_id)
            .cloned()
            .collect();
        Ok(newest_first(bookings, |b| b.created_at))
    }

    async fn set_booking_status(&self, id: &ObjectId, status: &str) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.bookings.iter_mut().find(|b| b.id.as_ref() == Some(id)) {
            Some(booking) => {
                booking.status = status.to_string();
                booking.updated_at = DateTime::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_review(&self, mut review: Review) -> Result<(Review, RatingSummary), StoreError> {
        // Review and aggregate are written under the same lock.
        let mut state = self.state.write().await;

        let Some(subject) = state
            .users
            .iter_mut()
            .find(|u| u.id.as_ref() == Some(&review.subject_id))
        else {
            return Err(StoreError::NotFound);
        };

        subject.rating_total += i64::from(review.stars);
        subject.review_count += 1;
        let summary = RatingSummary::new(subject.rating_total, subject.review_count);
        subject.rating = summary.rating;
        subject.updated_at = DateTime::now();

        review.id = Some(ObjectId::new());
        state.reviews.push(review.clone());
        Ok((review, summary))
    }

    async fn reviews_for(&self, subject_id: &ObjectId) -> Result<Vec<Review>, StoreError> {
        let state = self.state.read().await;
        let reviews: Vec<Review> = state
            .reviews
            .iter()
            .filter(|r| &r.subject_id == subject_id)
            .cloned()
            .collect();
        Ok(newest_first(reviews, |r| r.created_at))
    }
}
