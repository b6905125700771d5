use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars;
use rocket_okapi::okapi::schemars::JsonSchema;

use super::Role;

pub const MIN_STARS: i32 = 1;
pub const MAX_STARS: i32 = 5;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub subject_id: ObjectId,
    pub author_id: ObjectId,
    pub author_role: Role,
    pub stars: i32, // 1-5
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateReviewDto {
    pub stars: i32,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ReviewResponse {
    pub id: String,
    pub subject_id: String,
    pub author_id: String,
    pub author_role: Role,
    pub stars: i32,
    pub comment: String,
    pub created_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        ReviewResponse {
            id: review.id.map(|id| id.to_hex()).unwrap_or_default(),
            subject_id: review.subject_id.to_hex(),
            author_id: review.author_id.to_hex(),
            author_role: review.author_role,
            stars: review.stars,
            comment: review.comment,
            created_at: review.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

/// Aggregate score of a reviewed user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, JsonSchema)]
pub struct RatingSummary {
    pub rating: f64,
    pub review_count: i32,
}

impl RatingSummary {
    pub fn new(total: i64, count: i32) -> Self {
        let rating = if count > 0 {
            total as f64 / f64::from(count)
        } else {
            0.0
        };
        RatingSummary {
            rating,
            review_count: count,
        }
    }

    pub fn from_stars(stars: &[i32]) -> Self {
        let total: i64 = stars.iter().map(|s| i64::from(*s)).sum();
        Self::new(total, stars.len() as i32)
    }
}

pub fn is_valid_stars(stars: i32) -> bool {
    (MIN_STARS..=MAX_STARS).contains(&stars)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_is_zero() {
        let summary = RatingSummary::from_stars(&[]);
        assert_eq!(summary.rating, 0.0);
        assert_eq!(summary.review_count, 0);
    }

    #[test]
    fn first_review_sets_mean_to_its_stars() {
        assert_eq!(RatingSummary::from_stars(&[4]).rating, 4.0);
    }

    #[test]
    fn mean_of_several_reviews() {
        let summary = RatingSummary::from_stars(&[5, 4, 3, 5]);
        assert_eq!(summary.rating, 4.25);
        assert_eq!(summary.review_count, 4);
    }

    #[test]
    fn stars_bounds() {
        assert!(!is_valid_stars(0));
        assert!(is_valid_stars(1));
        assert!(is_valid_stars(5));
        assert!(!is_valid_stars(6));
    }
}
