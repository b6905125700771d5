use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};
use rocket_okapi::okapi::schemars;
use rocket_okapi::okapi::schemars::JsonSchema;

use super::WorkerSummary;

pub const STATUS_PENDING: &str = "pendiente de aceptación";
pub const STATUS_ACCEPTED: &str = "aceptada";
pub const STATUS_REJECTED: &str = "rechazada";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub worker_id: ObjectId,
    pub employer_id: ObjectId,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub address: String,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct CreateBookingDto {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub address: String,
    pub note: Option<String>,
}

impl CreateBookingDto {
    /// Names of the required fields that were left blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("date", &self.date),
            ("start_time", &self.start_time),
            ("end_time", &self.end_time),
            ("address", &self.address),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingDecision {
    Accept,
    Reject,
}

impl BookingDecision {
    pub fn status(&self) -> &'static str {
        match self {
            BookingDecision::Accept => STATUS_ACCEPTED,
            BookingDecision::Reject => STATUS_REJECTED,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateBookingStatusDto {
    pub decision: BookingDecision,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct BookingResponse {
    pub id: String,
    pub worker_id: String,
    pub employer_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub address: String,
    pub note: Option<String>,
    pub status: String,
    pub created_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        BookingResponse {
            id: booking.id.map(|id| id.to_hex()).unwrap_or_default(),
            worker_id: booking.worker_id.to_hex(),
            employer_id: booking.employer_id.to_hex(),
            date: booking.date,
            start_time: booking.start_time,
            end_time: booking.end_time,
            address: booking.address,
            note: booking.note,
            status: booking.status,
            created_at: booking.created_at.try_to_rfc3339_string().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct EmployerBookingView {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub worker: Option<WorkerSummary>,
}

/// An employer's bookings split the way the agenda shows them.
#[derive(Debug, Default)]
pub struct Agenda {
    pub pending: Vec<Booking>,
    /// Ordered by date, then start time.
    pub accepted: Vec<Booking>,
}

impl Agenda {
    pub fn from_bookings(bookings: &[Booking]) -> Self {
        let pending = bookings
            .iter()
            .filter(|b| b.status == STATUS_PENDING)
            .cloned()
            .collect();

        let mut accepted: Vec<Booking> = bookings
            .iter()
            .filter(|b| b.status == STATUS_ACCEPTED)
            .cloned()
            .collect();
        accepted.sort_by(|a, b| (&a.date, &a.start_time).cmp(&(&b.date, &b.start_time)));

        Agenda { pending, accepted }
    }
}
