pub mod user;
pub mod booking;
pub mod review;
pub mod session;
pub mod catalog;

pub use user::*;
pub use booking::*;
pub use review::*;
pub use session::*;
