pub mod directory;
pub mod jwt;
pub mod password;
pub mod photo;

pub use jwt::JwtService;
pub use password::PasswordService;
pub use photo::PhotoService;
