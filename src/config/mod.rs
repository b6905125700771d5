use rocket::figment::{Figment, Profile, providers::{Env, Format, Toml}};
use rocket::Config as RocketConfig;
use std::env;

/// Storage backend selected with the `storage` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Mongo,
    Memory,
}

pub struct Config;

impl Config {
    fn profile() -> String {
        env::var("ROCKET_PROFILE").unwrap_or_else(|_| RocketConfig::DEFAULT_PROFILE.to_string())
    }

    fn figment() -> Figment {
        Figment::from(RocketConfig::default())
            .merge(Toml::file("Rocket.toml").nested())
            .select(Self::profile())
            .merge(Env::prefixed("ROCKET_"))
    }

    pub fn storage() -> StorageKind {
        let value: String = Self::figment()
            .extract_inner("storage")
            .unwrap_or_else(|_| "mongodb".to_string());

        match value.to_lowercase().as_str() {
            "memory" => StorageKind::Memory,
            _ => StorageKind::Mongo,
        }
    }

    pub fn mongodb_uri() -> String {
        Self::figment()
            .extract_inner("mongodb_uri")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
    }

    pub fn database_name() -> String {
        Self::figment()
            .extract_inner("database_name")
            .unwrap_or_else(|_| "helpers".to_string())
    }

    pub fn jwt_secret() -> String {
        Self::figment()
            .extract_inner("jwt_secret")
            .unwrap_or_else(|_| "default-secret".to_string())
    }

    /// Token lifetime in seconds.
    pub fn jwt_expiry() -> i64 {
        Self::figment()
            .extract_inner("jwt_expiry")
            .unwrap_or(86400)
    }

    pub fn uploads_dir() -> String {
        Self::figment()
            .extract_inner("uploads_dir")
            .unwrap_or_else(|_| "uploads".to_string())
    }

    pub fn is_development() -> bool {
        Profile::new(&Self::profile()) == RocketConfig::DEBUG_PROFILE
    }
}
