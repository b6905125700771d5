use crate::utils::ApiError;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

pub struct PasswordService;

impl PasswordService {
    pub async fn hash(password: &str) -> Result<String, ApiError> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
            .await
            .map_err(|e| ApiError::internal_error(format!("Hashing task failed: {}", e)))?
            .map_err(|e| {
                log::error!("Password hashing error: {}", e);
                ApiError::internal_error("Failed to secure password")
            })
    }

    /// `false` for a wrong password and for a malformed stored hash.
    pub async fn verify(password: &str, hash: &str) -> bool {
        let password = password.to_owned();
        let hash = hash.to_owned();
        match tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await {
            Ok(Ok(valid)) => valid,
            Ok(Err(e)) => {
                log::warn!("Stored password hash could not be checked: {}", e);
                false
            }
            Err(e) => {
                log::error!("Password verification task failed: {}", e);
                false
            }
        }
    }
}
