use std::path::PathBuf;

use data_encoding::BASE64;
use mongodb::bson::oid::ObjectId;
use tokio::fs;

use crate::config::Config;
use crate::utils::ApiError;

pub const MAX_PHOTO_BYTES: usize = 750 * 1024;
const PHOTO_URL_PREFIX: &str = "/uploads/photos/";

#[derive(Debug)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

fn extension_from_mime(mime_type: &str) -> Option<&'static str> {
    match mime_type.trim().to_lowercase().as_str() {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

pub struct PhotoService;

impl PhotoService {
    /// Accepts either a `data:<mime>;base64,<payload>` URI or a bare base64
    /// payload together with its MIME type.
    pub fn decode(data: &str, mime_type: Option<&str>) -> Result<DecodedImage, ApiError> {
        let (mime, payload) = match data.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| ApiError::bad_request("Malformed data URI"))?;
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| ApiError::bad_request("Only base64 data URIs are supported"))?;
                (mime, payload)
            }
            None => {
                let mime = mime_type
                    .ok_or_else(|| ApiError::bad_request("mime_type is required for raw base64 data"))?;
                (mime, data)
            }
        };

        let extension = extension_from_mime(mime).ok_or_else(|| {
            ApiError::bad_request(format!(
                "Invalid MIME type: {}. Allowed: image/jpeg, image/png, image/webp",
                mime
            ))
        })?;

        let bytes = BASE64
            .decode(payload.trim().as_bytes())
            .map_err(|_| ApiError::bad_request("Invalid base64 data"))?;

        if bytes.is_empty() {
            return Err(ApiError::bad_request("Image is empty"));
        }
        if bytes.len() > MAX_PHOTO_BYTES {
            return Err(ApiError::bad_request("Image exceeds the 750KB limit"));
        }

        Ok(DecodedImage { bytes, extension })
    }

    /// Writes the image under the uploads directory and returns its public URL.
    pub async fn store(user_id: &ObjectId, image: &DecodedImage) -> Result<String, ApiError> {
        let upload_dir = format!("{}/photos", Config::uploads_dir());
        fs::create_dir_all(&upload_dir).await.map_err(|e| {
            log::error!("Failed to create {}: {}", upload_dir, e);
            ApiError::internal_error("Failed to store photo")
        })?;

        let filename = format!(
            "{}_{}.{}",
            user_id.to_hex(),
            uuid::Uuid::new_v4().simple(),
            image.extension
        );
        let filepath = format!("{}/{}", upload_dir, filename);

        fs::write(&filepath, &image.bytes).await.map_err(|e| {
            log::error!("Failed to write {}: {}", filepath, e);
            ApiError::internal_error("Failed to store photo")
        })?;

        log::info!("Stored profile photo {} ({} bytes)", filename, image.bytes.len());
        Ok(format!("{}{}", PHOTO_URL_PREFIX, filename))
    }

    /// Maps a URL returned by `store` back to its file. Anything else is `None`.
    pub fn local_path(url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(PHOTO_URL_PREFIX)?;
        if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
            return None;
        }
        Some(PathBuf::from(Config::uploads_dir()).join("photos").join(name))
    }

    /// Deletes a previously stored photo. Failures are logged, not returned.
    pub async fn remove(url: &str) {
        let Some(path) = Self::local_path(url) else {
            return;
        };
        if let Err(e) = fs::remove_file(&path).await {
            log::warn!("Failed to remove old photo {}: {}", path.display(), e);
        }
    }
}
