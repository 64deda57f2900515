use rocket::http::ContentType;

use crate::{db::UserScopedClient, errors::ApiError, supabase::UploadedObject};

/// Bucket that holds uploaded assets
pub const ASSETS_BUCKET: &str = "assets";
/// Bucket where earlier versions stored assets. Stale copies there are removed
/// when an asset is re-uploaded.
pub const LEGACY_DOCUMENTS_BUCKET: &str = "documents";

pub struct AssetStorageService<'a> {
    pub db: &'a UserScopedClient,
}

impl<'a> AssetStorageService<'a> {
    pub fn new(db: &'a UserScopedClient) -> Self {
        AssetStorageService { db }
    }

    /// Upload an asset, replacing any existing object at the same path
    pub async fn upload(&self, path: &str, data: Vec<u8>) -> Result<UploadedObject, ApiError> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Err(ApiError::bad_request("Invalid asset path"));
        }
        rocket::info!("Uploading asset {}", path);

        self.remove_stale_copy(path).await?;

        let content_type = content_type_for(path);
        let uploaded = self
            .db
            .client()
            .upload_object(ASSETS_BUCKET, path, data, &content_type, true)
            .await
            .map_err(|e| {
                rocket::error!("An error occurred while uploading asset {}: {}", path, e);
                ApiError::bad_request(format!("Failed to upload asset: {e}"))
            })?;
        rocket::info!("Uploaded asset {}", uploaded.key);

        Ok(uploaded)
    }

    async fn remove_stale_copy(&self, path: &str) -> Result<(), ApiError> {
        let client = self.db.client();
        let (prefix, file_name) = path.rsplit_once('/').unwrap_or(("", path));

        let existing = client
            .list_objects(LEGACY_DOCUMENTS_BUCKET, prefix, Some(file_name))
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to check existing asset: {e}")))?;
        if existing.iter().any(|object| object.name == file_name) {
            rocket::info!("Deleting stale copy of {}", path);
            client
                .remove_objects(LEGACY_DOCUMENTS_BUCKET, &[path])
                .await
                .map_err(|e| {
                    ApiError::bad_request(format!("Failed to remove existing asset: {e}"))
                })?;
        }

        Ok(())
    }
}

fn content_type_for(path: &str) -> String {
    path.rsplit_once('.')
        .and_then(|(_, extension)| ContentType::from_extension(extension))
        .unwrap_or(ContentType::Binary)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::content_type_for;

    #[test]
    fn guesses_content_type_from_extension() {
        assert_eq!(content_type_for("chat/1/plot.png"), "image/png");
        assert_eq!(content_type_for("report.pdf"), "application/pdf");
        assert_eq!(content_type_for("no_extension"), "application/octet-stream");
    }
}
