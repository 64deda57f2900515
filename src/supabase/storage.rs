use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{check_response, SupabaseClient, SupabaseError};

/// Entry returned when listing a storage bucket
#[derive(Debug, Deserialize)]
pub struct StorageObject {
    pub name: String,
}

/// Response from an upload
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadedObject {
    #[serde(rename = "Key")]
    pub key: String,
}

const LIST_LIMIT: u32 = 100;

impl SupabaseClient {
    /// List the objects directly under `prefix` in a bucket. With `search`, only
    /// names starting with it are listed. At most one page of results is returned.
    pub async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        search: Option<&str>,
    ) -> Result<Vec<StorageObject>, SupabaseError> {
        let url = self.url(&format!("/storage/v1/object/list/{bucket}"));
        let mut body = json!({
            "prefix": prefix,
            "limit": LIST_LIMIT,
            "offset": 0,
            "sortBy": { "column": "name", "order": "asc" },
        });
        if let Some(search) = search {
            body["search"] = search.into();
        }
        let response = self
            .service_request(self.http.post(url))
            .json(&body)
            .send()
            .await?;

        Ok(check_response(response).await?.json().await?)
    }

    /// Remove objects from a bucket, returning the removed entries
    pub async fn remove_objects(
        &self,
        bucket: &str,
        paths: &[&str],
    ) -> Result<Vec<StorageObject>, SupabaseError> {
        let url = self.url(&format!("/storage/v1/object/{bucket}"));
        let response = self
            .service_request(self.http.delete(url))
            .json(&json!({ "prefixes": paths }))
            .send()
            .await?;

        Ok(check_response(response).await?.json().await?)
    }

    /// Upload an object. With `upsert`, an existing object at the same path is
    /// overwritten instead of rejected.
    pub async fn upload_object(
        &self,
        bucket: &str,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<UploadedObject, SupabaseError> {
        let url = self.url(&format!(
            "/storage/v1/object/{bucket}/{}",
            encode_object_path(path)
        ));
        let response = self
            .service_request(self.http.post(url))
            .header("Content-Type", content_type)
            .header("x-upsert", upsert.to_string())
            .body(data)
            .send()
            .await?;

        Ok(check_response(response).await?.json().await?)
    }
}

/// Percent-encode each segment of an object path, keeping the separators
fn encode_object_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
