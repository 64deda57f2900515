use serde::Serialize;
use serde_json::Value;

use crate::{db::UserScopedClient, errors::ApiError};

/// Postgres function performing vector similarity search over dataset chunks
pub const SEARCH_CHUNKS_FUNCTION: &str = "search_chunks_by_dataset";

pub struct SearchService<'a> {
    pub db: &'a UserScopedClient,
}

#[derive(Serialize)]
struct SearchChunksParams<'r> {
    p_dataset_id: i64,
    p_query_vector: &'r [f32],
    p_limit: usize,
}

impl<'a> SearchService<'a> {
    pub fn new(db: &'a UserScopedClient) -> Self {
        SearchService { db }
    }

    /// Find the `top_k` chunks of a dataset closest to the query embedding.
    /// Rows are returned exactly as the search function produced them.
    pub async fn search_chunks(
        &self,
        dataset_id: i64,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<Value>, ApiError> {
        let params = SearchChunksParams {
            p_dataset_id: dataset_id,
            p_query_vector: query_vector,
            p_limit: top_k,
        };

        let rows: Vec<Value> = self
            .db
            .client()
            .rpc(SEARCH_CHUNKS_FUNCTION, &params)
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to search chunks: {e}")))?;
        rocket::debug!("Chunk search returned {} rows", rows.len());

        Ok(rows)
    }
}
