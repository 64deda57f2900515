//! Client for the hosted Supabase backend (PostgREST tables, GoTrue auth,
//! object storage and RPC functions).

mod auth;
mod postgrest;
mod storage;

pub use auth::AuthUser;
pub use postgrest::TableQuery;
pub use storage::{StorageObject, UploadedObject};

use reqwest::{RequestBuilder, Response, StatusCode};
use rocket::fairing::AdHoc;
use serde::{de::DeserializeOwned, Serialize};

use crate::config::get_app_config;

/// Errors from calls to the Supabase backend
#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    #[error("Missing Supabase configuration: {0}")]
    Config(&'static str),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Supabase error ({status}): {message}")]
    Api { status: StatusCode, message: String },
}

/// Handle to the Supabase project. Cloning is cheap and shares the underlying
/// HTTP connection pool.
#[derive(Clone, Debug)]
pub struct SupabaseClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    pub fn new(
        http_client: &reqwest::Client,
        url: &str,
        service_key: &str,
    ) -> Result<Self, SupabaseError> {
        let base_url = url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(SupabaseError::Config("service URL"));
        }
        if service_key.trim().is_empty() {
            return Err(SupabaseError::Config("service key"));
        }

        Ok(Self {
            http: http_client.clone(),
            base_url: base_url.to_owned(),
            service_key: service_key.trim().to_owned(),
        })
    }

    /// Start a query against a table
    pub fn from<'a>(&'a self, table: &'a str) -> TableQuery<'a> {
        TableQuery::new(self, table)
    }

    /// Call a Postgres function and return its rows
    pub async fn rpc<P, T>(&self, function: &str, params: &P) -> Result<T, SupabaseError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        let response = self.service_request(self.http.post(url)).json(params).send().await?;

        Ok(check_response(response).await?.json().await?)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the service-role credentials to a request
    fn service_request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

/// Turn non-success responses into a [SupabaseError::Api], keeping the most
/// descriptive message the backend sent.
async fn check_response(response: Response) -> Result<Response, SupabaseError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|body| {
            body.message
                .or(body.msg)
                .or(body.error_description)
                .or(body.error)
        })
        .unwrap_or(text);
    tracing::debug!(%status, %message, "Supabase request failed");

    Err(SupabaseError::Api { status, message })
}

/// Fairing that builds the Supabase client from the app config, and releases it
/// on shutdown
pub fn setup_supabase() -> AdHoc {
    AdHoc::on_ignite("Supabase setup", |rocket| async {
        rocket
            .attach(AdHoc::on_ignite("Initialize Supabase client", |rocket| async {
                let config = get_app_config(&rocket);
                let http_client = reqwest::Client::builder()
                    .user_agent(concat!("agentok-api/", env!("CARGO_PKG_VERSION")))
                    .build()
                    .expect("Should build HTTP client");
                let client = SupabaseClient::new(
                    &http_client,
                    &config.supabase_url,
                    &config.supabase_service_key,
                )
                .expect("Supabase URL or key not found in configuration");
                rocket::info!("Supabase client ready for {}", client.base_url);

                rocket.manage(http_client).manage(client)
            }))
            .attach(AdHoc::on_shutdown("Shutdown Supabase client", |rocket| {
                Box::pin(async {
                    if rocket.state::<SupabaseClient>().is_some() {
                        rocket::info!("Releasing Supabase client");
                    }
                })
            }))
    })
}
