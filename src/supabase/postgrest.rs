use std::fmt::Display;

use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};

use super::{check_response, SupabaseClient, SupabaseError};

/// Builder for a single PostgREST request against one table. Filters are
/// combined with AND, matching the semantics of repeated query parameters.
#[derive(Debug)]
pub struct TableQuery<'a> {
    client: &'a SupabaseClient,
    table: &'a str,
    columns: String,
    params: Vec<(String, String)>,
}

impl<'a> TableQuery<'a> {
    pub(super) fn new(client: &'a SupabaseClient, table: &'a str) -> Self {
        Self {
            client,
            table,
            columns: "*".to_owned(),
            params: Vec::new(),
        }
    }

    /// Columns to return (defaults to `*`)
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns.to_owned();
        self
    }

    /// `column = value`
    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.params.push((column.to_owned(), format!("eq.{value}")));
        self
    }

    /// `column IN (values)`
    pub fn in_<I>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let list = values
            .into_iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.params.push((column.to_owned(), format!("in.({list})")));
        self
    }

    /// Raw disjunction in PostgREST syntax, e.g. `user_id.eq.1,is_public.eq.true`
    pub fn or(mut self, filters: &str) -> Self {
        self.params.push(("or".to_owned(), format!("({filters})")));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.params.push(("limit".to_owned(), count.to_string()));
        self
    }

    /// Run a `SELECT` and return the matching rows
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, SupabaseError> {
        let params = self.query_params();
        let request = self.request(Method::GET).query(&params);
        let response = request.send().await?;

        Ok(check_response(response).await?.json().await?)
    }

    /// Insert one row and return the created rows
    pub async fn insert<B, T>(self, row: &B) -> Result<Vec<T>, SupabaseError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .request(Method::POST)
            .query(&[("select", self.columns.as_str())])
            .json(row);
        self.send_returning(request).await
    }

    /// Apply a partial update to the filtered rows and return them
    pub async fn update<B, T>(self, changes: &B) -> Result<Vec<T>, SupabaseError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let params = self.query_params();
        let request = self.request(Method::PATCH).query(&params).json(changes);
        self.send_returning(request).await
    }

    /// Delete the filtered rows and return them
    pub async fn delete<T: DeserializeOwned>(self) -> Result<Vec<T>, SupabaseError> {
        let params = self.query_params();
        let request = self.request(Method::DELETE).query(&params);
        self.send_returning(request).await
    }

    fn query_params(&self) -> Vec<(&str, &str)> {
        std::iter::once(("select", self.columns.as_str()))
            .chain(self.params.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .collect()
    }

    fn request(&self, method: Method) -> reqwest::RequestBuilder {
        let url = self.client.url(&format!("/rest/v1/{}", self.table));
        self.client
            .service_request(self.client.http.request(method, url))
    }

    async fn send_returning<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<T>, SupabaseError> {
        let response = request
            .header("Prefer", "return=representation")
            .send()
            .await?;

        Ok(check_response(response).await?.json().await?)
    }
}
