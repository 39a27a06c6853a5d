use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::error::ErrorBody;
use tracing::debug;
use url::Url;

use crate::{
    error::ClientError,
    store::{RecordId, Resource},
};

/// Network operations behind one resource's workers.
#[async_trait]
pub trait ResourceApi<R: Resource>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<R::Record>, ClientError>;
    async fn fetch_one(&self, id: RecordId<R>) -> Result<R::Record, ClientError>;
    async fn fetch_by_condition(
        &self,
        condition: R::Condition,
    ) -> Result<Vec<R::Record>, ClientError>;
    async fn create(&self, input: R::Input) -> Result<R::Record, ClientError>;
    async fn update(&self, id: RecordId<R>, patch: R::Patch) -> Result<R::Record, ClientError>;
    async fn delete(&self, id: RecordId<R>) -> Result<(), ClientError>;
}

/// REST collection client: `GET|POST base`, `GET|PUT|DELETE base/{id}`,
/// and `GET base?condition=..&value=..` for conditional search.
pub struct HttpResource<R> {
    http: Client,
    base: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpResource<R> {
    pub fn new(http: Client, base: &Url) -> Self {
        Self {
            http,
            base: base.as_str().trim_end_matches('/').to_string(),
            _resource: PhantomData,
        }
    }

    /// Collection under a shared host, e.g. `https://host/posts` for [`crate::store::Posts`].
    pub fn under(http: Client, host: &Url) -> Self {
        let base = format!("{}/{}", host.as_str().trim_end_matches('/'), R::NAME);
        Self {
            http,
            base,
            _resource: PhantomData,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn item_url(&self, id: RecordId<R>) -> String {
        format!("{}/{id}", self.base)
    }

    fn ensure_writable(&self) -> Result<(), ClientError> {
        if R::READ_ONLY {
            return Err(ClientError::ReadOnly { entity: R::NAME });
        }
        Ok(())
    }
}

async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .map(|body| body.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("Request failed with status code {code}"));
    Err(ClientError::status(code, message))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let response = check_status(response).await?;
    Ok(response.json::<T>().await?)
}

#[async_trait]
impl<R: Resource> ResourceApi<R> for HttpResource<R> {
    async fn fetch_all(&self) -> Result<Vec<R::Record>, ClientError> {
        debug!(entity = R::NAME, url = %self.base, "GET collection");
        let response = self.http.get(&self.base).send().await?;
        decode(response).await
    }

    async fn fetch_one(&self, id: RecordId<R>) -> Result<R::Record, ClientError> {
        let url = self.item_url(id);
        debug!(entity = R::NAME, url = %url, "GET item");
        let response = self.http.get(url).send().await?;
        decode(response).await
    }

    async fn fetch_by_condition(
        &self,
        condition: R::Condition,
    ) -> Result<Vec<R::Record>, ClientError> {
        debug!(entity = R::NAME, url = %self.base, ?condition, "GET by condition");
        let response = self
            .http
            .get(&self.base)
            .query(&condition)
            .send()
            .await?;
        decode(response).await
    }

    async fn create(&self, input: R::Input) -> Result<R::Record, ClientError> {
        self.ensure_writable()?;
        debug!(entity = R::NAME, url = %self.base, "POST item");
        let response = self.http.post(&self.base).json(&input).send().await?;
        decode(response).await
    }

    async fn update(&self, id: RecordId<R>, patch: R::Patch) -> Result<R::Record, ClientError> {
        self.ensure_writable()?;
        let url = self.item_url(id);
        debug!(entity = R::NAME, url = %url, "PUT item");
        let response = self.http.put(url).json(&patch).send().await?;
        decode(response).await
    }

    async fn delete(&self, id: RecordId<R>) -> Result<(), ClientError> {
        self.ensure_writable()?;
        let url = self.item_url(id);
        debug!(entity = R::NAME, url = %url, "DELETE item");
        let response = self.http.delete(url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
