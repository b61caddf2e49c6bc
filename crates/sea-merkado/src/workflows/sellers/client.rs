use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::domain::{
    FileUpload, NewSeller, RequirementKind, Requirements, RequirementsUpdate, SellerId,
    SellerRecord, SellerStatus, StatusUpdate,
};
use super::store::{SellerStore, StoreError};
use crate::config::ApiConfig;
use crate::workflows::notifications::{Notification, NotificationFeed, NotificationSource};

/// REST client for the seller store.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, StoreError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        Ok(Self::with_client(http, &config.base_url))
    }

    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn seller_url(&self, id: &SellerId, suffix: &str) -> String {
        self.url(&format!("/api/sellers/{}{}", id.0, suffix))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let response = request
            .send()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        let status = response.status();
        debug!(%status, url = %response.url(), "seller store responded");

        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|err| StoreError::Decode(err.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|payload| payload.error)
            .unwrap_or(body);

        Err(match status {
            StatusCode::NOT_FOUND => StoreError::NotFound,
            StatusCode::CONFLICT => StoreError::Conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                StoreError::Invalid(message)
            }
            other => StoreError::Server {
                status: other.as_u16(),
                message,
            },
        })
    }
}

#[async_trait]
impl SellerStore for ApiClient {
    async fn list(&self) -> Result<Vec<SellerRecord>, StoreError> {
        self.send(self.http.get(self.url("/api/sellers"))).await
    }

    async fn fetch(&self, id: &SellerId) -> Result<Option<SellerRecord>, StoreError> {
        match self.send(self.http.get(self.seller_url(id, ""))).await {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::NotFound) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn register(&self, seller: NewSeller) -> Result<SellerRecord, StoreError> {
        self.send(self.http.post(self.url("/api/sellers")).json(&seller))
            .await
    }

    async fn update_status(
        &self,
        id: &SellerId,
        status: SellerStatus,
    ) -> Result<SellerRecord, StoreError> {
        let request = self
            .http
            .put(self.seller_url(id, "/status"))
            .json(&StatusUpdate { status });
        self.send(request).await
    }

    async fn check_requirements(&self, id: &SellerId) -> Result<SellerRecord, StoreError> {
        self.send(self.http.put(self.seller_url(id, "/check-requirements")))
            .await
    }

    async fn save_requirements(
        &self,
        id: &SellerId,
        requirements: Requirements,
    ) -> Result<SellerRecord, StoreError> {
        let request = self
            .http
            .put(self.seller_url(id, "/requirements"))
            .json(&RequirementsUpdate { requirements });
        self.send(request).await
    }

    async fn attach_file(
        &self,
        id: &SellerId,
        requirement: RequirementKind,
        upload: FileUpload,
    ) -> Result<SellerRecord, StoreError> {
        let request = self
            .http
            .post(self.seller_url(id, &format!("/files/{}", requirement.key())))
            .json(&upload);
        self.send(request).await
    }

    async fn detach_file(
        &self,
        id: &SellerId,
        requirement: RequirementKind,
    ) -> Result<SellerRecord, StoreError> {
        let url = self.seller_url(id, &format!("/files/{}", requirement.key()));
        self.send(self.http.delete(url)).await
    }
}

#[async_trait]
impl NotificationSource for ApiClient {
    async fn notifications(&self, feed: NotificationFeed) -> Result<Vec<Notification>, StoreError> {
        let url = self.url(&format!("/api/notifications/{}", feed.key()));
        self.send(self.http.get(url)).await
    }
}
