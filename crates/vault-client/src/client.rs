//! HTTP implementation of [`SiteApi`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use vault_meta::{PublishSettings, TOKEN_PREFIX};

use crate::api::SiteApi;
use crate::error::{CallKind, Error, Result};
use crate::retry::RetryPolicy;
use crate::types::{
    DeleteResponse, DirectivesEnvelope, FileRecord, Site, SiteEnvelope, SyncResponse,
    UploadDirective, UserInfo,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

trait WithAuth {
    fn with_auth(self, token: &str) -> Self;
}

impl WithAuth for RequestBuilder {
    fn with_auth(self, token: &str) -> Self {
        self.header("authorization", format!("Bearer {}", token))
    }
}

#[derive(Serialize)]
struct FilesRequest<'a> {
    files: &'a [FileRecord],
}

#[derive(Serialize)]
struct PathsRequest<'a> {
    paths: &'a [String],
}

async fn send(request: RequestBuilder, kind: CallKind) -> Result<Response> {
    let response = request.send().await.map_err(Error::transport)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::from_status(kind, status.as_u16(), &body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await.map_err(Error::transport)?;
    serde_json::from_slice(&bytes).map_err(Error::decode)
}

/// Client for the site publishing API.
#[derive(Clone)]
pub struct SiteClient {
    http: reqwest::Client,
    base: Url,
    token: String,
    retry: RetryPolicy,
}

impl std::fmt::Debug for SiteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteClient")
            .field("base", &self.base.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl SiteClient {
    /// Create a client for `api_url` authenticating with `token`.
    ///
    /// # Errors
    ///
    /// Fails before any request is made if the token lacks the expected
    /// prefix or the URL cannot serve as a base for API paths.
    pub fn new(api_url: &str, token: impl Into<String>, retry: RetryPolicy) -> Result<Self> {
        let token = token.into();
        if !token.starts_with(TOKEN_PREFIX) || token.len() == TOKEN_PREFIX.len() {
            return Err(Error::InvalidToken {
                prefix: TOKEN_PREFIX.to_string(),
            });
        }

        let base = Url::parse(api_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| Error::InvalidUrl {
                url: api_url.to_string(),
            })?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("vaultpub/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::transport)?;

        Ok(Self {
            http,
            base,
            token,
            retry,
        })
    }

    pub fn from_settings(settings: &PublishSettings) -> Result<Self> {
        Self::new(
            &settings.api_url,
            settings.access_token.as_str(),
            RetryPolicy::from(&settings.retry),
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Append percent-encoded path segments to the API base URL.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl {
                url: self.base.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn sync_endpoint(&self, site_id: &str, dry_run: bool) -> Result<Url> {
        let mut url = self.endpoint(&["api", "sites", "id", site_id, "sync"])?;
        url.query_pairs_mut()
            .append_pair("dryRun", if dry_run { "true" } else { "false" });
        Ok(url)
    }
}

#[async_trait]
impl SiteApi for SiteClient {
    async fn get_user_info(&self) -> Result<UserInfo> {
        let url = self.endpoint(&["api", "user"])?;
        tracing::debug!(%url, "Fetching user info");

        let response = send(self.http.get(url).with_auth(&self.token), CallKind::Identity).await?;
        decode(response).await
    }

    async fn get_site_by_name(&self, owner: &str, name: &str) -> Result<Option<Site>> {
        let url = self.endpoint(&["api", "sites", owner, name])?;
        tracing::debug!(owner, name, "Looking up site");

        let response = self
            .http
            .get(url)
            .with_auth(&self.token)
            .send()
            .await
            .map_err(Error::transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(CallKind::Api, status.as_u16(), &body));
        }

        let envelope: SiteEnvelope = decode(response).await?;
        Ok(Some(envelope.site))
    }

    async fn create_site(&self, name: &str) -> Result<Site> {
        let url = self.endpoint(&["api", "sites"])?;
        let body = json!({ "projectName": name, "overwrite": false });

        let envelope: SiteEnvelope = self
            .retry
            .run("create_site", || async {
                let request = self.http.post(url.clone()).with_auth(&self.token).json(&body);
                decode(send(request, CallKind::Api).await?).await
            })
            .await?;

        tracing::info!(site_id = %envelope.site.id, name, "Created site");
        Ok(envelope.site)
    }

    async fn sync_files(
        &self,
        site_id: &str,
        files: &[FileRecord],
        dry_run: bool,
    ) -> Result<SyncResponse> {
        let url = self.sync_endpoint(site_id, dry_run)?;
        let body = FilesRequest { files };
        tracing::debug!(site_id, files = files.len(), dry_run, "Syncing file records");

        let attempt = || async {
            let request = self.http.post(url.clone()).with_auth(&self.token).json(&body);
            decode(send(request, CallKind::Api).await?).await
        };

        // A dry run has no side effects to protect, so it is not retried
        if dry_run {
            attempt().await
        } else {
            self.retry.run("sync_files", attempt).await
        }
    }

    async fn publish_files(
        &self,
        site_id: &str,
        files: &[FileRecord],
    ) -> Result<Vec<UploadDirective>> {
        let url = self.endpoint(&["api", "sites", "id", site_id, "files"])?;
        let body = FilesRequest { files };
        tracing::debug!(site_id, files = files.len(), "Registering files for publish");

        let envelope: DirectivesEnvelope = self
            .retry
            .run("publish_files", || async {
                let request = self.http.post(url.clone()).with_auth(&self.token).json(&body);
                decode(send(request, CallKind::Api).await?).await
            })
            .await?;

        Ok(envelope.files)
    }

    async fn delete_files(&self, site_id: &str, paths: &[String]) -> Result<DeleteResponse> {
        let url = self.endpoint(&["api", "sites", "id", site_id, "files"])?;
        let body = PathsRequest { paths };
        tracing::debug!(site_id, paths = paths.len(), "Deleting files");

        self.retry
            .run("delete_files", || async {
                let request = self
                    .http
                    .delete(url.clone())
                    .with_auth(&self.token)
                    .json(&body);
                decode(send(request, CallKind::Api).await?).await
            })
            .await
    }

    async fn upload_to_storage(
        &self,
        upload_url: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let url = Url::parse(upload_url).map_err(|_| Error::InvalidUrl {
            url: upload_url.to_string(),
        })?;
        tracing::debug!(
            host = url.host_str().unwrap_or_default(),
            size = bytes.len(),
            "Uploading file bytes"
        );

        // Pre-signed URLs carry their own authorization
        self.retry
            .run("upload_to_storage", || async {
                let request = self
                    .http
                    .put(url.clone())
                    .header(CONTENT_TYPE, content_type)
                    .body(bytes.clone());
                send(request, CallKind::Storage)
                    .await
                    .map_err(Error::into_upload)?;
                Ok(())
            })
            .await
    }
}
