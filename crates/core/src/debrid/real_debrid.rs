//! Real-Debrid REST client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::{default_user_agent, DebridConfig};
use crate::metrics;

use super::{
    DebridAccount, DebridClient, DebridClientError, FileSelection, TorrentFile, TorrentInfo,
    TorrentStatus, UnrestrictedLink,
};

/// Real-Debrid client. Stateless apart from the shared HTTP client.
pub struct RealDebridClient {
    client: Client,
    base_url: String,
}

impl RealDebridClient {
    pub fn new(config: &DebridConfig) -> Result<Self, DebridClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(default_user_agent())
            .build()
            .map_err(|e| DebridClientError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send a request, recording metrics, and check the status code.
    async fn send(
        &self,
        operation: &str,
        request: RequestBuilder,
        expected: &[StatusCode],
    ) -> Result<Response, DebridClientError> {
        let start = Instant::now();
        let result = self.send_inner(request, expected).await;

        metrics::DEBRID_REQUEST_DURATION
            .with_label_values(&[operation])
            .observe(start.elapsed().as_secs_f64());
        metrics::DEBRID_REQUESTS
            .with_label_values(&[operation, if result.is_ok() { "success" } else { "error" }])
            .inc();

        result
    }

    async fn send_inner(
        &self,
        request: RequestBuilder,
        expected: &[StatusCode],
    ) -> Result<Response, DebridClientError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DebridClientError::Timeout
            } else {
                DebridClientError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        if expected.contains(&status) {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(200).collect();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DebridClientError::AuthenticationFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        Err(DebridClientError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DebridClientError> {
        response
            .json()
            .await
            .map_err(|e| DebridClientError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl DebridClient for RealDebridClient {
    fn name(&self) -> &str {
        "real_debrid"
    }

    async fn add_magnet(&self, token: &str, magnet: &str) -> Result<String, DebridClientError> {
        debug!("Adding magnet to Real-Debrid");
        let request = self
            .client
            .post(self.url("/torrents/addMagnet"))
            .bearer_auth(token)
            .form(&[("magnet", magnet)]);

        let response = self
            .send("add_magnet", request, &[StatusCode::CREATED])
            .await?;
        let added: AddMagnetResponse = Self::decode(response).await?;
        Ok(added.id)
    }

    async fn torrent_info(
        &self,
        token: &str,
        torrent_id: &str,
    ) -> Result<TorrentInfo, DebridClientError> {
        debug!(torrent_id = torrent_id, "Fetching Real-Debrid torrent info");
        let request = self
            .client
            .get(self.url(&format!(
                "/torrents/info/{}",
                urlencoding::encode(torrent_id)
            )))
            .bearer_auth(token);

        let response = self.send("torrent_info", request, &[StatusCode::OK]).await?;
        let info: RdTorrentInfo = Self::decode(response).await?;
        Ok(info.into())
    }

    async fn select_files(
        &self,
        token: &str,
        torrent_id: &str,
        selection: &FileSelection,
    ) -> Result<(), DebridClientError> {
        let files = selection.to_form_value();
        debug!(torrent_id = torrent_id, files = %files, "Selecting Real-Debrid files");
        let request = self
            .client
            .post(self.url(&format!(
                "/torrents/selectFiles/{}",
                urlencoding::encode(torrent_id)
            )))
            .bearer_auth(token)
            .form(&[("files", files.as_str())]);

        // 202 means the selection was already done.
        self.send(
            "select_files",
            request,
            &[StatusCode::NO_CONTENT, StatusCode::ACCEPTED],
        )
        .await?;
        Ok(())
    }

    async fn unrestrict_link(
        &self,
        token: &str,
        link: &str,
    ) -> Result<UnrestrictedLink, DebridClientError> {
        let request = self
            .client
            .post(self.url("/unrestrict/link"))
            .bearer_auth(token)
            .form(&[("link", link)]);

        let response = self
            .send("unrestrict_link", request, &[StatusCode::OK])
            .await?;
        let unrestricted: RdUnrestrictResponse = Self::decode(response).await?;
        Ok(UnrestrictedLink {
            id: unrestricted.id,
            filename: unrestricted.filename,
            download: unrestricted.download,
            filesize: unrestricted.filesize,
            mime_type: unrestricted.mime_type,
        })
    }

    async fn account(&self, token: &str) -> Result<DebridAccount, DebridClientError> {
        let request = self.client.get(self.url("/user")).bearer_auth(token);

        let response = self.send("account", request, &[StatusCode::OK]).await?;
        let user: RdUser = Self::decode(response).await?;
        Ok(DebridAccount {
            id: user.id,
            username: user.username,
            email: user.email,
            premium_days: user.premium / SECONDS_PER_DAY,
            account_type: user.account_type,
        })
    }
}

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

// Real-Debrid API response types
#[derive(Debug, Deserialize)]
struct AddMagnetResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RdTorrentInfo {
    id: String,
    #[serde(default)]
    filename: String,
    status: String,
    #[serde(default)]
    progress: f32,
    #[serde(default)]
    files: Vec<RdFile>,
    #[serde(default)]
    links: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RdFile {
    id: u32,
    path: String,
    bytes: u64,
    #[serde(default)]
    selected: u8,
}

impl From<RdTorrentInfo> for TorrentInfo {
    fn from(info: RdTorrentInfo) -> Self {
        TorrentInfo {
            id: info.id,
            filename: info.filename,
            status: TorrentStatus::from_service(&info.status),
            progress: info.progress,
            files: info
                .files
                .into_iter()
                .map(|f| TorrentFile {
                    id: f.id,
                    path: f.path,
                    size_bytes: f.bytes,
                    selected: f.selected != 0,
                })
                .collect(),
            links: info.links,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RdUnrestrictResponse {
    id: String,
    #[serde(default)]
    filename: String,
    download: String,
    #[serde(default)]
    filesize: u64,
    #[serde(default)]
    mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RdUser {
    id: u64,
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    premium: u64,
    #[serde(rename = "type", default)]
    account_type: String,
}
