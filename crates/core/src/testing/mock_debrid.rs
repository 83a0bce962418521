//! Mock debrid client for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::debrid::{
    DebridAccount, DebridClient, DebridClientError, FileSelection, TorrentFile, TorrentInfo,
    TorrentStatus, UnrestrictedLink,
};

/// A recorded client call for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    AddMagnet { token: String, magnet: String },
    TorrentInfo { torrent_id: String },
    SelectFiles { torrent_id: String, selection: FileSelection },
    UnrestrictLink { link: String },
    Account,
}

/// One-shot failures, consumed by the next call of the matching operation.
#[derive(Debug, Default)]
struct Failures {
    add: Option<DebridClientError>,
    select: Option<DebridClientError>,
    unrestrict: Option<DebridClientError>,
    account: Option<DebridClientError>,
}

/// Mock implementation of the DebridClient trait.
///
/// Provides controllable behavior for testing:
/// - Script the sequence of `torrent_info` responses and failures
/// - Track every call for assertions
/// - Simulate per-operation failures and slow responses
///
/// When the info queue is empty, `torrent_info` reports a downloaded torrent
/// with one episode file and one link.
///
/// # Example
///
/// ```rust,ignore
/// let client = Arc::new(MockDebridClient::new());
/// client.push_info(fixtures::torrent_info(TorrentStatus::WaitingFileSelection, files, vec![])).await;
/// client.push_info(fixtures::torrent_info(TorrentStatus::Downloaded, files, vec!["https://hoster/x"])).await;
///
/// let resolver = DebridResolver::new(client.clone(), ResolverOptions::default());
/// resolver.resolve("token", &request).await?;
///
/// assert_eq!(client.add_magnet_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockDebridClient {
    torrent_id: String,
    calls: Arc<RwLock<Vec<MockCall>>>,
    infos: Arc<RwLock<VecDeque<Result<TorrentInfo, DebridClientError>>>>,
    failures: Arc<RwLock<Failures>>,
    account: Arc<RwLock<DebridAccount>>,
    delay: Option<Duration>,
}

impl Default for MockDebridClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDebridClient {
    pub fn new() -> Self {
        Self {
            torrent_id: "T1".to_string(),
            calls: Arc::new(RwLock::new(Vec::new())),
            infos: Arc::new(RwLock::new(VecDeque::new())),
            failures: Arc::new(RwLock::new(Failures::default())),
            account: Arc::new(RwLock::new(DebridAccount {
                id: 1,
                username: "mock-user".to_string(),
                email: "mock@example.com".to_string(),
                premium_days: 30,
                account_type: "premium".to_string(),
            })),
            delay: None,
        }
    }

    /// Sleep inside `add_magnet`, keeping a resolve in flight.
    pub fn with_delay(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    /// Queue a `torrent_info` response.
    pub async fn push_info(&self, info: TorrentInfo) {
        self.infos.write().await.push_back(Ok(info));
    }

    /// Queue a `torrent_info` failure.
    pub async fn push_info_error(&self, error: DebridClientError) {
        self.infos.write().await.push_back(Err(error));
    }

    pub async fn set_account(&self, account: DebridAccount) {
        *self.account.write().await = account;
    }

    pub async fn fail_add(&self, error: DebridClientError) {
        self.failures.write().await.add = Some(error);
    }

    pub async fn fail_select(&self, error: DebridClientError) {
        self.failures.write().await.select = Some(error);
    }

    pub async fn fail_unrestrict(&self, error: DebridClientError) {
        self.failures.write().await.unrestrict = Some(error);
    }

    pub async fn fail_account(&self, error: DebridClientError) {
        self.failures.write().await.account = Some(error);
    }

    /// All recorded calls, in order.
    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.read().await.clone()
    }

    pub async fn add_magnet_count(&self) -> usize {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| matches!(c, MockCall::AddMagnet { .. }))
            .count()
    }

    async fn record(&self, call: MockCall) {
        self.calls.write().await.push(call);
    }

    fn default_info(&self) -> TorrentInfo {
        TorrentInfo {
            id: self.torrent_id.clone(),
            filename: "Mock.Release.1080p".to_string(),
            status: TorrentStatus::Downloaded,
            progress: 100.0,
            files: vec![TorrentFile {
                id: 1,
                path: "/Mock.Release.S01E01.1080p.mkv".to_string(),
                size_bytes: 1024 * 1024 * 700,
                selected: true,
            }],
            links: vec!["https://hoster.mock/default".to_string()],
        }
    }
}

#[async_trait]
impl DebridClient for MockDebridClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn add_magnet(&self, token: &str, magnet: &str) -> Result<String, DebridClientError> {
        self.record(MockCall::AddMagnet {
            token: token.to_string(),
            magnet: magnet.to_string(),
        })
        .await;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(error) = self.failures.write().await.add.take() {
            return Err(error);
        }
        Ok(self.torrent_id.clone())
    }

    async fn torrent_info(
        &self,
        _token: &str,
        torrent_id: &str,
    ) -> Result<TorrentInfo, DebridClientError> {
        self.record(MockCall::TorrentInfo {
            torrent_id: torrent_id.to_string(),
        })
        .await;

        let queued = self.infos.write().await.pop_front();
        queued.unwrap_or_else(|| Ok(self.default_info()))
    }

    async fn select_files(
        &self,
        _token: &str,
        torrent_id: &str,
        selection: &FileSelection,
    ) -> Result<(), DebridClientError> {
        self.record(MockCall::SelectFiles {
            torrent_id: torrent_id.to_string(),
            selection: selection.clone(),
        })
        .await;

        if let Some(error) = self.failures.write().await.select.take() {
            return Err(error);
        }
        Ok(())
    }

    async fn unrestrict_link(
        &self,
        _token: &str,
        link: &str,
    ) -> Result<UnrestrictedLink, DebridClientError> {
        self.record(MockCall::UnrestrictLink {
            link: link.to_string(),
        })
        .await;

        if let Some(error) = self.failures.write().await.unrestrict.take() {
            return Err(error);
        }

        let name = link.rsplit('/').next().unwrap_or_default();
        Ok(UnrestrictedLink {
            id: format!("U-{}", name),
            filename: format!("{}.mkv", name),
            download: format!("https://download.mock/{}.mkv", name),
            filesize: 1024,
            mime_type: Some("video/x-matroska".to_string()),
        })
    }

    async fn account(&self, _token: &str) -> Result<DebridAccount, DebridClientError> {
        self.record(MockCall::Account).await;

        if let Some(error) = self.failures.write().await.account.take() {
            return Err(error);
        }
        Ok(self.account.read().await.clone())
    }
}
