//! Debrid resolver integration tests.
//!
//! These tests drive the full resolve protocol against the mock debrid
//! client: add -> info -> select -> re-info -> unrestrict.

use std::sync::Arc;
use std::time::Duration;

use debridge_core::{
    debrid::{
        DebridClientError, DebridError, DebridResolver, FileSelection, ResolutionOutcome,
        ResolveRequest, ResolverOptions, TorrentStatus,
    },
    testing::{fixtures, MockCall, MockDebridClient},
};

fn resolve_request(season: u32, episode: u32, file_index: Option<u32>) -> ResolveRequest {
    ResolveRequest {
        magnet: "magnet:?xt=urn:btih:0123456789ABCDEF&dn=Release".to_string(),
        season,
        episode,
        file_index,
    }
}

fn resolver(client: &Arc<MockDebridClient>) -> DebridResolver {
    DebridResolver::new(client.clone(), ResolverOptions::default())
}

#[tokio::test]
async fn test_movie_cached_picks_largest_file() {
    let client = Arc::new(MockDebridClient::new());
    client
        .push_info(fixtures::torrent_info(
            TorrentStatus::Downloaded,
            fixtures::movie_files("Matrix"),
            vec!["https://hoster.mock/matrix"],
        ))
        .await;

    let outcome = resolver(&client)
        .resolve("token", &resolve_request(0, 0, None))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ResolutionOutcome::Cached {
            url: "https://download.mock/matrix.mkv".to_string(),
            torrent_id: "T1".to_string(),
            file_index: 1,
        }
    );

    // Already downloaded: no selection needed.
    let calls = client.calls().await;
    assert!(!calls
        .iter()
        .any(|c| matches!(c, MockCall::SelectFiles { .. })));
}

#[tokio::test]
async fn test_season_pack_with_file_index_round_trips() {
    let client = Arc::new(MockDebridClient::new());
    let files = fixtures::season_pack("Show", 2, 8);
    client
        .push_info(fixtures::torrent_info(
            TorrentStatus::WaitingFileSelection,
            files.clone(),
            vec![],
        ))
        .await;
    client
        .push_info(fixtures::torrent_info(
            TorrentStatus::Downloaded,
            files,
            vec!["https://hoster.mock/e05"],
        ))
        .await;

    let outcome = resolver(&client)
        .resolve("token", &resolve_request(2, 5, Some(4)))
        .await
        .unwrap();

    match outcome {
        ResolutionOutcome::Cached { file_index, .. } => assert_eq!(file_index, 4),
        other => panic!("expected cached, got {:?}", other),
    }

    let calls = client.calls().await;
    assert_eq!(
        calls[2],
        MockCall::SelectFiles {
            torrent_id: "T1".to_string(),
            selection: FileSelection::Ids(vec![5]),
        }
    );
}

#[tokio::test]
async fn test_token_is_forwarded() {
    let client = Arc::new(MockDebridClient::new());
    resolver(&client)
        .resolve("user-secret", &resolve_request(1, 1, None))
        .await
        .unwrap();

    let calls = client.calls().await;
    match &calls[0] {
        MockCall::AddMagnet { token, magnet } => {
            assert_eq!(token, "user-secret");
            assert!(magnet.starts_with("magnet:?xt=urn:btih:"));
        }
        other => panic!("expected add magnet first, got {:?}", other),
    }
}

#[tokio::test]
async fn test_info_failure_is_fatal() {
    let client = Arc::new(MockDebridClient::new());
    client.push_info_error(DebridClientError::Timeout).await;

    let err = resolver(&client)
        .resolve("token", &resolve_request(0, 0, None))
        .await
        .unwrap_err();
    assert!(matches!(err, DebridError::InfoFetchFailed(_)));
}

#[tokio::test]
async fn test_selection_failure_is_fatal() {
    let client = Arc::new(MockDebridClient::new());
    client
        .push_info(fixtures::torrent_info(
            TorrentStatus::WaitingFileSelection,
            fixtures::season_pack("Show", 1, 3),
            vec![],
        ))
        .await;
    client
        .fail_select(DebridClientError::UnexpectedStatus {
            status: 400,
            body: "bad files".to_string(),
        })
        .await;

    let err = resolver(&client)
        .resolve("token", &resolve_request(1, 2, None))
        .await
        .unwrap_err();
    assert!(matches!(err, DebridError::SelectionFailed(_)));
}

#[tokio::test]
async fn test_refetch_failure_is_fatal() {
    let client = Arc::new(MockDebridClient::new());
    client
        .push_info(fixtures::torrent_info(
            TorrentStatus::WaitingFileSelection,
            fixtures::season_pack("Show", 1, 3),
            vec![],
        ))
        .await;
    client
        .push_info_error(DebridClientError::ConnectionFailed("reset".to_string()))
        .await;

    let err = resolver(&client)
        .resolve("token", &resolve_request(1, 2, None))
        .await
        .unwrap_err();
    assert!(matches!(err, DebridError::InfoFetchFailed(_)));
}

#[tokio::test]
async fn test_downloaded_without_links_is_pending() {
    let client = Arc::new(MockDebridClient::new());
    client
        .push_info(fixtures::torrent_info(
            TorrentStatus::Downloaded,
            fixtures::season_pack("Show", 1, 3),
            vec![],
        ))
        .await;

    let outcome = resolver(&client)
        .resolve("token", &resolve_request(1, 3, None))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ResolutionOutcome::Pending {
            message: "Episode S01E03 added to cloud.".to_string(),
            torrent_id: "T1".to_string(),
        }
    );
}

#[tokio::test]
async fn test_episode_not_in_pack() {
    let client = Arc::new(MockDebridClient::new());
    client
        .push_info(fixtures::torrent_info(
            TorrentStatus::Downloaded,
            fixtures::season_pack("Show", 1, 3),
            vec!["l"],
        ))
        .await;

    let err = resolver(&client)
        .resolve("token", &resolve_request(1, 9, None))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DebridError::FileNotFound("episode S01E09 not found in torrent".to_string())
    );
}

#[tokio::test]
async fn test_concurrent_identical_resolves_submit_once() {
    let client = Arc::new(MockDebridClient::new().with_delay(Duration::from_millis(100)));
    let resolver = resolver(&client);
    let request = resolve_request(1, 1, None);

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let resolver = resolver.clone();
            let request = request.clone();
            tokio::spawn(async move { resolver.resolve("token", &request).await })
        })
        .collect();

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, ResolutionOutcome::Cached { .. }));
    }

    assert_eq!(client.add_magnet_count().await, 1);
}

#[tokio::test]
async fn test_magnet_case_does_not_split_flights() {
    let client = Arc::new(MockDebridClient::new().with_delay(Duration::from_millis(100)));
    let resolver = resolver(&client);

    let upper = resolve_request(1, 1, None);
    let mut lower = upper.clone();
    lower.magnet = lower.magnet.to_lowercase();

    let (a, b) = tokio::join!(
        resolver.resolve("token", &upper),
        resolver.resolve("token", &lower)
    );
    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(client.add_magnet_count().await, 1);
}
