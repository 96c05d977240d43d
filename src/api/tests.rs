use super::*;
use crate::downloader::test_helpers::{FakeFetcher, create_test_downloader};

#[test]
fn test_request_wire_format() {
    let request: Request =
        serde_json::from_str(r#"{"method":"download_video","params":{"url":"https://a/b"}}"#)
            .unwrap();
    assert_eq!(
        request,
        Request::DownloadVideo {
            url: "https://a/b".to_string()
        }
    );

    let list: Request = serde_json::from_str(r#"{"method":"list_catalog"}"#).unwrap();
    assert_eq!(list, Request::ListCatalog);
}

#[tokio::test]
async fn test_dispatch_download_audio_then_list() {
    let (downloader, _fetcher, _temp_dir) =
        create_test_downloader(FakeFetcher::new("Tune", 64 * 1024)).await;

    let reply = downloader
        .dispatch(Request::DownloadAudio {
            url: "https://example.com/t".to_string(),
        })
        .await
        .unwrap();
    let Reply::Download(done) = reply else {
        panic!("unexpected reply: {reply:?}");
    };
    assert_eq!(done.kind, MediaKind::Audio);

    let reply = downloader.dispatch(Request::ListCatalog).await.unwrap();
    assert_eq!(
        reply,
        Reply::Catalog(Catalog {
            videos: vec![],
            musics: vec![done.record],
        })
    );
}

#[tokio::test]
async fn test_dispatch_error_matches_progress_event() {
    let mut fake = FakeFetcher::new("Private", 200 * 1024);
    fake.fail_with = Some("This video is private or has been deleted".to_string());
    let (downloader, _fetcher, _temp_dir) = create_test_downloader(fake).await;
    let mut events = downloader.subscribe();

    let err = downloader
        .dispatch(Request::DownloadVideo {
            url: "https://example.com/p".to_string(),
        })
        .await
        .unwrap_err();

    let mut last = None;
    while let Ok(event) = events.try_recv() {
        last = Some(event);
    }
    assert_eq!(err.error.code, "fetch_failed");
    assert_eq!(last.unwrap().error, Some(err.error.message));
}

#[tokio::test]
async fn test_dispatch_json_envelopes() {
    let (downloader, _fetcher, _temp_dir) =
        create_test_downloader(FakeFetcher::new("Meta", 1)).await;

    let ok: serde_json::Value = serde_json::from_str(
        &downloader
            .dispatch_json(r#"{"method":"get_metadata","params":{"url":"https://e/m"}}"#)
            .await,
    )
    .unwrap();
    assert_eq!(ok["ok"]["type"], "metadata");
    assert_eq!(ok["ok"]["data"]["title"], "Meta");

    let bad: serde_json::Value =
        serde_json::from_str(&downloader.dispatch_json(r#"{"method":"explode"}"#).await).unwrap();
    assert_eq!(bad["err"]["error"]["code"], "validation_error");

    let empty: serde_json::Value = serde_json::from_str(
        &downloader
            .dispatch_json(r#"{"method":"get_metadata","params":{"url":""}}"#)
            .await,
    )
    .unwrap();
    assert_eq!(empty["err"]["error"]["code"], "invalid_url");
}
