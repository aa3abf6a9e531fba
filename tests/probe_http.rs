use std::time::Duration;

use collectibles::config::{ResolverConfig, DEFAULT_PLACEHOLDER_IMAGE};
use collectibles::probe::{ContentProbe, HttpProber, MimeCategory, ProbeError, ProbeMode};
use collectibles::records::OpenSeaAsset;
use collectibles::types::MediaType;
use collectibles::Collectibles;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prober() -> HttpProber {
    HttpProber::new(&ResolverConfig::default()).unwrap()
}

fn typed(ct: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).insert_header("content-type", ct)
}

#[tokio::test]
async fn head_reads_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/anim"))
        .respond_with(typed("IMAGE/GIF"))
        .expect(1)
        .mount(&server)
        .await;

    let report = prober().probe(&format!("{}/anim", server.uri()), ProbeMode::Head).await.unwrap();
    assert_eq!(report.status, 200);
    assert_eq!(report.category, MimeCategory::Gif);
    assert_eq!(report.content_type.as_deref(), Some("IMAGE/GIF"));
}

#[tokio::test]
async fn ranged_get_sends_range_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/clip"))
        .and(header("range", "bytes=0-100"))
        .respond_with(ResponseTemplate::new(206).insert_header("content-type", "video/mp4").set_body_bytes(vec![0u8; 101]))
        .expect(1)
        .mount(&server)
        .await;

    let report = prober().probe(&format!("{}/clip", server.uri()), ProbeMode::RangedGet).await.unwrap();
    assert_eq!(report.status, 206);
    assert_eq!(report.category, MimeCategory::Video);
}

#[tokio::test]
async fn webp_body_is_scanned_for_animation() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD")).respond_with(typed("image/webp")).mount(&server).await;

    let mut animated = b"RIFF\x20\x00\x00\x00WEBPVP8X".to_vec();
    animated.extend_from_slice(b"ANIM\x06\x00\x00\x00ANMF\x10\x00");
    Mock::given(method("GET"))
        .and(path("/animated.webp"))
        .respond_with(typed("image/webp").set_body_bytes(animated))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/still.webp"))
        .respond_with(typed("image/webp").set_body_bytes(b"RIFF\x20\x00\x00\x00WEBPVP8 ".to_vec()))
        .mount(&server)
        .await;

    let p = prober();
    let report = p.probe(&format!("{}/animated.webp", server.uri()), ProbeMode::Head).await.unwrap();
    assert!(report.is_animated_webp());
    assert_eq!(report.category.media_type(), Some(MediaType::AnimatedWebp));

    let report = p.probe(&format!("{}/still.webp", server.uri()), ProbeMode::Head).await.unwrap();
    assert_eq!(report.category, MimeCategory::Webp { animated: false });
    assert_eq!(report.category.media_type(), Some(MediaType::Image));
}

#[tokio::test]
async fn status_at_or_above_300_fails() {
    let server = MockServer::start().await;
    Mock::given(path("/gone")).respond_with(ResponseTemplate::new(404)).mount(&server).await;
    Mock::given(path("/cached")).respond_with(ResponseTemplate::new(304)).mount(&server).await;

    let p = prober();
    let err = p.probe(&format!("{}/gone", server.uri()), ProbeMode::Head).await.unwrap_err();
    assert_eq!(err, ProbeError::Status(404));
    let err = p.probe(&format!("{}/cached", server.uri()), ProbeMode::RangedGet).await.unwrap_err();
    assert_eq!(err, ProbeError::Status(304));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(typed("image/png").set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let p = prober().with_timeout(Duration::from_millis(50));
    assert_eq!(p.timeout(), Duration::from_millis(50));
    let err = p.probe(&format!("{}/slow.png", server.uri()), ProbeMode::Head).await.unwrap_err();
    assert_eq!(err, ProbeError::Timeout(p.timeout()));
}

#[tokio::test]
async fn fetch_json_reads_documents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/meta.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "Degen #1" })))
        .mount(&server)
        .await;

    let p = prober();
    let doc = p.fetch_json(&format!("{}/meta.json", server.uri())).await.unwrap();
    assert_eq!(doc["name"], "Degen #1");
    assert!(p.fetch_json(&format!("{}/missing.json", server.uri())).await.is_err());
}

fn video_asset(base: &str) -> OpenSeaAsset {
    OpenSeaAsset {
        token_id: Some("7".into()),
        name: Some("Clip".into()),
        image_url: Some(format!("{base}/poster.png")),
        animation_url: Some(format!("{base}/clip.mp4")),
        ..Default::default()
    }
}

#[tokio::test]
async fn timed_out_frame_probe_degrades_to_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/poster.png"))
        .respond_with(typed("image/png").set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let cfg = ResolverConfig { probe_timeout_ms: 50, ..Default::default() };
    let resolver = Collectibles::new(cfg).unwrap();
    let c = resolver.resolve_ethereum(&video_asset(&server.uri())).await;
    assert_eq!(c.media_type, MediaType::Image);
    assert_eq!(c.image_url.as_deref(), Some(DEFAULT_PLACEHOLDER_IMAGE));
    assert_eq!(c.frame_url.as_deref(), Some(DEFAULT_PLACEHOLDER_IMAGE));
}

#[tokio::test]
async fn animated_poster_is_dropped_from_video() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/poster.png"))
        .respond_with(typed("image/gif"))
        .mount(&server)
        .await;

    let resolver = Collectibles::new(ResolverConfig::default()).unwrap();
    let asset = video_asset(&server.uri());
    let c = resolver.resolve_ethereum(&asset).await;
    assert_eq!(c.media_type, MediaType::Video);
    assert_eq!(c.video_url.as_deref(), Some(format!("{}/clip.mp4", server.uri()).as_str()));
    assert!(c.frame_url.is_none());
    assert_eq!(c, resolver.resolve_ethereum(&asset).await);
}
