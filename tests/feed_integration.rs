//! Integration tests against the public kline feed.
//!
//! All tests are `#[ignore]` because they require network access. Base URLs
//! can be overridden through `TICKLINE_API_URL` / `TICKLINE_WS_URL` (a `.env`
//! file is honored).
//!
//! Run with:
//! ```bash
//! cargo test --features native --test feed_integration -- --ignored
//! ```

use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::timeout;

use tickline::prelude::*;

const TEST_TIMEOUT: Duration = Duration::from_secs(30);

fn client(window: usize) -> TicklineClient {
    dotenvy::dotenv().ok();
    let mut builder = TicklineClient::builder().window_size(window);
    if let Ok(url) = std::env::var("TICKLINE_API_URL") {
        builder = builder.api_url(&url);
    }
    if let Ok(url) = std::env::var("TICKLINE_WS_URL") {
        builder = builder.ws_url(&url);
    }
    builder.build().expect("client should build")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[tokio::test]
#[ignore]
async fn fetch_kline_snapshot() {
    let client = client(20);
    let points = tokio_test::assert_ok!(client.price_history().klines(20).await);

    assert_eq!(points.len(), 20);
    assert!(points.windows(2).all(|w| w[0].time < w[1].time));
    assert!(points.iter().all(|p| p.price > 0.0));
}

#[tokio::test]
#[ignore]
async fn bootstrap_loader_matches_snapshot_shape() {
    let client = client(5);
    let points = tokio_test::assert_ok!(client.price_history().bootstrap_loader(5).await);
    assert_eq!(points.len(), 5);
}

#[tokio::test]
#[ignore]
async fn raw_feed_messages_parse() {
    let client = client(10);
    let mut ws = client.ws_native();
    ws.connect().await.unwrap();

    let formatter = KlineFormatter::new();
    let parsed = {
        let events = ws.events();
        tokio::pin!(events);
        timeout(TEST_TIMEOUT, async {
            while let Some(event) = events.next().await {
                if let WsEvent::Message(raw) = event {
                    return formatter.parse(&raw);
                }
            }
            panic!("event stream ended");
        })
        .await
        .expect("timed out waiting for a kline")
    };

    let point = tokio_test::assert_ok!(parsed);
    assert!(point.price > 0.0);

    ws.disconnect().await;
}

#[tokio::test]
#[ignore]
async fn live_stream_becomes_ready() {
    let client = client(10);
    let mut stream = client.stream(KlineFormatter::new());

    let mut rx = stream.subscribe();
    let snapshot = timeout(TEST_TIMEOUT, rx.wait_for(|s| s.state.is_ready()))
        .await
        .expect("timed out waiting for a full, trusted window")
        .expect("stream task ended")
        .clone();

    assert_eq!(snapshot.points().len(), 10);
    assert!(snapshot.status().is_none());

    let mut renderer = ChartRenderer::new();
    let scene = renderer
        .render(
            snapshot.points(),
            Viewport::new(350.0, 120.0),
            &ChartStyle::default(),
            DEFAULT_CADENCE,
        )
        .expect("a full window renders");
    let svg = to_svg(&scene.final_frame());
    assert!(svg.contains("<path"));

    stream.close().await;
}
