//! End-to-end runs of the feed → view → surface pipeline through the public API.

use std::time::Duration;

use lib_feedview::{
    BoundedView, ChannelFeed, DisplaySurface, FileSurface, IngestionLoop, MemorySurface,
    PageRenderer, RawMessage, SubscriptionError,
};
use serde_json::json;
use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

fn publish(tx: &tokio::sync::mpsc::UnboundedSender<RawMessage>, body: &str) {
    tx.send(RawMessage::new("member-calls", body.as_bytes().to_vec()))
        .expect("feed receiver dropped");
}

#[tokio::test]
async fn single_message_renders_one_row_in_column_order() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let page_path = dir.path().join("feed.html");
    let memory = MemorySurface::new();
    let surface = (memory.clone(), Some(FileSurface::new(&page_path)));

    let mut ingestion = IngestionLoop::new(
        BoundedView::new(1000).unwrap(),
        PageRenderer::new("member-calls"),
        surface,
    );
    let (tx, feed) = ChannelFeed::new("member-calls");
    publish(&tx, r#"{"memberNumber":"42","callProbability":0.81,"intent":"buy"}"#);
    drop(tx);

    let result = ingestion.run(&feed, CancellationToken::new()).await;
    assert!(matches!(result, Err(SubscriptionError::FeedClosed { .. })));

    let rows = ingestion.view().snapshot();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].member_number, Some(json!("42")));
    assert_eq!(rows[0].call_probability, Some(json!(0.81)));
    assert_eq!(rows[0].raw_page_tags, None);
    assert_eq!(rows[0].intent, Some(json!("buy")));
    assert_eq!(rows[0].p_value, None);
    assert_eq!(rows[0].eva_dq, None);

    let page = memory.current().await;
    let on_disk = std::fs::read_to_string(&page_path).expect("page file missing");
    assert_eq!(page, on_disk);

    let header = page.find("<th>Member Number</th>").unwrap();
    let last_header = page.find("<th>EVA DQ</th>").unwrap();
    assert!(header < last_header);
    assert!(page.contains("<tr><td>42</td><td>0.81</td><td></td><td>buy</td><td></td><td></td></tr>"));

    let text = PageRenderer::new("member-calls").render_text(rows.iter());
    assert_eq!(text.lines().nth(1), Some("42 | 0.81 |  | buy |  | "));
}

#[tokio::test]
async fn mixed_spellings_and_garbage_share_one_table() {
    let memory = MemorySurface::new();
    let mut ingestion = IngestionLoop::new(
        BoundedView::new(3).unwrap(),
        PageRenderer::new("member-calls"),
        memory.clone(),
    );
    let (tx, feed) = ChannelFeed::new("member-calls");

    publish(&tx, r#"{"member_number":"A","call_probability":0}"#);
    publish(&tx, "not json{");
    publish(&tx, r#"{"memberNumber":"C","member_number":"ignored","EVA_DQ":"ok"}"#);
    publish(&tx, r#"{"memberNumber":"D","p_value":0.2,"raw_page_tags":["home","cart"]}"#);
    drop(tx);

    let _ = ingestion.run(&feed, CancellationToken::new()).await;

    let rows = ingestion.view().snapshot();
    assert_eq!(rows.len(), 3, "oldest record should have been evicted");
    assert!(rows[0].is_empty(), "malformed message should be a blank row");
    assert_eq!(rows[1].member_number, Some(json!("C")));
    assert_eq!(rows[1].eva_dq, Some(json!("ok")));
    assert_eq!(rows[2].raw_page_tags, Some(json!(["home", "cart"])));

    let summary = ingestion.summary();
    assert_eq!(summary.messages, 4);
    assert_eq!(summary.degraded, 1);
    assert_eq!(summary.evicted, 1);

    let page = memory.current().await;
    assert!(!page.contains("<td>A</td>"));
    assert!(page.contains("<td>[&quot;home&quot;,&quot;cart&quot;]</td>"));
}

#[tokio::test]
async fn rerendering_an_unchanged_view_is_stable() {
    let mut view = BoundedView::new(5).unwrap();
    view.append(lib_feedview::normalize(&lib_feedview::decode(&RawMessage::new(
        "member-calls",
        br#"{"intent":"browse"}"#.to_vec(),
    ))));

    let renderer = PageRenderer::new("member-calls");
    let memory = MemorySurface::new();
    let mut pages = Vec::new();
    for _ in 0..3 {
        view.render(&renderer, &memory).await.unwrap();
        pages.push(memory.current().await);
    }
    assert!(pages.windows(2).all(|w| w[0] == w[1]));

    // A direct replace is visible until the next render restores the projection.
    memory.replace("stale".to_string()).await.unwrap();
    view.render(&renderer, &memory).await.unwrap();
    assert_eq!(memory.current().await, pages[0]);
}

#[tokio::test]
async fn session_can_be_cancelled_from_outside() {
    let memory = MemorySurface::new();
    let ingestion = IngestionLoop::new(
        BoundedView::default(),
        PageRenderer::new("member-calls"),
        memory.clone(),
    )
    .with_render_interval(Duration::from_millis(20));
    let (tx, feed) = ChannelFeed::new("member-calls");
    let cancel = CancellationToken::new();

    let token = cancel.clone();
    let handle = tokio::spawn(async move {
        let mut ingestion = ingestion;
        ingestion.run(&feed, token).await
    });

    publish(&tx, r#"{"intent":"buy"}"#);
    tokio::time::timeout(Duration::from_secs(2), async {
        while memory.render_count() < 3 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("timer never re-rendered the page");

    cancel.cancel();
    let summary = handle.await.unwrap().expect("cancelled session should end cleanly");
    assert_eq!(summary.messages, 1);
}
