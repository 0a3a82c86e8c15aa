#![cfg(feature = "listener")]

use std::time::Duration;

use futures::SinkExt;
use selector_inspector::listener::{ListenerConfig, LocatorListener};
use selector_inspector::Locator;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;

#[tokio::test]
async fn test_listener_forwards_locators_and_skips_garbage() {
    let listener = LocatorListener::bind(&ListenerConfig::new("127.0.0.1", 0))
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().unwrap();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(listener.serve(tx, async {
        let _ = stop_rx.await;
    }));

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{}/", addr))
        .await
        .expect("Failed to connect");

    let picked = Locator::new("div#x > p:nth-of-type(2)", r#"//div[@id="x"]/p[2]"#);
    ws.send(Message::Text("not a locator".into())).await.unwrap();
    ws.send(Message::Text(r#"{"css":"p"}"#.into())).await.unwrap();
    ws.send(Message::Text(picked.to_json().unwrap().into())).await.unwrap();

    let received = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("Timed out waiting for locator")
        .expect("Channel closed");
    assert_eq!(received, picked);

    let _ = ws.close(None).await;
    stop_tx.send(()).unwrap();

    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("Listener did not shut down")
        .unwrap()
        .unwrap();

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_bind_conflict_is_reported() {
    let first = LocatorListener::bind(&ListenerConfig::new("127.0.0.1", 0)).await.unwrap();
    let port = first.local_addr().unwrap().port();

    let second = LocatorListener::bind(&ListenerConfig::new("127.0.0.1", port)).await;
    assert!(second.is_err());
}
