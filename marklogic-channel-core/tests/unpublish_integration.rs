use marklogic_channel_core::contract::{ChannelType, DocumentRef, MockContentService};
use marklogic_channel_core::error::ChannelError;
use marklogic_channel_core::helper::{PlaintextDecryptor, PublishingHelper};
use marklogic_channel_core::properties::{
    ChannelProperties, PROP_HOST, PROP_PASSWORD, PROP_PORT, PROP_USERNAME,
};
use marklogic_channel_core::MarkLogicChannel;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOC_ID: &str = "workspace://SpacesStore/abc-123";

fn channel_properties(server: &MockServer) -> ChannelProperties {
    ChannelProperties::new()
        .with(PROP_HOST, "127.0.0.1")
        .with(PROP_PORT, server.address().port())
        .with(PROP_USERNAME, "admin")
        .with(PROP_PASSWORD, "admin-pass")
}

/// Unpublish never reads content, so the content service has no expectations at all.
fn channel() -> MarkLogicChannel {
    let mut content = MockContentService::new();
    content.expect_reader().never();
    MarkLogicChannel::new(
        PublishingHelper::new(Arc::new(PlaintextDecryptor)),
        Arc::new(content),
    )
}

#[tokio::test]
async fn unpublish_deletes_and_succeeds_on_200() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/store"))
        .and(query_param("uri", DOC_ID))
        .and(basic_auth("admin", "admin-pass"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    channel()
        .unpublish(&DocumentRef::new(DOC_ID), &channel_properties(&server))
        .await
        .expect("unpublish should succeed on 200");

    let received = server.received_requests().await.unwrap_or_default();
    assert_eq!(received.len(), 1);
    assert!(received[0].body.is_empty(), "DELETE carries no payload");
}

#[tokio::test]
async fn unpublish_fails_with_reason_phrase_on_404() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let err = channel()
        .unpublish(&DocumentRef::new(DOC_ID), &channel_properties(&server))
        .await
        .unwrap_err();

    assert!(matches!(err, ChannelError::UnexpectedStatus { status: 404, .. }));
    assert_eq!(err.to_string(), "Not Found");
}

#[tokio::test]
async fn unpublish_treats_204_as_failure() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let err = channel()
        .unpublish(&DocumentRef::new(DOC_ID), &channel_properties(&server))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "No Content");
}

#[tokio::test]
async fn unpublish_rejects_malformed_port_without_sending() {
    let props = ChannelProperties::new()
        .with(PROP_HOST, "127.0.0.1")
        .with(PROP_PORT, "not-a-port")
        .with(PROP_USERNAME, "admin")
        .with(PROP_PASSWORD, "admin-pass");

    let err = channel()
        .unpublish(&DocumentRef::new(DOC_ID), &props)
        .await
        .unwrap_err();

    assert!(matches!(err, ChannelError::InvalidUri(_)), "got {err:?}");
}

#[tokio::test]
async fn unpublish_requires_credentials() {
    let server = MockServer::start().await;
    let props = ChannelProperties::new()
        .with(PROP_HOST, "127.0.0.1")
        .with(PROP_PORT, server.address().port());

    let err = channel()
        .unpublish(&DocumentRef::new(DOC_ID), &props)
        .await
        .unwrap_err();

    assert!(matches!(err, ChannelError::MissingProperty(PROP_USERNAME)));
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

/// Answers one request with `status_line` and closes the connection. Returns the port.
async fn serve_raw_status(status_line: &'static str) -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response =
            format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });
    port
}

#[tokio::test]
async fn unpublish_reports_the_servers_own_reason_phrase() {
    let port = serve_raw_status("HTTP/1.1 404 XDMP-DOCNOTFOUND").await;
    let props = ChannelProperties::new()
        .with(PROP_HOST, "127.0.0.1")
        .with(PROP_PORT, port)
        .with(PROP_USERNAME, "admin")
        .with(PROP_PASSWORD, "admin-pass");

    let err = channel()
        .unpublish(&DocumentRef::new(DOC_ID), &props)
        .await
        .unwrap_err();

    assert!(matches!(err, ChannelError::UnexpectedStatus { status: 404, .. }), "got {err:?}");
    assert_eq!(err.to_string(), "XDMP-DOCNOTFOUND");
}

#[tokio::test]
async fn unpublish_rejects_host_that_would_rewrite_the_uri() {
    let server = MockServer::start().await;
    let props = ChannelProperties::new()
        .with(PROP_HOST, "127.0.0.1/evil?uri=other")
        .with(PROP_PORT, server.address().port())
        .with(PROP_USERNAME, "admin")
        .with(PROP_PASSWORD, "admin-pass");

    let err = channel()
        .unpublish(&DocumentRef::new(DOC_ID), &props)
        .await
        .unwrap_err();

    assert!(matches!(err, ChannelError::InvalidUri(_)), "got {err:?}");
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}
