use std::sync::Arc;

use caption_core::api::{CAPTIONS_PATH, PRESIGN_PATH, REGISTER_PATH};
use caption_core::{
    CaptionPipeline, CaptionRecord, HttpCaptionApi, PipelineError, RunState, StaticToken,
    UploadCandidate,
};
use serde_json::json;
use wiremock::matchers::{body_bytes, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "session-token-1";
const IMAGE_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A];

fn pipeline(server: &MockServer) -> CaptionPipeline {
    CaptionPipeline::new(
        Arc::new(HttpCaptionApi::new(&server.uri())),
        Arc::new(StaticToken::new(TOKEN)),
    )
}

fn png() -> UploadCandidate {
    UploadCandidate::new("dog.png", "image/png", IMAGE_BYTES.to_vec())
}

async fn mount_presign(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(PRESIGN_PATH))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"contentType": "image/png"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "presignedUrl": format!("{}/bucket/obj.png?X-Sig=abc", server.uri()),
            "cdnUrl": "https://cdn.example.com/obj.png",
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_upload(server: &MockServer, status: u16) {
    Mock::given(method("PUT"))
        .and(path("/bucket/obj.png"))
        .and(header("content-type", "image/png"))
        .and(body_bytes(IMAGE_BYTES.to_vec()))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_register(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(body_json(json!({
            "imageUrl": "https://cdn.example.com/obj.png",
            "isCommonUse": false,
        })))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_captions(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(CAPTIONS_PATH))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(body_json(json!({"imageId": "img-7"})))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

fn registered() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"imageId": "img-7"}))
}

#[tokio::test]
async fn full_run_sends_expected_requests() {
    let server = MockServer::start().await;
    mount_presign(&server).await;
    mount_upload(&server, 200).await;
    mount_register(&server, registered()).await;
    mount_captions(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({"captions": [{"caption": "a dog"}]})),
    )
    .await;

    let pipeline = pipeline(&server);
    let captions = pipeline.run(&png()).await.unwrap();

    assert_eq!(captions.len(), 1);
    assert_eq!(captions[0].display_text(), "a dog");
    assert_eq!(pipeline.snapshot().image_id.as_deref(), Some("img-7"));

    // The presigned upload must not carry the session token.
    let requests = server.received_requests().await.unwrap();
    let put = requests
        .iter()
        .find(|r| r.method.as_str() == "PUT")
        .unwrap();
    assert!(!put.headers.contains_key("authorization"));
}

#[tokio::test]
async fn bare_list_captions_fall_back_to_json_text() {
    let server = MockServer::start().await;
    mount_presign(&server).await;
    mount_upload(&server, 200).await;
    mount_register(&server, registered()).await;
    mount_captions(
        &server,
        ResponseTemplate::new(200).set_body_json(json!([{"text": "a cat"}, {"unrelated": 1}])),
    )
    .await;

    let texts: Vec<String> = pipeline(&server)
        .run(&png())
        .await
        .unwrap()
        .iter()
        .map(CaptionRecord::display_text)
        .collect();
    assert_eq!(texts, vec!["a cat", r#"{"unrelated":1}"#]);
}

#[tokio::test]
async fn presign_without_cdn_url_skips_remaining_steps() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(PRESIGN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"presignedUrl": format!("{}/bucket/x", server.uri())})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .respond_with(registered())
        .expect(0)
        .mount(&server)
        .await;

    let err = pipeline(&server).run(&png()).await.unwrap_err();
    assert!(matches!(err, PipelineError::PresignFailed { status: 200, .. }));
}

#[tokio::test]
async fn caption_server_error_keeps_image_id() {
    let server = MockServer::start().await;
    mount_presign(&server).await;
    mount_upload(&server, 200).await;
    mount_register(&server, registered()).await;
    mount_captions(
        &server,
        ResponseTemplate::new(500).set_body_json(json!({"error": "model overloaded"})),
    )
    .await;

    let pipeline = pipeline(&server);
    let err = pipeline.run(&png()).await.unwrap_err();
    assert!(matches!(err, PipelineError::CaptionFailed { status: 500, .. }));

    let snapshot = pipeline.snapshot();
    assert_eq!(snapshot.image_id.as_deref(), Some("img-7"));
    match snapshot.state {
        RunState::Failed(message) => {
            assert!(message.starts_with("Step 4 (caption) failed: HTTP 500"));
            assert!(message.contains("model overloaded"));
        }
        other => panic!("expected failed state, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_reported_verbatim() {
    let server = MockServer::start().await;
    mount_presign(&server).await;
    mount_upload(&server, 200).await;
    mount_register(
        &server,
        ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"),
    )
    .await;

    let err = pipeline(&server).run(&png()).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Step 3 (register) failed: HTTP 502: <html>Bad Gateway</html>"
    );
}

#[tokio::test]
async fn rejected_upload_stops_before_registration() {
    let server = MockServer::start().await;
    mount_presign(&server).await;
    mount_upload(&server, 403).await;
    Mock::given(method("POST"))
        .and(path(REGISTER_PATH))
        .respond_with(registered())
        .expect(0)
        .mount(&server)
        .await;

    let err = pipeline(&server).run(&png()).await.unwrap_err();
    assert_eq!(err.status_code(), Some(403));
    assert_eq!(
        err.to_string(),
        "Step 2 (upload) failed: HTTP 403: empty response body"
    );
}

#[tokio::test]
async fn unsupported_type_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let candidate = UploadCandidate::new("scan.tiff", "image/tiff", vec![1, 2, 3]);
    let err = pipeline(&server).run(&candidate).await.unwrap_err();
    assert_eq!(err, PipelineError::UnsupportedType("image/tiff".into()));
    assert!(server.received_requests().await.unwrap().is_empty());
}
