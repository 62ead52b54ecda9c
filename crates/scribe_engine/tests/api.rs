use std::time::Duration;

use pretty_assertions::assert_eq;
use scribe_engine::{ApiReply, ClientSettings, Format, HttpApi, StatusReport, TranscriptionApi};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> HttpApi {
    HttpApi::new(&server.uri(), ClientSettings::default()).expect("client")
}

#[tokio::test]
async fn list_formats_parses_the_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listformats"))
        .and(wiremock::matchers::header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"[{"name":"JSON","mimeType":"application/json","icon":"json.png"},
                {"name":"Plain text","mimeType":"text/plain","icon":"text.png"}]"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let reply = api_for(&server).list_formats().await;
    assert_eq!(
        reply,
        ApiReply::Ok(vec![
            Format {
                mime_type: "application/json".to_string(),
                name: "JSON".to_string(),
                icon: "json.png".to_string(),
            },
            Format {
                mime_type: "text/plain".to_string(),
                name: "Plain text".to_string(),
                icon: "text.png".to_string(),
            },
        ])
    );
}

#[tokio::test]
async fn non_200_with_message_classifies_as_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/listformats"))
        .respond_with(ResponseTemplate::new(500).set_body_raw(
            r#"{"message":"No serializers are installed"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let reply = api_for(&server).list_formats().await;
    assert_eq!(
        reply,
        ApiReply::Server {
            status: 500,
            message: "No serializers are installed".to_string(),
        }
    );
}

#[tokio::test]
async fn unparseable_success_body_classifies_as_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobstatus/abc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>proxy error</html>", "text/html"),
        )
        .mount(&server)
        .await;

    let reply = api_for(&server).job_status("abc").await;
    assert_eq!(
        reply,
        ApiReply::Protocol {
            status: 200,
            body: "<html>proxy error</html>".to_string(),
        }
    );
}

#[tokio::test]
async fn unreachable_server_classifies_as_transport_error() {
    let settings = ClientSettings {
        connect_timeout: Duration::from_millis(200),
        ..ClientSettings::default()
    };
    let api = HttpApi::new("http://127.0.0.1:9", settings).expect("client");
    let reply = api.list_formats().await;
    assert!(matches!(reply, ApiReply::Transport { .. }));
}

#[tokio::test]
async fn slow_server_classifies_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobstatus/abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("{}"),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    };
    let api = HttpApi::new(&server.uri(), settings).expect("client");
    let reply = api.job_status("abc").await;
    assert!(matches!(reply, ApiReply::Transport { .. }));
}

#[tokio::test]
async fn job_status_parses_the_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobstatus/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"message":"Transcribing","wav":"interview.wav","percentComplete":42,"running":true}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let reply = api_for(&server).job_status("abc").await;
    assert_eq!(
        reply,
        ApiReply::Ok(StatusReport {
            percent_complete: 42,
            message: "Transcribing".to_string(),
            running: true,
            wav: Some("interview.wav".to_string()),
        })
    );
}

#[tokio::test]
async fn send_transcript_url_encodes_email_and_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sendtranscript/abc"))
        .and(query_param("email", "user@example.com"))
        .and(query_param("format", "text/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"message":"Transcribing","percentComplete":10,"running":true}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let reply = api_for(&server)
        .send_transcript("abc", "user@example.com", "text/plain")
        .await;
    assert!(matches!(reply, ApiReply::Ok(_)));

    // The raw query string carries percent-encoded values.
    let requests = server.received_requests().await.expect("recording enabled");
    let query = requests[0].url.query().expect("query string").to_string();
    assert!(query.contains("format=text%2Fplain"), "query was {query}");
    assert!(query.contains("email=user%40example.com"), "query was {query}");
}

#[tokio::test]
async fn transcript_download_returns_the_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/transcript/abc"))
        .and(query_param("format", "text/plain"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("one two three", "text/plain"),
        )
        .mount(&server)
        .await;

    let bytes = api_for(&server)
        .fetch_transcript("abc", "text/plain")
        .await
        .expect("transcript");
    assert_eq!(bytes, b"one two three");
}

#[tokio::test]
async fn oversized_transcript_download_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/transcript/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0u8; 64], "text/plain"))
        .mount(&server)
        .await;

    let settings = ClientSettings {
        max_transcript_bytes: 16,
        ..ClientSettings::default()
    };
    let api = HttpApi::new(&server.uri(), settings).expect("client");
    let err = api
        .fetch_transcript("abc", "text/plain")
        .await
        .expect_err("should refuse");
    assert!(err.contains("too large"), "error was {err}");
}

#[tokio::test]
async fn endpoints_resolve_under_a_base_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/scribe/listformats"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .mount(&server)
        .await;

    let api = HttpApi::new(&format!("{}/scribe", server.uri()), ClientSettings::default())
        .expect("client");
    let reply = api.list_formats().await;
    assert_eq!(reply, ApiReply::Ok(Vec::new()));
}
