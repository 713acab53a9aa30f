pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::generation::handlers as topics;
use crate::profile::handlers as profiles;
use crate::speaker::handlers as speakers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.upload_body_limit();

    Router::new()
        .route("/health", get(health::health_handler))
        // Profiles
        .route("/api/v1/profiles/classify", post(profiles::handle_classify))
        // Speakers
        .route("/api/v1/speakers", post(speakers::handle_create_speaker))
        .route(
            "/api/v1/speakers/:id",
            get(speakers::handle_get_speaker).delete(speakers::handle_delete_speaker),
        )
        .route(
            "/api/v1/speakers/:id/profile",
            post(speakers::handle_upload_profile)
                .delete(speakers::handle_remove_profile)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/v1/speakers/:id/github",
            put(speakers::handle_update_github),
        )
        .route(
            "/api/v1/github/:username",
            get(speakers::handle_lookup_github),
        )
        // Topics
        .route("/api/v1/topics/solo", post(topics::handle_generate_solo))
        .route("/api/v1/topics/collab", post(topics::handle_generate_collab))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::generation::generator::TopicGenerator;
    use crate::llm_client::{CompletionProvider, GenerationFailure};
    use crate::profile::lines::TextFragment;
    use crate::profile::pdf::{ExtractionError, TextLayerProvider};
    use crate::speaker::github::{GithubActivity, GithubProfile, LookupError, ProfileLookup};

    const PROFILE_DOC: &str = "Contact\n\
        john.smith@example.com\n\
        www.linkedin.com/in/johnsmith (LinkedIn)\n\
        Top Skills\n\
        Distributed Systems\n\
        John Smith\n\
        Senior Engineer | Acme Corp\n\
        Summary\n\
        I design storage engines and lead the reliability guild at Acme Corp.\n\
        Experience\n\
        Acme Corp\n\
        Education\n\
        State University\n\
        Page 1 of 2";

    /// Treats the upload as UTF-8 and lays out one fragment per line, top to bottom.
    /// Bytes starting with `%BROKEN` fail like an unreadable PDF.
    struct LinesAsPdf;

    impl TextLayerProvider for LinesAsPdf {
        fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Vec<TextFragment>>, ExtractionError> {
            let text = std::str::from_utf8(bytes).map_err(|e| ExtractionError::Unreadable(e.to_string()))?;
            if text.starts_with("%BROKEN") {
                return Err(ExtractionError::Unreadable("bad xref".to_string()));
            }
            let fragments = text
                .lines()
                .enumerate()
                .map(|(i, line)| TextFragment::new(line, 800.0 - 14.0 * i as f64))
                .collect();
            Ok(vec![fragments])
        }
    }

    struct FakeGithub;

    #[async_trait]
    impl ProfileLookup for FakeGithub {
        async fn fetch_profile(&self, username: &str) -> Result<Option<GithubProfile>, LookupError> {
            if username == "ghost" {
                return Ok(None);
            }
            Ok(Some(GithubProfile {
                login: username.to_string(),
                name: Some("Bob Lee".to_string()),
                avatar_url: None,
                bio: None,
                public_repos: 1,
                followers: 2,
                following: 3,
                company: None,
            }))
        }

        async fn fetch_activity(&self, _username: &str) -> GithubActivity {
            GithubActivity::default()
        }
    }

    struct FakeLlm;

    #[async_trait]
    impl CompletionProvider for FakeLlm {
        async fn complete(&self, api_key: &str, _system: &str, _user: &str) -> Result<String, GenerationFailure> {
            if api_key == "bad-key" {
                return Err(GenerationFailure::InvalidCredential);
            }
            Ok(r#"{"topics":[{"title":"Storage Engines","description":"Lessons","format":"workshop"}]}"#.to_string())
        }
    }

    fn test_app() -> Router {
        let config = Config {
            gemini_api_key: Some("server-key".to_string()),
            ..Config::default()
        };
        let github: Arc<dyn ProfileLookup> = Arc::new(FakeGithub);
        let generator = TopicGenerator::new(Arc::new(FakeLlm), github.clone());
        build_router(AppState::new(config, Arc::new(LinesAsPdf), github, generator))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn upload(uri: &str, content_type: &str, content: &str) -> Request<Body> {
        let boundary = "XTALKFORGEBOUNDARY";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"me.pdf\"\r\n\
             Content-Type: {content_type}\r\n\r\n\
             {content}\r\n\
             --{boundary}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn create_speaker(app: &Router) -> String {
        let (status, body) = send(app, Request::builder().method("POST").uri("/api/v1/speakers").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&test_app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "talkforge");
    }

    #[tokio::test]
    async fn test_classify_endpoint_reports_rejection_reason() {
        let app = test_app();
        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/profiles/classify", json!({"text": "too short"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accepted"], false);
        assert!(body["rejection_reason"].as_str().unwrap().contains("enough text"));
    }

    #[tokio::test]
    async fn test_unknown_speaker_is_404() {
        let uri = format!("/api/v1/speakers/{}", uuid::Uuid::new_v4());
        let (status, body) = send(&test_app(), get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_rejected_and_recorded() {
        let app = test_app();
        let id = create_speaker(&app).await;
        let uri = format!("/api/v1/speakers/{id}/profile");

        let (status, body) = send(&app, upload(&uri, "image/png", PROFILE_DOC)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Only PDF files are accepted");

        let (_, speaker) = send(&app, get(&format!("/api/v1/speakers/{id}"))).await;
        assert_eq!(speaker["file_error"], "Only PDF files are accepted");
        assert_eq!(speaker["has_profile"], false);
    }

    #[tokio::test]
    async fn test_unreadable_pdf_gets_generic_message() {
        let app = test_app();
        let id = create_speaker(&app).await;
        let uri = format!("/api/v1/speakers/{id}/profile");

        let (status, body) = send(&app, upload(&uri, "application/pdf", "%BROKEN")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "EXTRACTION_FAILED");
    }

    #[tokio::test]
    async fn test_non_profile_pdf_is_not_a_profile() {
        let app = test_app();
        let id = create_speaker(&app).await;
        let uri = format!("/api/v1/speakers/{id}/profile");
        let invoice = format!("INVOICE\nBank statement\n{}", "line item 12.00\n".repeat(20));

        let (status, body) = send(&app, upload(&uri, "application/pdf", &invoice)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "NOT_A_PROFILE");
    }

    #[tokio::test(start_paused = true)]
    async fn test_upload_then_handle_flags_name_mismatch() {
        let app = test_app();
        let id = create_speaker(&app).await;

        let (status, speaker) = send(
            &app,
            upload(&format!("/api/v1/speakers/{id}/profile"), "application/pdf", PROFILE_DOC),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(speaker["linkedin_name"], "John Smith");
        assert_eq!(speaker["has_profile"], true);

        let (status, speaker) = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/v1/speakers/{id}/github"),
                json!({"username": "bob-lee"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(speaker["gh_loading"], true);

        tokio::time::sleep(Duration::from_secs(1)).await;

        let (_, speaker) = send(&app, get(&format!("/api/v1/speakers/{id}"))).await;
        assert_eq!(speaker["gh_loading"], false);
        assert_eq!(speaker["gh_profile"]["login"], "bob-lee");
        assert!(speaker["name_warning"].as_str().unwrap().contains("\"Bob Lee\""));
    }

    #[tokio::test]
    async fn test_invalid_handle_is_a_field_error() {
        let app = test_app();
        let id = create_speaker(&app).await;
        let (status, speaker) = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/v1/speakers/{id}/github"),
                json!({"username": "bad--name"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(speaker["gh_error"], "Username cannot contain consecutive hyphens");
        assert_eq!(speaker["gh_loading"], false);
    }

    #[tokio::test]
    async fn test_direct_lookup() {
        let app = test_app();
        let (status, body) = send(&app, get("/api/v1/github/octocat")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["login"], "octocat");

        let (status, body) = send(&app, get("/api/v1/github/ghost")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "GitHub user not found");
    }

    #[tokio::test]
    async fn test_solo_generation_flow() {
        let app = test_app();
        let id = create_speaker(&app).await;

        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/topics/solo", json!({"speaker_id": id})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Upload a LinkedIn profile PDF before generating topics."
        );

        send(
            &app,
            upload(&format!("/api/v1/speakers/{id}/profile"), "application/pdf", PROFILE_DOC),
        )
        .await;

        let (status, body) = send(
            &app,
            json_request("POST", "/api/v1/topics/solo", json!({"speaker_id": id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["workshops"], 1);
        assert_eq!(body["topics"][0]["title"], "Storage Engines");

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/topics/solo",
                json!({"speaker_id": id, "api_key": "bad-key"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["error"]["message"],
            "Invalid Gemini API key. Please verify and try again."
        );

        // The profile survives generation so the user can resubmit.
        let (_, speaker) = send(&app, get(&format!("/api/v1/speakers/{id}"))).await;
        assert_eq!(speaker["has_profile"], true);
    }

    #[tokio::test]
    async fn test_collab_requires_both_profiles() {
        let app = test_app();
        let first = create_speaker(&app).await;
        let second = create_speaker(&app).await;
        send(
            &app,
            upload(&format!("/api/v1/speakers/{first}/profile"), "application/pdf", PROFILE_DOC),
        )
        .await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/topics/collab",
                json!({"speaker_ids": [first, second]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().starts_with("Speaker 2: "));

        send(
            &app,
            upload(&format!("/api/v1/speakers/{second}/profile"), "application/pdf", PROFILE_DOC),
        )
        .await;
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/v1/topics/collab",
                json!({"speaker_ids": [first, second]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["topics"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_speaker_is_404() {
        let app = test_app();
        let id = create_speaker(&app).await;
        let uri = format!("/api/v1/speakers/{id}");
        send(&app, upload(&format!("{uri}/profile"), "application/pdf", PROFILE_DOC)).await;

        let delete = || Request::builder().method("DELETE").uri(&uri).body(Body::empty()).unwrap();
        let (status, body) = send(&app, delete()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_null());

        let (status, body) = send(&app, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = send(&app, delete()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            json_request("POST", "/api/v1/topics/solo", json!({"speaker_id": id})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_remove_profile() {
        let app = test_app();
        let id = create_speaker(&app).await;
        let uri = format!("/api/v1/speakers/{id}/profile");
        send(&app, upload(&uri, "application/pdf", PROFILE_DOC)).await;

        let req = Request::builder()
            .method("DELETE")
            .uri(&uri)
            .body(Body::empty())
            .unwrap();
        let (status, speaker) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(speaker["has_profile"], false);
        assert!(speaker["linkedin_name"].is_null());
    }
}
