pub mod data_files;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::intake::handlers::{self as intake, MAX_UPLOAD_BYTES};
use crate::optimize::handlers as optimize;
use crate::resume::handlers as resumes;
use crate::state::AppState;

/// Room for multipart framing on top of the largest accepted file.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 2 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // AI optimization
        .route("/api/ai/optimize", post(optimize::handle_optimize))
        .route(
            "/api/ai/optimize/stream",
            post(optimize::handle_optimize_stream),
        )
        // Résumé versions
        .route(
            "/api/resumes",
            get(resumes::handle_list_resumes)
                .post(resumes::handle_create_resume)
                .delete(resumes::handle_clear_resumes),
        )
        .route(
            "/api/resumes/:id",
            get(resumes::handle_get_resume)
                .put(resumes::handle_update_resume)
                .delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/resume/current",
            get(resumes::handle_get_current)
                .put(resumes::handle_set_current)
                .delete(resumes::handle_reset_current),
        )
        // Intake placeholders
        .route(
            "/api/resume/upload",
            post(intake::handle_upload)
                .get(intake::handle_upload_progress)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/api/resume/ocr",
            post(intake::handle_ocr).get(intake::handle_task_status),
        )
        .route(
            "/api/resume/parse",
            post(intake::handle_parse).get(intake::handle_task_status),
        )
        .route(
            "/api/resume/save",
            post(intake::handle_save).get(intake::handle_saved_list),
        )
        .route("/api/data-files", get(data_files::handle_list_data_files))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bundled_resume_path, test_state};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BOUNDARY: &str = "resume-api-test-boundary";

    fn sample_resume() -> Value {
        serde_json::from_str(&std::fs::read_to_string(bundled_resume_path()).unwrap()).unwrap()
    }

    fn app(server: &MockServer) -> Router {
        let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        build_router(test_state(&server.uri(), &dir))
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn multipart_request(filename: &str, content_type: &str, contents: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method(Method::POST)
            .uri("/api/resume/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn completion(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        }))
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let (status, body) = send(&app(&server), empty_request(Method::GET, "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "resume-api");
    }

    #[tokio::test]
    async fn test_resume_crud_flow() {
        let server = MockServer::start().await;
        let app = app(&server);

        let (status, created) = send(
            &app,
            json_request(
                Method::POST,
                "/api/resumes",
                json!({"name": "Backend", "data": sample_resume()}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();
        assert!(id.starts_with("resume_"));

        let (_, list) = send(&app, empty_request(Method::GET, "/api/resumes")).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["name"], "Backend");

        let mut edited = sample_resume();
        edited["header"]["name"] = json!("Renamed");
        let (status, updated) = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/api/resumes/{id}"),
                json!({"name": "Backend v2", "data": edited}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Backend v2");
        assert_eq!(updated["data"]["header"]["name"], "Renamed");

        let (status, _) = send(&app, empty_request(Method::DELETE, &format!("/api/resumes/{id}"))).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, empty_request(Method::GET, &format!("/api/resumes/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_update_unknown_resume_is_not_found() {
        let server = MockServer::start().await;
        let (status, _) = send(
            &app(&server),
            json_request(
                Method::PUT,
                "/api/resumes/resume_0_missing",
                json!({"name": "x", "data": sample_resume()}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_clear_resumes() {
        let server = MockServer::start().await;
        let app = app(&server);
        for name in ["a", "b"] {
            send(
                &app,
                json_request(Method::POST, "/api/resumes", json!({"name": name, "data": sample_resume()})),
            )
            .await;
        }
        let (status, _) = send(&app, empty_request(Method::DELETE, "/api/resumes")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, list) = send(&app, empty_request(Method::GET, "/api/resumes")).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_malformed_resume() {
        let server = MockServer::start().await;
        let mut broken = sample_resume();
        broken["projects"]["items"] = json!({});
        let (status, body) = send(
            &app(&server),
            json_request(Method::POST, "/api/resumes", json!({"name": "x", "data": broken})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("/projects/items"));
    }

    #[tokio::test]
    async fn test_current_resume_set_and_reset() {
        let server = MockServer::start().await;
        let app = app(&server);
        let original = sample_resume()["header"]["name"].clone();

        let mut edited = sample_resume();
        edited["header"]["name"] = json!("Edited");
        let (status, _) = send(&app, json_request(Method::PUT, "/api/resume/current", edited)).await;
        assert_eq!(status, StatusCode::OK);

        let (_, current) = send(&app, empty_request(Method::GET, "/api/resume/current")).await;
        assert_eq!(current["header"]["name"], "Edited");

        let (_, reset) = send(&app, empty_request(Method::DELETE, "/api/resume/current")).await;
        assert_eq!(reset["header"]["name"], original);
    }

    #[tokio::test]
    async fn test_optimize_requires_current_resume() {
        let server = MockServer::start().await;
        let (status, body) = send(
            &app(&server),
            json_request(Method::POST, "/api/ai/optimize", json!({"suggestions": "tighten"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Missing required field: currentResume");
    }

    #[tokio::test]
    async fn test_optimize_requires_guidance() {
        let server = MockServer::start().await;
        let (status, body) = send(
            &app(&server),
            json_request(Method::POST, "/api/ai/optimize", json!({"currentResume": sample_resume()})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Provide optimization suggestions or a job description");
    }

    #[tokio::test]
    async fn test_optimize_rejects_invalid_json() {
        let server = MockServer::start().await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/ai/optimize")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app(&server), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_JSON");
    }

    #[tokio::test]
    async fn test_optimize_success() {
        let server = MockServer::start().await;
        let mut improved = sample_resume();
        improved["about"]["content"] = json!("Cut p99 latency by 35%.");
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion(&improved.to_string()))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = send(
            &app(&server),
            json_request(
                Method::POST,
                "/api/ai/optimize",
                json!({"currentResume": sample_resume(), "jobDescription": "Backend engineer"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["about"]["content"], "Cut p99 latency by 35%.");
    }

    #[tokio::test]
    async fn test_optimize_failure_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("not a résumé"))
            .mount(&server)
            .await;

        let (status, body) = send(
            &app(&server),
            json_request(
                Method::POST,
                "/api/ai/optimize",
                json!({"currentResume": sample_resume(), "suggestions": "more impact"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "AI returned an invalid résumé format, please retry");
    }

    #[tokio::test]
    async fn test_optimize_stream_emits_events() {
        let server = MockServer::start().await;
        let upstream = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(upstream, "text/event-stream"))
            .mount(&server)
            .await;

        let response = app(&server)
            .oneshot(json_request(
                Method::POST,
                "/api/ai/optimize/stream",
                json!({"currentResume": sample_resume(), "suggestions": "more impact"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream"));

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("data: Hel\n\n"));
        assert!(text.contains("data: lo\n\n"));
        assert!(text.trim_end().ends_with("data: [DONE]"));
    }

    #[tokio::test]
    async fn test_upload_accepts_pdf() {
        let server = MockServer::start().await;
        let (status, body) = send(
            &app(&server),
            multipart_request("cv.pdf", "application/pdf", b"%PDF-1.4 test"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["filename"], "cv.pdf");
        assert_eq!(body["size"], 13);
        assert!(body["fileId"].as_str().unwrap().starts_with("file_"));
    }

    #[tokio::test]
    async fn test_upload_rejects_other_types() {
        let server = MockServer::start().await;
        let (status, body) = send(
            &app(&server),
            multipart_request("cv.docx", "application/msword", b"doc"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Only PDF files are supported");
    }

    #[tokio::test]
    async fn test_upload_requires_file_field() {
        let server = MockServer::start().await;
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/resume/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        let (status, body) = send(&app(&server), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file was uploaded");
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file() {
        let server = MockServer::start().await;
        let contents = vec![b'x'; MAX_UPLOAD_BYTES + 1];
        let (status, body) = send(
            &app(&server),
            multipart_request("big.pdf", "application/pdf", &contents),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_upload_progress_requires_file_id() {
        let server = MockServer::start().await;
        let app = app(&server);
        let (status, _) = send(&app, empty_request(Method::GET, "/api/resume/upload")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            send(&app, empty_request(Method::GET, "/api/resume/upload?fileId=file_1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["progress"], 100);
    }

    #[tokio::test]
    async fn test_ocr_and_parse_placeholders() {
        let server = MockServer::start().await;
        let app = app(&server);

        let (status, _) = send(&app, json_request(Method::POST, "/api/resume/ocr", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, ocr) = send(
            &app,
            json_request(Method::POST, "/api/resume/ocr", json!({"fileId": "file_1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ocr["confidence"], 0.95);
        assert_eq!(ocr["processingTime"], 2000);

        let (status, parsed) = send(
            &app,
            json_request(Method::POST, "/api/resume/parse", json!({"text": ocr["extractedText"]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parsed["tokensUsed"], 1250);
        assert!(crate::resume::validation::validate_resume(&parsed["parsedData"])
            .into_result()
            .is_ok());

        let (status, task) =
            send(&app, empty_request(Method::GET, "/api/resume/parse?taskId=t1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(task["status"], "completed");
    }

    #[tokio::test]
    async fn test_save_placeholder() {
        let server = MockServer::start().await;
        let app = app(&server);

        let (status, _) = send(&app, json_request(Method::POST, "/api/resume/save", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, saved) = send(
            &app,
            json_request(Method::POST, "/api/resume/save", json!({"resumeData": sample_resume()})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["resumeName"], "Untitled résumé");
        assert_eq!(saved["version"], 1);

        let (_, list) = send(&app, empty_request(Method::GET, "/api/resume/save?page=1&limit=1")).await;
        assert_eq!(list["pagination"]["totalPages"], 2);
    }

    #[tokio::test]
    async fn test_data_files_skips_bad_entries() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.json"), r#"{"header": {}}"#).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let app = build_router(test_state(&server.uri(), dir.path()));
        let (status, body) = send(&app, empty_request(Method::GET, "/api/data-files")).await;
        assert_eq!(status, StatusCode::OK);
        let records = body.as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], "good.json");
        assert_eq!(records[0]["name"], "good");
        assert_eq!(records[0]["type"], "file");
    }

    #[tokio::test]
    async fn test_data_files_missing_dir_is_server_error() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(test_state(&server.uri(), &dir.path().join("absent")));
        let (status, _) = send(&app, empty_request(Method::GET, "/api/data-files")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
