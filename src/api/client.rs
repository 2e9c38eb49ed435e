// HTTP client for the prioritization backend
// The backend keeps the uploaded CSV in a session cookie, so one client
// (and one cookie jar) must serve every call of a run.

use super::{
    display_value, Analysis, Backend, ChatBody, ChatQuery, ErrorBody, MessageBody, PreviewRow,
    PrioritizeBody, ReportEmail, RequestSummary, UploadBody, UploadFile,
};
use crate::config::{ApiKey, BackendConfig};
use crate::types::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub const API_KEY_HEADER: &str = "X-API-Key";

pub struct BackendClient {
    client: Client,
    base_url: String,
    api_key: Option<ApiKey>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> AppResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST with the configured key attached when there is one
    fn post(&self, path: &str) -> RequestBuilder {
        let request = self.client.post(self.url(path));
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key.expose()),
            None => request,
        }
    }

    /// POST that requires the key capability
    fn post_authorized(&self, path: &str, key: &ApiKey) -> RequestBuilder {
        self.client
            .post(self.url(path))
            .header(API_KEY_HEADER, key.expose())
    }

    /// Decode a JSON body, mapping non-2xx responses to `AppError::Backend`
    async fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            warn!("Backend returned {}: {}", status, message);
            return Err(AppError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| AppError::Decode(e.to_string()))
    }

    async fn read_message(response: Response) -> AppResult<String> {
        let body: MessageBody = Self::read_json(response).await?;
        Ok(body.message.unwrap_or_default())
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn upload(&self, file: UploadFile) -> AppResult<Vec<RequestSummary>> {
        debug!("Uploading {} ({} bytes)", file.file_name, file.bytes.len());

        let part = multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str("text/csv")?;
        let form = multipart::Form::new().part("file", part);

        let response = self.post("/upload").multipart(form).send().await?;
        let body: UploadBody = Self::read_json(response).await?;

        let requests: Vec<RequestSummary> = body
            .requests
            .unwrap_or_default()
            .into_iter()
            .map(|raw| RequestSummary {
                index: raw.index,
                title: display_value(&raw.title),
            })
            .collect();

        if requests.is_empty() {
            return Err(AppError::Rejected("No rows found in the CSV.".to_string()));
        }
        Ok(requests)
    }

    async fn preview_request(&self, row: usize) -> AppResult<PreviewRow> {
        let response = self
            .client
            .get(self.url(&format!("/preview_request/{}", row)))
            .send()
            .await?;
        let body: Map<String, Value> = Self::read_json(response).await?;

        Ok(PreviewRow {
            fields: body
                .iter()
                .map(|(field, value)| (field.clone(), display_value(value)))
                .collect(),
        })
    }

    async fn prioritize(&self, row: usize) -> AppResult<Analysis> {
        let response = self
            .client
            .get(self.url(&format!("/prioritize/{}", row)))
            .send()
            .await?;
        let body: PrioritizeBody = Self::read_json(response).await?;

        if let Some(error) = body.error {
            return Err(AppError::Rejected(error));
        }
        let markdown = body
            .analysis
            .ok_or_else(|| AppError::Decode("response has no analysis".to_string()))?;

        Ok(Analysis {
            index: body.index.unwrap_or(row),
            title: display_value(&body.title),
            directorate: display_value(&body.directorate),
            markdown,
        })
    }

    async fn chat(&self, query: &ChatQuery) -> AppResult<String> {
        let response = self.post("/chat").json(query).send().await?;
        let body: ChatBody = Self::read_json(response).await?;

        if let Some(error) = body.error {
            return Err(AppError::Rejected(error));
        }
        Ok(body.response.unwrap_or_default())
    }

    async fn clear_chat(&self, key: &ApiKey) -> AppResult<String> {
        let response = self.post_authorized("/chat/clear", key).send().await?;
        Self::read_message(response).await
    }

    async fn clear_analysis_cache(&self, key: &ApiKey) -> AppResult<String> {
        let response = self.post_authorized("/analysis/clear", key).send().await?;
        Self::read_message(response).await
    }

    async fn send_report(&self, key: &ApiKey, report: &ReportEmail) -> AppResult<String> {
        let response = self
            .post_authorized("/send-report", key)
            .json(report)
            .send()
            .await?;
        Self::read_message(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::time::Duration;

    fn client_for(server: &mockito::ServerGuard, api_key: Option<&str>) -> BackendClient {
        BackendClient::new(&BackendConfig {
            base_url: server.url(),
            api_key: api_key.and_then(ApiKey::new),
            request_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_upload_parses_requests() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data".to_string()),
            )
            .match_body(Matcher::Regex("name=\"file\"".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"requests":[{"index":0,"title":"Request A"},{"index":1,"title":"Request B"}]}"#)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let requests = client
            .upload(UploadFile {
                file_name: "requests.csv".to_string(),
                bytes: b"Title\nRequest A\nRequest B\n".to_vec(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            requests,
            vec![
                RequestSummary { index: 0, title: "Request A".to_string() },
                RequestSummary { index: 1, title: "Request B".to_string() },
            ]
        );
    }

    #[tokio::test]
    async fn test_upload_error_body_becomes_backend_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/upload")
            .with_status(400)
            .with_body(r#"{"error":"CSV file is empty."}"#)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let err = client
            .upload(UploadFile {
                file_name: "a.csv".to_string(),
                bytes: b"x".to_vec(),
            })
            .await
            .unwrap_err();

        match err {
            AppError::Backend { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "CSV file is empty.");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_with_no_rows_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/upload")
            .with_status(200)
            .with_body(r#"{"requests":[]}"#)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let err = client
            .upload(UploadFile {
                file_name: "a.csv".to_string(),
                bytes: b"x".to_vec(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No rows found in the CSV.");
    }

    #[tokio::test]
    async fn test_non_json_error_uses_status_reason() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/preview_request/3")
            .with_status(404)
            .with_body("<html>not here</html>")
            .create_async()
            .await;

        let client = client_for(&server, None);
        let err = client.preview_request(3).await.unwrap_err();
        assert_eq!(err.to_string(), "Not Found");
    }

    #[tokio::test]
    async fn test_preview_maps_fields() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/preview_request/0")
            .with_status(200)
            .with_body(r#"{"Title of Your Project":"Request A","How many employees currently work on this procedure?":4,"Notes":null}"#)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let preview = client.preview_request(0).await.unwrap();
        assert_eq!(preview.fields.len(), 3);
        assert!(preview
            .fields
            .contains(&("Title of Your Project".to_string(), "Request A".to_string())));
        assert!(preview.fields.contains(&("Notes".to_string(), String::new())));
        assert!(preview.fields.contains(&(
            "How many employees currently work on this procedure?".to_string(),
            "4".to_string()
        )));
    }

    #[tokio::test]
    async fn test_prioritize_success_and_embedded_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/prioritize/0")
            .with_status(200)
            .with_body(r##"{"index":0,"title":"Request A","directorate":"IT","analysis":"# Result\nok"}"##)
            .create_async()
            .await;
        server
            .mock("GET", "/prioritize/1")
            .with_status(200)
            .with_body(r#"{"error":"Row index out of range."}"#)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let analysis = client.prioritize(0).await.unwrap();
        assert_eq!(analysis.index, 0);
        assert_eq!(analysis.title, "Request A");
        assert_eq!(analysis.directorate, "IT");
        assert_eq!(analysis.markdown, "# Result\nok");

        let err = client.prioritize(1).await.unwrap_err();
        assert!(matches!(err, AppError::Rejected(ref m) if m == "Row index out of range."));
    }

    #[tokio::test]
    async fn test_chat_sends_query_and_context() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_header(API_KEY_HEADER, Matcher::Missing)
            .match_body(Matcher::Json(serde_json::json!({
                "query": "Why high?",
                "analysis": "# Result"
            })))
            .with_status(200)
            .with_body(r#"{"response":"Because."}"#)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let reply = client
            .chat(&ChatQuery {
                query: "Why high?".to_string(),
                analysis: "# Result".to_string(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "Because.");
    }

    #[tokio::test]
    async fn test_configured_key_is_sent_on_post() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_header(API_KEY_HEADER, "k-123")
            .with_status(200)
            .with_body(r#"{"response":""}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("k-123"));
        let reply = client
            .chat(&ChatQuery {
                query: "hi".to_string(),
                analysis: String::new(),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(reply.is_empty());
    }

    #[tokio::test]
    async fn test_send_report_uses_capability_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/send-report")
            .match_header(API_KEY_HEADER, "report-key")
            .match_body(Matcher::Json(serde_json::json!({
                "email": "a@b.org",
                "pdf": "JVBERi0="
            })))
            .with_status(200)
            .with_body(r#"{"message":"PDF report sent successfully"}"#)
            .create_async()
            .await;

        // Client has no default key; the capability passed in is what gets sent
        let client = client_for(&server, None);
        let key = ApiKey::new("report-key").unwrap();
        let message = client
            .send_report(
                &key,
                &ReportEmail {
                    email: "a@b.org".to_string(),
                    pdf: "JVBERi0=".to_string(),
                },
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(message, "PDF report sent successfully");
    }

    #[tokio::test]
    async fn test_clear_endpoints() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/analysis/clear")
            .with_status(200)
            .with_body(r#"{"message":"Session analysis cache cleared successfully."}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/chat/clear")
            .with_status(500)
            .with_body(r#"{"error":"Failed to clear server state: boom"}"#)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let key = ApiKey::new("k").unwrap();

        let message = client.clear_analysis_cache(&key).await.unwrap();
        assert_eq!(message, "Session analysis cache cleared successfully.");

        let err = client.clear_chat(&key).await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to clear server state: boom");
    }
}
