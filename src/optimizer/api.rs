use crate::error::OptimizerError;
use crate::utils::logging::{preview, with_pretty_json_debug};
use reqwest::StatusCode;
use sqlpilot_schema::{ChatCompletionRequest, ChatCompletionResponse, OpenaiErrorBody};
use url::Url;

pub const UPSTREAM_BODY_PREVIEW_CHARS: usize = 300;

pub struct ChatApi;

impl ChatApi {
    pub fn build_chat_request(
        client: &reqwest::Client,
        api_url: &Url,
        api_key: &str,
        body: &ChatCompletionRequest,
    ) -> Result<reqwest::Request, reqwest::Error> {
        client
            .post(api_url.clone())
            .bearer_auth(api_key)
            .json(body)
            .build()
    }

    /// One POST to the completions endpoint; no retry at this layer.
    pub async fn post_chat(
        client: &reqwest::Client,
        api_url: &Url,
        api_key: &str,
        body: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, OptimizerError> {
        with_pretty_json_debug(body, |pretty| {
            tracing::debug!(url = %api_url, body = %pretty, "Chat completion request");
        });

        let req = Self::build_chat_request(client, api_url, api_key, body)?;
        let resp = client.execute(req).await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            return Err(classify_upstream_error(status, &bytes));
        }

        let parsed = serde_json::from_slice::<ChatCompletionResponse>(&bytes)?;
        Ok(parsed)
    }
}

/// Map a non-success response to a structured error when the body carries the OpenAI envelope.
pub fn classify_upstream_error(status: StatusCode, bytes: &[u8]) -> OptimizerError {
    if let Ok(body) = serde_json::from_slice::<OpenaiErrorBody>(bytes) {
        tracing::debug!(
            %status,
            code = ?body.code_str(),
            error_type = ?body.inner.r#type,
            message = %body.inner.message,
            "Upstream structured error"
        );
        return OptimizerError::UpstreamMapped { status, body };
    }

    let raw_body = String::from_utf8_lossy(bytes).into_owned();
    tracing::debug!(
        %status,
        body = %preview(&raw_body, UPSTREAM_BODY_PREVIEW_CHARS),
        "Upstream unstructured error"
    );
    OptimizerError::UpstreamFallback {
        status,
        body: raw_body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use sqlpilot_schema::ChatMessage;

    #[test]
    fn build_chat_request_sets_auth_and_json_body() {
        let api_url = Url::parse("http://example.test/v1/chat/completions").expect("invalid url");
        let http = reqwest::Client::new();
        let body = ChatCompletionRequest::new("gpt-4", vec![ChatMessage::user("hi")])
            .with_temperature(0.2);

        let req = ChatApi::build_chat_request(&http, &api_url, "sk-test", &body)
            .expect("failed to build request");

        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.url().as_str(), api_url.as_str());
        assert_eq!(
            req.headers()
                .get(reqwest::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer sk-test")
        );
        assert_eq!(
            req.headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
            Some("application/json")
        );

        let sent = req
            .body()
            .and_then(reqwest::Body::as_bytes)
            .expect("json body is buffered");
        let sent: serde_json::Value = serde_json::from_slice(sent).expect("body is json");
        assert_eq!(sent["model"], "gpt-4");
        assert!((sent["temperature"].as_f64().expect("temperature") - 0.2).abs() < 1e-6);
    }

    #[test]
    fn classify_prefers_structured_envelope() {
        let raw = br#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota","code":"insufficient_quota"}}"#;
        match classify_upstream_error(StatusCode::TOO_MANY_REQUESTS, raw) {
            OptimizerError::UpstreamMapped { status, body } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(body.code_str().as_deref(), Some("insufficient_quota"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn classify_falls_back_to_raw_body() {
        match classify_upstream_error(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>") {
            OptimizerError::UpstreamFallback { status, body } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(body, "<html>bad gateway</html>");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
