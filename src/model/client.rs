use futures::{FutureExt, future::BoxFuture};
use reqwest::Client;
use url::Url;

use crate::domain::Verdict;

use super::{
    AuthoritativeClassifier, ClassifyError,
    protocol::{CLASSIFY_PATH, ClassifyRequest, ClassifyResponse},
};

/// Calls a classification bridge running in another process.
#[derive(Clone)]
pub struct RemoteClassifierClient {
    http: Client,
    endpoint: Url,
}

impl RemoteClassifierClient {
    /// `base_url` must end with '/' (the config loader guarantees this).
    pub fn new(http: Client, base_url: &Url) -> Result<Self, url::ParseError> {
        Ok(Self {
            http,
            endpoint: base_url.join(CLASSIFY_PATH)?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn classify(&self, content: &str) -> Result<Verdict, ClassifyError> {
        let request = ClassifyRequest {
            content: Some(content.to_string()),
        };
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifyError::Status(status));
        }

        let body = response.bytes().await?;
        let parsed: ClassifyResponse = serde_json::from_slice(&body)
            .map_err(|err| ClassifyError::Malformed(err.to_string()))?;
        Ok(parsed.into_verdict())
    }
}

impl AuthoritativeClassifier for RemoteClassifierClient {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn classify<'a>(&'a self, content: &'a str) -> BoxFuture<'a, Result<Verdict, ClassifyError>> {
        RemoteClassifierClient::classify(self, content).boxed()
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;
    use crate::domain::{Label, ModelTag};

    async fn serve(router: Router) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn client(base: &Url) -> RemoteClassifierClient {
        RemoteClassifierClient::new(Client::new(), base).unwrap()
    }

    #[test]
    fn endpoint_is_joined_onto_base() {
        let base = Url::parse("http://guard.internal:4000/v1/").unwrap();
        assert_eq!(
            client(&base).endpoint().as_str(),
            "http://guard.internal:4000/v1/api/classify/comment"
        );
    }

    #[tokio::test]
    async fn posts_content_and_parses_verdict() {
        let router = Router::new().route(
            "/api/classify/comment",
            post(|Json(body): Json<Value>| async move {
                let toxic = body["content"].as_str().unwrap_or("").contains("bad");
                Json(json!({
                    "is_toxic": toxic,
                    "classification": if toxic { "toxic" } else { "non-toxic" },
                    "confidence": 0.9,
                    "model": "trained",
                }))
            }),
        );
        let base = serve(router).await;
        let verdict = client(&base).classify("bad vibes").await.unwrap();
        assert!(verdict.is_toxic());
        assert_eq!(verdict.classification(), Label::Toxic);
        assert_eq!(verdict.model(), ModelTag::Trained);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let router = Router::new().route(
            "/api/classify/comment",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "nope") }),
        );
        let base = serve(router).await;
        assert!(matches!(
            client(&base).classify("text").await,
            Err(ClassifyError::Status(status)) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let router = Router::new().route(
            "/api/classify/comment",
            post(|| async { Json(json!({"verdict": "maybe"})) }),
        );
        let base = serve(router).await;
        assert!(matches!(
            client(&base).classify("text").await,
            Err(ClassifyError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_remote_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let base = Url::parse(&format!("http://{addr}/")).unwrap();
        assert!(matches!(
            client(&base).classify("text").await,
            Err(ClassifyError::Transport(_))
        ));
    }
}
