//! HTTP client for the AskAny REST API.
//!
//! Every call is a single request with no retry. Non-2xx responses are turned
//! into [`ClientError`] variants here so callers never look at status codes.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use askany_shared::protocol::{
    AnswerRequest, CreateSessionResponse, ErrorBody, NewQuestion, SessionSnapshot,
    SetModeRequest, SpotlightRequest, UpvoteRequest,
};
use askany_shared::{ClientId, Question, QuestionId, Session, SessionMode, SessionSlug, Stats};

use crate::config::{normalize_base_url, ClientConfig};
use crate::error::{ClientError, Result};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url)
            .ok_or_else(|| ClientError::Config(format!("invalid API URL: {base_url:?}")))?;

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("askany-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(&config.api_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /api/sessions`
    pub async fn create_session(&self) -> Result<SessionSlug> {
        let resp = self.http.post(self.url("/api/sessions")).send().await?;
        let resp = ensure_success(resp).await?;
        let body: CreateSessionResponse = decode(resp).await?;
        debug!(slug = %body.slug, "session created");
        Ok(body.slug)
    }

    /// `GET /api/sessions/{slug}?clientId=…`
    pub async fn fetch_session(
        &self,
        slug: &SessionSlug,
        client_id: &ClientId,
    ) -> Result<SessionSnapshot> {
        let resp = self
            .http
            .get(self.url(&format!("/api/sessions/{slug}")))
            .query(&[("clientId", client_id.as_str())])
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::SessionNotFound(slug.clone()));
        }
        let resp = ensure_success(resp).await?;
        decode(resp).await
    }

    /// `PATCH /api/sessions/{slug}/mode`
    pub async fn set_mode(&self, slug: &SessionSlug, mode: SessionMode) -> Result<Session> {
        let resp = self
            .http
            .patch(self.url(&format!("/api/sessions/{slug}/mode")))
            .json(&SetModeRequest { mode })
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::SessionNotFound(slug.clone()));
        }
        let resp = ensure_success(resp).await?;
        decode(resp).await
    }

    /// `POST /api/questions`
    pub async fn submit_question(&self, body: &NewQuestion) -> Result<Question> {
        let resp = self
            .http
            .post(self.url("/api/questions"))
            .json(body)
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::SessionNotFound(body.session_slug.clone()));
        }
        let resp = ensure_success(resp).await?;
        decode(resp).await
    }

    /// `POST /api/questions/{id}/upvote`
    pub async fn upvote(&self, id: &QuestionId, client_id: &ClientId) -> Result<Question> {
        let resp = self
            .http
            .post(self.url(&format!("/api/questions/{id}/upvote")))
            .json(&UpvoteRequest {
                client_id: client_id.clone(),
            })
            .send()
            .await?;

        if resp.status() == StatusCode::CONFLICT {
            return Err(ClientError::DuplicateVote(id.clone()));
        }
        let resp = ensure_question_success(resp, id).await?;
        decode(resp).await
    }

    /// `PATCH /api/questions/{id}/answer`
    pub async fn mark_answered(&self, id: &QuestionId) -> Result<Question> {
        let resp = self
            .http
            .patch(self.url(&format!("/api/questions/{id}/answer")))
            .json(&AnswerRequest { is_answered: true })
            .send()
            .await?;

        let resp = ensure_question_success(resp, id).await?;
        decode(resp).await
    }

    /// `PATCH /api/questions/{id}/spotlight`
    pub async fn set_spotlight(&self, id: &QuestionId, is_spotlighted: bool) -> Result<Question> {
        let resp = self
            .http
            .patch(self.url(&format!("/api/questions/{id}/spotlight")))
            .json(&SpotlightRequest { is_spotlighted })
            .send()
            .await?;

        let resp = ensure_question_success(resp, id).await?;
        decode(resp).await
    }

    /// `GET /api/sessions/stats`, falling back to `GET /api/stats` on older
    /// backends.
    pub async fn fetch_stats(&self) -> Result<Stats> {
        let resp = self.http.get(self.url("/api/sessions/stats")).send().await?;
        if resp.status() != StatusCode::NOT_FOUND {
            let resp = ensure_success(resp).await?;
            return decode(resp).await;
        }

        debug!("stats not under /api/sessions, trying /api/stats");
        let resp = self.http.get(self.url("/api/stats")).send().await?;
        let resp = ensure_success(resp).await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    resp.json::<T>().await.map_err(|e| {
        if e.is_decode() {
            ClientError::Decode(e.to_string())
        } else {
            ClientError::Transport(e)
        }
    })
}

async fn ensure_question_success(resp: Response, id: &QuestionId) -> Result<Response> {
    if resp.status() == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(format!("Question {id}")));
    }
    ensure_success(resp).await
}

/// Map a non-2xx response to an error, reading the server's message if any.
async fn ensure_success(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let url = resp.url().path().to_string();
    let message = resp
        .text()
        .await
        .ok()
        .and_then(|text| serde_json::from_str::<ErrorBody>(&text).ok())
        .and_then(ErrorBody::into_message);

    debug!(status = status.as_u16(), path = %url, ?message, "request rejected");

    Err(match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(url),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(
            message.unwrap_or_else(|| "The server rejected the request".to_string()),
        ),
        _ => ClientError::Server {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            }),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_base_url() {
        let err = ApiClient::new("localhost:3001", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn builds_paths_from_trimmed_base() {
        let api = ApiClient::new("http://127.0.0.1:9/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "http://127.0.0.1:9");
        assert_eq!(api.url("/api/sessions"), "http://127.0.0.1:9/api/sessions");
    }
}
