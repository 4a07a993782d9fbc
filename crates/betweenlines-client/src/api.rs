//! HTTP client for the letter API.

use betweenlines_shared::{AudioAttachment, Letter, LetterDraft};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::error::ClientError;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct CreatedLetter {
    pub id: String,
    /// Shareable link to hand to the recipient.
    pub url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone)]
pub struct LetterClient {
    http: reqwest::Client,
    base_url: Url,
}

impl LetterClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ClientError::Invalid(format!("Bad server URL {base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::Invalid(format!("Bad server URL {base_url}")));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
        })
    }

    /// Server URL with `segments` appended, each one percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn create(
        &self,
        draft: LetterDraft,
        audio: Option<AudioAttachment>,
    ) -> Result<CreatedLetter, ClientError> {
        let mut form = Form::new();
        let fields = [
            ("title", draft.title),
            ("body", draft.body),
            ("recipientName", draft.recipient_name),
            ("envelopeTheme", draft.envelope_theme),
            ("letterTheme", draft.letter_theme),
            ("musicUrl", draft.music_url),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                form = form.text(name, value);
            }
        }

        if let Some(audio) = audio {
            let part = Part::bytes(audio.content.to_vec()).file_name(audio.file_name);
            form = form.part("audio", part);
        }

        let response = self
            .http
            .post(self.endpoint(&["api", "letters"]))
            .multipart(form)
            .send()
            .await?;

        let created: CreatedLetter = ensure_success(response).await?.json().await?;
        debug!(id = %created.id, "Letter stored on server");
        Ok(created)
    }

    /// `Ok(None)` when the server does not know the id.
    pub async fn get(&self, id: &str) -> Result<Option<Letter>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["api", "letters", id]))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(ensure_success(response).await?.json().await?))
    }

    pub async fn mark_opened(&self, id: &str) -> Result<bool, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&["api", "letters", id, "opened"]))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        ensure_success(response).await?;
        Ok(true)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);

    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}
