use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ENVELOPE_THEME, DEFAULT_LETTER_THEME, DEFAULT_TITLE, HISTORY_RETENTION_MS,
};
use crate::error::SharedError;

// ---------------------------------------------------------------------------
// Letter
// ---------------------------------------------------------------------------

/// A letter as returned by a document store.
///
/// Every field except `opened` is fixed at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Letter {
    /// Opaque identifier assigned by the store.
    pub id: String,
    pub title: String,
    pub body: String,
    pub recipient_name: Option<String>,
    pub envelope_theme: String,
    pub letter_theme: String,
    /// External background track, stored as given.
    pub music_url: Option<String>,
    /// Set only when an audio attachment was uploaded.
    pub audio_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Flipped by the reader's view, never reset.
    pub opened: bool,
}

// ---------------------------------------------------------------------------
// Draft (raw sender input)
// ---------------------------------------------------------------------------

/// Raw input from the compose form. Every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LetterDraft {
    pub title: Option<String>,
    pub body: Option<String>,
    pub recipient_name: Option<String>,
    pub envelope_theme: Option<String>,
    pub letter_theme: Option<String>,
    pub music_url: Option<String>,
}

impl LetterDraft {
    /// Draft with only a body set.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    /// `true` when the body contains something other than whitespace.
    pub fn has_body(&self) -> bool {
        self.body
            .as_deref()
            .map(|b| !b.trim().is_empty())
            .unwrap_or(false)
    }

    /// Apply the documented defaults and attach the uploaded audio URL.
    pub fn into_new_letter(self, audio_url: Option<String>) -> NewLetter {
        NewLetter {
            title: present(self.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: self.body.unwrap_or_default(),
            recipient_name: present(self.recipient_name),
            envelope_theme: present(self.envelope_theme)
                .unwrap_or_else(|| DEFAULT_ENVELOPE_THEME.to_string()),
            letter_theme: present(self.letter_theme)
                .unwrap_or_else(|| DEFAULT_LETTER_THEME.to_string()),
            music_url: present(self.music_url),
            audio_url,
        }
    }
}

/// Blank strings count as absent.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A letter with defaults applied, ready to be handed to a document store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewLetter {
    pub title: String,
    pub body: String,
    pub recipient_name: Option<String>,
    pub envelope_theme: String,
    pub letter_theme: String,
    pub music_url: Option<String>,
    pub audio_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Stored document form
// ---------------------------------------------------------------------------

/// A letter as kept by a document backend: the timestamp is an RFC 3339
/// string and the id lives outside the document (it is the key).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LetterDocument {
    pub title: String,
    pub body: String,
    pub recipient_name: Option<String>,
    pub envelope_theme: String,
    pub letter_theme: String,
    pub music_url: Option<String>,
    pub audio_url: Option<String>,
    pub created_at: String,
    pub opened: bool,
}

impl LetterDocument {
    pub fn new(letter: NewLetter, created_at: DateTime<Utc>) -> Self {
        Self {
            title: letter.title,
            body: letter.body,
            recipient_name: letter.recipient_name,
            envelope_theme: letter.envelope_theme,
            letter_theme: letter.letter_theme,
            music_url: letter.music_url,
            audio_url: letter.audio_url,
            created_at: created_at.to_rfc3339(),
            opened: false,
        }
    }

    /// Rebuild the typed letter, parsing `createdAt` back into a timestamp.
    pub fn to_letter(&self, id: &str) -> Result<Letter, SharedError> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)?.with_timezone(&Utc);

        Ok(Letter {
            id: id.to_string(),
            title: self.title.clone(),
            body: self.body.clone(),
            recipient_name: self.recipient_name.clone(),
            envelope_theme: self.envelope_theme.clone(),
            letter_theme: self.letter_theme.clone(),
            music_url: self.music_url.clone(),
            audio_url: self.audio_url.clone(),
            created_at,
            opened: self.opened,
        })
    }
}

// ---------------------------------------------------------------------------
// Audio attachment
// ---------------------------------------------------------------------------

/// An audio clip picked by the sender, held in memory until upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioAttachment {
    /// Original file name, used as a hint for the storage key.
    pub file_name: String,
    pub content: Bytes,
}

impl AudioAttachment {
    pub fn new(file_name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// History entry
// ---------------------------------------------------------------------------

/// One bookmark in the client-local history ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Identifier of the letter this entry points to.
    pub id: String,
    /// Full shareable URL.
    pub link: String,
    pub recipient_name: String,
    /// Epoch millis.
    pub created_at: i64,
    /// Epoch millis, `created_at` plus the retention window.
    pub expires_at: i64,
}

impl HistoryEntry {
    pub fn new(
        id: impl Into<String>,
        link: impl Into<String>,
        recipient_name: impl Into<String>,
        now_millis: i64,
    ) -> Self {
        Self {
            id: id.into(),
            link: link.into(),
            recipient_name: recipient_name.into(),
            created_at: now_millis,
            expires_at: now_millis + HISTORY_RETENTION_MS,
        }
    }

    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expires_at <= now_millis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let draft = LetterDraft {
            title: Some("   ".into()),
            body: Some("Hello there".into()),
            recipient_name: Some(String::new()),
            ..LetterDraft::default()
        };

        let letter = draft.into_new_letter(None);
        assert_eq!(letter.title, DEFAULT_TITLE);
        assert_eq!(letter.body, "Hello there");
        assert_eq!(letter.recipient_name, None);
        assert_eq!(letter.envelope_theme, "envelope-red");
        assert_eq!(letter.letter_theme, "letter-sticky");
        assert_eq!(letter.music_url, None);
        assert_eq!(letter.audio_url, None);
    }

    #[test]
    fn test_chosen_values_kept() {
        let draft = LetterDraft {
            title: Some("Hi".into()),
            body: Some("Hello".into()),
            recipient_name: Some("Sam".into()),
            envelope_theme: Some("envelope-blue".into()),
            letter_theme: Some("letter-lined".into()),
            music_url: Some("https://music.example/track/1".into()),
        };

        let letter = draft.into_new_letter(Some("https://x/audio/1_a.mp3".into()));
        assert_eq!(letter.title, "Hi");
        assert_eq!(letter.recipient_name.as_deref(), Some("Sam"));
        assert_eq!(letter.envelope_theme, "envelope-blue");
        assert_eq!(letter.letter_theme, "letter-lined");
        assert_eq!(letter.music_url.as_deref(), Some("https://music.example/track/1"));
        assert_eq!(letter.audio_url.as_deref(), Some("https://x/audio/1_a.mp3"));
    }

    #[test]
    fn test_has_body() {
        assert!(LetterDraft::new("text").has_body());
        assert!(!LetterDraft::new(" \n\t").has_body());
        assert!(!LetterDraft::default().has_body());
    }

    #[test]
    fn test_document_timestamp_parsed() {
        let created = Utc::now();
        let doc = LetterDocument::new(LetterDraft::new("body").into_new_letter(None), created);
        assert!(!doc.opened);

        let letter = doc.to_letter("abc123").unwrap();
        assert_eq!(letter.id, "abc123");
        assert_eq!(letter.created_at, created);
    }

    #[test]
    fn test_document_bad_timestamp() {
        let mut doc = LetterDocument::new(LetterDraft::new("body").into_new_letter(None), Utc::now());
        doc.created_at = "yesterday".into();
        assert!(doc.to_letter("abc").is_err());
    }

    #[test]
    fn test_letter_json_is_camel_case() {
        let doc = LetterDocument::new(LetterDraft::new("body").into_new_letter(None), Utc::now());
        let json = serde_json::to_value(doc.to_letter("abc").unwrap()).unwrap();
        assert!(json.get("recipientName").is_some());
        assert!(json.get("envelopeTheme").is_some());
        assert_eq!(json["audioUrl"], serde_json::Value::Null);
        assert!(json["createdAt"].is_string());
    }

    #[test]
    fn test_history_entry_expiry() {
        let entry = HistoryEntry::new("a", "https://x/l/a", "Sam", 1_000);
        assert_eq!(entry.expires_at, 1_000 + HISTORY_RETENTION_MS);
        assert!(!entry.is_expired(entry.expires_at - 1));
        assert!(entry.is_expired(entry.expires_at));
    }
}
