//! What each subcommand does, kept apart from argument parsing and printing
//! so it can be driven from tests.

use std::path::Path;

use betweenlines_shared::constants::MAX_AUDIO_SIZE;
use betweenlines_shared::link::letter_id_from_link;
use betweenlines_shared::{AudioAttachment, HistoryEntry, Letter, LetterDraft};
use betweenlines_store::{HistoryLedger, LocalStorage};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::api::{CreatedLetter, LetterClient};
use crate::error::ClientError;

/// Send a letter and remember it in local history.
pub async fn send<S: LocalStorage>(
    client: &LetterClient,
    ledger: &HistoryLedger<S>,
    draft: LetterDraft,
    audio_path: Option<&Path>,
) -> Result<CreatedLetter, ClientError> {
    let audio = match audio_path {
        Some(path) => Some(read_audio(path).await?),
        None => None,
    };

    let recipient = draft.recipient_name.clone().unwrap_or_default();
    let created = client.create(draft, audio).await?;

    ledger.save(&created.id, &created.url, &recipient);
    info!(id = %created.id, "Letter sent");

    Ok(created)
}

async fn read_audio(path: &Path) -> Result<AudioAttachment, ClientError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("audio")
        .to_string();

    let content = tokio::fs::read(path).await?;
    if content.len() > MAX_AUDIO_SIZE {
        return Err(ClientError::Invalid(format!(
            "Audio file too large: {} bytes (max {})",
            content.len(),
            MAX_AUDIO_SIZE
        )));
    }

    Ok(AudioAttachment::new(file_name, content))
}

/// Fetch a letter by id or shareable link, optionally flagging it opened.
pub async fn read(
    client: &LetterClient,
    id_or_link: &str,
    mark_opened: bool,
) -> Result<Option<Letter>, ClientError> {
    let id = letter_id_from_link(id_or_link)
        .ok_or_else(|| ClientError::Invalid(format!("Not a letter id or link: {id_or_link}")))?;

    let Some(mut letter) = client.get(id).await? else {
        return Ok(None);
    };

    if mark_opened && !letter.opened {
        letter.opened = client.mark_opened(id).await?;
    }

    Ok(Some(letter))
}

pub fn render_letter(letter: &Letter) -> String {
    let mut out = String::new();

    out.push_str(&letter.title);
    out.push('\n');
    if let Some(ref to) = letter.recipient_name {
        out.push_str(&format!("To: {to}\n"));
    }
    out.push('\n');
    out.push_str(&letter.body);
    out.push_str("\n\n");

    if let Some(ref music) = letter.music_url {
        out.push_str(&format!("Music: {music}\n"));
    }
    if let Some(ref audio) = letter.audio_url {
        out.push_str(&format!("Audio: {audio}\n"));
    }

    out.push_str(&format!(
        "Sent {} ({}, {})",
        letter.created_at.format("%Y-%m-%d %H:%M UTC"),
        letter.envelope_theme,
        if letter.opened { "opened" } else { "not opened yet" },
    ));
    out
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No letters in history.".to_string();
    }

    entries
        .iter()
        .map(|entry| {
            let to = if entry.recipient_name.is_empty() {
                "(no name)"
            } else {
                entry.recipient_name.as_str()
            };
            let expires = DateTime::<Utc>::from_timestamp_millis(entry.expires_at)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "?".to_string());
            format!("{}  to {}  {}  (until {})", entry.id, to, entry.link, expires)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
