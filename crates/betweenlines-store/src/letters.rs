use betweenlines_shared::{Letter, NewLetter};
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::database::Database;
use crate::error::Result;

impl Database {
    pub fn insert_letter(
        &self,
        id: &str,
        letter: &NewLetter,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        self.conn().execute(
            "INSERT INTO letters (id, title, body, recipient_name, envelope_theme, letter_theme,
                                  music_url, audio_url, opened, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9)",
            params![
                id,
                letter.title,
                letter.body,
                letter.recipient_name,
                letter.envelope_theme,
                letter.letter_theme,
                letter.music_url,
                letter.audio_url,
                created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn get_letter(&self, id: &str) -> Result<Option<Letter>> {
        let result = self.conn().query_row(
            "SELECT id, title, body, recipient_name, envelope_theme, letter_theme,
                    music_url, audio_url, opened, created_at
             FROM letters
             WHERE id = ?1",
            params![id],
            row_to_letter,
        );

        match result {
            Ok(letter) => Ok(Some(letter)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Only the `opened` flag is ever written after insert.
    pub fn mark_letter_opened(&self, id: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE letters SET opened = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(affected > 0)
    }

    pub fn count_letters(&self) -> Result<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM letters", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn row_to_letter(row: &rusqlite::Row<'_>) -> rusqlite::Result<Letter> {
    let opened_int: i32 = row.get(8)?;
    let created_str: String = row.get(9)?;

    let created_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Letter {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        recipient_name: row.get(3)?,
        envelope_theme: row.get(4)?,
        letter_theme: row.get(5)?,
        music_url: row.get(6)?,
        audio_url: row.get(7)?,
        opened: opened_int != 0,
        created_at,
    })
}
