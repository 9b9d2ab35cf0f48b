// SPDX-License-Identifier: GPL-3.0-or-later

//! Acrostic playlists: one song per letter of a message, drawn from genre radio.

use anyhow::{anyhow, bail, Result};
use echonest_client::{dig, generic_unmarshal, Args, EchoNestClient};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

const BATCH_SIZE: &str = "5";

/// Songs drawn for a single letter before it is printed on its own.
pub const MAX_TRIES: usize = 200;

/// Stream `"<title> by <artist>"` lines from a genre-radio session into `tx`.
///
/// Returns once the receiving side hangs up.
pub async fn produce_songs(
    client: EchoNestClient,
    genre: String,
    tx: mpsc::Sender<String>,
) -> Result<()> {
    let mut args = Args::new();
    args.set("type", "genre-radio").set("genre", genre.to_lowercase());

    let created =
        generic_unmarshal(client.get_call("playlist/dynamic/create", &args).await?).await?;
    let session_id = dig!(&created, "response", "session_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("no session id in playlist/dynamic/create response"))?
        .to_string();
    debug!(target: "cli", session_id = %session_id, genre = %genre, "playlist session created");

    let next = Args::from([("results", BATCH_SIZE), ("session_id", session_id.as_str())]);
    loop {
        let batch =
            generic_unmarshal(client.get_call("playlist/dynamic/next", &next).await?).await?;
        let songs = dig!(&batch, "response", "songs")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        if songs.is_empty() {
            bail!("playlist session {} ran out of songs", session_id);
        }

        for song in &songs {
            let title = dig!(song, "title").and_then(|v| v.as_str()).unwrap_or_default();
            let artist = dig!(song, "artist_name")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            if tx.send(format!("{} by {}", title, artist)).await.is_err() {
                return Ok(());
            }
        }
    }
}

/// Pick one song per letter of `message`, in order.
///
/// Non-letters are emitted as they are. Songs that do not fit the current
/// letter are kept for later letters. After `max_tries` misses the letter is
/// emitted on its own.
pub async fn build_acrostic(
    message: &str,
    songs: &mut mpsc::Receiver<String>,
    max_tries: usize,
) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut spare: Vec<String> = Vec::new();

    for letter in message.chars() {
        if !letter.is_alphabetic() {
            lines.push(letter.to_string());
            continue;
        }

        if let Some(pos) = spare.iter().position(|s| starts_with_letter(s, letter)) {
            lines.push(spare.swap_remove(pos));
            continue;
        }

        let mut found = None;
        for _ in 0..max_tries {
            let song = songs
                .recv()
                .await
                .ok_or_else(|| anyhow!("song source closed"))?;
            if starts_with_letter(&song, letter) {
                found = Some(song);
                break;
            }
            spare.push(song);
        }

        match found {
            Some(song) => lines.push(song),
            None => {
                warn!(target: "cli", %letter, max_tries, "no song found for letter");
                lines.push(letter.to_string());
            }
        }
    }

    Ok(lines)
}

/// Case- and accent-insensitive first-letter match.
pub fn starts_with_letter(song: &str, letter: char) -> bool {
    match song.chars().next() {
        Some(first) => base_letter(first) == base_letter(letter),
        None => false,
    }
}

fn base_letter(c: char) -> Option<char> {
    std::iter::once(c)
        .nfd()
        .next()
        .and_then(|base| base.to_lowercase().next())
}
