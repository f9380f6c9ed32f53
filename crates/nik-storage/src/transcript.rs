//! Plain-text chat transcripts written by `/save`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::info;

use nik_core::error::NikError;
use nik_core::types::Turn;

const RULE: &str = "============================================================";

/// Write `turns` to `chat_log_<YYYYmmdd_HHMMSS>.txt` inside `dir`.
///
/// Returns the path of the written file.
pub fn save_transcript(
    dir: &Path,
    turns: &[Turn],
    bot_name: &str,
    now: DateTime<Local>,
) -> Result<PathBuf, NikError> {
    if turns.is_empty() {
        return Err(NikError::Storage("nothing to save".to_string()));
    }
    std::fs::create_dir_all(dir)?;

    let path = dir.join(format!("chat_log_{}.txt", now.format("%Y%m%d_%H%M%S")));

    std::fs::write(&path, render_transcript(turns, bot_name, now))?;
    info!("Transcript saved to {}", path.display());
    Ok(path)
}

fn render_transcript(turns: &[Turn], bot_name: &str, now: DateTime<Local>) -> String {
    let header = format!(
        "{RULE}\nCHAT LOG - {}\n{RULE}\n\n",
        now.format("%Y-%m-%d %H:%M:%S")
    );
    turns.iter().fold(header, |mut body, turn| {
        body.push_str(&turn.render(bot_name));
        body.push_str("\n\n");
        body
    })
}
