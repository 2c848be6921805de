//! JSON file generation for games, match summaries and benchmark reports.
//!
//! Game files carry the per-move search metrics of both engines, which is
//! what later analysis of engine behaviour works from.

use crate::game_runner::{GameRecord, MoveRecord};
use chrono::Utc;
use serde::Serialize;
use std::path::Path;

/// JSON representation of a complete game.
#[derive(Serialize)]
struct GameJson<'a> {
    /// Unique identifier for the game.
    id: &'a str,
    /// Name of the engine playing white.
    white: &'a str,
    /// Name of the engine playing black.
    black: &'a str,
    /// Game result: "white", "black", or "draw".
    result: &'a str,
    termination: &'a str,
    start_fen: &'a str,
    final_fen: &'a str,
    /// Complete move list with search metrics.
    moves: &'a [MoveRecord],
    /// RFC 3339 timestamp when the file was created.
    created_at: String,
}

/// Writes a completed game to a JSON file.
///
/// # File Format
///
/// ```json
/// {
///   "id": "game-uuid",
///   "white": "negamax",
///   "black": "random",
///   "result": "white",
///   "termination": "checkmate",
///   "start_fen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
///   "final_fen": "...",
///   "moves": [
///     { "uci": "e2e4", "score": 35.0, "nodes_searched": 1234, "depth_reached": 3, "time_ms": 12 }
///   ],
///   "created_at": "2024-01-15T12:00:00+00:00"
/// }
/// ```
pub fn write_game_json<P: AsRef<Path>>(
    path: P,
    id: &str,
    record: &GameRecord,
) -> std::io::Result<()> {
    write_json(path, &game_json(id, record))
}

/// The same document as [`write_game_json`], as a string.
pub fn render_game_json(id: &str, record: &GameRecord) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&game_json(id, record))
}

fn game_json<'a>(id: &'a str, record: &'a GameRecord) -> GameJson<'a> {
    GameJson {
        id,
        white: &record.white_name,
        black: &record.black_name,
        result: record.result.as_str(),
        termination: record.termination.as_str(),
        start_fen: &record.start_fen,
        final_fen: &record.final_fen,
        moves: &record.moves,
        created_at: Utc::now().to_rfc3339(),
    }
}

/// Writes any serializable value as pretty-printed JSON.
pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> std::io::Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}
