use sqlx::SqlitePool;

use crate::error::StorageError;

/// Table definitions for the five persisted tables. Child tables cascade
/// with their game row; uuids and enums are stored as TEXT.
const DDL: [&str; 7] = [
    "CREATE TABLE IF NOT EXISTS games (
        id TEXT PRIMARY KEY,
        code TEXT NOT NULL,
        host_identity TEXT NOT NULL,
        phase TEXT NOT NULL,
        win_state TEXT,
        day_count INTEGER NOT NULL DEFAULT 0,
        created_on TEXT NOT NULL,
        created_at TEXT NOT NULL,
        version INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE INDEX IF NOT EXISTS idx_games_code ON games (code)",
    "CREATE TABLE IF NOT EXISTS players (
        id TEXT PRIMARY KEY,
        game_id TEXT NOT NULL REFERENCES games (id) ON DELETE CASCADE,
        client_identity TEXT NOT NULL,
        name TEXT NOT NULL,
        role TEXT,
        alive INTEGER NOT NULL DEFAULT 1,
        is_host INTEGER NOT NULL DEFAULT 0,
        UNIQUE (game_id, client_identity)
    )",
    "CREATE TABLE IF NOT EXISTS round_state (
        game_id TEXT PRIMARY KEY REFERENCES games (id) ON DELETE CASCADE,
        wolf_target TEXT,
        police_inspect_target TEXT,
        police_inspect_result TEXT,
        doctor_save_target TEXT,
        resolved_death TEXT,
        phase_started INTEGER NOT NULL DEFAULT 0
    )",
    "CREATE TABLE IF NOT EXISTS votes (
        id TEXT PRIMARY KEY,
        game_id TEXT NOT NULL REFERENCES games (id) ON DELETE CASCADE,
        voter_player_id TEXT NOT NULL,
        target_player_id TEXT NOT NULL,
        round INTEGER NOT NULL,
        phase TEXT NOT NULL,
        UNIQUE (game_id, voter_player_id, round, phase)
    )",
    "CREATE INDEX IF NOT EXISTS idx_votes_game_round ON votes (game_id, round)",
    "CREATE TABLE IF NOT EXISTS leave_requests (
        id TEXT PRIMARY KEY,
        game_id TEXT NOT NULL REFERENCES games (id) ON DELETE CASCADE,
        player_id TEXT NOT NULL,
        status TEXT NOT NULL,
        requested_at TEXT NOT NULL,
        processed_at TEXT,
        processed_by TEXT,
        UNIQUE (game_id, player_id)
    )",
];

pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), StorageError> {
    for statement in DDL {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| StorageError::Query(e.to_string()))?;
    }
    tracing::debug!("schema ready");
    Ok(())
}
