use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tokio::sync::broadcast;
use types::{Game, LeaveRequest, Player, RoundState, Vote};
use uuid::Uuid;

use super::traits::GameStore;
use crate::config::StoreConfig;
use crate::error::StorageError;
use crate::notify::{ChangeEvent, ChangeKind, ChangeNotifier, ChangeTable};
use crate::schema::ensure_schema;

/// SQLite-backed [`GameStore`]. Every mutation commits before its change
/// event is emitted, so subscribers only ever observe persisted rows.
pub struct SqliteStore {
    pool: SqlitePool,
    notifier: ChangeNotifier,
}

impl SqliteStore {
    pub async fn open(config: &StoreConfig) -> Result<Self, StorageError> {
        let pool = config.create_pool().await?;
        ensure_schema(&pool).await?;
        Ok(Self {
            pool,
            notifier: ChangeNotifier::new(256),
        })
    }

    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::open(&StoreConfig::in_memory()).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn emit<T: Serialize>(
        &self,
        table: ChangeTable,
        kind: ChangeKind,
        row: &T,
    ) -> Result<(), StorageError> {
        self.notifier.emit(table, kind, serde_json::to_value(row)?);
        Ok(())
    }
}

fn query_err(e: sqlx::Error) -> StorageError {
    StorageError::Query(e.to_string())
}

fn tx_err(e: sqlx::Error) -> StorageError {
    StorageError::Transaction(e.to_string())
}

fn decode_err(e: sqlx::Error) -> StorageError {
    StorageError::Decode(e.to_string())
}

fn uuid_col(row: &SqliteRow, col: &str) -> Result<Uuid, StorageError> {
    let raw: String = row.try_get(col).map_err(decode_err)?;
    Ok(Uuid::parse_str(&raw)?)
}

fn opt_uuid_col(row: &SqliteRow, col: &str) -> Result<Option<Uuid>, StorageError> {
    let raw: Option<String> = row.try_get(col).map_err(decode_err)?;
    Ok(raw.map(|s| Uuid::parse_str(&s)).transpose()?)
}

fn parsed_col<T>(row: &SqliteRow, col: &str) -> Result<T, StorageError>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.try_get(col).map_err(decode_err)?;
    raw.parse().map_err(StorageError::Decode)
}

fn opt_parsed_col<T>(row: &SqliteRow, col: &str) -> Result<Option<T>, StorageError>
where
    T: FromStr<Err = String>,
{
    let raw: Option<String> = row.try_get(col).map_err(decode_err)?;
    raw.map(|s| s.parse().map_err(StorageError::Decode))
        .transpose()
}

fn game_from_row(row: &SqliteRow) -> Result<Game, StorageError> {
    Ok(Game {
        id: uuid_col(row, "id")?,
        code: row.try_get("code").map_err(decode_err)?,
        host_identity: row.try_get("host_identity").map_err(decode_err)?,
        phase: parsed_col(row, "phase")?,
        win_state: opt_parsed_col(row, "win_state")?,
        day_count: row.try_get("day_count").map_err(decode_err)?,
        created_on: row.try_get("created_on").map_err(decode_err)?,
        created_at: row.try_get("created_at").map_err(decode_err)?,
        version: row.try_get("version").map_err(decode_err)?,
    })
}

fn player_from_row(row: &SqliteRow) -> Result<Player, StorageError> {
    Ok(Player {
        id: uuid_col(row, "id")?,
        game_id: uuid_col(row, "game_id")?,
        client_identity: row.try_get("client_identity").map_err(decode_err)?,
        name: row.try_get("name").map_err(decode_err)?,
        role: opt_parsed_col(row, "role")?,
        alive: row.try_get("alive").map_err(decode_err)?,
        is_host: row.try_get("is_host").map_err(decode_err)?,
    })
}

fn round_from_row(row: &SqliteRow) -> Result<RoundState, StorageError> {
    Ok(RoundState {
        game_id: uuid_col(row, "game_id")?,
        wolf_target: opt_uuid_col(row, "wolf_target")?,
        police_inspect_target: opt_uuid_col(row, "police_inspect_target")?,
        police_inspect_result: opt_parsed_col(row, "police_inspect_result")?,
        doctor_save_target: opt_uuid_col(row, "doctor_save_target")?,
        resolved_death: opt_uuid_col(row, "resolved_death")?,
        phase_started: row.try_get("phase_started").map_err(decode_err)?,
    })
}

fn vote_from_row(row: &SqliteRow) -> Result<Vote, StorageError> {
    Ok(Vote {
        id: uuid_col(row, "id")?,
        game_id: uuid_col(row, "game_id")?,
        voter_player_id: uuid_col(row, "voter_player_id")?,
        target_player_id: uuid_col(row, "target_player_id")?,
        round: row.try_get("round").map_err(decode_err)?,
        phase: parsed_col(row, "phase")?,
    })
}

fn leave_from_row(row: &SqliteRow) -> Result<LeaveRequest, StorageError> {
    Ok(LeaveRequest {
        id: uuid_col(row, "id")?,
        game_id: uuid_col(row, "game_id")?,
        player_id: uuid_col(row, "player_id")?,
        status: parsed_col(row, "status")?,
        requested_at: row.try_get("requested_at").map_err(decode_err)?,
        processed_at: row.try_get("processed_at").map_err(decode_err)?,
        processed_by: opt_uuid_col(row, "processed_by")?,
    })
}

#[async_trait]
impl GameStore for SqliteStore {
    async fn insert_game(&self, game: &Game, host: &Player) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(tx_err)?;

        sqlx::query(
            "INSERT INTO games (id, code, host_identity, phase, win_state, day_count, created_on, created_at, version)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(game.id.to_string())
        .bind(&game.code)
        .bind(&game.host_identity)
        .bind(game.phase.as_str())
        .bind(game.win_state.map(|w| w.as_str()))
        .bind(game.day_count)
        .bind(game.created_on)
        .bind(game.created_at)
        .bind(game.version)
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        sqlx::query(
            "INSERT INTO players (id, game_id, client_identity, name, role, alive, is_host)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(host.id.to_string())
        .bind(host.game_id.to_string())
        .bind(&host.client_identity)
        .bind(&host.name)
        .bind(host.role.map(|r| r.as_str()))
        .bind(host.alive)
        .bind(host.is_host)
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        tx.commit().await.map_err(tx_err)?;

        self.emit(ChangeTable::Games, ChangeKind::Insert, game)?;
        self.emit(ChangeTable::Players, ChangeKind::Insert, host)?;
        Ok(())
    }

    async fn game_by_id(&self, id: Uuid) -> Result<Option<Game>, StorageError> {
        let row = sqlx::query("SELECT * FROM games WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err)?;
        row.as_ref().map(game_from_row).transpose()
    }

    async fn game_by_code(&self, code: &str) -> Result<Option<Game>, StorageError> {
        let row = sqlx::query("SELECT * FROM games WHERE code = ? ORDER BY created_at DESC LIMIT 1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err)?;
        row.as_ref().map(game_from_row).transpose()
    }

    async fn game_with_code_on(
        &self,
        code: &str,
        day: NaiveDate,
    ) -> Result<Option<Game>, StorageError> {
        let row = sqlx::query("SELECT * FROM games WHERE code = ? AND created_on = ? LIMIT 1")
            .bind(code)
            .bind(day)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err)?;
        row.as_ref().map(game_from_row).transpose()
    }

    async fn active_game_hosted_by(
        &self,
        client_identity: &str,
    ) -> Result<Option<Game>, StorageError> {
        let row = sqlx::query(
            "SELECT * FROM games WHERE host_identity = ? AND phase != 'ended'
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(client_identity)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_err)?;
        row.as_ref().map(game_from_row).transpose()
    }

    async fn update_game(&self, game: &Game) -> Result<(), StorageError> {
        let result = sqlx::query(
            "UPDATE games SET phase = ?, win_state = ?, day_count = ?, version = ? WHERE id = ?",
        )
        .bind(game.phase.as_str())
        .bind(game.win_state.map(|w| w.as_str()))
        .bind(game.day_count)
        .bind(game.version)
        .bind(game.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::RowNotFound(format!("game {}", game.id)));
        }
        self.emit(ChangeTable::Games, ChangeKind::Update, game)
    }

    async fn delete_game(&self, id: Uuid) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(tx_err)?;
        let key = id.to_string();

        for statement in [
            "DELETE FROM votes WHERE game_id = ?",
            "DELETE FROM leave_requests WHERE game_id = ?",
            "DELETE FROM round_state WHERE game_id = ?",
            "DELETE FROM players WHERE game_id = ?",
        ] {
            sqlx::query(statement)
                .bind(&key)
                .execute(&mut *tx)
                .await
                .map_err(query_err)?;
        }

        let result = sqlx::query("DELETE FROM games WHERE id = ?")
            .bind(&key)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;
        if result.rows_affected() == 0 {
            return Err(StorageError::RowNotFound(format!("game {id}")));
        }

        tx.commit().await.map_err(tx_err)?;
        self.emit(
            ChangeTable::Games,
            ChangeKind::Delete,
            &serde_json::json!({ "id": id }),
        )
    }

    async fn insert_player(&self, player: &Player) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO players (id, game_id, client_identity, name, role, alive, is_host)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(player.id.to_string())
        .bind(player.game_id.to_string())
        .bind(&player.client_identity)
        .bind(&player.name)
        .bind(player.role.map(|r| r.as_str()))
        .bind(player.alive)
        .bind(player.is_host)
        .execute(&self.pool)
        .await
        .map_err(query_err)?;

        self.emit(ChangeTable::Players, ChangeKind::Insert, player)
    }

    async fn update_player(&self, player: &Player) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE players SET name = ?, role = ?, alive = ? WHERE id = ?")
            .bind(&player.name)
            .bind(player.role.map(|r| r.as_str()))
            .bind(player.alive)
            .bind(player.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::RowNotFound(format!("player {}", player.id)));
        }
        self.emit(ChangeTable::Players, ChangeKind::Update, player)
    }

    async fn delete_player(&self, id: Uuid) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM players WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::RowNotFound(format!("player {id}")));
        }
        self.emit(
            ChangeTable::Players,
            ChangeKind::Delete,
            &serde_json::json!({ "id": id }),
        )
    }

    async fn players_in_game(&self, game_id: Uuid) -> Result<Vec<Player>, StorageError> {
        let rows = sqlx::query("SELECT * FROM players WHERE game_id = ? ORDER BY rowid")
            .bind(game_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(query_err)?;
        rows.iter().map(player_from_row).collect()
    }

    async fn round_state(&self, game_id: Uuid) -> Result<Option<RoundState>, StorageError> {
        let row = sqlx::query("SELECT * FROM round_state WHERE game_id = ?")
            .bind(game_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err)?;
        row.as_ref().map(round_from_row).transpose()
    }

    async fn upsert_round_state(&self, round: &RoundState) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO round_state (game_id, wolf_target, police_inspect_target, police_inspect_result, doctor_save_target, resolved_death, phase_started)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (game_id) DO UPDATE SET
               wolf_target = excluded.wolf_target,
               police_inspect_target = excluded.police_inspect_target,
               police_inspect_result = excluded.police_inspect_result,
               doctor_save_target = excluded.doctor_save_target,
               resolved_death = excluded.resolved_death,
               phase_started = excluded.phase_started",
        )
        .bind(round.game_id.to_string())
        .bind(round.wolf_target.map(|u| u.to_string()))
        .bind(round.police_inspect_target.map(|u| u.to_string()))
        .bind(round.police_inspect_result.map(|r| r.as_str()))
        .bind(round.doctor_save_target.map(|u| u.to_string()))
        .bind(round.resolved_death.map(|u| u.to_string()))
        .bind(round.phase_started)
        .execute(&self.pool)
        .await
        .map_err(query_err)?;

        self.emit(ChangeTable::RoundState, ChangeKind::Update, round)
    }

    async fn insert_vote(&self, vote: &Vote) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO votes (id, game_id, voter_player_id, target_player_id, round, phase)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(vote.id.to_string())
        .bind(vote.game_id.to_string())
        .bind(vote.voter_player_id.to_string())
        .bind(vote.target_player_id.to_string())
        .bind(vote.round)
        .bind(vote.phase.as_str())
        .execute(&self.pool)
        .await
        .map_err(query_err)?;

        self.emit(ChangeTable::Votes, ChangeKind::Insert, vote)
    }

    async fn update_vote(&self, vote: &Vote) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE votes SET target_player_id = ? WHERE id = ?")
            .bind(vote.target_player_id.to_string())
            .bind(vote.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::RowNotFound(format!("vote {}", vote.id)));
        }
        self.emit(ChangeTable::Votes, ChangeKind::Update, vote)
    }

    async fn votes_in_game(&self, game_id: Uuid) -> Result<Vec<Vote>, StorageError> {
        let rows = sqlx::query("SELECT * FROM votes WHERE game_id = ? ORDER BY rowid")
            .bind(game_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(query_err)?;
        rows.iter().map(vote_from_row).collect()
    }

    async fn delete_votes(&self, game_id: Uuid) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM votes WHERE game_id = ?")
            .bind(game_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_err)?;

        self.emit(
            ChangeTable::Votes,
            ChangeKind::Delete,
            &serde_json::json!({ "game_id": game_id }),
        )
    }

    async fn insert_leave_request(&self, request: &LeaveRequest) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO leave_requests (id, game_id, player_id, status, requested_at, processed_at, processed_by)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(request.id.to_string())
        .bind(request.game_id.to_string())
        .bind(request.player_id.to_string())
        .bind(request.status.as_str())
        .bind(request.requested_at)
        .bind(request.processed_at)
        .bind(request.processed_by.map(|u| u.to_string()))
        .execute(&self.pool)
        .await
        .map_err(query_err)?;

        self.emit(ChangeTable::LeaveRequests, ChangeKind::Insert, request)
    }

    async fn update_leave_request(&self, request: &LeaveRequest) -> Result<(), StorageError> {
        let result = sqlx::query(
            "UPDATE leave_requests SET status = ?, processed_at = ?, processed_by = ? WHERE id = ?",
        )
        .bind(request.status.as_str())
        .bind(request.processed_at)
        .bind(request.processed_by.map(|u| u.to_string()))
        .bind(request.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::RowNotFound(format!(
                "leave request {}",
                request.id
            )));
        }
        self.emit(ChangeTable::LeaveRequests, ChangeKind::Update, request)
    }

    async fn leave_requests_in_game(
        &self,
        game_id: Uuid,
    ) -> Result<Vec<LeaveRequest>, StorageError> {
        let rows = sqlx::query("SELECT * FROM leave_requests WHERE game_id = ? ORDER BY rowid")
            .bind(game_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(query_err)?;
        rows.iter().map(leave_from_row).collect()
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Phase, Role, VotePhase};

    async fn store_with_game() -> (SqliteStore, Game, Player) {
        let store = SqliteStore::in_memory().await.unwrap();
        let game = Game::new("123456".to_string(), "host-token".to_string());
        let host = Player::new(game.id, "host-token".to_string(), "Hosty".to_string(), true);
        store.insert_game(&game, &host).await.unwrap();
        (store, game, host)
    }

    #[tokio::test]
    async fn insert_and_fetch_game_by_code() {
        let (store, game, host) = store_with_game().await;

        let fetched = store.game_by_code("123456").await.unwrap().unwrap();
        assert_eq!(fetched.id, game.id);
        assert_eq!(fetched.phase, Phase::Lobby);
        assert_eq!(fetched.host_identity, "host-token");
        assert_eq!(fetched.created_on, game.created_on);

        let players = store.players_in_game(game.id).await.unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0], host);
        assert!(players[0].is_host);
    }

    #[tokio::test]
    async fn update_game_bumps_are_visible() {
        let (store, mut game, _) = store_with_game().await;

        game.phase = Phase::NightWolf;
        game.day_count = 1;
        game.version += 1;
        store.update_game(&game).await.unwrap();

        let fetched = store.game_by_id(game.id).await.unwrap().unwrap();
        assert_eq!(fetched.phase, Phase::NightWolf);
        assert_eq!(fetched.version, 1);
    }

    #[tokio::test]
    async fn update_missing_game_is_row_not_found() {
        let store = SqliteStore::in_memory().await.unwrap();
        let game = Game::new("000001".to_string(), "nobody".to_string());
        let err = store.update_game(&game).await.unwrap_err();
        assert!(matches!(err, StorageError::RowNotFound(_)));
    }

    #[tokio::test]
    async fn round_state_upsert_overwrites() {
        let (store, game, _) = store_with_game().await;

        let mut round = RoundState::new(game.id);
        store.upsert_round_state(&round).await.unwrap();

        round.wolf_target = Some(Uuid::new_v4());
        round.phase_started = true;
        store.upsert_round_state(&round).await.unwrap();

        let fetched = store.round_state(game.id).await.unwrap().unwrap();
        assert_eq!(fetched, round);
    }

    #[tokio::test]
    async fn player_role_round_trips_through_text() {
        let (store, game, _) = store_with_game().await;

        let mut player = Player::new(game.id, "p1".to_string(), "Ada".to_string(), false);
        store.insert_player(&player).await.unwrap();

        player.role = Some(Role::Werewolf);
        store.update_player(&player).await.unwrap();

        let players = store.players_in_game(game.id).await.unwrap();
        let fetched = players.iter().find(|p| p.id == player.id).unwrap();
        assert_eq!(fetched.role, Some(Role::Werewolf));
        assert!(fetched.alive);
    }

    #[tokio::test]
    async fn vote_update_changes_target_only() {
        let (store, game, _) = store_with_game().await;

        let voter = Uuid::new_v4();
        let mut vote = Vote::new(game.id, voter, Uuid::new_v4(), 1, VotePhase::DayVote);
        store.insert_vote(&vote).await.unwrap();

        vote.target_player_id = Uuid::new_v4();
        store.update_vote(&vote).await.unwrap();

        let votes = store.votes_in_game(game.id).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0], vote);
    }

    #[tokio::test]
    async fn delete_game_cascades_children() {
        let (store, game, host) = store_with_game().await;

        store
            .upsert_round_state(&RoundState::new(game.id))
            .await
            .unwrap();
        store
            .insert_vote(&Vote::new(
                game.id,
                host.id,
                Uuid::new_v4(),
                1,
                VotePhase::DayVote,
            ))
            .await
            .unwrap();

        store.delete_game(game.id).await.unwrap();

        assert!(store.game_by_id(game.id).await.unwrap().is_none());
        assert!(store.players_in_game(game.id).await.unwrap().is_empty());
        assert!(store.round_state(game.id).await.unwrap().is_none());
        assert!(store.votes_in_game(game.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn mutations_emit_change_events() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut rx = store.subscribe();

        let game = Game::new("654321".to_string(), "host-token".to_string());
        let host = Player::new(game.id, "host-token".to_string(), "Hosty".to_string(), true);
        store.insert_game(&game, &host).await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.table, ChangeTable::Games);
        assert_eq!(first.kind, ChangeKind::Insert);
        assert_eq!(first.row["code"], "654321");

        let second = rx.recv().await.unwrap();
        assert_eq!(second.table, ChangeTable::Players);
        assert_eq!(second.kind, ChangeKind::Insert);
    }
}
