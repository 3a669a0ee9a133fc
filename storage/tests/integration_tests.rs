//! Integration tests for the SQLite store: snapshot composition, the
//! day-scoped code lookup used for minting, and the active-host lookup.

use chrono::Duration;
use storage::{GameStore, SqliteStore};
use types::{Game, LeaveRequest, Phase, Player, RoundState, Vote, VotePhase};

async fn seeded_game(store: &SqliteStore, code: &str, host_identity: &str) -> (Game, Player) {
    let game = Game::new(code.to_string(), host_identity.to_string());
    let host = Player::new(
        game.id,
        host_identity.to_string(),
        "Hosty".to_string(),
        true,
    );
    store.insert_game(&game, &host).await.unwrap();
    (game, host)
}

#[tokio::test]
async fn snapshot_composes_all_five_tables() {
    let store = SqliteStore::in_memory().await.unwrap();
    let (game, host) = seeded_game(&store, "111111", "host-a").await;

    let player = Player::new(game.id, "p1".to_string(), "Ada".to_string(), false);
    store.insert_player(&player).await.unwrap();
    store
        .upsert_round_state(&RoundState::new(game.id))
        .await
        .unwrap();
    store
        .insert_vote(&Vote::new(
            game.id,
            player.id,
            host.id,
            1,
            VotePhase::DayVote,
        ))
        .await
        .unwrap();
    store
        .insert_leave_request(&LeaveRequest::new(game.id, player.id))
        .await
        .unwrap();

    let fetched = store.game_by_id(game.id).await.unwrap().unwrap();
    let snapshot = store.load_snapshot(fetched).await.unwrap();

    assert_eq!(snapshot.game.id, game.id);
    assert_eq!(snapshot.players.len(), 2);
    assert!(snapshot.round.is_some());
    assert_eq!(snapshot.votes.len(), 1);
    assert_eq!(snapshot.leave_requests.len(), 1);
    assert_eq!(snapshot.host().unwrap().id, host.id);
}

#[tokio::test]
async fn code_lookup_is_scoped_to_day() {
    let store = SqliteStore::in_memory().await.unwrap();
    let (game, _) = seeded_game(&store, "222222", "host-b").await;

    let today = game.created_on;
    assert!(store
        .game_with_code_on("222222", today)
        .await
        .unwrap()
        .is_some());
    assert!(store
        .game_with_code_on("222222", today - Duration::days(1))
        .await
        .unwrap()
        .is_none());
    assert!(store.game_with_code_on("999999", today).await.unwrap().is_none());
}

#[tokio::test]
async fn ended_games_do_not_count_as_hosted() {
    let store = SqliteStore::in_memory().await.unwrap();
    let (mut game, _) = seeded_game(&store, "333333", "host-c").await;

    assert!(store
        .active_game_hosted_by("host-c")
        .await
        .unwrap()
        .is_some());

    game.phase = Phase::Ended;
    game.version += 1;
    store.update_game(&game).await.unwrap();

    assert!(store
        .active_game_hosted_by("host-c")
        .await
        .unwrap()
        .is_none());
    assert!(store.active_game_hosted_by("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_one_game_leaves_others_alone() {
    let store = SqliteStore::in_memory().await.unwrap();
    let (first, _) = seeded_game(&store, "444444", "host-d").await;
    let (second, _) = seeded_game(&store, "555555", "host-e").await;

    let p = Player::new(second.id, "p2".to_string(), "Bea".to_string(), false);
    store.insert_player(&p).await.unwrap();

    store.delete_game(first.id).await.unwrap();

    assert!(store.game_by_id(first.id).await.unwrap().is_none());
    assert!(store.game_by_id(second.id).await.unwrap().is_some());
    assert_eq!(store.players_in_game(second.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_identity_in_same_game_is_rejected() {
    let store = SqliteStore::in_memory().await.unwrap();
    let (game, _) = seeded_game(&store, "666666", "host-f").await;

    let player = Player::new(game.id, "p1".to_string(), "Ada".to_string(), false);
    store.insert_player(&player).await.unwrap();

    let twin = Player::new(game.id, "p1".to_string(), "Ada again".to_string(), false);
    assert!(store.insert_player(&twin).await.is_err());

    // same identity in a different game is fine
    let (other, _) = seeded_game(&store, "777777", "host-g").await;
    let elsewhere = Player::new(other.id, "p1".to_string(), "Ada".to_string(), false);
    store.insert_player(&elsewhere).await.unwrap();
}
