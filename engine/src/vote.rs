use itertools::Itertools;
use types::{GameRef, Phase, Player, RoundState, Vote, VotePhase};
use uuid::Uuid;

use crate::engine::GameEngine;
use crate::error::EngineError;
use crate::roster::{player_by_id, player_by_identity, require_host};

/// The strictly highest-voted player for one (round, phase), or `None`
/// when the ballots are empty or tied for the top spot.
pub(crate) fn leading_target(votes: &[Vote], round: i64, phase: VotePhase) -> Option<Uuid> {
    let counts = votes
        .iter()
        .filter(|v| v.round == round && v.phase == phase)
        .map(|v| v.target_player_id)
        .counts();
    let top = counts.values().copied().max()?;
    let mut leaders = counts
        .iter()
        .filter(|(_, &count)| count == top)
        .map(|(&target, _)| target);
    let leader = leaders.next()?;
    if leaders.next().is_some() {
        return None;
    }
    Some(leader)
}

impl GameEngine {
    /// One ballot per voter per (round, vote phase); casting again changes
    /// the target. Ballots close when the round's elimination is applied.
    pub async fn cast_vote(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
        target_player_id: Uuid,
    ) -> Result<Vote, EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let game = self.require_game(game_id).await?;
        let vote_phase = match game.phase {
            Phase::DayVote => VotePhase::DayVote,
            Phase::DayFinalVote => VotePhase::DayFinalVote,
            _ => {
                return Err(EngineError::InvalidTransition(
                    "voting is closed".to_string(),
                ))
            }
        };

        let players = self.store().players_in_game(game.id).await?;
        let voter = player_by_identity(&players, client_identity)?;
        if voter.is_host {
            return Err(EngineError::Forbidden(
                "the host does not vote".to_string(),
            ));
        }
        if !voter.alive {
            return Err(EngineError::Forbidden(
                "dead players cannot vote".to_string(),
            ));
        }

        let target = player_by_id(&players, target_player_id)?;
        if target.is_host {
            return Err(EngineError::Validation(
                "the host cannot be voted against".to_string(),
            ));
        }
        if !target.alive {
            return Err(EngineError::Validation(format!(
                "{} is already dead",
                target.name
            )));
        }

        let votes = self.store().votes_in_game(game.id).await?;
        let existing = votes.iter().find(|v| {
            v.voter_player_id == voter.id && v.round == game.day_count && v.phase == vote_phase
        });

        if let Some(existing) = existing {
            let mut changed = existing.clone();
            changed.target_player_id = target.id;
            self.store().update_vote(&changed).await?;
            log::debug!(
                "game {}: {} changed their vote to {}",
                game.code,
                voter.name,
                target.name
            );
            Ok(changed)
        } else {
            let vote = Vote::new(game.id, voter.id, target.id, game.day_count, vote_phase);
            self.store().insert_vote(&vote).await?;
            log::debug!(
                "game {}: {} votes for {}",
                game.code,
                voter.name,
                target.name
            );
            Ok(vote)
        }
    }

    /// Applies the final vote: the strictly highest-voted player dies. A
    /// tied or empty ballot eliminates nobody and is reported as an error,
    /// not swallowed. Without a verdict the next night begins.
    pub async fn eliminate_player(
        &self,
        game_ref: &GameRef,
        client_identity: &str,
    ) -> Result<Player, EngineError> {
        let game_id = self.resolve_ref(game_ref).await?.id;
        let lock = self.game_lock(game_id);
        let _guard = lock.lock().await;

        let mut game = self.require_game(game_id).await?;
        let players = self.store().players_in_game(game.id).await?;
        require_host(&players, client_identity)?;
        if game.phase != Phase::DayFinalVote {
            return Err(EngineError::InvalidTransition(
                "elimination follows the final vote".to_string(),
            ));
        }

        let votes = self.store().votes_in_game(game.id).await?;
        let condemned_id = leading_target(&votes, game.day_count, VotePhase::DayFinalVote)
            .ok_or_else(|| {
                EngineError::Validation(
                    "the final vote has no single leader; nobody is eliminated".to_string(),
                )
            })?;

        let mut roster = players;
        let eliminated = {
            let condemned = roster
                .iter_mut()
                .find(|p| p.id == condemned_id)
                .ok_or_else(|| {
                    EngineError::Validation("the voted player is no longer in the game".to_string())
                })?;
            if !condemned.alive {
                return Err(EngineError::Validation(
                    "the voted player is already dead".to_string(),
                ));
            }
            condemned.alive = false;
            condemned.clone()
        };
        self.store().update_player(&eliminated).await?;
        log::info!("game {}: {} was voted out", game.code, eliminated.name);

        if !self.settle_win(&mut game, &roster).await? {
            self.store()
                .upsert_round_state(&RoundState::new(game.id))
                .await?;
            game.day_count += 1;
            game.phase = self.config().night_order.first();
            self.persist_game(&mut game).await?;
            log::info!("game {}: night {} begins", game.code, game.day_count);
        }
        Ok(eliminated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ballot(target: Uuid, round: i64, phase: VotePhase) -> Vote {
        Vote::new(Uuid::new_v4(), Uuid::new_v4(), target, round, phase)
    }

    #[test]
    fn strict_leader_wins() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let votes = vec![
            ballot(a, 1, VotePhase::DayFinalVote),
            ballot(a, 1, VotePhase::DayFinalVote),
            ballot(b, 1, VotePhase::DayFinalVote),
        ];
        assert_eq!(leading_target(&votes, 1, VotePhase::DayFinalVote), Some(a));
    }

    #[test]
    fn tie_for_the_top_spot_yields_nobody() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let votes = vec![
            ballot(a, 1, VotePhase::DayFinalVote),
            ballot(b, 1, VotePhase::DayFinalVote),
        ];
        assert_eq!(leading_target(&votes, 1, VotePhase::DayFinalVote), None);
    }

    #[test]
    fn empty_ballots_yield_nobody() {
        assert_eq!(leading_target(&[], 1, VotePhase::DayFinalVote), None);
    }

    #[test]
    fn other_rounds_and_phases_do_not_leak_in() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let votes = vec![
            ballot(a, 1, VotePhase::DayVote),
            ballot(a, 2, VotePhase::DayFinalVote),
            ballot(b, 1, VotePhase::DayFinalVote),
        ];
        assert_eq!(leading_target(&votes, 1, VotePhase::DayFinalVote), Some(b));
    }
}
