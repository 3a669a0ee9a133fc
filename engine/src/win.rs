use types::{Player, Role, WinState};

/// Pure verdict over the current roster; the host never counts. Checked
/// after every death, elimination and mid-game removal. With two players
/// left, voting is meaningless, so a verdict is forced either way.
pub fn evaluate_win(players: &[Player]) -> Option<WinState> {
    let alive: Vec<&Player> = players.iter().filter(|p| !p.is_host && p.alive).collect();
    let wolves = alive
        .iter()
        .filter(|p| p.has_role(Role::Werewolf))
        .count();
    let others = alive.len() - wolves;

    if wolves == 0 {
        return Some(WinState::Villagers);
    }
    if wolves >= others {
        return Some(WinState::Werewolves);
    }
    if alive.len() == 2 {
        return Some(if wolves > 0 {
            WinState::Werewolves
        } else {
            WinState::Villagers
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn player(role: Role, alive: bool) -> Player {
        let mut p = Player::new(
            Uuid::new_v4(),
            Uuid::new_v4().to_string(),
            "p".to_string(),
            false,
        );
        p.role = Some(role);
        p.alive = alive;
        p
    }

    fn host() -> Player {
        Player::new(
            Uuid::new_v4(),
            Uuid::new_v4().to_string(),
            "host".to_string(),
            true,
        )
    }

    #[test]
    fn no_living_wolves_is_a_villager_win() {
        let players = vec![
            host(),
            player(Role::Werewolf, false),
            player(Role::Villager, true),
            player(Role::Doctor, true),
            player(Role::Police, true),
        ];
        assert_eq!(evaluate_win(&players), Some(WinState::Villagers));
    }

    #[test]
    fn wolves_matching_others_is_a_werewolf_win() {
        let players = vec![
            host(),
            player(Role::Werewolf, true),
            player(Role::Werewolf, true),
            player(Role::Villager, true),
            player(Role::Doctor, true),
        ];
        assert_eq!(evaluate_win(&players), Some(WinState::Werewolves));
    }

    #[test]
    fn two_survivors_with_a_wolf_forces_a_werewolf_win() {
        let players = vec![
            host(),
            player(Role::Werewolf, true),
            player(Role::Villager, true),
            player(Role::Villager, false),
            player(Role::Doctor, false),
        ];
        assert_eq!(evaluate_win(&players), Some(WinState::Werewolves));
    }

    #[test]
    fn outnumbered_wolves_keep_the_game_going() {
        let players = vec![
            host(),
            player(Role::Werewolf, true),
            player(Role::Villager, true),
            player(Role::Villager, true),
            player(Role::Doctor, true),
        ];
        assert_eq!(evaluate_win(&players), None);
    }

    #[test]
    fn host_is_excluded_from_every_count() {
        // 1 wolf vs 1 other: without the host exclusion the host would tip
        // the balance back to the villagers
        let players = vec![
            host(),
            player(Role::Werewolf, true),
            player(Role::Villager, true),
        ];
        assert_eq!(evaluate_win(&players), Some(WinState::Werewolves));
    }

    #[test]
    fn dead_players_do_not_count() {
        let players = vec![
            host(),
            player(Role::Werewolf, true),
            player(Role::Werewolf, false),
            player(Role::Villager, true),
            player(Role::Villager, true),
            player(Role::Police, true),
        ];
        assert_eq!(evaluate_win(&players), None);
    }
}
