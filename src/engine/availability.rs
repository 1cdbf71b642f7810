use crate::engine::contract::FINAL_ROUND;
use crate::engine::events::{Phase, PlayerView, Snapshot, TurnPhase};
use crate::engine::game::PlayerId;
use serde::{Deserialize, Serialize};

/// The set of commands currently legal for one player, with human-readable
/// hints for the three actions that are blocked for contextual reasons.
/// Derived purely from a snapshot: same snapshot, same answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub can_draw_from_stock: bool,
    pub can_draw_from_discard: bool,
    pub can_lay_down: bool,
    pub can_lay_off: bool,
    pub can_swap_joker: bool,
    pub can_discard: bool,
    pub can_may_i: bool,
    pub can_allow_may_i: bool,
    pub can_claim_may_i: bool,
    pub can_reorder_hand: bool,
    pub has_pending_may_i_request: bool,
    pub should_nudge_discard: bool,
    pub lay_off_hint: Option<String>,
    pub swap_joker_hint: Option<String>,
    pub pickup_discard_hint: Option<String>,
}

fn player_view(snapshot: &Snapshot, player_id: PlayerId) -> Option<&PlayerView> {
    snapshot.players.iter().find(|p| p.id == player_id)
}

/// What `player_id` may do against this snapshot.
pub fn availability(snapshot: &Snapshot, player_id: PlayerId) -> Availability {
    let mut out = Availability::default();
    let Some(me) = player_view(snapshot, player_id) else {
        return out;
    };

    let round_live = matches!(snapshot.phase, Phase::RoundActive | Phase::ResolvingMayI);
    out.can_reorder_hand = round_live && me.hand_count >= 2;

    // While a granted window waits on its winner, the only gameplay command
    // is the winner's claim.
    if snapshot.phase == Phase::ResolvingMayI {
        out.can_claim_may_i = snapshot
            .may_i
            .as_ref()
            .is_some_and(|w| w.granted_to == Some(player_id));
        return out;
    }
    if snapshot.phase != Phase::RoundActive {
        return out;
    }

    let is_current = snapshot
        .players
        .get(snapshot.current_player_index)
        .is_some_and(|p| p.id == player_id);
    let final_round = snapshot.current_round == FINAL_ROUND;

    if is_current {
        match snapshot.turn_phase {
            Some(TurnPhase::AwaitingDraw) => {
                out.can_draw_from_stock = true;
                if me.is_down {
                    out.pickup_discard_hint =
                        Some("You can't pick up the discard once you're down".to_string());
                } else if snapshot.discard_top.is_none() {
                    out.pickup_discard_hint = Some("The discard pile is empty".to_string());
                } else {
                    out.can_draw_from_discard = true;
                }
            }
            Some(TurnPhase::AwaitingAction) => {
                out.can_lay_down = !me.is_down;

                if !me.is_down {
                    out.lay_off_hint =
                        Some("Lay down your contract before laying off".to_string());
                } else if me.laid_down_this_turn {
                    out.lay_off_hint =
                        Some("No laying off on the turn you laid down".to_string());
                } else if final_round {
                    out.lay_off_hint = Some("No laying off in the last round".to_string());
                } else if snapshot.table.is_empty() {
                    out.lay_off_hint = Some("Nothing on the table to lay off on".to_string());
                } else {
                    out.can_lay_off = true;
                }

                let table_has_joker_run =
                    snapshot.table.iter().any(|m| m.has_swappable_joker());
                if me.is_down {
                    out.swap_joker_hint =
                        Some("You can't swap a joker once you're down".to_string());
                } else if !table_has_joker_run {
                    out.swap_joker_hint =
                        Some("No joker in any run on the table".to_string());
                } else {
                    out.can_swap_joker = true;
                }
            }
            Some(TurnPhase::AwaitingDiscard) => {
                out.can_discard = !(final_round && me.is_down && me.hand_count == 1);
                out.should_nudge_discard = true;
            }
            None => {}
        }
    }

    if let Some(window) = &snapshot.may_i {
        let pending_claims = !window.claimants.is_empty();
        if window.current_player_id == player_id {
            out.has_pending_may_i_request =
                pending_claims && !window.current_player_has_drawn;
            out.can_allow_may_i = out.has_pending_may_i_request;
        } else {
            out.can_may_i = window.granted_to.is_none()
                && window.discarder_id != Some(player_id)
                && !me.is_down
                && !window.claimants.contains(&player_id);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::Command;
    use crate::engine::game::Game;

    fn started_game() -> Game {
        let mut game = Game::with_seed(99);
        for name in ["ana", "ben", "cal", "dia"] {
            game.send(Command::AddPlayer { name: name.into() }).unwrap();
        }
        game.send(Command::StartGame).unwrap();
        game
    }

    #[test]
    fn test_current_player_in_draw_phase() {
        let game = started_game();
        let snapshot = game.snapshot();
        let current = snapshot.players[snapshot.current_player_index].id;

        let a = availability(&snapshot, current);
        assert!(a.can_draw_from_stock);
        assert!(a.can_draw_from_discard);
        assert!(!a.can_lay_down);
        assert!(!a.can_discard);
        assert!(!a.can_may_i); // the current player never calls May I?
        assert!(a.can_reorder_hand);
    }

    #[test]
    fn test_bystander_can_call_may_i() {
        let game = started_game();
        let snapshot = game.snapshot();
        let bystander = snapshot.players[3].id;
        assert_ne!(snapshot.current_player_index, 3);

        let a = availability(&snapshot, bystander);
        assert!(a.can_may_i);
        assert!(!a.can_draw_from_stock);
        assert!(!a.can_allow_may_i);
    }

    #[test]
    fn test_action_phase_flags_for_fresh_player() {
        let mut game = started_game();
        game.send(Command::DrawFromStock).unwrap();
        let snapshot = game.snapshot();
        let current = snapshot.players[snapshot.current_player_index].id;

        let a = availability(&snapshot, current);
        assert_eq!(snapshot.turn_phase, Some(TurnPhase::AwaitingAction));
        assert!(a.can_lay_down);
        assert!(!a.can_lay_off);
        assert_eq!(
            a.lay_off_hint.as_deref(),
            Some("Lay down your contract before laying off")
        );
        assert!(!a.can_swap_joker);
        assert_eq!(
            a.swap_joker_hint.as_deref(),
            Some("No joker in any run on the table")
        );
    }

    #[test]
    fn test_discard_phase_nudges() {
        let mut game = started_game();
        game.send(Command::DrawFromStock).unwrap();
        game.send(Command::SkipLayDown).unwrap();
        let snapshot = game.snapshot();
        let current = snapshot.players[snapshot.current_player_index].id;

        let a = availability(&snapshot, current);
        assert!(a.can_discard);
        assert!(a.should_nudge_discard);
        assert!(!a.can_lay_down);
    }

    #[test]
    fn test_pending_request_flags_for_current_player() {
        let mut game = started_game();
        let snapshot = game.snapshot();
        let caller = snapshot.players[3].id;
        game.send(Command::CallMayI { player_id: caller }).unwrap();

        let snapshot = game.snapshot();
        let current = snapshot.players[snapshot.current_player_index].id;
        let a = availability(&snapshot, current);
        assert!(a.has_pending_may_i_request);
        assert!(a.can_allow_may_i);

        // The caller can't pile on a second claim.
        let a = availability(&snapshot, caller);
        assert!(!a.can_may_i);
    }

    #[test]
    fn test_granted_window_parks_everyone_but_the_winner() {
        let mut game = started_game();
        let snapshot = game.snapshot();
        let caller = snapshot.players[3].id;
        game.send(Command::CallMayI { player_id: caller }).unwrap();
        game.send(Command::AllowMayI).unwrap();

        let snapshot = game.snapshot();
        assert_eq!(snapshot.phase, Phase::ResolvingMayI);

        let winner = availability(&snapshot, caller);
        assert!(winner.can_claim_may_i);

        let current = snapshot.players[snapshot.current_player_index].id;
        let parked = availability(&snapshot, current);
        assert!(!parked.can_draw_from_stock);
        assert!(!parked.can_claim_may_i);
        assert!(parked.can_reorder_hand);
    }

    #[test]
    fn test_availability_is_pure() {
        let game = started_game();
        let snapshot = game.snapshot();
        let id = snapshot.players[0].id;
        assert_eq!(availability(&snapshot, id), availability(&snapshot, id));
    }
}
