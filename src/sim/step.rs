/// The turn engine: advances the simulation by one player move.
///
/// Processing order:
///   1. Legality check (terrain, occupancy, reaction lookahead)
///   2. Movement resolution (step → ice slide / bounce → portal)
///   3. Fruit pickup
///   4. Kill resolution
///   5. Reaction scheduling → mirror/mimic group → wall-follower group
///      (kill resolution after each group)
///   6. Goal check
///
/// Legality is decided entirely up front; once a move passes `check_move`
/// the rest of the turn cannot fail, so an illegal move leaves the state
/// untouched.

use std::collections::BTreeSet;

use crate::domain::ai;
use crate::domain::entity::{Direction, Ghost, GhostKind};
use crate::domain::rules::{self, PlayerPath};
use crate::error::{IllegalMove, IllegalReason};
use super::event::{TurnEvent, TurnOutcome};
use super::world::{Phase, Simulation};

/// A move that passed the legality check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePlan {
    pub path: PlayerPath,
    /// Fruit eaten on arrival.
    pub eats: Option<usize>,
}

/// Which ghosts a reaction pass moves.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum ReactionGroup {
    /// Mirror and mimic ghosts (react to the player's direction).
    PlayerReactive,
    WallFollowers,
}

impl ReactionGroup {
    fn contains(self, kind: GhostKind) -> bool {
        match self {
            ReactionGroup::PlayerReactive => kind.reacts_to_player(),
            ReactionGroup::WallFollowers => !kind.reacts_to_player(),
        }
    }
}

/// Running totals for the turn being resolved.
#[derive(Default)]
struct TurnLog {
    events: Vec<TurnEvent>,
    killed: Vec<usize>,
    cost: u32,
}

// ══════════════════════════════════════════════════════════════
// Legality
// ══════════════════════════════════════════════════════════════

impl Simulation {
    /// Would moving `direction` be accepted? Pure: nothing is mutated.
    pub fn check_move(&self, direction: Direction) -> Result<MovePlan, IllegalMove> {
        let illegal = |reason| IllegalMove { direction, reason };

        if self.phase == Phase::Won {
            return Err(illegal(IllegalReason::GameOver));
        }

        let path = rules::resolve_path(&self.board, self.pacman.cell, direction)
            .ok_or(illegal(IllegalReason::Blocked))?;
        let dest = path.destination;
        let eats = self.fruit_at(dest);

        // Cells crossed on the way see the fruit state before the move.
        let active_before = self.active_kind();
        for &cell in &path.transit {
            if self.live_ghosts().any(|g| g.cell == cell && Some(g.kind) != active_before) {
                return Err(illegal(IllegalReason::GhostInPath { cell }));
            }
        }

        // The destination and every reaction see the state after pickup.
        let active_after = eats.map(|i| self.fruits[i].kind).or(active_before);

        if self.threats(active_after).any(|g| g.cell == dest) {
            return Err(illegal(IllegalReason::Occupied { cell: dest }));
        }

        if self.config.protect_active_fruit && eats.is_some() {
            if let Some(kind) = active_before {
                if self.live_ghosts().any(|g| g.kind == kind) {
                    return Err(illegal(IllegalReason::FruitWouldBeWasted { cell: dest }));
                }
            }
        }

        for ghost in self.threats(active_after) {
            if ai::reaction_target(ghost, direction, &self.board) == Some(dest) {
                return Err(illegal(IllegalReason::GhostReaction { ghost: ghost.id, cell: dest }));
            }
        }

        Ok(MovePlan { path, eats })
    }

    /// Live ghosts that are not vulnerable while `active` is the active kind.
    fn threats(&self, active: Option<GhostKind>) -> impl Iterator<Item = &Ghost> + '_ {
        self.live_ghosts().filter(move |g| Some(g.kind) != active)
    }

    /// Directions that currently pass `check_move`.
    pub fn legal_moves(&self) -> BTreeSet<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|&d| self.check_move(d).is_ok())
            .collect()
    }
}

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

impl Simulation {
    /// Apply one player move and every reaction it triggers.
    /// On `Err` the simulation is unchanged.
    pub fn apply(&mut self, direction: Direction) -> Result<TurnOutcome, IllegalMove> {
        let plan = self.check_move(direction)?;
        let mut log = TurnLog::default();

        self.phase = Phase::ResolvingPlayerMove { direction };
        self.resolve_player_move(&plan, &mut log);
        self.resolve_pickup(plan.eats, &mut log);
        self.resolve_kills(&mut log);
        self.schedule_reactions();
        self.resolve_reactions(direction, &mut log);
        self.resolve_goal(&mut log);

        self.turn += 1;
        self.total_cost += u64::from(log.cost);

        Ok(TurnOutcome {
            pacman: self.pacman.cell,
            killed: log.killed,
            goal: self.is_goal(),
            cost: log.cost,
            events: log.events,
        })
    }
}

// ══════════════════════════════════════════════════════════════
// Player movement and pickup
// ══════════════════════════════════════════════════════════════

impl Simulation {
    fn resolve_player_move(&mut self, plan: &MovePlan, log: &mut TurnLog) {
        let path = &plan.path;
        self.pacman.cell = path.destination;
        self.pacman.last_move = Some(path.direction);
        log.cost += self.config.costs.player_move;

        log.events.push(TurnEvent::PlayerMoved {
            from: path.origin,
            to: path.destination,
            direction: path.direction,
        });
        if path.bounced {
            log.events.push(TurnEvent::Bounced { at: path.origin });
        } else if !path.ice.is_empty() {
            log.events.push(TurnEvent::Slid { over: path.ice.clone() });
        }
        if let Some((from, to)) = path.teleport {
            log.events.push(TurnEvent::Teleported { from, to });
        }
    }

    /// Eating a fruit makes it the only active one.
    fn resolve_pickup(&mut self, eats: Option<usize>, log: &mut TurnLog) {
        let Some(id) = eats else { return };
        let fruit = &mut self.fruits[id];
        let Some(at) = fruit.cell.take() else { return };
        self.active_fruit = Some(id);
        log.cost += self.config.costs.eat_fruit;
        log.events.push(TurnEvent::FruitEaten { id, kind: fruit.kind, at });
    }

    /// Vulnerable ghosts sharing Pac-Man's cell die.
    fn resolve_kills(&mut self, log: &mut TurnLog) {
        let Some(active) = self.active_kind() else { return };
        let at = self.pacman.cell;
        for ghost in self.ghosts.iter_mut() {
            if ghost.alive && ghost.kind == active && ghost.cell == at {
                ghost.alive = false;
                log.killed.push(ghost.id);
                log.cost += self.config.costs.kill;
                log.events.push(TurnEvent::GhostKilled { id: ghost.id, kind: ghost.kind, at });
            }
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Ghost reactions
// ══════════════════════════════════════════════════════════════

impl Simulation {
    fn schedule_reactions(&mut self) {
        let ghosts_pending = self.ghosts.iter().any(|g| g.alive && g.kind.reacts_to_player());
        let red_pending = self.ghosts.iter().any(|g| g.alive && !g.kind.reacts_to_player());
        self.phase = Phase::AwaitingGhostReaction { ghosts_pending, red_pending };
    }

    /// Drain the pending flags, one group per pass.
    fn resolve_reactions(&mut self, direction: Direction, log: &mut TurnLog) {
        loop {
            match self.phase {
                Phase::AwaitingGhostReaction { ghosts_pending: true, red_pending } => {
                    self.react(ReactionGroup::PlayerReactive, direction, log);
                    self.phase = Phase::AwaitingGhostReaction { ghosts_pending: false, red_pending };
                }
                Phase::AwaitingGhostReaction { ghosts_pending: false, red_pending: true } => {
                    self.react(ReactionGroup::WallFollowers, direction, log);
                    self.phase = Phase::AwaitingGhostReaction { ghosts_pending: false, red_pending: false };
                }
                _ => break,
            }
            self.resolve_kills(log);
        }
    }

    fn react(&mut self, group: ReactionGroup, direction: Direction, log: &mut TurnLog) {
        let active = self.active_kind();
        let pacman = self.pacman.cell;

        for ghost in self.ghosts.iter_mut().filter(|g| g.alive && group.contains(g.kind)) {
            let vulnerable = active == Some(ghost.kind);
            let from = ghost.cell;
            let target = ai::reaction_target(ghost, direction, &self.board);

            // A non-vulnerable ghost never steps onto Pac-Man.
            if target == Some(pacman) && !vulnerable {
                log.events.push(TurnEvent::GhostHeld { id: ghost.id, at: from });
                continue;
            }

            if let Some(route) = ghost.route.as_mut() {
                route.advance();
                log.cost += self.config.costs.red_move;
            }

            match target {
                Some(to) => {
                    ghost.cell = to;
                    log.events.push(TurnEvent::GhostMoved { id: ghost.id, from, to });
                }
                None => log.events.push(TurnEvent::GhostHeld { id: ghost.id, at: from }),
            }
        }
    }

    fn resolve_goal(&mut self, log: &mut TurnLog) {
        if self.ghosts.iter().all(|g| !g.alive) {
            self.phase = Phase::Won;
            log.events.push(TurnEvent::Won);
        } else {
            self.phase = Phase::AwaitingPlayerMove;
        }
    }
}
