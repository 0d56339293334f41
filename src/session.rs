//! Shared game session.
//!
//! `Session` owns the one mutable `GameState` of a running game. Mutations
//! are serialised by a "move in progress" flag: a second mutation arriving
//! while one is in flight (including the automated side's thinking delay)
//! fails with `ChessError::MoveInProgress` instead of queueing behind it.
//! Readers always see a whole snapshot; new states are swapped in under the
//! write lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::ai::MoveSelector;
use crate::config::EngineConfig;
use crate::engine::game::GameState;
use crate::engine::types::{ChessError, Move, PieceType, Square};

pub type SharedSession = Arc<Session>;

/// A single game shared between the presentation layer and the automated side.
#[derive(Debug)]
pub struct Session {
    state: RwLock<GameState>,
    busy: AtomicBool,
    config: EngineConfig,
}

/// Clears the busy flag when dropped.
struct MoveGuard<'a> {
    busy: &'a AtomicBool,
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl Session {
    /// New session in the starting position.
    pub fn new(config: EngineConfig) -> SharedSession {
        Self::with_state(config, GameState::new())
    }

    /// Session resuming from an existing snapshot.
    pub fn with_state(config: EngineConfig, state: GameState) -> SharedSession {
        info!(ai_color = %config.ai_color, think_ms = config.ai_think_ms, "session created");
        Arc::new(Session {
            state: RwLock::new(state),
            busy: AtomicBool::new(false),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Is a mutation currently in flight?
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------
    // Readers
    // -----------------------------------------------------------------

    /// Copy of the current state.
    pub async fn snapshot(&self) -> GameState {
        self.state.read().await.clone()
    }

    pub async fn legal_moves_for(&self, from: Square) -> Vec<Square> {
        self.state.read().await.legal_moves_for(from)
    }

    // -----------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------

    /// Apply a move for whichever side is to move.
    pub async fn apply_move(&self, mv: Move) -> Result<GameState, ChessError> {
        let _guard = self.begin("apply_move")?;
        let mut state = self.state.write().await;
        let next = state.apply_move(mv)?;
        *state = next.clone();
        Ok(next)
    }

    /// Complete a pending promotion.
    pub async fn resolve_promotion(&self, kind: PieceType) -> Result<GameState, ChessError> {
        let _guard = self.begin("resolve_promotion")?;
        let mut state = self.state.write().await;
        let next = state.resolve_promotion(kind)?;
        *state = next.clone();
        Ok(next)
    }

    /// Let `selector` move for the automated side after the thinking delay.
    ///
    /// Returns `Ok(None)` without waiting when it is not the automated side's
    /// turn, the game is over, or a promotion is pending.
    pub async fn play_ai_turn(
        &self,
        selector: &dyn MoveSelector,
    ) -> Result<Option<GameState>, ChessError> {
        let _guard = self.begin("play_ai_turn")?;

        {
            let state = self.state.read().await;
            if state.side_to_move() != self.config.ai_color
                || state.is_game_over()
                || state.pending_promotion().is_some()
            {
                return Ok(None);
            }
        }

        // The guard is held across the delay, so the state cannot change.
        if self.config.ai_think_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.ai_think_ms)).await;
        }

        let mut state = self.state.write().await;
        let mv = selector.select_move(&state)?;
        let next = state.apply_move(mv)?;
        debug!(selector = selector.name(), mv = %mv, status = %next.status(), "automated move");
        *state = next.clone();
        Ok(Some(next))
    }

    /// Start a new game in the starting position.
    pub async fn reset(&self) -> Result<GameState, ChessError> {
        let _guard = self.begin("reset")?;
        let fresh = GameState::new();
        *self.state.write().await = fresh.clone();
        info!("session reset");
        Ok(fresh)
    }

    fn begin(&self, op: &'static str) -> Result<MoveGuard<'_>, ChessError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(op, "rejected: another move is in progress");
            return Err(ChessError::MoveInProgress);
        }
        Ok(MoveGuard { busy: &self.busy })
    }
}
