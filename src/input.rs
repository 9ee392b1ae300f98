//! Gesture state machine for freehand strokes.
//!
//! ```text
//!            pointer_down
//!   ┌──────┐ ───────────► ┌─────────┐
//!   │ Idle │              │ Drawing │ ◄── pointer_move (append point)
//!   └──────┘ ◄─────────── └─────────┘
//!             pointer_up
//!             (commit to history)
//! ```
//!
//! Moves and releases that arrive while idle are reported as [`StateError`]
//! so the caller can decide to drop them; they never change state.
use egui::Pos2;

use crate::error::StateError;
use crate::history::StrokeHistory;
use crate::path::{BrushStyle, InProgressPath};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum InputState {
    /// No active gesture
    #[default]
    Idle,
    /// Pointer is down and a stroke is being recorded
    Drawing(InProgressPath),
}

impl InputState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InputState::Idle)
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self, InputState::Drawing(_))
    }

    /// The stroke under the pointer, if any
    pub fn in_progress(&self) -> Option<&InProgressPath> {
        match self {
            InputState::Drawing(path) => Some(path),
            InputState::Idle => None,
        }
    }

    /// Start a stroke. A gesture that never saw its release is committed first.
    pub fn pointer_down(&mut self, pos: Pos2, style: BrushStyle, history: &mut StrokeHistory) {
        if let InputState::Drawing(stale) = std::mem::take(self) {
            log::warn!("Pointer down during an active gesture; committing the previous stroke");
            history.commit(stale.finish());
        }
        *self = InputState::Drawing(InProgressPath::begin(style, pos));
    }

    pub fn pointer_move(&mut self, pos: Pos2) -> Result<(), StateError> {
        match self {
            InputState::Drawing(path) => {
                path.add_point(pos);
                Ok(())
            }
            InputState::Idle => Err(StateError::MoveWhileIdle),
        }
    }

    /// Finish the stroke and push it onto `history`
    pub fn pointer_up(&mut self, history: &mut StrokeHistory) -> Result<(), StateError> {
        match std::mem::take(self) {
            InputState::Drawing(path) => {
                let path = path.finish();
                log::debug!("Committed stroke with {} points", path.len());
                history.commit(path);
                Ok(())
            }
            InputState::Idle => Err(StateError::UpWhileIdle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Color32, pos2};

    fn style() -> BrushStyle {
        BrushStyle::new(Color32::BLUE, 15.0)
    }

    #[test]
    fn test_full_gesture() {
        let mut state = InputState::default();
        let mut history = StrokeHistory::new();

        state.pointer_down(pos2(10.0, 10.0), style(), &mut history);
        assert!(state.is_drawing());
        state.pointer_move(pos2(20.0, 10.0)).unwrap();
        state.pointer_move(pos2(20.0, 20.0)).unwrap();
        assert_eq!(state.in_progress().unwrap().points().len(), 3);
        assert!(history.is_empty());

        state.pointer_up(&mut history).unwrap();
        assert!(state.is_idle());
        assert_eq!(history.len(), 1);
        assert_eq!(
            history.paths()[0].points(),
            &[pos2(10.0, 10.0), pos2(20.0, 10.0), pos2(20.0, 20.0)]
        );
    }

    #[test]
    fn test_idle_events_are_rejected_without_state_change() {
        let mut state = InputState::default();
        let mut history = StrokeHistory::new();

        assert_eq!(state.pointer_move(pos2(1.0, 1.0)), Err(StateError::MoveWhileIdle));
        assert_eq!(state.pointer_up(&mut history), Err(StateError::UpWhileIdle));
        assert!(state.is_idle());
        assert!(history.is_empty());
    }

    #[test]
    fn test_repeated_down_commits_stale_gesture() {
        let mut state = InputState::default();
        let mut history = StrokeHistory::new();

        state.pointer_down(pos2(0.0, 0.0), style(), &mut history);
        state.pointer_move(pos2(5.0, 5.0)).unwrap();
        state.pointer_down(pos2(50.0, 50.0), style(), &mut history);

        assert_eq!(history.len(), 1);
        assert_eq!(history.paths()[0].len(), 2);
        assert_eq!(state.in_progress().unwrap().points(), &[pos2(50.0, 50.0)]);
    }
}
