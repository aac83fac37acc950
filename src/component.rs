//! Component trait - Interface for UI components
//!
//! Each component owns its presentation state, turns key events into
//! Actions and renders itself. State changes flow through `update`.

use crate::action::Action;
use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

/// Trait for UI components
///
/// 1. `handle_key_event` - translate a key into an Action, no side effects
/// 2. `update` - apply an Action, optionally returning a follow-up Action
/// 3. `draw` - render into the given area
pub trait Component {
    /// Called once before the first draw; may return an Action to run
    /// (e.g. the initial fetch)
    fn init(&mut self) -> Result<Option<Action>> {
        Ok(None)
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
