//! Which track an advance lands on.

use crate::library::Track;

use super::types::{Direction, PlayMode};

/// Where an advance should go.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AdvanceTarget {
    /// Load `catalog[index]`.
    Index(usize),
    /// Reload the current track (repeat mode, current track no longer in the catalog).
    Current,
}

/// Resolve the target of an advance from `current_id`.
///
/// Returns `None` when there is nothing to advance to (empty catalog).
/// `pick` receives the catalog length and must return an index below it.
pub fn resolve_advance(
    catalog: &[Track],
    current_id: &str,
    mode: PlayMode,
    direction: Direction,
    pick: impl FnOnce(usize) -> usize,
) -> Option<AdvanceTarget> {
    let len = catalog.len();
    if len == 0 {
        return None;
    }

    let current_index = catalog.iter().position(|t| t.id == current_id);

    let target = match mode {
        // Independent of direction and of the current index.
        PlayMode::Shuffle => AdvanceTarget::Index(pick(len).min(len - 1)),
        PlayMode::Repeat => match current_index {
            Some(i) => AdvanceTarget::Index(i),
            None => AdvanceTarget::Current,
        },
        PlayMode::Normal => AdvanceTarget::Index(step(current_index, len, direction)),
    };
    Some(target)
}

fn step(current: Option<usize>, len: usize, direction: Direction) -> usize {
    match (direction, current) {
        (Direction::Next, Some(i)) if i + 1 < len => i + 1,
        (Direction::Next, _) => 0,
        (Direction::Previous, Some(i)) if i > 0 => i - 1,
        (Direction::Previous, _) => len - 1,
    }
}
