//! Small value types shared by the session and the audio engine.

/// Whether the loaded track is producing audio.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Policy `advance` uses to pick the next track.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlayMode {
    /// Step through the catalog, wrapping at both ends.
    #[default]
    Normal,
    /// Replay the current track.
    Repeat,
    /// Jump to a uniformly random track (possibly the current one).
    Shuffle,
}

impl PlayMode {
    /// The mode after this one in `Normal -> Repeat -> Shuffle -> Normal`.
    pub fn next(self) -> Self {
        match self {
            PlayMode::Normal => PlayMode::Repeat,
            PlayMode::Repeat => PlayMode::Shuffle,
            PlayMode::Shuffle => PlayMode::Normal,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlayMode::Normal => "Normal",
            PlayMode::Repeat => "Repeat",
            PlayMode::Shuffle => "Shuffle",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Identifies one binding. Strictly increasing over the session's lifetime.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(pub u64);

impl Generation {
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

/// Periodic report pushed by a binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Binding that produced this report.
    pub generation: Generation,
    pub position_ms: u64,
    /// 0 while unknown.
    pub duration_ms: u64,
    /// The track played to its end.
    pub did_finish: bool,
}
