use super::{PlaybackSpeed, SEEK_STEP_FRAMES};

/// Keys the replay reacts to, independent of the windowing toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Digit(u8),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackCommand {
    TogglePlay,
    StepBy(i64),
    CycleSpeed,
    SetSpeed(PlaybackSpeed),
}

/// Maps a key press to a playback command. Unmapped keys yield `None`.
pub fn map_key(key: KeyInput) -> Option<PlaybackCommand> {
    match key {
        KeyInput::Space => Some(PlaybackCommand::TogglePlay),
        KeyInput::ArrowLeft => Some(PlaybackCommand::StepBy(-SEEK_STEP_FRAMES)),
        KeyInput::ArrowRight => Some(PlaybackCommand::StepBy(SEEK_STEP_FRAMES)),
        KeyInput::ArrowUp | KeyInput::ArrowDown => Some(PlaybackCommand::CycleSpeed),
        KeyInput::Digit(1) => Some(PlaybackCommand::SetSpeed(PlaybackSpeed::Half)),
        KeyInput::Digit(2) => Some(PlaybackCommand::SetSpeed(PlaybackSpeed::Normal)),
        KeyInput::Digit(3) => Some(PlaybackCommand::SetSpeed(PlaybackSpeed::Double)),
        KeyInput::Digit(4) => Some(PlaybackCommand::SetSpeed(PlaybackSpeed::Quadruple)),
        KeyInput::Digit(_) | KeyInput::Other => None,
    }
}

/// Whether the toolkit's own handling of the key must be suppressed (scrolling on space,
/// widget focus movement on arrows).
pub fn suppresses_default(key: KeyInput) -> bool {
    matches!(
        key,
        KeyInput::Space
            | KeyInput::ArrowLeft
            | KeyInput::ArrowRight
            | KeyInput::ArrowUp
            | KeyInput::ArrowDown
    )
}
