// This module contains the state and command enums shared by the actuator
// and the cover state machine.

/// Logical position of the cover.
///
/// - Retracted: panel exposed
/// - Extended: panel covered
/// - Moving: only while an actuation sequence is running
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum CoverState {
    Retracted,
    Extended,
    Moving,
}

impl CoverState {
    /// True outside of an actuation sequence
    pub fn is_settled(&self) -> bool {
        matches!(self, CoverState::Retracted | CoverState::Extended)
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Direction {
    Extend,
    Retract,
}

impl Direction {
    /// State the cover is in once travel in this direction completes
    pub fn target_state(&self) -> CoverState {
        match self {
            Direction::Extend => CoverState::Extended,
            Direction::Retract => CoverState::Retracted,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Direction::Extend => "Extending protection...",
            Direction::Retract => "Retracting protection...",
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ActuatorCommand {
    Extend,
    Retract,
    Stop,
}

impl ActuatorCommand {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            ActuatorCommand::Extend => Some(Direction::Extend),
            ActuatorCommand::Retract => Some(Direction::Retract),
            ActuatorCommand::Stop => None,
        }
    }
}

impl From<Direction> for ActuatorCommand {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Extend => ActuatorCommand::Extend,
            Direction::Retract => ActuatorCommand::Retract,
        }
    }
}
