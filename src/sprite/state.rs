use std::cmp::Ordering;

/// Every state a Neko can be in.
///
/// Frame lists are tile indexes into the 32-tile Neko sprite sheet, so they must match its layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
pub enum NekoState {
    Sitting,
    MovingLeft,
    MovingUp,
    MovingRight,
    MovingDown,
    MovingUpRight,
    MovingUpLeft,
    MovingDownLeft,
    MovingDownRight,
    ScratchingLeft,
    ScratchingRight,
    ScratchingDown,
    ScratchingUp,
    Cleaning,
    Sleeping,
}

/// Broad shape of a state, deciding how a Neko leaves it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateKind {
    /// Single frame, no movement
    Stationary,
    /// Walking in one of eight directions
    Moving,
    /// Two frames against a wall
    Scratching,
    /// A long sequence played through once before moving again
    IdleLong,
}

/// A display edge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
    Top,
    Bottom,
}

/// Directional states, in the order random headings are drawn from.
pub const MOVING_STATES: [NekoState; 8] = [
    NekoState::MovingUp,
    NekoState::MovingDown,
    NekoState::MovingLeft,
    NekoState::MovingRight,
    NekoState::MovingUpLeft,
    NekoState::MovingUpRight,
    NekoState::MovingDownLeft,
    NekoState::MovingDownRight,
];

/// States a Neko settles into when it stops or arrives.
pub const RESTING_STATES: [NekoState; 2] = [NekoState::Cleaning, NekoState::Sleeping];

const CLEANING_FRAMES: [u16; 17] = [0, 0, 1, 1, 2, 3, 2, 3, 1, 1, 2, 3, 2, 3, 0, 0, 0];

const SLEEPING_FRAMES: [u16; 27] = [
    0, 0, 4, 4, 4, 0, 0, 4, 4, 4, 0, 0, 5, 6, 5, 6, 5, 6, 5, 6, 5, 6, 7, 7, 0, 0, 0,
];

impl NekoState {
    pub const fn id(self) -> u8 {
        match self {
            Self::Sitting => 0,
            Self::MovingLeft => 1,
            Self::MovingUp => 2,
            Self::MovingRight => 3,
            Self::MovingDown => 4,
            Self::MovingUpRight => 5,
            Self::MovingUpLeft => 6,
            Self::MovingDownLeft => 7,
            Self::MovingDownRight => 8,
            Self::ScratchingLeft => 9,
            Self::ScratchingRight => 10,
            Self::ScratchingDown => 11,
            Self::ScratchingUp => 12,
            Self::Cleaning => 13,
            Self::Sleeping => 14,
        }
    }

    /// Tile indexes of the animation, never empty
    pub const fn frames(self) -> &'static [u16] {
        match self {
            Self::Sitting => &[0],
            Self::MovingLeft => &[20, 21],
            Self::MovingUp => &[16, 17],
            Self::MovingRight => &[12, 13],
            Self::MovingDown => &[8, 9],
            Self::MovingUpRight => &[14, 15],
            Self::MovingUpLeft => &[18, 19],
            Self::MovingDownLeft => &[22, 23],
            Self::MovingDownRight => &[10, 11],
            Self::ScratchingLeft => &[30, 31],
            Self::ScratchingRight => &[26, 27],
            Self::ScratchingDown => &[24, 25],
            Self::ScratchingUp => &[28, 29],
            Self::Cleaning => &CLEANING_FRAMES,
            Self::Sleeping => &SLEEPING_FRAMES,
        }
    }

    /// Pixels moved per animation step for a given step size.
    ///
    /// Diagonals move half a step on each axis, floor-divided.
    pub const fn step(self, step_size: i32) -> (i32, i32) {
        let full = step_size;
        let half = step_size.div_euclid(2);
        let neg_half = (-step_size).div_euclid(2);
        match self {
            Self::MovingLeft => (-full, 0),
            Self::MovingUp => (0, -full),
            Self::MovingRight => (full, 0),
            Self::MovingDown => (0, full),
            Self::MovingUpRight => (half, neg_half),
            Self::MovingUpLeft => (neg_half, neg_half),
            Self::MovingDownLeft => (neg_half, half),
            Self::MovingDownRight => (half, half),
            Self::Sitting
            | Self::ScratchingLeft
            | Self::ScratchingRight
            | Self::ScratchingDown
            | Self::ScratchingUp
            | Self::Cleaning
            | Self::Sleeping => (0, 0),
        }
    }

    pub const fn kind(self) -> StateKind {
        match self {
            Self::Sitting => StateKind::Stationary,
            Self::MovingLeft
            | Self::MovingUp
            | Self::MovingRight
            | Self::MovingDown
            | Self::MovingUpRight
            | Self::MovingUpLeft
            | Self::MovingDownLeft
            | Self::MovingDownRight => StateKind::Moving,
            Self::ScratchingLeft | Self::ScratchingRight | Self::ScratchingDown | Self::ScratchingUp => {
                StateKind::Scratching
            }
            Self::Cleaning | Self::Sleeping => StateKind::IdleLong,
        }
    }

    pub const fn is_moving(self) -> bool {
        matches!(self.kind(), StateKind::Moving)
    }

    pub const fn is_scratching(self) -> bool {
        matches!(self.kind(), StateKind::Scratching)
    }

    pub const fn is_idle_long(self) -> bool {
        matches!(self.kind(), StateKind::IdleLong)
    }

    /// The state for scratching at a wall
    pub const fn scratching(wall: Wall) -> Self {
        match wall {
            Wall::Left => Self::ScratchingLeft,
            Wall::Right => Self::ScratchingRight,
            Wall::Top => Self::ScratchingUp,
            Wall::Bottom => Self::ScratchingDown,
        }
    }

    /// The directional state heading toward a target.
    ///
    /// `horizontal` is `Greater` when the target lies to the right, `vertical` is `Greater` when
    /// it lies below. `None` when the target is aligned on both axes.
    pub const fn heading(horizontal: Ordering, vertical: Ordering) -> Option<Self> {
        use Ordering::*;
        match (horizontal, vertical) {
            (Greater, Greater) => Some(Self::MovingDownRight),
            (Greater, Less) => Some(Self::MovingUpRight),
            (Greater, Equal) => Some(Self::MovingRight),
            (Less, Greater) => Some(Self::MovingDownLeft),
            (Less, Less) => Some(Self::MovingUpLeft),
            (Less, Equal) => Some(Self::MovingLeft),
            (Equal, Greater) => Some(Self::MovingDown),
            (Equal, Less) => Some(Self::MovingUp),
            (Equal, Equal) => None,
        }
    }
}
