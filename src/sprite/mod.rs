mod herd;
mod neko;
mod state;

pub use herd::{Herd, HerdSettings, MAX_HERD_SIZE};
pub use neko::{Neko, NekoSettings};
pub use state::{NekoState, StateKind, Wall, MOVING_STATES, RESTING_STATES};
