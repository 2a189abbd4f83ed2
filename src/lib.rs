//! Autonomous Neko cat sprites, an n-color spectrum and a dimming screensaver for small displays.
//!
//! [`Scene`] ties a [`Herd`] of Nekos to a [`PowerController`]; a host loop calls
//! [`Scene::update`] every frame, forwards touches and draws what the herd reports.

pub mod color;
pub mod config;
pub mod power;
pub mod random;
pub mod scene;
pub mod sprite;

pub use color::{Color, Spectrum, SpectrumError, SpectrumMode};
pub use config::{Config, ConfigError};
pub use power::{PowerController, PowerSettings, PowerState};
pub use random::RandomSource;
pub use scene::Scene;
pub use sprite::{Herd, HerdSettings, Neko, NekoSettings, NekoState};
