use super::state::{NekoState, StateKind, Wall, MOVING_STATES, RESTING_STATES};
use crate::color::Color;
use crate::random::RandomSource;
use std::cmp::Ordering;
use std::time::{Duration, Instant};

/// Divisor turning an identity color into a sub-pixel z-order tie breaker
const SORT_KEY_COLOR_DIVISOR: f64 = 0xF0_0000 as f64;

/// Tunables shared by every Neko on a display
#[derive(Clone, Debug, PartialEq)]
pub struct NekoSettings {
    /// Width and height of a sprite tile in pixels
    pub tile_size: i32,
    /// Pixels moved per animation step
    pub step_size: i32,
    /// One in `stop_chance` animation steps a moving Neko stops to clean or sleep
    pub stop_chance: usize,
    /// One in `start_chance` animation steps a scratching Neko starts moving again
    pub start_chance: usize,
    /// Minimum time spent scratching before moving again
    pub min_scratch_time: Duration,
    /// Minimum time between animation frames
    pub animation_period: Duration,
}

impl Default for NekoSettings {
    fn default() -> Self {
        Self {
            tile_size: 32,
            step_size: 10,
            stop_chance: 30,
            start_chance: 10,
            min_scratch_time: Duration::from_secs(2),
            animation_period: Duration::from_millis(300),
        }
    }
}

/// An autonomous animated cat.
///
/// Call [`Neko::update`] once per tick; afterwards [`Neko::tile_index`] and [`Neko::position`]
/// say what to draw and where.
#[derive(Clone, Debug)]
pub struct Neko {
    name: String,
    settings: NekoSettings,
    display_size: (i32, i32),
    x: i32,
    y: i32,
    state: NekoState,
    tile_index: u16,
    animation_index: usize,
    animation_period: Duration,
    last_animation: Option<Instant>,
    last_state_change: Option<Instant>,
    moving_to: Option<(i32, i32)>,
    fill: Color,
    outline: Color,
}

impl Neko {
    /// Create a sitting Neko in the top left corner of a `display_size` display.
    pub fn new(name: impl Into<String>, settings: NekoSettings, display_size: (i32, i32)) -> Self {
        let state = NekoState::Sitting;
        Self {
            name: name.into(),
            animation_period: settings.animation_period,
            settings,
            display_size,
            x: 0,
            y: 0,
            state,
            tile_index: state.frames()[0],
            animation_index: 0,
            last_animation: None,
            last_state_change: None,
            moving_to: None,
            fill: Color::WHITE,
            outline: Color::BLACK,
        }
    }

    /// Set the fill (identity) and outline colors
    pub fn with_colors(mut self, fill: Color, outline: Color) -> Self {
        self.fill = fill;
        self.outline = outline;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> NekoState {
        self.state
    }

    /// The sprite sheet tile currently shown
    pub fn tile_index(&self) -> u16 {
        self.tile_index
    }

    pub fn animation_index(&self) -> usize {
        self.animation_index
    }

    /// Top left corner of the tile
    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Move the tile, keeping it on the display.
    pub fn set_position(&mut self, x: i32, y: i32) {
        let tile = self.settings.tile_size;
        self.x = x.clamp(0, (self.display_size.0 - tile).max(0));
        self.y = y.clamp(0, (self.display_size.1 - tile).max(0));
    }

    /// Place the tile in the middle of the display.
    pub fn center_on_display(&mut self) {
        let half_tile = self.settings.tile_size / 2;
        self.set_position(self.display_size.0 / 2 - half_tile, self.display_size.1 / 2 - half_tile);
    }

    pub fn center_point(&self) -> (i32, i32) {
        let half_tile = self.settings.tile_size / 2;
        (self.x + half_tile, self.y + half_tile)
    }

    pub fn tile_size(&self) -> i32 {
        self.settings.tile_size
    }

    pub fn display_size(&self) -> (i32, i32) {
        self.display_size
    }

    pub fn is_moving(&self) -> bool {
        self.state.is_moving()
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn outline(&self) -> Color {
        self.outline
    }

    pub fn animation_period(&self) -> Duration {
        self.animation_period
    }

    pub fn set_animation_period(&mut self, period: Duration) {
        self.animation_period = period;
    }

    /// The point this Neko is walking toward, if any
    pub fn moving_to(&self) -> Option<(i32, i32)> {
        self.moving_to
    }

    /// Walk toward `target`, or wander freely when `None`.
    ///
    /// Targets are pulled at least half a tile plus one pixel away from every display edge so
    /// the Neko can always get its tile around them.
    pub fn set_target(&mut self, target: Option<(i32, i32)>) {
        let (width, height) = self.display_size;
        self.moving_to = target.map(|(x, y)| (self.clamp_target(x, width), self.clamp_target(y, height)));
    }

    fn clamp_target(&self, value: i32, bound: i32) -> i32 {
        let margin = self.settings.tile_size / 2 + 1;
        // high edge applied last: on a display narrower than a tile it wins
        let mut clamped = value;
        if clamped < margin {
            clamped = margin;
        }
        if clamped > bound - margin {
            clamped = bound - margin;
        }
        clamped
    }

    /// Draw order key: lower on screen sorts later, the fill color breaks ties.
    pub fn sort_key(&self) -> f64 {
        self.y as f64 + self.fill.to_rgb24() as f64 / SORT_KEY_COLOR_DIVISOR
    }

    /// Switch to `state`, restarting its animation. Switching to the current state does nothing.
    pub fn set_state(&mut self, state: NekoState, now: Instant) {
        if self.state == state {
            return;
        }
        tracing::debug!(neko = %self.name, from = %self.state, to = %state, "state change");
        self.state = state;
        self.animation_index = 0;
        self.tile_index = state.frames()[0];
        self.last_state_change = Some(now);
    }

    /// Advance one tick: steer toward the target, animate, then decide and move if a frame was shown.
    pub fn update<R: RandomSource>(&mut self, now: Instant, rng: &mut R) {
        self.follow_target(now, rng);
        if !self.animate(now) {
            return;
        }
        self.decide(now, rng);
        self.walk(now);
    }

    fn follow_target<R: RandomSource>(&mut self, now: Instant, rng: &mut R) {
        let Some((target_x, target_y)) = self.moving_to else {
            return;
        };

        let tile = self.settings.tile_size;
        let inside_x = self.x < target_x && target_x < self.x + tile;
        let inside_y = self.y < target_y && target_y < self.y + tile;
        if inside_x && inside_y {
            self.set_state(rng.choose(&RESTING_STATES), now);
            self.moving_to = None;
            return;
        }

        let (center_x, center_y) = self.center_point();
        let dead_zone = self.settings.step_size / 2;
        let horizontal = axis_offset(target_x, center_x, dead_zone);
        let vertical = axis_offset(target_y, center_y, dead_zone);
        if let Some(heading) = NekoState::heading(horizontal, vertical) {
            self.set_state(heading, now);
        }
    }

    /// Show the next frame if the animation period has elapsed. Returns whether a frame was shown.
    fn animate(&mut self, now: Instant) -> bool {
        let due = self
            .last_animation
            .is_none_or(|last| last.checked_add(self.animation_period).is_some_and(|next| now > next));
        if !due {
            return false;
        }
        let frames = self.state.frames();
        self.tile_index = frames[self.animation_index];
        self.animation_index = (self.animation_index + 1) % frames.len();
        self.last_animation = Some(now);
        true
    }

    fn decide<R: RandomSource>(&mut self, now: Instant, rng: &mut R) {
        match self.state.kind() {
            StateKind::Moving => {
                if rng.below(self.settings.stop_chance.max(1)) == 0 {
                    self.set_state(rng.choose(&RESTING_STATES), now);
                }
            }
            // sitting shares the scratching rule: linger, then maybe wander off
            StateKind::Stationary | StateKind::Scratching => {
                let dwell = self.settings.min_scratch_time;
                let lingered = self
                    .last_state_change
                    .is_none_or(|changed| changed.checked_add(dwell).is_some_and(|end| now >= end));
                if lingered && rng.below(self.settings.start_chance.max(1)) == 0 {
                    self.set_state(rng.choose(&MOVING_STATES), now);
                }
            }
            StateKind::IdleLong => {
                // the index wrapped: the whole sequence has played
                if self.animation_index == 0 {
                    self.set_state(rng.choose(&MOVING_STATES), now);
                }
            }
        }
    }

    fn walk(&mut self, now: Instant) {
        // both axes use the step of the state before any wall was hit
        let (step_x, step_y) = self.state.step(self.settings.step_size);
        let (width, height) = self.display_size;
        let tile = self.settings.tile_size;
        let threshold = self.settings.step_size;

        match advance_axis(self.x, step_x, width - tile, threshold) {
            Ok(x) => self.x = x,
            Err((x, high)) => {
                self.x = x;
                self.set_state(NekoState::scratching(if high { Wall::Right } else { Wall::Left }), now);
            }
        }
        match advance_axis(self.y, step_y, height - tile, threshold) {
            Ok(y) => self.y = y,
            Err((y, high)) => {
                self.y = y;
                self.set_state(NekoState::scratching(if high { Wall::Bottom } else { Wall::Top }), now);
            }
        }
    }
}

/// Where `target` lies relative to `center` along one axis, ignoring offsets within `dead_zone`.
fn axis_offset(target: i32, center: i32, dead_zone: i32) -> Ordering {
    if target > center + dead_zone {
        Ordering::Greater
    } else if target < center - dead_zone {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// Step `position` by `step` within `[0, limit)`.
///
/// On a collision returns the position pinned one pixel inside the wall, and whether the wall hit
/// is the high one. Positions beyond `threshold` count as being at the high wall.
fn advance_axis(position: i32, step: i32, limit: i32, threshold: i32) -> Result<i32, (i32, bool)> {
    let next = position + step;
    if (0..limit).contains(&next) {
        Ok(next)
    } else if position > threshold {
        Err((limit - 1, true))
    } else {
        Err((1, false))
    }
}
