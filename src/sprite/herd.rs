use super::neko::{Neko, NekoSettings};
use crate::color::Color;
use crate::random::RandomSource;
use std::time::{Duration, Instant};

/// Most Nekos a herd holds
pub const MAX_HERD_SIZE: usize = 6;

/// Outlines are the inverted fill dimmed to this fraction
const OUTLINE_BRIGHTNESS: f32 = 0.6;

/// How many Nekos to create and how they look
#[derive(Clone, Debug, PartialEq)]
pub struct HerdSettings {
    /// Number of Nekos, clamped to [`MAX_HERD_SIZE`]
    pub quantity: usize,
    /// Identity colors, one per Neko. Reused from the start when there are fewer colors than Nekos.
    pub colors: Vec<Color>,
    /// Minimum time between accepted touches
    pub touch_cooldown: Duration,
    /// Each Neko's animation period is offset by up to this much in either direction
    pub animation_jitter: Duration,
}

impl Default for HerdSettings {
    fn default() -> Self {
        Self {
            quantity: 5,
            colors: [0x000001, 0x808080, 0xF0A000, 0xF0F000, 0x8080FF].into_iter().map(Color::from_rgb24).collect(),
            touch_cooldown: Duration::from_millis(100),
            animation_jitter: Duration::from_millis(150),
        }
    }
}

/// A group of Nekos sharing a display.
///
/// The first Neko is the home Neko: it is the one that chases touches.
#[derive(Clone, Debug)]
pub struct Herd {
    nekos: Vec<Neko>,
    draw_order: Vec<usize>,
    touch_cooldown: Duration,
    last_touch: Option<Instant>,
    laser_dot: Option<(i32, i32)>,
}

impl Herd {
    /// Create a herd with every Neko sitting in the middle of the display.
    pub fn new<R: RandomSource>(
        neko_settings: &NekoSettings,
        herd_settings: &HerdSettings,
        display_size: (i32, i32),
        rng: &mut R,
    ) -> Self {
        let quantity = herd_settings.quantity.min(MAX_HERD_SIZE);
        let nekos = (0..quantity)
            .map(|index| {
                let fill = match herd_settings.colors.len() {
                    0 => Color::WHITE,
                    count => herd_settings.colors[index % count],
                };
                let outline = fill.inverted().scaled(OUTLINE_BRIGHTNESS);
                let mut neko = Neko::new(format!("neko-{index}"), neko_settings.clone(), display_size)
                    .with_colors(fill, outline);
                neko.center_on_display();
                let period = jittered(neko_settings.animation_period, herd_settings.animation_jitter, rng);
                neko.set_animation_period(period);
                neko
            })
            .collect();

        let mut herd = Self {
            nekos,
            draw_order: Vec::new(),
            touch_cooldown: herd_settings.touch_cooldown,
            last_touch: None,
            laser_dot: None,
        };
        herd.sort();
        herd
    }

    /// Update every Neko, then re-rank them for drawing.
    pub fn update<R: RandomSource>(&mut self, now: Instant, rng: &mut R) {
        for neko in &mut self.nekos {
            neko.update(now, rng);
        }
        if self.home().is_none_or(|home| home.moving_to().is_none()) {
            self.laser_dot = None;
        }
        self.sort();
    }

    fn sort(&mut self) {
        let mut order: Vec<usize> = (0..self.nekos.len()).collect();
        // stable, so equal keys keep their creation order
        order.sort_by(|a, b| self.nekos[*a].sort_key().total_cmp(&self.nekos[*b].sort_key()));
        self.draw_order = order;
    }

    /// Whether a touch at `now` would be past the cooldown
    pub fn touch_ready(&self, now: Instant) -> bool {
        self.last_touch
            .is_none_or(|last| last.checked_add(self.touch_cooldown).is_some_and(|ready| now > ready))
    }

    /// Send the home Neko toward `point`. Returns `false` while the touch cooldown is running.
    pub fn touch(&mut self, point: (i32, i32), now: Instant) -> bool {
        if !self.touch_ready(now) {
            return false;
        }
        self.last_touch = Some(now);
        let Some(home) = self.nekos.first_mut() else {
            return true;
        };
        tracing::trace!(x = point.0, y = point.1, neko = home.name(), "touch");
        home.set_target(Some(point));
        self.laser_dot = Some(point);
        true
    }

    pub fn nekos(&self) -> &[Neko] {
        &self.nekos
    }

    pub fn nekos_mut(&mut self) -> &mut [Neko] {
        &mut self.nekos
    }

    pub fn home(&self) -> Option<&Neko> {
        self.nekos.first()
    }

    /// Nekos back to front: the ones lowest on the display come last so they are drawn on top.
    pub fn draw_order(&self) -> impl Iterator<Item = &Neko> {
        self.draw_order.iter().map(|index| &self.nekos[*index])
    }

    /// Where the touch marker should be drawn, while the home Neko is still chasing it
    pub fn laser_dot(&self) -> Option<(i32, i32)> {
        self.laser_dot
    }

    pub fn len(&self) -> usize {
        self.nekos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nekos.is_empty()
    }
}

/// Offset `period` uniformly within `[-jitter, +jitter)`, never going below zero.
fn jittered<R: RandomSource>(period: Duration, jitter: Duration, rng: &mut R) -> Duration {
    let offset = jitter.as_secs_f64() * (2.0 * rng.unit() - 1.0);
    Duration::try_from_secs_f64((period.as_secs_f64() + offset).max(0.0)).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::ScriptedRandom;
    use crate::sprite::NekoState;

    const DISPLAY: (i32, i32) = (320, 240);

    fn herd(quantity: usize) -> Herd {
        let settings = HerdSettings { quantity, ..Default::default() };
        Herd::new(&NekoSettings::default(), &settings, DISPLAY, &mut ScriptedRandom::always(1))
    }

    #[test]
    fn test_quantity_is_clamped() {
        assert_eq!(herd(10).len(), MAX_HERD_SIZE);
        assert!(herd(0).is_empty());
        assert_eq!(herd(3).len(), 3);
    }

    #[test]
    fn test_nekos_start_centered_with_colors() {
        let herd = herd(6);
        for neko in herd.nekos() {
            assert_eq!(neko.position(), (144, 104));
            assert_eq!(neko.state(), NekoState::Sitting);
        }
        assert_eq!(herd.nekos()[2].fill(), Color::from_rgb24(0xF0A000));
        // the sixth reuses the first color
        assert_eq!(herd.nekos()[5].fill(), Color::from_rgb24(0x000001));
        // inverted 0x000001 is 0xfffffe, dimmed to 60%
        assert_eq!(herd.nekos()[0].outline(), Color::new(153, 153, 152));
    }

    #[test]
    fn test_animation_jitter() {
        let settings = HerdSettings { quantity: 3, ..Default::default() };
        let mut rng = ScriptedRandom::default().with_units([0.0, 0.5, 0.75]);
        let herd = Herd::new(&NekoSettings::default(), &settings, DISPLAY, &mut rng);
        let periods: Vec<u64> = herd
            .nekos()
            .iter()
            .map(|neko| (neko.animation_period().as_secs_f64() * 1000.0).round() as u64)
            .collect();
        assert_eq!(periods, vec![150, 300, 375]);
    }

    #[test]
    fn test_jitter_never_negative() {
        let mut rng = ScriptedRandom::default().with_units([0.0]);
        let period = jittered(Duration::from_millis(100), Duration::from_millis(500), &mut rng);
        assert_eq!(period, Duration::ZERO);
    }

    #[test]
    fn test_draw_order_by_height_then_color() {
        let mut herd = herd(3);
        herd.nekos_mut()[0].set_position(10, 150);
        herd.nekos_mut()[1].set_position(10, 20);
        // same height as the first, brighter fill sorts later
        herd.nekos_mut()[2].set_position(10, 150);
        herd.sort();
        let order: Vec<&str> = herd.draw_order().map(Neko::name).collect();
        assert_eq!(order, vec!["neko-1", "neko-0", "neko-2"]);
    }

    #[test]
    fn test_touch_cooldown() {
        let t0 = Instant::now();
        let mut herd = herd(2);
        assert!(herd.touch((50, 60), t0));
        assert_eq!(herd.home().and_then(Neko::moving_to), Some((50, 60)));
        assert_eq!(herd.laser_dot(), Some((50, 60)));
        assert_eq!(herd.nekos()[1].moving_to(), None);

        assert!(!herd.touch((200, 60), t0 + Duration::from_millis(100)));
        assert_eq!(herd.home().and_then(Neko::moving_to), Some((50, 60)));

        assert!(herd.touch((200, 60), t0 + Duration::from_millis(101)));
        assert_eq!(herd.home().and_then(Neko::moving_to), Some((200, 60)));
    }

    #[test]
    fn test_laser_dot_hidden_after_arrival() {
        let t0 = Instant::now();
        let mut herd = herd(1);
        // inside the home Neko's tile
        herd.touch((160, 120), t0);
        assert_eq!(herd.laser_dot(), Some((160, 120)));
        herd.update(t0, &mut ScriptedRandom::always(1));
        assert_eq!(herd.home().and_then(Neko::moving_to), None);
        assert_eq!(herd.laser_dot(), None);
    }

    #[test]
    fn test_update_moves_every_neko() {
        let t0 = Instant::now();
        let mut herd = herd(3);
        for neko in herd.nekos_mut() {
            neko.set_state(NekoState::MovingDown, t0);
        }
        herd.update(t0, &mut ScriptedRandom::always(1));
        for neko in herd.nekos() {
            assert_eq!(neko.position(), (144, 114));
        }
    }

    #[test]
    fn test_unrepresentable_cooldown_blocks_later_touches() {
        let t0 = Instant::now();
        let settings = HerdSettings { quantity: 1, touch_cooldown: Duration::MAX, ..Default::default() };
        let mut herd = Herd::new(&NekoSettings::default(), &settings, DISPLAY, &mut ScriptedRandom::always(1));
        assert!(herd.touch((50, 60), t0));
        assert!(!herd.touch((80, 60), t0 + Duration::from_secs(3600)));
        assert_eq!(herd.laser_dot(), Some((50, 60)));
    }
}
