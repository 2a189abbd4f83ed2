use crate::color::Color;
use crate::config::{Config, ConfigError};
use crate::power::PowerController;
use crate::random::RandomSource;
use crate::sprite::Herd;
use std::time::Instant;

/// A herd of Nekos on a display that dims itself when nobody is around.
///
/// This is what a host loop drives: call [`Scene::update`] every frame and forward touches to
/// [`Scene::touch`].
#[derive(Clone, Debug)]
pub struct Scene {
    herd: Herd,
    power: PowerController,
    laser_dot_color: Color,
}

impl Scene {
    pub fn new(herd: Herd, power: PowerController, laser_dot_color: Color) -> Self {
        Self { herd, power, laser_dot_color }
    }

    /// Build the herd and screensaver described by `config`. The display starts dark and fades in.
    pub fn from_config<R: RandomSource>(config: &Config, now: Instant, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        let herd = Herd::new(&config.neko_settings(), &config.herd_settings(), config.display_size(), rng);
        let power = PowerController::fading_in(
            config.power_settings(),
            config.build_spectrum()?,
            config.display.background_color,
            now,
        );
        let (width, height) = config.display_size();
        tracing::info!(nekos = herd.len(), width, height, "scene created");
        Ok(Self::new(herd, power, config.herd.laser_dot_color))
    }

    /// Advance the sprites and the screensaver by one tick.
    pub fn update<R: RandomSource>(&mut self, now: Instant, rng: &mut R) {
        self.herd.update(now, rng);
        self.power.update(now, rng);
    }

    /// Route a touch at display coordinates `point`.
    ///
    /// Touches inside the cooldown are dropped. A touch on a dark display only wakes it; otherwise
    /// it keeps the display awake and sends the home Neko after it. Returns whether the home Neko
    /// was given a new target.
    pub fn touch(&mut self, point: (i32, i32), now: Instant) -> bool {
        if !self.herd.touch_ready(now) {
            return false;
        }
        if !self.power.touch(now) {
            tracing::debug!("touch woke the display");
            return false;
        }
        self.herd.touch(point, now)
    }

    pub fn herd(&self) -> &Herd {
        &self.herd
    }

    pub fn herd_mut(&mut self) -> &mut Herd {
        &mut self.herd
    }

    pub fn power(&self) -> &PowerController {
        &self.power
    }

    pub fn laser_dot_color(&self) -> Color {
        self.laser_dot_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::PowerState;
    use crate::random::ScriptedRandom;
    use crate::sprite::Neko;
    use std::time::Duration;

    fn scene(now: Instant) -> Scene {
        let config = Config::from_yaml("herd:\n  quantity: 2\n").expect("failed to parse");
        Scene::from_config(&config, now, &mut ScriptedRandom::always(1)).expect("failed to build")
    }

    #[test]
    fn test_from_config() {
        let scene = scene(Instant::now());
        assert_eq!(scene.herd().len(), 2);
        assert_eq!(scene.power().state(), PowerState::Restore);
        assert_eq!(scene.power().background(), Color::from_rgb24(0x007070));
        assert_eq!(scene.laser_dot_color(), Color::from_rgb24(0xFF0000));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = Config::default();
        config.sprite.tile_size = 0;
        let result = Scene::from_config(&config, Instant::now(), &mut ScriptedRandom::default());
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_touch_sends_home_neko() {
        let t0 = Instant::now();
        let mut scene = scene(t0);
        assert!(scene.touch((40, 50), t0));
        assert_eq!(scene.herd().home().and_then(Neko::moving_to), Some((40, 50)));
        assert_eq!(scene.herd().laser_dot(), Some((40, 50)));
    }

    #[test]
    fn test_touch_while_dark_only_wakes() {
        let t0 = Instant::now();
        let mut rng = ScriptedRandom::always(1);
        let mut scene = scene(t0);
        for _ in 0..20 {
            scene.update(t0, &mut rng);
        }
        assert_eq!(scene.power().state(), PowerState::Active);
        let late = t0 + Duration::from_secs(60);
        for _ in 0..20 {
            scene.update(late, &mut rng);
        }
        assert_eq!(scene.power().state(), PowerState::Dimmed);

        let touched = late + Duration::from_secs(1);
        assert!(!scene.touch((40, 50), touched));
        assert_eq!(scene.power().state(), PowerState::Restore);
        assert_eq!(scene.herd().home().and_then(Neko::moving_to), None);

        // the waking touch did not start the cooldown
        assert!(scene.touch((40, 50), touched));
        assert_eq!(scene.herd().home().and_then(Neko::moving_to), Some((40, 50)));
    }

    #[test]
    fn test_touch_cooldown_applies_before_wake() {
        let t0 = Instant::now();
        let mut scene = scene(t0);
        assert!(scene.touch((40, 50), t0));
        assert!(!scene.touch((80, 50), t0 + Duration::from_millis(50)));
        assert_eq!(scene.herd().laser_dot(), Some((40, 50)));
    }

    #[test]
    fn test_huge_sleep_time_keeps_display_dark() {
        let t0 = Instant::now();
        let mut rng = ScriptedRandom::always(1);
        // active plus sleep time is past the largest representable duration
        let config = Config::from_yaml("display:\n  active_time: 1\n  sleep_time: 1.0e30\n").expect("failed to parse");
        let mut scene = Scene::from_config(&config, t0, &mut rng).expect("failed to build");
        for _ in 0..20 {
            scene.update(t0, &mut rng);
        }
        for _ in 0..20 {
            scene.update(t0 + Duration::from_secs(1), &mut rng);
        }
        assert_eq!(scene.power().state(), PowerState::Dimmed);
        scene.update(t0 + Duration::from_secs(3600), &mut rng);
        assert_eq!(scene.power().state(), PowerState::Dimmed);
    }
}
