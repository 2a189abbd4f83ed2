use crate::color::{Color, Spectrum};
use crate::random::RandomSource;
use std::time::{Duration, Instant};

/// Screensaver phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum PowerState {
    /// Full brightness, waiting for the active time to run out
    Active,
    /// Ramping brightness down
    Dim,
    /// Dark, waiting for the sleep time to run out or a touch
    Dimmed,
    /// Ramping brightness back up
    Restore,
}

/// Screensaver timing and brightness limits
#[derive(Clone, Debug, PartialEq)]
pub struct PowerSettings {
    /// Brightness while active, in `[0, 1]`
    pub max_brightness: f32,
    /// Brightness change per tick while ramping
    pub brightness_step: f32,
    /// How long the display stays bright without a touch
    pub active_time: Duration,
    /// How long the display stays dark before waking on its own
    pub sleep_time: Duration,
    /// Fraction of the brightness applied to the indicator color
    pub indicator_scale: f32,
}

impl Default for PowerSettings {
    fn default() -> Self {
        Self {
            max_brightness: 0.2,
            brightness_step: 0.01,
            active_time: Duration::from_secs(60),
            sleep_time: Duration::from_secs(120),
            indicator_scale: 0.2,
        }
    }
}

/// Dims the display after a period without touches, picking a fresh background color
/// from a spectrum each time it goes dark.
#[derive(Clone, Debug)]
pub struct PowerController {
    settings: PowerSettings,
    spectrum: Spectrum,
    state: PowerState,
    brightness: f32,
    state_start: Instant,
    background: Color,
}

impl PowerController {
    /// Start active at full brightness.
    pub fn new(settings: PowerSettings, spectrum: Spectrum, background: Color, now: Instant) -> Self {
        let brightness = settings.max_brightness;
        Self {
            settings,
            spectrum,
            state: PowerState::Active,
            brightness,
            state_start: now,
            background,
        }
    }

    /// Start dark and fade in.
    pub fn fading_in(settings: PowerSettings, spectrum: Spectrum, background: Color, now: Instant) -> Self {
        Self {
            state: PowerState::Restore,
            brightness: 0.0,
            ..Self::new(settings, spectrum, background, now)
        }
    }

    /// Advance one tick.
    pub fn update<R: RandomSource>(&mut self, now: Instant, rng: &mut R) {
        let elapsed = now.saturating_duration_since(self.state_start);
        if self.state == PowerState::Active && elapsed >= self.settings.active_time {
            self.transition(PowerState::Dim);
        }
        // a dark period too long to represent never ends on its own
        let wake_after = self.settings.active_time.checked_add(self.settings.sleep_time);
        if self.state == PowerState::Dimmed && wake_after.is_some_and(|wake_after| elapsed >= wake_after) {
            self.transition(PowerState::Restore);
        }

        match self.state {
            PowerState::Dim => self.dim(rng),
            PowerState::Restore => self.restore(now),
            PowerState::Active | PowerState::Dimmed => {}
        }
    }

    fn dim<R: RandomSource>(&mut self, rng: &mut R) {
        let step = self.settings.brightness_step;
        let next = self.brightness - step;
        // snap within half a step so float drift cannot add a tick
        self.brightness = if next < step / 2.0 { 0.0 } else { next };
        if self.brightness == 0.0 {
            self.background = Color::from_rgb24(self.spectrum.color(rng.unit()));
            tracing::debug!(background = %self.background, "new background");
            self.transition(PowerState::Dimmed);
        }
    }

    fn restore(&mut self, now: Instant) {
        let step = self.settings.brightness_step;
        let max = self.settings.max_brightness;
        let next = self.brightness + step;
        self.brightness = if next > max - step / 2.0 { max } else { next };
        if self.brightness == max {
            self.state_start = now;
            self.transition(PowerState::Active);
        }
    }

    fn transition(&mut self, state: PowerState) {
        tracing::debug!(from = %self.state, to = %state, brightness = self.brightness, "power state change");
        self.state = state;
    }

    /// Register a touch. Returns whether the touch should also reach the sprites.
    ///
    /// A touch while dimming or dark only wakes the display. Otherwise it restarts the active timer.
    pub fn touch(&mut self, now: Instant) -> bool {
        match self.state {
            PowerState::Dim | PowerState::Dimmed => {
                self.transition(PowerState::Restore);
                false
            }
            PowerState::Active | PowerState::Restore => {
                self.state_start = now;
                true
            }
        }
    }

    pub fn state(&self) -> PowerState {
        self.state
    }

    /// Current display brightness in `[0, max_brightness]`
    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Brightness relative to the configured maximum, in `[0, 1]`
    pub fn level(&self) -> f32 {
        if self.settings.max_brightness > 0.0 { self.brightness / self.settings.max_brightness } else { 0.0 }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// The ambient indicator color: the background dimmed along with the display
    pub fn indicator(&self) -> Color {
        self.background.scaled(self.brightness * self.settings.indicator_scale)
    }

    pub fn spectrum(&self) -> &Spectrum {
        &self.spectrum
    }

    pub fn settings(&self) -> &PowerSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::SpectrumMode;
    use crate::random::ScriptedRandom;

    const BACKGROUND: Color = Color::new(0x00, 0x70, 0x70);

    fn spectrum() -> Spectrum {
        let colors = [0xFF0000, 0x00FF00, 0x0000FF].map(Color::from_rgb24);
        Spectrum::new(&colors, SpectrumMode::Normal, 1.0).expect("failed to build")
    }

    fn controller(now: Instant) -> PowerController {
        PowerController::new(PowerSettings::default(), spectrum(), BACKGROUND, now)
    }

    /// Tick once per frame until `state` is reached, returning the number of ticks
    fn ticks_until(
        controller: &mut PowerController,
        state: PowerState,
        now: Instant,
        rng: &mut ScriptedRandom,
    ) -> usize {
        for tick in 1..=1000 {
            controller.update(now, rng);
            if controller.state() == state {
                return tick;
            }
        }
        panic!("never reached {state}");
    }

    #[test]
    fn test_stays_active_until_timeout() {
        let t0 = Instant::now();
        let mut rng = ScriptedRandom::default();
        let mut controller = controller(t0);
        controller.update(t0 + Duration::from_secs(59), &mut rng);
        assert_eq!(controller.state(), PowerState::Active);
        assert_eq!(controller.brightness(), 0.2);
    }

    #[test]
    fn test_dims_to_dark_and_picks_background() {
        let t0 = Instant::now();
        // index 0 of the spectrum is its first color
        let mut rng = ScriptedRandom::default().with_units([0.0]);
        let mut controller = controller(t0);
        let now = t0 + Duration::from_secs(60);

        controller.update(now, &mut rng);
        assert_eq!(controller.state(), PowerState::Dim);
        assert!((controller.brightness() - 0.19).abs() < 1e-6);

        let remaining = ticks_until(&mut controller, PowerState::Dimmed, now, &mut rng);
        assert_eq!(remaining, 19);
        assert_eq!(controller.brightness(), 0.0);
        assert_eq!(controller.background(), Color::from_rgb24(0xFF0000));
        assert_eq!(controller.indicator(), Color::BLACK);
    }

    #[test]
    fn test_wakes_after_sleep_time() {
        let t0 = Instant::now();
        let mut rng = ScriptedRandom::default();
        let mut controller = controller(t0);
        ticks_until(&mut controller, PowerState::Dimmed, t0 + Duration::from_secs(60), &mut rng);

        controller.update(t0 + Duration::from_secs(179), &mut rng);
        assert_eq!(controller.state(), PowerState::Dimmed);

        let wake = t0 + Duration::from_secs(180);
        controller.update(wake, &mut rng);
        assert_eq!(controller.state(), PowerState::Restore);
        assert!((controller.brightness() - 0.01).abs() < 1e-6);

        let remaining = ticks_until(&mut controller, PowerState::Active, wake, &mut rng);
        assert_eq!(remaining, 19);
        assert_eq!(controller.brightness(), 0.2);

        // the active timer restarted when brightness was restored
        controller.update(wake + Duration::from_secs(59), &mut rng);
        assert_eq!(controller.state(), PowerState::Active);
    }

    #[test]
    fn test_touch_while_dimming_restores() {
        let t0 = Instant::now();
        let mut rng = ScriptedRandom::default();
        let mut controller = controller(t0);
        controller.update(t0 + Duration::from_secs(60), &mut rng);
        assert_eq!(controller.state(), PowerState::Dim);

        assert!(!controller.touch(t0 + Duration::from_secs(61)));
        assert_eq!(controller.state(), PowerState::Restore);
    }

    #[test]
    fn test_touch_while_dark_restores() {
        let t0 = Instant::now();
        let mut rng = ScriptedRandom::default();
        let mut controller = controller(t0);
        ticks_until(&mut controller, PowerState::Dimmed, t0 + Duration::from_secs(60), &mut rng);
        assert!(!controller.touch(t0 + Duration::from_secs(70)));
        assert_eq!(controller.state(), PowerState::Restore);
    }

    #[test]
    fn test_touch_while_active_restarts_timer() {
        let t0 = Instant::now();
        let mut rng = ScriptedRandom::default();
        let mut controller = controller(t0);
        assert!(controller.touch(t0 + Duration::from_secs(30)));
        controller.update(t0 + Duration::from_secs(60), &mut rng);
        assert_eq!(controller.state(), PowerState::Active);
        controller.update(t0 + Duration::from_secs(90), &mut rng);
        assert_eq!(controller.state(), PowerState::Dim);
    }

    #[test]
    fn test_fading_in() {
        let t0 = Instant::now();
        let mut rng = ScriptedRandom::default();
        let mut controller = PowerController::fading_in(PowerSettings::default(), spectrum(), BACKGROUND, t0);
        assert_eq!(controller.state(), PowerState::Restore);
        assert_eq!(controller.brightness(), 0.0);
        assert_eq!(controller.level(), 0.0);
        assert_eq!(ticks_until(&mut controller, PowerState::Active, t0, &mut rng), 20);
        assert_eq!(controller.level(), 1.0);
    }

    #[test]
    fn test_indicator_follows_brightness() {
        let controller = controller(Instant::now());
        // 0.2 * 0.2 = 0.04 of 0x70 truncates to 4
        assert_eq!(controller.indicator(), Color::new(0, 4, 4));
    }

    #[test]
    fn test_unrepresentable_sleep_time_never_wakes() {
        let t0 = Instant::now();
        let mut rng = ScriptedRandom::default();
        let settings = PowerSettings {
            active_time: Duration::from_secs(1),
            sleep_time: Duration::MAX,
            ..Default::default()
        };
        let mut controller = PowerController::new(settings, spectrum(), BACKGROUND, t0);
        ticks_until(&mut controller, PowerState::Dimmed, t0 + Duration::from_secs(1), &mut rng);
        controller.update(t0 + Duration::from_secs(3600), &mut rng);
        assert_eq!(controller.state(), PowerState::Dimmed);
    }
}
