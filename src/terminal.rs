use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{self, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, BeginSynchronizedUpdate, EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen},
};
use neko::{Color, Neko, NekoState, Scene};
use std::io::{self, Stdout, Write};

/// Puts the terminal into raw mode on the alternate screen and restores it on drop.
pub struct TermGuard {
    out: Stdout,
}

impl TermGuard {
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(out, EnterAlternateScreen, EnableMouseCapture, cursor::Hide, cursor::MoveTo(0, 0))?;
        Ok(Self { out })
    }

    pub fn out(&mut self) -> &mut Stdout {
        &mut self.out
    }
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Maps the scene's display onto terminal cells. The bottom row shows the spectrum.
pub struct Viewport {
    display: (i32, i32),
    columns: u16,
    rows: u16,
}

impl Viewport {
    pub fn new(display: (i32, i32), (columns, rows): (u16, u16)) -> Self {
        Self { display, columns: columns.max(1), rows: rows.max(2) }
    }

    /// Rows available to the display, leaving one for the spectrum bar
    fn display_rows(&self) -> u16 {
        self.rows - 1
    }

    /// The cell covering display point `(x, y)`
    pub fn to_cell(&self, (x, y): (i32, i32)) -> (u16, u16) {
        let column = (x.max(0) as i64 * self.columns as i64 / self.display.0.max(1) as i64) as u16;
        let row = (y.max(0) as i64 * self.display_rows() as i64 / self.display.1.max(1) as i64) as u16;
        (column.min(self.columns - 1), row.min(self.display_rows() - 1))
    }

    /// The display point in the middle of a cell, or `None` for the spectrum bar
    pub fn to_point(&self, column: u16, row: u16) -> Option<(i32, i32)> {
        if row >= self.display_rows() || column >= self.columns {
            return None;
        }
        let x = (2 * column as i64 + 1) * self.display.0 as i64 / (2 * self.columns as i64);
        let y = (2 * row as i64 + 1) * self.display.1 as i64 / (2 * self.display_rows() as i64);
        Some((x as i32, y as i32))
    }
}

/// One character standing in for a sprite tile
pub fn glyph(neko: &Neko) -> char {
    match neko.state() {
        NekoState::Sitting => '@',
        NekoState::MovingUp => '^',
        NekoState::MovingDown => 'v',
        NekoState::MovingLeft => '<',
        NekoState::MovingRight => '>',
        NekoState::MovingUpLeft | NekoState::MovingDownRight => '\\',
        NekoState::MovingUpRight | NekoState::MovingDownLeft => '/',
        NekoState::ScratchingLeft | NekoState::ScratchingRight => '|',
        NekoState::ScratchingUp | NekoState::ScratchingDown => '=',
        NekoState::Cleaning => if neko.tile_index() % 2 == 0 { '~' } else { '-' },
        NekoState::Sleeping => if neko.tile_index() < 5 { 'z' } else { 'Z' },
    }
}

fn rgb(color: Color) -> style::Color {
    style::Color::Rgb { r: color.r, g: color.g, b: color.b }
}

/// Draw one frame of `scene`.
pub fn draw<W: Write>(out: &mut W, scene: &Scene, viewport: &Viewport) -> io::Result<()> {
    let level = scene.power().level();
    let background = scene.power().background().scaled(level);

    queue!(out, BeginSynchronizedUpdate, SetBackgroundColor(rgb(background)))?;
    for row in 0..viewport.display_rows() {
        queue!(out, cursor::MoveTo(0, row), Print(" ".repeat(viewport.columns as usize)))?;
    }

    for neko in scene.herd().draw_order() {
        let (column, row) = viewport.to_cell(neko.center_point());
        queue!(
            out,
            cursor::MoveTo(column, row),
            SetForegroundColor(rgb(neko.fill().scaled(level))),
            Print(glyph(neko))
        )?;
    }

    if let Some(dot) = scene.herd().laser_dot() {
        let (column, row) = viewport.to_cell(dot);
        let color = scene.laser_dot_color().scaled(level);
        queue!(out, cursor::MoveTo(column, row), SetForegroundColor(rgb(color)), Print('*'))?;
    }

    // spectrum bar, with the indicator in the last cell
    let spectrum = scene.power().spectrum();
    let bar = viewport.columns - 1;
    queue!(out, cursor::MoveTo(0, viewport.display_rows()))?;
    for column in 0..bar {
        let color = Color::from_rgb24(spectrum.color(column as f64 / bar as f64));
        queue!(out, SetBackgroundColor(rgb(color)), Print(' '))?;
    }
    queue!(out, SetBackgroundColor(rgb(scene.power().indicator())), Print(' '))?;

    queue!(out, ResetColor, EndSynchronizedUpdate)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use neko::NekoSettings;

    #[test]
    fn test_cell_mapping() {
        let viewport = Viewport::new((320, 240), (80, 25));
        assert_eq!(viewport.to_cell((0, 0)), (0, 0));
        assert_eq!(viewport.to_cell((160, 120)), (40, 12));
        assert_eq!(viewport.to_cell((319, 239)), (79, 23));
        assert_eq!(viewport.to_cell((400, -5)), (79, 0));
    }

    #[test]
    fn test_point_mapping() {
        let viewport = Viewport::new((320, 240), (80, 25));
        assert_eq!(viewport.to_point(0, 0), Some((2, 5)));
        assert_eq!(viewport.to_point(40, 12), Some((162, 125)));
        // spectrum bar
        assert_eq!(viewport.to_point(10, 24), None);
        let point = viewport.to_point(33, 7).expect("inside display");
        assert_eq!(viewport.to_cell(point), (33, 7));
    }

    #[test]
    fn test_glyph() {
        let mut neko = Neko::new("neko", NekoSettings::default(), (320, 240));
        assert_eq!(glyph(&neko), '@');
        neko.set_state(NekoState::MovingLeft, std::time::Instant::now());
        assert_eq!(glyph(&neko), '<');
    }

    #[test]
    fn test_draw_shows_indicator() {
        let t0 = std::time::Instant::now();
        let mut rng = fastrand::Rng::with_seed(7);
        let mut scene = Scene::from_config(&neko::Config::default(), t0, &mut rng).expect("failed to build");
        for _ in 0..20 {
            scene.update(t0, &mut rng);
        }
        // 0x007070 at 0.2 brightness and 0.2 indicator scale
        assert_eq!(scene.power().indicator(), Color::new(0, 4, 4));

        let mut out = Vec::new();
        draw(&mut out, &scene, &Viewport::new((320, 240), (40, 12))).expect("failed to draw");
        let frame = String::from_utf8_lossy(&out);
        assert!(frame.contains("48;2;0;4;4m"), "{frame}");
        assert!(frame.contains("48;2;0;112;112m"), "{frame}");
    }
}
