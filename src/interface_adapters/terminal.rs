// Crossterm presentation sink.
//
// Each frame is composed into an off-screen `Canvas` first and then written
// with queued commands and a single flush, so the terminal never shows a
// half-drawn frame.

use crate::domain::{AimDirection, Position, PresentationSink, Snapshot};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::{cursor, execute, queue, terminal};
use std::io::{self, Stdout, Write};
use tracing::error;

const CONTROLS_LEGEND: &str = "A/D=Move | W/Q/E/Z/C=Dir | SPACE=Fire | X=Quit";
const AIM_INDICATOR_LENGTH: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Hud,
    Ground,
    Target,
    Rocket,
    Battery,
    Aim,
    Burst,
}

impl Tone {
    fn color(self) -> Color {
        match self {
            Self::Plain => Color::Reset,
            Self::Hud => Color::Cyan,
            Self::Ground => Color::DarkGreen,
            Self::Target => Color::Red,
            Self::Rocket => Color::Yellow,
            Self::Battery => Color::White,
            Self::Aim => Color::Magenta,
            Self::Burst => Color::DarkYellow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub tone: Tone,
}

const BLANK: Cell = Cell {
    glyph: ' ',
    tone: Tone::Plain,
};

/// Off-screen character grid for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![BLANK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Writes one cell; anything outside the grid is clipped.
    pub fn put(&mut self, x: i32, y: i32, glyph: char, tone: Tone) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = Cell { glyph, tone };
        }
    }

    pub fn text(&mut self, x: i32, y: i32, text: &str, tone: Tone) {
        for (offset, glyph) in (x..).zip(text.chars()) {
            self.put(offset, y, glyph, tone);
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    pub fn row(&self, y: usize) -> &[Cell] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    pub fn row_text(&self, y: usize) -> String {
        self.row(y).iter().map(|cell| cell.glyph).collect()
    }
}

pub fn projectile_glyph(direction: AimDirection) -> char {
    match direction {
        AimDirection::Vertical => '|',
        AimDirection::DiagonalLeft => '\\',
        AimDirection::DiagonalRight => '/',
        AimDirection::HorizontalLeft => '<',
        AimDirection::HorizontalRight => '>',
    }
}

/// Composes a full frame from a snapshot.
pub fn compose(snapshot: &Snapshot) -> Canvas {
    let viewport = snapshot.viewport;
    let mut canvas = Canvas::new(
        usize::try_from(viewport.width).unwrap_or_default(),
        usize::try_from(viewport.height).unwrap_or_default(),
    );
    let ground = viewport.ground_row();
    let in_field = |position: Position| viewport.contains(position);

    for x in 0..viewport.width {
        canvas.put(x, ground, '_', Tone::Ground);
    }

    for &actor in snapshot.actors.iter().filter(|&&p| in_field(p)) {
        canvas.put(actor.x, actor.y, 'V', Tone::Target);
    }

    for projectile in snapshot.projectiles.iter().filter(|p| in_field(p.position)) {
        let glyph = projectile_glyph(projectile.direction);
        canvas.put(projectile.position.x, projectile.position.y, glyph, Tone::Rocket);
    }

    draw_battery(&mut canvas, snapshot);

    for marker in snapshot.markers.iter().filter(|m| in_field(m.position)) {
        let Position { x, y } = marker.position;
        for (dx, dy) in [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)] {
            let cell = Position::new(x + dx, y + dy);
            if in_field(cell) {
                canvas.put(cell.x, cell.y, '*', Tone::Burst);
            }
        }
    }

    draw_hud(&mut canvas, snapshot);
    canvas.text(0, viewport.height - 1, CONTROLS_LEGEND, Tone::Hud);
    canvas
}

fn draw_battery(canvas: &mut Canvas, snapshot: &Snapshot) {
    let viewport = snapshot.viewport;
    let ground = viewport.ground_row();
    let column = snapshot.aim.column;

    if column > 0 && column < viewport.width - 1 {
        canvas.put(column - 1, ground, '/', Tone::Battery);
        canvas.put(column + 1, ground, '\\', Tone::Battery);
    }
    canvas.put(column, ground, '^', Tone::Battery);

    let step = snapshot.aim.direction.step();
    let glyph = projectile_glyph(snapshot.aim.direction);
    let mut cursor = Position::new(column, ground);
    for _ in 0..AIM_INDICATOR_LENGTH {
        cursor = cursor.offset(step);
        if viewport.contains(cursor) {
            canvas.put(cursor.x, cursor.y, glyph, Tone::Aim);
        }
    }
}

fn draw_hud(canvas: &mut Canvas, snapshot: &Snapshot) {
    let counters = &snapshot.counters;
    let width = canvas.width();

    let status = format!(
        "Score:{:<6}  Diff:{:<6}  Time:{:>3}s  Ships Rem:{:<3} (spawned:{}/{})",
        counters.score,
        snapshot.difficulty.name(),
        counters.elapsed.as_secs(),
        counters.remaining(),
        counters.spawned,
        counters.total,
    );
    canvas.text(0, 0, &status, Tone::Hud);

    let rocket_column = status.chars().count() + 2;
    let rocket_width = if width > 60 { width / 5 } else { 12 };
    if rocket_column + rocket_width + 18 < width {
        let bar = format!(
            "Rockets:[{}] {}/{}",
            meter(snapshot.bays.loaded, snapshot.bays.total, rocket_width),
            snapshot.bays.loaded,
            snapshot.bays.total,
        );
        canvas.text(rocket_column as i32, 0, &bar, Tone::Hud);
    }

    let accuracy = counters.accuracy();
    let accuracy_width = if width > 40 { width / 4 } else { 18 };
    // Rounded down to whole cells.
    let filled = ((accuracy / 100.0) * accuracy_width as f64) as usize;
    let accuracy_bar = format!(
        "Acc:[{}] {:>3.0}%",
        meter(filled, accuracy_width, accuracy_width),
        accuracy
    );
    canvas.text(0, 1, &accuracy_bar, Tone::Hud);

    let info_column = 12 + accuracy_width;
    let info = if info_column + 30 < width {
        format!(
            "Hits:{} Shots:{}  Streak:{}  Kills:{} Ground:{}",
            counters.hits, counters.shots, counters.streak, counters.destroyed, counters.escaped
        )
    } else {
        format!(
            "H:{} S:{} Stk:{}",
            counters.hits, counters.shots, counters.streak
        )
    };
    canvas.text(info_column as i32, 1, &info, Tone::Hud);
}

fn meter(value: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (value * width / total).min(width)
    };
    let mut bar = "=".repeat(filled);
    bar.push_str(&" ".repeat(width - filled));
    bar
}

/// Raw-mode alternate-screen terminal; restored when dropped.
pub struct TerminalSink {
    out: Stdout,
}

impl TerminalSink {
    pub fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        // No sink exists yet to restore on drop, so undo raw mode by hand.
        enter_or_undo(
            || execute!(out, terminal::EnterAlternateScreen, cursor::Hide),
            terminal::disable_raw_mode,
        )?;
        Ok(Self { out })
    }

    fn write_canvas(&mut self, canvas: &Canvas) -> io::Result<()> {
        for y in 0..canvas.height() {
            queue!(self.out, cursor::MoveTo(0, y as u16))?;
            let mut tone = None;
            let mut run = String::with_capacity(canvas.width());
            for cell in canvas.row(y) {
                if tone != Some(cell.tone) {
                    if let Some(previous) = tone {
                        queue!(self.out, SetForegroundColor(Tone::color(previous)), Print(&run))?;
                        run.clear();
                    }
                    tone = Some(cell.tone);
                }
                run.push(cell.glyph);
            }
            if let Some(last) = tone {
                queue!(self.out, SetForegroundColor(last.color()), Print(&run))?;
            }
        }
        queue!(self.out, ResetColor)?;
        self.out.flush()
    }
}

impl PresentationSink for TerminalSink {
    fn measure(&mut self) -> io::Result<(i32, i32)> {
        let (width, height) = terminal::size()?;
        Ok((i32::from(width), i32::from(height)))
    }

    fn present(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        let canvas = compose(snapshot);
        self.write_canvas(&canvas)
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        if let Err(err) = execute!(self.out, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)
        {
            error!(?err, "failed to leave alternate screen");
        }
        if let Err(err) = terminal::disable_raw_mode() {
            error!(?err, "failed to disable raw mode");
        }
    }
}

fn enter_or_undo<T>(
    enter: impl FnOnce() -> io::Result<T>,
    undo: impl FnOnce() -> io::Result<()>,
) -> io::Result<T> {
    enter().inspect_err(|_| {
        if let Err(err) = undo() {
            error!(?err, "failed to undo terminal setup");
        }
    })
}

/// Sink for runs without a terminal; frames are counted and dropped.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    size: (i32, i32),
    frames: u64,
}

impl HeadlessSink {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            size: (width, height),
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl PresentationSink for HeadlessSink {
    fn measure(&mut self) -> io::Result<(i32, i32)> {
        Ok(self.size)
    }

    fn present(&mut self, _snapshot: &Snapshot) -> io::Result<()> {
        self.frames += 1;
        Ok(())
    }
}
