/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Project every visible scene block and build the next frame into
///      `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// ## Projection
///
/// Orthographic, looking down -z. One world unit is `scale` rows tall and
/// `2 * scale` columns wide (terminal cells are about twice as tall as they
/// are wide). Blocks are painted back to front by the depth of their center,
/// each as the convex hull of its 8 projected corners.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use glam::{Vec2, Vec3};

use crate::sim::demo::{Demo, MAX_LEVEL};
use crate::sim::scene::Block;
use crate::ui::hud::bar;

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// inter-row gap color matches on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell { ch, fg, bg: Cell::BASE_BG });
        }
    }
}

// ── Projection ──

/// Screen placement of the scene origin and its size in rows per unit.
#[derive(Clone, Copy, Debug)]
struct View {
    origin: Vec2,
    scale: f32,
}

impl View {
    fn project(&self, p: Vec3) -> Vec2 {
        Vec2::new(self.origin.x + p.x * self.scale * 2.0, self.origin.y - p.y * self.scale)
    }
}

/// Convex hull (counter-clockwise in screen space) by monotone chain.
fn hull(points: &[Vec2]) -> Vec<Vec2> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }
    let cross = |o: Vec2, a: Vec2, b: Vec2| (a - o).perp_dot(b - o);
    let mut lower: Vec<Vec2> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<Vec2> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Point-in-convex-polygon; boundary counts as inside.
fn inside(poly: &[Vec2], p: Vec2) -> bool {
    if poly.len() < 3 {
        return false;
    }
    (0..poly.len()).all(|i| {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        (b - a).perp_dot(p - a) >= 0.0
    })
}

fn material_color(material: &str) -> Color {
    match material {
        "tgreen" => Color::Rgb { r: 70, g: 200, b: 90 },
        "tblue" => Color::Rgb { r: 80, g: 130, b: 230 },
        "tred" => Color::Rgb { r: 210, g: 60, b: 60 },
        _ => Color::Grey,
    }
}

/// Darken far blocks a little so stacked cells stay readable.
fn shade(color: Color, depth: f32) -> Color {
    match color {
        Color::Rgb { r, g, b } => {
            let k = (0.75 + depth * 0.5).clamp(0.4, 1.0);
            Color::Rgb { r: (r as f32 * k) as u8, g: (g as f32 * k) as u8, b: (b as f32 * k) as u8 }
        }
        other => other,
    }
}

// ── Renderer ──

/// Rows reserved above and below the trooper area.
const TOP_ROWS: usize = 2;
const BOTTOM_ROWS: usize = 6;
const BAR_WIDTH: usize = 30;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// Key release events were requested from the terminal.
    keyboard_enhanced: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            keyboard_enhanced: false,
        }
    }

    pub fn keyboard_enhanced(&self) -> bool {
        self.keyboard_enhanced
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            let flags = KeyboardEnhancementFlags::REPORT_EVENT_TYPES;
            self.keyboard_enhanced = execute!(self.writer, PushKeyboardEnhancementFlags(flags)).is_ok();
        }

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame.
        self.back.cells.fill(Cell::INVALID);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.keyboard_enhanced = false;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, demo: &Demo) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose_trooper(demo);
        self.compose_hud(demo);

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        queue!(self.writer, SetForegroundColor(Color::White), SetBackgroundColor(Cell::BASE_BG))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn view(&self) -> View {
        let rows = self.term_h.saturating_sub(TOP_ROWS + BOTTOM_ROWS).max(1) as f32;
        let cols = self.term_w as f32 / 2.0;
        View {
            origin: Vec2::new(self.term_w as f32 / 2.0, TOP_ROWS as f32 + rows / 2.0),
            scale: rows.min(cols) * 0.55,
        }
    }

    fn compose_trooper(&mut self, demo: &Demo) {
        let view = self.view();
        let mut blocks: Vec<Block> = demo.scene.blocks().collect();
        blocks.sort_by(|a, b| a.center().z.total_cmp(&b.center().z));

        let top = TOP_ROWS;
        let bottom = self.term_h.saturating_sub(BOTTOM_ROWS);
        for block in &blocks {
            if block.facade.shape != "cube" {
                continue;
            }
            let poly = hull(&block.corners().map(|c| view.project(c)));
            if poly.len() < 3 {
                continue;
            }
            let (lo, hi) = poly.iter().fold((poly[0], poly[0]), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
            let fg = shade(material_color(block.facade.material), block.center().z);
            let ch = if block.alpha < 0.5 { '░' } else { '█' };

            let y0 = (lo.y.floor().max(top as f32)) as usize;
            let y1 = (hi.y.ceil().min(bottom as f32)) as usize;
            let x0 = lo.x.floor().max(0.0) as usize;
            let x1 = hi.x.ceil().min(self.term_w as f32) as usize;
            for y in y0..y1 {
                for x in x0..x1 {
                    if inside(&poly, Vec2::new(x as f32 + 0.5, y as f32 + 0.5)) {
                        self.front.set(x, y, Cell { ch, fg, bg: Cell::BASE_BG });
                    }
                }
            }
        }
    }

    fn compose_hud(&mut self, demo: &Demo) {
        let hud = demo.hud();
        let h = hud.health();
        let e = hud.energy();
        let title = format!(" BAMPF trooper   level {}/{}   tick {}", demo.level(), MAX_LEVEL, demo.tick);
        self.front.put_str(0, 0, &title, Color::Yellow);
        if demo.paused {
            self.front.put_str(title.chars().count() + 3, 0, "PAUSED", Color::Red);
        }

        let row = self.term_h.saturating_sub(BOTTOM_ROWS);
        let full = if demo.trooper().full_health() { "  FULL" } else { "" };
        let lines = [
            (format!(" health   {} {:>4}/{}{}", bar(h.health, h.max, BAR_WIDTH, Some(h.mid)), h.health, h.max, full), Color::Green),
            (format!(" cloak    {} {:>4}/{}", bar(e.cloak, e.cloak_max, BAR_WIDTH, None), e.cloak, e.cloak_max), Color::Cyan),
            (format!(" teleport {} {:>4}/{}", bar(e.teleport, e.teleport_max, BAR_WIDTH, None), e.teleport, e.teleport_max), Color::Magenta),
        ];
        for (i, (text, color)) in lines.iter().enumerate() {
            self.front.put_str(0, row + i, text, *color);
        }
        self.front.put_str(1, row + 4, &demo.message, Color::White);
        self.front.put_str(
            1,
            row + 5,
            "+/- cells  d damage  e charge  c cloak  t teleport  r reset  0-4 level  p pause  q quit",
            Color::DarkGrey,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_release_events_before_init() {
        let r = Renderer::new();
        assert!(!r.keyboard_enhanced());
    }

    #[test]
    fn projection_doubles_columns() {
        let view = View { origin: Vec2::new(40.0, 12.0), scale: 10.0 };
        assert_eq!(view.project(Vec3::new(0.5, 0.5, 9.0)), Vec2::new(50.0, 7.0));
    }

    #[test]
    fn hull_of_square_with_interior_point() {
        let pts = [
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(0.0, 4.0),
            Vec2::new(2.0, 2.0),
        ];
        let h = hull(&pts);
        assert_eq!(h.len(), 4);
        assert!(!h.contains(&Vec2::new(2.0, 2.0)));
        assert!(inside(&h, Vec2::new(2.0, 2.0)));
        assert!(inside(&h, Vec2::new(0.0, 2.0)));
        assert!(!inside(&h, Vec2::new(5.0, 2.0)));
    }

    #[test]
    fn degenerate_hull_covers_nothing() {
        let flat = hull(&[Vec2::ZERO, Vec2::ZERO, Vec2::new(1.0, 0.0)]);
        assert!(!inside(&flat, Vec2::new(0.5, 0.0)));
    }

    #[test]
    fn near_blocks_are_brighter() {
        let base = material_color("tgreen");
        let (Color::Rgb { g: far, .. }, Color::Rgb { g: near, .. }) = (shade(base, -0.5), shade(base, 0.5)) else {
            panic!("expected rgb");
        };
        assert!(near > far);
    }

    #[test]
    fn frame_buffer_clips_strings() {
        let mut fb = FrameBuffer::new(4, 1);
        fb.put_str(2, 0, "abc", Color::White);
        assert_eq!(fb.get(3, 0).ch, 'b');
        assert_eq!(fb.get(9, 9), Cell::BLANK);
    }
}
