/// ASCII rasterizer for terminal rendering
use std::io::{self, Write};

use backdrop_core::projection::project_with;
use backdrop_core::{
    ElementState, FrameOverlay, RevealFrame, RevealGroup, Rgb, Scene, SceneRenderer, Transform,
    ViewportSize,
};
use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::Matrix4;

/// Pixel footprint of one terminal cell, used to map cells to viewport pixels
pub const CELL_WIDTH_PX: u32 = 8;
pub const CELL_HEIGHT_PX: u32 = 16;

/// Glyphs for cells hit by one, two, three or more particles
const POINT_RAMP: &[char] = &['.', ':', '+', '*'];

/// Hidden text is skipped entirely below this opacity
const MIN_VISIBLE_OPACITY: f32 = 0.02;

/// Viewport in pixels for a terminal of `cols` x `rows` cells
pub fn viewport_for(cols: u16, rows: u16) -> ViewportSize {
    ViewportSize::new(cols as u32 * CELL_WIDTH_PX, rows as u32 * CELL_HEIGHT_PX)
}

/// Hero section copy shown over the backdrop
#[derive(Debug, Clone)]
pub struct HeroText {
    pub tag: String,
    pub title: Vec<String>,
    pub subtitle: String,
    pub cta: String,
    pub scroll_indicator: String,
}

impl Default for HeroText {
    fn default() -> Self {
        Self {
            tag: "// portfolio".to_string(),
            title: vec!["Building".to_string(), "things".to_string(), "in".to_string(), "3D".to_string()],
            subtitle: "Software engineer crafting interactive experiences".to_string(),
            cta: "[ View work ]".to_string(),
            scroll_indicator: "scroll".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    ch: char,
    color: Rgb,
    depth: f32,
    hits: u8,
}

impl Cell {
    const EMPTY: Cell = Cell {
        ch: ' ',
        color: Rgb::new(0.0, 0.0, 0.0),
        depth: f32::INFINITY,
        hits: 0,
    };
}

/// ASCII renderer that draws the backdrop scene into terminal cells
pub struct AsciiRenderer<W: Write> {
    out: W,
    cols: usize,
    rows: usize,
    cells: Vec<Cell>,
    hero: HeroText,
    /// Draw the custom cursor once the pointer has been seen
    pub show_cursor: bool,
    /// Status line drawn on the first row
    pub status: Option<String>,
}

impl<W: Write> AsciiRenderer<W> {
    pub fn new(out: W, hero: HeroText) -> Self {
        Self {
            out,
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            hero,
            show_cursor: false,
            status: None,
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Character at a cell, for inspection
    pub fn glyph(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col].ch)
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if x < 0 || y < 0 || x as usize >= self.cols || y as usize >= self.rows {
            return None;
        }
        let idx = y as usize * self.cols + x as usize;
        Some(&mut self.cells[idx])
    }

    fn render_particles(&mut self, scene: &Scene, view_projection: &Matrix4<f32>) {
        let field = &scene.particles;
        let mvp = view_projection * Transform::rotation_matrix(&field.rotation);
        let opacity = scene.config.particle_opacity;

        for (position, color) in field.positions.iter().zip(&field.colors) {
            let Some((x, y, depth)) = project_with(&mvp, position, self.cols as u32, self.rows as u32)
            else {
                continue;
            };
            if let Some(cell) = self.cell_mut(x as i32, y as i32) {
                cell.hits = cell.hits.saturating_add(1);
                cell.color = cell.color.add(color.scaled(opacity));
                cell.depth = cell.depth.min(depth);
                cell.ch = POINT_RAMP[(cell.hits as usize - 1).min(POINT_RAMP.len() - 1)];
            }
        }
    }

    fn render_solids(&mut self, scene: &Scene, view_projection: &Matrix4<f32>) {
        let opacity = scene.config.solid_opacity;
        for solid in &scene.solids {
            let mvp = view_projection * Transform::model_matrix(&solid.position, &solid.rotation);
            let projected: Vec<Option<(f32, f32, f32)>> = solid
                .mesh
                .vertices
                .iter()
                .map(|v| project_with(&mvp, v, self.cols as u32, self.rows as u32))
                .collect();

            let color = solid.color.scaled(opacity);
            for &(a, b) in &solid.edges {
                if let (Some(p0), Some(p1)) = (projected[a], projected[b]) {
                    self.draw_line(p0, p1, color);
                }
            }
        }
    }

    /// Bresenham line; nearer glyphs win, colors accumulate
    fn draw_line(&mut self, p0: (f32, f32, f32), p1: (f32, f32, f32), color: Rgb) {
        let (mut x0, mut y0) = (p0.0 as i32, p0.1 as i32);
        let (x1, y1) = (p1.0 as i32, p1.1 as i32);
        let ch = edge_glyph(p1.0 - p0.0, p1.1 - p0.1);
        let depth = p0.2.min(p1.2);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            if let Some(cell) = self.cell_mut(x0, y0) {
                cell.color = cell.color.add(color);
                if depth <= cell.depth {
                    cell.depth = depth;
                    cell.ch = ch;
                }
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                err += dx;
                y0 += sy;
            }
        }
    }

    fn render_hero(&mut self, reveal: &RevealFrame) {
        if self.rows == 0 {
            return;
        }
        let mid = self.rows as i32 / 2;
        let white = Rgb::new(1.0, 1.0, 1.0);
        let accent = Rgb::from_hex(0x00d4ff);

        let tag = self.hero.tag.clone();
        self.render_text_centered(&tag, mid - 4, element(reveal, RevealGroup::Tag, 0), accent);

        // Title words are laid out on one line but each fades and rises on its own
        let title = self.hero.title.clone();
        let line: usize = title.iter().map(|w| w.chars().count()).sum::<usize>() + title.len().saturating_sub(1);
        let mut x = (self.cols as i32 - line as i32) / 2;
        for (i, word) in title.iter().enumerate() {
            let state = element(reveal, RevealGroup::TitleWord, i);
            let rise = (state.offset_y / CELL_HEIGHT_PX as f32).round() as i32;
            let spaced = if i + 1 < title.len() {
                format!("{} ", word)
            } else {
                word.clone()
            };
            self.render_text(&spaced, x, mid - 2 + rise, state, white);
            x += spaced.chars().count() as i32;
        }

        let subtitle = self.hero.subtitle.clone();
        self.render_text_centered(&subtitle, mid, element(reveal, RevealGroup::Subtitle, 0), white);
        let cta = self.hero.cta.clone();
        let (cta_x, cta_row) = self.cta_origin();
        self.render_text(&cta, cta_x, cta_row, element(reveal, RevealGroup::CallToAction, 0), accent);
        let scroll = self.hero.scroll_indicator.clone();
        let bottom = self.rows as i32 - 2;
        self.render_text_centered(&scroll, bottom, element(reveal, RevealGroup::ScrollIndicator, 0), white);
    }

    /// Leftmost cell and row of the call to action
    fn cta_origin(&self) -> (i32, i32) {
        let x = (self.cols as i32 - self.hero.cta.chars().count() as i32) / 2;
        (x, self.rows as i32 / 2 + 2)
    }

    /// Whether a cell lies on the call to action, the one interactive element
    pub fn is_over_cta(&self, col: u16, row: u16) -> bool {
        let (x, cta_row) = self.cta_origin();
        let (col, row) = (col as i32, row as i32);
        row == cta_row && col >= x && col < x + self.hero.cta.chars().count() as i32
    }

    fn render_text_centered(&mut self, text: &str, row: i32, state: ElementState, color: Rgb) {
        let x = (self.cols as i32 - text.chars().count() as i32) / 2;
        self.render_text(text, x, row, state, color);
    }

    fn render_text(&mut self, text: &str, x: i32, row: i32, state: ElementState, color: Rgb) {
        if state.opacity < MIN_VISIBLE_OPACITY {
            return;
        }
        let color = color.scaled(state.opacity);
        for (i, ch) in text.chars().enumerate() {
            if let Some(cell) = self.cell_mut(x + i as i32, row) {
                cell.ch = ch;
                cell.color = color;
                cell.depth = f32::NEG_INFINITY;
            }
        }
    }

    fn render_cursor(&mut self, overlay: &FrameOverlay) {
        if !self.show_cursor {
            return;
        }
        let to_cell = |(x, y): (f32, f32)| {
            (
                (x / CELL_WIDTH_PX as f32) as i32,
                (y / CELL_HEIGHT_PX as f32) as i32,
            )
        };
        let ring = to_cell(overlay.cursor.follower);
        if let Some(cell) = self.cell_mut(ring.0, ring.1) {
            cell.ch = if overlay.cursor.hover { 'O' } else { 'o' };
            cell.color = Rgb::from_hex(0x7b61ff);
        }
        let dot = to_cell(overlay.cursor.cursor);
        if let Some(cell) = self.cell_mut(dot.0, dot.1) {
            cell.ch = '@';
            cell.color = Rgb::from_hex(0x00d4ff);
        }
    }

    fn present(&mut self) -> io::Result<()> {
        let mut current: Option<(u8, u8, u8)> = None;
        for row in 0..self.rows {
            self.out.queue(MoveTo(0, row as u16))?;
            for col in 0..self.cols {
                let cell = self.cells[row * self.cols + col];
                let rgb = cell.color.to_u8();
                if current != Some(rgb) {
                    self.out.queue(SetForegroundColor(Color::Rgb {
                        r: rgb.0,
                        g: rgb.1,
                        b: rgb.2,
                    }))?;
                    current = Some(rgb);
                }
                self.out.queue(Print(cell.ch))?;
            }
        }

        if let Some(status) = &self.status {
            self.out.queue(MoveTo(0, 0))?;
            self.out.queue(SetForegroundColor(Color::Yellow))?;
            self.out.queue(Print(status))?;
        }

        self.out.queue(ResetColor)?;
        self.out.flush()
    }
}

impl<W: Write> SceneRenderer for AsciiRenderer<W> {
    type Error = io::Error;

    fn resize(&mut self, viewport: ViewportSize) {
        self.cols = (viewport.width / CELL_WIDTH_PX) as usize;
        self.rows = (viewport.height / CELL_HEIGHT_PX) as usize;
        self.cells = vec![Cell::EMPTY; self.cols * self.rows];
    }

    fn draw(&mut self, scene: &Scene, overlay: &FrameOverlay) -> io::Result<()> {
        self.clear();

        let view_projection = scene.camera.view_projection();
        self.render_particles(scene, &view_projection);
        self.render_solids(scene, &view_projection);
        self.render_hero(&overlay.reveal);
        self.render_cursor(overlay);

        self.present()
    }
}

fn element(reveal: &RevealFrame, group: RevealGroup, index: usize) -> ElementState {
    reveal.element(group, index).unwrap_or(ElementState::HIDDEN)
}

/// Pick a line glyph from a screen-space direction
fn edge_glyph(dx: f32, dy: f32) -> char {
    // Cells are twice as tall as they are wide
    let slope = (dy * 2.0).atan2(dx).to_degrees().rem_euclid(180.0);
    match slope {
        s if !(22.5..157.5).contains(&s) => '-',
        s if s < 67.5 => '\\',
        s if s < 112.5 => '|',
        _ => '/',
    }
}
