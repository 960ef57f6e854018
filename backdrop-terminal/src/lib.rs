/// Terminal frontend for the animated backdrop
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseEvent, MouseEventKind,
    },
    execute, terminal,
};
use clap::Parser;
use log::{debug, info};
use std::io::{self, stdout, Stdout};
use std::time::{Duration, Instant};
use backdrop_core::{
    Backdrop, CancellationToken, FrameClock, RenderLoop, RevealSequence, Scene, SceneConfig,
    SystemClock,
};

pub mod logging;
pub mod renderer;

pub use renderer::{viewport_for, AsciiRenderer, HeroText, CELL_HEIGHT_PX, CELL_WIDTH_PX};

/// Startup options
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub seed: u64,
    pub scene: SceneConfig,
    pub hero: HeroText,
    pub target_fps: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            scene: SceneConfig::default(),
            hero: HeroText::default(),
            target_fps: 30,
        }
    }
}

/// Command line options
#[derive(Debug, Parser)]
#[command(name = "backdrop-terminal", version, about = "Animated particle backdrop in the terminal")]
pub struct Args {
    /// Random seed for the scene layout
    #[arg(long, default_value_t = 0x5eed)]
    pub seed: u64,

    /// Hero title, one reveal step per word
    #[arg(long)]
    pub title: Option<String>,

    /// Target frame rate
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        let mut config = Self {
            seed: args.seed,
            target_fps: args.fps,
            ..Self::default()
        };
        if let Some(title) = args.title {
            config.hero.title = title.split_whitespace().map(str::to_string).collect();
        }
        config
    }
}

/// Main application struct for terminal backdrop rendering
pub struct TerminalApp {
    backdrop: Backdrop<AsciiRenderer<Stdout>>,
    target_frame_time: Duration,
}

impl TerminalApp {
    pub fn new(config: AppConfig) -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        let viewport = viewport_for(cols, rows);

        let scene = Scene::with_seed(viewport, config.scene, config.seed);
        let reveal = RevealSequence::hero(config.hero.title.len());
        let renderer = AsciiRenderer::new(stdout(), config.hero);

        Ok(Self {
            backdrop: Backdrop::new(scene, reveal, renderer),
            target_frame_time: Duration::from_secs_f64(1.0 / config.target_fps.max(1) as f64),
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let token = CancellationToken::new();
        let mut clock = SystemClock::new();
        let mut loader_clock = clock.clone();
        let target_frame_time = self.target_frame_time;

        let mut next_frame = Instant::now() + target_frame_time;
        let mut fps = FpsCounter::new();

        let stopper = token.clone();
        let frames = RenderLoop::run(&mut self.backdrop, &mut clock, &token, |backdrop| {
            // The scene is ready as soon as its first frame is up
            if !backdrop.reveal().is_triggered() {
                backdrop.on_loading_complete(loader_clock.elapsed());
            }

            // Handle input until the next frame slot
            loop {
                let now = Instant::now();
                let wait = next_frame.saturating_duration_since(now);
                if event::poll(wait)? {
                    handle_event(backdrop, event::read()?, &stopper);
                    if stopper.is_cancelled() {
                        return Ok(());
                    }
                } else {
                    break;
                }
            }
            next_frame = (next_frame + target_frame_time).max(Instant::now());

            if let Some(rate) = fps.tick() {
                backdrop.renderer_mut().status = Some(format!(
                    "Backdrop Terminal | FPS: {:.1} | Move the mouse to lean the field, Q=Quit",
                    rate
                ));
            }
            Ok(())
        })?;

        info!("drew {} frames", frames);
        Ok(())
    }
}

fn handle_event(
    backdrop: &mut Backdrop<AsciiRenderer<Stdout>>,
    event: Event,
    token: &CancellationToken,
) {
    match event {
        Event::Key(KeyEvent { code, modifiers, .. }) => match code {
            KeyCode::Char('q') | KeyCode::Esc => token.cancel(),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => token.cancel(),
            _ => {}
        },
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved | MouseEventKind::Drag(_),
            column,
            row,
            ..
        }) => {
            // Center of the cell, in viewport pixels
            let x = column as f32 * CELL_WIDTH_PX as f32 + CELL_WIDTH_PX as f32 / 2.0;
            let y = row as f32 * CELL_HEIGHT_PX as f32 + CELL_HEIGHT_PX as f32 / 2.0;
            backdrop.on_pointer_move(x, y);
            let hover = backdrop.renderer().is_over_cta(column, row);
            if hover != backdrop.cursor().hover {
                backdrop.on_hover(hover);
            }
            backdrop.renderer_mut().show_cursor = true;
        }
        Event::Resize(cols, rows) => {
            debug!("terminal resized to {}x{} cells", cols, rows);
            backdrop.on_resize(viewport_for(cols, rows));
        }
        _ => {}
    }
}

/// Frames-per-second over one-second windows
struct FpsCounter {
    window_start: Instant,
    frames: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
        }
    }

    /// Count a frame; returns the rate when a window closes
    fn tick(&mut self) -> Option<f32> {
        self.frames += 1;
        let elapsed = self.window_start.elapsed();
        if elapsed.as_secs() >= 1 {
            let rate = self.frames as f32 / elapsed.as_secs_f32();
            self.frames = 0;
            self.window_start = Instant::now();
            Some(rate)
        } else {
            None
        }
    }
}
