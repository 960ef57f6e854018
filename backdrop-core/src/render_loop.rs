/// Frame driver: the controller that owns the scene and the loop that ticks it
use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info};

use crate::input::{CursorFollower, PointerOffset};
use crate::reveal::{RevealFrame, RevealSequence};
use crate::scene::Scene;
use crate::scroll::{ScrollEffects, ScrollFrame, ScrollKind};
use crate::viewport::ViewportSize;

/// A drawing surface the backdrop can be presented on
pub trait SceneRenderer {
    type Error;

    /// Match the surface to a new viewport
    fn resize(&mut self, viewport: ViewportSize);

    /// Draw one frame: the 3D scene plus the page overlay state
    fn draw(&mut self, scene: &Scene, overlay: &FrameOverlay) -> Result<(), Self::Error>;
}

/// Non-3D state a renderer may present on top of the scene
#[derive(Debug, Clone, Default)]
pub struct FrameOverlay {
    pub reveal: RevealFrame,
    pub scroll: ScrollFrame,
    pub cursor: CursorFollower,
}

/// Top-level controller. Owns the scene and all per-page mutable state;
/// input handlers and the render loop reach it only through `&mut self`.
pub struct Backdrop<R: SceneRenderer> {
    scene: Scene,
    pointer: PointerOffset,
    cursor: CursorFollower,
    reveal: RevealSequence,
    scroll: ScrollEffects,
    renderer: R,
    frames: u64,
}

impl<R: SceneRenderer> Backdrop<R> {
    pub fn new(scene: Scene, reveal: RevealSequence, mut renderer: R) -> Self {
        renderer.resize(scene.viewport);
        Self {
            scene,
            pointer: PointerOffset::default(),
            cursor: CursorFollower::new(),
            reveal,
            scroll: ScrollEffects::default(),
            renderer,
            frames: 0,
        }
    }

    /// Attach the page's scroll-triggered effects
    pub fn with_scroll(mut self, scroll: ScrollEffects) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn pointer(&self) -> PointerOffset {
        self.pointer
    }

    pub fn cursor(&self) -> CursorFollower {
        self.cursor
    }

    pub fn reveal(&self) -> &RevealSequence {
        &self.reveal
    }

    pub fn scroll(&self) -> &ScrollEffects {
        &self.scroll
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Pointer moved to viewport position `(x, y)`
    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.pointer = PointerOffset::from_position(x, y, self.scene.viewport);
        self.cursor.move_to(x, y);
    }

    /// Pointer entered or left an interactive element
    pub fn on_hover(&mut self, hover: bool) {
        self.cursor.set_hover(hover);
    }

    /// Page scrolled to `scroll_y`. `top_of` reports element tops relative to
    /// the viewport; see [`ScrollEffects::on_scroll`].
    pub fn on_scroll<F>(&mut self, scroll_y: f32, now: f32, top_of: F) -> usize
    where
        F: FnMut(ScrollKind, usize) -> Option<f32>,
    {
        let height = self.scene.viewport.height as f32;
        self.scroll.on_scroll(scroll_y, height, now, top_of)
    }

    /// Viewport changed: new camera aspect, new projection, new surface size
    pub fn on_resize(&mut self, viewport: ViewportSize) {
        debug!("resize to {}x{}", viewport.width, viewport.height);
        self.scene.resize(viewport);
        self.renderer.resize(viewport);
    }

    /// The loader finished; start the hero reveal
    pub fn on_loading_complete(&mut self, now: f32) {
        self.reveal.trigger(now);
    }

    /// Advance every animated object to `elapsed` seconds
    pub fn advance(&mut self, elapsed: f32) {
        let config = &self.scene.config;
        self.scene.particles.update(self.pointer, config);

        let amplitude = config.bob_amplitude;
        for solid in &mut self.scene.solids {
            solid.update(elapsed, amplitude);
        }

        self.cursor.step();
    }

    /// Advance, then draw. Renderer errors are returned untouched.
    pub fn render_frame(&mut self, elapsed: f32) -> Result<(), R::Error> {
        self.advance(elapsed);
        let overlay = FrameOverlay {
            reveal: self.reveal.sample(elapsed),
            scroll: self.scroll.sample(elapsed),
            cursor: self.cursor,
        };
        self.renderer.draw(&self.scene, &overlay)?;
        self.frames += 1;
        Ok(())
    }
}

/// Source of elapsed wall-clock time
pub trait FrameClock {
    /// Seconds since the clock started
    fn elapsed(&mut self) -> f32;
}

/// Clock for the native frontends
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: std::time::Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn elapsed(&mut self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Clock that advances by a fixed step each time it is read
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: f32,
    step: f32,
}

impl ManualClock {
    pub fn new(step: f32) -> Self {
        Self { now: 0.0, step }
    }
}

impl FrameClock for ManualClock {
    fn elapsed(&mut self) -> f32 {
        let now = self.now;
        self.now += self.step;
        now
    }
}

/// Shared stop flag for a render loop. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Explicit frame loop
pub struct RenderLoop;

impl RenderLoop {
    /// Draw frames until `token` is cancelled.
    ///
    /// `between_frames` runs after every frame; it is where the frontend handles
    /// input, waits for the next frame slot, and may cancel the token. Returns
    /// the number of frames drawn.
    pub fn run<R, C, F>(
        backdrop: &mut Backdrop<R>,
        clock: &mut C,
        token: &CancellationToken,
        mut between_frames: F,
    ) -> Result<u64, R::Error>
    where
        R: SceneRenderer,
        C: FrameClock,
        F: FnMut(&mut Backdrop<R>) -> Result<(), R::Error>,
    {
        info!("render loop started");
        let mut drawn = 0;
        while !token.is_cancelled() {
            let elapsed = clock.elapsed();
            backdrop.render_frame(elapsed)?;
            drawn += 1;
            between_frames(backdrop)?;
        }
        info!("render loop stopped after {} frames", drawn);
        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::reveal::{ElementState, RevealGroup};
    use crate::solids::bob_height;

    #[derive(Default)]
    struct RecordingRenderer {
        sizes: Vec<ViewportSize>,
        frames: Vec<(f32, f32, Vec<f32>)>,
        overlays: Vec<FrameOverlay>,
        fail_on: Option<usize>,
    }

    impl SceneRenderer for RecordingRenderer {
        type Error = String;

        fn resize(&mut self, viewport: ViewportSize) {
            self.sizes.push(viewport);
        }

        fn draw(&mut self, scene: &Scene, overlay: &FrameOverlay) -> Result<(), String> {
            if self.fail_on == Some(self.frames.len()) {
                return Err("surface lost".to_string());
            }
            let opacities = overlay.reveal.elements.iter().map(|e| e.state.opacity).collect();
            self.frames.push((
                scene.particles.rotation.x,
                scene.particles.rotation.y,
                opacities,
            ));
            self.overlays.push(overlay.clone());
            Ok(())
        }
    }

    fn backdrop(width: u32, height: u32) -> Backdrop<RecordingRenderer> {
        let scene = Scene::with_seed(ViewportSize::new(width, height), SceneConfig::default(), 9);
        Backdrop::new(scene, RevealSequence::hero(3), RecordingRenderer::default())
    }

    #[test]
    fn test_renderer_sized_on_creation() {
        let backdrop = backdrop(1000, 800);
        assert_eq!(backdrop.renderer().sizes, vec![ViewportSize::new(1000, 800)]);
    }

    #[test]
    fn test_resize_adapter() {
        let mut backdrop = backdrop(1200, 800);
        backdrop.on_resize(ViewportSize::new(600, 400));

        assert_eq!(backdrop.scene().camera.aspect, 1.5);
        assert_eq!(backdrop.scene().viewport, ViewportSize::new(600, 400));
        assert_eq!(backdrop.renderer().sizes.last(), Some(&ViewportSize::new(600, 400)));

        let projection = *backdrop.scene().camera.projection_matrix();
        backdrop.on_resize(ViewportSize::new(600, 400));
        assert_eq!(*backdrop.scene().camera.projection_matrix(), projection);
    }

    #[test]
    fn test_pointer_offset_uses_current_viewport() {
        let mut backdrop = backdrop(1000, 800);
        backdrop.on_pointer_move(500.0, 400.0);
        assert_eq!(backdrop.pointer(), PointerOffset::default());

        backdrop.on_resize(ViewportSize::new(200, 100));
        backdrop.on_pointer_move(500.0, 400.0);
        assert_eq!(backdrop.pointer(), PointerOffset::new(400.0, 350.0));
    }

    #[test]
    fn test_centered_pointer_only_drifts() {
        let mut centered = backdrop(1000, 800);
        centered.on_pointer_move(500.0, 400.0);

        let config = SceneConfig::default();
        let mut expected_x = 0.0_f32;
        for _ in 0..50 {
            centered.advance(0.0);
            expected_x += config.particle_drift.x;
            expected_x -= expected_x * config.rotation_damping;
        }
        assert!((centered.scene().particles.rotation.x - expected_x).abs() < 1e-7);
    }

    #[test]
    fn test_solids_follow_bob_law() {
        let mut backdrop = backdrop(1000, 800);
        for t in [0.0, 0.5, 3.0, 17.25] {
            backdrop.advance(t);
            for solid in &backdrop.scene().solids {
                let expected = bob_height(solid.base_position.y, 1.5, t, solid.phase);
                assert!((solid.position.y - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_loop_stops_when_cancelled() {
        let mut backdrop = backdrop(800, 600);
        let mut clock = ManualClock::new(1.0 / 60.0);
        let token = CancellationToken::new();

        let stopper = token.clone();
        let drawn = RenderLoop::run(&mut backdrop, &mut clock, &token, |b| {
            if b.frames() == 10 {
                stopper.cancel();
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(drawn, 10);
        assert_eq!(backdrop.renderer().frames.len(), 10);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_pre_cancelled_loop_draws_nothing() {
        let mut backdrop = backdrop(800, 600);
        let token = CancellationToken::new();
        token.cancel();
        let drawn = RenderLoop::run(&mut backdrop, &mut ManualClock::new(0.1), &token, |_| Ok(())).unwrap();
        assert_eq!(drawn, 0);
    }

    #[test]
    fn test_draw_error_propagates() {
        let mut backdrop = backdrop(800, 600);
        backdrop.renderer_mut().fail_on = Some(3);
        let token = CancellationToken::new();

        let result = RenderLoop::run(&mut backdrop, &mut ManualClock::new(0.1), &token, |_| Ok(()));
        assert_eq!(result, Err("surface lost".to_string()));
        assert_eq!(backdrop.frames(), 3);
    }

    #[test]
    fn test_reveal_plays_after_loading_completes() {
        let mut backdrop = backdrop(800, 600);
        let mut clock = ManualClock::new(0.1);
        let token = CancellationToken::new();

        let stopper = token.clone();
        RenderLoop::run(&mut backdrop, &mut clock, &token, |b| {
            if b.frames() == 5 {
                b.on_loading_complete(0.5);
            }
            if b.frames() == 50 {
                stopper.cancel();
            }
            Ok(())
        })
        .unwrap();

        let frames = &backdrop.renderer().frames;
        assert!(frames[..5].iter().all(|(_, _, o)| o.iter().all(|&v| v == 0.0)));
        assert!(frames.last().unwrap().2.iter().all(|&v| v == 1.0));

        let end = backdrop.reveal().sample(4.9);
        for group in RevealGroup::ALL {
            assert!(end.group(group).all(|e| e.state == ElementState::SHOWN));
        }
    }

    #[test]
    fn test_scroll_effects_reach_the_overlay() {
        let mut backdrop = backdrop(800, 1000).with_scroll(ScrollEffects::new(1, 0, &[40]));
        backdrop.render_frame(0.0).unwrap();

        // Both elements sit at 500px, above the 85% and 90% lines of a 1000px viewport
        let fired = backdrop.on_scroll(120.0, 0.0, |_, _| Some(500.0));
        assert_eq!(fired, 2);
        assert!(backdrop.scroll().navbar_scrolled());

        backdrop.render_frame(5.0).unwrap();
        let overlays = &backdrop.renderer().overlays;
        let first = &overlays[0].scroll;
        assert_eq!(first.reveals[0].state.opacity, 0.0);
        assert_eq!(first.counters[0].value, None);
        assert!(!first.navbar_scrolled);

        let last = &overlays[1].scroll;
        assert_eq!(last.reveals[0].state, ElementState::SHOWN);
        assert_eq!(last.counters[0].value, Some(40));
        assert!(last.navbar_scrolled);
    }

    #[test]
    fn test_hover_reaches_the_overlay() {
        let mut backdrop = backdrop(800, 600);
        backdrop.on_hover(true);
        backdrop.render_frame(0.0).unwrap();
        backdrop.on_hover(false);
        backdrop.render_frame(0.1).unwrap();

        let overlays = &backdrop.renderer().overlays;
        assert!(overlays[0].cursor.hover);
        assert!(!overlays[1].cursor.hover);
    }
}
