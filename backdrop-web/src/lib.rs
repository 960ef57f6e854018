/// Backdrop Web - WASM frontend drawing the backdrop into an HTML canvas
///
/// The scene is rasterized with the 2D canvas API; the hero reveal, the
/// scroll-triggered effects and the custom cursor are applied to page
/// elements by CSS selector.
use std::cell::RefCell;
use std::rc::Rc;

use backdrop_core::viewport::capped_pixel_ratio;
use backdrop_core::{
    Backdrop, CancellationToken, FrameOverlay, RevealFrame, RevealSequence, Scene, SceneConfig,
    SceneRenderer, ScrollEffects, ScrollFrame, ScrollKind, Transform, ViewportSize,
};
use backdrop_core::projection::project_with;
use backdrop_core::reveal::RevealGroup;
use log::{debug, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, EventTarget, HtmlCanvasElement, HtmlElement, Window,
};

mod dom;
pub mod frame;

use dom::{
    apply_state, counter_targets, element_by_id, elements, is_touch_device, set_style,
    toggle_class, viewport_top,
};
use frame::step_frame;

/// Elements that put the cursor ring in its hover style
pub const HOVER_SELECTOR: &str = "a, button, .skill-card, .project-item";

/// Draws the scene on a canvas and mirrors overlay state into the page
pub struct CanvasRenderer {
    window: Window,
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    viewport: ViewportSize,
    max_pixel_ratio: f64,
    cursor: Option<(HtmlElement, HtmlElement)>,
    navbar: Option<HtmlElement>,
    last_reveal: Option<RevealFrame>,
    last_scroll: Option<ScrollFrame>,
    hover_shown: bool,
}

impl CanvasRenderer {
    pub fn new(window: Window, canvas: HtmlCanvasElement, max_pixel_ratio: f64) -> Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas 2D context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        // Touch devices keep the native cursor
        let cursor = match (element_by_id(&document, "cursor"), element_by_id(&document, "cursor-follower")) {
            (Some(dot), Some(ring)) if is_touch_device(&window) => {
                set_style(&dot, "display", "none");
                set_style(&ring, "display", "none");
                None
            }
            (Some(dot), Some(ring)) => Some((dot, ring)),
            _ => None,
        };
        let navbar = element_by_id(&document, "navbar");

        Ok(Self {
            window,
            document,
            canvas,
            ctx,
            viewport: ViewportSize::default(),
            max_pixel_ratio,
            cursor,
            navbar,
            last_reveal: None,
            last_scroll: None,
            hover_shown: false,
        })
    }

    /// Whether the custom cursor is drawn
    pub fn has_cursor(&self) -> bool {
        self.cursor.is_some()
    }

    fn draw_particles(&self, scene: &Scene) -> Result<(), JsValue> {
        let field = &scene.particles;
        let model = Transform::rotation_matrix(&field.rotation);
        let mvp = scene.camera.view_projection() * model;
        let (w, h) = (self.viewport.width, self.viewport.height);

        // Pixels per world unit at unit distance
        let scale = h as f32 / (2.0 * (scene.camera.fov / 2.0).tan());
        let opacity = scene.config.particle_opacity;

        for (position, color) in field.positions.iter().zip(&field.colors) {
            let Some((x, y, _)) = project_with(&mvp, position, w, h) else {
                continue;
            };
            let world = model.transform_point(position);
            let distance = (scene.camera.position - world).norm().max(1e-3);
            let size = (scene.config.particle_size * scale / distance).max(1.0) as f64;

            self.ctx.set_fill_style_str(&color.to_css(opacity));
            self.ctx
                .fill_rect(x as f64 - size / 2.0, y as f64 - size / 2.0, size, size);
        }
        Ok(())
    }

    fn draw_solids(&self, scene: &Scene) {
        let view_projection = scene.camera.view_projection();
        let (w, h) = (self.viewport.width, self.viewport.height);
        self.ctx.set_line_width(1.0);

        for solid in &scene.solids {
            let mvp = view_projection * Transform::model_matrix(&solid.position, &solid.rotation);
            let projected: Vec<_> = solid
                .mesh
                .vertices
                .iter()
                .map(|v| project_with(&mvp, v, w, h))
                .collect();

            self.ctx.set_stroke_style_str(&solid.color.to_css(scene.config.solid_opacity));
            self.ctx.begin_path();
            for &(a, b) in &solid.edges {
                if let (Some(p0), Some(p1)) = (projected[a], projected[b]) {
                    self.ctx.move_to(p0.0 as f64, p0.1 as f64);
                    self.ctx.line_to(p1.0 as f64, p1.1 as f64);
                }
            }
            self.ctx.stroke();
        }
    }

    /// Write reveal states to the hero elements. Missing elements are skipped.
    fn apply_reveal(&mut self, reveal: &RevealFrame) -> Result<(), JsValue> {
        if self.last_reveal.as_ref() == Some(reveal) {
            return Ok(());
        }
        for group in RevealGroup::ALL {
            let targets = elements(&self.document, group.selector())?;
            for element in reveal.group(group) {
                if let Some(el) = targets.get(element.index) {
                    apply_state(el, element.state);
                }
            }
        }
        self.last_reveal = Some(reveal.clone());
        Ok(())
    }

    /// Scroll reveals, counters and the navbar. Missing elements are skipped.
    fn apply_scroll(&mut self, scroll: &ScrollFrame) -> Result<(), JsValue> {
        if self.last_scroll.as_ref() == Some(scroll) {
            return Ok(());
        }
        let previous = self.last_scroll.take().unwrap_or_default();

        for kind in [ScrollKind::RevealText, ScrollKind::RevealUp] {
            let targets = elements(&self.document, kind.selector())?;
            for element in scroll.reveals.iter().filter(|e| e.kind == kind) {
                if previous.reveals.contains(element) {
                    continue;
                }
                if let Some(el) = targets.get(element.index) {
                    apply_state(el, element.state);
                }
            }
        }

        let stats = elements(&self.document, ScrollKind::StatNumber.selector())?;
        for counter in &scroll.counters {
            let Some(value) = counter.value else {
                continue;
            };
            if previous.counters.contains(counter) {
                continue;
            }
            if let Some(el) = stats.get(counter.index) {
                el.set_text_content(Some(&value.to_string()));
            }
        }

        if let Some(navbar) = &self.navbar {
            toggle_class(navbar, "scrolled", scroll.navbar_scrolled);
        }
        self.last_scroll = Some(scroll.clone());
        Ok(())
    }

    fn apply_cursor(&mut self, overlay: &FrameOverlay) {
        if let Some((dot, ring)) = &self.cursor {
            let (cx, cy) = overlay.cursor.cursor;
            let (fx, fy) = overlay.cursor.follower;
            set_style(dot, "left", &format!("{}px", cx));
            set_style(dot, "top", &format!("{}px", cy));
            set_style(ring, "left", &format!("{}px", fx));
            set_style(ring, "top", &format!("{}px", fy));

            if overlay.cursor.hover != self.hover_shown {
                toggle_class(ring, "hover", overlay.cursor.hover);
                self.hover_shown = overlay.cursor.hover;
            }
        }
    }
}

impl SceneRenderer for CanvasRenderer {
    type Error = JsValue;

    fn resize(&mut self, viewport: ViewportSize) {
        self.viewport = viewport;
        let ratio = capped_pixel_ratio(self.window.device_pixel_ratio(), self.max_pixel_ratio);

        self.canvas.set_width((viewport.width as f64 * ratio).round() as u32);
        self.canvas.set_height((viewport.height as f64 * ratio).round() as u32);
        set_style(&self.canvas, "width", &format!("{}px", viewport.width));
        set_style(&self.canvas, "height", &format!("{}px", viewport.height));

        // Draw in CSS pixels on a backing store scaled by the pixel ratio
        if let Err(err) = self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0) {
            warn!("failed to scale canvas context: {:?}", err);
        }
        debug!(
            "canvas resized to {}x{} at pixel ratio {}",
            viewport.width, viewport.height, ratio
        );
    }

    fn draw(&mut self, scene: &Scene, overlay: &FrameOverlay) -> Result<(), JsValue> {
        let (w, h) = (self.viewport.width as f64, self.viewport.height as f64);
        self.ctx.clear_rect(0.0, 0.0, w, h);

        // Additive blending for the glow
        self.ctx.set_global_composite_operation("lighter")?;
        self.draw_particles(scene)?;
        self.draw_solids(scene);
        self.ctx.set_global_composite_operation("source-over")?;

        self.apply_reveal(&overlay.reveal)?;
        self.apply_scroll(&overlay.scroll)?;
        self.apply_cursor(overlay);
        Ok(())
    }
}

struct Listener {
    target: EventTarget,
    name: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

type Listeners = Rc<RefCell<Vec<Listener>>>;

/// Remove every listener from its target
fn detach(listeners: &RefCell<Vec<Listener>>) {
    for listener in listeners.borrow_mut().drain(..) {
        if let Err(err) = listener
            .target
            .remove_event_listener_with_callback(listener.name, listener.closure.as_ref().unchecked_ref())
        {
            warn!("could not remove {} listener: {:?}", listener.name, err);
        }
    }
}

/// The backdrop bound to a page
#[wasm_bindgen]
pub struct WebBackdrop {
    inner: Rc<RefCell<Backdrop<CanvasRenderer>>>,
    token: CancellationToken,
    window: Window,
    document: Document,
    start: f64,
    listeners: Listeners,
}

#[wasm_bindgen]
impl WebBackdrop {
    /// Build the scene for the current window size on the canvas with id `canvas_id`
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, seed: u32) -> Result<WebBackdrop, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element with id {:?}", canvas_id)))?
            .dyn_into::<HtmlCanvasElement>()?;

        let config = SceneConfig::default();
        let viewport = window_viewport(&window)?;
        let title_words = elements(&document, RevealGroup::TitleWord.selector())?.len();
        let scroll = ScrollEffects::new(
            elements(&document, ScrollKind::RevealText.selector())?.len(),
            elements(&document, ScrollKind::RevealUp.selector())?.len(),
            &counter_targets(&elements(&document, ScrollKind::StatNumber.selector())?),
        );

        let renderer = CanvasRenderer::new(window.clone(), canvas, config.max_pixel_ratio)?;
        let scene = Scene::with_seed(viewport, config, seed as u64);
        let backdrop = Backdrop::new(scene, RevealSequence::hero(title_words), renderer).with_scroll(scroll);

        let start = now(&window);
        Ok(WebBackdrop {
            inner: Rc::new(RefCell::new(backdrop)),
            token: CancellationToken::new(),
            window,
            document,
            start,
            listeners: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Hook up pointer, scroll, hover and resize events and start drawing every animation frame
    pub fn start(&mut self) -> Result<(), JsValue> {
        let window_target: EventTarget = self.window.clone().into();

        self.listen(&window_target, "mousemove", {
            let inner = self.inner.clone();
            move |event: web_sys::Event| {
                if let Some(mouse) = event.dyn_ref::<web_sys::MouseEvent>() {
                    inner
                        .borrow_mut()
                        .on_pointer_move(mouse.client_x() as f32, mouse.client_y() as f32);
                }
            }
        })?;

        self.listen(&window_target, "resize", {
            let inner = self.inner.clone();
            let window = self.window.clone();
            move |_event: web_sys::Event| match window_viewport(&window) {
                Ok(viewport) => inner.borrow_mut().on_resize(viewport),
                Err(err) => warn!("could not read window size: {:?}", err),
            }
        })?;

        self.listen(&window_target, "scroll", {
            let inner = self.inner.clone();
            let window = self.window.clone();
            let document = self.document.clone();
            let start = self.start;
            move |_event: web_sys::Event| {
                if let Err(err) = check_scroll(&inner, &window, &document, start) {
                    warn!("scroll check failed: {:?}", err);
                }
            }
        })?;

        for el in elements(&self.document, HOVER_SELECTOR)? {
            let target: EventTarget = el.into();
            for (name, hover) in [("mouseenter", true), ("mouseleave", false)] {
                let inner = self.inner.clone();
                self.listen(&target, name, move |_event: web_sys::Event| {
                    inner.borrow_mut().on_hover(hover);
                })?;
            }
        }

        // Sections already in view fire without waiting for a scroll
        check_scroll(&self.inner, &self.window, &self.document, self.start)?;
        self.schedule_frames()
    }

    /// Stop the frame loop and detach event listeners
    pub fn stop(&mut self) {
        self.token.cancel();
        detach(&self.listeners);
        info!("backdrop stopped");
    }

    /// Loader finished; play the hero reveal
    #[wasm_bindgen(js_name = loadingComplete)]
    pub fn loading_complete(&self) {
        let elapsed = self.elapsed();
        self.inner.borrow_mut().on_loading_complete(elapsed);
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f32, y: f32) {
        self.inner.borrow_mut().on_pointer_move(x, y);
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.inner
            .borrow_mut()
            .on_resize(ViewportSize::new(width, height));
    }

    #[wasm_bindgen(getter)]
    pub fn frames(&self) -> f64 {
        self.inner.borrow().frames() as f64
    }

    #[wasm_bindgen(getter, js_name = particleCount)]
    pub fn particle_count(&self) -> u32 {
        self.inner.borrow().scene().particles.len() as u32
    }

    #[wasm_bindgen(getter, js_name = navbarScrolled)]
    pub fn navbar_scrolled(&self) -> bool {
        self.inner.borrow().scroll().navbar_scrolled()
    }
}

impl WebBackdrop {
    fn elapsed(&self) -> f32 {
        seconds_since(&self.window, self.start)
    }

    fn listen<F>(&self, target: &EventTarget, name: &'static str, handler: F) -> Result<(), JsValue>
    where
        F: FnMut(web_sys::Event) + 'static,
    {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web_sys::Event)>);
        target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        self.listeners.borrow_mut().push(Listener {
            target: target.clone(),
            name,
            closure,
        });
        Ok(())
    }

    /// Self-rescheduling animation-frame callback that checks the token each frame.
    ///
    /// A draw error detaches the listeners, ends the loop and is rethrown into JS.
    fn schedule_frames(&self) -> Result<(), JsValue> {
        let callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let reschedule = callback.clone();

        let inner = self.inner.clone();
        let token = self.token.clone();
        let window = self.window.clone();
        let listeners = self.listeners.clone();
        let start = self.start;

        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            if token.is_cancelled() {
                // Break the closure's reference to itself so it can be freed
                reschedule.borrow_mut().take();
                return;
            }
            let elapsed = ((timestamp - start) / 1000.0) as f32;
            if let Err(err) = step_frame(&inner, &token, elapsed) {
                detach(&listeners);
                reschedule.borrow_mut().take();
                wasm_bindgen::throw_val(err);
            }
            if let Some(next) = reschedule.borrow().as_ref() {
                if let Err(err) = window.request_animation_frame(next.as_ref().unchecked_ref()) {
                    warn!("could not schedule next frame: {:?}", err);
                }
            }
        }) as Box<dyn FnMut(f64)>));

        let first = callback.borrow();
        let first = first
            .as_ref()
            .ok_or_else(|| JsValue::from_str("frame callback missing"))?;
        self.window
            .request_animation_frame(first.as_ref().unchecked_ref())?;
        info!("backdrop frame loop started");
        Ok(())
    }
}

impl Drop for WebBackdrop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Feed the page scroll position and element positions to the backdrop
fn check_scroll(
    inner: &RefCell<Backdrop<CanvasRenderer>>,
    window: &Window,
    document: &Document,
    start: f64,
) -> Result<(), JsValue> {
    let scroll_y = window.scroll_y()? as f32;
    let targets = ScrollKind::ALL
        .iter()
        .map(|&kind| elements(document, kind.selector()).map(|els| (kind, els)))
        .collect::<Result<Vec<_>, JsValue>>()?;
    let now = seconds_since(window, start);

    inner.borrow_mut().on_scroll(scroll_y, now, |kind, index| {
        targets
            .iter()
            .find(|(k, _)| *k == kind)
            .and_then(|(_, els)| els.get(index))
            .map(|el| viewport_top(el))
    });
    Ok(())
}

fn window_viewport(window: &Window) -> Result<ViewportSize, JsValue> {
    let width = window.inner_width()?.as_f64().unwrap_or(0.0);
    let height = window.inner_height()?.as_f64().unwrap_or(0.0);
    Ok(ViewportSize::new(width.max(0.0) as u32, height.max(0.0) as u32))
}

fn now(window: &Window) -> f64 {
    window
        .performance()
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

fn seconds_since(window: &Window, start: f64) -> f32 {
    ((now(window) - start) / 1000.0) as f32
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    init_logging_once();
    Ok(())
}

fn init_logging_once() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
    });
}
