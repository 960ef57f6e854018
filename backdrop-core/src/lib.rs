/// Backdrop Core Library - Scene model and animation for the animated page backdrop
///
/// This library provides the platform-independent parts of the backdrop:
/// scene construction, per-frame updates, camera projection, the entry reveal
/// timeline, the scroll-triggered page effects and the explicit render loop
/// that frontends plug a renderer into.

pub mod color;
pub mod config;
pub mod easing;
pub mod geometry;
pub mod input;
pub mod particles;
pub mod projection;
pub mod render_loop;
pub mod reveal;
pub mod scene;
pub mod scroll;
pub mod solids;
pub mod transform;
pub mod viewport;

// Re-export commonly used types
pub use color::Rgb;
pub use config::SceneConfig;
pub use geometry::Mesh;
pub use input::{CursorFollower, PointerOffset};
pub use projection::Camera;
pub use render_loop::{
    Backdrop, CancellationToken, FrameClock, FrameOverlay, ManualClock, RenderLoop, SceneRenderer,
    SystemClock,
};
pub use reveal::{ElementState, RevealFrame, RevealGroup, RevealSequence};
pub use scene::Scene;
pub use scroll::{ScrollEffects, ScrollFrame, ScrollKind};
pub use solids::{FloatingSolid, SolidKind};
pub use transform::{RotationState, Transform};
pub use viewport::ViewportSize;
