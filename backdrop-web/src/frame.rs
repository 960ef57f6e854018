/// One animation frame of a shared backdrop
use std::cell::RefCell;

use backdrop_core::{Backdrop, CancellationToken, SceneRenderer};

/// Draw the frame at `elapsed`.
///
/// The backdrop is borrowed only for the draw itself, so input handlers can
/// still reach it after a failed frame. A draw error cancels `token`.
pub fn step_frame<R: SceneRenderer>(
    backdrop: &RefCell<Backdrop<R>>,
    token: &CancellationToken,
    elapsed: f32,
) -> Result<(), R::Error> {
    let result = backdrop.borrow_mut().render_frame(elapsed);
    if result.is_err() {
        token.cancel();
    }
    result
}
