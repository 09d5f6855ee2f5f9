//! The one tour or preview that may be on screen.

use std::rc::Rc;
use std::time::Instant;

use tracing::debug;

use crate::model::{Step, Tour};
use crate::player::{Preview, Renderer, RunContext, SelectorResolutionError, TourPlayer};
use crate::seen::SeenStore;
use crate::steps::StepBuilder;

/// Makes a fresh renderer for each tour or preview.
pub type RendererFactory = Box<dyn FnMut() -> Box<dyn Renderer>>;

enum Active {
    Nothing,
    Tour(TourPlayer),
    Preview(Preview),
}

/// Owns whatever is showing, and guarantees there is at most one.
///
/// Starting a tour or a preview first tears down the current one, which
/// runs its completion handling.
///
/// Nothing here runs on its own. The host calls [`Session::sync`] after
/// renderer events, so a tour the user closed gets marked seen, and either
/// polls [`Session::expire`] or awaits [`Session::expire_when_due`] to take
/// a preview down after [`crate::player::PREVIEW_TIMEOUT`].
pub struct Session {
    builder: StepBuilder,
    seen: Rc<SeenStore>,
    renderers: RendererFactory,
    platform: String,
    code_path: String,
    active: Active,
}

impl Session {
    pub fn new(
        builder: StepBuilder,
        seen: Rc<SeenStore>,
        renderers: RendererFactory,
        platform: impl Into<String>,
        code_path: impl Into<String>,
    ) -> Self {
        Self {
            builder,
            seen,
            renderers,
            platform: platform.into(),
            code_path: code_path.into(),
            active: Active::Nothing,
        }
    }

    /// A run context for this session's seen store.
    pub fn context(&self) -> RunContext {
        RunContext::new(Rc::clone(&self.seen))
    }

    /// Start `tour`. Returns false when it has nothing to show.
    pub fn start_tour(&mut self, tour: &Tour, context: RunContext) -> bool {
        self.cancel();
        let renderer = (self.renderers)();
        match TourPlayer::run(
            tour,
            &self.builder,
            &self.platform,
            &self.code_path,
            renderer,
            context,
        ) {
            Some(player) => {
                self.active = Active::Tour(player);
                true
            }
            None => false,
        }
    }

    /// Highlight a single step until `expire` or `cancel`.
    pub fn preview_step(&mut self, step: &Step, now: Instant) -> Result<(), SelectorResolutionError> {
        self.cancel();
        let renderer = (self.renderers)();
        let preview = Preview::show(
            step,
            &self.builder,
            &self.platform,
            &self.code_path,
            renderer,
            now,
        )?;
        self.active = Active::Preview(preview);
        Ok(())
    }

    /// Dismiss a preview whose time is up. Returns whether one was.
    pub fn expire(&mut self, now: Instant) -> bool {
        if let Active::Preview(preview) = &self.active
            && preview.is_expired(now)
        {
            debug!("preview expired");
            self.cancel();
            return true;
        }
        false
    }

    /// Wait for the preview's deadline, then dismiss it.
    ///
    /// Returns false at once when no preview is showing.
    pub async fn expire_when_due(&mut self) -> bool {
        let Some(deadline) = self.preview_deadline() else {
            return false;
        };
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        self.expire(tokio::time::Instant::now().into_std())
    }

    /// When the current preview is due to expire.
    pub fn preview_deadline(&self) -> Option<Instant> {
        match &self.active {
            Active::Preview(preview) => Some(preview.deadline()),
            _ => None,
        }
    }

    /// Finish whatever the renderer closed on its own.
    ///
    /// The user closing the popover or stepping past the last step ends
    /// the renderer's session without a call to [`Session::cancel`]. This
    /// tears the player down so the tour is marked seen and its completion
    /// callback runs. Returns whether anything was torn down.
    pub fn sync(&mut self) -> bool {
        let closed = match &self.active {
            Active::Nothing => false,
            Active::Tour(player) => !player.is_showing(),
            Active::Preview(preview) => !preview.is_showing(),
        };
        if closed {
            debug!("renderer closed on its own");
            self.cancel();
        }
        closed
    }

    /// Tear down the tour or preview, if any.
    pub fn cancel(&mut self) {
        match std::mem::replace(&mut self.active, Active::Nothing) {
            Active::Nothing => {}
            Active::Tour(mut player) => player.destroy(),
            Active::Preview(mut preview) => preview.dismiss(),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.active, Active::Nothing)
    }

    pub fn is_previewing(&self) -> bool {
        matches!(self.active, Active::Preview(_))
    }

    /// The tour being played, if any.
    pub fn current_tour(&self) -> Option<&Tour> {
        match &self.active {
            Active::Tour(player) => Some(player.tour()),
            _ => None,
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel();
    }
}
