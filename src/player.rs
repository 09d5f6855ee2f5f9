//! Driving the external renderer through a tour.
//!
//! The renderer (the library that draws the overlay and popovers) is a black
//! box behind [`Renderer`]. A [`TourPlayer`] is one-shot:
//!
//! ```text
//! Idle ──start──▶ Running ──destroy──▶ Destroyed
//! ```
//!
//! Leaving `Running` marks the tour version seen (when app, sheet, and tour
//! ids are all known) and then calls the completion callback, exactly once.

use std::rc::Rc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::model::{Step, StepTarget, Tour};
use crate::platform::ElementRef;
use crate::seen::{SeenKey, SeenStore};
use crate::steps::{DialogDirective, POPOVER_CLASS, Popover, RunnableStep, StepBuilder};

/// How long a single-step preview stays up.
pub const PREVIEW_TIMEOUT: Duration = Duration::from_secs(3);

const PREVIEW_STAGE_PADDING: u32 = 8;
const PREVIEW_STAGE_RADIUS: u32 = 5;

/// Called once when a running tour ends.
pub type CompletionCallback = Box<dyn FnOnce(&Tour)>;

/// The overlay/popover library.
pub trait Renderer {
    /// Start a guided session over `steps`.
    fn drive(&mut self, steps: Vec<RunnableStep>, options: &SessionOptions);

    /// Show a single popover, on `element` or centered when there is none.
    fn highlight(&mut self, element: Option<ElementRef>, popover: &Popover, options: &HighlightOptions);

    /// Tear down whatever is showing.
    fn destroy(&mut self);

    /// Whether anything is on screen. Goes false on its own when the user
    /// closes the popover or finishes the last step.
    fn is_active(&self) -> bool;
}

/// Options for a guided session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub animate: bool,
    pub smooth_scroll: bool,
    pub allow_close: bool,
    pub allow_keyboard_control: bool,
    pub show_progress: bool,
    pub progress_text: &'static str,
    pub show_buttons: [&'static str; 3],
    pub overlay_color: String,

    /// Fraction, 0.0–1.0.
    pub overlay_opacity: f64,
    pub stage_padding: u32,
    pub stage_radius: u32,
    pub popover_class: &'static str,
    pub next_btn_text: String,
    pub prev_btn_text: String,
    pub done_btn_text: String,
}

impl SessionOptions {
    pub fn for_tour(tour: &Tour) -> Self {
        Self {
            animate: true,
            smooth_scroll: true,
            allow_close: true,
            allow_keyboard_control: tour.allow_keyboard,
            show_progress: tour.show_progress,
            progress_text: "{{current}} of {{total}}",
            show_buttons: ["next", "previous", "close"],
            overlay_color: tour.overlay_color.clone(),
            overlay_opacity: f64::from(tour.overlay_opacity) / 100.0,
            stage_padding: tour.stage_padding,
            stage_radius: tour.stage_radius,
            popover_class: POPOVER_CLASS,
            next_btn_text: tour.next_btn_text.clone(),
            prev_btn_text: tour.prev_btn_text.clone(),
            done_btn_text: tour.done_btn_text.clone(),
        }
    }
}

/// Options for a single-step preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightOptions {
    pub popover_class: String,
    pub stage_padding: u32,
    pub stage_radius: u32,
    pub dialog: Option<DialogDirective>,
}

/// Why a step could not be previewed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorResolutionError {
    #[error("step has no target")]
    NoTarget,

    #[error("element not found for selector {0}")]
    NotFound(String),
}

/// Where the seen-state goes when a tour ends.
pub struct RunContext {
    pub app_id: Option<String>,
    pub sheet_id: Option<String>,
    pub seen: Rc<SeenStore>,
    pub on_complete: Option<CompletionCallback>,
}

impl RunContext {
    pub fn new(seen: Rc<SeenStore>) -> Self {
        Self {
            app_id: None,
            sheet_id: None,
            seen,
            on_complete: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Running,
    Destroyed,
}

/// One playthrough of one tour.
pub struct TourPlayer {
    tour: Tour,
    steps: Vec<RunnableStep>,
    renderer: Box<dyn Renderer>,
    context: RunContext,
    state: PlayerState,
}

impl TourPlayer {
    /// An idle player with its steps built.
    pub fn new(
        tour: &Tour,
        builder: &StepBuilder,
        platform: &str,
        code_path: &str,
        renderer: Box<dyn Renderer>,
        context: RunContext,
    ) -> Self {
        Self {
            steps: builder.build(tour, platform, code_path),
            tour: tour.clone(),
            renderer,
            context,
            state: PlayerState::Idle,
        }
    }

    /// Build and start a player, or `None` if the tour has nothing to show.
    pub fn run(
        tour: &Tour,
        builder: &StepBuilder,
        platform: &str,
        code_path: &str,
        renderer: Box<dyn Renderer>,
        context: RunContext,
    ) -> Option<Self> {
        let mut player = Self::new(tour, builder, platform, code_path, renderer, context);
        player.start().then_some(player)
    }

    /// Hand the steps to the renderer. Returns whether the tour is running.
    pub fn start(&mut self) -> bool {
        if self.state != PlayerState::Idle {
            return self.state == PlayerState::Running;
        }
        if self.steps.is_empty() {
            warn!(tour = %self.tour.tour_name, "tour has no valid steps, nothing to show");
            return false;
        }

        let steps = std::mem::take(&mut self.steps);
        info!(tour = %self.tour.tour_name, steps = steps.len(), "starting tour");
        let options = SessionOptions::for_tour(&self.tour);
        self.renderer.drive(steps, &options);
        self.state = PlayerState::Running;
        true
    }

    /// End the tour. Safe to call any number of times.
    ///
    /// Only the first call on a running tour records it as seen and calls
    /// the completion callback.
    pub fn destroy(&mut self) {
        let was_running = self.state == PlayerState::Running;
        if self.state == PlayerState::Destroyed {
            return;
        }
        self.state = PlayerState::Destroyed;
        if self.renderer.is_active() {
            self.renderer.destroy();
        }
        if !was_running {
            return;
        }

        info!(tour = %self.tour.tour_name, "tour completed or closed");
        if let (Some(app_id), Some(sheet_id), Some(tour_id)) = (
            self.context.app_id.as_deref(),
            self.context.sheet_id.as_deref(),
            self.tour.id(),
        ) {
            self.context.seen.mark_seen(SeenKey {
                app_id,
                sheet_id,
                tour_id,
                tour_version: self.tour.tour_version,
            });
        }
        if let Some(on_complete) = self.context.on_complete.take() {
            on_complete(&self.tour);
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    /// Running, and the renderer still shows it.
    pub fn is_showing(&self) -> bool {
        self.state == PlayerState::Running && self.renderer.is_active()
    }

    pub fn tour(&self) -> &Tour {
        &self.tour
    }
}

impl Drop for TourPlayer {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// A single highlighted step, shown until dismissed or expired.
pub struct Preview {
    renderer: Box<dyn Renderer>,
    deadline: Instant,
    dismissed: bool,
}

impl Preview {
    /// Highlight `step` now.
    ///
    /// Dialog steps are always shown. Element steps fail when the element
    /// cannot be found, and nothing is shown.
    pub fn show(
        step: &Step,
        builder: &StepBuilder,
        platform: &str,
        code_path: &str,
        mut renderer: Box<dyn Renderer>,
        now: Instant,
    ) -> Result<Self, SelectorResolutionError> {
        let popover = Popover::preview(step);
        let (element, options) = match step.target().ok_or(SelectorResolutionError::NoTarget)? {
            StepTarget::Dialog(size) => {
                let directive = DialogDirective::for_step(step, size);
                let options = HighlightOptions {
                    popover_class: directive.popover_class(),
                    stage_padding: PREVIEW_STAGE_PADDING,
                    stage_radius: PREVIEW_STAGE_RADIUS,
                    dialog: Some(directive),
                };
                (None, options)
            }
            StepTarget::Css(_) | StepTarget::Object(_) => {
                let selector = builder
                    .selector(step, platform, code_path)
                    .ok_or(SelectorResolutionError::NoTarget)?;
                let Some(element) = builder.host().query_selector(&selector) else {
                    warn!(%selector, "cannot highlight: element not found");
                    return Err(SelectorResolutionError::NotFound(selector));
                };
                let options = HighlightOptions {
                    popover_class: POPOVER_CLASS.to_string(),
                    stage_padding: PREVIEW_STAGE_PADDING,
                    stage_radius: PREVIEW_STAGE_RADIUS,
                    dialog: None,
                };
                (Some(element), options)
            }
        };

        renderer.highlight(element, &popover, &options);
        Ok(Self {
            renderer,
            deadline: now + PREVIEW_TIMEOUT,
            dismissed: false,
        })
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Not dismissed, and the renderer still shows it.
    pub fn is_showing(&self) -> bool {
        !self.dismissed && self.renderer.is_active()
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Take the preview down. Safe to call more than once.
    pub fn dismiss(&mut self) {
        if self.dismissed {
            return;
        }
        self.dismissed = true;
        if self.renderer.is_active() {
            self.renderer.destroy();
        }
    }
}

impl Drop for Preview {
    fn drop(&mut self) {
        self.dismiss();
    }
}


#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::testing::{Call, Recorder};
    use super::*;
    use crate::model::DialogSize;
    use crate::platform::testing::FakeHost;
    use crate::platform::{Host, SelectorRegistry};
    use crate::storage::MemoryStore;

    fn setup() -> (Rc<FakeHost>, StepBuilder, Rc<SeenStore>) {
        let host = Rc::new(FakeHost::default());
        let dyn_host: Rc<dyn Host> = host.clone();
        let builder = StepBuilder::new(Rc::new(SelectorRegistry::builtin()), dyn_host);
        (host, builder, Rc::new(SeenStore::new(MemoryStore::new())))
    }

    fn tour() -> Tour {
        let mut tour = Tour::new("t0", "Intro");
        tour.tour_version = 3;
        tour.overlay_opacity = 45;
        tour.steps = vec![
            Step::dialog(DialogSize::Small, "Welcome"),
            Step::object("abc", "Sales"),
        ];
        tour
    }

    fn context(seen: &Rc<SeenStore>) -> RunContext {
        RunContext {
            app_id: Some("app".to_string()),
            sheet_id: Some("sheet".to_string()),
            ..RunContext::new(Rc::clone(seen))
        }
    }

    fn key(version: u32) -> SeenKey<'static> {
        SeenKey {
            app_id: "app",
            sheet_id: "sheet",
            tour_id: "t0",
            tour_version: version,
        }
    }

    #[test]
    fn session_options_from_tour() {
        let options = SessionOptions::for_tour(&tour());
        assert!((options.overlay_opacity - 0.45).abs() < f64::EPSILON);
        assert_eq!(options.progress_text, "{{current}} of {{total}}");
        assert_eq!(options.popover_class, "onboard-qs-popover");
        assert_eq!(options.show_buttons, ["next", "previous", "close"]);
        assert_eq!(options.next_btn_text, "Next");
        assert!(options.allow_close && options.animate && options.smooth_scroll);
    }

    #[test]
    fn run_drives_renderer() {
        let (_host, builder, seen) = setup();
        let recorder = Recorder::default();

        let player = TourPlayer::run(
            &tour(),
            &builder,
            "client-managed",
            "default",
            recorder.boxed(),
            context(&seen),
        )
        .unwrap();

        assert_eq!(player.state(), PlayerState::Running);
        assert!(matches!(recorder.calls()[..], [Call::Drive { steps: 2, .. }]));
    }

    #[test]
    fn nothing_to_play_returns_none() {
        let (_host, builder, seen) = setup();
        let mut empty = tour();
        empty.steps = vec![Step::object("", "no target")];
        let recorder = Recorder::default();

        let player = TourPlayer::run(
            &empty,
            &builder,
            "cloud",
            "default",
            recorder.boxed(),
            context(&seen),
        );
        assert!(player.is_none());
        assert!(recorder.calls().is_empty());
        assert!(!seen.has_seen(key(3)));
    }

    #[test]
    fn destroy_marks_seen_then_calls_back_once() {
        let (_host, builder, seen) = setup();
        let recorder = Recorder::default();
        let completed = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&completed);
        let seen_at_callback = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&seen_at_callback);
        let seen_in_callback = Rc::clone(&seen);

        let mut ctx = context(&seen);
        ctx.on_complete = Some(Box::new(move |tour: &Tour| {
            *slot.borrow_mut() = Some(seen_in_callback.has_seen(key(3)));
            sink.borrow_mut().push(tour.tour_name.clone());
        }));

        let mut player = TourPlayer::run(
            &tour(),
            &builder,
            "client-managed",
            "default",
            recorder.boxed(),
            ctx,
        )
        .unwrap();

        player.destroy();
        player.destroy();
        drop(player);

        assert_eq!(*completed.borrow(), ["Intro"]);
        assert_eq!(*seen_at_callback.borrow(), Some(true));
        assert!(seen.has_seen(key(3)));
        assert!(!seen.has_seen(key(2)));
        assert_eq!(recorder.destroys(), 1);
    }

    #[test]
    fn missing_ids_skip_seen_but_still_complete() {
        let (_host, builder, seen) = setup();
        let done = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&done);
        let ctx = RunContext {
            on_complete: Some(Box::new(move |_: &Tour| *flag.borrow_mut() = true)),
            ..RunContext::new(Rc::clone(&seen))
        };

        let mut player = TourPlayer::run(
            &tour(),
            &builder,
            "client-managed",
            "default",
            Recorder::default().boxed(),
            ctx,
        )
        .unwrap();
        player.destroy();

        assert!(*done.borrow());
        assert!(!seen.has_seen(key(3)));
    }

    #[test]
    fn user_close_is_seen_by_is_showing() {
        let (_host, builder, seen) = setup();
        let recorder = Recorder::default();
        let mut player = TourPlayer::run(
            &tour(),
            &builder,
            "client-managed",
            "default",
            recorder.boxed(),
            context(&seen),
        )
        .unwrap();
        assert!(player.is_showing());

        recorder.close();
        assert!(!player.is_showing());

        player.destroy();
        assert!(seen.has_seen(key(3)));
        assert_eq!(recorder.destroys(), 0);
    }

    #[test]
    fn destroying_idle_player_is_silent() {
        let (_host, builder, seen) = setup();
        let recorder = Recorder::default();
        let mut player = TourPlayer::new(
            &tour(),
            &builder,
            "client-managed",
            "default",
            recorder.boxed(),
            context(&seen),
        );

        player.destroy();
        assert_eq!(player.state(), PlayerState::Destroyed);
        assert!(!player.start());
        assert!(recorder.calls().is_empty());
        assert!(!seen.has_seen(key(3)));
    }

    #[test]
    fn preview_element_step() {
        let (host, builder, _seen) = setup();
        host.add_element(".qv-object-abc", "el-abc");
        let recorder = Recorder::default();
        let now = Instant::now();

        let preview = Preview::show(
            &Step::object("abc", ""),
            &builder,
            "client-managed",
            "default",
            recorder.boxed(),
            now,
        )
        .unwrap();

        match &recorder.calls()[..] {
            [Call::Highlight { element, popover, options }] => {
                assert_eq!(element, &Some(ElementRef("el-abc".to_string())));
                assert_eq!(popover.title, "(No title)");
                assert_eq!(options.popover_class, "onboard-qs-popover");
                assert_eq!((options.stage_padding, options.stage_radius), (8, 5));
            }
            calls => panic!("unexpected calls: {calls:?}"),
        }
        assert!(!preview.is_expired(now + Duration::from_millis(2999)));
        assert!(preview.is_expired(now + PREVIEW_TIMEOUT));
    }

    #[test]
    fn preview_missing_element_shows_nothing() {
        let (_host, builder, _seen) = setup();
        let recorder = Recorder::default();

        let result = Preview::show(
            &Step::css("#gone", "t"),
            &builder,
            "cloud",
            "default",
            recorder.boxed(),
            Instant::now(),
        );
        assert_eq!(
            result.err(),
            Some(SelectorResolutionError::NotFound("#gone".to_string()))
        );
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn preview_dialog_needs_no_element() {
        let (_host, builder, _seen) = setup();
        let recorder = Recorder::default();
        let mut step = Step::dialog(DialogSize::Custom, "Hi");
        step.custom_dialog_width = Some(700);

        let mut preview = Preview::show(
            &step,
            &builder,
            "cloud",
            "default",
            recorder.boxed(),
            Instant::now(),
        )
        .unwrap();
        preview.dismiss();
        preview.dismiss();

        match &recorder.calls()[..] {
            [Call::Highlight { element: None, options, .. }, Call::Destroy] => {
                assert_eq!(
                    options.dialog,
                    Some(DialogDirective::Custom {
                        width: 700,
                        height: 350
                    })
                );
                assert_eq!(options.popover_class, "onboard-qs-popover onboard-qs-dialog-custom");
            }
            calls => panic!("unexpected calls: {calls:?}"),
        }
    }
}
