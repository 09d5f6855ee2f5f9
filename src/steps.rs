//! Turning authored steps into steps the renderer can play.
//!
//! Steps without a usable target are dropped here, so the player never sees
//! one. Element lookup is deferred: a step carries a resolver that queries
//! the host only when the renderer reaches it, since sheet objects may not
//! be in the DOM yet when the tour starts.

use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::markdown;
use crate::model::{DialogSize, PopoverAlign, PopoverSide, Step, StepTarget, Tour};
use crate::platform::{ElementRef, Host, SelectorRegistry};

/// CSS class on every popover.
pub const POPOVER_CLASS: &str = "onboard-qs-popover";

/// Fallback size for `custom` dialogs with missing or zero dimensions.
pub const DEFAULT_CUSTOM_WIDTH: u32 = 500;
pub const DEFAULT_CUSTOM_HEIGHT: u32 = 350;

const NO_TITLE: &str = "(No title)";
const NO_DESCRIPTION: &str = "(No description)";

/// Looks up a step's element when the step is shown.
pub type TargetResolver = Box<dyn Fn() -> Option<ElementRef>>;

/// Rendered popover content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popover {
    pub title: String,

    /// Rendered from the step's Markdown description.
    pub html: String,
    pub side: PopoverSide,
    pub align: PopoverAlign,

    /// Replaces the session popover class for this step.
    pub class: Option<String>,
}

impl Popover {
    fn for_step(step: &Step) -> Self {
        Self {
            title: step.popover_title.clone(),
            html: markdown::render(&step.popover_description),
            side: step.popover_side,
            align: step.popover_align,
            class: None,
        }
    }

    /// Content for a single-step preview, with placeholders for blanks.
    pub fn preview(step: &Step) -> Self {
        let title = if step.popover_title.is_empty() {
            NO_TITLE
        } else {
            &step.popover_title
        };
        let description = if step.popover_description.is_empty() {
            NO_DESCRIPTION
        } else {
            &step.popover_description
        };
        Self {
            title: title.to_string(),
            html: markdown::render(description),
            side: step.popover_side,
            align: step.popover_align,
            class: None,
        }
    }
}

/// How a standalone dialog is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogDirective {
    /// A named size, applied through a CSS class.
    Tier(DialogSize),

    /// Explicit pixel dimensions.
    Custom { width: u32, height: u32 },
}

impl DialogDirective {
    pub fn for_step(step: &Step, size: DialogSize) -> Self {
        match size {
            DialogSize::Custom => Self::Custom {
                width: step
                    .custom_dialog_width
                    .filter(|w| *w > 0)
                    .unwrap_or(DEFAULT_CUSTOM_WIDTH),
                height: step
                    .custom_dialog_height
                    .filter(|h| *h > 0)
                    .unwrap_or(DEFAULT_CUSTOM_HEIGHT),
            },
            tier => Self::Tier(tier),
        }
    }

    pub fn size(self) -> DialogSize {
        match self {
            Self::Tier(size) => size,
            Self::Custom { .. } => DialogSize::Custom,
        }
    }

    /// The popover class list for this dialog.
    pub fn popover_class(self) -> String {
        format!("{POPOVER_CLASS} onboard-qs-dialog-{}", self.size().as_str())
    }
}

/// What a runnable step points at.
pub enum StepAnchor {
    /// A host element, found lazily.
    Element {
        selector: String,
        resolve: TargetResolver,
    },

    /// No element: a centered dialog.
    Dialog(DialogDirective),
}

impl fmt::Debug for StepAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element { selector, .. } => {
                f.debug_struct("Element").field("selector", selector).finish()
            }
            Self::Dialog(directive) => f.debug_tuple("Dialog").field(directive).finish(),
        }
    }
}

/// A step ready for the renderer.
#[derive(Debug)]
pub struct RunnableStep {
    pub anchor: StepAnchor,
    pub popover: Popover,
    pub disable_interaction: bool,
}

impl RunnableStep {
    /// Look up the target element now. Dialog steps have none.
    pub fn element(&self) -> Option<ElementRef> {
        match &self.anchor {
            StepAnchor::Element { resolve, .. } => resolve(),
            StepAnchor::Dialog(_) => None,
        }
    }

    /// The CSS selector, for element steps.
    pub fn selector(&self) -> Option<&str> {
        match &self.anchor {
            StepAnchor::Element { selector, .. } => Some(selector),
            StepAnchor::Dialog(_) => None,
        }
    }

    pub fn dialog(&self) -> Option<DialogDirective> {
        match self.anchor {
            StepAnchor::Dialog(directive) => Some(directive),
            StepAnchor::Element { .. } => None,
        }
    }
}

/// Builds [`RunnableStep`]s against one host.
pub struct StepBuilder {
    registry: Rc<SelectorRegistry>,
    host: Rc<dyn Host>,
}

impl StepBuilder {
    pub fn new(registry: Rc<SelectorRegistry>, host: Rc<dyn Host>) -> Self {
        Self { registry, host }
    }

    pub fn host(&self) -> &Rc<dyn Host> {
        &self.host
    }

    /// The steps of `tour` that can be shown, in order.
    pub fn build(&self, tour: &Tour, platform: &str, code_path: &str) -> Vec<RunnableStep> {
        let steps: Vec<RunnableStep> = tour
            .steps
            .iter()
            .filter_map(|step| self.build_step(step, platform, code_path))
            .collect();
        debug!(
            tour = %tour.tour_name,
            authored = tour.steps.len(),
            runnable = steps.len(),
            "built steps"
        );
        steps
    }

    /// A single step, or `None` when it has no usable target.
    pub fn build_step(&self, step: &Step, platform: &str, code_path: &str) -> Option<RunnableStep> {
        let mut popover = Popover::for_step(step);
        let anchor = match step.target()? {
            StepTarget::Dialog(size) => {
                let directive = DialogDirective::for_step(step, size);
                popover.class = Some(directive.popover_class());
                StepAnchor::Dialog(directive)
            }
            StepTarget::Css(selector) => self.element_anchor(selector.to_string()),
            StepTarget::Object(id) => {
                self.element_anchor(self.registry.object_selector(platform, code_path, id))
            }
        };

        Some(RunnableStep {
            anchor,
            popover,
            disable_interaction: step.disable_interaction,
        })
    }

    /// The selector a step's element would be found by, if it has one.
    pub fn selector(&self, step: &Step, platform: &str, code_path: &str) -> Option<String> {
        match step.target()? {
            StepTarget::Dialog(_) => None,
            StepTarget::Css(selector) => Some(selector.to_string()),
            StepTarget::Object(id) => Some(self.registry.object_selector(platform, code_path, id)),
        }
    }

    fn element_anchor(&self, selector: String) -> StepAnchor {
        let host = Rc::clone(&self.host);
        let query = selector.clone();
        StepAnchor::Element {
            selector,
            resolve: Box::new(move || host.query_selector(&query)),
        }
    }
}
