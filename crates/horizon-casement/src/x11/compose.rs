//! Dead-key and Compose-sequence input method.
//!
//! Backed by the libxkbcommon compose tables for the user's locale (the
//! same `Compose` files Xlib's local input method reads). Each window gets
//! its own composition state, addressed by an [`InputContextId`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ffi::OsString;

use tracing::{debug, trace};
use xkbcommon::xkb;
use xkbcommon::xkb::compose::{self, FeedResult, Status};

use horizon_casement_core::logging::targets;

use super::display::{InputContextId, Keysym};

/// What the input method did with a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeOutcome {
    /// Not part of a sequence; the key produces its own text.
    PassThrough,
    /// Swallowed as part of a sequence that is still open or was
    /// cancelled.
    Consumed,
    /// Completed a sequence.
    Committed(String),
}

struct ContextState {
    state: compose::State,
    committed: Option<String>,
}

/// Compose-table input method shared by the windows of one connection.
pub struct ComposeInputMethod {
    table: compose::Table,
    contexts: RefCell<HashMap<InputContextId, ContextState>>,
    next_id: Cell<InputContextId>,
}

/// Locale deciding which compose table applies, following the usual
/// `LC_ALL`, `LC_CTYPE`, `LANG` precedence.
fn current_locale() -> OsString {
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .filter_map(std::env::var_os)
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| OsString::from("C"))
}

impl ComposeInputMethod {
    /// Load the compose table of the current locale. `None` when the
    /// locale has no table.
    pub fn from_locale() -> Option<Self> {
        let locale = current_locale();
        let context = xkb::Context::new(xkb::CONTEXT_NO_FLAGS);
        match compose::Table::new_from_locale(&context, &locale, compose::COMPILE_NO_FLAGS) {
            Ok(table) => {
                debug!(target: targets::DISPLAY, ?locale, "compose table loaded");
                Some(Self::with_table(table))
            }
            Err(()) => {
                debug!(target: targets::DISPLAY, ?locale, "no compose table for locale");
                None
            }
        }
    }

    /// Compile a table from `Compose` file syntax.
    pub fn from_source(source: &str) -> Option<Self> {
        let context = xkb::Context::new(xkb::CONTEXT_NO_FLAGS);
        compose::Table::new_from_buffer(
            &context,
            source,
            "C",
            compose::FORMAT_TEXT_V1,
            compose::COMPILE_NO_FLAGS,
        )
        .ok()
        .map(Self::with_table)
    }

    fn with_table(table: compose::Table) -> Self {
        Self {
            table,
            contexts: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        }
    }

    /// Open a composition context.
    pub fn open(&self) -> InputContextId {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1).max(1));
        let state = compose::State::new(&self.table, compose::STATE_NO_FLAGS);
        self.contexts.borrow_mut().insert(
            id,
            ContextState {
                state,
                committed: None,
            },
        );
        id
    }

    pub fn close(&self, ic: InputContextId) {
        self.contexts.borrow_mut().remove(&ic);
    }

    pub fn context_count(&self) -> usize {
        self.contexts.borrow().len()
    }

    /// Feed a key press. Releases never take part in a sequence.
    pub fn feed(&self, ic: InputContextId, keysym: Keysym, pressed: bool) -> ComposeOutcome {
        if !pressed || keysym == 0 {
            return ComposeOutcome::PassThrough;
        }
        let mut contexts = self.contexts.borrow_mut();
        let Some(ContextState { state, committed }) = contexts.get_mut(&ic) else {
            return ComposeOutcome::PassThrough;
        };

        // Modifier keys are ignored by the table and leave the sequence open.
        if matches!(state.feed(xkb::Keysym::new(keysym)), FeedResult::Ignored) {
            return ComposeOutcome::PassThrough;
        }
        let outcome = match state.status() {
            Status::Nothing => ComposeOutcome::PassThrough,
            Status::Composing => ComposeOutcome::Consumed,
            Status::Cancelled => {
                state.reset();
                ComposeOutcome::Consumed
            }
            Status::Composed => {
                let text = state.utf8().unwrap_or_default();
                state.reset();
                if text.is_empty() {
                    ComposeOutcome::Consumed
                } else {
                    *committed = Some(text.clone());
                    ComposeOutcome::Committed(text)
                }
            }
        };
        trace!(target: targets::EVENTS, ic, keysym, ?outcome, "compose");
        outcome
    }

    /// Take the text committed by the last completed sequence.
    pub fn take_committed(&self, ic: InputContextId) -> Option<String> {
        self.contexts
            .borrow_mut()
            .get_mut(&ic)
            .and_then(|context| context.committed.take())
    }
}

impl std::fmt::Debug for ComposeInputMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposeInputMethod")
            .field("contexts", &self.context_count())
            .finish_non_exhaustive()
    }
}
