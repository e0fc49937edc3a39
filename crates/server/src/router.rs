//! Transition table keyed by `(state, channel, discriminator)`.
//!
//! Handlers are plain function pointers. The same handler may be registered
//! under several keys, which is how a prompt accepts either a chat line or a
//! form submission.
//!
//! Two routes exist for every Prompt and Placement state without being
//! registered: the cancel word on the free-text channel and the `dismiss`
//! form. Both lead to the parent menu.

use std::collections::HashMap;

use realmkeep_model::WorldConfig;

use crate::error::FlowError;
use crate::event::{Channel, InputEvent, LINE, PLACE, Payload};
use crate::flows::{self, Ctx, navigation};
use crate::session::Session;
use crate::state::{MenuState, StateKind};

/// Discriminator of a closed or dismissed form.
pub const DISMISS: &str = "dismiss";

/// What the core does after a handler succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Redraw the current state.
    Redraw,
    Goto(MenuState),
    /// End the session and close the menu.
    Close,
}

pub type Handler =
    fn(&mut Ctx<'_>, &mut Session, &mut WorldConfig, &InputEvent) -> Result<Outcome, FlowError>;

#[derive(Default)]
pub struct TransitionTable {
    routes: HashMap<(MenuState, Channel), HashMap<&'static str, Handler>>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every workflow's routes.
    pub fn standard() -> Self {
        let mut table = Self::new();
        flows::register_all(&mut table);
        table
    }

    pub fn on(
        &mut self,
        state: MenuState,
        channel: Channel,
        discriminator: &'static str,
        handler: Handler,
    ) -> &mut Self {
        self.routes
            .entry((state, channel))
            .or_default()
            .insert(discriminator, handler);
        self
    }

    /// Menu item click.
    pub fn item(&mut self, state: MenuState, item: &'static str, handler: Handler) -> &mut Self {
        self.on(state, Channel::MenuSelect, item, handler)
    }

    /// A prompt value, from a chat line or from `form`.
    pub fn prompt(&mut self, state: MenuState, form: &'static str, handler: Handler) -> &mut Self {
        self.on(state, Channel::FreeText, LINE, handler);
        self.on(state, Channel::FormSubmit, form, handler)
    }

    pub fn placement(&mut self, state: MenuState, handler: Handler) -> &mut Self {
        self.on(state, Channel::Placement, PLACE, handler)
    }

    /// The two options of a confirmation menu.
    pub fn confirm(&mut self, state: MenuState, handler: Handler) -> &mut Self {
        self.item(state, "confirm", handler);
        self.item(state, "cancel", navigation::back)
    }

    pub fn lookup(&self, state: MenuState, channel: Channel, discriminator: &str) -> Option<Handler> {
        self.routes
            .get(&(state, channel))
            .and_then(|handlers| handlers.get(discriminator))
            .copied()
    }

    /// Resolve the handler for `event` in `state`, including built-in cancel routes.
    pub fn route(&self, state: MenuState, event: &InputEvent, cancel_word: &str) -> Option<Handler> {
        if is_cancel(state, event, cancel_word) {
            return Some(navigation::back);
        }
        self.lookup(state, event.channel, &event.discriminator)
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_cancel(state: MenuState, event: &InputEvent, cancel_word: &str) -> bool {
    if !matches!(state.kind(), StateKind::Prompt | StateKind::Placement) {
        return false;
    }
    match (event.channel, &event.payload) {
        (Channel::FreeText, Payload::Text(line)) => line.trim().eq_ignore_ascii_case(cancel_word),
        (Channel::FormSubmit, _) => event.discriminator == DISMISS,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_every_menu_has_back_and_close() {
        let table = TransitionTable::standard();
        for state in MenuState::ALL {
            if state.kind() == StateKind::Menu {
                assert!(table.lookup(state, Channel::MenuSelect, "back").is_some(), "{state:?}");
                assert!(table.lookup(state, Channel::MenuSelect, "close").is_some(), "{state:?}");
            }
        }
    }

    #[test]
    fn test_every_confirmation_has_both_options() {
        let table = TransitionTable::standard();
        for state in MenuState::ALL {
            if state.kind() == StateKind::Confirm {
                assert!(table.lookup(state, Channel::MenuSelect, "confirm").is_some(), "{state:?}");
                assert!(table.lookup(state, Channel::MenuSelect, "cancel").is_some(), "{state:?}");
            }
        }
    }

    #[test]
    fn test_every_prompt_and_placement_accepts_its_channel() {
        let table = TransitionTable::standard();
        for state in MenuState::ALL {
            match state.kind() {
                StateKind::Prompt => {
                    assert!(table.lookup(state, Channel::FreeText, LINE).is_some(), "{state:?}")
                }
                StateKind::Placement => {
                    assert!(table.lookup(state, Channel::Placement, PLACE).is_some(), "{state:?}")
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_shared_handler_for_line_and_form() {
        let table = TransitionTable::standard();
        for (state, form) in [
            (MenuState::RenameWorld, "rename"),
            (MenuState::ChangeDescription, "description"),
            (MenuState::EditTags, "tags"),
        ] {
            let line = table.lookup(state, Channel::FreeText, LINE).unwrap();
            let submitted = table.lookup(state, Channel::FormSubmit, form).unwrap();
            assert!(std::ptr::fn_addr_eq(line, submitted), "{state:?}");
        }
    }

    #[test]
    fn test_cancel_word_only_in_waiting_states() {
        let table = TransitionTable::standard();
        let user = Uuid::new_v4();
        let cancel = InputEvent::text(user, "  CANCEL ", 0);

        assert!(table.route(MenuState::RenameWorld, &cancel, "cancel").is_some());
        assert!(table.route(MenuState::SetSpawnMember, &cancel, "cancel").is_some());

        // A menu has no free-text routes at all.
        assert!(table.route(MenuState::ViewSettings, &cancel, "cancel").is_none());
        // Text that merely starts with the cancel word is a value.
        let other = InputEvent::text(user, "cancellation", 0);
        let line = table.lookup(MenuState::RenameWorld, Channel::FreeText, LINE).unwrap();
        let routed = table.route(MenuState::RenameWorld, &other, "cancel").unwrap();
        assert!(std::ptr::fn_addr_eq(line, routed));
    }

    #[test]
    fn test_dismissed_form_routes_back() {
        let table = TransitionTable::standard();
        let dismissed = InputEvent::form(Uuid::new_v4(), DISMISS, &[], 0);
        assert!(table.route(MenuState::InviteMember, &dismissed, "cancel").is_some());
        assert!(table.route(MenuState::Overview, &dismissed, "cancel").is_none());
    }

    #[test]
    fn test_unmatched_is_none() {
        let table = TransitionTable::standard();
        assert!(table.lookup(MenuState::Overview, Channel::MenuSelect, "no_such_item").is_none());
        assert!(table.lookup(MenuState::Overview, Channel::Placement, PLACE).is_none());
        assert!(!table.is_empty());
    }
}
