//! Menu surface: the collaborator that renders menus and messages.
//!
//! Item layout, icons, and localized text belong to the surface. The core
//! only says which state to draw and which notice to deliver.

use std::cell::RefCell;
use std::rc::Rc;

use realmkeep_model::{UserId, WorldConfig, WorldId};

use crate::error::Denial;
use crate::session::Scratch;
use crate::state::MenuState;
use crate::validation::ValidationError;

/// A user-visible message.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Invalid(ValidationError),
    InsufficientBalance { needed: u64, balance: u64 },
    Denied(Denial),
    /// The edited world no longer exists.
    WorldGone,
    PreviewStarted { delay_ticks: u64 },
    Committed { world: WorldId },
    Refunded(u64),
    StoreFailure,
}

pub trait MenuSurface {
    /// Draw `state` for `world`. `scratch` carries workflow values such as a
    /// pending cost.
    fn show(&mut self, user: UserId, world: &WorldConfig, state: MenuState, scratch: &Scratch);

    fn notify(&mut self, user: UserId, notice: Notice);

    /// Close whatever menu or prompt is open.
    fn close(&mut self, user: UserId);

    /// Fall back to the top-level world list, outside any session.
    fn show_root(&mut self, user: UserId);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    Show {
        user: UserId,
        world: WorldId,
        state: MenuState,
    },
    Notify {
        user: UserId,
        notice: Notice,
    },
    Close(UserId),
    Root(UserId),
}

/// Surface that records every call. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    calls: Rc<RefCell<Vec<SurfaceCall>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.borrow().clone()
    }

    /// Last state drawn for `user`.
    pub fn last_shown(&self, user: UserId) -> Option<MenuState> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            SurfaceCall::Show { user: u, state, .. } if *u == user => Some(*state),
            _ => None,
        })
    }

    pub fn went_to_root(&self, user: UserId) -> bool {
        self.calls
            .borrow()
            .iter()
            .any(|call| *call == SurfaceCall::Root(user))
    }

    pub fn notices(&self, user: UserId) -> Vec<Notice> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                SurfaceCall::Notify { user: u, notice } if *u == user => Some(notice.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl MenuSurface for RecordingSurface {
    fn show(&mut self, user: UserId, world: &WorldConfig, state: MenuState, _scratch: &Scratch) {
        self.calls.borrow_mut().push(SurfaceCall::Show {
            user,
            world: world.id,
            state,
        });
    }

    fn notify(&mut self, user: UserId, notice: Notice) {
        self.calls
            .borrow_mut()
            .push(SurfaceCall::Notify { user, notice });
    }

    fn close(&mut self, user: UserId) {
        self.calls.borrow_mut().push(SurfaceCall::Close(user));
    }

    fn show_root(&mut self, user: UserId) {
        self.calls.borrow_mut().push(SurfaceCall::Root(user));
    }
}
