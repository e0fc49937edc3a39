//! Moving between menus: back, close, cancel, and the overview entries.

use realmkeep_model::WorldConfig;

use super::{Ctx, require_member, require_owner};
use crate::error::FlowError;
use crate::event::InputEvent;
use crate::router::{Outcome, TransitionTable};
use crate::session::Session;
use crate::state::{MenuState, StateKind};

pub(crate) fn register(table: &mut TransitionTable) {
    for state in MenuState::ALL {
        match state.kind() {
            StateKind::Menu => {
                table.item(state, "back", back);
                table.item(state, "close", close);
            }
            StateKind::Prompt | StateKind::Placement => {
                table.item(state, "cancel", back);
            }
            // Confirmations register their own pair.
            StateKind::Confirm => {}
        }
    }

    table
        .item(MenuState::Overview, "settings", open_settings)
        .item(MenuState::Overview, "members", open_members)
        .item(MenuState::Overview, "visitors", open_visitors)
        .item(MenuState::Overview, "environment", open_environment)
        .item(MenuState::Overview, "critical", open_critical)
        .item(MenuState::Overview, "expand", open_expand);
}

/// One level up. A confirmation returns to whatever opened it; the root closes.
pub fn back(
    _ctx: &mut Ctx<'_>,
    session: &mut Session,
    _world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let state = session.state;
    if state == MenuState::Overview {
        return Ok(Outcome::Close);
    }
    let target = match state.kind() {
        StateKind::Confirm => session.scratch.return_to.unwrap_or(state.parent()),
        _ => state.parent(),
    };
    Ok(Outcome::Goto(target))
}

pub fn close(
    _ctx: &mut Ctx<'_>,
    _session: &mut Session,
    _world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    Ok(Outcome::Close)
}

fn open_settings(
    _ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_member(session, world)?;
    Ok(Outcome::Goto(MenuState::ViewSettings))
}

fn open_members(
    _ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_owner(session, world)?;
    Ok(Outcome::Goto(MenuState::ManageMembers))
}

fn open_visitors(
    _ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_member(session, world)?;
    Ok(Outcome::Goto(MenuState::ManageVisitors))
}

fn open_environment(
    _ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_member(session, world)?;
    Ok(Outcome::Goto(MenuState::ViewEnvironment))
}

fn open_critical(
    _ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_owner(session, world)?;
    Ok(Outcome::Goto(MenuState::CriticalSettings))
}

fn open_expand(
    _ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_member(session, world)?;
    Ok(Outcome::Goto(MenuState::ExpandMenu))
}
