//! Border expansion.
//!
//! Symmetric expansion goes straight to the confirmation. Directional
//! expansion first waits for a look-direction signal, snapped to a diagonal.
//! Confirming stages a border preview; the border itself only moves when the
//! pending commit lands.

use realmkeep_geometry::{Direction, ExpansionLevel, expand};
use realmkeep_model::{Preview, WorldConfig};

use super::Ctx;
use crate::config::CoreConfig;
use crate::deferred::CommitAction;
use crate::error::{Denial, FlowError};
use crate::event::InputEvent;
use crate::router::{Outcome, TransitionTable};
use crate::session::Session;
use crate::state::MenuState;
use crate::validation::ValidationError;

pub(crate) fn register(table: &mut TransitionTable) {
    use MenuState::*;

    table
        .item(ExpandMenu, "expand", expand_symmetric)
        .item(ExpandMenu, "expand_directional", expand_directional)
        .placement(ExpandDirectionWait, choose_direction)
        .confirm(ExpandConfirm, confirm_expand);
}

/// The level after one more expansion and the price of reaching it.
fn next_step(config: &CoreConfig, world: &WorldConfig) -> Result<(ExpansionLevel, u64), Denial> {
    let ExpansionLevel::Level(current) = world.expansion_level else {
        return Err(Denial::MaxExpansion);
    };
    let next = world
        .expansion_level
        .next(config.expansion.max_level)
        .ok_or(Denial::MaxExpansion)?;
    Ok((next, config.expansion.costs.cost_for_next(current)))
}

fn expand_symmetric(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let (_, cost) = next_step(ctx.config, world)?;
    session.scratch.direction = None;
    session.scratch.cost = Some(cost);
    Ok(Outcome::Goto(MenuState::ExpandConfirm))
}

fn expand_directional(
    ctx: &mut Ctx<'_>,
    _session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    next_step(ctx.config, world)?;
    Ok(Outcome::Goto(MenuState::ExpandDirectionWait))
}

fn choose_direction(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let at = event
        .placement_signal()
        .ok_or(ValidationError::MissingField("placement"))?;
    let (_, cost) = next_step(ctx.config, world)?;
    session.scratch.direction = Some(Direction::from_yaw(at.yaw));
    session.scratch.cost = Some(cost);
    Ok(Outcome::Goto(MenuState::ExpandConfirm))
}

fn confirm_expand(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    // Priced again: the level may have moved since the menu was drawn.
    let (level, cost) = next_step(ctx.config, world)?;
    let border = expand(world.border, session.scratch.direction);
    let action = CommitAction::Expand {
        border,
        level,
        from_level: world.expansion_level,
    };
    ctx.stage_commit(session.user_id, world, cost, action, Preview::Border(border))
}
