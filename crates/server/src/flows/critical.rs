//! Owner-only operations: transfer, delete, expansion reset.

use realmkeep_geometry::{ExpansionLevel, reset};
use realmkeep_model::{WorldConfig, WorldId};
use tracing::info;

use super::{Ctx, require_owner};
use crate::error::{Denial, FlowError};
use crate::event::InputEvent;
use crate::router::{Outcome, TransitionTable};
use crate::session::Session;
use crate::state::MenuState;
use crate::validation::ValidationError;

pub(crate) fn register(table: &mut TransitionTable) {
    use MenuState::*;

    table
        .item(CriticalSettings, "transfer", |_, _, _, _| {
            Ok(Outcome::Goto(TransferOwnership))
        })
        .item(CriticalSettings, "delete", |_, _, _, _| {
            Ok(Outcome::Goto(DeleteWorldConfirm))
        })
        .item(CriticalSettings, "reset_expansion", open_reset)
        .prompt(TransferOwnership, "transfer", pick_heir)
        .confirm(TransferConfirm, transfer)
        .confirm(DeleteWorldConfirm, delete)
        .confirm(ResetExpansionConfirm, reset_expansion);
}

fn pick_heir(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let user = ctx.resolve_player(event.value("player")?)?;
    if world.is_owner(user) {
        return Err(ValidationError::OwnerImmune.into());
    }
    if !world.members.contains(&user) {
        return Err(ValidationError::NotAMember.into());
    }
    session.scratch.subject = Some(user);
    Ok(Outcome::Goto(MenuState::TransferConfirm))
}

fn transfer(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_owner(session, world)?;
    let Some(heir) = session.scratch.subject else {
        return Ok(Outcome::Goto(MenuState::CriticalSettings));
    };
    if !world.members.contains(&heir) {
        return Err(ValidationError::NotAMember.into());
    }
    world.transfer_to(heir);
    ctx.save(world)?;
    ctx.update_stats(session.user_id, |stats| {
        stats.owned_worlds.remove(&world.id);
    })?;
    ctx.update_stats(heir, |stats| {
        stats.owned_worlds.insert(world.id);
    })?;
    info!(world = %world.id, from = %session.user_id, to = %heir, "ownership transferred");
    Ok(Outcome::Goto(MenuState::Overview))
}

fn delete(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_owner(session, world)?;
    let id: WorldId = world.id;
    ctx.env.worlds.delete(id)?;
    ctx.env.host.delete_world(id);
    ctx.update_stats(world.owner, |stats| {
        stats.owned_worlds.remove(&id);
        if stats.last_world == Some(id) {
            stats.last_world = None;
        }
    })?;
    info!(world = %id, name = %world.name, "world deleted");
    Ok(Outcome::Close)
}

fn open_reset(
    _ctx: &mut Ctx<'_>,
    _session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    if world.expansion_level == ExpansionLevel::INITIAL && world.total_expansion_cost == 0 {
        return Err(Denial::NothingToReset.into());
    }
    Ok(Outcome::Goto(MenuState::ResetExpansionConfirm))
}

/// Back to the initial border, refunding part of what expansions cost.
///
/// The refund goes to the owner. Members may have paid for some levels, but
/// `total_expansion_cost` pools every payment and only the owner may reset.
fn reset_expansion(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_owner(session, world)?;
    let expansion = &ctx.config.expansion;
    let outcome = reset(
        expansion.initial_border(),
        world.total_expansion_cost,
        expansion.refund_rate,
    );
    world.border = outcome.border;
    world.expansion_level = outcome.level;
    world.total_expansion_cost = 0;
    ctx.save(world)?;

    ctx.env.host.apply_border(world.id, world.border);
    if world.global_overlay.is_some() {
        ctx.repaint_loaded(world);
    }
    if ctx.env.ledger.is_available() {
        ctx.refund(session.user_id, outcome.refund);
    }
    info!(world = %world.id, refund = outcome.refund, "expansion reset");
    Ok(Outcome::Goto(MenuState::CriticalSettings))
}
