//! World settings: text fields, flags, publish level, spawn points.
//!
//! Renaming, the description, the announcement, and tags accept either a
//! chat line or a form; both channels reach the same handler.

use realmkeep_geometry::Cardinal;
use realmkeep_model::{SpawnKind, SpawnPoint, WorldConfig, WorldFlag};
use tracing::debug;

use super::Ctx;
use crate::error::FlowError;
use crate::event::InputEvent;
use crate::router::{Outcome, TransitionTable};
use crate::session::Session;
use crate::state::MenuState;
use crate::validation::{
    ValidationError, parse_announcement, validate_description, validate_name, validate_tag,
};

pub(crate) fn register(table: &mut TransitionTable) {
    use MenuState::*;

    table
        .item(ViewSettings, "rename", |_, _, _, _| Ok(Outcome::Goto(RenameWorld)))
        .item(ViewSettings, "description", |_, _, _, _| {
            Ok(Outcome::Goto(ChangeDescription))
        })
        .item(ViewSettings, "announcement", |_, _, _, _| {
            Ok(Outcome::Goto(SetAnnouncement))
        })
        .item(ViewSettings, "tags", |_, _, _, _| Ok(Outcome::Goto(EditTags)))
        .item(ViewSettings, "spawn_member", |_, _, _, _| {
            Ok(Outcome::Goto(SetSpawnMember))
        })
        .item(ViewSettings, "spawn_visitor", |_, _, _, _| {
            Ok(Outcome::Goto(SetSpawnVisitor))
        })
        .item(ViewSettings, "pvp", toggle_flag)
        .item(ViewSettings, "mob_spawning", toggle_flag)
        .item(ViewSettings, "fire_spread", toggle_flag)
        .item(ViewSettings, "publish", cycle_publish);

    table
        .prompt(RenameWorld, "rename", rename)
        .prompt(ChangeDescription, "description", describe)
        .prompt(SetAnnouncement, "announcement", announce)
        .prompt(EditTags, "tags", toggle_tag);

    table
        .placement(SetSpawnMember, place_spawn)
        .placement(SetSpawnVisitor, place_spawn)
        .confirm(SetSpawnConfirm, confirm_spawn);
}

fn toggle_flag(
    ctx: &mut Ctx<'_>,
    _session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let Some(flag) = WorldFlag::from_item(&event.discriminator) else {
        return Ok(Outcome::Redraw);
    };
    let enabled = world.flags.toggle(flag);
    ctx.save(world)?;
    debug!(world = %world.id, ?flag, enabled, "flag toggled");
    Ok(Outcome::Redraw)
}

fn cycle_publish(
    ctx: &mut Ctx<'_>,
    _session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    world.publish_level = world.publish_level.next();
    ctx.save(world)?;
    Ok(Outcome::Redraw)
}

fn rename(
    ctx: &mut Ctx<'_>,
    _session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let name = validate_name(event.value("name")?, &ctx.config.text)?;
    if let Some(existing) = ctx.env.worlds.find_by_name(&name) {
        if existing.id != world.id {
            return Err(ValidationError::NameTaken(name).into());
        }
    }
    world.name = name;
    ctx.save(world)?;
    Ok(Outcome::Goto(MenuState::ViewSettings))
}

fn describe(
    ctx: &mut Ctx<'_>,
    _session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    world.description = validate_description(event.value("description")?, &ctx.config.text)?;
    ctx.save(world)?;
    Ok(Outcome::Goto(MenuState::ViewSettings))
}

fn announce(
    ctx: &mut Ctx<'_>,
    _session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    world.announcement = parse_announcement(event.value("announcement")?, &ctx.config.text)?;
    ctx.save(world)?;
    Ok(Outcome::Goto(MenuState::ViewSettings))
}

/// Add the tag if absent, remove it if present.
fn toggle_tag(
    ctx: &mut Ctx<'_>,
    _session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let tag = validate_tag(event.value("tag")?, &ctx.config.text)?;
    if !world.tags.remove(&tag) {
        world.tags.insert(tag);
    }
    ctx.save(world)?;
    Ok(Outcome::Goto(MenuState::ViewSettings))
}

fn place_spawn(
    _ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let kind = match session.state {
        MenuState::SetSpawnVisitor => SpawnKind::Visitor,
        _ => SpawnKind::Member,
    };
    let at = event
        .placement_signal()
        .ok_or(ValidationError::MissingField("placement"))?;
    if !world.border.contains(at.x, at.z) {
        return Err(ValidationError::OutsideBorder.into());
    }
    let point = SpawnPoint {
        x: at.x,
        y: at.y,
        z: at.z,
        facing: Cardinal::from_yaw(at.yaw),
    };
    session.scratch.spawn = Some((kind, point));
    Ok(Outcome::Goto(MenuState::SetSpawnConfirm))
}

fn confirm_spawn(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let Some((kind, point)) = session.scratch.spawn.take() else {
        return Ok(Outcome::Goto(MenuState::ViewSettings));
    };
    *world.spawn_mut(kind) = Some(point);
    ctx.save(world)?;
    Ok(Outcome::Goto(MenuState::ViewSettings))
}
