//! Environmental overlays.
//!
//! A global overlay covers the whole territory; partial overlays are circles
//! painted on top. Both are previewed and committed later. Clearing removes
//! the partial overlays at once and repaints what is loaded.

use realmkeep_geometry::{Cell, OverlayRegion};
use realmkeep_model::{Preview, WorldConfig};
use tracing::info;

use super::Ctx;
use crate::deferred::CommitAction;
use crate::error::FlowError;
use crate::event::InputEvent;
use crate::router::{Outcome, TransitionTable};
use crate::session::Session;
use crate::state::MenuState;
use crate::validation::{ValidationError, parse_radius, validate_overlay};

pub(crate) fn register(table: &mut TransitionTable) {
    use MenuState::*;

    table
        .item(ViewEnvironment, "global", |_, _, _, _| {
            Ok(Outcome::Goto(PickGlobalOverlay))
        })
        .item(ViewEnvironment, "partial", |_, _, _, _| {
            Ok(Outcome::Goto(PickPartialOverlay))
        })
        .item(ViewEnvironment, "clear", |_, _, _, _| {
            Ok(Outcome::Goto(ClearOverlaysConfirm))
        })
        .item(PickGlobalOverlay, "pick", pick_global)
        .item(PickPartialOverlay, "pick", pick_partial)
        .prompt(PartialOverlayRadius, "radius", set_radius)
        .placement(PartialOverlayPlace, place_center)
        .confirm(GlobalOverlayConfirm, confirm_global)
        .confirm(PartialOverlayConfirm, confirm_partial)
        .confirm(ClearOverlaysConfirm, clear_overlays);
}

fn picked_label(ctx: &Ctx<'_>, event: &InputEvent) -> Result<String, ValidationError> {
    let raw = event
        .field("label")
        .ok_or(ValidationError::MissingField("label"))?;
    validate_overlay(raw, &ctx.config.overlay)
}

fn pick_global(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    _world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let label = picked_label(ctx, event)?;
    session.scratch.overlay_label = Some(label);
    session.scratch.cost = Some(ctx.config.overlay.global_cost);
    Ok(Outcome::Goto(MenuState::GlobalOverlayConfirm))
}

fn pick_partial(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    _world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let label = picked_label(ctx, event)?;
    session.scratch.overlay_label = Some(label);
    Ok(Outcome::Goto(MenuState::PartialOverlayRadius))
}

fn set_radius(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    _world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let radius = parse_radius(event.value("radius")?, &ctx.config.overlay)?;
    session.scratch.radius = Some(radius);
    Ok(Outcome::Goto(MenuState::PartialOverlayPlace))
}

fn place_center(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let at = event
        .placement_signal()
        .ok_or(ValidationError::MissingField("placement"))?;
    if !world.border.contains(at.x, at.z) {
        return Err(ValidationError::OutsideBorder.into());
    }
    let Some(radius) = session.scratch.radius else {
        return Ok(Outcome::Goto(MenuState::ViewEnvironment));
    };
    let per_radius = ctx.config.overlay.partial_cost_per_radius;
    session.scratch.center = Some(Cell::containing(at.x, at.z));
    session.scratch.cost = Some(per_radius.saturating_mul(u64::from(radius.unsigned_abs())));
    Ok(Outcome::Goto(MenuState::PartialOverlayConfirm))
}

fn confirm_global(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let Some(label) = session.scratch.overlay_label.clone() else {
        return Ok(Outcome::Goto(MenuState::ViewEnvironment));
    };
    let cost = ctx.config.overlay.global_cost;
    let preview = Preview::Global {
        label: label.clone(),
        border: world.border,
    };
    ctx.stage_commit(
        session.user_id,
        world,
        cost,
        CommitAction::GlobalOverlay { label },
        preview,
    )
}

fn confirm_partial(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    let scratch = &session.scratch;
    let (Some(label), Some(radius), Some(center), Some(cost)) = (
        scratch.overlay_label.clone(),
        scratch.radius,
        scratch.center,
        scratch.cost,
    ) else {
        return Ok(Outcome::Goto(MenuState::ViewEnvironment));
    };
    let region = OverlayRegion::new(center, radius, label);
    ctx.stage_commit(
        session.user_id,
        world,
        cost,
        CommitAction::PartialOverlay {
            region: region.clone(),
        },
        Preview::Region(region),
    )
}

fn clear_overlays(
    ctx: &mut Ctx<'_>,
    _session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    if !world.overlay_regions.is_empty() {
        world.overlay_regions.clear();
        ctx.save(world)?;
        let repainted = ctx.repaint_loaded(world);
        info!(world = %world.id, repainted, "partial overlays cleared");
    }
    Ok(Outcome::Goto(MenuState::ViewEnvironment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dispatch;
    use crate::testkit::Harness;

    #[test]
    fn test_global_overlay_supersedes_partials_and_repaints() {
        let mut h = Harness::new();
        let owner = h.owner;
        let mut world = h.world();
        world.add_overlay_region(OverlayRegion::new(Cell::new(0, 0), 4, "jungle"));
        h.store(&world);
        h.host.load_unit(h.world_id, 0, 0);

        h.open(owner);
        h.click(owner, "environment");
        h.click(owner, "global");
        assert_eq!(h.click_with(owner, "pick", &[("label", "nether")]), Dispatch::Rejected);
        h.click_with(owner, "pick", &[("label", "Desert")]);
        assert_eq!(h.state(owner), Some(MenuState::GlobalOverlayConfirm));
        h.click(owner, "confirm");
        assert_eq!(h.balance(owner), 10_000 - 500);

        h.ticks(h.config().preview_delay_ticks);

        let world = h.world();
        assert_eq!(world.global_overlay.as_deref(), Some("desert"));
        assert!(world.overlay_regions.is_empty());
        let unit = h.host.unit(h.world_id, 0, 0).unwrap();
        assert_eq!(unit.count("desert"), 256);
        assert_eq!(unit.count("jungle"), 0);
    }

    #[test]
    fn test_partial_overlay_workflow() {
        let mut h = Harness::new();
        let owner = h.owner;
        h.host.load_unit(h.world_id, 0, 0);
        h.open(owner);
        h.click(owner, "environment");
        h.click(owner, "partial");
        h.click_with(owner, "pick", &[("label", "jungle")]);
        assert_eq!(h.state(owner), Some(MenuState::PartialOverlayRadius));

        assert_eq!(h.say(owner, "ten"), Dispatch::Rejected);
        assert_eq!(h.say(owner, "99"), Dispatch::Rejected);
        h.submit(owner, "radius", &[("radius", "3")]);
        assert_eq!(h.state(owner), Some(MenuState::PartialOverlayPlace));

        h.place(owner, 8.7, 8.2, 0.0);
        assert_eq!(h.state(owner), Some(MenuState::PartialOverlayConfirm));
        h.click(owner, "confirm");
        assert_eq!(h.balance(owner), 10_000 - 30);

        h.ticks(h.config().preview_delay_ticks);

        let world = h.world();
        assert_eq!(
            world.overlay_regions,
            vec![OverlayRegion::new(Cell::new(8, 8), 3, "jungle")]
        );
        let unit = h.host.unit(h.world_id, 0, 0).unwrap();
        assert_eq!(unit.label(Cell::new(8, 8)), Some("jungle"));
        assert_eq!(unit.label(Cell::new(11, 8)), Some("jungle"));
        assert_eq!(unit.label(Cell::new(11, 11)), None);
    }

    #[test]
    fn test_clear_keeps_global() {
        let mut h = Harness::new();
        let owner = h.owner;
        let mut world = h.world();
        world.set_global_overlay("plains");
        world.add_overlay_region(OverlayRegion::new(Cell::new(2, 2), 2, "jungle"));
        h.store(&world);
        h.load_unit(0, 0);
        assert!(h.host.unit(h.world_id, 0, 0).unwrap().count("jungle") > 0);

        h.open(owner);
        h.click(owner, "environment");
        h.click(owner, "clear");
        h.click(owner, "confirm");

        let world = h.world();
        assert!(world.overlay_regions.is_empty());
        assert_eq!(world.global_overlay.as_deref(), Some("plains"));
        let unit = h.host.unit(h.world_id, 0, 0).unwrap();
        assert_eq!(unit.count("jungle"), 0);
        assert_eq!(unit.count("plains"), 256);
        assert_eq!(h.state(owner), Some(MenuState::ViewEnvironment));
    }
}
