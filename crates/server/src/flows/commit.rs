//! Landing a pending commit.
//!
//! Called exactly once per `PendingCommit`, by whichever trigger removed it
//! from `DeferredCommits`. The preview is cleared first. If the world is gone
//! or has moved on, the debited cost is refunded instead.

use realmkeep_model::WorldConfig;
use tracing::{info, warn};

use super::Ctx;
use crate::deferred::{CommitAction, PendingCommit};
use crate::error::FlowError;
use crate::surface::Notice;

pub(crate) fn execute(ctx: &mut Ctx<'_>, commit: PendingCommit) {
    let PendingCommit {
        user_id,
        world_id,
        cost,
        action,
        scheduled_at,
        ..
    } = commit;
    ctx.env.host.clear_preview(user_id);

    let Some(mut world) = ctx.env.worlds.find_by_id(world_id) else {
        warn!(user = %user_id, world = %world_id, "world vanished before commit; refunding");
        ctx.refund(user_id, cost);
        return;
    };
    if let CommitAction::Expand { from_level, .. } = &action {
        if world.expansion_level != *from_level {
            warn!(
                user = %user_id,
                world = %world_id,
                expected = ?from_level,
                found = ?world.expansion_level,
                "expansion level moved before commit; refunding"
            );
            ctx.refund(user_id, cost);
            return;
        }
    }

    match apply(ctx, &mut world, action, cost) {
        Ok(()) => {
            info!(
                user = %user_id,
                world = %world_id,
                cost,
                waited = ctx.now().saturating_sub(scheduled_at),
                "commit landed"
            );
            ctx.notify_online(user_id, Notice::Committed { world: world_id });
        }
        Err(err) => {
            warn!(user = %user_id, world = %world_id, error = %err, "commit failed; refunding");
            ctx.refund(user_id, cost);
        }
    }
}

fn apply(
    ctx: &mut Ctx<'_>,
    world: &mut WorldConfig,
    action: CommitAction,
    cost: u64,
) -> Result<(), FlowError> {
    match action {
        CommitAction::Expand { border, level, .. } => {
            world.border = border;
            world.expansion_level = level;
            world.total_expansion_cost = world.total_expansion_cost.saturating_add(cost);
            ctx.save(world)?;
            ctx.env.host.apply_border(world.id, border);
            if world.global_overlay.is_some() {
                ctx.repaint_loaded(world);
            }
        }
        CommitAction::GlobalOverlay { label } => {
            world.set_global_overlay(label);
            ctx.save(world)?;
            ctx.repaint_loaded(world);
        }
        CommitAction::PartialOverlay { region } => {
            world.add_overlay_region(region.clone());
            ctx.save(world)?;
            ctx.paint_loaded(world.id, &region);
        }
    }
    Ok(())
}
