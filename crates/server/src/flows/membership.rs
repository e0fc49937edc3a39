//! Members and visitors.
//!
//! Only the owner manages members. Any member may ban or unban visitors, but
//! banning someone who is a member takes the owner. The owner is immune to
//! all of it.

use realmkeep_model::WorldConfig;
use tracing::info;

use super::{Ctx, require_member, require_owner, subject_arg};
use crate::error::{Denial, FlowError};
use crate::event::InputEvent;
use crate::router::{Outcome, TransitionTable};
use crate::session::Session;
use crate::state::MenuState;
use crate::validation::ValidationError;

pub(crate) fn register(table: &mut TransitionTable) {
    use MenuState::*;

    table
        .item(Overview, "leave", leave)
        .item(ManageMembers, "invite", |_, _, _, _| Ok(Outcome::Goto(InviteMember)))
        .item(ManageMembers, "remove", pick_removal)
        .item(ManageVisitors, "ban", |_, _, _, _| Ok(Outcome::Goto(BanVisitor)))
        .item(ManageVisitors, "unban", unban)
        .prompt(InviteMember, "invite", invite)
        .prompt(BanVisitor, "ban", ban)
        .confirm(RemoveMemberConfirm, remove);
}

/// A member gives up their own membership.
fn leave(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    if world.is_owner(session.user_id) {
        return Err(Denial::OwnerCannotLeave.into());
    }
    if !world.remove_member(session.user_id) {
        return Err(Denial::NotMember.into());
    }
    ctx.save(world)?;
    info!(user = %session.user_id, world = %world.id, "member left");
    Ok(Outcome::Close)
}

fn invite(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_owner(session, world)?;
    let user = ctx.resolve_player(event.value("player")?)?;
    if world.is_owner(user) {
        return Err(ValidationError::OwnerImmune.into());
    }
    if !world.add_member(user) {
        return Err(ValidationError::AlreadyMember.into());
    }
    ctx.save(world)?;
    info!(world = %world.id, member = %user, "member invited");
    Ok(Outcome::Goto(MenuState::ManageMembers))
}

fn pick_removal(
    _ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_owner(session, world)?;
    let user = subject_arg(event)?;
    if world.is_owner(user) {
        return Err(ValidationError::OwnerImmune.into());
    }
    if !world.members.contains(&user) {
        return Err(ValidationError::NotAMember.into());
    }
    session.scratch.subject = Some(user);
    Ok(Outcome::Goto(MenuState::RemoveMemberConfirm))
}

fn remove(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    _event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_owner(session, world)?;
    let Some(user) = session.scratch.subject.take() else {
        return Ok(Outcome::Goto(MenuState::ManageMembers));
    };
    if world.remove_member(user) {
        ctx.save(world)?;
        info!(world = %world.id, member = %user, "member removed");
    }
    Ok(Outcome::Goto(MenuState::ManageMembers))
}

fn ban(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_member(session, world)?;
    let user = ctx.resolve_player(event.value("player")?)?;
    if world.is_owner(user) {
        return Err(ValidationError::OwnerImmune.into());
    }
    if world.members.contains(&user) {
        require_owner(session, world)?;
    }
    if world.ban(user) {
        ctx.save(world)?;
        info!(world = %world.id, visitor = %user, "visitor banned");
    }
    Ok(Outcome::Goto(MenuState::ManageVisitors))
}

fn unban(
    ctx: &mut Ctx<'_>,
    session: &mut Session,
    world: &mut WorldConfig,
    event: &InputEvent,
) -> Result<Outcome, FlowError> {
    require_member(session, world)?;
    let user = subject_arg(event)?;
    if world.unban(user) {
        ctx.save(world)?;
    }
    Ok(Outcome::Redraw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dispatch;
    use crate::surface::Notice;
    use crate::testkit::Harness;

    #[test]
    fn test_invite_resolves_names() {
        let mut h = Harness::new();
        let owner = h.owner;
        let bea = h.join("Bea");
        h.open(owner);
        h.click(owner, "members");
        h.click(owner, "invite");

        assert_eq!(h.say(owner, "nobody"), Dispatch::Rejected);
        assert_eq!(h.state(owner), Some(MenuState::InviteMember));

        assert_eq!(h.say(owner, "bea"), Dispatch::Accepted);
        assert!(h.world().members.contains(&bea));
        assert_eq!(h.state(owner), Some(MenuState::ManageMembers));

        h.click(owner, "invite");
        assert_eq!(h.submit(owner, "invite", &[("player", "Bea")]), Dispatch::Rejected);
        h.say(owner, "Owner");
        assert_eq!(
            h.surface.notices(owner),
            vec![
                Notice::Invalid(ValidationError::UnknownPlayer("nobody".to_string())),
                Notice::Invalid(ValidationError::AlreadyMember),
                Notice::Invalid(ValidationError::OwnerImmune),
            ]
        );
    }

    #[test]
    fn test_remove_member_through_confirmation() {
        let mut h = Harness::new();
        let owner = h.owner;
        let bea = h.add_member("Bea");
        h.open(owner);
        h.click(owner, "members");

        let bea_arg = bea.to_string();
        h.click_with(owner, "remove", &[("user", &bea_arg)]);
        assert_eq!(h.state(owner), Some(MenuState::RemoveMemberConfirm));
        h.click(owner, "cancel");
        assert_eq!(h.state(owner), Some(MenuState::ManageMembers));
        assert!(h.world().members.contains(&bea));

        h.click_with(owner, "remove", &[("user", &bea_arg)]);
        h.click(owner, "confirm");
        assert!(!h.world().members.contains(&bea));
        assert_eq!(h.state(owner), Some(MenuState::ManageMembers));
    }

    #[test]
    fn test_owner_cannot_be_removed() {
        let mut h = Harness::new();
        let owner = h.owner;
        h.open(owner);
        h.click(owner, "members");
        let me = owner.to_string();
        assert_eq!(h.click_with(owner, "remove", &[("user", &me)]), Dispatch::Rejected);
        assert_eq!(h.state(owner), Some(MenuState::ManageMembers));
    }

    #[test]
    fn test_member_bans_visitor_but_not_member() {
        let mut h = Harness::new();
        let bea = h.add_member("Bea");
        let cal = h.add_member("Cal");
        let vic = h.join("Vic");
        h.open(bea);
        h.click(bea, "visitors");

        h.click(bea, "ban");
        assert_eq!(h.say(bea, "Vic"), Dispatch::Accepted);
        assert!(h.world().banned.contains(&vic));

        h.click(bea, "ban");
        assert_eq!(h.say(bea, "Cal"), Dispatch::Rejected);
        assert!(h.world().members.contains(&cal));
        assert_eq!(h.surface.notices(bea), vec![Notice::Denied(Denial::NotOwner)]);

        h.click(bea, "cancel");
        let vic_arg = vic.to_string();
        h.click_with(bea, "unban", &[("user", &vic_arg)]);
        assert!(!h.world().banned.contains(&vic));
        assert_eq!(h.state(bea), Some(MenuState::ManageVisitors));
    }

    #[test]
    fn test_owner_ban_drops_membership() {
        let mut h = Harness::new();
        let owner = h.owner;
        let bea = h.add_member("Bea");
        h.open(owner);
        h.click(owner, "visitors");
        h.click(owner, "ban");
        h.say(owner, "Bea");

        let world = h.world();
        assert!(!world.members.contains(&bea));
        assert!(world.banned.contains(&bea));
    }

    #[test]
    fn test_leave() {
        let mut h = Harness::new();
        let owner = h.owner;
        let bea = h.add_member("Bea");

        h.open(owner);
        assert_eq!(h.click(owner, "leave"), Dispatch::Rejected);
        assert_eq!(
            h.surface.notices(owner),
            vec![Notice::Denied(Denial::OwnerCannotLeave)]
        );

        h.open(bea);
        assert_eq!(h.click(bea, "leave"), Dispatch::Accepted);
        assert!(!h.world().members.contains(&bea));
        assert_eq!(h.state(bea), None);
    }
}
