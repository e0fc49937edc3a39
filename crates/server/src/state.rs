//! Session states.
//!
//! Every workflow shares one enumeration. States come in four shapes:
//! - Menu: a menu is open; clicks mutate or navigate
//! - Prompt: the next free-text line (or matching form) is the value
//! - Placement: the next placement signal supplies a position or heading
//! - Confirm: a two-option menu guarding a mutation

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Menu,
    Prompt,
    Placement,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuState {
    // Menus
    Overview,
    ViewSettings,
    ManageMembers,
    ManageVisitors,
    ViewEnvironment,
    CriticalSettings,
    ExpandMenu,
    PickGlobalOverlay,
    PickPartialOverlay,

    // Prompts
    RenameWorld,
    ChangeDescription,
    SetAnnouncement,
    EditTags,
    InviteMember,
    BanVisitor,
    TransferOwnership,
    PartialOverlayRadius,

    // Placement
    SetSpawnMember,
    SetSpawnVisitor,
    ExpandDirectionWait,
    PartialOverlayPlace,

    // Confirmations
    SetSpawnConfirm,
    RemoveMemberConfirm,
    TransferConfirm,
    DeleteWorldConfirm,
    ResetExpansionConfirm,
    ExpandConfirm,
    GlobalOverlayConfirm,
    PartialOverlayConfirm,
    ClearOverlaysConfirm,
}

impl MenuState {
    pub const ALL: [MenuState; 30] = [
        MenuState::Overview,
        MenuState::ViewSettings,
        MenuState::ManageMembers,
        MenuState::ManageVisitors,
        MenuState::ViewEnvironment,
        MenuState::CriticalSettings,
        MenuState::ExpandMenu,
        MenuState::PickGlobalOverlay,
        MenuState::PickPartialOverlay,
        MenuState::RenameWorld,
        MenuState::ChangeDescription,
        MenuState::SetAnnouncement,
        MenuState::EditTags,
        MenuState::InviteMember,
        MenuState::BanVisitor,
        MenuState::TransferOwnership,
        MenuState::PartialOverlayRadius,
        MenuState::SetSpawnMember,
        MenuState::SetSpawnVisitor,
        MenuState::ExpandDirectionWait,
        MenuState::PartialOverlayPlace,
        MenuState::SetSpawnConfirm,
        MenuState::RemoveMemberConfirm,
        MenuState::TransferConfirm,
        MenuState::DeleteWorldConfirm,
        MenuState::ResetExpansionConfirm,
        MenuState::ExpandConfirm,
        MenuState::GlobalOverlayConfirm,
        MenuState::PartialOverlayConfirm,
        MenuState::ClearOverlaysConfirm,
    ];

    pub fn kind(self) -> StateKind {
        use MenuState::*;
        match self {
            Overview | ViewSettings | ManageMembers | ManageVisitors | ViewEnvironment
            | CriticalSettings | ExpandMenu | PickGlobalOverlay | PickPartialOverlay => {
                StateKind::Menu
            }
            RenameWorld | ChangeDescription | SetAnnouncement | EditTags | InviteMember
            | BanVisitor | TransferOwnership | PartialOverlayRadius => StateKind::Prompt,
            SetSpawnMember | SetSpawnVisitor | ExpandDirectionWait | PartialOverlayPlace => {
                StateKind::Placement
            }
            SetSpawnConfirm | RemoveMemberConfirm | TransferConfirm | DeleteWorldConfirm
            | ResetExpansionConfirm | ExpandConfirm | GlobalOverlayConfirm
            | PartialOverlayConfirm | ClearOverlaysConfirm => StateKind::Confirm,
        }
    }

    /// Where "back", the cancel word, or a dismissed form leads.
    ///
    /// Confirmations return to whichever state opened them; this is only
    /// their fallback.
    pub fn parent(self) -> MenuState {
        use MenuState::*;
        match self {
            Overview => Overview,
            ViewSettings | ManageMembers | ManageVisitors | ViewEnvironment | CriticalSettings
            | ExpandMenu => Overview,
            RenameWorld | ChangeDescription | SetAnnouncement | EditTags | SetSpawnMember
            | SetSpawnVisitor | SetSpawnConfirm => ViewSettings,
            InviteMember | RemoveMemberConfirm => ManageMembers,
            BanVisitor => ManageVisitors,
            TransferOwnership | TransferConfirm | DeleteWorldConfirm | ResetExpansionConfirm => {
                CriticalSettings
            }
            ExpandDirectionWait | ExpandConfirm => ExpandMenu,
            PickGlobalOverlay | PickPartialOverlay | PartialOverlayRadius
            | PartialOverlayPlace | GlobalOverlayConfirm | PartialOverlayConfirm
            | ClearOverlaysConfirm => ViewEnvironment,
        }
    }
}
