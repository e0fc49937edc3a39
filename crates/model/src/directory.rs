//! Player directory: name resolution and presence.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::UserId;

pub trait Directory {
    /// Resolve a player name, case-insensitively.
    fn resolve_name(&self, name: &str) -> Option<UserId>;

    fn is_online(&self, user: UserId) -> bool;
}

#[derive(Debug, Default)]
struct Roster {
    names: HashMap<String, UserId>,
    online: HashSet<UserId>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDirectory {
    inner: Rc<RefCell<Roster>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a player and mark them online.
    pub fn join(&self, name: &str, user: UserId) {
        let mut roster = self.inner.borrow_mut();
        roster.names.insert(name.trim().to_lowercase(), user);
        roster.online.insert(user);
    }

    pub fn leave(&self, user: UserId) {
        self.inner.borrow_mut().online.remove(&user);
    }
}

impl Directory for MemoryDirectory {
    fn resolve_name(&self, name: &str) -> Option<UserId> {
        self.inner
            .borrow()
            .names
            .get(&name.trim().to_lowercase())
            .copied()
    }

    fn is_online(&self, user: UserId) -> bool {
        self.inner.borrow().online.contains(&user)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_resolve_and_presence() {
        let dir = MemoryDirectory::new();
        let bob = Uuid::new_v4();
        dir.join("Bob", bob);

        assert_eq!(dir.resolve_name("bob"), Some(bob));
        assert!(dir.is_online(bob));

        dir.leave(bob);
        assert!(!dir.is_online(bob));
        assert_eq!(dir.resolve_name("BOB"), Some(bob));
        assert_eq!(dir.resolve_name("carol"), None);
    }
}
