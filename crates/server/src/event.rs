//! Normalized input events.
//!
//! Channel adapters (outside this crate) turn raw platform events into one
//! `InputEvent` shape. The router never looks at where an event came from
//! beyond its channel tag and discriminator.

use std::collections::BTreeMap;

use realmkeep_model::UserId;

use crate::validation::ValidationError;

/// Discriminator carried by every free-text line.
pub const LINE: &str = "line";

/// Discriminator carried by every placement signal.
pub const PLACE: &str = "place";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// A click on a menu item.
    MenuSelect,
    /// A chat line typed while a prompt is open.
    FreeText,
    /// A modal form submission.
    FormSubmit,
    /// A physical placement or look-direction signal.
    Placement,
}

/// Position and heading reported by a placement signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Degrees; 0 faces south (+z), 90 west.
    pub yaw: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    Text(String),
    /// Menu item arguments or form fields.
    Fields(BTreeMap<String, String>),
    Placement(Placement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub user_id: UserId,
    pub channel: Channel,
    pub discriminator: String,
    pub payload: Payload,
    /// Adapter receipt time, in milliseconds.
    pub at_ms: u64,
}

impl InputEvent {
    pub fn menu(user_id: UserId, item: &str, at_ms: u64) -> Self {
        Self {
            user_id,
            channel: Channel::MenuSelect,
            discriminator: item.to_string(),
            payload: Payload::Empty,
            at_ms,
        }
    }

    /// Menu click carrying arguments, e.g. which member a "remove" targets.
    pub fn menu_with(user_id: UserId, item: &str, args: &[(&str, &str)], at_ms: u64) -> Self {
        Self {
            payload: Payload::Fields(fields(args)),
            ..Self::menu(user_id, item, at_ms)
        }
    }

    pub fn text(user_id: UserId, line: &str, at_ms: u64) -> Self {
        Self {
            user_id,
            channel: Channel::FreeText,
            discriminator: LINE.to_string(),
            payload: Payload::Text(line.to_string()),
            at_ms,
        }
    }

    pub fn form(user_id: UserId, form: &str, values: &[(&str, &str)], at_ms: u64) -> Self {
        Self {
            user_id,
            channel: Channel::FormSubmit,
            discriminator: form.to_string(),
            payload: Payload::Fields(fields(values)),
            at_ms,
        }
    }

    pub fn placement(user_id: UserId, placement: Placement, at_ms: u64) -> Self {
        Self {
            user_id,
            channel: Channel::Placement,
            discriminator: PLACE.to_string(),
            payload: Payload::Placement(placement),
            at_ms,
        }
    }

    /// Named argument or form field.
    pub fn field(&self, name: &str) -> Option<&str> {
        match &self.payload {
            Payload::Fields(fields) => fields.get(name).map(String::as_str),
            _ => None,
        }
    }

    /// The player-written value, whichever channel carried it.
    ///
    /// Free text yields the whole line; a form yields `field`.
    pub fn value(&self, field: &'static str) -> Result<&str, ValidationError> {
        match &self.payload {
            Payload::Text(line) => Ok(line.as_str()),
            Payload::Fields(fields) => fields
                .get(field)
                .map(String::as_str)
                .ok_or(ValidationError::MissingField(field)),
            _ => Err(ValidationError::MissingField(field)),
        }
    }

    pub fn placement_signal(&self) -> Option<Placement> {
        match self.payload {
            Payload::Placement(placement) => Some(placement),
            _ => None,
        }
    }
}

fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_value_is_channel_agnostic() {
        let user = Uuid::new_v4();
        let line = InputEvent::text(user, "Harbor", 0);
        let form = InputEvent::form(user, "rename", &[("name", "Harbor")], 0);

        assert_eq!(line.value("name"), Ok("Harbor"));
        assert_eq!(form.value("name"), Ok("Harbor"));
        assert_eq!(
            form.value("description"),
            Err(ValidationError::MissingField("description"))
        );
    }

    #[test]
    fn test_menu_args() {
        let user = Uuid::new_v4();
        let event = InputEvent::menu_with(user, "remove", &[("user", "abc")], 5);
        assert_eq!(event.channel, Channel::MenuSelect);
        assert_eq!(event.discriminator, "remove");
        assert_eq!(event.field("user"), Some("abc"));
        assert_eq!(event.field("other"), None);
        assert!(event.placement_signal().is_none());
    }
}
