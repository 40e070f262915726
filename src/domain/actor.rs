//! Actors and the mutation permission model
//!
//! The registry is plain configuration: one main actor, a list of actors
//! authorized to manage the main actor's records, and everybody else.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::Record;

#[derive(Debug, Error, PartialEq)]
pub enum ActorError {
    #[error("Main actor '{0}' is not in the actor registry")]
    UnknownMain(String),

    #[error("Authorized actor '{0}' is not in the actor registry")]
    UnknownAuthorized(String),

    #[error("Duplicate actor ID in registry: {0}")]
    Duplicate(String),

    #[error("Unknown actor: {0}")]
    UnknownActor(String),
}

/// A named identity that can own and mutate records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Role of an actor within a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Main,
    Authorized,
    Unauthorized,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Main => "main",
            Role::Authorized => "authorized",
            Role::Unauthorized => "unauthorized",
        }
    }
}

/// Returns true if `actor_id` may update or delete a record owned by `owner_id`.
///
/// Allowed when the actor owns the record, or when the actor is authorized
/// and the record belongs to the main actor. Everything else is denied.
pub fn can_mutate(actor_id: &str, owner_id: &str, main_id: &str, authorized_ids: &[String]) -> bool {
    if actor_id == owner_id {
        return true;
    }
    owner_id == main_id && authorized_ids.iter().any(|id| id == actor_id)
}

/// The fixed set of actors known to an inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorRegistry {
    /// ID of the main actor
    pub main: String,

    /// IDs allowed to manage the main actor's records
    #[serde(default)]
    pub authorized: Vec<String>,

    /// Every known actor
    #[serde(default, rename = "registry")]
    pub actors: Vec<Actor>,
}

impl Default for ActorRegistry {
    fn default() -> Self {
        Self {
            main: "user_main".to_string(),
            authorized: vec!["user_authorized_1".to_string()],
            actors: vec![
                Actor::new("user_main", "Main User"),
                Actor::new("user_authorized_1", "Authorized User"),
                Actor::new("user_unauthorized_1", "Unauthorized User"),
            ],
        }
    }
}

impl ActorRegistry {
    /// Checks that the main and authorized IDs refer to registered actors
    pub fn validate(&self) -> Result<(), ActorError> {
        for (i, actor) in self.actors.iter().enumerate() {
            if self.actors[..i].iter().any(|a| a.id == actor.id) {
                return Err(ActorError::Duplicate(actor.id.clone()));
            }
        }
        if self.get(&self.main).is_none() {
            return Err(ActorError::UnknownMain(self.main.clone()));
        }
        if let Some(id) = self.authorized.iter().find(|id| self.get(id).is_none()) {
            return Err(ActorError::UnknownAuthorized(id.clone()));
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    /// Looks up an actor, failing for IDs outside the registry
    pub fn require(&self, id: &str) -> Result<&Actor, ActorError> {
        self.get(id)
            .ok_or_else(|| ActorError::UnknownActor(id.to_string()))
    }

    pub fn main_actor(&self) -> Option<&Actor> {
        self.get(&self.main)
    }

    pub fn role(&self, id: &str) -> Role {
        if id == self.main {
            Role::Main
        } else if self.authorized.iter().any(|a| a == id) {
            Role::Authorized
        } else {
            Role::Unauthorized
        }
    }

    /// Display name for an owner ID
    pub fn display_name<'a>(&'a self, id: &str) -> &'a str {
        self.get(id).map(|a| a.name.as_str()).unwrap_or("Unknown")
    }

    /// Permission check for a concrete record
    pub fn can_mutate(&self, actor: &Actor, record: &Record) -> bool {
        can_mutate(&actor.id, &record.owner_id, &self.main, &self.authorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RecordFields, RecordId};
    use chrono::Utc;
    use proptest::prelude::*;

    fn registry() -> ActorRegistry {
        ActorRegistry {
            main: "main".to_string(),
            authorized: vec!["auth1".to_string(), "auth2".to_string()],
            actors: vec![
                Actor::new("main", "Main"),
                Actor::new("auth1", "Auth One"),
                Actor::new("auth2", "Auth Two"),
                Actor::new("guest", "Guest"),
            ],
        }
    }

    fn owned_by(owner: &str) -> Record {
        Record::new(
            RecordId::generate("x", Utc::now()),
            owner,
            RecordFields::named("Dipirona"),
        )
        .unwrap()
    }

    #[test]
    fn owner_can_always_mutate() {
        let reg = registry();
        for id in ["main", "auth1", "guest", "stranger"] {
            assert!(reg.can_mutate(&Actor::new(id, id), &owned_by(id)));
        }
    }

    #[test]
    fn authorized_can_mutate_main_records() {
        let reg = registry();
        assert!(reg.can_mutate(&Actor::new("auth1", "A"), &owned_by("main")));
        assert!(reg.can_mutate(&Actor::new("auth2", "A"), &owned_by("main")));
    }

    #[test]
    fn authorized_cannot_mutate_other_authorized_records() {
        let reg = registry();
        assert!(!reg.can_mutate(&Actor::new("auth1", "A"), &owned_by("auth2")));
    }

    #[test]
    fn nobody_else_can_mutate_unauthorized_records() {
        let reg = registry();
        let record = owned_by("guest");
        assert!(!reg.can_mutate(&Actor::new("main", "M"), &record));
        assert!(!reg.can_mutate(&Actor::new("auth1", "A"), &record));
    }

    #[test]
    fn unauthorized_cannot_mutate_main_records() {
        let reg = registry();
        assert!(!reg.can_mutate(&Actor::new("guest", "G"), &owned_by("main")));
        assert!(!reg.can_mutate(&Actor::new("stranger", "S"), &owned_by("main")));
    }

    #[test]
    fn main_cannot_mutate_authorized_records() {
        let reg = registry();
        assert!(!reg.can_mutate(&Actor::new("main", "M"), &owned_by("auth1")));
    }

    #[test]
    fn roles() {
        let reg = registry();
        assert_eq!(reg.role("main"), Role::Main);
        assert_eq!(reg.role("auth2"), Role::Authorized);
        assert_eq!(reg.role("guest"), Role::Unauthorized);
        assert_eq!(reg.role("nobody"), Role::Unauthorized);
    }

    #[test]
    fn display_name_falls_back() {
        let reg = registry();
        assert_eq!(reg.display_name("auth1"), "Auth One");
        assert_eq!(reg.display_name("ghost"), "Unknown");
    }

    #[test]
    fn validate_catches_bad_registries() {
        assert!(registry().validate().is_ok());
        assert!(ActorRegistry::default().validate().is_ok());

        let mut reg = registry();
        reg.main = "ghost".to_string();
        assert_eq!(reg.validate(), Err(ActorError::UnknownMain("ghost".to_string())));

        let mut reg = registry();
        reg.authorized.push("ghost".to_string());
        assert_eq!(
            reg.validate(),
            Err(ActorError::UnknownAuthorized("ghost".to_string()))
        );

        let mut reg = registry();
        reg.actors.push(Actor::new("guest", "Again"));
        assert_eq!(reg.validate(), Err(ActorError::Duplicate("guest".to_string())));
    }

    #[test]
    fn parses_from_toml() {
        let toml = r#"
main = "ana"
authorized = ["bruno"]

[[registry]]
id = "ana"
name = "Ana"

[[registry]]
id = "bruno"
name = "Bruno"
"#;
        let reg: ActorRegistry = toml::from_str(toml).unwrap();

        assert_eq!(reg.main, "ana");
        assert_eq!(reg.actors.len(), 2);
        assert!(reg.validate().is_ok());
    }

    proptest! {
        #[test]
        fn unknown_actor_never_mutates_foreign_records(actor in "[a-z]{1,8}", owner in "[a-z]{1,8}") {
            prop_assume!(actor != owner);
            let authorized = vec!["auth".to_string()];
            prop_assume!(actor != "auth");

            prop_assert!(!can_mutate(&actor, &owner, "main", &authorized));
        }
    }
}
