//! User roles and the screens each role may open.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::api::Resource;

/// The kind of account a profile logs in as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access.
    Admin,
    /// Building manager.
    Sindico,
    /// Front desk.
    Portaria,
    /// Resident.
    #[default]
    Morador,
}

impl Role {
    /// Screens available to this role, in navigation order.
    pub fn resources(&self) -> &'static [Resource] {
        match self {
            Role::Admin => Resource::ALL,
            Role::Sindico => &[
                Resource::Users,
                Resource::Units,
                Resource::Spaces,
                Resource::Reservations,
                Resource::Events,
                Resource::Notices,
            ],
            Role::Portaria => &[
                Resource::Packages,
                Resource::Visitors,
                Resource::Vehicles,
                Resource::Reservations,
            ],
            Role::Morador => &[
                Resource::Reservations,
                Resource::Events,
                Resource::Notices,
                Resource::Packages,
            ],
        }
    }

    /// Whether this role may open `resource`.
    pub fn can_access(&self, resource: Resource) -> bool {
        self.resources().contains(&resource)
    }

    /// Whether this role may edit records of `resource`.
    ///
    /// The front desk edits what it registers; residents only reschedule
    /// their reservations.
    pub fn can_edit(&self, resource: Resource) -> bool {
        if !self.can_access(resource) {
            return false;
        }
        match self {
            Role::Admin | Role::Sindico => true,
            Role::Portaria => matches!(
                resource,
                Resource::Packages | Resource::Visitors | Resource::Vehicles
            ),
            Role::Morador => resource == Resource::Reservations,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Admin => "Administrador",
            Role::Sindico => "Síndico",
            Role::Portaria => "Portaria",
            Role::Morador => "Morador",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_sees_everything() {
        for resource in Resource::ALL {
            assert!(Role::Admin.can_access(*resource));
        }
    }

    #[test]
    fn test_front_desk_screens() {
        assert!(Role::Portaria.can_access(Resource::Packages));
        assert!(Role::Portaria.can_access(Resource::Reservations));
        assert!(!Role::Portaria.can_access(Resource::Users));
    }

    #[test]
    fn test_resident_cannot_manage_units() {
        assert!(!Role::Morador.can_access(Resource::Units));
        assert_eq!(Role::Morador.resources()[0], Resource::Reservations);
    }

    #[test]
    fn test_manager_screens() {
        assert!(Role::Sindico.can_access(Resource::Users));
        assert!(!Role::Sindico.can_access(Resource::Vehicles));
    }

    #[test]
    fn test_serde_names() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            role: Role,
        }
        let parsed: Wrapper = toml::from_str(r#"role = "sindico""#).unwrap();
        assert_eq!(parsed.role, Role::Sindico);
        assert_eq!(toml::to_string(&Wrapper { role: Role::Portaria }).unwrap().trim(), r#"role = "portaria""#);
    }

    #[test]
    fn test_edit_rights() {
        assert!(Role::Sindico.can_edit(Resource::Units));
        assert!(Role::Portaria.can_edit(Resource::Packages));
        assert!(!Role::Portaria.can_edit(Resource::Reservations));
        assert!(Role::Morador.can_edit(Resource::Reservations));
        assert!(!Role::Morador.can_edit(Resource::Notices));
        assert!(!Role::Morador.can_edit(Resource::Units));
    }

    #[test]
    fn test_display() {
        assert_eq!(Role::Sindico.to_string(), "Síndico");
    }
}
