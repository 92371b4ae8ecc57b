//! User and profile types returned by `/users/me/`

use serde::{Deserialize, Serialize};

use crate::constants::{AGENT_HOME_PATH, TENANT_HOME_PATH};
use crate::impl_wire_str_conversions;

/// Account role; registration always creates tenants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Tenant,
    Agent,
}

impl_wire_str_conversions!(Role {
    Tenant => "tenant",
    Agent => "agent",
});

impl Role {
    /// Landing page after sign-in.
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Agent => AGENT_HOME_PATH,
            Role::Tenant => TENANT_HOME_PATH,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl User {
    /// Role from the nested profile, tenant when the profile is missing.
    pub fn role(&self) -> Role {
        self.profile.as_ref().map(|p| p.role).unwrap_or_default()
    }

    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Body of `PUT /users/update_profile/`; unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_profile_lands_on_dashboard() {
        let user: User = serde_json::from_str(
            r#"{"id":7,"username":"sam@homes.test","email":"sam@homes.test",
                "first_name":"Sam","last_name":"Okello",
                "profile":{"phone_number":"0700","address":"Kampala","role":"agent"}}"#,
        )
        .unwrap();

        assert_eq!(user.role(), Role::Agent);
        assert_eq!(user.role().home_path(), "/dashboard");
        assert_eq!(user.display_name(), "Sam Okello");
    }

    #[test]
    fn missing_profile_or_role_means_tenant() {
        let user: User = serde_json::from_str(r#"{"id":1,"username":"u","profile":null}"#).unwrap();
        assert_eq!(user.role(), Role::Tenant);
        assert_eq!(user.display_name(), "u");

        let profile: UserProfile = serde_json::from_str(r#"{"phone_number":"1"}"#).unwrap();
        assert_eq!(profile.role, Role::Tenant);
    }
}
