//! Current user lookup result

use serde::Deserialize;

/// Role granted edit and delete actions in the web views.
pub const EDITOR_ROLE: &str = "user_web";

/// The signed-in user as reported by the backend.
///
/// Only used to decide whether edit/delete controls are shown; the server
/// still enforces authorization on every mutation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CurrentUser {
    /// Role name, e.g. `user_web` or `user_mobile`.
    #[serde(default)]
    pub role: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Login name.
    #[serde(default)]
    pub username: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
}

impl CurrentUser {
    /// Returns `true` if edit and delete actions should be offered.
    pub fn can_edit(&self) -> bool {
        self.role.as_deref() == Some(EDITOR_ROLE)
    }

    /// Name to greet the user with: the display name, else the login name.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.username.as_deref())
    }
}
