use serde::{Deserialize, Serialize};
use std::fmt;

const MAX_USERNAME_LEN: usize = 100;

/// Username value object
///
/// # Invariants
/// - Must not be blank
/// - At most 100 characters, the width of the `users.username` column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Creates a new Username value object
    ///
    /// # Example
    /// ```
    /// use webfaf::domain::user::value_objects::Username;
    ///
    /// let username = Username::new("jdoe").expect("valid username");
    /// assert_eq!(username.as_str(), "jdoe");
    /// ```
    pub fn new(username: impl Into<String>) -> Result<Self, String> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err("Username must not be blank".to_string());
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(format!(
                "Username longer than {} characters: {}",
                MAX_USERNAME_LEN, username
            ));
        }
        Ok(Username(username))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
