// Federated identity normalization
// Identities arrive as provider URLs such as `https://jdoe.id.fedoraproject.org/`

use crate::domain::user::value_objects::Username;

/// Provider suffix appended to every account name in an identity URL
pub const PROVIDER_SUFFIX: &str = ".id.fedoraproject.org/";

/// Reduces a federated identity URL to the raw account name
///
/// # Example
/// ```
/// use webfaf::auth::federated::fed_raw_name;
///
/// assert_eq!(fed_raw_name("https://jdoe.id.fedoraproject.org/"), "jdoe");
/// ```
pub fn fed_raw_name(identity: &str) -> String {
    identity
        .replace(PROVIDER_SUFFIX, "")
        .replace("http://", "")
        .replace("https://", "")
}

/// Derives the username a session identity maps to
pub fn username_from_identity(identity: &str) -> Result<Username, String> {
    Username::new(fed_raw_name(identity))
}
