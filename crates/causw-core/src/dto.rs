//! Request bodies accepted by the services.

use serde::Deserialize;

use crate::{Result, user::Role};

/// Body of a role change request.
///
/// `role` stays as raw text so an unknown value is reported as a validation
/// error instead of a deserialisation failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateRoleRequest {
  pub role:      String,
  pub circle_id: Option<String>,
}

impl UserUpdateRoleRequest {
  pub fn new(role: impl Into<String>, circle_id: Option<String>) -> Self {
    Self { role: role.into(), circle_id }
  }

  pub fn role(&self) -> Result<Role> { self.role.parse() }

  /// The circle id, with blank strings treated as absent.
  pub fn circle_id(&self) -> Option<&str> {
    self.circle_id.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn deserialises_camel_case_body() {
    let req: UserUpdateRoleRequest =
      serde_json::from_str(r#"{"role":"leader_circle","circleId":"c-1"}"#).unwrap();
    assert_eq!(req.role().unwrap(), Role::LeaderCircle);
    assert_eq!(req.circle_id(), Some("c-1"));
  }

  #[test]
  fn blank_circle_id_is_absent() {
    let req = UserUpdateRoleRequest::new("COUNCIL", Some("  ".into()));
    assert_eq!(req.circle_id(), None);
  }
}
