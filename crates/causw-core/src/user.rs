//! Users, their roles and account states.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

/// What a user is allowed to do on the platform.
///
/// Variants are declared from least to most privileged.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  None,
  Student,
  LeaderCircle,
  Council,
  President,
  Admin,
}

impl Role {
  pub fn is_none(self) -> bool { self == Self::None }

  pub fn is_admin(self) -> bool { self == Self::Admin }

  /// Roles that manage boards and member roles.
  pub fn is_manager(self) -> bool { matches!(self, Self::Admin | Self::President) }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::None => "NONE",
      Self::Student => "STUDENT",
      Self::LeaderCircle => "LEADER_CIRCLE",
      Self::Council => "COUNCIL",
      Self::President => "PRESIDENT",
      Self::Admin => "ADMIN",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "NONE" => Ok(Self::None),
      "STUDENT" => Ok(Self::Student),
      "LEADER_CIRCLE" => Ok(Self::LeaderCircle),
      "COUNCIL" => Ok(Self::Council),
      "PRESIDENT" => Ok(Self::President),
      "ADMIN" => Ok(Self::Admin),
      _ => Err(Error::UnknownRole(s.to_owned())),
    }
  }
}

/// Where a user's account is in its approval lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserState {
  Await,
  Active,
  Inactive,
  Rejected,
  Dropped,
}

impl UserState {
  pub fn is_active(self) -> bool { self == Self::Active }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Await => "AWAIT",
      Self::Active => "ACTIVE",
      Self::Inactive => "INACTIVE",
      Self::Rejected => "REJECTED",
      Self::Dropped => "DROPPED",
    }
  }
}

impl fmt::Display for UserState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:   Uuid,
  pub email:     String,
  pub name:      String,
  pub role:      Role,
  pub state:     UserState,
  /// The circle this user leads; only meaningful for [`Role::LeaderCircle`].
  pub circle_id: Option<String>,
}
