//! Well-known configuration keys and fixed platform values.

use chrono::{Duration, NaiveDateTime};
use serde::Deserialize;

use crate::{Error, Result};

/// Flag key: whether non-administrators may register lockers.
pub const LOCKER_ACCESS: &str = "LOCKER_ACCESS";

/// Text-field key: the due date assigned to newly registered lockers.
pub const EXPIRED_AT: &str = "EXPIRED_AT";

/// `chrono` pattern for [`EXPIRED_AT`] values (`yyyy-MM-dd HH:mm`).
pub const EXPIRATION_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Posts shown per board on the home page.
pub const HOME_POST_PAGE_SIZE: u32 = 3;

/// Parse the configured [`EXPIRED_AT`] text field.
///
/// A missing value is an operator error, not a user error.
pub fn parse_expiration(text: Option<&str>) -> Result<NaiveDateTime> {
  let text = text.ok_or(Error::ExpirationNotConfigured)?;
  NaiveDateTime::parse_from_str(text.trim(), EXPIRATION_FORMAT)
    .map_err(|_| Error::ExpirationMalformed(text.to_owned()))
}

/// Longest accepted registration cooldown: one leap year.
pub const MAX_COOLDOWN_SECS: i64 = 366 * 24 * 60 * 60;

/// Tunables for the locker workflow.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LockerPolicy {
  /// Minimum time between two self-service registrations by one user.
  pub cooldown_secs: i64,
}

impl LockerPolicy {
  /// The cooldown window, clamped to `0..=MAX_COOLDOWN_SECS`.
  pub fn cooldown(&self) -> Duration {
    Duration::try_seconds(self.cooldown_secs.clamp(0, MAX_COOLDOWN_SECS)).unwrap_or_default()
  }

  /// Reject values [`cooldown`](Self::cooldown) would have to clamp.
  pub fn validate(&self) -> Result<(), String> {
    if (0..=MAX_COOLDOWN_SECS).contains(&self.cooldown_secs) {
      Ok(())
    } else {
      Err(format!(
        "locker.cooldown_secs must be between 0 and {MAX_COOLDOWN_SECS}, got {}",
        self.cooldown_secs
      ))
    }
  }
}

impl Default for LockerPolicy {
  fn default() -> Self { Self { cooldown_secs: 3600 } }
}
