//! Object naming.
//!
//! Every name carries a per-call `id` after the timestamp, so two uploads of
//! the same filename within one millisecond still land on distinct objects.

use chrono::{DateTime, Utc};
use causw_core::upload::ImageLocation;
use uuid::Uuid;

/// `ATTACHMENTS/{yyyy-MM-dd-HH-mm-ss-SSS+zzzz}/{id}_{filename}`
pub fn attachment_path(at: DateTime<Utc>, id: Uuid, filename: &str) -> String {
  format!(
    "ATTACHMENTS/{}/{}_{filename}",
    at.format("%Y-%m-%d-%H-%M-%S-%3f%z"),
    id.simple(),
  )
}

/// `{LOCATION}/{yyyy-MM-dd}/{HH-mm-ss-SSS+zzzz}_{id}_{filename}`, filed under
/// `ETC` when no location is given.
pub fn image_path(
  at: DateTime<Utc>,
  id: Uuid,
  location: Option<ImageLocation>,
  filename: &str,
) -> String {
  format!(
    "{}/{}/{}_{}_{filename}",
    location.unwrap_or_default(),
    at.format("%Y-%m-%d"),
    at.format("%H-%M-%S-%3f%z"),
    id.simple(),
  )
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Timelike};

  use super::*;

  fn at() -> DateTime<Utc> {
    Utc
      .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
      .unwrap()
      .with_nanosecond(42_000_000)
      .unwrap()
  }

  fn id() -> Uuid { Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef) }

  #[test]
  fn attachment_path_embeds_full_timestamp() {
    assert_eq!(
      attachment_path(at(), id(), "notes.pdf"),
      "ATTACHMENTS/2024-03-05-14-07-09-042+0000/0123456789abcdef0123456789abcdef_notes.pdf"
    );
  }

  #[test]
  fn image_path_defaults_to_etc() {
    assert_eq!(
      image_path(at(), id(), None, "cat.png"),
      "ETC/2024-03-05/14-07-09-042+0000_0123456789abcdef0123456789abcdef_cat.png"
    );
    assert_eq!(
      image_path(at(), id(), Some(ImageLocation::UserProfile), "me.jpg"),
      "USER_PROFILE/2024-03-05/14-07-09-042+0000_0123456789abcdef0123456789abcdef_me.jpg"
    );
  }

  #[test]
  fn same_instant_and_filename_differ_by_id() {
    assert_ne!(
      attachment_path(at(), Uuid::new_v4(), "notes.pdf"),
      attachment_path(at(), Uuid::new_v4(), "notes.pdf")
    );
    assert_ne!(
      image_path(at(), Uuid::new_v4(), None, "cat.png"),
      image_path(at(), Uuid::new_v4(), None, "cat.png")
    );
  }
}
