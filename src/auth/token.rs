//! The signed token stored in the auth cookie.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::auth::UserId;

mod expiry_format {
    //! Serializes the expiry as a fixed-width datetime string.
    //!
    //! The [time::OffsetDateTime] default format writes midnight as
    //! "0:00:00.0" with a single hour digit, which its own parser then
    //! rejects. A fixed-width format round-trips every time of day.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Expiry format, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const EXPIRY_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(expires_at: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = expires_at
            .format(EXPIRY_FORMAT)
            .map_err(serde::ser::Error::custom)?;

        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;

        OffsetDateTime::parse(&raw, EXPIRY_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// The proof of authentication carried by the auth cookie.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    /// The user the cookie authenticates.
    pub user_id: UserId,
    /// When the cookie stops being valid.
    #[serde(with = "expiry_format")]
    pub expires_at: OffsetDateTime,
}
