pub mod player;
pub mod stats;

use chrono::NaiveDateTime;
use serde::Serializer;

/// Wire format for stored timestamps (`registration_date`, `last_updated`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn serialize_timestamp<S: Serializer>(
    value: &NaiveDateTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
}
