use chrono::Duration;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Period granularity of a forecast run.
///
/// Parsing is case-insensitive: `"w"` and `"W"` both give [`Frequency::Weekly`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    ToSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum Frequency {
    #[default]
    #[serde(rename = "W")]
    #[strum(serialize = "W")]
    Weekly,
    #[serde(rename = "M")]
    #[strum(serialize = "M")]
    Monthly,
}

impl Frequency {
    /// Fixed step between consecutive periods. Months are approximated as 30 days.
    pub fn step(self) -> Duration {
        match self {
            Frequency::Weekly => Duration::days(7),
            Frequency::Monthly => Duration::days(30),
        }
    }

    /// `strftime` pattern used for period labels.
    pub fn label_format(self) -> &'static str {
        match self {
            Frequency::Weekly => "%Y-%m-%d",
            Frequency::Monthly => "%Y-%m",
        }
    }
}
