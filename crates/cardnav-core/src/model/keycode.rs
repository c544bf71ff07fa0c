use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Keycode
///
/// A keyboard token as the front end reports it (`"N"`, `"Enter"`, `"F5"`).
/// Matched case-sensitively and byte-exactly; the resolver never
/// normalizes or interprets these.
///

#[derive(Clone, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Keycode(String);

impl Keycode {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Keycode {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for Keycode {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
