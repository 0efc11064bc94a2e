//! Experiment variation value

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Variation a user is exposed to
///
/// Serialized as `control`, `treatment` or `treatment:<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Variation {
    #[default]
    Control,
    Treatment(Option<String>),
}

impl Variation {
    pub fn treatment() -> Self {
        Self::Treatment(None)
    }

    pub fn named_treatment(name: impl Into<String>) -> Self {
        Self::Treatment(Some(name.into()))
    }

    pub fn is_control(&self) -> bool {
        matches!(self, Self::Control)
    }
}

impl fmt::Display for Variation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variation::Control => write!(f, "control"),
            Variation::Treatment(None) => write!(f, "treatment"),
            Variation::Treatment(Some(name)) => write!(f, "treatment:{}", name),
        }
    }
}

impl FromStr for Variation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        match s.split_once(':') {
            None if s.eq_ignore_ascii_case("control") => Ok(Variation::Control),
            None if s.eq_ignore_ascii_case("treatment") => Ok(Variation::Treatment(None)),
            Some((kind, name)) if kind.eq_ignore_ascii_case("treatment") => {
                let name = name.trim();

                if name.is_empty() {
                    Ok(Variation::Treatment(None))
                } else {
                    Ok(Variation::Treatment(Some(name.to_string())))
                }
            }
            _ => Err(DomainError::validation(format!(
                "Unknown variation: {}. Valid values: control, treatment, treatment:<name>",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Variation {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Variation> for String {
    fn from(value: Variation) -> Self {
        value.to_string()
    }
}
