//! The five statutes that inspection quotas are tracked against.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A regulatory statute code.
///
/// Serialised as its code string (`"PD-1586"`), which is also the form used
/// in query parameters and validation field paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Law {
    #[serde(rename = "PD-1586")]
    Pd1586,
    #[serde(rename = "RA-6969")]
    Ra6969,
    #[serde(rename = "RA-8749")]
    Ra8749,
    #[serde(rename = "RA-9275")]
    Ra9275,
    #[serde(rename = "RA-9003")]
    Ra9003,
}

impl Law {
    /// All laws in display order.
    pub const ALL: [Law; 5] = [
        Law::Pd1586,
        Law::Ra6969,
        Law::Ra8749,
        Law::Ra9275,
        Law::Ra9003,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn code(self) -> &'static str {
        match self {
            Law::Pd1586 => "PD-1586",
            Law::Ra6969 => "RA-6969",
            Law::Ra8749 => "RA-8749",
            Law::Ra9275 => "RA-9275",
            Law::Ra9003 => "RA-9003",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Law::Pd1586 => "Environmental Impact Statement System",
            Law::Ra6969 => "Toxic Substances and Hazardous and Nuclear Wastes Control Act",
            Law::Ra8749 => "Philippine Clean Air Act",
            Law::Ra9275 => "Philippine Clean Water Act",
            Law::Ra9003 => "Ecological Solid Waste Management Act",
        }
    }
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Law {
    type Err = CoreError;

    /// Accepts `RA-9275`, `ra-9275`, and `RA9275`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != ' ')
            .collect::<String>()
            .to_ascii_uppercase();
        Law::ALL
            .into_iter()
            .find(|law| law.code().replace('-', "") == compact)
            .ok_or_else(|| CoreError::UnknownLaw(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let mut codes: Vec<&str> = Law::ALL.iter().map(|l| l.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), Law::COUNT);
    }

    #[test]
    fn parse_accepts_loose_forms() {
        assert_eq!("RA-9275".parse::<Law>().unwrap(), Law::Ra9275);
        assert_eq!("ra9275".parse::<Law>().unwrap(), Law::Ra9275);
        assert_eq!(" pd-1586 ".parse::<Law>().unwrap(), Law::Pd1586);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "RA-1234".parse::<Law>().unwrap_err();
        assert_eq!(err, CoreError::UnknownLaw("RA-1234".into()));
    }

    #[test]
    fn serialises_as_code() {
        assert_eq!(serde_json::to_string(&Law::Ra8749).unwrap(), "\"RA-8749\"");
        let parsed: Law = serde_json::from_str("\"RA-6969\"").unwrap();
        assert_eq!(parsed, Law::Ra6969);
    }
}
