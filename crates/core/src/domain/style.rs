use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    Casual,
    #[default]
    Friendly,
    Professional,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Moderate,
    Complex,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Casual => "casual",
            Self::Friendly => "friendly",
            Self::Professional => "professional",
        }
    }
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "formal" => Ok(Self::Formal),
            "casual" => Ok(Self::Casual),
            "friendly" => Ok(Self::Friendly),
            "professional" => Ok(Self::Professional),
            other => Err(DomainError::UnknownValue { kind: "tone", value: other.to_string() }),
        }
    }
}

impl FromStr for Complexity {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "simple" => Ok(Self::Simple),
            "moderate" => Ok(Self::Moderate),
            "complex" => Ok(Self::Complex),
            other => {
                Err(DomainError::UnknownValue { kind: "complexity", value: other.to_string() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Complexity, Tone};

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" Formal ".parse::<Tone>(), Ok(Tone::Formal));
        assert_eq!("COMPLEX".parse::<Complexity>(), Ok(Complexity::Complex));
    }

    #[test]
    fn rejects_unknown_tone() {
        let error = "sarcastic".parse::<Tone>().expect_err("unknown tone");
        assert!(error.to_string().contains("sarcastic"));
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Tone::Professional).expect("json"), "\"professional\"");
        assert_eq!(serde_json::to_string(&Complexity::Simple).expect("json"), "\"simple\"");
    }
}
