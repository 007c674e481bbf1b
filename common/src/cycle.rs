//! School cycle (middle school vs. high school) and label substitution

use serde::{Deserialize, Serialize};

/// Teaching cycle the counselor works in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cycle {
    #[default]
    Middle,
    Secondary,
}

const MIDDLE_WORD: &str = "متوسط";
const SECONDARY_WORD: &str = "ثانوي";

impl Cycle {
    /// Adjective used in level names ("السنة الأولى متوسط")
    pub fn word(&self) -> &'static str {
        match self {
            Cycle::Middle => MIDDLE_WORD,
            Cycle::Secondary => SECONDARY_WORD,
        }
    }

    /// Name of the institution type
    pub fn institution(&self) -> &'static str {
        match self {
            Cycle::Middle => "المتوسطة",
            Cycle::Secondary => "الثانوية",
        }
    }

    /// Heading used on report covers
    pub fn education_label(&self) -> &'static str {
        match self {
            Cycle::Middle => "التعليم المتوسط",
            Cycle::Secondary => "التعليم الثانوي",
        }
    }

    /// Default level list
    pub fn default_levels(&self) -> Vec<String> {
        let ordinals: &[&str] = match self {
            Cycle::Middle => &["الأولى", "الثانية", "الثالثة", "الرابعة"],
            Cycle::Secondary => &["الأولى", "الثانية", "الثالثة"],
        };
        ordinals
            .iter()
            .map(|o| format!("السنة {} {}", o, self.word()))
            .collect()
    }

    /// Rewrite cycle-specific words of a label for this cycle.
    ///
    /// Only the level adjective and the institution name are swapped; the
    /// "التعليم المتوسط" style heading follows through the adjective rule.
    pub fn substitute(&self, text: &str) -> String {
        match self {
            Cycle::Middle => text
                .replace(Cycle::Secondary.institution(), Cycle::Middle.institution())
                .replace("الثانوي", "المتوسط")
                .replace(SECONDARY_WORD, MIDDLE_WORD),
            Cycle::Secondary => text
                .replace(Cycle::Middle.institution(), Cycle::Secondary.institution())
                .replace("المتوسط", "الثانوي")
                .replace(MIDDLE_WORD, SECONDARY_WORD),
        }
    }
}

impl std::str::FromStr for Cycle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "middle" | "m" | MIDDLE_WORD => Ok(Cycle::Middle),
            "secondary" | "high" | "s" | SECONDARY_WORD => Ok(Cycle::Secondary),
            _ => Err(format!("Unknown cycle: {}. Use middle or secondary", s)),
        }
    }
}

impl std::fmt::Display for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cycle::Middle => write!(f, "middle"),
            Cycle::Secondary => write!(f, "secondary"),
        }
    }
}
