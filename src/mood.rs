use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Qualitative mood label recorded at check-in.
///
/// Serialized with the lowercase Portuguese labels the persisted document
/// uses. One canonical ordinal scale is shared by the store, the analytics
/// engine and the report renderer; `Feliz` is alias-valued equal to `Otimo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodLabel {
    Pessimo,
    Ruim,
    Neutro,
    Bom,
    Otimo,
    Feliz,
}

impl MoodLabel {
    pub const ALL: [MoodLabel; 6] = [
        MoodLabel::Pessimo,
        MoodLabel::Ruim,
        MoodLabel::Neutro,
        MoodLabel::Bom,
        MoodLabel::Otimo,
        MoodLabel::Feliz,
    ];

    /// Ordinal value on the 1-5 scale used for averages and trends.
    pub fn value(self) -> f64 {
        match self {
            MoodLabel::Pessimo => 1.0,
            MoodLabel::Ruim => 2.0,
            MoodLabel::Neutro => 3.0,
            MoodLabel::Bom => 4.0,
            MoodLabel::Otimo | MoodLabel::Feliz => 5.0,
        }
    }

    /// Lowercase key used in the persisted document.
    pub fn as_str(self) -> &'static str {
        match self {
            MoodLabel::Pessimo => "pessimo",
            MoodLabel::Ruim => "ruim",
            MoodLabel::Neutro => "neutro",
            MoodLabel::Bom => "bom",
            MoodLabel::Otimo => "otimo",
            MoodLabel::Feliz => "feliz",
        }
    }

    /// Accented display form.
    pub fn display_name(self) -> &'static str {
        match self {
            MoodLabel::Pessimo => "Péssimo",
            MoodLabel::Ruim => "Ruim",
            MoodLabel::Neutro => "Neutro",
            MoodLabel::Bom => "Bom",
            MoodLabel::Otimo => "Ótimo",
            MoodLabel::Feliz => "Feliz",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            MoodLabel::Pessimo => "😞",
            MoodLabel::Ruim => "🙁",
            MoodLabel::Neutro => "😐",
            MoodLabel::Bom => "🙂",
            MoodLabel::Otimo => "😄",
            MoodLabel::Feliz => "😊",
        }
    }
}

impl fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MoodLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pessimo" | "péssimo" => Ok(MoodLabel::Pessimo),
            "ruim" => Ok(MoodLabel::Ruim),
            "neutro" => Ok(MoodLabel::Neutro),
            "bom" => Ok(MoodLabel::Bom),
            "otimo" | "ótimo" => Ok(MoodLabel::Otimo),
            "feliz" => Ok(MoodLabel::Feliz),
            other => Err(format!(
                "Humor desconhecido: '{}' (use pessimo, ruim, neutro, bom, otimo ou feliz)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_scale() {
        assert_eq!(MoodLabel::Pessimo.value(), 1.0);
        assert_eq!(MoodLabel::Ruim.value(), 2.0);
        assert_eq!(MoodLabel::Neutro.value(), 3.0);
        assert_eq!(MoodLabel::Bom.value(), 4.0);
        assert_eq!(MoodLabel::Otimo.value(), 5.0);
    }

    #[test]
    fn test_feliz_aliases_otimo() {
        assert_eq!(MoodLabel::Feliz.value(), MoodLabel::Otimo.value());
    }

    #[test]
    fn test_serde_uses_lowercase_labels() {
        let json = serde_json::to_string(&MoodLabel::Otimo).unwrap();
        assert_eq!(json, "\"otimo\"");

        let parsed: MoodLabel = serde_json::from_str("\"pessimo\"").unwrap();
        assert_eq!(parsed, MoodLabel::Pessimo);
    }

    #[test]
    fn test_from_str_accepts_accents() {
        assert_eq!("péssimo".parse::<MoodLabel>().unwrap(), MoodLabel::Pessimo);
        assert_eq!("Ótimo".parse::<MoodLabel>().unwrap(), MoodLabel::Otimo);
        assert!("alegre".parse::<MoodLabel>().is_err());
    }
}
