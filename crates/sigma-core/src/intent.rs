//! Classified purpose of an inbound message.

use rust_decimal::Decimal;

/// Message content after the platform handle has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Image(Vec<u8>),
}

/// Which reply path a message takes.
///
/// `Welcome`, `Gratitude` and `RiskQuery` are answered locally; the other
/// two go through the AI backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// The `/start` command.
    Welcome,
    Gratitude,
    RiskQuery { balance: Decimal },
    GeneralQuery { text: String },
    ChartAnalysis { image_bytes: Vec<u8> },
}

impl Intent {
    /// Whether this intent is answered without contacting the AI backend.
    pub fn is_fast_path(&self) -> bool {
        matches!(
            self,
            Intent::Welcome | Intent::Gratitude | Intent::RiskQuery { .. }
        )
    }

    /// Stable label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Intent::Welcome => "welcome",
            Intent::Gratitude => "gratitude",
            Intent::RiskQuery { .. } => "risk_query",
            Intent::GeneralQuery { .. } => "general_query",
            Intent::ChartAnalysis { .. } => "chart_analysis",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_path_split() {
        assert!(Intent::Welcome.is_fast_path());
        assert!(Intent::Gratitude.is_fast_path());
        assert!(Intent::RiskQuery {
            balance: Decimal::ONE
        }
        .is_fast_path());
        assert!(!Intent::GeneralQuery { text: "hi".into() }.is_fast_path());
        assert!(!Intent::ChartAnalysis {
            image_bytes: vec![]
        }
        .is_fast_path());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Intent::Gratitude.label(), "gratitude");
        assert_eq!(
            Intent::ChartAnalysis {
                image_bytes: vec![]
            }
            .label(),
            "chart_analysis"
        );
    }
}
