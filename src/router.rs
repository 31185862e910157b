//! Keyword routing between the compute engine and the language model.
//!
//! The rule is intentionally flat: a query is a calculation if its lowercased
//! text contains any entry of [`CALCULATION_KEYWORDS`]. There is no scoring
//! and no tie-break; keyword order does not matter.

use serde::{Deserialize, Serialize};

/// Terms and symbols that send a query to the compute engine.
pub const CALCULATION_KEYWORDS: &[&str] = &[
    // Portuguese
    "calcule", "resolva", "integral", "derivada", "equação", "gráfico",
    "conversão", "distância", "raiz", "potência", "matemática", "física",
    "química", "estatística", "sen",
    // English
    "calculate", "solve", "derivative", "equation", "conversion", "distance",
    "square root", "mathematics", "physics", "chemistry", "statistics", "sin",
    // Symbols and functions
    "+", "-", "*", "/", "=", "^", "√", "cos", "log",
];

/// Which backend a query is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Calculation,
    Conversation,
}

/// The classification attached to a finished query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Calculation,
    Conversation,
    Error,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calculation => "calculation",
            Self::Conversation => "conversation",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Route> for Classification {
    fn from(route: Route) -> Self {
        match route {
            Route::Calculation => Self::Calculation,
            Route::Conversation => Self::Conversation,
        }
    }
}

/// Classify a query by keyword presence.
pub fn classify(text: &str) -> Route {
    let lower = text.to_lowercase();
    if CALCULATION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Route::Calculation
    } else {
        Route::Conversation
    }
}
