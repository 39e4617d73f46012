use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// The closed set of style categories the narrative provider is asked
/// to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StyleCategory {
    Streetwear,
    Formal,
    #[serde(rename = "Casual Chic")]
    CasualChic,
    Vintage,
    Athleisure,
    Bohemian,
    Minimalist,
    Classic,
    Trendy,
    Eclectic,
}

impl StyleCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Streetwear => "Streetwear",
            Self::Formal => "Formal",
            Self::CasualChic => "Casual Chic",
            Self::Vintage => "Vintage",
            Self::Athleisure => "Athleisure",
            Self::Bohemian => "Bohemian",
            Self::Minimalist => "Minimalist",
            Self::Classic => "Classic",
            Self::Trendy => "Trendy",
            Self::Eclectic => "Eclectic",
        }
    }
}

impl fmt::Display for StyleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Streetwear" => Ok(Self::Streetwear),
            "Formal" => Ok(Self::Formal),
            "Casual Chic" => Ok(Self::CasualChic),
            "Vintage" => Ok(Self::Vintage),
            "Athleisure" => Ok(Self::Athleisure),
            "Bohemian" => Ok(Self::Bohemian),
            "Minimalist" => Ok(Self::Minimalist),
            "Classic" => Ok(Self::Classic),
            "Trendy" => Ok(Self::Trendy),
            "Eclectic" => Ok(Self::Eclectic),
            other => Err(UnknownVariant {
                kind: "style category",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
    #[serde(rename = "All-Season")]
    AllSeason,
}

impl Season {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
            Self::Winter => "Winter",
            Self::AllSeason => "All-Season",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Season {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Spring" => Ok(Self::Spring),
            "Summer" => Ok(Self::Summer),
            "Fall" => Ok(Self::Fall),
            "Winter" => Ok(Self::Winter),
            "All-Season" => Ok(Self::AllSeason),
            other => Err(UnknownVariant {
                kind: "season",
                value: other.to_string(),
            }),
        }
    }
}

/// The structured style analysis of one photo. Every field is always
/// populated; producers fall back to heuristics instead of returning a
/// partial value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeSummary {
    pub style_category: StyleCategory,
    pub summary: String,
    pub top_colors: Vec<String>,
    pub suggestions: Vec<String>,
    pub occasion: String,
    pub season: Season,
}

/// Personalized recommendations derived from a user's outfit history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationSet {
    pub recommended_styles: Vec<String>,
    pub color_suggestions: Vec<String>,
    pub tips: Vec<String>,
    pub next_outfit_ideas: Vec<String>,
}
