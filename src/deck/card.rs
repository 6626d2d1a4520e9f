use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Shared handle to an immutable catalog card
pub type CardRef = Arc<Card>;

/// What a catalog entry is for. Only `Ordinary` cards are ever dealt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    #[default]
    Ordinary,
    /// The "how to use this deck" card
    Rules,
    /// Stand-in shown when nothing real is available
    Placeholder,
}

impl CardKind {
    pub fn is_drawable(self) -> bool {
        match self {
            Self::Ordinary => true,
            Self::Rules | Self::Placeholder => false,
        }
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordinary => write!(f, "Card"),
            Self::Rules => write!(f, "Rules"),
            Self::Placeholder => write!(f, "Placeholder"),
        }
    }
}

/// Extended material revealed by a second tap on a face-up card
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CardDetail {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub paragraphs: Vec<String>,
    /// Reflection questions offered below the paragraphs
    #[serde(default)]
    pub prompts: Vec<String>,
}

impl CardDetail {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.paragraphs.is_empty() && self.prompts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    /// Primary image reference (asset key or path)
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub kind: CardKind,
    #[serde(default)]
    pub detail: Option<CardDetail>,
}

impl Card {
    /// Built-in stand-in used when a catalog has nothing to offer.
    pub fn placeholder() -> Self {
        Self {
            id: "placeholder".into(),
            title: "The Quiet Card".into(),
            image: String::new(),
            kind: CardKind::Placeholder,
            detail: None,
        }
    }

    /// Whether a second tap leads to a detail layer
    pub fn has_detail(&self) -> bool {
        self.detail.as_ref().is_some_and(|d| !d.is_empty())
    }
}
