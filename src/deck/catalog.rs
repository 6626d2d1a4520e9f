use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use super::card::{Card, CardRef};
use crate::error::{OracleError, OracleResult};

/// Default deck, baked into the binary so the app always has cards to deal.
const DEFAULT_DECK_TOML: &str = include_str!("../../deck.toml");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    name: String,
    #[serde(default)]
    cards: Vec<Card>,
}

/// The static set of cards for one deck, in authoring order.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub name: String,
    cards: Vec<CardRef>,
}

impl Catalog {
    /// Parse a catalog from TOML, rejecting blank or duplicate ids.
    pub fn from_toml(src: &str) -> OracleResult<Self> {
        let file: CatalogFile =
            toml::from_str(src).map_err(|e| OracleError::Catalog(e.to_string()))?;

        let mut seen = HashSet::new();
        for card in &file.cards {
            if card.id.trim().is_empty() {
                return Err(OracleError::Catalog(format!(
                    "card \"{}\" has an empty id",
                    card.title
                )));
            }
            if !seen.insert(card.id.as_str()) {
                return Err(OracleError::Catalog(format!("duplicate card id: {}", card.id)));
            }
        }

        Ok(Self {
            name: file.name,
            cards: file.cards.into_iter().map(Arc::new).collect(),
        })
    }

    /// The deck that ships with the binary
    pub fn embedded() -> Self {
        Self::from_toml(DEFAULT_DECK_TOML).expect("BUG: embedded deck.toml is invalid")
    }

    /// Load a catalog file, or the embedded deck when no path is given.
    pub fn load(path: Option<&Path>) -> OracleResult<Self> {
        let Some(path) = path else {
            return Ok(Self::embedded());
        };
        let src = std::fs::read_to_string(path)?;
        let catalog = Self::from_toml(&src)?;
        info!(
            "Loaded catalog \"{}\" ({} cards) from {}",
            catalog.name,
            catalog.cards.len(),
            path.display()
        );
        if catalog.drawable().is_empty() {
            warn!("Catalog at {} has no drawable cards", path.display());
        }
        Ok(catalog)
    }

    #[cfg(test)]
    pub fn cards(&self) -> &[CardRef] {
        &self.cards
    }

    /// Cards eligible to be dealt, in catalog order
    pub fn drawable(&self) -> Vec<CardRef> {
        self.cards
            .iter()
            .filter(|c| c.kind.is_drawable())
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&CardRef> {
        self.cards.iter().find(|c| c.id == id)
    }

    /// Card handed out when the drawable set is empty: the first raw entry,
    /// or the built-in placeholder for an empty catalog.
    pub fn fallback_card(&self) -> CardRef {
        self.cards
            .first()
            .cloned()
            .unwrap_or_else(|| Arc::new(Card::placeholder()))
    }
}
