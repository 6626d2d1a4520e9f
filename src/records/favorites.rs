use std::collections::BTreeMap;

use tracing::warn;

/// Card id to favorite flag. Persisted as a whole map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorites {
    flags: BTreeMap<String, bool>,
}

impl Favorites {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str(raw) {
            Ok(flags) => Self { flags },
            Err(e) => {
                warn!("Stored favorites are malformed, starting empty: {e}");
                Self::default()
            }
        }
    }

    pub fn is_favorite(&self, card_id: &str) -> bool {
        self.flags.get(card_id).copied().unwrap_or(false)
    }

    /// Flip the flag for `card_id`, returning the new value
    pub fn toggle(&mut self, card_id: &str) -> bool {
        let flag = self.flags.entry(card_id.to_string()).or_insert(false);
        *flag = !*flag;
        *flag
    }

    pub fn count(&self) -> usize {
        self.flags.values().filter(|v| **v).count()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.flags).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_and_counts() {
        let mut f = Favorites::default();
        assert!(f.toggle("tide"));
        assert!(f.toggle("salt"));
        assert!(!f.toggle("tide"));
        assert!(!f.is_favorite("tide"));
        assert!(f.is_favorite("salt"));
        assert_eq!(f.count(), 1);
    }

    #[test]
    fn keeps_false_entries_in_the_map() {
        let mut f = Favorites::default();
        f.toggle("tide");
        f.toggle("tide");
        assert_eq!(f.to_json(), r#"{"tide":false}"#);
    }

    #[test]
    fn parses_stored_map() {
        let f = Favorites::parse(Some(r#"{"gull":true,"shell":false}"#));
        assert!(f.is_favorite("gull"));
        assert!(!f.is_favorite("shell"));
        assert!(Favorites::parse(Some("[1,2]")).count() == 0);
    }
}
