//! Coins and their identities.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::grid::GridCell;

/// Identity of a coin: its home cell and the serial it was generated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenId {
    pub home: GridCell,
    pub serial: u32,
}

impl TokenId {
    #[must_use]
    pub const fn new(home: GridCell, serial: u32) -> Self {
        Self { home, serial }
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.home, self.serial)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid token id `{0}`")]
pub struct TokenIdError(pub String);

impl FromStr for TokenId {
    type Err = TokenIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (cell, serial) = s
            .trim()
            .split_once('#')
            .ok_or_else(|| TokenIdError(s.to_string()))?;
        let home = cell.parse().map_err(|_| TokenIdError(s.to_string()))?;
        let serial = serial.parse().map_err(|_| TokenIdError(s.to_string()))?;
        Ok(Self { home, serial })
    }
}

impl TryFrom<String> for TokenId {
    type Error = TokenIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TokenId> for String {
    fn from(value: TokenId) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinKind {
    #[default]
    Copper,
    Silver,
    Gold,
}

impl CoinKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Copper => "copper",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for CoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collectible token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub id: TokenId,
    pub collected: bool,
    #[serde(default)]
    pub kind: CoinKind,
}

impl Coin {
    #[must_use]
    pub const fn fresh(id: TokenId, kind: CoinKind) -> Self {
        Self {
            id,
            collected: false,
            kind,
        }
    }

    #[must_use]
    pub const fn home(&self) -> GridCell {
        self.id.home
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_ids_use_cell_and_serial() {
        let id = TokenId::new(GridCell::new(5, 5), 1);
        assert_eq!(id.to_string(), "5:5#1");
        assert_eq!("5:5#1".parse::<TokenId>(), Ok(id));
        assert_eq!("-2:7#0".parse::<TokenId>().unwrap().home, GridCell::new(-2, 7));
        assert!("5:5".parse::<TokenId>().is_err());
        assert!("5:5#x".parse::<TokenId>().is_err());
    }

    #[test]
    fn coin_serializes_id_as_string() {
        let coin = Coin::fresh(TokenId::new(GridCell::new(1, -1), 3), CoinKind::Gold);
        let json = serde_json::to_value(coin).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "1:-1#3", "collected": false, "kind": "gold"})
        );
    }

    #[test]
    fn kind_defaults_when_missing() {
        let coin: Coin = serde_json::from_str(r#"{"id":"0:0#0","collected":true}"#).unwrap();
        assert_eq!(coin.kind, CoinKind::Copper);
        assert!(coin.collected);
        assert!(serde_json::from_str::<Coin>(r#"{"id":"bogus","collected":true}"#).is_err());
    }
}
