//! Chain identifiers.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Networks the exchange contracts are deployed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u64)]
pub enum ChainId {
    Mainnet = 1,
    Rinkeby = 4,
}

impl ChainId {
    pub const ALL: [Self; 2] = [Self::Mainnet, Self::Rinkeby];

    /// Numeric EIP-155 chain id.
    pub const fn id(self) -> u64 {
        self as u64
    }

    /// Human-readable network name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mainnet => "Ethereum",
            Self::Rinkeby => "Rinkeby",
        }
    }
}

impl TryFrom<u64> for ChainId {
    type Error = u64;

    fn try_from(id: u64) -> Result<Self, Self::Error> {
        Self::ALL.into_iter().find(|chain| chain.id() == id).ok_or(id)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}

/// A chain identifier as a wallet reports it.
///
/// Wallets disagree on the representation: `1`, `"1"` and `"0x1"` all
/// name mainnet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChainIdValue {
    Number(u64),
    Text(String),
}

impl ChainIdValue {
    /// Read a provider value, `None` unless it is a non-empty number or string.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => {
                let id = number.as_u64().or_else(|| {
                    number
                        .as_f64()
                        .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                        .map(|f| f as u64)
                })?;
                (id != 0).then_some(Self::Number(id))
            }
            Value::String(text) if !text.is_empty() => Some(Self::Text(text.clone())),
            _ => None,
        }
    }

    /// Numeric chain id, accepting decimal and `0x`-prefixed hex strings.
    pub fn to_u64(&self) -> Option<u64> {
        match self {
            Self::Number(id) => Some(*id),
            Self::Text(text) => {
                let text = text.trim();
                match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                    Some(hex) => u64::from_str_radix(hex, 16).ok(),
                    None => text.parse().ok(),
                }
            }
        }
    }

    /// Known deployment network, if this id names one.
    pub fn chain(&self) -> Option<ChainId> {
        ChainId::try_from(self.to_u64()?).ok()
    }
}

impl From<u64> for ChainIdValue {
    fn from(id: u64) -> Self {
        Self::Number(id)
    }
}

impl From<&str> for ChainIdValue {
    fn from(id: &str) -> Self {
        Self::Text(id.to_string())
    }
}

impl fmt::Display for ChainIdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{}", id),
            Self::Text(text) => f.write_str(text),
        }
    }
}
