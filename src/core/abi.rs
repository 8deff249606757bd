//! Contract interface descriptors.
//!
//! Parses Solidity ABI JSON into typed items so contract consumers can look
//! up functions and their 4-byte selectors.

use alloy_primitives::{Selector, keccak256};
use serde::{Deserialize, Serialize};

use crate::config::MULTICALL_ABI_JSON;
use crate::core::error::AbiError;

/// A function input or output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<AbiParam>,
}

impl AbiParam {
    /// Type as written in a canonical signature; tuples expand to their
    /// component types, keeping any array suffix.
    pub fn canonical_type(&self) -> String {
        match self.kind.strip_prefix("tuple") {
            Some(suffix) => format!("({}){}", canonical_list(&self.components), suffix),
            None => self.kind.clone(),
        }
    }
}

fn canonical_list(params: &[AbiParam]) -> String {
    params
        .iter()
        .map(AbiParam::canonical_type)
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateMutability {
    Pure,
    View,
    #[default]
    NonPayable,
    Payable,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiFunction {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    #[serde(default)]
    pub state_mutability: StateMutability,
}

impl AbiFunction {
    /// Canonical signature, e.g. `aggregate((address,bytes)[])`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, canonical_list(&self.inputs))
    }

    /// First four bytes of the keccak256 of the signature.
    pub fn selector(&self) -> Selector {
        Selector::from_slice(&keccak256(self.signature().as_bytes())[..4])
    }

    /// Whether calling the function leaves chain state untouched.
    pub fn is_read_only(&self) -> bool {
        matches!(
            self.state_mutability,
            StateMutability::Pure | StateMutability::View
        )
    }
}

/// One entry of an ABI descriptor. Only functions are modelled.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AbiItem {
    Function(AbiFunction),
    #[serde(other)]
    Other,
}

/// A parsed contract interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractInterface {
    items: Vec<AbiItem>,
}

impl ContractInterface {
    pub fn parse(json: &str) -> Result<Self, AbiError> {
        Ok(Self {
            items: serde_json::from_str(json)?,
        })
    }

    /// Functions in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &AbiFunction> {
        self.items.iter().filter_map(|item| match item {
            AbiItem::Function(function) => Some(function),
            AbiItem::Other => None,
        })
    }

    pub fn function(&self, name: &str) -> Result<&AbiFunction, AbiError> {
        self.functions()
            .find(|function| function.name == name)
            .ok_or_else(|| AbiError::UnknownFunction(name.to_string()))
    }
}

/// The Multicall interface shared by every deployment.
pub fn multicall_abi() -> Result<ContractInterface, AbiError> {
    ContractInterface::parse(MULTICALL_ABI_JSON)
}
