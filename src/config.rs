//! Application configuration.
//!
//! Centralizes all configuration constants and static data used throughout
//! the frontend. Contract descriptors are loaded at compile time using
//! `include_str!`.

use alloy_primitives::{Address, address};

use crate::models::{ChainId, MenuEntry};

// =============================================================================
// Wallet Provider Configuration
// =============================================================================

/// Global under which the wallet injects its provider object.
pub const PROVIDER_GLOBAL: &str = "EthereumChain";

/// EIP-1193 error code for a user denying a permission prompt.
pub const USER_REJECTED_CODE: i64 = 4001;

/// MetaMask flag that reloads the page on network change when left enabled.
pub const AUTO_REFRESH_PROPERTY: &str = "autoRefreshOnNetworkChange";

/// Provider properties holding the chain id, checked in order.
pub const STATIC_CHAIN_ID_PROPERTIES: &[&str] =
    &["chainId", "netVersion", "networkVersion", "_chainId"];

// =============================================================================
// Navigation Configuration
// =============================================================================

/// Domains external menu links may point at (subdomains included).
pub const ALLOWED_LINK_DOMAINS: &[&str] = &[
    "easybake.finance",
    "snapshot.page",
    "github.com",
    "medium.com",
];

/// The navigation menu, in display order.
///
/// Pools, Lottery, NFT, Team Battle, Teams & Profile and IFO are not
/// launched yet and stay out of the menu.
pub fn menu_config() -> Vec<MenuEntry> {
    vec![
        MenuEntry::link("Home", "HomeIcon", "https://easybake.finance/"),
        MenuEntry::group(
            "Trade",
            "TradeIcon",
            vec![
                MenuEntry::item("Exchange", "/swap"),
                MenuEntry::item("Liquidity", "/pool"),
            ],
        )
        .open(),
        MenuEntry::link("Farms", "FarmIcon", "https://easybake.finance/farms"),
        MenuEntry::group(
            "Info",
            "InfoIcon",
            vec![
                MenuEntry::item("Overview", "https://info.easybake.finance"),
                MenuEntry::item("Tokens", "https://info.easybake.finance/tokens"),
                MenuEntry::item("Pairs", "https://info.easybake.finance/pairs"),
                MenuEntry::item("Accounts", "https://info.easybake.finance/accounts"),
            ],
        ),
        MenuEntry::group(
            "More",
            "MoreIcon",
            vec![
                MenuEntry::item("Voting", "https://snapshot.page/#/easybake.eth"),
                MenuEntry::item("Github", "https://github.com/easybakeswap"),
                MenuEntry::item("Blog", "https://easybake.medium.com"),
            ],
        ),
    ]
}

// =============================================================================
// Contract Configuration
// =============================================================================

/// Multicall deployment shared by every supported network.
const MULTICALL_ADDRESS: Address = address!("0x1605d633E30f430d54162232571475C620c69da5");

/// Multicall interface descriptor (ABI JSON).
pub const MULTICALL_ABI_JSON: &str = include_str!("../assets/abi/multicall.json");

/// Multicall address on `chain`. Every [`ChainId`] has a deployment.
pub const fn multicall_address(chain: ChainId) -> Address {
    match chain {
        ChainId::Mainnet | ChainId::Rinkeby => MULTICALL_ADDRESS,
    }
}

/// Multicall deployments for all networks, in [`ChainId::ALL`] order.
pub fn multicall_networks() -> Vec<(ChainId, Address)> {
    ChainId::ALL
        .into_iter()
        .map(|chain| (chain, multicall_address(chain)))
        .collect()
}
