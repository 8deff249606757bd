use std::fmt;

use crate::core::provider::ProviderHandle;
use crate::models::ChainIdValue;

/// State change pushed to the connection-management framework.
///
/// Produced on activation and on every provider event; fields left `None`
/// are unchanged from the framework's point of view.
#[derive(Clone, Default)]
pub struct ConnectorUpdate {
    pub provider: Option<ProviderHandle>,
    pub account: Option<String>,
    pub chain_id: Option<ChainIdValue>,
}

impl fmt::Debug for ConnectorUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorUpdate")
            .field("provider", &self.provider.as_ref().map(|_| "<provider>"))
            .field("account", &self.account)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

/// Notification delivered to the framework's update/deactivate callbacks.
#[derive(Clone, Debug)]
pub enum ConnectorEvent {
    Update(ConnectorUpdate),
    Deactivate,
}

impl ConnectorEvent {
    /// The carried update, if this is not a deactivation.
    pub fn update(&self) -> Option<&ConnectorUpdate> {
        match self {
            Self::Update(update) => Some(update),
            Self::Deactivate => None,
        }
    }

    pub fn is_deactivate(&self) -> bool {
        matches!(self, Self::Deactivate)
    }
}
