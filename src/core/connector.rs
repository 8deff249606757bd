//! Connector exposing a uniform lifecycle over injected wallets.
//!
//! The host either hands the provider to [`ErcConnector::new`] or supplies a
//! [`Detector`] through [`ErcConnector::with_detector`], which is consulted at
//! each lifecycle call until a wallet shows up. The connector never looks at
//! globals itself. The
//! connection-management framework drives `activate`, `get_account`,
//! `get_chain_id`, `is_authorized` and `deactivate`, and receives provider
//! events as [`ConnectorEvent`]s through the sink it supplied.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::config::AUTO_REFRESH_PROPERTY;
use crate::core::error::{ConnectorError, ProviderError};
use crate::core::provider::{
    Listener, ListenerId, Provider, ProviderEvent, ProviderHandle, first_account,
    parse_send_return,
};
use crate::core::strategy::{AccountStrategy, ChainIdStrategy, first_success};
use crate::models::{ChainIdValue, ConnectorEvent, ConnectorUpdate};
use crate::utils::log::log_warn;

/// Receives translated provider events.
pub type EventSink = Rc<dyn Fn(ConnectorEvent)>;

/// Looks up the provider; `None` while no wallet has been injected yet.
pub type Detector = Rc<dyn Fn() -> Option<ProviderHandle>>;

/// Construction arguments supplied by the framework.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConnectorArguments {
    /// Chains the application accepts; `None` accepts any chain.
    pub supported_chain_ids: Option<Vec<u64>>,
}

pub struct ErcConnector {
    /// Resolved provider; fixed once found.
    provider: RefCell<Option<ProviderHandle>>,
    detect: Option<Detector>,
    supported_chain_ids: Option<Vec<u64>>,
    sink: EventSink,
    /// Listeners installed by `activate`, kept until the provider removes them.
    subscriptions: RefCell<Option<Vec<(ProviderEvent, ListenerId)>>>,
}

impl ErcConnector {
    pub fn new(provider: Option<ProviderHandle>, args: ConnectorArguments, sink: EventSink) -> Self {
        Self {
            provider: RefCell::new(provider),
            detect: None,
            supported_chain_ids: args.supported_chain_ids,
            sink,
            subscriptions: RefCell::new(None),
        }
    }

    /// Connector that looks the provider up on demand.
    ///
    /// Wallets often inject after the page builds its connectors, so every
    /// lifecycle call retries `detect` until it yields a provider, which is
    /// then kept for the rest of the connector's life.
    pub fn with_detector(detect: Detector, args: ConnectorArguments, sink: EventSink) -> Self {
        Self {
            detect: Some(detect),
            ..Self::new(None, args, sink)
        }
    }

    /// The raw provider handle, unchanged.
    pub fn get_provider(&self) -> Option<ProviderHandle> {
        self.resolve_provider()
    }

    fn resolve_provider(&self) -> Option<ProviderHandle> {
        let cached = self.provider.borrow().clone();
        if cached.is_some() {
            return cached;
        }
        let provider = self.detect.as_ref().and_then(|detect| detect())?;
        *self.provider.borrow_mut() = Some(Rc::clone(&provider));
        Some(provider)
    }

    pub fn supported_chain_ids(&self) -> Option<&[u64]> {
        self.supported_chain_ids.as_deref()
    }

    /// Whether the framework accepts `chain_id`.
    pub fn is_supported_chain(&self, chain_id: &ChainIdValue) -> bool {
        match (&self.supported_chain_ids, chain_id.to_u64()) {
            (None, _) => true,
            (Some(supported), Some(id)) => supported.contains(&id),
            (Some(_), None) => false,
        }
    }

    /// Whether provider listeners are currently installed.
    pub fn is_subscribed(&self) -> bool {
        self.subscriptions.borrow().is_some()
    }

    fn require_provider(&self) -> Result<ProviderHandle, ConnectorError> {
        self.resolve_provider().ok_or(ConnectorError::NoProvider)
    }

    /// Subscribe to provider events and request account access.
    ///
    /// A user denying the prompt (code 4001) fails the activation and removes
    /// the listeners this call installed; a set left by an earlier, still-live
    /// activation stays in place. Any other failure of `eth_requestAccounts`, or an
    /// empty answer, falls back to `enable()`.
    pub async fn activate(&self) -> Result<ConnectorUpdate, ConnectorError> {
        let provider = self.require_provider()?;

        let installed = self.subscribe(&provider);

        if provider.flag("isMetaMask")
            && let Err(err) = provider.set_property(AUTO_REFRESH_PROPERTY, Value::Bool(false))
        {
            log_warn!("could not disable {}: {}", AUTO_REFRESH_PROPERTY, err);
        }

        let mut account = match provider.send("eth_requestAccounts").await {
            Ok(response) => first_account(response),
            Err(err) => {
                self.reject_if_denied(&err, installed)?;
                log_warn!("eth_requestAccounts was unsuccessful ({}), falling back to enable", err);
                None
            }
        };

        if account.is_none() {
            account = match provider.enable().await {
                Ok(response) => first_account(response),
                Err(err) => {
                    self.reject_if_denied(&err, installed)?;
                    log_warn!("enable was unsuccessful ({})", err);
                    None
                }
            };
        }

        Ok(ConnectorUpdate {
            provider: Some(provider),
            account,
            chain_id: None,
        })
    }

    fn reject_if_denied(&self, err: &ProviderError, installed: bool) -> Result<(), ConnectorError> {
        if err.is_user_rejection() {
            if installed {
                self.deactivate();
            }
            return Err(ConnectorError::UserRejectedRequest);
        }
        Ok(())
    }

    /// Current network, or `None` when every strategy came back empty.
    pub async fn get_chain_id(&self) -> Result<Option<ChainIdValue>, ConnectorError> {
        let provider = self.require_provider()?;
        Ok(first_success(&ChainIdStrategy::ORDER, provider.as_ref()).await)
    }

    /// First connected account, or `None` when no strategy produced one.
    pub async fn get_account(&self) -> Result<Option<String>, ConnectorError> {
        let provider = self.require_provider()?;
        Ok(first_success(&AccountStrategy::ORDER, provider.as_ref()).await)
    }

    /// Whether `eth_accounts` answers with at least one account. Never fails.
    pub async fn is_authorized(&self) -> bool {
        let Some(provider) = self.resolve_provider() else {
            return false;
        };
        match provider.send("eth_accounts").await {
            Ok(response) => {
                matches!(parse_send_return(response), Value::Array(accounts) if !accounts.is_empty())
            }
            Err(_) => false,
        }
    }

    /// Remove exactly the listeners `activate` installed.
    ///
    /// No-op without a provider, before activation, or when the provider
    /// cannot remove listeners (the registrations are then kept so a later
    /// `activate` does not install a second set).
    pub fn deactivate(&self) {
        let Some(provider) = self.provider.borrow().clone() else {
            return;
        };
        if !provider.supports_listener_removal() {
            return;
        }
        let Some(registered) = self.subscriptions.borrow_mut().take() else {
            return;
        };
        for (event, id) in registered {
            if let Err(err) = provider.remove_listener(event, id) {
                log_warn!("failed to remove {} listener: {}", event, err);
            }
        }
    }

    /// Install the listener set; `true` only when this call installed it.
    fn subscribe(&self, provider: &ProviderHandle) -> bool {
        if self.is_subscribed() || !provider.supports_events() {
            return false;
        }

        let mut registered = Vec::with_capacity(ProviderEvent::ALL.len());
        for event in ProviderEvent::ALL {
            match provider.on(event, self.listener(event, provider)) {
                Ok(id) => registered.push((event, id)),
                Err(err) => log_warn!("failed to subscribe to {}: {}", event, err),
            }
        }
        if registered.is_empty() {
            return false;
        }
        *self.subscriptions.borrow_mut() = Some(registered);
        true
    }

    /// Listener forwarding `event` to the sink.
    ///
    /// Holds the provider weakly: the provider owns its listeners.
    fn listener(&self, event: ProviderEvent, provider: &ProviderHandle) -> Listener {
        let sink = Rc::clone(&self.sink);
        let provider: Weak<dyn Provider> = Rc::downgrade(provider);
        Rc::new(move |payload: Value| {
            sink(translate_event(event, payload, provider.upgrade()));
        })
    }
}

/// Translate a provider event into a framework notification.
pub fn translate_event(
    event: ProviderEvent,
    payload: Value,
    provider: Option<ProviderHandle>,
) -> ConnectorEvent {
    match event {
        ProviderEvent::AccountsChanged => match first_account(payload) {
            Some(account) => ConnectorEvent::Update(ConnectorUpdate {
                account: Some(account),
                ..Default::default()
            }),
            None => ConnectorEvent::Deactivate,
        },
        ProviderEvent::ChainChanged | ProviderEvent::NetworkChanged => {
            ConnectorEvent::Update(ConnectorUpdate {
                provider,
                account: None,
                chain_id: ChainIdValue::from_json(&parse_send_return(payload)),
            })
        }
        ProviderEvent::Close => ConnectorEvent::Deactivate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::MockProvider;
    use std::cell::Cell;
    use serde_json::json;

    fn recording_sink() -> (EventSink, Rc<RefCell<Vec<ConnectorEvent>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&events);
        let sink: EventSink = Rc::new(move |event| recorded.borrow_mut().push(event));
        (sink, events)
    }

    fn setup(mock: &Rc<MockProvider>) -> (ErcConnector, Rc<RefCell<Vec<ConnectorEvent>>>) {
        let (sink, events) = recording_sink();
        let handle: ProviderHandle = mock.clone();
        (
            ErcConnector::new(Some(handle), ConnectorArguments::default(), sink),
            events,
        )
    }

    #[tokio::test]
    async fn test_activate_without_provider() {
        let (sink, _) = recording_sink();
        let connector = ErcConnector::new(None, ConnectorArguments::default(), sink);
        assert_eq!(connector.activate().await.unwrap_err(), ConnectorError::NoProvider);
        assert!(connector.get_provider().is_none());
    }

    #[tokio::test]
    async fn test_activate_request_accounts() {
        let mock = Rc::new(
            MockProvider::new().with_send("eth_requestAccounts", Ok(json!(["0xabc", "0xdef"]))),
        );
        let (connector, _) = setup(&mock);

        let update = connector.activate().await.unwrap();
        assert_eq!(update.account.as_deref(), Some("0xabc"));
        assert!(update.provider.is_some());
        assert_eq!(mock.calls(), vec!["send:eth_requestAccounts"]);
        assert_eq!(mock.total_listeners(), 4);
    }

    #[tokio::test]
    async fn test_activate_falls_back_to_enable() {
        let mock = Rc::new(MockProvider::new().with_enable(Ok(json!(["0x123"]))));
        let (connector, _) = setup(&mock);

        let update = connector.activate().await.unwrap();
        assert_eq!(update.account.as_deref(), Some("0x123"));
        assert_eq!(mock.calls(), vec!["send:eth_requestAccounts", "enable"]);
    }

    #[tokio::test]
    async fn test_activate_empty_accounts_falls_back() {
        let mock = Rc::new(
            MockProvider::new()
                .with_send("eth_requestAccounts", Ok(json!({ "result": [] })))
                .with_enable(Ok(json!({ "result": ["0x456"] }))),
        );
        let (connector, _) = setup(&mock);

        let update = connector.activate().await.unwrap();
        assert_eq!(update.account.as_deref(), Some("0x456"));
    }

    #[tokio::test]
    async fn test_activate_user_rejected() {
        let mock = Rc::new(
            MockProvider::new()
                .with_send("eth_requestAccounts", Err(ProviderError::user_rejected()))
                .with_enable(Ok(json!(["0x123"]))),
        );
        let (connector, _) = setup(&mock);

        assert_eq!(
            connector.activate().await.unwrap_err(),
            ConnectorError::UserRejectedRequest
        );
        assert_eq!(mock.calls(), vec!["send:eth_requestAccounts"]);
        assert_eq!(mock.total_listeners(), 0);
        assert!(!connector.is_subscribed());
    }

    #[tokio::test]
    async fn test_activate_without_account() {
        let mock = Rc::new(MockProvider::new().with_enable(Ok(Value::Null)));
        let (connector, _) = setup(&mock);

        let update = connector.activate().await.unwrap();
        assert_eq!(update.account, None);
        assert!(update.provider.is_some());
    }

    #[tokio::test]
    async fn test_activate_disables_metamask_auto_refresh() {
        let mock = Rc::new(
            MockProvider::new()
                .with_property("isMetaMask", json!(true))
                .with_send("eth_requestAccounts", Ok(json!(["0xabc"]))),
        );
        let (connector, _) = setup(&mock);

        connector.activate().await.unwrap();
        assert_eq!(mock.property(AUTO_REFRESH_PROPERTY), Some(json!(false)));
    }

    #[tokio::test]
    async fn test_activate_twice_keeps_one_subscription_set() {
        let mock = Rc::new(MockProvider::new().with_send("eth_requestAccounts", Ok(json!(["0xabc"]))));
        let (connector, _) = setup(&mock);

        connector.activate().await.unwrap();
        connector.activate().await.unwrap();
        for event in ProviderEvent::ALL {
            assert_eq!(mock.listener_count(event), 1);
        }

        connector.deactivate();
        assert_eq!(mock.total_listeners(), 0);

        connector.activate().await.unwrap();
        assert_eq!(mock.total_listeners(), 4);
    }

    #[tokio::test]
    async fn test_rejected_reactivation_keeps_live_listeners() {
        let mock = Rc::new(MockProvider::new().with_send("eth_requestAccounts", Ok(json!(["0xabc"]))));
        let (connector, events) = setup(&mock);
        connector.activate().await.unwrap();
        assert_eq!(mock.total_listeners(), 4);

        mock.script_send("eth_requestAccounts", Err(ProviderError::user_rejected()));
        assert_eq!(
            connector.activate().await.unwrap_err(),
            ConnectorError::UserRejectedRequest
        );
        assert_eq!(mock.total_listeners(), 4);
        assert!(connector.is_subscribed());

        mock.emit(ProviderEvent::AccountsChanged, json!(["0xdef"]));
        assert_eq!(events.borrow().len(), 1);

        connector.deactivate();
        assert_eq!(mock.total_listeners(), 0);
    }

    #[tokio::test]
    async fn test_failed_subscription_is_not_recorded() {
        let mock = Rc::new(
            MockProvider::new()
                .refusing_listeners()
                .with_send("eth_requestAccounts", Ok(json!(["0xabc"]))),
        );
        let (connector, _) = setup(&mock);

        connector.activate().await.unwrap();
        assert_eq!(mock.total_listeners(), 0);
        assert!(!connector.is_subscribed());
    }

    #[tokio::test]
    async fn test_detector_finds_late_provider() {
        let mock = Rc::new(MockProvider::new().with_send("eth_requestAccounts", Ok(json!(["0xabc"]))));
        let injected: Rc<RefCell<Option<ProviderHandle>>> = Rc::new(RefCell::new(None));
        let lookups = Rc::new(Cell::new(0));

        let detect: Detector = {
            let injected = Rc::clone(&injected);
            let lookups = Rc::clone(&lookups);
            Rc::new(move || {
                lookups.set(lookups.get() + 1);
                injected.borrow().clone()
            })
        };
        let (sink, _) = recording_sink();
        let connector = ErcConnector::with_detector(detect, ConnectorArguments::default(), sink);

        assert_eq!(connector.activate().await.unwrap_err(), ConnectorError::NoProvider);
        assert!(connector.get_provider().is_none());
        assert!(!connector.is_authorized().await);

        let handle: ProviderHandle = mock.clone();
        *injected.borrow_mut() = Some(handle);
        let update = connector.activate().await.unwrap();
        assert_eq!(update.account.as_deref(), Some("0xabc"));
        assert_eq!(mock.total_listeners(), 4);

        // Found once, then kept
        let seen = lookups.get();
        assert!(connector.get_provider().is_some());
        connector.deactivate();
        assert_eq!(lookups.get(), seen);
        assert_eq!(mock.total_listeners(), 0);
    }

    #[tokio::test]
    async fn test_activate_without_event_support() {
        let mock = Rc::new(
            MockProvider::new()
                .without_events()
                .with_send("eth_requestAccounts", Ok(json!(["0xabc"]))),
        );
        let (connector, _) = setup(&mock);

        connector.activate().await.unwrap();
        assert!(!connector.is_subscribed());
        connector.deactivate();
    }

    #[tokio::test]
    async fn test_deactivate_without_listener_removal() {
        let mock = Rc::new(
            MockProvider::new()
                .without_listener_removal()
                .with_send("eth_requestAccounts", Ok(json!(["0xabc"]))),
        );
        let (connector, _) = setup(&mock);

        connector.activate().await.unwrap();
        connector.deactivate();
        assert_eq!(mock.total_listeners(), 4);

        // Still subscribed, so reactivating must not register a second set
        connector.activate().await.unwrap();
        assert_eq!(mock.total_listeners(), 4);
    }

    #[test]
    fn test_deactivate_is_noop_without_activation() {
        let mock = Rc::new(MockProvider::new());
        let (connector, events) = setup(&mock);
        connector.deactivate();
        connector.deactivate();
        assert_eq!(mock.total_listeners(), 0);
        assert!(events.borrow().is_empty());

        let (sink, _) = recording_sink();
        ErcConnector::new(None, ConnectorArguments::default(), sink).deactivate();
    }

    #[tokio::test]
    async fn test_events_reach_sink() {
        let mock = Rc::new(MockProvider::new().with_send("eth_requestAccounts", Ok(json!(["0xabc"]))));
        let (connector, events) = setup(&mock);
        connector.activate().await.unwrap();

        mock.emit(ProviderEvent::AccountsChanged, json!(["0xabc"]));
        mock.emit(ProviderEvent::ChainChanged, json!("0x4"));
        mock.emit(ProviderEvent::NetworkChanged, json!("4"));
        mock.emit(ProviderEvent::AccountsChanged, json!([]));
        mock.emit(ProviderEvent::Close, Value::Null);

        let events = events.borrow();
        assert_eq!(events.len(), 5);
        assert_eq!(
            events[0].update().and_then(|u| u.account.as_deref()),
            Some("0xabc")
        );
        let chain = events[1].update().unwrap();
        assert_eq!(chain.chain_id, Some(ChainIdValue::from("0x4")));
        assert!(chain.provider.is_some());
        assert_eq!(
            events[2].update().and_then(|u| u.chain_id.clone()),
            Some(ChainIdValue::from("4"))
        );
        assert!(events[3].is_deactivate());
        assert!(events[4].is_deactivate());
    }

    #[tokio::test]
    async fn test_no_events_after_deactivate() {
        let mock = Rc::new(MockProvider::new().with_send("eth_requestAccounts", Ok(json!(["0xabc"]))));
        let (connector, events) = setup(&mock);
        connector.activate().await.unwrap();
        connector.deactivate();

        mock.emit(ProviderEvent::Close, Value::Null);
        assert!(events.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_chain_id_first_strategy() {
        let mock = Rc::new(
            MockProvider::new()
                .with_send("eth_chainId", Ok(json!("0x1")))
                .with_send("net_version", Ok(json!("4"))),
        );
        let (connector, _) = setup(&mock);

        assert_eq!(
            connector.get_chain_id().await.unwrap(),
            Some(ChainIdValue::from("0x1"))
        );
        assert_eq!(mock.calls(), vec!["send:eth_chainId"]);
    }

    #[tokio::test]
    async fn test_chain_id_each_fallback_stops_on_success() {
        let rejected = || Err(ProviderError::rpc(-32601, "method not found"));

        let mock = Rc::new(
            MockProvider::new()
                .with_send("eth_chainId", rejected())
                .with_send("net_version", Ok(json!({ "result": "4" }))),
        );
        let (connector, _) = setup(&mock);
        assert_eq!(
            connector.get_chain_id().await.unwrap(),
            Some(ChainIdValue::from("4"))
        );
        assert_eq!(mock.calls(), vec!["send:eth_chainId", "send:net_version"]);

        let mock = Rc::new(
            MockProvider::new()
                .with_send("eth_chainId", rejected())
                .with_send("net_version", Ok(Value::Null))
                .with_legacy("net_version", Ok(json!({ "result": "1" })))
                .with_property("chainId", json!("0x4")),
        );
        let (connector, _) = setup(&mock);
        assert_eq!(
            connector.get_chain_id().await.unwrap(),
            Some(ChainIdValue::from("1"))
        );
        assert_eq!(
            mock.calls(),
            vec!["send:eth_chainId", "send:net_version", "legacy:net_version"]
        );

        let mock = Rc::new(MockProvider::new().with_property("netVersion", json!("4")));
        let (connector, _) = setup(&mock);
        assert_eq!(
            connector.get_chain_id().await.unwrap(),
            Some(ChainIdValue::from("4"))
        );
    }

    #[tokio::test]
    async fn test_chain_id_unknown() {
        let mock = Rc::new(MockProvider::new());
        let (connector, _) = setup(&mock);
        assert_eq!(connector.get_chain_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_account_fallbacks() {
        let mock = Rc::new(
            MockProvider::new()
                .with_send("eth_accounts", Ok(json!([])))
                .with_enable(Ok(json!(["0xfeed"]))),
        );
        let (connector, _) = setup(&mock);
        assert_eq!(connector.get_account().await.unwrap().as_deref(), Some("0xfeed"));
        assert_eq!(mock.calls(), vec!["send:eth_accounts", "enable"]);

        let mock = Rc::new(MockProvider::new());
        let (connector, _) = setup(&mock);
        assert_eq!(connector.get_account().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_queries_without_provider() {
        let (sink, _) = recording_sink();
        let connector = ErcConnector::new(None, ConnectorArguments::default(), sink);
        assert_eq!(connector.get_chain_id().await, Err(ConnectorError::NoProvider));
        assert_eq!(connector.get_account().await, Err(ConnectorError::NoProvider));
        assert!(!connector.is_authorized().await);
    }

    #[tokio::test]
    async fn test_is_authorized() {
        let mock = Rc::new(MockProvider::new().with_send("eth_accounts", Ok(json!({ "result": ["0xabc"] }))));
        let (connector, _) = setup(&mock);
        assert!(connector.is_authorized().await);

        let mock = Rc::new(MockProvider::new().with_send("eth_accounts", Ok(json!([]))));
        let (connector, _) = setup(&mock);
        assert!(!connector.is_authorized().await);

        let mock = Rc::new(MockProvider::new());
        let (connector, _) = setup(&mock);
        assert!(!connector.is_authorized().await);
        // No fallback strategies for authorization checks
        assert_eq!(mock.calls(), vec!["send:eth_accounts"]);
    }

    #[test]
    fn test_supported_chains() {
        let (sink, _) = recording_sink();
        let connector = ErcConnector::new(
            None,
            ConnectorArguments {
                supported_chain_ids: Some(vec![1, 4]),
            },
            sink,
        );
        assert_eq!(connector.supported_chain_ids(), Some(&[1, 4][..]));
        assert!(connector.is_supported_chain(&ChainIdValue::from("0x4")));
        assert!(!connector.is_supported_chain(&ChainIdValue::from(56)));
        assert!(!connector.is_supported_chain(&ChainIdValue::from("unknown")));

        let (sink, _) = recording_sink();
        let open = ErcConnector::new(None, ConnectorArguments::default(), sink);
        assert!(open.is_supported_chain(&ChainIdValue::from(56)));
    }

    #[test]
    fn test_translate_accounts_changed() {
        assert!(translate_event(ProviderEvent::AccountsChanged, json!([]), None).is_deactivate());
        let event = translate_event(ProviderEvent::AccountsChanged, json!(["0xabc"]), None);
        assert_eq!(event.update().and_then(|u| u.account.as_deref()), Some("0xabc"));
        assert!(translate_event(ProviderEvent::Close, Value::Null, None).is_deactivate());
    }
}
