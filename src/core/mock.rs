//! Scripted in-memory provider for tests.
//!
//! Responses are configured per call shape; unconfigured calls fail with
//! [`ProviderError::Unsupported`]. Every `send`, legacy `send` and `enable`
//! call is recorded so tests can assert which fallbacks ran.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::core::error::ProviderError;
use crate::core::provider::{Listener, ListenerId, Provider, ProviderEvent};

type Scripted = Result<Value, ProviderError>;

pub struct MockProvider {
    sends: RefCell<HashMap<String, Scripted>>,
    legacy: HashMap<String, Scripted>,
    enable: Option<Scripted>,
    properties: RefCell<Map<String, Value>>,
    events: bool,
    refuse_listeners: bool,
    listener_removal: bool,
    listeners: RefCell<Vec<(ProviderEvent, ListenerId, Listener)>>,
    next_listener: Cell<u64>,
    calls: RefCell<Vec<String>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// A provider supporting events and listener removal, answering nothing.
    pub fn new() -> Self {
        Self {
            sends: RefCell::new(HashMap::new()),
            legacy: HashMap::new(),
            enable: None,
            properties: RefCell::new(Map::new()),
            events: true,
            refuse_listeners: false,
            listener_removal: true,
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Script the answer to `send(method)`.
    pub fn with_send(self, method: &str, response: Scripted) -> Self {
        self.script_send(method, response);
        self
    }

    /// Change the answer to `send(method)` on a provider already in use.
    pub fn script_send(&self, method: &str, response: Scripted) {
        self.sends.borrow_mut().insert(method.to_string(), response);
    }

    /// Script the answer to legacy `send({ method })`.
    pub fn with_legacy(mut self, method: &str, response: Scripted) -> Self {
        self.legacy.insert(method.to_string(), response);
        self
    }

    pub fn with_enable(mut self, response: Scripted) -> Self {
        self.enable = Some(response);
        self
    }

    pub fn with_property(self, name: &str, value: Value) -> Self {
        self.properties.borrow_mut().insert(name.to_string(), value);
        self
    }

    /// Drop `on` and `removeListener`.
    pub fn without_events(mut self) -> Self {
        self.events = false;
        self.listener_removal = false;
        self
    }

    /// Advertise `on` but fail every registration.
    pub fn refusing_listeners(mut self) -> Self {
        self.refuse_listeners = true;
        self
    }

    /// Keep `on` but drop `removeListener`.
    pub fn without_listener_removal(mut self) -> Self {
        self.listener_removal = false;
        self
    }

    /// Calls made so far, as `send:<method>`, `legacy:<method>` or `enable`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Number of listeners currently registered for `event`.
    pub fn listener_count(&self, event: ProviderEvent) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|(registered, _, _)| *registered == event)
            .count()
    }

    /// Total listeners currently registered.
    pub fn total_listeners(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver `payload` to every listener of `event`.
    pub fn emit(&self, event: ProviderEvent, payload: Value) {
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(registered, _, _)| *registered == event)
            .map(|(_, _, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(payload.clone());
        }
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn scripted(table: &HashMap<String, Scripted>, method: &str, shape: &str) -> Scripted {
        table
            .get(method)
            .cloned()
            .unwrap_or_else(|| Err(ProviderError::Unsupported(format!("{shape}({method})"))))
    }
}

#[async_trait(?Send)]
impl Provider for MockProvider {
    async fn send(&self, method: &str) -> Result<Value, ProviderError> {
        self.record(format!("send:{method}"));
        Self::scripted(&self.sends.borrow(), method, "send")
    }

    fn send_legacy(&self, method: &str) -> Result<Value, ProviderError> {
        self.record(format!("legacy:{method}"));
        Self::scripted(&self.legacy, method, "send")
    }

    async fn enable(&self) -> Result<Value, ProviderError> {
        self.record("enable".to_string());
        self.enable
            .clone()
            .unwrap_or_else(|| Err(ProviderError::Unsupported("enable".to_string())))
    }

    fn supports_events(&self) -> bool {
        self.events
    }

    fn supports_listener_removal(&self) -> bool {
        self.listener_removal
    }

    fn on(&self, event: ProviderEvent, listener: Listener) -> Result<ListenerId, ProviderError> {
        if !self.events {
            return Err(ProviderError::Unsupported("on".to_string()));
        }
        if self.refuse_listeners {
            return Err(ProviderError::Failed(format!("{event} listener refused")));
        }
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((event, id, listener));
        Ok(id)
    }

    fn remove_listener(&self, event: ProviderEvent, id: ListenerId) -> Result<(), ProviderError> {
        if !self.listener_removal {
            return Err(ProviderError::Unsupported("removeListener".to_string()));
        }
        self.listeners
            .borrow_mut()
            .retain(|(registered, registered_id, _)| !(*registered == event && *registered_id == id));
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.properties.borrow().get(name).cloned()
    }

    fn set_property(&self, name: &str, value: Value) -> Result<(), ProviderError> {
        self.properties.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }
}
