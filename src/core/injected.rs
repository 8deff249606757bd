//! Browser-injected wallet provider using web-sys.
//!
//! Wraps the object a wallet extension places on `window` and drives it
//! through the Reflect API, probing every capability before use.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use js_sys::{Function, Object, Promise, Reflect};
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen_futures::JsFuture;

use crate::config::PROVIDER_GLOBAL;
use crate::core::error::ProviderError;
use crate::core::provider::{Listener, ListenerId, Provider, ProviderEvent};
use crate::utils::dom;

type JsListener = Closure<dyn Fn(JsValue)>;

pub struct InjectedProvider {
    object: Object,
    /// Closures handed to `on`; dropped once `removeListener` succeeds.
    listeners: RefCell<HashMap<ListenerId, JsListener>>,
    next_listener: Cell<u64>,
}

impl InjectedProvider {
    /// Find the provider the wallet injected into the page, if any.
    pub fn detect() -> Option<Self> {
        dom::global_object(PROVIDER_GLOBAL).map(Self::new)
    }

    pub fn new(object: Object) -> Self {
        Self {
            object,
            listeners: RefCell::new(HashMap::new()),
            next_listener: Cell::new(0),
        }
    }

    /// The raw injected object.
    pub fn object(&self) -> &Object {
        &self.object
    }

    fn method(&self, name: &str) -> Option<Function> {
        Reflect::get(&self.object, &name.into())
            .ok()?
            .dyn_into::<Function>()
            .ok()
    }

    fn require_method(&self, name: &str) -> Result<Function, ProviderError> {
        self.method(name)
            .ok_or_else(|| ProviderError::Unsupported(name.to_string()))
    }

    /// Await `value` if the provider answered with a promise.
    async fn settle(value: JsValue) -> Result<JsValue, ProviderError> {
        match value.dyn_into::<Promise>() {
            Ok(promise) => JsFuture::from(promise).await.map_err(provider_error),
            Err(value) => Ok(value),
        }
    }
}

/// Decode a thrown or rejected JS value, keeping its numeric `code`.
fn provider_error(err: JsValue) -> ProviderError {
    let code = Reflect::get(&err, &"code".into())
        .ok()
        .and_then(|code| code.as_f64());
    let message = Reflect::get(&err, &"message".into())
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{:?}", err));

    match code {
        Some(code) => ProviderError::rpc(code as i64, message),
        None => ProviderError::Failed(message),
    }
}

fn to_json(value: JsValue) -> Result<Value, ProviderError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

#[async_trait(?Send)]
impl Provider for InjectedProvider {
    async fn send(&self, method: &str) -> Result<Value, ProviderError> {
        let send = self.require_method("send")?;
        let returned = send
            .call1(&self.object, &method.into())
            .map_err(provider_error)?;
        to_json(Self::settle(returned).await?)
    }

    fn send_legacy(&self, method: &str) -> Result<Value, ProviderError> {
        let send = self.require_method("send")?;

        let payload = Object::new();
        Reflect::set(&payload, &"method".into(), &method.into())
            .map_err(|_| ProviderError::Failed("could not build request payload".to_string()))?;

        let returned = send.call1(&self.object, &payload).map_err(provider_error)?;
        if returned.is_instance_of::<Promise>() {
            return Err(ProviderError::Unsupported("synchronous send".to_string()));
        }
        to_json(returned)
    }

    async fn enable(&self) -> Result<Value, ProviderError> {
        let enable = self.require_method("enable")?;
        let returned = enable.call0(&self.object).map_err(provider_error)?;
        to_json(Self::settle(returned).await?)
    }

    fn supports_events(&self) -> bool {
        self.method("on").is_some()
    }

    fn supports_listener_removal(&self) -> bool {
        self.method("removeListener").is_some()
    }

    fn on(&self, event: ProviderEvent, listener: Listener) -> Result<ListenerId, ProviderError> {
        let on = self.require_method("on")?;

        let closure = Closure::wrap(Box::new(move |payload: JsValue| {
            listener(serde_wasm_bindgen::from_value(payload).unwrap_or(Value::Null));
        }) as Box<dyn Fn(JsValue)>);

        on.call2(&self.object, &event.name().into(), closure.as_ref())
            .map_err(provider_error)?;

        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().insert(id, closure);
        Ok(id)
    }

    fn remove_listener(&self, event: ProviderEvent, id: ListenerId) -> Result<(), ProviderError> {
        let remove = self.require_method("removeListener")?;
        let Some(closure) = self.listeners.borrow_mut().remove(&id) else {
            return Ok(());
        };

        if let Err(err) = remove.call2(&self.object, &event.name().into(), closure.as_ref()) {
            // The wallet still holds the function, so the closure must stay alive
            self.listeners.borrow_mut().insert(id, closure);
            return Err(provider_error(err));
        }
        Ok(())
    }

    fn property(&self, name: &str) -> Option<Value> {
        let value = Reflect::get(&self.object, &name.into()).ok()?;
        if value.is_undefined() {
            return None;
        }
        serde_wasm_bindgen::from_value(value).ok()
    }

    fn set_property(&self, name: &str, value: Value) -> Result<(), ProviderError> {
        let value = serde_wasm_bindgen::to_value(&value)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Reflect::set(&self.object, &name.into(), &value)
            .map_err(provider_error)
            .map(|_| ())
    }
}
