//! JavaScript surface of the crate.
//!
//! Exposes the connector as an `ErcConnector` class whose methods return
//! promises, plus the static navigation and contract tables, so the JS
//! application shell can consume them directly.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use js_sys::{Function, Object, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::config::{MULTICALL_ABI_JSON, menu_config, multicall_networks};
use crate::core::{
    ConnectorArguments, ConnectorError, Detector, ErcConnector, EventSink, InjectedProvider,
    ProviderHandle,
};
use crate::models::{ConnectorEvent, ConnectorUpdate};
use crate::utils::log::log_warn;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(JsValue::from)
}

/// The navigation menu entries, in display order.
#[wasm_bindgen(js_name = menuConfig)]
pub fn menu_config_js() -> Result<JsValue, JsValue> {
    to_js(&menu_config())
}

/// Multicall addresses keyed by numeric chain id.
#[wasm_bindgen(js_name = multicallNetworks)]
pub fn multicall_networks_js() -> Result<JsValue, JsValue> {
    let networks: BTreeMap<String, String> = multicall_networks()
        .into_iter()
        .map(|(chain, address)| (chain.id().to_string(), address.to_checksum(None)))
        .collect();
    to_js(&networks)
}

/// The Multicall ABI as a plain JS array.
#[wasm_bindgen(js_name = multicallAbi)]
pub fn multicall_abi_js() -> Result<JsValue, JsValue> {
    js_sys::JSON::parse(MULTICALL_ABI_JSON)
}

fn error_to_js(err: ConnectorError) -> JsValue {
    let error = js_sys::Error::new(&err.to_string());
    error.set_name(err.name());
    error.into()
}

fn set_field(object: &Object, key: &str, value: &JsValue) {
    if let Err(err) = Reflect::set(object, &key.into(), value) {
        log_warn!("could not set {} on connector update: {:?}", key, err);
    }
}

/// Build the `{ provider, account, chainId }` object the framework expects.
fn update_to_js(update: &ConnectorUpdate, provider: Option<&Object>) -> JsValue {
    let object = Object::new();
    if update.provider.is_some()
        && let Some(provider) = provider
    {
        set_field(&object, "provider", provider);
    }
    if let Some(account) = &update.account {
        set_field(&object, "account", &account.into());
    }
    if let Some(chain_id) = &update.chain_id {
        match to_js(chain_id) {
            Ok(value) => set_field(&object, "chainId", &value),
            Err(err) => log_warn!("could not convert chain id {}: {:?}", chain_id, err),
        }
    }
    object.into()
}

/// The injected object behind the connector's provider, once known.
type RawProvider = Rc<RefCell<Option<Object>>>;

#[wasm_bindgen(js_name = ErcConnector)]
pub struct JsErcConnector {
    connector: Rc<ErcConnector>,
    raw: RawProvider,
}

#[wasm_bindgen(js_class = ErcConnector)]
impl JsErcConnector {
    /// `new ErcConnector(onUpdate, onDeactivate, supportedChainIds?, provider?)`
    ///
    /// Without `provider`, the wallet is looked up on `window` at each call
    /// until one has been injected.
    #[wasm_bindgen(constructor)]
    pub fn new(
        on_update: Function,
        on_deactivate: Function,
        supported_chain_ids: JsValue,
        provider: Option<Object>,
    ) -> Result<JsErcConnector, JsValue> {
        let supported_chain_ids: Option<Vec<u64>> =
            serde_wasm_bindgen::from_value(supported_chain_ids)?;
        let args = ConnectorArguments { supported_chain_ids };
        let raw: RawProvider = Rc::new(RefCell::new(provider.clone()));

        let sink: EventSink = {
            let raw = Rc::clone(&raw);
            Rc::new(move |event| match event {
                ConnectorEvent::Update(update) => {
                    let update = update_to_js(&update, raw.borrow().as_ref());
                    if let Err(err) = on_update.call1(&JsValue::NULL, &update) {
                        log_warn!("onUpdate threw: {:?}", err);
                    }
                }
                ConnectorEvent::Deactivate => {
                    if let Err(err) = on_deactivate.call0(&JsValue::NULL) {
                        log_warn!("onDeactivate threw: {:?}", err);
                    }
                }
            })
        };

        let connector = match provider {
            Some(object) => {
                let handle: ProviderHandle = Rc::new(InjectedProvider::new(object));
                ErcConnector::new(Some(handle), args, sink)
            }
            None => {
                let slot = Rc::clone(&raw);
                let detect: Detector = Rc::new(move || {
                    let provider = InjectedProvider::detect()?;
                    *slot.borrow_mut() = Some(provider.object().clone());
                    Some(Rc::new(provider) as ProviderHandle)
                });
                ErcConnector::with_detector(detect, args, sink)
            }
        };

        Ok(Self {
            connector: Rc::new(connector),
            raw,
        })
    }

    pub fn activate(&self) -> Promise {
        let connector = Rc::clone(&self.connector);
        let raw = Rc::clone(&self.raw);
        future_to_promise(async move {
            let update = connector.activate().await.map_err(error_to_js)?;
            Ok(update_to_js(&update, raw.borrow().as_ref()))
        })
    }

    #[wasm_bindgen(js_name = getChainId)]
    pub fn get_chain_id(&self) -> Promise {
        let connector = Rc::clone(&self.connector);
        future_to_promise(async move {
            match connector.get_chain_id().await.map_err(error_to_js)? {
                Some(chain_id) => to_js(&chain_id),
                None => Ok(JsValue::UNDEFINED),
            }
        })
    }

    #[wasm_bindgen(js_name = getAccount)]
    pub fn get_account(&self) -> Promise {
        let connector = Rc::clone(&self.connector);
        future_to_promise(async move {
            let account = connector.get_account().await.map_err(error_to_js)?;
            Ok(account.map_or(JsValue::NULL, JsValue::from))
        })
    }

    #[wasm_bindgen(js_name = isAuthorized)]
    pub fn is_authorized(&self) -> Promise {
        let connector = Rc::clone(&self.connector);
        future_to_promise(async move { Ok(JsValue::from_bool(connector.is_authorized().await)) })
    }

    pub fn deactivate(&self) {
        self.connector.deactivate();
    }

    #[wasm_bindgen(js_name = getProvider)]
    pub fn get_provider(&self) -> JsValue {
        if self.connector.get_provider().is_none() {
            return JsValue::UNDEFINED;
        }
        self.raw.borrow().clone().map_or(JsValue::UNDEFINED, JsValue::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PROVIDER_GLOBAL;
    use js_sys::Array;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn wallet() -> Object {
        Function::new_no_args(
            "return { \
                listeners: {}, \
                on(event, listener) { (this.listeners[event] = this.listeners[event] || []).push(listener); }, \
                removeListener(event, listener) {}, \
                send(method) { return Promise.resolve(['0xabc']); } \
            };",
        )
        .call0(&JsValue::NULL)
        .unwrap()
        .into()
    }

    #[wasm_bindgen_test]
    async fn throwing_callbacks_do_not_escape_listeners() {
        let wallet = wallet();
        let throwing = Function::new_no_args("throw new Error('framework failure');");
        let connector = JsErcConnector::new(
            throwing.clone(),
            throwing,
            JsValue::UNDEFINED,
            Some(wallet.clone()),
        )
        .unwrap();
        JsFuture::from(connector.activate()).await.unwrap();

        let listeners = Reflect::get(&wallet, &"listeners".into()).unwrap();
        let accounts: Array = Reflect::get(&listeners, &"accountsChanged".into())
            .unwrap()
            .into();
        let listener: Function = accounts.get(0).into();
        assert!(listener.call1(&JsValue::NULL, &Array::of1(&"0xdef".into())).is_ok());
        assert!(listener.call1(&JsValue::NULL, &Array::new()).is_ok());
    }

    #[wasm_bindgen_test]
    async fn provider_is_detected_after_construction() {
        let global = js_sys::global();
        Reflect::delete_property(&global, &PROVIDER_GLOBAL.into()).unwrap();

        let noop = Function::new_no_args("");
        let connector = JsErcConnector::new(noop.clone(), noop, JsValue::UNDEFINED, None).unwrap();
        assert!(connector.get_provider().is_undefined());
        assert!(JsFuture::from(connector.activate()).await.is_err());

        let wallet = wallet();
        Reflect::set(&global, &PROVIDER_GLOBAL.into(), &wallet).unwrap();
        let update = JsFuture::from(connector.activate()).await.unwrap();
        assert!(Object::is(&Reflect::get(&update, &"provider".into()).unwrap(), &wallet));
        assert!(Object::is(&connector.get_provider(), &wallet));

        Reflect::delete_property(&global, &PROVIDER_GLOBAL.into()).unwrap();
    }
}
