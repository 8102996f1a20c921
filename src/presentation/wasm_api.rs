use std::rc::Rc;

use gloo::events::EventListener;
use js_sys::Promise;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{Document, HtmlInputElement};

use crate::application::{PollConfig, Ports, WalletViewsService};
use crate::domain::errors::{AppError, ValidationError};
use crate::domain::logging::{LogComponent, init_logger};
use crate::domain::render::{NOTE_ID_ATTRIBUTE, NOTE_INPUT_CLASS};
use crate::domain::repositories::SeedModule;
use crate::domain::session::SessionId;
use crate::domain::view::ViewKind;
use crate::infrastructure::seed::PageSeedModule;
use crate::infrastructure::services::ConsoleLogger;
use crate::infrastructure::upload;
use crate::infrastructure::{BrowserDom, BrowserRuntime, BrowserSpawner, BrowserStore, GlooTimer, WalletHttpClient};
use crate::{log_error, log_warn};

type BrowserService = WalletViewsService<BrowserRuntime, BrowserSpawner>;

fn to_js(error: AppError) -> JsValue {
    log_error!(LogComponent::Presentation("WalletViews"), "{error}");
    JsValue::from_str(&error.to_string())
}

/// Live views of one wallet page.
///
/// ```js
/// const views = new WalletViews(sessionId, { heartbeatEnabled: true });
/// views.start();
/// pageSelector.onchange = (e) => views.selectPage(Number(e.target.value));
/// ```
#[wasm_bindgen]
pub struct WalletViews {
    service: Rc<BrowserService>,
    _note_listener: EventListener,
}

#[wasm_bindgen]
impl WalletViews {
    /// `session_id` may be omitted on pages without a wallet session.
    #[wasm_bindgen(constructor)]
    pub fn new(session_id: Option<String>, config: JsValue) -> Result<WalletViews, JsValue> {
        let config = PollConfig::from_js(&config).map_err(to_js)?;
        init_logger(Box::new(ConsoleLogger::new(config.log_level)));

        let session = match session_id.filter(|id| !id.is_empty()) {
            Some(id) => SessionId::new(id).map_err(|e| to_js(e.into()))?,
            None => SessionId::anonymous(),
        };
        let dom = Rc::new(BrowserDom::new().map_err(|e| to_js(e.into()))?);
        let client = Rc::new(WalletHttpClient::new(config.base_url.clone()));
        let ports = Ports::<BrowserRuntime> {
            source: Rc::clone(&client),
            control: client,
            dom: Rc::clone(&dom),
            store: Rc::new(BrowserStore::open()),
            timer: Rc::new(GlooTimer),
        };
        let service = Rc::new(WalletViewsService::new(session, config, ports, BrowserSpawner));
        let note_listener = note_listener(dom.document(), Rc::clone(&service));

        Ok(WalletViews { service, _note_listener: note_listener })
    }

    /// Paints cached views and starts polling every view.
    pub fn start(&self) -> Result<(), JsValue> {
        self.service.start().map_err(to_js)
    }

    #[wasm_bindgen(js_name = selectPage)]
    pub fn select_page(&self, page: u32) -> Result<(), JsValue> {
        self.service.select_page(page).map_err(to_js)
    }

    /// Resolves to `true` once the server acknowledged and the page shows
    /// the shutdown notice.
    pub fn shutdown(&self) -> Promise {
        let service = Rc::clone(&self.service);
        future_to_promise(async move {
            service.shutdown().await.map(JsValue::from_bool).map_err(to_js)
        })
    }

    /// Stops every poll task; returns how many were still running.
    pub fn stop(&self) -> u32 {
        self.service.stop() as u32
    }

    /// `view` is a snake_case view name such as `tx_history`.
    #[wasm_bindgen(js_name = isPolling)]
    pub fn is_polling(&self, view: &str) -> Result<bool, JsValue> {
        let view = view
            .parse::<ViewKind>()
            .map_err(|_| to_js(ValidationError::UnknownView(view.to_string()).into()))?;
        Ok(self.service.is_polling(view))
    }

    #[wasm_bindgen(getter, js_name = sessionId)]
    pub fn session_id(&self) -> String {
        self.service.session().to_string()
    }
}

/// Saves `.tx-note` inputs as the user types. Rows are re-rendered on every
/// refresh, so the listener sits on the document.
fn note_listener(document: &Document, service: Rc<BrowserService>) -> EventListener {
    EventListener::new(document, "input", move |event| {
        let Some(input) = event.target().and_then(|target| target.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        if !input.class_name().split_whitespace().any(|class| class == NOTE_INPUT_CLASS) {
            return;
        }
        let Some(short_id) = input.get_attribute(NOTE_ID_ATTRIBUTE) else {
            return;
        };
        if let Err(e) = service.save_note(&short_id, &input.value()) {
            log_warn!(LogComponent::Presentation("Notes"), "{e}");
        }
    })
}

#[wasm_bindgen(js_name = uploadConsensusSet)]
pub fn upload_consensus_set() -> Result<(), JsValue> {
    let dom = BrowserDom::new().map_err(|e| to_js(e.into()))?;
    upload::upload_consensus_set(Rc::new(dom)).map_err(to_js)
}

/// Fresh wallet seed from the page's key module.
#[wasm_bindgen(js_name = newWalletSeed)]
pub fn new_wallet_seed() -> Result<String, JsValue> {
    PageSeedModule.new_seed().map_err(to_js)
}

#[wasm_bindgen(js_name = addressFromSeed)]
pub fn address_from_seed(seed: &str) -> Result<String, JsValue> {
    PageSeedModule.address_from_seed(seed).map_err(to_js)
}
