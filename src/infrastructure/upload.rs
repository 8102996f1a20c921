use std::rc::Rc;

use gloo::events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{FormData, HtmlFormElement, ProgressEvent, XmlHttpRequest};

use crate::domain::errors::{AppResult, ExternalServiceError, UiError};
use crate::domain::logging::{LogComponent, get_logger};
use crate::log_warn;
use crate::domain::render::{DomUpdate, upload_progress_percent, upload_status_text};
use crate::domain::repositories::DomHost;
use crate::domain::view::Target;
use crate::infrastructure::dom::BrowserDom;

pub const UPLOAD_FORM: &str = "consensusSetFile";
pub const RELOAD_FORM: &str = "reload";
const STATUS_TARGET: Target = Target::Id("popup_content");
pub const UPLOAD_FAILED_TEXT: &str = "Consensus upload failed";

/// Streams the consensus-set form to its action URL, reporting progress in
/// the popup, then submits the reload form.
pub fn upload_consensus_set(dom: Rc<BrowserDom>) -> AppResult<()> {
    let form = dom
        .document()
        .get_element_by_id(UPLOAD_FORM)
        .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
        .ok_or_else(|| UiError::ElementNotFound(format!("#{UPLOAD_FORM}")))?;
    let data = FormData::new_with_form(&form).map_err(browser_error)?;
    let xhr = XmlHttpRequest::new().map_err(browser_error)?;
    let upload = xhr.upload().map_err(browser_error)?;

    let progress_dom = Rc::clone(&dom);
    EventListener::new(&upload, "progress", move |event| {
        let Some(progress) = event.dyn_ref::<ProgressEvent>() else {
            return;
        };
        let percent = upload_progress_percent(progress.loaded(), progress.total());
        show_status(progress_dom.as_ref(), upload_status_text(percent));
    })
    .forget();

    let load_dom = Rc::clone(&dom);
    EventListener::once(&xhr, "load", move |_| {
        show_status(load_dom.as_ref(), upload_status_text(100));
        get_logger().info(LogComponent::Infrastructure("Upload"), "Consensus upload completed");
        if !load_dom.submit_form(RELOAD_FORM) {
            log_warn!(LogComponent::Infrastructure("Upload"), "#{RELOAD_FORM} form is missing");
        }
    })
    .forget();

    for event_type in ["error", "abort"] {
        let failed_dom = Rc::clone(&dom);
        EventListener::once(&xhr, event_type, move |_| {
            upload_failed(failed_dom.as_ref(), event_type);
        })
        .forget();
    }

    xhr.open("POST", &form.action()).map_err(browser_error)?;
    xhr.send_with_opt_form_data(Some(&data)).map_err(browser_error)?;
    get_logger().info(LogComponent::Infrastructure("Upload"), "Consensus upload started");
    Ok(())
}

/// Leaves the popup with a failure notice instead of a stale percentage.
pub fn upload_failed(dom: &BrowserDom, reason: &str) {
    log_warn!(LogComponent::Infrastructure("Upload"), "Consensus upload failed: {reason}");
    show_status(dom, UPLOAD_FAILED_TEXT.to_string());
}

fn show_status(dom: &BrowserDom, text: String) {
    if let Err(e) = dom.apply(&DomUpdate::inner_html(STATUS_TARGET, text)) {
        log_warn!(LogComponent::Infrastructure("Upload"), "{e}");
    }
}

fn browser_error(error: wasm_bindgen::JsValue) -> ExternalServiceError {
    ExternalServiceError::BrowserApiError(format!("{error:?}"))
}
