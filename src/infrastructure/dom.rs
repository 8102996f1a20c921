use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlFormElement, HtmlInputElement};

use crate::domain::errors::{ExternalServiceError, InfrastructureError, PresentationError, UiError};
use crate::domain::logging::LogComponent;
use crate::domain::render::{DomOp, DomUpdate};
use crate::domain::repositories::DomHost;
use crate::domain::view::Target;
use crate::log_trace;

/// The live document the views are mounted in.
#[derive(Clone)]
pub struct BrowserDom {
    document: Document,
}

impl BrowserDom {
    pub fn new() -> Result<Self, InfrastructureError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| ExternalServiceError::BrowserApiError("Document not available".to_string()))?;
        Ok(Self { document })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn elements(&self, target: Target) -> Vec<Element> {
        match target {
            Target::Id(id) => self.document.get_element_by_id(id).into_iter().collect(),
            Target::Class(class) => {
                // The collection is live; take a copy before class names change.
                let collection = self.document.get_elements_by_class_name(class);
                (0..collection.length()).filter_map(|index| collection.item(index)).collect()
            }
        }
    }
}

impl DomHost for BrowserDom {
    fn anchor_present(&self, anchor: Target) -> bool {
        match anchor {
            Target::Id(id) => self.document.get_element_by_id(id).is_some(),
            Target::Class(class) => self.document.get_elements_by_class_name(class).length() > 0,
        }
    }

    fn apply(&self, update: &DomUpdate) -> Result<usize, PresentationError> {
        let elements = self.elements(update.target);
        for element in &elements {
            match &update.op {
                DomOp::InnerHtml(html) => element.set_inner_html(html),
                DomOp::ClassName(class) => element.set_class_name(class),
                DomOp::Value(value) => match element.dyn_ref::<HtmlInputElement>() {
                    Some(input) => input.set_value(value),
                    None => element.set_attribute("value", value).map_err(|e| {
                        UiError::UpdateFailed(format!("{}: {e:?}", update.target))
                    })?,
                },
            }
        }
        if elements.is_empty() {
            log_trace!(LogComponent::Infrastructure("BrowserDom"), "No element matches {}", update.target);
        }
        Ok(elements.len())
    }

    fn submit_form(&self, form_id: &str) -> bool {
        self.document
            .get_element_by_id(form_id)
            .and_then(|element| element.dyn_into::<HtmlFormElement>().ok())
            .is_some_and(|form| form.submit().is_ok())
    }

    fn replace_page(&self, container_id: &str, html: &str) {
        if let Some(container) = self.document.get_element_by_id(container_id) {
            container.set_inner_html(html);
        } else if let Some(body) = self.document.body() {
            body.set_inner_html(html);
        }
    }

    fn cache_buster(&self) -> String {
        let now = js_sys::Date::now() as u64;
        let noise = (js_sys::Math::random() * f64::from(u32::MAX)) as u32;
        format!("{now:x}{noise:08x}")
    }
}
