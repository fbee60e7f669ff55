//! Tiny toast / notification helper.
//! Creates a `#toast-root` container once per page and appends toast divs that
//! fade-out after a few seconds.

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Element};

use crate::constants::{ID_TOAST_ROOT, ID_TOAST_STYLES, TOAST_LIFETIME_MS};

/// Show a red error toast.  Failures to reach the DOM are only logged.
pub fn error(message: &str) {
    if let Err(e) = show(message, "toast-error") {
        log::warn!("Toast '{}' not shown: {:?}", message, e);
    }
}

fn show(message: &str, class: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

    ensure_styles(&document)?;
    let root = ensure_root(&document)?;

    let toast = document.create_element("div")?;
    toast.set_class_name("toast");
    toast.class_list().add_1(class)?;
    toast.set_text_content(Some(message));

    // Prepend so newest appears on top.
    root.prepend_with_node_1(&toast)?;

    let cb = Closure::once_into_js(move || {
        toast.remove();
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), TOAST_LIFETIME_MS)?;
    Ok(())
}

fn ensure_root(document: &Document) -> Result<Element, JsValue> {
    if let Some(el) = document.get_element_by_id(ID_TOAST_ROOT) {
        return Ok(el);
    }
    let root = document.create_element("div")?;
    root.set_id(ID_TOAST_ROOT);
    root.set_class_name("toast-root");
    let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
    body.append_child(&root)?;
    Ok(root)
}

fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.get_element_by_id(ID_TOAST_STYLES).is_some() {
        return Ok(());
    }

    let css = "
.toast-root{position:fixed;bottom:16px;right:16px;display:flex;flex-direction:column;gap:8px;z-index:9999;font-family:Arial,Helvetica,sans-serif}
.toast{padding:10px 16px;border-radius:4px;color:#fff;box-shadow:0 2px 4px rgba(0,0,0,.1);opacity:0;animation:toast-in .2s forwards}
.toast-error{background:#dc2626}
@keyframes toast-in{to{opacity:1}}
";

    let style = document.create_element("style")?;
    style.set_id(ID_TOAST_STYLES);
    style.set_text_content(Some(css));
    match document.head() {
        Some(head) => head.append_child(&style)?,
        None => document
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&style)?,
    };
    Ok(())
}
