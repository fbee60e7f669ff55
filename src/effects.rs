//! UI side effects requested by the reducers.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlElement;

use crate::constants::ID_CHAT_INPUT;

/// Best-effort UI hooks; nothing in the selection logic depends on them
/// having run.
pub trait IUiEffects {
    fn notify_error(&self, message: &str);
    fn focus_chat_input(&self);
}

/// Toasts plus a focus request deferred past the next paint.
#[derive(Clone, Debug)]
pub struct BrowserEffects {
    chat_input_id: String,
}

impl Default for BrowserEffects {
    fn default() -> Self {
        Self {
            chat_input_id: ID_CHAT_INPUT.to_string(),
        }
    }
}

impl IUiEffects for BrowserEffects {
    fn notify_error(&self, message: &str) {
        crate::toast::error(message);
    }

    fn focus_chat_input(&self) {
        let id = self.chat_input_id.clone();
        // Let the current store write reach the DOM first: yield to the
        // event loop, then wait one animation frame.
        spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(0).await;
            let Some(window) = web_sys::window() else {
                return;
            };
            let focus = Closure::once_into_js(move || {
                let input = web_sys::window()
                    .and_then(|w| w.document())
                    .and_then(|d| d.get_element_by_id(&id))
                    .and_then(|el| el.dyn_into::<HtmlElement>().ok());
                if let Some(input) = input {
                    let _ = input.focus();
                }
            });
            if window.request_animation_frame(focus.unchecked_ref()).is_err() {
                log::debug!("requestAnimationFrame unavailable, chat input not focused");
            }
        });
    }
}
