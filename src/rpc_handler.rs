//! RPC method handler for the Wishclip JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches one call to the [`App`] behind an async mutex.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::app::App;
use crate::services::page_source::{is_restricted_url, HtmlSnapshot};
use crate::services::session_resolver::StaticCookieJar;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::cookie::Cookie;
use crate::types::errors::SubmitError;
use crate::types::popup::PopupState;
use crate::types::submission::DestinationMode;

/// Popup state plus the derived fields the UI renders directly.
pub fn state_json(state: &PopupState) -> Result<Value, String> {
    let mut value = serde_json::to_value(state).map_err(|e| e.to_string())?;
    if let Value::Object(map) = &mut value {
        map.insert("action_enabled".into(), json!(state.action_enabled()));
        map.insert("action_label".into(), json!(state.action_label()));
    }
    Ok(value)
}

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

const NO_POPUP: &str = "popup not open";

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Extraction ───
        "extract" => {
            let url = str_param(params, "url")?;
            let html = str_param(params, "html")?;
            if is_restricted_url(url) {
                return Err(format!("restricted page: {}", url));
            }
            let a = app.lock().await;
            let product = a.engine().extract_html(url, html);
            serde_json::to_value(product).map_err(|e| e.to_string())
        }

        // ─── Popup ───
        "popup.open" => {
            let url = str_param(params, "url")?;
            let html = params.get("html").and_then(|v| v.as_str()).unwrap_or("");
            let cookies: Vec<Cookie> = match params.get("cookies") {
                Some(v) => serde_json::from_value(v.clone()).map_err(|e| format!("invalid cookies: {}", e))?,
                None => Vec::new(),
            };
            let page = Arc::new(HtmlSnapshot::new(url, html));
            let jar = Arc::new(StaticCookieJar::new(cookies));

            let mut a = app.lock().await;
            let controller = a.open_popup(page, jar).await.map_err(|e| e.to_string())?;
            state_json(controller.state())
        }
        "popup.state" => {
            let mut a = app.lock().await;
            let controller = a.controller().ok_or(NO_POPUP)?;
            state_json(controller.settle())
        }
        "popup.select_kid" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().await;
            let controller = a.controller().ok_or(NO_POPUP)?;
            state_json(controller.select_kid(id).await)
        }
        "popup.select_registry" => {
            let id = str_param(params, "id")?;
            let mut a = app.lock().await;
            let controller = a.controller().ok_or(NO_POPUP)?;
            state_json(controller.select_registry(id).await)
        }
        "popup.set_destination" => {
            let raw = str_param(params, "mode")?;
            let mode = DestinationMode::parse(raw).ok_or_else(|| format!("invalid mode: {}", raw))?;
            let mut a = app.lock().await;
            let controller = a.controller().ok_or(NO_POPUP)?;
            state_json(controller.set_destination(mode).await)
        }
        "popup.submit" => {
            // The app lock is released while the add-item call is in flight,
            // so `popup.state` can observe `Submitting`.
            let pending = {
                let mut a = app.lock().await;
                let controller = a.controller().ok_or(NO_POPUP)?;
                match controller.begin_submit() {
                    Ok(pending) => pending,
                    // Shown in the state's notice; the popup stays usable.
                    Err(SubmitError::MissingSelection(_)) => return state_json(controller.state()),
                    Err(e) => return Err(e.to_string()),
                }
            };
            let result = pending.send().await;

            let mut a = app.lock().await;
            let controller = a.controller().ok_or(NO_POPUP)?;
            match controller.finish_submit(pending, result).await.map(|_| ()) {
                Ok(()) | Err(SubmitError::Api(_)) => state_json(controller.state()),
                Err(e) => Err(e.to_string()),
            }
        }
        "popup.settle" => {
            let mut a = app.lock().await;
            let controller = a.controller().ok_or(NO_POPUP)?;
            state_json(controller.settle())
        }
        "popup.logout" => {
            let mut a = app.lock().await;
            let controller = a.controller().ok_or(NO_POPUP)?;
            state_json(controller.logout().await)
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().await;
            serde_json::to_value(a.settings_engine.get_settings()).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = str_param(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().await;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            a.apply_settings();
            Ok(json!({"ok": true}))
        }
        "settings.reset" => {
            let mut a = app.lock().await;
            a.settings_engine.reset().map_err(|e| e.to_string())?;
            a.apply_settings();
            Ok(json!({"ok": true}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
