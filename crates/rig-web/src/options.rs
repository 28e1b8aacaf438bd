use rig_core::{RigConfig, RigError};
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Keys that may carry the container element.
const CONTAINER_KEYS: [&str; 2] = ["containerElement", "rig"];

/// Split a JS options object into the container element and the plain-data
/// configuration. Element-valued keys are read directly; everything else goes
/// through JSON so `serde` sees exactly what the page passed.
pub fn parse_options(options: &JsValue) -> Result<(web::HtmlElement, RigConfig), RigError> {
    if options.is_undefined() || options.is_null() {
        return Err(RigError::Configuration("options object is required".into()));
    }

    let container = CONTAINER_KEYS
        .iter()
        .filter_map(|key| js_sys::Reflect::get(options, &JsValue::from_str(key)).ok())
        .find_map(|v| v.dyn_into::<web::HtmlElement>().ok())
        .ok_or_else(|| RigError::Configuration("`containerElement` must be an HTMLElement".into()))?;

    // Element values do not survive JSON; drop them before stringifying.
    let plain = js_sys::Object::assign(&js_sys::Object::new(), options.unchecked_ref());
    for key in CONTAINER_KEYS {
        _ = js_sys::Reflect::delete_property(&plain, &JsValue::from_str(key));
    }
    let json = js_sys::JSON::stringify(&plain)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_else(|| "{}".to_string());
    let config: RigConfig =
        serde_json::from_str(&json).map_err(|e| RigError::Configuration(format!("invalid options: {e}")))?;

    Ok((container, config))
}

/// Parse a partial object such as `{ warpFactor: 30 }` into `T`.
pub fn parse_partial<T: serde::de::DeserializeOwned>(value: &JsValue) -> Result<T, RigError> {
    let json = js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .ok_or_else(|| RigError::Configuration("value is not serializable".into()))?;
    serde_json::from_str(&json).map_err(|e| RigError::Configuration(e.to_string()))
}
