//! WASM content-script entry point for weaver snippets.
//!
//! Loaded into every page by the extension. Installs the panic hook and
//! tracing subscriber, starts one `SnippetExpander` for the page, and exposes
//! the debug entry point.
//!
//! # Features
//!
//! - `auto-start` (default): start with the default config on instantiation.
//!   Without it, the host calls `startSnippets(config)` itself.

mod types;

pub use types::*;

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use weaver_snippets_browser::{ExpanderConfig, SnippetExpander};

/// Name of the debug function installed on `window`.
const DEBUG_GLOBAL: &str = "weaverSnippetsDebug";

thread_local! {
    static EXPANDER: RefCell<Option<Rc<SnippetExpander>>> = const { RefCell::new(None) };
}

/// Initialize panic hook and logging, then start if `auto-start` is on.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    init_tracing();

    #[cfg(feature = "auto-start")]
    {
        if let Err(e) = boot(ExpanderConfig::default()) {
            tracing::error!("weaver snippets failed to start: {:?}", JsValue::from(e));
        }
    }
}

fn init_tracing() {
    use tracing::Level;
    use tracing::subscriber::set_global_default;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    let console_level = if cfg!(debug_assertions) {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let wasm_layer = tracing_wasm::WASMLayer::new(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(console_level)
            .build(),
    );

    let _ = set_global_default(Registry::default().with(wasm_layer));
}

/// Start the expander with `config` (camelCase keys, all optional).
///
/// Fails if the expander is already running or the config is malformed.
#[wasm_bindgen(js_name = startSnippets)]
pub fn start_snippets(config: JsValue) -> Result<(), JsError> {
    let config: ExpanderConfig = if config.is_undefined() || config.is_null() {
        ExpanderConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsError::new(&format!("Invalid config: {}", e)))?
    };
    boot(config)
}

fn boot(config: ExpanderConfig) -> Result<(), JsError> {
    if EXPANDER.with(|slot| slot.borrow().is_some()) {
        return Err(JsError::new("weaver snippets is already running"));
    }

    let expander = SnippetExpander::new(config);
    expander
        .start()
        .map_err(|e| JsError::new(&format!("Startup failed: {}", e)))?;
    EXPANDER.with(|slot| *slot.borrow_mut() = Some(expander));

    install_debug_global();
    tracing::info!("weaver snippets ready; call {}() to debug", DEBUG_GLOBAL);
    Ok(())
}

fn install_debug_global() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let debug = Closure::<dyn Fn() -> String>::new(weaver_snippets_debug);
    if let Err(e) = js_sys::Reflect::set(&window, &JsValue::from_str(DEBUG_GLOBAL), debug.as_ref()) {
        tracing::warn!("could not install {}: {:?}", DEBUG_GLOBAL, e);
        return;
    }
    debug.forget();
}

fn with_expander<T>(f: impl FnOnce(&SnippetExpander) -> T) -> Option<T> {
    EXPANDER.with(|slot| slot.borrow().as_deref().map(f))
}

/// Print the current dictionary and surface counts to the console.
///
/// Returns the printed text.
#[wasm_bindgen(js_name = weaverSnippetsDebug)]
pub fn weaver_snippets_debug() -> String {
    let text = with_expander(|expander| expander.debug_report().to_string())
        .unwrap_or_else(|| "weaver snippets is not running".to_string());
    web_sys::console::log_1(&JsValue::from_str(&text));
    text
}

/// The debug report as a `JsDebugInfo`, or undefined when not running.
#[wasm_bindgen(js_name = snippetsDebugInfo)]
pub fn snippets_debug_info() -> Result<JsValue, JsError> {
    let Some(info) = with_expander(|expander| JsDebugInfo::from(&expander.debug_report())) else {
        return Ok(JsValue::UNDEFINED);
    };
    serde_wasm_bindgen::to_value(&info)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}

/// Snippets currently in the mirror, as `JsSnippet[]`.
#[wasm_bindgen(js_name = loadedSnippets)]
pub fn loaded_snippets() -> Result<JsValue, JsError> {
    let snippets: Vec<JsSnippet> = with_expander(|expander| {
        expander
            .mirror()
            .snapshot()
            .iter()
            .map(JsSnippet::from)
            .collect()
    })
    .unwrap_or_default();
    serde_wasm_bindgen::to_value(&snippets)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}
