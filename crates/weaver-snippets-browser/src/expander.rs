//! Page-level wiring: listeners, discovery and startup.
//!
//! Each registered surface gets its own `input` and `keyup` listeners and
//! its own `Trigger`. A capturing document-level pair of listeners covers
//! surfaces discovery misses; evaluation is a no-op when nothing matches, so
//! a surface triggered through both paths is fine.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use weaver_snippets_core::{
    DebugReport, DictionaryMirror, Evaluation, ExpanderConfig, PlatformError, Registration,
    SurfaceKind, SurfaceRegistry, Trigger, TriggerEvent, TriggerPolicy, evaluate,
};

use crate::js_error_message;
use crate::storage::ChromeStorage;
use crate::surface::{DomCandidate, DomSurface};
use crate::timer::TimeoutScheduler;

/// The snippet expander for one page.
pub struct SnippetExpander {
    config: ExpanderConfig,
    mirror: DictionaryMirror,
    policy: Rc<TriggerPolicy>,
    registry: RefCell<SurfaceRegistry>,
    global_trigger: Trigger<TimeoutScheduler>,
    observer: RefCell<Option<web_sys::MutationObserver>>,
}

impl SnippetExpander {
    pub fn new(config: ExpanderConfig) -> Rc<Self> {
        Self::with_mirror(config, DictionaryMirror::new())
    }

    /// Build around an existing mirror (e.g. one fed by a non-chrome store).
    pub fn with_mirror(config: ExpanderConfig, mirror: DictionaryMirror) -> Rc<Self> {
        let policy = Rc::new(TriggerPolicy::from_config(&config));
        Rc::new(Self {
            global_trigger: Trigger::new(policy.clone(), TimeoutScheduler),
            config,
            mirror,
            policy,
            registry: RefCell::new(SurfaceRegistry::new()),
            observer: RefCell::new(None),
        })
    }

    pub fn config(&self) -> &ExpanderConfig {
        &self.config
    }

    pub fn mirror(&self) -> &DictionaryMirror {
        &self.mirror
    }

    /// Load snippets, subscribe to changes, and wire the page.
    pub fn start(self: &Rc<Self>) -> Result<(), PlatformError> {
        let storage = ChromeStorage::from_config(&self.config);
        if let Err(e) = storage.subscribe(self.mirror.clone()) {
            tracing::warn!("snippet change notifications unavailable: {}", e);
        }
        let mirror = self.mirror.clone();
        wasm_bindgen_futures::spawn_local(async move {
            storage.load_into(&mirror).await;
        });

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;

        if self.config.global_listeners {
            self.listen_on_document(&document);
        }

        if document.ready_state() == "loading" {
            let this = self.clone();
            let target = document.clone();
            EventListener::once(&document, "DOMContentLoaded", move |_| {
                if let Err(e) = this.wire_document(&target) {
                    tracing::error!("snippet expander setup failed: {}", e);
                }
            })
            .forget();
            Ok(())
        } else {
            self.wire_document(&document)
        }
    }

    /// Register existing candidates and start observing additions.
    fn wire_document(self: &Rc<Self>, document: &web_sys::Document) -> Result<(), PlatformError> {
        let body = document.body().ok_or("no document body")?;
        let attached = self.register_subtree(&body);
        tracing::info!(attached, "registered existing editable surfaces");
        self.observe(&body)
    }

    /// Offer a single element to the registry.
    pub fn register(self: &Rc<Self>, element: &web_sys::Element) -> Registration {
        let candidate = DomCandidate::new(element, &self.config);
        self.registry
            .borrow_mut()
            .register(&candidate, |c, kind| self.attach_listeners(c.element, kind))
    }

    /// Offer `root` and every candidate below it; returns how many were newly attached.
    pub fn register_subtree(self: &Rc<Self>, root: &web_sys::Element) -> usize {
        let mut attached = 0;
        if matches!(self.register(root), Registration::Attached(_)) {
            attached += 1;
        }
        let Ok(nodes) = root.query_selector_all(&self.config.candidate_selector) else {
            return attached;
        };
        for i in 0..nodes.length() {
            let Some(element) = nodes.item(i).and_then(|n| n.dyn_into::<web_sys::Element>().ok())
            else {
                continue;
            };
            if matches!(self.register(&element), Registration::Attached(_)) {
                attached += 1;
            }
        }
        attached
    }

    /// Surfaces with listeners attached so far.
    pub fn registered_count(&self) -> usize {
        self.registry.borrow().attached()
    }

    fn attach_listeners(self: &Rc<Self>, element: &web_sys::Element, kind: SurfaceKind) {
        let trigger = Trigger::new(self.policy.clone(), TimeoutScheduler);

        let this = self.clone();
        let input_trigger = trigger.clone();
        let target = element.clone();
        EventListener::new(element, "input", move |_| {
            this.schedule(&input_trigger, &target, TriggerEvent::ContentChanged);
        })
        .forget();

        let this = self.clone();
        let target = element.clone();
        EventListener::new(element, "keyup", move |event| {
            let Some(event) = event.dyn_ref::<web_sys::KeyboardEvent>() else {
                return;
            };
            this.schedule(&trigger, &target, TriggerEvent::KeyUp(&event.key()));
        })
        .forget();

        tracing::debug!(tag = %element.tag_name(), ?kind, "attached snippet listeners");
    }

    /// Capture `input` and `keyup` for the whole document, so surfaces that
    /// were never registered still expand.
    pub fn listen_on_document(self: &Rc<Self>, document: &web_sys::Document) {
        let options = EventListenerOptions::run_in_capture_phase();

        let this = self.clone();
        EventListener::new_with_options(document, "input", options, move |event| {
            if let Some(target) = event_element(event) {
                this.schedule(&this.global_trigger, &target, TriggerEvent::ContentChanged);
            }
        })
        .forget();

        let this = self.clone();
        EventListener::new_with_options(document, "keyup", options, move |event| {
            let (Some(target), Some(key_event)) = (
                event_element(event),
                event.dyn_ref::<web_sys::KeyboardEvent>(),
            ) else {
                return;
            };
            this.schedule(&this.global_trigger, &target, TriggerEvent::KeyUp(&key_event.key()));
        })
        .forget();
    }

    fn schedule(
        self: &Rc<Self>,
        trigger: &Trigger<TimeoutScheduler>,
        element: &web_sys::Element,
        event: TriggerEvent<'_>,
    ) {
        let this = self.clone();
        let target = element.clone();
        trigger.handle(event, move || this.evaluate_element(&target));
    }

    /// Evaluate `element` against the current snapshot right now.
    pub fn evaluate_element(&self, element: &web_sys::Element) -> Evaluation {
        let Some(mut surface) = DomSurface::from_element(element, &self.config) else {
            return Evaluation::NoMatch;
        };
        evaluate(&mut surface, &self.mirror.snapshot())
    }

    fn observe(self: &Rc<Self>, body: &web_sys::HtmlElement) -> Result<(), PlatformError> {
        let this = self.clone();
        let callback = Closure::wrap(Box::new(move |records: js_sys::Array, _: JsValue| {
            for record in records.iter() {
                let Ok(record) = record.dyn_into::<web_sys::MutationRecord>() else {
                    continue;
                };
                let added = record.added_nodes();
                for i in 0..added.length() {
                    if let Some(element) =
                        added.item(i).and_then(|n| n.dyn_into::<web_sys::Element>().ok())
                    {
                        this.register_subtree(&element);
                    }
                }
            }
        }) as Box<dyn FnMut(js_sys::Array, JsValue)>);

        let observer = web_sys::MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| format!("MutationObserver::new failed: {}", js_error_message(e)))?;
        let init = web_sys::MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(body, &init)
            .map_err(|e| format!("observe failed: {}", js_error_message(e)))?;

        callback.forget();
        *self.observer.borrow_mut() = Some(observer);
        Ok(())
    }

    /// Current state for the debug entry point.
    pub fn debug_report(&self) -> DebugReport {
        let candidate_count = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.query_selector_all(&self.config.candidate_selector).ok())
            .map(|nodes| nodes.length() as usize)
            .unwrap_or(0);
        DebugReport::new(&self.mirror.snapshot(), candidate_count, self.registered_count())
    }
}

impl Drop for SnippetExpander {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.get_mut().take() {
            observer.disconnect();
        }
    }
}

fn event_element(event: &web_sys::Event) -> Option<web_sys::Element> {
    event.target()?.dyn_into::<web_sys::Element>().ok()
}
