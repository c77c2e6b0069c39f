//! WASM browser tests for weaver-snippets-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use weaver_snippets_browser::{
    DictionaryMirror, DomSurface, EditableSurface, Evaluation, ExpanderConfig, Registration,
    ReplaceError, Snippet, SnippetDictionary, SnippetExpander, SurfaceKind, element_surface_kind,
    evaluate,
};

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

fn dictionary() -> SnippetDictionary {
    SnippetDictionary::from_snippets(vec![
        Snippet::new(";br", "Best regards,\nJohn").with_name("Sign-off"),
        Snippet::new(";addr", "123 Main St"),
    ])
}

fn mount(tag: &str) -> web_sys::Element {
    let element = document().create_element(tag).unwrap();
    document().body().unwrap().append_child(&element).unwrap();
    element
}

fn input(input_type: &str, value: &str) -> web_sys::HtmlInputElement {
    let element = mount("input");
    element.set_attribute("type", input_type).unwrap();
    let input: web_sys::HtmlInputElement = element.dyn_into().unwrap();
    input.set_value(value);
    input
}

fn editable(html: &str) -> web_sys::HtmlElement {
    let element: web_sys::HtmlElement = mount("div").dyn_into().unwrap();
    element.set_content_editable("true");
    element.set_inner_html(html);
    element
}

fn evaluate_element(element: &web_sys::Element) -> Evaluation {
    let config = ExpanderConfig::default();
    let mut surface = DomSurface::from_element(element, &config).expect("supported surface");
    evaluate(&mut surface, &dictionary())
}

// === Classification ===

#[wasm_bindgen_test]
fn test_classify_elements() {
    let config = ExpanderConfig::default();

    let text = input("text", "");
    assert_eq!(element_surface_kind(&text, &config), SurfaceKind::FlatValue);

    let checkbox = input("checkbox", "");
    assert_eq!(element_surface_kind(&checkbox, &config), SurfaceKind::Unsupported);

    let area = mount("textarea");
    assert_eq!(element_surface_kind(&area, &config), SurfaceKind::FlatValue);

    let region = editable("hello");
    assert_eq!(element_surface_kind(&region, &config), SurfaceKind::TreeStructured);

    let plain = mount("span");
    assert_eq!(element_surface_kind(&plain, &config), SurfaceKind::Unsupported);
    assert!(DomSurface::from_element(&plain, &config).is_none());

    text.remove();
    checkbox.remove();
    area.remove();
    region.remove();
    plain.remove();
}

// === Flat surfaces ===

#[wasm_bindgen_test]
fn test_flat_replacement_moves_caret() {
    // Single-line inputs strip newlines, so multi-line text goes in a textarea.
    let area: web_sys::HtmlTextAreaElement = mount("textarea").dyn_into().unwrap();
    area.set_value("Thanks ;br");
    area.set_selection_range(10, 10).unwrap();

    let outcome = evaluate_element(&area);
    assert!(outcome.is_replaced());
    assert_eq!(area.value(), "Thanks Best regards,\nJohn");
    assert_eq!(area.selection_start().unwrap(), Some(25));

    area.remove();
}

#[wasm_bindgen_test]
fn test_flat_replacement_dispatches_input_and_change() {
    let field = input("text", ";addr see you");
    field.set_selection_range(5, 5).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let on_input = {
        let seen = seen.clone();
        EventListener::new(&field, "input", move |_| seen.borrow_mut().push("input"))
    };
    let on_change = {
        let seen = seen.clone();
        EventListener::new(&field, "change", move |_| seen.borrow_mut().push("change"))
    };

    assert!(evaluate_element(&field).is_replaced());
    assert_eq!(field.value(), "123 Main St see you");
    assert_eq!(field.selection_start().unwrap(), Some(11));
    assert_eq!(*seen.borrow(), vec!["input", "change"]);

    drop(on_input);
    drop(on_change);
    field.remove();
}

#[wasm_bindgen_test]
fn test_flat_no_match_leaves_value() {
    let field = input("text", "nothing here");
    assert_eq!(evaluate_element(&field), Evaluation::NoMatch);
    assert_eq!(field.value(), "nothing here");
    field.remove();
}

#[wasm_bindgen_test]
fn test_textarea_multibyte_caret() {
    let area: web_sys::HtmlTextAreaElement = mount("textarea").dyn_into().unwrap();
    // "🙂" is two UTF-16 units but one char.
    area.set_value("🙂 ;addr");
    area.set_selection_range(8, 8).unwrap();

    assert!(evaluate_element(&area).is_replaced());
    assert_eq!(area.value(), "🙂 123 Main St");
    assert_eq!(area.selection_start().unwrap(), Some(14));

    area.remove();
}

#[wasm_bindgen_test]
fn test_email_input_without_selection_api() {
    // Email inputs expose no selection, so the caret is taken to be the end.
    let field = input("email", "me@example.com ;addr");

    match evaluate_element(&field) {
        Evaluation::Replaced { replacement, .. } => assert!(!replacement.caret_restored),
        other => panic!("expected replacement, got {other:?}"),
    }
    assert_eq!(field.value(), "me@example.com 123 Main St");

    field.remove();
}

// === Tree surfaces ===

#[wasm_bindgen_test]
fn test_tree_replacement_touches_only_containing_leaf() {
    let region = editable("hello ;br <b>world</b>");

    assert!(evaluate_element(&region).is_replaced());
    assert_eq!(region.inner_html(), "hello Best regards,\nJohn <b>world</b>");

    region.remove();
}

#[wasm_bindgen_test]
fn test_tree_replacement_collapses_selection() {
    let region = editable("hi ;br");
    let config = ExpanderConfig::default();
    let mut surface = DomSurface::from_element(&region, &config).unwrap();
    assert_eq!(surface.kind(), SurfaceKind::TreeStructured);

    assert!(evaluate(&mut surface, &dictionary()).is_replaced());

    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    assert!(selection.is_collapsed());
    let anchor = selection.anchor_node().unwrap();
    assert_eq!(anchor.text_content().unwrap(), "hi Best regards,\nJohn");
    assert_eq!(selection.anchor_offset(), 21);

    region.remove();
}

#[wasm_bindgen_test]
fn test_tree_straddling_shortcut_is_skipped() {
    let region = editable("go ;<b>br</b>");

    match evaluate_element(&region) {
        Evaluation::Skipped { error, .. } => {
            assert!(matches!(error, ReplaceError::StraddlingMatch { .. }))
        }
        other => panic!("expected skip, got {other:?}"),
    }
    assert_eq!(region.inner_html(), "go ;<b>br</b>");

    region.remove();
}

// === Registration ===

#[wasm_bindgen_test]
fn test_registration_is_idempotent() {
    let expander = SnippetExpander::with_mirror(ExpanderConfig::default(), DictionaryMirror::new());
    let field = input("text", "");

    assert_eq!(expander.register(&field), Registration::Attached(SurfaceKind::FlatValue));
    assert_eq!(expander.register(&field), Registration::AlreadyRegistered);
    assert_eq!(expander.registered_count(), 1);

    let checkbox = input("checkbox", "");
    assert_eq!(expander.register(&checkbox), Registration::Unsupported);
    assert_eq!(expander.registered_count(), 1);

    field.remove();
    checkbox.remove();
}

#[wasm_bindgen_test]
fn test_register_subtree_finds_descendants() {
    let expander = SnippetExpander::with_mirror(ExpanderConfig::default(), DictionaryMirror::new());
    let container = mount("div");
    container
        .set_inner_html(r#"<input type="text"><textarea></textarea><input type="checkbox"><div contenteditable="true">x</div>"#);

    assert_eq!(expander.register_subtree(&container), 3);
    assert_eq!(expander.register_subtree(&container), 0);
    assert_eq!(expander.registered_count(), 3);

    container.remove();
}

#[wasm_bindgen_test]
fn test_expander_evaluates_against_mirror() {
    let mirror = DictionaryMirror::new();
    let expander = SnippetExpander::with_mirror(ExpanderConfig::default(), mirror.clone());
    let field = input("text", "x;br");

    assert_eq!(expander.evaluate_element(&field), Evaluation::NoMatch);

    mirror.replace(vec![Snippet::new(";br", "BR")]);
    assert!(expander.evaluate_element(&field).is_replaced());
    assert_eq!(field.value(), "xBR");

    field.remove();
}

#[wasm_bindgen_test]
fn test_tree_caret_on_empty_line() {
    let region = editable("abc<div><br></div>;br");
    let line = region.first_element_child().unwrap();

    let range = document().create_range().unwrap();
    range.set_start(&line, 0).unwrap();
    range.collapse_with_to_start(true);
    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    selection.remove_all_ranges().unwrap();
    selection.add_range(&range).unwrap();

    let config = ExpanderConfig::default();
    let surface = DomSurface::from_element(&region, &config).unwrap();
    assert_eq!(surface.caret(), 3);

    // ";br" sits after the caret, so nothing expands.
    assert_eq!(evaluate_element(&region), Evaluation::NoMatch);
    assert_eq!(region.inner_html(), "abc<div><br></div>;br");

    region.remove();
}

// === Listener-driven expansion ===

fn dispatch_input(target: &web_sys::EventTarget) {
    let init = web_sys::EventInit::new();
    init.set_bubbles(true);
    let event = web_sys::Event::new_with_event_init_dict("input", &init).unwrap();
    target.dispatch_event(&event).unwrap();
}

fn dispatch_keyup(target: &web_sys::EventTarget, key: &str) {
    let init = web_sys::KeyboardEventInit::new();
    init.set_key(key);
    init.set_bubbles(true);
    let event = web_sys::KeyboardEvent::new_with_keyboard_event_init_dict("keyup", &init).unwrap();
    target.dispatch_event(&event).unwrap();
}

#[wasm_bindgen_test]
async fn test_registered_input_expands_after_settling_delay() {
    let mirror = DictionaryMirror::new();
    mirror.replace(vec![Snippet::new(";reg", "registered")]);
    let expander = SnippetExpander::with_mirror(ExpanderConfig::default(), mirror);

    let field = input("text", "");
    assert_eq!(expander.register(&field), Registration::Attached(SurfaceKind::FlatValue));

    field.set_value("hi ;re");
    field.set_selection_range(6, 6).unwrap();
    dispatch_input(&field);
    // Finish the token before the settling delay runs out.
    field.set_value("hi ;reg");
    field.set_selection_range(7, 7).unwrap();
    assert_eq!(field.value(), "hi ;reg");

    gloo_timers::future::TimeoutFuture::new(30).await;
    assert_eq!(field.value(), "hi registered");
    assert_eq!(field.selection_start().unwrap(), Some(13));

    field.remove();
}

#[wasm_bindgen_test]
async fn test_document_listener_covers_unregistered_input() {
    let mirror = DictionaryMirror::new();
    mirror.replace(vec![Snippet::new(";doc", "from the document")]);
    let expander = SnippetExpander::with_mirror(ExpanderConfig::default(), mirror);
    expander.listen_on_document(&document());

    let field = input("text", "see ;doc");
    field.set_selection_range(8, 8).unwrap();

    // Not a boundary key: nothing is scheduled.
    dispatch_keyup(&field, "c");
    gloo_timers::future::TimeoutFuture::new(80).await;
    assert_eq!(field.value(), "see ;doc");

    dispatch_keyup(&field, " ");
    gloo_timers::future::TimeoutFuture::new(80).await;
    assert_eq!(field.value(), "see from the document");
    assert_eq!(expander.registered_count(), 0);

    field.remove();
}
