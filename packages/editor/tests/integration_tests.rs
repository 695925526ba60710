//! Integration tests for editor crate

use gbn_common::Dom;
use gbn_editor::{
    Action, Breakpoint, ConfigMap, Context, DispatchOutcome, EditorConfig, ElementId, HostDocument,
    IdentityRegistry, PanelMode, Store, CONFIG_ATTRIBUTE,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn map(value: serde_json::Value) -> ConfigMap {
    value.as_object().cloned().unwrap()
}

fn page() -> (Dom, Vec<ElementId>) {
    let mut dom = Dom::new();
    let html = dom.append_element(dom.root(), "html").unwrap();
    let body = dom.append_element(html, "body").unwrap();
    let header = dom.append_element(body, "header").unwrap();
    let menu = dom.append_element(header, "nav").unwrap();
    let main = dom.append_element(body, "main").unwrap();
    let hero = dom.append_element(main, "section").unwrap();
    let features = dom.append_element(main, "section").unwrap();
    (dom, vec![menu, hero, features])
}

#[test]
fn test_init_then_switch_breakpoint() {
    let mut store = Store::new();

    store.dispatch_raw(&json!({
        "type": "INIT_BLOCKS",
        "payload": { "b1": { "id": "b1", "role": "menu", "config": { "color": "red" } } }
    }));
    assert_eq!(store.get_state().blocks["b1"].config.get("color"), Some(&json!("red")));

    store.dispatch_raw(&json!({ "type": "SET_MODE", "mode": "tablet" }));
    assert_eq!(store.get_state().viewport_breakpoint, Breakpoint::Tablet);
}

#[test]
fn test_tablet_edit_keeps_base_value() {
    let mut store = Store::new();
    store.dispatch_raw(&json!({
        "type": "INIT_BLOCKS",
        "payload": { "b1": { "id": "b1", "role": "menu", "config": { "color": "red" } } }
    }));

    let outcome = store.dispatch_raw(&json!({
        "type": "UPDATE_BLOCK",
        "id": "b1",
        "payload": { "color": "blue" },
        "breakpoint": "tablet"
    }));
    assert_eq!(outcome, DispatchOutcome::Applied);

    let state = store.get_state();
    let block = &state.blocks["b1"];
    assert_eq!(block.config.get("color"), Some(&json!("red")));
    assert_eq!(block.config["_responsive"]["tablet"]["color"], json!("blue"));

    let tablet = state
        .effective_config("b1", &Breakpoint::Tablet, store.base_breakpoint())
        .unwrap();
    assert_eq!(tablet.get("color"), Some(&json!("blue")));
}

#[test]
fn test_malformed_update_is_atomic_no_op() {
    let mut store = Store::new();
    store.dispatch_raw(&json!({
        "type": "INIT_BLOCKS",
        "payload": { "b1": { "id": "b1", "config": { "color": "red" } } }
    }));
    let notified = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&notified);
    store.subscribe(move |_, _, _| *flag.borrow_mut() = true);

    let before = store.get_state();
    assert_eq!(store.dispatch_raw(&json!({ "type": "UPDATE_BLOCK" })), DispatchOutcome::Rejected);
    assert_eq!(
        store.dispatch_raw(&json!({ "type": "UPDATE_BLOCK", "id": "b1", "payload": "blue" })),
        DispatchOutcome::Rejected
    );
    assert_eq!(store.dispatch_raw(&json!({ "payload": {} })), DispatchOutcome::Rejected);

    assert_eq!(store.get_state(), before);
    assert!(!*notified.borrow());
}

#[test]
fn test_listener_sees_previous_and_next() {
    let mut store = Store::new();
    store.dispatch(Action::AddBlock {
        payload: serde_json::from_value(json!({ "id": "b1", "config": { "size": 1 } })).unwrap(),
    });

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(move |next, prev, action| {
        sink.borrow_mut().push((
            action.kind(),
            prev.blocks["b1"].config.get("size").cloned(),
            next.blocks["b1"].config.get("size").cloned(),
        ));
    });

    store.dispatch(Action::update_block("b1", map(json!({ "size": 2 }))));

    assert_eq!(
        *seen.borrow(),
        vec![("UPDATE_BLOCK", Some(json!(1)), Some(json!(2)))]
    );
}

#[test]
fn test_delete_selected_block_clears_selection() {
    let mut store = Store::new();
    store.dispatch_raw(&json!({
        "type": "INIT_BLOCKS",
        "payload": { "b1": { "id": "b1" }, "b2": { "id": "b2" } }
    }));

    store.dispatch_raw(&json!({ "type": "SELECT_BLOCK", "id": "b1" }));
    store.dispatch_raw(&json!({ "type": "DELETE_BLOCK", "id": "b1" }));
    assert_eq!(store.get_state().selection, None);

    store.dispatch_raw(&json!({ "type": "SELECT_BLOCK", "id": "b2" }));
    store.dispatch_raw(&json!({ "type": "DELETE_BLOCK", "id": "b1" }));
    assert_eq!(store.get_state().selection.as_deref(), Some("b2"));
}

#[test]
fn test_page_editing_session() {
    let (mut dom, regions) = page();
    let mut ctx = Context::with_seed(EditorConfig::default(), 11);

    let ids = ctx.bootstrap(&dom, &[(regions[0], "menu"), (regions[1], "principal"), (regions[2], "principal")]);
    assert_eq!(ids.len(), 3);
    assert!(!ctx.store().get_state().is_dirty);

    // Clicking the hero section opens the block panel for it
    let hero = ctx
        .select_element(&mut dom, regions[1], "principal", map(json!({ "label": "Hero" })))
        .unwrap();
    assert_eq!(hero, ids[1]);

    ctx.edit_selected(&mut dom, map(json!({ "background": "#fff" })));
    ctx.store_mut().dispatch(Action::SetMode { mode: Breakpoint::Mobile });
    ctx.edit_selected(&mut dom, map(json!({ "background": "#000" })));

    let state = ctx.store().get_state();
    assert!(state.is_dirty);
    assert_eq!(state.blocks[&hero].config.get("background"), Some(&json!("#fff")));
    assert_eq!(
        state.blocks[&hero].config["_responsive"]["mobile"]["background"],
        json!("#000")
    );

    // The element carries the full stored config
    let mirrored: serde_json::Value =
        serde_json::from_str(&dom.attribute(regions[1], CONFIG_ATTRIBUTE).unwrap()).unwrap();
    assert_eq!(mirrored["_responsive"]["mobile"]["background"], json!("#000"));

    // Persistence layer confirms the save
    let persisted = state.to_persisted();
    assert_eq!(persisted[&hero]["background"], json!("#fff"));
    ctx.store_mut().mark_saved();
    assert!(!ctx.store().get_state().is_dirty);

    ctx.open_page_panel(&mut dom, "Page settings");
    assert_eq!(ctx.modes().mode(), PanelMode::Page);
    assert_eq!(ctx.store().get_state().selection, None);
}

#[test]
fn test_reload_reproduces_ids() {
    let (first_dom, first_regions) = page();
    let (second_dom, second_regions) = page();

    let mut first = Context::with_seed(EditorConfig::default(), 1);
    let mut second = Context::with_seed(EditorConfig::default(), 2);

    let regions_a: Vec<(ElementId, &str)> = first_regions.iter().map(|el| (*el, "block")).collect();
    let regions_b: Vec<(ElementId, &str)> = second_regions.iter().map(|el| (*el, "block")).collect();

    assert_eq!(first.bootstrap(&first_dom, &regions_a), second.bootstrap(&second_dom, &regions_b));
}

#[test]
fn test_registry_idempotence_and_collisions() {
    let mut dom = Dom::new();
    let html = dom.append_element(dom.root(), "html").unwrap();
    let body = dom.append_element(html, "body").unwrap();
    // "an:0" and "c0:0" hash to the same value
    let first = dom.append_element(body, "an").unwrap();
    let second = dom.append_element(body, "c0").unwrap();

    let mut registry = IdentityRegistry::with_seed(5);
    let a = registry.register(&dom, "menu", first, ConfigMap::new()).unwrap().id.clone();
    let again = registry.register(&dom, "menu", first, ConfigMap::new()).unwrap().id.clone();
    let b = registry.register(&dom, "menu", second, ConfigMap::new()).unwrap().id.clone();

    assert_eq!(a, again);
    assert_ne!(a, b);
    assert!(b.starts_with(&format!("{}-", a)));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get_by_element(second).map(|block| block.id.as_str()), Some(b.as_str()));
}
