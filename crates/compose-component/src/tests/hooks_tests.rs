use super::*;
use crate::test_support::{build, entries, mount, new_log, recording_definition};
use std::cell::Cell;
use std::rc::Rc;

#[test]
fn install_fills_every_component_slot() {
    let mut hooks = HookSet::new();
    install_component_hooks(&mut hooks);

    assert_eq!(hooks.len(), 4);
    for name in HookName::COMPONENT {
        assert!(matches!(
            hooks.get(name),
            Some(Hook::Component(slot)) if *slot == name
        ));
    }
}

#[test]
fn install_wraps_user_hook_once() {
    let mut hooks = HookSet::new();
    hooks.insert(HookName::Insert, Hook::user(|_, _, _| {}));

    install_component_hooks(&mut hooks);
    assert!(matches!(
        hooks.get(HookName::Insert),
        Some(Hook::Merged(HookName::Insert, _))
    ));

    install_component_hooks(&mut hooks);
    assert!(matches!(
        hooks.get(HookName::Insert),
        Some(Hook::Merged(HookName::Insert, _))
    ));
    assert!(matches!(
        hooks.get(HookName::Init),
        Some(Hook::Component(HookName::Init))
    ));
}

#[test]
fn reinstalled_merge_runs_user_hook_once() {
    let log = new_log();
    let base = BaseConstructor::new();
    let definition = recording_definition(ComponentOptions::named("child"), &log);
    let calls = Rc::new(Cell::new(0));

    let mut data = NodeData::new();
    data.hook.insert(HookName::Insert, {
        let calls = Rc::clone(&calls);
        Hook::user(move |_, _, _| calls.set(calls.get() + 1))
    });
    // A render function reusing an already-installed data bag.
    install_component_hooks(&mut data.hook);

    let node = build(&base, definition, data, None);
    let mut queue = ActivationQueue::new();
    let mut cx = PatchContext::new(&mut queue);
    mount(&mut cx, &node);

    assert_eq!(calls.get(), 1);
    assert_eq!(
        entries(&log),
        vec!["child:construct", "child:mount", "child:mounted"]
    );
}

#[test]
fn merged_insert_runs_default_before_user() {
    let log = new_log();
    let base = BaseConstructor::new();
    let definition = recording_definition(ComponentOptions::named("child"), &log);

    let mut data = NodeData::new();
    data.hook.insert(HookName::Insert, {
        let log = Rc::clone(&log);
        Hook::user(move |_, _, node| {
            let instance = node.component_instance().expect("instance attached");
            assert!(instance.lifecycle().is_mounted());
            log.borrow_mut().push("user:insert".to_owned());
        })
    });

    let node = build(&base, definition, data, None);
    let mut queue = ActivationQueue::new();
    let mut cx = PatchContext::new(&mut queue);
    mount(&mut cx, &node);

    assert_eq!(
        entries(&log),
        vec![
            "child:construct",
            "child:mount",
            "child:mounted",
            "user:insert"
        ]
    );
}

#[test]
fn component_hook_already_present_is_left_alone() {
    let mut hooks = HookSet::new();
    hooks.insert(HookName::Destroy, Hook::Component(HookName::Destroy));

    install_component_hooks(&mut hooks);

    assert!(matches!(
        hooks.get(HookName::Destroy),
        Some(Hook::Component(HookName::Destroy))
    ));
}

#[test]
fn invoke_hook_reports_whether_a_hook_ran() {
    let log = new_log();
    let base = BaseConstructor::new();
    let definition = recording_definition(ComponentOptions::default(), &log);
    let node = build(&base, definition, NodeData::new(), None);
    let pending = PlaceholderNode::async_placeholder(
        AsyncFactory::new(|_| {}),
        NodeData::new(),
        None,
        Vec::new(),
        None,
    );
    let mut queue = ActivationQueue::new();
    let mut cx = PatchContext::new(&mut queue);

    assert!(node.invoke_hook(HookName::Init, &mut cx, None));
    assert!(!pending.invoke_hook(HookName::Init, &mut cx, None));
    assert_eq!(entries(&log), vec!["anon:construct", "anon:mount"]);
}
