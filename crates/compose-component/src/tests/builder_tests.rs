use super::*;
use crate::props::hyphenate;
use crate::test_support::{build, new_log, recording_definition, root};
use std::cell::RefCell;
use std::rc::Rc;

fn int(value: &PropValue) -> Option<i32> {
    value.downcast_ref::<i32>().copied()
}

#[test]
fn model_becomes_value_input_and_input_listener() {
    let log = new_log();
    let base = BaseConstructor::new();
    let definition =
        recording_definition(ComponentOptions::named("field").with_props(["value"]), &log);
    let callback = EventHandler::new(|_| {});

    let node = build(
        &base,
        definition,
        NodeData::new().with_model(PropValue::new(5), callback.clone()),
        None,
    );

    let component = node.component_options().expect("component node");
    assert_eq!(component.props_data.get("value").and_then(int), Some(5));
    assert_eq!(
        component.listeners.get("input"),
        Some(&Listener::Single(callback))
    );
}

#[test]
fn model_callback_is_prepended_to_existing_listener() {
    let options = ComponentOptions::default();
    let callback = EventHandler::new(|_| {});
    let existing = EventHandler::new(|_| {});
    let mut data = NodeData::new()
        .with_listener("input", existing.clone())
        .with_model(PropValue::new(1), callback.clone());

    transform_model(&options, &mut data);

    assert_eq!(
        data.on.get("input"),
        Some(&Listener::Multiple(vec![callback, existing]))
    );
}

#[test]
fn model_callback_already_listening_is_not_duplicated() {
    let options = ComponentOptions::default();
    let callback = EventHandler::new(|_| {});
    let other = EventHandler::new(|_| {});

    let mut single = NodeData::new()
        .with_listener("input", callback.clone())
        .with_model(PropValue::new(1), callback.clone());
    transform_model(&options, &mut single);
    assert_eq!(
        single.on.get("input"),
        Some(&Listener::Single(callback.clone()))
    );

    let mut list = NodeData::new()
        .with_listener(
            "input",
            Listener::Multiple(vec![other.clone(), callback.clone()]),
        )
        .with_model(PropValue::new(1), callback.clone());
    transform_model(&options, &mut list);
    assert_eq!(
        list.on.get("input"),
        Some(&Listener::Multiple(vec![other, callback]))
    );
}

#[test]
fn model_honours_declared_prop_and_event() {
    let log = new_log();
    let base = BaseConstructor::new();
    let definition = recording_definition(
        ComponentOptions::named("toggle")
            .with_props(["checked"])
            .with_model(Some("checked"), Some("change")),
        &log,
    );
    let callback = EventHandler::new(|_| {});

    let node = build(
        &base,
        definition,
        NodeData::new().with_model(PropValue::new(1), callback.clone()),
        None,
    );

    let component = node.component_options().expect("component node");
    assert_eq!(component.props_data.get("checked").and_then(int), Some(1));
    assert!(component.props_data.get("value").is_none());
    assert_eq!(
        component.listeners.get("change"),
        Some(&Listener::Single(callback))
    );
    assert!(component.listeners.get("input").is_none());
}

#[test]
fn custom_and_native_listeners_are_split() {
    let log = new_log();
    let base = BaseConstructor::new();
    let custom = EventHandler::new(|_| {});
    let native = EventHandler::new(|_| {});

    let node = build(
        &base,
        recording_definition(ComponentOptions::named("button"), &log),
        NodeData::new()
            .with_listener("select", custom.clone())
            .with_native_listener("click", native.clone()),
        None,
    );

    let component = node.component_options().expect("component node");
    assert_eq!(
        component.listeners.get("select"),
        Some(&Listener::Single(custom))
    );
    assert!(component.listeners.get("click").is_none());
    assert_eq!(node.data().on.get("click"), Some(&Listener::Single(native)));
    assert!(node.data().native_on.is_empty());
}

#[test]
fn abstract_component_keeps_only_slot() {
    let log = new_log();
    let base = BaseConstructor::new();
    let custom = EventHandler::new(|_| {});

    let node = build(
        &base,
        recording_definition(
            ComponentOptions::named("wrapper").abstract_component(),
            &log,
        ),
        NodeData::new()
            .with_key("k")
            .with_slot("header")
            .with_attr("id", PropValue::new("root"))
            .with_listener("done", custom.clone())
            .with_native_listener("click", EventHandler::new(|_| {})),
        None,
    );

    let data = node.data();
    assert_eq!(data.slot.as_deref(), Some("header"));
    assert!(data.attrs.is_empty());
    assert!(data.on.is_empty());
    assert!(data.key.is_none());
    assert!(node.key().is_none());
    assert!(!data.is_keep_alive());
    assert_eq!(data.hook.len(), 4);
    let component = node.component_options().expect("component node");
    assert_eq!(
        component.listeners.get("done"),
        Some(&Listener::Single(custom))
    );
}

#[test]
fn declared_inputs_are_extracted_from_props_and_attrs() {
    let log = new_log();
    let base = BaseConstructor::new();
    let definition = recording_definition(
        ComponentOptions::named("card").with_props(["title", "itemCount"]),
        &log,
    );

    let node = build(
        &base,
        definition,
        NodeData::new()
            .with_prop("title", PropValue::new(1))
            .with_attr("item-count", PropValue::new(3))
            .with_attr("id", PropValue::new(9)),
        None,
    );

    let component = node.component_options().expect("component node");
    assert_eq!(component.props_data.get("title").and_then(int), Some(1));
    assert_eq!(component.props_data.get("itemCount").and_then(int), Some(3));
    assert!(node.data().props.contains_key("title"));
    assert!(!node.data().attrs.contains_key("item-count"));
    assert!(node.data().attrs.contains_key("id"));
}

#[test]
fn hyphenate_only_splits_interior_capitals() {
    assert_eq!(hyphenate("itemCount"), "item-count");
    assert_eq!(hyphenate("Title"), "title");
    assert_eq!(hyphenate("aBC"), "a-b-c");
    assert_eq!(hyphenate("plain"), "plain");
}

#[test]
fn opaque_reference_builds_no_node() {
    let base = BaseConstructor::new();
    let mut host = DefaultBuildHost;
    let node = ComponentBuilder::new(base, &mut host).build(
        ComponentRef::Opaque("42".to_owned()),
        None,
        None,
        Vec::new(),
        Some("mystery"),
    );
    assert!(node.is_none());
}

#[test]
fn definition_extends_to_a_stable_constructor() {
    let log = new_log();
    let base = BaseConstructor::new();
    let definition = recording_definition(ComponentOptions::named("item"), &log);

    let first = build(&base, Rc::clone(&definition), NodeData::new(), None);
    let second = build(&base, definition, NodeData::new(), None);

    let first_cid = first.component_options().expect("component").ctor.cid();
    let second_cid = second.component_options().expect("component").ctor.cid();
    assert_eq!(first_cid, second_cid);
    assert_eq!(first.tag(), format!("compose-component-{first_cid}-item"));
    assert_eq!(first.tag(), second.tag());
}

#[test]
fn tag_falls_back_to_supplied_tag_name() {
    let log = new_log();
    let base = BaseConstructor::new();
    let mut host = DefaultBuildHost;
    let node = ComponentBuilder::new(base, &mut host)
        .build(
            recording_definition(ComponentOptions::default(), &log),
            None,
            None,
            Vec::new(),
            Some("my-widget"),
        )
        .expect("component node");

    let component = node.component_options().expect("component");
    assert_eq!(
        node.tag(),
        format!("compose-component-{}-my-widget", component.ctor.cid())
    );
    assert_eq!(component.tag.as_deref(), Some("my-widget"));
}

#[test]
fn late_global_mixin_is_seen_at_next_build() {
    let log = new_log();
    let base = BaseConstructor::new();
    let definition = recording_definition(ComponentOptions::named("late"), &log);
    let ctor = base.extend(&definition);

    base.mixin(&ComponentOptions::default().with_props(["theme"]));

    let node = build(
        &base,
        Rc::clone(&ctor),
        NodeData::new().with_attr("theme", PropValue::new(7)),
        None,
    );

    let component = node.component_options().expect("component");
    assert_eq!(component.props_data.get("theme").and_then(int), Some(7));
    assert_eq!(ctor.options().props, vec!["theme".to_owned()]);
    assert_eq!(ctor.options().name.as_deref(), Some("late"));
}

#[test]
fn context_and_children_are_recorded() {
    let log = new_log();
    let base = BaseConstructor::new();
    let parent = root("app", &log, true);
    let child = build(
        &base,
        recording_definition(ComponentOptions::named("leaf"), &log),
        NodeData::new(),
        None,
    );
    let mut host = DefaultBuildHost;

    let node = ComponentBuilder::new(Rc::clone(&base), &mut host)
        .build(
            recording_definition(ComponentOptions::named("list"), &log),
            None,
            Some(&parent),
            vec![Rc::clone(&child)],
            None,
        )
        .expect("component node");

    let context = node.context().expect("context kept");
    assert!(Rc::ptr_eq(&context, &parent));
    let component = node.component_options().expect("component");
    assert_eq!(component.children.len(), 1);
    assert!(Rc::ptr_eq(&component.children[0], &child));
}

#[test]
fn async_factory_builds_placeholder_then_real_node() {
    let log = new_log();
    let base = BaseConstructor::new();
    let definition = recording_definition(ComponentOptions::named("lazy"), &log);
    let resolver: Rc<RefCell<Option<AsyncResolver>>> = Rc::new(RefCell::new(None));
    let factory = AsyncFactory::new({
        let resolver = Rc::clone(&resolver);
        move |handle| *resolver.borrow_mut() = Some(handle)
    });
    let rerenders = Rc::new(std::cell::Cell::new(0));
    factory.subscribe({
        let rerenders = Rc::clone(&rerenders);
        move || rerenders.set(rerenders.get() + 1)
    });
    let mut host = DefaultBuildHost;

    let first = ComponentBuilder::new(Rc::clone(&base), &mut host)
        .build(
            Rc::clone(&factory),
            Some(NodeData::new().with_key("lazy")),
            None,
            Vec::new(),
            Some("lazy-tag"),
        )
        .expect("async placeholder");
    assert!(first.is_async_placeholder());
    assert!(Rc::ptr_eq(
        first.async_factory().expect("factory"),
        &factory
    ));
    let meta = first.async_meta().expect("async meta");
    assert_eq!(meta.tag.as_deref(), Some("lazy-tag"));
    assert_eq!(meta.data.key.as_deref(), Some("lazy"));
    assert!(first.data().hook.is_empty());

    resolver
        .borrow()
        .as_ref()
        .expect("loader started")
        .resolve(definition);
    assert_eq!(rerenders.get(), 1);

    let second = ComponentBuilder::new(Rc::clone(&base), &mut host)
        .build(
            Rc::clone(&factory),
            Some(NodeData::new().with_key("lazy")),
            None,
            Vec::new(),
            Some("lazy-tag"),
        )
        .expect("component node");
    assert!(!second.is_async_placeholder());
    assert!(Rc::ptr_eq(
        second.async_factory().expect("factory"),
        &factory
    ));
    assert!(second.tag().ends_with("-lazy"));
    assert_eq!(second.key(), Some("lazy"));
}

#[test]
fn async_factory_resolving_synchronously_builds_real_node_at_once() {
    let log = new_log();
    let base = BaseConstructor::new();
    let definition = recording_definition(ComponentOptions::named("eager"), &log);
    let factory = AsyncFactory::new(move |resolver| resolver.resolve(definition));
    let mut host = DefaultBuildHost;

    let node = ComponentBuilder::new(base, &mut host)
        .build(factory, None, None, Vec::new(), None)
        .expect("component node");

    assert!(!node.is_async_placeholder());
    assert!(node.tag().ends_with("-eager"));
}

#[test]
fn rejected_factory_keeps_rendering_placeholder() {
    let base = BaseConstructor::new();
    let factory = AsyncFactory::new(|resolver| resolver.reject("network down"));
    let mut host = DefaultBuildHost;

    let node = ComponentBuilder::new(base, &mut host)
        .build(Rc::clone(&factory), None, None, Vec::new(), None)
        .expect("async placeholder");

    assert!(node.is_async_placeholder());
    assert!(matches!(
        factory.state(),
        AsyncState::Rejected(ComponentError::AsyncRejected { reason }) if reason == "network down"
    ));
}

#[derive(Default)]
struct FunctionalHost {
    rendered: Vec<(Cid, usize)>,
}

impl BuildHost for FunctionalHost {
    fn create_functional_component(
        &mut self,
        ctor: &Rc<Constructor>,
        props_data: PropsData,
        _data: NodeData,
        _context: Option<&InstanceHandle>,
        _children: Vec<Rc<PlaceholderNode>>,
    ) -> Option<Rc<PlaceholderNode>> {
        self.rendered.push((ctor.cid(), props_data.len()));
        None
    }
}

#[test]
fn functional_component_goes_through_host() {
    let log = new_log();
    let base = BaseConstructor::new();
    let definition = recording_definition(
        ComponentOptions::named("label").functional().with_props(["text"]),
        &log,
    );
    let mut host = FunctionalHost::default();

    let node = ComponentBuilder::new(base, &mut host).build(
        definition,
        Some(NodeData::new().with_attr("text", PropValue::new(1))),
        None,
        Vec::new(),
        None,
    );

    assert!(node.is_none());
    assert_eq!(host.rendered.len(), 1);
    assert_eq!(host.rendered[0].1, 1);
    assert!(log.borrow().is_empty());
}
