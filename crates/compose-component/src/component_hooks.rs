//! The built-in `init`, `prepatch`, `insert` and `destroy` hooks.

use std::rc::Rc;

use crate::hooks::HookName;
use crate::keep_alive::{activate_child_component, deactivate_child_component};
use crate::lifecycle::{
    call_hook, create_component_instance_for_node, teardown, ChildUpdate, InstanceHandle,
    LifecycleHook,
};
use crate::node::PlaceholderNode;
use crate::patch::PatchContext;

pub(crate) fn run(
    name: HookName,
    cx: &mut PatchContext<'_>,
    old: Option<&Rc<PlaceholderNode>>,
    node: &Rc<PlaceholderNode>,
) {
    log::trace!("{name} hook for {}", node.tag());
    match name {
        HookName::Init => init(cx, node),
        HookName::Prepatch => prepatch(cx, old.unwrap_or(node), node),
        HookName::Insert => insert(cx, node),
        HookName::Destroy => destroy(node),
    }
}

fn instance_of(node: &PlaceholderNode) -> InstanceHandle {
    node.component_instance()
        .unwrap_or_else(|| panic!("placeholder {} has no component instance", node.tag()))
}

fn init(cx: &mut PatchContext<'_>, node: &Rc<PlaceholderNode>) {
    if let Some(instance) = node.component_instance() {
        if !instance.lifecycle().is_destroyed() && node.data().is_keep_alive() {
            // Cached keep-alive instance: treat as an update of itself.
            prepatch(cx, node, node);
            return;
        }
    }
    let child = create_component_instance_for_node(node, cx.active_instance().cloned());
    node.set_component_instance(Rc::clone(&child));
    let target = if cx.is_hydrating() { node.elm() } else { None };
    child.mount(cx, target);
}

fn prepatch(cx: &mut PatchContext<'_>, old: &Rc<PlaceholderNode>, node: &Rc<PlaceholderNode>) {
    let options = node
        .component_options()
        .unwrap_or_else(|| panic!("prepatch on non-component node {}", node.tag()));
    let child = instance_of(old);
    node.set_component_instance(Rc::clone(&child));
    child.lifecycle().set_placeholder(node);
    child.update_child(
        cx,
        ChildUpdate {
            props_data: &options.props_data,
            listeners: &options.listeners,
            placeholder: node,
            children: &options.children,
        },
    );
}

fn insert(cx: &mut PatchContext<'_>, node: &Rc<PlaceholderNode>) {
    let instance = instance_of(node);
    if instance.lifecycle().mark_mounted() {
        call_hook(&instance, LifecycleHook::Mounted);
    }
    if node.data().is_keep_alive() {
        let context_mounted = node
            .context()
            .is_some_and(|context| context.lifecycle().is_mounted());
        if context_mounted {
            // The surrounding tree may still be replaced later in this pass.
            cx.activation_queue().enqueue(instance);
        } else {
            activate_child_component(&instance, true);
        }
    }
}

fn destroy(node: &Rc<PlaceholderNode>) {
    let instance = instance_of(node);
    if instance.lifecycle().is_destroyed() {
        return;
    }
    if node.data().is_keep_alive() {
        deactivate_child_component(&instance, true);
    } else {
        teardown(&instance);
    }
}
