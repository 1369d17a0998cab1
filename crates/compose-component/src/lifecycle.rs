//! Live component instances and the lifecycle state this crate owns for them.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::constructor::Constructor;
use crate::node::{HostElement, Listeners, PlaceholderNode, PropsData, RenderFn};
use crate::patch::PatchContext;

pub type InstanceId = usize;

/// Shared handle to a live instance.
pub type InstanceHandle = Rc<dyn ComponentInstance>;

static NEXT_INSTANCE_ID: AtomicUsize = AtomicUsize::new(1);

fn next_instance_id() -> InstanceId {
    NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Notifications delivered to an instance over its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleHook {
    Mounted,
    Activated,
    Deactivated,
    BeforeDestroy,
    Destroyed,
}

impl LifecycleHook {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleHook::Mounted => "mounted",
            LifecycleHook::Activated => "activated",
            LifecycleHook::Deactivated => "deactivated",
            LifecycleHook::BeforeDestroy => "beforeDestroy",
            LifecycleHook::Destroyed => "destroyed",
        }
    }
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New inputs pushed into an existing instance on re-render.
pub struct ChildUpdate<'a> {
    pub props_data: &'a PropsData,
    pub listeners: &'a Listeners,
    pub placeholder: &'a Rc<PlaceholderNode>,
    pub children: &'a [Rc<PlaceholderNode>],
}

/// A live component instance.
///
/// The lifecycle flags live in [`Lifecycle`] and are driven by this crate;
/// implementors supply rendering, updating and teardown of their own state.
pub trait ComponentInstance: Any {
    fn lifecycle(&self) -> &Lifecycle;

    /// Renders and patches the instance's subtree. `target` is only set when
    /// hydrating.
    fn mount(&self, _cx: &mut PatchContext<'_>, _target: Option<HostElement>) {}

    /// Applies new inputs. Called on every re-render of the occurrence, so it
    /// must tolerate unchanged inputs.
    fn update_child(&self, _cx: &mut PatchContext<'_>, _update: ChildUpdate<'_>) {}

    fn on_lifecycle(&self, _hook: LifecycleHook) {}

    /// Releases watchers and the rendered subtree during teardown.
    fn release(&self) {}
}

impl dyn ComponentInstance {
    pub fn as_any(&self) -> &dyn Any {
        self
    }

    pub fn downcast_ref<T: ComponentInstance>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Options record handed to a constructor's factory at `init`.
pub struct InstanceOptions {
    pub is_component: bool,
    pub parent_vnode: Rc<PlaceholderNode>,
    /// Instance that was rendering when the placeholder was initialised.
    pub parent: Option<InstanceHandle>,
    pub constructor: Rc<Constructor>,
    pub render: Option<RenderFn>,
    pub static_render_fns: Vec<RenderFn>,
}

/// Lifecycle state of one instance.
pub struct Lifecycle {
    id: InstanceId,
    name: Option<String>,
    is_abstract: bool,
    parent: Option<Weak<dyn ComponentInstance>>,
    children: RefCell<Vec<Weak<dyn ComponentInstance>>>,
    placeholder: RefCell<Option<Weak<PlaceholderNode>>>,
    is_mounted: Cell<bool>,
    is_being_destroyed: Cell<bool>,
    is_destroyed: Cell<bool>,
    inactive: Cell<Option<bool>>,
    direct_inactive: Cell<bool>,
}

impl Lifecycle {
    /// Lifecycle for an instance created from a placeholder. The parent is
    /// the nearest non-abstract ancestor of `options.parent`.
    pub fn new(options: &InstanceOptions) -> Self {
        let component = options.constructor.options();
        let mut parent = options.parent.clone();
        if !component.is_abstract {
            while let Some(candidate) = parent.clone() {
                let lifecycle = candidate.lifecycle();
                if !lifecycle.is_abstract {
                    break;
                }
                match lifecycle.parent() {
                    Some(next) => parent = Some(next),
                    None => break,
                }
            }
        }
        Self {
            id: next_instance_id(),
            name: component.name.clone(),
            is_abstract: component.is_abstract,
            parent: parent.as_ref().map(Rc::downgrade),
            children: RefCell::new(Vec::new()),
            placeholder: RefCell::new(Some(Rc::downgrade(&options.parent_vnode))),
            is_mounted: Cell::new(false),
            is_being_destroyed: Cell::new(false),
            is_destroyed: Cell::new(false),
            inactive: Cell::new(None),
            direct_inactive: Cell::new(false),
        }
    }

    /// Lifecycle for a root instance that no placeholder owns.
    pub fn root(name: Option<&str>) -> Self {
        Self {
            id: next_instance_id(),
            name: name.map(str::to_owned),
            is_abstract: false,
            parent: None,
            children: RefCell::new(Vec::new()),
            placeholder: RefCell::new(None),
            is_mounted: Cell::new(false),
            is_being_destroyed: Cell::new(false),
            is_destroyed: Cell::new(false),
            inactive: Cell::new(None),
            direct_inactive: Cell::new(false),
        }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn parent(&self) -> Option<InstanceHandle> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Live children in registration order.
    pub fn children(&self) -> Vec<InstanceHandle> {
        self.children
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// The placeholder that currently owns the instance.
    pub fn placeholder(&self) -> Option<Rc<PlaceholderNode>> {
        self.placeholder.borrow().as_ref().and_then(Weak::upgrade)
    }

    pub(crate) fn set_placeholder(&self, node: &Rc<PlaceholderNode>) {
        *self.placeholder.borrow_mut() = Some(Rc::downgrade(node));
    }

    pub fn is_mounted(&self) -> bool {
        self.is_mounted.get()
    }

    /// Root instances are mounted by their driver rather than by `insert`.
    pub fn mark_root_mounted(&self) {
        if self.parent.is_none() && self.placeholder.borrow().is_none() {
            self.is_mounted.set(true);
        }
    }

    pub(crate) fn mark_mounted(&self) -> bool {
        !self.is_mounted.replace(true)
    }

    pub fn is_being_destroyed(&self) -> bool {
        self.is_being_destroyed.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.is_destroyed.get()
    }

    /// `None` until the instance has been activated or deactivated once.
    pub fn inactive(&self) -> Option<bool> {
        self.inactive.get()
    }

    pub(crate) fn set_inactive(&self, inactive: bool) {
        self.inactive.set(Some(inactive));
    }

    pub fn is_direct_inactive(&self) -> bool {
        self.direct_inactive.get()
    }

    pub(crate) fn set_direct_inactive(&self, direct: bool) {
        self.direct_inactive.set(direct);
    }

    fn attach(&self, instance: &InstanceHandle) {
        if self.is_abstract {
            return;
        }
        if let Some(parent) = self.parent() {
            parent
                .lifecycle()
                .children
                .borrow_mut()
                .push(Rc::downgrade(instance));
        }
    }

    fn detach(&self, instance: &InstanceHandle) {
        if self.is_abstract {
            return;
        }
        let Some(parent) = self.parent() else {
            return;
        };
        let parent_lifecycle = parent.lifecycle();
        if parent_lifecycle.is_being_destroyed() {
            return;
        }
        let target = Rc::as_ptr(instance);
        parent_lifecycle
            .children
            .borrow_mut()
            .retain(|child| !std::ptr::addr_eq(child.as_ptr(), target));
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("is_abstract", &self.is_abstract)
            .field("is_mounted", &self.is_mounted.get())
            .field("is_destroyed", &self.is_destroyed.get())
            .field("inactive", &self.inactive.get())
            .field("direct_inactive", &self.direct_inactive.get())
            .finish()
    }
}

/// Delivers `hook` to `instance`.
pub fn call_hook(instance: &InstanceHandle, hook: LifecycleHook) {
    log::trace!(
        "{hook} -> instance {} ({})",
        instance.lifecycle().id(),
        instance.lifecycle().name().unwrap_or("<anonymous>")
    );
    instance.on_lifecycle(hook);
}

/// Builds the instance for `node`, parented to `parent`. The instance is
/// neither mounted nor destroyed.
pub fn create_component_instance_for_node(
    node: &Rc<PlaceholderNode>,
    parent: Option<InstanceHandle>,
) -> InstanceHandle {
    let component = node
        .component_options()
        .expect("component instance requested for a node without component options");
    let mut options = InstanceOptions {
        is_component: true,
        parent_vnode: Rc::clone(node),
        parent,
        constructor: Rc::clone(&component.ctor),
        render: None,
        static_render_fns: Vec::new(),
    };
    if let Some(template) = &node.data().inline_template {
        options.render = Some(Rc::clone(&template.render));
        options.static_render_fns = template.static_render_fns.clone();
    }
    let instance = component.ctor.instantiate(options);
    instance.lifecycle().attach(&instance);
    log::debug!(
        "created instance {} for {}",
        instance.lifecycle().id(),
        node.tag()
    );
    instance
}

/// Fully tears `instance` down. Later calls are no-ops.
pub fn teardown(instance: &InstanceHandle) {
    let lifecycle = instance.lifecycle();
    if lifecycle.is_being_destroyed() {
        return;
    }
    call_hook(instance, LifecycleHook::BeforeDestroy);
    lifecycle.is_being_destroyed.set(true);
    lifecycle.detach(instance);
    instance.release();
    lifecycle.is_destroyed.set(true);
    log::debug!("destroyed instance {}", lifecycle.id());
    call_hook(instance, LifecycleHook::Destroyed);
}
