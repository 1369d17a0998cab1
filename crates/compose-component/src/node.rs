//! Placeholder nodes and the data bags they carry.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::constructor::Constructor;
use crate::hooks::{HookName, HookSet};
use crate::lifecycle::{ComponentInstance, InstanceHandle};
use crate::patch::PatchContext;
use crate::resolver::AsyncFactory;

/// Opaque handle to a host-tree element, only forwarded for hydration.
pub type HostElement = Rc<dyn Any>;

/// Compiled render function carried by an inline template.
pub type RenderFn = Rc<dyn Fn(&dyn ComponentInstance) -> Vec<Rc<PlaceholderNode>>>;

/// Declared inputs extracted for one occurrence, in declaration order.
pub type PropsData = IndexMap<String, PropValue>;

/// Event name to listener.
pub type Listeners = IndexMap<String, Listener>;

/// Type-erased input value. Cloning shares the underlying value.
#[derive(Clone)]
pub struct PropValue(Rc<dyn Any>);

impl PropValue {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns whether both values share the same allocation.
    pub fn ptr_eq(&self, other: &PropValue) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PropValue(..)")
    }
}

/// Event callback. Equality is identity, matching how listeners are
/// deduplicated.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&[PropValue])>);

impl EventHandler {
    pub fn new(handler: impl Fn(&[PropValue]) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub fn call(&self, args: &[PropValue]) {
        (self.0)(args)
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl Eq for EventHandler {}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventHandler({:p})", Rc::as_ptr(&self.0) as *const ())
    }
}

/// One listener slot: a single handler or an ordered list of handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Listener {
    Single(EventHandler),
    Multiple(Vec<EventHandler>),
}

impl Listener {
    pub fn contains(&self, handler: &EventHandler) -> bool {
        match self {
            Listener::Single(existing) => existing == handler,
            Listener::Multiple(existing) => existing.contains(handler),
        }
    }

    /// Invokes every handler in order.
    pub fn emit(&self, args: &[PropValue]) {
        match self {
            Listener::Single(handler) => handler.call(args),
            Listener::Multiple(handlers) => {
                for handler in handlers {
                    handler.call(args);
                }
            }
        }
    }

    pub fn handlers(&self) -> &[EventHandler] {
        match self {
            Listener::Single(handler) => std::slice::from_ref(handler),
            Listener::Multiple(handlers) => handlers,
        }
    }
}

impl From<EventHandler> for Listener {
    fn from(handler: EventHandler) -> Self {
        Listener::Single(handler)
    }
}

/// Two-way binding descriptor written by the template compiler.
#[derive(Clone, Debug)]
pub struct ModelDirective {
    pub value: PropValue,
    pub callback: EventHandler,
}

#[derive(Clone)]
pub struct InlineTemplate {
    pub render: RenderFn,
    pub static_render_fns: Vec<RenderFn>,
}

impl fmt::Debug for InlineTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InlineTemplate")
            .field("static_render_fns", &self.static_render_fns.len())
            .finish_non_exhaustive()
    }
}

/// Mutable input bag for one component occurrence.
#[derive(Clone, Debug, Default)]
pub struct NodeData {
    pub key: Option<String>,
    pub props: PropsData,
    pub attrs: PropsData,
    pub on: Listeners,
    pub native_on: Listeners,
    pub hook: HookSet,
    pub model: Option<ModelDirective>,
    pub slot: Option<String>,
    pub inline_template: Option<InlineTemplate>,
    keep_alive: Cell<bool>,
}

impl NodeData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_keep_alive(&self) -> bool {
        self.keep_alive.get()
    }

    /// Flags the occurrence as owned by a keep-alive boundary. The owner sets
    /// this after the node has been built.
    pub fn set_keep_alive(&self, keep_alive: bool) {
        self.keep_alive.set(keep_alive);
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: PropValue) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    pub fn with_prop(mut self, name: impl Into<String>, value: PropValue) -> Self {
        self.props.insert(name.into(), value);
        self
    }

    pub fn with_listener(
        mut self,
        event: impl Into<String>,
        listener: impl Into<Listener>,
    ) -> Self {
        self.on.insert(event.into(), listener.into());
        self
    }

    pub fn with_native_listener(
        mut self,
        event: impl Into<String>,
        listener: impl Into<Listener>,
    ) -> Self {
        self.native_on.insert(event.into(), listener.into());
        self
    }

    pub fn with_model(mut self, value: PropValue, callback: EventHandler) -> Self {
        self.model = Some(ModelDirective { value, callback });
        self
    }

    pub fn with_slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }
}

/// Component-specific payload of a real placeholder.
#[derive(Clone)]
pub struct NodeComponentOptions {
    pub ctor: Rc<Constructor>,
    pub props_data: PropsData,
    pub listeners: Listeners,
    pub tag: Option<String>,
    pub children: Vec<Rc<PlaceholderNode>>,
}

impl fmt::Debug for NodeComponentOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeComponentOptions")
            .field("cid", &self.ctor.cid())
            .field("props_data", &self.props_data)
            .field("listeners", &self.listeners)
            .field("tag", &self.tag)
            .field("children", &self.children.len())
            .finish()
    }
}

/// Everything needed to rebuild the real node once an async factory settles.
#[derive(Clone)]
pub struct AsyncMeta {
    pub data: NodeData,
    pub context: Option<Weak<dyn ComponentInstance>>,
    pub children: Vec<Rc<PlaceholderNode>>,
    pub tag: Option<String>,
}

/// Immutable description of one component occurrence.
pub struct PlaceholderNode {
    tag: String,
    key: Option<String>,
    data: NodeData,
    context: Option<Weak<dyn ComponentInstance>>,
    component_options: Option<NodeComponentOptions>,
    component_instance: RefCell<Option<InstanceHandle>>,
    async_factory: Option<Rc<AsyncFactory>>,
    async_meta: Option<AsyncMeta>,
    elm: RefCell<Option<HostElement>>,
}

impl PlaceholderNode {
    pub(crate) fn component(
        tag: String,
        data: NodeData,
        context: Option<&InstanceHandle>,
        component_options: NodeComponentOptions,
        async_factory: Option<Rc<AsyncFactory>>,
    ) -> Rc<Self> {
        Rc::new(Self {
            tag,
            key: data.key.clone(),
            data,
            context: context.map(Rc::downgrade),
            component_options: Some(component_options),
            component_instance: RefCell::new(None),
            async_factory,
            async_meta: None,
            elm: RefCell::new(None),
        })
    }

    /// Empty stand-in rendered while `factory` is still loading.
    pub fn async_placeholder(
        factory: Rc<AsyncFactory>,
        data: NodeData,
        context: Option<&InstanceHandle>,
        children: Vec<Rc<PlaceholderNode>>,
        tag: Option<&str>,
    ) -> Rc<Self> {
        let context = context.map(Rc::downgrade);
        Rc::new(Self {
            tag: String::new(),
            key: None,
            data: NodeData::default(),
            context: context.clone(),
            component_options: None,
            component_instance: RefCell::new(None),
            async_factory: Some(factory),
            async_meta: Some(AsyncMeta {
                data,
                context,
                children,
                tag: tag.map(str::to_owned),
            }),
            elm: RefCell::new(None),
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    /// The instance whose render produced this node.
    pub fn context(&self) -> Option<InstanceHandle> {
        self.context.as_ref().and_then(Weak::upgrade)
    }

    pub fn component_options(&self) -> Option<&NodeComponentOptions> {
        self.component_options.as_ref()
    }

    pub fn component_instance(&self) -> Option<InstanceHandle> {
        self.component_instance.borrow().clone()
    }

    pub fn set_component_instance(&self, instance: InstanceHandle) {
        *self.component_instance.borrow_mut() = Some(instance);
    }

    pub fn async_factory(&self) -> Option<&Rc<AsyncFactory>> {
        self.async_factory.as_ref()
    }

    pub fn async_meta(&self) -> Option<&AsyncMeta> {
        self.async_meta.as_ref()
    }

    pub fn is_async_placeholder(&self) -> bool {
        self.component_options.is_none() && self.async_factory.is_some()
    }

    pub fn elm(&self) -> Option<HostElement> {
        self.elm.borrow().clone()
    }

    pub fn set_elm(&self, elm: Option<HostElement>) {
        *self.elm.borrow_mut() = elm;
    }

    /// Runs the hook registered under `name`, if any. Returns whether a hook
    /// was present.
    pub fn invoke_hook(
        self: &Rc<Self>,
        name: HookName,
        cx: &mut PatchContext<'_>,
        old: Option<&Rc<PlaceholderNode>>,
    ) -> bool {
        match self.data.hook.get(name) {
            Some(hook) => {
                let hook = hook.clone();
                hook.invoke(cx, old, self);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for PlaceholderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceholderNode")
            .field("tag", &self.tag)
            .field("key", &self.key)
            .field("component_options", &self.component_options)
            .field("has_instance", &self.component_instance.borrow().is_some())
            .field("is_async_placeholder", &self.is_async_placeholder())
            .finish()
    }
}
