use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use compose_component::{
    ActivationQueue, BaseConstructor, ChildUpdate, ComponentBuilder, ComponentDefinition,
    ComponentInstance, ComponentOptions, ComponentRef, DefaultBuildHost, HookName, HostElement,
    InstanceHandle, InstanceOptions, Lifecycle, LifecycleHook, Listeners, NodeData, PatchContext,
    PlaceholderNode, PropValue, PropsData, RenderFn,
};

/// Routes `log` output through the test harness. Safe to call repeatedly.
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// What a [`RecordingInstance`] observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    Constructed,
    /// `mount` was called; `hydrating` tells whether a host element was
    /// handed over.
    Rendered { hydrating: bool },
    Updated,
    Hook(LifecycleHook),
    Released,
}

/// Shared, ordered record of lifecycle events across instances.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<(String, LifecycleEvent)>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, label: &str, event: LifecycleEvent) {
        self.events.borrow_mut().push((label.to_owned(), event));
    }

    pub fn events(&self) -> Vec<(String, LifecycleEvent)> {
        self.events.borrow().clone()
    }

    /// Events recorded by instances labelled `label`, in order.
    pub fn for_label(&self, label: &str) -> Vec<LifecycleEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|(owner, _)| owner == label)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn count(&self, label: &str, event: &LifecycleEvent) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|(owner, recorded)| owner == label && recorded == event)
            .count()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    /// Position to pass to [`Self::since`].
    pub fn mark(&self) -> usize {
        self.len()
    }

    pub fn since(&self, mark: usize) -> Vec<(String, LifecycleEvent)> {
        self.events.borrow()[mark..].to_vec()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

/// Component instance that records everything the lifecycle bridge does to
/// it and keeps its latest inputs for inspection.
pub struct RecordingInstance {
    lifecycle: Lifecycle,
    label: String,
    log: EventLog,
    props: RefCell<PropsData>,
    listeners: RefCell<Listeners>,
    children: RefCell<Vec<Rc<PlaceholderNode>>>,
    mount_target: RefCell<Option<HostElement>>,
    render: Option<RenderFn>,
    static_render_fns: usize,
    rendered: RefCell<Vec<Rc<PlaceholderNode>>>,
}

impl RecordingInstance {
    fn from_options(options: &InstanceOptions, label: String, log: EventLog) -> Self {
        let component = options.parent_vnode.component_options();
        Self {
            lifecycle: Lifecycle::new(options),
            label,
            log,
            props: RefCell::new(
                component
                    .map(|component| component.props_data.clone())
                    .unwrap_or_default(),
            ),
            listeners: RefCell::new(
                component
                    .map(|component| component.listeners.clone())
                    .unwrap_or_default(),
            ),
            children: RefCell::new(
                component
                    .map(|component| component.children.clone())
                    .unwrap_or_default(),
            ),
            mount_target: RefCell::new(None),
            render: options.render.clone(),
            static_render_fns: options.static_render_fns.len(),
            rendered: RefCell::new(Vec::new()),
        }
    }

    /// Root instance that no placeholder owns.
    pub fn root(label: &str, log: EventLog) -> Self {
        Self {
            lifecycle: Lifecycle::root(Some(label)),
            label: label.to_owned(),
            log,
            props: RefCell::new(PropsData::new()),
            listeners: RefCell::new(Listeners::new()),
            children: RefCell::new(Vec::new()),
            mount_target: RefCell::new(None),
            render: None,
            static_render_fns: 0,
            rendered: RefCell::new(Vec::new()),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn props(&self) -> PropsData {
        self.props.borrow().clone()
    }

    pub fn prop<T: Any + Clone>(&self, name: &str) -> Option<T> {
        self.props
            .borrow()
            .get(name)
            .and_then(PropValue::downcast_ref::<T>)
            .cloned()
    }

    pub fn listeners(&self) -> Listeners {
        self.listeners.borrow().clone()
    }

    /// Emits `event` to the parent's listeners. Returns whether anyone was
    /// listening.
    pub fn emit(&self, event: &str, args: &[PropValue]) -> bool {
        let listener = self.listeners.borrow().get(event).cloned();
        match listener {
            Some(listener) => {
                listener.emit(args);
                true
            }
            None => false,
        }
    }

    pub fn slot_children(&self) -> Vec<Rc<PlaceholderNode>> {
        self.children.borrow().clone()
    }

    pub fn mount_target(&self) -> Option<HostElement> {
        self.mount_target.borrow().clone()
    }

    pub fn has_render_override(&self) -> bool {
        self.render.is_some()
    }

    pub fn static_render_fn_count(&self) -> usize {
        self.static_render_fns
    }

    /// Output of the last render through the inline template, if any.
    pub fn rendered(&self) -> Vec<Rc<PlaceholderNode>> {
        self.rendered.borrow().clone()
    }
}

impl ComponentInstance for RecordingInstance {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn mount(&self, _cx: &mut PatchContext<'_>, target: Option<HostElement>) {
        let hydrating = target.is_some();
        *self.mount_target.borrow_mut() = target;
        if let Some(render) = &self.render {
            *self.rendered.borrow_mut() = render(self);
        }
        self.log
            .record(&self.label, LifecycleEvent::Rendered { hydrating });
    }

    fn update_child(&self, _cx: &mut PatchContext<'_>, update: ChildUpdate<'_>) {
        *self.props.borrow_mut() = update.props_data.clone();
        *self.listeners.borrow_mut() = update.listeners.clone();
        *self.children.borrow_mut() = update.children.to_vec();
        self.log.record(&self.label, LifecycleEvent::Updated);
    }

    fn on_lifecycle(&self, hook: LifecycleHook) {
        self.log.record(&self.label, LifecycleEvent::Hook(hook));
    }

    fn release(&self) {
        self.rendered.borrow_mut().clear();
        self.log.record(&self.label, LifecycleEvent::Released);
    }
}

/// Downcasts a live instance created through [`recording_component`].
pub fn as_recording(instance: &InstanceHandle) -> Option<&RecordingInstance> {
    instance.downcast_ref::<RecordingInstance>()
}

/// Component definition whose instances are [`RecordingInstance`]s logging
/// into `log`. Instances are labelled with the component name, or `anon`.
pub fn recording_component(options: ComponentOptions, log: &EventLog) -> Rc<ComponentDefinition> {
    let label = options.name.clone().unwrap_or_else(|| "anon".to_owned());
    let log = log.clone();
    ComponentDefinition::new(options, move |instance_options: InstanceOptions| {
        let instance =
            RecordingInstance::from_options(&instance_options, label.clone(), log.clone());
        instance.log.record(&instance.label, LifecycleEvent::Constructed);
        Rc::new(instance) as InstanceHandle
    })
}

/// Headless driver for placeholder lifecycles.
///
/// `PatchTestRule` plays the part of the patch walk: it builds placeholders
/// under a recording root instance, runs their hooks the way a renderer
/// would, and owns the activation queue flushed at the end of a pass.
pub struct PatchTestRule {
    base: Rc<BaseConstructor>,
    queue: ActivationQueue,
    root: InstanceHandle,
    log: EventLog,
    hydrating: bool,
}

impl PatchTestRule {
    /// Create a rule whose root instance has not been mounted yet, as during
    /// an initial render.
    pub fn new() -> Self {
        init_test_logging();
        let log = EventLog::new();
        let root: InstanceHandle = Rc::new(RecordingInstance::root("root", log.clone()));
        Self {
            base: BaseConstructor::new(),
            queue: ActivationQueue::new(),
            root,
            log,
            hydrating: false,
        }
    }

    /// Marks the root as mounted; later passes behave like re-renders.
    pub fn mount_root(&self) {
        self.root.lifecycle().mark_root_mounted();
    }

    pub fn base(&self) -> &Rc<BaseConstructor> {
        &self.base
    }

    pub fn root(&self) -> &InstanceHandle {
        &self.root
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn pending_activations(&self) -> usize {
        self.queue.len()
    }

    pub fn set_hydrating(&mut self, hydrating: bool) {
        self.hydrating = hydrating;
    }

    /// Recording component definition logging into this rule's log.
    pub fn component(&self, options: ComponentOptions) -> Rc<ComponentDefinition> {
        recording_component(options, &self.log)
    }

    /// Builds a placeholder rendered by the root instance.
    pub fn build(&self, component: impl Into<ComponentRef>, data: NodeData) -> Rc<PlaceholderNode> {
        self.try_build(component, data, None)
            .expect("component reference built no placeholder")
    }

    pub fn try_build(
        &self,
        component: impl Into<ComponentRef>,
        data: NodeData,
        tag: Option<&str>,
    ) -> Option<Rc<PlaceholderNode>> {
        let mut host = DefaultBuildHost;
        ComponentBuilder::new(Rc::clone(&self.base), &mut host).build(
            component,
            Some(data),
            Some(&self.root),
            Vec::new(),
            tag,
        )
    }

    /// Runs `f` inside a patch pass rendered by the root instance.
    pub fn with_context<R>(&mut self, f: impl FnOnce(&mut PatchContext<'_>) -> R) -> R {
        let root = Rc::clone(&self.root);
        let mut cx = PatchContext::new(&mut self.queue).with_hydration(self.hydrating);
        cx.with_active_instance(&root, f)
    }

    /// Runs `init` then `insert` for a fresh occurrence and returns the
    /// instance now attached to `node`.
    pub fn create(&mut self, node: &Rc<PlaceholderNode>) -> InstanceHandle {
        let root = Rc::clone(&self.root);
        self.create_under(&root, node)
    }

    /// Like [`Self::create`], with `parent` as the rendering instance.
    pub fn create_under(
        &mut self,
        parent: &InstanceHandle,
        node: &Rc<PlaceholderNode>,
    ) -> InstanceHandle {
        self.with_context(|cx| {
            cx.with_active_instance(parent, |cx| {
                node.invoke_hook(HookName::Init, cx, None);
                node.invoke_hook(HookName::Insert, cx, None);
            })
        });
        node.component_instance()
            .expect("init attached no component instance")
    }

    /// Runs `prepatch` for a re-rendered occurrence.
    pub fn patch(&mut self, old: &Rc<PlaceholderNode>, new: &Rc<PlaceholderNode>) {
        self.with_context(|cx| {
            new.invoke_hook(HookName::Prepatch, cx, Some(old));
        });
    }

    /// Runs `destroy` for a removed occurrence.
    pub fn remove(&mut self, node: &Rc<PlaceholderNode>) {
        self.with_context(|cx| {
            node.invoke_hook(HookName::Destroy, cx, None);
        });
    }

    /// Ends the pass: activates queued keep-alive instances.
    pub fn flush_activations(&mut self) -> usize {
        let flushed = self.queue.flush();
        if flushed > 0 {
            log::debug!("flushed {flushed} queued activations");
        }
        flushed
    }
}

impl Default for PatchTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for tests that only need temporary access to a
/// `PatchTestRule`.
pub fn run_patch_test<R>(f: impl FnOnce(&mut PatchTestRule) -> R) -> R {
    let mut rule = PatchTestRule::new();
    f(&mut rule)
}

#[cfg(test)]
#[path = "tests/testing_tests.rs"]
mod tests;
