use super::*;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

pub(crate) fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// Instance that only records what happens to it as `{label}:{event}`.
pub(crate) struct Recorder {
    lifecycle: Lifecycle,
    label: String,
    log: Log,
}

impl Recorder {
    fn record(&self, event: &str) {
        self.log.borrow_mut().push(format!("{}:{event}", self.label));
    }
}

impl ComponentInstance for Recorder {
    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn mount(&self, _cx: &mut PatchContext<'_>, _target: Option<HostElement>) {
        self.record("mount");
    }

    fn update_child(&self, _cx: &mut PatchContext<'_>, _update: ChildUpdate<'_>) {
        self.record("update");
    }

    fn on_lifecycle(&self, hook: LifecycleHook) {
        self.record(hook.as_str());
    }

    fn release(&self) {
        self.record("release");
    }
}

pub(crate) fn recording_definition(
    options: ComponentOptions,
    log: &Log,
) -> Rc<ComponentDefinition> {
    let label = options.name.clone().unwrap_or_else(|| "anon".to_owned());
    let log = Rc::clone(log);
    ComponentDefinition::new(options, move |instance_options: InstanceOptions| {
        let recorder = Recorder {
            lifecycle: Lifecycle::new(&instance_options),
            label: label.clone(),
            log: Rc::clone(&log),
        };
        recorder.record("construct");
        Rc::new(recorder) as InstanceHandle
    })
}

pub(crate) fn root(label: &str, log: &Log, mounted: bool) -> InstanceHandle {
    let recorder = Recorder {
        lifecycle: Lifecycle::root(Some(label)),
        label: label.to_owned(),
        log: Rc::clone(log),
    };
    if mounted {
        recorder.lifecycle.mark_root_mounted();
    }
    Rc::new(recorder)
}

pub(crate) fn build(
    base: &Rc<BaseConstructor>,
    component: impl Into<ComponentRef>,
    data: NodeData,
    context: Option<&InstanceHandle>,
) -> Rc<PlaceholderNode> {
    let mut host = DefaultBuildHost;
    ComponentBuilder::new(Rc::clone(base), &mut host)
        .build(component, Some(data), context, Vec::new(), None)
        .expect("placeholder built")
}

/// Creates and inserts `node` the way the patch walk does for a fresh
/// occurrence.
pub(crate) fn mount(cx: &mut PatchContext<'_>, node: &Rc<PlaceholderNode>) {
    node.invoke_hook(HookName::Init, cx, None);
    node.invoke_hook(HookName::Insert, cx, None);
}
