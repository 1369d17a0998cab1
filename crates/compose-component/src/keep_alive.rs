//! Keep-alive: suspending instances on removal and resuming them later.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::lifecycle::{call_hook, teardown, InstanceHandle, LifecycleHook};
use crate::node::PlaceholderNode;

/// Keep-alive instances waiting to be activated once the current patch pass
/// has finished. Owned by the render driver.
#[derive(Default)]
pub struct ActivationQueue {
    queue: Vec<InstanceHandle>,
}

impl ActivationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, instance: InstanceHandle) {
        // Children inserted later in the pass must not see this instance as
        // an inactive ancestor.
        instance.lifecycle().set_inactive(false);
        self.queue.push(instance);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Takes every queued instance, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InstanceHandle> {
        std::mem::take(&mut self.queue)
    }

    /// Activates every queued instance in enqueue order. Returns how many
    /// were processed.
    pub fn flush(&mut self) -> usize {
        let queued = self.drain();
        for instance in &queued {
            instance.lifecycle().set_inactive(true);
            activate_child_component(instance, true);
        }
        queued.len()
    }
}

/// Whether any ancestor of `instance` is currently inactive.
pub fn is_in_inactive_tree(instance: &InstanceHandle) -> bool {
    let mut current = instance.lifecycle().parent();
    while let Some(ancestor) = current {
        if ancestor.lifecycle().inactive() == Some(true) {
            return true;
        }
        current = ancestor.lifecycle().parent();
    }
    false
}

/// Resumes `instance` and its descendants. `direct` marks the instance that
/// the keep-alive boundary itself is activating.
pub fn activate_child_component(instance: &InstanceHandle, direct: bool) {
    let lifecycle = instance.lifecycle();
    if direct {
        lifecycle.set_direct_inactive(false);
        if is_in_inactive_tree(instance) {
            return;
        }
    } else if lifecycle.is_direct_inactive() {
        return;
    }
    if lifecycle.inactive() != Some(false) {
        lifecycle.set_inactive(false);
        for child in lifecycle.children() {
            activate_child_component(&child, false);
        }
        log::debug!("activated instance {}", lifecycle.id());
        call_hook(instance, LifecycleHook::Activated);
    }
}

/// Suspends `instance` and its descendants without destroying them.
pub fn deactivate_child_component(instance: &InstanceHandle, direct: bool) {
    let lifecycle = instance.lifecycle();
    if direct {
        lifecycle.set_direct_inactive(true);
        if is_in_inactive_tree(instance) {
            return;
        }
    }
    if lifecycle.inactive() != Some(true) {
        lifecycle.set_inactive(true);
        for child in lifecycle.children() {
            deactivate_child_component(&child, false);
        }
        log::debug!("deactivated instance {}", lifecycle.id());
        call_hook(instance, LifecycleHook::Deactivated);
    }
}

/// Which components a [`KeepAliveCache`] retains.
#[derive(Clone, Debug, Default)]
pub struct KeepAliveConfig {
    /// Only these component names are cached, when set.
    pub include: Option<Vec<String>>,
    /// These component names are never cached.
    pub exclude: Option<Vec<String>>,
    /// Upper bound on cached entries; the least recently used is evicted.
    pub max: Option<usize>,
}

impl KeepAliveConfig {
    fn admits(&self, name: Option<&str>) -> bool {
        if let Some(include) = &self.include {
            match name {
                Some(name) if include.iter().any(|entry| entry == name) => {}
                _ => return false,
            }
        }
        if let (Some(exclude), Some(name)) = (&self.exclude, name) {
            if exclude.iter().any(|entry| entry == name) {
                return false;
            }
        }
        true
    }
}

/// Cache of placeholders whose instances survive removal, keyed by node key
/// or by `{cid}::{tag}`. Iteration order is least recently used first.
#[derive(Default)]
pub struct KeepAliveCache {
    config: KeepAliveConfig,
    entries: IndexMap<String, Rc<PlaceholderNode>>,
    current: Option<Rc<PlaceholderNode>>,
}

impl KeepAliveCache {
    pub fn new(config: KeepAliveConfig) -> Self {
        Self {
            config,
            entries: IndexMap::new(),
            current: None,
        }
    }

    pub fn config(&self) -> &KeepAliveConfig {
        &self.config
    }

    /// Replaces the filters, pruning entries the new filters no longer admit.
    pub fn set_config(&mut self, config: KeepAliveConfig) {
        self.config = config;
        let config = self.config.clone();
        self.prune_where(|name| !config.admits(name));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Routes the boundary's rendered child through the cache. A cached
    /// instance is attached to `node`, and admitted nodes are flagged
    /// keep-alive. Returns `node` for chaining.
    pub fn render(&mut self, node: Rc<PlaceholderNode>) -> Rc<PlaceholderNode> {
        let Some(component) = node.component_options() else {
            return node;
        };
        self.current = Some(Rc::clone(&node));
        let name = component_name(&node);
        if !self.config.admits(name.as_deref()) {
            return node;
        }
        let key = match node.key() {
            Some(key) => key.to_owned(),
            None => match &component.tag {
                Some(tag) => format!("{}::{tag}", component.ctor.cid()),
                None => component.ctor.cid().to_string(),
            },
        };
        if let Some(cached) = self.entries.shift_remove(&key) {
            if let Some(instance) = cached.component_instance() {
                node.set_component_instance(instance);
            }
            self.entries.insert(key, cached);
        } else {
            self.entries.insert(key, Rc::clone(&node));
            if let Some(max) = self.config.max {
                if self.entries.len() > max {
                    if let Some(oldest) = self.entries.keys().next().cloned() {
                        let current = self.current.clone();
                        self.prune_entry(&oldest, current.as_ref());
                    }
                }
            }
        }
        node.data().set_keep_alive(true);
        node
    }

    /// Drops and tears down every entry whose component name matches
    /// `evict`. An entry holding the instance of the occurrence rendered last
    /// is dropped but kept alive.
    pub fn prune_where(&mut self, evict: impl Fn(Option<&str>) -> bool) {
        let doomed: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, node)| {
                let name = component_name(node);
                name.is_some() && evict(name.as_deref())
            })
            .map(|(key, _)| key.clone())
            .collect();
        let current = self.current.clone();
        for key in doomed {
            self.prune_entry(&key, current.as_ref());
        }
    }

    /// Tears down every cached instance. Used when the boundary itself is
    /// destroyed.
    pub fn clear(&mut self) {
        let keys: Vec<String> = self.entries.keys().cloned().collect();
        for key in keys {
            self.prune_entry(&key, None);
        }
        self.current = None;
    }

    fn prune_entry(&mut self, key: &str, current: Option<&Rc<PlaceholderNode>>) {
        let Some(cached) = self.entries.shift_remove(key) else {
            return;
        };
        let Some(instance) = cached.component_instance() else {
            return;
        };
        let on_screen = current
            .and_then(|node| node.component_instance())
            .is_some_and(|shown| Rc::ptr_eq(&shown, &instance));
        if on_screen {
            return;
        }
        log::debug!("evicting keep-alive entry {key}");
        teardown(&instance);
    }
}

fn component_name(node: &PlaceholderNode) -> Option<String> {
    let component = node.component_options()?;
    component
        .ctor
        .options()
        .name
        .clone()
        .or_else(|| component.tag.clone())
}
