//! Hook registry: the four component hooks and how they merge with user hooks.

use std::fmt;
use std::rc::Rc;

use crate::collections::HookMap;
use crate::component_hooks;
use crate::node::PlaceholderNode;
use crate::patch::PatchContext;

/// Points in the patch walk at which a placeholder's hooks run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookName {
    /// First time a placeholder is processed without a prior counterpart.
    Init,
    /// An old and a new placeholder of the same identity were matched.
    Prepatch,
    /// The node's subtree has been attached to the host tree.
    Insert,
    /// The node was removed from the tree.
    Destroy,
}

impl HookName {
    /// The hooks every component placeholder carries.
    pub const COMPONENT: [HookName; 4] = [
        HookName::Init,
        HookName::Prepatch,
        HookName::Insert,
        HookName::Destroy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HookName::Init => "init",
            HookName::Prepatch => "prepatch",
            HookName::Insert => "insert",
            HookName::Destroy => "destroy",
        }
    }
}

impl fmt::Display for HookName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-supplied hook callback. `old` is only set for `prepatch`.
pub type HookFn =
    Rc<dyn Fn(&mut PatchContext<'_>, Option<&Rc<PlaceholderNode>>, &Rc<PlaceholderNode>)>;

/// One occupant of a hook slot.
#[derive(Clone)]
pub enum Hook {
    /// The built-in component hook for the slot.
    Component(HookName),
    User(HookFn),
    /// Built-in hook followed by a user hook.
    Merged(HookName, HookFn),
}

impl Hook {
    pub fn user(
        hook: impl Fn(&mut PatchContext<'_>, Option<&Rc<PlaceholderNode>>, &Rc<PlaceholderNode>)
            + 'static,
    ) -> Self {
        Hook::User(Rc::new(hook))
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, Hook::Merged(..))
    }

    pub fn invoke(
        &self,
        cx: &mut PatchContext<'_>,
        old: Option<&Rc<PlaceholderNode>>,
        node: &Rc<PlaceholderNode>,
    ) {
        match self {
            Hook::Component(name) => component_hooks::run(*name, cx, old, node),
            Hook::User(hook) => hook(cx, old, node),
            Hook::Merged(name, hook) => {
                component_hooks::run(*name, cx, old, node);
                hook(cx, old, node);
            }
        }
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hook::Component(name) => write!(f, "Component({name})"),
            Hook::User(_) => f.write_str("User(..)"),
            Hook::Merged(name, _) => write!(f, "Merged({name}, ..)"),
        }
    }
}

/// Hook name to hook; at most one entry per name.
#[derive(Clone, Default)]
pub struct HookSet {
    hooks: HookMap,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: HookName) -> Option<&Hook> {
        self.hooks.get(&name)
    }

    pub fn insert(&mut self, name: HookName, hook: Hook) -> Option<Hook> {
        self.hooks.insert(name, hook)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for name in HookName::COMPONENT {
            if let Some(hook) = self.hooks.get(&name) {
                map.entry(&name, hook);
            }
        }
        map.finish()
    }
}

/// Installs the component hooks into `hooks`. Installing onto a set that was
/// already installed leaves it unchanged.
pub fn install_component_hooks(hooks: &mut HookSet) {
    for name in HookName::COMPONENT {
        let installed = match hooks.hooks.remove(&name) {
            None => Hook::Component(name),
            Some(Hook::User(user)) => Hook::Merged(name, user),
            Some(existing) => existing,
        };
        hooks.hooks.insert(name, installed);
    }
}
