#![doc = r"Component placeholder lifecycle bridge for Compose-RS.

A render pass produces immutable [`PlaceholderNode`]s that say which
component goes where and with which inputs. The four hooks installed on
every placeholder (`init`, `prepatch`, `insert`, `destroy`) bind those nodes
to long-lived [`ComponentInstance`]s: creating and mounting them, pushing new
inputs into them, firing `mounted` once, and tearing them down or, under
keep-alive, suspending them for later reuse."]

pub mod binding;
pub mod builder;
pub mod collections;
mod component_hooks;
pub mod constructor;
pub mod hooks;
pub mod keep_alive;
pub mod lifecycle;
pub mod node;
pub mod patch;
pub mod props;
pub mod resolver;

pub use binding::transform_model;
pub use builder::{BuildHost, ComponentBuilder, DefaultBuildHost};
pub use constructor::{
    BaseConstructor, Cid, ComponentDefinition, ComponentOptions, Constructor, ModelOptions,
};
pub use hooks::{install_component_hooks, Hook, HookFn, HookName, HookSet};
pub use keep_alive::{
    activate_child_component, deactivate_child_component, is_in_inactive_tree, ActivationQueue,
    KeepAliveCache, KeepAliveConfig,
};
pub use lifecycle::{
    call_hook, create_component_instance_for_node, teardown, ChildUpdate, ComponentInstance,
    InstanceHandle, InstanceId, InstanceOptions, Lifecycle, LifecycleHook,
};
pub use node::{
    AsyncMeta, EventHandler, HostElement, InlineTemplate, Listener, Listeners, ModelDirective,
    NodeComponentOptions, NodeData, PlaceholderNode, PropValue, PropsData, RenderFn,
};
pub use patch::PatchContext;
pub use resolver::{AsyncFactory, AsyncResolver, AsyncState, ComponentRef, Resolution};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentError {
    /// The reference handed to the builder is not a component.
    InvalidDefinition { description: String },
    /// An async factory's loader gave up.
    AsyncRejected { reason: String },
}

impl std::fmt::Display for ComponentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComponentError::InvalidDefinition { description } => {
                write!(f, "invalid component definition: {description}")
            }
            ComponentError::AsyncRejected { reason } => {
                write!(f, "failed to resolve async component: {reason}")
            }
        }
    }
}

impl std::error::Error for ComponentError {}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/hooks_tests.rs"]
mod hooks_tests;

#[cfg(test)]
#[path = "tests/builder_tests.rs"]
mod builder_tests;

#[cfg(test)]
#[path = "tests/keep_alive_tests.rs"]
mod keep_alive_tests;
