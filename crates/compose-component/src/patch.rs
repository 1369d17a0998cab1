//! State the patch walk threads through hook invocations.

use std::mem;
use std::rc::Rc;

use crate::keep_alive::ActivationQueue;
use crate::lifecycle::InstanceHandle;

/// Per-pass context handed to every hook.
///
/// The render driver owns the activation queue and lends it for the
/// duration of a pass. The active instance is the one whose render is being
/// patched; new instances created by `init` are parented to it.
pub struct PatchContext<'a> {
    activation_queue: &'a mut ActivationQueue,
    active_instance: Option<InstanceHandle>,
    hydrating: bool,
}

impl<'a> PatchContext<'a> {
    pub fn new(activation_queue: &'a mut ActivationQueue) -> Self {
        Self {
            activation_queue,
            active_instance: None,
            hydrating: false,
        }
    }

    pub fn with_hydration(mut self, hydrating: bool) -> Self {
        self.hydrating = hydrating;
        self
    }

    pub fn is_hydrating(&self) -> bool {
        self.hydrating
    }

    pub fn active_instance(&self) -> Option<&InstanceHandle> {
        self.active_instance.as_ref()
    }

    /// Runs `f` with `instance` as the active rendering instance, restoring
    /// the previous one afterwards.
    pub fn with_active_instance<R>(
        &mut self,
        instance: &InstanceHandle,
        f: impl FnOnce(&mut PatchContext<'a>) -> R,
    ) -> R {
        let previous = mem::replace(&mut self.active_instance, Some(Rc::clone(instance)));
        let result = f(self);
        self.active_instance = previous;
        result
    }

    pub fn activation_queue(&mut self) -> &mut ActivationQueue {
        self.activation_queue
    }
}
