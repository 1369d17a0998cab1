//! Two-way binding sugar: `model` becomes an input plus a listener.

use crate::constructor::ComponentOptions;
use crate::node::{Listener, NodeData};

pub const DEFAULT_MODEL_PROP: &str = "value";
pub const DEFAULT_MODEL_EVENT: &str = "input";

/// Rewrites `data.model` into `attrs[prop]` and `on[event]`, so input
/// extraction and listener splitting see an ordinary input and listener.
/// The callback goes in front of any existing listeners and is never added
/// twice.
pub fn transform_model(options: &ComponentOptions, data: &mut NodeData) {
    let Some(model) = data.model.clone() else {
        return;
    };
    let binding = options.model.as_ref();
    let prop = binding
        .and_then(|model| model.prop.as_deref())
        .unwrap_or(DEFAULT_MODEL_PROP);
    let event = binding
        .and_then(|model| model.event.as_deref())
        .unwrap_or(DEFAULT_MODEL_EVENT);

    data.attrs.insert(prop.to_owned(), model.value);

    let callback = model.callback;
    match data.on.get_mut(event) {
        None => {
            data.on.insert(event.to_owned(), Listener::Single(callback));
        }
        Some(existing) if existing.contains(&callback) => {}
        Some(existing) => {
            let mut handlers = Vec::with_capacity(existing.handlers().len() + 1);
            handlers.push(callback);
            handlers.extend_from_slice(existing.handlers());
            *existing = Listener::Multiple(handlers);
        }
    }
}
