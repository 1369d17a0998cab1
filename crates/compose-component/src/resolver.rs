//! Normalizing component references into constructors, including the async
//! two-pass resolution.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::builder::BuildHost;
use crate::constructor::{BaseConstructor, ComponentDefinition, Constructor};
use crate::ComponentError;

/// What a render function hands over for a component occurrence.
#[derive(Clone)]
pub enum ComponentRef {
    Definition(Rc<ComponentDefinition>),
    Constructor(Rc<Constructor>),
    Async(Rc<AsyncFactory>),
    /// Anything else; resolves to [`ComponentError::InvalidDefinition`].
    Opaque(String),
}

impl fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentRef::Definition(definition) => {
                f.debug_tuple("Definition").field(definition).finish()
            }
            ComponentRef::Constructor(ctor) => {
                f.debug_tuple("Constructor").field(&ctor.cid()).finish()
            }
            ComponentRef::Async(_) => f.write_str("Async(..)"),
            ComponentRef::Opaque(description) => {
                f.debug_tuple("Opaque").field(description).finish()
            }
        }
    }
}

impl From<Rc<ComponentDefinition>> for ComponentRef {
    fn from(definition: Rc<ComponentDefinition>) -> Self {
        ComponentRef::Definition(definition)
    }
}

impl From<Rc<Constructor>> for ComponentRef {
    fn from(ctor: Rc<Constructor>) -> Self {
        ComponentRef::Constructor(ctor)
    }
}

impl From<Rc<AsyncFactory>> for ComponentRef {
    fn from(factory: Rc<AsyncFactory>) -> Self {
        ComponentRef::Async(factory)
    }
}

/// Outcome of resolving a [`ComponentRef`].
#[derive(Clone)]
pub enum Resolution {
    Ready {
        ctor: Rc<Constructor>,
        /// Set when the constructor came out of a now-settled async factory.
        async_factory: Option<Rc<AsyncFactory>>,
    },
    /// The async factory has not produced a constructor yet.
    Pending(Rc<AsyncFactory>),
}

pub fn resolve_constructor<H: BuildHost + ?Sized>(
    component: &ComponentRef,
    base: &Rc<BaseConstructor>,
    host: &mut H,
) -> Result<Resolution, ComponentError> {
    match component {
        ComponentRef::Definition(definition) => Ok(Resolution::Ready {
            ctor: base.extend(definition),
            async_factory: None,
        }),
        ComponentRef::Constructor(ctor) => Ok(Resolution::Ready {
            ctor: Rc::clone(ctor),
            async_factory: None,
        }),
        ComponentRef::Async(factory) => Ok(match host.resolve_async(factory, base) {
            Some(ctor) => Resolution::Ready {
                ctor,
                async_factory: Some(Rc::clone(factory)),
            },
            None => Resolution::Pending(Rc::clone(factory)),
        }),
        ComponentRef::Opaque(description) => Err(ComponentError::InvalidDefinition {
            description: description.clone(),
        }),
    }
}

#[derive(Clone, Debug)]
pub enum AsyncState {
    Unresolved,
    Resolved(Rc<Constructor>),
    Rejected(ComponentError),
}

type Loader = Box<dyn FnOnce(AsyncResolver)>;

/// Deferred component definition. The loader runs once, on first
/// resolution, and settles the factory through an [`AsyncResolver`].
pub struct AsyncFactory {
    loader: RefCell<Option<Loader>>,
    state: RefCell<AsyncState>,
    subscribers: RefCell<Vec<Box<dyn FnOnce()>>>,
}

impl AsyncFactory {
    pub fn new(loader: impl FnOnce(AsyncResolver) + 'static) -> Rc<Self> {
        Rc::new(Self {
            loader: RefCell::new(Some(Box::new(loader))),
            state: RefCell::new(AsyncState::Unresolved),
            subscribers: RefCell::new(Vec::new()),
        })
    }

    pub fn state(&self) -> AsyncState {
        self.state.borrow().clone()
    }

    pub fn is_settled(&self) -> bool {
        !matches!(*self.state.borrow(), AsyncState::Unresolved)
    }

    /// Registers a callback fired once when the factory settles, typically a
    /// forced re-render of the owner that rendered the async placeholder.
    pub fn subscribe(&self, on_settled: impl FnOnce() + 'static) {
        if self.is_settled() {
            on_settled();
            return;
        }
        self.subscribers.borrow_mut().push(Box::new(on_settled));
    }

    /// Returns the constructor if the factory has resolved. Starts the
    /// loader on the first call; a loader that settles synchronously is
    /// observed on the same call.
    pub fn resolve(self: &Rc<Self>, base: &Rc<BaseConstructor>) -> Option<Rc<Constructor>> {
        if let Some(ctor) = self.resolved() {
            return Some(ctor);
        }
        let loader = self.loader.borrow_mut().take();
        if let Some(loader) = loader {
            log::debug!("starting async component load");
            loader(AsyncResolver {
                factory: Rc::downgrade(self),
                base: Rc::clone(base),
            });
        }
        self.resolved()
    }

    fn resolved(&self) -> Option<Rc<Constructor>> {
        match &*self.state.borrow() {
            AsyncState::Resolved(ctor) => Some(Rc::clone(ctor)),
            _ => None,
        }
    }

    fn settle(&self, state: AsyncState) {
        {
            let mut current = self.state.borrow_mut();
            if !matches!(*current, AsyncState::Unresolved) {
                return;
            }
            *current = state;
        }
        let subscribers = std::mem::take(&mut *self.subscribers.borrow_mut());
        for subscriber in subscribers {
            subscriber();
        }
    }
}

impl fmt::Debug for AsyncFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncFactory")
            .field("state", &self.state.borrow())
            .field("loader_pending", &self.loader.borrow().is_some())
            .finish()
    }
}

/// Settles an [`AsyncFactory`]. Only the first settlement counts.
#[derive(Clone)]
pub struct AsyncResolver {
    factory: Weak<AsyncFactory>,
    base: Rc<BaseConstructor>,
}

impl AsyncResolver {
    pub fn resolve(&self, component: impl Into<ComponentRef>) {
        let Some(factory) = self.factory.upgrade() else {
            return;
        };
        let state = match component.into() {
            ComponentRef::Definition(definition) => {
                AsyncState::Resolved(self.base.extend(&definition))
            }
            ComponentRef::Constructor(ctor) => AsyncState::Resolved(ctor),
            other => {
                let error = ComponentError::InvalidDefinition {
                    description: format!("{other:?}"),
                };
                log::error!("async component resolved to an invalid value: {error}");
                AsyncState::Rejected(error)
            }
        };
        factory.settle(state);
    }

    pub fn reject(&self, reason: impl Into<String>) {
        let Some(factory) = self.factory.upgrade() else {
            return;
        };
        let error = ComponentError::AsyncRejected {
            reason: reason.into(),
        };
        log::error!("{error}");
        factory.settle(AsyncState::Rejected(error));
    }
}
