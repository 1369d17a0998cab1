//! Component constructors and the base they are extended from.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::collections::ConstructorCache;
use crate::lifecycle::{InstanceHandle, InstanceOptions};

/// Per-constructor identity tag.
pub type Cid = usize;

static NEXT_CID: AtomicUsize = AtomicUsize::new(1);

fn next_cid() -> Cid {
    NEXT_CID.fetch_add(1, Ordering::Relaxed)
}

/// Names of the input and event a two-way binding maps onto.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelOptions {
    pub prop: Option<String>,
    pub event: Option<String>,
}

/// Constructor-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComponentOptions {
    pub name: Option<String>,
    /// Declared input names.
    pub props: Vec<String>,
    pub model: Option<ModelOptions>,
    /// Renders nothing of its own; keep-alive style wrappers.
    pub is_abstract: bool,
    /// Stateless; rendered through the functional path instead of an instance.
    pub functional: bool,
}

impl ComponentOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_props<I, S>(mut self, props: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.props.extend(props.into_iter().map(Into::into));
        self
    }

    pub fn with_model(mut self, prop: Option<&str>, event: Option<&str>) -> Self {
        self.model = Some(ModelOptions {
            prop: prop.map(str::to_owned),
            event: event.map(str::to_owned),
        });
        self
    }

    pub fn abstract_component(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn functional(mut self) -> Self {
        self.functional = true;
        self
    }

    /// Layers `child` over `self`: props are concatenated without duplicates,
    /// scalar options prefer the child, flags are or-ed.
    pub fn merge(&self, child: &ComponentOptions) -> ComponentOptions {
        let mut props = self.props.clone();
        for prop in &child.props {
            if !props.contains(prop) {
                props.push(prop.clone());
            }
        }
        ComponentOptions {
            name: child.name.clone().or_else(|| self.name.clone()),
            props,
            model: child.model.clone().or_else(|| self.model.clone()),
            is_abstract: self.is_abstract || child.is_abstract,
            functional: self.functional || child.functional,
        }
    }
}

/// Builds the live instance from the options record assembled at `init`.
pub type InstanceFactory = Rc<dyn Fn(InstanceOptions) -> InstanceHandle>;

/// Plain component definition, compiled into a [`Constructor`] on first use.
pub struct ComponentDefinition {
    options: ComponentOptions,
    factory: InstanceFactory,
    extended: RefCell<ConstructorCache>,
}

impl ComponentDefinition {
    pub fn new(
        options: ComponentOptions,
        factory: impl Fn(InstanceOptions) -> InstanceHandle + 'static,
    ) -> Rc<Self> {
        Rc::new(Self {
            options,
            factory: Rc::new(factory),
            extended: RefCell::new(ConstructorCache::default()),
        })
    }

    pub fn options(&self) -> &ComponentOptions {
        &self.options
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Root of the constructor hierarchy. Holds the global options every
/// extended constructor inherits.
pub struct BaseConstructor {
    cid: Cid,
    options: RefCell<Rc<ComponentOptions>>,
}

impl BaseConstructor {
    pub fn new() -> Rc<Self> {
        Self::with_options(ComponentOptions::default())
    }

    pub fn with_options(options: ComponentOptions) -> Rc<Self> {
        Rc::new(Self {
            cid: next_cid(),
            options: RefCell::new(Rc::new(options)),
        })
    }

    pub fn cid(&self) -> Cid {
        self.cid
    }

    pub fn options(&self) -> Rc<ComponentOptions> {
        self.options.borrow().clone()
    }

    /// Registers a global mixin. Constructors created earlier pick it up the
    /// next time their options are resolved.
    pub fn mixin(&self, mixin: &ComponentOptions) {
        let merged = self.options.borrow().merge(mixin);
        *self.options.borrow_mut() = Rc::new(merged);
    }

    /// Compiles `definition` into a constructor. Repeated calls return the
    /// same constructor.
    pub fn extend(self: &Rc<Self>, definition: &ComponentDefinition) -> Rc<Constructor> {
        if let Some(cached) = definition.extended.borrow().get(&self.cid) {
            return Rc::clone(cached);
        }
        let super_options = self.options();
        let ctor = Rc::new(Constructor {
            cid: next_cid(),
            base: Rc::clone(self),
            options: RefCell::new(Rc::new(super_options.merge(&definition.options))),
            super_options: RefCell::new(super_options),
            extend_options: definition.options.clone(),
            factory: Rc::clone(&definition.factory),
        });
        log::debug!(
            "extended component {} as cid {}",
            definition.options.name.as_deref().unwrap_or("<anonymous>"),
            ctor.cid
        );
        definition
            .extended
            .borrow_mut()
            .insert(self.cid, Rc::clone(&ctor));
        ctor
    }
}

impl fmt::Debug for BaseConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseConstructor")
            .field("cid", &self.cid)
            .field("options", &self.options.borrow())
            .finish()
    }
}

/// Compiled component, identified by its cid.
pub struct Constructor {
    cid: Cid,
    base: Rc<BaseConstructor>,
    options: RefCell<Rc<ComponentOptions>>,
    super_options: RefCell<Rc<ComponentOptions>>,
    extend_options: ComponentOptions,
    factory: InstanceFactory,
}

impl Constructor {
    pub fn cid(&self) -> Cid {
        self.cid
    }

    pub fn base(&self) -> &Rc<BaseConstructor> {
        &self.base
    }

    /// Options as of the last resolution. Prefer [`Self::resolve_options`]
    /// right before use.
    pub fn options(&self) -> Rc<ComponentOptions> {
        self.options.borrow().clone()
    }

    /// Re-merges the options if the base's global options changed since the
    /// constructor was created or last resolved.
    pub fn resolve_options(&self) -> Rc<ComponentOptions> {
        let current = self.base.options();
        if !Rc::ptr_eq(&current, &self.super_options.borrow()) {
            let merged = Rc::new(current.merge(&self.extend_options));
            *self.super_options.borrow_mut() = current;
            *self.options.borrow_mut() = Rc::clone(&merged);
            return merged;
        }
        self.options()
    }

    pub(crate) fn instantiate(&self, options: InstanceOptions) -> InstanceHandle {
        (self.factory)(options)
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("cid", &self.cid)
            .field("options", &self.options.borrow())
            .finish_non_exhaustive()
    }
}
