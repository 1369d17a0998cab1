//! Building component placeholder nodes from a resolved constructor.

use std::mem;
use std::rc::Rc;

use crate::binding::transform_model;
use crate::constructor::{BaseConstructor, Constructor};
use crate::hooks::install_component_hooks;
use crate::lifecycle::InstanceHandle;
use crate::node::{NodeComponentOptions, NodeData, PlaceholderNode, PropsData};
use crate::props::extract_props;
use crate::resolver::{resolve_constructor, AsyncFactory, ComponentRef, Resolution};

/// Prefix of every component placeholder tag.
pub const COMPONENT_TAG_PREFIX: &str = "compose-component";

/// Collaborators consulted while building a placeholder. Every method has a
/// default backed by this crate except the stateless render path.
pub trait BuildHost {
    fn resolve_async(
        &mut self,
        factory: &Rc<AsyncFactory>,
        base: &Rc<BaseConstructor>,
    ) -> Option<Rc<Constructor>> {
        factory.resolve(base)
    }

    fn create_async_placeholder(
        &mut self,
        factory: Rc<AsyncFactory>,
        data: NodeData,
        context: Option<&InstanceHandle>,
        children: Vec<Rc<PlaceholderNode>>,
        tag: Option<&str>,
    ) -> Rc<PlaceholderNode> {
        PlaceholderNode::async_placeholder(factory, data, context, children, tag)
    }

    fn extract_props(
        &mut self,
        data: &mut NodeData,
        ctor: &Constructor,
        tag: Option<&str>,
    ) -> PropsData {
        extract_props(data, ctor, tag)
    }

    /// Renders a functional component. Returning `None` renders nothing.
    fn create_functional_component(
        &mut self,
        ctor: &Rc<Constructor>,
        _props_data: PropsData,
        _data: NodeData,
        _context: Option<&InstanceHandle>,
        _children: Vec<Rc<PlaceholderNode>>,
    ) -> Option<Rc<PlaceholderNode>> {
        log::warn!(
            "functional component (cid {}) rendered without a functional renderer",
            ctor.cid()
        );
        None
    }
}

/// [`BuildHost`] using only the built-in collaborators.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultBuildHost;

impl BuildHost for DefaultBuildHost {}

/// Turns component references into placeholder nodes.
pub struct ComponentBuilder<'h, H: BuildHost + ?Sized = DefaultBuildHost> {
    base: Rc<BaseConstructor>,
    host: &'h mut H,
}

impl<'h, H: BuildHost + ?Sized> ComponentBuilder<'h, H> {
    pub fn new(base: Rc<BaseConstructor>, host: &'h mut H) -> Self {
        Self { base, host }
    }

    pub fn base(&self) -> &Rc<BaseConstructor> {
        &self.base
    }

    /// Builds the placeholder for one occurrence of `component`.
    ///
    /// Returns an async placeholder while an async factory is loading, the
    /// functional renderer's output for functional components, and `None`
    /// when the reference is not a component.
    pub fn build(
        &mut self,
        component: impl Into<ComponentRef>,
        data: Option<NodeData>,
        context: Option<&InstanceHandle>,
        children: Vec<Rc<PlaceholderNode>>,
        tag: Option<&str>,
    ) -> Option<Rc<PlaceholderNode>> {
        let component = component.into();
        let resolution = resolve_constructor(&component, &self.base, &mut *self.host);
        let (ctor, async_factory) = match resolution {
            Ok(Resolution::Ready {
                ctor,
                async_factory,
            }) => (ctor, async_factory),
            Ok(Resolution::Pending(factory)) => {
                return Some(self.host.create_async_placeholder(
                    factory,
                    data.unwrap_or_default(),
                    context,
                    children,
                    tag,
                ));
            }
            Err(err) => {
                log::warn!("{err}");
                return None;
            }
        };

        let mut data = data.unwrap_or_default();
        let options = ctor.resolve_options();

        if data.model.is_some() {
            transform_model(&options, &mut data);
        }

        let props_data = self.host.extract_props(&mut data, &ctor, tag);

        if options.functional {
            return self
                .host
                .create_functional_component(&ctor, props_data, data, context, children);
        }

        // Custom events go to the instance; native ones stay on the node for
        // the parent's patch of the rendered root element.
        let native = mem::take(&mut data.native_on);
        let listeners = mem::replace(&mut data.on, native);

        if options.is_abstract {
            let slot = data.slot.take();
            data = NodeData::default();
            data.slot = slot;
        }

        install_component_hooks(&mut data.hook);

        let name = options.name.as_deref().or(tag);
        let node_tag = match name {
            Some(name) => format!("{COMPONENT_TAG_PREFIX}-{}-{name}", ctor.cid()),
            None => format!("{COMPONENT_TAG_PREFIX}-{}", ctor.cid()),
        };
        Some(PlaceholderNode::component(
            node_tag,
            data,
            context,
            NodeComponentOptions {
                ctor: Rc::clone(&ctor),
                props_data,
                listeners,
                tag: tag.map(str::to_owned),
                children,
            },
            async_factory,
        ))
    }
}
