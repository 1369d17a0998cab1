//! Map backends shared by the hook registry and the constructor cache.
//!
//! The `std-hash` feature swaps `hashbrown` for the standard library maps.

#[cfg(feature = "std-hash")]
pub mod map {
    pub use std::collections::{HashMap, HashSet};
}

#[cfg(not(feature = "std-hash"))]
pub mod map {
    pub use hashbrown::{HashMap, HashSet};
}

use std::rc::Rc;

use crate::constructor::{Cid, Constructor};
use crate::hooks::{Hook, HookName};

/// Storage behind a [`crate::HookSet`].
pub(crate) type HookMap = map::HashMap<HookName, Hook>;

/// Constructors produced from one definition, keyed by the cid of the base
/// that extended it.
pub(crate) type ConstructorCache = map::HashMap<Cid, Rc<Constructor>>;
