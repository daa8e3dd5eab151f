//! Concurrent keyed instance registry with lazy construction.
//!
//! This crate provides [`InstanceRegistry`], a thread-safe store of
//! singleton-like instances keyed by an (outer key, slot id) pair. Instances
//! are constructed on first request from a [`TypeSpec`], a descriptor of the
//! instance type listing its declared constructors, and cached until
//! explicitly unregistered.
//!
//! Construction is descriptor-driven: each request carries an ordered list of
//! type-erased [`Arg`] values, and the registry selects the first declared
//! constructor whose parameter shape accepts them. Callers never pre-register
//! per-key factories; one descriptor serves the whole registry.
//!
//! # Example
//!
//! ```
//! use instance_registry::{Arg, ConstructorSpec, InstanceRegistry, ParamType, TypeSpec};
//!
//! struct Session {
//!     user: String,
//!     channel: i32,
//! }
//!
//! let spec = TypeSpec::new("Session")
//!     .with_constructor(ConstructorSpec::new(
//!         vec![ParamType::of::<String>(), ParamType::I32],
//!         |args| {
//!             let user: String = args[0].cloned().ok_or("user must be a string")?;
//!             let channel: i32 = args[1].cloned().ok_or("channel must be an i32")?;
//!             Ok(Session { user, channel })
//!         },
//!     ));
//!
//! let registry: InstanceRegistry<u64, Session> = InstanceRegistry::new(spec);
//!
//! let session = registry
//!     .get_or_create(7, 0, &[Arg::new("alice".to_string()), Arg::new(9i32)])
//!     .unwrap();
//! assert_eq!(session.user, "alice");
//!
//! // Subsequent requests for the same (key, slot) return the cached instance.
//! assert!(registry.exists(&7, 0));
//! ```
//!
//! # Thread Safety
//!
//! All registry operations take `&self` and may be called from any number of
//! threads. Construction for a given (key, slot) pair happens at most once;
//! concurrent requesters converge on the single stored instance.

mod error;
mod registry;
mod typeinfo;
mod value;

pub use error::{RegistryError, RegistryResult};
pub use registry::{is_valid_slot, InstanceRegistry};
pub use typeinfo::{
    create_instance, find_matching_constructor, primitive_to_boxed, BoxedType, ConstructorResult,
    ConstructorSpec, ParamType, PrimitiveKind, TypeSpec, Visibility, Void,
};
pub use value::Arg;
