//! Constructor arguments
//!
//! [`Arg`] is the type-erased value handed to constructor resolution and
//! invocation. Arguments are always reference-typed at the point of matching:
//! any `'static` value is stored behind `Arc<dyn Any>`, and a null argument is
//! the absence of a value.

use std::any::{Any, TypeId};
use std::sync::Arc;

/// Type name reported for the null argument in diagnostics.
const NULL_TYPE_NAME: &str = "null";

/// A single type-erased constructor argument.
///
/// The runtime type name is captured at construction so resolution failures
/// can report what was actually supplied.
///
/// # Thread Safety
///
/// `Arg` is `Send + Sync`; the payload is shared and never mutated. Cloning an
/// argument shares the payload.
#[derive(Clone)]
pub struct Arg {
    value: Option<Arc<dyn Any + Send + Sync>>,
    type_name: &'static str,
}

impl Arg {
    /// Wrap a value as an argument.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Arg {
            value: Some(Arc::new(value)),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The null argument.
    pub fn null() -> Self {
        Arg {
            value: None,
            type_name: NULL_TYPE_NAME,
        }
    }

    /// Check if this is the null argument
    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }

    /// Runtime type of the value, if present
    pub fn type_id(&self) -> Option<TypeId> {
        self.value.as_ref().map(|value| (**value).type_id())
    }

    /// Runtime type name of the value (`"null"` for the null argument)
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Borrow the value as `T` if it has exactly that runtime type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.as_ref()?.downcast_ref::<T>()
    }

    /// Clone the value out as `T` if it has exactly that runtime type
    pub fn cloned<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }
}

impl std::fmt::Debug for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value {
            Some(_) => write!(f, "Arg({})", self.type_name),
            None => write!(f, "Arg(null)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arg_value() {
        let arg = Arg::new(42i32);
        assert!(!arg.is_null());
        assert_eq!(arg.type_id(), Some(TypeId::of::<i32>()));
        assert_eq!(arg.downcast_ref::<i32>(), Some(&42));
        assert_eq!(arg.downcast_ref::<i64>(), None);
        assert_eq!(arg.cloned::<i32>(), Some(42));
    }

    #[test]
    fn test_arg_null() {
        let arg = Arg::null();
        assert!(arg.is_null());
        assert_eq!(arg.type_id(), None);
        assert_eq!(arg.type_name(), "null");
        assert_eq!(arg.downcast_ref::<i32>(), None);
    }

    #[test]
    fn test_arg_type_name() {
        let arg = Arg::new("hello".to_string());
        assert_eq!(arg.type_name(), std::any::type_name::<String>());
    }

    #[test]
    fn test_arg_reports_concrete_type_not_the_erased_handle() {
        // The runtime type must be the wrapped value's, not Arc<dyn Any>'s.
        let arg = Arg::new(true);
        assert_eq!(arg.type_id(), Some(TypeId::of::<bool>()));
    }

    #[test]
    fn test_arg_clone_shares_payload() {
        let arg = Arg::new("shared".to_string());
        let copy = arg.clone();
        let a: &String = arg.downcast_ref().unwrap();
        let b: &String = copy.downcast_ref().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_arg_debug() {
        assert_eq!(format!("{:?}", Arg::new(1u8)), "Arg(u8)");
        assert_eq!(format!("{:?}", Arg::null()), "Arg(null)");
    }
}
