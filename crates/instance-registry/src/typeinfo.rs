//! Type descriptors and constructor resolution
//!
//! A [`TypeSpec`] describes the one instance type a registry manages: a
//! display name plus the declared constructors in declaration order. Each
//! [`ConstructorSpec`] declares its parameter types and carries the factory
//! that builds the instance from an argument list.
//!
//! Resolution is structural. [`find_matching_constructor`] walks the declared
//! constructors in order and returns the first whose arity matches and whose
//! every parameter type accepts the argument at its position. Ties between
//! same-shape constructors go to the earlier declaration, never to the more
//! specific signature. Visibility is deliberately ignored: non-public
//! constructors resolve and invoke like public ones.

use std::any::TypeId;
use std::error::Error;
use std::fmt;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::error::{RegistryError, RegistryResult};
use crate::value::Arg;

// ============================================================================
// Primitive parameter types
// ============================================================================

/// Primitive-like parameter kinds.
///
/// Argument values are always reference-typed at the point of matching, so a
/// primitive parameter is tested against the boxed counterpart of its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// `bool`
    Bool,
    /// `char`
    Char,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `void`; maps to itself and never accepts an argument
    Void,
}

/// Marker for the `void` pseudo-type.
///
/// Uninhabited: no argument value can ever be an instance of it, so a
/// `void`-typed parameter fails every match.
pub enum Void {}

/// Boxed counterpart of a primitive kind
#[derive(Debug, Clone, Copy)]
pub struct BoxedType {
    /// Runtime type of the boxed counterpart
    pub id: TypeId,
    /// Display name of the boxed counterpart
    pub name: &'static str,
}

/// Process-wide primitive-to-boxed table, built once before first use.
static PRIMITIVE_BOXED: Lazy<FxHashMap<PrimitiveKind, BoxedType>> = Lazy::new(|| {
    fn boxed<T: 'static>(name: &'static str) -> BoxedType {
        BoxedType {
            id: TypeId::of::<T>(),
            name,
        }
    }

    let mut map = FxHashMap::default();
    map.insert(PrimitiveKind::Bool, boxed::<bool>("bool"));
    map.insert(PrimitiveKind::Char, boxed::<char>("char"));
    map.insert(PrimitiveKind::I8, boxed::<i8>("i8"));
    map.insert(PrimitiveKind::I16, boxed::<i16>("i16"));
    map.insert(PrimitiveKind::I32, boxed::<i32>("i32"));
    map.insert(PrimitiveKind::I64, boxed::<i64>("i64"));
    map.insert(PrimitiveKind::U8, boxed::<u8>("u8"));
    map.insert(PrimitiveKind::U16, boxed::<u16>("u16"));
    map.insert(PrimitiveKind::U32, boxed::<u32>("u32"));
    map.insert(PrimitiveKind::U64, boxed::<u64>("u64"));
    map.insert(PrimitiveKind::F32, boxed::<f32>("f32"));
    map.insert(PrimitiveKind::F64, boxed::<f64>("f64"));
    map.insert(PrimitiveKind::Void, boxed::<Void>("void"));
    map
});

/// Map a primitive kind to its boxed counterpart.
pub fn primitive_to_boxed(kind: PrimitiveKind) -> BoxedType {
    // Total: the table holds every kind.
    PRIMITIVE_BOXED[&kind]
}

// ============================================================================
// Parameter types
// ============================================================================

/// Declared parameter type of a constructor.
#[derive(Debug, Clone, Copy)]
pub enum ParamType {
    /// Primitive-like parameter; non-nullable, matched via the boxed table
    Primitive(PrimitiveKind),
    /// Reference-typed parameter; nullable, matched by exact runtime type
    Object {
        /// Declared runtime type
        id: TypeId,
        /// Display name of the declared type
        name: &'static str,
    },
}

impl ParamType {
    /// Declared `bool` primitive
    pub const BOOL: ParamType = ParamType::Primitive(PrimitiveKind::Bool);
    /// Declared `char` primitive
    pub const CHAR: ParamType = ParamType::Primitive(PrimitiveKind::Char);
    /// Declared `i8` primitive
    pub const I8: ParamType = ParamType::Primitive(PrimitiveKind::I8);
    /// Declared `i16` primitive
    pub const I16: ParamType = ParamType::Primitive(PrimitiveKind::I16);
    /// Declared `i32` primitive
    pub const I32: ParamType = ParamType::Primitive(PrimitiveKind::I32);
    /// Declared `i64` primitive
    pub const I64: ParamType = ParamType::Primitive(PrimitiveKind::I64);
    /// Declared `u8` primitive
    pub const U8: ParamType = ParamType::Primitive(PrimitiveKind::U8);
    /// Declared `u16` primitive
    pub const U16: ParamType = ParamType::Primitive(PrimitiveKind::U16);
    /// Declared `u32` primitive
    pub const U32: ParamType = ParamType::Primitive(PrimitiveKind::U32);
    /// Declared `u64` primitive
    pub const U64: ParamType = ParamType::Primitive(PrimitiveKind::U64);
    /// Declared `f32` primitive
    pub const F32: ParamType = ParamType::Primitive(PrimitiveKind::F32);
    /// Declared `f64` primitive
    pub const F64: ParamType = ParamType::Primitive(PrimitiveKind::F64);
    /// Declared `void` pseudo-type (never matches)
    pub const VOID: ParamType = ParamType::Primitive(PrimitiveKind::Void);

    /// Declared reference type `T` (nullable).
    ///
    /// Note that `ParamType::of::<i32>()` is the nullable, reference-typed
    /// rendering of `i32`, distinct from the non-nullable [`ParamType::I32`],
    /// though both accept an `i32` argument value.
    pub fn of<T: 'static>() -> ParamType {
        ParamType::Object {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Display name of the declared type
    pub fn name(&self) -> &'static str {
        match self {
            ParamType::Primitive(kind) => primitive_to_boxed(*kind).name,
            ParamType::Object { name, .. } => name,
        }
    }

    /// Whether this declared type accepts the given argument.
    ///
    /// Null is accepted only by reference-typed parameters. A primitive
    /// parameter is first mapped to its boxed counterpart, then tested
    /// against the argument's runtime type.
    pub fn accepts(&self, arg: &Arg) -> bool {
        match self {
            ParamType::Primitive(kind) => match arg.type_id() {
                Some(actual) => actual == primitive_to_boxed(*kind).id,
                None => false,
            },
            ParamType::Object { id, .. } => match arg.type_id() {
                Some(actual) => actual == *id,
                None => true,
            },
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// Declared visibility of a constructor.
///
/// Purely descriptive: resolution enumerates and invokes non-public
/// constructors like public ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Publicly declared constructor
    #[default]
    Public,
    /// Non-public constructor; still resolvable and invocable
    Private,
}

/// Result type for constructor bodies
pub type ConstructorResult<I> = Result<I, Box<dyn Error + Send + Sync>>;

type ConstructorFn<I> = Box<dyn Fn(&[Arg]) -> ConstructorResult<I> + Send + Sync>;

/// A declared constructor of the registry's instance type.
pub struct ConstructorSpec<I> {
    params: Vec<ParamType>,
    visibility: Visibility,
    factory: ConstructorFn<I>,
}

impl<I> ConstructorSpec<I> {
    /// Declare a constructor with the given parameter types and body.
    pub fn new<F>(params: Vec<ParamType>, factory: F) -> Self
    where
        F: Fn(&[Arg]) -> ConstructorResult<I> + Send + Sync + 'static,
    {
        ConstructorSpec {
            params,
            visibility: Visibility::Public,
            factory: Box::new(factory),
        }
    }

    /// Set the declared visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Declared parameter types
    pub fn params(&self) -> &[ParamType] {
        &self.params
    }

    /// Declared visibility
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether the arity matches and every parameter accepts the
    /// corresponding argument.
    pub fn matches(&self, args: &[Arg]) -> bool {
        self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(param, arg)| param.accepts(arg))
    }

    /// Invoke this constructor directly with the given arguments.
    ///
    /// The argument shape is verified first; a mismatch surfaces as a
    /// construction failure (not a resolution failure), as does an error
    /// raised by the body.
    pub fn invoke(&self, args: &[Arg]) -> RegistryResult<I> {
        self.invoke_as(std::any::type_name::<I>(), args)
    }

    fn invoke_as(&self, type_name: &str, args: &[Arg]) -> RegistryResult<I> {
        if !self.matches(args) {
            let cause = format!(
                "arguments {} do not match constructor signature {}",
                format_arg_types(args),
                format_params(&self.params)
            );
            return Err(RegistryError::ConstructionFailed {
                type_name: type_name.to_string(),
                source: cause.into(),
            });
        }

        (self.factory)(args).map_err(|source| RegistryError::ConstructionFailed {
            type_name: type_name.to_string(),
            source,
        })
    }
}

impl<I> fmt::Debug for ConstructorSpec<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorSpec")
            .field("params", &self.params)
            .field("visibility", &self.visibility)
            .finish()
    }
}

// ============================================================================
// Type descriptor
// ============================================================================

/// Descriptor of a registry's instance type.
///
/// Holds the display name and the declared constructors in declaration order;
/// declaration order is the resolution order.
pub struct TypeSpec<I> {
    name: String,
    constructors: Vec<ConstructorSpec<I>>,
}

impl<I> TypeSpec<I> {
    /// Create a descriptor with no constructors.
    pub fn new(name: impl Into<String>) -> Self {
        TypeSpec {
            name: name.into(),
            constructors: Vec::new(),
        }
    }

    /// Declare the next constructor.
    pub fn with_constructor(mut self, constructor: ConstructorSpec<I>) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Display name of the instance type
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared constructors, in declaration order
    pub fn constructors(&self) -> &[ConstructorSpec<I>] {
        &self.constructors
    }
}

impl<I> fmt::Debug for TypeSpec<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSpec")
            .field("name", &self.name)
            .field("constructors", &self.constructors.len())
            .finish()
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Select the first declared constructor matching the argument list.
///
/// Pure resolution, no side effects.
pub fn find_matching_constructor<'a, I>(
    spec: &'a TypeSpec<I>,
    args: &[Arg],
) -> RegistryResult<&'a ConstructorSpec<I>> {
    spec.constructors()
        .iter()
        .find(|constructor| constructor.matches(args))
        .ok_or_else(|| RegistryError::NoMatchingConstructor {
            type_name: spec.name().to_string(),
            arg_types: format_arg_types(args),
        })
}

/// Resolve and invoke a constructor for the given argument list.
pub fn create_instance<I>(spec: &TypeSpec<I>, args: &[Arg]) -> RegistryResult<I> {
    find_matching_constructor(spec, args)?.invoke_as(spec.name(), args)
}

fn format_arg_types(args: &[Arg]) -> String {
    let names: Vec<&str> = args.iter().map(|arg| arg.type_name()).collect();
    format!("({})", names.join(","))
}

fn format_params(params: &[ParamType]) -> String {
    let names: Vec<&str> = params.iter().map(|param| param.name()).collect();
    format!("({})", names.join(","))
}
