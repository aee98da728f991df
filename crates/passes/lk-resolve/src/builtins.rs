//! Pre-registered built-in type declarations
//!
//! The standard library's core types are handed to [`crate::resolve`] as
//! ordinary library-scope declarations, registered before any user code.
//! They participate in normal name lookup and arity checking; nothing in
//! the pass special-cases them. The set is immutable after construction
//! and may be shared by units resolved on different workers.

/// One built-in type to pre-register
#[derive(Debug, Clone, Copy)]
pub struct BuiltinType {
    /// Type name
    pub name: &'static str,
    /// Declared type-parameter count
    pub type_params: usize,
}

/// The set of library-scope declarations registered before user code
#[derive(Debug, Clone)]
pub struct Builtins {
    /// Built-in types, registered in order
    pub types: Vec<BuiltinType>,
    /// Name of the root object type, the implicit supertype of classes
    /// without an `extends` clause
    pub root_type: &'static str,
}

impl Builtins {
    /// The core set: a numeric type, the object root, strings, the
    /// function type, a 1-parameter sequence type and a 2-parameter
    /// mapping type
    pub fn core() -> Self {
        Self {
            types: vec![
                BuiltinType {
                    name: "int",
                    type_params: 0,
                },
                BuiltinType {
                    name: "Object",
                    type_params: 0,
                },
                BuiltinType {
                    name: "String",
                    type_params: 0,
                },
                BuiltinType {
                    name: "Function",
                    type_params: 0,
                },
                BuiltinType {
                    name: "List",
                    type_params: 1,
                },
                BuiltinType {
                    name: "Map",
                    type_params: 2,
                },
            ],
            root_type: "Object",
        }
    }
}

impl Default for Builtins {
    fn default() -> Self {
        Self::core()
    }
}
