//! The STABS type graph produced by the parser.
//!
//! Types form a graph keyed by type number: a string such as
//! `T(1,2)=*(1,3)` defines type `(1,2)` with a body while `(1,3)` is a
//! body-less reference that later resolves through the per-file index.

use std::collections::HashMap;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::ast::ForwardDeclaredKind;
use crate::ast::MemberFunctionModifier;


/// The number identifying a STABS type within a translation unit.
///
/// Compilers emit either two-part `(file,type)` numbers or bare `type`
/// numbers; bare numbers are stored with a `file` of `-1` so the two
/// forms never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeNumber {
    pub file: i32,
    pub type_index: i32,
}

impl TypeNumber {
    /// Create a two-part type number.
    pub fn new(file: i32, type_index: i32) -> Self {
        Self { file, type_index }
    }

    /// Create a one-part type number.
    pub fn bare(type_index: i32) -> Self {
        Self {
            file: -1,
            type_index,
        }
    }
}

impl Display for TypeNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "({},{})", self.file, self.type_index)
    }
}


/// The visibility of a field, base class, or member function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StabsFieldVisibility {
    #[default]
    None,
    Private,
    Protected,
    Public,
    /// Emitted by some compilers for members optimized away.
    PublicOptimizedOut,
}


/// A base class entry of a struct.
#[derive(Clone, Debug, PartialEq)]
pub struct StabsBaseClass {
    pub is_virtual: bool,
    pub visibility: StabsFieldVisibility,
    pub offset: i64,
    pub base_type: StabsType,
}

/// A data member of a struct or union.
#[derive(Clone, Debug, PartialEq)]
pub struct StabsField {
    pub name: String,
    pub field_type: StabsType,
    pub offset_bits: i64,
    pub size_bits: i64,
    pub is_static: bool,
    pub visibility: StabsFieldVisibility,
}

/// One overload of a member function set.
#[derive(Clone, Debug, PartialEq)]
pub struct StabsMemberFunction {
    pub method_type: StabsType,
    pub visibility: StabsFieldVisibility,
    pub modifier: MemberFunctionModifier,
    pub is_const: bool,
    pub is_volatile: bool,
    pub vtable_index: Option<i64>,
}

/// A logical member function name with its overloads.
#[derive(Clone, Debug, PartialEq)]
pub struct StabsMemberFunctionSet {
    pub name: String,
    pub overloads: Vec<StabsMemberFunction>,
}

/// The shared payload of struct and union descriptors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StabsStructOrUnion {
    pub size_bytes: i64,
    pub base_classes: Vec<StabsBaseClass>,
    pub fields: Vec<StabsField>,
    pub member_functions: Vec<StabsMemberFunctionSet>,
}


/// The descriptor-specific body of a STABS type.
#[derive(Clone, Debug, PartialEq)]
pub enum StabsDescriptor {
    /// A definition in terms of another type (`1=2` and friends).
    TypeReference(Box<StabsType>),
    /// `a` — an array with an index range and an element type.
    Array {
        index_type: Box<StabsType>,
        element_type: Box<StabsType>,
    },
    /// `e` — an enum with its name/value pairs in source order.
    Enum { fields: Vec<(String, i64)> },
    /// `f` — a function returning the given type.
    Function { return_type: Box<StabsType> },
    /// `B` — a volatile qualifier.
    VolatileQualifier { inner: Box<StabsType> },
    /// `k` — a const qualifier.
    ConstQualifier { inner: Box<StabsType> },
    /// `r` — a subrange; the bounds stay textual because 64/128-bit
    /// types are encoded as bounds no integer can hold.
    Range {
        value_type: Box<StabsType>,
        low: String,
        high: String,
    },
    /// `s` — a struct or class.
    Struct(StabsStructOrUnion),
    /// `u` — a union.
    Union(StabsStructOrUnion),
    /// `x` — a forward declaration by tag.
    CrossReference {
        kind: ForwardDeclaredKind,
        identifier: String,
    },
    /// `R` — a floating point built-in of the given byte size.
    FloatingPointBuiltIn { fpclass: i64, size_bytes: i64 },
    /// `#` — a member function type.
    Method {
        class_type: Option<Box<StabsType>>,
        return_type: Box<StabsType>,
        parameter_types: Vec<StabsType>,
    },
    /// `*` — a pointer.
    Pointer { value_type: Box<StabsType> },
    /// `&` — a C++ reference.
    Reference { value_type: Box<StabsType> },
    /// `@s` — a size attribute wrapping another type.
    TypeAttribute {
        size_bits: i64,
        inner: Box<StabsType>,
    },
    /// `@` followed by a type — a pointer to a data member.
    PointerToDataMember {
        class_type: Box<StabsType>,
        member_type: Box<StabsType>,
    },
    /// A negative built-in type id (`-16` is the only accepted one).
    BuiltIn { type_id: i64 },
}


/// A parsed STABS type.
#[derive(Clone, Debug, PartialEq)]
pub struct StabsType {
    /// The type's number; `None` for anonymous types.
    pub type_number: Option<TypeNumber>,
    /// The type's name, taken from the defining symbol.
    pub name: Option<String>,
    /// Whether this type is the top-level type of a symbol string.
    pub is_root: bool,
    /// The descriptor body; `None` for a pure reference to a number.
    pub body: Option<StabsDescriptor>,
}

impl StabsType {
    /// Create a body-less reference to a type number.
    pub(crate) fn reference(type_number: TypeNumber) -> Self {
        Self {
            type_number: Some(type_number),
            name: None,
            is_root: false,
            body: None,
        }
    }

    /// Whether the type carries no type number.
    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.type_number.is_none()
    }

    /// Whether the type has a descriptor body of its own.
    #[inline]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Visit this type and all types nested below it.
    fn visit<'s>(&'s self, visitor: &mut dyn FnMut(&'s StabsType)) {
        visitor(self);
        let body = match &self.body {
            Some(body) => body,
            None => return,
        };
        match body {
            StabsDescriptor::TypeReference(inner) => inner.visit(visitor),
            StabsDescriptor::Array {
                index_type,
                element_type,
            } => {
                index_type.visit(visitor);
                element_type.visit(visitor);
            }
            StabsDescriptor::Enum { .. } => (),
            StabsDescriptor::Function { return_type } => return_type.visit(visitor),
            StabsDescriptor::VolatileQualifier { inner }
            | StabsDescriptor::ConstQualifier { inner } => inner.visit(visitor),
            StabsDescriptor::Range { value_type, .. } => value_type.visit(visitor),
            StabsDescriptor::Struct(body) | StabsDescriptor::Union(body) => {
                for base_class in &body.base_classes {
                    base_class.base_type.visit(visitor);
                }
                for field in &body.fields {
                    field.field_type.visit(visitor);
                }
                for set in &body.member_functions {
                    for overload in &set.overloads {
                        overload.method_type.visit(visitor);
                    }
                }
            }
            StabsDescriptor::CrossReference { .. } => (),
            StabsDescriptor::FloatingPointBuiltIn { .. } => (),
            StabsDescriptor::Method {
                class_type,
                return_type,
                parameter_types,
            } => {
                if let Some(class_type) = class_type {
                    class_type.visit(visitor);
                }
                return_type.visit(visitor);
                for parameter in parameter_types {
                    parameter.visit(visitor);
                }
            }
            StabsDescriptor::Pointer { value_type }
            | StabsDescriptor::Reference { value_type } => value_type.visit(visitor),
            StabsDescriptor::TypeAttribute { inner, .. } => inner.visit(visitor),
            StabsDescriptor::PointerToDataMember {
                class_type,
                member_type,
            } => {
                class_type.visit(visitor);
                member_type.visit(visitor);
            }
            StabsDescriptor::BuiltIn { .. } => (),
        }
    }
}


/// The descriptor character of a symbol, telling what the symbol
/// declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StabsSymbolDescriptor {
    /// No descriptor character; the type number follows directly.
    LocalVariable,
    /// `a` — a parameter passed by reference.
    ReferenceParameter,
    /// `f` — a file-local function.
    LocalFunction,
    /// `F` — a global function.
    GlobalFunction,
    /// `G` — a global variable.
    GlobalVariable,
    /// `P` — a parameter passed in a register.
    RegisterParameter,
    /// `p` — a parameter passed by value.
    ValueParameter,
    /// `r` — a variable living in a register.
    RegisterVariable,
    /// `S` — a file-local global variable.
    StaticGlobalVariable,
    /// `t` — a type name.
    TypeName,
    /// `T` — an enum, struct, or union tag.
    EnumStructOrTypeTag,
    /// `V` — a function-local static variable.
    StaticLocalVariable,
}

/// A parsed STABS symbol: a name plus its root type.
#[derive(Clone, Debug, PartialEq)]
pub struct StabsSymbol {
    pub name: String,
    pub descriptor: StabsSymbolDescriptor,
    pub root_type: StabsType,
}


/// The per-file index from type numbers to their defining types.
pub type TypeIndex<'s> = HashMap<TypeNumber, &'s StabsType>;

/// Build the type-number index over a file's parsed symbols.
///
/// Every numbered type with a body is recorded, including intermediate
/// definitions such as the `2=...` in `1=2=...`; the first definition
/// of a number wins.
pub fn build_type_index<'s, I>(symbols: I) -> TypeIndex<'s>
where
    I: IntoIterator<Item = &'s StabsSymbol>,
{
    let mut index = TypeIndex::new();
    for symbol in symbols {
        symbol.root_type.visit(&mut |ty| {
            if let (Some(number), true) = (ty.type_number, ty.has_body()) {
                let _entry = index.entry(number).or_insert(ty);
            }
        });
    }
    index
}


#[cfg(test)]
mod tests {
    use super::*;


    /// Check that bare and two-part numbers never collide.
    #[test]
    fn type_number_forms() {
        assert_ne!(TypeNumber::bare(1), TypeNumber::new(0, 1));
        assert_eq!(TypeNumber::bare(1), TypeNumber::bare(1));
        assert_eq!(TypeNumber::new(1, 2).to_string(), "(1,2)");
    }

    /// Check that the index records nested definitions and keeps the
    /// first definition of a number.
    #[test]
    fn index_building() {
        let inner = StabsType {
            type_number: Some(TypeNumber::bare(2)),
            name: None,
            is_root: false,
            body: Some(StabsDescriptor::BuiltIn { type_id: 16 }),
        };
        let outer = StabsType {
            type_number: Some(TypeNumber::bare(1)),
            name: None,
            is_root: true,
            body: Some(StabsDescriptor::Pointer {
                value_type: Box::new(inner),
            }),
        };
        let duplicate = StabsType {
            type_number: Some(TypeNumber::bare(1)),
            name: None,
            is_root: true,
            body: Some(StabsDescriptor::BuiltIn { type_id: 16 }),
        };
        let reference = StabsType::reference(TypeNumber::bare(3));

        let symbols = vec![
            StabsSymbol {
                name: "a".to_string(),
                descriptor: StabsSymbolDescriptor::TypeName,
                root_type: outer,
            },
            StabsSymbol {
                name: "b".to_string(),
                descriptor: StabsSymbolDescriptor::TypeName,
                root_type: duplicate,
            },
            StabsSymbol {
                name: "c".to_string(),
                descriptor: StabsSymbolDescriptor::LocalVariable,
                root_type: reference,
            },
        ];

        let index = build_type_index(&symbols);
        // Body-less references are not recorded.
        assert_eq!(index.len(), 2);
        let one = index[&TypeNumber::bare(1)];
        assert!(matches!(one.body, Some(StabsDescriptor::Pointer { .. })));
        let two = index[&TypeNumber::bare(2)];
        assert!(matches!(two.body, Some(StabsDescriptor::BuiltIn { type_id: 16 })));
        assert!(!index.contains_key(&TypeNumber::bare(3)));
    }
}
