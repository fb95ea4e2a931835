//! The typed AST produced by lowering STABS type descriptors.
//!
//! Every node owns its children and its strings outright; nothing in
//! here borrows from the byte image or from the parsed STABS graph.

use crate::stabs::TypeNumber;
use crate::FileHandle;


/// Classification of a built-in type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuiltInClass {
    Void,
    Bool8,
    Unsigned8,
    Signed8,
    /// An 8-bit integer of unspecified signedness (a plain `char`).
    Unqualified8,
    Unsigned16,
    Signed16,
    Unsigned32,
    Signed32,
    Unsigned64,
    Signed64,
    Unsigned128,
    Signed128,
    /// A 128-bit value of unspecified signedness.
    Unqualified128,
    Float32,
    Float64,
    Float128,
}

/// Retrieve the storage size of a built-in class in bytes.
pub fn builtin_class_size(class: BuiltInClass) -> u32 {
    match class {
        BuiltInClass::Void => 0,
        BuiltInClass::Bool8
        | BuiltInClass::Unsigned8
        | BuiltInClass::Signed8
        | BuiltInClass::Unqualified8 => 1,
        BuiltInClass::Unsigned16 | BuiltInClass::Signed16 => 2,
        BuiltInClass::Unsigned32 | BuiltInClass::Signed32 | BuiltInClass::Float32 => 4,
        BuiltInClass::Unsigned64 | BuiltInClass::Signed64 | BuiltInClass::Float64 => 8,
        BuiltInClass::Unsigned128
        | BuiltInClass::Signed128
        | BuiltInClass::Unqualified128
        | BuiltInClass::Float128 => 16,
    }
}


/// The access specifier of a class member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessSpecifier {
    #[default]
    Public,
    Protected,
    Private,
}

/// The storage class of a declaration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StorageClass {
    #[default]
    None,
    Static,
}

/// Modifier of a member function.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemberFunctionModifier {
    #[default]
    None,
    Static,
    Virtual,
}

/// The kind of a type that is only known by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeNameSource {
    /// A reference to a type defined elsewhere in the same file.
    Reference,
    /// A forward declaration by tag.
    CrossReference,
    /// The implicit `this` type of a method on an unnamed type.
    This,
}

/// The kind a cross reference forward-declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForwardDeclaredKind {
    Struct,
    Union,
    Enum,
}


/// A named type reference that a later pass resolves.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UnresolvedStabs {
    /// The name of the referenced type, if it was referenced by name.
    pub type_name: Option<String>,
    /// The kind the reference forward-declares, for cross references.
    pub forward_declared: Option<ForwardDeclaredKind>,
    /// The file the reference points into.
    pub referenced_file_handle: Option<FileHandle>,
    /// The type number of the referenced type within that file.
    pub stabs_type_number: Option<TypeNumber>,
}

/// A reference to a type by name rather than by expansion.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeName {
    pub source: TypeNameSource,
    pub unresolved_stabs: UnresolvedStabs,
}

/// A built-in type.
#[derive(Clone, Debug, PartialEq)]
pub struct BuiltIn {
    pub bclass: BuiltInClass,
}

/// A fixed-size array.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    pub element_type: Box<Node>,
    pub element_count: u32,
}

/// An enumeration with its constants in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct Enum {
    pub constants: Vec<(String, i64)>,
}

/// A function or member function signature.
#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub return_type: Box<Node>,
    /// Parameter types. `None` for descriptors that do not encode them.
    pub parameters: Option<Vec<Node>>,
    pub modifier: MemberFunctionModifier,
    pub vtable_index: Option<i64>,
}

/// A struct, class or union.
#[derive(Clone, Debug, PartialEq)]
pub struct StructOrUnion {
    pub is_struct: bool,
    pub base_classes: Vec<Node>,
    pub fields: Vec<Node>,
    pub member_functions: Vec<Node>,
}

/// A bitfield member, wrapping its underlying type.
#[derive(Clone, Debug, PartialEq)]
pub struct BitField {
    pub underlying_type: Box<Node>,
    /// Bit offset within the byte given by the node's `offset_bytes`.
    pub bitfield_offset_bits: i64,
}

/// A pointer or C++ reference.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerOrReference {
    pub is_pointer: bool,
    pub value_type: Box<Node>,
}

/// A pointer to a data member.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerToDataMember {
    pub class_type: Box<Node>,
    pub member_type: Box<Node>,
}

/// A subtree that could not be recovered.
#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    pub message: String,
}


/// The type-specific part of a [`Node`].
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Array(Array),
    BitField(BitField),
    BuiltIn(BuiltIn),
    Enum(Enum),
    Error(Error),
    Function(Function),
    PointerOrReference(PointerOrReference),
    PointerToDataMember(PointerToDataMember),
    StructOrUnion(StructOrUnion),
    TypeName(TypeName),
}

/// A node of the recovered type tree.
///
/// The attribute block is shared by all kinds; `-1` marks an offset or
/// size that was never filled in.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub name: Option<String>,
    pub offset_bytes: i64,
    pub size_bits: i64,
    pub is_const: bool,
    pub is_volatile: bool,
    pub is_base_class: bool,
    pub is_vtable_pointer: bool,
    pub is_constructor_or_destructor: bool,
    pub is_special_member_function: bool,
    pub is_operator_member_function: bool,
    pub storage_class: StorageClass,
    pub access_specifier: AccessSpecifier,
    pub kind: NodeKind,
}

impl Node {
    /// Create a node of the given kind with no attributes set.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            offset_bytes: -1,
            size_bits: -1,
            is_const: false,
            is_volatile: false,
            is_base_class: false,
            is_vtable_pointer: false,
            is_constructor_or_destructor: false,
            is_special_member_function: false,
            is_operator_member_function: false,
            storage_class: StorageClass::default(),
            access_specifier: AccessSpecifier::default(),
            kind,
        }
    }

    /// Create a built-in node carrying its natural size.
    pub(crate) fn builtin(bclass: BuiltInClass) -> Self {
        let mut node = Self::new(NodeKind::BuiltIn(BuiltIn { bclass }));
        node.size_bits = i64::from(builtin_class_size(bclass)) * 8;
        node
    }

    /// Create an error node with the given message.
    pub(crate) fn error<M>(message: M) -> Self
    where
        M: Into<String>,
    {
        Self::new(NodeKind::Error(Error {
            message: message.into(),
        }))
    }
}
