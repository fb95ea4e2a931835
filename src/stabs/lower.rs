//! Lowering of parsed STABS types into the AST.
//!
//! The lowering walks the type graph recursively. Three mechanisms
//! keep it out of trouble on cyclic graphs: named types are replaced
//! by [`ast::TypeName`] references instead of being expanded in place,
//! self references through an enclosing struct become `this`-style
//! references, and a depth guard catches whatever remains.

use std::cell::RefCell;
use std::num::IntErrorKind;
use std::ptr;

use crate::ast;
use crate::ast::ForwardDeclaredKind;
use crate::error::Error;
use crate::error::ErrorExt as _;
use crate::error::ErrorKind;
use crate::error::Result;
use crate::log::debug;
use crate::log::warn;
use crate::mdebug::SymFileDescriptor;
use crate::DemanglerFunctions;
use crate::FileHandle;
use crate::ParserFlags;

use super::parser::join_stabs_strings;
use super::parser::parse_stabs_symbol;
use super::types::build_type_index;
use super::types::StabsDescriptor;
use super::types::StabsField;
use super::types::StabsFieldVisibility;
use super::types::StabsStructOrUnion;
use super::types::StabsSymbol;
use super::types::StabsType;
use super::types::TypeIndex;
use super::types::TypeNumber;


/// Recursions deeper than this are assumed to be cycles.
const MAX_CALL_DEPTH: u32 = 200;
/// Bound on reference resolution steps during bitfield detection.
const MAX_RESOLUTION_STEPS: usize = 50;


/// Shared state of one file's lowering run.
#[derive(Debug)]
pub struct StabsToAstState<'s> {
    file_handle: FileHandle,
    stabs_types: &'s TypeIndex<'s>,
    parser_flags: ParserFlags,
    demangler: DemanglerFunctions,
    warnings: RefCell<Vec<TypeNumber>>,
}

impl<'s> StabsToAstState<'s> {
    /// Create the state for lowering one file's types.
    pub fn new(
        file_handle: FileHandle,
        stabs_types: &'s TypeIndex<'s>,
        parser_flags: ParserFlags,
        demangler: DemanglerFunctions,
    ) -> Self {
        Self {
            file_handle,
            stabs_types,
            parser_flags,
            demangler,
            warnings: RefCell::new(Vec::new()),
        }
    }

    /// Retrieve the type numbers that failed to resolve so far,
    /// clearing the recorded set.
    pub fn take_warnings(&self) -> Vec<TypeNumber> {
        self.warnings.take()
    }
}


struct MemberFunctionInfo {
    name: String,
    is_constructor_or_destructor: bool,
    is_special_member_function: bool,
    is_operator_member_function: bool,
}


fn type_name_node(
    source: ast::TypeNameSource,
    unresolved_stabs: ast::UnresolvedStabs,
) -> ast::Node {
    ast::Node::new(ast::NodeKind::TypeName(ast::TypeName {
        source,
        unresolved_stabs,
    }))
}

fn set_access_specifier(
    node: &mut ast::Node,
    visibility: StabsFieldVisibility,
    flags: ParserFlags,
) {
    node.access_specifier = match visibility {
        StabsFieldVisibility::None | StabsFieldVisibility::Public => ast::AccessSpecifier::Public,
        StabsFieldVisibility::Protected => ast::AccessSpecifier::Protected,
        StabsFieldVisibility::Private => ast::AccessSpecifier::Private,
        StabsFieldVisibility::PublicOptimizedOut => {
            if flags.contains(ParserFlags::STRICT_PARSING) {
                debug!("optimized out member collapsed to public visibility");
            }
            ast::AccessSpecifier::Public
        }
    };
}


/// Lower a STABS type into an AST node.
///
/// `substitute_type_name` asks for a [`ast::TypeName`] reference
/// instead of a full expansion where the type has a usable name;
/// `force_substitute` additionally turns self references through
/// `enclosing_struct` into `this`-style references.
pub fn stabs_type_to_ast(
    ty: &StabsType,
    enclosing_struct: Option<&StabsType>,
    state: &StabsToAstState<'_>,
    depth: u32,
    substitute_type_name: bool,
    force_substitute: bool,
) -> Result<ast::Node> {
    if depth > MAX_CALL_DEPTH {
        let message = "call depth exceeded";
        if state.parser_flags.contains(ParserFlags::STRICT_PARSING) {
            return Err(Error::new(ErrorKind::CallDepthExceeded, message))
        }
        return Ok(ast::Node::error(message))
    }

    // Replace types with their name where that is more appropriate
    // than expanding them in place.
    if let Some(name) = &ty.name {
        let try_substitute = depth > 0
            && (ty.is_root
                || matches!(
                    ty.body,
                    Some(StabsDescriptor::Range { .. }) | Some(StabsDescriptor::BuiltIn { .. })
                ));
        // GCC names anonymous enums " " since some debuggers cannot
        // handle zero-length names.
        let is_name_empty = name.is_empty() || name == " ";
        // Cross references become type names in the dispatch below.
        let is_cross_reference =
            matches!(ty.body, Some(StabsDescriptor::CrossReference { .. }));
        // A common case is that __builtin_va_list is indistinguishable
        // from void*, so it is kept out of the output.
        let is_void = name == "void" || name == "__builtin_va_list";
        if (substitute_type_name || try_substitute)
            && !is_name_empty
            && !is_cross_reference
            && !is_void
        {
            let node = type_name_node(
                ast::TypeNameSource::Reference,
                ast::UnresolvedStabs {
                    type_name: Some(name.clone()),
                    forward_declared: None,
                    referenced_file_handle: Some(state.file_handle),
                    stabs_type_number: ty.type_number,
                },
            );
            return Ok(node)
        }
    }

    // An automatically generated member function of an unnamed type
    // references that type by number; expanding it would recurse
    // forever. It is almost certainly a this parameter or return type,
    // so emit a reference.
    if force_substitute {
        if let (Some(number), Some(enclosing_number)) = (
            ty.type_number,
            enclosing_struct.and_then(|enclosing| enclosing.type_number),
        ) {
            if number == enclosing_number {
                let node = type_name_node(
                    ast::TypeNameSource::This,
                    ast::UnresolvedStabs {
                        type_name: None,
                        forward_declared: None,
                        referenced_file_handle: Some(state.file_handle),
                        stabs_type_number: Some(number),
                    },
                );
                return Ok(node)
            }
        }
    }

    let body = match &ty.body {
        Some(body) => body,
        None => {
            // The type was defined previously; look it up by number.
            let number = ty.type_number.ok_or_else(|| {
                Error::new(
                    ErrorKind::AssertionFailure,
                    "cannot look up type: type is anonymous",
                )
            })?;
            return match state.stabs_types.get(&number) {
                Some(resolved) => stabs_type_to_ast(
                    resolved,
                    enclosing_struct,
                    state,
                    depth + 1,
                    substitute_type_name,
                    force_substitute,
                ),
                None => {
                    let message =
                        format!("failed to look up STABS type by its type number {number}");
                    if state.parser_flags.contains(ParserFlags::STRICT_PARSING) {
                        Err(Error::new(ErrorKind::UnknownTypeNumber, message))
                    } else {
                        warn!("{message}");
                        state.warnings.borrow_mut().push(number);
                        Ok(ast::Node::error(message))
                    }
                }
            }
        }
    };

    let node = match body {
        StabsDescriptor::TypeReference(inner) => {
            if ty.is_anonymous() || inner.is_anonymous() || inner.type_number != ty.type_number
            {
                stabs_type_to_ast(
                    inner,
                    enclosing_struct,
                    state,
                    depth + 1,
                    substitute_type_name,
                    force_substitute,
                )?
            } else {
                // In STABS, void is a reference to itself.
                ast::Node::builtin(ast::BuiltInClass::Void)
            }
        }
        StabsDescriptor::Array {
            index_type,
            element_type,
        } => {
            let element = stabs_type_to_ast(
                element_type,
                enclosing_struct,
                state,
                depth + 1,
                true,
                force_substitute,
            )?;

            let (low, high) = match index_type.body.as_ref() {
                Some(StabsDescriptor::Range { low, high, .. }) => (low, high),
                _ => {
                    return Err(Error::new(
                        ErrorKind::AssertionFailure,
                        "array index type is not a range",
                    ))
                }
            };
            let low_value =
                parse_integer_bound(low, 10).context("parsing low array bound")?;
            if low_value != 0 {
                return Err(Error::new(
                    ErrorKind::ParseError,
                    format!("invalid array index range starting at {low_value}"),
                ))
            }
            let high_value =
                parse_integer_bound(high, 10).context("parsing high array bound")?;
            let element_count = if high_value == 4294967295 {
                // Some compilers write out a wrapped around bound for
                // zero (or variable?) length arrays.
                0
            } else {
                (high_value + 1) as u32
            };

            ast::Node::new(ast::NodeKind::Array(ast::Array {
                element_type: Box::new(element),
                element_count,
            }))
        }
        StabsDescriptor::Enum { fields } => ast::Node::new(ast::NodeKind::Enum(ast::Enum {
            constants: fields.clone(),
        })),
        StabsDescriptor::Function { return_type } => {
            let return_node = stabs_type_to_ast(
                return_type,
                enclosing_struct,
                state,
                depth + 1,
                true,
                force_substitute,
            )?;
            ast::Node::new(ast::NodeKind::Function(ast::Function {
                return_type: Box::new(return_node),
                parameters: None,
                modifier: ast::MemberFunctionModifier::None,
                vtable_index: None,
            }))
        }
        StabsDescriptor::VolatileQualifier { inner } => {
            let mut node = stabs_type_to_ast(
                inner,
                enclosing_struct,
                state,
                depth + 1,
                substitute_type_name,
                force_substitute,
            )?;
            node.is_volatile = true;
            node
        }
        StabsDescriptor::ConstQualifier { inner } => {
            let mut node = stabs_type_to_ast(
                inner,
                enclosing_struct,
                state,
                depth + 1,
                substitute_type_name,
                force_substitute,
            )?;
            node.is_const = true;
            node
        }
        StabsDescriptor::Range { low, high, .. } => {
            let class = classify_range(low, high)?;
            ast::Node::builtin(class)
        }
        StabsDescriptor::Struct(body) => struct_or_union_to_ast(ty, body, true, state, depth)?,
        StabsDescriptor::Union(body) => struct_or_union_to_ast(ty, body, false, state, depth)?,
        StabsDescriptor::CrossReference { kind, identifier } => type_name_node(
            ast::TypeNameSource::CrossReference,
            ast::UnresolvedStabs {
                type_name: Some(identifier.clone()),
                forward_declared: Some(*kind),
                referenced_file_handle: None,
                stabs_type_number: None,
            },
        ),
        StabsDescriptor::FloatingPointBuiltIn { size_bytes, .. } => {
            // Deliberately recovered as opaque unsigned blobs of the
            // declared size.
            let class = match size_bytes {
                1 => ast::BuiltInClass::Unsigned8,
                2 => ast::BuiltInClass::Unsigned16,
                4 => ast::BuiltInClass::Unsigned32,
                8 => ast::BuiltInClass::Unsigned64,
                16 => ast::BuiltInClass::Unsigned128,
                _ => ast::BuiltInClass::Unsigned8,
            };
            ast::Node::builtin(class)
        }
        StabsDescriptor::Method {
            return_type,
            parameter_types,
            ..
        } => {
            let return_node = stabs_type_to_ast(
                return_type,
                enclosing_struct,
                state,
                depth + 1,
                true,
                true,
            )?;
            let mut parameters = Vec::new();
            for parameter_type in parameter_types {
                let parameter = stabs_type_to_ast(
                    parameter_type,
                    enclosing_struct,
                    state,
                    depth + 1,
                    true,
                    true,
                )?;
                parameters.push(parameter);
            }
            ast::Node::new(ast::NodeKind::Function(ast::Function {
                return_type: Box::new(return_node),
                parameters: Some(parameters),
                modifier: ast::MemberFunctionModifier::None,
                vtable_index: None,
            }))
        }
        StabsDescriptor::Pointer { value_type } => {
            let value = stabs_type_to_ast(
                value_type,
                enclosing_struct,
                state,
                depth + 1,
                true,
                force_substitute,
            )?;
            ast::Node::new(ast::NodeKind::PointerOrReference(ast::PointerOrReference {
                is_pointer: true,
                value_type: Box::new(value),
            }))
        }
        StabsDescriptor::Reference { value_type } => {
            let value = stabs_type_to_ast(
                value_type,
                enclosing_struct,
                state,
                depth + 1,
                true,
                force_substitute,
            )?;
            ast::Node::new(ast::NodeKind::PointerOrReference(ast::PointerOrReference {
                is_pointer: false,
                value_type: Box::new(value),
            }))
        }
        StabsDescriptor::TypeAttribute { size_bits, inner } => {
            let mut node = stabs_type_to_ast(
                inner,
                enclosing_struct,
                state,
                depth + 1,
                substitute_type_name,
                force_substitute,
            )?;
            node.size_bits = *size_bits;
            node
        }
        StabsDescriptor::PointerToDataMember {
            class_type,
            member_type,
        } => {
            let class_node =
                stabs_type_to_ast(class_type, enclosing_struct, state, depth + 1, true, true)?;
            let member_node =
                stabs_type_to_ast(member_type, enclosing_struct, state, depth + 1, true, true)?;
            ast::Node::new(ast::NodeKind::PointerToDataMember(
                ast::PointerToDataMember {
                    class_type: Box::new(class_node),
                    member_type: Box::new(member_node),
                },
            ))
        }
        StabsDescriptor::BuiltIn { type_id } => {
            if *type_id != 16 {
                return Err(Error::new(
                    ErrorKind::UnknownBuiltin,
                    format!("unknown built-in type id {type_id}"),
                ))
            }
            ast::Node::builtin(ast::BuiltInClass::Bool8)
        }
    };

    Ok(node)
}

fn parse_integer_bound(value: &str, radix: u32) -> Result<i64> {
    match i64::from_str_radix(value, radix) {
        Ok(parsed) => Ok(parsed),
        // Saturate values that run off the end of the integer range,
        // as the bound tables expect.
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => Ok(i64::MAX),
        Err(err) if *err.kind() == IntErrorKind::NegOverflow => Ok(i64::MIN),
        Err(_) => Err(Error::new(
            ErrorKind::ParseError,
            format!("failed to parse range bound '{value}' as integer"),
        )),
    }
}

fn classify_range(low: &str, high: &str) -> Result<ast::BuiltInClass> {
    use crate::ast::BuiltInClass::*;

    // Special cases and bounds too large to store in a 64 bit
    // integer, compared textually. Both the Unix and IOP toolchain
    // spellings are included.
    #[rustfmt::skip]
    const LITERAL_CLASSES: &[(&str, &str, ast::BuiltInClass)] = &[
        ("4", "0", Float32),
        ("000000000000000000000000", "001777777777777777777777", Unsigned64),
        ("00000000000000000000000000000000000000000000", "00000000000000000000001777777777777777777777", Unsigned64),
        ("0000000000000", "01777777777777777777777", Unsigned64), // IOP
        ("0", "18446744073709551615", Unsigned64),
        ("001000000000000000000000", "000777777777777777777777", Signed64),
        ("00000000000000000000001000000000000000000000", "00000000000000000000000777777777777777777777", Signed64),
        ("01000000000000000000000", "0777777777777777777777", Signed64), // IOP
        ("-9223372036854775808", "9223372036854775807", Signed64),
        ("8", "0", Float64),
        ("00000000000000000000000000000000000000000000", "03777777777777777777777777777777777777777777", Unsigned128),
        ("02000000000000000000000000000000000000000000", "01777777777777777777777777777777777777777777", Signed128),
        ("000000000000000000000000", "0377777777777777777777777777777777", Unqualified128),
        ("16", "0", Float128),
        ("0", "-1", Unqualified128), // Old homebrew toolchain
    ];
    for (table_low, table_high, class) in LITERAL_CLASSES {
        if *table_low == low && *table_high == high {
            return Ok(*class)
        }
    }

    // Smaller bounds are parsed, octal when they start with a zero.
    let low_value = parse_integer_bound(low, if low.starts_with('0') { 8 } else { 10 })
        .context("parsing low part of range")?;
    let high_value = parse_integer_bound(high, if high.starts_with('0') { 8 } else { 10 })
        .context("parsing high part of range")?;

    const INTEGER_CLASSES: &[(i64, i64, ast::BuiltInClass)] = &[
        (0, 255, Unsigned8),
        (-128, 127, Signed8),
        (0, 127, Unqualified8),
        (0, 65535, Unsigned16),
        (-32768, 32767, Signed16),
        (0, 4294967295, Unsigned32),
        (-2147483648, 2147483647, Signed32),
    ];
    for (table_low, table_high, class) in INTEGER_CLASSES {
        let low_matches =
            *table_low == low_value || low_value.checked_neg() == Some(*table_low);
        if low_matches && *table_high == high_value {
            return Ok(*class)
        }
    }

    Err(Error::new(
        ErrorKind::UnclassifiedRange,
        format!("failed to classify range [{low}, {high}]"),
    ))
}

fn struct_or_union_to_ast(
    ty: &StabsType,
    body: &StabsStructOrUnion,
    is_struct: bool,
    state: &StabsToAstState<'_>,
    depth: u32,
) -> Result<ast::Node> {
    let mut base_classes = Vec::new();
    for stabs_base_class in &body.base_classes {
        let mut base_class = stabs_type_to_ast(
            &stabs_base_class.base_type,
            Some(ty),
            state,
            depth + 1,
            true,
            true,
        )?;
        base_class.is_base_class = true;
        base_class.offset_bytes = stabs_base_class.offset;
        set_access_specifier(&mut base_class, stabs_base_class.visibility, state.parser_flags);
        base_classes.push(base_class);
    }

    let mut fields = Vec::new();
    for field in &body.fields {
        fields.push(field_to_ast(field, ty, state, depth)?);
    }

    let member_functions = member_functions_to_ast(ty, body, state, depth)?;

    let mut node = ast::Node::new(ast::NodeKind::StructOrUnion(ast::StructOrUnion {
        is_struct,
        base_classes,
        fields,
        member_functions,
    }));
    node.size_bits = body.size_bytes * 8;
    Ok(node)
}

fn field_to_ast(
    field: &StabsField,
    enclosing_struct: &StabsType,
    state: &StabsToAstState<'_>,
    depth: u32,
) -> Result<ast::Node> {
    if detect_bitfield(field, state)? {
        let underlying = stabs_type_to_ast(
            &field.field_type,
            Some(enclosing_struct),
            state,
            depth + 1,
            true,
            false,
        )?;
        let mut node = ast::Node::new(ast::NodeKind::BitField(ast::BitField {
            underlying_type: Box::new(underlying),
            bitfield_offset_bits: field.offset_bits % 8,
        }));
        node.name = Some(if field.name == " " {
            String::new()
        } else {
            field.name.clone()
        });
        node.offset_bytes = field.offset_bits / 8;
        node.size_bits = field.size_bits;
        set_access_specifier(&mut node, field.visibility, state.parser_flags);
        Ok(node)
    } else {
        let mut node = stabs_type_to_ast(
            &field.field_type,
            Some(enclosing_struct),
            state,
            depth + 1,
            true,
            false,
        )?;
        node.name = Some(field.name.clone());
        node.offset_bytes = field.offset_bits / 8;
        node.size_bits = field.size_bits;
        set_access_specifier(&mut node, field.visibility, state.parser_flags);

        if field.name.starts_with("$vf")
            || field.name.starts_with("_vptr$")
            || field.name.starts_with("_vptr.")
        {
            node.is_vtable_pointer = true;
        }
        if field.is_static {
            node.storage_class = ast::StorageClass::Static;
        }
        Ok(node)
    }
}

fn detect_bitfield(field: &StabsField, state: &StabsToAstState<'_>) -> Result<bool> {
    // Static fields cannot be bitfields.
    if field.is_static {
        return Ok(false)
    }

    // Follow references and qualifiers to the underlying type.
    let mut ty = &field.field_type;
    for step in 0..MAX_RESOLUTION_STEPS {
        match &ty.body {
            None => {
                let number = match ty.type_number {
                    Some(number) => number,
                    None => return Ok(false),
                };
                match state.stabs_types.get(&number) {
                    Some(next) if !ptr::eq(*next, ty) => ty = next,
                    _ => return Ok(false),
                }
            }
            Some(StabsDescriptor::TypeReference(inner)) => ty = inner,
            Some(StabsDescriptor::ConstQualifier { inner }) => ty = inner,
            Some(StabsDescriptor::VolatileQualifier { inner }) => ty = inner,
            _ => break,
        }
        if step == MAX_RESOLUTION_STEPS - 1 {
            // A cycle; nothing sensible to report.
            return Ok(false)
        }
    }

    let underlying_size_bits = match &ty.body {
        Some(StabsDescriptor::Range { low, high, .. }) => {
            let class = classify_range(low, high)?;
            i64::from(ast::builtin_class_size(class)) * 8
        }
        Some(StabsDescriptor::CrossReference { kind, .. }) => {
            if *kind == ForwardDeclaredKind::Enum {
                32
            } else {
                return Ok(false)
            }
        }
        Some(StabsDescriptor::TypeAttribute { size_bits, .. }) => *size_bits,
        // bool
        Some(StabsDescriptor::BuiltIn { .. }) => 8,
        _ => return Ok(false),
    };

    if underlying_size_bits == 0 {
        return Ok(false)
    }
    Ok(field.size_bits != underlying_size_bits)
}

fn member_functions_to_ast(
    ty: &StabsType,
    body: &StabsStructOrUnion,
    state: &StabsToAstState<'_>,
    depth: u32,
) -> Result<Vec<ast::Node>> {
    if state.parser_flags.contains(ParserFlags::NO_MEMBER_FUNCTIONS) {
        return Ok(Vec::new())
    }

    let type_name_no_template_args = ty
        .name
        .as_deref()
        .map(|name| &name[..name.find('<').unwrap_or(name.len())])
        .unwrap_or("");

    if state
        .parser_flags
        .contains(ParserFlags::NO_GENERATED_MEMBER_FUNCTIONS)
    {
        let mut only_special_functions = true;
        'sets: for function_set in &body.member_functions {
            for overload in &function_set.overloads {
                let parameter_count = match &overload.method_type.body {
                    Some(StabsDescriptor::Method {
                        parameter_types, ..
                    }) => parameter_types.len(),
                    Some(StabsDescriptor::Function { .. }) => 0,
                    _ => continue,
                };
                let is_special = function_set.name == "__as"
                    || function_set.name == "operator="
                    || function_set.name.starts_with('$')
                    || (function_set.name == type_name_no_template_args
                        && parameter_count == 0);
                if !is_special {
                    only_special_functions = false;
                    break 'sets;
                }
            }
        }
        if only_special_functions {
            return Ok(Vec::new())
        }
    }

    let mut member_functions = Vec::new();
    let mut only_special_functions = true;

    for function_set in &body.member_functions {
        let info =
            check_member_function(&function_set.name, type_name_no_template_args, &state.demangler);
        if !info.is_special_member_function {
            only_special_functions = false;
        }

        for overload in &function_set.overloads {
            let mut node = stabs_type_to_ast(
                &overload.method_type,
                Some(ty),
                state,
                depth + 1,
                true,
                true,
            )?;
            node.is_constructor_or_destructor = info.is_constructor_or_destructor;
            node.is_special_member_function = info.is_special_member_function;
            node.is_operator_member_function = info.is_operator_member_function;
            node.name = Some(info.name.clone());
            set_access_specifier(&mut node, overload.visibility, state.parser_flags);

            if let ast::NodeKind::Function(function) = &mut node.kind {
                function.modifier = overload.modifier;
                function.vtable_index = overload.vtable_index;
            }

            member_functions.push(node);
        }
    }

    if only_special_functions
        && state
            .parser_flags
            .contains(ParserFlags::NO_GENERATED_MEMBER_FUNCTIONS)
    {
        return Ok(Vec::new())
    }
    Ok(member_functions)
}

fn check_member_function(
    mangled_name: &str,
    type_name_no_template_args: &str,
    demangler: &DemanglerFunctions,
) -> MemberFunctionInfo {
    // Some compiler versions output gcc opnames for overloaded
    // operators instead of their proper names.
    let mut name = String::new();
    let mut is_operator_member_function = false;
    if let Some(demangle_opname) = demangler.cplus_demangle_opname {
        if let Some(demangled) = demangle_opname(mangled_name) {
            name = demangled;
            is_operator_member_function = true;
        }
    }
    if name.is_empty() {
        name = mangled_name.to_owned();
    }

    let mut is_constructor = matches!(name.as_str(), "__ct" | "__comp_ctor" | "__base_ctor");
    if !is_constructor && !type_name_no_template_args.is_empty() {
        // A constructor written out under its own name.
        is_constructor |= name == type_name_no_template_args;
    }

    let mut is_destructor = matches!(
        name.as_str(),
        "__dt" | "__comp_dtor" | "__base_dtor" | "__deleting_dtor"
    );
    if !is_destructor && !name.is_empty() {
        is_destructor |= name.starts_with('~') && name[1..] == *type_name_no_template_args;
    }

    let is_constructor_or_destructor =
        is_constructor || is_destructor || name.starts_with("$_");
    let is_special_member_function = is_constructor_or_destructor || name == "operator=";

    MemberFunctionInfo {
        name,
        is_constructor_or_destructor,
        is_special_member_function,
        is_operator_member_function,
    }
}


/// Recover the types defined by a file's STABS symbols.
///
/// Symbol strings are joined across continuations, parsed, indexed,
/// and lowered in order, one node per symbol. Without
/// [`ParserFlags::STRICT_PARSING`], symbols that fail to parse or
/// lower degrade to [`ast::NodeKind::Error`] nodes in place.
pub fn file_types(
    fd: &SymFileDescriptor,
    file_handle: FileHandle,
    parser_flags: ParserFlags,
    demangler: DemanglerFunctions,
) -> Result<Vec<ast::Node>> {
    enum Entry {
        Symbol(StabsSymbol),
        Failed(String),
    }

    let strict = parser_flags.contains(ParserFlags::STRICT_PARSING);
    let mut entries = Vec::new();
    for string in join_stabs_strings(&fd.symbols) {
        match parse_stabs_symbol(&string) {
            Ok(symbol) => entries.push(Entry::Symbol(symbol)),
            Err(err) if strict => return Err(err),
            Err(err) => {
                warn!("failed to parse STABS symbol: {err}");
                entries.push(Entry::Failed(err.to_string()));
            }
        }
    }

    let index = build_type_index(entries.iter().filter_map(|entry| match entry {
        Entry::Symbol(symbol) => Some(symbol),
        Entry::Failed(_) => None,
    }));
    let state = StabsToAstState::new(file_handle, &index, parser_flags, demangler);

    let mut nodes = Vec::new();
    for entry in &entries {
        let node = match entry {
            Entry::Symbol(symbol) => {
                match stabs_type_to_ast(&symbol.root_type, None, &state, 0, false, false) {
                    Ok(mut node) => {
                        node.name = Some(symbol.name.clone());
                        node
                    }
                    Err(err) if strict => return Err(err),
                    Err(err) => {
                        let mut node = ast::Node::error(err.to_string());
                        node.name = Some(symbol.name.clone());
                        node
                    }
                }
            }
            Entry::Failed(message) => ast::Node::error(message.clone()),
        };
        nodes.push(node);
    }
    Ok(nodes)
}
