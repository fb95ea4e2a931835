//! Parser for STABS symbol strings.
//!
//! A symbol string has the shape `name:Dtype` where `D` is a symbol
//! descriptor character and `type` is a recursive type expression:
//! an optional type number, optionally followed by `=` and a
//! descriptor body. See <https://sourceware.org/gdb/onlinedocs/stabs.html>
//! for the family of encodings; the sub-grammars recognized here are
//! the ones emitted by the MIPS toolchains this crate targets.

use nom::bytes::complete::tag;
use nom::bytes::complete::take_while;
use nom::character::complete::anychar;
use nom::character::complete::char;
use nom::character::complete::digit1;
use nom::character::complete::one_of;
use nom::combinator::fail;
use nom::combinator::map;
use nom::combinator::opt;
use nom::combinator::recognize;
use nom::error::context;
use nom::error::convert_error;
use nom::error::VerboseError;
use nom::sequence::delimited;
use nom::sequence::pair;
use nom::sequence::preceded;
use nom::sequence::separated_pair;
use nom::IResult;

use crate::ast::ForwardDeclaredKind;
use crate::ast::MemberFunctionModifier;
use crate::error::Error;
use crate::error::ErrorKind;
use crate::error::Result;
use crate::mdebug::Symbol;

use super::types::StabsBaseClass;
use super::types::StabsDescriptor;
use super::types::StabsField;
use super::types::StabsFieldVisibility;
use super::types::StabsMemberFunction;
use super::types::StabsMemberFunctionSet;
use super::types::StabsStructOrUnion;
use super::types::StabsSymbol;
use super::types::StabsSymbolDescriptor;
use super::types::StabsType;
use super::types::TypeNumber;


type Input<'a> = &'a str;
type PResult<'a, T> = IResult<Input<'a>, T, VerboseError<Input<'a>>>;


fn convert_nom_error(input: &str, err: nom::Err<VerboseError<&str>>) -> Error {
    match err {
        nom::Err::Incomplete(_) => Error::new(
            ErrorKind::ParseError,
            "got incomplete STABS string, additional bytes are necessary to parse",
        ),
        nom::Err::Error(err) | nom::Err::Failure(err) => {
            Error::new(ErrorKind::ParseError, convert_error(input, err))
        }
    }
}


fn is_identifier_char(c: char) -> bool {
    // Everything printable goes, except the delimiters. Spaces are
    // valid: GCC names anonymous enums " ".
    matches!(c, ' '..='~') && c != ':' && c != ';'
}

fn identifier(input: Input) -> PResult<'_, &str> {
    take_while(is_identifier_char)(input)
}

fn number_literal(input: Input) -> PResult<'_, &str> {
    recognize(pair(opt(char('-')), digit1))(input)
}

/// Parse a number; values too large for an `i64` collapse to zero.
fn number(input: Input) -> PResult<'_, i64> {
    map(number_literal, |value: &str| {
        value.parse::<i64>().unwrap_or(0)
    })(input)
}

fn type_number(input: Input) -> PResult<'_, TypeNumber> {
    if input.starts_with('(') {
        map(
            delimited(
                char('('),
                separated_pair(number, char(','), number),
                char(')'),
            ),
            |(file, type_index)| TypeNumber::new(file as i32, type_index as i32),
        )(input)
    } else {
        map(number, |type_index| TypeNumber::bare(type_index as i32))(input)
    }
}

fn visibility(input: Input) -> PResult<'_, StabsFieldVisibility> {
    map(one_of("0129"), |c| match c {
        '0' => StabsFieldVisibility::Private,
        '1' => StabsFieldVisibility::Protected,
        '2' => StabsFieldVisibility::Public,
        _ => StabsFieldVisibility::PublicOptimizedOut,
    })(input)
}


fn parse_type(input: Input) -> PResult<'_, StabsType> {
    match input.chars().next() {
        Some(c) if c.is_ascii_digit() || c == '(' => {
            let (input, number) = type_number(input)?;
            match input.strip_prefix('=') {
                Some(rest) => {
                    let (rest, body) = type_body(rest)?;
                    let parsed = StabsType {
                        type_number: Some(number),
                        name: None,
                        is_root: false,
                        body: Some(body),
                    };
                    Ok((rest, parsed))
                }
                None => Ok((input, StabsType::reference(number))),
            }
        }
        Some(_) => {
            let (rest, body) = type_body(input)?;
            let parsed = StabsType {
                type_number: None,
                name: None,
                is_root: false,
                body: Some(body),
            };
            Ok((rest, parsed))
        }
        None => context("type", fail)(input),
    }
}

fn type_body(input: Input) -> PResult<'_, StabsDescriptor> {
    let c = match input.chars().next() {
        Some(c) => c,
        None => return context("type descriptor", fail)(input),
    };
    if c.is_ascii_digit() || c == '(' {
        let (rest, inner) = parse_type(input)?;
        return Ok((rest, StabsDescriptor::TypeReference(Box::new(inner))))
    }

    let rest = &input[c.len_utf8()..];
    match c {
        'a' => context("array", array_body)(rest),
        'e' => context("enum", enum_body)(rest),
        'f' => {
            let (rest, return_type) = parse_type(rest)?;
            Ok((
                rest,
                StabsDescriptor::Function {
                    return_type: Box::new(return_type),
                },
            ))
        }
        'B' => {
            let (rest, inner) = parse_type(rest)?;
            Ok((
                rest,
                StabsDescriptor::VolatileQualifier {
                    inner: Box::new(inner),
                },
            ))
        }
        'k' => {
            let (rest, inner) = parse_type(rest)?;
            Ok((
                rest,
                StabsDescriptor::ConstQualifier {
                    inner: Box::new(inner),
                },
            ))
        }
        'r' => context("range", range_body)(rest),
        's' => context("struct", |input| struct_or_union_body(input, true))(rest),
        'u' => context("union", |input| struct_or_union_body(input, false))(rest),
        'x' => context("cross reference", cross_reference_body)(rest),
        'R' => context("floating point built-in", floating_point_body)(rest),
        '#' => context("method", method_body)(rest),
        '*' => {
            let (rest, value_type) = parse_type(rest)?;
            Ok((
                rest,
                StabsDescriptor::Pointer {
                    value_type: Box::new(value_type),
                },
            ))
        }
        '&' => {
            let (rest, value_type) = parse_type(rest)?;
            Ok((
                rest,
                StabsDescriptor::Reference {
                    value_type: Box::new(value_type),
                },
            ))
        }
        '@' => context("type attribute", attribute_body)(rest),
        '-' => context("built-in", builtin_body)(rest),
        _ => context("type descriptor", fail)(input),
    }
}

fn array_body(input: Input) -> PResult<'_, StabsDescriptor> {
    let (input, index_type) = parse_type(input)?;
    let (input, element_type) = parse_type(input)?;
    Ok((
        input,
        StabsDescriptor::Array {
            index_type: Box::new(index_type),
            element_type: Box::new(element_type),
        },
    ))
}

fn enum_body(mut input: Input) -> PResult<'_, StabsDescriptor> {
    let mut fields = Vec::new();
    loop {
        if let Some(rest) = input.strip_prefix(';') {
            return Ok((rest, StabsDescriptor::Enum { fields }))
        }
        let (rest, name) = identifier(input)?;
        let (rest, _) = char(':')(rest)?;
        let (rest, value) = number(rest)?;
        let (rest, _) = char(',')(rest)?;
        fields.push((name.to_owned(), value));
        input = rest;
    }
}

fn range_body(input: Input) -> PResult<'_, StabsDescriptor> {
    let (input, value_type) = parse_type(input)?;
    let (input, _) = char(';')(input)?;
    let (input, low) = number_literal(input)?;
    let (input, _) = char(';')(input)?;
    let (input, high) = number_literal(input)?;
    let (input, _) = char(';')(input)?;
    Ok((
        input,
        StabsDescriptor::Range {
            value_type: Box::new(value_type),
            low: low.to_owned(),
            high: high.to_owned(),
        },
    ))
}

fn base_classes(input: Input) -> PResult<'_, Vec<StabsBaseClass>> {
    let rest = match input.strip_prefix('!') {
        Some(rest) => rest,
        None => return Ok((input, Vec::new())),
    };
    let (rest, count) = number(rest)?;
    let (mut rest, _) = char(',')(rest)?;
    let mut bases = Vec::new();
    for _ in 0..count {
        let (r, virtual_flag) = anychar(rest)?;
        let (r, vis) = visibility(r)?;
        let (r, offset) = number(r)?;
        let (r, _) = char(',')(r)?;
        let (r, base_type) = parse_type(r)?;
        let (r, _) = char(';')(r)?;
        bases.push(StabsBaseClass {
            is_virtual: virtual_flag == '1',
            visibility: vis,
            offset,
            base_type,
        });
        rest = r;
    }
    Ok((rest, bases))
}

fn field_list(mut input: Input) -> PResult<'_, Vec<StabsField>> {
    let mut fields = Vec::new();
    loop {
        if let Some(rest) = input.strip_prefix(';') {
            return Ok((rest, fields))
        }
        if input.is_empty() {
            return Ok((input, fields))
        }

        let before_field = input;
        let (rest, name) = identifier(input)?;
        let (rest, _) = char(':')(rest)?;
        let (rest, vis) = opt(preceded(char('/'), visibility))(rest)?;
        let vis = vis.unwrap_or_default();

        // A second ':' means this is no field at all but the start of
        // the member function list, whose entries begin `name::`.
        if rest.starts_with(':') {
            return Ok((before_field, fields))
        }

        let (rest, field_type) = parse_type(rest)?;
        let (rest, field) = if name.starts_with('$') {
            // Compiler generated members such as `$vf` carry only an
            // offset.
            let (rest, _) = char(',')(rest)?;
            let (rest, offset_bits) = number(rest)?;
            let (rest, _) = char(';')(rest)?;
            let field = StabsField {
                name: name.to_owned(),
                field_type,
                offset_bits,
                size_bits: 0,
                is_static: false,
                visibility: vis,
            };
            (rest, field)
        } else if let Some(rest) = rest.strip_prefix(':') {
            // A static member; the trailing identifier is its mangled
            // global name.
            let (rest, _mangled) = identifier(rest)?;
            let (rest, _) = char(';')(rest)?;
            let field = StabsField {
                name: name.to_owned(),
                field_type,
                offset_bits: 0,
                size_bits: 0,
                is_static: true,
                visibility: vis,
            };
            (rest, field)
        } else {
            let (rest, _) = char(',')(rest)?;
            let (rest, offset_bits) = number(rest)?;
            let (rest, _) = char(',')(rest)?;
            let (rest, size_bits) = number(rest)?;
            let (rest, _) = char(';')(rest)?;
            let field = StabsField {
                name: name.to_owned(),
                field_type,
                offset_bits,
                size_bits,
                is_static: false,
                visibility: vis,
            };
            (rest, field)
        };
        fields.push(field);
        input = rest;
    }
}

fn member_function_overloads(mut input: Input) -> PResult<'_, Vec<StabsMemberFunction>> {
    let mut overloads = Vec::new();
    loop {
        if let Some(rest) = input.strip_prefix(';') {
            return Ok((rest, overloads))
        }
        if input.is_empty() {
            return Ok((input, overloads))
        }
        let (rest, method_type) = parse_type(input)?;
        let (rest, _) = char(':')(rest)?;
        let (rest, _mangled) = identifier(rest)?;
        let (rest, _) = char(';')(rest)?;
        let (rest, vis) = visibility(rest)?;
        let (rest, modifier_char) = one_of("ABCD?.")(rest)?;
        let (is_const, is_volatile) = match modifier_char {
            'A' => (false, false),
            'B' => (true, false),
            'C' => (false, true),
            'D' => (true, true),
            _ => (false, false),
        };
        let (rest, kind) = one_of("*?.")(rest)?;
        let (rest, modifier, vtable_index) = match kind {
            '*' => {
                // A virtual function: vtable index and the type whose
                // vtable it goes through.
                let (rest, index) = number(rest)?;
                let (rest, _) = char(';')(rest)?;
                let (rest, _) = parse_type(rest)?;
                let (rest, _) = char(';')(rest)?;
                (rest, MemberFunctionModifier::Virtual, Some(index))
            }
            '?' => (rest, MemberFunctionModifier::Static, None),
            _ => (rest, MemberFunctionModifier::None, None),
        };
        overloads.push(StabsMemberFunction {
            method_type,
            visibility: vis,
            modifier,
            is_const,
            is_volatile,
            vtable_index,
        });
        input = rest;
    }
}

fn member_function_sets(mut input: Input) -> PResult<'_, Vec<StabsMemberFunctionSet>> {
    // A ',' here belongs to an enclosing descriptor; there is no
    // member function list.
    if input.starts_with(',') {
        return Ok((input, Vec::new()))
    }
    let mut sets = Vec::new();
    loop {
        if let Some(rest) = input.strip_prefix(';') {
            return Ok((rest, sets))
        }
        if input.is_empty() {
            return Ok((input, sets))
        }
        let (rest, name) = identifier(input)?;
        let (rest, _) = tag("::")(rest)?;
        let (rest, overloads) = member_function_overloads(rest)?;
        sets.push(StabsMemberFunctionSet {
            name: name.to_owned(),
            overloads,
        });
        input = rest;
    }
}

/// Skip the `~%type;` first-base-class marker g++ appends to
/// polymorphic types.
fn vtable_marker(input: Input) -> PResult<'_, ()> {
    match input.strip_prefix("~%") {
        Some(rest) => {
            let (rest, _) = parse_type(rest)?;
            let (rest, _) = opt(char(';'))(rest)?;
            Ok((rest, ()))
        }
        None => Ok((input, ())),
    }
}

fn struct_or_union_body(input: Input, is_struct: bool) -> PResult<'_, StabsDescriptor> {
    let (input, size_bytes) = number(input)?;
    let (input, base_classes) = if is_struct {
        base_classes(input)?
    } else {
        (input, Vec::new())
    };
    let (input, fields) = field_list(input)?;
    let (input, member_functions) = member_function_sets(input)?;
    let (input, ()) = vtable_marker(input)?;
    let body = StabsStructOrUnion {
        size_bytes,
        base_classes,
        fields,
        member_functions,
    };
    let descriptor = if is_struct {
        StabsDescriptor::Struct(body)
    } else {
        StabsDescriptor::Union(body)
    };
    Ok((input, descriptor))
}

fn cross_reference_body(input: Input) -> PResult<'_, StabsDescriptor> {
    let (input, kind) = one_of("sue")(input)?;
    let kind = match kind {
        's' => ForwardDeclaredKind::Struct,
        'u' => ForwardDeclaredKind::Union,
        _ => ForwardDeclaredKind::Enum,
    };
    let (input, identifier) = identifier(input)?;
    let (input, _) = char(':')(input)?;
    Ok((
        input,
        StabsDescriptor::CrossReference {
            kind,
            identifier: identifier.to_owned(),
        },
    ))
}

fn floating_point_body(input: Input) -> PResult<'_, StabsDescriptor> {
    let (input, fpclass) = number(input)?;
    let (input, _) = char(';')(input)?;
    let (input, size_bytes) = number(input)?;
    let (input, _) = opt(char(';'))(input)?;
    Ok((input, StabsDescriptor::FloatingPointBuiltIn { fpclass, size_bytes }))
}

fn method_body(input: Input) -> PResult<'_, StabsDescriptor> {
    // `##` is the short form carrying only a return type.
    if let Some(rest) = input.strip_prefix('#') {
        let (rest, return_type) = parse_type(rest)?;
        let (rest, _) = char(';')(rest)?;
        return Ok((
            rest,
            StabsDescriptor::Method {
                class_type: None,
                return_type: Box::new(return_type),
                parameter_types: Vec::new(),
            },
        ))
    }

    let (input, class_type) = parse_type(input)?;
    let (input, _) = char(',')(input)?;
    let (mut input, return_type) = parse_type(input)?;
    let mut parameter_types = Vec::new();
    loop {
        if let Some(rest) = input.strip_prefix(';') {
            input = rest;
            break
        }
        let (rest, _) = char(',')(input)?;
        let (rest, parameter) = parse_type(rest)?;
        parameter_types.push(parameter);
        input = rest;
    }
    Ok((
        input,
        StabsDescriptor::Method {
            class_type: Some(Box::new(class_type)),
            return_type: Box::new(return_type),
            parameter_types,
        },
    ))
}

fn attribute_body(input: Input) -> PResult<'_, StabsDescriptor> {
    match input.chars().next() {
        Some(c) if c.is_ascii_digit() || c == '(' => {
            let (input, class_type) = parse_type(input)?;
            let (input, _) = char(',')(input)?;
            let (input, member_type) = parse_type(input)?;
            Ok((
                input,
                StabsDescriptor::PointerToDataMember {
                    class_type: Box::new(class_type),
                    member_type: Box::new(member_type),
                },
            ))
        }
        Some('s') => {
            let (input, _) = char('s')(input)?;
            let (input, size_bits) = number(input)?;
            let (input, _) = char(';')(input)?;
            let (input, inner) = parse_type(input)?;
            Ok((
                input,
                StabsDescriptor::TypeAttribute {
                    size_bits,
                    inner: Box::new(inner),
                },
            ))
        }
        _ => context("type attribute", fail)(input),
    }
}

fn builtin_body(input: Input) -> PResult<'_, StabsDescriptor> {
    let (input, type_id) = number(input)?;
    let (input, _) = opt(char(';'))(input)?;
    Ok((input, StabsDescriptor::BuiltIn { type_id }))
}

fn symbol_descriptor(input: Input) -> PResult<'_, StabsSymbolDescriptor> {
    let c = match input.chars().next() {
        Some(c) => c,
        None => return context("symbol descriptor", fail)(input),
    };
    if c.is_ascii_digit() || c == '(' {
        return Ok((input, StabsSymbolDescriptor::LocalVariable))
    }
    let descriptor = match c {
        'a' => StabsSymbolDescriptor::ReferenceParameter,
        'f' => StabsSymbolDescriptor::LocalFunction,
        'F' => StabsSymbolDescriptor::GlobalFunction,
        'G' => StabsSymbolDescriptor::GlobalVariable,
        'P' => StabsSymbolDescriptor::RegisterParameter,
        'p' => StabsSymbolDescriptor::ValueParameter,
        'r' => StabsSymbolDescriptor::RegisterVariable,
        'S' => StabsSymbolDescriptor::StaticGlobalVariable,
        't' => StabsSymbolDescriptor::TypeName,
        'T' => StabsSymbolDescriptor::EnumStructOrTypeTag,
        'V' => StabsSymbolDescriptor::StaticLocalVariable,
        _ => return context("symbol descriptor", fail)(input),
    };
    Ok((&input[c.len_utf8()..], descriptor))
}

fn stabs_symbol(input: Input) -> PResult<'_, StabsSymbol> {
    let (input, name) = identifier(input)?;
    let (input, _) = char(':')(input)?;
    let (input, descriptor) = symbol_descriptor(input)?;
    // `Tt` marks a tag that doubles as a typedef.
    let (input, _) = opt(char('t'))(input)?;
    let (input, mut root_type) = parse_type(input)?;
    root_type.is_root = true;
    if matches!(
        descriptor,
        StabsSymbolDescriptor::TypeName | StabsSymbolDescriptor::EnumStructOrTypeTag
    ) {
        root_type.name = Some(name.to_owned());
    }
    Ok((
        input,
        StabsSymbol {
            name: name.to_owned(),
            descriptor,
            root_type,
        },
    ))
}


/// Parse a single STABS symbol string.
pub fn parse_stabs_symbol(string: &str) -> Result<StabsSymbol> {
    match stabs_symbol(string) {
        Ok((_rest, symbol)) => Ok(symbol),
        Err(err) => Err(convert_nom_error(string, err)),
    }
}

/// Collect the STABS strings of a file's local symbols.
///
/// Only symbols of NIL type with storage class zero carry STABS data.
/// A trailing `\` continues a string into the next symbol; an empty
/// string resets any pending continuation; strings starting with `$`
/// are internal markers and are skipped.
pub fn join_stabs_strings(symbols: &[Symbol]) -> Vec<String> {
    let mut joined = Vec::new();
    let mut prefix = String::new();
    for symbol in symbols {
        if !symbol.is_stabs() {
            continue
        }
        if symbol.string.is_empty() {
            prefix.clear();
            continue
        }
        if let Some(stripped) = symbol.string.strip_suffix('\\') {
            prefix.push_str(stripped);
            continue
        }

        let mut full = std::mem::take(&mut prefix);
        full.push_str(&symbol.string);
        if full.starts_with('$') {
            continue
        }
        joined.push(full);
    }
    joined
}


#[cfg(test)]
mod tests {
    use super::*;


    fn parse(string: &str) -> StabsSymbol {
        parse_stabs_symbol(string).unwrap()
    }

    /// Check the typical `int` typedef.
    #[test]
    fn int_typedef() {
        let symbol = parse("int:t1=r1;-2147483648;2147483647;");
        assert_eq!(symbol.name, "int");
        assert_eq!(symbol.descriptor, StabsSymbolDescriptor::TypeName);
        let root = &symbol.root_type;
        assert!(root.is_root);
        assert_eq!(root.name.as_deref(), Some("int"));
        assert_eq!(root.type_number, Some(TypeNumber::bare(1)));
        match root.body.as_ref().unwrap() {
            StabsDescriptor::Range {
                value_type,
                low,
                high,
            } => {
                assert_eq!(value_type.type_number, Some(TypeNumber::bare(1)));
                assert!(!value_type.has_body());
                assert_eq!(low, "-2147483648");
                assert_eq!(high, "2147483647");
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    /// Check enum parsing and constant order.
    #[test]
    fn enum_constants() {
        let symbol = parse("Color:t5=eRED:0,BLUE:2,GREEN:1,;");
        match symbol.root_type.body.as_ref().unwrap() {
            StabsDescriptor::Enum { fields } => {
                let expected = vec![
                    ("RED".to_string(), 0),
                    ("BLUE".to_string(), 2),
                    ("GREEN".to_string(), 1),
                ];
                assert_eq!(*fields, expected);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    /// Check two-part type numbers and struct fields.
    #[test]
    fn struct_fields() {
        let symbol = parse("Vec2:T(1,19)=s8x:(0,1),0,32;y:(0,1),32,32;;");
        assert_eq!(
            symbol.descriptor,
            StabsSymbolDescriptor::EnumStructOrTypeTag
        );
        assert_eq!(symbol.root_type.type_number, Some(TypeNumber::new(1, 19)));
        match symbol.root_type.body.as_ref().unwrap() {
            StabsDescriptor::Struct(body) => {
                assert_eq!(body.size_bytes, 8);
                assert_eq!(body.fields.len(), 2);
                assert_eq!(body.fields[0].name, "x");
                assert_eq!(body.fields[0].offset_bits, 0);
                assert_eq!(body.fields[0].size_bits, 32);
                assert_eq!(body.fields[1].name, "y");
                assert_eq!(body.fields[1].offset_bits, 32);
                assert!(body.member_functions.is_empty());
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    /// Check base class parsing.
    #[test]
    fn base_class() {
        let symbol = parse("Derived:Tt(1,30)=s12!1,020,(1,19);z:(0,1),64,32;;");
        match symbol.root_type.body.as_ref().unwrap() {
            StabsDescriptor::Struct(body) => {
                assert_eq!(body.base_classes.len(), 1);
                let base = &body.base_classes[0];
                assert!(!base.is_virtual);
                assert_eq!(base.visibility, StabsFieldVisibility::Public);
                assert_eq!(base.offset, 0);
                assert_eq!(base.base_type.type_number, Some(TypeNumber::new(1, 19)));
                assert_eq!(body.fields.len(), 1);
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    /// Check member function sets, including a virtual overload and a
    /// vtable pointer field.
    #[test]
    fn member_functions() {
        let symbol = parse(
            "Shape:Tt(1,60)=s4$vf0:(1,61),0;draw::#(1,60),(0,2);:draw__5Shape;2A*0;(1,60);;;",
        );
        let body = match symbol.root_type.body.as_ref().unwrap() {
            StabsDescriptor::Struct(body) => body,
            other => panic!("unexpected body {other:?}"),
        };

        assert_eq!(body.fields.len(), 1);
        assert_eq!(body.fields[0].name, "$vf0");
        assert_eq!(body.fields[0].offset_bits, 0);
        assert_eq!(body.fields[0].size_bits, 0);

        assert_eq!(body.member_functions.len(), 1);
        let set = &body.member_functions[0];
        assert_eq!(set.name, "draw");
        assert_eq!(set.overloads.len(), 1);
        let overload = &set.overloads[0];
        assert_eq!(overload.visibility, StabsFieldVisibility::Public);
        assert_eq!(overload.modifier, MemberFunctionModifier::Virtual);
        assert_eq!(overload.vtable_index, Some(0));
        assert!(!overload.is_const);
        match overload.method_type.body.as_ref().unwrap() {
            StabsDescriptor::Method {
                class_type,
                parameter_types,
                ..
            } => {
                assert!(class_type.is_some());
                assert!(parameter_types.is_empty());
            }
            other => panic!("unexpected method body {other:?}"),
        }
    }

    /// Check static members and overload modifier letters.
    #[test]
    fn static_member_and_const_method() {
        let symbol = parse(
            "Obj:Tt(1,50)=s8count:(0,1):_5countE;n:(0,1),0,32;get::#(1,50),(0,1);:get__3Obj;2B.;;",
        );
        let body = match symbol.root_type.body.as_ref().unwrap() {
            StabsDescriptor::Struct(body) => body,
            other => panic!("unexpected body {other:?}"),
        };
        assert_eq!(body.fields.len(), 2);
        assert!(body.fields[0].is_static);
        assert_eq!(body.fields[0].name, "count");
        assert!(!body.fields[1].is_static);

        let overload = &body.member_functions[0].overloads[0];
        assert!(overload.is_const);
        assert!(!overload.is_volatile);
        assert_eq!(overload.modifier, MemberFunctionModifier::None);
    }

    /// Check field visibility markers.
    #[test]
    fn field_visibility() {
        let symbol = parse("Priv:Tt(1,70)=s8a:/0(0,1),0,32;b:/1(0,1),32,32;;");
        let body = match symbol.root_type.body.as_ref().unwrap() {
            StabsDescriptor::Struct(body) => body,
            other => panic!("unexpected body {other:?}"),
        };
        assert_eq!(body.fields[0].visibility, StabsFieldVisibility::Private);
        assert_eq!(body.fields[1].visibility, StabsFieldVisibility::Protected);
    }

    /// Check unions, cross references, pointers, and functions.
    #[test]
    fn assorted_descriptors() {
        let symbol = parse("Blob:t21=u4raw:(0,1),0,32;cooked:(0,2),0,32;;");
        assert!(matches!(
            symbol.root_type.body,
            Some(StabsDescriptor::Union(_))
        ));

        let symbol = parse("FooRef:t10=xsFoo:");
        match symbol.root_type.body.as_ref().unwrap() {
            StabsDescriptor::CrossReference { kind, identifier } => {
                assert_eq!(*kind, ForwardDeclaredKind::Struct);
                assert_eq!(identifier, "Foo");
            }
            other => panic!("unexpected body {other:?}"),
        }

        let symbol = parse("ptr:t20=*(0,1)");
        assert!(matches!(
            symbol.root_type.body,
            Some(StabsDescriptor::Pointer { .. })
        ));

        let symbol = parse("callback:t40=f(0,1)");
        assert!(matches!(
            symbol.root_type.body,
            Some(StabsDescriptor::Function { .. })
        ));

        let symbol = parse("qualified:t41=Bk(0,1)");
        match symbol.root_type.body.as_ref().unwrap() {
            StabsDescriptor::VolatileQualifier { inner } => {
                assert!(matches!(
                    inner.body,
                    Some(StabsDescriptor::ConstQualifier { .. })
                ));
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    /// Check the bool built-in, floating point built-ins, size
    /// attributes, and pointers to data members.
    #[test]
    fn builtins_and_attributes() {
        let symbol = parse("bool:t16=-16;");
        assert_eq!(
            symbol.root_type.body,
            Some(StabsDescriptor::BuiltIn { type_id: 16 })
        );

        let symbol = parse("float:t14=R1;4;");
        assert_eq!(
            symbol.root_type.body,
            Some(StabsDescriptor::FloatingPointBuiltIn {
                fpclass: 1,
                size_bytes: 4,
            })
        );

        let symbol = parse("short_attr:t30=@s16;(0,1)");
        match symbol.root_type.body.as_ref().unwrap() {
            StabsDescriptor::TypeAttribute { size_bits, inner } => {
                assert_eq!(*size_bits, 16);
                assert_eq!(inner.type_number, Some(TypeNumber::new(0, 1)));
            }
            other => panic!("unexpected body {other:?}"),
        }

        let symbol = parse("member_ptr:t32=@(1,19),(0,1)");
        assert!(matches!(
            symbol.root_type.body,
            Some(StabsDescriptor::PointerToDataMember { .. })
        ));
    }

    /// Check the void-style self reference.
    #[test]
    fn self_reference() {
        let symbol = parse("void:t(0,2)=(0,2)");
        match symbol.root_type.body.as_ref().unwrap() {
            StabsDescriptor::TypeReference(inner) => {
                assert_eq!(inner.type_number, Some(TypeNumber::new(0, 2)));
                assert!(!inner.has_body());
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    /// Check that unknown descriptors are parse errors, not panics.
    #[test]
    fn bad_input() {
        let err = parse_stabs_symbol("broken:t1=q123").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);

        let err = parse_stabs_symbol("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);

        let err = parse_stabs_symbol("x:Z1").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseError);
    }

    fn stabs_entry(string: &str) -> Symbol {
        Symbol {
            string: string.to_string(),
            ..Default::default()
        }
    }

    /// Check continuation joining, `$` skipping, and the reset on
    /// empty strings.
    #[test]
    fn continuation_joining() {
        let mut other = stabs_entry("ignored");
        other.storage_type = 6;

        let symbols = vec![
            stabs_entry("Vec2:T(1,19)=s8x:(0,1),0,32;\\"),
            other,
            stabs_entry("y:(0,1),32,32;;"),
            stabs_entry("$LM1"),
            stabs_entry("half:\\"),
            stabs_entry(""),
            stabs_entry("int:t1=r1;-2147483648;2147483647;"),
        ];
        let joined = join_stabs_strings(&symbols);
        let expected = vec![
            "Vec2:T(1,19)=s8x:(0,1),0,32;y:(0,1),32,32;;".to_string(),
            "int:t1=r1;-2147483648;2147483647;".to_string(),
        ];
        assert_eq!(joined, expected);

        let symbol = parse(&joined[0]);
        match symbol.root_type.body.as_ref().unwrap() {
            StabsDescriptor::Struct(body) => assert_eq!(body.fields.len(), 2),
            other => panic!("unexpected body {other:?}"),
        }
    }
}
