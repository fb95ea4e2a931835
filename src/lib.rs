// A library recovering C and C++ type information from the mdebug
// debug section of 32-bit little-endian MIPS executables.
//
// The mdebug section stores STABS type strings in its local symbol
// table. This crate decodes the section's tables into per translation
// unit views, parses the STABS strings into a type graph, and lowers
// that graph into an owned AST suitable for further analysis or
// header-style output.
#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]

use bitflags::bitflags;

pub mod ast;
mod error;
mod log;
pub mod mdebug;
pub mod stabs;
mod util;

pub use crate::error::Error;
pub use crate::error::ErrorExt;
pub use crate::error::ErrorKind;
pub use crate::error::IntoCowStr;
pub use crate::error::IntoError;
pub use crate::error::Result;


bitflags! {
    /// Flags tweaking parsing and lowering behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct ParserFlags: u32 {
        /// Propagate every error to the caller instead of degrading
        /// affected subtrees to error nodes.
        const STRICT_PARSING = 1 << 0;
        /// Do not emit member functions at all.
        const NO_MEMBER_FUNCTIONS = 1 << 1;
        /// Do not emit compiler generated member functions such as
        /// implicit constructors and assignment operators.
        const NO_GENERATED_MEMBER_FUNCTIONS = 1 << 2;
    }
}

impl Default for ParserFlags {
    fn default() -> Self {
        Self::empty()
    }
}


/// An identifier of a translation unit, opaque to this crate.
///
/// It is stored verbatim inside unresolved type names so a later pass
/// can resolve references across files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FileHandle(pub u32);


/// Optional demangling callbacks supplied by the caller.
///
/// Everything works without them; they improve recovered member
/// function names where compilers emitted gcc opnames.
#[derive(Clone, Copy, Debug, Default)]
pub struct DemanglerFunctions {
    /// Demangle an operator name such as `__eq`, returning `None` if
    /// the input is not an opname.
    pub cplus_demangle_opname: Option<fn(&str) -> Option<String>>,
}
