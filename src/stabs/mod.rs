//! STABS type string parsing and lowering into the AST.

mod lower;
mod parser;
mod types;

pub use lower::file_types;
pub use lower::stabs_type_to_ast;
pub use lower::StabsToAstState;
pub use parser::join_stabs_strings;
pub use parser::parse_stabs_symbol;
pub use types::build_type_index;
pub use types::StabsBaseClass;
pub use types::StabsDescriptor;
pub use types::StabsField;
pub use types::StabsFieldVisibility;
pub use types::StabsMemberFunction;
pub use types::StabsMemberFunctionSet;
pub use types::StabsStructOrUnion;
pub use types::StabsSymbol;
pub use types::StabsSymbolDescriptor;
pub use types::StabsType;
pub use types::TypeIndex;
pub use types::TypeNumber;
