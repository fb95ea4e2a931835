//! Support for the ECOFF "mdebug" symbolic debug section of 32-bit
//! little-endian MIPS executables.

mod parser;
mod types;

pub use parser::parse_symbol_table;
pub use parser::MdebugSection;
pub use parser::SymFileDescriptor;
pub use parser::Symbol;
pub use parser::SymbolTable;
pub use types::FileDescriptor;
pub use types::LocalSymbol;
pub use types::SourceLanguage;
pub use types::SymbolClass;
pub use types::SymbolType;
pub use types::SymbolicHeader;
pub use types::MDEBUG_MAGIC;
