//! Record layouts of the mdebug symbolic debug section.
//!
//! All records are little-endian and densely packed; they are decoded
//! field by field, never by casting.

use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use crate::util::ReadRaw as _;
use crate::util::Record;


/// The expected magic value of the symbolic header.
pub const MDEBUG_MAGIC: i16 = 0x7009;


/// The 0x60 byte root record of the section, locating all sub-tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolicHeader {
    /* 0x00 */ pub magic: i16,
    /* 0x02 */ pub version_stamp: i16,
    /* 0x04 */ pub line_number_count: i32,
    /* 0x08 */ pub line_numbers_size_bytes: i32,
    /* 0x0c */ pub line_numbers_offset: i32,
    /* 0x10 */ pub dense_numbers_count: i32,
    /* 0x14 */ pub dense_numbers_offset: i32,
    /* 0x18 */ pub procedure_descriptor_count: i32,
    /* 0x1c */ pub procedure_descriptors_offset: i32,
    /* 0x20 */ pub local_symbol_count: i32,
    /* 0x24 */ pub local_symbols_offset: i32,
    /* 0x28 */ pub optimization_symbols_count: i32,
    /* 0x2c */ pub optimization_symbols_offset: i32,
    /* 0x30 */ pub auxiliary_symbol_count: i32,
    /* 0x34 */ pub auxiliary_symbols_offset: i32,
    /* 0x38 */ pub local_strings_size_bytes: i32,
    /* 0x3c */ pub local_strings_offset: i32,
    /* 0x40 */ pub external_strings_size_bytes: i32,
    /* 0x44 */ pub external_strings_offset: i32,
    /* 0x48 */ pub file_descriptor_count: i32,
    /* 0x4c */ pub file_descriptors_offset: i32,
    /* 0x50 */ pub relative_file_descriptor_count: i32,
    /* 0x54 */ pub relative_file_descriptors_offset: i32,
    /* 0x58 */ pub external_symbols_count: i32,
    /* 0x5c */ pub external_symbols_offset: i32,
}

impl Record for SymbolicHeader {
    const SIZE: usize = 0x60;

    fn read(data: &mut &[u8]) -> Option<Self> {
        let header = Self {
            magic: data.read_i16()?,
            version_stamp: data.read_i16()?,
            line_number_count: data.read_i32()?,
            line_numbers_size_bytes: data.read_i32()?,
            line_numbers_offset: data.read_i32()?,
            dense_numbers_count: data.read_i32()?,
            dense_numbers_offset: data.read_i32()?,
            procedure_descriptor_count: data.read_i32()?,
            procedure_descriptors_offset: data.read_i32()?,
            local_symbol_count: data.read_i32()?,
            local_symbols_offset: data.read_i32()?,
            optimization_symbols_count: data.read_i32()?,
            optimization_symbols_offset: data.read_i32()?,
            auxiliary_symbol_count: data.read_i32()?,
            auxiliary_symbols_offset: data.read_i32()?,
            local_strings_size_bytes: data.read_i32()?,
            local_strings_offset: data.read_i32()?,
            external_strings_size_bytes: data.read_i32()?,
            external_strings_offset: data.read_i32()?,
            file_descriptor_count: data.read_i32()?,
            file_descriptors_offset: data.read_i32()?,
            relative_file_descriptor_count: data.read_i32()?,
            relative_file_descriptors_offset: data.read_i32()?,
            external_symbols_count: data.read_i32()?,
            external_symbols_offset: data.read_i32()?,
        };
        Some(header)
    }
}


/// A 0x48 byte record describing one translation unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileDescriptor {
    /* 0x00 */ pub address: u32,
    /* 0x04 */ pub file_path_string_offset: i32,
    /* 0x08 */ pub strings_offset: i32,
    /* 0x0c */ pub cb_ss: i32,
    /* 0x10 */ pub isym_base: i32,
    /* 0x14 */ pub symbol_count: i32,
    /* 0x18 */ pub iline_base: i32,
    /* 0x1c */ pub cline: i32,
    /* 0x20 */ pub iopt_base: i32,
    /* 0x24 */ pub copt: i32,
    /* 0x28 */ pub ipd_first: i16,
    /* 0x2a */ pub cpd: i16,
    /* 0x2c */ pub iaux_base: i32,
    /* 0x30 */ pub caux: i32,
    /* 0x34 */ pub rfd_base: i32,
    /* 0x38 */ pub crfd: i32,
    /// Packed flag word: `lang:5 f_merge:1 f_readin:1 f_big_endian:1
    /// reserved:22`, least significant bits first.
    /* 0x3c */ pub flags: u32,
    /* 0x40 */ pub cb_line_offset: i32,
    /* 0x44 */ pub cb_line: i32,
}

impl FileDescriptor {
    /// The language tag of the unit.
    #[inline]
    pub fn lang(&self) -> u32 {
        self.flags & 0x1f
    }

    /// Whether the unit was merged by the linker.
    #[inline]
    pub fn f_merge(&self) -> u32 {
        (self.flags >> 5) & 1
    }

    /// Whether the unit has been read in already.
    #[inline]
    pub fn f_readin(&self) -> u32 {
        (self.flags >> 6) & 1
    }

    /// Whether the unit's tables are big-endian. Must be zero.
    #[inline]
    pub fn f_big_endian(&self) -> u32 {
        (self.flags >> 7) & 1
    }
}

impl Record for FileDescriptor {
    const SIZE: usize = 0x48;

    fn read(data: &mut &[u8]) -> Option<Self> {
        let descriptor = Self {
            address: data.read_u32()?,
            file_path_string_offset: data.read_i32()?,
            strings_offset: data.read_i32()?,
            cb_ss: data.read_i32()?,
            isym_base: data.read_i32()?,
            symbol_count: data.read_i32()?,
            iline_base: data.read_i32()?,
            cline: data.read_i32()?,
            iopt_base: data.read_i32()?,
            copt: data.read_i32()?,
            ipd_first: data.read_i16()?,
            cpd: data.read_i16()?,
            iaux_base: data.read_i32()?,
            caux: data.read_i32()?,
            rfd_base: data.read_i32()?,
            crfd: data.read_i32()?,
            flags: data.read_u32()?,
            cb_line_offset: data.read_i32()?,
            cb_line: data.read_i32()?,
        };
        Some(descriptor)
    }
}


/// A 0x0c byte local symbol record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocalSymbol {
    /* 0x00 */ pub iss: u32,
    /* 0x04 */ pub value: i32,
    /// Packed word: `st:6 sc:5 reserved:1 index:20`, least significant
    /// bits first.
    /* 0x08 */ pub bits: u32,
}

impl LocalSymbol {
    /// The 6 bit symbol type.
    #[inline]
    pub fn st(&self) -> u32 {
        self.bits & 0x3f
    }

    /// The 5 bit storage class.
    #[inline]
    pub fn sc(&self) -> u32 {
        (self.bits >> 6) & 0x1f
    }

    /// The 20 bit index.
    #[inline]
    pub fn index(&self) -> u32 {
        self.bits >> 12
    }
}

impl Record for LocalSymbol {
    const SIZE: usize = 0x0c;

    fn read(data: &mut &[u8]) -> Option<Self> {
        let symbol = Self {
            iss: data.read_u32()?,
            value: data.read_i32()?,
            bits: data.read_u32()?,
        };
        Some(symbol)
    }
}


/// The symbol type of a local symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum SymbolType {
    Nil = 0,
    Global = 1,
    Static = 2,
    Param = 3,
    Local = 4,
    Label = 5,
    Proc = 6,
    Block = 7,
    End = 8,
    Member = 9,
    Typedef = 10,
    FileSymbol = 11,
    StaticProc = 14,
    Constant = 15,
}

impl SymbolType {
    /// Decode a raw symbol type value, if it is a known one.
    pub fn from_raw(value: u32) -> Option<Self> {
        let parsed = match value {
            0 => Self::Nil,
            1 => Self::Global,
            2 => Self::Static,
            3 => Self::Param,
            4 => Self::Local,
            5 => Self::Label,
            6 => Self::Proc,
            7 => Self::Block,
            8 => Self::End,
            9 => Self::Member,
            10 => Self::Typedef,
            11 => Self::FileSymbol,
            14 => Self::StaticProc,
            15 => Self::Constant,
            _ => return None,
        };
        Some(parsed)
    }
}

impl Display for SymbolType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Nil => "NIL",
            Self::Global => "GLOBAL",
            Self::Static => "STATIC",
            Self::Param => "PARAM",
            Self::Local => "LOCAL",
            Self::Label => "LABEL",
            Self::Proc => "PROC",
            Self::Block => "BLOCK",
            Self::End => "END",
            Self::Member => "MEMBER",
            Self::Typedef => "TYPEDEF",
            Self::FileSymbol => "FILE_SYMBOL",
            Self::StaticProc => "STATICPROC",
            Self::Constant => "CONSTANT",
        };
        f.write_str(name)
    }
}


/// The storage class of a local symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum SymbolClass {
    Nil = 0,
    Text = 1,
    Data = 2,
    Bss = 3,
    Register = 4,
    Abs = 5,
    Undefined = 6,
    Local = 7,
    Bits = 8,
    Dbx = 9,
    RegImage = 10,
    Info = 11,
    UserStruct = 12,
    SData = 13,
    SBss = 14,
    RData = 15,
    Var = 16,
    Common = 17,
    SCommon = 18,
    VarRegister = 19,
    Variant = 20,
    SUndefined = 21,
    Init = 22,
    BasedVar = 23,
    XData = 24,
    PData = 25,
    Fini = 26,
    NonGp = 27,
}

impl SymbolClass {
    /// Decode a raw storage class value, if it is a known one.
    pub fn from_raw(value: u32) -> Option<Self> {
        let parsed = match value {
            0 => Self::Nil,
            1 => Self::Text,
            2 => Self::Data,
            3 => Self::Bss,
            4 => Self::Register,
            5 => Self::Abs,
            6 => Self::Undefined,
            7 => Self::Local,
            8 => Self::Bits,
            9 => Self::Dbx,
            10 => Self::RegImage,
            11 => Self::Info,
            12 => Self::UserStruct,
            13 => Self::SData,
            14 => Self::SBss,
            15 => Self::RData,
            16 => Self::Var,
            17 => Self::Common,
            18 => Self::SCommon,
            19 => Self::VarRegister,
            20 => Self::Variant,
            21 => Self::SUndefined,
            22 => Self::Init,
            23 => Self::BasedVar,
            24 => Self::XData,
            25 => Self::PData,
            26 => Self::Fini,
            27 => Self::NonGp,
            _ => return None,
        };
        Some(parsed)
    }
}

impl Display for SymbolClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Nil => "NIL",
            Self::Text => "TEXT",
            Self::Data => "DATA",
            Self::Bss => "BSS",
            Self::Register => "REGISTER",
            Self::Abs => "ABS",
            Self::Undefined => "UNDEFINED",
            Self::Local => "LOCAL",
            Self::Bits => "BITS",
            Self::Dbx => "DBX",
            Self::RegImage => "REG_IMAGE",
            Self::Info => "INFO",
            Self::UserStruct => "USER_STRUCT",
            Self::SData => "SDATA",
            Self::SBss => "SBSS",
            Self::RData => "RDATA",
            Self::Var => "VAR",
            Self::Common => "COMMON",
            Self::SCommon => "SCOMMON",
            Self::VarRegister => "VAR_REGISTER",
            Self::Variant => "VARIANT",
            Self::SUndefined => "SUNDEFINED",
            Self::Init => "INIT",
            Self::BasedVar => "BASED_VAR",
            Self::XData => "XDATA",
            Self::PData => "PDATA",
            Self::Fini => "FINI",
            Self::NonGp => "NONGP",
        };
        f.write_str(name)
    }
}


/// The source language of a translation unit, guessed from its path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceLanguage {
    C,
    Cpp,
    Assembly,
    #[default]
    Unknown,
}
