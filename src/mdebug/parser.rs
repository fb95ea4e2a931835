//! Reader for the mdebug symbolic debug section.
//!
//! The section starts with a symbolic header locating a set of
//! sub-tables by absolute file offset. Of those, the file descriptor,
//! local symbol, and local string tables are decoded here into per
//! translation unit views; the remaining tables (line numbers,
//! procedure descriptors, auxiliary, optimization, and external
//! symbols) keep their offsets in the header but are not interpreted.

use crate::error::Error;
use crate::error::ErrorExt as _;
use crate::error::ErrorKind;
use crate::error::Result;
use crate::log::debug;
use crate::util::read_cstring;
use crate::util::read_record;
use crate::util::Record as _;

use super::types::FileDescriptor;
use super::types::LocalSymbol;
use super::types::SourceLanguage;
use super::types::SymbolClass;
use super::types::SymbolType;
use super::types::SymbolicHeader;
use super::types::MDEBUG_MAGIC;


/// The location of the mdebug section within the byte image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MdebugSection {
    /// The absolute file offset of the symbolic header.
    pub file_offset: u32,
}


/// A single decoded local symbol.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Symbol {
    /// The symbol's string, decoded from the local string table.
    pub string: String,
    /// The symbol's numeric value.
    pub value: i32,
    /// The raw 6 bit symbol type.
    pub storage_type: u32,
    /// The raw 5 bit storage class.
    pub storage_class: u32,
    /// The raw 20 bit index.
    pub index: u32,
}

impl Symbol {
    /// The decoded symbol type, if it is a known one.
    pub fn symbol_type(&self) -> Option<SymbolType> {
        SymbolType::from_raw(self.storage_type)
    }

    /// The decoded storage class, if it is a known one.
    pub fn symbol_class(&self) -> Option<SymbolClass> {
        SymbolClass::from_raw(self.storage_class)
    }

    /// Whether this symbol carries a STABS string (NIL type, class 0).
    pub fn is_stabs(&self) -> bool {
        self.symbol_type() == Some(SymbolType::Nil) && self.storage_class == 0
    }
}


/// The decoded view of one translation unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymFileDescriptor {
    /// The raw file descriptor record.
    pub descriptor: FileDescriptor,
    /// The unit's path exactly as stored in the string table.
    pub raw_path: String,
    /// The compilation directory, recovered from adjacent LABEL symbols.
    pub base_path: String,
    /// The normalized path, combining `base_path` and `raw_path`.
    pub full_path: String,
    /// The source language guessed from the path suffix.
    pub detected_language: SourceLanguage,
    /// The unit's local symbols in table order.
    pub symbols: Vec<Symbol>,
}


/// The decoded symbol table of an entire mdebug section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbolTable {
    /// The symbolic header, including offsets of unparsed tables.
    pub header: SymbolicHeader,
    /// Per translation unit views, in file descriptor table order.
    pub files: Vec<SymFileDescriptor>,
}


fn detect_language(raw_path: &str) -> SourceLanguage {
    let lower = raw_path.to_lowercase();
    if lower.ends_with(".c") {
        SourceLanguage::C
    } else if lower.ends_with(".cpp") || lower.ends_with(".cc") || lower.ends_with(".cxx") {
        SourceLanguage::Cpp
    } else if lower.ends_with(".s") || lower.ends_with(".asm") {
        SourceLanguage::Assembly
    } else {
        SourceLanguage::Unknown
    }
}

/// Combine a unit's base and raw paths into its full path.
fn derive_full_path(base_path: &str, raw_path: &str) -> String {
    let base_path = base_path.replace('\\', "/");
    let raw_path = raw_path.replace('\\', "/");

    let bytes = raw_path.as_bytes();
    let is_absolute_unix = matches!(bytes.first(), Some(b'/'));
    let is_absolute_windows = bytes.len() >= 3 && bytes[1] == b':' && bytes[2] == b'/';
    if base_path.is_empty() || is_absolute_unix || is_absolute_windows {
        raw_path
    } else {
        crate::util::weakly_canonical(&format!("{base_path}/{raw_path}"))
    }
}

/// Parse the symbol table of an mdebug section.
///
/// `image` is the executable's entire contents; offsets inside the
/// symbolic header are absolute into it.
pub fn parse_symbol_table(image: &[u8], section: &MdebugSection) -> Result<SymbolTable> {
    let header = read_record::<SymbolicHeader>(
        image,
        i64::from(section.file_offset),
        "symbolic header",
    )?;
    if header.magic != MDEBUG_MAGIC {
        return Err(Error::new(
            ErrorKind::BadMagic,
            format!(
                "invalid symbolic header magic {:#06x}, expected {MDEBUG_MAGIC:#06x}",
                header.magic
            ),
        ))
    }

    let mut files = Vec::new();
    for i in 0..i64::from(header.file_descriptor_count) {
        let fd_offset =
            i64::from(header.file_descriptors_offset) + i * FileDescriptor::SIZE as i64;
        let descriptor = read_record::<FileDescriptor>(image, fd_offset, "file descriptor")?;
        if descriptor.f_big_endian() != 0 {
            return Err(Error::new(
                ErrorKind::UnexpectedEndianness,
                format!("file descriptor {i} declares big-endian tables"),
            ))
        }

        let strings_base =
            i64::from(header.local_strings_offset) + i64::from(descriptor.strings_offset);
        let raw_path = read_cstring(
            image,
            strings_base + i64::from(descriptor.file_path_string_offset),
        )
        .with_context(|| format!("reading path of file descriptor {i}"))?;
        let raw_path = String::from_utf8_lossy(raw_path).into_owned();
        let detected_language = detect_language(&raw_path);

        let mut symbols: Vec<Symbol> = Vec::new();
        let mut base_path = String::new();
        for j in 0..i64::from(descriptor.symbol_count) {
            let sym_offset = i64::from(header.local_symbols_offset)
                + (i64::from(descriptor.isym_base) + j) * LocalSymbol::SIZE as i64;
            let entry = read_record::<LocalSymbol>(image, sym_offset, "local symbol")?;
            let string = read_cstring(image, strings_base + i64::from(entry.iss))
                .with_context(|| format!("reading string of local symbol {j}"))?;
            let symbol = Symbol {
                string: String::from_utf8_lossy(string).into_owned(),
                value: entry.value,
                storage_type: entry.st(),
                storage_class: entry.sc(),
                index: entry.index(),
            };

            // The compiler stores the compilation directory as a LABEL
            // immediately preceding a LABEL that points back at the
            // unit's own path string.
            if base_path.is_empty()
                && i64::from(entry.iss) == i64::from(descriptor.file_path_string_offset)
                && symbol.symbol_type() == Some(SymbolType::Label)
                && symbols.len() >= 2
            {
                let previous = &symbols[symbols.len() - 1];
                if previous.symbol_type() == Some(SymbolType::Label) {
                    base_path = previous.string.clone();
                }
            }

            symbols.push(symbol);
        }

        let full_path = derive_full_path(&base_path, &raw_path);
        debug!(
            "decoded file descriptor {i}: {full_path} ({} symbols)",
            symbols.len()
        );

        files.push(SymFileDescriptor {
            descriptor,
            raw_path,
            base_path,
            full_path,
            detected_language,
            symbols,
        });
    }

    Ok(SymbolTable { header, files })
}


#[cfg(test)]
mod tests {
    use test_log::test;

    use crate::util::Record as _;

    use super::*;


    /// An in-memory builder for mdebug images.
    #[derive(Default)]
    struct ImageBuilder {
        strings: Vec<u8>,
        symbols: Vec<(u32, i32, u32, u32)>,
        files: Vec<FileDescriptor>,
    }

    impl ImageBuilder {
        /// Append a string to the local string table, returning its
        /// offset within it.
        fn string(&mut self, value: &str) -> i32 {
            let offset = self.strings.len() as i32;
            self.strings.extend_from_slice(value.as_bytes());
            self.strings.push(0);
            offset
        }

        /// Append a local symbol (iss, value, st, sc).
        fn symbol(&mut self, iss: i32, value: i32, st: u32, sc: u32) {
            self.symbols.push((iss as u32, value, st, sc));
        }

        /// Append a file descriptor covering symbols
        /// `[isym_base, isym_base + symbol_count)`.
        fn file(&mut self, path_offset: i32, isym_base: i32, symbol_count: i32, flags: u32) {
            self.files.push(FileDescriptor {
                file_path_string_offset: path_offset,
                strings_offset: 0,
                isym_base,
                symbol_count,
                flags,
                ..Default::default()
            });
        }

        /// Lay the tables out after the header and serialize.
        fn build(&self, section_offset: u32) -> Vec<u8> {
            let mut image = vec![0u8; section_offset as usize];
            let header_offset = image.len();
            image.resize(header_offset + SymbolicHeader::SIZE, 0);

            let local_strings_offset = image.len() as i32;
            image.extend_from_slice(&self.strings);

            while image.len() % 4 != 0 {
                image.push(0);
            }
            let local_symbols_offset = image.len() as i32;
            for (iss, value, st, sc) in &self.symbols {
                image.extend_from_slice(&iss.to_le_bytes());
                image.extend_from_slice(&value.to_le_bytes());
                let bits = (st & 0x3f) | ((sc & 0x1f) << 6);
                image.extend_from_slice(&bits.to_le_bytes());
            }

            let file_descriptors_offset = image.len() as i32;
            for fd in &self.files {
                image.extend_from_slice(&fd.address.to_le_bytes());
                image.extend_from_slice(&fd.file_path_string_offset.to_le_bytes());
                image.extend_from_slice(&fd.strings_offset.to_le_bytes());
                image.extend_from_slice(&fd.cb_ss.to_le_bytes());
                image.extend_from_slice(&fd.isym_base.to_le_bytes());
                image.extend_from_slice(&fd.symbol_count.to_le_bytes());
                image.extend_from_slice(&fd.iline_base.to_le_bytes());
                image.extend_from_slice(&fd.cline.to_le_bytes());
                image.extend_from_slice(&fd.iopt_base.to_le_bytes());
                image.extend_from_slice(&fd.copt.to_le_bytes());
                image.extend_from_slice(&fd.ipd_first.to_le_bytes());
                image.extend_from_slice(&fd.cpd.to_le_bytes());
                image.extend_from_slice(&fd.iaux_base.to_le_bytes());
                image.extend_from_slice(&fd.caux.to_le_bytes());
                image.extend_from_slice(&fd.rfd_base.to_le_bytes());
                image.extend_from_slice(&fd.crfd.to_le_bytes());
                image.extend_from_slice(&fd.flags.to_le_bytes());
                image.extend_from_slice(&fd.cb_line_offset.to_le_bytes());
                image.extend_from_slice(&fd.cb_line.to_le_bytes());
            }

            let header = SymbolicHeader {
                magic: MDEBUG_MAGIC,
                local_symbol_count: self.symbols.len() as i32,
                local_symbols_offset,
                local_strings_size_bytes: self.strings.len() as i32,
                local_strings_offset,
                file_descriptor_count: self.files.len() as i32,
                file_descriptors_offset,
                ..Default::default()
            };
            let mut data = Vec::new();
            data.extend_from_slice(&header.magic.to_le_bytes());
            data.extend_from_slice(&header.version_stamp.to_le_bytes());
            for field in [
                header.line_number_count,
                header.line_numbers_size_bytes,
                header.line_numbers_offset,
                header.dense_numbers_count,
                header.dense_numbers_offset,
                header.procedure_descriptor_count,
                header.procedure_descriptors_offset,
                header.local_symbol_count,
                header.local_symbols_offset,
                header.optimization_symbols_count,
                header.optimization_symbols_offset,
                header.auxiliary_symbol_count,
                header.auxiliary_symbols_offset,
                header.local_strings_size_bytes,
                header.local_strings_offset,
                header.external_strings_size_bytes,
                header.external_strings_offset,
                header.file_descriptor_count,
                header.file_descriptors_offset,
                header.relative_file_descriptor_count,
                header.relative_file_descriptors_offset,
                header.external_symbols_count,
                header.external_symbols_offset,
            ] {
                data.extend_from_slice(&field.to_le_bytes());
            }
            image[header_offset..header_offset + SymbolicHeader::SIZE].copy_from_slice(&data);
            image
        }
    }


    /// Check that a zeroed magic is rejected.
    #[test]
    fn magic_rejection() {
        let builder = ImageBuilder::default();
        let mut image = builder.build(0x20);
        image[0x20] = 0;
        image[0x21] = 0;

        let err =
            parse_symbol_table(&image, &MdebugSection { file_offset: 0x20 }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadMagic);
    }

    /// Check that a truncated image is rejected.
    #[test]
    fn truncated_header() {
        let image = vec![0u8; 0x30];
        let err = parse_symbol_table(&image, &MdebugSection { file_offset: 0 }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRecord);
    }

    /// Check that big-endian file descriptors are rejected.
    #[test]
    fn endianness_rejection() {
        let mut builder = ImageBuilder::default();
        let path = builder.string("main.c");
        builder.file(path, 0, 0, 1 << 7);
        let image = builder.build(0);

        let err = parse_symbol_table(&image, &MdebugSection { file_offset: 0 }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEndianness);
    }

    /// Check paths, language detection, and symbol order.
    #[test]
    fn file_views() {
        let mut builder = ImageBuilder::default();
        let path = builder.string("main.c");
        let a = builder.string("a");
        let b = builder.string("b");
        builder.symbol(a, 1, SymbolType::Proc as u32, SymbolClass::Text as u32);
        builder.symbol(b, 2, SymbolType::End as u32, SymbolClass::Text as u32);
        builder.file(path, 0, 2, 0);
        let image = builder.build(0x10);

        let table = parse_symbol_table(&image, &MdebugSection { file_offset: 0x10 }).unwrap();
        assert_eq!(table.files.len(), 1);
        let fd = &table.files[0];
        assert_eq!(fd.raw_path, "main.c");
        assert_eq!(fd.base_path, "");
        assert_eq!(fd.full_path, "main.c");
        assert_eq!(fd.detected_language, SourceLanguage::C);
        let strings = fd
            .symbols
            .iter()
            .map(|sym| sym.string.as_str())
            .collect::<Vec<_>>();
        assert_eq!(strings, vec!["a", "b"]);
        assert_eq!(fd.symbols[0].value, 1);
        assert_eq!(fd.symbols[0].symbol_type(), Some(SymbolType::Proc));
        assert_eq!(fd.symbols[1].symbol_class(), Some(SymbolClass::Text));
    }

    /// Check base path recovery from the adjacent LABEL pair and the
    /// resulting full path.
    #[test]
    fn base_path_recovery() {
        let mut builder = ImageBuilder::default();
        let path = builder.string("src/main.cpp");
        let filler = builder.string("x");
        let base = builder.string("/home/user/project");
        builder.symbol(filler, 0, SymbolType::Nil as u32, 0);
        builder.symbol(base, 0, SymbolType::Label as u32, SymbolClass::Text as u32);
        builder.symbol(path, 0, SymbolType::Label as u32, SymbolClass::Text as u32);
        builder.file(path, 0, 3, 0);
        let image = builder.build(0);

        let table = parse_symbol_table(&image, &MdebugSection { file_offset: 0 }).unwrap();
        let fd = &table.files[0];
        assert_eq!(fd.base_path, "/home/user/project");
        assert_eq!(fd.full_path, "/home/user/project/src/main.cpp");
        assert_eq!(fd.detected_language, SourceLanguage::Cpp);
    }

    /// Check that the LABEL pair is not mistaken when the preceding
    /// symbol is not a LABEL, or when fewer than two symbols precede.
    #[test]
    fn base_path_not_recovered() {
        let mut builder = ImageBuilder::default();
        let path = builder.string("boot.s");
        let base = builder.string("/base");
        builder.symbol(base, 0, SymbolType::Proc as u32, SymbolClass::Text as u32);
        builder.symbol(path, 0, SymbolType::Label as u32, SymbolClass::Text as u32);
        builder.file(path, 0, 2, 0);
        let image = builder.build(0);

        let table = parse_symbol_table(&image, &MdebugSection { file_offset: 0 }).unwrap();
        let fd = &table.files[0];
        assert_eq!(fd.base_path, "");
        assert_eq!(fd.full_path, "boot.s");
        assert_eq!(fd.detected_language, SourceLanguage::Assembly);
    }

    /// Check Windows style path merging and normalization.
    #[test]
    fn windows_paths() {
        assert_eq!(
            derive_full_path("C:\\dev\\proj", "..\\src\\main.c"),
            "C:/dev/src/main.c"
        );
        assert_eq!(derive_full_path("/base", "D:/abs/code.c"), "D:/abs/code.c");
        assert_eq!(derive_full_path("", "lib\\mem.c"), "lib/mem.c");
        assert_eq!(derive_full_path("/base", "/abs/code.c"), "/abs/code.c");
    }

    /// Check that an out of range symbol string is reported.
    #[test]
    fn dangling_symbol_string() {
        let mut builder = ImageBuilder::default();
        let path = builder.string("main.c");
        builder.symbol(0x7fff_0000, 0, SymbolType::Nil as u32, 0);
        builder.file(path, 0, 1, 0);
        let image = builder.build(0);

        let err = parse_symbol_table(&image, &MdebugSection { file_offset: 0 }).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnterminatedString);
    }
}
