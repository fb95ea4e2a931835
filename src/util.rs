use crate::error::ErrorKind;
use crate::error::IntoError as _;
use crate::error::Result;


/// A trait for bounds-checked reading of data out of a byte buffer.
///
/// All multi-byte reads decode little-endian, which is the byte order of
/// every table this crate consumes; the host's endianness and alignment
/// are never relied upon.
pub(crate) trait ReadRaw<'data> {
    /// Ensure that `len` bytes are available for consumption.
    fn ensure(&self, len: usize) -> Option<()>;

    /// Consume and return `len` bytes.
    fn read_slice(&mut self, len: usize) -> Option<&'data [u8]>;

    /// Read a fixed size array of bytes.
    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]>;

    /// Read a `u8` value.
    #[inline]
    fn read_u8(&mut self) -> Option<u8> {
        let [value] = self.read_array::<1>()?;
        Some(value)
    }

    /// Read a `u16` value.
    #[inline]
    fn read_u16(&mut self) -> Option<u16> {
        Some(u16::from_le_bytes(self.read_array::<2>()?))
    }

    /// Read a `u32` value.
    #[inline]
    fn read_u32(&mut self) -> Option<u32> {
        Some(u32::from_le_bytes(self.read_array::<4>()?))
    }

    /// Read an `i16` value.
    #[inline]
    fn read_i16(&mut self) -> Option<i16> {
        Some(i16::from_le_bytes(self.read_array::<2>()?))
    }

    /// Read an `i32` value.
    #[inline]
    fn read_i32(&mut self) -> Option<i32> {
        Some(i32::from_le_bytes(self.read_array::<4>()?))
    }
}

impl<'data> ReadRaw<'data> for &'data [u8] {
    #[inline]
    fn ensure(&self, len: usize) -> Option<()> {
        if len > self.len() {
            return None
        }
        Some(())
    }

    #[inline]
    fn read_slice(&mut self, len: usize) -> Option<&'data [u8]> {
        self.ensure(len)?;
        let (a, b) = self.split_at(len);
        *self = b;
        Some(a)
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let slice = self.read_slice(N)?;
        <[u8; N]>::try_from(slice).ok()
    }
}


/// A fixed-layout record that can be decoded from raw bytes.
pub(crate) trait Record: Sized {
    /// The on-disk size of the record in bytes.
    const SIZE: usize;

    /// Decode one record, advancing `data` past it.
    fn read(data: &mut &[u8]) -> Option<Self>;
}

/// Read a fixed-layout record at an absolute offset into `image`.
pub(crate) fn read_record<T>(image: &[u8], offset: i64, label: &'static str) -> Result<T>
where
    T: Record,
{
    usize::try_from(offset)
        .ok()
        .and_then(|offset| image.get(offset..))
        .and_then(|mut data| T::read(&mut data))
        .ok_or_error(ErrorKind::BadRecord, || {
            format!("{label} record at offset {offset:#x} is out of bounds")
        })
}

/// Read a NUL terminated string at an absolute offset into `image`.
///
/// The returned slice excludes the terminator.
pub(crate) fn read_cstring(image: &[u8], offset: i64) -> Result<&[u8]> {
    let bytes = usize::try_from(offset)
        .ok()
        .and_then(|offset| image.get(offset..));
    let string = bytes.and_then(|bytes| {
        let nul = bytes.iter().position(|b| *b == 0)?;
        Some(&bytes[..nul])
    });
    string.ok_or_error(ErrorKind::UnterminatedString, || {
        format!("no NUL terminated string at offset {offset:#x}")
    })
}


/// Collapse `.` and `..` components of a forward-slash path without
/// consulting the file system.
///
/// A leading `/` or `X:/` drive prefix is preserved (the drive letter is
/// upper-cased); `..` components that would escape the front of a
/// relative path are kept.
pub(crate) fn weakly_canonical(path: &str) -> String {
    let bytes = path.as_bytes();
    let (prefix, rest) = if let [b'/', rest @ ..] = bytes {
        (String::from("/"), rest)
    } else if let [drive, b':', b'/', rest @ ..] = bytes {
        if drive.is_ascii_alphabetic() {
            (format!("{}:/", drive.to_ascii_uppercase() as char), rest)
        } else {
            (String::new(), bytes)
        }
    } else {
        (String::new(), bytes)
    };

    let mut parts: Vec<&[u8]> = Vec::new();
    for part in rest.split(|b| *b == b'/') {
        match part {
            b"" | b"." => (),
            b".." => {
                if matches!(parts.last(), None | Some(&b"..")) {
                    parts.push(part);
                } else {
                    let _popped = parts.pop();
                }
            }
            _ => parts.push(part),
        }
    }

    let mut output = prefix;
    for (i, part) in parts.iter().enumerate() {
        output.push_str(&String::from_utf8_lossy(part));
        if i != parts.len() - 1 {
            output.push('/');
        }
    }
    output
}


#[cfg(test)]
mod tests {
    use super::*;


    /// Check that multi-byte reads decode little-endian.
    #[test]
    fn read_raw_endianness() {
        let mut data = &[0x09, 0x70, 0x01, 0x00, 0x00, 0x80, 0xff][..];
        assert_eq!(data.read_u16(), Some(0x7009));
        assert_eq!(data.read_i32(), Some(-2147483647));
        assert_eq!(data.read_u8(), Some(0xff));
        assert_eq!(data.read_u8(), None);
    }

    /// Check that short buffers refuse reads without consuming anything.
    #[test]
    fn read_raw_bounds() {
        let mut data = &[0x01, 0x02][..];
        assert_eq!(data.read_u32(), None);
        assert_eq!(data.len(), 2);
        assert_eq!(data.read_slice(3), None);
        assert_eq!(data.read_slice(2), Some(&[0x01, 0x02][..]));
        assert_eq!(data.ensure(1), None);
    }

    /// Check C string reading and its failure mode.
    #[test]
    fn cstring_reading() {
        let image = b"abc\0def";
        assert_eq!(read_cstring(image, 0).unwrap(), b"abc");
        assert_eq!(read_cstring(image, 2).unwrap(), b"c");
        assert_eq!(read_cstring(image, 3).unwrap(), b"");

        let err = read_cstring(image, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnterminatedString);
        let err = read_cstring(image, 100).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnterminatedString);
        let err = read_cstring(image, -1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnterminatedString);
    }

    /// Check dot collapsing in paths.
    #[test]
    fn canonicalization() {
        assert_eq!(weakly_canonical("/a/b/../c/./d"), "/a/c/d");
        assert_eq!(weakly_canonical("a//b/"), "a/b");
        assert_eq!(weakly_canonical("../a/b"), "../a/b");
        assert_eq!(weakly_canonical("a/../../b"), "../b");
        assert_eq!(
            weakly_canonical("c:/dev/proj/../src/main.c"),
            "C:/dev/src/main.c"
        );
        assert_eq!(weakly_canonical("/"), "/");
    }

    /// Check that canonicalization is idempotent.
    #[test]
    fn canonicalization_idempotence() {
        for path in [
            "/a/b/../c/./d",
            "a//b/",
            "../a/b",
            "a/../../b",
            "C:/dev/proj/../src/main.c",
            "/base/path/src/main.c",
        ] {
            let once = weakly_canonical(path);
            assert_eq!(weakly_canonical(&once), once, "{path}");
        }
    }
}
