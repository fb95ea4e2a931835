use std::borrow::Cow;
use std::error;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;


mod private {
    use std::borrow::Cow;

    pub trait Sealed {}

    impl Sealed for super::Error {}
    impl<T> Sealed for Result<T, super::Error> {}
    impl<T> Sealed for Option<T> {}

    impl Sealed for &'static str {}
    impl Sealed for String {}
    impl Sealed for Cow<'static, str> {}
}

/// A result type using our [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;


/// The kind of an error.
///
/// Kinds survive any number of added context layers: [`Error::kind`]
/// always reports the kind the error was created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The symbolic header magic value was wrong.
    BadMagic,
    /// A file descriptor declared itself big-endian.
    UnexpectedEndianness,
    /// A fixed-layout record did not fit into the image.
    BadRecord,
    /// A string ran past the end of the image without a NUL.
    UnterminatedString,
    /// A STABS string could not be parsed.
    ParseError,
    /// A type number had no definition in the per-file index.
    UnknownTypeNumber,
    /// A range type matched neither the literal nor the numeric tables.
    UnclassifiedRange,
    /// A built-in type id other than the known ones was encountered.
    UnknownBuiltin,
    /// The lowering recursion guard tripped.
    CallDepthExceeded,
    /// An internal consistency check failed.
    AssertionFailure,
}

impl ErrorKind {
    fn as_str(&self) -> &'static str {
        match self {
            Self::BadMagic => "bad magic",
            Self::UnexpectedEndianness => "unexpected endianness",
            Self::BadRecord => "bad record",
            Self::UnterminatedString => "unterminated string",
            Self::ParseError => "parse error",
            Self::UnknownTypeNumber => "unknown type number",
            Self::UnclassifiedRange => "unclassified range",
            Self::UnknownBuiltin => "unknown builtin",
            Self::CallDepthExceeded => "call depth exceeded",
            Self::AssertionFailure => "assertion failure",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}


#[derive(Debug)]
enum ErrorImpl {
    Error {
        kind: ErrorKind,
        message: Cow<'static, str>,
    },
    Context {
        context: Cow<'static, str>,
        source: Box<ErrorImpl>,
    },
}

impl ErrorImpl {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Error { kind, .. } => *kind,
            Self::Context { source, .. } => source.kind(),
        }
    }
}

impl Display for ErrorImpl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Error { kind, message } => {
                if message.is_empty() {
                    write!(f, "{kind}")
                } else {
                    write!(f, "{message}")
                }
            }
            Self::Context { context, source } => write!(f, "{context}: {source}"),
        }
    }
}


/// The error type used throughout the crate.
///
/// Errors are cheap to move (a single boxed allocation) and carry an
/// [`ErrorKind`] plus a human readable message, optionally wrapped in
/// any number of context layers added via [`ErrorExt`].
pub struct Error {
    error: Box<ErrorImpl>,
}

impl Error {
    /// Create a new error of the given kind with the provided message.
    pub fn new<M>(kind: ErrorKind, message: M) -> Self
    where
        M: IntoCowStr,
    {
        Self {
            error: Box::new(ErrorImpl::Error {
                kind,
                message: message.into_cow_str(),
            }),
        }
    }

    /// Retrieve the error's kind, looking through any contexts.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    fn layer_context(self, context: Cow<'static, str>) -> Self {
        Self {
            error: Box::new(ErrorImpl::Context {
                context,
                source: self.error,
            }),
        }
    }
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Error")
            .field("kind", &self.kind())
            .field("message", &format_args!("{}", self.error))
            .finish()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        Display::fmt(&self.error, f)
    }
}

impl error::Error for Error {}


/// A trait providing conversion into a `Cow<'static, str>` without
/// eagerly allocating for the common static-string case.
pub trait IntoCowStr: private::Sealed {
    fn into_cow_str(self) -> Cow<'static, str>;
}

impl IntoCowStr for &'static str {
    fn into_cow_str(self) -> Cow<'static, str> {
        Cow::Borrowed(self)
    }
}

impl IntoCowStr for String {
    fn into_cow_str(self) -> Cow<'static, str> {
        Cow::Owned(self)
    }
}

impl IntoCowStr for Cow<'static, str> {
    fn into_cow_str(self) -> Cow<'static, str> {
        self
    }
}


/// A trait for adding context to an [`Error`] or error [`Result`].
pub trait ErrorExt: private::Sealed {
    /// The output type produced by [`context`](Self::context) and
    /// [`with_context`](Self::with_context).
    type Output;

    /// Add context to the error.
    fn context<C>(self, context: C) -> Self::Output
    where
        C: IntoCowStr;

    /// Add context to the error, lazily evaluated.
    fn with_context<C, F>(self, f: F) -> Self::Output
    where
        C: IntoCowStr,
        F: FnOnce() -> C;
}

impl ErrorExt for Error {
    type Output = Error;

    fn context<C>(self, context: C) -> Self::Output
    where
        C: IntoCowStr,
    {
        self.layer_context(context.into_cow_str())
    }

    fn with_context<C, F>(self, f: F) -> Self::Output
    where
        C: IntoCowStr,
        F: FnOnce() -> C,
    {
        self.layer_context(f().into_cow_str())
    }
}

impl<T> ErrorExt for Result<T> {
    type Output = Result<T>;

    fn context<C>(self, context: C) -> Self::Output
    where
        C: IntoCowStr,
    {
        self.map_err(|err| err.context(context))
    }

    fn with_context<C, F>(self, f: F) -> Self::Output
    where
        C: IntoCowStr,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.with_context(f))
    }
}


/// A trait for turning `Option`s into error [`Result`]s.
pub trait IntoError<T>: private::Sealed
where
    Self: Sized,
{
    /// Convert `self` into a `Result`, producing an error of the given
    /// kind with a lazily created message if no value is present.
    fn ok_or_error<M, F>(self, kind: ErrorKind, f: F) -> Result<T>
    where
        M: IntoCowStr,
        F: FnOnce() -> M;
}

impl<T> IntoError<T> for Option<T> {
    #[inline]
    fn ok_or_error<M, F>(self, kind: ErrorKind, f: F) -> Result<T>
    where
        M: IntoCowStr,
        F: FnOnce() -> M,
    {
        self.ok_or_else(|| Error::new(kind, f()))
    }
}
