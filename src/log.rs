//! Logging shim.
//!
//! With the `tracing` feature enabled the crate emits instrumentation
//! through `tracing`; without it the macros below compile to nothing
//! while still type checking their arguments.

#[cfg(feature = "tracing")]
pub(crate) use tracing::debug;
#[cfg(feature = "tracing")]
pub(crate) use tracing::warn;

#[cfg(not(feature = "tracing"))]
mod noop {
    macro_rules! noop_debug {
        ($($args:tt)*) => {{
            if false {
                let _ = ::std::format_args!($($args)*);
            }
        }};
    }

    macro_rules! noop_warn {
        ($($args:tt)*) => {{
            if false {
                let _ = ::std::format_args!($($args)*);
            }
        }};
    }

    pub(crate) use noop_debug as debug;
    pub(crate) use noop_warn as warn;
}

#[cfg(not(feature = "tracing"))]
pub(crate) use noop::debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use noop::warn;
