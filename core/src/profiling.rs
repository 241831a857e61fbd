//! Profiling support via Tracy.
//!
//! Instrumentation for the import pipeline stages using the
//! [Tracy profiler](https://github.com/wolfpld/tracy). Enabled with the
//! `profiling` Cargo feature:
//!
//! ```bash
//! cargo run -p meshforge-import --features profiling -- --source model.ron --location out
//! ```
//!
//! # CPU Profiling
//!
//! ```ignore
//! use meshforge_core::profiling::{profile_scope, profile_function};
//!
//! fn compact(model: &mut Model) {
//!     profile_function!();
//!
//!     {
//!         profile_scope!("group_meshes");
//!         // ...
//!     }
//! }
//! ```
//!
//! When profiling is disabled (the default), all macros compile to no-ops.

#[cfg(feature = "profiling")]
pub use tracy_client::{self, Client, Span, plot as tracy_plot, span};

/// Create a profiling span for the current scope.
///
/// The span ends when the scope exits.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_scope {
    ($name:expr) => {
        let _profile_span = $crate::profiling::span!($name);
    };
}

/// Create a profiling span (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_scope {
    ($name:expr) => {};
}

/// Create a profiling span for the entire function.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_function {
    () => {
        let _profile_span = $crate::profiling::span!();
    };
}

/// Create a profiling span for function (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_function {
    () => {};
}

/// Plot a value in Tracy, e.g. packed buffer sizes.
#[macro_export]
#[cfg(feature = "profiling")]
macro_rules! profile_plot {
    ($name:literal, $value:expr) => {
        $crate::profiling::tracy_plot!($name, $value as f64)
    };
}

/// Plot a value (no-op when profiling disabled).
#[macro_export]
#[cfg(not(feature = "profiling"))]
macro_rules! profile_plot {
    ($name:literal, $value:expr) => {
        let _ = $value;
    };
}

pub use profile_function;
pub use profile_plot;
pub use profile_scope;
