//! Phase instrumentation behind the `tracing` feature.
//!
//! | span                    | fields    | events                               |
//! |-------------------------|-----------|--------------------------------------|
//! | `correlate_grid`        | `windows` | `grid` (rows, cols, transform), `workers` |
//! | `autocorrelate_grid`    | `windows` | `grid`, `workers`                    |
//! | `extract_displacements` | `planes`  | `workers`, `invalid_windows` (count) |
//! | `correct_by_neighbors`  | `planes`  | none                                 |
//!
//! Without the feature both macros expand to nothing observable; event field
//! values are still evaluated so call sites see no unused bindings.

/// Opens the info-level span of one phase driver.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($phase:literal $(, $($field:tt)*)?) => {
        tracing::info_span!($phase $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($phase:literal $(, $($field:tt)*)?) => {
        $crate::trace::PhaseGuard
    };
}

/// Records a per-phase count inside the current phase span.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($what:literal, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $what, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($what:literal, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Stand-in for an entered phase span.
#[cfg(not(feature = "tracing"))]
pub struct PhaseGuard;

#[cfg(not(feature = "tracing"))]
impl PhaseGuard {
    /// Same shape as `tracing::Span::entered`.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
