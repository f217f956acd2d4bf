//! Ordered, thread-safe diagnostic accumulator.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Collects diagnostics from every phase of one call, in emission order.
///
/// Error and fatal counts are kept in atomics so phases can check
/// [`has_fatal`](Self::has_fatal) without taking the lock.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    error_count: AtomicUsize,
    fatal_count: AtomicUsize,
}

impl DiagnosticSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity.is_error() {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }
        if diag.severity == Severity::Fatal {
            self.fatal_count.fetch_add(1, Ordering::Relaxed);
        }
        self.lock().push(diag);
    }

    /// Appends several diagnostics in order.
    pub fn extend(&self, diags: impl IntoIterator<Item = Diagnostic>) {
        for d in diags {
            self.emit(d);
        }
    }

    /// `true` if an `Error` or `Fatal` diagnostic was emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Number of `Error` and `Fatal` diagnostics.
    pub fn error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    /// `true` if a `Fatal` diagnostic was emitted.
    pub fn has_fatal(&self) -> bool {
        self.fatal_count.load(Ordering::Relaxed) > 0
    }

    /// Number of diagnostics emitted so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drains the sink.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        let taken = std::mem::take(&mut *self.lock());
        self.error_count.store(0, Ordering::Relaxed);
        self.fatal_count.store(0, Ordering::Relaxed);
        taken
    }

    /// A copy of everything emitted so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        self.diagnostics.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
