//! Store wrappers for exercising failure paths in tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{MemorySheet, Rows, SheetStore, SheetsError};

/// A [`MemorySheet`] whose reads or writes can be switched off, and which
/// counts the write calls it receives.
#[derive(Debug, Default)]
pub struct FlakySheet {
    pub inner: MemorySheet,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    appends: AtomicUsize,
    updates: AtomicUsize,
}

impl FlakySheet {
    pub fn new(inner: MemorySheet) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn append_calls(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn check(&self, flag: &AtomicBool) -> Result<(), SheetsError> {
        if flag.load(Ordering::SeqCst) {
            return Err(SheetsError::Unavailable("switched off".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SheetStore for FlakySheet {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn get(&self, range: &str) -> Result<Rows, SheetsError> {
        self.check(&self.fail_reads)?;
        self.inner.get(range).await
    }

    async fn append(&self, range: &str, rows: Rows) -> Result<(), SheetsError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        self.check(&self.fail_writes)?;
        self.inner.append(range, rows).await
    }

    async fn update(&self, range: &str, rows: Rows) -> Result<(), SheetsError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.check(&self.fail_writes)?;
        self.inner.update(range, rows).await
    }
}
