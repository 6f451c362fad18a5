//! Ctrl-C handling for the long-running drivers

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flag raised once the user interrupts the process
#[derive(Clone, Debug, Default)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// Install the process-wide Ctrl-C handler
    ///
    /// Can only be called once per process.
    pub fn install() -> Result<Self> {
        let flag = Self::default();
        let handler_flag = flag.clone();
        ctrlc::set_handler(move || handler_flag.raise())
            .context("Failed to install Ctrl-C handler")?;
        Ok(flag)
    }

    /// Mark the process as interrupted
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once Ctrl-C was pressed
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
