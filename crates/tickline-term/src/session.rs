// SPDX-License-Identifier: MIT
//
// Raw-mode sessions — scoped ownership of an input device's line discipline.
//
// A session saves the device's mode, switches it to raw, and puts the
// saved mode back when it ends. Ending is tied to `Drop`, so the restore
// runs on every way out: normal return, `?` on a failed read, or a panic
// unwinding through the caller. The session borrows the device mutably,
// which is what guarantees a single active session per device.
//
// Mode failures do not stop the read. A terminal that refuses raw mode
// still delivers bytes (just line-buffered and echoed), so the failure is
// recorded as a degradation and reported alongside the byte.

use log::{debug, warn};

use crate::error::TermError;
use crate::input::{Apply, InputDevice};

// ─── RawModeSession ─────────────────────────────────────────────────────────

/// Raw mode held on a device for as long as this value lives.
pub struct RawModeSession<'a, D: InputDevice> {
    device: &'a mut D,
    /// Mode to restore; `None` once restored or if there was nothing to save.
    saved: Option<D::Mode>,
    degraded: Vec<TermError>,
}

impl<'a, D: InputDevice> RawModeSession<'a, D> {
    /// Save the device's mode and switch it to raw.
    ///
    /// Never fails: query and switch errors are kept as degradations
    /// (see [`degradations`](Self::degradations)).
    pub fn enter(device: &'a mut D) -> Self {
        let mut degraded = Vec::new();

        let saved = match device.mode() {
            Ok(Some(mode)) => {
                let raw = D::raw_mode(&mode);
                if let Err(e) = device.set_mode(&raw, Apply::Now) {
                    degraded.push(TermError::EnterRaw(e));
                }
                // Restore even after a failed switch; it may have been partial.
                Some(mode)
            }
            Ok(None) => None,
            Err(e) => {
                degraded.push(TermError::GetMode(e));
                None
            }
        };

        Self {
            device,
            saved,
            degraded,
        }
    }

    /// Whether a mode was saved and will be restored.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.saved.is_some()
    }

    /// Problems met so far configuring the device.
    #[must_use]
    pub fn degradations(&self) -> &[TermError] {
        &self.degraded
    }

    /// One blocking byte read. `Ok(None)` at end of input.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::Read`] if the device read fails.
    pub fn read_byte(&mut self) -> Result<Option<u8>, TermError> {
        self.device.read_byte().map_err(TermError::Read)
    }

    /// End the session now, returning every degradation including a failed
    /// restore (which `Drop` would otherwise only log).
    #[must_use]
    pub fn finish(mut self) -> Vec<TermError> {
        self.restore();
        std::mem::take(&mut self.degraded)
    }

    fn restore(&mut self) {
        if let Some(mode) = self.saved.take() {
            if let Err(e) = self.device.set_mode(&mode, Apply::Drain) {
                self.degraded.push(TermError::Restore(e));
            }
        }
    }
}

impl<D: InputDevice> Drop for RawModeSession<'_, D> {
    fn drop(&mut self) {
        self.restore();
        for problem in self.degraded.drain(..) {
            warn!("{problem}");
        }
    }
}

// ─── read_raw_char ──────────────────────────────────────────────────────────

/// Outcome of a single raw read.
#[derive(Debug)]
pub struct RawRead {
    /// The byte read, or `None` at end of input.
    pub byte: Option<u8>,
    /// Mode problems met around the read. Empty on a clean read.
    pub degraded: Vec<TermError>,
}

impl RawRead {
    /// Whether the terminal was configured and restored without trouble.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.degraded.is_empty()
    }
}

/// Read exactly one byte with the device in raw mode.
///
/// The device's original mode is back in place before this returns,
/// whether the read succeeded or not. Degradations are logged at `warn`
/// and also returned in [`RawRead::degraded`].
///
/// # Errors
///
/// Returns [`TermError::Read`] if the read itself fails.
pub fn read_raw_char<D: InputDevice>(device: &mut D) -> Result<RawRead, TermError> {
    let mut session = RawModeSession::enter(device);
    debug!("raw read (mode saved: {})", session.is_active());

    let result = session.read_byte();
    let degraded = session.finish();

    for problem in &degraded {
        warn!("{problem}");
    }
    result.map(|byte| RawRead { byte, degraded })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
