use crate::error::ResourceError;
use log::warn;

/// An externally allocated resource with a kind-specific release call.
///
/// Each resource kind (enumeration cursor, plugin, device interface, video
/// control interface) brings its own release strategy; handles of different
/// kinds are never interchangeable.
pub trait Resource {
    /// Short kind name, used for release diagnostics.
    const KIND: &'static str;

    fn release(&mut self) -> Result<(), ResourceError>;
}

/// Owns zero or one resource and guarantees its release call runs at most
/// once, on scope exit at the latest.
///
/// Acquisition is two-phase: `prepare` hands out the writable slot for an OS
/// call that may fail, and only a subsequent `commit` records that the value
/// must be released. A value written to the slot but never committed is
/// never released.
pub struct ScopedHandle<T: Resource> {
    slot: Option<T>,
    adopted: bool,
}

impl<T: Resource> ScopedHandle<T> {
    pub fn empty() -> Self {
        Self {
            slot: None,
            adopted: false,
        }
    }

    /// Wraps a value whose acquisition already succeeded.
    pub fn adopt(value: T) -> Self {
        Self {
            slot: Some(value),
            adopted: true,
        }
    }

    /// Releases any current value and returns the slot for a fresh
    /// acquisition attempt.
    pub fn prepare(&mut self) -> &mut Option<T> {
        self.release();
        &mut self.slot
    }

    /// Records that the acquisition filling the slot succeeded.
    pub fn commit(&mut self) {
        self.adopted = self.slot.is_some();
    }

    pub fn is_valid(&self) -> bool {
        self.adopted
    }

    pub fn get(&self) -> Option<&T> {
        if self.adopted {
            self.slot.as_ref()
        } else {
            None
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        if self.adopted {
            self.slot.as_mut()
        } else {
            None
        }
    }

    /// Transfers ownership out, leaving this handle unowned. The source will
    /// not release the value afterwards.
    pub fn take(&mut self) -> ScopedHandle<T> {
        let taken = ScopedHandle {
            slot: self.slot.take(),
            adopted: self.adopted,
        };
        self.adopted = false;
        taken
    }

    /// Runs the release strategy for the owned value, if any. Idempotent.
    pub fn release(&mut self) {
        if self.adopted {
            if let Some(mut value) = self.slot.take() {
                if let Err(error) = value.release() {
                    warn!("Failed to release {}: {}", T::KIND, error);
                }
            }
        } else {
            // Uncommitted values have nothing to release.
            self.slot = None;
        }
        self.adopted = false;
    }
}

impl<T: Resource> Drop for ScopedHandle<T> {
    fn drop(&mut self) {
        self.release();
    }
}
