use crate::device::base::EnumerationCursor;
use crate::error::ResourceError;
use crate::handle::ScopedHandle;
use log::debug;

/// A lazy, finite, non-restartable sequence of typed interfaces pulled from
/// an enumeration cursor.
///
/// Each advance performs the OS pull and the plugin negotiation for one
/// element. Elements whose plugin creation fails with resource exhaustion
/// are skipped; any other failure aborts the enumeration. The mediating
/// plugin is released as soon as its interface has been queried, on success
/// and failure alike.
pub struct HandleSequence<C: EnumerationCursor> {
    cursor: ScopedHandle<C>,
    current: ScopedHandle<C::Interface>,
}

impl<C: EnumerationCursor> HandleSequence<C> {
    /// The terminal sequence: no cursor held, no current value held.
    pub fn terminal() -> Self {
        Self {
            cursor: ScopedHandle::empty(),
            current: ScopedHandle::empty(),
        }
    }

    /// Starts a sequence over a freshly acquired cursor, advancing to the
    /// first usable element.
    pub fn start(cursor: C) -> Result<Self, ResourceError> {
        let mut sequence = Self {
            cursor: ScopedHandle::adopt(cursor),
            current: ScopedHandle::empty(),
        };
        sequence.advance()?;
        Ok(sequence)
    }

    /// Moves to the next usable element, or to the terminal state once the
    /// cursor is exhausted (releasing the cursor).
    pub fn advance(&mut self) -> Result<(), ResourceError> {
        self.current.release();
        loop {
            let Some(cursor) = self.cursor.get_mut() else {
                return Ok(());
            };
            let Some(element) = cursor.next_element()? else {
                break;
            };

            let mut plugin = match cursor.create_plugin(&element) {
                Ok(plugin) => plugin,
                Err(error) if error.is_exhaustion() => {
                    // Some enumerated entries are known to be unusable.
                    debug!("Skipping enumeration entry: {}", error);
                    continue;
                }
                Err(error) => return Err(error),
            };

            let queried = cursor.query_interface(&mut plugin);
            ScopedHandle::adopt(plugin).release();

            *self.current.prepare() = Some(queried?);
            self.current.commit();
            return Ok(());
        }

        self.cursor.release();
        Ok(())
    }

    pub fn current(&self) -> Option<&C::Interface> {
        self.current.get()
    }

    pub fn current_mut(&mut self) -> Option<&mut C::Interface> {
        self.current.get_mut()
    }

    /// Transfers the current element out of the sequence. The next advance
    /// continues from the following element.
    pub fn take_current(&mut self) -> ScopedHandle<C::Interface> {
        self.current.take()
    }

    pub fn is_terminal(&self) -> bool {
        !self.cursor.is_valid() && !self.current.is_valid()
    }
}

/// Equality exists purely to detect end-of-sequence: two sequences are equal
/// iff both are terminal. Enumerated content is never compared.
impl<C: EnumerationCursor> PartialEq for HandleSequence<C> {
    fn eq(&self, other: &Self) -> bool {
        self.is_terminal() && other.is_terminal()
    }
}
