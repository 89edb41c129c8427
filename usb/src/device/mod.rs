pub mod base;

mod libusb;

#[cfg(test)]
pub(crate) mod mock;

pub use libusb::device::LibUsbBackend;

/// The backend for the running platform.
pub fn backend() -> LibUsbBackend {
    LibUsbBackend
}
