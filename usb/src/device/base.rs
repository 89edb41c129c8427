// The OS contract the core calls. Everything the library does with the
// operating system (enumerating devices, negotiating typed interfaces,
// walking descriptors, issuing control transfers) goes through these traits,
// so the core logic stays independent of the backend underneath.
use crate::error::ResourceError;
use crate::handle::Resource;

/// An OS-held enumeration cursor, combined with the plugin negotiation that
/// turns its raw elements into typed interfaces.
///
/// Stepping is side-effecting and non-restartable: every element is pulled
/// from the OS exactly once.
pub trait EnumerationCursor: Resource {
    type Element;
    type Plugin: Resource;
    type Interface: Resource;

    /// Pulls the next raw element, or None once the cursor is exhausted.
    fn next_element(&mut self) -> Result<Option<Self::Element>, ResourceError>;

    /// Creates the mediating plugin object scoped to one element. A failure
    /// reporting resource exhaustion marks the element as unusable rather
    /// than fatal (see `ResourceError::is_exhaustion`).
    fn create_plugin(&mut self, element: &Self::Element) -> Result<Self::Plugin, ResourceError>;

    /// Queries the plugin for the strongly-typed interface of interest.
    fn query_interface(&mut self, plugin: &mut Self::Plugin)
        -> Result<Self::Interface, ResourceError>;
}

/// The device-interface contract: identity fields plus the scoped
/// enumeration of the device's video control interfaces.
pub trait DeviceAccess: Resource {
    type Interfaces: EnumerationCursor<Interface = Self::VideoInterface>;
    type VideoInterface: InterfaceAccess;

    fn vendor_id(&mut self) -> Result<u16, ResourceError>;
    fn product_id(&mut self) -> Result<u16, ResourceError>;

    /// Opens an enumeration cursor over this device's video control
    /// interfaces (video class, control subclass only).
    fn video_control_interfaces(&mut self) -> Result<Self::Interfaces, ResourceError>;
}

/// Parameters of one vendor control transfer, direction fixed to
/// host-to-device / class request / interface recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlParams {
    pub request: u8,
    pub value: u16,
    pub index: u16,
}

/// The interface-control contract for an opened video control interface.
pub trait InterfaceAccess: Resource {
    fn interface_number(&mut self) -> Result<u8, ResourceError>;

    /// Steps the OS-held descriptor cursor for this interface, returning the
    /// raw bytes of the next associated descriptor record, or None when no
    /// records remain. The cursor position belongs to the OS call, not the
    /// caller.
    fn next_descriptor(&mut self) -> Result<Option<Vec<u8>>, ResourceError>;

    fn open(&mut self) -> Result<(), ResourceError>;
    fn close(&mut self) -> Result<(), ResourceError>;

    /// Issues one blocking control transfer over the opened interface.
    fn control_request(&mut self, params: ControlParams, data: &[u8])
        -> Result<(), ResourceError>;
}

/// Entry point of the contract: asks the OS for the cursor over every
/// attached USB device.
pub trait UsbBackend {
    type Devices: EnumerationCursor<Interface = Self::Device>;
    type Device: DeviceAccess<VideoInterface = Self::VideoInterface>;
    type VideoInterface: InterfaceAccess;

    fn usb_devices(&mut self) -> Result<Self::Devices, ResourceError>;
}
