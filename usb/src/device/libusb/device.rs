use crate::device::base::{
    ControlParams, DeviceAccess, EnumerationCursor, InterfaceAccess, UsbBackend,
};
use crate::error::ResourceError;
use crate::handle::Resource;
use log::debug;
use rusb::{Device, DeviceDescriptor, DeviceHandle, Direction, GlobalContext, Recipient, RequestType};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(1);

const VIDEO_CLASS: u8 = 0x0e;
const VIDEO_CONTROL_SUBCLASS: u8 = 0x01;

pub struct LibUsbBackend;

impl UsbBackend for LibUsbBackend {
    type Devices = DeviceCursor;
    type Device = UsbDevice;
    type VideoInterface = VideoInterface;

    fn usb_devices(&mut self) -> Result<DeviceCursor, ResourceError> {
        let list = rusb::devices().map_err(|e| ResourceError::new("listing USB devices", e))?;
        let devices: Vec<Device<GlobalContext>> = list.iter().collect();
        debug!("Enumerated {} USB devices", devices.len());
        Ok(DeviceCursor {
            devices: devices.into_iter(),
        })
    }
}

pub struct DeviceCursor {
    devices: std::vec::IntoIter<Device<GlobalContext>>,
}

impl Resource for DeviceCursor {
    const KIND: &'static str = "device enumeration cursor";

    fn release(&mut self) -> Result<(), ResourceError> {
        // libusb device references are dropped with the iterator.
        Ok(())
    }
}

/// The mediating object between a raw enumerated device and the typed
/// device interface: the per-element descriptor fetch, which can fail
/// without aborting the scan.
pub struct DevicePlugin {
    queried: Option<UsbDevice>,
}

impl Resource for DevicePlugin {
    const KIND: &'static str = "device plugin";

    fn release(&mut self) -> Result<(), ResourceError> {
        self.queried = None;
        Ok(())
    }
}

impl EnumerationCursor for DeviceCursor {
    type Element = Device<GlobalContext>;
    type Plugin = DevicePlugin;
    type Interface = UsbDevice;

    fn next_element(&mut self) -> Result<Option<Device<GlobalContext>>, ResourceError> {
        Ok(self.devices.next())
    }

    fn create_plugin(&mut self, element: &Device<GlobalContext>) -> Result<DevicePlugin, ResourceError> {
        let descriptor = element
            .device_descriptor()
            .map_err(|e| ResourceError::new("reading device descriptor", e))?;
        Ok(DevicePlugin {
            queried: Some(UsbDevice {
                device: element.clone(),
                descriptor,
            }),
        })
    }

    fn query_interface(&mut self, plugin: &mut DevicePlugin) -> Result<UsbDevice, ResourceError> {
        plugin
            .queried
            .take()
            .ok_or_else(|| ResourceError::new("querying device interface", rusb::Error::NotFound))
    }
}

pub struct UsbDevice {
    device: Device<GlobalContext>,
    descriptor: DeviceDescriptor,
}

impl Resource for UsbDevice {
    const KIND: &'static str = "device interface";

    fn release(&mut self) -> Result<(), ResourceError> {
        Ok(())
    }
}

impl DeviceAccess for UsbDevice {
    type Interfaces = InterfaceCursor;
    type VideoInterface = VideoInterface;

    fn vendor_id(&mut self) -> Result<u16, ResourceError> {
        Ok(self.descriptor.vendor_id())
    }

    fn product_id(&mut self) -> Result<u16, ResourceError> {
        Ok(self.descriptor.product_id())
    }

    fn video_control_interfaces(&mut self) -> Result<InterfaceCursor, ResourceError> {
        let handle = self
            .device
            .open()
            .map_err(|e| ResourceError::new("opening device", e))?;
        let config = self
            .device
            .active_config_descriptor()
            .map_err(|e| ResourceError::new("reading configuration descriptor", e))?;

        let mut seeds = Vec::new();
        for interface in config.interfaces() {
            for descriptor in interface.descriptors() {
                if descriptor.class_code() == VIDEO_CLASS
                    && descriptor.sub_class_code() == VIDEO_CONTROL_SUBCLASS
                {
                    seeds.push(InterfaceSeed {
                        number: descriptor.interface_number(),
                        extra: descriptor.extra().to_vec(),
                    });
                }
            }
        }

        debug!("Device advertises {} video control interfaces", seeds.len());
        Ok(InterfaceCursor {
            handle: Some(handle),
            seeds: seeds.into_iter(),
        })
    }
}

pub struct InterfaceSeed {
    number: u8,
    /// Class and vendor descriptor records trailing the interface descriptor.
    extra: Vec<u8>,
}

pub struct InterfaceCursor {
    // libusb exposes one handle per device, handed to the first interface
    // negotiated off this cursor.
    handle: Option<DeviceHandle<GlobalContext>>,
    seeds: std::vec::IntoIter<InterfaceSeed>,
}

impl Resource for InterfaceCursor {
    const KIND: &'static str = "interface enumeration cursor";

    fn release(&mut self) -> Result<(), ResourceError> {
        self.handle = None;
        Ok(())
    }
}

pub struct InterfacePlugin {
    handle: Option<DeviceHandle<GlobalContext>>,
    number: u8,
    extra: Vec<u8>,
}

impl Resource for InterfacePlugin {
    const KIND: &'static str = "interface plugin";

    fn release(&mut self) -> Result<(), ResourceError> {
        self.handle = None;
        Ok(())
    }
}

impl EnumerationCursor for InterfaceCursor {
    type Element = InterfaceSeed;
    type Plugin = InterfacePlugin;
    type Interface = VideoInterface;

    fn next_element(&mut self) -> Result<Option<InterfaceSeed>, ResourceError> {
        Ok(self.seeds.next())
    }

    fn create_plugin(&mut self, element: &InterfaceSeed) -> Result<InterfacePlugin, ResourceError> {
        match self.handle.take() {
            Some(handle) => Ok(InterfacePlugin {
                handle: Some(handle),
                number: element.number,
                extra: element.extra.clone(),
            }),
            // The handle is already bound to an earlier interface; report
            // this element as unusable so the scan continues past it.
            None => Err(ResourceError::new(
                "creating interface plugin",
                rusb::Error::NoMem,
            )),
        }
    }

    fn query_interface(&mut self, plugin: &mut InterfacePlugin) -> Result<VideoInterface, ResourceError> {
        let handle = plugin.handle.take().ok_or_else(|| {
            ResourceError::new("querying interface plugin", rusb::Error::NotFound)
        })?;
        Ok(VideoInterface {
            handle,
            number: plugin.number,
            extra: std::mem::take(&mut plugin.extra),
            offset: 0,
            claimed: false,
        })
    }
}

pub struct VideoInterface {
    handle: DeviceHandle<GlobalContext>,
    number: u8,
    extra: Vec<u8>,
    offset: usize,
    claimed: bool,
}

impl Resource for VideoInterface {
    const KIND: &'static str = "video control interface";

    fn release(&mut self) -> Result<(), ResourceError> {
        self.close()
    }
}

impl InterfaceAccess for VideoInterface {
    fn interface_number(&mut self) -> Result<u8, ResourceError> {
        Ok(self.number)
    }

    fn next_descriptor(&mut self) -> Result<Option<Vec<u8>>, ResourceError> {
        let rest = &self.extra[self.offset.min(self.extra.len())..];
        if rest.len() < 2 {
            return Ok(None);
        }
        let length = rest[0] as usize;
        // An implausible length byte ends the walk rather than guessing at
        // a recovery rule.
        if length < 2 || length > rest.len() {
            return Ok(None);
        }
        self.offset += length;
        Ok(Some(rest[..length].to_vec()))
    }

    fn open(&mut self) -> Result<(), ResourceError> {
        match self.handle.set_auto_detach_kernel_driver(true) {
            Ok(()) | Err(rusb::Error::NotSupported) => {}
            Err(e) => return Err(ResourceError::new("detaching kernel driver", e)),
        }
        self.handle
            .claim_interface(self.number)
            .map_err(|e| ResourceError::new("claiming interface", e))?;
        self.claimed = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ResourceError> {
        if self.claimed {
            self.claimed = false;
            self.handle
                .release_interface(self.number)
                .map_err(|e| ResourceError::new("releasing interface", e))?;
        }
        Ok(())
    }

    fn control_request(&mut self, params: ControlParams, data: &[u8]) -> Result<(), ResourceError> {
        self.handle
            .write_control(
                rusb::request_type(Direction::Out, RequestType::Class, Recipient::Interface),
                params.request,
                params.value,
                params.index,
                data,
                TIMEOUT,
            )
            .map_err(|e| ResourceError::new("control request", e))?;
        Ok(())
    }
}
