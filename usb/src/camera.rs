use crate::descriptor::{DescriptorRecord, HW_CONTROL_GUID, MOTOR_GUID};
use crate::device::base::{ControlParams, DeviceAccess, InterfaceAccess, UsbBackend};
use crate::error::{Error, NotFound, ResourceError};
use crate::handle::ScopedHandle;
use crate::request::{Request, TargetUnit, UVC_SET_CUR};
use crate::sequence::HandleSequence;
use crate::{PID_ORBIT_AF, VID_LOGITECH};
use log::{debug, warn};

/// Scans all attached USB devices and returns the first Orbit AF, or None
/// if no device matches. Remaining candidates are left unexamined.
pub fn find_device<B: UsbBackend>(
    backend: &mut B,
) -> Result<Option<ScopedHandle<B::Device>>, ResourceError> {
    let mut devices = HandleSequence::start(backend.usb_devices()?)?;
    while let Some(device) = devices.current_mut() {
        let vendor = device.vendor_id()?;
        let product = device.product_id()?;
        debug!("Found vendor 0x{:04x} product 0x{:04x}", vendor, product);
        if vendor == VID_LOGITECH && product == PID_ORBIT_AF {
            return Ok(Some(devices.take_current()));
        }
        devices.advance()?;
    }
    Ok(None)
}

/// Returns the device's first video control interface, or None if the
/// device advertises none.
pub fn find_video_interface<D: DeviceAccess>(
    device: &mut D,
) -> Result<Option<ScopedHandle<D::VideoInterface>>, ResourceError> {
    let mut interfaces = HandleSequence::start(device.video_control_interfaces()?)?;
    if interfaces.current().is_some() {
        Ok(Some(interfaces.take_current()))
    } else {
        Ok(None)
    }
}

/// The selected video control interface, with whichever extension units the
/// descriptor walk resolved. Owns its interface handle exclusively; created
/// once per invocation and consumed by a single send.
pub struct Camera<I: InterfaceAccess> {
    interface: ScopedHandle<I>,
    interface_number: u8,
    motor_unit: Option<u8>,
    hw_control_unit: Option<u8>,
}

impl<I: InterfaceAccess> Camera<I> {
    /// Walks the interface's associated descriptor records, resolving the
    /// motor and hardware control unit ids by GUID. A repeated GUID
    /// overwrites: the most recently walked record wins. Returns the camera
    /// together with the decoded records; unit resolution is not checked
    /// here but at send time.
    pub fn scan(
        mut interface: ScopedHandle<I>,
    ) -> Result<(Camera<I>, Vec<DescriptorRecord>), Error> {
        let Some(access) = interface.get_mut() else {
            return Err(NotFound::VideoInterface.into());
        };
        let interface_number = access.interface_number()?;
        debug!("Video interface number is {}", interface_number);

        let mut motor_unit = None;
        let mut hw_control_unit = None;
        let mut records = Vec::new();
        while let Some(bytes) = access.next_descriptor()? {
            let Some(record) = DescriptorRecord::parse(&bytes) else {
                warn!("Descriptor record with an implausible length, stopping the walk");
                break;
            };
            debug!("{}", record);
            if let Some(unit) = record.extension_unit() {
                if unit.guid == MOTOR_GUID {
                    motor_unit = Some(unit.unit_id);
                } else if unit.guid == HW_CONTROL_GUID {
                    hw_control_unit = Some(unit.unit_id);
                }
            }
            records.push(record);
        }

        Ok((
            Camera {
                interface,
                interface_number,
                motor_unit,
                hw_control_unit,
            },
            records,
        ))
    }

    pub fn interface_number(&self) -> u8 {
        self.interface_number
    }

    pub fn motor_unit(&self) -> Option<u8> {
        self.motor_unit
    }

    pub fn hw_control_unit(&self) -> Option<u8> {
        self.hw_control_unit
    }

    /// Issues exactly one control transfer for the request. The interface
    /// is opened before the transfer and closed on every exit path.
    pub fn send(&mut self, request: &Request) -> Result<(), Error> {
        let unit_id = match request.unit() {
            TargetUnit::Motor => self.motor_unit,
            TargetUnit::HwControl => self.hw_control_unit,
        }
        .ok_or(NotFound::Unit(request.unit()))?;

        let Some(access) = self.interface.get_mut() else {
            return Err(NotFound::VideoInterface.into());
        };

        let params = ControlParams {
            request: UVC_SET_CUR,
            value: (request.selector() as u16) << 8,
            index: ((unit_id as u16) << 8) | self.interface_number as u16,
        };
        debug!(
            "SET_CUR value=0x{:04x} index=0x{:04x} payload={:02x?}",
            params.value,
            params.index,
            request.payload()
        );

        access.open()?;
        let sent = access.control_request(params, request.payload());
        let closed = access.close();
        sent?;
        closed?;
        Ok(())
    }
}

/// Locates the camera and walks its descriptors in one step: the device
/// catalog, the interface catalog, then the descriptor scan. Missing device
/// or interface reports as the distinct not-found condition.
pub fn attach<B: UsbBackend>(
    backend: &mut B,
) -> Result<(Camera<B::VideoInterface>, Vec<DescriptorRecord>), Error> {
    let mut device = find_device(backend)?.ok_or(NotFound::Device)?;
    let Some(access) = device.get_mut() else {
        return Err(NotFound::Device.into());
    };
    let interface = find_video_interface(access)?.ok_or(NotFound::VideoInterface)?;
    device.release();
    Camera::scan(interface)
}
