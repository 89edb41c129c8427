use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

// Descriptor types.
const ENDPOINT: u8 = 0x05;
const CS_INTERFACE: u8 = 0x24;
const CS_ENDPOINT: u8 = 0x25;
const VENDOR_LOGITECH: u8 = 0x41;

// CS_INTERFACE subtypes.
const VC_HEADER: u8 = 0x01;
const VC_INPUT_TERMINAL: u8 = 0x02;
const VC_OUTPUT_TERMINAL: u8 = 0x03;
const VC_SELECTOR_UNIT: u8 = 0x04;
const VC_PROCESSING_UNIT: u8 = 0x05;
const VC_EXTENSION_UNIT: u8 = 0x06;

// VENDOR_LOGITECH subtypes.
const VENDOR_EXTENSION_UNIT: u8 = 0x01;

const ITT_CAMERA: u16 = 0x0201;

/// A 16-byte extension unit identifier, compared byte-for-byte in the order
/// the device transmits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guid(pub [u8; 16]);

/// Identifies the pan/tilt motor control unit.
pub const MOTOR_GUID: Guid = Guid([
    0x82, 0x06, 0x61, 0x63, 0x70, 0x50, 0xab, 0x49, 0xb8, 0xcc, 0xb3, 0x85, 0x5e, 0x8d, 0x22,
    0x56,
]);

/// Identifies the hardware control unit (LED among others).
pub const HW_CONTROL_GUID: Guid = Guid([
    0x82, 0x06, 0x61, 0x63, 0x70, 0x50, 0xab, 0x49, 0xb8, 0xcc, 0xb3, 0x85, 0x5e, 0x8d, 0x22,
    0x1f,
]);

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, byte) in self.0.iter().enumerate() {
            if matches!(index, 4 | 6 | 8 | 10) {
                write!(f, "-")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// An extension unit record, standard or vendor-tagged. The trailing arrays
/// are variable-length: the source pin list is sized by a pin-count byte,
/// the control bitmap by a size byte that follows the pin list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionUnit {
    pub unit_id: u8,
    pub guid: Guid,
    pub num_controls: u8,
    pub sources: Vec<u8>,
    pub controls: Vec<u8>,
}

/// One decoded class or vendor descriptor record. Unrecognised shapes decode
/// as `Unknown`; they are acknowledged but drive no state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptorRecord {
    Endpoint,
    InterruptEndpoint,
    InterfaceHeader {
        uvc_version: u16,
        total_length: u16,
        clock_frequency: u32,
    },
    InputTerminal {
        terminal_id: u8,
        terminal_type: u16,
    },
    OutputTerminal {
        terminal_id: u8,
    },
    SelectorUnit {
        unit_id: u8,
        sources: Vec<u8>,
    },
    ProcessingUnit {
        unit_id: u8,
        source_id: u8,
    },
    ExtensionUnit(ExtensionUnit),
    VendorExtensionUnit(ExtensionUnit),
    Unknown {
        descriptor_type: u8,
        subtype: Option<u8>,
        length: u8,
    },
}

impl DescriptorRecord {
    /// Decodes one raw record. Returns None only when the record's length
    /// header is implausible, which ends the descriptor walk.
    pub fn parse(bytes: &[u8]) -> Option<DescriptorRecord> {
        if bytes.len() < 2 {
            return None;
        }
        let length = bytes[0];
        if length < 2 || length as usize > bytes.len() {
            return None;
        }
        let descriptor_type = bytes[1];

        let record = match descriptor_type {
            ENDPOINT => DescriptorRecord::Endpoint,
            CS_ENDPOINT => DescriptorRecord::InterruptEndpoint,
            CS_INTERFACE => {
                Self::parse_class_record(bytes).unwrap_or(DescriptorRecord::Unknown {
                    descriptor_type,
                    subtype: bytes.get(2).copied(),
                    length,
                })
            }
            VENDOR_LOGITECH => {
                Self::parse_vendor_record(bytes).unwrap_or(DescriptorRecord::Unknown {
                    descriptor_type,
                    subtype: bytes.get(2).copied(),
                    length,
                })
            }
            _ => DescriptorRecord::Unknown {
                descriptor_type,
                subtype: None,
                length,
            },
        };
        Some(record)
    }

    fn parse_class_record(bytes: &[u8]) -> Option<DescriptorRecord> {
        let subtype = *bytes.get(2)?;
        let record = match subtype {
            VC_HEADER => DescriptorRecord::InterfaceHeader {
                uvc_version: LittleEndian::read_u16(bytes.get(3..5)?),
                total_length: LittleEndian::read_u16(bytes.get(5..7)?),
                clock_frequency: LittleEndian::read_u32(bytes.get(7..11)?),
            },
            VC_INPUT_TERMINAL => DescriptorRecord::InputTerminal {
                terminal_id: *bytes.get(3)?,
                terminal_type: LittleEndian::read_u16(bytes.get(4..6)?),
            },
            VC_OUTPUT_TERMINAL => DescriptorRecord::OutputTerminal {
                terminal_id: *bytes.get(3)?,
            },
            VC_SELECTOR_UNIT => {
                let unit_id = *bytes.get(3)?;
                let pins = *bytes.get(4)? as usize;
                DescriptorRecord::SelectorUnit {
                    unit_id,
                    sources: bytes.get(5..5 + pins)?.to_vec(),
                }
            }
            VC_PROCESSING_UNIT => DescriptorRecord::ProcessingUnit {
                unit_id: *bytes.get(3)?,
                source_id: *bytes.get(4)?,
            },
            VC_EXTENSION_UNIT => {
                DescriptorRecord::ExtensionUnit(Self::parse_extension_unit(bytes)?)
            }
            _ => return None,
        };
        Some(record)
    }

    fn parse_vendor_record(bytes: &[u8]) -> Option<DescriptorRecord> {
        match *bytes.get(2)? {
            VENDOR_EXTENSION_UNIT => Some(DescriptorRecord::VendorExtensionUnit(
                Self::parse_extension_unit(bytes)?,
            )),
            _ => None,
        }
    }

    fn parse_extension_unit(bytes: &[u8]) -> Option<ExtensionUnit> {
        let unit_id = *bytes.get(3)?;
        let guid = Guid(bytes.get(4..20)?.try_into().ok()?);
        let num_controls = *bytes.get(20)?;
        let pins = *bytes.get(21)? as usize;
        let sources = bytes.get(22..22 + pins)?.to_vec();
        let control_size = *bytes.get(22 + pins)? as usize;
        let controls = bytes.get(23 + pins..23 + pins + control_size)?.to_vec();
        Some(ExtensionUnit {
            unit_id,
            guid,
            num_controls,
            sources,
            controls,
        })
    }

    /// The extension unit payload, regardless of which type tag carried it.
    pub fn extension_unit(&self) -> Option<&ExtensionUnit> {
        match self {
            DescriptorRecord::ExtensionUnit(unit)
            | DescriptorRecord::VendorExtensionUnit(unit) => Some(unit),
            _ => None,
        }
    }
}

impl fmt::Display for DescriptorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorRecord::Endpoint => write!(f, "USB Endpoint"),
            DescriptorRecord::InterruptEndpoint => write!(f, "VC Interrupt Endpoint"),
            DescriptorRecord::InterfaceHeader { uvc_version, .. } => {
                write!(f, "VC Interface Header (UVC {:x}.{:02x})", uvc_version >> 8, uvc_version & 0xff)
            }
            DescriptorRecord::InputTerminal {
                terminal_id,
                terminal_type,
            } => {
                if *terminal_type == ITT_CAMERA {
                    write!(f, "VC Camera Terminal id={}", terminal_id)
                } else {
                    write!(f, "VC Input Terminal id={}", terminal_id)
                }
            }
            DescriptorRecord::OutputTerminal { terminal_id } => {
                write!(f, "VC Output Terminal id={}", terminal_id)
            }
            DescriptorRecord::SelectorUnit { unit_id, .. } => {
                write!(f, "VC Selector Unit id={}", unit_id)
            }
            DescriptorRecord::ProcessingUnit { unit_id, .. } => {
                write!(f, "VC Processing Unit id={}", unit_id)
            }
            DescriptorRecord::ExtensionUnit(unit) => {
                write!(f, "VC Extension Unit id={} guid={}", unit.unit_id, unit.guid)
            }
            DescriptorRecord::VendorExtensionUnit(unit) => {
                write!(
                    f,
                    "Logitech Extension Unit id={} guid={}",
                    unit.unit_id, unit.guid
                )
            }
            DescriptorRecord::Unknown {
                descriptor_type,
                subtype,
                length,
            } => match subtype {
                Some(subtype) => write!(
                    f,
                    "Unknown descriptor type=0x{:02x} subtype=0x{:02x} len={}",
                    descriptor_type, subtype, length
                ),
                None => write!(
                    f,
                    "Unknown descriptor type=0x{:02x} len={}",
                    descriptor_type, length
                ),
            },
        }
    }
}
