pub use rusb;
pub mod camera;
pub mod descriptor;
pub mod error;
pub mod handle;
pub mod request;
pub mod sequence;

pub mod device;

// The one supported device family, the Logitech QuickCam Orbit AF.
pub const VID_LOGITECH: u16 = 0x046d;
pub const PID_ORBIT_AF: u16 = 0x0994;
