use crate::error::ProtocolError;
use byteorder::{BigEndian, ByteOrder};
use strum::Display;

/// SET_CUR, the only request code the tool issues.
pub const UVC_SET_CUR: u8 = 0x01;

// Motor unit selectors and values.
pub const MOTOR_PANTILT_RELATIVE_SELECTOR: u8 = 0x01;
const MOTOR_PANTILT_RELATIVE_ENABLE: u8 = 0x80;
pub const MOTOR_PANTILT_RESET_SELECTOR: u8 = 0x02;
const MOTOR_PANTILT_RESET_VALUE: u8 = 0x03;
/// Present on the motor unit, no command drives it yet.
pub const MOTOR_FOCUS_SELECTOR: u8 = 0x03;

// Hardware control unit selectors.
pub const HW_CONTROL_LED1_SELECTOR: u8 = 0x01;

pub const MAX_PAYLOAD: usize = 32;

/// Which discovered extension unit a request addresses.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum TargetUnit {
    #[strum(serialize = "motor")]
    Motor,
    #[strum(serialize = "hardware control")]
    HwControl,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum LedMode {
    Off = 0x00,
    On = 0x01,
    Blinking = 0x02,
    Auto = 0x03,
}

/// One vendor control payload, built once and sent once.
#[derive(Debug, Clone)]
pub struct Request {
    unit: TargetUnit,
    selector: u8,
    data: [u8; MAX_PAYLOAD],
    length: usize,
}

impl Request {
    pub fn new(unit: TargetUnit, selector: u8, payload: &[u8]) -> Result<Self, ProtocolError> {
        if payload.len() > MAX_PAYLOAD {
            return Err(ProtocolError::PayloadTooLong(payload.len()));
        }
        let mut data = [0; MAX_PAYLOAD];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            unit,
            selector,
            data,
            length: payload.len(),
        })
    }

    fn fixed<const N: usize>(unit: TargetUnit, selector: u8, payload: [u8; N]) -> Self {
        let mut data = [0; MAX_PAYLOAD];
        data[..N].copy_from_slice(&payload);
        Self {
            unit,
            selector,
            data,
            length: N,
        }
    }

    /// Moves the motor one relative step per axis. Deltas are in terms of
    /// what the image appears to do, as if dragging a window: positive
    /// `left` shifts the image left, positive `up` shifts it up. A zero
    /// delta leaves that axis untouched. The device encodes positive
    /// magnitudes offset by one relative to negative ones.
    pub fn pan_tilt_relative(left: i8, up: i8) -> Self {
        let mut payload = [0u8; 4];
        if left != 0 {
            payload[0] = MOTOR_PANTILT_RELATIVE_ENABLE;
            payload[1] = (if left < 0 { left } else { left - 1 }) as u8;
        }
        if up != 0 {
            payload[2] = MOTOR_PANTILT_RELATIVE_ENABLE;
            payload[3] = (if up < 0 { up } else { up - 1 }) as u8;
        }
        Self::fixed(TargetUnit::Motor, MOTOR_PANTILT_RELATIVE_SELECTOR, payload)
    }

    /// Returns the pan/tilt mechanism to its home position.
    pub fn pan_tilt_reset() -> Self {
        Self::fixed(
            TargetUnit::Motor,
            MOTOR_PANTILT_RESET_SELECTOR,
            [MOTOR_PANTILT_RESET_VALUE],
        )
    }

    /// Sets the LED mode. `frequency` is in units of 0.05 Hz and only
    /// matters for the blinking mode; the device wants it big-endian.
    pub fn led_control(mode: LedMode, frequency: u16) -> Self {
        let mut payload = [0u8; 3];
        payload[0] = mode as u8;
        BigEndian::write_u16(&mut payload[1..3], frequency);
        Self::fixed(TargetUnit::HwControl, HW_CONTROL_LED1_SELECTOR, payload)
    }

    pub fn unit(&self) -> TargetUnit {
        self.unit
    }

    pub fn selector(&self) -> u8 {
        self.selector
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.length]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pan_tilt_positive_delta_encodes_offset_by_one() {
        let request = Request::pan_tilt_relative(1, 0);
        assert_eq!(request.unit(), TargetUnit::Motor);
        assert_eq!(request.selector(), MOTOR_PANTILT_RELATIVE_SELECTOR);
        assert_eq!(request.payload(), &[0x80, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn pan_tilt_negative_delta_encodes_unmodified() {
        let request = Request::pan_tilt_relative(-1, 0);
        assert_eq!(request.payload(), &[0x80, 0xff, 0x00, 0x00]);
    }

    #[test]
    fn pan_tilt_zero_deltas_leave_both_axes_untouched() {
        let request = Request::pan_tilt_relative(0, 0);
        assert_eq!(request.payload(), &[0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn tilt_axis_encodes_independently() {
        let request = Request::pan_tilt_relative(0, -3);
        assert_eq!(request.payload(), &[0x00, 0x00, 0x80, 0xfd]);
        let request = Request::pan_tilt_relative(0, 3);
        assert_eq!(request.payload(), &[0x00, 0x00, 0x80, 0x02]);
    }

    #[test]
    fn reset_is_a_single_fixed_byte() {
        let request = Request::pan_tilt_reset();
        assert_eq!(request.unit(), TargetUnit::Motor);
        assert_eq!(request.selector(), MOTOR_PANTILT_RESET_SELECTOR);
        assert_eq!(request.payload(), &[0x03]);
    }

    #[test]
    fn led_frequency_is_stored_big_endian() {
        let request = Request::led_control(LedMode::On, 20);
        assert_eq!(request.unit(), TargetUnit::HwControl);
        assert_eq!(request.selector(), HW_CONTROL_LED1_SELECTOR);
        assert_eq!(request.payload(), &[0x01, 0x00, 0x14]);
    }

    #[test]
    fn led_modes_carry_their_wire_values() {
        assert_eq!(Request::led_control(LedMode::Off, 0).payload()[0], 0x00);
        assert_eq!(Request::led_control(LedMode::Blinking, 40).payload()[0], 0x02);
        assert_eq!(Request::led_control(LedMode::Auto, 0).payload()[0], 0x03);
    }

    #[test]
    fn oversized_payloads_are_a_protocol_error() {
        let payload = [0u8; MAX_PAYLOAD + 1];
        let result = Request::new(TargetUnit::Motor, MOTOR_FOCUS_SELECTOR, &payload);
        assert_eq!(
            result.err(),
            Some(crate::error::ProtocolError::PayloadTooLong(MAX_PAYLOAD + 1))
        );
    }

    #[test]
    fn bounded_payloads_are_accepted() {
        let payload = [0u8; MAX_PAYLOAD];
        let request = Request::new(TargetUnit::Motor, MOTOR_FOCUS_SELECTOR, &payload)
            .expect("a full payload fits");
        assert_eq!(request.payload().len(), MAX_PAYLOAD);
    }
}
