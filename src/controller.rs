//! Controller data model: the snapshot handed from the protocol context to the
//! application context, plus the identity and capability data frozen when a
//! controller is seated.

use bitflags::bitflags;

/// Bluetooth device address.
pub type Address = [u8; 6];

/// Broad device category, as reported by the protocol engine's report parser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControllerClass {
    #[default]
    Gamepad,
    Mouse,
    Keyboard,
    BalanceBoard,
}

bitflags! {
    /// Output operations a controller supports.
    ///
    /// Derived once when the controller is seated and immutable for the rest
    /// of the connection; dispatch decisions are made against this frozen
    /// value, never against the live device.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Capabilities: u8 {
        /// Discrete player-indicator LEDs.
        const PLAYER_LEDS = 1 << 0;
        /// RGB lightbar.
        const LIGHTBAR = 1 << 1;
        /// Dual-motor rumble.
        const RUMBLE = 1 << 2;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Capabilities {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Capabilities({:#x})", self.bits());
    }
}

/// Identity and capabilities of a seated controller, copied once at
/// assignment time and immutable for the lifetime of the connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerProperties {
    pub address: Address,
    pub vendor_id: u16,
    pub product_id: u16,
    pub class: ControllerClass,
    pub flags: Capabilities,
}

/// D-pad bit masks for [`ControllerData::dpad`].
pub mod dpad {
    pub const UP: u8 = 1 << 0;
    pub const DOWN: u8 = 1 << 1;
    pub const RIGHT: u8 = 1 << 2;
    pub const LEFT: u8 = 1 << 3;
}

/// Button bit masks for [`ControllerData::buttons`].
pub mod buttons {
    pub const A: u16 = 1 << 0;
    pub const B: u16 = 1 << 1;
    pub const X: u16 = 1 << 2;
    pub const Y: u16 = 1 << 3;
    pub const SHOULDER_L: u16 = 1 << 4;
    pub const SHOULDER_R: u16 = 1 << 5;
    pub const TRIGGER_L: u16 = 1 << 6;
    pub const TRIGGER_R: u16 = 1 << 7;
    pub const THUMB_L: u16 = 1 << 8;
    pub const THUMB_R: u16 = 1 << 9;
}

/// Misc-button bit masks for [`ControllerData::misc_buttons`].
pub mod misc {
    pub const SYSTEM: u8 = 1 << 0;
    pub const SELECT: u8 = 1 << 1;
    pub const START: u8 = 1 << 2;
}

/// One full controller state snapshot.
///
/// Published whole by the protocol context on every input report and copied
/// out whole by the application context, so a reader can never observe a
/// partially updated value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerData {
    /// D-pad state, see [`dpad`].
    pub dpad: u8,
    /// Main button state, see [`buttons`].
    pub buttons: u16,
    /// System/select/start state, see [`misc`].
    pub misc_buttons: u8,
    /// Left stick, signed, centered at 0.
    pub axis_x: i32,
    pub axis_y: i32,
    /// Right stick, signed, centered at 0.
    pub axis_rx: i32,
    pub axis_ry: i32,
    /// Analog triggers.
    pub brake: i32,
    pub throttle: i32,
    /// Raw IMU readings, when the controller reports them.
    pub gyro: [i16; 3],
    pub accel: [i16; 3],
    /// Battery level, 0 = empty, 255 = full.
    pub battery: u8,
}

impl ControllerData {
    pub const fn new() -> Self {
        Self {
            dpad: 0,
            buttons: 0,
            misc_buttons: 0,
            axis_x: 0,
            axis_y: 0,
            axis_rx: 0,
            axis_ry: 0,
            brake: 0,
            throttle: 0,
            gyro: [0; 3],
            accel: [0; 3],
            battery: 0,
        }
    }
}
