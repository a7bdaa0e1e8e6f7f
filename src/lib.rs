//! Controller-state bridge for Bluetooth HID host firmware.
//!
//! A HID host engine (pairing, report parsing, the radio itself) runs on its
//! own execution context and must never stall; the application that actually
//! consumes controller input runs on another. This crate is the seam between
//! the two: a fixed set of controller seats, a latest-value snapshot mailbox
//! per seat, and a bounded queue of output commands (LEDs, lightbar, rumble,
//! disconnect) flowing back toward the devices. Everything is statically
//! allocated and nothing on either side ever waits for the other.
//!
//! The engine drives the bridge through the [`Platform`] lifecycle hooks and
//! exposes its devices via [`HidDevice`] and [`Engine`]; the application uses
//! the accessor methods on [`Bridge`] directly.
//!
//! ```no_run
//! use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
//! use padbridge::{Bridge, SlotIndex};
//! # use critical_section as _;
//!
//! static BRIDGE: Bridge<CriticalSectionRawMutex, 4, 16> = Bridge::new();
//!
//! // Application context, e.g. the main game loop:
//! fn poll_player_one() {
//!     let slot = SlotIndex::new(0);
//!     if let Ok(snapshot) = BRIDGE.read_snapshot(slot) {
//!         if snapshot.buttons & padbridge::controller::buttons::A != 0 {
//!             let _ = BRIDGE.play_dual_rumble(slot, 0, 150, 0x40, 0xc0);
//!         }
//!     }
//! }
//! ```
//!
//! Logging goes through `defmt` or `log`, selected by the feature of the same
//! name; with neither enabled it compiles out entirely.

#![no_std]

// Must come first so the logging macros are visible to the other modules.
mod fmt;

pub mod bridge;
pub mod command;
pub mod controller;
pub mod device;
pub mod slot;

pub use bridge::Bridge;
pub use command::{Command, PendingCommand};
pub use controller::{
    Address, Capabilities, ControllerClass, ControllerData, ControllerProperties,
};
pub use device::{Engine, HidDevice, OobEvent, Platform, PropertyKey, PropertyValue};
pub use slot::{SlotIndex, SlotTable};

/// Status codes surfaced by the bridge. Never escalated to a panic: every
/// bounds and occupancy violation is reported to the caller and logged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Slot index out of range, or no controller seated there.
    InvalidDevice,
    /// No fresh snapshot since the last read.
    NoData,
    /// Every seat is taken; the connection is rejected.
    NoSlots,
    /// Internal consistency violation: the device is already (or never was)
    /// seated when the opposite was expected.
    InvalidController,
    /// The command queue is full; the command was dropped, not retried.
    QueueFull,
}
