//! Boundary traits toward the protocol engine.
//!
//! The engine owns the live device objects and the Bluetooth link; the bridge
//! only ever touches them through [`HidDevice`] and [`Engine`], and the engine
//! drives the bridge through the [`Platform`] lifecycle hooks.

use crate::controller::{Address, Capabilities, ControllerClass, ControllerData, ControllerProperties};
use crate::slot::SlotIndex;
use crate::Error;

/// One live HID device, owned by the protocol engine.
///
/// Only the protocol context may hold one of these; the application context
/// reaches devices exclusively through the bridge's command queue.
pub trait HidDevice {
    fn address(&self) -> Address;
    fn vendor_id(&self) -> u16;
    fn product_id(&self) -> u16;
    fn controller_class(&self) -> ControllerClass;

    /// Output operations this device supports right now.
    ///
    /// The bridge reads this exactly once, when the device is seated; later
    /// changes are not observed.
    fn capabilities(&self) -> Capabilities;

    /// Slot tag stored on the device by the bridge (the engine must persist
    /// it for the lifetime of the connection, like any other per-device
    /// platform data).
    fn slot(&self) -> Option<SlotIndex>;
    fn set_slot(&mut self, slot: Option<SlotIndex>);

    fn set_player_leds(&mut self, mask: u8);
    fn set_lightbar_color(&mut self, r: u8, g: u8, b: u8);
    fn play_dual_rumble(&mut self, delay_ms: u16, duration_ms: u16, weak: u8, strong: u8);
}

/// Engine-global services the bridge calls back into.
pub trait Engine {
    type Device: HidDevice;

    /// Find the live device matching `predicate`, if any.
    fn device_where(
        &mut self,
        predicate: impl FnMut(&Self::Device) -> bool,
    ) -> Option<&mut Self::Device>;

    /// Request disconnection of the device with the given address.
    ///
    /// Must not tear the device down inline: the request may be issued from
    /// within a callback nested in the engine's own dispatch for that same
    /// device. The engine performs the actual teardown at a safe point of its
    /// choosing.
    fn request_disconnect(&mut self, address: Address);

    /// Delete all stored bond keys. Callable from any context.
    fn delete_bond_keys(&self);
}

/// Out-of-band events forwarded by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OobEvent {
    /// The system button on a controller was pressed.
    SystemButton,
    /// The radio was switched on or off.
    BluetoothEnabled(bool),
}

/// Key for engine property queries routed through [`Platform::get_property`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PropertyKey(pub u16);

/// Value of an engine property.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PropertyValue {
    Bool(bool),
    U8(u8),
    U32(u32),
    Str(&'static str),
}

/// Lifecycle hooks the engine invokes around its own device state machine.
///
/// All of them run on the protocol context. They are the only points where
/// the bridge observes or mutates device lifecycle.
pub trait Platform<E: Engine> {
    /// Engine bring-up has started. Storage is static, nothing to allocate.
    fn on_init(&self) {}

    /// Engine bring-up has finished; connections may arrive from here on.
    fn on_init_complete(&self) {}

    /// A device connected but is not yet usable (pairing/parsing pending).
    fn on_device_connected(&self, device: &mut E::Device);

    /// A device went away. The slot, if any, is reclaimed unconditionally.
    fn on_device_disconnected(&self, device: &mut E::Device);

    /// A device finished setup and wants a seat. Returns the assigned slot,
    /// or rejects the connection.
    fn on_device_ready(&self, device: &mut E::Device) -> Result<SlotIndex, Error>;

    /// Fresh input arrived for the device tagged `source`. Queued output
    /// commands are dispatched before the new snapshot is published.
    fn on_controller_data(
        &self,
        engine: &mut E,
        source: Option<SlotIndex>,
        data: &ControllerData,
    );

    /// Out-of-band engine event; the bridge has no use for these.
    fn on_oob_event(&self, event: OobEvent) {
        let _ = event;
    }

    /// Engine property lookup; the bridge exposes none.
    fn get_property(&self, key: PropertyKey) -> Option<PropertyValue> {
        let _ = key;
        None
    }
}

/// Freeze a device's identity and output capabilities into the immutable
/// per-slot properties. Called exactly once per connection, at seat time.
pub fn derive_properties<D: HidDevice>(device: &D) -> ControllerProperties {
    ControllerProperties {
        address: device.address(),
        vendor_id: device.vendor_id(),
        product_id: device.product_id(),
        class: device.controller_class(),
        flags: device.capabilities(),
    }
}
