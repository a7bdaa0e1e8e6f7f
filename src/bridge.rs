//! The cross-context bridge itself.
//!
//! The protocol context (the task running the Bluetooth/HID engine) and the
//! application context never call into each other directly. Everything they
//! share lives in one [`Bridge`] value: the seat registry with its snapshot
//! mailboxes behind a single short-held mutex, and the bounded command queue.
//! Neither side ever blocks on the other; in particular the protocol context,
//! which also drives the radio, only ever takes the mutex for a fixed-size
//! struct copy and only ever polls the queue non-blocking.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::command::{Command, CommandQueue, PendingCommand};
use crate::controller::{Capabilities, ControllerData, ControllerProperties};
use crate::device::{derive_properties, Engine, HidDevice, Platform};
use crate::slot::{SlotIndex, SlotTable};
use crate::Error;

/// Controller-state bridge between the protocol context and the application
/// context.
///
/// `MAX` is the number of controller seats, `DEPTH` the command queue
/// capacity. Construction is `const`, so the bridge normally lives in a
/// `static` shared by both contexts:
///
/// ```
/// use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
/// use padbridge::Bridge;
/// # use critical_section as _;
///
/// static BRIDGE: Bridge<CriticalSectionRawMutex, 4, 16> = Bridge::new();
/// ```
pub struct Bridge<M: RawMutex, const MAX: usize, const DEPTH: usize> {
    // One lock covers occupancy, properties and snapshots, so the application
    // context can never read identity fields of a slot that the protocol
    // context is concurrently seating or vacating.
    table: Mutex<M, RefCell<SlotTable<MAX>>>,
    queue: CommandQueue<M, DEPTH>,
}

impl<M: RawMutex, const MAX: usize, const DEPTH: usize> Bridge<M, MAX, DEPTH> {
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(RefCell::new(SlotTable::new())),
            queue: CommandQueue::new(),
        }
    }

    fn with_table<R>(&self, f: impl FnOnce(&mut SlotTable<MAX>) -> R) -> R {
        self.table.lock(|cell| f(&mut cell.borrow_mut()))
    }

    //
    // Application-context API. Synchronous and non-blocking throughout.
    //

    /// Copy out the freshest snapshot for `slot`, consuming it.
    ///
    /// [`Error::NoData`] means nothing new arrived since the last read; a
    /// slow reader only ever sees the most recent value, never a backlog.
    pub fn read_snapshot(&self, slot: SlotIndex) -> Result<ControllerData, Error> {
        self.with_table(|t| t.take(slot))
    }

    /// Identity and capability flags frozen when the controller was seated.
    pub fn read_properties(&self, slot: SlotIndex) -> Result<ControllerProperties, Error> {
        self.with_table(|t| t.properties(slot))
    }

    /// Queue a player-LED update for the controller on `slot`.
    pub fn set_player_leds(&self, slot: SlotIndex, mask: u8) -> Result<(), Error> {
        self.enqueue(slot, Command::SetPlayerLeds { mask })
    }

    /// Queue a lightbar color change for the controller on `slot`.
    pub fn set_lightbar_color(&self, slot: SlotIndex, r: u8, g: u8, b: u8) -> Result<(), Error> {
        self.enqueue(slot, Command::SetLightbarColor { r, g, b })
    }

    /// Queue a dual-motor rumble pulse for the controller on `slot`.
    pub fn play_dual_rumble(
        &self,
        slot: SlotIndex,
        delay_ms: u16,
        duration_ms: u16,
        weak: u8,
        strong: u8,
    ) -> Result<(), Error> {
        self.enqueue(slot, Command::Rumble { delay_ms, duration_ms, weak, strong })
    }

    /// Queue a disconnect request for the controller on `slot`. Teardown is
    /// deferred to a safe point inside the engine, never performed inline.
    pub fn disconnect(&self, slot: SlotIndex) -> Result<(), Error> {
        self.enqueue(slot, Command::Disconnect)
    }

    /// Delete all stored bond keys. Forwarded straight to the engine,
    /// bypassing the command queue.
    pub fn forget_bond_keys<E: Engine>(&self, engine: &E) {
        engine.delete_bond_keys();
    }

    /// Fire-and-forget insert. A full queue reports [`Error::QueueFull`] and
    /// the command is lost; output commands are cheap to lose relative to the
    /// cost of ever blocking here.
    fn enqueue(&self, slot: SlotIndex, command: Command) -> Result<(), Error> {
        self.with_table(|t| t.check_occupied(slot))?;
        self.queue
            .try_send(PendingCommand { slot, command })
            .map_err(|_| Error::QueueFull)
    }

    //
    // Protocol-context side.
    //

    /// Pop and dispatch every currently queued command, in enqueue order.
    ///
    /// Commands whose slot was vacated, or whose device the engine can no
    /// longer find, are logged and discarded; the rest of the queue is still
    /// processed. Outputs are gated on the capability flags frozen at seat
    /// time.
    fn drain<E: Engine>(&self, engine: &mut E) {
        while let Ok(pending) = self.queue.try_receive() {
            let slot = pending.slot;

            let caps = match self.with_table(|t| t.properties(slot)) {
                Ok(p) => p.flags,
                Err(_) => {
                    warn!("discarding command for vacated slot {}", slot.raw());
                    continue;
                }
            };

            let Some(device) = engine.device_where(|d| d.slot() == Some(slot)) else {
                error!("no live device behind slot {}, discarding command", slot.raw());
                continue;
            };

            let mut disconnect = None;
            match pending.command {
                Command::SetLightbarColor { r, g, b } => {
                    if caps.contains(Capabilities::LIGHTBAR) {
                        device.set_lightbar_color(r, g, b);
                    }
                }
                Command::SetPlayerLeds { mask } => {
                    if caps.contains(Capabilities::PLAYER_LEDS) {
                        device.set_player_leds(mask);
                    }
                }
                Command::Rumble { delay_ms, duration_ms, weak, strong } => {
                    if caps.contains(Capabilities::RUMBLE) {
                        device.play_dual_rumble(delay_ms, duration_ms, weak, strong);
                    }
                }
                Command::Disconnect => {
                    // The dispatch may be nested inside the engine's own call
                    // stack for this device; hand the address back so the
                    // engine tears it down at a safe point.
                    disconnect = Some(device.address());
                }
            }
            if let Some(address) = disconnect {
                engine.request_disconnect(address);
            }
        }
    }
}

impl<M: RawMutex, const MAX: usize, const DEPTH: usize> Bridge<M, MAX, DEPTH> {
    //
    // Protocol-context lifecycle hooks. The engine normally reaches these
    // through the [`Platform`] impl below; they are inherent methods too so
    // direct callers get full type inference.
    //

    /// Engine bring-up has started. Storage is static, nothing to allocate.
    pub fn on_init(&self) {
        debug!("bridge init, {} seats, queue depth {}", MAX, DEPTH);
    }

    /// Engine bring-up has finished; connections may arrive from here on.
    pub fn on_init_complete(&self) {
        debug!("bridge ready");
    }

    /// A device connected but is not yet usable.
    pub fn on_device_connected<D: HidDevice>(&self, device: &mut D) {
        // Not seated until the engine reports it ready.
        device.set_slot(None);
    }

    /// A device went away; its seat, if any, is reclaimed unconditionally,
    /// even with commands for it still queued (those are discarded at the
    /// next drain).
    pub fn on_device_disconnected<D: HidDevice>(&self, device: &mut D) {
        let Some(slot) = device.slot() else {
            // Never seated (e.g. rejected at capacity); nothing to reclaim.
            return;
        };
        self.with_table(|t| t.free(slot));
        device.set_slot(None);
        info!("controller on slot {} disconnected", slot.raw());
    }

    /// Seat a device that finished setup. Fails with [`Error::NoSlots`] at
    /// capacity, or [`Error::InvalidController`] if the device already holds
    /// a seat; the connection is then rejected with no state touched.
    pub fn on_device_ready<D: HidDevice>(&self, device: &mut D) -> Result<SlotIndex, Error> {
        if device.slot().is_some() {
            error!("device already seated, rejecting duplicate ready");
            return Err(Error::InvalidController);
        }

        let properties = derive_properties(device);
        let slot = match self.with_table(|t| t.assign(properties)) {
            Ok(slot) => slot,
            Err(e) => {
                info!("no free seats, rejecting connection");
                return Err(e);
            }
        };
        device.set_slot(Some(slot));
        info!("controller seated on slot {}", slot.raw());

        // Light up the player number right away, while we are already on the
        // protocol context.
        if properties.flags.contains(Capabilities::PLAYER_LEDS) {
            device.set_player_leds(slot.raw() + 1);
        }
        Ok(slot)
    }

    /// Fresh input arrived for the device tagged `source`: drain the command
    /// queue, then publish the new snapshot.
    pub fn on_controller_data<E: Engine>(
        &self,
        engine: &mut E,
        source: Option<SlotIndex>,
        data: &ControllerData,
    ) {
        // All commands queued so far are dispatched before the new snapshot
        // becomes visible.
        self.drain(engine);

        let Some(slot) = source else {
            error!("controller data from a device without a seat");
            return;
        };
        if self.with_table(|t| t.publish(slot, *data)).is_err() {
            error!("controller data for vacant slot {}", slot.raw());
        }
    }
}

impl<M: RawMutex, const MAX: usize, const DEPTH: usize> Default for Bridge<M, MAX, DEPTH> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M, E, const MAX: usize, const DEPTH: usize> Platform<E> for Bridge<M, MAX, DEPTH>
where
    M: RawMutex,
    E: Engine,
{
    fn on_init(&self) {
        Bridge::on_init(self);
    }

    fn on_init_complete(&self) {
        Bridge::on_init_complete(self);
    }

    fn on_device_connected(&self, device: &mut E::Device) {
        Bridge::on_device_connected(self, device);
    }

    fn on_device_disconnected(&self, device: &mut E::Device) {
        Bridge::on_device_disconnected(self, device);
    }

    fn on_device_ready(&self, device: &mut E::Device) -> Result<SlotIndex, Error> {
        Bridge::on_device_ready(self, device)
    }

    fn on_controller_data(
        &self,
        engine: &mut E,
        source: Option<SlotIndex>,
        data: &ControllerData,
    ) {
        Bridge::on_controller_data(self, engine, source, data);
    }
}
