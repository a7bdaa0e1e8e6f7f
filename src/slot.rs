//! Fixed-capacity controller seat registry.
//!
//! Pure data structure: all cross-context locking lives in
//! [`Bridge`](crate::Bridge), which keeps the whole table behind a single
//! mutex so occupancy checks, property reads and snapshot transfers are never
//! observed half-applied.

use crate::controller::{ControllerData, ControllerProperties};
use crate::Error;

/// Index of a seated controller, 0..capacity-1.
///
/// Stable for the whole occupancy: a slot is never handed to another device
/// while the current one is still connected. "No slot assigned yet" is
/// `Option<SlotIndex>::None`, not a sentinel value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotIndex(u8);

impl SlotIndex {
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u8 {
        self.0
    }

    const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One occupied seat: frozen identity plus the latest-snapshot mailbox cell.
#[derive(Clone, Copy)]
struct SlotEntry {
    properties: ControllerProperties,
    snapshot: ControllerData,
    fresh: bool,
}

/// Arena of `N` controller seats.
///
/// Vacant entries are `None`; occupancy never exceeds `N`. Assignment and
/// freeing are driven by the protocol context only.
pub struct SlotTable<const N: usize> {
    entries: [Option<SlotEntry>; N],
}

impl<const N: usize> SlotTable<N> {
    pub const fn new() -> Self {
        Self { entries: [None; N] }
    }

    /// Seat a controller on the first vacant slot.
    ///
    /// Fails with [`Error::NoSlots`] when the table is full; nothing is
    /// mutated on failure.
    pub fn assign(&mut self, properties: ControllerProperties) -> Result<SlotIndex, Error> {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if entry.is_none() {
                *entry = Some(SlotEntry {
                    properties,
                    snapshot: ControllerData::new(),
                    fresh: false,
                });
                return Ok(SlotIndex(i as u8));
            }
        }
        Err(Error::NoSlots)
    }

    /// Vacate a slot and discard its snapshot. Freeing a vacant or
    /// out-of-range slot is a no-op.
    pub fn free(&mut self, idx: SlotIndex) {
        if let Some(entry) = self.entries.get_mut(idx.index()) {
            *entry = None;
        }
    }

    fn entry(&self, idx: SlotIndex) -> Result<&SlotEntry, Error> {
        self.entries
            .get(idx.index())
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidDevice)
    }

    fn entry_mut(&mut self, idx: SlotIndex) -> Result<&mut SlotEntry, Error> {
        self.entries
            .get_mut(idx.index())
            .and_then(Option::as_mut)
            .ok_or(Error::InvalidDevice)
    }

    /// Frozen identity and capability flags of the seated controller.
    pub fn properties(&self, idx: SlotIndex) -> Result<ControllerProperties, Error> {
        self.entry(idx).map(|e| e.properties)
    }

    /// Fails with [`Error::InvalidDevice`] when the slot is vacant or out of
    /// range.
    pub fn check_occupied(&self, idx: SlotIndex) -> Result<(), Error> {
        self.entry(idx).map(|_| ())
    }

    /// Overwrite the slot's snapshot with the newest value. Last write wins;
    /// an unread previous value is simply replaced.
    pub fn publish(&mut self, idx: SlotIndex, data: ControllerData) -> Result<(), Error> {
        let entry = self.entry_mut(idx)?;
        entry.snapshot = data;
        entry.fresh = true;
        Ok(())
    }

    /// Copy out the snapshot and mark it consumed.
    ///
    /// Returns [`Error::NoData`] when nothing new was published since the
    /// last take.
    pub fn take(&mut self, idx: SlotIndex) -> Result<ControllerData, Error> {
        let entry = self.entry_mut(idx)?;
        if !entry.fresh {
            return Err(Error::NoData);
        }
        entry.fresh = false;
        Ok(entry.snapshot)
    }

    pub fn occupied_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }
}

impl<const N: usize> Default for SlotTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Capabilities;

    fn props(last_octet: u8) -> ControllerProperties {
        ControllerProperties {
            address: [0xa0, 0xb1, 0xc2, 0xd3, 0xe4, last_octet],
            vendor_id: 0x054c,
            product_id: 0x09cc,
            flags: Capabilities::RUMBLE | Capabilities::LIGHTBAR,
            ..Default::default()
        }
    }

    #[test]
    fn assigns_first_vacant_slot() {
        let mut table: SlotTable<2> = SlotTable::new();
        let a = table.assign(props(1)).unwrap();
        let b = table.assign(props(2)).unwrap();
        assert_eq!(a, SlotIndex::new(0));
        assert_eq!(b, SlotIndex::new(1));
        assert_eq!(table.occupied_count(), 2);
    }

    #[test]
    fn rejects_when_full_without_mutating() {
        let mut table: SlotTable<2> = SlotTable::new();
        table.assign(props(1)).unwrap();
        table.assign(props(2)).unwrap();
        assert_eq!(table.assign(props(3)), Err(Error::NoSlots));
        assert_eq!(table.properties(SlotIndex::new(0)).unwrap(), props(1));
        assert_eq!(table.properties(SlotIndex::new(1)).unwrap(), props(2));
    }

    #[test]
    fn freed_slot_is_reused_before_growing() {
        let mut table: SlotTable<2> = SlotTable::new();
        let a = table.assign(props(1)).unwrap();
        table.assign(props(2)).unwrap();
        table.free(a);
        assert_eq!(table.occupied_count(), 1);
        let c = table.assign(props(3)).unwrap();
        assert_eq!(c, a);
        assert_eq!(table.properties(c).unwrap(), props(3));
    }

    #[test]
    fn free_is_idempotent() {
        let mut table: SlotTable<2> = SlotTable::new();
        let a = table.assign(props(1)).unwrap();
        table.free(a);
        table.free(a);
        table.free(SlotIndex::new(7));
        assert_eq!(table.occupied_count(), 0);
    }

    #[test]
    fn vacant_and_out_of_range_lookups_fail() {
        let mut table: SlotTable<2> = SlotTable::new();
        assert_eq!(table.properties(SlotIndex::new(0)), Err(Error::InvalidDevice));
        assert_eq!(table.check_occupied(SlotIndex::new(5)), Err(Error::InvalidDevice));
        assert_eq!(table.take(SlotIndex::new(0)), Err(Error::InvalidDevice));
        assert_eq!(
            table.publish(SlotIndex::new(0), ControllerData::new()),
            Err(Error::InvalidDevice)
        );
    }

    #[test]
    fn take_consumes_exactly_one_publish() {
        let mut table: SlotTable<1> = SlotTable::new();
        let idx = table.assign(props(1)).unwrap();
        assert_eq!(table.take(idx), Err(Error::NoData));

        let state = ControllerData {
            buttons: crate::controller::buttons::A,
            axis_x: -32000,
            ..Default::default()
        };
        table.publish(idx, state).unwrap();
        assert_eq!(table.take(idx), Ok(state));
        assert_eq!(table.take(idx), Err(Error::NoData));
    }

    #[test]
    fn publish_overwrites_unread_snapshot() {
        let mut table: SlotTable<1> = SlotTable::new();
        let idx = table.assign(props(1)).unwrap();
        let old = ControllerData { throttle: 10, ..Default::default() };
        let new = ControllerData { throttle: 900, ..Default::default() };
        table.publish(idx, old).unwrap();
        table.publish(idx, new).unwrap();
        assert_eq!(table.take(idx), Ok(new));
    }

    #[test]
    fn free_clears_snapshot_for_next_occupant() {
        let mut table: SlotTable<1> = SlotTable::new();
        let idx = table.assign(props(1)).unwrap();
        table
            .publish(idx, ControllerData { battery: 42, ..Default::default() })
            .unwrap();
        table.free(idx);
        let idx = table.assign(props(2)).unwrap();
        assert_eq!(table.take(idx), Err(Error::NoData));
    }
}
