//! Output commands queued by the application context and drained by the
//! protocol context.

use embassy_sync::channel::Channel;

use crate::slot::SlotIndex;

/// One output request.
///
/// Payloads mirror what the report parsers accept; a command for an
/// unsupported output is silently dropped at dispatch time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    SetLightbarColor { r: u8, g: u8, b: u8 },
    SetPlayerLeds { mask: u8 },
    Rumble { delay_ms: u16, duration_ms: u16, weak: u8, strong: u8 },
    Disconnect,
}

/// A [`Command`] addressed to a seated controller, waiting for the protocol
/// context to pick it up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingCommand {
    pub slot: SlotIndex,
    pub command: Command,
}

/// Bounded FIFO carrying [`PendingCommand`]s from the application context to
/// the protocol context. Both ends are used non-blocking only: a full queue
/// drops the command, an empty queue ends the drain. A depth of 16 is plenty
/// for LED/rumble traffic; going smaller risks drops during bursts.
pub type CommandQueue<M, const DEPTH: usize> = Channel<M, PendingCommand, DEPTH>;
