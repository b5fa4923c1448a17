//! Fatal error handling

use defmt::*;

use voltlog_core::boot::BootError;

/// Report a fatal bootstrap error and stop
///
/// There is no retry: the board stays halted until it is reset.
pub fn halt(error: BootError) -> ! {
    error!("Fatal bootstrap error: {}", error);
    defmt::panic!("Bootstrap halted")
}
