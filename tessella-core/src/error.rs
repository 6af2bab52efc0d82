//! Engine errors
//!
//! Layout mistakes degrade visually (a widget outside its container is
//! simply not drawn) and focus navigation on an empty focus list is a
//! no-op; neither is an error. Only construction violations and
//! mismatched stack discipline surface to the caller.

/// Errors that can occur constructing widgets or managing the GUI stacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A selector's check/radio marker does not fit its declared bounds
    MarkerTooLarge,
    /// A slider range with `min >= max`
    EmptyRange,
    /// `remove_layer` called with no layer pushed
    LayerUnderflow,
    /// More layers pushed than the engine supports
    LayerOverflow,
    /// `leave` called with no entered control on the stack
    EnteredUnderflow,
    /// `add_layer` called with a widget that is not a container
    NotAContainer,
}
