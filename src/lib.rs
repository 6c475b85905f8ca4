//! Command protocol for a point-to-point radio link between a controller and a remote node.
//!
//! Commands are packed into a 32-bit header and a short payload by [`protocol`], then every
//! nibble of the result is protected with a Hamming(8,4) SECDED codeword by [`frame`], so a
//! single flipped bit per nibble is corrected and a double one is detected without any
//! retransmission.

pub mod command;
pub mod error;
pub mod frame;
pub mod hamming;
pub mod protocol;
pub mod transport;
pub mod utils;

#[cfg(feature = "ground-station")]
pub mod ground_station;

pub use command::{Arg, ArgKind, CommandSpec, Registry};
pub use error::{Error, Result};
pub use frame::{DecodedFrame, Frame, FrameCodec, FrameConfig};
pub use hamming::{HammingConfig, HammingType};
pub use protocol::{Header, Message, ProtocolCodec};
