//! Waveform segmentation and switching-parameter extraction.
//!
//! Responsibilities:
//!
//! - split a waveform into monotonic windows from its derivative (`segment`)
//! - extract knee, t40/t60, tau and alpha per window (`region`, `alpha`)
//! - own the regions, broadcast parameter updates and aggregate results (`manager`)

pub mod alpha;
pub mod manager;
pub mod region;
pub mod segment;

pub use manager::*;
pub use region::*;
pub use segment::*;
