//! Messages every node relays to every peer.

mod decide;

pub use decide::DecideAnnouncement;
