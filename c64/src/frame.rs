//! Cross-thread frame synchronization.
//!
//! The emulation loop (producer) and a renderer (consumer) run on
//! independent threads and share exactly two things: a frame-ready event
//! and a snapshot slot. At VBlank the producer deposits a freshly
//! allocated [`Snapshot`] of RAM and the VIC register view, then raises
//! the flag with release ordering; the consumer polls the flag with
//! acquire ordering, takes the snapshot, clears the flag, and renders at
//! its leisure.
//!
//! The producer never blocks on the consumer. If the consumer has not
//! taken the previous frame by the next VBlank, that frame is dropped and
//! replaced - emulation speed is preserved, the renderer just skips.
//!
//! A plain non-atomic flag would not be enough here: the release/acquire
//! pair is what guarantees the consumer observes every RAM write that
//! happened before the VBlank that published the frame.

use crate::devices::VIC_REGISTER_COUNT;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// One published frame: full RAM, color RAM, and the VIC register view as
/// of the VBlank that produced it. Owned by the consumer once taken.
pub struct Snapshot {
    pub ram: Box<[u8; 65536]>,
    pub color_ram: [u8; 1024],
    pub vic_regs: [u8; VIC_REGISTER_COUNT],
    /// Frame number since power-on.
    pub frame: u64,
}

/// Shared producer/consumer state. Clone the [`Arc`] into both threads.
pub struct FrameSync {
    frame_ready: AtomicBool,
    stop: AtomicBool,
    slot: Mutex<Option<Snapshot>>,
}

impl FrameSync {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            frame_ready: AtomicBool::new(false),
            stop: AtomicBool::new(false),
            slot: Mutex::new(None),
        })
    }

    /// Producer side: deposits a frame and raises the event. Replaces any
    /// frame the consumer has not collected yet (frame dropped).
    pub fn publish(&self, snapshot: Snapshot) {
        {
            let mut slot = self.slot.lock().unwrap();
            if let Some(missed) = slot.replace(snapshot) {
                log::warn!("frame {} dropped; renderer behind", missed.frame);
            }
        }
        self.frame_ready.store(true, Ordering::Release);
    }

    /// Consumer side: whether a frame is waiting.
    pub fn frame_ready(&self) -> bool {
        self.frame_ready.load(Ordering::Acquire)
    }

    /// Consumer side: takes the waiting frame, clearing the event.
    /// Returns `None` when no frame has been published since the last
    /// take.
    pub fn take_frame(&self) -> Option<Snapshot> {
        if !self.frame_ready.swap(false, Ordering::Acquire) {
            return None;
        }
        self.slot.lock().unwrap().take()
    }

    /// Requests a cooperative shutdown; the producer exits at its next
    /// instruction boundary, the consumer after its current render.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}
