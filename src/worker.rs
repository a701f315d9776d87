// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pool workers.  A worker owns one numeric system, takes one region
//! at a time from its own assignment channel, resolves it, and reports
//! everything back to the tracker's inbox.  Children of a populated
//! region go back to the tracker rather than being worked depth-first
//! here, so any idle worker can pick them up.

use std::thread;

use crossbeam::channel::{Receiver, Sender};
use tracing::{debug, warn};

use crate::numerics::{Numerics, PixelMember};
use crate::region::{resolve, Region, Resolution};
use crate::sequential::capture;

/// Everything a worker can tell the tracker.  Each message carries the
/// worker's index.
#[derive(Debug)]
pub enum Report<P> {
    /// An assignment was received.
    Busy(usize),
    /// The last assignment has been fully reported; ready for another.
    Idle(usize),
    /// The assignment was uniform.
    Uniform(usize, Region<P>),
    /// The assignment was small; every pixel in it, evaluated.
    Captured(usize, Vec<PixelMember<P>>),
    /// The assignment was populated; its four children.
    Children(usize, Vec<Region<P>>),
    /// The worker is unwinding and will never report again.
    Lost(usize),
}

// Sends `Lost` if the worker thread unwinds.
struct LossGuard<'a, P> {
    id: usize,
    inbox: &'a Sender<Report<P>>,
}

impl<'a, P> Drop for LossGuard<'a, P> {
    fn drop(&mut self) {
        if thread::panicking() {
            warn!(worker = self.id, "worker lost");
            let _ = self.inbox.send(Report::Lost(self.id));
        }
    }
}

/// Resolve one region into the report the tracker needs.
pub fn assess<N: Numerics>(id: usize, numerics: &N, region: Region<N::Point>) -> Report<N::Point> {
    match resolve(numerics, region) {
        Resolution::Uniform(region) => Report::Uniform(id, region),
        Resolution::Small(region) => Report::Captured(id, capture(numerics, region.rect)),
        Resolution::Populated(children) => Report::Children(id, Vec::from(children)),
    }
}

/// The worker loop.  Runs until the assignment channel is closed or
/// the inbox hangs up.
pub fn work<N: Numerics>(
    id: usize,
    numerics: N,
    assignments: Receiver<Region<N::Point>>,
    inbox: Sender<Report<N::Point>>,
) {
    let _guard = LossGuard { id, inbox: &inbox };
    debug!(worker = id, "worker started");
    let mut handled = 0usize;
    for region in assignments.iter() {
        if inbox.send(Report::Busy(id)).is_err() {
            break;
        }
        let report = assess(id, &numerics, region);
        if inbox.send(report).is_err() || inbox.send(Report::Idle(id)).is_err() {
            break;
        }
        handled += 1;
    }
    debug!(worker = id, handled, "worker stopped");
}
