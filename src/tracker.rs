// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The concurrent region renderer.
//!
//! Three kinds of scoped thread take part: a pool of workers, the
//! tracker (which runs on the calling thread) and a single draw loop.
//! Workers report everything to the tracker through one shared inbox.
//! The tracker alone owns the worklist of pending regions; it hands a
//! region to a worker only when that worker has reported itself idle,
//! so no worker ever has more than one region in flight.  Terminal
//! results are forwarded to the draw loop, which alone owns the
//! surface.
//!
//! Completion is not "every worker is idle": a worker may be idle
//! while the children it just produced are still in the inbox.  The
//! tracker instead counts regions handed out and not yet answered.
//! The children of a populated region join the worklist in the same
//! step that retires their parent, so the render is done exactly when
//! that count is zero and the worklist is empty.

use std::collections::VecDeque;

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, info, trace, warn};

use crate::draw::{draw_loop, Paint, Surface};
use crate::errors::RenderError;
use crate::numerics::{numerics_pool, Numerics};
use crate::palette::Palette;
use crate::planes::PixelRect;
use crate::region::{Region, RenderStats};
use crate::worker::{work, Report};

/// Where a worker stands, as far as the tracker knows.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for an assignment.
    Idle,
    /// Holding an assignment, or still reporting one.
    Busy,
}

/// Progress of a render.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Regions are waiting in the worklist.
    Running,
    /// The worklist is empty but some regions are still out.
    Draining,
    /// Nothing is pending and nothing is out.
    Done,
}

/// The tracker's bookkeeping, free of any channels or threads.
#[derive(Debug)]
pub struct Schedule<R> {
    worklist: VecDeque<R>,
    roster: Vec<WorkerState>,
    // Whether each busy worker has already answered its assignment.
    answered: Vec<bool>,
    idle: VecDeque<usize>,
    outstanding: usize,
    phase: Phase,
}

impl<R> Schedule<R> {
    /// A schedule for `jobs` workers, all idle, with `root` pending.
    pub fn new(jobs: usize, root: Option<R>) -> Self {
        Schedule {
            worklist: root.into_iter().collect(),
            roster: vec![WorkerState::Idle; jobs],
            answered: vec![false; jobs],
            idle: (0..jobs).collect(),
            outstanding: 0,
            phase: Phase::Running,
        }
    }

    /// Pair the next idle worker with the next pending region, if
    /// there are both.  The worker is marked busy and the region
    /// counted as outstanding.
    pub fn dispatch(&mut self) -> Option<(usize, R)> {
        if self.phase == Phase::Done || self.worklist.is_empty() {
            return None;
        }
        let worker = self.idle.pop_front()?;
        let region = self.worklist.pop_front()?;
        self.roster[worker] = WorkerState::Busy;
        self.answered[worker] = false;
        self.outstanding += 1;
        Some((worker, region))
    }

    /// A worker has answered its assignment; `children` is empty for a
    /// terminal result.  Returns false, changing nothing, if the worker
    /// had nothing outstanding or has already answered.
    pub fn resolved(&mut self, worker: usize, children: Vec<R>) -> bool {
        if self.roster.get(worker) != Some(&WorkerState::Busy) || self.answered[worker] || self.outstanding == 0 {
            return false;
        }
        self.answered[worker] = true;
        self.outstanding -= 1;
        self.worklist.extend(children);
        true
    }

    /// A worker is ready for another assignment.  Returns false if it
    /// was not busy.
    pub fn idle(&mut self, worker: usize) -> bool {
        if self.roster.get(worker) != Some(&WorkerState::Busy) {
            return false;
        }
        self.roster[worker] = WorkerState::Idle;
        self.idle.push_back(worker);
        true
    }

    /// Recompute the phase.  Returns the new phase when it changed.
    /// `Done` is final.
    pub fn advance(&mut self) -> Option<Phase> {
        if self.phase == Phase::Done {
            return None;
        }
        let next = match (self.worklist.is_empty(), self.outstanding) {
            (true, 0) => Phase::Done,
            (true, _) => Phase::Draining,
            (false, _) => Phase::Running,
        };
        if next == self.phase {
            None
        } else {
            self.phase = next;
            Some(next)
        }
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Regions handed out and not yet answered.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Regions waiting for a worker.
    pub fn pending(&self) -> usize {
        self.worklist.len()
    }

    /// What the tracker believes a worker is doing.
    pub fn state(&self, worker: usize) -> Option<WorkerState> {
        self.roster.get(worker).copied()
    }
}

// Hand out work, wait for reports and forward results until the
// schedule is done.
fn coordinate<P>(
    root: Option<Region<P>>,
    assignments: &[Sender<Region<P>>],
    inbox: &Receiver<Report<P>>,
    paints: &Sender<Paint<P>>,
) -> Result<RenderStats, RenderError> {
    let mut schedule = Schedule::new(assignments.len(), root);
    let mut stats = RenderStats::default();

    loop {
        while let Some((worker, region)) = schedule.dispatch() {
            trace!(worker, rect = ?region.rect, "dispatch");
            assignments[worker]
                .send(region)
                .map_err(|_| RenderError::Disconnected("worker assignment"))?;
        }
        if let Some(phase) = schedule.advance() {
            debug!(?phase, outstanding = schedule.outstanding(), pending = schedule.pending(), "tracker");
        }
        if schedule.phase() == Phase::Done {
            break;
        }

        let report = inbox
            .recv()
            .map_err(|_| RenderError::Disconnected("tracker inbox"))?;
        let accepted = match report {
            Report::Busy(worker) => {
                trace!(worker, "busy");
                schedule.state(worker) == Some(WorkerState::Busy)
            }
            Report::Idle(worker) => schedule.idle(worker),
            Report::Uniform(worker, region) => {
                let accepted = schedule.resolved(worker, vec![]);
                if accepted {
                    stats.uniform += 1;
                    paints
                        .send(Paint::Uniform(region))
                        .map_err(|_| RenderError::Disconnected("draw loop"))?;
                }
                accepted
            }
            Report::Captured(worker, members) => {
                let accepted = schedule.resolved(worker, vec![]);
                if accepted {
                    stats.small += 1;
                    stats.pixels += members.len() as u64;
                    paints
                        .send(Paint::Members(members))
                        .map_err(|_| RenderError::Disconnected("draw loop"))?;
                }
                accepted
            }
            Report::Children(worker, children) => {
                let accepted = schedule.resolved(worker, children);
                if accepted {
                    stats.populated += 1;
                }
                accepted
            }
            Report::Lost(worker) => return Err(RenderError::WorkerLost(worker)),
        };
        if !accepted {
            warn!("report from a worker with no unanswered assignment");
        }
    }
    Ok(stats)
}

/// Render `root` with a pool of `jobs` workers, each owning its own
/// clone of `prototype`.  Returns once every region has been painted
/// and every thread has stopped.
pub fn render_concurrent<N, S, L>(
    prototype: &N,
    jobs: usize,
    root: PixelRect,
    surface: &mut S,
    palette: &L,
) -> Result<RenderStats, RenderError>
where
    N: Numerics,
    S: Surface + Send + ?Sized,
    L: Palette + ?Sized,
{
    let pool = numerics_pool(prototype, jobs.max(1));
    let start = if root.is_empty() {
        None
    } else {
        Some(Region::new(prototype, root))
    };
    info!(jobs = pool.len(), width = root.width, height = root.height, "concurrent render");

    let (inbox_tx, inbox_rx) = channel::unbounded();
    let (paint_tx, paint_rx) = channel::unbounded();

    let outcome = crossbeam::scope(|scope| {
        let mut assignments = Vec::with_capacity(pool.len());
        let mut workers = Vec::with_capacity(pool.len());
        for (id, numerics) in pool.into_iter().enumerate() {
            let (tx, rx) = channel::bounded(1);
            let inbox = inbox_tx.clone();
            assignments.push(tx);
            workers.push(scope.spawn(move |_| work(id, numerics, rx, inbox)));
        }
        drop(inbox_tx);
        let drawer = scope.spawn(move |_| draw_loop(paint_rx, surface, palette));

        let result = coordinate(start, &assignments, &inbox_rx, &paint_tx);

        // Closing the assignment channels stops the workers; closing
        // the paint channel lets the draw loop finish what it has.
        drop(assignments);
        drop(paint_tx);
        let joined = workers
            .into_iter()
            .map(|w| w.join().is_ok())
            .fold(true, |all, ok| all && ok);
        let painted = drawer.join();

        let stats = result?;
        match painted {
            Ok(painted) if joined => {
                debug!(painted, "draw loop flushed");
                Ok(stats)
            }
            _ => Err(RenderError::ThreadPanicked),
        }
    });

    let stats = outcome.map_err(|_| RenderError::ThreadPanicked)??;
    info!(
        uniform = stats.uniform,
        small = stats.small,
        populated = stats.populated,
        pixels = stats.pixels,
        "concurrent render finished"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::testing::Recorder;
    use crate::glitch::{GlitchCurve, GlitchPattern};
    use crate::native::NativeNumerics;
    use crate::numerics::testing::Scripted;
    use crate::numerics::Limits;
    use crate::palette::{Grayscale, Pretty};
    use crate::planes::{Pixel, PlaneWindow};
    use crate::regional::render_regions;
    use image::{Rgba, RgbaImage};
    use num::Complex;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn mandelbrot(width: u32, height: u32, collapse: u32) -> NativeNumerics {
        let window = PlaneWindow::new(width, height, Complex::new(-2.0, 1.2), Complex::new(0.6, -1.2));
        let glitch = GlitchCurve::new(GlitchPattern::Curve, 4, 0);
        NativeNumerics::new(window, Limits::new(64, 4.0, collapse), glitch)
    }

    #[test]
    fn uniform_region_is_painted_once_and_never_split() {
        let n = Scripted::new(Limits::new(10, 4.0, 1), |_| (3, false));
        let mut rec = Recorder::default();
        let stats = render_concurrent(&n, 4, PixelRect::image(4, 4), &mut rec, &Grayscale(10)).unwrap();
        assert_eq!(rec.rects, vec![(PixelRect::image(4, 4), Grayscale(10).color(3, false))]);
        assert!(rec.pixels.is_empty());
        assert_eq!(stats, RenderStats { uniform: 1, ..RenderStats::default() });
    }

    #[test]
    fn small_region_is_captured_whatever_its_samples_say() {
        let n = Scripted::new(Limits::new(10, 4.0, 2), |p| ((p.0 * 2 + p.1) as u8, false));
        let mut rec = Recorder::default();
        let stats = render_concurrent(&n, 2, PixelRect::image(2, 2), &mut rec, &Grayscale(10)).unwrap();
        assert!(rec.rects.is_empty());
        let mut pixels: Vec<Pixel> = rec.pixels.iter().map(|(p, _)| *p).collect();
        pixels.sort_by_key(|p| (p.1, p.0));
        assert_eq!(pixels, vec![Pixel(0, 0), Pixel(1, 0), Pixel(0, 1), Pixel(1, 1)]);
        assert_eq!(stats, RenderStats { small: 1, pixels: 4, ..RenderStats::default() });
    }

    #[test]
    fn one_worker_matches_the_single_threaded_renderer() {
        let n = mandelbrot(96, 72, 4);
        let palette = Pretty::new(64);
        let mut pooled = RgbaImage::new(96, 72);
        let mut reference = RgbaImage::new(96, 72);
        let a = render_concurrent(&n, 1, PixelRect::image(96, 72), &mut pooled, &palette).unwrap();
        let b = render_regions(&n, PixelRect::image(96, 72), &mut reference, &palette);
        assert_eq!(pooled, reference);
        assert_eq!(a, b);
    }

    #[test]
    fn job_count_does_not_change_the_image() {
        let n = mandelbrot(80, 60, 3);
        let palette = Pretty::new(64);
        let images: Vec<RgbaImage> = [1, 2, 8]
            .iter()
            .map(|&jobs| {
                let mut img = RgbaImage::new(80, 60);
                render_concurrent(&n, jobs, PixelRect::image(80, 60), &mut img, &palette).unwrap();
                img
            })
            .collect();
        assert_eq!(images[0], images[1]);
        assert_eq!(images[0], images[2]);
    }

    #[test]
    fn every_pixel_is_painted_exactly_once() {
        let n = mandelbrot(70, 45, 2);
        let mut rec = Recorder::default();
        render_concurrent(&n, 8, PixelRect::image(70, 45), &mut rec, &Grayscale(64)).unwrap();
        let mut cover = vec![0u32; 70 * 45];
        for (rect, _) in &rec.rects {
            for p in rect.pixels() {
                cover[(p.1 * 70 + p.0) as usize] += 1;
            }
        }
        for (p, _) in &rec.pixels {
            cover[(p.1 * 70 + p.0) as usize] += 1;
        }
        assert!(cover.iter().all(|&c| c == 1));
    }

    #[test]
    fn empty_image_finishes_immediately() {
        let n = Scripted::new(Limits::new(10, 4.0, 1), |_| (0, false));
        let mut rec = Recorder::default();
        let stats = render_concurrent(&n, 3, PixelRect::image(0, 0), &mut rec, &Grayscale(10)).unwrap();
        assert_eq!(stats, RenderStats::default());
    }

    #[test]
    fn a_lost_worker_fails_the_render() {
        let n = Scripted::new(Limits::new(10, 4.0, 1), |p| {
            if p == Pixel(7, 7) {
                panic!("scripted failure")
            }
            (1, false)
        });
        let mut img = RgbaImage::new(8, 8);
        match render_concurrent(&n, 2, PixelRect::image(8, 8), &mut img, &Grayscale(10)) {
            Err(RenderError::WorkerLost(_)) => {}
            other => panic!("expected a lost worker, got {:?}", other),
        }
        assert!(img.pixels().all(|p| *p == Rgba([0, 0, 0, 0])));
    }

    #[test]
    fn schedule_hands_out_one_region_per_idle_worker() {
        let mut s = Schedule::new(2, Some("root"));
        assert_eq!(s.dispatch(), Some((0, "root")));
        assert_eq!(s.dispatch(), None);
        assert_eq!(s.advance(), Some(Phase::Draining));
        assert!(s.resolved(0, vec!["a", "b", "c", "d"]));
        assert_eq!(s.advance(), Some(Phase::Running));
        // Worker 0 has not reported idle yet.
        assert_eq!(s.dispatch(), Some((1, "a")));
        assert_eq!(s.dispatch(), None);
        assert!(s.idle(0));
        assert_eq!(s.dispatch(), Some((0, "b")));
        assert_eq!(s.outstanding(), 2);
        assert_eq!(s.pending(), 2);
    }

    #[test]
    fn schedule_ignores_reports_from_idle_workers() {
        let mut s: Schedule<u8> = Schedule::new(1, None);
        assert!(!s.resolved(0, vec![1]));
        assert!(!s.idle(0));
        assert!(!s.resolved(5, vec![]));
        assert_eq!(s.advance(), Some(Phase::Done));
        assert_eq!(s.advance(), None);
    }

    #[test]
    fn schedule_counts_one_answer_per_assignment() {
        let mut s = Schedule::new(2, Some("root"));
        assert_eq!(s.dispatch(), Some((0, "root")));
        assert!(s.resolved(0, vec!["a", "b"]));
        assert!(!s.resolved(0, vec!["c"]));
        assert!(!s.resolved(0, vec![]));
        assert_eq!(s.outstanding(), 0);
        assert_eq!(s.pending(), 2);

        // A fresh assignment may be answered again.
        assert_eq!(s.dispatch(), Some((1, "a")));
        assert!(s.idle(0));
        assert_eq!(s.dispatch(), Some((0, "b")));
        assert!(s.resolved(0, vec![]));
        assert!(!s.resolved(0, vec![]));
        assert_eq!(s.outstanding(), 1);
        assert!(s.resolved(1, vec![]));
        assert_eq!(s.advance(), Some(Phase::Done));
    }

    // Drive a schedule through a random interleaving of worker
    // reports over a random region tree.
    fn simulate(seed: u64, jobs: usize) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut schedule = Schedule::new(jobs, Some(0u32));
        // Each worker's reports not yet delivered, in send order.
        let mut mailboxes: Vec<VecDeque<Option<Vec<u32>>>> = vec![VecDeque::new(); jobs];
        let (mut created, mut answered, mut done) = (1usize, 0usize, 0usize);

        loop {
            while let Some((worker, depth)) = schedule.dispatch() {
                let children = if depth < 5 && rng.gen_bool(0.6) {
                    vec![depth + 1; 4]
                } else {
                    vec![]
                };
                created += children.len();
                mailboxes[worker].push_back(Some(children));
                mailboxes[worker].push_back(None);
            }
            if schedule.advance() == Some(Phase::Done) {
                done += 1;
            }
            if schedule.phase() == Phase::Done {
                assert_eq!(schedule.outstanding(), 0);
                assert_eq!(schedule.pending(), 0);
                break;
            }

            let ready: Vec<usize> = (0..jobs).filter(|&w| !mailboxes[w].is_empty()).collect();
            assert!(!ready.is_empty(), "stalled with work outstanding");
            let worker = ready[rng.gen_range(0..ready.len())];
            match mailboxes[worker].pop_front() {
                Some(Some(children)) => {
                    answered += 1;
                    assert!(schedule.resolved(worker, children));
                }
                Some(None) => assert!(schedule.idle(worker)),
                None => unreachable!(),
            }
        }

        // Late idle reports change nothing.
        for (worker, mailbox) in mailboxes.iter_mut().enumerate() {
            while let Some(report) = mailbox.pop_front() {
                assert!(report.is_none());
                schedule.idle(worker);
                assert_eq!(schedule.advance(), None);
            }
        }
        assert_eq!(done, 1);
        assert_eq!(created, answered);
    }

    #[test]
    fn completion_fires_once_under_any_interleaving() {
        for seed in 0..200 {
            simulate(seed, 1 + (seed % 8) as usize);
        }
    }
}
