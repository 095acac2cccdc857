//! Refresh-synchronized frame loop
//!
//! The scheduler owns no timer of its own. Each frame is requested from a
//! [`FrameClock`] (`requestAnimationFrame` in the browser, [`ManualClock`]
//! in tests) and the host feeds the callback timestamp back through
//! [`FrameScheduler::on_frame`].

use tracing::debug;

use crate::error::GalaxyError;

/// Handle of a pending frame request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// Source of display refresh callbacks
pub trait FrameClock {
    /// Ask for one callback on the next refresh
    fn request_frame(&mut self) -> Result<FrameHandle, GalaxyError>;

    /// Withdraw a pending request
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Scheduler state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchedulerState {
    #[default]
    Stopped,
    Running,
}

/// Timing of one accepted frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// Seconds since the first frame
    pub elapsed: f32,
    /// Seconds since the previous frame, never negative
    pub delta: f32,
    /// Zero-based index of this frame
    pub frame: u64,
}

/// `Stopped`/`Running` frame loop over a clock
#[derive(Debug)]
pub struct FrameScheduler<C: FrameClock> {
    clock: C,
    state: SchedulerState,
    pending: Option<FrameHandle>,
    origin_ms: Option<f64>,
    last_ms: f64,
    frames: u64,
}

impl<C: FrameClock> FrameScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: SchedulerState::Stopped,
            pending: None,
            origin_ms: None,
            last_ms: 0.0,
            frames: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// Frames accepted since construction
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Number of outstanding clock requests (0 or 1)
    pub fn pending_frames(&self) -> usize {
        usize::from(self.pending.is_some())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Begin requesting frames. No-op while already running.
    pub fn start(&mut self) -> Result<(), GalaxyError> {
        if self.is_running() {
            return Ok(());
        }
        self.pending = Some(self.clock.request_frame()?);
        self.state = SchedulerState::Running;
        debug!("frame scheduler started");
        Ok(())
    }

    /// Stop and cancel the outstanding request. Safe in any state.
    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.clock.cancel_frame(handle);
        }
        if self.is_running() {
            self.state = SchedulerState::Stopped;
            debug!(frames = self.frames, "frame scheduler stopped");
        }
    }

    /// Accept a refresh callback carrying a timestamp in milliseconds
    ///
    /// The next frame is requested before anything else so a failing draw
    /// cannot break the loop. Returns `None` when stopped.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> Result<Option<FrameTick>, GalaxyError> {
        if !self.is_running() {
            return Ok(None);
        }
        self.pending = None;
        match self.clock.request_frame() {
            Ok(handle) => self.pending = Some(handle),
            Err(e) => {
                self.state = SchedulerState::Stopped;
                return Err(e);
            }
        }

        let now = if timestamp_ms.is_finite() { timestamp_ms } else { self.last_ms };
        let origin = *self.origin_ms.get_or_insert(now);
        let delta = if self.frames == 0 { 0.0 } else { (now - self.last_ms).max(0.0) };
        self.last_ms = now.max(self.last_ms);

        let tick = FrameTick {
            elapsed: ((self.last_ms - origin) / 1000.0) as f32,
            delta: (delta / 1000.0) as f32,
            frame: self.frames,
        };
        self.frames += 1;
        Ok(Some(tick))
    }
}

/// Clock driven by hand, for tests and headless hosts
#[derive(Debug, Default)]
pub struct ManualClock {
    next: i32,
    pending: Vec<FrameHandle>,
    cancelled: Vec<FrameHandle>,
    /// When set, `request_frame` fails
    pub fail_requests: bool,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet fired or cancelled
    pub fn pending(&self) -> &[FrameHandle] {
        &self.pending
    }

    pub fn cancelled(&self) -> &[FrameHandle] {
        &self.cancelled
    }

    /// Consume the oldest pending request, as the display would on refresh
    pub fn fire(&mut self) -> Option<FrameHandle> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&mut self) -> Result<FrameHandle, GalaxyError> {
        if self.fail_requests {
            return Err(GalaxyError::Scheduler("manual clock refused the request".to_string()));
        }
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending.push(handle);
        Ok(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
        self.cancelled.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_requests_one_frame() {
        let mut s = FrameScheduler::new(ManualClock::new());
        s.start().unwrap();
        assert!(s.is_running());
        assert_eq!(s.pending_frames(), 1);
        assert_eq!(s.clock().pending().len(), 1);
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut s = FrameScheduler::new(ManualClock::new());
        s.start().unwrap();
        s.start().unwrap();
        assert_eq!(s.clock().pending().len(), 1);
    }

    #[test]
    fn test_stop_before_start() {
        let mut s = FrameScheduler::new(ManualClock::new());
        s.stop();
        s.stop();
        assert_eq!(s.state(), SchedulerState::Stopped);
        assert_eq!(s.pending_frames(), 0);
        assert!(s.clock().cancelled().is_empty());
    }

    #[test]
    fn test_stop_cancels_pending() {
        let mut s = FrameScheduler::new(ManualClock::new());
        s.start().unwrap();
        s.stop();
        s.stop();
        assert_eq!(s.pending_frames(), 0);
        assert!(s.clock().pending().is_empty());
        assert_eq!(s.clock().cancelled().len(), 1);
    }

    #[test]
    fn test_frame_rearms_and_measures() {
        let mut s = FrameScheduler::new(ManualClock::new());
        s.start().unwrap();

        s.clock_mut().fire();
        let first = s.on_frame(1000.0).unwrap().unwrap();
        assert_eq!(first.frame, 0);
        assert_eq!(first.elapsed, 0.0);
        assert_eq!(first.delta, 0.0);
        assert_eq!(s.clock().pending().len(), 1);

        s.clock_mut().fire();
        let second = s.on_frame(1016.0).unwrap().unwrap();
        assert_eq!(second.frame, 1);
        assert!((second.delta - 0.016).abs() < 0.0001);
        assert!((second.elapsed - 0.016).abs() < 0.0001);
    }

    #[test]
    fn test_backwards_timestamp_gives_zero_delta() {
        let mut s = FrameScheduler::new(ManualClock::new());
        s.start().unwrap();
        s.on_frame(500.0).unwrap();
        s.on_frame(600.0).unwrap();
        let tick = s.on_frame(550.0).unwrap().unwrap();
        assert_eq!(tick.delta, 0.0);
        assert!((tick.elapsed - 0.1).abs() < 0.0001);
    }

    #[test]
    fn test_frame_while_stopped_ignored() {
        let mut s = FrameScheduler::new(ManualClock::new());
        assert_eq!(s.on_frame(16.0).unwrap(), None);
        assert_eq!(s.frames(), 0);
        assert!(s.clock().pending().is_empty());
    }

    #[test]
    fn test_failed_rearm_stops() {
        let mut s = FrameScheduler::new(ManualClock::new());
        s.start().unwrap();
        s.clock_mut().fail_requests = true;
        let err = s.on_frame(16.0).unwrap_err();
        assert!(matches!(err, GalaxyError::Scheduler(_)));
        assert_eq!(s.state(), SchedulerState::Stopped);
        assert_eq!(s.pending_frames(), 0);
    }
}
