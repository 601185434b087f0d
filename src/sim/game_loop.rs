//! Frame scheduler state machine
//!
//! `Stopped → Running ⇄ Paused → Stopped`. The scheduler does not own a
//! clock: the platform driver (requestAnimationFrame on web, a plain loop
//! natively) feeds it timestamps and it decides what each frame runs.

/// Scheduler phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopPhase {
    #[default]
    Stopped,
    /// Update and draw every frame
    Running,
    /// Draw every frame, skip update
    Paused,
}

/// What a single frame should do
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Milliseconds since the previous frame (0 on the very first frame)
    pub delta: f64,
    /// False while paused
    pub run_update: bool,
}

/// Game loop scheduler
#[derive(Debug, Clone, Default)]
pub struct GameLoop {
    phase: LoopPhase,
    last_time: Option<f64>,
    delta_time: f64,
    /// Handle of the pending animation frame, if the driver registered one
    pending_frame: Option<i32>,
    frame_count: u64,
}

impl GameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Running or paused
    pub fn is_running(&self) -> bool {
        self.phase != LoopPhase::Stopped
    }

    pub fn is_paused(&self) -> bool {
        self.phase == LoopPhase::Paused
    }

    /// Delta of the most recent frame (ms)
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Frames processed since construction
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Begin running. No-op (returns false) if already running or paused.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.phase = LoopPhase::Running;
        true
    }

    /// Skip updates from the next frame on. Returns true if the phase changed.
    pub fn pause(&mut self) -> bool {
        if self.phase != LoopPhase::Running {
            return false;
        }
        self.phase = LoopPhase::Paused;
        true
    }

    /// Resume updates. Returns true if the phase changed.
    pub fn resume(&mut self) -> bool {
        if self.phase != LoopPhase::Paused {
            return false;
        }
        self.phase = LoopPhase::Running;
        true
    }

    /// Flip between running and paused, returning the new paused flag
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            LoopPhase::Running => {
                self.pause();
            }
            LoopPhase::Paused => {
                self.resume();
            }
            LoopPhase::Stopped => {}
        }
        self.is_paused()
    }

    /// Stop the loop, handing back the pending frame so the driver can cancel it
    pub fn stop(&mut self) -> Option<i32> {
        self.phase = LoopPhase::Stopped;
        self.pending_frame.take()
    }

    /// Remember the handle of the frame the driver just requested
    pub fn set_pending_frame(&mut self, handle: i32) {
        self.pending_frame = Some(handle);
    }

    pub fn pending_frame(&self) -> Option<i32> {
        self.pending_frame
    }

    /// Forget the last timestamp so the next frame has a delta of 0
    pub fn reset_clock(&mut self) {
        self.last_time = None;
    }

    /// Account for a frame at `timestamp` (ms). None while stopped.
    pub fn begin_frame(&mut self, timestamp: f64) -> Option<FrameTick> {
        if !self.is_running() {
            return None;
        }

        self.pending_frame = None;
        self.delta_time = match self.last_time {
            Some(last) => timestamp - last,
            None => 0.0,
        };
        self.last_time = Some(timestamp);
        self.frame_count += 1;

        Some(FrameTick {
            delta: self.delta_time,
            run_update: self.phase == LoopPhase::Running,
        })
    }
}
