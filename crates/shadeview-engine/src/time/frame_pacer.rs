use std::time::{Duration, Instant};

/// Fixed-cadence frame pacer.
///
/// Each frame is due one interval after the previous frame was rendered. A late
/// frame does not queue catch-up frames; the cadence simply restarts from it.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    next: Instant,
}

impl FramePacer {
    /// Creates a pacer targeting `fps` frames per second; the first frame is due immediately.
    pub fn new(fps: u32) -> Self {
        Self::starting_at(Instant::now(), fps)
    }

    pub fn starting_at(now: Instant, fps: u32) -> Self {
        debug_assert!(fps > 0);
        Self {
            interval: Duration::from_secs(1) / fps.max(1),
            next: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the next frame should be rendered.
    pub fn deadline(&self) -> Instant {
        self.next
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next
    }

    /// Records a rendered frame at `now` and schedules the next one.
    pub fn tick(&mut self, now: Instant) {
        self.next = now + self.interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_hz_interval() {
        let p = FramePacer::new(60);
        assert_eq!(p.interval(), Duration::from_nanos(16_666_666));
    }

    #[test]
    fn first_frame_is_due_immediately() {
        let t0 = Instant::now();
        let p = FramePacer::starting_at(t0, 60);
        assert!(p.is_due(t0));
        assert_eq!(p.deadline(), t0);
    }

    #[test]
    fn next_frame_waits_one_interval() {
        let t0 = Instant::now();
        let mut p = FramePacer::starting_at(t0, 60);
        p.tick(t0);

        assert!(!p.is_due(t0 + Duration::from_millis(10)));
        assert!(p.is_due(t0 + p.interval()));
        assert_eq!(p.deadline(), t0 + p.interval());
    }

    #[test]
    fn stall_does_not_queue_catch_up_frames() {
        let t0 = Instant::now();
        let mut p = FramePacer::starting_at(t0, 60);
        p.tick(t0);

        let late = t0 + Duration::from_secs(1);
        p.tick(late);
        assert_eq!(p.deadline(), late + p.interval());
        assert!(!p.is_due(late));
    }
}
