/// Turns variable frame times into a whole number of fixed steps.
pub struct FixedTimestep {
    dt: f32,
    /// Frame time not yet spent on a step.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Steps owed for a frame of `frame_dt` seconds. A long stall (a hidden
    /// tab, a debugger) is clamped to ten steps and the rest is forgotten.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator = (self.accumulator + frame_dt).min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }
}

#[derive(Debug)]
struct PendingTimer<T> {
    remaining: f32,
    payload: T,
}

/// One-shot timers advanced by game time.
///
/// Each timer carries a payload that is handed back when it fires.
/// Pending timers are only ever dropped all at once.
#[derive(Debug)]
pub struct Timers<T> {
    pending: Vec<PendingTimer<T>>,
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Fire `payload` after `delay` seconds of ticked time.
    pub fn schedule(&mut self, delay: f32, payload: T) {
        self.pending.push(PendingTimer {
            remaining: delay,
            payload,
        });
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Advance all timers and return the payloads that came due, in schedule order.
    pub fn tick(&mut self, dt: f32) -> Vec<T> {
        let mut fired = Vec::new();
        let mut idx = 0;
        while idx < self.pending.len() {
            self.pending[idx].remaining -= dt;
            if self.pending[idx].remaining <= 0.0 {
                fired.push(self.pending.remove(idx).payload);
            } else {
                idx += 1;
            }
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}
