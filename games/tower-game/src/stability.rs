//! Deferred collapse detection.

use stack_engine::{EntityId, Scene, Timers};

use crate::tower::Tower;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Standing,
    /// `first` is the first standing block found below the threshold.
    Collapsed { first: EntityId },
}

/// The tower has fallen once any block that still belongs to it drops
/// below `threshold`. The block in the player's hand does not count.
pub fn evaluate(tower: &Tower, scene: &Scene, threshold: f32) -> Verdict {
    tower
        .iter()
        .filter(|b| !b.removed && !b.is_moving())
        .find(|b| scene.get(b.entity).is_some_and(|e| e.pos.y < threshold))
        .map(|b| Verdict::Collapsed { first: b.entity })
        .unwrap_or(Verdict::Standing)
}

/// Schedules checks a short while after each interaction and reports the
/// collapse once.
#[derive(Debug, Default)]
pub struct StabilityMonitor {
    /// Payload is the game generation the check was scheduled in.
    checks: Timers<u64>,
    reported: bool,
}

impl StabilityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, generation: u64, delay: f32) {
        self.checks.schedule(delay, generation);
    }

    /// Drop pending checks and forget a previous collapse.
    pub fn reset(&mut self) {
        self.checks.clear();
        self.reported = false;
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.checks.len()
    }

    pub fn has_collapsed(&self) -> bool {
        self.reported
    }

    /// Advance the timers by `dt`; returns how many checks for `generation`
    /// came due. Checks left over from an older generation are discarded.
    pub fn due_checks(&mut self, dt: f32, generation: u64) -> usize {
        let fired = self.checks.tick(dt);
        let stale = fired.iter().filter(|&&g| g != generation).count();
        if stale > 0 {
            log::debug!("dropped {} stale stability checks", stale);
        }
        fired.len() - stale
    }

    /// Run one check. Returns the fallen block only the first time a
    /// collapse is seen; later checks keep the verdict without reporting.
    pub fn check(&mut self, tower: &Tower, scene: &Scene, threshold: f32) -> Option<EntityId> {
        if self.reported {
            return None;
        }
        match evaluate(tower, scene, threshold) {
            Verdict::Collapsed { first } => {
                self.reported = true;
                log::info!("tower collapsed: block {:?} hit the ground", first);
                Some(first)
            }
            Verdict::Standing => None,
        }
    }
}
