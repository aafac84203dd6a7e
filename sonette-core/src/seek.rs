//! Seek bar geometry and the drag-to-seek state machine.
//!
//! ```text
//!  Idle --pointer down on handle--> Dragging { fraction }
//!  Dragging --pointer move--> Dragging { fraction' }   (visual only)
//!  Dragging --pointer up--> Idle                        (commit fraction)
//! ```
//!
//! While dragging, the drag's fraction owns the progress display; live
//! position reports must not move it.

/// Horizontal bounds of the seek bar, in the same units as pointer x
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeekBar {
    pub left: f64,
    pub width: f64,
}

impl SeekBar {
    #[must_use]
    pub const fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    /// Fraction of the bar under pointer `x`, clamped to `[0, 1]`.
    ///
    /// A bar with no width maps everything to 0.
    #[must_use]
    pub fn fraction_at(&self, x: f64) -> f64 {
        if self.width <= 0.0 || !self.width.is_finite() || x.is_nan() {
            return 0.0;
        }
        (x - self.left).clamp(0.0, self.width) / self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SeekState {
    #[default]
    Idle,
    Dragging { fraction: f64 },
}

#[derive(Debug, Clone, Default)]
pub struct SeekController {
    state: SeekState,
}

impl SeekController {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SeekState::Idle,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SeekState {
        self.state
    }

    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, SeekState::Dragging { .. })
    }

    /// Fraction shown by an active drag
    #[must_use]
    pub const fn drag_fraction(&self) -> Option<f64> {
        match self.state {
            SeekState::Dragging { fraction } => Some(fraction),
            SeekState::Idle => None,
        }
    }

    /// Pointer went down on the handle. Returns the fraction to show now.
    pub fn begin(&mut self, bar: &SeekBar, x: f64) -> f64 {
        let fraction = bar.fraction_at(x);
        self.state = SeekState::Dragging { fraction };
        fraction
    }

    /// Pointer moved. Returns the new fraction if a drag is active.
    pub fn drag(&mut self, bar: &SeekBar, x: f64) -> Option<f64> {
        match self.state {
            SeekState::Dragging { .. } => {
                let fraction = bar.fraction_at(x);
                self.state = SeekState::Dragging { fraction };
                Some(fraction)
            }
            SeekState::Idle => None,
        }
    }

    /// Pointer released. Returns the fraction to commit if a drag was active.
    pub fn release(&mut self) -> Option<f64> {
        let fraction = self.drag_fraction();
        self.state = SeekState::Idle;
        fraction
    }

    /// Abandon any drag without committing
    pub fn cancel(&mut self) {
        self.state = SeekState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BAR: SeekBar = SeekBar::new(100.0, 200.0);

    #[test]
    fn test_fraction_at_clamps() {
        assert_eq!(BAR.fraction_at(100.0), 0.0);
        assert_eq!(BAR.fraction_at(200.0), 0.5);
        assert_eq!(BAR.fraction_at(300.0), 1.0);
        assert_eq!(BAR.fraction_at(-50.0), 0.0);
        assert_eq!(BAR.fraction_at(10_000.0), 1.0);
    }

    #[test]
    fn test_fraction_at_zero_width() {
        let bar = SeekBar::new(10.0, 0.0);
        assert_eq!(bar.fraction_at(50.0), 0.0);
    }

    #[test]
    fn test_begin_applies_initial_fraction() {
        let mut seek = SeekController::new();
        assert_eq!(seek.begin(&BAR, 150.0), 0.25);
        assert_eq!(seek.state(), SeekState::Dragging { fraction: 0.25 });
    }

    #[test]
    fn test_drag_updates_fraction() {
        let mut seek = SeekController::new();
        seek.begin(&BAR, 150.0);
        assert_eq!(seek.drag(&BAR, 250.0), Some(0.75));
        assert_eq!(seek.drag(&BAR, 900.0), Some(1.0));
        assert_eq!(seek.drag_fraction(), Some(1.0));
    }

    #[test]
    fn test_drag_while_idle_does_nothing() {
        let mut seek = SeekController::new();
        assert_eq!(seek.drag(&BAR, 250.0), None);
        assert!(!seek.is_dragging());
    }

    #[test]
    fn test_release_returns_last_fraction() {
        let mut seek = SeekController::new();
        seek.begin(&BAR, 150.0);
        seek.drag(&BAR, 200.0);
        assert_eq!(seek.release(), Some(0.5));
        assert_eq!(seek.state(), SeekState::Idle);
        assert_eq!(seek.release(), None);
    }

    #[test]
    fn test_cancel_discards_drag() {
        let mut seek = SeekController::new();
        seek.begin(&BAR, 150.0);
        seek.cancel();
        assert_eq!(seek.release(), None);
    }
}
