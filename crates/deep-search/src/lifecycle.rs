//! Server lifecycle: Starting -> Ready -> ShuttingDown -> Stopped.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Ready,
    ShuttingDown,
    Stopped,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("illegal lifecycle transition {from:?} -> {to:?}")]
pub struct IllegalTransition {
    pub from: Phase,
    pub to: Phase,
}

#[derive(Debug)]
pub struct Lifecycle {
    phase: Phase,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: Phase::Starting,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_stopped(&self) -> bool {
        self.phase == Phase::Stopped
    }

    pub fn allows(from: Phase, to: Phase) -> bool {
        matches!(
            (from, to),
            (Phase::Starting, Phase::Ready)
                // startup failed before the transport came up
                | (Phase::Starting, Phase::ShuttingDown)
                | (Phase::Ready, Phase::ShuttingDown)
                | (Phase::ShuttingDown, Phase::Stopped)
        )
    }

    /// Move to `to`, returning the phase we left.
    pub fn advance(&mut self, to: Phase) -> Result<Phase, IllegalTransition> {
        let from = self.phase;
        if !Self::allows(from, to) {
            return Err(IllegalTransition { from, to });
        }
        self.phase = to;
        tracing::debug!(?from, ?to, "lifecycle transition");
        Ok(from)
    }
}
