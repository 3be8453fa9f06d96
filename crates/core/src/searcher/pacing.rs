//! Client-side pacing of outbound search calls.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::trace;

use super::{SearchContext, SearchError};

/// Global load preset, mapped to the delay slept before every search call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPreset {
    Disabled,
    Low,
    #[default]
    Normal,
    High,
}

impl LoadPreset {
    pub fn delay(&self) -> Duration {
        match self {
            LoadPreset::Disabled => Duration::ZERO,
            LoadPreset::Low => Duration::from_secs(1),
            LoadPreset::Normal => Duration::from_secs(2),
            LoadPreset::High => Duration::from_secs(5),
        }
    }
}

/// Sleeps the preset delay before each outbound call of one provider.
///
/// Every call pays the delay: N free-text terms mean N sleeps.
#[derive(Debug, Clone)]
pub struct PacingGate {
    preset: LoadPreset,
}

impl PacingGate {
    pub fn new(preset: LoadPreset) -> Self {
        Self { preset }
    }

    pub fn preset(&self) -> LoadPreset {
        self.preset
    }

    /// Wait out the delay, or return `Cancelled` if the context ends first.
    pub async fn wait(&self, ctx: &SearchContext) -> Result<(), SearchError> {
        if ctx.is_done() {
            return Err(SearchError::Cancelled);
        }

        let delay = self.preset.delay();
        if delay.is_zero() {
            return Ok(());
        }

        // Past the deadline the bounded sleep ends early
        let bounded = ctx.bound(delay);
        trace!(delay_ms = delay.as_millis() as u64, "Pacing");

        tokio::select! {
            _ = sleep(bounded) => {
                if bounded < delay {
                    Err(SearchError::Cancelled)
                } else {
                    Ok(())
                }
            }
            _ = ctx.cancel.cancelled() => Err(SearchError::Cancelled),
        }
    }
}
