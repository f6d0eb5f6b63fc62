use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

/// Confirmation-tone output.
///
/// `play` resolves when the tone has finished sounding. An unavailable
/// output device, or one that fails to resume after inactivity, resolves
/// immediately instead of erroring: audio is a non-essential confirmation,
/// but its completion still gates the transition to the tally view, so it
/// must never stall. Overlapping calls must not panic.
#[async_trait]
pub trait AudioSignal: Send + Sync {
    async fn play(&self, frequency_hz: u32, duration: Duration);
}

/// Tone generator without an output device: occupies the playback window
/// on the runtime clock, producing no sound. The `muted` variant models a
/// device that is unavailable outright and resolves immediately.
pub struct SilentAudio {
    muted: bool,
}

impl SilentAudio {
    pub fn new() -> Self {
        Self { muted: false }
    }

    pub fn muted() -> Self {
        Self { muted: true }
    }
}

impl Default for SilentAudio {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSignal for SilentAudio {
    async fn play(&self, frequency_hz: u32, duration: Duration) {
        if self.muted {
            debug!(frequency_hz, "audio device unavailable; treating tone as complete");
            return;
        }
        debug!(frequency_hz, duration_ms = duration.as_millis() as u64, "tone playing");
        tokio::time::sleep(duration).await;
    }
}
