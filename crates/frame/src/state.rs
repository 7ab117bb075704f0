/// Frame rate averaged over roughly one second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsSample {
    pub fps: f64,
    pub ms_per_frame: f64,
}

impl FpsSample {
    /// Window title in the form `"<base> - 59.94 FPS - 16.68 ms"`.
    pub fn title(&self, base: &str) -> String {
        format!("{base} - {:.2} FPS - {:.2} ms", self.fps, self.ms_per_frame)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    accumulated: f64,
    latest: Option<FpsSample>,
}

impl FpsCounter {
    pub const WINDOW_SECONDS: f64 = 1.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Count a frame that took `dt` seconds. Yields a sample once per window.
    pub fn record(&mut self, dt: f64) -> Option<FpsSample> {
        self.frames += 1;
        self.accumulated += dt.max(0.0);
        if self.accumulated < Self::WINDOW_SECONDS {
            return None;
        }
        let sample = FpsSample {
            fps: self.frames as f64 / self.accumulated,
            ms_per_frame: self.accumulated * 1000.0 / self.frames as f64,
        };
        self.frames = 0;
        self.accumulated = 0.0;
        self.latest = Some(sample);
        Some(sample)
    }

    pub fn latest(&self) -> Option<FpsSample> {
        self.latest
    }
}

/// Counters the frame loop owns and passes into every frame.
#[derive(Debug, Clone)]
pub struct FrameState {
    base_title: String,
    index: u64,
    elapsed: f64,
    fps: FpsCounter,
    pending_title: Option<String>,
}

impl FrameState {
    pub fn new(base_title: impl Into<String>) -> Self {
        Self {
            base_title: base_title.into(),
            index: 0,
            elapsed: 0.0,
            fps: FpsCounter::new(),
            pending_title: None,
        }
    }

    /// Start the next frame, `dt` seconds after the previous one.
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() { f64::from(dt.max(0.0)) } else { 0.0 };
        self.index += 1;
        self.elapsed += dt;
        if let Some(sample) = self.fps.record(dt) {
            tracing::debug!("{:.2} fps", sample.fps);
            self.pending_title = Some(sample.title(&self.base_title));
        }
    }

    /// Frames started so far.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Seconds since the first frame.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn fps(&self) -> &FpsCounter {
        &self.fps
    }

    /// New window title, if the frame rate was resampled since the last call.
    pub fn take_title(&mut self) -> Option<String> {
        self.pending_title.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_sampled_once_per_second() {
        let mut counter = FpsCounter::new();
        for _ in 0..3 {
            assert!(counter.record(0.25).is_none());
        }
        let sample = counter.record(0.25).unwrap();
        assert_eq!(sample.fps, 4.0);
        assert_eq!(sample.ms_per_frame, 250.0);
        assert!(counter.record(0.25).is_none());
    }

    #[test]
    fn title_format() {
        let sample = FpsSample {
            fps: 60.0,
            ms_per_frame: 1000.0 / 60.0,
        };
        assert_eq!(sample.title("meshrig"), "meshrig - 60.00 FPS - 16.67 ms");
    }

    #[test]
    fn state_advances_and_publishes_title_once() {
        let mut state = FrameState::new("rig");
        for _ in 0..10 {
            state.advance(0.1);
        }
        assert_eq!(state.index(), 10);
        assert!((state.elapsed() - 1.0).abs() < 1e-6);
        let title = state.take_title().unwrap();
        assert!(title.starts_with("rig - "));
        assert!(state.take_title().is_none());
    }

    #[test]
    fn negative_or_nan_dt_ignored() {
        let mut state = FrameState::new("rig");
        state.advance(-1.0);
        state.advance(f32::NAN);
        assert_eq!(state.index(), 2);
        assert_eq!(state.elapsed(), 0.0);
    }
}
