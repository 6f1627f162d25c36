// src/averaging.rs

/// Physical capacity of each averaging channel. The configurable window may
/// only ever shrink below this, never grow past it.
pub const AVG_CAPACITY: usize = 16;

/// Rolling-mean buffer over the most recent temperature/humidity samples.
///
/// Two fixed-capacity circular sequences share one write index and fill
/// counter. The write index wraps modulo the configured *window*, not the
/// physical capacity, so a window of 4 only ever touches the first 4 slots.
#[derive(Debug)]
pub struct AveragingBuffer {
    temperature: [f32; AVG_CAPACITY],
    humidity: [f32; AVG_CAPACITY],
    window: usize,
    index: usize,
    fill: usize,
}

impl AveragingBuffer {
    pub const fn new() -> Self {
        Self {
            temperature: [0.0; AVG_CAPACITY],
            humidity: [0.0; AVG_CAPACITY],
            window: 1,
            index: 0,
            fill: 0,
        }
    }

    /// Current window size (the configured averaging count).
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Reconfigures the window size, discarding all buffered samples.
    ///
    /// Slots beyond a smaller window would otherwise linger as a stale tail
    /// with the wrong weighting, so the fill counter and index restart at 0.
    ///
    /// # Panics
    ///
    /// Panics if `window` is 0 or exceeds [`AVG_CAPACITY`]. Callers validate
    /// the protocol range before getting here.
    pub fn set_window(&mut self, window: usize) {
        assert!(window >= 1 && window <= AVG_CAPACITY);
        self.window = window;
        self.reset();
    }

    /// Discards buffered samples without touching the window size.
    pub fn reset(&mut self) {
        self.index = 0;
        self.fill = 0;
    }

    /// Writes one sample pair and returns the rolling means over the last
    /// `min(samples_collected, window)` samples for each channel.
    pub fn push(&mut self, temperature: f32, humidity: f32) -> (f32, f32) {
        self.temperature[self.index] = temperature;
        self.humidity[self.index] = humidity;
        self.index = (self.index + 1) % self.window;
        if self.fill < self.window {
            self.fill += 1;
        }

        let n = self.fill;
        let temp_sum: f32 = self.temperature[..n].iter().sum();
        let hum_sum: f32 = self.humidity[..n].iter().sum();
        (temp_sum / n as f32, hum_sum / n as f32)
    }
}

impl Default for AveragingBuffer {
    fn default() -> Self {
        Self::new()
    }
}
