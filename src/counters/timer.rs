use std::fmt::{Display, Error, Formatter};

/// A timer.
#[derive(Copy, Clone, Debug, Default)]
pub struct Timer {
    time: f64,
    start: Option<f64>,
    enabled: bool,
}

impl Timer {
    /// Creates a new disabled timer with a measured time of zero.
    pub fn new() -> Self {
        Timer {
            time: 0.0,
            start: None,
            enabled: false,
        }
    }

    /// Enables this timer.
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Disables this timer.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Resets the timer to 0.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.start = None;
    }

    /// Start the timer.
    pub fn start(&mut self) {
        if self.enabled {
            self.time = 0.0;
            self.start = Some(instant::now());
        }
    }

    /// Pause the timer.
    pub fn pause(&mut self) {
        if self.enabled {
            if let Some(start) = self.start {
                self.time += instant::now() - start;
            }
            self.start = None;
        }
    }

    /// Resume the timer.
    pub fn resume(&mut self) {
        if self.enabled {
            self.start = Some(instant::now());
        }
    }

    /// The measured time between the last `.start()` and `.pause()` calls, in milliseconds.
    pub fn time(&self) -> f64 {
        self.time
    }
}

impl Display for Timer {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{}s", self.time / 1000.0)
    }
}
