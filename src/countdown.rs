/// Countdown that re-hides revealed content

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStatus {
    /// Not counting
    Idle,
    /// Seconds left after this tick
    Running(u32),
    /// Reached zero on this tick; the countdown is reset and idle again
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    duration: u32,
    remaining: u32,
    running: bool,
}

impl Countdown {
    pub fn new(duration: u32) -> Self {
        Countdown {
            duration,
            remaining: duration,
            running: false,
        }
    }

    /// (Re)start from the full duration
    pub fn start(&mut self) {
        self.remaining = self.duration;
        self.running = true;
    }

    /// Stop and reset to the full duration
    pub fn stop(&mut self) {
        self.remaining = self.duration;
        self.running = false;
    }

    pub fn tick(&mut self) -> CountdownStatus {
        if !self.running {
            return CountdownStatus::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.stop();
            CountdownStatus::Expired
        } else {
            CountdownStatus::Running(self.remaining)
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Render seconds as `m:ss`
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
