use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    position: f64,
    duration: f64,
    playing: bool,
}

impl Transport {
    pub fn new(duration: f64) -> Self {
        Self {
            position: 0.0,
            duration: duration.max(0.0),
            playing: false,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Starts playback, rewinding first when parked at the end.
    pub fn play(&mut self) {
        if self.position >= self.duration {
            self.position = 0.0;
        }
        self.playing = self.duration > 0.0;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn seek(&mut self, position: f64) {
        self.position = position.clamp(0.0, self.duration);
    }

    pub fn set_duration(&mut self, duration: f64) {
        self.duration = duration.max(0.0);
        self.position = self.position.min(self.duration);
    }

    pub fn advance(&mut self, dt: f64) {
        if !self.playing {
            return;
        }

        self.position += dt;

        if self.position >= self.duration {
            self.position = self.duration;
            self.playing = false;
        }
    }
}

// Ticks missed during a long frame are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadClock {
    interval: Duration,
    elapsed: Duration,
}

impl PayloadClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
        }
    }

    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;

        if self.elapsed < self.interval {
            return false;
        }

        self.elapsed -= self.interval;
        if self.elapsed >= self.interval {
            self.elapsed = Duration::ZERO;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_until_end() {
        let mut transport = Transport::new(2.0);
        transport.advance(1.0);
        assert_eq!(transport.position(), 0.0);

        transport.play();
        transport.advance(1.5);
        assert_eq!(transport.position(), 1.5);
        assert!(transport.is_playing());

        transport.advance(1.5);
        assert_eq!(transport.position(), 2.0);
        assert!(!transport.is_playing());

        transport.play();
        assert_eq!(transport.position(), 0.0);
    }

    #[test]
    fn toggle_and_seek() {
        let mut transport = Transport::new(10.0);
        transport.toggle();
        assert!(transport.is_playing());
        transport.toggle();
        assert!(!transport.is_playing());

        transport.seek(-3.0);
        assert_eq!(transport.position(), 0.0);
        transport.seek(42.0);
        assert_eq!(transport.position(), 10.0);

        transport.set_duration(4.0);
        assert_eq!(transport.position(), 4.0);
    }

    #[test]
    fn empty_track_never_plays() {
        let mut transport = Transport::new(0.0);
        transport.play();
        assert!(!transport.is_playing());
    }

    #[test]
    fn clock_fires_on_interval() {
        let mut clock = PayloadClock::new(Duration::from_millis(50));

        assert!(!clock.advance(Duration::from_millis(20)));
        assert!(!clock.advance(Duration::from_millis(20)));
        assert!(clock.advance(Duration::from_millis(20)));
        assert!(!clock.advance(Duration::from_millis(20)));
        assert!(clock.advance(Duration::from_millis(30)));
    }

    #[test]
    fn clock_drops_missed_ticks() {
        let mut clock = PayloadClock::new(Duration::from_millis(50));

        assert!(clock.advance(Duration::from_millis(500)));
        assert!(!clock.advance(Duration::from_millis(10)));
    }
}
