use std::{
    thread,
    time::{Duration, Instant},
};

use actuator_shared::{CurveSet, Frame, TickInput};
use log::info;

use crate::{config::Config, transmitter::Transmitter, transport::Transport};

const MIN_DRAIN: Duration = Duration::from_millis(200);

/// Plays the curves once from the start without a window, one frame per
/// payload interval, then sends one last frame with playback stopped.
pub fn run(config: &Config, curves: &CurveSet, duration: f64) {
    let transmitter = Transmitter::new(config.actuator_url.clone(), config.protocol);
    let interval = config.payload_interval();

    let mut transport = Transport::new(duration);
    transport.play();

    info!(
        "Streaming {:.1} s of curves to {} at {} Hz ({})",
        duration, config.actuator_url, config.payload_frequency, config.protocol
    );

    let mut last_tick = Instant::now();
    while transport.is_playing() {
        let now = Instant::now();
        transport.advance(now.saturating_duration_since(last_tick).as_secs_f64());
        last_tick = now;

        let tick = tick_input(&transport);
        transmitter.send(&Frame::build(curves, &tick, config.protocol, &config.drive));

        thread::sleep(interval);
    }

    let rest = Frame::build(curves, &tick_input(&transport), config.protocol, &config.drive);
    transmitter.send(&rest);

    // Requests run on their own threads, give the last ones time to land.
    thread::sleep(drain_time(interval));

    info!("Playback finished.");
}

fn tick_input(transport: &Transport) -> TickInput {
    TickInput {
        time: transport.position(),
        end_time: transport.duration(),
        paused: !transport.is_playing(),
        air_out: false,
        air_in: false,
    }
}

fn drain_time(interval: Duration) -> Duration {
    interval.max(MIN_DRAIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn drain_has_a_floor_at_high_rates() {
        assert_eq!(drain_time(Duration::from_millis(1)), MIN_DRAIN);
        assert_eq!(drain_time(Duration::from_secs(1)), Duration::from_secs(1));
    }
}
