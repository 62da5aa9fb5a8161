use crate::config::{SteeringConfig, SteeringKind};
use crate::sensors::SensorReadings;

/// Turns sensor readings into a heading change for the current tick.
///
/// Positive values turn clockwise on screen (towards the right sensor).
pub trait SteeringController {
    fn heading_change(&mut self, readings: SensorReadings) -> f32;

    /// Forget any state accumulated from previous ticks.
    fn reset(&mut self);

    fn name(&self) -> &'static str;
}

/// Proportional correction driven by how long the car has had exactly one
/// sensor on the line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeOffLineSteering {
    step: f32,
    max: f32,
    divisor: f32,
    time_off_line: f32,
}

impl TimeOffLineSteering {
    pub fn new(step: f32, max: f32, divisor: f32) -> Self {
        Self {
            step,
            max,
            divisor,
            time_off_line: 0.0,
        }
    }

    pub fn time_off_line(&self) -> f32 {
        self.time_off_line
    }

    #[cfg(test)]
    fn with_time_off_line(mut self, time_off_line: f32) -> Self {
        self.time_off_line = time_off_line;
        self
    }
}

impl SteeringController for TimeOffLineSteering {
    fn heading_change(&mut self, readings: SensorReadings) -> f32 {
        if readings.exactly_one() {
            self.time_off_line += self.step;
        } else {
            self.time_off_line = 0.0;
        }
        self.time_off_line = self.time_off_line.min(self.max);

        let correction = self.time_off_line / self.divisor;
        // Both adjustments apply independently; with both sensors on the line
        // the accumulator is already zero.
        let mut change = 0.0;
        if readings.left {
            change -= correction;
        }
        if readings.right {
            change += correction;
        }
        change
    }

    fn reset(&mut self) {
        self.time_off_line = 0.0;
    }

    fn name(&self) -> &'static str {
        "time-off-line"
    }
}

/// Fixed-rate turn towards whichever single sensor sees the line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BangBangSteering {
    turn_rate: f32,
}

impl BangBangSteering {
    pub fn new(turn_rate: f32) -> Self {
        Self { turn_rate }
    }
}

impl SteeringController for BangBangSteering {
    fn heading_change(&mut self, readings: SensorReadings) -> f32 {
        match (readings.left, readings.right) {
            (true, false) => -self.turn_rate,
            (false, true) => self.turn_rate,
            _ => 0.0,
        }
    }

    fn reset(&mut self) {}

    fn name(&self) -> &'static str {
        "bang-bang"
    }
}

/// PID on the signed contact error `right - left`, one tick per time step.
///
/// The integral is clamped to `±integral_limit` so a long stretch with one
/// sensor on the line cannot wind the car into a spin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidSteering {
    kp: f32,
    ki: f32,
    kd: f32,
    integral_limit: f32,
    integral: f32,
    previous_error: f32,
}

impl PidSteering {
    pub fn new(kp: f32, ki: f32, kd: f32, integral_limit: f32) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral_limit,
            integral: 0.0,
            previous_error: 0.0,
        }
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }
}

impl SteeringController for PidSteering {
    fn heading_change(&mut self, readings: SensorReadings) -> f32 {
        let error = f32::from(readings.right as i8 - readings.left as i8);
        self.integral =
            (self.integral + error).clamp(-self.integral_limit, self.integral_limit);
        let derivative = error - self.previous_error;
        self.previous_error = error;
        self.kp * error + self.ki * self.integral + self.kd * derivative
    }

    fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
    }

    fn name(&self) -> &'static str {
        "pid"
    }
}

/// The steering rule selected in the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steering {
    TimeOffLine(TimeOffLineSteering),
    BangBang(BangBangSteering),
    Pid(PidSteering),
}

impl Steering {
    pub fn from_config(config: &SteeringConfig) -> Self {
        match config.kind {
            SteeringKind::TimeOffLine => Self::TimeOffLine(TimeOffLineSteering::new(
                config.step,
                config.max,
                config.divisor,
            )),
            SteeringKind::BangBang => {
                Self::BangBang(BangBangSteering::new(config.turn_rate_degrees))
            }
            SteeringKind::Pid => Self::Pid(PidSteering::new(
                config.kp,
                config.ki,
                config.kd,
                config.max,
            )),
        }
    }

    /// Current accumulator, if the rule has one.
    pub fn time_off_line(&self) -> Option<f32> {
        match self {
            Self::TimeOffLine(steering) => Some(steering.time_off_line()),
            Self::BangBang(_) | Self::Pid(_) => None,
        }
    }

    fn controller(&mut self) -> &mut dyn SteeringController {
        match self {
            Self::TimeOffLine(steering) => steering,
            Self::BangBang(steering) => steering,
            Self::Pid(steering) => steering,
        }
    }
}

impl SteeringController for Steering {
    fn heading_change(&mut self, readings: SensorReadings) -> f32 {
        self.controller().heading_change(readings)
    }

    fn reset(&mut self) {
        self.controller().reset();
    }

    fn name(&self) -> &'static str {
        match self {
            Self::TimeOffLine(steering) => steering.name(),
            Self::BangBang(steering) => steering.name(),
            Self::Pid(steering) => steering.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEFT: SensorReadings = SensorReadings {
        left: true,
        right: false,
    };
    const RIGHT: SensorReadings = SensorReadings {
        left: false,
        right: true,
    };
    const BOTH: SensorReadings = SensorReadings {
        left: true,
        right: true,
    };
    const NONE: SensorReadings = SensorReadings {
        left: false,
        right: false,
    };

    fn reference() -> TimeOffLineSteering {
        TimeOffLineSteering::new(0.16, 3.0, 2.25)
    }

    #[test]
    fn left_contact_turns_counter_clockwise() {
        let mut steering = reference();
        let change = steering.heading_change(LEFT);
        assert_eq!(steering.time_off_line(), 0.16);
        assert_eq!(change, -0.16 / 2.25);
    }

    #[test]
    fn right_contact_turns_clockwise() {
        let mut steering = reference();
        assert_eq!(steering.heading_change(RIGHT), 0.16 / 2.25);
    }

    #[test]
    fn accumulator_never_exceeds_max() {
        let mut steering = reference();
        for i in 0..500 {
            let readings = if i % 2 == 0 { LEFT } else { RIGHT };
            steering.heading_change(readings);
            assert!(steering.time_off_line() <= 3.0);
        }
        assert_eq!(steering.time_off_line(), 3.0);
    }

    #[test]
    fn saturated_accumulator_stays_clamped() {
        let mut steering = reference().with_time_off_line(3.0);
        let change = steering.heading_change(RIGHT);
        assert_eq!(steering.time_off_line(), 3.0);
        assert_eq!(change, 3.0 / 2.25);

        let change = steering.heading_change(LEFT);
        assert_eq!(change, -(3.0 / 2.25));
    }

    #[test]
    fn accumulator_resets_when_contact_is_symmetric() {
        for reset_with in [BOTH, NONE] {
            let mut steering = reference();
            for _ in 0..7 {
                steering.heading_change(LEFT);
            }
            assert!(steering.time_off_line() > 0.0);
            let change = steering.heading_change(reset_with);
            assert_eq!(steering.time_off_line(), 0.0);
            assert_eq!(change, 0.0);
        }
    }

    #[test]
    fn reset_clears_accumulator() {
        let mut steering = Steering::TimeOffLine(reference().with_time_off_line(2.0));
        steering.reset();
        assert_eq!(steering.time_off_line(), Some(0.0));
    }

    #[test]
    fn bang_bang_turns_towards_single_contact() {
        let mut steering = BangBangSteering::new(1.5);
        assert_eq!(steering.heading_change(LEFT), -1.5);
        assert_eq!(steering.heading_change(RIGHT), 1.5);
        assert_eq!(steering.heading_change(BOTH), 0.0);
        assert_eq!(steering.heading_change(NONE), 0.0);
    }

    #[test]
    fn config_selects_the_rule() {
        let mut config = SteeringConfig::default();
        let steering = Steering::from_config(&config);
        assert_eq!(steering.name(), "time-off-line");
        assert_eq!(steering.time_off_line(), Some(0.0));

        config.kind = SteeringKind::BangBang;
        let steering = Steering::from_config(&config);
        assert_eq!(steering.name(), "bang-bang");
        assert_eq!(steering.time_off_line(), None);

        config.kind = SteeringKind::Pid;
        let steering = Steering::from_config(&config);
        assert_eq!(steering.name(), "pid");
        assert_eq!(steering.time_off_line(), None);
        assert_eq!(
            steering,
            Steering::Pid(PidSteering::new(0.5, 0.9, 0.0, 3.0))
        );
    }

    #[test]
    fn pid_error_sign_follows_the_contact_side() {
        let mut steering = PidSteering::new(0.5, 0.0, 0.0, 3.0);
        assert_eq!(steering.heading_change(LEFT), -0.5);
        assert_eq!(steering.heading_change(RIGHT), 0.5);
        assert_eq!(steering.heading_change(BOTH), 0.0);
        assert_eq!(steering.heading_change(NONE), 0.0);
    }

    #[test]
    fn pid_integral_builds_up_and_saturates() {
        let mut steering = PidSteering::new(0.5, 0.9, 0.0, 3.0);
        assert_eq!(steering.heading_change(LEFT), -0.5 - 0.9);
        steering.heading_change(LEFT);
        let change = steering.heading_change(LEFT);
        assert_eq!(steering.integral(), -3.0);
        assert!((change - (-0.5 - 2.7)).abs() < 1e-6);

        // Clamped: further ticks on the same side add nothing.
        steering.heading_change(LEFT);
        assert_eq!(steering.integral(), -3.0);

        // The integral keeps steering after contact is lost.
        let change = steering.heading_change(NONE);
        assert!(change < 0.0);
    }

    #[test]
    fn pid_derivative_reacts_to_error_changes() {
        let mut steering = PidSteering::new(0.0, 0.0, 2.0, 3.0);
        assert_eq!(steering.heading_change(RIGHT), 2.0);
        assert_eq!(steering.heading_change(RIGHT), 0.0);
        assert_eq!(steering.heading_change(NONE), -2.0);
    }

    #[test]
    fn pid_reset_clears_integral_and_history() {
        let mut steering = Steering::Pid(PidSteering::new(0.5, 0.9, 1.0, 3.0));
        steering.heading_change(RIGHT);
        steering.heading_change(RIGHT);
        steering.reset();

        let Steering::Pid(pid) = steering else {
            panic!("expected the pid rule");
        };
        assert_eq!(pid.integral(), 0.0);
        // Without stored history the first error also counts as a step change.
        let mut pid = pid;
        assert_eq!(pid.heading_change(RIGHT), 0.5 + 0.9 + 1.0);
    }
}
