use super::easing::{Easing, Tween};
use super::geometry::WheelGeometry;
use super::segment::{Segment, SegmentLabel, Wheel};
use super::FULL_TURN;
use crate::config::{CoastSettings, ConfigError, SpinDirection, SpinSettings, WheelConfig};
use rand::Rng;
use std::time::{Duration, Instant};
use strum::Display;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum SpinPhase {
    #[default]
    Idle,
    Animating,
    /// Only observable inside `tick`: the result is being emitted.
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    /// Rigged spin easing towards a precomputed target.
    Tween(Tween),
    /// Free spin losing a share of its per-tick velocity every tick.
    Coast { velocity: f64 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WheelState {
    /// Signed accumulated rotation in radians. Only `|rotation| mod 2π` matters for the winner.
    pub rotation: f64,
    pub phase: SpinPhase,
    pub motion: Option<Motion>,
}

/// The random draws of a single rigged spin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinPlan {
    /// Landing offset from the slice centre, in radians.
    pub jitter: f64,
    pub extra_turns: u32,
    pub duration: Duration,
}

impl SpinPlan {
    pub fn draw<R: Rng>(settings: &SpinSettings, geometry: &WheelGeometry, rng: &mut R) -> Self {
        let max_jitter = settings.jitter * geometry.slice_width();
        let min_ms = settings.min_duration.as_millis() as u64;
        let max_ms = (settings.max_duration.as_millis() as u64).max(min_ms);

        Self {
            jitter: rng.random_range(-max_jitter..=max_jitter),
            extra_turns: rng.random_range(0..=settings.max_extra_turns),
            duration: Duration::from_millis(rng.random_range(min_ms..=max_ms)),
        }
    }

    /// A plan that lands dead centre after exactly the minimum number of turns.
    pub fn centered(duration: Duration) -> Self {
        Self {
            jitter: 0.0,
            extra_turns: 0,
            duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinResult {
    pub segment: Segment,
    /// Final rotation before normalisation.
    pub rotation: f64,
}

impl SpinResult {
    pub fn index(&self) -> usize {
        self.segment.index
    }

    pub fn label(&self) -> &SegmentLabel {
        &self.segment.label
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinStart {
    Started,
    /// A spin was already animating; nothing changed.
    AlreadySpinning,
}

#[derive(Error, Debug)]
pub enum SpinError {
    #[error("No segment is labelled '{0}'")]
    UnknownWinner(SegmentLabel),
    #[error("Segment {index} does not exist on a wheel of {count} segments")]
    UnknownSegment { index: usize, count: usize },
    #[error("Cannot reconfigure the wheel while it is spinning")]
    Busy,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Owns the wheel state and drives it from idle through a spin to a result.
#[derive(Debug, Clone)]
pub struct SpinController {
    wheel: Wheel,
    winner: SegmentLabel,
    free_spin: bool,
    direction: SpinDirection,
    spin: SpinSettings,
    coast: CoastSettings,
    state: WheelState,
}

impl SpinController {
    pub fn new(config: &WheelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            wheel: config.wheel()?,
            winner: config.winner.clone(),
            free_spin: config.free_spin,
            direction: config.direction,
            spin: config.spin.clone(),
            coast: config.coast.clone(),
            state: WheelState::default(),
        })
    }

    /// Swaps in a new configuration, keeping the current rotation.
    pub fn reconfigure(&mut self, config: &WheelConfig) -> Result<(), SpinError> {
        if self.is_spinning() {
            return Err(SpinError::Busy);
        }
        let next = Self::new(config)?;
        let state = std::mem::take(&mut self.state);
        *self = Self { state, ..next };
        Ok(())
    }

    pub fn wheel(&self) -> &Wheel {
        &self.wheel
    }

    pub fn direction(&self) -> SpinDirection {
        self.direction
    }

    pub fn geometry(&self) -> WheelGeometry {
        self.wheel.geometry()
    }

    pub fn state(&self) -> &WheelState {
        &self.state
    }

    pub fn rotation(&self) -> f64 {
        self.state.rotation
    }

    pub fn phase(&self) -> SpinPhase {
        self.state.phase
    }

    pub fn is_spinning(&self) -> bool {
        self.state.phase == SpinPhase::Animating
    }

    /// Starts the configured kind of spin: a free coast, or a rigged spin onto the winner.
    pub fn start_spin<R: Rng>(
        &mut self,
        now: Instant,
        rng: &mut R,
    ) -> Result<SpinStart, SpinError> {
        if self.free_spin {
            return Ok(self.start_free_spin(rng));
        }
        let index = self
            .wheel
            .index_of(&self.winner)
            .ok_or_else(|| SpinError::UnknownWinner(self.winner.clone()))?;
        self.start_rigged_spin(index, now, rng)
    }

    pub fn start_rigged_spin<R: Rng>(
        &mut self,
        index: usize,
        now: Instant,
        rng: &mut R,
    ) -> Result<SpinStart, SpinError> {
        self.check_index(index)?;
        if self.is_spinning() {
            return Ok(SpinStart::AlreadySpinning);
        }
        let plan = SpinPlan::draw(&self.spin, &self.geometry(), rng);
        self.start_spin_with(index, plan, now)
    }

    /// Starts a spin that lands on `index` using caller-chosen draws.
    pub fn start_spin_with(
        &mut self,
        index: usize,
        plan: SpinPlan,
        now: Instant,
    ) -> Result<SpinStart, SpinError> {
        self.check_index(index)?;
        if self.is_spinning() {
            log::debug!("Spin requested while spinning; ignored");
            return Ok(SpinStart::AlreadySpinning);
        }

        let target = self.target_rotation(index, &plan);
        let tween = Tween::new(
            self.state.rotation,
            target,
            now,
            plan.duration,
            Easing::EaseOutQuart,
        );
        self.state.phase = SpinPhase::Animating;
        self.state.motion = Some(Motion::Tween(tween));

        log::info!(
            "Spinning onto segment {} with {} extra turns over {:?}",
            index,
            plan.extra_turns,
            plan.duration
        );
        Ok(SpinStart::Started)
    }

    pub fn start_free_spin<R: Rng>(&mut self, rng: &mut R) -> SpinStart {
        if self.is_spinning() {
            return SpinStart::AlreadySpinning;
        }
        let velocity = rng.random_range(self.coast.min_velocity..self.coast.max_velocity);
        self.state.phase = SpinPhase::Animating;
        self.state.motion = Some(Motion::Coast { velocity });

        log::info!("Free spin at {:.3} rad/tick", velocity);
        SpinStart::Started
    }

    /// Absolute rotation at which a spin planned by `plan` comes to rest on `index`.
    ///
    /// The target is always at least `min_turns` whole turns past the current rotation in the
    /// spin direction.
    pub fn target_rotation(&self, index: usize, plan: &SpinPlan) -> f64 {
        let sign = self.direction.sign();
        let travelled = (sign * self.state.rotation).max(0.0);
        let full_turns = (travelled / FULL_TURN).floor();
        let turns = full_turns + f64::from(self.spin.min_turns) + f64::from(plan.extra_turns);

        let mut landing = self.geometry().target_offset(index) + plan.jitter;
        if landing < 0.0 {
            landing += FULL_TURN;
        }

        sign * (turns * FULL_TURN + landing)
    }

    /// Advances the active spin to `now`. Returns the result on the tick the spin resolves.
    pub fn tick(&mut self, now: Instant) -> Option<SpinResult> {
        if self.state.phase != SpinPhase::Animating {
            return None;
        }
        let Some(motion) = self.state.motion else {
            self.state.phase = SpinPhase::Idle;
            return None;
        };

        match motion {
            Motion::Tween(tween) => {
                let fraction = tween.fraction(now);
                if fraction < 1.0 {
                    self.state.rotation = tween.value_at(fraction);
                    return None;
                }
                self.state.rotation = tween.to;
            }
            Motion::Coast { velocity } => {
                self.state.rotation += self.direction.sign() * velocity;
                let velocity = velocity * self.coast.friction;
                if velocity >= self.coast.stop_velocity {
                    self.state.motion = Some(Motion::Coast { velocity });
                    return None;
                }
            }
        }

        Some(self.resolve())
    }

    /// Drops any active spin and returns the wheel to its starting angle.
    pub fn reset(&mut self) {
        if self.is_spinning() {
            log::info!("Spin cancelled by reset");
        }
        self.state = WheelState::default();
    }

    fn resolve(&mut self) -> SpinResult {
        self.state.phase = SpinPhase::Resolved;
        self.state.motion = None;

        let rotation = self.state.rotation;
        let segment = self.wheel.segment_at(rotation).clone();
        log::info!("Wheel stopped on '{}' ({})", segment.label, segment.index);

        self.state.rotation = rotation % FULL_TURN;
        self.state.phase = SpinPhase::Idle;
        SpinResult { segment, rotation }
    }

    fn check_index(&self, index: usize) -> Result<(), SpinError> {
        let count = self.wheel.segment_count();
        if index < count {
            Ok(())
        } else {
            Err(SpinError::UnknownSegment { index, count })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn controller() -> SpinController {
        SpinController::new(&WheelConfig::default()).unwrap()
    }

    #[test]
    fn test_rigged_spin_lands_on_winner() {
        let mut wheel = controller();
        let mut rng = StdRng::seed_from_u64(7);
        let start = Instant::now();

        assert_eq!(wheel.start_spin(start, &mut rng).unwrap(), SpinStart::Started);
        assert_eq!(wheel.phase(), SpinPhase::Animating);

        let mut result = None;
        for frame in 1..=400 {
            let now = start + Duration::from_millis(frame * 16);
            if let Some(r) = wheel.tick(now) {
                result = Some(r);
                break;
            }
        }

        let result = result.expect("spin should resolve within 6.4s");
        assert_eq!(result.label().as_str(), "Bambang");
        assert_eq!(result.index(), 4);
        assert_eq!(wheel.phase(), SpinPhase::Idle);
        assert!(wheel.rotation().abs() < FULL_TURN);
        assert_eq!(wheel.geometry().winning_index(wheel.rotation()), 4);
    }

    #[test]
    fn test_second_start_leaves_first_spin_untouched() {
        let mut wheel = controller();
        let mut rng = StdRng::seed_from_u64(99);
        let start = Instant::now();

        wheel.start_spin(start, &mut rng).unwrap();
        let first = wheel.state().clone();

        let again = wheel
            .start_spin(start + Duration::from_millis(5), &mut rng)
            .unwrap();
        assert_eq!(again, SpinStart::AlreadySpinning);
        assert_eq!(wheel.state(), &first);

        let other = wheel
            .start_spin_with(1, SpinPlan::centered(Duration::from_secs(1)), start)
            .unwrap();
        assert_eq!(other, SpinStart::AlreadySpinning);
        assert_eq!(wheel.state(), &first);
    }

    #[test]
    fn test_unknown_winner_fails_fast() {
        let mut config = WheelConfig::default();
        config.winner = SegmentLabel::new("Nobody");
        let mut wheel = SpinController::new(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let err = wheel.start_spin(Instant::now(), &mut rng).unwrap_err();
        assert!(matches!(err, SpinError::UnknownWinner(ref l) if l.as_str() == "Nobody"));
        assert_eq!(wheel.phase(), SpinPhase::Idle);
        assert!(wheel.state().motion.is_none());
    }

    #[test]
    fn test_out_of_range_index_fails_fast() {
        let mut wheel = controller();
        let err = wheel
            .start_spin_with(8, SpinPlan::centered(Duration::from_secs(1)), Instant::now())
            .unwrap_err();
        assert!(matches!(err, SpinError::UnknownSegment { index: 8, count: 8 }));
        assert_eq!(wheel.phase(), SpinPhase::Idle);
    }

    #[test]
    fn test_tick_before_start_does_not_move() {
        let mut wheel = controller();
        let start = Instant::now() + Duration::from_secs(5);
        wheel
            .start_spin_with(2, SpinPlan::centered(Duration::from_secs(2)), start)
            .unwrap();

        assert!(wheel.tick(start - Duration::from_secs(1)).is_none());
        assert_eq!(wheel.rotation(), 0.0);
        assert!(wheel.rotation().is_finite());
    }

    #[test]
    fn test_zero_duration_resolves_on_first_tick() {
        let mut wheel = controller();
        let start = Instant::now();
        wheel
            .start_spin_with(6, SpinPlan::centered(Duration::ZERO), start)
            .unwrap();

        let result = wheel.tick(start).unwrap();
        assert_eq!(result.index(), 6);
        assert!(wheel.tick(start + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_target_continues_from_accumulated_rotation() {
        let mut wheel = controller();
        let start = Instant::now();
        let plan = SpinPlan::centered(Duration::from_secs(1));

        wheel.start_spin_with(4, plan, start).unwrap();
        wheel.tick(start + Duration::from_secs(1)).unwrap();
        let rest = wheel.rotation();

        let target = wheel.target_rotation(3, &plan);
        assert!(target < rest - 5.0 * FULL_TURN + 1e-9);
        assert_eq!(wheel.geometry().winning_index(target), 3);
    }

    #[test]
    fn test_counterclockwise_spins_grow_positive() {
        let mut config = WheelConfig::default();
        config.direction = SpinDirection::CounterClockwise;
        let wheel = SpinController::new(&config).unwrap();

        let target = wheel.target_rotation(4, &SpinPlan::centered(Duration::from_secs(1)));
        assert!((target - (5.0 * FULL_TURN + std::f64::consts::PI)).abs() < 1e-9);
    }

    #[test]
    fn test_negative_jitter_on_first_segment_still_moves_forward() {
        let mut config = WheelConfig::default();
        config.spin.min_turns = 1;
        let wheel = SpinController::new(&config).unwrap();
        let plan = SpinPlan {
            jitter: -0.1,
            extra_turns: 0,
            duration: Duration::from_secs(1),
        };

        let target = wheel.target_rotation(0, &plan);
        assert!(target < -FULL_TURN);
        assert_eq!(wheel.geometry().winning_index(target), 0);
    }

    #[test]
    fn test_huge_turn_counts_do_not_wrap() {
        let wheel = controller();
        let plan = SpinPlan {
            jitter: 0.0,
            extra_turns: u32::MAX,
            duration: Duration::from_secs(1),
        };

        let target = wheel.target_rotation(4, &plan);
        assert!(target.is_finite());
        assert!(target < -f64::from(u32::MAX) * FULL_TURN);
        assert_eq!(wheel.geometry().winning_index(target), 4);
    }

    #[test]
    fn test_free_spin_coasts_to_a_stop() {
        let mut config = WheelConfig::default();
        config.free_spin = true;
        let mut wheel = SpinController::new(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let now = Instant::now();

        assert_eq!(wheel.start_spin(now, &mut rng).unwrap(), SpinStart::Started);
        assert_eq!(wheel.start_free_spin(&mut rng), SpinStart::AlreadySpinning);

        let mut result = None;
        for _ in 0..2000 {
            if let Some(r) = wheel.tick(now) {
                result = Some(r);
                break;
            }
            assert!(wheel.rotation() <= 0.0);
        }

        let result = result.expect("free spin should stop");
        assert_eq!(
            result.index(),
            wheel.geometry().winning_index(result.rotation)
        );
        assert_eq!(wheel.phase(), SpinPhase::Idle);
    }

    #[test]
    fn test_reset_cancels_spin() {
        let mut wheel = controller();
        let mut rng = StdRng::seed_from_u64(5);
        let start = Instant::now();

        wheel.start_spin(start, &mut rng).unwrap();
        wheel.tick(start + Duration::from_secs(1));
        assert!(wheel.rotation() != 0.0);

        wheel.reset();
        assert_eq!(wheel.state(), &WheelState::default());
        assert!(wheel.tick(start + Duration::from_secs(10)).is_none());
        assert_eq!(
            wheel.start_spin(start, &mut rng).unwrap(),
            SpinStart::Started
        );
    }

    #[test]
    fn test_reconfigure_refused_while_spinning() {
        let mut wheel = controller();
        let mut rng = StdRng::seed_from_u64(11);
        let start = Instant::now();
        wheel.start_spin(start, &mut rng).unwrap();

        let mut config = WheelConfig::default();
        config.winner = SegmentLabel::new("Made");
        assert!(matches!(wheel.reconfigure(&config), Err(SpinError::Busy)));

        wheel.tick(start + Duration::from_secs(6)).unwrap();
        let rest = wheel.rotation();
        wheel.reconfigure(&config).unwrap();
        assert_eq!(wheel.rotation(), rest);

        wheel.start_spin(start, &mut rng).unwrap();
        let result = wheel.tick(start + Duration::from_secs(6)).unwrap();
        assert_eq!(result.label().as_str(), "Made");
    }
}
