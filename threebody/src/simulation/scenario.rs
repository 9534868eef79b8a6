//! Initial and reset body configurations
//!
//! A `Scenario` is an immutable list of bodies used at initialisation and on
//! every reset. `ScenarioGenerator` produces one either from a hand-authored
//! fixed list or by seeded rejection sampling inside the domain. Generation
//! is a pure function of (mode, seed): the same inputs always give the same
//! scenario.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{ConfigError, SimError, SimResult};
use crate::simulation::boundary::{first_collision, Domain};
use crate::simulation::states::{palette_color, Body, System};
use crate::simulation::vector::NVec2;

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub bodies: Vec<Body>,
}

impl Scenario {
    pub fn new(bodies: Vec<Body>) -> Self {
        Self { bodies }
    }

    /// Built-in three-body setup: equal masses, red/green/blue
    pub fn three_body() -> Self {
        let specs = [
            ([-150.0, 0.0], [0.0, 15.0]),
            ([150.0, 0.0], [0.0, -15.0]),
            ([0.0, 150.0], [-15.0, 0.0]),
        ];

        let bodies = specs
            .iter()
            .enumerate()
            .map(|(i, (x, v))| Body {
                x: NVec2::new(x[0], x[1]),
                v: NVec2::new(v[0], v[1]),
                m: 100.0,
                radius: 10.0,
                color: palette_color(i),
            })
            .collect();

        Self { bodies }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Reject fewer than two bodies, non-positive mass, negative radius,
    /// non-finite values and pairs closer than `min_separation`
    pub fn validate(&self, min_separation: f64) -> SimResult<()> {
        if self.bodies.len() < 2 {
            return Err(SimError::InvalidScenario(format!(
                "need at least 2 bodies, got {}",
                self.bodies.len()
            )));
        }

        for (i, b) in self.bodies.iter().enumerate() {
            if !(b.m > 0.0) || !b.m.is_finite() {
                return Err(SimError::InvalidScenario(format!("body {i}: mass {} is not positive", b.m)));
            }
            if !(b.radius >= 0.0) || !b.radius.is_finite() {
                return Err(SimError::InvalidScenario(format!("body {i}: radius {} is negative", b.radius)));
            }
            if !(b.x.iter().chain(b.v.iter()).all(|c| c.is_finite())) {
                return Err(SimError::InvalidScenario(format!("body {i}: non-finite position or velocity")));
            }
        }

        if let Some((i, j, d)) = closest_pair(&self.bodies) {
            if d < min_separation {
                return Err(SimError::InvalidScenario(format!(
                    "bodies {i} and {j} are {d:.3} apart, below min separation {min_separation}"
                )));
            }
        }

        Ok(())
    }

    /// Fresh system at t = 0
    pub fn to_system(&self) -> System {
        System::new(self.bodies.clone())
    }
}

/// Closest pair of bodies and their centre distance
fn closest_pair(bodies: &[Body]) -> Option<(usize, usize, f64)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for i in 0..bodies.len() {
        for j in (i + 1)..bodies.len() {
            let d = (bodies[j].x - bodies[i].x).norm();
            if best.map_or(true, |(_, _, bd)| d < bd) {
                best = Some((i, j, d));
            }
        }
    }
    best
}

/// Sampling ranges for randomized scenarios
#[derive(Debug, Clone, PartialEq)]
pub struct RandomRanges {
    pub count: usize,
    pub mass: (f64, f64),
    pub radius: (f64, f64),
    pub max_speed: f64,
    pub zero_momentum: bool, // shift velocities so the centre of mass is at rest
}

fn finite_range(field: &'static str, (lo, hi): (f64, f64), min: f64) -> Result<(), ConfigError> {
    if !(lo.is_finite() && hi.is_finite() && lo >= min && lo <= hi) {
        return Err(ConfigError::InvalidValue {
            field,
            reason: format!("range [{lo}, {hi}] must be finite, ordered and start at {min} or above"),
        });
    }
    Ok(())
}

impl RandomRanges {
    /// Ranges `sample` can draw from without panicking
    pub fn validate(&self, min_radius: f64) -> Result<(), ConfigError> {
        if self.count < 2 {
            return Err(ConfigError::InvalidValue {
                field: "generator.count",
                reason: format!("needs at least 2 bodies, got {}", self.count),
            });
        }
        finite_range("generator.mass", self.mass, f64::MIN_POSITIVE)?;
        finite_range("generator.radius", self.radius, min_radius)?;
        if !(self.max_speed >= 0.0) || !self.max_speed.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "generator.max_speed",
                reason: format!("must be finite and >= 0, got {}", self.max_speed),
            });
        }
        Ok(())
    }
}

impl Default for RandomRanges {
    fn default() -> Self {
        Self {
            count: 3,
            mass: (50.0, 150.0),
            radius: (8.0, 12.0),
            max_speed: 20.0,
            zero_momentum: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeneratorMode {
    Fixed(Scenario),
    Random(RandomRanges),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioGenerator {
    pub mode: GeneratorMode,
    pub seed: u64,
    pub domain: Domain,
    pub min_separation: f64,
    pub min_radius: f64,
    pub max_attempts: usize, // per body, random mode only
}

impl ScenarioGenerator {
    /// Generator that always returns `scenario`
    pub fn fixed(scenario: Scenario, domain: Domain, min_separation: f64) -> Self {
        Self {
            mode: GeneratorMode::Fixed(scenario),
            seed: 0,
            domain,
            min_separation,
            min_radius: 0.0,
            max_attempts: 1000,
        }
    }

    /// Seeded random generator
    pub fn random(ranges: RandomRanges, seed: u64, domain: Domain, min_separation: f64) -> Self {
        let min_radius = ranges.radius.0;
        Self {
            mode: GeneratorMode::Random(ranges),
            seed,
            domain,
            min_separation,
            min_radius,
            max_attempts: 1000,
        }
    }

    pub fn is_random(&self) -> bool {
        matches!(self.mode, GeneratorMode::Random(_))
    }

    /// Domain, constraints and (random mode) sampling ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.domain.validate()?;
        for (field, value) in [
            ("parameters.min_separation", self.min_separation),
            ("parameters.min_radius", self.min_radius),
        ] {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: format!("must be finite and >= 0, got {value}"),
                });
            }
        }
        if let GeneratorMode::Random(ranges) = &self.mode {
            if self.max_attempts == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "generator.max_attempts",
                    reason: "must be at least 1".into(),
                });
            }
            ranges.validate(self.min_radius)?;
        }
        Ok(())
    }

    /// Scenario for the configured seed
    pub fn generate(&self) -> SimResult<Scenario> {
        self.generate_with_seed(self.seed)
    }

    /// Scenario for an explicit seed. Fixed mode ignores the seed.
    pub fn generate_with_seed(&self, seed: u64) -> SimResult<Scenario> {
        self.validate()?;

        let scenario = match &self.mode {
            GeneratorMode::Fixed(scenario) => scenario.clone(),
            GeneratorMode::Random(ranges) => self.sample(ranges, seed)?,
        };

        if let Some((i, b)) = scenario.bodies.iter().enumerate().find(|(_, b)| b.radius < self.min_radius) {
            return Err(SimError::InvalidScenario(format!(
                "body {i}: radius {} below minimum {}",
                b.radius, self.min_radius
            )));
        }
        scenario.validate(self.min_separation)?;
        self.check_start(&scenario)?;

        Ok(scenario)
    }

    // a generated scenario must not collide or escape on its first tick
    fn check_start(&self, scenario: &Scenario) -> SimResult<()> {
        if let Some((i, b)) = scenario.bodies.iter().enumerate().find(|(_, b)| !self.domain.contains(&b.x)) {
            return Err(SimError::InvalidScenario(format!(
                "body {i} at ({}, {}) starts outside the domain",
                b.x.x, b.x.y
            )));
        }
        if let Some((i, j)) = first_collision(&scenario.to_system()) {
            return Err(SimError::InvalidScenario(format!(
                "bodies {i} and {j} overlap at the start"
            )));
        }
        Ok(())
    }

    fn sample(&self, ranges: &RandomRanges, seed: u64) -> SimResult<Scenario> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut bodies: Vec<Body> = Vec::with_capacity(ranges.count);

        for i in 0..ranges.count {
            let m = sample_range(&mut rng, ranges.mass);
            let radius = sample_range(&mut rng, ranges.radius).max(self.min_radius);

            let mut placed = None;
            for _ in 0..self.max_attempts {
                let x = self.sample_position(&mut rng, radius);
                let clear = bodies.iter().all(|other| {
                    let d = (other.x - x).norm();
                    d >= self.min_separation && d > other.radius + radius
                });
                if clear {
                    placed = Some(x);
                    break;
                }
            }

            let x = placed.ok_or(ConfigError::Unsatisfiable {
                count: ranges.count,
                min_separation: self.min_separation,
                attempts: self.max_attempts,
            })?;

            let v = NVec2::new(
                rng.gen_range(-ranges.max_speed..=ranges.max_speed),
                rng.gen_range(-ranges.max_speed..=ranges.max_speed),
            );

            bodies.push(Body {
                x,
                v,
                m,
                radius,
                color: palette_color(i),
            });
        }

        if ranges.zero_momentum {
            let total_m: f64 = bodies.iter().map(|b| b.m).sum();
            let p: NVec2 = bodies.iter().map(|b| b.momentum()).sum();
            let v_cm = p / total_m;
            for b in bodies.iter_mut() {
                b.v -= v_cm;
            }
        }

        Ok(Scenario { bodies })
    }

    // uniform inside the domain, inset so the body starts fully inside
    fn sample_position(&self, rng: &mut ChaCha8Rng, radius: f64) -> NVec2 {
        let lo = self.domain.min.add_scalar(radius);
        let hi = self.domain.max.add_scalar(-radius);
        NVec2::new(
            sample_range(rng, (lo.x, hi.x)),
            sample_range(rng, (lo.y, hi.y)),
        )
    }
}

// uniform in [lo, hi], degenerate ranges return lo
fn sample_range(rng: &mut ChaCha8Rng, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}
