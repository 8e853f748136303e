//! Particle simulation for the emitter tool.
//!
//! A [`Simulation`] owns the live particle pool and a [`TickClock`]. Each
//! tick it spawns new particles, applies the enabled commands, integrates
//! positions and retires particles whose life is over:
//!
//! 1. spawn a random count in `[spawn_min, spawn_max]`, capped so the pool
//!    never exceeds `max_particles`
//! 2. apply each enabled command, in list order, to every live particle
//! 3. `previous_position = position; position += velocity`
//! 4. `age += 1`, removing particles with `age >= max_life`
//!
//! Rendering reads positions interpolated between the last two ticks by the
//! clock's leftover fraction.

use glam::DVec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::command::{Command, CommandContext};
use crate::eval::apply_all;
use crate::particle::{Particle, RenderVertex};
use crate::spawn::{EmitterShape, InitialVelocity};
use crate::time::TickClock;
use crate::tree::NodeTree;

/// Emitter and pool settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub ticks_per_second: f64,
    /// Catch-up bound for long frames.
    pub max_ticks_per_frame: u32,
    /// Particles spawned per tick, inclusive range.
    pub spawn_min: u32,
    pub spawn_max: u32,
    /// Live pool capacity.
    pub max_particles: usize,
    /// Lifetime in ticks, inclusive range.
    pub life_min: u32,
    pub life_max: u32,
    pub size_min: f64,
    pub size_max: f64,
    pub shape: EmitterShape,
    /// Emitter position.
    pub offset: DVec3,
    pub velocity: InitialVelocity,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: 20.0,
            max_ticks_per_frame: 8,
            spawn_min: 1,
            spawn_max: 3,
            max_particles: 2000,
            life_min: 40,
            life_max: 80,
            size_min: 0.05,
            size_max: 0.15,
            shape: EmitterShape::default(),
            offset: DVec3::ZERO,
            velocity: InitialVelocity::default(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Save the configuration as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }
}

/// Inclusive integer range that tolerates swapped bounds.
fn range_u32<R: Rng>(rng: &mut R, a: u32, b: u32) -> u32 {
    rng.gen_range(a.min(b)..=a.max(b))
}

fn range_f64<R: Rng>(rng: &mut R, a: f64, b: f64) -> f64 {
    if a == b {
        a
    } else {
        rng.gen_range(a.min(b)..=a.max(b))
    }
}

/// A running particle pool.
pub struct Simulation {
    config: SimulationConfig,
    clock: TickClock,
    particles: Vec<Particle>,
    rng: SmallRng,
    ticks: u64,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        log::debug!("new simulation emitting from a {} shape", config.shape.name());
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let clock = TickClock::new(config.ticks_per_second).with_max_ticks_per_frame(config.max_ticks_per_frame);
        Self {
            config,
            clock,
            particles: Vec::new(),
            rng,
            ticks: 0,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn clock(&self) -> &TickClock {
        &self.clock
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated seconds so far.
    pub fn time(&self) -> f64 {
        self.ticks as f64 / self.clock.ticks_per_second()
    }

    /// Drop every live particle.
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Add a particle directly, ignoring the emitter. Returns `false` when
    /// the pool is full.
    pub fn insert(&mut self, particle: Particle) -> bool {
        if self.particles.len() >= self.config.max_particles {
            return false;
        }
        self.particles.push(particle);
        true
    }

    /// Feed a frame's delta time and run the ticks it releases.
    ///
    /// Returns the number of ticks run.
    pub fn advance(&mut self, delta_seconds: f64, commands: &NodeTree<Command>) -> u32 {
        let ticks = self.clock.advance(delta_seconds);
        for _ in 0..ticks {
            self.tick(commands);
        }
        ticks
    }

    /// Run exactly one tick.
    pub fn tick(&mut self, commands: &NodeTree<Command>) {
        self.spawn();

        let time = self.time();
        for particle in &mut self.particles {
            let mut ctx = CommandContext { particle, time };
            apply_all(commands.roots(), &mut ctx);
        }

        for particle in &mut self.particles {
            particle.previous_position = particle.position;
            particle.position += particle.velocity;
            particle.age += 1;
        }
        self.particles.retain(|p| !p.is_expired());

        let max = self.config.max_particles;
        if self.particles.len() > max {
            let excess = self.particles.len() - max;
            self.particles.drain(..excess);
        }
        self.ticks += 1;
    }

    fn spawn(&mut self) {
        let wanted = range_u32(&mut self.rng, self.config.spawn_min, self.config.spawn_max) as usize;
        let room = self.config.max_particles.saturating_sub(self.particles.len());
        let count = wanted.min(room);

        for _ in 0..count {
            let local = self.config.shape.sample(&mut self.rng);
            let velocity = self.config.velocity.sample(&mut self.rng, local);
            let life = range_u32(&mut self.rng, self.config.life_min, self.config.life_max).max(1);
            let size = range_f64(&mut self.rng, self.config.size_min, self.config.size_max);
            let seed = self.rng.gen();
            self.particles
                .push(Particle::new(local + self.config.offset, velocity, life, size, seed));
        }
    }

    /// Fraction of the next tick already elapsed.
    pub fn alpha(&self) -> f64 {
        self.clock.alpha()
    }

    /// Interpolated positions for rendering.
    pub fn render_positions(&self) -> Vec<DVec3> {
        let alpha = self.alpha();
        self.particles.iter().map(|p| p.interpolated(alpha)).collect()
    }

    /// Interpolated instance data, ready for `bytemuck::cast_slice`.
    pub fn render_vertices(&self) -> Vec<RenderVertex> {
        let alpha = self.alpha();
        self.particles
            .iter()
            .map(|p| RenderVertex::from_particle(p, alpha))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ParticleGravity;

    fn quiet_config() -> SimulationConfig {
        SimulationConfig {
            spawn_min: 0,
            spawn_max: 0,
            seed: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_particle_retired_exactly_at_end_of_life() {
        let commands = NodeTree::new();
        let mut sim = Simulation::new(quiet_config());
        sim.insert(Particle::new(DVec3::ZERO, DVec3::ZERO, 5, 0.1, 0));
        for tick in 1..=5 {
            sim.tick(&commands);
            if tick < 5 {
                assert_eq!(sim.len(), 1, "removed early at tick {tick}");
            }
        }
        assert!(sim.is_empty());
    }

    #[test]
    fn test_spawn_capped_by_pool() {
        let config = SimulationConfig {
            spawn_min: 10,
            spawn_max: 10,
            max_particles: 25,
            life_min: 100,
            life_max: 100,
            seed: Some(3),
            ..Default::default()
        };
        let commands = NodeTree::new();
        let mut sim = Simulation::new(config);
        sim.tick(&commands);
        assert_eq!(sim.len(), 10);
        sim.tick(&commands);
        sim.tick(&commands);
        assert_eq!(sim.len(), 25);
    }

    #[test]
    fn test_commands_then_integrate() {
        let mut commands = NodeTree::new();
        commands.push(Command::Gravity(ParticleGravity {
            strength: 0.5,
            damping: 0.0,
        }));
        let mut sim = Simulation::new(quiet_config());
        sim.insert(Particle::new(DVec3::ZERO, DVec3::ZERO, 10, 0.1, 0));
        sim.tick(&commands);
        let p = &sim.particles()[0];
        assert_eq!(p.previous_position, DVec3::ZERO);
        assert_eq!(p.position, DVec3::new(0.0, -0.5, 0.0));
        assert_eq!(p.age, 1);
    }

    #[test]
    fn test_disabled_command_skipped() {
        let mut commands = NodeTree::new();
        let gravity = commands.push(Command::Gravity(ParticleGravity::default()));
        commands.set_enabled(gravity, false).unwrap();
        let mut sim = Simulation::new(quiet_config());
        sim.insert(Particle::new(DVec3::ZERO, DVec3::ZERO, 10, 0.1, 0));
        sim.tick(&commands);
        assert_eq!(sim.particles()[0].position, DVec3::ZERO);
    }

    #[test]
    fn test_advance_runs_whole_ticks() {
        let config = SimulationConfig {
            ticks_per_second: 4.0,
            ..quiet_config()
        };
        let commands = NodeTree::new();
        let mut sim = Simulation::new(config);
        sim.insert(Particle::new(DVec3::ZERO, DVec3::X, 10, 0.1, 0));
        assert_eq!(sim.advance(0.375, &commands), 1);
        assert_eq!(sim.alpha(), 0.5);
        assert_eq!(sim.render_positions(), vec![DVec3::new(0.5, 0.0, 0.0)]);
        assert_eq!(sim.render_vertices()[0].position, [0.5, 0.0, 0.0]);
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let config = SimulationConfig {
            seed: Some(99),
            ..Default::default()
        };
        let commands = NodeTree::new();
        let mut a = Simulation::new(config.clone());
        let mut b = Simulation::new(config);
        for _ in 0..10 {
            a.tick(&commands);
            b.tick(&commands);
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_config_json_defaults() {
        let config: SimulationConfig = serde_json::from_str(r#"{"spawn_max": 7}"#).unwrap();
        assert_eq!(config.spawn_max, 7);
        assert_eq!(config.ticks_per_second, 20.0);
    }
}
