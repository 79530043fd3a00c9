//! Snake population manager - owns every live snake and drives each tick
//!
//! A tick runs three phases in order: every snake moves, then the all-pairs
//! collision pass resolves bites on the new positions, then the spawn timer
//! advances and may hatch one snake.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::{Direction, LocalPos, Viewport};
use crate::config::PopulationConfig;
use crate::persistence::{PopulationSnapshot, SaveError};
use crate::render::Surface;
use crate::snake::{Snake, Step};
use crate::world::{Habitat, MessageSink, Terrain};

/// One resolved bite from the collision pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiteEvent {
    pub attacker: usize,
    pub victim: usize,
    /// Whether the victim lost a segment
    pub took_segment: bool,
}

/// What happened during one [`SnakePopulation::update`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickSummary {
    pub moved: usize,
    pub eggs_eaten: usize,
    pub bites: Vec<BiteEvent>,
    pub spawned: bool,
}

/// The set of live snakes plus spawn bookkeeping.
///
/// Snakes are identified by their index, which is stable: snakes are only
/// ever appended. Index order also decides which bites resolve first.
pub struct SnakePopulation {
    config: PopulationConfig,
    snakes: Vec<Snake>,
    /// Seconds until the next spawn attempt
    spawn_cooldown: f32,
    active: bool,
    rng: StdRng,
}

fn seeded_rng(config: &PopulationConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Borrow two distinct elements mutably
fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (lo, hi) = items.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

impl SnakePopulation {
    pub fn new(config: PopulationConfig) -> Self {
        Self {
            rng: seeded_rng(&config),
            config,
            snakes: Vec::new(),
            spawn_cooldown: 0.0,
            active: true,
        }
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enable or disable the population. While inactive nothing advances.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn len(&self) -> usize {
        self.snakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snakes.is_empty()
    }

    pub fn snakes(&self) -> &[Snake] {
        &self.snakes
    }

    pub fn snake(&self, index: usize) -> Option<&Snake> {
        self.snakes.get(index)
    }

    pub fn spawn_cooldown(&self) -> f32 {
        self.spawn_cooldown
    }

    /// Add a snake directly. Refused once the population is at its cap.
    pub fn insert(&mut self, snake: Snake) -> bool {
        if self.snakes.len() >= self.config.max_snakes {
            return false;
        }
        self.snakes.push(snake);
        true
    }

    /// Advance the whole population by `delta_seconds`
    pub fn update(&mut self, delta_seconds: f32, habitat: &mut Habitat<'_>) -> TickSummary {
        let mut summary = TickSummary::default();
        if !self.active {
            return summary;
        }

        for snake in &mut self.snakes {
            if let Step::Moved { ate_egg } =
                snake.update(delta_seconds, &self.config.rules, habitat, &mut self.rng)
            {
                summary.moved += 1;
                if ate_egg {
                    summary.eggs_eaten += 1;
                }
            }
        }

        summary.bites = self.check_collisions(&mut *habitat.messages);

        self.spawn_cooldown -= delta_seconds;
        if self.spawn_cooldown <= 0.0 {
            self.spawn_cooldown = self.config.spawn_interval;
            summary.spawned = self.try_spawn(habitat);
        }

        summary
    }

    /// Resolve every head-on-body overlap between distinct snakes.
    ///
    /// Each ordered pair is checked, so two snakes can bite each other in the
    /// same pass. A pair bites at most once however many segments overlap.
    pub fn check_collisions(&mut self, messages: &mut dyn MessageSink) -> Vec<BiteEvent> {
        let mut bites = Vec::new();

        for i in 0..self.snakes.len() {
            let Some(head) = self.snakes[i].head() else {
                continue;
            };

            for j in 0..self.snakes.len() {
                if i == j || self.snakes[j].body.len() < 2 {
                    continue;
                }
                if !self.snakes[j].body_contains(head) {
                    continue;
                }

                let (attacker, victim) = pair_mut(&mut self.snakes, i, j);
                let took_segment = attacker.bite(victim, &self.config.rules, messages);
                log::debug!(
                    "Snake {} bit snake {} at ({}, {}), took_segment={}",
                    i,
                    j,
                    head.x,
                    head.y,
                    took_segment
                );
                bites.push(BiteEvent {
                    attacker: i,
                    victim: j,
                    took_segment,
                });
            }
        }

        bites
    }

    /// Try to hatch one snake on a plant cell near the origin.
    ///
    /// Draws up to `spawn_attempts` random offsets; the first that lands on a
    /// plant gets the new snake. Returns false (changing nothing) at the cap
    /// or when no candidate qualifies.
    pub fn try_spawn(&mut self, habitat: &Habitat<'_>) -> bool {
        if self.snakes.len() >= self.config.max_snakes {
            return false;
        }

        let radius = self.config.spawn_radius.max(0);
        for _ in 0..self.config.spawn_attempts {
            let offset = LocalPos::new(
                self.rng.gen_range(-radius..=radius),
                self.rng.gen_range(-radius..=radius),
            );
            let (at, terrain) = habitat.terrain_at(offset);
            if terrain != Terrain::Plant {
                continue;
            }

            let direction = Direction::random(&mut self.rng);
            self.snakes
                .push(Snake::new(offset, direction, &self.config.rules));
            log::debug!(
                "Snake hatched at world ({}, {}), population {}",
                at.x,
                at.y,
                self.snakes.len()
            );
            return true;
        }

        log::trace!(
            "No plant found in {} spawn attempts",
            self.config.spawn_attempts
        );
        false
    }

    /// Draw all snakes in population order.
    pub fn render(&self, surface: &mut dyn Surface, viewport: &Viewport) {
        if !self.active {
            return;
        }
        for snake in &self.snakes {
            snake.render(surface, viewport, &self.config.rules);
        }
    }

    /// Capture the population for saving
    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot::new(self.active, self.spawn_cooldown, self.snakes.clone())
    }

    /// Save population state to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), SaveError> {
        crate::persistence::save_population(writer, &self.snapshot())
    }

    /// Load population state from a reader.
    ///
    /// The rng is not part of a save; it is reseeded from the config. A save
    /// holding more snakes than this population's cap is rejected unchanged.
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let loaded = crate::persistence::load_population(reader)?;
        if loaded.snakes.len() > self.config.max_snakes {
            return Err(SaveError::OverCapacity {
                cap: self.config.max_snakes,
                found: loaded.snakes.len(),
            });
        }

        self.active = loaded.active;
        self.spawn_cooldown = loaded.spawn_cooldown;
        self.snakes = loaded.snakes;
        self.rng = seeded_rng(&self.config);

        Ok(())
    }
}

impl Default for SnakePopulation {
    fn default() -> Self {
        Self::new(PopulationConfig::default())
    }
}
