//! The snake entity: movement, growth, bites and its on-screen projection.
//!
//! A snake is a head-first run of local cells. Every move prepends a new head
//! and trims the tail back to `length + rattles`, so changes to either take
//! effect on the next move rather than immediately.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{Direction, LocalPos, Viewport};
use crate::config::SnakeRules;
use crate::render::{Glyph, SegmentStyle, Surface, Tone};
use crate::world::{space_key, Habitat, MessageSink, Terrain};

pub const BITE_MESSAGE: &str = "Snake bite! One snake lost a segment, another gained rattles.";

/// Result of a single [`Snake::update`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Move timer still running
    Waiting,
    Moved { ate_egg: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snake {
    /// Segments, head first
    pub body: VecDeque<LocalPos>,
    /// Target length from eggs eaten, rattles excluded
    pub length: usize,
    /// Extra trailing segments earned by biting
    pub rattles: usize,
    pub direction: Direction,
    /// Seconds until the next move
    pub move_cooldown: f32,
}

impl Snake {
    /// A freshly hatched snake: a lone head that grows out to the initial
    /// length over its first moves. The move timer starts expired.
    pub fn new(head: LocalPos, direction: Direction, rules: &SnakeRules) -> Self {
        Self {
            body: VecDeque::from([head]),
            length: rules.initial_length,
            rattles: 0,
            direction,
            move_cooldown: 0.0,
        }
    }

    /// A snake laid out along explicit segments, head first.
    pub fn with_body<I>(segments: I, direction: Direction) -> Self
    where
        I: IntoIterator,
        I::Item: Into<LocalPos>,
    {
        let body: VecDeque<LocalPos> = segments.into_iter().map(Into::into).collect();
        Self {
            length: body.len(),
            body,
            rattles: 0,
            direction,
            move_cooldown: 0.0,
        }
    }

    pub fn head(&self) -> Option<LocalPos> {
        self.body.front().copied()
    }

    pub fn segments(&self) -> impl Iterator<Item = LocalPos> + '_ {
        self.body.iter().copied()
    }

    /// Whether `pos` lies on this snake anywhere behind the head.
    pub fn body_contains(&self, pos: LocalPos) -> bool {
        self.body.iter().skip(1).any(|&seg| seg == pos)
    }

    /// Segments from `length` onward are rattles.
    pub fn is_rattle(&self, index: usize) -> bool {
        index > 0 && index >= self.length
    }

    pub fn at_max_length(&self, rules: &SnakeRules) -> bool {
        self.length >= rules.max_length
    }

    /// Advance the move timer and take one step once it expires.
    ///
    /// Landing on an egg grows the snake (up to `max_length`) and records the
    /// egg as consumed in the habitat's space store, flushing it right away.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        delta_seconds: f32,
        rules: &SnakeRules,
        habitat: &mut Habitat<'_>,
        rng: &mut R,
    ) -> Step {
        let Some(head) = self.head() else {
            return Step::Waiting;
        };

        self.move_cooldown -= delta_seconds;
        if self.move_cooldown > 0.0 {
            return Step::Waiting;
        }
        self.move_cooldown = rules.move_interval;

        if rng.gen::<f64>() < rules.turn_chance {
            self.direction = Direction::random(rng);
        }

        let new_head = head + self.direction;
        let (at, terrain) = habitat.terrain_at(new_head);
        let ate_egg = terrain == Terrain::Egg;
        if ate_egg {
            if self.length < rules.max_length {
                self.length += 1;
            }
            habitat.spaces.set(space_key(at), at);
            if let Err(e) = habitat.spaces.save() {
                log::warn!("Could not persist egg eaten at ({}, {}): {}", at.x, at.y, e);
            }
        }

        self.body.push_front(new_head);
        while self.body.len() > self.length + self.rattles {
            self.body.pop_back();
        }

        Step::Moved { ate_egg }
    }

    /// Bite `other`, returning whether it lost a segment.
    ///
    /// The attacker always gains rattles, even when the victim is too short to
    /// lose anything. A long enough victim loses its middle segment and one
    /// point of length.
    pub fn bite(
        &mut self,
        other: &mut Snake,
        rules: &SnakeRules,
        messages: &mut dyn MessageSink,
    ) -> bool {
        self.rattles += rules.rattles_per_bite;

        if other.body.len() <= rules.bite_min_segments {
            return false;
        }

        let middle = other.body.len() / 2;
        other.body.remove(middle);
        other.length = other.length.saturating_sub(1);
        messages.post(BITE_MESSAGE, rules.bite_message_secs);
        true
    }

    /// Draw every on-screen segment. Refused cell writes are ignored.
    pub fn render(&self, surface: &mut dyn Surface, viewport: &Viewport, rules: &SnakeRules) {
        let bold = self.at_max_length(rules);

        for (i, &pos) in self.body.iter().enumerate() {
            let (row, col) = viewport.to_screen(pos);
            if !viewport.contains(row, col) {
                continue;
            }

            let (glyph, tone) = if i == 0 {
                (Glyph::Head, Tone::Snake)
            } else if self.is_rattle(i) {
                (Glyph::Rattle, Tone::Danger)
            } else {
                (Glyph::Body, Tone::Snake)
            };

            let _ = surface.put(row, col, glyph, SegmentStyle { tone, bold });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Origin, WorldCoord};
    use crate::persistence::SaveError;
    use crate::render::TextSurface;
    use crate::world::{MemorySpaces, MessageBoard, SpaceStore, WorldOracle};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn straight_rules() -> SnakeRules {
        SnakeRules {
            turn_chance: 0.0,
            ..Default::default()
        }
    }

    fn empty(_: WorldCoord) -> Terrain {
        Terrain::Empty
    }

    fn eggs(_: WorldCoord) -> Terrain {
        Terrain::Egg
    }

    fn step(
        snake: &mut Snake,
        rules: &SnakeRules,
        oracle: &dyn WorldOracle,
        n: usize,
    ) -> MemorySpaces {
        let mut spaces = MemorySpaces::new();
        let mut board = MessageBoard::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut habitat = Habitat::new(Origin::default(), oracle, &mut spaces, &mut board);
        for _ in 0..n {
            snake.update(rules.move_interval, rules, &mut habitat, &mut rng);
        }
        spaces
    }

    #[test]
    fn test_move_trims_tail() {
        let rules = straight_rules();
        let mut snake = Snake::with_body([(5, 5), (5, 6), (5, 7)], Direction::Up);
        step(&mut snake, &rules, &empty, 1);

        let body: Vec<_> = snake.segments().collect();
        assert_eq!(
            body,
            vec![LocalPos::new(5, 4), LocalPos::new(5, 5), LocalPos::new(5, 6)]
        );
        assert_eq!(snake.length, 3);
    }

    #[test]
    fn test_first_update_moves_immediately() {
        let rules = straight_rules();
        let mut snake = Snake::new(LocalPos::new(0, 0), Direction::Right, &rules);
        let mut spaces = MemorySpaces::new();
        let mut board = MessageBoard::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut habitat = Habitat::new(Origin::default(), &empty, &mut spaces, &mut board);

        assert_eq!(
            snake.update(0.001, &rules, &mut habitat, &mut rng),
            Step::Moved { ate_egg: false }
        );
        assert_eq!(snake.head(), Some(LocalPos::new(1, 0)));
        // Timer now runs for a full interval
        assert_eq!(snake.update(0.25, &rules, &mut habitat, &mut rng), Step::Waiting);
        assert_eq!(
            snake.update(0.25, &rules, &mut habitat, &mut rng),
            Step::Moved { ate_egg: false }
        );
        assert_eq!(snake.head(), Some(LocalPos::new(2, 0)));
    }

    #[test]
    fn test_hatchling_grows_to_initial_length() {
        let rules = straight_rules();
        let mut snake = Snake::new(LocalPos::new(0, 0), Direction::Down, &rules);
        step(&mut snake, &rules, &empty, 1);
        assert_eq!(snake.body.len(), 2);
        step(&mut snake, &rules, &empty, 5);
        assert_eq!(snake.body.len(), 3);
    }

    #[test]
    fn test_egg_grows_and_is_recorded() {
        let rules = straight_rules();
        let mut snake = Snake::with_body([(0, 0), (0, 1), (0, 2)], Direction::Up);
        let spaces = step(&mut snake, &rules, &eggs, 1);

        assert_eq!(snake.length, 4);
        assert_eq!(snake.body.len(), 4);
        assert!(spaces.is_consumed(WorldCoord::new(0, -1)));
        assert_eq!(spaces.saves, 1);
    }

    #[test]
    fn test_growth_saturates() {
        let rules = straight_rules();
        let mut snake = Snake::new(LocalPos::new(0, 0), Direction::Left, &rules);
        let spaces = step(&mut snake, &rules, &eggs, 40);

        assert_eq!(snake.length, rules.max_length);
        assert_eq!(snake.body.len(), rules.max_length);
        // Eggs past the cap are still consumed
        assert_eq!(spaces.entries.len(), 40);
        assert_eq!(spaces.saves, 40);
    }

    #[test]
    fn test_rattles_extend_body() {
        let rules = straight_rules();
        let mut snake = Snake::with_body([(0, 0), (1, 0), (2, 0)], Direction::Left);
        snake.rattles = 2;
        step(&mut snake, &rules, &empty, 1);
        assert_eq!(snake.body.len(), 4);
        step(&mut snake, &rules, &empty, 3);
        assert_eq!(snake.body.len(), snake.length + snake.rattles);
    }

    struct FullDisk;

    impl SpaceStore for FullDisk {
        fn set(&mut self, _key: String, _at: WorldCoord) {}

        fn save(&mut self) -> Result<(), SaveError> {
            Err(SaveError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }
    }

    #[test]
    fn test_store_failure_does_not_stop_growth() {
        let rules = straight_rules();
        let mut snake = Snake::with_body([(0, 0), (0, 1), (0, 2)], Direction::Up);
        let mut disk = FullDisk;
        let mut board = MessageBoard::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut habitat = Habitat::new(Origin::default(), &eggs, &mut disk, &mut board);

        assert_eq!(
            snake.update(1.0, &rules, &mut habitat, &mut rng),
            Step::Moved { ate_egg: true }
        );
        assert_eq!(snake.length, 4);
    }

    #[test]
    fn test_bite_removes_middle_segment() {
        let rules = SnakeRules::default();
        let mut board = MessageBoard::new();
        let mut a = Snake::with_body([(2, 2), (1, 2), (0, 2)], Direction::Up);
        let mut b = Snake::with_body([(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)], Direction::Up);

        assert!(a.bite(&mut b, &rules, &mut board));
        assert_eq!(a.rattles, 2);
        assert_eq!(b.length, 4);
        let body: Vec<_> = b.segments().collect();
        assert_eq!(
            body,
            vec![
                LocalPos::new(2, 0),
                LocalPos::new(2, 1),
                LocalPos::new(2, 3),
                LocalPos::new(2, 4)
            ]
        );
        assert_eq!(board.current(), Some(BITE_MESSAGE));
        assert!((board.remaining() - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bite_on_short_snake_still_grants_rattles() {
        let rules = SnakeRules::default();
        let mut board = MessageBoard::new();
        let mut a = Snake::with_body([(1, 1), (0, 1), (0, 0)], Direction::Up);
        let mut b = Snake::with_body([(1, 0), (1, 1), (1, 2)], Direction::Up);
        let before = b.clone();

        assert!(!a.bite(&mut b, &rules, &mut board));
        assert_eq!(a.rattles, 2);
        assert_eq!(b, before);
        assert_eq!(board.current(), None);
    }

    #[test]
    fn test_repeated_bites_floor_length_at_zero() {
        let rules = SnakeRules::default();
        let mut board = MessageBoard::new();
        let mut a = Snake::with_body([(9, 9)], Direction::Up);
        let mut b = Snake::with_body((0..8).map(|y| (0, y)), Direction::Up);
        b.length = 1;
        b.rattles = 7;

        assert!(a.bite(&mut b, &rules, &mut board));
        assert_eq!(b.length, 0);
        assert!(a.bite(&mut b, &rules, &mut board));
        assert_eq!(b.length, 0);
        assert_eq!(b.body.len(), 6);
    }

    #[test]
    fn test_egg_lookup_rounds_half_to_even() {
        let rules = straight_rules();
        let only_48 = |at: WorldCoord| {
            if at == WorldCoord::new(48, 0) {
                Terrain::Egg
            } else {
                Terrain::Empty
            }
        };
        let mut spaces = MemorySpaces::new();
        let mut board = MessageBoard::new();
        let mut rng = StdRng::seed_from_u64(2);
        let mut habitat = Habitat::new(Origin::new(47.5, 0.0), &only_48, &mut spaces, &mut board);

        // Local 1 + 47.5 = 48.5 rounds to 48
        let mut snake = Snake::with_body([(0, 0), (-1, 0), (-2, 0)], Direction::Right);
        assert_eq!(
            snake.update(0.5, &rules, &mut habitat, &mut rng),
            Step::Moved { ate_egg: true }
        );
        // Local 2 + 47.5 = 49.5 rounds to 50, not 48
        assert_eq!(
            snake.update(0.5, &rules, &mut habitat, &mut rng),
            Step::Moved { ate_egg: false }
        );
        assert!(spaces.is_consumed(WorldCoord::new(48, 0)));
        assert_eq!(spaces.entries.len(), 1);
    }

    #[test]
    fn test_render_glyphs() {
        let rules = SnakeRules::default();
        let view = Viewport::new(10, 10);
        let mut snake = Snake::with_body([(0, 0), (1, 0), (2, 0), (3, 0)], Direction::Left);
        snake.length = 3;
        snake.rattles = 1;

        let mut surface = TextSurface::new(10, 10);
        snake.render(&mut surface, &view, &rules);

        assert_eq!(surface.char_at(5, 5), Some('S'));
        assert_eq!(surface.char_at(5, 6), Some('s'));
        assert_eq!(surface.char_at(5, 7), Some('s'));
        assert_eq!(surface.char_at(5, 8), Some('.'));
        assert_eq!(surface.style_at(5, 8).map(|s| s.tone), Some(Tone::Danger));
        assert_eq!(surface.style_at(5, 5).map(|s| s.bold), Some(false));
    }

    #[test]
    fn test_render_bold_at_max_length() {
        let rules = SnakeRules {
            max_length: 3,
            ..Default::default()
        };
        let snake = Snake::with_body([(0, 0), (0, 1), (0, 2)], Direction::Up);
        let mut surface = TextSurface::new(9, 9);
        snake.render(&mut surface, &Viewport::new(9, 9), &rules);
        assert_eq!(surface.style_at(4, 4).map(|s| s.bold), Some(true));
    }

    #[test]
    fn test_render_clips_and_swallows_corner() {
        let rules = SnakeRules::default();
        let view = Viewport::new(4, 4);
        // Head far off screen, one segment on the refused bottom-right cell
        let snake = Snake::with_body([(-50, 0), (1, 1), (0, 1)], Direction::Up);
        let mut surface = TextSurface::new(4, 4);
        snake.render(&mut surface, &view, &rules);

        assert_eq!(surface.char_at(3, 3), Some(' '));
        assert_eq!(surface.char_at(3, 2), Some('s'));
    }
}
