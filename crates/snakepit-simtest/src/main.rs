//! Snakepit Headless Simulation Harness
//!
//! Exercises the snake population without a terminal: fixed scenarios plus a
//! long seeded run against the procedural world.
//!
//! Usage:
//!   cargo run -p snakepit-simtest
//!   cargo run -p snakepit-simtest -- --verbose
//!   cargo run -p snakepit-simtest -- --frames --seed 9
//!   cargo run -p snakepit-simtest -- --config snakes.json --json

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use snakepit_core::config::{validate_config, PopulationConfig, SnakeRules};
use snakepit_core::prelude::*;
use snakepit_core::world::space_key;

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Serialize)]
struct Report<'a> {
    seed: u64,
    passed: usize,
    failed: usize,
    results: &'a [TestResult],
}

struct Options {
    verbose: bool,
    frames: bool,
    json: bool,
    seed: u64,
    config_path: Option<String>,
}

fn parse_args() -> Options {
    let mut options = Options {
        verbose: false,
        frames: false,
        json: false,
        seed: 42,
        config_path: None,
    };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--verbose" => options.verbose = true,
            "--frames" => options.frames = true,
            "--json" => options.json = true,
            "--seed" => {
                if let Some(seed) = args.next().and_then(|s| s.parse().ok()) {
                    options.seed = seed;
                }
            }
            "--config" => options.config_path = args.next(),
            other => eprintln!("ignoring unknown argument {}", other),
        }
    }
    options
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail,
    }
}

fn main() {
    let options = parse_args();
    if !options.json {
        println!("=== Snakepit Simulation Harness (seed {}) ===\n", options.seed);
    }

    let mut results = Vec::new();

    // 1. Configuration
    let config = load_config(&options, &mut results).unwrap_or_default();

    // 2. Procedural world markers
    results.extend(validate_oracle());

    // 3. Movement and growth
    results.extend(validate_movement(&config.rules));

    // 4. Bites and collisions
    results.extend(validate_bites(&config.rules));

    // 5. Spawning and the population cap
    results.extend(validate_spawning(&config, options.seed));

    // 6. Long seeded run
    results.extend(validate_long_run(&config, &options));

    // 7. Save / load
    results.extend(validate_persistence(&config, options.seed));

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if options.json {
        let report = Report {
            seed: options.seed,
            passed,
            failed,
            results: &results,
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("could not encode report: {}", e),
        }
    } else {
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || options.verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed,
            results.len(),
            failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Configuration ────────────────────────────────────────────────────

fn load_config(options: &Options, results: &mut Vec<TestResult>) -> Option<PopulationConfig> {
    let path = options.config_path.as_ref()?;

    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            results.push(check("config_read", false, format!("{}: {}", path, e)));
            return None;
        }
    };
    let config = match PopulationConfig::from_json(&text) {
        Ok(config) => config,
        Err(e) => {
            results.push(check("config_parse", false, e.to_string()));
            return None;
        }
    };

    let errors = validate_config(&config);
    let detail = if errors.is_empty() {
        format!("{} loaded", path)
    } else {
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    };
    let valid = errors.is_empty();
    results.push(check("config_valid", valid, detail));
    valid.then_some(config)
}

// ── 2. Procedural world ─────────────────────────────────────────────────

fn validate_oracle() -> Vec<TestResult> {
    let mut results = Vec::new();
    let (mut eggs, mut plants, mut total) = (0usize, 0usize, 0usize);
    for y in -200..200 {
        for x in -200..200 {
            total += 1;
            match ProceduralOracle.classify(WorldCoord::new(x, y)) {
                Terrain::Egg => eggs += 1,
                Terrain::Plant => plants += 1,
                Terrain::Empty => {}
            }
        }
    }
    // Each marker is one residue out of 127
    let expected = total as f64 / 127.0;
    let near = |n: usize| (n as f64 - expected).abs() / expected < 0.05;
    results.push(check(
        "oracle_marker_density",
        near(eggs) && near(plants),
        format!("{} eggs, {} plants in {} cells", eggs, plants, total),
    ));
    results
}

// ── 3. Movement ─────────────────────────────────────────────────────────

fn no_terrain(_: WorldCoord) -> Terrain {
    Terrain::Empty
}

fn all_eggs(_: WorldCoord) -> Terrain {
    Terrain::Egg
}

fn validate_movement(rules: &SnakeRules) -> Vec<TestResult> {
    let mut results = Vec::new();
    let straight = SnakeRules {
        turn_chance: 0.0,
        ..rules.clone()
    };
    let mut rng = StdRng::seed_from_u64(0);
    let mut spaces = MemorySpaces::new();
    let mut messages = MessageBoard::new();

    let mut snake = Snake::with_body([(5, 5), (5, 6), (5, 7)], Direction::Up);
    {
        let mut habitat = Habitat::new(Origin::default(), &no_terrain, &mut spaces, &mut messages);
        snake.update(straight.move_interval, &straight, &mut habitat, &mut rng);
    }
    let body: Vec<(i32, i32)> = snake.segments().map(|p| (p.x, p.y)).collect();
    results.push(check(
        "move_trims_tail",
        body == vec![(5, 4), (5, 5), (5, 6)] && snake.length == 3,
        format!("body after one move: {:?}", body),
    ));

    let mut grower = Snake::new(LocalPos::new(0, 0), Direction::Right, &straight);
    {
        let mut habitat = Habitat::new(Origin::default(), &all_eggs, &mut spaces, &mut messages);
        for _ in 0..(straight.max_length * 3) {
            grower.update(straight.move_interval, &straight, &mut habitat, &mut rng);
        }
    }
    results.push(check(
        "growth_saturates",
        grower.length == straight.max_length && grower.body.len() == straight.max_length,
        format!(
            "length {} body {} after {} eggs",
            grower.length,
            grower.body.len(),
            spaces.entries.len()
        ),
    ));
    results
}

// ── 4. Bites ────────────────────────────────────────────────────────────

fn validate_bites(rules: &SnakeRules) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut messages = MessageBoard::new();

    let mut a = Snake::with_body([(2, 2), (1, 2), (0, 2)], Direction::Up);
    let mut b = Snake::with_body([(2, 0), (2, 1), (2, 2), (2, 3), (2, 4)], Direction::Up);
    let took = a.bite(&mut b, rules, &mut messages);
    results.push(check(
        "bite_takes_middle_segment",
        took && b.length == 4 && b.body.len() == 4 && a.rattles == rules.rattles_per_bite,
        format!(
            "victim length {} body {}, attacker rattles {}",
            b.length,
            b.body.len(),
            a.rattles
        ),
    ));

    let mut c = Snake::with_body([(1, 1), (0, 1), (0, 0)], Direction::Up);
    let mut d = Snake::with_body([(1, 0), (1, 1), (1, 2)], Direction::Up);
    let took = c.bite(&mut d, rules, &mut messages);
    results.push(check(
        "bite_short_victim_asymmetry",
        !took && d.body.len() == 3 && d.length == 3 && c.rattles == rules.rattles_per_bite,
        format!("took {} victim body {} rattles {}", took, d.body.len(), c.rattles),
    ));

    let mut population = SnakePopulation::new(PopulationConfig {
        rules: rules.clone(),
        ..PopulationConfig::default()
    });
    population.insert(Snake::with_body([(0, 0), (1, 0), (2, 0), (3, 0)], Direction::Up));
    population.insert(Snake::with_body([(1, 0), (0, 0), (0, 1), (0, 2)], Direction::Up));
    let bites = population.check_collisions(&mut messages);
    results.push(check(
        "mutual_bites_same_tick",
        bites.len() == 2 && bites.iter().all(|b| b.took_segment),
        format!("{} bites resolved", bites.len()),
    ));
    results
}

// ── 5. Spawning ─────────────────────────────────────────────────────────

fn plants_everywhere(_: WorldCoord) -> Terrain {
    Terrain::Plant
}

fn validate_spawning(config: &PopulationConfig, seed: u64) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut spaces = MemorySpaces::new();
    let mut messages = MessageBoard::new();

    let mut population = SnakePopulation::new(config.clone().with_seed(seed));
    {
        let habitat = Habitat::new(Origin::default(), &no_terrain, &mut spaces, &mut messages);
        let spawned = population.try_spawn(&habitat);
        results.push(check(
            "spawn_needs_plant",
            !spawned && population.is_empty(),
            format!("spawned={} population={}", spawned, population.len()),
        ));
    }

    let habitat = Habitat::new(Origin::default(), &plants_everywhere, &mut spaces, &mut messages);
    let mut attempts = 0;
    while population.try_spawn(&habitat) {
        attempts += 1;
        if attempts > config.max_snakes {
            break;
        }
    }
    results.push(check(
        "spawn_cap",
        population.len() == config.max_snakes && !population.try_spawn(&habitat),
        format!("population {} / cap {}", population.len(), config.max_snakes),
    ));
    results
}

// ── 6. Long run ─────────────────────────────────────────────────────────

fn validate_long_run(config: &PopulationConfig, options: &Options) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut population = SnakePopulation::new(config.clone().with_seed(options.seed));
    let mut spaces = MemorySpaces::new();
    let mut messages = MessageBoard::new();
    let view = Viewport::new(60, 20);
    let mut surface = TextSurface::new(60, 20);

    let dt = 0.1;
    let ticks = 12_000;
    let (mut moves, mut eggs, mut bites, mut spawns) = (0, 0, 0, 0);
    let mut violations = Vec::new();

    for tick in 0..ticks {
        // Player wanders slowly east
        let origin = Origin::new(tick as f64 * 0.02, (tick as f64 * 0.001).sin() * 30.0);
        let mut habitat = Habitat::new(origin, &ProceduralOracle, &mut spaces, &mut messages);
        let summary = population.update(dt, &mut habitat);
        messages.tick(dt);

        moves += summary.moved;
        eggs += summary.eggs_eaten;
        bites += summary.bites.len();
        spawns += usize::from(summary.spawned);

        for (i, snake) in population.snakes().iter().enumerate() {
            if snake.body.len() > snake.length + snake.rattles
                || snake.length > config.rules.max_length
            {
                violations.push(format!("tick {} snake {}", tick, i));
            }
        }

        if options.frames && tick % 600 == 0 {
            surface.clear();
            population.render(&mut surface, &view);
            println!("--- t={:.0}s ---\n{}", tick as f32 * dt, surface);
        }
    }

    results.push(check(
        "long_run_body_invariant",
        violations.is_empty(),
        if violations.is_empty() {
            format!(
                "{} moves, {} eggs, {} bites, {} spawns",
                moves, eggs, bites, spawns
            )
        } else {
            format!("{} violations, first {}", violations.len(), violations[0])
        },
    ));
    results.push(check(
        "long_run_population_capped",
        population.len() <= config.max_snakes,
        format!("{} snakes alive", population.len()),
    ));

    let consistent = spaces
        .entries
        .iter()
        .all(|(key, at)| *key == space_key(*at) && ProceduralOracle.classify(*at) == Terrain::Egg);
    results.push(check(
        "long_run_spaces_are_eggs",
        consistent,
        format!("{} spaces recorded, {} saves", spaces.entries.len(), spaces.saves),
    ));
    results
}

// ── 7. Persistence ──────────────────────────────────────────────────────

fn validate_persistence(config: &PopulationConfig, seed: u64) -> Vec<TestResult> {
    let mut results = Vec::new();
    let mut population = SnakePopulation::new(config.clone().with_seed(seed));
    population.insert(Snake::with_body([(0, 0), (0, 1), (0, 2)], Direction::Left));
    population.insert(Snake::with_body([(4, 4), (4, 5)], Direction::Down));

    let mut buffer = Vec::new();
    let outcome = population.save(&mut buffer).and_then(|_| {
        let mut loaded = SnakePopulation::new(config.clone());
        loaded.load(&buffer[..])?;
        Ok(loaded)
    });

    results.push(match outcome {
        Ok(loaded) => check(
            "save_load_roundtrip",
            loaded.snakes() == population.snakes(),
            format!("{} bytes, {} snakes", buffer.len(), loaded.len()),
        ),
        Err(e) => check("save_load_roundtrip", false, e.to_string()),
    });
    results
}
