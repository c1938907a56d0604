//! Wave director
//!
//! Builds the timed spawn list for a faction/round/difficulty. Spawn
//! descriptors carry string type ids so externally authored waves can be fed
//! in too; the orchestrator skips ids the catalog does not know.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::catalog::EnemyKind;
use crate::settings::{Arena, Difficulty, Faction};

/// Distance from the arena edge for edge spawns
const EDGE_MARGIN: f32 = 60.0;
/// Random extra delay added to each edge spawn
const DELAY_JITTER: f32 = 0.15;

/// A pending enemy spawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnDescriptor {
    pub type_id: String,
    pub pos: Vec2,
    /// Seconds until the enemy appears
    pub delay: f32,
}

/// Parameters for one wave
#[derive(Debug, Clone, Copy)]
pub struct WaveRequest {
    /// 1-based round number
    pub round: u32,
    pub difficulty: Difficulty,
    pub faction: Faction,
    pub arena: Arena,
}

/// Ordered spawn list for a round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wave {
    pub spawns: Vec<SpawnDescriptor>,
}

/// Arena edge to spawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

const EDGES: [Edge; 4] = [Edge::Top, Edge::Bottom, Edge::Left, Edge::Right];

/// Options for a burst of spawns along the arena edges
#[derive(Debug, Clone, Copy)]
struct Burst {
    delay_step: f32,
    start_delay: f32,
    forced: Option<&'static [Edge]>,
}

impl Default for Burst {
    fn default() -> Self {
        Self {
            delay_step: 0.3,
            start_delay: 0.0,
            forced: None,
        }
    }
}

fn random_edge_point(arena: &Arena, edge: Edge, rng: &mut impl Rng) -> Vec2 {
    let (w, h) = (arena.width, arena.height);
    match edge {
        Edge::Top => Vec2::new(rng.random::<f32>() * w, EDGE_MARGIN),
        Edge::Bottom => Vec2::new(rng.random::<f32>() * w, h - EDGE_MARGIN),
        Edge::Left => Vec2::new(EDGE_MARGIN, rng.random::<f32>() * h),
        Edge::Right => Vec2::new(w - EDGE_MARGIN, rng.random::<f32>() * h),
    }
}

fn edge_burst(
    out: &mut Vec<SpawnDescriptor>,
    arena: &Arena,
    kind: EnemyKind,
    count: u32,
    burst: Burst,
    rng: &mut impl Rng,
) {
    for i in 0..count {
        let edge = match burst.forced {
            Some(edges) if !edges.is_empty() => edges[i as usize % edges.len()],
            _ => EDGES[rng.random_range(0..EDGES.len())],
        };
        let pos = random_edge_point(arena, edge, rng);
        out.push(SpawnDescriptor {
            type_id: kind.id().to_string(),
            pos,
            delay: burst.start_delay + i as f32 * burst.delay_step + rng.random::<f32>() * DELAY_JITTER,
        });
    }
}

fn spawn_at(out: &mut Vec<SpawnDescriptor>, kind: EnemyKind, pos: Vec2, delay: f32) {
    out.push(SpawnDescriptor {
        type_id: kind.id().to_string(),
        pos,
        delay,
    });
}

/// Round a density-scaled count the way the wave tables expect
fn scaled(base: f32) -> u32 {
    base.round().max(0.0) as u32
}

/// Generate the spawn list for a round
pub fn generate_wave(req: &WaveRequest, rng: &mut impl Rng) -> Wave {
    let density = req.difficulty.modifier().bullet_density;
    let arena = &req.arena;
    let index = req.round.max(1).saturating_sub(1) % crate::consts::ROUNDS_PER_FACTION;
    let mut spawns = Vec::new();

    match (req.faction, index) {
        (Faction::Low, 0) => {
            let m = 4.0 * density;
            edge_burst(&mut spawns, arena, EnemyKind::LowGrunt1, scaled(m), Burst::default(), rng);
            let burst = Burst {
                delay_step: 0.25,
                ..Default::default()
            };
            edge_burst(&mut spawns, arena, EnemyKind::LowGrunt2, scaled(m * 0.8), burst, rng);
        }
        (Faction::Low, 1) => {
            let m = 5.0 * density;
            let burst = Burst {
                delay_step: 0.2,
                ..Default::default()
            };
            edge_burst(&mut spawns, arena, EnemyKind::LowGrunt3, scaled(m), burst, rng);
            let burst = Burst {
                start_delay: 1.2,
                forced: Some(&[Edge::Top, Edge::Bottom]),
                ..Default::default()
            };
            edge_burst(&mut spawns, arena, EnemyKind::LowMiniboss, 1, burst, rng);
        }
        (Faction::Low, _) => {
            let burst = Burst {
                start_delay: 1.5,
                ..Default::default()
            };
            let count = scaled(3.0 * density).max(3);
            edge_burst(&mut spawns, arena, EnemyKind::LowGrunt2, count, burst, rng);
            let boss = Vec2::new(arena.width / 2.0, arena.height * 0.18);
            spawn_at(&mut spawns, EnemyKind::LowBoss, boss, 0.0);
        }
        (Faction::Mid, 0) => {
            let base = 4.0 * density;
            edge_burst(
                &mut spawns,
                arena,
                EnemyKind::MidGruntSkirmisher,
                scaled(base),
                Burst::default(),
                rng,
            );
            let burst = Burst {
                delay_step: 0.35,
                ..Default::default()
            };
            edge_burst(&mut spawns, arena, EnemyKind::MidGruntLaser, scaled(base * 0.75), burst, rng);
        }
        (Faction::Mid, 1) => {
            let base = 5.5 * density;
            let burst = Burst {
                delay_step: 0.2,
                ..Default::default()
            };
            edge_burst(&mut spawns, arena, EnemyKind::MidGruntSkirmisher, scaled(base), burst, rng);
            let burst = Burst {
                delay_step: 0.32,
                ..Default::default()
            };
            edge_burst(&mut spawns, arena, EnemyKind::MidGruntLaser, scaled(base * 0.9), burst, rng);
            let burst = Burst {
                start_delay: 1.0,
                forced: Some(&[Edge::Left, Edge::Right]),
                ..Default::default()
            };
            edge_burst(&mut spawns, arena, EnemyKind::MidMinibossDual, 1, burst, rng);
            let burst = Burst {
                start_delay: 0.8,
                forced: Some(&[Edge::Top, Edge::Bottom]),
                ..Default::default()
            };
            edge_burst(&mut spawns, arena, EnemyKind::MidMinibossCore, 1, burst, rng);
        }
        (Faction::Mid, _) => {
            let burst = Burst {
                start_delay: 1.0,
                ..Default::default()
            };
            let count = scaled(3.0 * density).max(4);
            edge_burst(&mut spawns, arena, EnemyKind::MidGruntSkirmisher, count, burst, rng);
            let burst = Burst {
                start_delay: 2.0,
                ..Default::default()
            };
            let count = scaled(2.0 * density).max(3);
            edge_burst(&mut spawns, arena, EnemyKind::MidGruntLaser, count, burst, rng);
            let boss = Vec2::new(arena.width / 2.0, arena.height * 0.15);
            spawn_at(&mut spawns, EnemyKind::MidBossCore, boss, 0.0);
        }
    }

    log::debug!(
        "Generated {} round {} ({}): {} spawns",
        req.faction.as_str(),
        req.round,
        req.difficulty.as_str(),
        spawns.len()
    );
    Wave { spawns }
}
