//! Read-only views published for the HUD and debug overlay

use glam::Vec2;
use serde::Serialize;

use super::damage::SystemFaults;
use super::state::{GamePhase, GameState};
use super::weapons::LaserPhase;
use crate::consts::DASH_COOLDOWN;

/// Bar ratios for the HUD, all in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HudStatus {
    pub round: u32,
    pub hull: f32,
    pub shield: f32,
    /// Front, right, back, left
    pub shield_sectors: [f32; 4],
    pub laser_energy: f32,
    pub torpedo_front: f32,
    pub torpedo_rear: f32,
    /// 1 when the dash is ready
    pub dash_ready: f32,
    pub autopilot: bool,
}

/// Laser readout for the debug overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LaserDebug {
    pub phase: LaserPhase,
    pub timer: f32,
    pub energy: f32,
    /// Beam drawn this frame
    pub visible: bool,
}

/// Torpedo bay readout for the debug overlay
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BayDebug {
    pub ammo: u32,
    pub cooldown: f32,
    pub refund: f32,
}

/// Full player readout, serialized by the headless runner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugSnapshot {
    pub phase: GamePhase,
    pub round: u32,
    pub time: f64,
    pub pos: Vec2,
    pub vel: Vec2,
    pub speed: f32,
    pub angle: f32,
    pub hull_ratio: f32,
    pub shield_sectors: [f32; 4],
    pub invincible: f32,
    pub dash_cooldown: f32,
    pub dash_boost: f32,
    pub laser: LaserDebug,
    pub torpedo_front: BayDebug,
    pub torpedo_rear: BayDebug,
    pub faults: SystemFaults,
    pub enemies: usize,
    pub enemy_bullets: usize,
    pub player_bullets: usize,
    pub spawns_pending: usize,
}

impl GameState {
    pub fn hud_status(&self) -> HudStatus {
        let p = &self.player;
        let cap = p.shield.sector_cap().max(f32::EPSILON);
        HudStatus {
            round: self.round,
            hull: p.hull_ratio(),
            shield: p.shield.ratio(),
            shield_sectors: p.shield.values().map(|v| crate::clamp01(v / cap)),
            laser_energy: p.laser.energy_ratio(),
            torpedo_front: p.torpedo_front.ammo_ratio(),
            torpedo_rear: p.torpedo_rear.ammo_ratio(),
            dash_ready: crate::clamp01(1.0 - p.dash.cooldown / DASH_COOLDOWN),
            autopilot: self.auto_mode,
        }
    }

    pub fn debug_snapshot(&self) -> DebugSnapshot {
        let p = &self.player;
        let bay = |b: &super::weapons::TorpedoBay| BayDebug {
            ammo: b.ammo,
            cooldown: b.cooldown,
            refund: b.refund,
        };
        DebugSnapshot {
            phase: self.phase,
            round: self.round,
            time: self.time,
            pos: p.pos,
            vel: p.vel,
            speed: p.vel.length(),
            angle: p.angle,
            hull_ratio: p.hull_ratio(),
            shield_sectors: p.shield.values(),
            invincible: p.invincible,
            dash_cooldown: p.dash.cooldown,
            dash_boost: p.dash.boost,
            laser: LaserDebug {
                phase: p.laser.phase,
                timer: p.laser.timer,
                energy: p.laser.energy,
                visible: p.laser.is_visible(),
            },
            torpedo_front: bay(&p.torpedo_front),
            torpedo_rear: bay(&p.torpedo_rear),
            faults: p.faults,
            enemies: self.enemies.len(),
            enemy_bullets: self.enemy_bullets.len(),
            player_bullets: self.player_bullets.len(),
            spawns_pending: self.spawn_queue.len(),
        }
    }
}
