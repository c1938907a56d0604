//! Enemy catalog
//!
//! Static base stats per enemy type, looked up by the string id used in
//! spawn descriptors.

use serde::{Deserialize, Serialize};

/// Base stats before difficulty scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyStats {
    pub hp: f32,
    pub speed: f32,
    /// Seconds between default shots
    pub fire_delay: f32,
    pub damage: f32,
    pub radius: f32,
}

/// Behaviour family selected by an enemy type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorKind {
    None,
    Skirmisher,
    LaserGrunt,
    DualMiniboss,
    SpinMiniboss,
    MidBoss,
}

/// Every enemy type in the roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    LowGrunt1,
    LowGrunt2,
    LowGrunt3,
    LowMiniboss,
    LowBoss,
    MidGruntSkirmisher,
    MidGruntLaser,
    MidMinibossDual,
    MidMinibossCore,
    MidBossCore,
}

/// Default body radius
const BASE_RADIUS: f32 = 12.0;
/// Grunt sprites are drawn larger, hitboxes follow
const GRUNT_RADIUS: f32 = BASE_RADIUS * 2.0 / 1.5;

impl EnemyKind {
    pub const ALL: [EnemyKind; 10] = [
        EnemyKind::LowGrunt1,
        EnemyKind::LowGrunt2,
        EnemyKind::LowGrunt3,
        EnemyKind::LowMiniboss,
        EnemyKind::LowBoss,
        EnemyKind::MidGruntSkirmisher,
        EnemyKind::MidGruntLaser,
        EnemyKind::MidMinibossDual,
        EnemyKind::MidMinibossCore,
        EnemyKind::MidBossCore,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            EnemyKind::LowGrunt1 => "low_grunt1",
            EnemyKind::LowGrunt2 => "low_grunt2",
            EnemyKind::LowGrunt3 => "low_grunt3",
            EnemyKind::LowMiniboss => "low_miniboss",
            EnemyKind::LowBoss => "low_boss",
            EnemyKind::MidGruntSkirmisher => "mid_grunt_skirmisher",
            EnemyKind::MidGruntLaser => "mid_grunt_laser",
            EnemyKind::MidMinibossDual => "mid_miniboss_dual",
            EnemyKind::MidMinibossCore => "mid_miniboss_core",
            EnemyKind::MidBossCore => "mid_boss_core",
        }
    }

    /// Look up a type by id; unknown ids yield `None`
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.id() == id)
    }

    pub fn stats(&self) -> EnemyStats {
        let (hp, speed, fire_delay, damage) = match self {
            EnemyKind::LowGrunt1 => (36.0, 70.0, 2.4, 10.0),
            EnemyKind::LowGrunt2 => (60.0, 80.0, 2.0, 10.0),
            EnemyKind::LowGrunt3 => (84.0, 90.0, 2.2, 12.0),
            EnemyKind::LowMiniboss => (220.0, 65.0, 1.6, 16.0),
            EnemyKind::LowBoss => (950.0, 30.0, 1.2, 18.0),
            EnemyKind::MidGruntSkirmisher => (90.0, 110.0, 1.6, 15.0),
            EnemyKind::MidGruntLaser => (110.0, 95.0, 2.4, 18.0),
            EnemyKind::MidMinibossDual => (320.0, 70.0, 1.4, 18.0),
            EnemyKind::MidMinibossCore => (360.0, 120.0, 1.3, 22.0),
            EnemyKind::MidBossCore => (1400.0, 0.0, 1.0, 20.0),
        };
        let radius = match self {
            EnemyKind::MidMinibossDual => 28.0,
            EnemyKind::MidMinibossCore => 24.0,
            EnemyKind::MidBossCore => 40.0,
            k if k.is_grunt() => GRUNT_RADIUS,
            _ => BASE_RADIUS,
        };
        EnemyStats {
            hp,
            speed,
            fire_delay,
            damage,
            radius,
        }
    }

    pub fn behavior(&self) -> BehaviorKind {
        match self {
            EnemyKind::MidGruntSkirmisher => BehaviorKind::Skirmisher,
            EnemyKind::MidGruntLaser => BehaviorKind::LaserGrunt,
            EnemyKind::MidMinibossDual => BehaviorKind::DualMiniboss,
            EnemyKind::MidMinibossCore => BehaviorKind::SpinMiniboss,
            EnemyKind::MidBossCore => BehaviorKind::MidBoss,
            _ => BehaviorKind::None,
        }
    }

    pub fn is_grunt(&self) -> bool {
        matches!(
            self,
            EnemyKind::LowGrunt1
                | EnemyKind::LowGrunt2
                | EnemyKind::LowGrunt3
                | EnemyKind::MidGruntSkirmisher
                | EnemyKind::MidGruntLaser
        )
    }

    pub fn is_boss(&self) -> bool {
        matches!(self, EnemyKind::LowBoss | EnemyKind::MidBossCore)
    }

    pub fn is_miniboss(&self) -> bool {
        matches!(
            self,
            EnemyKind::LowMiniboss | EnemyKind::MidMinibossDual | EnemyKind::MidMinibossCore
        )
    }
}
