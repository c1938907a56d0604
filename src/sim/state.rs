//! Game state and core simulation types
//!
//! The orchestrator (`GameState`) exclusively owns the player, enemies and
//! projectiles of the current round. Everything is rebuilt wholesale on a
//! round reset.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::catalog::{BehaviorKind, EnemyKind};
use super::damage::{ShieldSectors, SystemFaults};
use super::wave::{SpawnDescriptor, WaveRequest, generate_wave};
use super::weapons::{Laser, TorpedoBay, TorpedoSlot};
use crate::consts::*;
use crate::remote::PlayerSnapshot;
use crate::settings::{Arena, Difficulty, Faction, Settings};

/// Stable handle into the live-enemy table
pub type EnemyId = u32;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active combat (including the wave-clear cooldown)
    Playing,
    /// Hull reached zero with death allowed; idle until a round reset
    Destroyed,
}

/// Dash bookkeeping
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DashState {
    pub active: bool,
    /// Remaining active window
    pub time: f32,
    pub cooldown: f32,
    /// Post-boost window: relaxed speed cap, reduced drag and thrust
    pub boost: f32,
    /// Dash action state last tick (dash triggers on the rising edge)
    #[serde(skip)]
    pub was_pressed: bool,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing (0 = up, clockwise positive)
    pub angle: f32,
    pub target_angle: f32,
    pub angular_speed: f32,
    pub radius: f32,
    pub hull: f32,
    pub max_hull: f32,
    pub shield: ShieldSectors,
    /// Seconds until shields start regenerating
    pub shield_delay: f32,
    pub invincible: f32,
    /// Hit flicker for rendering
    pub flicker: f32,
    pub dash: DashState,
    pub torpedo_front: TorpedoBay,
    pub torpedo_rear: TorpedoBay,
    pub laser: Laser,
    pub faults: SystemFaults,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            target_angle: 0.0,
            angular_speed: 0.0,
            radius: PLAYER_RADIUS,
            hull: PLAYER_MAX_HULL,
            max_hull: PLAYER_MAX_HULL,
            shield: ShieldSectors::full(PLAYER_MAX_SHIELD),
            shield_delay: 0.0,
            invincible: 0.0,
            flicker: 0.0,
            dash: DashState::default(),
            torpedo_front: TorpedoBay::new(TorpedoSlot::Front),
            torpedo_rear: TorpedoBay::new(TorpedoSlot::Rear),
            laser: Laser::new(),
            faults: SystemFaults::default(),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.hull <= 0.0
    }

    pub fn hull_ratio(&self) -> f32 {
        crate::clamp01(self.hull / self.max_hull.max(1.0))
    }

    /// Shield bubble radius used for the outer collision layer
    pub fn shield_radius(&self) -> f32 {
        self.radius * SHIELD_RADIUS_FACTOR
    }
}

/// Idle/warning/firing stage shared by the telegraphed enemy beams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BeamStage {
    /// Timer counts down the cooldown
    Idle,
    /// Beam telegraphed at the locked aim angle
    Warning,
    Firing,
}

/// A telegraphed beam weapon (laser grunt, dual miniboss charge laser)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BeamCycle {
    pub stage: BeamStage,
    pub timer: f32,
    pub aim_angle: f32,
}

impl BeamCycle {
    pub fn idle(cooldown: f32) -> Self {
        Self {
            stage: BeamStage::Idle,
            timer: cooldown,
            aim_angle: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != BeamStage::Idle
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SkirmisherState {
    pub preferred_range: f32,
    pub reaction_delay: f32,
    pub reaction_timer: f32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DualMinibossState {
    pub turret_timer: f32,
    pub charge: BeamCycle,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpinState {
    pub stage: BeamStage,
    pub timer: f32,
    pub aim_angle: f32,
    /// Current beam/facing angle
    pub spin_angle: f32,
    pub angular_vel: f32,
    pub target_vel: f32,
    /// +1 or -1
    pub spin_dir: f32,
}

/// Mid boss phase order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossPhaseKind {
    Torp,
    Rain,
    Clamp,
    Ultimate,
}

pub const BOSS_PHASES: [BossPhaseKind; 4] = [
    BossPhaseKind::Torp,
    BossPhaseKind::Rain,
    BossPhaseKind::Clamp,
    BossPhaseKind::Ultimate,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelegraphStage {
    Warning,
    Active,
}

/// Transient data of the current boss phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BossPhaseData {
    Torp {
        fire_timer: f32,
        shots: u32,
    },
    Rain {
        stage: TelegraphStage,
        timer: f32,
        lane_width: f32,
        lane_count: u32,
        fired: bool,
    },
    Clamp {
        stage: TelegraphStage,
        timer: f32,
        angles: [f32; 2],
        targets: [f32; 2],
        spin_time: f32,
        rotation_speed: f32,
    },
    Ultimate {
        stage: TelegraphStage,
        timer: f32,
        width: f32,
        duration: f32,
        dps: f32,
    },
}

/// Warning shapes drawn by the renderer before a boss attack lands
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Telegraph {
    Lane { x: f32, width: f32, timer: f32 },
    Beam { angle: f32, range: f32, timer: f32 },
}

/// A damaging boss beam alive for `timer` seconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActiveBeam {
    pub angle: f32,
    pub width: f32,
    pub range: f32,
    pub timer: f32,
    pub dps: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidBossState {
    pub phase_index: usize,
    pub phase_timer: f32,
    pub phase_data: Option<BossPhaseData>,
    pub summon_timer: f32,
    pub warnings: Vec<Telegraph>,
    pub beams: Vec<ActiveBeam>,
}

impl MidBossState {
    pub fn current_phase(&self) -> BossPhaseKind {
        BOSS_PHASES[self.phase_index % BOSS_PHASES.len()]
    }

    /// Move to the next phase, discarding all transient phase state
    pub fn advance(&mut self) {
        self.phase_index = (self.phase_index + 1) % BOSS_PHASES.len();
        self.phase_timer = 0.0;
        self.phase_data = None;
        self.warnings.clear();
        self.beams.clear();
    }
}

/// Behaviour variant with its own typed sub-state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Behavior {
    None,
    Skirmisher(SkirmisherState),
    LaserGrunt(BeamCycle),
    DualMiniboss(DualMinibossState),
    SpinMiniboss(SpinState),
    MidBoss(MidBossState),
}

impl Behavior {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::None => BehaviorKind::None,
            Behavior::Skirmisher(_) => BehaviorKind::Skirmisher,
            Behavior::LaserGrunt(_) => BehaviorKind::LaserGrunt,
            Behavior::DualMiniboss(_) => BehaviorKind::DualMiniboss,
            Behavior::SpinMiniboss(_) => BehaviorKind::SpinMiniboss,
            Behavior::MidBoss(_) => BehaviorKind::MidBoss,
        }
    }
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    /// Displacement per second from the last movement step
    pub vel: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub base_speed: f32,
    /// Effective speed this tick (reduced while slowed)
    pub speed: f32,
    pub slow_timer: f32,
    pub fire_timer: f32,
    pub fire_delay: f32,
    pub damage: f32,
    /// Weave phase driving lateral movement
    pub ai_phase: f32,
    pub ai_phase_rate: f32,
    pub facing: f32,
    pub behavior: Behavior,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Whether the periodic default torpedo is used
    pub fn fires_default(&self) -> bool {
        !matches!(self.behavior, Behavior::SpinMiniboss(_))
    }
}

/// Which side fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

/// A bullet or torpedo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub side: Side,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Remaining life in seconds
    pub life: f32,
    /// Homing turn rate per second, if the projectile steers
    pub homing: Option<f32>,
    /// Locked enemy (player torpedoes only); cleared when the enemy is gone
    pub target: Option<EnemyId>,
}

impl Projectile {
    pub fn heading(&self) -> f32 {
        crate::angle_from_vector(self.vel)
    }
}

/// Things that happened during a tick, for audio/FX/UI consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted { round: u32 },
    RoundCleared { round: u32 },
    EnemySpawned { id: EnemyId, kind: EnemyKind },
    EnemyKilled { id: EnemyId, kind: EnemyKind },
    TorpedoFired { slot: TorpedoSlot },
    ShieldHit { sector: super::damage::Sector },
    ShieldSectorBroken { sector: super::damage::Sector },
    HullHit { sector: Option<super::damage::Sector>, damage: f32 },
    WeaponDisabled { system: super::damage::WeaponSystem, duration: f32 },
    TargetingJammed { slot: TorpedoSlot, duration: f32 },
    PlayerDestroyed,
}

/// Complete game state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    pub difficulty: Difficulty,
    pub faction: Faction,
    pub allow_death: bool,
    pub arena: Arena,
    /// Simulation RNG (all gameplay randomness draws from here)
    pub rng: Pcg32,
    /// Current round (1-based)
    pub round: u32,
    pub phase: GamePhase,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub player_bullets: Vec<Projectile>,
    pub enemy_bullets: Vec<Projectile>,
    pub spawn_queue: Vec<SpawnDescriptor>,
    /// Counts down once the round is cleared
    pub wave_cooldown: Option<f32>,
    pub camera_shake: f32,
    /// Autopilot drives the ship instead of the input provider
    pub auto_mode: bool,
    pub auto_target: Option<EnemyId>,
    /// Remote player shown for display only
    pub remote: Option<PlayerSnapshot>,
    /// Seconds simulated since the last reset
    pub time: f64,
    pub events: Vec<GameEvent>,
    next_id: EnemyId,
}

impl GameState {
    /// Create a new game state from settings and build round 1
    pub fn new(settings: &Settings) -> Self {
        let arena = settings.arena;
        let mut state = Self {
            difficulty: settings.difficulty,
            faction: settings.faction,
            allow_death: settings.allow_death,
            arena,
            rng: Pcg32::seed_from_u64(settings.seed),
            round: 1,
            phase: GamePhase::Playing,
            player: Player::new(Self::player_spawn(&arena)),
            enemies: Vec::new(),
            player_bullets: Vec::new(),
            enemy_bullets: Vec::new(),
            spawn_queue: Vec::new(),
            wave_cooldown: None,
            camera_shake: 0.0,
            auto_mode: settings.difficulty.autopilot_available(),
            auto_target: None,
            remote: None,
            time: 0.0,
            events: Vec::new(),
            next_id: 1,
        };
        state.reset_round();
        state
    }

    fn player_spawn(arena: &Arena) -> Vec2 {
        Vec2::new(arena.width / 2.0, arena.height * 0.7)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EnemyId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Discard all round state and rebuild round 1
    pub fn reset_round(&mut self) {
        self.player = Player::new(Self::player_spawn(&self.arena));
        self.enemies.clear();
        self.player_bullets.clear();
        self.enemy_bullets.clear();
        self.spawn_queue.clear();
        self.wave_cooldown = None;
        self.camera_shake = 0.0;
        self.auto_target = None;
        self.phase = GamePhase::Playing;
        self.time = 0.0;
        self.round = 1;
        if self.difficulty.autopilot_available() {
            self.auto_mode = true;
        }
        self.build_spawn_queue();
        log::info!(
            "Round reset ({}, {}, death {})",
            self.difficulty.as_str(),
            self.faction.as_str(),
            if self.allow_death { "on" } else { "off" }
        );
    }

    /// Request a new spawn queue for the current round
    pub fn build_spawn_queue(&mut self) {
        let req = WaveRequest {
            round: self.round,
            difficulty: self.difficulty,
            faction: self.faction,
            arena: self.arena,
        };
        self.spawn_queue = generate_wave(&req, &mut self.rng).spawns;
        self.events.push(GameEvent::RoundStarted { round: self.round });
        log::info!("Round {} started ({} spawns queued)", self.round, self.spawn_queue.len());
    }

    /// Instantiate an enemy from a descriptor; unknown type ids are skipped
    pub fn spawn_enemy(&mut self, info: &SpawnDescriptor) -> Option<EnemyId> {
        use rand::Rng;

        let Some(kind) = EnemyKind::from_id(&info.type_id) else {
            log::warn!("Skipping spawn of unknown enemy type '{}'", info.type_id);
            return None;
        };
        let stats = kind.stats();
        let m = self.difficulty.modifier();
        let id = self.next_entity_id();
        let rng = &mut self.rng;

        let behavior = match kind.behavior() {
            BehaviorKind::None => Behavior::None,
            BehaviorKind::Skirmisher => Behavior::Skirmisher(SkirmisherState {
                preferred_range: 260.0,
                reaction_delay: 0.35,
                reaction_timer: 0.0,
            }),
            BehaviorKind::LaserGrunt => {
                Behavior::LaserGrunt(BeamCycle::idle(0.8 + rng.random::<f32>()))
            }
            BehaviorKind::DualMiniboss => Behavior::DualMiniboss(DualMinibossState {
                turret_timer: 0.0,
                charge: BeamCycle::idle(3.0),
            }),
            BehaviorKind::SpinMiniboss => Behavior::SpinMiniboss(SpinState {
                stage: BeamStage::Idle,
                timer: 1.2 + rng.random::<f32>() * 0.8,
                aim_angle: 0.0,
                spin_angle: rng.random::<f32>() * std::f32::consts::TAU,
                angular_vel: 0.0,
                target_vel: 0.0,
                spin_dir: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
            }),
            BehaviorKind::MidBoss => Behavior::MidBoss(MidBossState {
                phase_index: 0,
                phase_timer: 0.0,
                phase_data: None,
                summon_timer: 4.0,
                warnings: Vec::new(),
                beams: Vec::new(),
            }),
        };
        let ai_phase_rate = if kind.behavior() == BehaviorKind::SpinMiniboss {
            1.1
        } else {
            0.7
        };
        let speed = stats.speed * m.enemy_speed;
        let hp = stats.hp * m.hp;
        let facing = crate::angle_from_vector(self.player.pos - info.pos);

        let enemy = Enemy {
            id,
            kind,
            pos: info.pos,
            vel: Vec2::ZERO,
            radius: stats.radius,
            hp,
            max_hp: hp,
            base_speed: speed,
            speed,
            slow_timer: 0.0,
            fire_timer: rng.random::<f32>() * stats.fire_delay,
            fire_delay: stats.fire_delay / m.bullet_density.max(0.01),
            damage: stats.damage * m.damage,
            ai_phase: rng.random::<f32>() * std::f32::consts::TAU,
            ai_phase_rate,
            facing,
            behavior,
        };
        log::debug!("Spawned {} #{} at ({:.0}, {:.0})", kind.id(), id, info.pos.x, info.pos.y);
        self.enemies.push(enemy);
        self.events.push(GameEvent::EnemySpawned { id, kind });
        Some(id)
    }

    /// Look up a live enemy by handle
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id && e.is_alive())
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        log::info!("Difficulty set to {}", difficulty.as_str());
        self.reset_round();
    }

    /// Set difficulty by name (unknown names fall back to normal)
    pub fn set_difficulty_name(&mut self, name: &str) {
        self.set_difficulty(Difficulty::from_name_or_default(name));
    }

    pub fn set_faction(&mut self, faction: Faction) {
        self.faction = faction;
        log::info!("Faction set to {}", faction.as_str());
        self.reset_round();
    }

    /// Set faction by name (unknown names fall back to low)
    pub fn set_faction_name(&mut self, name: &str) {
        self.set_faction(Faction::from_name_or_default(name));
    }

    pub fn set_death_allowed(&mut self, allowed: bool) {
        self.allow_death = allowed;
        self.reset_round();
    }

    /// Resize the arena and re-centre the player
    pub fn set_arena(&mut self, width: f32, height: f32) {
        self.arena = Arena::new(width, height);
        self.player.pos = Self::player_spawn(&self.arena);
    }

    /// Toggle the autopilot (only available in god difficulty)
    pub fn toggle_autopilot(&mut self) -> bool {
        if self.difficulty.autopilot_available() {
            self.auto_mode = !self.auto_mode;
        } else {
            log::info!("Autopilot is only available in god difficulty");
        }
        self.auto_mode
    }

    /// Accept a display-only snapshot of the other player
    pub fn set_remote_player(&mut self, snapshot: Option<PlayerSnapshot>) {
        self.remote = snapshot.and_then(PlayerSnapshot::sanitized);
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current settings as a serializable record
    pub fn settings(&self, seed: u64) -> Settings {
        Settings {
            difficulty: self.difficulty,
            faction: self.faction,
            allow_death: self.allow_death,
            seed,
            arena: self.arena,
        }
    }
}
