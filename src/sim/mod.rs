//! Frame-step combat simulation
//!
//! All gameplay logic lives here:
//! - One `GameState` owns every entity of the current round
//! - All randomness draws from the state's seeded RNG
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod catalog;
pub mod collision;
pub mod damage;
pub mod enemy_ai;
pub mod player;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod wave;
pub mod weapons;

pub use catalog::{BehaviorKind, EnemyKind, EnemyStats};
pub use damage::{DamageOutcome, Sector, ShieldSectors, SystemFaults, WeaponSystem};
pub use player::{Helm, Orders};
pub use snapshot::{DebugSnapshot, HudStatus};
pub use state::{
    Behavior, Enemy, EnemyId, GameEvent, GamePhase, GameState, Player, Projectile, Side,
};
pub use tick::{TickInput, tick};
pub use wave::{SpawnDescriptor, Wave, WaveRequest, generate_wave};
pub use weapons::{Laser, LaserPhase, TorpedoBay, TorpedoSlot};
