//! Sector Strike - real-time combat core of a top-down arcade space shooter
//!
//! Core modules:
//! - `sim`: Frame-step simulation (player, weapons, shields, enemy AI, waves)
//! - `settings`: Difficulty/faction selection and persisted preferences
//! - `remote`: Remote player snapshots and input records exchanged with the net layer
//!
//! Rendering, asset loading, raw input mapping and peer transport live outside
//! this crate; they only read snapshots from `sim::GameState`.

pub mod remote;
pub mod settings;
pub mod sim;

pub use settings::{Difficulty, DifficultyModifier, Faction, Settings, SettingsError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest frame step accepted by `update` (frame hitches are clamped to this)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Default arena dimensions
    pub const DEFAULT_ARENA_WIDTH: f32 = 1280.0;
    pub const DEFAULT_ARENA_HEIGHT: f32 = 720.0;

    // === Player ===
    /// Cruise speed: forward thrust is bled off above this unless boosted
    pub const PLAYER_BASE_MOVE_SPEED: f32 = 280.0;
    pub const PLAYER_MAX_MOVE_SPEED: f32 = 360.0;
    /// Hard speed cap (relaxed during dash post-boost)
    pub const PLAYER_VELOCITY_CAP: f32 = 620.0;
    pub const PLAYER_ACCEL: f32 = 420.0;
    /// Fraction of velocity removed per second
    pub const PLAYER_MOVE_DRAG: f32 = 0.95;
    pub const PLAYER_RADIUS: f32 = 13.5;
    pub const PLAYER_ANGULAR_ACCEL: f32 = 30.0;
    pub const PLAYER_ANGULAR_MAX_SPEED: f32 = 9.0;
    pub const PLAYER_ANGULAR_DAMP: f32 = 14.0;
    /// Heading error below which rotation is damped instead of driven
    pub const PLAYER_TURN_DEAD_ZONE: f32 = 0.01;
    /// Heading error (100°) above which the overshoot-recovery boost kicks in
    pub const PLAYER_TURN_BOOST_THRESHOLD: f32 = std::f32::consts::PI / 1.8;
    pub const PLAYER_TURN_BOOST: f32 = 2.2;
    /// Target offset used by discrete turn-left/turn-right actions
    pub const PLAYER_TURN_NUDGE: f32 = 0.5;
    pub const PLAYER_MAX_HULL: f32 = 100.0;
    pub const PLAYER_MAX_SHIELD: f32 = 120.0;
    /// Seconds without damage before shields regenerate
    pub const PLAYER_SHIELD_DELAY: f32 = 3.0;
    /// Total shield regen per second (split four ways across sectors)
    pub const PLAYER_SHIELD_REGEN_PER_SEC: f32 = 12.0;
    pub const PLAYER_INVINCIBLE_TIME: f32 = 1.0;
    pub const PLAYER_FLICKER_TIME: f32 = 0.4;
    /// Shield bubble radius as a multiple of the hull radius
    pub const SHIELD_RADIUS_FACTOR: f32 = 4.0;

    // === Dash ===
    pub const DASH_COOLDOWN: f32 = 1.2;
    pub const DASH_DURATION: f32 = 0.22;
    pub const DASH_SPEED: f32 = 400.0;
    pub const DASH_POST_BOOST_DURATION: f32 = 0.7;
    pub const DASH_POST_BOOST_CAP_MULTIPLIER: f32 = 1.5;
    pub const DASH_DRAG_MULTIPLIER: f32 = 0.8;
    /// Thrust acceleration multiplier while boosted
    pub const DASH_THRUST_MULTIPLIER: f32 = 0.2;

    // === Laser ===
    pub const LASER_CHARGE_TIME: f32 = 0.05;
    pub const LASER_BURST_DURATION: f32 = 0.5;
    pub const LASER_RELEASE_TIME: f32 = 0.25;
    pub const LASER_COOLDOWN: f32 = 10.0;
    pub const LASER_MAX_ENERGY: f32 = 100.0;
    /// Beam half-width added to the enemy radius
    pub const LASER_WIDTH: f32 = 16.0;
    pub const LASER_DPS: f32 = 120.0;
    pub const LASER_SLOW_TIME: f32 = 0.45;
    /// Enemy speed multiplier while slowed
    pub const SLOW_FACTOR: f32 = 0.45;

    // === Torpedoes ===
    pub const TORPEDO_SPEED: f32 = PLAYER_BASE_MOVE_SPEED * 3.0;
    pub const TORPEDO_COOLDOWN: f32 = 0.25;
    pub const TORPEDO_DAMAGE: f32 = 12.0;
    pub const TORPEDO_LIFE: f32 = 3.0;
    pub const TORPEDO_RADIUS: f32 = 5.0;
    pub const TORPEDO_MUZZLE_OFFSET: f32 = 22.0;
    pub const TORPEDO_LOCK_CONE_DEG: f32 = 30.0;
    pub const TORPEDO_MAX_RANGE: f32 = 800.0;
    pub const TORPEDO_HOMING_TURN_RATE: f32 = 2.2;
    /// Front torpedo refunded per enemy killed while the laser fires
    pub const TORPEDO_LASER_KILL_REFUND: f32 = 0.4;
    pub const TORPEDO_FRONT_MAX: u32 = 12;
    pub const TORPEDO_REAR_MAX: u32 = 5;
    pub const TORPEDO_JAM_SPREAD_DEG: f32 = 20.0;

    // === Enemy fire ===
    pub const ENEMY_TORPEDO_SPEED: f32 = 190.0;
    pub const ENEMY_TORPEDO_RADIUS: f32 = 3.0;
    pub const ENEMY_TORPEDO_LIFE: f32 = 4.0;
    pub const ENEMY_MUZZLE_OFFSET: f32 = 18.0;
    pub const ENEMY_DEFAULT_TURN_RATE: f32 = 4.2;
    /// Enemies are kept this far inside the arena edges
    pub const ENEMY_ARENA_MARGIN: f32 = 20.0;

    // === Contact ===
    pub const CONTACT_DAMAGE: f32 = 20.0;
    pub const CONTACT_COUNTER_DAMAGE: f32 = 40.0;
    /// Share of the overlap resolved by moving the enemy (rest moves the player)
    pub const CONTACT_ENEMY_PUSH_SHARE: f32 = 0.6;

    // === Shield damage model ===
    pub const SHIELD_HIT_MIN_FRACTION: f32 = 0.125;
    pub const SHIELD_HIT_MAX_FRACTION: f32 = 0.25;
    pub const SIDE_HIT_HULL_MULTIPLIER: f32 = 2.0;
    /// Velocity kept after a port/starboard hull hit
    pub const SIDE_HIT_VELOCITY_KEEP: f32 = 0.7;
    pub const SYSTEM_FAULT_CHANCE: f64 = 0.35;
    pub const SYSTEM_FAULT_MIN_DURATION: f32 = 5.0;
    pub const SYSTEM_FAULT_MAX_DURATION: f32 = 30.0;
    /// Invincibility granted when a no-death clamp saves the ship
    pub const NO_DEATH_INVINCIBLE_TIME: f32 = 0.5;

    // === Waves ===
    pub const WAVE_CLEAR_COOLDOWN: f32 = 2.0;
    pub const ROUNDS_PER_FACTION: u32 = 3;
    /// Projectiles this far outside the arena are culled
    pub const PROJECTILE_CULL_MARGIN: f32 = 50.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    if !angle.is_finite() {
        return 0.0;
    }
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    // Rounding on the wrap can land exactly on +π
    if angle >= PI { -PI } else { angle }
}

/// Signed shortest rotation from `from` to `to`
#[inline]
pub fn shortest_angle_diff(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Unit vector for a heading (0 = up, clockwise positive, screen y grows down)
#[inline]
pub fn vec_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.sin(), -angle.cos())
}

/// Heading of a vector, inverse of [`vec_from_angle`]
#[inline]
pub fn angle_from_vector(v: Vec2) -> f32 {
    v.x.atan2(-v.y)
}

/// Linear interpolation with `t` clamped to [0, 1]
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * clamp01(t)
}

/// Clamp a ratio to [0, 1] (NaN maps to 0)
#[inline]
pub fn clamp01(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Move `current` toward `target` by at most `max_step`
#[inline]
pub fn approach(current: f32, target: f32, max_step: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_step {
        target
    } else {
        current + diff.signum() * max_step
    }
}
