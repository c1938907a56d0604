//! Shield and hull damage model
//!
//! The shield is split into four fixed sectors around the ship. A hit on a
//! charged sector is absorbed completely: the sector loses a random 12.5%-25%
//! of the *total* shield capacity regardless of the incoming damage. Only a hit
//! on an empty sector reaches the hull, where port/starboard hits count double
//! and front/back hits may knock weapon systems offline.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{GameEvent, GamePhase, GameState};
use super::weapons::TorpedoSlot;
use crate::consts::*;
use crate::{angle_from_vector, shortest_angle_diff};

use std::f32::consts::{FRAC_PI_4, PI};

/// Shield quadrant relative to the ship's facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    Front,
    Right,
    Back,
    Left,
}

impl Sector {
    pub const ALL: [Sector; 4] = [Sector::Front, Sector::Right, Sector::Back, Sector::Left];

    pub fn index(&self) -> usize {
        match self {
            Sector::Front => 0,
            Sector::Right => 1,
            Sector::Back => 2,
            Sector::Left => 3,
        }
    }

    /// Bucket an angle relative to the facing into a sector (±45° windows)
    pub fn from_relative_angle(rel: f32) -> Self {
        let rel = crate::normalize_angle(rel);
        if rel.abs() <= FRAC_PI_4 {
            Sector::Front
        } else if rel > FRAC_PI_4 && rel <= 3.0 * FRAC_PI_4 {
            Sector::Right
        } else if (-3.0 * FRAC_PI_4..-FRAC_PI_4).contains(&rel) {
            Sector::Left
        } else {
            Sector::Back
        }
    }

    /// Sector struck by an attack travelling along `travel_dir` toward a ship facing `facing`
    ///
    /// The attack comes *from* the opposite of its travel direction.
    pub fn for_attack(facing: f32, travel_dir: Vec2) -> Option<Self> {
        let dir = travel_dir.try_normalize()?;
        let angle_to_source = angle_from_vector(-dir);
        Some(Self::from_relative_angle(shortest_angle_diff(facing, angle_to_source)))
    }

    /// Port/starboard hits double hull damage
    pub fn is_side(&self) -> bool {
        matches!(self, Sector::Left | Sector::Right)
    }

    /// Offset of the sector's centre from the facing
    pub fn center_offset(&self) -> f32 {
        match self {
            Sector::Front => 0.0,
            Sector::Right => PI / 2.0,
            Sector::Back => PI,
            Sector::Left => -PI / 2.0,
        }
    }
}

/// Four independently charged shield sectors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShieldSectors {
    values: [f32; 4],
    max_shield: f32,
}

impl ShieldSectors {
    pub fn full(max_shield: f32) -> Self {
        let cap = max_shield.max(0.0) / 4.0;
        Self {
            values: [cap; 4],
            max_shield: max_shield.max(0.0),
        }
    }

    pub fn max_shield(&self) -> f32 {
        self.max_shield
    }

    /// Capacity of a single sector
    pub fn sector_cap(&self) -> f32 {
        self.max_shield / 4.0
    }

    pub fn get(&self, sector: Sector) -> f32 {
        self.values[sector.index()]
    }

    /// Set a sector's charge, clamped to [0, cap]
    pub fn set(&mut self, sector: Sector, value: f32) {
        let v = if value.is_nan() { 0.0 } else { value };
        self.values[sector.index()] = v.clamp(0.0, self.sector_cap());
    }

    /// Values in front/right/back/left order
    pub fn values(&self) -> [f32; 4] {
        self.values
    }

    pub fn total(&self) -> f32 {
        self.values.iter().sum()
    }

    pub fn ratio(&self) -> f32 {
        if self.max_shield > 0.0 {
            crate::clamp01(self.total() / self.max_shield)
        } else {
            0.0
        }
    }

    /// Drain a sector, returning the amount actually removed
    pub fn drain(&mut self, sector: Sector, amount: f32) -> f32 {
        let current = self.get(sector);
        let drained = current.min(amount.max(0.0));
        self.set(sector, current - drained);
        drained
    }

    /// Regenerate every sector toward its cap; the rate is split four ways
    pub fn regenerate(&mut self, rate_per_sec: f32, dt: f32) {
        let step = rate_per_sec * dt / 4.0;
        for sector in Sector::ALL {
            let current = self.get(sector);
            if current < self.sector_cap() {
                self.set(sector, current + step);
            }
        }
    }
}

/// Weapon systems that can be knocked offline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponSystem {
    Laser,
    FrontTorpedo,
    RearTorpedo,
}

/// Timed weapon faults; each value ticks toward zero and is active while > 0
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemFaults {
    pub laser_disabled_for: f32,
    pub front_torp_disabled_for: f32,
    pub rear_torp_disabled_for: f32,
    pub front_jam_for: f32,
    pub rear_jam_for: f32,
}

impl SystemFaults {
    pub fn tick(&mut self, dt: f32) {
        for t in [
            &mut self.laser_disabled_for,
            &mut self.front_torp_disabled_for,
            &mut self.rear_torp_disabled_for,
            &mut self.front_jam_for,
            &mut self.rear_jam_for,
        ] {
            *t = (*t - dt).max(0.0);
        }
    }

    pub fn disabled_for(&self, system: WeaponSystem) -> f32 {
        match system {
            WeaponSystem::Laser => self.laser_disabled_for,
            WeaponSystem::FrontTorpedo => self.front_torp_disabled_for,
            WeaponSystem::RearTorpedo => self.rear_torp_disabled_for,
        }
    }

    pub fn is_disabled(&self, system: WeaponSystem) -> bool {
        self.disabled_for(system) > 0.0
    }

    pub fn disable(&mut self, system: WeaponSystem, duration: f32) {
        let d = duration.max(0.0);
        match system {
            WeaponSystem::Laser => self.laser_disabled_for = d,
            WeaponSystem::FrontTorpedo => self.front_torp_disabled_for = d,
            WeaponSystem::RearTorpedo => self.rear_torp_disabled_for = d,
        }
    }

    pub fn jam_for(&self, slot: TorpedoSlot) -> f32 {
        match slot {
            TorpedoSlot::Front => self.front_jam_for,
            TorpedoSlot::Rear => self.rear_jam_for,
        }
    }

    pub fn is_jammed(&self, slot: TorpedoSlot) -> bool {
        self.jam_for(slot) > 0.0
    }

    /// Jam targeting, keeping the longer of the current and new duration
    pub fn jam(&mut self, slot: TorpedoSlot, duration: f32) {
        let t = match slot {
            TorpedoSlot::Front => &mut self.front_jam_for,
            TorpedoSlot::Rear => &mut self.rear_jam_for,
        };
        *t = t.max(duration.max(0.0));
    }
}

/// Fault duration: 5s at full hull scaling up to 30s near zero hull
pub fn fault_duration(hull: f32, max_hull: f32) -> f32 {
    let ratio = crate::clamp01(hull / max_hull.max(1.0));
    SYSTEM_FAULT_MIN_DURATION + (1.0 - ratio) * (SYSTEM_FAULT_MAX_DURATION - SYSTEM_FAULT_MIN_DURATION)
}

/// What happened to an incoming hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Player immune (god difficulty) or already destroyed
    Ignored,
    /// A charged sector took the hit
    Absorbed { sector: Sector, drained: f32 },
    /// Empty sector (or no direction) and invincibility frames active
    Deflected,
    Hull { sector: Option<Sector>, damage: f32 },
}

impl GameState {
    /// Scale a base damage value by the difficulty modifier
    pub fn scaled_damage(&self, base: f32) -> f32 {
        base * self.difficulty.modifier().damage
    }

    /// Apply one hit to the player
    ///
    /// `amount` is already difficulty scaled. `travel_dir` is the direction the
    /// attack was moving; without one the hit goes straight to the hull.
    pub fn apply_damage_to_player(&mut self, amount: f32, travel_dir: Option<Vec2>) -> DamageOutcome {
        if self.difficulty.player_invulnerable() || self.phase == GamePhase::Destroyed {
            return DamageOutcome::Ignored;
        }
        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        let sector = travel_dir.and_then(|d| Sector::for_attack(self.player.angle, d));
        let mut outcome = DamageOutcome::Deflected;

        match sector {
            Some(s) if self.player.shield.get(s) > 0.0 => {
                let fraction = self
                    .rng
                    .random_range(SHIELD_HIT_MIN_FRACTION..=SHIELD_HIT_MAX_FRACTION);
                let shield_damage = self.player.shield.max_shield() * fraction;
                let drained = self.player.shield.drain(s, shield_damage);
                self.events.push(GameEvent::ShieldHit { sector: s });
                if self.player.shield.get(s) <= 0.0 {
                    log::debug!("Shield sector {:?} broken", s);
                    self.events.push(GameEvent::ShieldSectorBroken { sector: s });
                    self.camera_shake = self.camera_shake.max(0.18);
                }
                outcome = DamageOutcome::Absorbed { sector: s, drained };
            }
            _ if amount > 0.0 && self.player.invincible <= 0.0 => {
                let mut hull_damage = amount;
                if sector.is_some_and(|s| s.is_side()) {
                    hull_damage *= SIDE_HIT_HULL_MULTIPLIER;
                    self.player.vel *= SIDE_HIT_VELOCITY_KEEP;
                }
                self.player.hull = (self.player.hull - hull_damage).clamp(0.0, self.player.max_hull);
                if let Some(s @ (Sector::Front | Sector::Back)) = sector {
                    self.try_disable_weapons(s);
                    self.try_jam_targeting();
                }
                self.player.invincible = PLAYER_INVINCIBLE_TIME;
                self.player.flicker = PLAYER_FLICKER_TIME;
                self.events.push(GameEvent::HullHit {
                    sector,
                    damage: hull_damage,
                });
                outcome = DamageOutcome::Hull {
                    sector,
                    damage: hull_damage,
                };
            }
            _ => {}
        }

        self.player.shield_delay = PLAYER_SHIELD_DELAY;

        if self.player.hull <= 0.0 {
            if self.allow_death {
                self.phase = GamePhase::Destroyed;
                self.events.push(GameEvent::PlayerDestroyed);
                log::info!("Player destroyed in round {}", self.round);
            } else {
                self.player.hull = 1.0;
                self.player.invincible = self.player.invincible.max(NO_DEATH_INVINCIBLE_TIME);
            }
        }
        outcome
    }

    /// Roll for knocking a weapon offline after a front/back hull hit
    fn try_disable_weapons(&mut self, side: Sector) {
        if !self.rng.random_bool(SYSTEM_FAULT_CHANCE) {
            return;
        }
        let duration = fault_duration(self.player.hull, self.player.max_hull);
        let system = match side {
            Sector::Front if self.rng.random_bool(0.5) => WeaponSystem::Laser,
            Sector::Front => WeaponSystem::FrontTorpedo,
            _ => WeaponSystem::RearTorpedo,
        };
        self.player.faults.disable(system, duration);
        log::debug!("{:?} offline for {:.1}s", system, duration);
        self.events.push(GameEvent::WeaponDisabled { system, duration });
    }

    /// Roll for jamming front or rear targeting after a front/back hull hit
    fn try_jam_targeting(&mut self) {
        if !self.rng.random_bool(SYSTEM_FAULT_CHANCE) {
            return;
        }
        let duration = fault_duration(self.player.hull, self.player.max_hull);
        let slot = if self.rng.random_bool(0.5) {
            TorpedoSlot::Front
        } else {
            TorpedoSlot::Rear
        };
        self.player.faults.jam(slot, duration);
        log::debug!("{:?} targeting jammed for {:.1}s", slot, duration);
        self.events.push(GameEvent::TargetingJammed { slot, duration });
    }

    /// Count down the regen delay, then recharge every sector
    pub fn regenerate_shields(&mut self, dt: f32) {
        let player = &mut self.player;
        if player.shield_delay > 0.0 {
            player.shield_delay = (player.shield_delay - dt).max(0.0);
        } else {
            player.shield.regenerate(PLAYER_SHIELD_REGEN_PER_SEC, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Difficulty, Settings};
    use proptest::prelude::*;

    fn quiet_state() -> GameState {
        let mut state = GameState::new(&Settings::default());
        state.spawn_queue.clear();
        state
    }

    /// Travel direction of an attack arriving from `sector` for a ship facing up
    fn incoming(sector: Sector) -> Vec2 {
        -crate::vec_from_angle(sector.center_offset())
    }

    #[test]
    fn test_sector_bucketing() {
        assert_eq!(Sector::from_relative_angle(0.0), Sector::Front);
        assert_eq!(Sector::from_relative_angle(FRAC_PI_4), Sector::Front);
        assert_eq!(Sector::from_relative_angle(1.0), Sector::Right);
        assert_eq!(Sector::from_relative_angle(3.0 * FRAC_PI_4), Sector::Right);
        assert_eq!(Sector::from_relative_angle(-1.0), Sector::Left);
        assert_eq!(Sector::from_relative_angle(-3.0 * FRAC_PI_4), Sector::Left);
        assert_eq!(Sector::from_relative_angle(2.5), Sector::Back);
        assert_eq!(Sector::from_relative_angle(-2.5), Sector::Back);
    }

    #[test]
    fn test_sector_for_attack_uses_source_side() {
        // Bullet travelling down the screen hits a ship facing up on the front
        assert_eq!(Sector::for_attack(0.0, Vec2::new(0.0, 1.0)), Some(Sector::Front));
        // Travelling left means it came from the right
        assert_eq!(Sector::for_attack(0.0, Vec2::new(-1.0, 0.0)), Some(Sector::Right));
        // Same bullet against a ship facing right hits the front
        assert_eq!(
            Sector::for_attack(PI / 2.0, Vec2::new(-1.0, 0.0)),
            Some(Sector::Front)
        );
        assert_eq!(Sector::for_attack(0.0, Vec2::ZERO), None);
    }

    #[test]
    fn test_front_hit_absorbed_by_shield() {
        let mut state = quiet_state();
        state.player.shield.set(Sector::Front, 20.0);
        let hull_before = state.player.hull;

        let outcome = state.apply_damage_to_player(50.0, Some(incoming(Sector::Front)));

        let lost = 20.0 - state.player.shield.get(Sector::Front);
        assert!(matches!(outcome, DamageOutcome::Absorbed { sector: Sector::Front, .. }));
        // 12.5%-25% of 120 is 15-30, limited by the 20 remaining
        assert!((15.0..=20.0).contains(&lost), "lost {}", lost);
        assert_eq!(state.player.hull, hull_before);
        assert_eq!(state.player.shield_delay, PLAYER_SHIELD_DELAY);
    }

    #[test]
    fn test_absorption_ignores_incoming_damage() {
        let mut state = quiet_state();
        state.apply_damage_to_player(0.5, Some(incoming(Sector::Back)));
        let lost = 30.0 - state.player.shield.get(Sector::Back);
        assert!(lost >= 15.0 - 1e-4);
    }

    #[test]
    fn test_empty_sector_passes_to_hull() {
        let mut state = quiet_state();
        state.player.shield.set(Sector::Front, 0.0);
        let outcome = state.apply_damage_to_player(10.0, Some(incoming(Sector::Front)));
        assert_eq!(
            outcome,
            DamageOutcome::Hull {
                sector: Some(Sector::Front),
                damage: 10.0
            }
        );
        assert_eq!(state.player.hull, 90.0);
        assert_eq!(state.player.invincible, PLAYER_INVINCIBLE_TIME);
        assert!(state.player.flicker > 0.0);
    }

    #[test]
    fn test_side_hit_doubles_and_bleeds_velocity() {
        let mut state = quiet_state();
        state.player.shield.set(Sector::Left, 0.0);
        state.player.vel = Vec2::new(100.0, 0.0);
        state.apply_damage_to_player(10.0, Some(incoming(Sector::Left)));
        assert_eq!(state.player.hull, 80.0);
        assert!((state.player.vel.x - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_invincibility_blocks_hull() {
        let mut state = quiet_state();
        state.player.shield.set(Sector::Front, 0.0);
        state.player.invincible = 0.5;
        let outcome = state.apply_damage_to_player(10.0, Some(incoming(Sector::Front)));
        assert_eq!(outcome, DamageOutcome::Deflected);
        assert_eq!(state.player.hull, 100.0);
    }

    #[test]
    fn test_no_death_clamps_hull() {
        let mut state = quiet_state();
        state.allow_death = false;
        state.player.hull = 5.0;
        state.apply_damage_to_player(500.0, None);
        assert_eq!(state.player.hull, 1.0);
        assert!(state.player.invincible >= NO_DEATH_INVINCIBLE_TIME);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_death_allowed_destroys_ship() {
        let mut state = quiet_state();
        state.player.hull = 5.0;
        state.apply_damage_to_player(500.0, None);
        assert_eq!(state.player.hull, 0.0);
        assert_eq!(state.phase, GamePhase::Destroyed);
        assert!(state.events.contains(&GameEvent::PlayerDestroyed));
    }

    #[test]
    fn test_god_mode_ignores_damage() {
        let settings = Settings {
            difficulty: Difficulty::God,
            ..Default::default()
        };
        let mut state = GameState::new(&settings);
        let before = state.player.shield;
        assert_eq!(
            state.apply_damage_to_player(50.0, Some(Vec2::Y)),
            DamageOutcome::Ignored
        );
        assert_eq!(state.player.shield, before);
    }

    #[test]
    fn test_fault_duration_range() {
        assert_eq!(fault_duration(100.0, 100.0), 5.0);
        assert_eq!(fault_duration(0.0, 100.0), 30.0);
        assert!((fault_duration(50.0, 100.0) - 17.5).abs() < 1e-4);
    }

    #[test]
    fn test_front_hull_hits_eventually_fault_systems() {
        let mut state = quiet_state();
        state.allow_death = false;
        state.player.shield.set(Sector::Front, 0.0);
        for _ in 0..60 {
            state.player.invincible = 0.0;
            state.player.shield.set(Sector::Front, 0.0);
            state.apply_damage_to_player(1.0, Some(incoming(Sector::Front)));
        }
        let f = state.player.faults;
        assert!(f.laser_disabled_for > 0.0 || f.front_torp_disabled_for > 0.0);
        assert_eq!(f.rear_torp_disabled_for, 0.0);
        assert!(f.front_jam_for > 0.0 || f.rear_jam_for > 0.0);
    }

    #[test]
    fn test_side_hits_never_fault() {
        let mut state = quiet_state();
        state.allow_death = false;
        for _ in 0..60 {
            state.player.invincible = 0.0;
            state.player.shield.set(Sector::Right, 0.0);
            state.apply_damage_to_player(1.0, Some(incoming(Sector::Right)));
        }
        assert_eq!(state.player.faults, SystemFaults::default());
    }

    #[test]
    fn test_faults_tick_to_zero() {
        let mut f = SystemFaults::default();
        f.disable(WeaponSystem::Laser, 1.0);
        f.jam(TorpedoSlot::Rear, 2.0);
        f.jam(TorpedoSlot::Rear, 0.5);
        assert_eq!(f.rear_jam_for, 2.0);
        f.tick(1.5);
        assert!(!f.is_disabled(WeaponSystem::Laser));
        assert_eq!(f.laser_disabled_for, 0.0);
        assert!(f.is_jammed(TorpedoSlot::Rear));
    }

    #[test]
    fn test_regen_waits_for_delay() {
        let mut state = quiet_state();
        state.player.shield.set(Sector::Right, 0.0);
        state.player.shield_delay = 1.0;
        state.regenerate_shields(0.5);
        assert_eq!(state.player.shield.get(Sector::Right), 0.0);
        state.regenerate_shields(0.5);
        state.regenerate_shields(1.0);
        assert!((state.player.shield.get(Sector::Right) - 3.0).abs() < 1e-4);
        // Full sectors stay capped
        assert_eq!(state.player.shield.get(Sector::Front), 30.0);
    }

    proptest! {
        #[test]
        fn hull_and_sectors_stay_in_bounds(
            hits in proptest::collection::vec((0.0f32..200.0, -4.0f32..4.0, any::<bool>()), 1..80),
            allow_death in any::<bool>(),
        ) {
            let mut state = quiet_state();
            state.allow_death = allow_death;
            for (amount, angle, clear_iframes) in hits {
                if clear_iframes {
                    state.player.invincible = 0.0;
                }
                state.apply_damage_to_player(amount, Some(crate::vec_from_angle(angle)));
                let p = &state.player;
                prop_assert!(p.hull >= 0.0 && p.hull <= p.max_hull);
                for v in p.shield.values() {
                    prop_assert!((0.0..=p.shield.sector_cap()).contains(&v));
                }
                if !allow_death {
                    prop_assert!(p.hull >= 1.0);
                }
            }
        }
    }
}
