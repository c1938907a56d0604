//! Player weapons
//!
//! The laser is a single burst weapon with a long cooldown. Torpedoes come from
//! two independent bays: the front bay locks onto the nearest enemy in a
//! forward cone and homes, the rear bay fires straight astern.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::beam_offset;
use super::damage::WeaponSystem;
use super::state::{Enemy, EnemyId, GameEvent, GameState, Projectile, Side};
use crate::consts::*;
use crate::{angle_from_vector, vec_from_angle};

/// Laser state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaserPhase {
    Ready,
    Charging,
    Firing,
    /// Damage-free fade after a burst
    Release,
    Cooldown,
}

/// Player laser
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Laser {
    pub phase: LaserPhase,
    /// Remaining time in the current phase
    pub timer: f32,
    /// HUD energy mirroring the cycle, 0..=LASER_MAX_ENERGY
    pub energy: f32,
}

impl Default for Laser {
    fn default() -> Self {
        Self::new()
    }
}

impl Laser {
    pub fn new() -> Self {
        Self {
            phase: LaserPhase::Ready,
            timer: 0.0,
            energy: LASER_MAX_ENERGY,
        }
    }

    /// Advance the state machine
    ///
    /// Returns true when the beam deals damage this step. A disabled laser
    /// cannot start a new burst but finishes one already under way.
    pub fn update(&mut self, fire: bool, disabled: bool, dt: f32) -> bool {
        let mut beam_live = false;
        match self.phase {
            LaserPhase::Ready => {
                if fire && !disabled {
                    if LASER_CHARGE_TIME > 0.0 {
                        self.phase = LaserPhase::Charging;
                        self.timer = LASER_CHARGE_TIME;
                    } else {
                        self.phase = LaserPhase::Firing;
                        self.timer = LASER_BURST_DURATION;
                    }
                }
            }
            LaserPhase::Charging => {
                self.timer -= dt;
                if self.timer <= 0.0 {
                    self.phase = LaserPhase::Firing;
                    self.timer = LASER_BURST_DURATION;
                }
            }
            LaserPhase::Firing => {
                self.timer -= dt;
                beam_live = true;
                if self.timer <= 0.0 {
                    self.phase = LaserPhase::Release;
                    self.timer = LASER_RELEASE_TIME;
                }
            }
            LaserPhase::Release => {
                self.timer -= dt;
                if self.timer <= 0.0 {
                    self.phase = LaserPhase::Cooldown;
                    self.timer = LASER_COOLDOWN;
                }
            }
            LaserPhase::Cooldown => {
                self.timer -= dt;
                if self.timer <= 0.0 {
                    self.phase = LaserPhase::Ready;
                    self.timer = 0.0;
                }
            }
        }
        self.energy = self.energy_for_phase();
        beam_live
    }

    fn energy_for_phase(&self) -> f32 {
        let remaining = self.timer.max(0.0);
        match self.phase {
            LaserPhase::Ready => LASER_MAX_ENERGY,
            LaserPhase::Charging => crate::lerp(
                0.0,
                LASER_MAX_ENERGY,
                1.0 - remaining / LASER_CHARGE_TIME.max(1e-4),
            ),
            LaserPhase::Firing => {
                LASER_MAX_ENERGY * crate::clamp01(remaining / LASER_BURST_DURATION.max(1e-4))
            }
            LaserPhase::Release => 0.0,
            LaserPhase::Cooldown => {
                LASER_MAX_ENERGY * crate::clamp01(1.0 - remaining / LASER_COOLDOWN.max(1e-4))
            }
        }
    }

    pub fn is_firing(&self) -> bool {
        self.phase == LaserPhase::Firing
    }

    /// Charging or firing (slows the ship's turning)
    pub fn is_engaged(&self) -> bool {
        matches!(self.phase, LaserPhase::Charging | LaserPhase::Firing)
    }

    /// Whether the renderer should draw the beam
    pub fn is_visible(&self) -> bool {
        matches!(
            self.phase,
            LaserPhase::Charging | LaserPhase::Firing | LaserPhase::Release
        )
    }

    pub fn energy_ratio(&self) -> f32 {
        crate::clamp01(self.energy / LASER_MAX_ENERGY)
    }
}

/// Torpedo bay position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TorpedoSlot {
    Front,
    Rear,
}

impl TorpedoSlot {
    pub fn system(&self) -> WeaponSystem {
        match self {
            TorpedoSlot::Front => WeaponSystem::FrontTorpedo,
            TorpedoSlot::Rear => WeaponSystem::RearTorpedo,
        }
    }

    pub fn max_ammo(&self) -> u32 {
        match self {
            TorpedoSlot::Front => TORPEDO_FRONT_MAX,
            TorpedoSlot::Rear => TORPEDO_REAR_MAX,
        }
    }
}

/// One torpedo bay with its own ammo and cooldown
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TorpedoBay {
    pub slot: TorpedoSlot,
    pub ammo: u32,
    pub max_ammo: u32,
    pub cooldown: f32,
    /// Fractional ammo earned from laser kills
    pub refund: f32,
}

impl TorpedoBay {
    pub fn new(slot: TorpedoSlot) -> Self {
        Self {
            slot,
            ammo: slot.max_ammo(),
            max_ammo: slot.max_ammo(),
            cooldown: 0.0,
            refund: 0.0,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    /// Ready to launch, ignoring faults
    pub fn can_fire(&self) -> bool {
        self.cooldown <= 0.0 && self.ammo > 0
    }

    /// Spend one torpedo and restart the cooldown
    fn consume(&mut self) {
        self.ammo = self.ammo.saturating_sub(1);
        self.cooldown = TORPEDO_COOLDOWN;
    }

    /// Add fractional ammo; whole units are loaded up to the cap
    pub fn add_refund(&mut self, amount: f32) {
        if self.ammo >= self.max_ammo {
            self.refund = 0.0;
            return;
        }
        self.refund += amount.max(0.0);
        while self.refund >= 1.0 && self.ammo < self.max_ammo {
            self.ammo += 1;
            self.refund -= 1.0;
        }
        if self.ammo >= self.max_ammo {
            self.refund = 0.0;
        }
    }

    pub fn ammo_ratio(&self) -> f32 {
        if self.max_ammo == 0 {
            0.0
        } else {
            self.ammo as f32 / self.max_ammo as f32
        }
    }
}

/// Nearest live enemy inside the forward lock cone and range
pub fn find_torpedo_target(origin: Vec2, facing: f32, enemies: &[Enemy]) -> Option<EnemyId> {
    let dir = vec_from_angle(facing);
    let cone_cos = TORPEDO_LOCK_CONE_DEG.to_radians().cos();
    enemies
        .iter()
        .filter(|e| e.is_alive())
        .filter_map(|e| {
            let to = e.pos - origin;
            let dist = to.length();
            if dist > TORPEDO_MAX_RANGE {
                return None;
            }
            let unit = if dist > 0.0 { to / dist } else { to };
            (unit.dot(dir) > cone_cos).then_some((e.id, dist))
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(id, _)| id)
}

/// Rotate a velocity toward `desired` by at most `turn_rate * dt` of the gap, keeping speed
pub fn steer_velocity(vel: Vec2, desired: Vec2, turn_rate: f32, dt: f32) -> Vec2 {
    let speed = vel.length();
    let Some(desired) = desired.try_normalize() else {
        return vel;
    };
    if speed <= 0.0 {
        return vel;
    }
    let turn = (turn_rate * dt).clamp(0.0, 1.0);
    let current = vel / speed;
    let dir = (current + (desired - current) * turn)
        .try_normalize()
        .unwrap_or(current);
    dir * speed
}

impl GameState {
    /// Run the laser for one step and burn every enemy in the beam
    pub fn update_laser(&mut self, fire: bool, dt: f32) {
        let disabled = self.player.faults.is_disabled(WeaponSystem::Laser);
        if !self.player.laser.update(fire, disabled, dt) {
            return;
        }
        let origin = self.player.pos;
        let angle = self.player.angle;
        let range = self.arena.beam_range();
        for enemy in self.enemies.iter_mut().filter(|e| e.is_alive()) {
            let Some(offset) = beam_offset(origin, angle, range, enemy.pos) else {
                continue;
            };
            if offset < enemy.radius + LASER_WIDTH {
                enemy.hp -= LASER_DPS * dt;
                enemy.slow_timer = enemy.slow_timer.max(LASER_SLOW_TIME);
            }
        }
    }

    /// Try to launch a torpedo from a bay
    ///
    /// Returns true if a torpedo left the bay.
    pub fn fire_torpedo(&mut self, slot: TorpedoSlot) -> bool {
        let bay = match slot {
            TorpedoSlot::Front => &self.player.torpedo_front,
            TorpedoSlot::Rear => &self.player.torpedo_rear,
        };
        if !bay.can_fire() || self.player.faults.is_disabled(slot.system()) {
            return false;
        }

        let origin = self.player.pos;
        let (target, heading) = match slot {
            TorpedoSlot::Front => {
                let target = find_torpedo_target(origin, self.player.angle, &self.enemies);
                let heading = target
                    .and_then(|id| self.enemy(id))
                    .map(|e| angle_from_vector(e.pos - origin))
                    .unwrap_or(self.player.angle);
                (target, heading)
            }
            TorpedoSlot::Rear => (None, crate::normalize_angle(self.player.angle + std::f32::consts::PI)),
        };

        let mut fire_angle = heading;
        if self.player.faults.is_jammed(slot) {
            let spread = TORPEDO_JAM_SPREAD_DEG.to_radians();
            fire_angle += self.rng.random_range(-spread..=spread);
        }

        // Muzzle follows the aim line, jam only bends the flight path
        let muzzle = origin + vec_from_angle(heading) * TORPEDO_MUZZLE_OFFSET;
        self.player_bullets.push(Projectile {
            side: Side::Player,
            pos: muzzle,
            vel: vec_from_angle(fire_angle) * TORPEDO_SPEED,
            radius: TORPEDO_RADIUS,
            damage: TORPEDO_DAMAGE,
            life: TORPEDO_LIFE,
            homing: target.map(|_| TORPEDO_HOMING_TURN_RATE),
            target,
        });

        match slot {
            TorpedoSlot::Front => self.player.torpedo_front.consume(),
            TorpedoSlot::Rear => self.player.torpedo_rear.consume(),
        }
        self.events.push(GameEvent::TorpedoFired { slot });
        true
    }

    /// Steer locked player torpedoes; stale locks are dropped and fly straight
    pub fn steer_player_torpedoes(&mut self, dt: f32) {
        for i in 0..self.player_bullets.len() {
            let Some(id) = self.player_bullets[i].target else {
                continue;
            };
            let target_pos = self.enemy(id).map(|e| e.pos);
            let torp = &mut self.player_bullets[i];
            match target_pos {
                Some(pos) => {
                    let to = pos - torp.pos;
                    if to.length() > 1.0 {
                        let rate = torp.homing.unwrap_or(TORPEDO_HOMING_TURN_RATE);
                        torp.vel = steer_velocity(torp.vel, to, rate, dt);
                    }
                }
                None => {
                    torp.target = None;
                    torp.homing = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::wave::SpawnDescriptor;
    use std::f32::consts::PI;

    fn quiet_state() -> GameState {
        let mut state = GameState::new(&Settings::default());
        state.spawn_queue.clear();
        state
    }

    fn spawn(state: &mut GameState, type_id: &str, pos: Vec2) -> EnemyId {
        state
            .spawn_enemy(&SpawnDescriptor {
                type_id: type_id.into(),
                pos,
                delay: 0.0,
            })
            .unwrap()
    }

    #[test]
    fn test_laser_full_cycle() {
        let mut laser = Laser::new();
        let dt = 0.01;
        assert!(!laser.update(false, false, dt));
        assert_eq!(laser.phase, LaserPhase::Ready);

        laser.update(true, false, dt);
        assert_eq!(laser.phase, LaserPhase::Charging);

        let mut fired_steps = 0;
        let mut prev_energy = laser.energy;
        let mut seen = vec![laser.phase];
        for _ in 0..2000 {
            let prev_phase = laser.phase;
            if laser.update(false, false, dt) {
                fired_steps += 1;
            }
            if laser.phase != *seen.last().unwrap() {
                seen.push(laser.phase);
            }
            match (prev_phase, laser.phase) {
                (LaserPhase::Firing, LaserPhase::Firing) => assert!(laser.energy <= prev_energy),
                (LaserPhase::Release, _) | (_, LaserPhase::Release) => {}
                (LaserPhase::Cooldown, LaserPhase::Cooldown) => {
                    assert!(laser.energy >= prev_energy)
                }
                _ => {}
            }
            if laser.phase == LaserPhase::Release {
                assert_eq!(laser.energy, 0.0);
            }
            prev_energy = laser.energy;
            if laser.phase == LaserPhase::Ready {
                break;
            }
        }
        assert_eq!(
            seen,
            vec![
                LaserPhase::Charging,
                LaserPhase::Firing,
                LaserPhase::Release,
                LaserPhase::Cooldown,
                LaserPhase::Ready
            ]
        );
        // 0.5s burst at 10ms steps
        assert!((49..=51).contains(&fired_steps), "fired {}", fired_steps);
        assert_eq!(laser.energy, LASER_MAX_ENERGY);
    }

    #[test]
    fn test_laser_energy_rises_while_charging() {
        let mut laser = Laser::new();
        laser.update(true, false, 0.0);
        assert_eq!(laser.phase, LaserPhase::Charging);
        assert_eq!(laser.energy, 0.0);

        laser.update(false, false, LASER_CHARGE_TIME * 0.25);
        let first = laser.energy;
        laser.update(false, false, LASER_CHARGE_TIME * 0.25);
        let second = laser.energy;

        assert_eq!(laser.phase, LaserPhase::Charging);
        assert!(first > 0.0);
        assert!(second > first, "{} then {}", first, second);
        assert!(second < LASER_MAX_ENERGY);
        assert!(laser.is_visible());
    }

    #[test]
    fn test_disabled_laser_finishes_burst() {
        let mut laser = Laser::new();
        assert!(!laser.update(true, true, 0.01));
        assert_eq!(laser.phase, LaserPhase::Ready);

        laser.update(true, false, 0.01);
        laser.update(false, true, 0.1);
        assert_eq!(laser.phase, LaserPhase::Firing);
        assert!(laser.update(false, true, 0.1));
    }

    #[test]
    fn test_laser_burns_and_slows_enemies_in_beam() {
        let mut state = quiet_state();
        let p = state.player.pos;
        let ahead = spawn(&mut state, "low_grunt1", p + Vec2::new(10.0, -200.0));
        let behind = spawn(&mut state, "low_grunt1", p + Vec2::new(0.0, 150.0));
        state.player.laser.phase = LaserPhase::Firing;
        state.player.laser.timer = LASER_BURST_DURATION;

        state.update_laser(false, 0.1);

        let a = state.enemy(ahead).unwrap();
        assert!((a.hp - (36.0 - 12.0)).abs() < 1e-3);
        assert_eq!(a.slow_timer, LASER_SLOW_TIME);
        assert_eq!(state.enemy(behind).unwrap().hp, 36.0);
    }

    #[test]
    fn test_front_torpedo_locks_nearest_in_cone() {
        let mut state = quiet_state();
        let p = state.player.pos;
        let far = spawn(&mut state, "low_grunt1", p + Vec2::new(0.0, -400.0));
        let near = spawn(&mut state, "low_grunt1", p + Vec2::new(20.0, -200.0));
        // Off to the side, outside the 30° cone
        spawn(&mut state, "low_grunt1", p + Vec2::new(150.0, -50.0));

        assert_eq!(
            find_torpedo_target(p, 0.0, &state.enemies),
            Some(near)
        );
        assert!(state.fire_torpedo(TorpedoSlot::Front));
        let torp = state.player_bullets.last().unwrap();
        assert_eq!(torp.target, Some(near));
        assert_eq!(torp.homing, Some(TORPEDO_HOMING_TURN_RATE));
        assert!((torp.vel.length() - TORPEDO_SPEED).abs() < 1e-2);
        assert_eq!(state.player.torpedo_front.ammo, TORPEDO_FRONT_MAX - 1);
        assert_ne!(Some(far), torp.target);
    }

    #[test]
    fn test_front_torpedo_cooldown_and_disable() {
        let mut state = quiet_state();
        assert!(state.fire_torpedo(TorpedoSlot::Front));
        assert!(!state.fire_torpedo(TorpedoSlot::Front));
        state.player.torpedo_front.tick(TORPEDO_COOLDOWN);
        state.player.faults.disable(WeaponSystem::FrontTorpedo, 5.0);
        assert!(!state.fire_torpedo(TorpedoSlot::Front));
        // Rear bay is independent
        assert!(state.fire_torpedo(TorpedoSlot::Rear));
    }

    #[test]
    fn test_rear_torpedo_fires_astern() {
        let mut state = quiet_state();
        state.player.angle = 0.7;
        assert!(state.fire_torpedo(TorpedoSlot::Rear));
        let torp = state.player_bullets.last().unwrap();
        let diff = crate::shortest_angle_diff(0.7 + PI, torp.heading());
        assert!(diff.abs() < 1e-4);
        assert!(torp.target.is_none());
        assert_eq!(state.player.torpedo_rear.ammo, TORPEDO_REAR_MAX - 1);
    }

    #[test]
    fn test_jammed_rear_torpedo_stays_within_spread() {
        let mut state = quiet_state();
        state.player.faults.jam(TorpedoSlot::Rear, 10.0);
        let spread = TORPEDO_JAM_SPREAD_DEG.to_radians();
        for _ in 0..TORPEDO_REAR_MAX {
            state.player.torpedo_rear.cooldown = 0.0;
            assert!(state.fire_torpedo(TorpedoSlot::Rear));
            let torp = state.player_bullets.last().unwrap();
            let diff = crate::shortest_angle_diff(PI, torp.heading());
            assert!(diff.abs() <= spread + 1e-4);
        }
        state.player.torpedo_rear.cooldown = 0.0;
        assert!(!state.fire_torpedo(TorpedoSlot::Rear));
    }

    #[test]
    fn test_refund_accumulates_and_caps() {
        let mut bay = TorpedoBay::new(TorpedoSlot::Front);
        bay.ammo = 10;
        bay.add_refund(0.4);
        bay.add_refund(0.4);
        assert_eq!(bay.ammo, 10);
        bay.add_refund(0.4);
        assert_eq!(bay.ammo, 11);
        assert!((bay.refund - 0.2).abs() < 1e-5);
        for _ in 0..10 {
            bay.add_refund(0.4);
        }
        assert_eq!(bay.ammo, bay.max_ammo);
        assert_eq!(bay.refund, 0.0);
    }

    #[test]
    fn test_steer_velocity_keeps_speed() {
        let v = steer_velocity(Vec2::new(100.0, 0.0), Vec2::new(0.0, 1.0), 2.2, 0.1);
        assert!((v.length() - 100.0).abs() < 1e-3);
        assert!(v.y > 0.0 && v.x > 0.0);
        // Full turn clamps at the desired direction
        let v = steer_velocity(Vec2::new(100.0, 0.0), Vec2::new(0.0, 1.0), 20.0, 1.0);
        assert!((v - Vec2::new(0.0, 100.0)).length() < 1e-3);
    }

    #[test]
    fn test_stale_lock_flies_straight() {
        let mut state = quiet_state();
        let p = state.player.pos;
        let id = spawn(&mut state, "low_grunt1", p + Vec2::new(0.0, -300.0));
        assert!(state.fire_torpedo(TorpedoSlot::Front));
        state.enemies.retain(|e| e.id != id);
        let vel_before = state.player_bullets[0].vel;
        state.steer_player_torpedoes(0.016);
        assert!(state.player_bullets[0].target.is_none());
        assert_eq!(state.player_bullets[0].vel, vel_before);
    }
}
