//! Player ship controller
//!
//! Rotation accelerates toward the target heading (with a boost when far off
//! and doubled acceleration when reversing), thrust is soft-capped at cruise
//! speed, and a dash gives an instant impulse along the facing followed by a
//! window with a relaxed speed cap and lighter drag.

use glam::Vec2;

use super::state::{GameState, Player};
use crate::consts::*;
use crate::settings::Arena;
use crate::{shortest_angle_diff, vec_from_angle};

/// Turn/accel multiplier while the autopilot flies
pub const AUTOPILOT_TURN_MULTIPLIER: f32 = 2.6;
/// Autopilot speed cap relative to the max move speed
pub const AUTOPILOT_SPEED_CAP: f32 = 1.1;

/// Steering for one tick, resolved from the pilot's input or the autopilot
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Helm {
    /// Desired heading; `None` holds the current facing
    pub target_angle: Option<f32>,
    /// Unit thrust direction
    pub thrust_dir: Option<Vec2>,
    /// Thrust amount, negative accelerates backwards
    pub thrust: f32,
    pub dash: bool,
    /// Autopilot flying: facing snaps to the target and turning is faster
    pub autopilot: bool,
    /// Autopilot is inside its preferred band and holds position
    pub hold_position: bool,
}

/// Everything the ship is told to do in one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orders {
    pub helm: Helm,
    pub fire_laser: bool,
    pub fire_front: bool,
    pub fire_rear: bool,
}

impl Player {
    /// Angular acceleration toward `target_angle`, then step the facing
    pub fn rotate(&mut self, dt: f32, laser_engaged: bool, turn_multiplier: f32) {
        let diff = shortest_angle_diff(self.angle, self.target_angle);
        let abs_diff = diff.abs();
        let base_accel = if laser_engaged {
            PLAYER_ANGULAR_ACCEL * 0.5
        } else {
            PLAYER_ANGULAR_ACCEL
        };
        let max_speed = PLAYER_ANGULAR_MAX_SPEED * turn_multiplier;
        let accel = base_accel * turn_multiplier;

        if abs_diff > PLAYER_TURN_DEAD_ZONE {
            let dir = diff.signum();
            let boost = if abs_diff > PLAYER_TURN_BOOST_THRESHOLD {
                PLAYER_TURN_BOOST
            } else {
                1.0
            };
            // Turning against the current spin brakes twice as hard
            let reverse = if self.angular_speed * dir < 0.0 { 2.0 } else { 1.0 };
            self.angular_speed += dir * accel * boost * reverse * dt;
            self.angular_speed = self.angular_speed.clamp(-max_speed, max_speed);
        } else {
            let damp = (PLAYER_ANGULAR_DAMP * dt).min(1.0);
            self.angular_speed *= 1.0 - damp;
            if self.angular_speed.abs() < 0.02 {
                self.angular_speed = 0.0;
            }
        }

        let mut step = self.angular_speed * dt;
        if step.abs() > abs_diff {
            step = diff;
            self.angular_speed = 0.0;
        }
        self.angle = crate::normalize_angle(self.angle + step);
    }

    /// Whether the post-dash boost window is open
    pub fn is_boosted(&self) -> bool {
        self.dash.boost > 0.0
    }

    /// Accelerate along `dir`; forward speed above cruise is bled off unless boosted
    pub fn apply_thrust(&mut self, dir: Vec2, amount: f32, dt: f32) {
        if amount == 0.0 {
            return;
        }
        let Some(dir) = dir.try_normalize() else {
            return;
        };
        let sign = amount.signum();
        let boosted = self.is_boosted();
        let accel = if boosted {
            PLAYER_ACCEL * DASH_THRUST_MULTIPLIER
        } else {
            PLAYER_ACCEL
        };
        self.vel += dir * accel * sign * dt;
        if !boosted && sign > 0.0 {
            let forward = self.vel.dot(dir);
            if forward > PLAYER_BASE_MOVE_SPEED {
                self.vel -= dir * (forward - PLAYER_BASE_MOVE_SPEED);
            }
        }
    }

    /// Apply drag and the hard velocity cap
    pub fn apply_drag(&mut self, dt: f32) {
        let rate = if self.is_boosted() {
            PLAYER_MOVE_DRAG * DASH_DRAG_MULTIPLIER
        } else {
            PLAYER_MOVE_DRAG
        };
        self.vel *= 1.0 - (rate * dt).min(1.0);

        let cap = if self.is_boosted() {
            PLAYER_VELOCITY_CAP * DASH_POST_BOOST_CAP_MULTIPLIER
        } else {
            PLAYER_VELOCITY_CAP
        };
        self.vel = self.vel.clamp_length_max(cap);
    }

    /// Start a dash on the rising edge of the dash action
    ///
    /// Returns true if the dash fired.
    pub fn try_dash(&mut self, pressed: bool) -> bool {
        let rising = pressed && !self.dash.was_pressed;
        self.dash.was_pressed = pressed;
        if !rising || self.dash.cooldown > 0.0 || self.dash.active {
            return false;
        }
        let dir = vec_from_angle(self.angle);
        self.dash.active = true;
        self.dash.time = DASH_DURATION;
        self.dash.cooldown = DASH_COOLDOWN;
        self.dash.boost = DASH_POST_BOOST_DURATION;
        self.vel += dir * DASH_SPEED;
        true
    }

    /// Count down dash, invincibility, flicker and weapon timers
    pub fn tick_timers(&mut self, dt: f32) {
        if self.dash.active {
            self.dash.time -= dt;
            if self.dash.time <= 0.0 {
                self.dash.active = false;
                self.dash.time = 0.0;
            }
        }
        self.dash.boost = (self.dash.boost - dt).max(0.0);
        self.dash.cooldown = (self.dash.cooldown - dt).max(0.0);
        self.invincible = (self.invincible - dt).max(0.0);
        self.flicker = (self.flicker - dt).max(0.0);
        self.torpedo_front.tick(dt);
        self.torpedo_rear.tick(dt);
        self.faults.tick(dt);
    }

    /// Integrate position and keep the hull inside the arena
    pub fn integrate(&mut self, arena: &Arena, dt: f32) {
        self.pos += self.vel * dt;
        self.clamp_to(arena);
    }

    /// Keep the whole hull inside the arena
    pub fn clamp_to(&mut self, arena: &Arena) {
        let r = self.radius;
        self.pos.x = self.pos.x.clamp(r, (arena.width - r).max(r));
        self.pos.y = self.pos.y.clamp(r, (arena.height - r).max(r));
    }
}

impl GameState {
    /// Advance the player ship one step
    pub fn update_player(&mut self, helm: &Helm, dt: f32) {
        let laser_engaged = self.player.laser.is_engaged();
        let player = &mut self.player;

        match helm.target_angle {
            Some(target) if helm.autopilot => {
                player.target_angle = target;
                player.angle = crate::normalize_angle(target);
                player.angular_speed = 0.0;
            }
            Some(target) => player.target_angle = crate::normalize_angle(target),
            None => player.target_angle = player.angle,
        }
        let turn_multiplier = if helm.autopilot {
            AUTOPILOT_TURN_MULTIPLIER
        } else {
            1.0
        };
        player.rotate(dt, laser_engaged, turn_multiplier);

        if let Some(dir) = helm.thrust_dir {
            player.apply_thrust(dir, helm.thrust, dt);
        }
        player.apply_drag(dt);

        if helm.autopilot {
            if helm.hold_position {
                player.vel = Vec2::ZERO;
            }
            player.vel = player
                .vel
                .clamp_length_max(PLAYER_MAX_MOVE_SPEED * AUTOPILOT_SPEED_CAP);
        }

        player.try_dash(helm.dash);
        player.tick_timers(dt);
        player.integrate(&self.arena, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn player() -> Player {
        Player::new(Vec2::new(640.0, 400.0))
    }

    #[test]
    fn test_rotation_reaches_target_without_overshoot() {
        let mut p = player();
        p.target_angle = FRAC_PI_2;
        for _ in 0..120 {
            p.rotate(1.0 / 60.0, false, 1.0);
            assert!(p.angle <= FRAC_PI_2 + 1e-5);
        }
        assert!((p.angle - FRAC_PI_2).abs() < 1e-4);
        assert_eq!(p.angular_speed, 0.0);
    }

    #[test]
    fn test_rotation_takes_shortest_path() {
        let mut p = player();
        p.angle = 3.0;
        p.target_angle = -3.0;
        p.rotate(1.0 / 60.0, false, 1.0);
        // Wrapping through π is shorter than sweeping back through 0
        assert!(p.angular_speed > 0.0);
    }

    #[test]
    fn test_big_error_turns_faster() {
        let mut small = player();
        small.target_angle = 0.5;
        small.rotate(0.01, false, 1.0);
        let mut big = player();
        big.target_angle = PI * 0.9;
        big.rotate(0.01, false, 1.0);
        assert!(big.angular_speed > small.angular_speed * 2.0);
    }

    #[test]
    fn test_laser_halves_turn_accel() {
        let mut free = player();
        free.target_angle = 1.0;
        free.rotate(0.01, false, 1.0);
        let mut firing = player();
        firing.target_angle = 1.0;
        firing.rotate(0.01, true, 1.0);
        assert!((firing.angular_speed * 2.0 - free.angular_speed).abs() < 1e-5);
    }

    #[test]
    fn test_angular_speed_capped() {
        let mut p = player();
        for i in 0..200 {
            p.target_angle = crate::normalize_angle(p.angle + if i % 2 == 0 { 3.0 } else { 2.9 });
            p.rotate(0.05, false, 1.0);
            assert!(p.angular_speed.abs() <= PLAYER_ANGULAR_MAX_SPEED + 1e-4);
        }
    }

    #[test]
    fn test_thrust_soft_caps_at_cruise() {
        let mut p = player();
        for _ in 0..600 {
            p.apply_thrust(Vec2::new(0.0, -1.0), 1.0, 1.0 / 60.0);
            assert!(-p.vel.y <= PLAYER_BASE_MOVE_SPEED + 1e-3);
        }
        assert!((-p.vel.y - PLAYER_BASE_MOVE_SPEED).abs() < 1e-2);
    }

    #[test]
    fn test_backward_thrust_ignores_cruise_bleed() {
        let mut p = player();
        p.apply_thrust(Vec2::new(0.0, -1.0), -1.0, 0.5);
        assert!((p.vel.y - PLAYER_ACCEL * 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_dash_impulse_along_facing() {
        let mut p = player();
        p.angle = FRAC_PI_2;
        p.vel = Vec2::new(150.0, 0.0);
        let before = p.vel.length();

        assert!(p.try_dash(true));

        assert!(p.vel.length() >= before + DASH_SPEED - 1e-3);
        assert!(p.dash.active);
        assert_eq!(p.dash.cooldown, DASH_COOLDOWN);
        assert_eq!(p.dash.boost, DASH_POST_BOOST_DURATION);
    }

    #[test]
    fn test_dash_needs_rising_edge_and_cooldown() {
        let mut p = player();
        assert!(p.try_dash(true));
        // Held button does not re-trigger
        p.dash.cooldown = 0.0;
        p.dash.active = false;
        assert!(!p.try_dash(true));
        assert!(!p.try_dash(false));
        assert!(p.try_dash(true));
        // Cooling down
        assert!(!p.try_dash(false));
        assert!(!p.try_dash(true));
    }

    #[test]
    fn test_post_boost_relaxes_cap() {
        let mut p = player();
        p.vel = Vec2::new(2000.0, 0.0);
        p.apply_drag(0.0);
        assert!((p.vel.length() - PLAYER_VELOCITY_CAP).abs() < 1e-3);

        p.vel = Vec2::new(2000.0, 0.0);
        p.dash.boost = 0.5;
        p.apply_drag(0.0);
        assert!(
            (p.vel.length() - PLAYER_VELOCITY_CAP * DASH_POST_BOOST_CAP_MULTIPLIER).abs() < 1e-2
        );
    }

    #[test]
    fn test_clamp_to_leaves_velocity_alone() {
        let mut p = player();
        p.pos = Vec2::new(-50.0, 900.0);
        p.vel = Vec2::new(-30.0, 40.0);
        p.clamp_to(&Arena::new(800.0, 600.0));
        assert_eq!(p.pos, Vec2::new(p.radius, 600.0 - p.radius));
        assert_eq!(p.vel, Vec2::new(-30.0, 40.0));
    }

    #[test]
    fn test_position_clamped_to_arena() {
        let mut p = player();
        p.vel = Vec2::new(-10_000.0, 10_000.0);
        p.integrate(&Arena::default(), 1.0);
        assert_eq!(p.pos.x, p.radius);
        assert_eq!(p.pos.y, 720.0 - p.radius);
    }

    #[test]
    fn test_update_player_manual_thrust_moves_ship() {
        let mut state = GameState::new(&Settings::default());
        let start = state.player.pos;
        let helm = Helm {
            target_angle: Some(0.0),
            thrust_dir: Some(Vec2::new(0.0, -1.0)),
            thrust: 1.0,
            ..Default::default()
        };
        for _ in 0..30 {
            state.update_player(&helm, 1.0 / 60.0);
        }
        assert!(state.player.pos.y < start.y);
        assert!((state.player.pos.x - start.x).abs() < 1e-3);
    }

    #[test]
    fn test_autopilot_snaps_and_holds() {
        let mut state = GameState::new(&Settings::default());
        state.player.vel = Vec2::new(100.0, 0.0);
        let helm = Helm {
            target_angle: Some(2.0),
            autopilot: true,
            hold_position: true,
            ..Default::default()
        };
        state.update_player(&helm, 1.0 / 60.0);
        assert_eq!(state.player.angle, 2.0);
        assert_eq!(state.player.vel, Vec2::ZERO);
    }
}
