//! Autopilot intent source and manual aim assist

use glam::Vec2;

use super::player::{Helm, Orders};
use super::state::{Enemy, EnemyId, GameState};
use crate::{angle_from_vector, shortest_angle_diff};

/// Autopilot closes in beyond this distance
pub const AUTOPILOT_FAR: f32 = 260.0;
/// Autopilot backs off inside this distance
pub const AUTOPILOT_NEAR: f32 = 140.0;
const AUTOPILOT_BACKOFF_THRUST: f32 = 0.8;

const AIM_ASSIST_RANGE: f32 = 600.0;
const AIM_ASSIST_CONE_DEG: f32 = 28.0;
const AIM_ASSIST_FACTOR: f32 = 0.45;
const AIM_ASSIST_LASER_CONE_DEG: f32 = 45.0;
const AIM_ASSIST_LASER_FACTOR: f32 = 0.8;

/// Target priority: boss, then miniboss, then whoever is closest
pub fn pick_target(enemies: &[Enemy], from: Vec2) -> Option<EnemyId> {
    let live = || enemies.iter().filter(|e| e.is_alive());
    live()
        .find(|e| e.kind.is_boss())
        .or_else(|| live().find(|e| e.kind.is_miniboss()))
        .or_else(|| {
            live().min_by(|a, b| {
                a.pos
                    .distance_squared(from)
                    .total_cmp(&b.pos.distance_squared(from))
            })
        })
        .map(|e| e.id)
}

impl GameState {
    /// Orders flown by the autopilot this tick
    ///
    /// The current target is kept for as long as it lives.
    pub fn autopilot_orders(&mut self) -> Orders {
        let kept = self.auto_target.filter(|&id| self.enemy(id).is_some());
        self.auto_target = kept.or_else(|| pick_target(&self.enemies, self.player.pos));

        let player = &self.player;
        let Some(target) = self.auto_target.and_then(|id| self.enemy(id)) else {
            return Orders {
                helm: Helm {
                    target_angle: Some(player.angle),
                    autopilot: true,
                    ..Default::default()
                },
                ..Default::default()
            };
        };

        let to = target.pos - player.pos;
        let dist = to.length();
        let dir = to.try_normalize().unwrap_or(Vec2::ZERO);
        let mut helm = Helm {
            target_angle: Some(angle_from_vector(to)),
            autopilot: true,
            ..Default::default()
        };
        if dist > AUTOPILOT_FAR {
            helm.thrust_dir = Some(dir);
            helm.thrust = 1.0;
            helm.dash = !player.dash.active && player.dash.cooldown <= 0.0;
        } else if dist < AUTOPILOT_NEAR {
            helm.thrust_dir = Some(-dir);
            helm.thrust = AUTOPILOT_BACKOFF_THRUST;
        } else {
            helm.hold_position = true;
        }

        Orders {
            helm,
            fire_laser: true,
            fire_front: player.torpedo_front.can_fire(),
            fire_rear: false,
        }
    }

    /// Bend a manually requested heading toward the nearest enemy in range
    pub fn aim_assist(&self, desired: f32) -> f32 {
        let origin = self.player.pos;
        let nearest = self
            .enemies
            .iter()
            .filter(|e| e.is_alive())
            .map(|e| (e, e.pos.distance(origin)))
            .filter(|(_, d)| *d <= AIM_ASSIST_RANGE)
            .min_by(|a, b| a.1.total_cmp(&b.1));
        let Some((enemy, _)) = nearest else {
            return desired;
        };

        let (cone, factor) = if self.player.laser.is_firing() {
            (AIM_ASSIST_LASER_CONE_DEG, AIM_ASSIST_LASER_FACTOR)
        } else {
            (AIM_ASSIST_CONE_DEG, AIM_ASSIST_FACTOR)
        };
        let diff = shortest_angle_diff(desired, angle_from_vector(enemy.pos - origin));
        if diff.abs() <= cone.to_radians() {
            crate::normalize_angle(desired + diff * factor)
        } else {
            desired
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Difficulty, Settings};
    use crate::sim::weapons::LaserPhase;
    use crate::sim::wave::SpawnDescriptor;
    use std::f32::consts::FRAC_PI_2;

    fn god_state() -> GameState {
        let mut state = GameState::new(&Settings {
            difficulty: Difficulty::God,
            ..Default::default()
        });
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
    fn test_pick_target_priority() {
        let mut state = god_state();
        let p = state.player.pos;
        let near = spawn(&mut state, "low_grunt1", p + Vec2::new(0.0, -50.0));
        assert_eq!(pick_target(&state.enemies, p), Some(near));
        let mini = spawn(&mut state, "low_miniboss", p + Vec2::new(0.0, -400.0));
        assert_eq!(pick_target(&state.enemies, p), Some(mini));
        let boss = spawn(&mut state, "low_boss", p + Vec2::new(300.0, -400.0));
        assert_eq!(pick_target(&state.enemies, p), Some(boss));
    }

    #[test]
    fn test_target_kept_while_alive() {
        let mut state = god_state();
        let p = state.player.pos;
        let first = spawn(&mut state, "low_grunt1", p + Vec2::new(0.0, -200.0));
        state.autopilot_orders();
        assert_eq!(state.auto_target, Some(first));

        let closer = spawn(&mut state, "low_grunt1", p + Vec2::new(0.0, -100.0));
        state.autopilot_orders();
        assert_eq!(state.auto_target, Some(first));

        state.enemies[0].hp = 0.0;
        state.autopilot_orders();
        assert_eq!(state.auto_target, Some(closer));
    }

    #[test]
    fn test_closes_in_and_dashes_when_far() {
        let mut state = god_state();
        let p = state.player.pos;
        spawn(&mut state, "low_grunt1", p + Vec2::new(400.0, 0.0));
        let orders = state.autopilot_orders();
        assert!((orders.helm.target_angle.unwrap() - FRAC_PI_2).abs() < 1e-4);
        assert_eq!(orders.helm.thrust, 1.0);
        assert!(orders.helm.dash);
        assert!(orders.fire_laser);
        assert!(orders.fire_front);

        state.player.dash.cooldown = 0.5;
        assert!(!state.autopilot_orders().helm.dash);
    }

    #[test]
    fn test_backs_off_and_holds_band() {
        let mut state = god_state();
        let p = state.player.pos;
        spawn(&mut state, "low_grunt1", p + Vec2::new(0.0, -100.0));
        let orders = state.autopilot_orders();
        let dir = orders.helm.thrust_dir.unwrap();
        assert!(dir.y > 0.99);
        assert_eq!(orders.helm.thrust, AUTOPILOT_BACKOFF_THRUST);

        state.enemies[0].pos = p + Vec2::new(0.0, -200.0);
        let orders = state.autopilot_orders();
        assert!(orders.helm.hold_position);
        assert!(orders.helm.thrust_dir.is_none());
    }

    #[test]
    fn test_no_enemies_holds_heading() {
        let mut state = god_state();
        state.player.angle = 1.0;
        let orders = state.autopilot_orders();
        assert_eq!(orders.helm.target_angle, Some(1.0));
        assert!(!orders.fire_laser);
        assert!(state.auto_target.is_none());
    }

    #[test]
    fn test_aim_assist_pulls_inside_cone() {
        let mut state = god_state();
        let p = state.player.pos;
        // Enemy straight up, request 20° right of it
        spawn(&mut state, "low_grunt1", p + Vec2::new(0.0, -300.0));
        let desired = 20f32.to_radians();
        let assisted = state.aim_assist(desired);
        assert!((assisted - desired * (1.0 - AIM_ASSIST_FACTOR)).abs() < 1e-4);

        // Outside the normal cone but inside the laser cone
        let wide = 40f32.to_radians();
        assert_eq!(state.aim_assist(wide), wide);
        state.player.laser.phase = LaserPhase::Firing;
        let assisted = state.aim_assist(wide);
        assert!((assisted - wide * (1.0 - AIM_ASSIST_LASER_FACTOR)).abs() < 1e-4);
    }

    #[test]
    fn test_aim_assist_ignores_far_enemies() {
        let mut state = god_state();
        let p = state.player.pos;
        spawn(&mut state, "low_grunt1", p + Vec2::new(620.0, -50.0));
        assert_eq!(state.aim_assist(0.2), 0.2);
    }
}
