//! Frame step orchestration
//!
//! One call advances spawns, the player, weapons, enemies and projectiles,
//! then resolves hits and checks for the end of the round.

use super::collision::{circle_separation, circles_overlap, outside_bounds};
use super::damage::Sector;
use super::player::{Helm, Orders};
use super::state::{GameEvent, GamePhase, GameState};
use super::weapons::{TorpedoSlot, steer_velocity};
use crate::consts::*;
use crate::vec_from_angle;

/// Pilot input for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    /// Directional intent as a heading; `None` when no direction is held
    pub move_angle: Option<f32>,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Thrust along the current facing
    pub thrust_forward: bool,
    pub thrust_backward: bool,
    pub dash: bool,
    pub fire_laser: bool,
    pub fire_torpedo_front: bool,
    pub fire_torpedo_rear: bool,
}

impl GameState {
    /// Advance the simulation by one frame
    ///
    /// Frame hitches are clamped to `MAX_FRAME_DT`.
    pub fn update(&mut self, input: &TickInput, dt: f32) {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        tick(self, input, dt);
    }

    /// Resolve pilot input into orders, bending the heading with aim assist
    pub fn manual_orders(&self, input: &TickInput) -> Orders {
        let facing = self.player.angle;
        let mut helm = Helm {
            dash: input.dash,
            ..Default::default()
        };
        if let Some(angle) = input.move_angle {
            let desired = self.aim_assist(crate::normalize_angle(angle));
            helm.target_angle = Some(desired);
            helm.thrust_dir = Some(vec_from_angle(desired));
            helm.thrust = 1.0;
        } else {
            match (input.turn_left, input.turn_right) {
                (true, false) => helm.target_angle = Some(facing - PLAYER_TURN_NUDGE),
                (false, true) => helm.target_angle = Some(facing + PLAYER_TURN_NUDGE),
                _ => {}
            }
            let thrust = match (input.thrust_forward, input.thrust_backward) {
                (true, false) => 1.0,
                (false, true) => -1.0,
                _ => 0.0,
            };
            if thrust != 0.0 {
                helm.thrust_dir = Some(vec_from_angle(facing));
                helm.thrust = thrust;
            }
        }
        Orders {
            helm,
            fire_laser: input.fire_laser,
            fire_front: input.fire_torpedo_front,
            fire_rear: input.fire_torpedo_rear,
        }
    }

    /// Count spawn delays down and instantiate everything that came due
    fn advance_spawn_queue(&mut self, dt: f32) {
        if self.spawn_queue.is_empty() {
            return;
        }
        for spawn in &mut self.spawn_queue {
            spawn.delay -= dt;
        }
        let (due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.spawn_queue)
                .into_iter()
                .partition(|s| s.delay <= 0.0);
        self.spawn_queue = pending;
        for spawn in &due {
            self.spawn_enemy(spawn);
        }
    }

    /// Steer homing shots, integrate, and cull the expired or escaped
    fn move_projectiles(&mut self, dt: f32) {
        self.steer_player_torpedoes(dt);
        let target = self.player.pos;
        for bullet in &mut self.enemy_bullets {
            if let Some(rate) = bullet.homing {
                let to = target - bullet.pos;
                if to.length() > 1.0 {
                    bullet.vel = steer_velocity(bullet.vel, to, rate, dt);
                }
            }
        }

        let (w, h) = (self.arena.width, self.arena.height);
        for list in [&mut self.player_bullets, &mut self.enemy_bullets] {
            for bullet in list.iter_mut() {
                bullet.pos += bullet.vel * dt;
                bullet.life -= dt;
            }
            list.retain(|b| b.life > 0.0 && !outside_bounds(b.pos, w, h, PROJECTILE_CULL_MARGIN));
        }
    }

    /// Enemy shots first meet the shield bubble, then the hull
    fn resolve_enemy_fire(&mut self) {
        let bullets = std::mem::take(&mut self.enemy_bullets);
        let mut kept = Vec::with_capacity(bullets.len());
        for bullet in bullets {
            let player = &self.player;
            let dist = bullet.pos.distance(player.pos);
            let travel = bullet.vel.try_normalize();
            let shield_hit = dist < player.shield_radius() + bullet.radius
                && travel
                    .and_then(|d| Sector::for_attack(player.angle, d))
                    .is_some_and(|s| player.shield.get(s) > 0.0);
            let hull_hit = dist < player.radius + bullet.radius;
            if shield_hit || hull_hit {
                self.apply_damage_to_player(bullet.damage, travel);
            } else {
                kept.push(bullet);
            }
        }
        self.enemy_bullets = kept;
    }

    /// Push overlapping bodies apart and trade contact damage
    fn resolve_contacts(&mut self) {
        for i in 0..self.enemies.len() {
            let enemy = &self.enemies[i];
            if !enemy.is_alive() {
                continue;
            }
            let Some(sep) =
                circle_separation(self.player.pos, self.player.radius, enemy.pos, enemy.radius)
            else {
                continue;
            };
            let push = sep.normal * sep.overlap;
            self.enemies[i].pos += push * CONTACT_ENEMY_PUSH_SHARE;
            self.player.pos -= push * (1.0 - CONTACT_ENEMY_PUSH_SHARE);
            self.player.clamp_to(&self.arena);

            let amount = self.scaled_damage(CONTACT_DAMAGE);
            self.apply_damage_to_player(amount, Some(-sep.normal));
            self.enemies[i].hp -= CONTACT_COUNTER_DAMAGE;
        }
    }

    /// Player shots hit the first overlapping enemy and are spent
    fn resolve_player_fire(&mut self) {
        let enemies = &mut self.enemies;
        self.player_bullets.retain(|bullet| {
            let hit = enemies
                .iter_mut()
                .filter(|e| e.is_alive())
                .find(|e| circles_overlap(bullet.pos, bullet.radius, e.pos, e.radius));
            match hit {
                Some(enemy) => {
                    enemy.hp -= bullet.damage;
                    false
                }
                None => true,
            }
        });
    }

    /// Drop dead enemies; laser kills feed the front torpedo bay
    fn remove_dead_enemies(&mut self) {
        let laser_firing = self.player.laser.is_firing();
        let mut killed = 0u32;
        let events = &mut self.events;
        self.enemies.retain(|e| {
            if e.is_alive() {
                return true;
            }
            log::debug!("{} #{} destroyed", e.kind.id(), e.id);
            events.push(GameEvent::EnemyKilled {
                id: e.id,
                kind: e.kind,
            });
            killed += 1;
            false
        });
        if laser_firing && killed > 0 {
            self.player
                .torpedo_front
                .add_refund(TORPEDO_LASER_KILL_REFUND * killed as f32);
        }
    }

    /// Round clear cooldown, then the next round
    fn check_wave_progress(&mut self, dt: f32) {
        if !self.enemies.is_empty() || !self.spawn_queue.is_empty() {
            return;
        }
        match self.wave_cooldown {
            None => {
                self.wave_cooldown = Some(WAVE_CLEAR_COOLDOWN);
                self.events.push(GameEvent::RoundCleared { round: self.round });
                log::info!("Round {} cleared", self.round);
            }
            Some(remaining) if remaining - dt > 0.0 => {
                self.wave_cooldown = Some(remaining - dt);
            }
            Some(_) => {
                self.wave_cooldown = None;
                self.advance_round();
            }
        }
    }

    /// Move to the next round; the boss round repeats until a settings change
    pub fn advance_round(&mut self) {
        if self.round < ROUNDS_PER_FACTION {
            self.round += 1;
        } else {
            log::debug!("Holding boss round {}", self.round);
        }
        self.build_spawn_queue();
    }
}

/// Advance the game state by one frame step
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.camera_shake = (state.camera_shake - dt).max(0.0);
    if state.phase == GamePhase::Destroyed {
        return;
    }
    state.time += dt as f64;

    state.advance_spawn_queue(dt);

    let orders = if state.auto_mode {
        state.autopilot_orders()
    } else {
        state.manual_orders(input)
    };
    state.update_player(&orders.helm, dt);
    state.update_laser(orders.fire_laser, dt);
    if orders.fire_front {
        state.fire_torpedo(TorpedoSlot::Front);
    }
    if orders.fire_rear {
        state.fire_torpedo(TorpedoSlot::Rear);
    }

    state.update_enemies(dt);
    state.move_projectiles(dt);

    state.resolve_enemy_fire();
    state.resolve_contacts();
    state.resolve_player_fire();
    state.remove_dead_enemies();

    state.regenerate_shields(dt);
    state.check_wave_progress(dt);
}
