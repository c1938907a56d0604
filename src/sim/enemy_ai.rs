//! Enemy movement and behaviour state machines
//!
//! Every enemy seeks the player with a sinusoidal lateral weave, weighted per
//! behaviour. On top of that each behaviour runs its own attack cycle. The mid
//! boss walks an ordered phase list and periodically summons laser grunts.

use glam::Vec2;
use rand::Rng;

use super::catalog::EnemyKind;
use super::collision::beam_hits_circle;
use super::state::{
    ActiveBeam, BeamCycle, BeamStage, Behavior, BossPhaseData, BossPhaseKind, DualMinibossState,
    Enemy, GameState, MidBossState, Projectile, Side, SkirmisherState, SpinState, Telegraph,
    TelegraphStage,
};
use super::wave::SpawnDescriptor;
use crate::consts::*;
use crate::{angle_from_vector, approach, shortest_angle_diff, vec_from_angle};

/// Timing and strength of a telegraphed beam
#[derive(Debug, Clone, Copy)]
struct BeamPattern {
    warning: f32,
    firing: f32,
    half_width: f32,
    dps: f32,
    cooldown: f32,
    cooldown_jitter: f32,
}

const LASER_GRUNT_BEAM: BeamPattern = BeamPattern {
    warning: 0.35,
    firing: 0.45,
    half_width: 10.0,
    dps: 28.0,
    cooldown: 1.3,
    cooldown_jitter: 1.0,
};

const DUAL_CHARGE_BEAM: BeamPattern = BeamPattern {
    warning: 0.6,
    firing: 0.7,
    half_width: 18.0,
    dps: 45.0,
    cooldown: 3.5,
    cooldown_jitter: 0.0,
};

const SKIRMISHER_TURN_RATE: f32 = 4.5;
const SKIRMISHER_BAND: f32 = 30.0;
const SKIRMISHER_PUSH: f32 = 0.2;
const SKIRMISHER_WEAVE_RATE: f32 = 1.2;
const LASER_GRUNT_TURN_RATE: f32 = 3.2;

const DUAL_BURST_INTERVAL: f32 = 0.9;
const DUAL_BARREL_OFFSET: f32 = 22.0;
const DUAL_BULLET_SPEED: f32 = 220.0;
const DUAL_BULLET_RADIUS: f32 = 4.0;
const DUAL_BULLET_LIFE: f32 = 4.0;

const SPIN_WARNING_TIME: f32 = 0.65;
const SPIN_FIRING_TIME: f32 = 0.9;
const SPIN_WARNING_SPEED: f32 = 3.4;
const SPIN_FIRING_SPEED: f32 = 5.6;
const SPIN_ANGULAR_ACCEL: f32 = 18.0;
const SPIN_AIM_DRIFT: f32 = 2.5;
const SPIN_BEAM_HALF_WIDTH: f32 = 14.0;
const SPIN_BEAM_DPS: f32 = 32.0;

const BOSS_SUMMON_INTERVAL: f32 = 7.0;
const BOSS_SUMMON_SPREAD: f32 = 110.0;
const BOSS_SUMMON_DROP: f32 = 120.0;

const BOSS_TORP_FIRST_DELAY: f32 = 0.5;
const BOSS_TORP_INTERVAL: f32 = 0.7;
const BOSS_TORP_SHOTS: u32 = 6;
const BOSS_TORP_SPEED: f32 = 170.0;
const BOSS_TORP_RADIUS: f32 = 6.0;
const BOSS_TORP_HOMING: f32 = 1.4;
const BOSS_TORP_LIFE: f32 = 6.0;

const BOSS_RAIN_LANES: u32 = 6;
const BOSS_RAIN_WARNING: f32 = 1.1;
const BOSS_RAIN_WINDOW: f32 = 2.0;
const BOSS_RAIN_STACK: u32 = 3;
const BOSS_RAIN_SPACING: f32 = 60.0;
const BOSS_RAIN_SPEED: f32 = 240.0;

const BOSS_CLAMP_WARNING: f32 = 0.9;
const BOSS_CLAMP_START_OFFSET: f32 = 0.9;
const BOSS_CLAMP_END_OFFSET: f32 = 0.2;
const BOSS_CLAMP_SPIN_TIME: f32 = 1.5;
const BOSS_CLAMP_ROTATION: f32 = 1.6;
const BOSS_CLAMP_HALF_WIDTH: f32 = 28.0;
const BOSS_CLAMP_DPS: f32 = 60.0;

const BOSS_ULTIMATE_WARNING: f32 = 2.0;
const BOSS_ULTIMATE_DURATION: f32 = 1.6;
const BOSS_ULTIMATE_HALF_WIDTH: f32 = 140.0;
const BOSS_ULTIMATE_DPS: f32 = 140.0;

/// How an enemy's facing is driven this tick
#[derive(Debug, Clone, Copy)]
enum Facing {
    /// Turn toward the player at this rate
    Track(f32),
    /// Face this angle directly
    Fixed(f32),
}

/// (toward player, lateral weave) movement weights
fn movement_weights(behavior: &Behavior) -> (f32, f32) {
    match behavior {
        Behavior::None => (1.0, 0.4),
        Behavior::Skirmisher(_) => (0.7, 0.9),
        Behavior::LaserGrunt(_) => (0.7, 0.5),
        Behavior::DualMiniboss(_) => (0.4, 0.2),
        Behavior::SpinMiniboss(_) => (0.85, 0.95),
        Behavior::MidBoss(_) => (0.0, 0.0),
    }
}

fn clamp_to_arena(pos: Vec2, width: f32, height: f32) -> Vec2 {
    let m = ENEMY_ARENA_MARGIN;
    Vec2::new(
        pos.x.clamp(m, (width - m).max(m)),
        pos.y.clamp(m, (height - m).max(m)),
    )
}

/// Seek the player with a lateral weave; slowed enemies move at reduced speed
fn seek_and_weave(enemy: &mut Enemy, target: Vec2, dt: f32) {
    let (towards, side) = movement_weights(&enemy.behavior);
    let to = (target - enemy.pos).try_normalize().unwrap_or(Vec2::ZERO);
    let lateral = Vec2::new(-to.y, to.x);
    enemy.ai_phase += dt * enemy.ai_phase_rate;
    let weave = enemy.ai_phase.sin() * side;

    let mut speed = enemy.base_speed;
    if enemy.slow_timer > 0.0 {
        enemy.slow_timer = (enemy.slow_timer - dt).max(0.0);
        speed *= SLOW_FACTOR;
    } else {
        enemy.slow_timer = 0.0;
    }
    enemy.speed = speed;
    enemy.pos += (to * towards + lateral * weave) * speed * dt;
}

/// Rotate `facing` toward `desired` by at most `rate * dt`
fn turn_toward(facing: f32, desired: f32, rate: f32, dt: f32) -> f32 {
    let diff = shortest_angle_diff(facing, desired);
    let max_step = rate.max(0.0) * dt;
    if diff.abs() <= max_step {
        desired
    } else {
        crate::normalize_angle(facing + diff.signum() * max_step)
    }
}

/// Advance an idle/warning/firing beam cycle; returns true while the beam burns
fn step_beam_cycle(
    cycle: &mut BeamCycle,
    pattern: &BeamPattern,
    aim_now: f32,
    rng: &mut impl Rng,
    dt: f32,
) -> bool {
    match cycle.stage {
        BeamStage::Idle => {
            cycle.timer -= dt;
            if cycle.timer <= 0.0 {
                cycle.stage = BeamStage::Warning;
                cycle.timer = pattern.warning;
                cycle.aim_angle = aim_now;
            }
            false
        }
        BeamStage::Warning => {
            cycle.timer -= dt;
            if cycle.timer <= 0.0 {
                cycle.stage = BeamStage::Firing;
                cycle.timer = pattern.firing;
            }
            false
        }
        BeamStage::Firing => {
            cycle.timer -= dt;
            if cycle.timer <= 0.0 {
                cycle.stage = BeamStage::Idle;
                cycle.timer = pattern.cooldown;
                if pattern.cooldown_jitter > 0.0 {
                    cycle.timer += rng.random::<f32>() * pattern.cooldown_jitter;
                }
            }
            true
        }
    }
}

impl GameState {
    /// Run movement, default fire and behaviour for every live enemy
    ///
    /// Enemies summoned during the pass join the live set afterwards.
    pub fn update_enemies(&mut self, dt: f32) {
        let mut enemies = std::mem::take(&mut self.enemies);
        for enemy in enemies.iter_mut().filter(|e| e.is_alive()) {
            let start = enemy.pos;
            seek_and_weave(enemy, self.player.pos, dt);
            enemy.pos = clamp_to_arena(enemy.pos, self.arena.width, self.arena.height);

            if enemy.fires_default() {
                enemy.fire_timer -= dt;
                if enemy.fire_timer <= 0.0 {
                    enemy.fire_timer = enemy.fire_delay;
                    self.fire_enemy_torpedo(enemy.pos, enemy.damage);
                }
            }

            let facing = self.run_behavior(enemy, dt);
            enemy.pos = clamp_to_arena(enemy.pos, self.arena.width, self.arena.height);
            enemy.facing = match facing {
                Facing::Track(rate) => turn_toward(
                    enemy.facing,
                    angle_from_vector(self.player.pos - enemy.pos),
                    rate,
                    dt,
                ),
                Facing::Fixed(angle) => crate::normalize_angle(angle),
            };
            if dt > 0.0 {
                enemy.vel = (enemy.pos - start) / dt;
            }
        }
        let summoned = std::mem::replace(&mut self.enemies, enemies);
        self.enemies.extend(summoned);
    }

    /// Aimed default shot toward the player
    pub fn fire_enemy_torpedo(&mut self, from: Vec2, damage: f32) {
        let dir = (self.player.pos - from)
            .try_normalize()
            .unwrap_or(Vec2::Y);
        self.enemy_bullets.push(Projectile {
            side: Side::Enemy,
            pos: from + dir * ENEMY_MUZZLE_OFFSET,
            vel: dir * ENEMY_TORPEDO_SPEED,
            radius: ENEMY_TORPEDO_RADIUS,
            damage,
            life: ENEMY_TORPEDO_LIFE,
            homing: None,
            target: None,
        });
    }

    /// Apply one tick of an enemy beam to the player if it overlaps the hull
    fn enemy_beam_tick(&mut self, origin: Vec2, angle: f32, half_width: f32, dps: f32, dt: f32) {
        let range = self.arena.beam_range();
        if beam_hits_circle(
            origin,
            angle,
            range,
            half_width,
            self.player.pos,
            self.player.radius,
        ) {
            let amount = self.scaled_damage(dps * dt);
            self.apply_damage_to_player(amount, Some(vec_from_angle(angle)));
        }
    }

    fn run_behavior(&mut self, enemy: &mut Enemy, dt: f32) -> Facing {
        let aim = angle_from_vector(self.player.pos - enemy.pos);
        match &mut enemy.behavior {
            Behavior::None => Facing::Track(ENEMY_DEFAULT_TURN_RATE),
            Behavior::Skirmisher(state) => {
                enemy.pos = self.skirmish(state, enemy.pos, dt);
                enemy.ai_phase += dt * SKIRMISHER_WEAVE_RATE;
                Facing::Track(SKIRMISHER_TURN_RATE)
            }
            Behavior::LaserGrunt(cycle) => {
                if step_beam_cycle(cycle, &LASER_GRUNT_BEAM, aim, &mut self.rng, dt) {
                    let angle = cycle.aim_angle;
                    self.enemy_beam_tick(
                        enemy.pos,
                        angle,
                        LASER_GRUNT_BEAM.half_width,
                        LASER_GRUNT_BEAM.dps,
                        dt,
                    );
                }
                Facing::Track(LASER_GRUNT_TURN_RATE)
            }
            Behavior::DualMiniboss(state) => {
                self.run_dual_miniboss(state, enemy.pos, enemy.damage, aim, dt);
                Facing::Track(ENEMY_DEFAULT_TURN_RATE)
            }
            Behavior::SpinMiniboss(spin) => {
                self.run_spin_miniboss(spin, enemy.pos, aim, dt);
                Facing::Fixed(spin.spin_angle)
            }
            Behavior::MidBoss(boss) => {
                self.run_mid_boss(boss, enemy.pos, enemy.damage, aim, dt);
                Facing::Track(ENEMY_DEFAULT_TURN_RATE)
            }
        }
    }

    /// Back away once the player has stayed inside the stand-off band long enough
    fn skirmish(&self, state: &mut SkirmisherState, pos: Vec2, dt: f32) -> Vec2 {
        let to = self.player.pos - pos;
        let dist = to.length().max(1.0);
        if dist < state.preferred_range - SKIRMISHER_BAND {
            state.reaction_timer += dt;
            if state.reaction_timer >= state.reaction_delay {
                let push = (state.preferred_range - dist) * SKIRMISHER_PUSH;
                return pos - to / dist * push;
            }
        } else {
            state.reaction_timer = (state.reaction_timer - dt).max(0.0);
        }
        pos
    }

    fn run_dual_miniboss(
        &mut self,
        state: &mut DualMinibossState,
        pos: Vec2,
        damage: f32,
        aim: f32,
        dt: f32,
    ) {
        state.turret_timer -= dt;
        if state.turret_timer <= 0.0 {
            state.turret_timer = DUAL_BURST_INTERVAL;
            let dir = vec_from_angle(aim);
            let lateral = Vec2::new(-dir.y, dir.x);
            for offset in [-DUAL_BARREL_OFFSET, DUAL_BARREL_OFFSET] {
                self.enemy_bullets.push(Projectile {
                    side: Side::Enemy,
                    pos: pos + lateral * offset,
                    vel: dir * DUAL_BULLET_SPEED,
                    radius: DUAL_BULLET_RADIUS,
                    damage,
                    life: DUAL_BULLET_LIFE,
                    homing: None,
                    target: None,
                });
            }
        }
        if step_beam_cycle(&mut state.charge, &DUAL_CHARGE_BEAM, aim, &mut self.rng, dt) {
            self.enemy_beam_tick(
                pos,
                state.charge.aim_angle,
                DUAL_CHARGE_BEAM.half_width,
                DUAL_CHARGE_BEAM.dps,
                dt,
            );
        }
    }

    fn run_spin_miniboss(&mut self, spin: &mut SpinState, pos: Vec2, aim: f32, dt: f32) {
        match spin.stage {
            BeamStage::Idle => {
                spin.target_vel = 0.0;
                spin.timer -= dt;
                if spin.timer <= 0.0 {
                    spin.stage = BeamStage::Warning;
                    spin.timer = SPIN_WARNING_TIME;
                    spin.aim_angle = aim;
                    spin.spin_angle = aim;
                    spin.spin_dir = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
                }
            }
            BeamStage::Warning => {
                spin.target_vel = SPIN_WARNING_SPEED * spin.spin_dir;
                spin.timer -= dt;
                // Aim drifts toward the player while charging
                let drift = shortest_angle_diff(spin.aim_angle, aim) * (SPIN_AIM_DRIFT * dt).min(1.0);
                spin.aim_angle = crate::normalize_angle(spin.aim_angle + drift);
                if spin.timer <= 0.0 {
                    spin.stage = BeamStage::Firing;
                    spin.timer = SPIN_FIRING_TIME;
                    spin.spin_angle = spin.aim_angle;
                }
            }
            BeamStage::Firing => {
                spin.target_vel = SPIN_FIRING_SPEED * spin.spin_dir;
                self.enemy_beam_tick(pos, spin.spin_angle, SPIN_BEAM_HALF_WIDTH, SPIN_BEAM_DPS, dt);
                spin.timer -= dt;
                if spin.timer <= 0.0 {
                    spin.stage = BeamStage::Idle;
                    spin.timer = 1.1 + self.rng.random::<f32>() * 0.9;
                }
            }
        }
        spin.angular_vel = approach(spin.angular_vel, spin.target_vel, SPIN_ANGULAR_ACCEL * dt);
        spin.spin_angle = crate::normalize_angle(spin.spin_angle + spin.angular_vel * dt);
    }

    fn run_mid_boss(&mut self, boss: &mut MidBossState, pos: Vec2, damage: f32, aim: f32, dt: f32) {
        boss.warnings.retain_mut(|w| {
            let timer = match w {
                Telegraph::Lane { timer, .. } | Telegraph::Beam { timer, .. } => timer,
            };
            *timer -= dt;
            *timer > 0.0
        });

        for i in 0..boss.beams.len() {
            let beam = boss.beams[i];
            boss.beams[i].timer -= dt;
            self.enemy_beam_tick(pos, beam.angle, beam.width, beam.dps, dt);
        }
        boss.beams.retain(|b| b.timer > 0.0);

        boss.summon_timer -= dt;
        if boss.summon_timer <= 0.0 {
            boss.summon_timer = BOSS_SUMMON_INTERVAL;
            let jitter = (self.rng.random::<f32>() - 0.5) * 2.0 * BOSS_SUMMON_SPREAD;
            let at = clamp_to_arena(
                Vec2::new(pos.x + jitter, pos.y + BOSS_SUMMON_DROP),
                self.arena.width,
                self.arena.height,
            );
            log::debug!("Mid boss summons reinforcements");
            self.spawn_enemy(&SpawnDescriptor {
                type_id: EnemyKind::MidGruntLaser.id().to_string(),
                pos: at,
                delay: 0.0,
            });
        }

        boss.phase_timer += dt;
        let phase = boss.current_phase();
        if boss.phase_data.is_none() {
            boss.phase_data = Some(self.open_boss_phase(phase, aim, &mut boss.warnings));
            if phase != BossPhaseKind::Torp {
                return;
            }
        }

        let MidBossState {
            phase_data,
            warnings,
            beams,
            ..
        } = &mut *boss;
        let Some(data) = phase_data.as_mut() else {
            return;
        };
        let finished = match data {
            BossPhaseData::Torp { fire_timer, shots } => {
                *fire_timer -= dt;
                if *fire_timer <= 0.0 {
                    *fire_timer = BOSS_TORP_INTERVAL;
                    *shots += 1;
                    let dir = vec_from_angle(aim);
                    self.enemy_bullets.push(Projectile {
                        side: Side::Enemy,
                        pos: pos + Vec2::new(0.0, 25.0),
                        vel: dir * BOSS_TORP_SPEED,
                        radius: BOSS_TORP_RADIUS,
                        damage: damage * 1.2,
                        life: BOSS_TORP_LIFE,
                        homing: Some(BOSS_TORP_HOMING),
                        target: None,
                    });
                }
                *shots >= BOSS_TORP_SHOTS
            }
            BossPhaseData::Rain {
                stage,
                timer,
                lane_width,
                lane_count,
                fired,
            } => {
                *timer -= dt;
                match *stage {
                    TelegraphStage::Warning if *timer <= 0.0 => {
                        *stage = TelegraphStage::Active;
                        *timer = BOSS_RAIN_WINDOW;
                        warnings.clear();
                        if !*fired {
                            *fired = true;
                            self.drop_rain(pos, damage, *lane_width, *lane_count);
                        }
                        false
                    }
                    TelegraphStage::Warning => false,
                    TelegraphStage::Active => *timer <= 0.0,
                }
            }
            BossPhaseData::Clamp {
                stage,
                timer,
                angles,
                targets,
                spin_time,
                rotation_speed,
            } => match *stage {
                TelegraphStage::Warning => {
                    *timer -= dt;
                    if *timer <= 0.0 {
                        *stage = TelegraphStage::Active;
                        warnings.clear();
                    }
                    false
                }
                TelegraphStage::Active => {
                    *spin_time -= dt;
                    let range = self.arena.beam_range();
                    beams.clear();
                    for (angle, target) in angles.iter_mut().zip(targets.iter()) {
                        *angle = turn_toward(*angle, *target, *rotation_speed, dt);
                        beams.push(ActiveBeam {
                            angle: *angle,
                            width: BOSS_CLAMP_HALF_WIDTH,
                            range,
                            timer: dt + 0.05,
                            dps: BOSS_CLAMP_DPS,
                        });
                    }
                    let closed = angles
                        .iter()
                        .zip(targets.iter())
                        .all(|(a, t)| shortest_angle_diff(*a, *t).abs() < 0.02);
                    closed && *spin_time <= 0.0
                }
            },
            BossPhaseData::Ultimate {
                stage,
                timer,
                width,
                duration,
                dps,
            } => {
                *timer -= dt;
                match *stage {
                    TelegraphStage::Warning => {
                        self.camera_shake = self.camera_shake.max(0.3);
                        if *timer <= 0.0 {
                            *stage = TelegraphStage::Active;
                            *timer = *duration;
                        }
                        false
                    }
                    TelegraphStage::Active => {
                        // Straight down the arena
                        self.enemy_beam_tick(pos, std::f32::consts::PI, *width, *dps, dt);
                        self.camera_shake = self.camera_shake.max(0.55);
                        *timer <= 0.0
                    }
                }
            }
        };

        if finished {
            log::debug!("Mid boss leaves {:?} phase", phase);
            boss.advance();
        }
    }

    /// Initial data and telegraphs for a boss phase
    fn open_boss_phase(
        &mut self,
        phase: BossPhaseKind,
        aim: f32,
        warnings: &mut Vec<Telegraph>,
    ) -> BossPhaseData {
        match phase {
            BossPhaseKind::Torp => BossPhaseData::Torp {
                fire_timer: BOSS_TORP_FIRST_DELAY,
                shots: 0,
            },
            BossPhaseKind::Rain => {
                let lane_width = self.arena.width / BOSS_RAIN_LANES as f32;
                *warnings = (0..BOSS_RAIN_LANES)
                    .map(|i| Telegraph::Lane {
                        x: i as f32 * lane_width + lane_width * 0.1,
                        width: lane_width * 0.8,
                        timer: BOSS_RAIN_WARNING,
                    })
                    .collect();
                BossPhaseData::Rain {
                    stage: TelegraphStage::Warning,
                    timer: BOSS_RAIN_WARNING,
                    lane_width,
                    lane_count: BOSS_RAIN_LANES,
                    fired: false,
                }
            }
            BossPhaseKind::Clamp => {
                let angles = [aim - BOSS_CLAMP_START_OFFSET, aim + BOSS_CLAMP_START_OFFSET]
                    .map(crate::normalize_angle);
                let targets = [aim - BOSS_CLAMP_END_OFFSET, aim + BOSS_CLAMP_END_OFFSET]
                    .map(crate::normalize_angle);
                let range = self.arena.beam_range();
                *warnings = angles
                    .iter()
                    .map(|&angle| Telegraph::Beam {
                        angle,
                        range,
                        timer: BOSS_CLAMP_WARNING,
                    })
                    .collect();
                BossPhaseData::Clamp {
                    stage: TelegraphStage::Warning,
                    timer: BOSS_CLAMP_WARNING,
                    angles,
                    targets,
                    spin_time: BOSS_CLAMP_SPIN_TIME,
                    rotation_speed: BOSS_CLAMP_ROTATION,
                }
            }
            BossPhaseKind::Ultimate => {
                self.camera_shake = self.camera_shake.max(0.6);
                BossPhaseData::Ultimate {
                    stage: TelegraphStage::Warning,
                    timer: BOSS_ULTIMATE_WARNING,
                    width: BOSS_ULTIMATE_HALF_WIDTH,
                    duration: BOSS_ULTIMATE_DURATION,
                    dps: BOSS_ULTIMATE_DPS,
                }
            }
        }
    }

    /// Stacked falling bullets down each rain lane
    fn drop_rain(&mut self, pos: Vec2, damage: f32, lane_width: f32, lane_count: u32) {
        for lane in 0..lane_count {
            let lane_x = lane as f32 * lane_width + lane_width / 2.0;
            for j in 0..BOSS_RAIN_STACK {
                let jitter = (self.rng.random::<f32>() - 0.5) * lane_width * 0.3;
                self.enemy_bullets.push(Projectile {
                    side: Side::Enemy,
                    pos: Vec2::new(lane_x + jitter, pos.y + 20.0 - j as f32 * BOSS_RAIN_SPACING),
                    vel: Vec2::new(0.0, BOSS_RAIN_SPEED),
                    radius: 4.0,
                    damage: damage * 0.9,
                    life: 5.0,
                    homing: None,
                    target: None,
                });
            }
        }
    }
}
