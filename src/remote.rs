//! Remote player records exchanged with the network layer
//!
//! The core never trusts these for simulation: a snapshot is only shown as a
//! ghost ship. Malformed records degrade to "no remote player".

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{PLAYER_BASE_MOVE_SPEED, PLAYER_RADIUS};
use crate::settings::Arena;
use crate::sim::Player;
use crate::vec_from_angle;

const NICKNAME_MAX_CHARS: usize = 24;
const GHOST_TURN_SPEED: f32 = 3.0;
const GHOST_BACKWARD_THRUST: f32 = 0.6;
const GHOST_MARGIN: f32 = 20.0;

/// Periodic state snapshot of one ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub hp: f32,
    #[serde(default)]
    pub shield: f32,
    #[serde(default = "default_radius")]
    pub radius: f32,
    #[serde(default)]
    pub nickname: String,
}

fn default_radius() -> f32 {
    PLAYER_RADIUS
}

impl PlayerSnapshot {
    /// Outgoing snapshot of the local ship
    pub fn capture(player: &Player, nickname: &str) -> Self {
        Self {
            x: player.pos.x,
            y: player.pos.y,
            angle: player.angle,
            hp: player.hull,
            shield: player.shield.total(),
            radius: player.radius,
            nickname: nickname.to_string(),
        }
    }

    /// Parse a snapshot received from a peer
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(json) {
            Ok(snapshot) => snapshot.sanitized(),
            Err(e) => {
                log::debug!("Dropping malformed remote snapshot: {e}");
                None
            }
        }
    }

    /// Reject non-finite positions and clamp everything else into range
    pub fn sanitized(mut self) -> Option<Self> {
        if !(self.x.is_finite() && self.y.is_finite()) {
            return None;
        }
        self.angle = crate::normalize_angle(self.angle);
        self.hp = if self.hp.is_finite() { self.hp.max(0.0) } else { 0.0 };
        self.shield = if self.shield.is_finite() {
            self.shield.max(0.0)
        } else {
            0.0
        };
        if !(self.radius.is_finite() && self.radius > 0.0) {
            self.radius = PLAYER_RADIUS;
        }
        let name = self.nickname.trim();
        self.nickname = name.chars().take(NICKNAME_MAX_CHARS).collect();
        Some(self)
    }

    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Fast unreliable input record sent by a client
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteInput {
    pub thrust_forward: bool,
    pub thrust_backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    /// Heading of the directional intent, if any
    pub move_angle: Option<f32>,
}

/// Host-side stand-in for a remote ship, driven by its input records
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteGhost {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub hp: f32,
    pub nickname: String,
}

impl RemoteGhost {
    pub fn new(pos: Vec2, nickname: &str) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            hp: crate::consts::PLAYER_MAX_HULL,
            nickname: nickname.to_string(),
        }
    }

    /// Simple kinematic step: no inertia, turning and thrust straight from input
    pub fn integrate(&mut self, input: &RemoteInput, arena: &Arena, dt: f32) {
        if input.turn_left {
            self.angle -= GHOST_TURN_SPEED * dt;
        }
        if input.turn_right {
            self.angle += GHOST_TURN_SPEED * dt;
        }
        self.angle = crate::normalize_angle(self.angle);

        let mut thrust = 0.0;
        if input.thrust_forward {
            thrust += 1.0;
        }
        if input.thrust_backward {
            thrust -= GHOST_BACKWARD_THRUST;
        }
        let heading = input
            .move_angle
            .filter(|a| a.is_finite())
            .unwrap_or(self.angle);
        self.vel = vec_from_angle(heading) * PLAYER_BASE_MOVE_SPEED * thrust;
        self.pos += self.vel * dt;

        let m = GHOST_MARGIN;
        self.pos.x = self.pos.x.clamp(m, (arena.width - m).max(m));
        self.pos.y = self.pos.y.clamp(m, (arena.height - m).max(m));
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            x: self.pos.x,
            y: self.pos.y,
            angle: self.angle,
            hp: self.hp,
            shield: 0.0,
            radius: PLAYER_RADIUS,
            nickname: self.nickname.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::GameState;

    #[test]
    fn test_capture_local_player() {
        let state = GameState::new(&Settings::default());
        let snap = PlayerSnapshot::capture(&state.player, "ace");
        assert_eq!(snap.pos(), state.player.pos);
        assert_eq!(snap.hp, 100.0);
        assert_eq!(snap.shield, 120.0);
        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(PlayerSnapshot::from_json(&json), Some(snap));
    }

    #[test]
    fn test_malformed_snapshot_is_dropped() {
        assert!(PlayerSnapshot::from_json("{not json").is_none());
        assert!(PlayerSnapshot::from_json(r#"{"x":1.0,"angle":0.0,"hp":5.0}"#).is_none());
    }

    #[test]
    fn test_sanitize_clamps_fields() {
        let snap = PlayerSnapshot {
            x: 10.0,
            y: 20.0,
            angle: 7.0,
            hp: -3.0,
            shield: f32::NAN,
            radius: 0.0,
            nickname: "  a very long nickname that keeps going  ".into(),
        }
        .sanitized()
        .unwrap();
        assert!(snap.angle < std::f32::consts::PI);
        assert_eq!(snap.hp, 0.0);
        assert_eq!(snap.shield, 0.0);
        assert_eq!(snap.radius, PLAYER_RADIUS);
        assert_eq!(snap.nickname.chars().count(), NICKNAME_MAX_CHARS);

        let bad = PlayerSnapshot {
            x: f32::INFINITY,
            ..snap
        };
        assert!(bad.sanitized().is_none());
    }

    #[test]
    fn test_set_remote_player_display_only() {
        let mut state = GameState::new(&Settings::default());
        let before = state.player.pos;
        state.set_remote_player(PlayerSnapshot::from_json(
            r#"{"x":100,"y":200,"angle":0.5,"hp":80,"nickname":"wing"}"#,
        ));
        let remote = state.remote.as_ref().unwrap();
        assert_eq!(remote.nickname, "wing");
        assert_eq!(remote.radius, PLAYER_RADIUS);
        assert_eq!(state.player.pos, before);

        state.set_remote_player(PlayerSnapshot::from_json("null"));
        assert!(state.remote.is_none());
    }

    #[test]
    fn test_remote_input_camel_case() {
        let input: RemoteInput =
            serde_json::from_str(r#"{"thrustForward":true,"moveAngle":null}"#).unwrap();
        assert!(input.thrust_forward);
        assert!(!input.turn_left);
        assert_eq!(input.move_angle, None);
    }

    #[test]
    fn test_ghost_moves_and_clamps() {
        let arena = Arena::default();
        let mut ghost = RemoteGhost::new(Vec2::new(640.0, 360.0), "wing");
        let forward = RemoteInput {
            thrust_forward: true,
            ..Default::default()
        };
        ghost.integrate(&forward, &arena, 0.5);
        // Heading 0 flies up the screen
        assert!((ghost.pos.y - (360.0 - 140.0)).abs() < 1e-3);

        let back = RemoteInput {
            thrust_backward: true,
            ..Default::default()
        };
        ghost.integrate(&back, &arena, 0.5);
        assert!((ghost.pos.y - (220.0 + 84.0)).abs() < 1e-3);

        for _ in 0..20 {
            ghost.integrate(&forward, &arena, 0.5);
        }
        assert_eq!(ghost.pos.y, GHOST_MARGIN);
        assert_eq!(ghost.snapshot().y, GHOST_MARGIN);
    }

    #[test]
    fn test_ghost_turns_and_follows_move_angle() {
        let arena = Arena::default();
        let mut ghost = RemoteGhost::new(Vec2::new(640.0, 360.0), "");
        ghost.integrate(
            &RemoteInput {
                turn_right: true,
                ..Default::default()
            },
            &arena,
            0.1,
        );
        assert!((ghost.angle - 0.3).abs() < 1e-5);
        assert_eq!(ghost.vel, Vec2::ZERO);

        ghost.integrate(
            &RemoteInput {
                thrust_forward: true,
                move_angle: Some(std::f32::consts::FRAC_PI_2),
                ..Default::default()
            },
            &arena,
            0.1,
        );
        assert!(ghost.vel.x > 279.0);
    }
}
