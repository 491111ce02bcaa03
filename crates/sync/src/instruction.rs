use std::fmt;
use std::str::FromStr;

use glam::DVec3;

use crate::geometry::{self, AxisAngle};
use crate::viewpoint::ViewPoint;

/// A single camera command. `Move` is expressed in camera-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    Move(DVec3),
    Turn(f64),
    Pitch(f64),
}

impl Instruction {
    pub fn translate(dx: f64, dy: f64, dz: f64) -> Self {
        Self::Move(DVec3::new(dx, dy, dz))
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Self::Move(delta) => delta.is_finite(),
            Self::Turn(angle) | Self::Pitch(angle) => angle.is_finite(),
        }
    }

    pub fn apply(&self, vp: &mut ViewPoint) {
        log::debug!("{self}");
        match *self {
            Self::Move(delta) => {
                // Camera looks down -Z
                let local = DVec3::new(delta.x, delta.y, -delta.z);
                let m = geometry::axis_angle_to_matrix(vp.orientation());
                let position = geometry::add(vp.position(), geometry::rotate(local, &m));
                vp.update(position, vp.orientation());
            }
            Self::Turn(angle) => {
                let yaw = AxisAngle::new(DVec3::Y, -angle);
                let orientation = geometry::compose_axis_angle(yaw, vp.orientation());
                vp.update(vp.position(), orientation);
            }
            Self::Pitch(angle) => {
                let pitch = AxisAngle::new(DVec3::X, -angle);
                let orientation = geometry::compose_axis_angle(vp.orientation(), pitch);
                vp.update(vp.position(), orientation);
            }
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(d) => write!(f, "MOVE({},{},{})", d.x, d.y, d.z),
            Self::Turn(angle) => write!(f, "TURN({angle})"),
            Self::Pitch(angle) => write!(f, "PITCH({angle})"),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseInstructionError {
    #[error("unknown instruction `{0}`")]
    UnknownKind(String),
    #[error("`{kind}` takes {expected} argument(s), got {found}")]
    Arity {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid number `{0}`")]
    Number(String),
}

/// Parses `move:x,y,z`, `turn:a` and `pitch:a` (case-insensitive).
impl FromStr for Instruction {
    type Err = ParseInstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, args) = s.split_once(':').unwrap_or((s, ""));
        let args = args
            .split(',')
            .filter(|a| !a.trim().is_empty())
            .map(|a| {
                a.trim()
                    .parse::<f64>()
                    .map_err(|_| ParseInstructionError::Number(a.trim().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let check_arity = |kind: &'static str, expected: usize| {
            if args.len() == expected {
                Ok(())
            } else {
                Err(ParseInstructionError::Arity {
                    kind,
                    expected,
                    found: args.len(),
                })
            }
        };

        match kind.trim().to_ascii_lowercase().as_str() {
            "move" => {
                check_arity("move", 3)?;
                Ok(Self::translate(args[0], args[1], args[2]))
            }
            "turn" => {
                check_arity("turn", 1)?;
                Ok(Self::Turn(args[0]))
            }
            "pitch" => {
                check_arity("pitch", 1)?;
                Ok(Self::Pitch(args[0]))
            }
            other => Err(ParseInstructionError::UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    fn assert_orientation_close(a: AxisAngle, b: AxisAngle) {
        assert!((a.axis - b.axis).length() < 1e-9, "{:?} != {:?}", a, b);
        assert!((a.angle - b.angle).abs() < 1e-9, "{:?} != {:?}", a, b);
    }

    #[test]
    fn forward_move_inverts_z() {
        let mut vp = ViewPoint::new(DVec3::ZERO, AxisAngle::IDENTITY);
        Instruction::translate(0.0, 0.0, 1.0).apply(&mut vp);

        assert_eq!(vp.position(), DVec3::new(0.0, 0.0, -1.0));
        assert_eq!(vp.orientation(), AxisAngle::IDENTITY);
    }

    #[test]
    fn move_follows_orientation() {
        let mut vp = ViewPoint::new(DVec3::new(1.0, 2.0, 3.0), AxisAngle::IDENTITY);
        Instruction::Turn(FRAC_PI_2).apply(&mut vp);
        Instruction::translate(0.0, 0.0, 1.0).apply(&mut vp);

        assert!((vp.position() - DVec3::new(2.0, 2.0, 3.0)).length() < 1e-12);
    }

    #[test]
    fn turn_keeps_position() {
        let mut vp = ViewPoint::new(DVec3::new(4.0, 5.0, 6.0), AxisAngle::IDENTITY);
        Instruction::Turn(0.3).apply(&mut vp);

        assert_eq!(vp.position(), DVec3::new(4.0, 5.0, 6.0));
        assert_orientation_close(vp.orientation(), AxisAngle::new(DVec3::NEG_Y, 0.3));
    }

    #[test]
    fn turn_round_trip() {
        let start = AxisAngle::new(DVec3::X, 0.5);
        let mut vp = ViewPoint::new(DVec3::ZERO, start);

        Instruction::Turn(0.7).apply(&mut vp);
        Instruction::Turn(-0.7).apply(&mut vp);

        assert_orientation_close(vp.orientation(), start);
    }

    #[test]
    fn pitch_round_trip() {
        let start = AxisAngle::new(DVec3::new(0.0, 0.6, 0.8), 1.2);
        let mut vp = ViewPoint::new(DVec3::ZERO, start);

        Instruction::Pitch(0.4).apply(&mut vp);
        Instruction::Pitch(-0.4).apply(&mut vp);

        assert_orientation_close(vp.orientation(), start);
    }

    #[test]
    fn pitch_is_local_and_turn_is_global() {
        let yawed = AxisAngle::new(DVec3::Y, 0.9);

        let mut turned = ViewPoint::new(DVec3::ZERO, yawed);
        Instruction::Turn(0.4).apply(&mut turned);
        let mut pitched = ViewPoint::new(DVec3::ZERO, yawed);
        Instruction::Pitch(0.4).apply(&mut pitched);

        let turn_expected = geometry::compose_axis_angle(AxisAngle::new(DVec3::Y, -0.4), yawed);
        let pitch_expected = geometry::compose_axis_angle(yawed, AxisAngle::new(DVec3::X, -0.4));
        assert_orientation_close(turned.orientation(), turn_expected);
        assert_orientation_close(pitched.orientation(), pitch_expected);
    }

    #[test]
    fn repeated_move_does_not_mutate_instruction() {
        let mut vp = ViewPoint::default();
        let forward = Instruction::translate(0.0, 0.0, 1.0);
        forward.apply(&mut vp);
        forward.apply(&mut vp);

        assert_eq!(vp.position(), DVec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn display_format() {
        assert_eq!(Instruction::translate(1.0, 0.0, -2.5).to_string(), "MOVE(1,0,-2.5)");
        assert_eq!(Instruction::Turn(1.57).to_string(), "TURN(1.57)");
        assert_eq!(Instruction::Pitch(-0.5).to_string(), "PITCH(-0.5)");
    }

    #[test]
    fn parse_words() {
        assert_eq!("move:1,0,0".parse::<Instruction>(), Ok(Instruction::translate(1.0, 0.0, 0.0)));
        assert_eq!("TURN:1.57".parse::<Instruction>(), Ok(Instruction::Turn(1.57)));
        assert_eq!("pitch:-0.2".parse::<Instruction>(), Ok(Instruction::Pitch(-0.2)));
        assert_eq!(
            "move:1,2".parse::<Instruction>(),
            Err(ParseInstructionError::Arity {
                kind: "move",
                expected: 3,
                found: 2
            })
        );
        assert!(matches!(
            "roll:1".parse::<Instruction>(),
            Err(ParseInstructionError::UnknownKind(_))
        ));
        assert!(matches!(
            "turn:abc".parse::<Instruction>(),
            Err(ParseInstructionError::Number(_))
        ));
    }
}
