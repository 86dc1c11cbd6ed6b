//! Joint names and their servo channels
//!
//! A joint is named `{side}{leg}{joint}`, e.g. `R31` is the first joint of
//! the right-hand third leg. Channels are ordered by leg descending, then
//! right side before left, then joint ascending:
//!
//! ```text
//! channel  0..=5   R31 R32 R33 L31 L32 L33
//! channel  6..=11  R21 R22 R23 L21 L22 L23
//! channel 12..=17  R11 R12 R13 L11 L12 L13
//! ```

use core::fmt;

use crate::traits::ServoChannel;

/// Legs per side
pub const LEGS_PER_SIDE: u8 = 3;

/// Joints per leg
pub const JOINTS_PER_LEG: u8 = 3;

/// Body side of a leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Side {
    Right,
    Left,
}

impl Side {
    fn letter(self) -> char {
        match self {
            Side::Right => 'R',
            Side::Left => 'L',
        }
    }
}

/// Why a joint name could not be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JointNameError {
    /// Not exactly three characters
    Length,
    /// First character is not `R` or `L`
    Side,
    /// Leg digit outside 1..=3
    Leg,
    /// Joint digit outside 1..=3
    Joint,
}

impl fmt::Display for JointNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JointNameError::Length => f.write_str("expected three characters"),
            JointNameError::Side => f.write_str("side must be R or L"),
            JointNameError::Leg => f.write_str("leg must be 1, 2 or 3"),
            JointNameError::Joint => f.write_str("joint must be 1, 2 or 3"),
        }
    }
}

/// One named joint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JointName {
    pub side: Side,
    /// Leg number, 1..=3
    pub leg: u8,
    /// Joint number along the leg, 1..=3
    pub joint: u8,
}

impl JointName {
    pub fn parse(name: &str) -> Result<Self, JointNameError> {
        let [side, leg, joint] = name.as_bytes() else {
            return Err(JointNameError::Length);
        };

        let side = match side {
            b'R' => Side::Right,
            b'L' => Side::Left,
            _ => return Err(JointNameError::Side),
        };
        let leg = digit(*leg, LEGS_PER_SIDE).ok_or(JointNameError::Leg)?;
        let joint = digit(*joint, JOINTS_PER_LEG).ok_or(JointNameError::Joint)?;

        Ok(Self { side, leg, joint })
    }

    /// Servo channel driving this joint
    pub fn channel(&self) -> ServoChannel {
        let per_leg_pair = 2 * JOINTS_PER_LEG;
        let side_offset = match self.side {
            Side::Right => 0,
            Side::Left => JOINTS_PER_LEG,
        };
        let index = (LEGS_PER_SIDE - self.leg) * per_leg_pair + side_offset + (self.joint - 1);
        ServoChannel::wrapping(index)
    }

    /// Joint driven by `channel`
    pub fn from_channel(channel: ServoChannel) -> Self {
        let index = channel.raw();
        let per_leg_pair = 2 * JOINTS_PER_LEG;
        let leg = LEGS_PER_SIDE - index / per_leg_pair;
        let within = index % per_leg_pair;
        let side = if within < JOINTS_PER_LEG {
            Side::Right
        } else {
            Side::Left
        };
        Self {
            side,
            leg,
            joint: within % JOINTS_PER_LEG + 1,
        }
    }
}

fn digit(byte: u8, max: u8) -> Option<u8> {
    let value = byte.checked_sub(b'0')?;
    (1..=max).contains(&value).then_some(value)
}

impl fmt::Display for JointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.side.letter(), self.leg, self.joint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            JointName::parse("L23"),
            Ok(JointName {
                side: Side::Left,
                leg: 2,
                joint: 3
            })
        );
        assert_eq!(JointName::parse("R3"), Err(JointNameError::Length));
        assert_eq!(JointName::parse("X11"), Err(JointNameError::Side));
        assert_eq!(JointName::parse("R41"), Err(JointNameError::Leg));
        assert_eq!(JointName::parse("R10"), Err(JointNameError::Joint));
    }

    #[test]
    fn test_channel_order() {
        let order = [
            "R31", "R32", "R33", "L31", "L32", "L33", "R21", "R22", "R23", "L21", "L22", "L23",
            "R11", "R12", "R13", "L11", "L12", "L13",
        ];
        for (index, name) in order.iter().enumerate() {
            let joint = JointName::parse(name).unwrap();
            assert_eq!(joint.channel().index(), index, "{name}");
        }
    }

    #[test]
    fn test_from_channel_inverts_channel() {
        for channel in ServoChannel::all() {
            assert_eq!(JointName::from_channel(channel).channel(), channel);
        }
    }
}
