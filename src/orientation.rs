//! # Rotation
//!
//! A screen rotation is one of four clockwise steps. The orientation mode
//! is derived from it and is the key cached layouts are stored under, so
//! 0/180 share one restore command and 90/270 share the other.

use crate::error::{Error, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rotation {
    None,
    Clockwise90,
    Clockwise180,
    Clockwise270,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OrientationMode {
    Landscape,
    Portrait,
}

impl Rotation {
    /// Convert to clockwise degrees.
    pub fn to_degrees(&self) -> isize {
        match *self {
            Self::None => 0,
            Self::Clockwise90 => 90,
            Self::Clockwise180 => 180,
            Self::Clockwise270 => 270,
        }
    }

    /// Attempt conversion from degrees to rotation.
    /// Positive value is clockwise, negative is counter clockwise.
    pub fn from_degrees(cw_degrees: isize) -> Result<Self> {
        match cw_degrees % 360 {
            0 => Ok(Self::None),
            90 | -270 => Ok(Self::Clockwise90),
            180 | -180 => Ok(Self::Clockwise180),
            270 | -90 => Ok(Self::Clockwise270),
            other => Err(Error::InvalidDegrees(other)),
        }
    }

    pub fn mode(&self) -> OrientationMode {
        OrientationMode::from(*self)
    }

    /// The rotation a toggle request asks for when the screen is at `self`.
    ///
    /// Only an unrotated screen goes to 90; 90, 180 and 270 all go back to 0.
    pub fn toggled(&self) -> Rotation {
        match *self {
            Self::None => Self::Clockwise90,
            _ => Self::None,
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_degrees())
    }
}

impl From<Rotation> for OrientationMode {
    fn from(rot: Rotation) -> Self {
        match rot {
            Rotation::Clockwise90 | Rotation::Clockwise270 => OrientationMode::Portrait,
            Rotation::None | Rotation::Clockwise180 => OrientationMode::Landscape,
        }
    }
}

impl std::fmt::Display for OrientationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrientationMode::Landscape => f.write_str("landscape"),
            OrientationMode::Portrait => f.write_str("portrait"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_to_degrees() -> Result<()> {
        assert_eq!(Rotation::None.to_degrees(), 0);
        assert_eq!(Rotation::Clockwise90.to_degrees(), 90);
        assert_eq!(Rotation::Clockwise180.to_degrees(), 180);
        assert_eq!(Rotation::Clockwise270.to_degrees(), 270);
        Ok(())
    }

    #[test]
    fn degrees_to_rotation() -> Result<()> {
        assert_eq!(Rotation::from_degrees(0)?, Rotation::None);
        assert_eq!(Rotation::from_degrees(90)?, Rotation::Clockwise90);
        assert_eq!(Rotation::from_degrees(180)?, Rotation::Clockwise180);
        assert_eq!(Rotation::from_degrees(270)?, Rotation::Clockwise270);
        assert_eq!(Rotation::from_degrees(360)?, Rotation::None);

        // Counter-clockwise degrees.
        assert_eq!(Rotation::from_degrees(-90)?, Rotation::Clockwise270);
        assert_eq!(Rotation::from_degrees(-270)?, Rotation::Clockwise90);

        assert!(Rotation::from_degrees(42).is_err());
        Ok(())
    }

    #[test]
    fn portrait_iff_quarter_turn() -> Result<()> {
        for degrees in [0, 90, 180, 270] {
            let expected = if degrees == 90 || degrees == 270 {
                OrientationMode::Portrait
            } else {
                OrientationMode::Landscape
            };
            assert_eq!(Rotation::from_degrees(degrees)?.mode(), expected);
        }
        Ok(())
    }

    #[test]
    fn toggle_targets() {
        assert_eq!(Rotation::None.toggled(), Rotation::Clockwise90);
        assert_eq!(Rotation::Clockwise90.toggled(), Rotation::None);
        assert_eq!(Rotation::Clockwise180.toggled(), Rotation::None);
        assert_eq!(Rotation::Clockwise270.toggled(), Rotation::None);
    }

    #[test]
    fn mode_names() {
        assert_eq!(OrientationMode::Landscape.to_string(), "landscape");
        assert_eq!(OrientationMode::Portrait.to_string(), "portrait");
    }
}
