//! Driving personality presets.
//!
//! Three aggressiveness profiles selectable from the HUD. The stored value is
//! the integer index under the `LongitudinalPersonality` key.
//!
//! - [`Personality::Aggressive`]: shortest following distance
//! - [`Personality::Standard`]: default
//! - [`Personality::Relaxed`]: longest following distance

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Hash)]
pub enum Personality {
    Aggressive,
    #[default]
    Standard,
    Relaxed,
}

impl Personality {
    pub const ALL: [Self; 3] = [Self::Aggressive, Self::Standard, Self::Relaxed];

    /// Map a stored index onto a profile, clamping out-of-range values.
    #[inline]
    pub const fn from_index(index: i32) -> Self {
        match index {
            i32::MIN..=0 => Self::Aggressive,
            1 => Self::Standard,
            _ => Self::Relaxed,
        }
    }

    #[inline]
    pub const fn index(self) -> i32 {
        match self {
            Self::Aggressive => 0,
            Self::Standard => 1,
            Self::Relaxed => 2,
        }
    }

    /// Next profile, wrapping after [`Self::Relaxed`].
    #[inline]
    pub const fn next(self) -> Self {
        match self {
            Self::Aggressive => Self::Standard,
            Self::Standard => Self::Relaxed,
            Self::Relaxed => Self::Aggressive,
        }
    }

    /// Name shown on the badge after a change.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aggressive => "Aggressive",
            Self::Standard => "Standard",
            Self::Relaxed => "Relaxed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_personality_default() {
        assert_eq!(Personality::default(), Personality::Standard);
    }

    #[test]
    fn test_personality_next_cycle() {
        let p = Personality::Aggressive;
        let p = p.next(); // -> Standard
        let p = p.next(); // -> Relaxed
        let p = p.next(); // -> Aggressive
        assert_eq!(p, Personality::Aggressive);
    }

    #[test]
    fn test_personality_next_is_plus_one_mod_three() {
        for p in Personality::ALL {
            assert_eq!(p.next().index(), (p.index() + 1) % 3);
        }
    }

    #[test]
    fn test_personality_from_index_clamps() {
        assert_eq!(Personality::from_index(-4), Personality::Aggressive);
        assert_eq!(Personality::from_index(1), Personality::Standard);
        assert_eq!(Personality::from_index(7), Personality::Relaxed);
    }
}
