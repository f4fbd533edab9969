#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

use crate::parser::ParseFieldError;

/// Represents contig orientation/strand
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub enum Orientation {
    Forward,
    Backward,
}

impl Orientation {
    /// Parse an orientation from a single-element, where + is
    /// Forward, - is Backward
    #[inline]
    pub fn from_bytes_plus_minus<T: AsRef<[u8]>>(bs: T) -> Option<Self> {
        match bs.as_ref() {
            b"+" => Some(Orientation::Forward),
            b"-" => Some(Orientation::Backward),
            _ => None,
        }
    }

    #[inline]
    pub fn plus_minus_as_byte(&self) -> u8 {
        match self {
            Self::Forward => b'+',
            Self::Backward => b'-',
        }
    }

    #[inline]
    pub fn flip(&self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// The default parser uses + as Forward, - as Backward
impl std::str::FromStr for Orientation {
    type Err = &'static str;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Orientation::from_bytes_plus_minus(s.as_bytes())
            .ok_or("Could not parse orientation (was not + or -)")
    }
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", char::from(self.plus_minus_as_byte()))
    }
}

/// A contig name together with the strand it is read on, written as
/// the name immediately followed by `+` or `-`, e.g. `188266-5+`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct OrientedContig {
    pub contig: String,
    pub orient: Orientation,
}

impl OrientedContig {
    pub fn new<S: Into<String>>(contig: S, orient: Orientation) -> Self {
        OrientedContig {
            contig: contig.into(),
            orient,
        }
    }

    /// Split a token into the contig name and its trailing
    /// orientation character. Tokens without an orientation suffix,
    /// or with nothing in front of it, are rejected.
    pub fn parse(token: &str) -> Result<Self, ParseFieldError> {
        let (name, orient) =
            split_orientation(token).ok_or(ParseFieldError::OrientationError)?;
        if name.is_empty() {
            return Err(ParseFieldError::InvalidField("oriented contig"));
        }
        Ok(OrientedContig::new(name, orient))
    }

    /// The same contig read on the opposite strand. Reversing twice
    /// yields the original token.
    #[inline]
    pub fn reverse(&self) -> Self {
        OrientedContig {
            contig: self.contig.clone(),
            orient: self.orient.flip(),
        }
    }
}

impl std::str::FromStr for OrientedContig {
    type Err = ParseFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrientedContig::parse(s)
    }
}

impl std::fmt::Display for OrientedContig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.contig, self.orient)
    }
}

/// Split off the trailing `+` or `-` of a token
fn split_orientation(token: &str) -> Option<(&str, Orientation)> {
    if let Some(name) = token.strip_suffix('+') {
        Some((name, Orientation::Forward))
    } else {
        token
            .strip_suffix('-')
            .map(|name| (name, Orientation::Backward))
    }
}

/// Reverse-complement a vertex name of the form `<contig><+|->`.
///
/// Returns `None` if the name does not end in an orientation
/// character.
pub fn reverse_name(name: &str) -> Option<String> {
    let (contig, orient) = split_orientation(name)?;
    let mut reversed = String::with_capacity(name.len());
    reversed.push_str(contig);
    reversed.push(char::from(orient.flip().plus_minus_as_byte()));
    Some(reversed)
}
