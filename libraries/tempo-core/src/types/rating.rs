//! User ratings attached to the current media item

use serde::{Deserialize, Serialize};

/// Rating style understood by the platform media session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RatingStyle {
    None,
    Heart,
    ThumbUpDown,
    ThreeStars,
    FourStars,
    FiveStars,
    Percentage,
}

impl RatingStyle {
    /// Every variant in id order
    pub const ALL: [RatingStyle; 7] = [
        Self::None,
        Self::Heart,
        Self::ThumbUpDown,
        Self::ThreeStars,
        Self::FourStars,
        Self::FiveStars,
        Self::Percentage,
    ];

    /// Stable wire id
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Heart => 1,
            Self::ThumbUpDown => 2,
            Self::ThreeStars => 3,
            Self::FourStars => 4,
            Self::FiveStars => 5,
            Self::Percentage => 6,
        }
    }

    /// Look up by wire id
    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.id() == id)
    }

    /// Maximum star count for star styles
    pub fn max_stars(self) -> Option<u8> {
        match self {
            Self::ThreeStars => Some(3),
            Self::FourStars => Some(4),
            Self::FiveStars => Some(5),
            _ => None,
        }
    }
}

/// A rating value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "style", content = "value", rename_all = "camelCase")]
pub enum Rating {
    /// No value set yet for the given style
    Unrated(RatingStyle),

    /// Heart on/off
    Heart(bool),

    /// Thumb up (`true`) or down (`false`)
    ThumbUpDown(bool),

    /// Star rating within a three, four or five star scale
    Stars { style: RatingStyle, stars: u8 },

    /// Percentage in `0.0..=100.0`
    Percentage(f32),
}

impl Rating {
    /// Style of this rating
    pub fn style(&self) -> RatingStyle {
        match self {
            Self::Unrated(style) | Self::Stars { style, .. } => *style,
            Self::Heart(_) => RatingStyle::Heart,
            Self::ThumbUpDown(_) => RatingStyle::ThumbUpDown,
            Self::Percentage(_) => RatingStyle::Percentage,
        }
    }

    /// Whether a value is present
    pub fn is_rated(&self) -> bool {
        !matches!(self, Self::Unrated(_))
    }

    /// Check the value lies inside its style's range
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            Self::Stars { style, stars } => match style.max_stars() {
                Some(max) if stars <= max => Ok(()),
                Some(max) => Err(format!("{stars} stars exceeds the {max}-star scale")),
                None => Err(format!("{style:?} is not a star rating style")),
            },
            Self::Percentage(value) if !(0.0..=100.0).contains(&value) => {
                Err(format!("percentage rating {value} outside 0..=100"))
            }
            _ => Ok(()),
        }
    }
}
