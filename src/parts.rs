//! BodyPix part labels
//!
//! The extraction pipeline treats labels as opaque integers. This table
//! gives the 24 BodyPix labels names and the rainbow palette used when
//! rendering a part mask.

use crate::error::{PartCropError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of labels produced by BodyPix part segmentation
pub const PART_COUNT: usize = 24;

/// A BodyPix body part; the discriminant is the mask label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    LeftFace = 0,
    RightFace = 1,
    LeftUpperArmFront = 2,
    LeftUpperArmBack = 3,
    RightUpperArmFront = 4,
    RightUpperArmBack = 5,
    LeftLowerArmFront = 6,
    LeftLowerArmBack = 7,
    RightLowerArmFront = 8,
    RightLowerArmBack = 9,
    LeftHand = 10,
    RightHand = 11,
    TorsoFront = 12,
    TorsoBack = 13,
    LeftUpperLegFront = 14,
    LeftUpperLegBack = 15,
    RightUpperLegFront = 16,
    RightUpperLegBack = 17,
    LeftLowerLegFront = 18,
    LeftLowerLegBack = 19,
    RightLowerLegFront = 20,
    RightLowerLegBack = 21,
    LeftFoot = 22,
    RightFoot = 23,
}

impl BodyPart {
    /// All parts in label order
    pub const ALL: [BodyPart; PART_COUNT] = [
        Self::LeftFace,
        Self::RightFace,
        Self::LeftUpperArmFront,
        Self::LeftUpperArmBack,
        Self::RightUpperArmFront,
        Self::RightUpperArmBack,
        Self::LeftLowerArmFront,
        Self::LeftLowerArmBack,
        Self::RightLowerArmFront,
        Self::RightLowerArmBack,
        Self::LeftHand,
        Self::RightHand,
        Self::TorsoFront,
        Self::TorsoBack,
        Self::LeftUpperLegFront,
        Self::LeftUpperLegBack,
        Self::RightUpperLegFront,
        Self::RightUpperLegBack,
        Self::LeftLowerLegFront,
        Self::LeftLowerLegBack,
        Self::RightLowerLegFront,
        Self::RightLowerLegBack,
        Self::LeftFoot,
        Self::RightFoot,
    ];

    #[must_use]
    pub fn label(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub fn from_label(label: u32) -> Option<Self> {
        usize::try_from(label)
            .ok()
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }

    /// Canonical BodyPix name, e.g. `left_upper_arm_front`
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::LeftFace => "left_face",
            Self::RightFace => "right_face",
            Self::LeftUpperArmFront => "left_upper_arm_front",
            Self::LeftUpperArmBack => "left_upper_arm_back",
            Self::RightUpperArmFront => "right_upper_arm_front",
            Self::RightUpperArmBack => "right_upper_arm_back",
            Self::LeftLowerArmFront => "left_lower_arm_front",
            Self::LeftLowerArmBack => "left_lower_arm_back",
            Self::RightLowerArmFront => "right_lower_arm_front",
            Self::RightLowerArmBack => "right_lower_arm_back",
            Self::LeftHand => "left_hand",
            Self::RightHand => "right_hand",
            Self::TorsoFront => "torso_front",
            Self::TorsoBack => "torso_back",
            Self::LeftUpperLegFront => "left_upper_leg_front",
            Self::LeftUpperLegBack => "left_upper_leg_back",
            Self::RightUpperLegFront => "right_upper_leg_front",
            Self::RightUpperLegBack => "right_upper_leg_back",
            Self::LeftLowerLegFront => "left_lower_leg_front",
            Self::LeftLowerLegBack => "left_lower_leg_back",
            Self::RightLowerLegFront => "right_lower_leg_front",
            Self::RightLowerLegBack => "right_lower_leg_back",
            Self::LeftFoot => "left_feet",
            Self::RightFoot => "right_feet",
        }
    }

    /// Rainbow palette color for this part
    #[must_use]
    pub fn rainbow_color(self) -> [u8; 3] {
        RAINBOW_PART_COLORS
            .get(self as usize)
            .copied()
            .unwrap_or([0, 0, 0])
    }
}

impl std::fmt::Display for BodyPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BodyPart {
    type Err = PartCropError;

    /// Accepts canonical names, `-` in place of `_`, any case, and `foot` for `feet`
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let normalized = normalized.strip_suffix("_foot").map_or(normalized.clone(), |prefix| {
            format!("{}_feet", prefix)
        });

        Self::ALL
            .iter()
            .copied()
            .find(|part| part.name() == normalized)
            .ok_or_else(|| PartCropError::invalid_config(format!("Unknown body part '{}'", s)))
    }
}

/// Resolve a label given either as an integer or a part name
pub fn parse_label(input: &str) -> Result<u32> {
    match input.trim().parse::<u32>() {
        Ok(label) => Ok(label),
        Err(_) => input.parse::<BodyPart>().map(BodyPart::label),
    }
}

/// Rainbow color for a raw label, `None` for labels outside the part table
#[must_use]
pub fn rainbow_color(label: u32) -> Option<[u8; 3]> {
    BodyPart::from_label(label).map(BodyPart::rainbow_color)
}

/// BodyPix rainbow palette, indexed by label
pub const RAINBOW_PART_COLORS: [[u8; 3]; PART_COUNT] = [
    [110, 64, 170],
    [143, 61, 178],
    [178, 60, 178],
    [210, 62, 167],
    [238, 67, 149],
    [255, 78, 125],
    [255, 94, 99],
    [255, 115, 75],
    [255, 140, 56],
    [239, 167, 47],
    [217, 194, 38],
    [194, 219, 64],
    [175, 240, 91],
    [135, 245, 87],
    [96, 247, 96],
    [64, 243, 115],
    [40, 234, 141],
    [28, 219, 169],
    [26, 199, 194],
    [33, 176, 213],
    [47, 150, 224],
    [65, 125, 224],
    [84, 101, 214],
    [99, 81, 195],
];
