//! Typed per-controller state records.
//!
//! One variant per controller kind. Records are opaque to the playback engine:
//! it only moves them between the store and the controllers, in roster order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Coarse kind of a controller, also the tag of its state record.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    Rotation,
    Translation,
    Light,
    Magnet,
    Tracking,
    Camera,
    Hover,
    Custom,
}

impl ControllerKind {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rotation => "rotation",
            Self::Translation => "translation",
            Self::Light => "light",
            Self::Magnet => "magnet",
            Self::Tracking => "tracking",
            Self::Camera => "camera",
            Self::Hover => "hover",
            Self::Custom => "custom",
        }
    }
}

/// Primitive field value carried by `ControllerStateRecord::Custom`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Primitive {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControllerStateRecord {
    /// Rotation servo target, in degrees.
    Rotation { angle: f32, locked: bool },

    /// Translation servo target, in metres along its rail.
    Translation { position: f32, locked: bool },

    Light {
        enabled: bool,
        brightness: f32,
        color: [f32; 3],
    },

    Magnet { engaged: bool, strength: f32 },

    Tracking {
        enabled: bool,
        #[serde(default)]
        target: Option<String>,
    },

    /// Camera rig orientation (degrees) and field of view.
    Camera { pitch: f32, yaw: f32, fov: f32 },

    Hover { enabled: bool, altitude: f32 },

    /// Controllers outside the built-in kinds keep a small key/value schema.
    Custom {
        tag: String,
        #[serde(default)]
        fields: BTreeMap<String, Primitive>,
    },
}

impl ControllerStateRecord {
    #[inline]
    pub fn kind(&self) -> ControllerKind {
        match self {
            Self::Rotation { .. } => ControllerKind::Rotation,
            Self::Translation { .. } => ControllerKind::Translation,
            Self::Light { .. } => ControllerKind::Light,
            Self::Magnet { .. } => ControllerKind::Magnet,
            Self::Tracking { .. } => ControllerKind::Tracking,
            Self::Camera { .. } => ControllerKind::Camera,
            Self::Hover { .. } => ControllerKind::Hover,
            Self::Custom { .. } => ControllerKind::Custom,
        }
    }

    /// Controller type tag as it appears in saves. Custom records report their own tag.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Custom { tag, .. } => tag.as_str(),
            other => other.kind().as_str(),
        }
    }

    /// Convenience constructors
    pub fn rotation(angle: f32) -> Self {
        Self::Rotation {
            angle,
            locked: false,
        }
    }

    pub fn translation(position: f32) -> Self {
        Self::Translation {
            position,
            locked: false,
        }
    }

    pub fn light(enabled: bool, brightness: f32) -> Self {
        Self::Light {
            enabled,
            brightness,
            color: [1.0, 1.0, 1.0],
        }
    }

    pub fn magnet(engaged: bool) -> Self {
        Self::Magnet {
            engaged,
            strength: 1.0,
        }
    }
}
