//! Persistent import settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geom::{MeshFlags, NormalMode};
use crate::util::{Chrono, Result};

/// How time outside the clip range maps back into it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleType {
    /// Clamp to the first/last frame.
    #[default]
    Hold,
    /// Wrap around to the start.
    Loop,
    /// Play backwards from the end, holding outside the range.
    Reverse,
    /// Alternate forward and backward passes.
    Bounce,
}

/// Playback time remapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    pub start_time: Chrono,
    pub end_time: Chrono,
    pub time_offset: Chrono,
    pub time_scale: Chrono,
    /// Keep `start_time` fixed when scaling.
    pub preserve_start_time: bool,
    pub cycle: CycleType,
    /// Times closer than this are the same frame.
    pub time_epsilon: Chrono,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            end_time: 0.0,
            time_offset: 0.0,
            time_scale: 1.0,
            preserve_start_time: true,
            cycle: CycleType::Hold,
            time_epsilon: 0.001,
        }
    }
}

impl PlaybackSettings {
    /// Map host time to archive time.
    pub fn adjust_time(&self, time: Chrono) -> Chrono {
        let (start, end, eps) = (self.start_time, self.end_time, self.time_epsilon);
        let extra_offset = if self.preserve_start_time { start * (self.time_scale - 1.0) } else { 0.0 };
        let play_time = end - start;
        let t = self.time_scale * (time - self.time_offset) - extra_offset;

        if self.cycle == CycleType::Hold {
            return if t < start - eps {
                start
            } else if t > end + eps {
                end
            } else {
                t
            };
        }

        // empty clip, nothing to cycle over
        if play_time <= 0.0 {
            return start;
        }

        let normalized = (t - start) / play_time;
        let repeat = normalized.floor();
        let fraction = (normalized - repeat).abs();

        match self.cycle {
            CycleType::Reverse => {
                if t > start + eps && t < end - eps {
                    end - fraction * play_time
                } else if t < start + eps {
                    end
                } else {
                    start
                }
            }
            _ => {
                if t < start - eps || t > end + eps {
                    if self.cycle == CycleType::Loop || (repeat as i64) % 2 == 0 {
                        start + fraction * play_time
                    } else {
                        end - fraction * play_time
                    }
                } else {
                    t
                }
            }
        }
    }
}

/// Import settings that persist between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Convert right-handed caches to a left-handed frame (negate X).
    pub swap_handedness: bool,
    /// Flip triangle winding.
    pub swap_face_winding: bool,
    /// Fan-triangulate n-gons.
    pub force_triangulate: bool,
    /// Source of output normals.
    pub normal_mode: NormalMode,
    /// Vertex budget per split-mesh chunk.
    pub max_vertices_per_chunk: usize,
    pub playback: PlaybackSettings,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            swap_handedness: false,
            swap_face_winding: false,
            force_triangulate: true,
            normal_mode: NormalMode::ComputeIfMissing,
            max_vertices_per_chunk: 65000,
            playback: PlaybackSettings::default(),
        }
    }
}

impl ImportSettings {
    /// Per-object flags derived from these settings.
    pub fn mesh_flags(&self) -> MeshFlags {
        MeshFlags {
            mirror_x: self.swap_handedness,
            reverse_winding: self.swap_face_winding,
            triangulate: self.force_triangulate,
            normal_mode: self.normal_mode,
        }
    }

    /// Get settings file path
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("abc-import");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the config directory, falling back to defaults.
    pub fn load() -> Self {
        Self::path()
            .filter(|p| p.exists())
            .and_then(|p| match Self::load_from(&p) {
                Ok(s) => Some(s),
                Err(e) => {
                    tracing::warn!(path = %p.display(), error = %e, "ignoring unreadable settings");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Load settings from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&text)?;
        if settings.max_vertices_per_chunk == 0 {
            settings.max_vertices_per_chunk = Self::default().max_vertices_per_chunk;
        }
        Ok(settings)
    }

    /// Save settings to a JSON file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Save settings to the config directory.
    pub fn save(&self) -> Result<()> {
        match Self::path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }
}
