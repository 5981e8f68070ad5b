use glam::{Quat, Vec3};

/// Node property driven by a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
    Weights,
}

#[derive(Debug, Clone)]
pub enum TrackValues {
    Vector3(Vec<Vec3>),
    Quaternion(Vec<Quat>),
    Scalar(Vec<f32>),
}

/// One keyframed channel, addressed by node name so a clip can drive any
/// clone of the asset it was loaded with.
#[derive(Debug, Clone)]
pub struct Track {
    pub node_name: String,
    pub target: TargetPath,
    pub times: Vec<f32>,
    pub values: TrackValues,
}

/// Read-only keyframe data. Clones of an asset share clips by `Arc`.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Creates a clip whose duration is the last keyframe time of any track.
    #[must_use]
    pub fn new(name: &str, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.times.last().copied().unwrap_or(0.0))
            .fold(0.0_f32, f32::max);

        Self {
            name: name.to_string(),
            duration,
            tracks,
        }
    }

    /// Names of nodes this clip animates, in track order, deduplicated.
    #[must_use]
    pub fn target_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for track in &self.tracks {
            if !names.contains(&track.node_name.as_str()) {
                names.push(&track.node_name);
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_is_last_keyframe() {
        let clip = AnimationClip::new(
            "wave",
            vec![
                Track {
                    node_name: "arm".into(),
                    target: TargetPath::Rotation,
                    times: vec![0.0, 0.5, 1.25],
                    values: TrackValues::Quaternion(vec![Quat::IDENTITY; 3]),
                },
                Track {
                    node_name: "arm".into(),
                    target: TargetPath::Translation,
                    times: vec![0.0, 0.75],
                    values: TrackValues::Vector3(vec![Vec3::ZERO; 2]),
                },
            ],
        );
        assert!((clip.duration - 1.25).abs() < 1e-6);
        assert_eq!(clip.target_names(), vec!["arm"]);
    }
}
