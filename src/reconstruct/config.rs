/// Tunables for interval reconstruction.
#[derive(Debug, Clone)]
pub struct ReconstructionConfig {
    /// Fixed duration of a pedestrian walk interval, emitted whole the moment
    /// the controller reports the walk code (durations are fixed at emission,
    /// not measured).
    pub walk_secs: f64,

    /// Phase signal code meaning "walk active".
    pub phase_active_code: u8,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            walk_secs: 20.0,
            phase_active_code: 2,
        }
    }
}
