use std::env;

const VOBSUB_HONOR_PACK_STUFFING: &str = "VOBSUB_HONOR_PACK_STUFFING";
const VOBSUB_MAX_FRAMES_PER_PACKET: &str = "VOBSUB_MAX_FRAMES_PER_PACKET";

/// Options controlling how PES frames are walked and reassembled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReassemblerConfig {
    /// Skip the stuffing bytes announced by the pack header.
    ///
    /// When `false` the pack header is treated as exactly 14 bytes long.
    pub honor_pack_stuffing: bool,

    /// Upper bound on the number of frames a single subtitle packet may span.
    pub max_frames_per_packet: Option<usize>,
}
impl ReassemblerConfig {
    /// Makes a new `ReassemblerConfig` instance with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a new `ReassemblerConfig` instance from the process environment.
    ///
    /// `VOBSUB_HONOR_PACK_STUFFING=true` enables `honor_pack_stuffing` and
    /// `VOBSUB_MAX_FRAMES_PER_PACKET=<n>` sets `max_frames_per_packet`.
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let honor_pack_stuffing = env::var(VOBSUB_HONOR_PACK_STUFFING)
            .unwrap_or("false".into())
            .to_lowercase()
            == "true";
        let max_frames_per_packet = env::var(VOBSUB_MAX_FRAMES_PER_PACKET)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0);
        ReassemblerConfig {
            honor_pack_stuffing,
            max_frames_per_packet,
        }
    }

    /// Sets `honor_pack_stuffing`.
    pub fn honor_pack_stuffing(mut self, honor: bool) -> Self {
        self.honor_pack_stuffing = honor;
        self
    }

    /// Sets `max_frames_per_packet`.
    pub fn max_frames_per_packet(mut self, max: usize) -> Self {
        self.max_frames_per_packet = Some(max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_fixed_prefix_and_no_frame_limit() {
        let config = ReassemblerConfig::new();
        assert!(!config.honor_pack_stuffing);
        assert_eq!(config.max_frames_per_packet, None);
    }

    #[test]
    fn environment_overrides() {
        env::set_var(VOBSUB_HONOR_PACK_STUFFING, "TRUE");
        env::set_var(VOBSUB_MAX_FRAMES_PER_PACKET, "8");
        let config = ReassemblerConfig::from_env();
        env::remove_var(VOBSUB_HONOR_PACK_STUFFING);
        env::set_var(VOBSUB_MAX_FRAMES_PER_PACKET, "zero");
        let fallback = ReassemblerConfig::from_env();
        env::remove_var(VOBSUB_MAX_FRAMES_PER_PACKET);

        assert_eq!(
            config,
            ReassemblerConfig::new()
                .honor_pack_stuffing(true)
                .max_frames_per_packet(8)
        );
        assert_eq!(fallback.max_frames_per_packet, None);
    }
}
