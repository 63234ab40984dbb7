//! Decode configuration
//!
//! Defines the filters applied in front of the caller's sink when a whole
//! file is processed. The configuration is deliberately small; anything
//! beyond channel/message/signal selection belongs to the application layer.

use crate::process::SignalSeries;
use serde::{Deserialize, Serialize};

/// Configuration for whole-file decoding
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecodeConfig {
    /// Optional: only deliver series from these CAN channels
    #[serde(default)]
    pub can_channel_filter: Option<Vec<u32>>,

    /// Optional: only deliver series belonging to these message names
    #[serde(default)]
    pub message_filter: Option<Vec<String>>,

    /// Optional: only deliver these specific signal names
    #[serde(default)]
    pub signal_filter: Option<Vec<String>>,

    /// Whether to deliver time channels in addition to data channels
    #[serde(default = "default_true")]
    pub deliver_time_channels: bool,
}

fn default_true() -> bool {
    true
}

impl DecodeConfig {
    /// Create a new configuration with default settings (deliver everything)
    pub fn new() -> Self {
        Self {
            deliver_time_channels: true,
            ..Self::default()
        }
    }

    /// Builder method: set CAN channel filter
    pub fn with_can_channel_filter(mut self, channels: Vec<u32>) -> Self {
        self.can_channel_filter = Some(channels);
        self
    }

    /// Builder method: set message name filter
    pub fn with_message_filter(mut self, messages: Vec<String>) -> Self {
        self.message_filter = Some(messages);
        self
    }

    /// Builder method: set signal name filter
    pub fn with_signal_filter(mut self, signals: Vec<String>) -> Self {
        self.signal_filter = Some(signals);
        self
    }

    /// Builder method: include or exclude time channels
    pub fn with_time_channels(mut self, enabled: bool) -> Self {
        self.deliver_time_channels = enabled;
        self
    }

    /// Check if a CAN channel should be delivered
    pub fn should_deliver_channel(&self, can_channel: u32) -> bool {
        match &self.can_channel_filter {
            Some(channels) => channels.contains(&can_channel),
            None => true,
        }
    }

    /// Check if a message name should be delivered
    pub fn should_deliver_message(&self, message_name: &str) -> bool {
        match &self.message_filter {
            Some(messages) => messages.iter().any(|m| m == message_name),
            None => true,
        }
    }

    /// Check if a signal name should be delivered
    pub fn should_deliver_signal(&self, signal_name: &str) -> bool {
        match &self.signal_filter {
            Some(signals) => signals.iter().any(|s| s == signal_name),
            None => true,
        }
    }

    /// Check if a decoded series passes all filters
    ///
    /// Time channels bypass the name/channel filters (their series is the
    /// x-axis of every other channel) and are gated only by
    /// `deliver_time_channels`.
    pub fn should_deliver(&self, series: &SignalSeries<'_>) -> bool {
        if series.channel_type == crate::blocks::CHANNEL_TYPE_TIME {
            return self.deliver_time_channels;
        }
        self.should_deliver_channel(series.can_channel)
            && self.should_deliver_message(&series.message_name)
            && self.should_deliver_signal(&series.signal_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::{CHANNEL_TYPE_DATA, CHANNEL_TYPE_TIME};

    fn series(channel_type: u16, can_channel: u32, message: &str, signal: &str) -> SignalSeries<'static> {
        SignalSeries {
            can_channel,
            can_id: 0x1A0,
            record_count: 0,
            channel_type,
            message_name: message.to_string(),
            signal_name: signal.to_string(),
            unit: String::new(),
            samples: None,
        }
    }

    #[test]
    fn test_config_builder() {
        let config = DecodeConfig::new()
            .with_can_channel_filter(vec![1, 2])
            .with_message_filter(vec!["EngineData".to_string()])
            .with_signal_filter(vec!["EngineSpeed".to_string()])
            .with_time_channels(false);

        assert_eq!(config.can_channel_filter, Some(vec![1, 2]));
        assert_eq!(config.message_filter, Some(vec!["EngineData".to_string()]));
        assert!(!config.deliver_time_channels);
    }

    #[test]
    fn test_no_filters_deliver_everything() {
        let config = DecodeConfig::new();
        assert!(config.should_deliver(&series(CHANNEL_TYPE_DATA, 5, "AnyMsg", "AnySig")));
        assert!(config.should_deliver(&series(CHANNEL_TYPE_TIME, 0, "(undef)", "t")));
    }

    #[test]
    fn test_filter_logic() {
        let config = DecodeConfig::new()
            .with_can_channel_filter(vec![1])
            .with_message_filter(vec!["EngineData".to_string()]);

        assert!(config.should_deliver(&series(CHANNEL_TYPE_DATA, 1, "EngineData", "EngineSpeed")));
        // Wrong channel
        assert!(!config.should_deliver(&series(CHANNEL_TYPE_DATA, 2, "EngineData", "EngineSpeed")));
        // Wrong message
        assert!(!config.should_deliver(&series(CHANNEL_TYPE_DATA, 1, "BrakeData", "EngineSpeed")));
    }

    #[test]
    fn test_time_channels_bypass_name_filters() {
        let config = DecodeConfig::new().with_signal_filter(vec!["EngineSpeed".to_string()]);
        assert!(config.should_deliver(&series(CHANNEL_TYPE_TIME, 0, "(undef)", "t")));

        let config = config.with_time_channels(false);
        assert!(!config.should_deliver(&series(CHANNEL_TYPE_TIME, 0, "(undef)", "t")));
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = DecodeConfig::new().with_signal_filter(vec!["EngineSpeed".to_string()]);
        let json = serde_json::to_string(&config).unwrap();
        let back: DecodeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.signal_filter, Some(vec!["EngineSpeed".to_string()]));
        assert!(back.deliver_time_channels);
    }
}
