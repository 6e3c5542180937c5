//! Sequencer Configuration
//!
//! Serializable construction parameters: buffer size, producer type and wait
//! strategy. A validated [`SequencerConfig`] builds the matching
//! [`Sequencer`] and [`WaitStrategy`].

use crate::disruptor::backoff::{SleepBackoff, YieldBackoff};
use crate::disruptor::{
    is_power_of_two, BlockingWaitStrategy, BusySpinWaitStrategy, DisruptorError,
    MultiProducerSequencer, ProducerType, Result, Sequencer, SingleProducerSequencer,
    SleepingWaitStrategy, TimeoutBlockingWaitStrategy, WaitStrategy, YieldingWaitStrategy,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Wait strategy selection with its tuning parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaitStrategyConfig {
    #[default]
    Blocking,
    TimeoutBlocking {
        timeout_ms: u64,
    },
    Sleeping {
        #[serde(default = "default_sleep_retries")]
        retries: u32,
        #[serde(default = "default_sleep_ns")]
        sleep_ns: u64,
    },
    Yielding {
        #[serde(default = "default_spin_tries")]
        spin_tries: u32,
    },
    BusySpin,
}

fn default_sleep_retries() -> u32 {
    SleepBackoff::DEFAULT_RETRIES
}

fn default_sleep_ns() -> u64 {
    SleepBackoff::DEFAULT_SLEEP.as_nanos() as u64
}

fn default_spin_tries() -> u32 {
    YieldBackoff::DEFAULT_SPIN_TRIES
}

impl WaitStrategyConfig {
    /// # Errors
    /// `Config` if a timeout-bounded strategy has a zero timeout
    pub fn validate(&self) -> Result<()> {
        if let WaitStrategyConfig::TimeoutBlocking { timeout_ms: 0 } = self {
            return Err(DisruptorError::Config(
                "timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Build the configured wait strategy
    pub fn build(&self) -> Arc<dyn WaitStrategy> {
        match *self {
            WaitStrategyConfig::Blocking => Arc::new(BlockingWaitStrategy::new()),
            WaitStrategyConfig::TimeoutBlocking { timeout_ms } => Arc::new(
                TimeoutBlockingWaitStrategy::new(Duration::from_millis(timeout_ms)),
            ),
            WaitStrategyConfig::Sleeping { retries, sleep_ns } => Arc::new(
                SleepingWaitStrategy::with_retries(retries, Duration::from_nanos(sleep_ns)),
            ),
            WaitStrategyConfig::Yielding { spin_tries } => {
                Arc::new(YieldingWaitStrategy::with_spin_tries(spin_tries))
            }
            WaitStrategyConfig::BusySpin => Arc::new(BusySpinWaitStrategy::new()),
        }
    }
}

/// Construction parameters for a sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Number of slots; must be a power of 2
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    #[serde(default)]
    pub producer_type: ProducerType,

    #[serde(default)]
    pub wait_strategy: WaitStrategyConfig,
}

fn default_buffer_size() -> usize {
    SequencerConfig::DEFAULT_BUFFER_SIZE
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            buffer_size: Self::DEFAULT_BUFFER_SIZE,
            producer_type: ProducerType::default(),
            wait_strategy: WaitStrategyConfig::default(),
        }
    }
}

impl SequencerConfig {
    pub const DEFAULT_BUFFER_SIZE: usize = 1024;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_producer_type(mut self, producer_type: ProducerType) -> Self {
        self.producer_type = producer_type;
        self
    }

    pub fn with_wait_strategy(mut self, wait_strategy: WaitStrategyConfig) -> Self {
        self.wait_strategy = wait_strategy;
        self
    }

    /// Parse a configuration from JSON and validate it
    ///
    /// Missing fields take their defaults.
    ///
    /// # Errors
    /// `Config` if the text is not valid JSON for this structure, or if the
    /// result fails [`validate`](Self::validate)
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DisruptorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize this configuration to JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| DisruptorError::Config(e.to_string()))
    }

    /// Check the parameters without building anything
    ///
    /// # Errors
    /// `InvalidBufferSize` for a buffer size that is not a power of 2, `Config`
    /// for an invalid wait strategy
    pub fn validate(&self) -> Result<()> {
        if !is_power_of_two(self.buffer_size) {
            return Err(DisruptorError::InvalidBufferSize(self.buffer_size));
        }
        self.wait_strategy.validate()
    }

    /// Build the configured wait strategy
    pub fn build_wait_strategy(&self) -> Result<Arc<dyn WaitStrategy>> {
        self.wait_strategy.validate()?;
        Ok(self.wait_strategy.build())
    }

    /// Build the configured sequencer and its wait strategy
    ///
    /// # Errors
    /// Anything [`validate`](Self::validate) rejects
    pub fn build_sequencer(&self) -> Result<Arc<dyn Sequencer>> {
        self.validate()?;
        let wait_strategy = self.wait_strategy.build();

        let sequencer: Arc<dyn Sequencer> = match self.producer_type {
            ProducerType::Single => {
                Arc::new(SingleProducerSequencer::new(self.buffer_size, wait_strategy)?)
            }
            ProducerType::Multi => {
                Arc::new(MultiProducerSequencer::new(self.buffer_size, wait_strategy)?)
            }
        };

        tracing::info!(
            buffer_size = self.buffer_size,
            producer_type = %self.producer_type,
            wait_strategy = ?self.wait_strategy,
            "sequencer built from configuration"
        );

        Ok(sequencer)
    }
}
