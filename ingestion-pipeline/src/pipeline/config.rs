use common::utils::config::AppConfig;

#[derive(Debug, Clone)]
pub struct IndexingTuning {
    /// Chunks sent to the embedding backend per request.
    pub embedding_batch_size: usize,
    /// Total attempts per embedding batch, first try included.
    pub embedding_attempts: usize,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl Default for IndexingTuning {
    fn default() -> Self {
        Self {
            embedding_batch_size: 16,
            embedding_attempts: 3,
            retry_base_delay_ms: 100,
            retry_max_delay_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndexingConfig {
    pub tuning: IndexingTuning,
}

impl From<&AppConfig> for IndexingConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            tuning: IndexingTuning {
                embedding_batch_size: config.embedding_batch_size,
                embedding_attempts: config.embedding_attempts,
                retry_base_delay_ms: config.retry_base_delay_ms,
                retry_max_delay_ms: config.retry_max_delay_ms,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuning_follows_app_config() {
        let config = AppConfig {
            embedding_batch_size: 4,
            embedding_attempts: 5,
            retry_base_delay_ms: 10,
            retry_max_delay_ms: 80,
            ..AppConfig::default()
        };

        let tuning = IndexingConfig::from(&config).tuning;
        assert_eq!(tuning.embedding_batch_size, 4);
        assert_eq!(tuning.embedding_attempts, 5);
        assert_eq!((tuning.retry_base_delay_ms, tuning.retry_max_delay_ms), (10, 80));

        let defaults = IndexingConfig::from(&AppConfig::default()).tuning;
        assert_eq!(
            defaults.embedding_batch_size,
            IndexingTuning::default().embedding_batch_size
        );
    }
}
