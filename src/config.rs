#[derive(Clone)]
pub struct ConsumerConfig {
    pub poll_interval_ms: u64,
    pub visibility_timeout_secs: u64,
    pub batch_size: usize,
    pub concurrency: usize,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        ConsumerConfig {
            poll_interval_ms: 1000,
            visibility_timeout_secs: 30,
            batch_size: 10,
            concurrency: 4,
        }
    }
}
