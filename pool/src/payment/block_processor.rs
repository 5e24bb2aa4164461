/// Upper bound of the block range a run may pay for.
pub struct BlockProcessor;

impl BlockProcessor {
    /// Highest height that is both requested and buried under
    /// `min_confirmations` blocks.
    pub fn last_height_to_process(max_height: u64, min_confirmations: u64, latest_height: u64) -> u64 {
        let confirmed = latest_height.saturating_sub(min_confirmations);
        if confirmed < max_height {
            tracing::warn!(
                "Max height {} capped to {} (latest {} with {} confirmations required)",
                max_height,
                confirmed,
                latest_height,
                min_confirmations
            );
            confirmed
        } else {
            max_height
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requested_height_kept_when_confirmed() {
        assert_eq!(BlockProcessor::last_height_to_process(100, 15, 200), 100);
        assert_eq!(BlockProcessor::last_height_to_process(185, 15, 200), 185);
    }

    #[test]
    fn test_capped_by_confirmations() {
        assert_eq!(BlockProcessor::last_height_to_process(u64::MAX, 15, 200), 185);
        assert_eq!(BlockProcessor::last_height_to_process(190, 15, 200), 185);
    }

    #[test]
    fn test_young_chain_saturates() {
        assert_eq!(BlockProcessor::last_height_to_process(100, 15, 10), 0);
    }
}
