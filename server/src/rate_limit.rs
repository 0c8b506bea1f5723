use std::sync::Arc;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer, key_extractor::PeerIpKeyExtractor};
use governor::middleware::NoOpMiddleware;
use governor::clock::QuantaInstant;

pub type RateLimiter = GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>>;

/// Per-IP rate limiting for the API routes, with a burst of twice the rate.
/// Needs the peer address, so serve with `into_make_service_with_connect_info`.
pub fn create_rate_limiter(
    requests_per_second: u64,
) -> Option<RateLimiter> {
    if requests_per_second == 0 {
        return None;
    }

    let replenish_ms = (1000 / requests_per_second).max(1);
    let burst_size = u32::try_from(requests_per_second.saturating_mul(2)).unwrap_or(u32::MAX);
    let governor_conf = GovernorConfigBuilder::default()
        .per_millisecond(replenish_ms)
        .burst_size(burst_size)
        .finish()?;

    Some(GovernorLayer {
        config: Arc::new(governor_conf),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_disables_rate_limiting() {
        assert!(create_rate_limiter(0).is_none());
        assert!(create_rate_limiter(10).is_some());
    }
}
