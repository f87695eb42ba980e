use serde::{Deserialize, Serialize};

/// Usurpation factor denominator: `10_000` bps = 1.0x.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Auction policy parameters, loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Time units of rent a holder must keep in collateral (bid and withdraw checks).
    pub min_reserve_window: u64,

    /// Time units after acquisition during which a holder may not lower its rent.
    pub cooldown: u64,

    /// Time units of runway below which any caller may liquidate the holder.
    pub liquidation_window: u64,

    /// Premium a challenger must offer over the incumbent rent, in bps (12_000 = 1.2x).
    pub min_usurp_factor_bps: u32,

    /// Capacity of the serialized call queue.
    pub service_queue_depth: usize,
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            min_reserve_window: 100,
            cooldown: 100,
            liquidation_window: 20,
            min_usurp_factor_bps: 12_000,
            service_queue_depth: 1024,
        }
    }
}

impl AuctionConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let config = Self {
            min_reserve_window: env_or("FEE_AUCTION_MIN_RESERVE_WINDOW", defaults.min_reserve_window)?,
            cooldown: env_or("FEE_AUCTION_COOLDOWN", defaults.cooldown)?,
            liquidation_window: env_or("FEE_AUCTION_LIQUIDATION_WINDOW", defaults.liquidation_window)?,
            min_usurp_factor_bps: env_or(
                "FEE_AUCTION_MIN_USURP_FACTOR_BPS",
                defaults.min_usurp_factor_bps,
            )?,
            service_queue_depth: env_or("FEE_AUCTION_QUEUE_DEPTH", defaults.service_queue_depth)?,
        };
        config.validate()?;

        tracing::debug!(?config, "Auction configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if u128::from(self.min_usurp_factor_bps) < BPS_DENOMINATOR {
            anyhow::bail!(
                "FEE_AUCTION_MIN_USURP_FACTOR_BPS must be at least {} (got {})",
                BPS_DENOMINATOR,
                self.min_usurp_factor_bps
            );
        }
        if self.service_queue_depth == 0 {
            anyhow::bail!("FEE_AUCTION_QUEUE_DEPTH must be positive");
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid {}", name, std::any::type_name::<T>())),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuctionConfig::default();
        assert_eq!(config.min_reserve_window, 100);
        assert_eq!(config.cooldown, 100);
        assert_eq!(config.liquidation_window, 20);
        assert_eq!(config.min_usurp_factor_bps, 12_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_factor_below_par_rejected() {
        let config = AuctionConfig {
            min_usurp_factor_bps: 9_999,
            ..AuctionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_queue_rejected() {
        let config = AuctionConfig {
            service_queue_depth: 0,
            ..AuctionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_or_falls_back_when_unset() {
        let value: u64 = env_or("FEE_AUCTION_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
