use serde::Serialize;

/// Canned configuration for the preset wizard path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnipePreset {
    pub name: &'static str,
    pub description: &'static str,
    pub wallet_count: usize,
    pub total_tokens: u64,
    pub spend_rate_percentage: u8,
    pub sell_percentage: u8,
}

pub const PRESETS: &[SnipePreset] = &[
    SnipePreset {
        name: "Conservative",
        description: "Few wallets, small allocation, partial exits",
        wallet_count: 3,
        total_tokens: 1_000_000,
        spend_rate_percentage: 50,
        sell_percentage: 50,
    },
    SnipePreset {
        name: "Balanced",
        description: "Moderate spread across wallets",
        wallet_count: 10,
        total_tokens: 5_000_000,
        spend_rate_percentage: 75,
        sell_percentage: 75,
    },
    SnipePreset {
        name: "Aggressive",
        description: "Wide spread, full spend, full exits",
        wallet_count: 25,
        total_tokens: 20_000_000,
        spend_rate_percentage: 100,
        sell_percentage: 100,
    },
];

pub fn find_preset(name: &str) -> Option<&'static SnipePreset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(find_preset(" balanced ").map(|p| p.wallet_count), Some(10));
        assert!(find_preset("yolo").is_none());
    }

    #[test]
    fn presets_use_valid_percentages() {
        for preset in PRESETS {
            assert!((1..=100).contains(&preset.spend_rate_percentage));
            assert!((1..=100).contains(&preset.sell_percentage));
            assert!(preset.wallet_count > 0);
        }
    }
}
