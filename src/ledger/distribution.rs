use rand::Rng;

/// Splits `total_tokens` over `wallet_count` wallets with an independent,
/// uniformly drawn multiplicative jitter in `[-jitter, +jitter]` per wallet,
/// flooring each share. The sum is close to, but not exactly, `total_tokens`.
pub fn plan_token_distribution(total_tokens: u64, wallet_count: usize, jitter: f64) -> Vec<u64> {
    plan_token_distribution_with_rng(total_tokens, wallet_count, jitter, &mut rand::thread_rng())
}

pub fn plan_token_distribution_with_rng<R: Rng + ?Sized>(
    total_tokens: u64,
    wallet_count: usize,
    jitter: f64,
    rng: &mut R,
) -> Vec<u64> {
    if wallet_count == 0 {
        return Vec::new();
    }
    let base = total_tokens as f64 / wallet_count as f64;
    let jitter = jitter.abs();
    (0..wallet_count)
        .map(|_| {
            let factor = if jitter > 0.0 { 1.0 + rng.gen_range(-jitter..=jitter) } else { 1.0 };
            (base * factor).floor().max(0.0) as u64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn shares_stay_within_jitter_band() {
        for _ in 0..50 {
            let plan = plan_token_distribution(1_000_000, 10, 0.15);
            assert_eq!(plan.len(), 10);
            for amount in &plan {
                assert!((85_000..=115_000).contains(amount), "{} out of band", amount);
            }
        }
    }

    #[test]
    fn zero_jitter_is_an_even_split() {
        assert_eq!(plan_token_distribution(1_000, 4, 0.0), vec![250; 4]);
    }

    #[test]
    fn zero_wallets_yields_empty_plan() {
        assert!(plan_token_distribution(1_000, 0, 0.15).is_empty());
    }

    #[test]
    fn seeded_rng_is_repeatable() {
        let a = plan_token_distribution_with_rng(500_000, 5, 0.15, &mut StdRng::seed_from_u64(7));
        let b = plan_token_distribution_with_rng(500_000, 5, 0.15, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }
}
