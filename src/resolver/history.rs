// =============================================================================
// Asset history — synthetic random walk anchored on the current price
// =============================================================================
//
// A chart aid, not market data. The walk runs backwards from the anchor so the
// last point always equals the current price; earlier points are perturbed by
// `u × volatility × anchor × 0.1` with `u` uniform in [-0.5, 0.5) and floored
// at 0.01.
// =============================================================================

use chrono::{DateTime, Duration, Months, Utc};
use rand::Rng;
use tracing::debug;

use super::{normalize_symbol, ResolveError, Resolver};
use crate::cache::{cache_key, CachedView};
use crate::numeric::{round_2dp, try_parse_f64};
use crate::types::{HistoryPeriod, HistoryPoint};

const HISTORY_ENDPOINT: &str = "asset_history";

/// Anchor used when the detail price is missing, zero or unparseable.
const DEFAULT_ANCHOR: f64 = 100.0;
const PRICE_FLOOR: f64 = 0.01;

impl Resolver {
    pub async fn asset_history(
        &self,
        symbol: &str,
        period: &str,
    ) -> Result<Vec<HistoryPoint>, ResolveError> {
        let symbol = normalize_symbol(symbol)?;
        let period = HistoryPeriod::parse(period);
        let key = cache_key(HISTORY_ENDPOINT, &[&symbol, period.code()]);

        match self.cache.get(&key) {
            Some(CachedView::History(points)) => {
                debug!(key = %key, "cache hit");
                return Ok(points);
            }
            Some(_) => return Err(self.unexpected(&key)),
            None => {}
        }

        let detail = self.asset_detail(&symbol).await?;
        let anchor = anchor_price(&detail.price);
        let points = generate_history(anchor, period, Utc::now(), &mut rand::thread_rng());
        debug!(symbol = %symbol, %period, anchor, points = points.len(), "history generated");

        self.cache
            .set(key, CachedView::History(points.clone()), self.policy.live_ttl);
        Ok(points)
    }
}

/// Parse a detail price into a usable anchor.
pub fn anchor_price(price: &str) -> f64 {
    try_parse_f64(price)
        .filter(|p| *p > 0.0)
        .unwrap_or(DEFAULT_ANCHOR)
}

/// Build the series for `period` ending at `anchor`, labelled relative to
/// `now`.
pub fn generate_history<R: Rng>(
    anchor: f64,
    period: HistoryPeriod,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<HistoryPoint> {
    let (count, volatility) = period.shape();
    let mut prices = vec![anchor; count];

    for i in (0..count.saturating_sub(1)).rev() {
        let change = (rng.gen::<f64>() - 0.5) * volatility * anchor * 0.1;
        prices[i] = (prices[i + 1] - change).max(PRICE_FLOOR);
    }

    prices
        .into_iter()
        .enumerate()
        .map(|(i, price)| HistoryPoint {
            label: label_for(period, now, (count - i) as i64),
            price: round_2dp(price),
        })
        .collect()
}

/// Label for the point `steps_back` period units before `now`.
fn label_for(period: HistoryPeriod, now: DateTime<Utc>, steps_back: i64) -> String {
    match period {
        HistoryPeriod::OneDay => (now - Duration::hours(steps_back)).format("%H:%M"),
        HistoryPeriod::OneWeek => (now - Duration::hours(6 * steps_back)).format("%a"),
        HistoryPeriod::OneMonth => (now - Duration::days(steps_back)).format("%d %b"),
        HistoryPeriod::OneYear => (now - Duration::weeks(steps_back)).format("%b %d"),
        HistoryPeriod::All => now
            .checked_sub_months(Months::new(steps_back as u32))
            .unwrap_or(now)
            .format("%Y"),
    }
    .to_string()
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::fakes::{build_resolver, coin, FakeCrypto, FakeQuotes, FakeStocks};
    use crate::resolver::ResolverPolicy;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ALL_PERIODS: [HistoryPeriod; 5] = [
        HistoryPeriod::OneDay,
        HistoryPeriod::OneWeek,
        HistoryPeriod::OneMonth,
        HistoryPeriod::OneYear,
        HistoryPeriod::All,
    ];

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 30, 0).unwrap()
    }

    #[test]
    fn last_point_is_anchor_for_every_period() {
        let mut rng = StdRng::seed_from_u64(7);
        for period in ALL_PERIODS {
            let points = generate_history(1234.5678, period, fixed_now(), &mut rng);
            assert_eq!(points.len(), period.shape().0);
            assert_eq!(points.last().unwrap().price, 1234.57);
        }
    }

    #[test]
    fn prices_never_drop_below_floor() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            // High volatility on a tiny anchor pushes the walk into the floor.
            let points = generate_history(0.02, HistoryPeriod::All, fixed_now(), &mut rng);
            assert!(points.iter().all(|p| p.price >= PRICE_FLOOR), "seed {seed}");
        }
    }

    #[test]
    fn steps_stay_within_volatility_band() {
        let mut rng = StdRng::seed_from_u64(42);
        let anchor = 200.0;
        let points = generate_history(anchor, HistoryPeriod::OneMonth, fixed_now(), &mut rng);
        let max_step = 0.5 * 0.08 * anchor * 0.1 + 0.01;
        for w in points.windows(2) {
            assert!((w[1].price - w[0].price).abs() <= max_step);
        }
    }

    #[test]
    fn labels_follow_period_units() {
        let mut rng = StdRng::seed_from_u64(1);
        let day = generate_history(10.0, HistoryPeriod::OneDay, fixed_now(), &mut rng);
        assert_eq!(day[0].label, "12:30");
        assert_eq!(day[23].label, "11:30");

        let month = generate_history(10.0, HistoryPeriod::OneMonth, fixed_now(), &mut rng);
        assert_eq!(month[29].label, "15 Oct");
        assert_eq!(month[0].label, "16 Sep");

        let week = generate_history(10.0, HistoryPeriod::OneWeek, fixed_now(), &mut rng);
        // 2026-10-16 is a Friday; six hours earlier is still Friday.
        assert_eq!(week[27].label, "Fri");

        let year = generate_history(10.0, HistoryPeriod::OneYear, fixed_now(), &mut rng);
        assert_eq!(year[51].label, "Oct 09");

        let all = generate_history(10.0, HistoryPeriod::All, fixed_now(), &mut rng);
        assert_eq!(all[99].label, "2026");
        assert_eq!(all[0].label, "2018");
    }

    #[test]
    fn anchor_falls_back_to_default() {
        assert_eq!(anchor_price("190.00"), 190.0);
        assert_eq!(anchor_price("0"), DEFAULT_ANCHOR);
        assert_eq!(anchor_price(""), DEFAULT_ANCHOR);
        assert_eq!(anchor_price("n/a"), DEFAULT_ANCHOR);
    }

    #[tokio::test]
    async fn history_anchors_on_resolved_detail() {
        let (resolver, _) = build_resolver(
            FakeCrypto::ok(vec![coin("ETH", 2600.0, -0.5, 1.0)]),
            FakeQuotes::none(),
            FakeStocks::failing(),
            ResolverPolicy::default(),
        );
        let points = resolver.asset_history("eth", "1W").await.unwrap();
        assert_eq!(points.len(), 28);
        assert_eq!(points.last().unwrap().price, 2600.0);
    }

    #[tokio::test]
    async fn unknown_period_behaves_like_one_day_and_shares_cache() {
        let crypto = FakeCrypto::failing();
        let (resolver, _) = build_resolver(
            crypto.clone(),
            FakeQuotes::none(),
            FakeStocks::failing(),
            ResolverPolicy::default(),
        );
        let odd = resolver.asset_history("ZZZZ", "5Y").await.unwrap();
        assert_eq!(odd.len(), 24);
        assert_eq!(odd.last().unwrap().price, 190.0);

        let day = resolver.asset_history("zzzz", "1D").await.unwrap();
        assert_eq!(odd, day);
        assert_eq!(crypto.calls(), 1);
    }
}
