use crate::model::Review;
use serde::Serialize;

///
/// RatingSummary
///
/// `distribution[i]` counts reviews rated `i + 1`. Ratings outside 1..=5
/// are reported in `ignored` and do not affect the average.
///

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RatingSummary {
    pub count: usize,
    pub average: f64,
    pub distribution: [usize; 5],
    pub ignored: usize,
}

#[must_use]
pub fn rating_summary(reviews: &[Review]) -> RatingSummary {
    let mut out = RatingSummary::default();
    let mut sum = 0u64;

    for review in reviews {
        match review.rating {
            rating @ 1..=5 => {
                out.distribution[usize::from(rating - 1)] += 1;
                out.count += 1;
                sum += u64::from(rating);
            }
            _ => out.ignored += 1,
        }
    }
    if out.count > 0 {
        #[allow(clippy::cast_precision_loss)]
        let average = sum as f64 / out.count as f64;
        out.average = average;
    }

    out
}

///
/// TESTS
///
