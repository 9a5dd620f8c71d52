use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub x0: f64,
    pub x1: f64,
    pub count: usize,
}

pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

pub fn extent(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Index range and increment of round tick values between `start` and `stop`.
/// A negative increment `-k` stands for a step of `1/k`.
fn tick_spec(start: f64, stop: f64, count: usize) -> Option<(i64, i64, f64)> {
    if count == 0 || !(stop > start) {
        return None;
    }
    let step = (stop - start) / count as f64;
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    if power < 0.0 {
        let inc = 10f64.powf(-power) / factor;
        let mut i1 = (start * inc).round() as i64;
        let mut i2 = (stop * inc).round() as i64;
        if (i1 as f64) / inc < start {
            i1 += 1;
        }
        if (i2 as f64) / inc > stop {
            i2 -= 1;
        }
        Some((i1, i2, -inc))
    } else {
        let inc = 10f64.powf(power) * factor;
        let mut i1 = (start / inc).round() as i64;
        let mut i2 = (stop / inc).round() as i64;
        if (i1 as f64) * inc < start {
            i1 += 1;
        }
        if (i2 as f64) * inc > stop {
            i2 -= 1;
        }
        Some((i1, i2, inc))
    }
}

fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    tick_spec(start, stop, count).map(|(_, _, inc)| inc).unwrap_or(0.0)
}

/// Roughly `count` round values spanning `[start, stop]`.
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if start == stop {
        return vec![start];
    }
    match tick_spec(start, stop, count) {
        Some((i1, i2, inc)) if i2 >= i1 => (i1..=i2)
            .map(|i| {
                if inc < 0.0 {
                    i as f64 / -inc
                } else {
                    i as f64 * inc
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Widens a domain so both ends land on round tick values.
pub fn nice_domain(start: f64, stop: f64, count: usize) -> (f64, f64) {
    let (mut start, mut stop) = (start, stop);
    let mut previous = f64::NAN;
    for _ in 0..10 {
        let step = tick_increment(start, stop, count);
        if step == previous {
            break;
        } else if step > 0.0 {
            start = (start / step).floor() * step;
            stop = (stop / step).ceil() * step;
        } else if step < 0.0 {
            start = (start * step).ceil() / step;
            stop = (stop * step).floor() / step;
        } else {
            break;
        }
        previous = step;
    }
    (start, stop)
}

/// Threshold binning: values in `[x0, x1]` go to the bin whose lower threshold they reach.
pub fn bin(values: &[f64], x0: f64, x1: f64, thresholds: &[f64]) -> Vec<HistogramBin> {
    let inner: Vec<f64> = thresholds
        .iter()
        .copied()
        .skip_while(|t| *t <= x0)
        .take_while(|t| *t <= x1)
        .collect();

    let mut bins: Vec<HistogramBin> = (0..=inner.len())
        .map(|i| HistogramBin {
            x0: if i == 0 { x0 } else { inner[i - 1] },
            x1: if i == inner.len() { x1 } else { inner[i] },
            count: 0,
        })
        .collect();

    for &v in values {
        if v >= x0 && v <= x1 {
            let idx = inner.partition_point(|t| *t <= v);
            bins[idx].count += 1;
        }
    }
    bins
}

/// `count` round bins over the extent of `values`, like a default histogram.
pub fn uniform_histogram(values: &[f64], count: usize) -> Vec<HistogramBin> {
    let Some((lo, hi)) = extent(values) else {
        return Vec::new();
    };
    let (x0, x1) = nice_domain(lo, hi, 10);
    let mut thresholds = ticks(x0, x1, count);
    if thresholds.last().is_some_and(|t| *t >= x1) {
        thresholds.pop();
    }
    bin(values, x0, x1, &thresholds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[f64::NAN, 5.0]), Some(5.0));
    }

    #[test]
    fn test_ticks_are_round() {
        assert_eq!(ticks(0.0, 10.0, 10), (0..=10).map(f64::from).collect::<Vec<_>>());
        assert_eq!(
            ticks(20_000.0, 200_000.0, 5),
            vec![50_000.0, 100_000.0, 150_000.0, 200_000.0]
        );
        assert_eq!(ticks(0.0, 1.0, 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(ticks(5.0, 5.0, 10), vec![5.0]);
    }

    #[test]
    fn test_nice_domain() {
        assert_eq!(nice_domain(42_000.0, 187_500.0, 10), (40_000.0, 200_000.0));
        assert_eq!(nice_domain(0.5, 9.7, 10), (0.0, 10.0));
        assert_eq!(nice_domain(3.0, 3.0, 10), (3.0, 3.0));
    }

    #[test]
    fn test_bin_assigns_values_by_threshold() {
        let bins = bin(&[0.0, 4.9, 5.0, 9.0, 10.0, 11.0], 0.0, 10.0, &[0.0, 5.0, 10.0]);
        // 0 is dropped as a threshold, 10 stays and closes a degenerate last bin
        assert_eq!(bins.len(), 3);
        assert_eq!((bins[0].x0, bins[0].x1, bins[0].count), (0.0, 5.0, 2));
        assert_eq!((bins[1].x0, bins[1].x1, bins[1].count), (5.0, 10.0, 2));
        assert_eq!((bins[2].x0, bins[2].x1, bins[2].count), (10.0, 10.0, 1));
    }

    #[test]
    fn test_uniform_histogram_counts_everything() {
        let salaries = [52_000.0, 61_000.0, 75_000.0, 98_000.0, 120_000.0, 143_000.0];
        let bins = uniform_histogram(&salaries, 10);
        assert!(!bins.is_empty());
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), salaries.len());
        assert_eq!(bins.first().unwrap().x0, 50_000.0);
        assert_eq!(bins.last().unwrap().x1, 150_000.0);
        assert!(uniform_histogram(&[], 10).is_empty());
    }
}
