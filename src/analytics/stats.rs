//! Statistical primitives shared by the correlation and forecast engines.

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Pearson linear correlation coefficient.
///
/// Returns 0.0 when either series has zero variance (the coefficient is
/// undefined there, and 0.0 keeps downstream classification total).
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    if x.len() < 2 {
        return 0.0;
    }

    let mx = mean(x);
    let my = mean(y);

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        let dx = xi - mx;
        let dy = yi - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if denom == 0.0 {
        return 0.0;
    }

    (sxy / denom).clamp(-1.0, 1.0)
}

/// Rank transform with ties receiving the average of their rank range
/// (1-based, matching the conventional Spearman treatment).
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // Ranks i+1 ..= j+1 collapse to their average.
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[order[k]] = avg;
        }
        i = j + 1;
    }

    ranks
}

/// Two-sided p-value for a correlation coefficient under the null
/// hypothesis of zero correlation, using the Student-t approximation
/// with n-2 degrees of freedom.
pub fn two_sided_p_value(r: f64, n: usize) -> f64 {
    if n < 3 {
        return 1.0;
    }

    let df = (n - 2) as f64;
    let denom = 1.0 - r * r;
    if denom <= f64::EPSILON {
        // |r| == 1: the t statistic diverges.
        return 0.0;
    }

    let t = r * (df / denom).sqrt();
    // P(|T| >= |t|) = I_x(df/2, 1/2) with x = df / (df + t^2)
    incomplete_beta(df / 2.0, 0.5, df / (df + t * t)).clamp(0.0, 1.0)
}

/// Regularized incomplete beta function I_x(a, b), evaluated with the
/// Lentz continued fraction (Numerical Recipes 6.4).
pub fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front =
        ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    // Use the continued fraction directly where it converges fast,
    // otherwise via the symmetry I_x(a,b) = 1 - I_{1-x}(b,a).
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 200;
    const EPS: f64 = 3.0e-12;
    const FPMIN: f64 = 1.0e-30;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < FPMIN {
        d = FPMIN;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < FPMIN {
            d = FPMIN;
        }
        c = 1.0 + aa / c;
        if c.abs() < FPMIN {
            c = FPMIN;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;

        if (del - 1.0).abs() < EPS {
            break;
        }
    }

    h
}

/// Lanczos approximation of ln(Gamma(x)) for x > 0.
fn ln_gamma(x: f64) -> f64 {
    const COF: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];

    let mut y = x;
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut ser = 1.000_000_000_190_015;
    for c in COF {
        y += 1.0;
        ser += c / y;
    }

    -tmp + (2.506_628_274_631_000_5 * ser / x).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_perfect_line() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 6.0, 8.0, 10.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);

        let y_neg = [10.0, 8.0, 6.0, 4.0, 2.0];
        assert!((pearson(&x, &y_neg) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_symmetric() {
        let x = [1.0, 3.0, 2.0, 5.0, 4.0];
        let y = [2.0, 1.0, 4.0, 3.0, 5.0];
        assert!((pearson(&x, &y) - pearson(&y, &x)).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance() {
        let x = [3.0, 3.0, 3.0, 3.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(pearson(&x, &y), 0.0);
    }

    #[test]
    fn test_average_ranks_with_ties() {
        // 10 and 10 occupy ranks 2 and 3 -> both get 2.5
        let ranks = average_ranks(&[5.0, 10.0, 10.0, 20.0]);
        assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn test_incomplete_beta_uniform() {
        // I_x(1, 1) is the uniform CDF
        for x in [0.1, 0.25, 0.5, 0.9] {
            assert!((incomplete_beta(1.0, 1.0, x) - x).abs() < 1e-9);
        }
        // Symmetry point of the arcsine distribution
        assert!((incomplete_beta(0.5, 0.5, 0.5) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_p_value_bounds_and_symmetry() {
        for r in [-0.9, -0.3, 0.0, 0.4, 0.99] {
            let p = two_sided_p_value(r, 20);
            assert!((0.0..=1.0).contains(&p));
            assert!((p - two_sided_p_value(-r, 20)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_p_value_known_point() {
        // t = 2.228 at 10 degrees of freedom is the classic two-sided
        // 5% critical value; the matching r for n = 12 is sqrt(t^2/(t^2+df)).
        let t: f64 = 2.228;
        let df = 10.0;
        let r = (t * t / (t * t + df)).sqrt();
        let p = two_sided_p_value(r, 12);
        assert!((p - 0.05).abs() < 0.001, "p = {}", p);
    }

    #[test]
    fn test_p_value_extremes() {
        assert_eq!(two_sided_p_value(1.0, 10), 0.0);
        assert!((two_sided_p_value(0.0, 10) - 1.0).abs() < 1e-9);
        // Too few points: no evidence either way
        assert_eq!(two_sided_p_value(0.9, 2), 1.0);
    }
}
