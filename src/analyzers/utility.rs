/// Computes the arithmetic mean, or NaN if any value is missing.
///
/// Every value counts toward the denominator. A single `None` makes the whole
/// result NaN, and so does empty input (0 / 0).
pub fn mean_or_nan<I>(values: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut count = 0usize;
    let mut total = Some(0.0);

    for value in values {
        count += 1;
        total = total.zip(value).map(|(acc, v)| acc + v);
    }

    match total {
        Some(total) => ratio(total, count),
        None => f64::NAN,
    }
}

/// `part / whole`, NaN when `whole` is zero (including 0 / 0).
pub fn ratio(part: f64, whole: usize) -> f64 {
    if whole == 0 {
        return f64::NAN;
    }
    part / whole as f64
}
