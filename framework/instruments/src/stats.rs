use std::cmp::Ordering;

/// Reasons a sample set cannot be summarised.
#[derive(derive_more::Error, derive_more::Display, Debug, Clone, PartialEq)]
pub enum StatsError {
    /// The sample standard deviation needs at least two values.
    #[display("At least 2 samples are required to compute statistics, got {count}")]
    InsufficientSamples { count: usize },
    /// Rates are used as divisors for the harmonic mean so must be finite and greater than zero.
    #[display("Sample {index} is not a positive, finite rate: {value}")]
    NonPositiveSample { index: usize, value: f64 },
}

/// The rates observed for one scenario, in run order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    samples: Vec<f64>,
}

impl SampleSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, rate: f64) {
        self.samples.push(rate);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.samples
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.samples
    }

    /// Summarise the samples. See [ThroughputStats::from_samples].
    pub fn stats(&self) -> Result<ThroughputStats, StatsError> {
        ThroughputStats::from_samples(&self.samples)
    }
}

/// Descriptive statistics for a set of throughput samples, all in MiB/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThroughputStats {
    pub runs: usize,
    pub median: f64,
    /// Harmonic mean, which is the right average for rates measured over a fixed transfer size.
    pub harmonic_mean: f64,
    /// Sample standard deviation, using an `n - 1` denominator.
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
}

impl ThroughputStats {
    /// Compute the statistics for `samples`.
    ///
    /// Fails with [StatsError::InsufficientSamples] for fewer than 2 samples and with
    /// [StatsError::NonPositiveSample] if any sample is zero, negative, infinite or NaN.
    pub fn from_samples(samples: &[f64]) -> Result<Self, StatsError> {
        check_samples(samples)?;

        let (min, max) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &x| {
                (min.min(x), max.max(x))
            });

        Ok(Self {
            runs: samples.len(),
            median: median(samples)?,
            harmonic_mean: harmonic_mean(samples)?,
            stddev: sample_stddev(samples)?,
            min,
            max,
        })
    }
}

/// The middle value of the sorted samples, or the mean of the two middle values for an even
/// number of samples.
pub fn median(samples: &[f64]) -> Result<f64, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::InsufficientSamples { count: 0 });
    }

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid])
    } else {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// The reciprocal of the arithmetic mean of the reciprocals.
pub fn harmonic_mean(samples: &[f64]) -> Result<f64, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::InsufficientSamples { count: 0 });
    }
    check_positive(samples)?;

    let mean_reciprocal = samples.iter().map(|x| 1.0 / x).sum::<f64>() / samples.len() as f64;
    Ok(1.0 / mean_reciprocal)
}

/// Sample standard deviation.
pub fn sample_stddev(samples: &[f64]) -> Result<f64, StatsError> {
    if samples.len() < 2 {
        return Err(StatsError::InsufficientSamples {
            count: samples.len(),
        });
    }

    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);

    Ok(variance.sqrt())
}

fn check_samples(samples: &[f64]) -> Result<(), StatsError> {
    if samples.len() < 2 {
        return Err(StatsError::InsufficientSamples {
            count: samples.len(),
        });
    }
    check_positive(samples)
}

fn check_positive(samples: &[f64]) -> Result<(), StatsError> {
    match samples
        .iter()
        .enumerate()
        .find(|(_, x)| !x.is_finite() || **x <= 0.0)
    {
        Some((index, &value)) => Err(StatsError::NonPositiveSample { index, value }),
        None => Ok(()),
    }
}
