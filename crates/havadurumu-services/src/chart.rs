//! Temperature line chart geometry. The QML canvas only scales the
//! normalized coordinates computed here to its pixel size.

use havadurumu_weather::Forecast;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    labels: Vec<String>,
    values: Vec<f64>,
    y_min: f64,
    y_max: f64,
}

impl ChartSeries {
    pub fn from_forecast(forecast: &Forecast) -> Self {
        let (labels, values): (Vec<String>, Vec<f64>) = forecast.chart_points().into_iter().unzip();
        Self::new(labels, values)
    }

    pub fn new(labels: Vec<String>, values: Vec<f64>) -> Self {
        let (y_min, y_max) = padded_range(&values);
        Self {
            labels,
            values,
            y_min,
            y_max,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Horizontal position in `[0, 1]`; a lone point sits in the middle.
    pub fn x_fraction(&self, index: usize) -> f64 {
        match self.len() {
            0 | 1 => 0.5,
            n => index.min(n - 1) as f64 / (n - 1) as f64,
        }
    }

    /// Vertical position in `[0, 1]`, 0 at the bottom of the y-range.
    pub fn y_fraction(&self, index: usize) -> f64 {
        match self.value(index) {
            Some(v) => ((v - self.y_min) / (self.y_max - self.y_min)).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    /// Evenly spaced gridline values from `y_min` to `y_max` inclusive.
    pub fn y_ticks(&self, count: usize) -> Vec<f64> {
        match count {
            0 => Vec::new(),
            1 => vec![self.y_min],
            n => {
                let step = (self.y_max - self.y_min) / (n - 1) as f64;
                (0..n).map(|i| self.y_min + step * i as f64).collect()
            }
        }
    }
}

/// Data range padded by 10%, or by 1 degree when flat.
fn padded_range(values: &[f64]) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if !min.is_finite() {
        return (0.0, 1.0);
    }

    let span = max - min;
    let pad = if span < f64::EPSILON { 1.0 } else { span * 0.1 };
    (min - pad, max + pad)
}
