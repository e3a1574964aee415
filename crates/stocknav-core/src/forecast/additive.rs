use std::f64::consts::TAU;
use std::ops::Range;

use linfa::traits::Fit;
use linfa::Dataset;
use linfa_linear::LinearRegression;
use ndarray::{s, Array1, Array2};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use super::{FittedModel, Forecast, ForecastError, ForecastFrame, ForecastModel, ForecastPoint};
use crate::TradingDate;

const WEEK_DAYS: f64 = 7.0;
const YEAR_DAYS: f64 = 365.25;
const MIN_ROWS: usize = 2;

/// `y(t) = trend(t) + weekly(t) + yearly(t)`, fitted by ridge least squares.
///
/// Weekly terms are used once the history spans two weeks, yearly terms once
/// it spans two years. Time is scaled to `[0, 1]` over the history and `y`
/// by its largest magnitude before solving.
#[derive(Debug, Clone, PartialEq)]
pub struct AdditiveModel {
    pub weekly_order: usize,
    pub yearly_order: usize,
    /// Penalty on every coefficient except the intercept.
    pub ridge: f64,
    /// Coverage of `[yhat_lower, yhat_upper]`, in `(0, 1)`.
    pub interval_width: f64,
}

impl Default for AdditiveModel {
    fn default() -> Self {
        Self {
            weekly_order: 3,
            yearly_order: 10,
            ridge: 1e-4,
            interval_width: 0.8,
        }
    }
}

impl AdditiveModel {
    /// Two-sided standard normal quantile for `interval_width`.
    fn z_score(&self) -> Result<f64, ForecastError> {
        let width = self.interval_width;
        if !(width > 0.0 && width < 1.0) {
            return Err(ForecastError::InvalidIntervalWidth { width });
        }
        let normal =
            Normal::new(0.0, 1.0).map_err(|_| ForecastError::InvalidIntervalWidth { width })?;
        Ok(normal.inverse_cdf(0.5 + width / 2.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Layout {
    weekly: usize,
    yearly: usize,
}

impl Layout {
    fn width(self) -> usize {
        2 + 2 * self.weekly + 2 * self.yearly
    }

    fn trend(self) -> Range<usize> {
        0..2
    }

    fn weekly_terms(self) -> Range<usize> {
        2..2 + 2 * self.weekly
    }

    fn yearly_terms(self) -> Range<usize> {
        2 + 2 * self.weekly..self.width()
    }
}

/// Coefficients and scaling from one [`AdditiveModel::fit`].
#[derive(Debug, Clone, PartialEq)]
pub struct FittedAdditive {
    layout: Layout,
    coefficients: Array1<f64>,
    origin: i32,
    span_days: f64,
    y_scale: f64,
    sigma: f64,
    z: f64,
    history: Vec<TradingDate>,
}

impl FittedAdditive {
    pub fn uses_weekly(&self) -> bool {
        self.layout.weekly > 0
    }

    pub fn uses_yearly(&self) -> bool {
        self.layout.yearly > 0
    }

    /// Residual standard deviation in `y` units.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    fn components(&self, ds: TradingDate) -> (f64, f64, f64) {
        let row = features(self.layout, ds, self.origin, self.span_days);
        let part = |terms: Range<usize>| -> f64 {
            row.slice(s![terms.clone()])
                .dot(&self.coefficients.slice(s![terms]))
                * self.y_scale
        };
        (
            part(self.layout.trend()),
            part(self.layout.weekly_terms()),
            part(self.layout.yearly_terms()),
        )
    }

    fn point(&self, ds: TradingDate, days_ahead: u32) -> ForecastPoint {
        let (trend, weekly, yearly) = self.components(ds);
        let yhat = trend + weekly + yearly;
        let n = self.history.len() as f64;
        let half_width = self.z * self.sigma * (1.0 + f64::from(days_ahead) / n).sqrt();
        ForecastPoint {
            ds,
            yhat,
            yhat_lower: yhat - half_width,
            yhat_upper: yhat + half_width,
            trend,
            weekly,
            yearly,
            is_future: days_ahead > 0,
        }
    }
}

impl ForecastModel for AdditiveModel {
    type Fitted = FittedAdditive;

    fn name(&self) -> &str {
        "additive"
    }

    fn fit(&self, frame: &ForecastFrame) -> Result<FittedAdditive, ForecastError> {
        let z = self.z_score()?;
        let rows = frame.rows();
        let (Some(first), Some(last)) = (frame.first_ds(), frame.last_ds()) else {
            return Err(ForecastError::InsufficientData {
                rows: 0,
                required: MIN_ROWS,
            });
        };
        if rows.len() < MIN_ROWS {
            return Err(ForecastError::InsufficientData {
                rows: rows.len(),
                required: MIN_ROWS,
            });
        }

        let origin = first.julian_day();
        let span = f64::from(last.julian_day() - origin).max(1.0);
        let layout = Layout {
            weekly: if span >= 2.0 * WEEK_DAYS { self.weekly_order } else { 0 },
            yearly: if span >= 2.0 * 365.0 { self.yearly_order } else { 0 },
        };

        let y = rows.iter().map(|row| row.y).collect::<Array1<f64>>();
        let y_scale = y.iter().map(|v| v.abs()).fold(0.0_f64, f64::max);
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let design = design_matrix(layout, rows.iter().map(|row| row.ds), origin, span);
        let coefficients = ridge_fit(&design, &(&y / y_scale), self.ridge)?;

        let residuals = &y - &(design.dot(&coefficients) * y_scale);
        let sse = residuals.dot(&residuals);
        let dof = rows.len().saturating_sub(layout.width()).max(1) as f64;
        let sigma = (sse / dof).sqrt();

        debug!(
            rows = rows.len(),
            weekly = layout.weekly,
            yearly = layout.yearly,
            sigma,
            "fitted additive model"
        );
        Ok(FittedAdditive {
            layout,
            coefficients,
            origin,
            span_days: span,
            y_scale,
            sigma,
            z,
            history: rows.iter().map(|row| row.ds).collect(),
        })
    }
}

impl FittedModel for FittedAdditive {
    fn predict(&self, horizon_days: u32) -> Result<Forecast, ForecastError> {
        let last = *self.history.last().ok_or(ForecastError::InsufficientData {
            rows: 0,
            required: MIN_ROWS,
        })?;

        let mut rows = Vec::with_capacity(self.history.len() + horizon_days as usize);
        rows.extend(self.history.iter().map(|ds| self.point(*ds, 0)));
        for ahead in 1..=horizon_days {
            let ds = last
                .add_days(i64::from(ahead))
                .ok_or(ForecastError::DateOverflow)?;
            rows.push(self.point(ds, ahead));
        }
        Ok(Forecast { rows })
    }
}

fn features(layout: Layout, ds: TradingDate, origin: i32, span: f64) -> Array1<f64> {
    let day = f64::from(ds.julian_day());
    let mut row = Vec::with_capacity(layout.width());
    row.push(1.0);
    row.push(f64::from(ds.julian_day() - origin) / span);
    for (order, period) in [(layout.weekly, WEEK_DAYS), (layout.yearly, YEAR_DAYS)] {
        for k in 1..=order {
            let angle = TAU * k as f64 * day / period;
            row.push(angle.sin());
            row.push(angle.cos());
        }
    }
    Array1::from(row)
}

fn design_matrix(
    layout: Layout,
    dates: impl ExactSizeIterator<Item = TradingDate>,
    origin: i32,
    span: f64,
) -> Array2<f64> {
    let mut design = Array2::zeros((dates.len(), layout.width()));
    for (mut row, ds) in design.rows_mut().into_iter().zip(dates) {
        row.assign(&features(layout, ds, origin, span));
    }
    design
}

/// Ridge as ordinary least squares on `[X; sqrt(λ)·I]` against `[y; 0]`,
/// leaving column 0 (the intercept) unpenalized.
fn ridge_fit(
    design: &Array2<f64>,
    target: &Array1<f64>,
    ridge: f64,
) -> Result<Array1<f64>, ForecastError> {
    let (n, width) = design.dim();
    let penalized = width.saturating_sub(1);

    let mut records = Array2::<f64>::zeros((n + penalized, width));
    records.slice_mut(s![..n, ..]).assign(design);
    let penalty = ridge.max(0.0).sqrt();
    for column in 1..width {
        records[[n + column - 1, column]] = penalty;
    }
    let mut targets = Array1::<f64>::zeros(n + penalized);
    targets.slice_mut(s![..n]).assign(target);

    let fitted = LinearRegression::new()
        .with_intercept(false)
        .fit(&Dataset::new(records, targets))
        .map_err(|error| ForecastError::Solve(error.to_string()))?;
    let coefficients = fitted.params().to_owned();
    if coefficients.iter().all(|c| c.is_finite()) {
        Ok(coefficients)
    } else {
        Err(ForecastError::Solve(String::from(
            "least squares produced non-finite coefficients",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{ForecastRow, FORECAST_HORIZON_DAYS};

    fn linear_frame(days: i64) -> ForecastFrame {
        let start = TradingDate::parse("2023-01-02").expect("date");
        let rows = (0..days)
            .map(|i| ForecastRow {
                ds: start.add_days(i).expect("date"),
                y: 10.0 + 0.5 * i as f64,
            })
            .collect();
        ForecastFrame::new(rows).expect("frame")
    }

    #[test]
    fn extrapolates_a_linear_trend() {
        let fitted = AdditiveModel::default().fit(&linear_frame(60)).expect("fit");
        let forecast = fitted.predict(FORECAST_HORIZON_DAYS).expect("predict");

        assert_eq!(forecast.len(), 60 + 365);
        assert_eq!(forecast.future().count(), 365);

        let first_future = forecast.future().next().expect("future row");
        assert_eq!(first_future.ds.to_string(), "2023-03-03");
        assert!((first_future.yhat - 40.0).abs() < 0.05, "{}", first_future.yhat);

        let last = forecast.rows.last().expect("last row");
        assert!((last.yhat - (10.0 + 0.5 * 424.0)).abs() < 1.0, "{}", last.yhat);
    }

    #[test]
    fn interval_widens_with_horizon_and_brackets_yhat() {
        let start = TradingDate::parse("2023-01-02").expect("date");
        let rows = (0..40)
            .map(|i| ForecastRow {
                ds: start.add_days(i).expect("date"),
                y: 20.0 + if i % 3 == 0 { 1.0 } else { -0.5 },
            })
            .collect();
        let frame = ForecastFrame::new(rows).expect("frame");
        let forecast = AdditiveModel::default()
            .fit(&frame)
            .expect("fit")
            .predict(30)
            .expect("predict");

        let first = forecast.future().next().expect("first");
        let last = forecast.rows.last().expect("last");
        assert!(first.yhat_lower <= first.yhat && first.yhat <= first.yhat_upper);
        assert!(last.yhat_upper - last.yhat_lower > first.yhat_upper - first.yhat_lower);
    }

    #[test]
    fn recovers_weekly_seasonality() {
        let start = TradingDate::parse("2023-01-02").expect("date");
        let rows = (0..56)
            .map(|i| {
                let ds = start.add_days(i).expect("date");
                let angle = TAU * f64::from(ds.julian_day()) / WEEK_DAYS;
                ForecastRow {
                    ds,
                    y: 50.0 + 3.0 * angle.sin(),
                }
            })
            .collect();
        let fitted = AdditiveModel::default()
            .fit(&ForecastFrame::new(rows).expect("frame"))
            .expect("fit");
        assert!(fitted.uses_weekly());
        assert!(!fitted.uses_yearly());

        let forecast = fitted.predict(7).expect("predict");
        let peak = forecast
            .rows
            .iter()
            .map(|row| row.weekly.abs())
            .fold(0.0, f64::max);
        assert!(peak > 2.5, "weekly amplitude {peak}");
    }

    #[test]
    fn interval_uses_the_normal_quantile_for_its_width() {
        let frame = linear_frame(30);
        let mut rows = frame.rows().to_vec();
        for (i, row) in rows.iter_mut().enumerate() {
            row.y += if i % 2 == 0 { 0.4 } else { -0.4 };
        }
        let fitted = AdditiveModel::default()
            .fit(&ForecastFrame::new(rows).expect("frame"))
            .expect("fit");
        let first = fitted.predict(0).expect("predict").rows[0];

        let z = (first.yhat_upper - first.yhat) / fitted.sigma();
        assert!((z - 1.281_551_565_5).abs() < 1e-6, "z = {z}");
    }

    #[test]
    fn rejects_interval_width_outside_unit_range() {
        let model = AdditiveModel {
            interval_width: 1.0,
            ..AdditiveModel::default()
        };
        let err = model.fit(&linear_frame(10)).expect_err("must fail");
        assert_eq!(err, ForecastError::InvalidIntervalWidth { width: 1.0 });
    }

    #[test]
    fn needs_two_rows() {
        let err = AdditiveModel::default()
            .fit(&linear_frame(1))
            .expect_err("must fail");
        assert_eq!(
            err,
            ForecastError::InsufficientData {
                rows: 1,
                required: 2
            }
        );
    }

    #[test]
    fn two_rows_fit_exactly() {
        let forecast = AdditiveModel::default()
            .fit(&linear_frame(2))
            .expect("fit")
            .predict(1)
            .expect("predict");
        assert!((forecast.rows[2].yhat - 11.0).abs() < 1e-3);
    }
}
