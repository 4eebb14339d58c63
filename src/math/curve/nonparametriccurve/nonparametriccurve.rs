use crate::interpolation::interpolationerror::InterpolationError;

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Point2D {
    x: f64,
    y: f64
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Point2D {
        Point2D { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn slope(lhs_pt: &Point2D, rhs_pt: &Point2D) -> f64 {
        (rhs_pt.y - lhs_pt.y) / (rhs_pt.x - lhs_pt.x)
    }

    /// 將平行的 points / values 組成節點，並依 x 排序。
    ///
    /// 驗證：長度一致、至少 `required` 個點、皆為有限值、x 不重複。
    pub fn zip_sorted(points: &[f64],
                      values: &[f64],
                      required: usize) -> Result<Vec<Point2D>, InterpolationError> {
        if points.len() != values.len() {
            return Err(InterpolationError::LengthMismatch {
                points: points.len(),
                values: values.len()
            });
        }
        if points.len() < required {
            return Err(InterpolationError::InsufficientPoints {
                required,
                given: points.len()
            });
        }
        if let Some(bad) = points.iter().chain(values.iter()).find(|v| !v.is_finite()) {
            return Err(InterpolationError::NonFinite(*bad));
        }

        let mut pts: Vec<Point2D> = points
            .iter()
            .zip(values.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
            .collect();
        pts.sort_by(|a, b| a.x.total_cmp(&b.x));

        if let Some(w) = pts.windows(2).find(|w| w[0].x == w[1].x) {
            return Err(InterpolationError::DuplicateNode(w[0].x));
        }
        Ok(pts)
    }
}

pub fn check_finite(x: f64) -> Result<f64, InterpolationError> {
    if x.is_finite() { Ok(x) } else { Err(InterpolationError::NonFinite(x)) }
}

/// 以排序後節點定義的曲線；積分自最小節點起算
pub trait NonparametricCurve {
    fn min_x(&self) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_sorted_orders_by_x() {
        let pts = Point2D::zip_sorted(&[3.0, 1.0, 2.0], &[30.0, 10.0, 20.0], 1).unwrap();
        let xs: Vec<f64> = pts.iter().map(|p| p.x()).collect();
        let ys: Vec<f64> = pts.iter().map(|p| p.y()).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert_eq!(ys, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn zip_sorted_rejects_bad_input() {
        assert_eq!(
            Point2D::zip_sorted(&[1.0, 2.0], &[1.0], 1),
            Err(InterpolationError::LengthMismatch { points: 2, values: 1 })
        );
        assert_eq!(
            Point2D::zip_sorted(&[1.0], &[1.0], 2),
            Err(InterpolationError::InsufficientPoints { required: 2, given: 1 })
        );
        assert_eq!(
            Point2D::zip_sorted(&[1.0, 1.0], &[1.0, 2.0], 1),
            Err(InterpolationError::DuplicateNode(1.0))
        );
        assert!(matches!(
            Point2D::zip_sorted(&[1.0, f64::NAN], &[1.0, 2.0], 1),
            Err(InterpolationError::NonFinite(_))
        ));
    }
}
