use nalgebra::{
    DMatrix,
    DVector
};

use crate::interpolation::interpolation::{
    Interpolation,
    InterpolationKind
};
use crate::interpolation::interpolationerror::{
    InterpolationError,
    Operation
};
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    check_finite,
    NonparametricCurve,
    Point2D
};

// ─────────────────────────────────────────────
// Subpolynomial
// ─────────────────────────────────────────────
//
// 係數以 Horner 形式由高次至低次存放，變數為 (x - lhs_x)。

struct Subpolynomial {
    coefs: Vec<f64>,
    deriv_coefs: Option<Vec<f64>>,
    /// 反導函數係數（常數項為 0），僅在支援積分時存在
    integral_coefs: Option<Vec<f64>>,
    lhs_x: f64,
}

impl Subpolynomial {
    fn new(coefs: Vec<f64>, lhs_x: f64, with_deriv: bool, with_integrals: bool) -> Subpolynomial {
        let deriv_coefs = if with_deriv {
            Some(Self::compute_deriv_coefs(&coefs))
        } else {
            None
        };
        let integral_coefs = if with_integrals {
            Some(Self::compute_integral_coefs(&coefs))
        } else {
            None
        };
        Subpolynomial { coefs, deriv_coefs, integral_coefs, lhs_x }
    }

    fn compute_deriv_coefs(coefs: &[f64]) -> Vec<f64> {
        let order = coefs.len() - 1;
        if order == 0 {
            vec![0.0]
        } else {
            (0..order)
                .map(|i| (order - i) as f64 * coefs[i])
                .collect()
        }
    }

    fn compute_integral_coefs(coefs: &[f64]) -> Vec<f64> {
        let order = coefs.len() - 1;
        let mut result: Vec<f64> = (0..=order)
            .map(|i| coefs[i] / (order - i + 1) as f64)
            .collect();
        result.push(0.0);
        result
    }

    fn value(&self, x: f64) -> f64 {
        self.evaluate(&self.coefs, x)
    }

    fn derivative(&self, x: f64) -> Option<f64> {
        self.deriv_coefs
            .as_ref()
            .map(|d| self.evaluate(d, x))
    }

    /// ∫_{lhs_x}^{x}
    fn integral(&self, x: f64) -> Option<f64> {
        self.integral_coefs
            .as_ref()
            .map(|c| self.evaluate(c, x))
    }

    fn evaluate(&self, coefs: &[f64], x: f64) -> f64 {
        let x_diff = x - self.lhs_x;
        let mut result = coefs[0];
        for &beta in &coefs[1..] {
            result = f64::mul_add(result, x_diff, beta);
        }
        result
    }
}

// ─────────────────────────────────────────────
// Flat / Linear
// ─────────────────────────────────────────────

fn generate_forward_flat_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    points[..(points.len() - 1)]
        .iter()
        .map(|pt| vec![pt.y()])
        .collect()
}

fn generate_linear_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    (0..(points.len() - 1))
        .map(|i| vec![
            Point2D::slope(&points[i], &points[i + 1]),
            points[i].y(),
        ])
        .collect()
}

// ─────────────────────────────────────────────
// 共用輔助函數
// ─────────────────────────────────────────────

fn interval_widths(points: &[Point2D]) -> Vec<f64> {
    (0..(points.len() - 1))
        .map(|i| points[i + 1].x() - points[i].x())
        .collect()
}

/// 由各節點二階導數 m[0..=n] 得到 [d, c, b, a]：
///   S_i(x) = a + b*(x-x_i) + c*(x-x_i)^2 + d*(x-x_i)^3
fn cubic_coefs_from_moments(points: &[Point2D], h: &[f64], m: &[f64]) -> Vec<Vec<f64>> {
    (0..h.len())
        .map(|i| {
            let d = (m[i + 1] - m[i]) / (6.0 * h[i]);
            let c = m[i] / 2.0;
            let b = (points[i + 1].y() - points[i].y()) / h[i]
                  - h[i] * (2.0 * m[i] + m[i + 1]) / 6.0;
            let a = points[i].y();
            vec![d, c, b, a]
        })
        .collect()
}

/// 由各節點一階導數 t[0..=n]（Hermite slopes）得到 [d, c, b, a]
fn cubic_coefs_from_hermite(points: &[Point2D], h: &[f64], t: &[f64]) -> Vec<Vec<f64>> {
    (0..h.len())
        .map(|i| {
            let dy = points[i + 1].y() - points[i].y();
            let a = points[i].y();
            let b = t[i];
            let c = (3.0 * dy / h[i] - 2.0 * t[i] - t[i + 1]) / h[i];
            let d = (-2.0 * dy / h[i] + t[i] + t[i + 1]) / (h[i] * h[i]);
            vec![d, c, b, a]
        })
        .collect()
}

// ─────────────────────────────────────────────
// CubicSpline（Natural / Clamped）
// ─────────────────────────────────────────────
//
// 內部方程式由 C² 連續性導出：
//   h[i-1]*m[i-1] + 2*(h[i-1]+h[i])*m[i] + h[i]*m[i+1]
//     = 6*( (y[i+1]-y[i])/h[i] - (y[i]-y[i-1])/h[i-1] )
// 第 0 列與第 n 列依邊界條件設定。

fn build_interior_system(points: &[Point2D], h: &[f64]) -> (DMatrix<f64>, DVector<f64>) {
    let n = h.len();
    let mut mat = DMatrix::<f64>::zeros(n + 1, n + 1);
    let mut rhs = DVector::<f64>::zeros(n + 1);

    for i in 1..n {
        mat[(i, i - 1)] = h[i - 1];
        mat[(i, i)]     = 2.0 * (h[i - 1] + h[i]);
        mat[(i, i + 1)] = h[i];
        rhs[i] = 6.0 * (
            (points[i + 1].y() - points[i].y()) / h[i]
          - (points[i].y()     - points[i - 1].y()) / h[i - 1]
        );
    }
    (mat, rhs)
}

fn solve_moments(mat: DMatrix<f64>,
                 rhs: DVector<f64>,
                 name: &'static str) -> Result<Vec<f64>, InterpolationError> {
    mat.lu()
        .solve(&rhs)
        .map(|m| m.iter().copied().collect())
        .ok_or(InterpolationError::SingularSystem(name))
}

/// Natural：m[0] = m[n] = 0
fn generate_natural_cubic_coef_list(points: &[Point2D]) -> Result<Vec<Vec<f64>>, InterpolationError> {
    let h = interval_widths(points);
    let n = h.len();

    let (mut mat, rhs) = build_interior_system(points, &h);
    mat[(0, 0)] = 1.0;
    mat[(n, n)] = 1.0;

    let m = solve_moments(mat, rhs, "natural cubic spline")?;
    Ok(cubic_coefs_from_moments(points, &h, &m))
}

/// Clamped：端點一階導數為指定值
///
///   左端：2*h[0]*m[0] + h[0]*m[1]
///           = 6*( (y[1]-y[0])/h[0] - deriv_left )
///   右端：h[n-1]*m[n-1] + 2*h[n-1]*m[n]
///           = 6*( deriv_right - (y[n]-y[n-1])/h[n-1] )
fn generate_clamped_cubic_coef_list(
    points: &[Point2D],
    deriv_left: f64,
    deriv_right: f64,
) -> Result<Vec<Vec<f64>>, InterpolationError> {
    let h = interval_widths(points);
    let n = h.len();

    let (mut mat, mut rhs) = build_interior_system(points, &h);

    mat[(0, 0)] = 2.0 * h[0];
    mat[(0, 1)] = h[0];
    rhs[0] = 6.0 * ((points[1].y() - points[0].y()) / h[0] - deriv_left);

    mat[(n, n - 1)] = h[n - 1];
    mat[(n, n)]     = 2.0 * h[n - 1];
    rhs[n] = 6.0 * (deriv_right - (points[n].y() - points[n - 1].y()) / h[n - 1]);

    let m = solve_moments(mat, rhs, "clamped cubic spline")?;
    Ok(cubic_coefs_from_moments(points, &h, &m))
}

// ─────────────────────────────────────────────
// Akima
// ─────────────────────────────────────────────
//
// 節點斜率為鄰近有限差分的加權平均：
//   w1 = |s[i+1] - s[i]|
//   w2 = |s[i-1] - s[i-2]|
// 端點以外推補齊幽靈點：
//   s[-1] = 2*s[0] - s[1],   s[-2] = 2*s[-1] - s[0]
//   s[n]  = 2*s[n-1] - s[n-2], s[n+1] = 2*s[n] - s[n-1]

fn akima_slopes(points: &[Point2D], h: &[f64]) -> Vec<f64> {
    let n = h.len();

    let s: Vec<f64> = (0..n)
        .map(|i| (points[i + 1].y() - points[i].y()) / h[i])
        .collect();

    // n=1 時左右退化為同一個值
    let s1 = if n > 1 { s[1] } else { s[0] };
    let sn2 = if n > 1 { s[n - 2] } else { s[n - 1] };

    let s_m1 = 2.0 * s[0]      - s1;
    let s_m2 = 2.0 * s_m1      - s[0];
    let s_np1 = 2.0 * s[n - 1] - sn2;
    let s_np2 = 2.0 * s_np1    - s[n - 1];

    // ext[i+2] 對應 s[i]
    let mut ext = Vec::with_capacity(n + 4);
    ext.push(s_m2);
    ext.push(s_m1);
    ext.extend_from_slice(&s);
    ext.push(s_np1);
    ext.push(s_np2);

    (0..=n)
        .map(|i| {
            let sm2 = ext[i];
            let sm1 = ext[i + 1];
            let sp0 = ext[i + 2];
            let sp1 = ext[i + 3];

            let w1 = (sp1 - sp0).abs();
            let w2 = (sm1 - sm2).abs();

            if w1 + w2 < f64::EPSILON {
                (sm1 + sp0) / 2.0
            } else {
                (w1 * sm1 + w2 * sp0) / (w1 + w2)
            }
        })
        .collect()
}

fn generate_akima_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    let h = interval_widths(points);
    let t = akima_slopes(points, &h);
    cubic_coefs_from_hermite(points, &h, &t)
}

// ─────────────────────────────────────────────
// PCHIP（Fritsch-Carlson，保單調性）
// ─────────────────────────────────────────────
//
// 內部節點：s[i-1]*s[i] <= 0 → t[i] = 0，否則取加權調和平均
//   w1 = 2*h[i] + h[i-1]，w2 = h[i] + 2*h[i-1]
// 端點：單側三點公式，符號相反 → 0，過大 → 3*s

fn pchip_end_slope(h0: f64, h1: f64, s0: f64, s1: f64) -> f64 {
    let raw = ((2.0 * h0 + h1) * s0 - h0 * s1) / (h0 + h1);
    if raw.signum() != s0.signum() {
        0.0
    } else if s0.signum() != s1.signum() && raw.abs() > 3.0 * s0.abs() {
        3.0 * s0
    } else {
        raw
    }
}

fn generate_pchip_coef_list(points: &[Point2D]) -> Vec<Vec<f64>> {
    let h = interval_widths(points);
    let n = h.len();
    let s: Vec<f64> = (0..n)
        .map(|i| (points[i + 1].y() - points[i].y()) / h[i])
        .collect();

    let mut t = vec![0.0_f64; n + 1];

    if n == 1 {
        t[0] = s[0];
        t[1] = s[0];
        return cubic_coefs_from_hermite(points, &h, &t);
    }

    for i in 1..n {
        if s[i - 1] * s[i] > 0.0 {
            let w1 = 2.0 * h[i]     + h[i - 1];
            let w2 = h[i] + 2.0 * h[i - 1];
            t[i] = (w1 + w2) / (w1 / s[i - 1] + w2 / s[i]);
        }
    }

    t[0] = pchip_end_slope(h[0], h[1], s[0], s[1]);
    t[n] = pchip_end_slope(h[n - 1], h[n - 2], s[n - 1], s[n - 2]);

    cubic_coefs_from_hermite(points, &h, &t)
}

// ─────────────────────────────────────────────
// PolynomialType
// ─────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PolynomialType {
    /// 左連續階梯函數；無法重現線性樣本
    ForwardFlat,
    Linear,
    NaturalCubic,
    /// 端點一階導數固定為 0.0；無法重現線性樣本
    ClampedCubic,
    AkimaCubic,
    PiecewiseCubicHermite,
}

impl PolynomialType {
    pub fn necessary_points(&self) -> usize {
        match self {
            PolynomialType::ForwardFlat           => 1,
            PolynomialType::Linear                => 2,
            PolynomialType::NaturalCubic          => 2,
            PolynomialType::ClampedCubic          => 2,
            PolynomialType::AkimaCubic            => 2,
            PolynomialType::PiecewiseCubicHermite => 2,
        }
    }

    pub fn kind(&self) -> InterpolationKind {
        match self {
            PolynomialType::ForwardFlat           => InterpolationKind::new("PiecewisePolynomial::ForwardFlat"),
            PolynomialType::Linear                => InterpolationKind::new("PiecewisePolynomial::Linear"),
            PolynomialType::NaturalCubic          => InterpolationKind::new("PiecewisePolynomial::NaturalCubic"),
            PolynomialType::ClampedCubic          => InterpolationKind::new("PiecewisePolynomial::ClampedCubic"),
            PolynomialType::AkimaCubic            => InterpolationKind::new("PiecewisePolynomial::AkimaCubic"),
            PolynomialType::PiecewiseCubicHermite => InterpolationKind::new("PiecewisePolynomial::PiecewiseCubicHermite"),
        }
    }
}

// ─────────────────────────────────────────────
// PiecewisePolynomial
// ─────────────────────────────────────────────

pub struct PiecewisePolynomial {
    max_x: f64,
    max_y: f64,
    polynomial_type: PolynomialType,
    subpolynomial_list: Vec<Subpolynomial>,
    /// cumulative_integrals[i] = ∫_{min_x}^{x_i}
    cumulative_integrals: Vec<f64>,
    has_derivatives: bool,
    has_integrals: bool,
}

impl PiecewisePolynomial {
    pub fn new(
        polynomial_type: PolynomialType,
        points: &[f64],
        values: &[f64],
    ) -> Result<PiecewisePolynomial, InterpolationError> {
        Self::new_inner(polynomial_type, points, values, false, false)
    }

    pub fn new_with_derivatives(
        polynomial_type: PolynomialType,
        points: &[f64],
        values: &[f64],
    ) -> Result<PiecewisePolynomial, InterpolationError> {
        Self::new_inner(polynomial_type, points, values, true, false)
    }

    pub fn new_with_integrals(
        polynomial_type: PolynomialType,
        points: &[f64],
        values: &[f64],
    ) -> Result<PiecewisePolynomial, InterpolationError> {
        Self::new_inner(polynomial_type, points, values, false, true)
    }

    pub fn new_with_derivatives_and_integrals(
        polynomial_type: PolynomialType,
        points: &[f64],
        values: &[f64],
    ) -> Result<PiecewisePolynomial, InterpolationError> {
        Self::new_inner(polynomial_type, points, values, true, true)
    }

    fn new_inner(
        polynomial_type: PolynomialType,
        points: &[f64],
        values: &[f64],
        with_deriv: bool,
        with_integrals: bool,
    ) -> Result<PiecewisePolynomial, InterpolationError> {
        let nodes = Point2D::zip_sorted(points, values, polynomial_type.necessary_points())?;
        let last = nodes[nodes.len() - 1];

        let coef_list = if nodes.len() == 1 {
            vec![vec![last.y()]]
        } else {
            match polynomial_type {
                PolynomialType::ForwardFlat           => generate_forward_flat_coef_list(&nodes),
                PolynomialType::Linear                => generate_linear_coef_list(&nodes),
                PolynomialType::NaturalCubic          => generate_natural_cubic_coef_list(&nodes)?,
                PolynomialType::ClampedCubic          => generate_clamped_cubic_coef_list(&nodes, 0.0, 0.0)?,
                PolynomialType::AkimaCubic            => generate_akima_coef_list(&nodes),
                PolynomialType::PiecewiseCubicHermite => generate_pchip_coef_list(&nodes),
            }
        };

        let subpolynomial_list: Vec<Subpolynomial> = coef_list
            .into_iter()
            .zip(nodes.iter())
            .map(|(coefs, pt)| Subpolynomial::new(coefs, pt.x(), with_deriv, with_integrals))
            .collect();

        let mut cumulative_integrals = vec![0.0; subpolynomial_list.len()];
        if with_integrals {
            for i in 1..subpolynomial_list.len() {
                let previous = &subpolynomial_list[i - 1];
                cumulative_integrals[i] = cumulative_integrals[i - 1]
                    + previous.integral(subpolynomial_list[i].lhs_x).unwrap_or(0.0);
            }
        }

        Ok(PiecewisePolynomial {
            subpolynomial_list,
            max_x: last.x(),
            max_y: last.y(),
            polynomial_type,
            cumulative_integrals,
            has_derivatives: with_deriv,
            has_integrals: with_integrals,
        })
    }

    fn find_segment(&self, x: f64) -> usize {
        if x <= self.min_x() {
            0
        } else if x >= self.max_x {
            self.subpolynomial_list.len() - 1
        } else {
            self.subpolynomial_list
                .partition_point(|s| s.lhs_x <= x) - 1
        }
    }

    fn value(&self, x: f64) -> f64 {
        // 右端點直接回傳節點值，避免 Horner 累積的捨入誤差
        if x == self.max_x {
            return self.max_y;
        }
        self.subpolynomial_list[self.find_segment(x)].value(x)
    }

    fn derivative(&self, x: f64, operation: Operation) -> Result<f64, InterpolationError> {
        self.subpolynomial_list[self.find_segment(x)]
            .derivative(x)
            .ok_or(InterpolationError::unsupported(operation))
    }
}

// ─────────────────────────────────────────────
// Trait 實作
// ─────────────────────────────────────────────

impl NonparametricCurve for PiecewisePolynomial {
    fn min_x(&self) -> f64 {
        self.subpolynomial_list[0].lhs_x
    }
}

impl Interpolation for PiecewisePolynomial {
    fn interpolate(&self, x: f64) -> Result<f64, InterpolationError> {
        check_finite(x).map(|x| self.value(x))
    }

    fn supports_differentiation(&self) -> bool {
        self.has_derivatives
    }

    fn supports_integration(&self) -> bool {
        self.has_integrals
    }

    fn differentiate(&self, x: f64) -> Result<f64, InterpolationError> {
        let x = check_finite(x)?;
        self.derivative(x, Operation::Differentiate)
    }

    fn differentiate_with_value(&self, x: f64) -> Result<(f64, f64), InterpolationError> {
        let x = check_finite(x)?;
        let d = self.derivative(x, Operation::DifferentiateWithValue)?;
        Ok((self.value(x), d))
    }

    fn integrate(&self, upper_bound: f64) -> Result<f64, InterpolationError> {
        if !self.has_integrals {
            return Err(InterpolationError::unsupported(Operation::Integrate));
        }
        let x = check_finite(upper_bound)?;
        let i = self.find_segment(x);
        self.subpolynomial_list[i]
            .integral(x)
            .map(|partial| self.cumulative_integrals[i] + partial)
            .ok_or(InterpolationError::unsupported(Operation::Integrate))
    }

    fn kind(&self) -> InterpolationKind {
        self.polynomial_type.kind()
    }
}
