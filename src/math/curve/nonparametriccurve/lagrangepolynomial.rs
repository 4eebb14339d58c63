use crate::interpolation::interpolation::Interpolation;
use crate::interpolation::interpolationerror::{
    InterpolationError,
    Operation
};
use crate::math::curve::nonparametriccurve::nonparametriccurve::{
    check_finite,
    NonparametricCurve,
    Point2D
};

// ─────────────────────────────────────────────────────────────────────────────
// LagrangePolynomial - Barycentric Form (2nd kind)
// ─────────────────────────────────────────────────────────────────────────────
//
// 求值使用 Barycentric 第二類公式：
//
//   L(x) = Σ w_i·y_i/(x-x_i) / Σ w_i/(x-x_i)
//
// 其中 barycentric weights:
//   w_i = 1 / Π_{j≠i} (x_i - x_j)
//
// 能力旗標由建構子決定：
//   new                                → 僅 interpolate
//   new_with_derivatives               → + differentiate
//   new_with_integrals                 → + integrate（轉為 monomial form）
//   new_with_derivatives_and_integrals → 兩者皆有
//
// 注意：全域插值，節點多時可能出現 Runge 振盪。

pub struct LagrangePolynomial {
    x_data: Vec<f64>,
    y_data: Vec<f64>,
    weights: Vec<f64>,
    has_derivatives: bool,
    /// Monomial form 係數 [a_0, a_1, ..., a_n]，代表 Σ a_k·x^k
    monomial_coefs: Option<Vec<f64>>,
}

impl LagrangePolynomial {
    pub fn new(points: &[f64], values: &[f64]) -> Result<LagrangePolynomial, InterpolationError> {
        Self::new_inner(points, values, false, false)
    }

    pub fn new_with_derivatives(points: &[f64], values: &[f64]) -> Result<LagrangePolynomial, InterpolationError> {
        Self::new_inner(points, values, true, false)
    }

    pub fn new_with_integrals(points: &[f64], values: &[f64]) -> Result<LagrangePolynomial, InterpolationError> {
        Self::new_inner(points, values, false, true)
    }

    pub fn new_with_derivatives_and_integrals(points: &[f64], values: &[f64]) -> Result<LagrangePolynomial, InterpolationError> {
        Self::new_inner(points, values, true, true)
    }

    fn new_inner(
        points: &[f64],
        values: &[f64],
        with_deriv: bool,
        with_integrals: bool,
    ) -> Result<LagrangePolynomial, InterpolationError> {
        let nodes = Point2D::zip_sorted(points, values, 1)?;

        let x_data: Vec<f64> = nodes.iter().map(|p| p.x()).collect();
        let y_data: Vec<f64> = nodes.iter().map(|p| p.y()).collect();
        let weights = Self::compute_barycentric_weights(&x_data);

        let monomial_coefs = if with_integrals {
            Some(Self::convert_to_monomial(&x_data, &y_data))
        } else {
            None
        };

        Ok(LagrangePolynomial {
            x_data,
            y_data,
            weights,
            has_derivatives: with_deriv,
            monomial_coefs,
        })
    }

    /// w_i = 1 / Π_{j≠i} (x_i - x_j)，O(n²)
    fn compute_barycentric_weights(x_data: &[f64]) -> Vec<f64> {
        let n = x_data.len();
        let mut weights = vec![1.0; n];

        for i in 0..n {
            for j in 0..n {
                if i != j {
                    weights[i] /= x_data[i] - x_data[j];
                }
            }
        }

        weights
    }

    /// Lagrange → Newton divided differences → monomial form。
    ///
    /// 回傳 [a_0, ..., a_{n-1}]，代表 a_0 + a_1·x + ... + a_{n-1}·x^{n-1}
    fn convert_to_monomial(x_data: &[f64], y_data: &[f64]) -> Vec<f64> {
        let n = x_data.len();

        let mut f = y_data.to_vec();
        for j in 1..n {
            for i in (j..n).rev() {
                f[i] = (f[i] - f[i - 1]) / (x_data[i] - x_data[i - j]);
            }
        }

        // 由高次往低次展開：乘上 (x - x_i) 再加 f[x_0,...,x_i]
        let mut monomial = vec![0.0; n];
        monomial[0] = f[n - 1];

        for i in (0..n - 1).rev() {
            for k in (1..n).rev() {
                monomial[k] = monomial[k - 1] - x_data[i] * monomial[k];
            }
            monomial[0] = -x_data[i] * monomial[0];
            monomial[0] += f[i];
        }

        monomial
    }

    fn node_index(&self, x: f64) -> Option<usize> {
        self.x_data.iter().position(|&xi| x == xi)
    }

    /// 節點上直接回傳 y_i（避免 0/0）
    fn value_barycentric(&self, x: f64) -> f64 {
        if let Some(i) = self.node_index(x) {
            return self.y_data[i];
        }

        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for i in 0..self.x_data.len() {
            let temp = self.weights[i] / (x - self.x_data[i]);
            numerator += temp * self.y_data[i];
            denominator += temp;
        }

        numerator / denominator
    }

    /// L'(x) = (N'·D - N·D') / D²
    ///
    /// 節點 x_j 上改用 L'(x_j) = Σ_{i≠j} (w_i/w_j)·(y_i - y_j)/(x_j - x_i)
    fn derivative_barycentric(&self, x: f64) -> f64 {
        if let Some(j) = self.node_index(x) {
            return (0..self.x_data.len())
                .filter(|&i| i != j)
                .map(|i| {
                    (self.weights[i] / self.weights[j]) * (self.y_data[i] - self.y_data[j])
                        / (self.x_data[j] - self.x_data[i])
                })
                .sum();
        }

        let mut n_val = 0.0;
        let mut d_val = 0.0;
        let mut n_prime = 0.0;
        let mut d_prime = 0.0;

        for i in 0..self.x_data.len() {
            let diff = x - self.x_data[i];
            let temp = self.weights[i] / diff;
            let temp_sq = temp / diff;

            n_val += temp * self.y_data[i];
            d_val += temp;
            n_prime -= temp_sq * self.y_data[i];
            d_prime -= temp_sq;
        }

        (n_prime * d_val - n_val * d_prime) / (d_val * d_val)
    }

    /// ∫_a^b Σ c_k·x^k dx = Σ c_k·[x^(k+1)/(k+1)]_a^b
    fn integral_monomial(coefs: &[f64], a: f64, b: f64) -> f64 {
        coefs
            .iter()
            .enumerate()
            .map(|(k, c)| {
                let power = (k + 1) as i32;
                c * (b.powi(power) - a.powi(power)) / power as f64
            })
            .sum()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Trait 實作
// ─────────────────────────────────────────────────────────────────────────────

impl NonparametricCurve for LagrangePolynomial {
    fn min_x(&self) -> f64 {
        self.x_data[0]
    }
}

impl Interpolation for LagrangePolynomial {
    fn interpolate(&self, x: f64) -> Result<f64, InterpolationError> {
        check_finite(x).map(|x| self.value_barycentric(x))
    }

    fn supports_differentiation(&self) -> bool {
        self.has_derivatives
    }

    fn supports_integration(&self) -> bool {
        self.monomial_coefs.is_some()
    }

    fn differentiate(&self, x: f64) -> Result<f64, InterpolationError> {
        if !self.has_derivatives {
            return Err(InterpolationError::unsupported(Operation::Differentiate));
        }
        check_finite(x).map(|x| self.derivative_barycentric(x))
    }

    fn differentiate_with_value(&self, x: f64) -> Result<(f64, f64), InterpolationError> {
        if !self.has_derivatives {
            return Err(InterpolationError::unsupported(Operation::DifferentiateWithValue));
        }
        let x = check_finite(x)?;
        Ok((self.value_barycentric(x), self.derivative_barycentric(x)))
    }

    fn integrate(&self, upper_bound: f64) -> Result<f64, InterpolationError> {
        let coefs = self
            .monomial_coefs
            .as_ref()
            .ok_or(InterpolationError::unsupported(Operation::Integrate))?;
        let b = check_finite(upper_bound)?;
        Ok(Self::integral_monomial(coefs, self.min_x(), b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-10;

    #[test]
    fn passes_through_unsorted_nodes() {
        let lp = LagrangePolynomial::new(&[3.0, 1.0, 2.0], &[9.0, 1.0, 4.0]).unwrap();
        assert_eq!(lp.interpolate(1.0), Ok(1.0));
        assert_eq!(lp.interpolate(3.0), Ok(9.0));
        assert!((lp.interpolate(2.5).unwrap() - 6.25).abs() < EPS);
    }

    #[test]
    fn derivative_of_quadratic() {
        let lp = LagrangePolynomial::new_with_derivatives(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
        assert!((lp.differentiate(1.5).unwrap() - 3.0).abs() < EPS);
        // 節點上
        assert!((lp.differentiate(1.0).unwrap() - 2.0).abs() < EPS);
        let (v, d) = lp.differentiate_with_value(0.5).unwrap();
        assert!((v - 0.25).abs() < EPS);
        assert!((d - 1.0).abs() < EPS);
    }

    #[test]
    fn integral_from_first_node() {
        let lp = LagrangePolynomial::new_with_integrals(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
        // ∫_0^3 x² dx = 9
        assert!((lp.integrate(3.0).unwrap() - 9.0).abs() < EPS);
        assert!(lp.integrate(0.0).unwrap().abs() < EPS);
    }

    #[test]
    fn capability_flags_follow_constructor() {
        let pts = [1.0, 2.0, 3.0];
        let vals = [10.0, 20.0, 30.0];

        let plain = LagrangePolynomial::new(&pts, &vals).unwrap();
        assert!(!plain.supports_differentiation());
        assert!(!plain.supports_integration());
        assert!(plain.differentiate(1.2).unwrap_err().is_unsupported());
        assert!(plain.integrate(1.2).unwrap_err().is_unsupported());

        let both = LagrangePolynomial::new_with_derivatives_and_integrals(&pts, &vals).unwrap();
        assert!(both.supports_differentiation());
        assert!(both.supports_integration());
        assert!(both.differentiate(1.2).is_ok());
        assert!(both.integrate(1.2).is_ok());
    }

    #[test]
    fn single_node_is_constant() {
        let lp = LagrangePolynomial::new_with_derivatives(&[4.0], &[2.0]).unwrap();
        assert!((lp.interpolate(3.5).unwrap() - 2.0).abs() < EPS);
        assert!((lp.interpolate(4.7).unwrap() - 2.0).abs() < EPS);
        assert!(lp.differentiate(4.0).unwrap().abs() < EPS);
    }

    #[test]
    fn rejects_non_finite_argument() {
        let lp = LagrangePolynomial::new(&[1.0, 2.0], &[1.0, 2.0]).unwrap();
        assert!(matches!(lp.interpolate(f64::NAN), Err(InterpolationError::NonFinite(_))));
    }
}
