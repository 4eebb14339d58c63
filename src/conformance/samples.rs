use rand::Rng;

// ─────────────────────────────────────────────────────────────────────────────
// SampleSet
// ─────────────────────────────────────────────────────────────────────────────

/// 建構候選實作所用的 (x, y) 樣本。框架不排序、不去重。
#[derive(Debug, PartialEq, Clone)]
pub struct SampleSet {
    points: Vec<f64>,
    values: Vec<f64>,
}

impl SampleSet {
    pub fn new(points: Vec<f64>, values: Vec<f64>) -> SampleSet {
        SampleSet { points, values }
    }

    /// 檢查 A、B 使用的三點樣本
    pub fn three_point() -> SampleSet {
        SampleSet::new(vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0])
    }

    /// 檢查 C 使用的非等距五點樣本
    pub fn five_point() -> SampleSet {
        SampleSet::new(vec![1.0, 2.0, 2.3, 3.0, 8.0], vec![50.0, 20.0, 30.0, 10.0, -20.0])
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().copied().zip(self.values.iter().copied())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 線性樣本（檢查 D）
// ─────────────────────────────────────────────────────────────────────────────
//
// 樣本落在 y = Y_OFFSET + (x - X_OFFSET)，x = X_OFFSET + k，k in 0..order。
// 探測點：
//   order == 1：X_OFFSET - r0 與 X_OFFSET + r1，期望值 Y_OFFSET
//   否則     ：X_OFFSET + (i-1) + r_i，i in 0..=order，期望值為同一條直線
// 其中 r ∈ [0, 1)。

pub const X_OFFSET: f64 = 4.0;
pub const Y_OFFSET: f64 = 2.0;

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Probe {
    pub x: f64,
    pub expected: f64,
}

fn linear_value(x: f64) -> f64 {
    Y_OFFSET + (x - X_OFFSET)
}

pub fn linear_samples(order: usize) -> SampleSet {
    let points: Vec<f64> = (0..order).map(|k| X_OFFSET + k as f64).collect();
    let values: Vec<f64> = points.iter().map(|&x| linear_value(x)).collect();
    SampleSet::new(points, values)
}

pub fn linear_probes<R: Rng + ?Sized>(order: usize, rng: &mut R) -> Vec<Probe> {
    if order == 1 {
        let below = X_OFFSET - rng.gen_range(0.0..1.0);
        let above = X_OFFSET + rng.gen_range(0.0..1.0);
        return vec![
            Probe { x: below, expected: Y_OFFSET },
            Probe { x: above, expected: Y_OFFSET },
        ];
    }

    (0..=order)
        .map(|i| {
            let x = X_OFFSET + (i as f64 - 1.0) + rng.gen_range(0.0..1.0);
            Probe { x, expected: linear_value(x) }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn order_four_samples() {
        let samples = linear_samples(4);
        assert_eq!(samples.points(), &[4.0, 5.0, 6.0, 7.0]);
        assert_eq!(samples.values(), &[2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn probes_cover_the_span() {
        let mut rng = StdRng::seed_from_u64(7);
        let probes = linear_probes(4, &mut rng);
        assert_eq!(probes.len(), 5);
        for (i, probe) in probes.iter().enumerate() {
            let lower = X_OFFSET + i as f64 - 1.0;
            assert!(probe.x >= lower && probe.x <= lower + 1.0);
            assert!((probe.expected - (probe.x - 2.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn single_sample_probes_straddle_the_node() {
        let mut rng = StdRng::seed_from_u64(11);
        let probes = linear_probes(1, &mut rng);
        assert_eq!(probes.len(), 2);
        assert!(probes[0].x <= X_OFFSET && probes[0].x > X_OFFSET - 1.0);
        assert!(probes[1].x >= X_OFFSET && probes[1].x < X_OFFSET + 1.0);
        assert!(probes.iter().all(|p| p.expected == Y_OFFSET));
    }

    #[test]
    fn same_seed_same_probes() {
        let a = linear_probes(6, &mut StdRng::seed_from_u64(42));
        let b = linear_probes(6, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
