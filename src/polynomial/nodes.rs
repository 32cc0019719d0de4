//! Gauss-Legendre nodes and weights.
//!
//! The N Gauss-Legendre nodes are the roots of P_N(x), all interior to
//! (-1, 1). The associated quadrature integrates polynomials exactly up to
//! degree 2N-1, which makes the spectral analysis step exact on a Gauss
//! colatitude grid whenever the truncation satisfies 2*lmax + 1 <= 2N - 1.

use super::legendre::legendre_and_derivative;
use std::f64::consts::PI;

/// Compute the N Gauss-Legendre nodes in (-1, 1), in increasing order.
///
/// Uses Newton iteration on P_N(x) starting from the Chebyshev-based
/// asymptotic guesses x_k ≈ cos(π (4k+3) / (4N+2)).
pub fn gauss_legendre_nodes(n: usize) -> Vec<f64> {
    assert!(n >= 1, "need at least one quadrature node");

    let mut nodes = vec![0.0; n];

    // Roots come in symmetric pairs; compute the non-negative half and
    // mirror. Odd N has a root exactly at 0.
    let half = n / 2;
    for k in 0..half {
        // Initial guess for the k-th root counted from x = +1.
        let mut x = (PI * (4 * k + 3) as f64 / (4 * n + 2) as f64).cos();

        for _ in 0..100 {
            let (p, dp) = legendre_and_derivative(n, x);
            let update = p / dp;
            x -= update;
            if update.abs() < 1e-15 {
                break;
            }
        }

        nodes[n - 1 - k] = x;
        nodes[k] = -x;
    }
    if n % 2 == 1 {
        nodes[half] = 0.0;
    }

    nodes
}

/// Compute the Gauss-Legendre weights for the given nodes.
///
/// The weights are: w_k = 2 / ((1 - x_k²) [P'_N(x_k)]²)
pub fn gauss_legendre_weights(n: usize, nodes: &[f64]) -> Vec<f64> {
    assert_eq!(nodes.len(), n, "need exactly N nodes");

    let mut weights = Vec::with_capacity(n);
    for &x in nodes {
        let (_, dp) = legendre_and_derivative(n, x);
        weights.push(2.0 / ((1.0 - x * x) * dp * dp));
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::legendre;

    #[test]
    fn test_nodes_are_roots() {
        for n in 1..=32 {
            let nodes = gauss_legendre_nodes(n);
            assert_eq!(nodes.len(), n);
            for &x in &nodes {
                assert!(
                    legendre(n, x).abs() < 1e-13,
                    "P_{}({}) should be zero, got {}",
                    n,
                    x,
                    legendre(n, x)
                );
            }
        }
    }

    #[test]
    fn test_nodes_sorted_and_interior() {
        for n in 1..=16 {
            let nodes = gauss_legendre_nodes(n);
            for w in nodes.windows(2) {
                assert!(w[0] < w[1], "nodes must be strictly increasing");
            }
            assert!(nodes[0] > -1.0 && nodes[n - 1] < 1.0);
        }
    }

    #[test]
    fn test_nodes_symmetry() {
        for n in 2..=16 {
            let nodes = gauss_legendre_nodes(n);
            for i in 0..n / 2 {
                assert!(
                    (nodes[i] + nodes[n - 1 - i]).abs() < 1e-15,
                    "nodes should be symmetric about 0"
                );
            }
        }
    }

    #[test]
    fn test_known_two_point_rule() {
        let nodes = gauss_legendre_nodes(2);
        assert!((nodes[1] - 1.0 / 3.0_f64.sqrt()).abs() < 1e-15);
        let weights = gauss_legendre_weights(2, &nodes);
        assert!((weights[0] - 1.0).abs() < 1e-14);
        assert!((weights[1] - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_weights_sum() {
        // Weights sum to the interval length 2.
        for n in 1..=24 {
            let nodes = gauss_legendre_nodes(n);
            let weights = gauss_legendre_weights(n, &nodes);
            let sum: f64 = weights.iter().sum();
            assert!((sum - 2.0).abs() < 1e-13, "N={}: got {}", n, sum);
        }
    }

    #[test]
    fn test_quadrature_exactness() {
        // N-point Gauss quadrature is exact for polynomials up to 2N-1.
        for n in 1..=8 {
            let nodes = gauss_legendre_nodes(n);
            let weights = gauss_legendre_weights(n, &nodes);

            let max_degree = 2 * n - 1;
            for k in 0..=max_degree {
                let exact = if k % 2 == 0 {
                    2.0 / (k + 1) as f64
                } else {
                    0.0
                };

                let numerical: f64 = nodes
                    .iter()
                    .zip(weights.iter())
                    .map(|(&x, &w)| w * x.powi(k as i32))
                    .sum();

                assert!(
                    (numerical - exact).abs() < 1e-13,
                    "N={}, degree {}: expected {}, got {}",
                    n,
                    k,
                    exact,
                    numerical
                );
            }
        }
    }
}
