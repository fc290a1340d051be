use crate::utils::error::{EtlError, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Lloyd's algorithm over 2-D points with k-means++ seeding.
///
/// Runs `n_init` independent initializations from one seeded rng and keeps
/// the fit with the lowest inertia, so results are reproducible for a given
/// seed even though individual restarts are random.
#[derive(Debug, Clone)]
pub struct KMeans {
    pub k: usize,
    pub n_init: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

impl KMeans {
    pub fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            n_init: 10,
            max_iterations: 300,
            seed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub centroids: Vec<[f64; 2]>,
    /// One cluster index per input point, in input order.
    pub assignments: Vec<usize>,
    /// Sum of squared distances from each point to its assigned centroid.
    pub inertia: f64,
}

fn squared_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

impl KMeans {
    pub fn fit(&self, points: &[[f64; 2]]) -> Result<KMeansFit> {
        if self.k == 0 {
            return Err(EtlError::ConfigError {
                message: "cluster count must be at least 1".to_string(),
            });
        }
        if points.len() < self.k {
            return Err(EtlError::InsufficientData {
                needed: self.k,
                got: points.len(),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;

        for _ in 0..self.n_init.max(1) {
            let centroids = self.seed_centroids(points, &mut rng);
            let fit = self.lloyd(points, centroids);
            if best.as_ref().map_or(true, |b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }

        // n_init >= 1, so a best fit always exists here.
        best.ok_or_else(|| EtlError::ProcessingError {
            message: "k-means produced no fit".to_string(),
        })
    }

    /// k-means++: first centroid uniform, each subsequent one drawn with
    /// probability proportional to its squared distance from the nearest
    /// centroid chosen so far.
    fn seed_centroids(&self, points: &[[f64; 2]], rng: &mut StdRng) -> Vec<[f64; 2]> {
        let mut centroids = Vec::with_capacity(self.k);
        centroids.push(points[rng.gen_range(0..points.len())]);

        let mut dist2: Vec<f64> = points
            .iter()
            .map(|&p| squared_distance(p, centroids[0]))
            .collect();

        while centroids.len() < self.k {
            let total: f64 = dist2.iter().sum();
            let next = if total > 0.0 {
                let mut target = rng.gen::<f64>() * total;
                let mut chosen = points.len() - 1;
                for (i, &d) in dist2.iter().enumerate() {
                    target -= d;
                    if target <= 0.0 {
                        chosen = i;
                        break;
                    }
                }
                points[chosen]
            } else {
                // All remaining points coincide with a centroid.
                points[rng.gen_range(0..points.len())]
            };

            centroids.push(next);
            for (d, &p) in dist2.iter_mut().zip(points.iter()) {
                let to_next = squared_distance(p, next);
                if to_next < *d {
                    *d = to_next;
                }
            }
        }

        centroids
    }

    fn lloyd(&self, points: &[[f64; 2]], mut centroids: Vec<[f64; 2]>) -> KMeansFit {
        let mut assignments = vec![0usize; points.len()];

        for _ in 0..self.max_iterations {
            let mut changed = false;
            for (i, &p) in points.iter().enumerate() {
                let cluster = nearest_centroid(p, &centroids);
                if assignments[i] != cluster {
                    assignments[i] = cluster;
                    changed = true;
                }
            }

            let mut sums = vec![[0.0f64; 2]; self.k];
            let mut counts = vec![0usize; self.k];
            for (&p, &c) in points.iter().zip(assignments.iter()) {
                sums[c][0] += p[0];
                sums[c][1] += p[1];
                counts[c] += 1;
            }

            for c in 0..self.k {
                if counts[c] > 0 {
                    centroids[c] = [sums[c][0] / counts[c] as f64, sums[c][1] / counts[c] as f64];
                } else {
                    // Re-seed an emptied cluster at the point farthest from
                    // its current centroid so we always keep k clusters.
                    if let Some((i, _)) = points
                        .iter()
                        .enumerate()
                        .map(|(i, &p)| (i, squared_distance(p, centroids[assignments[i]])))
                        .max_by(|a, b| a.1.total_cmp(&b.1))
                    {
                        centroids[c] = points[i];
                        changed = true;
                    }
                }
            }

            if !changed {
                break;
            }
        }

        let inertia = points
            .iter()
            .zip(assignments.iter())
            .map(|(&p, &c)| squared_distance(p, centroids[c]))
            .sum();

        KMeansFit {
            centroids,
            assignments,
            inertia,
        }
    }
}

/// Nearest centroid by Euclidean distance; ties break to the lowest index.
fn nearest_centroid(point: [f64; 2], centroids: &[[f64; 2]]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_blobs() -> Vec<[f64; 2]> {
        vec![
            [20.0, 20.0],
            [20.0, 25.0],
            [20.0, 22.0],
            [90.0, 20.0],
            [90.0, 25.0],
        ]
    }

    #[test]
    fn test_fit_separates_two_blobs() {
        let fit = KMeans::new(2, 42).fit(&two_blobs()).unwrap();

        assert_eq!(fit.assignments.len(), 5);
        assert!(fit.assignments.iter().all(|&c| c < 2));

        // The three low-income points land together, apart from the two
        // high-income points.
        assert_eq!(fit.assignments[0], fit.assignments[1]);
        assert_eq!(fit.assignments[0], fit.assignments[2]);
        assert_eq!(fit.assignments[3], fit.assignments[4]);
        assert_ne!(fit.assignments[0], fit.assignments[3]);

        let low = fit.centroids[fit.assignments[0]];
        let high = fit.centroids[fit.assignments[3]];
        assert!((low[0] - 20.0).abs() < 1e-9);
        assert!((low[1] - (67.0 / 3.0)).abs() < 1e-9);
        assert!((high[0] - 90.0).abs() < 1e-9);
        assert!((high[1] - 22.5).abs() < 1e-9);
    }

    #[test]
    fn test_fit_is_deterministic_for_fixed_seed() {
        let points = two_blobs();
        let a = KMeans::new(2, 42).fit(&points).unwrap();
        let b = KMeans::new(2, 42).fit(&points).unwrap();
        assert_eq!(a.assignments, b.assignments);
        assert_eq!(a.centroids, b.centroids);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn test_fewer_points_than_clusters_is_insufficient_data() {
        let points = vec![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let err = KMeans::new(5, 42).fit(&points).unwrap_err();
        match err {
            EtlError::InsufficientData { needed, got } => {
                assert_eq!(needed, 5);
                assert_eq!(got, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_k_equals_point_count() {
        let points = vec![[0.0, 0.0], [10.0, 0.0], [0.0, 10.0]];
        let fit = KMeans::new(3, 7).fit(&points).unwrap();
        // Each point gets its own cluster and inertia collapses to zero.
        assert!(fit.inertia < 1e-12);
        let mut seen = fit.assignments.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_single_cluster_centroid_is_mean() {
        let points = vec![[10.0, 30.0], [20.0, 50.0]];
        let fit = KMeans::new(1, 42).fit(&points).unwrap();
        assert_eq!(fit.centroids[0], [15.0, 40.0]);
        assert_eq!(fit.assignments, vec![0, 0]);
    }

    #[test]
    fn test_duplicate_points_do_not_panic() {
        let points = vec![[5.0, 5.0]; 6];
        let fit = KMeans::new(3, 42).fit(&points).unwrap();
        assert_eq!(fit.assignments.len(), 6);
        assert!(fit.assignments.iter().all(|&c| c < 3));
    }
}
