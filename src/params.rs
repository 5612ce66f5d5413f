use crate::parallel::available_threads;
use crate::steps::OutlierCriterion;

use log::warn;

/// The two ways of turning a filtered point cloud into a mesh
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeshingMethod {
    /// interpolate a dsm, smooth it and greedily decimate it
    #[default]
    Grid,
    /// triangulate the simplified points and remove spikes
    Triangulation,
}

#[derive(Clone, Debug)]
pub struct MeshParams {
    pub method: MeshingMethod,

    /// the mesh never has more vertices than this (except the four corner seed)
    pub max_vertex_count: usize,
    /// defaults to twice the vertex count
    pub max_triangle_count: Option<usize>,

    // outlier removal
    pub outlier_neighbors: usize,
    pub outlier_factor: f64,
    /// remove this share of the points instead of using the std-dev rule
    pub outliers_removal_percentage: Option<f64>,

    // dsm interpolation
    /// grid cells per unit length
    pub resolution: f64,
    pub shepard_neighbors: usize,
    pub shepard_power: f64,
    pub search_radius: Option<f64>,
    pub max_grid_cells: usize,

    // smoothing
    pub diffusion_threshold: f64,
    /// derived from the resolution if not set
    pub diffusion_iterations: Option<usize>,

    // decimation
    pub decimation_tolerance: f64,
    pub boundary_vertex_deletion: bool,

    // triangulation
    pub spike_threshold: f64,

    pub threads: usize,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            method: MeshingMethod::Grid,
            max_vertex_count: 100_000,
            max_triangle_count: None,
            outlier_neighbors: 24,
            outlier_factor: 1.5,
            outliers_removal_percentage: None,
            resolution: 1.,
            shepard_neighbors: 8,
            shepard_power: 2.,
            search_radius: None,
            max_grid_cells: 1 << 28,
            diffusion_threshold: 0.2,
            diffusion_iterations: None,
            decimation_tolerance: 0.005,
            boundary_vertex_deletion: false,
            spike_threshold: 0.1,
            threads: available_threads(),
        }
    }
}

impl MeshParams {
    /// Brings every value into its accepted range, out of range values are clamped, not rejected
    pub fn clamped(mut self) -> Self {
        self.resolution = clamp_logged("resolution", self.resolution, 0.00001, 100_000.);
        self.shepard_neighbors =
            clamp_logged("shepard neighbors", self.shepard_neighbors, 1, 1_000);
        self.outlier_neighbors =
            clamp_logged("outlier neighbors", self.outlier_neighbors, 1, 1_000);
        self.outlier_factor = clamp_logged("outlier factor", self.outlier_factor, 0., 10.);
        self.outliers_removal_percentage = self
            .outliers_removal_percentage
            .map(|p| clamp_logged("outliers removal percentage", p, 0., 99.99));
        self.diffusion_iterations = self
            .diffusion_iterations
            .map(|i| clamp_logged("diffusion iterations", i, 1, 1_000));
        self.shepard_power = clamp_logged("shepard power", self.shepard_power, 0., 16.);
        self.diffusion_threshold =
            clamp_logged("diffusion threshold", self.diffusion_threshold, 0., f64::MAX);
        self.spike_threshold = clamp_logged("spike threshold", self.spike_threshold, 0., f64::MAX);
        self.decimation_tolerance =
            clamp_logged("decimation tolerance", self.decimation_tolerance, 0., f64::MAX);
        self.search_radius = self
            .search_radius
            .map(|r| clamp_logged("search radius", r, f64::MIN_POSITIVE, f64::MAX));
        self.threads = self.threads.max(1);
        self
    }

    pub fn outlier_criterion(&self) -> OutlierCriterion {
        match self.outliers_removal_percentage {
            Some(percent) => OutlierCriterion::Percentage(percent),
            None => OutlierCriterion::StdDev(self.outlier_factor),
        }
    }

    /// explicit count, or half the resolution and at least one
    pub fn diffusion_iterations(&self) -> usize {
        self.diffusion_iterations
            .unwrap_or(((self.resolution / 2.) as usize).max(1))
    }

    pub fn max_triangle_count(&self) -> usize {
        self.max_triangle_count
            .unwrap_or(self.max_vertex_count.saturating_mul(2))
    }
}

fn clamp_logged<T>(name: &str, value: T, min: T, max: T) -> T
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    let clamped = if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    };
    if clamped != value {
        warn!("{} {} is out of range, using {}", name, value, clamped);
    }
    clamped
}
