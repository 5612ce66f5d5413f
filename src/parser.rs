use mesh25d::parallel::available_threads;
use mesh25d::{Error, MeshParams, MeshingMethod, Result};

use clap::{Parser, ValueEnum};
use std::{fs::File, path::PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Method {
    Grid,
    Triangulation,
}

impl From<Method> for MeshingMethod {
    fn from(value: Method) -> Self {
        match value {
            Method::Grid => MeshingMethod::Grid,
            Method::Triangulation => MeshingMethod::Triangulation,
        }
    }
}

/// Build a vertex bounded 2.5D mesh from a photogrammetry or lidar point cloud
#[derive(Parser, Clone, Debug)]
#[command(version)]
pub struct Args {
    /// Path to the input point cloud, accepts .ply, .las and .laz files
    #[arg(short, long)]
    pub input_file: PathBuf,

    /// Path to the output ply mesh
    #[arg(short, long, default_value = "odm_25dmesh.ply")]
    pub output_file: PathBuf,

    /// Every log record is written to this file
    #[arg(long, default_value = "odm_25dmeshing_log.txt")]
    pub log_file: PathBuf,

    /// Echo the log to stderr
    #[arg(short, long, action)]
    pub verbose: bool,

    /// Upper bound on the number of vertices in the mesh
    #[arg(long, default_value_t = 100_000)]
    pub max_vertex_count: usize,

    /// Remove this percentage (0-99.99) of the most isolated points instead
    /// of using the standard deviation criterion
    #[arg(long)]
    pub outliers_removal_percentage: Option<f64>,

    /// Points further than mean + factor * std-dev from their neighbors are outliers, 0-10
    #[arg(long, default_value_t = 1.5)]
    pub outlier_factor: f64,

    /// Elevation grid cells per unit length
    #[arg(long, default_value_t = 1.)]
    pub resolution: f64,

    /// Number of points interpolated into each grid cell, 1-1000
    #[arg(long, default_value_t = 8)]
    pub shepard_neighbors: usize,

    /// Smoothing iterations, defaults to half the resolution
    #[arg(long, alias = "wlop-iterations")]
    pub diffusion_iterations: Option<usize>,

    /// Neighboring cells differing more than this are not smoothed together
    #[arg(long, default_value_t = 0.2)]
    pub diffusion_threshold: f64,

    /// Vertices differing more than this from all their neighbors are spikes
    #[arg(long, default_value_t = 0.1)]
    pub spike_threshold: f64,

    /// How the mesh is built from the points
    #[arg(long, value_enum, default_value_t = Method::Grid)]
    pub method: Method,

    /// Also write the smoothed elevation grid to this tiff
    #[arg(long)]
    pub dsm_file: Option<PathBuf>,

    /// Remove border vertices that lie on the line between their border neighbors
    #[clap(long, action)]
    pub boundary_vertex_deletion: bool,

    /// Number of threads used in computation, defaults to all available threads
    #[arg(short, long, default_value_t = available_threads())]
    pub threads: usize,
}

impl Args {
    /// Fails if the input file cannot be opened
    pub fn validate(&self) -> Result<()> {
        File::open(&self.input_file).map_err(|e| {
            Error::Configuration(format!(
                "Cannot open input file {}: {}",
                self.input_file.to_string_lossy(),
                e
            ))
        })?;
        Ok(())
    }

    pub fn mesh_params(&self) -> MeshParams {
        MeshParams {
            method: self.method.into(),
            max_vertex_count: self.max_vertex_count,
            outliers_removal_percentage: self.outliers_removal_percentage,
            outlier_factor: self.outlier_factor,
            resolution: self.resolution,
            shepard_neighbors: self.shepard_neighbors,
            diffusion_iterations: self.diffusion_iterations,
            diffusion_threshold: self.diffusion_threshold,
            spike_threshold: self.spike_threshold,
            boundary_vertex_deletion: self.boundary_vertex_deletion,
            threads: self.threads,
            ..Default::default()
        }
        .clamped()
    }
}
