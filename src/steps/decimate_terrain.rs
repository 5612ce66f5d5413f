use crate::geometry::{consecutive_orientation, Bounds2, Mesh, Point3};
use crate::raster::ElevationGrid;
use crate::{Error, Result};

use geo::Coord;
use log::info;
use spade::handles::FixedVertexHandle;
use spade::{DelaunayTriangulation, HasPosition, Point2, Triangulation};
use std::{cmp::Ordering, collections::BinaryHeap};

#[derive(Debug, Clone)]
pub struct DecimationParams {
    pub max_vertices: usize,
    pub max_triangles: usize,
    /// insertion stops once no lattice node deviates more than this from the mesh
    pub tolerance: f64,
    pub boundary_vertex_deletion: bool,
}

/// A grid node inserted into the triangulation, positioned at (col, row)
#[derive(Debug, Clone, Copy, PartialEq)]
struct LatticeVertex {
    pos: Point2<f64>,
    z: f64,
    node: usize,
}

impl LatticeVertex {
    fn coord(&self) -> Coord {
        Coord {
            x: self.pos.x,
            y: self.pos.y,
        }
    }
}

impl HasPosition for LatticeVertex {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.pos
    }
}

type Lattice2d = DelaunayTriangulation<LatticeVertex>;

/// The grid seen as integer nodes. A grid dimension of a single cell is
/// widened to two nodes reading the same cell.
struct Lattice<'a> {
    grid: &'a ElevationGrid,
    cols: usize,
    rows: usize,
}

impl<'a> Lattice<'a> {
    fn new(grid: &'a ElevationGrid) -> Lattice<'a> {
        Lattice {
            grid,
            cols: grid.width.max(2),
            rows: grid.height.max(2),
        }
    }

    fn num_nodes(&self) -> usize {
        self.cols * self.rows
    }

    fn vertex(&self, col: usize, row: usize) -> LatticeVertex {
        LatticeVertex {
            pos: Point2::new(col as f64, row as f64),
            z: self.z(col, row),
            node: row * self.cols + col,
        }
    }

    fn node_vertex(&self, node: usize) -> LatticeVertex {
        self.vertex(node % self.cols, node / self.cols)
    }

    fn z(&self, col: usize, row: usize) -> f64 {
        self.grid[(
            row.min(self.grid.height - 1),
            col.min(self.grid.width - 1),
        )]
    }

    fn corners(&self) -> [LatticeVertex; 4] {
        let (c, r) = (self.cols - 1, self.rows - 1);
        [
            self.vertex(0, 0),
            self.vertex(c, 0),
            self.vertex(c, r),
            self.vertex(0, r),
        ]
    }
}

/// Highest error uninserted node inside a face. The face is kept as its
/// counter clockwise vertices so stale entries can be recognized on pop.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    error: f64,
    node: usize,
    face: [FixedVertexHandle; 3],
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.error
            .total_cmp(&other.error)
            .then(other.node.cmp(&self.node))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Greedy insertion of the worst approximated grid node until the vertex or
/// triangle budget is spent or the error drops to the tolerance.
/// The mesh is returned in lattice coordinates, see [`to_world`].
pub fn decimate_terrain(grid: &ElevationGrid, params: &DecimationParams) -> Result<Mesh> {
    if grid.count_nodata() > 0 {
        return Err(Error::InsufficientData(
            "The elevation grid has cells without data".to_string(),
        ));
    }
    let lattice = Lattice::new(grid);

    let mut dt = Lattice2d::new();
    let mut inserted = vec![false; lattice.num_nodes()];
    for corner in lattice.corners() {
        dt.insert(corner)?;
        inserted[corner.node] = true;
    }

    let mut heap = BinaryHeap::new();
    for face in inner_faces(&dt) {
        heap.extend(scan_face(&dt, &lattice, face, &inserted));
    }

    let mut remaining_error = 0.;
    while let Some(candidate) = heap.pop() {
        if inserted[candidate.node] || !face_exists(&dt, &candidate.face) {
            continue;
        }
        if candidate.error <= params.tolerance
            || dt.num_vertices() >= params.max_vertices
            || dt.num_inner_faces() + 2 > params.max_triangles
        {
            remaining_error = candidate.error;
            break;
        }

        let handle = dt.insert(lattice.node_vertex(candidate.node))?;
        inserted[candidate.node] = true;

        let faces: Vec<[FixedVertexHandle; 3]> = dt
            .vertex(handle)
            .out_edges()
            .filter_map(|e| e.face().as_inner())
            .map(|f| f.vertices().map(|v| v.fix()))
            .collect();
        for face in faces {
            heap.extend(scan_face(&dt, &lattice, face, &inserted));
        }
    }

    if params.boundary_vertex_deletion {
        let removed =
            delete_boundary_vertices(&mut dt, lattice.cols, lattice.rows, params.tolerance);
        info!("Deleted {} boundary vertices", removed);
    }

    let mesh = to_mesh(&dt);
    info!(
        "Decimated the grid to {} vertices and {} triangles, max error {:.4}",
        mesh.num_vertices(),
        mesh.num_triangles(),
        remaining_error
    );
    Ok(mesh)
}

/// Scales a lattice space mesh to the grid's cell spacing and centers it on the grid bounds
pub fn to_world(mesh: &mut Mesh, grid: &ElevationGrid) {
    let Some(lattice_bounds) = Bounds2::from_points(&mesh.vertices) else {
        return;
    };

    let spacing = |extent: f64, cells: usize| {
        if extent > 0. {
            extent / cells as f64
        } else {
            grid.cell_size()
        }
    };
    let sx = spacing(grid.bounds.width(), grid.width);
    let sy = spacing(grid.bounds.height(), grid.height);

    let from = lattice_bounds.center();
    let to = grid.bounds.center();
    mesh.transform([sx, sy, 1.], [to.x - from.x * sx, to.y - from.y * sy, 0.]);
}

fn inner_faces(dt: &Lattice2d) -> Vec<[FixedVertexHandle; 3]> {
    dt.inner_faces()
        .map(|f| f.vertices().map(|v| v.fix()))
        .collect()
}

fn face_exists(dt: &Lattice2d, face: &[FixedVertexHandle; 3]) -> bool {
    dt.get_edge_from_neighbors(face[0], face[1])
        .and_then(|e| e.face().as_inner())
        .is_some_and(|f| f.vertices().iter().any(|v| v.fix() == face[2]))
}

fn scan_face(
    dt: &Lattice2d,
    lattice: &Lattice,
    face: [FixedVertexHandle; 3],
    inserted: &[bool],
) -> Option<Candidate> {
    let [a, b, c] = face.map(|h| *dt.vertex(h).data());
    let (pa, pb, pc) = (a.coord(), b.coord(), c.coord());

    let area = consecutive_orientation(pa, pb, pc);
    if area == 0. {
        return None;
    }

    // lattice positions are non negative integers
    let min_col = pa.x.min(pb.x).min(pc.x) as usize;
    let max_col = (pa.x.max(pb.x).max(pc.x) as usize).min(lattice.cols - 1);
    let min_row = pa.y.min(pb.y).min(pc.y) as usize;
    let max_row = (pa.y.max(pb.y).max(pc.y) as usize).min(lattice.rows - 1);

    let mut best: Option<Candidate> = None;
    for row in min_row..=max_row {
        for col in min_col..=max_col {
            let node = row * lattice.cols + col;
            if inserted[node] {
                continue;
            }
            let p = Coord {
                x: col as f64,
                y: row as f64,
            };

            let la = consecutive_orientation(p, pb, pc) / area;
            let lb = consecutive_orientation(pa, p, pc) / area;
            let lc = consecutive_orientation(pa, pb, p) / area;
            if la < 0. || lb < 0. || lc < 0. {
                continue;
            }

            let error = (lattice.z(col, row) - (la * a.z + lb * b.z + lc * c.z)).abs();
            if best.is_none_or(|current| error > current.error) {
                best = Some(Candidate { error, node, face });
            }
        }
    }
    best
}

/// Removes non corner vertices on the lattice border that lie within `tolerance`
/// of the line between their border neighbors.
fn delete_boundary_vertices(
    dt: &mut Lattice2d,
    cols: usize,
    rows: usize,
    tolerance: f64,
) -> usize {
    let (max_x, max_y) = ((cols - 1) as f64, (rows - 1) as f64);
    let vertices: Vec<LatticeVertex> = dt.vertices().map(|v| *v.data()).collect();

    let lines = [
        border_line(&vertices, |p| p.y == 0., |p| p.x),
        border_line(&vertices, |p| p.y == max_y, |p| p.x),
        border_line(&vertices, |p| p.x == 0., |p| p.y),
        border_line(&vertices, |p| p.x == max_x, |p| p.y),
    ];

    let mut removable = vec![];
    for (line, along) in lines.iter() {
        if line.len() < 3 {
            continue;
        }
        let mut last_kept = line[0];
        for window in line.windows(2).skip(1) {
            let (v, next) = (window[0], window[1]);

            let t = (along(v.pos) - along(last_kept.pos)) / (along(next.pos) - along(last_kept.pos));
            let expected = last_kept.z + t * (next.z - last_kept.z);

            if (v.z - expected).abs() <= tolerance {
                removable.push(v.pos);
            } else {
                last_kept = v;
            }
        }
    }

    let mut removed = 0;
    for pos in removable {
        // handles are reassigned on removal, so look the vertex up again
        if let Some(handle) = dt.locate_vertex(pos).map(|v| v.fix()) {
            dt.remove(handle);
            removed += 1;
        }
    }
    removed
}

/// vertices on one border sorted along it, paired with the sort key
fn border_line(
    vertices: &[LatticeVertex],
    on_line: impl Fn(Point2<f64>) -> bool,
    along: fn(Point2<f64>) -> f64,
) -> (Vec<LatticeVertex>, fn(Point2<f64>) -> f64) {
    let mut line: Vec<LatticeVertex> = vertices
        .iter()
        .filter(|v| on_line(v.pos))
        .copied()
        .collect();
    line.sort_by(|a, b| along(a.pos).total_cmp(&along(b.pos)));
    (line, along)
}

fn to_mesh(dt: &Lattice2d) -> Mesh {
    let vertices = dt
        .vertices()
        .map(|v| {
            let d = v.data();
            Point3::new(d.pos.x, d.pos.y, d.z)
        })
        .collect();

    let mut mesh = Mesh::new(vertices, vec![]);
    mesh.triangles = dt
        .inner_faces()
        .map(|f| f.vertices().map(|v| v.fix().index()))
        .filter(|t| mesh.projected_area(t) != 0.)
        .collect();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn grid_from(width: usize, height: usize, values: &[f64]) -> ElevationGrid {
        let bounds = Bounds2::new(
            Coord { x: 0., y: 0. },
            Coord {
                x: width as f64,
                y: height as f64,
            },
        );
        let mut grid = ElevationGrid::new(bounds, 1., usize::MAX).unwrap();
        grid.field.copy_from_slice(values);
        grid
    }

    fn params(max_vertices: usize) -> DecimationParams {
        DecimationParams {
            max_vertices,
            max_triangles: 2 * max_vertices,
            tolerance: 0.005,
            boundary_vertex_deletion: false,
        }
    }

    fn noisy_grid(width: usize, height: usize, seed: u64) -> ElevationGrid {
        let mut rng = fastrand::Rng::with_seed(seed);
        let values: Vec<f64> = (0..width * height).map(|_| rng.f64() * 10.).collect();
        grid_from(width, height, &values)
    }

    #[test]
    fn zero_cap_returns_the_seed() {
        let grid = noisy_grid(8, 6, 1);

        let mesh = decimate_terrain(&grid, &params(0)).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 2);
        assert!(mesh.is_valid());
    }

    #[test]
    fn flat_grid_needs_only_corners() {
        let grid = grid_from(5, 4, &[3.; 20]);

        let mesh = decimate_terrain(&grid, &params(100)).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert!(mesh.vertices.iter().all(|v| v.z == 3.));
    }

    #[test]
    fn single_cell_grid_is_widened() {
        let grid = grid_from(1, 1, &[7.]);

        let mesh = decimate_terrain(&grid, &params(100)).unwrap();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 2);
        assert!(mesh.is_valid());
    }

    #[test]
    fn pyramid_needs_only_its_apex() {
        // four planar faces meeting at the center node
        let values: Vec<f64> = (0..25)
            .map(|i: i32| {
                let (col, row) = (i % 5, i / 5);
                10. - 5. * (col - 2).abs().max((row - 2).abs()) as f64
            })
            .collect();
        let grid = grid_from(5, 5, &values);

        let mesh = decimate_terrain(&grid, &params(100)).unwrap();

        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_triangles(), 4);
        assert!(mesh.vertices.contains(&Point3::new(2., 2., 10.)));
    }

    #[test]
    fn budgets_are_respected() {
        let grid = noisy_grid(20, 15, 9);

        for cap in [4, 5, 17, 60] {
            let mesh = decimate_terrain(&grid, &params(cap)).unwrap();

            assert_eq!(mesh.num_vertices(), cap);
            assert!(mesh.num_triangles() <= 2 * cap);
            assert!(mesh.is_valid());
        }

        let tight = DecimationParams {
            max_triangles: 10,
            ..params(1000)
        };
        let mesh = decimate_terrain(&grid, &tight).unwrap();
        assert!(mesh.num_triangles() <= 10);
    }

    #[test]
    fn unbounded_run_refines_beyond_the_seed() {
        let grid = noisy_grid(6, 5, 4);

        let mesh = decimate_terrain(&grid, &params(1000)).unwrap();

        assert!(mesh.num_vertices() > 4);
        assert!(mesh.num_vertices() <= 30);
        assert!(mesh.is_valid());
    }

    #[test]
    fn nodata_is_rejected() {
        let grid = grid_from(2, 1, &[1., f64::NAN]);

        assert!(matches!(
            decimate_terrain(&grid, &params(10)),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn collinear_border_vertices_are_deleted() {
        let mut dt = Lattice2d::new();
        let v = |x: f64, y: f64, z: f64, node| LatticeVertex {
            pos: Point2::new(x, y),
            z,
            node,
        };
        for vertex in [
            v(0., 0., 0., 0),
            v(4., 0., 4., 4),
            v(4., 2., 0., 14),
            v(0., 2., 0., 10),
            // on the line from (0, 0, 0) to (4, 0, 4)
            v(2., 0., 2.001, 2),
            // off the line from (0, 2, 0) to (4, 2, 0)
            v(1., 2., 1., 11),
            v(2., 1., 5., 7),
        ] {
            dt.insert(vertex).unwrap();
        }

        let removed = delete_boundary_vertices(&mut dt, 5, 3, 0.005);

        assert_eq!(removed, 1);
        assert_eq!(dt.num_vertices(), 6);
        assert!(dt.locate_vertex(Point2::new(2., 0.)).is_none());
        assert!(dt.locate_vertex(Point2::new(1., 2.)).is_some());
    }

    #[test]
    fn boundary_deletion_keeps_a_valid_mesh() {
        let grid = noisy_grid(12, 9, 2);
        let with_deletion = DecimationParams {
            boundary_vertex_deletion: true,
            tolerance: 2.,
            ..params(40)
        };

        let mesh = decimate_terrain(&grid, &with_deletion).unwrap();

        assert!(mesh.num_vertices() <= 40);
        assert!(mesh.num_vertices() >= 4);
        assert!(mesh.is_valid());
    }

    #[test]
    fn world_transform_centers_on_grid() {
        let bounds = Bounds2::new(Coord { x: 10., y: 20. }, Coord { x: 14., y: 22. });
        let grid = ElevationGrid::new(bounds, 1., usize::MAX).unwrap();
        let mut mesh = Mesh::new(
            vec![
                Point3::new(0., 0., 1.),
                Point3::new(3., 0., 1.),
                Point3::new(3., 1., 1.),
                Point3::new(0., 1., 1.),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );

        to_world(&mut mesh, &grid);

        assert_relative_eq!(mesh.vertices[0].x, 10.5);
        assert_relative_eq!(mesh.vertices[0].y, 20.5);
        assert_relative_eq!(mesh.vertices[2].x, 13.5);
        assert_relative_eq!(mesh.vertices[2].y, 21.5);
        assert_eq!(mesh.vertices[2].z, 1.);
    }
}
