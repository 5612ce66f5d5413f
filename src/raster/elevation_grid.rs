use crate::geometry::Bounds2;
use crate::{Error, Result, NODATA};

use geo::Coord;
use std::{
    fs::File,
    io::{BufWriter, Write},
    ops::{Index, IndexMut},
    path::Path,
};
use tiff::encoder::{colortype::Gray32Float, TiffEncoder};

/// Regular grid of elevations, row-major with row 0 at the minimum y.
/// Cells without support hold NODATA (NaN).
#[derive(Clone, Debug, PartialEq)]
pub struct ElevationGrid {
    pub field: Vec<f64>,
    pub width: usize,
    pub height: usize,
    pub bounds: Bounds2,
    /// cells per unit length
    pub resolution: f64,
}

impl ElevationGrid {
    /// grid dimensions covering `bounds`, at least one cell in each direction
    pub fn dimensions(bounds: &Bounds2, resolution: f64) -> (usize, usize) {
        let width = (bounds.width() * resolution).ceil().max(1.) as usize;
        let height = (bounds.height() * resolution).ceil().max(1.) as usize;
        (width, height)
    }

    /// A NODATA filled grid. Fails instead of aborting if the grid
    /// is larger than `max_cells` or the allocation is refused.
    pub fn new(bounds: Bounds2, resolution: f64, max_cells: usize) -> Result<ElevationGrid> {
        let (width, height) = ElevationGrid::dimensions(&bounds, resolution);

        let num_cells = width
            .checked_mul(height)
            .filter(|&n| n <= max_cells)
            .ok_or(Error::GridAllocationFailed { width, height })?;

        let mut field = Vec::new();
        field
            .try_reserve_exact(num_cells)
            .map_err(|_| Error::GridAllocationFailed { width, height })?;
        field.resize(num_cells, NODATA);

        Ok(ElevationGrid {
            field,
            width,
            height,
            bounds,
            resolution,
        })
    }

    pub fn cell_size(&self) -> f64 {
        1. / self.resolution
    }

    #[inline]
    pub fn index2coord(&self, row: usize, col: usize) -> Coord {
        Coord {
            x: self.bounds.min.x + (col as f64 + 0.5) * self.cell_size(),
            y: self.bounds.min.y + (row as f64 + 0.5) * self.cell_size(),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let value = self[(row, col)];
        (!value.is_nan()).then_some(value)
    }

    pub fn count_nodata(&self) -> usize {
        self.field.iter().filter(|v| v.is_nan()).count()
    }

    /// in-grid indices of the 8-neighborhood of a cell
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
        let (width, height) = (self.width as isize, self.height as isize);
        let (row, col) = (row as isize, col as isize);

        (-1..=1)
            .flat_map(move |dr| (-1..=1).map(move |dc| (row + dr, col + dc)))
            .filter(move |&(r, c)| {
                (r, c) != (row, col) && r >= 0 && c >= 0 && r < height && c < width
            })
            .map(|(r, c)| (r as usize, c as usize))
    }

    /// Grows the supported area ring by ring, every NODATA cell touching data gets
    /// the mean of its supported neighbors. Fails if the grid holds no data at all.
    pub fn fill_nodata(&mut self) -> Result<usize> {
        let total = self.count_nodata();
        if total == 0 {
            return Ok(0);
        }
        if total == self.field.len() {
            return Err(Error::InsufficientData(
                "The elevation grid contains no data".to_string(),
            ));
        }

        let mut remaining = total;
        while remaining > 0 {
            let mut next = self.field.clone();

            for row in 0..self.height {
                for col in 0..self.width {
                    if !self[(row, col)].is_nan() {
                        continue;
                    }
                    let (sum, n) = self
                        .neighbors(row, col)
                        .filter_map(|(r, c)| self.get(r, c))
                        .fold((0., 0), |(s, n), v| (s + v, n + 1));

                    if n > 0 {
                        next[row * self.width + col] = sum / n as f64;
                        remaining -= 1;
                    }
                }
            }
            self.field = next;
        }
        Ok(total)
    }

    /// Single band float tiff with a world file next to it.
    /// The tiff's first row is the northmost row of the grid.
    pub fn write_to_tiff(&self, path: &Path) -> Result<()> {
        let data: Vec<f32> = self
            .field
            .chunks(self.width)
            .rev()
            .flatten()
            .map(|&v| v as f32)
            .collect();

        let mut tiff = BufWriter::new(File::create(path)?);
        let mut encoder = TiffEncoder::new(&mut tiff)?;
        encoder.write_image::<Gray32Float>(self.width as u32, self.height as u32, &data)?;
        tiff.flush()?;

        // pixel size, rotations and the center of the top left pixel
        let top_left = self.index2coord(self.height - 1, 0);
        let mut tfw = BufWriter::new(File::create(path.with_extension("tfw"))?);
        tfw.write_all(
            format!(
                "{}\n0\n0\n-{}\n{}\n{}\n",
                self.cell_size(),
                self.cell_size(),
                top_left.x,
                top_left.y
            )
            .as_bytes(),
        )?;
        tfw.flush()?;

        Ok(())
    }
}

impl Index<(usize, usize)> for ElevationGrid {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.field[index.0 * self.width + index.1]
    }
}

impl IndexMut<(usize, usize)> for ElevationGrid {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        &mut self.field[index.0 * self.width + index.1]
    }
}
