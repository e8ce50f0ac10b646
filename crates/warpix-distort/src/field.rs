use warpix_image::ImageSize;

/// Spacing in pixels between displacement-field sample points.
///
/// `Auto` derives the spacing from the image dimensions at generation time,
/// so one configured transform can serve images of different sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridSize {
    /// Derive the spacing from the image dimensions.
    Auto,
    /// Use a fixed spacing in pixels. Must be at least 1.
    Fixed(usize),
}

impl GridSize {
    /// Resolve the spacing for an image of the given size.
    ///
    /// `Auto` resolves to `max(2, round(0.35 * sqrt(min(height, width))))`.
    ///
    /// # Example
    ///
    /// ```
    /// use warpix_distort::field::GridSize;
    /// use warpix_image::ImageSize;
    ///
    /// let size = ImageSize { width: 640, height: 480 };
    /// assert_eq!(GridSize::Fixed(10).resolve(size), 10);
    /// assert_eq!(GridSize::Auto.resolve(size), 8);
    /// ```
    pub fn resolve(&self, size: ImageSize) -> usize {
        match self {
            GridSize::Fixed(spacing) => (*spacing).max(1),
            GridSize::Auto => {
                let lower = size.height.min(size.width) as f64;
                let spacing = (0.35 * lower.sqrt()).round() as usize;
                spacing.max(2)
            }
        }
    }
}

/// Pixel positions of the grid-line intersections covering `extent` pixels.
///
/// Positions are `0, spacing, 2 * spacing, ...`; when the next step would
/// overshoot past `extent - 1` while the current position is still short of
/// it, a final position clamped to exactly `extent - 1` is appended. The
/// first position is always 0 and no position exceeds `extent - 1`, so the
/// grid always covers the full image regardless of divisibility.
pub fn grid_coords(extent: usize, spacing: usize) -> Vec<usize> {
    let mut coords = Vec::new();
    if extent == 0 {
        return coords;
    }
    let spacing = spacing.max(1);
    let mut pos = 0;
    while pos < extent {
        coords.push(pos);
        pos += spacing;
    }
    if pos < extent + spacing - 1 {
        coords.push(extent - 1);
    }
    coords
}

/// Number of grid-line intersections covering `extent` pixels.
///
/// Closed form of `grid_coords(extent, spacing).len()`.
pub fn grid_points(extent: usize, spacing: usize) -> usize {
    if extent == 0 {
        return 0;
    }
    if spacing <= 1 {
        return extent;
    }
    let rest = extent % spacing;
    let full = (extent - rest) / spacing;
    if rest > 0 && (extent - 1) % spacing != 0 {
        full + 2
    } else {
        full + 1
    }
}

/// A coarse grid of per-intersection displacement vectors.
///
/// One `(dx, dy)` pair is stored for every grid-line intersection of the
/// image the field was generated for; the warp resampler densifies it to a
/// per-pixel mapping by bilinear interpolation.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplacementField {
    spacing: usize,
    rows: usize,
    cols: usize,
    dx: Vec<f64>,
    dy: Vec<f64>,
}

impl DisplacementField {
    /// Build a field for an image of the given size by evaluating `shift` at
    /// every grid-line intersection.
    ///
    /// The shift function receives the GRID indices `(grid_row, grid_col)`
    /// of the intersection, counted 0, 1, 2, ... per axis -- not the pixel
    /// position of the intersection. Generators that want position-dependent
    /// shifts must account for this themselves.
    pub fn from_fn(
        size: ImageSize,
        spacing: usize,
        mut shift: impl FnMut(usize, usize) -> (f64, f64),
    ) -> Self {
        let rows = grid_points(size.height, spacing);
        let cols = grid_points(size.width, spacing);

        let mut dx = Vec::with_capacity(rows * cols);
        let mut dy = Vec::with_capacity(rows * cols);
        for grid_row in 0..rows {
            for grid_col in 0..cols {
                let (sx, sy) = shift(grid_row, grid_col);
                dx.push(sx);
                dy.push(sy);
            }
        }

        Self {
            spacing,
            rows,
            cols,
            dx,
            dy,
        }
    }

    /// Build an all-zero field for an image of the given size.
    pub fn zeros(size: ImageSize, spacing: usize) -> Self {
        Self::from_fn(size, spacing, |_, _| (0.0, 0.0))
    }

    /// The pixel spacing between grid-line intersections.
    pub fn spacing(&self) -> usize {
        self.spacing
    }

    /// Number of intersection rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of intersection columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The `(dx, dy)` displacement stored at grid indices `(grid_row, grid_col)`.
    pub fn shift(&self, grid_row: usize, grid_col: usize) -> (f64, f64) {
        let idx = grid_row * self.cols + grid_col;
        (self.dx[idx], self.dy[idx])
    }
}
