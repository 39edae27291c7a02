use crate::Image;

/// Single-channel `f32` image used for gradient and scale-space work
#[derive(Debug, Clone, PartialEq)]
pub struct FloatImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl FloatImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    pub fn from_gray(img: &Image) -> Self {
        Self {
            width: img.width() as usize,
            height: img.height() as usize,
            data: img.as_raw().iter().map(|&v| v as f32).collect(),
        }
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Pixel lookup with coordinates clamped to the border
    #[inline]
    pub fn at_clamped(&self, x: i64, y: i64) -> f32 {
        let cx = x.clamp(0, self.width as i64 - 1) as usize;
        let cy = y.clamp(0, self.height as i64 - 1) as usize;
        self.data[cy * self.width + cx]
    }

    /// Bilinear interpolation for subpixel sampling, clamped at the border
    pub fn bilinear(&self, x: f32, y: f32) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let x0 = x.floor();
        let y0 = y.floor();
        let dx = x - x0;
        let dy = y - y0;
        let (xi, yi) = (x0 as i64, y0 as i64);

        let p00 = self.at_clamped(xi, yi);
        let p10 = self.at_clamped(xi + 1, yi);
        let p01 = self.at_clamped(xi, yi + 1);
        let p11 = self.at_clamped(xi + 1, yi + 1);

        let top = p00 * (1.0 - dx) + p10 * dx;
        let bottom = p01 * (1.0 - dx) + p11 * dx;
        top * (1.0 - dy) + bottom * dy
    }

    /// Separable Gaussian blur with a kernel radius of 3 sigma
    pub fn gaussian_blur(&self, sigma: f32) -> FloatImage {
        if sigma <= 0.0 || self.data.is_empty() {
            return self.clone();
        }
        let radius = (3.0 * sigma).ceil().max(1.0) as i64;
        let mut kernel: Vec<f32> = (-radius..=radius)
            .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
            .collect();
        let norm: f32 = kernel.iter().sum();
        kernel.iter_mut().for_each(|k| *k /= norm);

        let mut tmp = FloatImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let mut acc = 0.0;
                for (k, i) in kernel.iter().zip(-radius..=radius) {
                    acc += k * self.at_clamped(x as i64 + i, y as i64);
                }
                tmp.data[y * self.width + x] = acc;
            }
        }

        let mut out = FloatImage::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let mut acc = 0.0;
                for (k, i) in kernel.iter().zip(-radius..=radius) {
                    acc += k * tmp.at_clamped(x as i64, y as i64 + i);
                }
                out.data[y * self.width + x] = acc;
            }
        }
        out
    }

    /// 3x3 Sobel derivatives `(dx, dy)`
    pub fn sobel(&self) -> (FloatImage, FloatImage) {
        let mut gx = FloatImage::new(self.width, self.height);
        let mut gy = FloatImage::new(self.width, self.height);
        for y in 0..self.height as i64 {
            for x in 0..self.width as i64 {
                let p = |dx: i64, dy: i64| self.at_clamped(x + dx, y + dy);
                let sx = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
                let sy = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
                let idx = y as usize * self.width + x as usize;
                gx.data[idx] = sx;
                gy.data[idx] = sy;
            }
        }
        (gx, gy)
    }

    /// Drop every other row and column
    pub fn half_sample(&self) -> FloatImage {
        let w = (self.width / 2).max(1);
        let h = (self.height / 2).max(1);
        let mut out = FloatImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                out.data[y * w + x] = self.at_clamped(2 * x as i64, 2 * y as i64);
            }
        }
        out
    }

    /// Pixelwise `self - other`, both images must have the same size
    pub fn difference(&self, other: &FloatImage) -> FloatImage {
        FloatImage {
            width: self.width,
            height: self.height,
            data: self.data.iter().zip(&other.data).map(|(a, b)| a - b).collect(),
        }
    }
}
