//! Two-dimensional discrete Fourier transforms over ndarray images.
//!
//! The 2D transform is separable: a 1D transform along every row followed by
//! one along every column. The inverse is normalised by `1/(rows·cols)` so
//! that `ifft2(fft2(x)) == x` up to rounding.

use std::sync::Arc;

use ndarray::{Array2, ArrayView2, Axis};
use rustfft::{num_complex::Complex64, Fft, FftPlanner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Inverse,
}

/// Run a 1D transform along every lane of `axis`.
fn transform_lanes(data: &mut Array2<Complex64>, axis: Axis, fft: &Arc<dyn Fft<f64>>) {
    let mut buffer = vec![Complex64::new(0.0, 0.0); data.len_of(axis)];
    let mut scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];

    for mut lane in data.lanes_mut(axis) {
        buffer
            .iter_mut()
            .zip(lane.iter())
            .for_each(|(b, &v)| *b = v);
        fft.process_with_scratch(&mut buffer, &mut scratch);
        lane.iter_mut().zip(buffer.iter()).for_each(|(v, &b)| *v = b);
    }
}

fn transform(mut data: Array2<Complex64>, direction: Direction) -> Array2<Complex64> {
    if data.is_empty() {
        return data;
    }
    let (rows, cols) = data.dim();
    let mut planner = FftPlanner::new();
    let plan = |planner: &mut FftPlanner<f64>, n: usize| match direction {
        Direction::Forward => planner.plan_fft_forward(n),
        Direction::Inverse => planner.plan_fft_inverse(n),
    };

    let along_rows = plan(&mut planner, cols);
    transform_lanes(&mut data, Axis(1), &along_rows);
    let along_cols = plan(&mut planner, rows);
    transform_lanes(&mut data, Axis(0), &along_cols);

    if direction == Direction::Inverse {
        let scale = 1.0 / (rows * cols) as f64;
        data.mapv_inplace(|v| v * scale);
    }
    data
}

/// Forward 2D transform of a real image
pub fn fft2(image: &ArrayView2<f64>) -> Array2<Complex64> {
    transform(image.mapv(|v| Complex64::new(v, 0.0)), Direction::Forward)
}

/// Normalised inverse 2D transform
pub fn ifft2(spectrum: Array2<Complex64>) -> Array2<Complex64> {
    transform(spectrum, Direction::Inverse)
}

/// Roll both axes forward by `n/2`, as numpy's `fftshift`.
///
/// For a frequency grid that runs from `-1/(2w)` upwards, this puts the
/// zero-frequency sample of an even-sized grid in the corner where the
/// transform keeps its DC term.
pub fn fftshift<T: Clone>(map: &ArrayView2<T>) -> Array2<T> {
    let (rows, cols) = map.dim();
    let (half_rows, half_cols) = (rows / 2, cols / 2);
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        map[[(i + rows - half_rows) % rows, (j + cols - half_cols) % cols]].clone()
    })
}
