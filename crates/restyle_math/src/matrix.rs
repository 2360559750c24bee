//! Matrices.

use crate::{MatrixError, Result};
use std::{
    fmt,
    ops::{Bound, RangeBounds},
    sync::OnceLock,
};

/// A real-valued matrix of arbitrary shape, stored in row-major order.
///
/// Matrices are values: every operation that looks like a modification
/// returns a new matrix and leaves the receiver untouched. The determinant and
/// inverse are computed on demand and memoized inside the matrix, so asking
/// for them repeatedly is cheap. A matrix produced by any operation starts out
/// with an empty memo, since its elements differ from those the memoized
/// results were computed for.
#[derive(Clone, Debug)]
pub struct Matrix {
    n_rows: usize,
    n_cols: usize,
    elements: Vec<f64>,
    memo: Memo,
}

#[derive(Clone, Debug, Default)]
struct Memo {
    determinant: OnceLock<f64>,
    inverse: OnceLock<Box<Matrix>>,
}

impl Matrix {
    /// Creates a matrix from a slice of equally long rows.
    ///
    /// # Errors
    /// Returns an error if there are no rows, the rows are empty or the rows
    /// differ in length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |row| row.as_ref().len());
        if n_rows == 0 || n_cols == 0 {
            return Err(MatrixError::Empty);
        }

        let mut elements = Vec::with_capacity(n_rows * n_cols);
        for (row_idx, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != n_cols {
                return Err(MatrixError::RaggedRow {
                    row: row_idx,
                    expected: n_cols,
                    found: row.len(),
                });
            }
            elements.extend_from_slice(row);
        }

        Ok(Self::from_parts(n_rows, n_cols, elements))
    }

    /// Creates a matrix from a flat list of elements in row-major order.
    ///
    /// # Errors
    /// Returns an error if either dimension is zero or the number of elements
    /// does not equal `n_rows * n_cols`.
    pub fn from_row_major(n_rows: usize, n_cols: usize, elements: Vec<f64>) -> Result<Self> {
        if n_rows == 0 || n_cols == 0 {
            return Err(MatrixError::Empty);
        }
        if elements.len() != n_rows * n_cols {
            return Err(MatrixError::ElementCount {
                expected: n_rows * n_cols,
                found: elements.len(),
            });
        }
        Ok(Self::from_parts(n_rows, n_cols, elements))
    }

    /// Creates a matrix from a fixed-size array of rows.
    pub fn from_array<const R: usize, const C: usize>(rows: [[f64; C]; R]) -> Self {
        const { assert!(R > 0 && C > 0, "matrix must have at least one row and column") };
        Self::from_parts(R, C, rows.iter().flatten().copied().collect())
    }

    /// Creates the `n`x`n` identity matrix.
    ///
    /// # Panics
    /// If `n` is zero.
    pub fn identity(n: usize) -> Self {
        assert!(n > 0, "identity matrix must have a non-zero size");
        let mut elements = vec![0.0; n * n];
        for idx in 0..n {
            elements[idx * n + idx] = 1.0;
        }
        Self::from_parts(n, n, elements)
    }

    /// Creates a matrix of the given shape filled with zeros.
    ///
    /// # Panics
    /// If either dimension is zero.
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        assert!(n_rows > 0 && n_cols > 0, "matrix must have a non-zero size");
        Self::from_parts(n_rows, n_cols, vec![0.0; n_rows * n_cols])
    }

    /// Creates a square matrix with the given values on the diagonal.
    ///
    /// # Panics
    /// If `diagonal` is empty.
    pub fn from_diagonal(diagonal: &[f64]) -> Self {
        let n = diagonal.len();
        assert!(n > 0, "diagonal matrix must have a non-zero size");
        let mut elements = vec![0.0; n * n];
        for (idx, &value) in diagonal.iter().enumerate() {
            elements[idx * n + idx] = value;
        }
        Self::from_parts(n, n, elements)
    }

    fn from_parts(n_rows: usize, n_cols: usize, elements: Vec<f64>) -> Self {
        debug_assert_eq!(elements.len(), n_rows * n_cols);
        Self {
            n_rows,
            n_cols,
            elements,
            memo: Memo::default(),
        }
    }

    /// The number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// The number of columns.
    #[inline]
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// The `(rows, columns)` shape of the matrix.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    #[inline]
    pub fn is_square(&self) -> bool {
        self.n_rows == self.n_cols
    }

    /// Returns the element in row `i` and column `j`.
    ///
    /// # Panics
    /// If the indices are out of bounds.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.elements[self.linear_index(i, j)]
    }

    /// Returns row `i` as a slice.
    ///
    /// # Panics
    /// If `i` is out of bounds.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        assert!(i < self.n_rows, "row index {i} out of bounds");
        &self.elements[i * self.n_cols..(i + 1) * self.n_cols]
    }

    /// Returns column `j` as a new vector.
    ///
    /// # Panics
    /// If `j` is out of bounds.
    pub fn column(&self, j: usize) -> Vec<f64> {
        assert!(j < self.n_cols, "column index {j} out of bounds");
        self.rows().map(|row| row[j]).collect()
    }

    /// Returns an iterator over the rows of the matrix.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f64]> {
        self.elements.chunks_exact(self.n_cols)
    }

    /// The elements in row-major order.
    #[inline]
    pub fn elements(&self) -> &[f64] {
        &self.elements
    }

    /// Returns a copy of the matrix with the element in row `i` and column
    /// `j` replaced by `value`.
    ///
    /// # Panics
    /// If the indices are out of bounds.
    pub fn with_value(&self, i: usize, j: usize, value: f64) -> Self {
        let idx = self.linear_index(i, j);
        let mut elements = self.elements.clone();
        elements[idx] = value;
        Self::from_parts(self.n_rows, self.n_cols, elements)
    }

    /// Returns a matrix whose elements are the result of applying `f` to each
    /// element of this matrix.
    pub fn map(&self, f: impl FnMut(f64) -> f64) -> Self {
        Self::from_parts(
            self.n_rows,
            self.n_cols,
            self.elements.iter().copied().map(f).collect(),
        )
    }

    /// Adds `other` element-wise.
    ///
    /// # Errors
    /// Returns [`MatrixError::DimensionMismatch`] if the shapes differ.
    pub fn add(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Subtracts `other` element-wise.
    ///
    /// # Errors
    /// Returns [`MatrixError::DimensionMismatch`] if the shapes differ.
    pub fn subtract(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Multiplies every element by `factor`.
    pub fn scalar_multiply(&self, factor: f64) -> Self {
        self.map(|value| value * factor)
    }

    /// Computes the matrix product `self * other`.
    ///
    /// # Errors
    /// Returns [`MatrixError::DimensionMismatch`] if the number of columns of
    /// `self` differs from the number of rows of `other`.
    pub fn matrix_multiply(&self, other: &Self) -> Result<Self> {
        if self.n_cols != other.n_rows {
            return Err(MatrixError::DimensionMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }

        let mut elements = Vec::with_capacity(self.n_rows * other.n_cols);
        for row in self.rows() {
            for j in 0..other.n_cols {
                elements.push(
                    row.iter()
                        .enumerate()
                        .map(|(k, &value)| value * other.get(k, j))
                        .sum(),
                );
            }
        }

        Ok(Self::from_parts(self.n_rows, other.n_cols, elements))
    }

    /// Returns the transpose of the matrix.
    pub fn transpose(&self) -> Self {
        let mut elements = Vec::with_capacity(self.elements.len());
        for j in 0..self.n_cols {
            elements.extend(self.rows().map(|row| row[j]));
        }
        Self::from_parts(self.n_cols, self.n_rows, elements)
    }

    /// Returns the sum of the diagonal elements, or NaN if the matrix is not
    /// square.
    pub fn trace(&self) -> f64 {
        if !self.is_square() {
            return f64::NAN;
        }
        (0..self.n_rows).map(|idx| self.get(idx, idx)).sum()
    }

    /// Extracts the block covering the given row and column index ranges.
    /// An unbounded end extends to the last row or column. Ranges reaching
    /// past the matrix are clamped to it.
    ///
    /// # Errors
    /// Returns [`MatrixError::Empty`] if the resulting block has no elements.
    pub fn submatrix(
        &self,
        rows: impl RangeBounds<usize>,
        cols: impl RangeBounds<usize>,
    ) -> Result<Self> {
        let (row_start, row_end) = clamped_range(&rows, self.n_rows);
        let (col_start, col_end) = clamped_range(&cols, self.n_cols);
        if row_start >= row_end || col_start >= col_end {
            return Err(MatrixError::Empty);
        }

        let elements = self.rows().take(row_end).skip(row_start).fold(
            Vec::with_capacity((row_end - row_start) * (col_end - col_start)),
            |mut elements, row| {
                elements.extend_from_slice(&row[col_start..col_end]);
                elements
            },
        );

        Ok(Self::from_parts(
            row_end - row_start,
            col_end - col_start,
            elements,
        ))
    }

    /// Returns the matrix with row `i` and column `j` removed.
    ///
    /// # Errors
    /// Returns [`MatrixError::Empty`] if the matrix has only one row or one
    /// column.
    ///
    /// # Panics
    /// If the indices are out of bounds.
    pub fn minor(&self, i: usize, j: usize) -> Result<Self> {
        assert!(
            i < self.n_rows && j < self.n_cols,
            "minor indices ({i}, {j}) out of bounds"
        );
        if self.n_rows == 1 || self.n_cols == 1 {
            return Err(MatrixError::Empty);
        }
        Ok(self.minor_unchecked(i, j))
    }

    fn minor_unchecked(&self, i: usize, j: usize) -> Self {
        let elements = self
            .rows()
            .enumerate()
            .filter(|&(row_idx, _)| row_idx != i)
            .flat_map(|(_, row)| {
                row.iter()
                    .enumerate()
                    .filter(|&(col_idx, _)| col_idx != j)
                    .map(|(_, &value)| value)
            })
            .collect();
        Self::from_parts(self.n_rows - 1, self.n_cols - 1, elements)
    }

    /// Computes the determinant by cofactor expansion along the first row.
    /// The result is memoized.
    ///
    /// Returns NaN if the matrix is not square; callers must check.
    pub fn determinant(&self) -> f64 {
        if !self.is_square() {
            return f64::NAN;
        }
        *self
            .memo
            .determinant
            .get_or_init(|| self.compute_determinant())
    }

    fn compute_determinant(&self) -> f64 {
        match self.n_rows {
            1 => self.elements[0],
            2 => self.get(0, 0) * self.get(1, 1) - self.get(0, 1) * self.get(1, 0),
            _ => self
                .row(0)
                .iter()
                .enumerate()
                .filter(|&(_, &value)| value != 0.0)
                .map(|(j, &value)| {
                    cofactor_sign(j) * value * self.minor_unchecked(0, j).determinant()
                })
                .sum(),
        }
    }

    /// Computes the inverse as the transposed cofactor matrix divided by the
    /// determinant. Both the inverse and the determinant are memoized.
    ///
    /// # Errors
    /// Returns [`MatrixError::NotSquare`] if the matrix is not square and
    /// [`MatrixError::SingularMatrix`] if its determinant is zero.
    pub fn inverse(&self) -> Result<Self> {
        if let Some(inverse) = self.memo.inverse.get() {
            return Ok(Self::clone(inverse));
        }
        if !self.is_square() {
            return Err(MatrixError::NotSquare {
                n_rows: self.n_rows,
                n_cols: self.n_cols,
            });
        }
        if self.memo.determinant.get() == Some(&0.0) {
            return Err(MatrixError::SingularMatrix);
        }

        let n = self.n_rows;
        let (cofactors, determinant) = if n == 1 {
            (vec![1.0], self.elements[0])
        } else {
            let mut determinant = 0.0;
            let mut cofactors = Vec::with_capacity(n * n);
            for i in 0..n {
                for j in 0..n {
                    let cofactor = cofactor_sign(i + j) * self.minor_unchecked(i, j).determinant();
                    if i == 0 {
                        determinant += self.get(0, j) * cofactor;
                    }
                    cofactors.push(cofactor);
                }
            }
            (cofactors, determinant)
        };

        let _ = self.memo.determinant.set(determinant);

        if determinant == 0.0 {
            return Err(MatrixError::SingularMatrix);
        }

        let inverse = Self::from_parts(n, n, cofactors)
            .transpose()
            .scalar_multiply(1.0 / determinant)
            .with_cached_determinant(1.0 / determinant);

        let _ = self.memo.inverse.set(Box::new(inverse.clone()));

        Ok(inverse)
    }

    /// Returns the memoized determinant, if it has been computed or supplied.
    pub fn cached_determinant(&self) -> Option<f64> {
        self.memo.determinant.get().copied()
    }

    /// Returns the memoized inverse, if it has been computed or supplied.
    pub fn cached_inverse(&self) -> Option<&Self> {
        self.memo.inverse.get().map(Box::as_ref)
    }

    /// Supplies a known determinant for the matrix, so that it will not be
    /// recomputed. The caller is responsible for its correctness. Has no
    /// effect if a determinant is already memoized.
    pub fn with_cached_determinant(self, determinant: f64) -> Self {
        let _ = self.memo.determinant.set(determinant);
        self
    }

    /// Supplies a known inverse for the matrix, so that it will not be
    /// recomputed. The caller is responsible for its correctness. Has no
    /// effect if an inverse is already memoized or the shape does not match.
    pub fn with_cached_inverse(self, inverse: Self) -> Self {
        if inverse.shape() == self.shape() && self.is_square() {
            let _ = self.memo.inverse.set(Box::new(inverse));
        }
        self
    }

    /// Compares element-wise with an absolute per-element `tolerance`.
    /// Matrices of different shape are never equal.
    pub fn equals(&self, other: &Self, tolerance: f64) -> bool {
        self.shape() == other.shape()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| (a - b).abs() <= tolerance)
    }

    /// Embeds the matrix in one with an extra row and column, which are zero
    /// except for a one in the new bottom-right corner. Turns a 3x3 linear
    /// map into the corresponding 4x4 homogeneous transform.
    pub fn pad_to_homogeneous(&self) -> Self {
        let n_cols = self.n_cols + 1;
        let mut elements = Vec::with_capacity((self.n_rows + 1) * n_cols);
        for row in self.rows() {
            elements.extend_from_slice(row);
            elements.push(0.0);
        }
        elements.extend(std::iter::repeat_n(0.0, self.n_cols));
        elements.push(1.0);
        Self::from_parts(self.n_rows + 1, n_cols, elements)
    }

    fn zip_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Result<Self> {
        if self.shape() != other.shape() {
            return Err(MatrixError::DimensionMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(Self::from_parts(
            self.n_rows,
            self.n_cols,
            self.elements
                .iter()
                .zip(&other.elements)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        ))
    }

    #[inline]
    fn linear_index(&self, i: usize, j: usize) -> usize {
        assert!(
            i < self.n_rows && j < self.n_cols,
            "index ({i}, {j}) out of bounds for {}x{} matrix",
            self.n_rows,
            self.n_cols
        );
        i * self.n_cols + j
    }
}

impl PartialEq for Matrix {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.elements == other.elements
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row_idx, row) in self.rows().enumerate() {
            if row_idx > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (col_idx, value) in row.iter().enumerate() {
                if col_idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

impl_approx_eq!(
    Matrix,
    |a, b| a.shape() == b.shape(),
    a.elements.iter().zip(&b.elements)
);

#[inline]
fn cofactor_sign(idx_sum: usize) -> f64 {
    if idx_sum % 2 == 0 { 1.0 } else { -1.0 }
}

fn clamped_range(range: &impl RangeBounds<usize>, len: usize) -> (usize, usize) {
    let start = match range.start_bound() {
        Bound::Included(&start) => start,
        Bound::Excluded(&start) => start.saturating_add(1),
        Bound::Unbounded => 0,
    };
    let end = match range.end_bound() {
        Bound::Included(&end) => end.saturating_add(1),
        Bound::Excluded(&end) => end,
        Bound::Unbounded => len,
    };
    (start.min(len), end.min(len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    const EPSILON: f64 = 1e-9;

    fn sample_3x3() -> Matrix {
        Matrix::from_array([[2.0, -1.0, 0.0], [1.0, 3.0, 4.0], [0.5, 0.0, -2.0]])
    }

    prop_compose! {
        fn diagonally_dominant_4x4_strategy()(
            elements in prop::collection::vec(-1.0..1.0, 16),
            signs in prop::collection::vec(prop::bool::ANY, 4),
        ) -> Matrix {
            let mut matrix = Matrix::from_row_major(4, 4, elements).unwrap();
            for (idx, positive) in signs.into_iter().enumerate() {
                let diagonal = if positive { 5.0 } else { -5.0 };
                matrix = matrix.with_value(idx, idx, diagonal + matrix.get(idx, idx));
            }
            matrix
        }
    }

    prop_compose! {
        fn any_matrix_strategy()(
            n_rows in 1_usize..6,
            n_cols in 1_usize..6,
        )(
            elements in prop::collection::vec(-1e3..1e3, n_rows * n_cols),
            n_rows in Just(n_rows),
            n_cols in Just(n_cols),
        ) -> Matrix {
            Matrix::from_row_major(n_rows, n_cols, elements).unwrap()
        }
    }

    #[test]
    fn creating_matrix_from_ragged_rows_fails() {
        let rows: [&[f64]; 2] = [&[1.0, 2.0], &[3.0]];
        assert_eq!(
            Matrix::from_rows(&rows),
            Err(MatrixError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn creating_matrix_without_rows_fails() {
        let rows: [Vec<f64>; 0] = [];
        assert_eq!(Matrix::from_rows(&rows), Err(MatrixError::Empty));
        assert_eq!(
            Matrix::from_row_major(2, 2, vec![1.0; 3]),
            Err(MatrixError::ElementCount {
                expected: 4,
                found: 3
            })
        );
    }

    #[test]
    fn with_value_replaces_single_element_and_keeps_original() {
        let matrix = sample_3x3();
        let modified = matrix.with_value(1, 2, 42.0);
        assert_eq!(modified.get(1, 2), 42.0);
        assert_eq!(matrix.get(1, 2), 4.0);
        assert_eq!(modified.get(0, 0), 2.0);
    }

    #[test]
    fn with_value_starts_with_empty_memo() {
        let matrix = sample_3x3();
        matrix.inverse().unwrap();
        assert!(matrix.cached_determinant().is_some());
        assert!(matrix.cached_inverse().is_some());

        let modified = matrix.with_value(0, 0, 1.0);
        assert!(modified.cached_determinant().is_none());
        assert!(modified.cached_inverse().is_none());
    }

    #[test]
    fn adding_matrices_of_different_shape_fails() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(3, 2);
        assert_eq!(
            a.add(&b),
            Err(MatrixError::DimensionMismatch {
                left: (2, 3),
                right: (3, 2)
            })
        );
    }

    #[test]
    fn subtracting_matrix_from_itself_gives_zeros() {
        let matrix = sample_3x3();
        assert_eq!(matrix.subtract(&matrix).unwrap(), Matrix::zeros(3, 3));
    }

    #[test]
    fn multiplying_matrices_gives_correct_product() {
        let a = Matrix::from_array([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let b = Matrix::from_array([[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]);
        assert_eq!(
            a.matrix_multiply(&b).unwrap(),
            Matrix::from_array([[58.0, 64.0], [139.0, 154.0]])
        );
    }

    #[test]
    fn multiplying_matrices_with_incompatible_inner_dimensions_fails() {
        let a = Matrix::zeros(2, 3);
        let b = Matrix::zeros(2, 3);
        assert_eq!(
            a.matrix_multiply(&b),
            Err(MatrixError::DimensionMismatch {
                left: (2, 3),
                right: (2, 3)
            })
        );
    }

    #[test]
    fn scalar_multiplication_scales_every_element() {
        let matrix = Matrix::from_array([[1.0, -2.0], [0.5, 0.0]]);
        assert_eq!(
            matrix.scalar_multiply(-2.0),
            Matrix::from_array([[-2.0, 4.0], [-1.0, -0.0]])
        );
    }

    #[test]
    fn identity_determinant_is_one() {
        for n in 1..6 {
            assert_eq!(Matrix::identity(n).determinant(), 1.0);
        }
    }

    #[test]
    fn determinant_with_zero_row_or_column_is_zero() {
        let zero_row = Matrix::from_array([
            [1.0, 2.0, 3.0, 4.0],
            [0.0, 0.0, 0.0, 0.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 1.0, 2.0, 3.0],
        ]);
        assert_eq!(zero_row.determinant(), 0.0);
        assert_eq!(zero_row.transpose().determinant(), 0.0);
    }

    #[test]
    fn determinant_of_small_matrices_uses_closed_form() {
        assert_eq!(Matrix::from_array([[-3.5]]).determinant(), -3.5);
        assert_eq!(
            Matrix::from_array([[1.0, 2.0], [3.0, 4.0]]).determinant(),
            -2.0
        );
    }

    #[test]
    fn determinant_of_3x3_matches_rule_of_sarrus() {
        assert_abs_diff_eq!(sample_3x3().determinant(), -16.0, epsilon = EPSILON);
    }

    #[test]
    fn determinant_of_non_square_matrix_is_nan() {
        assert!(Matrix::zeros(2, 3).determinant().is_nan());
    }

    #[test]
    fn inverting_non_square_matrix_fails() {
        assert_eq!(
            Matrix::zeros(2, 3).inverse(),
            Err(MatrixError::NotSquare {
                n_rows: 2,
                n_cols: 3
            })
        );
    }

    #[test]
    fn inverting_singular_matrix_fails() {
        let singular = Matrix::from_array([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 1.0, 1.0]]);
        assert_eq!(singular.inverse(), Err(MatrixError::SingularMatrix));
        assert_eq!(singular.cached_determinant(), Some(0.0));
        assert_eq!(singular.inverse(), Err(MatrixError::SingularMatrix));
    }

    #[test]
    fn inverting_1x1_matrix_gives_reciprocal() {
        assert_eq!(
            Matrix::from_array([[4.0]]).inverse().unwrap(),
            Matrix::from_array([[0.25]])
        );
    }

    #[test]
    fn inverting_memoizes_inverse_and_determinant() {
        let matrix = sample_3x3();
        let inverse = matrix.inverse().unwrap();
        assert_abs_diff_eq!(matrix.cached_determinant().unwrap(), -16.0, epsilon = EPSILON);
        assert_eq!(matrix.cached_inverse(), Some(&inverse));
        assert_abs_diff_eq!(
            inverse.cached_determinant().unwrap(),
            -1.0 / 16.0,
            epsilon = EPSILON
        );
    }

    #[test]
    fn supplied_inverse_of_wrong_shape_is_ignored() {
        let matrix = Matrix::identity(3).with_cached_inverse(Matrix::identity(2));
        assert!(matrix.cached_inverse().is_none());
    }

    #[test]
    fn transposing_swaps_rows_and_columns() {
        let matrix = Matrix::from_array([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(
            matrix.transpose(),
            Matrix::from_array([[1.0, 4.0], [2.0, 5.0], [3.0, 6.0]])
        );
    }

    #[test]
    fn submatrix_with_inclusive_and_open_ranges() {
        let matrix = Matrix::from_array([
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
        ]);
        assert_eq!(
            matrix.submatrix(0..=1, 0..=1).unwrap(),
            Matrix::from_array([[1.0, 2.0], [5.0, 6.0]])
        );
        assert_eq!(
            matrix.submatrix(1.., 2..).unwrap(),
            Matrix::from_array([[7.0, 8.0], [11.0, 12.0]])
        );
        assert_eq!(matrix.submatrix(.., 3..=10).unwrap().column(0), vec![4.0, 8.0, 12.0]);
        assert_eq!(matrix.submatrix(3.., ..), Err(MatrixError::Empty));
    }

    #[test]
    fn minor_removes_row_and_column() {
        assert_eq!(
            sample_3x3().minor(1, 0).unwrap(),
            Matrix::from_array([[-1.0, 0.0], [0.0, -2.0]])
        );
        assert_eq!(Matrix::zeros(1, 3).minor(0, 0), Err(MatrixError::Empty));
    }

    #[test]
    fn equality_requires_same_shape() {
        let a = Matrix::zeros(2, 2);
        let b = Matrix::zeros(1, 4);
        assert!(!a.equals(&b, 1.0));
        assert_ne!(a, b);
    }

    #[test]
    fn equality_respects_absolute_tolerance() {
        let a = Matrix::from_array([[1.0, 2.0]]);
        let b = Matrix::from_array([[1.0005, 1.9995]]);
        assert!(!a.equals(&b, 0.0));
        assert!(!a.equals(&b, 1e-4));
        assert!(a.equals(&b, 1e-3));
    }

    #[test]
    fn padding_3x3_gives_homogeneous_4x4() {
        let padded = sample_3x3().pad_to_homogeneous();
        assert_eq!(padded.shape(), (4, 4));
        assert_eq!(padded.row(3), &[0.0, 0.0, 0.0, 1.0]);
        assert_eq!(padded.column(3), vec![0.0, 0.0, 0.0, 1.0]);
        assert_eq!(padded.submatrix(0..3, 0..3).unwrap(), sample_3x3());
    }

    #[test]
    fn trace_sums_diagonal() {
        assert_eq!(sample_3x3().trace(), 3.0);
        assert!(Matrix::zeros(2, 3).trace().is_nan());
    }

    #[test]
    fn display_lists_rows() {
        let matrix = Matrix::from_array([[1.0, 0.5], [-2.0, 0.0]]);
        assert_eq!(matrix.to_string(), "[1, 0.5]\n[-2, 0]");
    }

    proptest! {
        #[test]
        fn inverse_times_matrix_is_identity(matrix in diagonally_dominant_4x4_strategy()) {
            let product = matrix.inverse().unwrap().matrix_multiply(&matrix).unwrap();
            prop_assert!(product.equals(&Matrix::identity(4), 1e-9));
        }
    }

    proptest! {
        #[test]
        fn transposing_twice_gives_original(matrix in any_matrix_strategy()) {
            prop_assert!(matrix.transpose().transpose().equals(&matrix, 0.0));
        }
    }

    proptest! {
        #[test]
        fn determinant_of_transpose_equals_determinant(matrix in diagonally_dominant_4x4_strategy()) {
            let determinant = matrix.determinant();
            prop_assert!(approx::relative_eq!(
                matrix.transpose().determinant(),
                determinant,
                max_relative = 1e-9
            ));
        }
    }
}
