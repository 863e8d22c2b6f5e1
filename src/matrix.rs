//! Square matrices over Z/26.
//!
//! Dimensions stay tiny (2..=4), so determinants use cofactor expansion
//! directly rather than elimination, which would need division in a ring
//! that is not a field.

use core::fmt;

use zeroize::Zeroize;

use crate::alphabet::{gcd, mod_inverse, reduce, Residue, MODULUS};

/// Row-major `n x n` matrix with entries in `[0, 25]`.
#[derive(Clone, PartialEq, Eq, Zeroize)]
pub struct Matrix {
    dimension: usize,
    cells: Vec<Residue>,
}

impl Matrix {
    /// Build from row-major cells; entries are reduced mod 26.
    ///
    /// Returns `None` unless `cells.len() == dimension * dimension`.
    pub fn from_cells(dimension: usize, cells: &[i64]) -> Option<Self> {
        if cells.len() != dimension * dimension {
            return None;
        }
        Some(Self {
            dimension,
            cells: cells.iter().map(|&v| reduce(v)).collect(),
        })
    }

    pub fn identity(dimension: usize) -> Self {
        let mut cells = vec![0; dimension * dimension];
        for i in 0..dimension {
            cells[i * dimension + i] = 1;
        }
        Self { dimension, cells }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Residue {
        self.cells[row * self.dimension + col]
    }

    pub(crate) fn bump(&mut self, row: usize, col: usize) {
        let idx = row * self.dimension + col;
        self.cells[idx] = reduce(self.cells[idx] as i64 + 1);
    }

    pub fn cells(&self) -> &[Residue] {
        &self.cells
    }

    /// Matrix with `row` and `col` removed.
    fn minor(&self, row: usize, col: usize) -> Matrix {
        let n = self.dimension;
        let mut cells = Vec::with_capacity((n - 1) * (n - 1));
        for r in (0..n).filter(|&r| r != row) {
            for c in (0..n).filter(|&c| c != col) {
                cells.push(self.get(r, c));
            }
        }
        Matrix {
            dimension: n - 1,
            cells,
        }
    }

    fn det_raw(&self) -> i64 {
        match self.dimension {
            0 => 1,
            1 => self.cells[0] as i64,
            n => (0..n)
                .map(|col| {
                    let sign = if col % 2 == 0 { 1 } else { -1 };
                    sign * self.get(0, col) as i64 * self.minor(0, col).det_raw()
                })
                .fold(0, |acc, term| (acc + term).rem_euclid(MODULUS)),
        }
    }

    /// Determinant mod 26.
    pub fn determinant(&self) -> Residue {
        reduce(self.det_raw())
    }

    /// Invertible iff the determinant is a unit mod 26.
    pub fn is_invertible(&self) -> bool {
        gcd(self.determinant() as i64, MODULUS) == 1
    }

    /// Transposed cofactor matrix: `adj[i][j] = (-1)^(i+j) * det(minor(j, i))`.
    pub fn adjugate(&self) -> Matrix {
        let n = self.dimension;
        let mut cells = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                let sign = if (i + j) % 2 == 0 { 1 } else { -1 };
                cells.push(reduce(sign * self.minor(j, i).det_raw()));
            }
        }
        Matrix {
            dimension: n,
            cells,
        }
    }

    /// `adj(M) * det(M)^-1 mod 26`, or `None` for a singular matrix.
    pub fn inverse(&self) -> Option<Matrix> {
        let det_inv = mod_inverse(self.det_raw())? as i64;
        let mut adj = self.adjugate();
        for cell in adj.cells.iter_mut() {
            *cell = reduce(*cell as i64 * det_inv);
        }
        Some(adj)
    }

    /// Matrix product mod 26. Dimensions must agree.
    pub fn product(&self, other: &Matrix) -> Matrix {
        debug_assert_eq!(self.dimension, other.dimension);
        let n = self.dimension;
        let mut cells = Vec::with_capacity(n * n);
        for r in 0..n {
            for c in 0..n {
                let sum: i64 = (0..n)
                    .map(|k| self.get(r, k) as i64 * other.get(k, c) as i64)
                    .sum();
                cells.push(reduce(sum));
            }
        }
        Matrix {
            dimension: n,
            cells,
        }
    }

    /// `M x v mod 26` for a column vector of length `n`.
    pub fn apply(&self, block: &[Residue]) -> Vec<Residue> {
        debug_assert_eq!(block.len(), self.dimension);
        (0..self.dimension)
            .map(|r| {
                let sum: i64 = block
                    .iter()
                    .enumerate()
                    .map(|(c, &v)| self.get(r, c) as i64 * v as i64)
                    .sum();
                reduce(sum)
            })
            .collect()
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<&[Residue]> = self.cells.chunks(self.dimension.max(1)).collect();
        f.debug_struct("Matrix")
            .field("dimension", &self.dimension)
            .field("rows", &rows)
            .finish()
    }
}
