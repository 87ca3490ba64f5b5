//! Explicit column schema of the estimated-parameter tables.
//!
//! Purpose
//! -------
//! Turn the positional layout of the five estimated-parameter tables into a
//! named schema, so that every column is decoded into a typed field of
//! [`ParamRow`] and a malformed table fails with a diagnostic naming the
//! table, the row and the column.
//!
//! Layout
//! ------
//! Non-correlation tables (`var_exo`, `var_endo`, `param_vals`), 9 columns:
//!
//! | col | field          |
//! |-----|----------------|
//! | 0   | primary index  |
//! | 1   | initial value  |
//! | 2   | lower bound    |
//! | 3   | upper bound    |
//! | 4   | prior shape    |
//! | 5   | prior mean     |
//! | 6   | prior std      |
//! | 7   | prior p3       |
//! | 8   | prior p4       |
//!
//! Correlation tables (`corrx`, `corrn`) insert the secondary index at
//! column 1 and shift everything after it by one (10 columns).
//!
//! Columns past `prior p4` (for example a proposal scale) are ignored.
//!
//! Conventions
//! -----------
//! - Index columns hold 1-based positive integers; [`ParamRow`] stores them
//!   0-based.
//! - Value columns are copied verbatim (NaN allowed), bounds included: the
//!   schema does not compare `lower <= upper`.
//! - A table with zero rows is accepted regardless of its column count.
//! - Fewer columns than the layout needs is an error; more is accepted.
use crate::estimation::{
    catalog::params::ParamType,
    errors::{EstimationError, EstimationResult},
};
use ndarray::{ArrayView1, ArrayView2};

/// Column names in table order for non-correlation tables.
const PLAIN_COLUMNS: [&str; 9] = [
    "primary index",
    "initial value",
    "lower bound",
    "upper bound",
    "prior shape",
    "prior mean",
    "prior std",
    "prior p3",
    "prior p4",
];

/// Column names in table order for correlation tables.
const CORR_COLUMNS: [&str; 10] = [
    "primary index",
    "secondary index",
    "initial value",
    "lower bound",
    "upper bound",
    "prior shape",
    "prior mean",
    "prior std",
    "prior p3",
    "prior p4",
];

/// Schema of one table, fixed by its parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    param_type: ParamType,
}

impl TableSchema {
    pub const fn for_type(param_type: ParamType) -> Self {
        TableSchema { param_type }
    }

    pub const fn param_type(&self) -> ParamType {
        self.param_type
    }

    pub const fn table_name(&self) -> &'static str {
        self.param_type.table_name()
    }

    pub fn columns(&self) -> &'static [&'static str] {
        if self.param_type.is_correlation() { &CORR_COLUMNS } else { &PLAIN_COLUMNS }
    }

    pub fn n_columns(&self) -> usize {
        self.columns().len()
    }

    /// Check the column count of a whole table.
    ///
    /// # Errors
    /// [`EstimationError::TableColumnMismatch`] when a non-empty table has
    /// fewer than [`TableSchema::n_columns`] columns.
    pub fn check_table(&self, table: ArrayView2<'_, f64>) -> EstimationResult<()> {
        if table.nrows() > 0 && table.ncols() < self.n_columns() {
            return Err(EstimationError::TableColumnMismatch {
                table: self.table_name(),
                expected: self.n_columns(),
                actual: table.ncols(),
            });
        }
        Ok(())
    }

    /// Decode one row into a [`ParamRow`].
    ///
    /// Assumes the column count was checked with [`TableSchema::check_table`].
    ///
    /// # Errors
    /// [`EstimationError::InvalidTableIndex`] if an index column is not a
    /// finite positive integer.
    pub fn decode_row(&self, row_idx: usize, row: ArrayView1<'_, f64>) -> EstimationResult<ParamRow> {
        let cols = self.columns();
        let mut col = 0;
        let mut next = || {
            let value = (cols[col], row[col]);
            col += 1;
            value
        };

        let (name, raw) = next();
        let primary_index = self.decode_index(row_idx, name, raw)?;
        let secondary_index = if self.param_type.is_correlation() {
            let (name, raw) = next();
            Some(self.decode_index(row_idx, name, raw)?)
        } else {
            None
        };
        let (_, init_value) = next();
        let (_, lower_bound) = next();
        let (_, upper_bound) = next();
        let (_, prior_shape) = next();
        let (_, prior_mean) = next();
        let (_, prior_std) = next();
        let (_, prior_p3) = next();
        let (_, prior_p4) = next();

        Ok(ParamRow {
            primary_index,
            secondary_index,
            init_value,
            lower_bound,
            upper_bound,
            prior_shape,
            prior_mean,
            prior_std,
            prior_p3,
            prior_p4,
        })
    }

    fn decode_index(&self, row: usize, column: &'static str, value: f64) -> EstimationResult<usize> {
        if !value.is_finite() || value < 1.0 || value.fract() != 0.0 {
            return Err(EstimationError::InvalidTableIndex {
                table: self.table_name(),
                row,
                column,
                value,
            });
        }
        Ok(value as usize - 1)
    }
}

/// One decoded table row with named fields.
///
/// `init_value` and the prior columns are kept for traceability; the catalog
/// builder only forwards the prior columns when prior construction is
/// enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRow {
    pub primary_index: usize,
    pub secondary_index: Option<usize>,
    pub init_value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub prior_shape: f64,
    pub prior_mean: f64,
    pub prior_std: f64,
    pub prior_p3: f64,
    pub prior_p4: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Column counts per parameter type.
    // - 1-based -> 0-based index decoding and the shifted layout of
    //   correlation rows.
    // - Column-level diagnostics for malformed tables.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Correlation tables have one extra column.
    //
    // Given
    // -----
    // - Schemas for every parameter type.
    //
    // Expect
    // ------
    // - 10 columns for correlations, 9 otherwise.
    fn column_count_depends_on_type() {
        for t in ParamType::TABLE_ORDER {
            let expected = if t.is_correlation() { 10 } else { 9 };
            assert_eq!(TableSchema::for_type(t).n_columns(), expected, "{t:?}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Decode a plain row field by field.
    //
    // Given
    // -----
    // - `var_exo` row `[2, 0.5, 0.01, 5.0, 4, 0.1, 2.0, NaN, NaN]`.
    //
    // Expect
    // ------
    // - primary index 1 (0-based), no secondary index, bounds and prior
    //   columns copied verbatim.
    fn decode_plain_row() {
        let schema = TableSchema::for_type(ParamType::ShockSd);
        let row = array![2.0, 0.5, 0.01, 5.0, 4.0, 0.1, 2.0, f64::NAN, f64::NAN];

        let decoded = schema.decode_row(0, row.view()).unwrap();

        assert_eq!(decoded.primary_index, 1);
        assert_eq!(decoded.secondary_index, None);
        assert_eq!(decoded.init_value, 0.5);
        assert_eq!(decoded.lower_bound, 0.01);
        assert_eq!(decoded.upper_bound, 5.0);
        assert_eq!(decoded.prior_shape, 4.0);
        assert_eq!(decoded.prior_mean, 0.1);
        assert_eq!(decoded.prior_std, 2.0);
        assert!(decoded.prior_p3.is_nan());
    }

    #[test]
    // Purpose
    // -------
    // The secondary index sits right after the primary index and shifts the
    // remaining columns.
    //
    // Given
    // -----
    // - `corrx` row `[1, 3, 0.0, -1.0, 1.0, 3, 0.0, 0.3, NaN, NaN]`.
    //
    // Expect
    // ------
    // - indices (0, 2), bounds (-1, 1), prior shape 3.
    fn decode_correlation_row() {
        let schema = TableSchema::for_type(ParamType::ShockCorr);
        let row = array![1.0, 3.0, 0.0, -1.0, 1.0, 3.0, 0.0, 0.3, f64::NAN, f64::NAN];

        let decoded = schema.decode_row(0, row.view()).unwrap();

        assert_eq!(decoded.primary_index, 0);
        assert_eq!(decoded.secondary_index, Some(2));
        assert_eq!(decoded.lower_bound, -1.0);
        assert_eq!(decoded.upper_bound, 1.0);
        assert_eq!(decoded.prior_shape, 3.0);
        assert_eq!(decoded.prior_std, 0.3);
    }

    #[test]
    // Purpose
    // -------
    // A table shaped for the wrong type is rejected before decoding.
    //
    // Given
    // -----
    // - A 1 x 9 table checked against the `corrn` schema.
    //
    // Expect
    // ------
    // - `TableColumnMismatch { table: "corrn", expected: 10, actual: 9 }`.
    fn check_table_rejects_wrong_width() {
        let schema = TableSchema::for_type(ParamType::MeasurementErrorCorr);
        let table = Array2::<f64>::zeros((1, 9));

        assert_eq!(
            schema.check_table(table.view()).unwrap_err(),
            EstimationError::TableColumnMismatch { table: "corrn", expected: 10, actual: 9 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Trailing columns after `prior p4` are ignored.
    //
    // Given
    // -----
    // - A 10-column `var_exo` row whose last entry is a scale of 0.8.
    // - An 11-column `corrx` row with the same trailing scale.
    //
    // Expect
    // ------
    // - Both tables pass `check_table`; decoded fields match the narrow
    //   layout.
    fn trailing_columns_are_ignored() {
        let plain = TableSchema::for_type(ParamType::ShockSd);
        let wide_plain = array![[1.0, 0.1, 0.01, 5.0, 4.0, 0.1, 2.0, f64::NAN, f64::NAN, 0.8]];
        assert!(plain.check_table(wide_plain.view()).is_ok());
        let decoded = plain.decode_row(0, wide_plain.row(0)).unwrap();
        assert_eq!(decoded.upper_bound, 5.0);
        assert!(decoded.prior_p4.is_nan());

        let corr = TableSchema::for_type(ParamType::ShockCorr);
        let wide_corr =
            array![[1.0, 2.0, 0.0, -1.0, 1.0, 3.0, 0.0, 0.3, f64::NAN, f64::NAN, 0.8]];
        assert!(corr.check_table(wide_corr.view()).is_ok());
        let decoded = corr.decode_row(0, wide_corr.row(0)).unwrap();
        assert_eq!(decoded.secondary_index, Some(1));
        assert!(decoded.prior_p4.is_nan());
    }

    #[test]
    // Purpose
    // -------
    // Empty tables are valid whatever their width.
    //
    // Given
    // -----
    // - A 0 x 0 table for `param_vals`.
    //
    // Expect
    // ------
    // - `check_table` returns `Ok(())`.
    fn check_table_accepts_empty_table() {
        let schema = TableSchema::for_type(ParamType::DeepParameter);
        let table = Array2::<f64>::zeros((0, 0));

        assert!(schema.check_table(table.view()).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Non-integral, zero, and NaN indices produce column-level diagnostics.
    //
    // Given
    // -----
    // - `corrn` rows whose secondary index is 1.5, 0.0 and NaN.
    //
    // Expect
    // ------
    // - `InvalidTableIndex` pointing at row 4, column "secondary index".
    fn invalid_index_is_reported_with_column() {
        let schema = TableSchema::for_type(ParamType::MeasurementErrorCorr);
        for bad in [1.5, 0.0, f64::NAN] {
            let row = array![1.0, bad, 0.0, -1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];

            match schema.decode_row(4, row.view()).unwrap_err() {
                EstimationError::InvalidTableIndex { table, row, column, .. } => {
                    assert_eq!(table, "corrn");
                    assert_eq!(row, 4);
                    assert_eq!(column, "secondary index");
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }
}
