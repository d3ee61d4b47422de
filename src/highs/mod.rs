//! Safe wrapper around the parts of the [HiGHS](https://highs.dev) C API used to solve
//! the master and satellite programs.
//!
//! A [Model] is grown in place: rows and columns are appended one at a time, costs and
//! integrality are changed between solves. Solving consumes the [Model] and returns a
//! [SolvedModel], which converts back into a [Model] to keep adding columns.

use highs_sys::*;
use std::convert::{TryFrom, TryInto};
use std::ffi::{c_void, CString};
use std::num::TryFromIntError;
use std::ops::{Bound, Index, RangeBounds};
use std::os::raw::c_int;

pub use backend::{HighsProgram, HighsSolver};
pub use options::{HighsOptionValue, OptionValue};
pub use status::{HighsModelStatus, HighsStatus};

mod backend;
mod options;
mod status;

/// Index of a variable in a HiGHS model
pub type Col = usize;
/// Index of a constraint in a HiGHS model
pub type Row = usize;

fn bound_value<N: Into<f64> + Copy>(b: Bound<&N>) -> Option<f64> {
    match b {
        Bound::Included(v) | Bound::Excluded(v) => Some((*v).into()),
        Bound::Unbounded => None,
    }
}

fn c(n: usize) -> Result<HighsInt, HighsStatus> {
    Ok(n.try_into()?)
}

macro_rules! highs_call {
    ($function_name:ident ($($param:expr),+)) => {
        try_handle_status(
            $function_name($($param),+),
            stringify!($function_name)
        )
    }
}

/// Whether to maximize or minimize the objective function
#[repr(C)]
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Sense {
    /// max
    Maximise = OBJECTIVE_SENSE_MAXIMIZE as isize,
    /// min
    Minimise = OBJECTIVE_SENSE_MINIMIZE as isize,
}

/// A model to solve
#[derive(Debug)]
pub struct Model {
    highs: HighsPtr,
}

/// A solved model
#[derive(Debug)]
pub struct SolvedModel {
    highs: HighsPtr,
}

impl Model {
    /// Create an empty model that does not write anything to the console
    pub fn try_new() -> Result<Self, HighsStatus> {
        let mut highs = HighsPtr::default();
        highs.make_quiet()?;
        Ok(Self { highs })
    }

    /// number of columns
    pub fn num_cols(&self) -> usize {
        self.highs.num_cols().unwrap_or_default()
    }

    /// number of rows
    pub fn num_rows(&self) -> usize {
        self.highs.num_rows().unwrap_or_default()
    }

    /// Set the optimization sense (minimize by default)
    pub fn try_set_sense(&mut self, sense: Sense) -> Result<(), HighsStatus> {
        unsafe {
            highs_call!(Highs_changeObjectiveSense(
                self.highs.mut_ptr(),
                sense as c_int
            ))
        }?;
        Ok(())
    }

    /// Set a custom parameter on the model.
    /// For the list of available options and their documentation, see:
    /// <https://ergo-code.github.io/HiGHS/dev/options/definitions/>
    pub fn try_set_option<STR: Into<Vec<u8>>, V: HighsOptionValue>(
        &mut self,
        option: STR,
        value: V,
    ) -> Result<(), HighsStatus> {
        self.highs.try_set_option(option, value)
    }

    /// Find the optimal value for the problem, return an error if the problem is incoherent
    pub fn try_solve(mut self) -> Result<SolvedModel, HighsStatus> {
        unsafe { highs_call!(Highs_run(self.highs.mut_ptr())) }
            .map(|_| SolvedModel { highs: self.highs })
    }

    /// Tries to add a new constraint to the highs model.
    ///
    /// Returns the added row index, or the error status value if HIGHS returned an error status.
    pub fn try_add_row(
        &mut self,
        bounds: impl RangeBounds<f64>,
        row_factors: impl IntoIterator<Item = (Col, f64)>,
    ) -> Result<Row, HighsStatus> {
        let (cols, factors): (Vec<_>, Vec<_>) = row_factors.into_iter().unzip();
        let cols = cols.into_iter().map(c).collect::<Result<Vec<_>, _>>()?;

        unsafe {
            highs_call!(Highs_addRow(
                self.highs.mut_ptr(),
                bound_value(bounds.start_bound()).unwrap_or(f64::NEG_INFINITY),
                bound_value(bounds.end_bound()).unwrap_or(f64::INFINITY),
                c(cols.len())?,
                cols.as_ptr(),
                factors.as_ptr()
            ))
        }?;

        Ok(self.highs.num_rows()? - 1)
    }

    /// Tries to add a new variable to the highs model.
    ///
    /// Returns the added column index, or the error status value if HIGHS returned an error status.
    pub fn try_add_column(
        &mut self,
        col_factor: f64,
        bounds: impl RangeBounds<f64>,
        row_factors: impl IntoIterator<Item = (Row, f64)>,
    ) -> Result<Col, HighsStatus> {
        let (rows, factors): (Vec<_>, Vec<_>) = row_factors.into_iter().unzip();
        let rows = rows.into_iter().map(c).collect::<Result<Vec<_>, _>>()?;
        unsafe {
            highs_call!(Highs_addCol(
                self.highs.mut_ptr(),
                col_factor,
                bound_value(bounds.start_bound()).unwrap_or(f64::NEG_INFINITY),
                bound_value(bounds.end_bound()).unwrap_or(f64::INFINITY),
                c(rows.len())?,
                rows.as_ptr(),
                factors.as_ptr()
            ))
        }?;

        Ok(self.highs.num_cols()? - 1)
    }

    /// Changes the integrality of a column in the model.
    pub fn try_change_col_integrality(
        &mut self,
        col: Col,
        integer: bool,
    ) -> Result<(), HighsStatus> {
        let integrality = if integer {
            kHighsVarTypeInteger
        } else {
            kHighsVarTypeContinuous
        };
        unsafe {
            highs_call! {
                Highs_changeColIntegrality(
                    self.highs.mut_ptr(),
                    c(col)?,
                    integrality
                )
            }
        }?;

        Ok(())
    }

    /// Tries to change the objective coefficients of several variables at once.
    pub fn try_change_cols_cost(&mut self, cols: &[Col], costs: &[f64]) -> Result<(), HighsStatus> {
        if cols.len() != costs.len() {
            return Err(HighsStatus::Error);
        }
        if cols.is_empty() {
            return Ok(());
        }
        let col_indices = cols.iter().copied().map(c).collect::<Result<Vec<_>, _>>()?;
        unsafe {
            highs_call!(Highs_changeColsCostBySet(
                self.highs.mut_ptr(),
                c(col_indices.len())?,
                col_indices.as_ptr(),
                costs.as_ptr()
            ))
        }?;
        Ok(())
    }
}

impl From<SolvedModel> for Model {
    fn from(solved: SolvedModel) -> Self {
        Self {
            highs: solved.highs,
        }
    }
}

/// Wrapper around a HiGHS pointer.
#[derive(Debug)]
pub struct HighsPtr(*mut c_void);

impl Drop for HighsPtr {
    fn drop(&mut self) {
        unsafe { Highs_destroy(self.0) }
    }
}

impl Default for HighsPtr {
    fn default() -> Self {
        Self(unsafe { Highs_create() })
    }
}

impl HighsPtr {
    const fn ptr(&self) -> *const c_void {
        self.0
    }

    // Needed until https://github.com/ERGO-Code/HiGHS/issues/479 is fixed
    unsafe fn unsafe_mut_ptr(&self) -> *mut c_void {
        self.0
    }

    fn mut_ptr(&mut self) -> *mut c_void {
        self.0
    }

    /// Prevents writing anything to the standard output when solving the model
    pub fn make_quiet(&mut self) -> Result<(), HighsStatus> {
        // setting log_file seems to cause a double free in Highs.
        // See https://github.com/rust-or/highs/issues/3
        self.try_set_option(&b"output_flag"[..], false)?;
        self.try_set_option(&b"log_to_console"[..], false)
    }

    /// Set a custom parameter on the model
    pub fn try_set_option<STR: Into<Vec<u8>>, V: HighsOptionValue>(
        &mut self,
        option: STR,
        value: V,
    ) -> Result<(), HighsStatus> {
        let c_str = CString::new(option).map_err(|_| HighsStatus::Error)?;
        let status = unsafe { value.apply_to_highs(self.mut_ptr(), c_str.as_ptr()) };
        try_handle_status(status, "Highs_setOptionValue").map(|_| ())
    }

    /// Number of variables
    pub fn num_cols(&self) -> Result<usize, TryFromIntError> {
        let n = unsafe { Highs_getNumCols(self.ptr()) };
        n.try_into()
    }

    /// Number of constraints
    pub fn num_rows(&self) -> Result<usize, TryFromIntError> {
        let n = unsafe { Highs_getNumRows(self.ptr()) };
        n.try_into()
    }
}

impl SolvedModel {
    /// The status of the solution. Should be Optimal if everything went well
    pub fn status(&self) -> HighsModelStatus {
        let model_status = unsafe { Highs_getModelStatus(self.highs.unsafe_mut_ptr()) };
        HighsModelStatus::try_from(model_status).unwrap_or(HighsModelStatus::Unknown)
    }

    /// Get the primal values of the columns and the dual values of the rows
    pub fn get_solution(&self) -> Solution {
        let mut colvalue: Vec<f64> = vec![0.; self.num_cols()];
        let mut coldual: Vec<f64> = vec![0.; self.num_cols()];
        let mut rowvalue: Vec<f64> = vec![0.; self.num_rows()];
        let mut rowdual: Vec<f64> = vec![0.; self.num_rows()];

        // HiGHS fills all four arrays; only column values and row duals are kept
        unsafe {
            Highs_getSolution(
                self.highs.unsafe_mut_ptr(),
                colvalue.as_mut_ptr(),
                coldual.as_mut_ptr(),
                rowvalue.as_mut_ptr(),
                rowdual.as_mut_ptr(),
            );
        }

        Solution { colvalue, rowdual }
    }

    /// Number of variables
    pub fn num_cols(&self) -> usize {
        self.highs.num_cols().unwrap_or_default()
    }

    /// Number of constraints
    pub fn num_rows(&self) -> usize {
        self.highs.num_rows().unwrap_or_default()
    }

    /// Gets the objective value
    pub fn obj_val(&self) -> f64 {
        unsafe { Highs_getObjectiveValue(self.highs.ptr()) }
    }
}

/// Concrete values of the solution
#[derive(Clone, Debug)]
pub struct Solution {
    colvalue: Vec<f64>,
    rowdual: Vec<f64>,
}

impl Solution {
    /// The optimal values for each variables (in the order they were added)
    pub fn columns(&self) -> &[f64] {
        &self.colvalue
    }
    /// The dual value of each constraint (in the order they were added)
    pub fn dual_rows(&self) -> &[f64] {
        &self.rowdual
    }
}

impl Index<Col> for Solution {
    type Output = f64;
    fn index(&self, col: Col) -> &f64 {
        &self.colvalue[col]
    }
}

fn try_handle_status(status: c_int, msg: &str) -> Result<HighsStatus, HighsStatus> {
    let status_enum = HighsStatus::try_from(status).map_err(|invalid| {
        log::error!("{}: {:?}", msg, invalid);
        HighsStatus::Error
    })?;
    match status_enum {
        status @ HighsStatus::OK => Ok(status),
        status @ HighsStatus::Warning => {
            log::warn!("HiGHS emitted a warning: {}", msg);
            Ok(status)
        }
        error => Err(error),
    }
}
