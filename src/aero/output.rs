//! Simulator input files.
//!
//! [`CaseWriter`] is the seam for patch-file encoders. Every method writes
//! only inside the directory it is given. The case-list file has a default
//! serializer; the other encodings are left to implementations.

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;
use uom::si::f64::AngularVelocity;

use crate::{
    casegen::{Config, NoiseModel},
    support::fs::write_atomic,
};

use super::{ConstantLoading, GeometryCase, LoadingResult, OperatingPoint, PeriodicLoading};

/// Name of the case-list file the simulator looks for.
pub const CASE_LIST_FILE_NAME: &str = "cases.nam";

/// Errors raised by a [`CaseWriter`].
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The data cannot be expressed in the target format.
    #[error("cannot encode {what}: {context}")]
    Unsupported { what: &'static str, context: String },
}

/// Everything a writer may need about the case being written.
#[derive(Debug, Clone, Copy)]
pub struct CaseContext<'a> {
    /// Position of the geometry in the configured list.
    pub geometry_index: usize,
    pub geometry: &'a GeometryCase,
    pub point: &'a OperatingPoint,
    pub loading: &'a LoadingResult,
}

/// Writes the files of one case directory.
pub trait CaseWriter {
    /// Writes the blade surface geometry patch.
    ///
    /// # Errors
    ///
    /// Returns a [`WriteError`] if the file cannot be written.
    fn write_geometry(
        &self,
        name: &str,
        geometry: &GeometryCase,
        dir: &Path,
    ) -> Result<(), WriteError>;

    /// Writes the compact (lifting-line) geometry patch.
    ///
    /// # Errors
    ///
    /// Returns a [`WriteError`] if the file cannot be written.
    fn write_compact_geometry(
        &self,
        name: &str,
        section_count: usize,
        lift_line: &[[f64; 3]],
        dir: &Path,
    ) -> Result<(), WriteError>;

    /// Writes a time-invariant loading patch.
    ///
    /// # Errors
    ///
    /// Returns a [`WriteError`] if the file cannot be written.
    fn write_constant_loading(
        &self,
        name: &str,
        loading: &ConstantLoading,
        section_count: usize,
        dir: &Path,
    ) -> Result<(), WriteError>;

    /// Writes a periodic loading patch covering one revolution at `rotor_speed`.
    ///
    /// # Errors
    ///
    /// Returns a [`WriteError`] if the file cannot be written.
    fn write_periodic_loading(
        &self,
        name: &str,
        loading: &PeriodicLoading,
        section_count: usize,
        rotor_speed: AngularVelocity,
        dir: &Path,
    ) -> Result<(), WriteError>;

    /// Writes the simulator namelist for the case.
    ///
    /// # Errors
    ///
    /// Returns a [`WriteError`] if the file cannot be written.
    fn write_namelist(
        &self,
        config: &Config,
        case: &CaseContext<'_>,
        dir: &Path,
    ) -> Result<(), WriteError>;

    /// Writes the input data of a broadband noise model.
    ///
    /// # Errors
    ///
    /// Returns a [`WriteError`] if the file cannot be written.
    fn write_noise(
        &self,
        model: NoiseModel,
        config: &Config,
        case: &CaseContext<'_>,
        dir: &Path,
    ) -> Result<(), WriteError>;

    /// Writes `cases.nam`, listing each case folder with the namelist file
    /// the simulator reads in it.
    ///
    /// ```text
    /// &caseName
    ///  globalFolderName = './T_5.00e+02N_Vx_0Kts_Vz_0ms_Nr_2000RPM/'
    ///  caseNameFile = 'case.nam'
    /// /
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a [`WriteError`] if the file cannot be written.
    fn write_case_list(
        &self,
        labels: &[String],
        namelist_file: &str,
        dir: &Path,
    ) -> Result<(), WriteError> {
        let path = dir.join(CASE_LIST_FILE_NAME);
        write_atomic(&path, |out| write_case_entries(out, labels, namelist_file))
            .map_err(|source| WriteError::Io { path, source })
    }
}

fn write_case_entries(out: &mut dyn Write, labels: &[String], namelist_file: &str) -> io::Result<()> {
    for label in labels {
        writeln!(out, "&caseName")?;
        writeln!(out, " globalFolderName = './{label}/'")?;
        writeln!(out, " caseNameFile = '{namelist_file}'")?;
        writeln!(out, "/")?;
    }
    Ok(())
}
