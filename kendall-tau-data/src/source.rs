use std::path::{Path, PathBuf};

use kendall_tau::{KendallTauError, SampleSource, Samples};

use crate::npy::{self, NpyError};

pub const X_FILE_NAME: &str = "x.npy";
pub const Y_FILE_NAME: &str = "y.npy";

/// Samples stored as `x.npy` and `y.npy` in a directory.
#[derive(Debug, Clone)]
pub struct NpySource {
    directory: PathBuf,
}

impl NpySource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn x_path(&self) -> PathBuf {
        self.directory.join(X_FILE_NAME)
    }

    pub fn y_path(&self) -> PathBuf {
        self.directory.join(Y_FILE_NAME)
    }

    /// Writes both sequences, creating the directory if needed.
    pub fn save(&self, samples: &Samples) -> Result<(), KendallTauError> {
        std::fs::create_dir_all(&self.directory)
            .map_err(|err| unavailable(&self.directory, NpyError::Io(err)))?;

        let x_path = self.x_path();
        npy::write_file(&x_path, samples.x()).map_err(|err| unavailable(&x_path, err))?;
        let y_path = self.y_path();
        npy::write_file(&y_path, samples.y()).map_err(|err| unavailable(&y_path, err))?;

        log::info!(
            "Saved {} samples to {}",
            samples.len(),
            self.directory.display()
        );
        Ok(())
    }

    fn load_sequence(&self, path: &Path) -> Result<Vec<f64>, KendallTauError> {
        npy::read_file(path).map_err(|err| unavailable(path, err))
    }
}

impl SampleSource for NpySource {
    fn describe(&self) -> String {
        format!("{}", self.directory.display())
    }

    fn load(&self) -> Result<Samples, KendallTauError> {
        let x = self.load_sequence(&self.x_path())?;
        let y = self.load_sequence(&self.y_path())?;
        log::debug!(
            "Loaded {} and {} values from {}",
            x.len(),
            y.len(),
            self.directory.display()
        );
        Samples::new(x, y)
    }
}

fn unavailable(path: &Path, err: NpyError) -> KendallTauError {
    KendallTauError::DataUnavailable {
        source: path.display().to_string(),
        reason: err.to_string(),
    }
}
