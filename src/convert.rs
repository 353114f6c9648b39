//! One conversion run: source files in, one container file out.
//!
//! Failures on individual sources are recorded and the run goes on with the
//! remaining sources; failures while writing the container end the run.
//! Everything that went wrong is reported through an [`ErrorSet`].

use crate::error::{Error, ErrorSet, Result};
use crate::icondir::IconDir;
use crate::params::ContainerParams;
use crate::restype::ResourceType;
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

//===========================================================================//

/// Collects source images and writes them into a container file.
pub struct Converter {
    icondir: IconDir,
    output_dir: PathBuf,
    errors: ErrorSet,
}

impl Converter {
    /// Creates a run that will write into `output_dir`.
    pub fn new<P: Into<PathBuf>>(
        params: ContainerParams,
        output_dir: P,
    ) -> Converter {
        Converter {
            icondir: IconDir::new(params),
            output_dir: output_dir.into(),
            errors: ErrorSet::new(),
        }
    }

    /// Returns the images collected so far.
    pub fn icondir(&self) -> &IconDir {
        &self.icondir
    }

    /// Returns the errors recorded so far.
    pub fn errors(&self) -> &ErrorSet {
        &self.errors
    }

    /// Forgets every recorded error.
    pub fn reset_errors(&mut self) {
        self.errors.clear();
    }

    /// Returns the path the container will be written to: the output
    /// directory, the configured name, and the extension for the container
    /// kind.
    pub fn output_path(&self) -> PathBuf {
        let params = self.icondir.params();
        let file_name =
            format!("{}.{}", params.name(), params.resource_type().extension());
        self.output_dir.join(file_name)
    }

    /// Applies an animated cursor configuration.  Does nothing for other
    /// container kinds.  A missing configuration records `NoConfigFile`.
    pub fn apply_config(&mut self, config: Option<&HashMap<String, String>>) {
        if self.icondir.resource_type() != ResourceType::AnimatedCursor {
            return;
        }
        let result = match config {
            Some(config) => self.icondir.params_mut().apply_ani_config(config),
            None => Err(Error::NoConfigFile),
        };
        if let Err(error) = result {
            self.record(error);
        }
    }

    /// Reads and decodes one source file.  Returns true if the image was
    /// added.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> bool {
        let path = path.as_ref();
        match fs::read(path) {
            Ok(data) => {
                let added = self.load_bytes(&data);
                if added {
                    log::debug!("loaded file: {}", path.display());
                }
                added
            }
            Err(source) => {
                self.record(Error::EmptyDirectory {
                    path: path.to_path_buf(),
                    source,
                });
                false
            }
        }
    }

    /// Decodes one in-memory source.  Returns true if the image was added.
    pub fn load_bytes(&mut self, data: &[u8]) -> bool {
        match self.icondir.add_source(data) {
            Ok(()) => true,
            Err(error) => {
                self.record(error);
                false
            }
        }
    }

    /// Loads every file of an ordered listing.  Returns the number of images
    /// added.
    pub fn load_files<I, P>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        paths.into_iter().filter(|path| self.load_file(path)).count()
    }

    /// Writes the container file and returns every error recorded during the
    /// run.  An empty set means the container was written.
    pub fn finish(mut self) -> ErrorSet {
        if let Err(error) = self.write_output() {
            self.record(error);
        }
        self.errors
    }

    fn write_output(&self) -> Result<()> {
        // Encode first so that nothing is created for an unwritable run.
        let data = self.icondir.to_bytes()?;
        let path = self.output_path();
        let mut writer = BufWriter::new(fs::File::create(&path)?);
        writer.write_all(&data)?;
        writer.flush()?;
        log::debug!(
            "wrote {} image(s) ({} bytes) to {}",
            self.icondir.images().len(),
            data.len(),
            path.display()
        );
        Ok(())
    }

    fn record(&mut self, error: Error) {
        log::warn!("{}", error);
        self.errors.push(error);
    }
}

//===========================================================================//


//===========================================================================//
