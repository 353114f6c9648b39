use std::io;
use std::path::PathBuf;

//===========================================================================//

/// The category of a failure.  A single failure may belong to more than one
/// category (see [`Error::kinds`]).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ErrorKind {
    /// The source is not a supported BMP/PNG, or exceeds a format limit.
    FileUnsupported,
    /// The BMP source uses a compression method other than `BI_RGB`.
    CompressionUnsupported,
    /// A source file could not be opened or read.
    EmptyDirectory,
    /// There were no images to encode.
    EmptyOutput,
    /// The output could not be created or written.
    FileWriteFailed,
    /// An animated cursor was requested but no configuration was provided.
    NoConfigFile,
    /// A configuration value was malformed.
    Unknown,
}

//===========================================================================//

/// An error produced while decoding sources or encoding a container.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unrecognized or over-limit source, or an unsupported output kind.
    #[error("unsupported file: {0}")]
    FileUnsupported(String),
    /// BMP compression other than `BI_RGB`.
    #[error("unsupported BMP compression method ({0})")]
    CompressionUnsupported(u32),
    /// A source file could not be opened or read.
    #[error("could not read {path:?}: {source}")]
    EmptyDirectory {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// No images were available to encode.
    #[error("no images to encode")]
    EmptyOutput,
    /// Writing the container failed.
    #[error("could not write output: {0}")]
    FileWriteFailed(#[source] io::Error),
    /// An animated cursor was requested without configuration.
    #[error("no configuration available for animated cursor")]
    NoConfigFile,
    /// A configuration value could not be interpreted.
    #[error("malformed configuration: {0}")]
    Unknown(String),
}

impl Error {
    /// Returns every category this error belongs to.
    pub fn kinds(&self) -> &'static [ErrorKind] {
        match *self {
            Error::FileUnsupported(_) => &[ErrorKind::FileUnsupported],
            Error::CompressionUnsupported(_) => &[
                ErrorKind::FileUnsupported,
                ErrorKind::CompressionUnsupported,
            ],
            Error::EmptyDirectory { .. } => &[ErrorKind::EmptyDirectory],
            Error::EmptyOutput => &[ErrorKind::EmptyOutput],
            Error::FileWriteFailed(_) => &[ErrorKind::FileWriteFailed],
            Error::NoConfigFile => &[ErrorKind::NoConfigFile],
            Error::Unknown(_) => &[ErrorKind::Unknown],
        }
    }

    /// Returns true if this error belongs to the given category.
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kinds().contains(&kind)
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Error {
        Error::FileWriteFailed(error)
    }
}

/// Result alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

//===========================================================================//

/// The errors accumulated over one conversion run, in the order they were
/// reported.
#[derive(Debug, Default)]
pub struct ErrorSet {
    errors: Vec<Error>,
}

impl ErrorSet {
    /// Creates an empty set.
    pub fn new() -> ErrorSet {
        ErrorSet::default()
    }

    /// Records an error.
    pub fn push(&mut self, error: Error) {
        self.errors.push(error);
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if any recorded error belongs to the given category.
    pub fn contains(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|error| error.is(kind))
    }

    /// Returns the recorded errors.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Returns the distinct categories of all recorded errors, in sorted
    /// order.
    pub fn kinds(&self) -> Vec<ErrorKind> {
        let mut kinds: Vec<ErrorKind> = self
            .errors
            .iter()
            .flat_map(|error| error.kinds().iter().cloned())
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    /// Forgets every recorded error.
    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

//===========================================================================//


//===========================================================================//
