//! A library for building ICO/CUR files out of BMP and PNG images.
//!
//! Sources are decoded just far enough to learn their size and depth.  PNG
//! files are embedded unmodified; BMP files are embedded as a bitmap followed
//! by a synthesized AND mask.
//!
//! ```no_run
//! use img2ico::{ContainerParams, IconDir, ResourceType};
//!
//! let mut icondir = IconDir::new(ContainerParams::new(ResourceType::Icon));
//! icondir.add_source(&std::fs::read("icon32.png")?)?;
//! icondir.add_source(&std::fs::read("icon16.bmp")?)?;
//! std::fs::write("icon.ico", icondir.to_bytes()?)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

#[macro_use]
mod macros;

mod bmpdepth;
mod convert;
mod error;
mod fields;
mod icondir;
mod image;
mod params;
mod restype;

pub use crate::convert::Converter;
pub use crate::error::{Error, ErrorKind, ErrorSet, Result};
pub use crate::icondir::IconDir;
pub use crate::image::{MaskPolicy, SourceImage, SourceKind};
pub use crate::params::ContainerParams;
pub use crate::restype::ResourceType;

//===========================================================================//
