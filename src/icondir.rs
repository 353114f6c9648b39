use crate::bmpdepth::directory_palette_count;
use crate::error::{Error, Result};
use crate::image::{SourceImage, SourceKind, BMP_HEADER_LEN};
use crate::params::ContainerParams;
use crate::restype::ResourceType;
use byteorder::{LittleEndian, WriteBytesExt};
use std::io::Write;

//===========================================================================//

// Sizes of the ICONDIR header and of each ICONDIRENTRY, in bytes.
const ICONDIR_LEN: u32 = 6;
const ICONDIRENTRY_LEN: u32 = 16;

//===========================================================================//

/// An ordered collection of decoded images plus the settings they will be
/// written with; the contents of a single ICO or CUR file.
#[derive(Clone, Debug)]
pub struct IconDir {
    params: ContainerParams,
    images: Vec<SourceImage>,
}

impl IconDir {
    /// Creates a new, empty collection.
    pub fn new(params: ContainerParams) -> IconDir {
        IconDir { params, images: Vec::new() }
    }

    /// Returns the type of container this collection will be written as.
    pub fn resource_type(&self) -> ResourceType {
        self.params.resource_type()
    }

    /// Returns the conversion settings.
    pub fn params(&self) -> &ContainerParams {
        &self.params
    }

    /// Returns the conversion settings for modification.
    pub fn params_mut(&mut self) -> &mut ContainerParams {
        &mut self.params
    }

    /// Returns the images in this collection, in output order.
    pub fn images(&self) -> &[SourceImage] {
        &self.images
    }

    /// Appends an image to the collection.
    pub fn add_image(&mut self, image: SourceImage) {
        self.params.record_image(&image);
        self.images.push(image);
    }

    /// Decodes a PNG or BMP file with this collection's mask policy and
    /// appends it.
    pub fn add_source(&mut self, data: &[u8]) -> Result<()> {
        let image = SourceImage::decode(data, self.params.mask_policy())?;
        self.add_image(image);
        Ok(())
    }

    /// Returns the number of bytes `write` would produce.
    pub fn encoded_len(&self) -> usize {
        let table = ICONDIR_LEN as usize
            + ICONDIRENTRY_LEN as usize * self.images.len();
        let data: usize =
            self.images.iter().map(SourceImage::container_entry_size).sum();
        table + data
    }

    /// Writes the container.  Nothing is written if the collection is empty
    /// (`EmptyOutput`), an animated cursor is requested, or the container
    /// would not fit in 4 GiB (`FileUnsupported`).  Writer failures are
    /// reported as `FileWriteFailed`.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        if self.images.is_empty() {
            return Err(Error::EmptyOutput);
        }
        if self.resource_type() == ResourceType::AnimatedCursor {
            unsupported!("Writing animated cursors is not implemented");
        }
        if self.images.len() > (u16::MAX as usize) {
            unsupported!(
                "Too many images (was {}, but max is {})",
                self.images.len(),
                u16::MAX
            );
        }
        let sizes: Vec<usize> =
            self.images.iter().map(SourceImage::container_entry_size).collect();
        let entries = directory_entries(&sizes)?;
        writer.write_u16::<LittleEndian>(0)?; // reserved
        writer.write_u16::<LittleEndian>(self.resource_type().number())?;
        writer.write_u16::<LittleEndian>(self.images.len() as u16)?;
        for (image, &(size, offset)) in self.images.iter().zip(entries.iter()) {
            // A width/height byte of zero indicates a size of 256.
            let width = if image.width() > 255 { 0 } else { image.width() as u8 };
            writer.write_u8(width)?;
            let height =
                if image.height() > 255 { 0 } else { image.height() as u8 };
            writer.write_u8(height)?;
            writer.write_u8(directory_palette_count(image.bits_per_pixel()))?;
            writer.write_u8(0)?; // reserved
            writer.write_u16::<LittleEndian>(0)?; // color planes
            writer.write_u16::<LittleEndian>(image.bits_per_pixel())?;
            writer.write_u32::<LittleEndian>(size)?;
            writer.write_u32::<LittleEndian>(offset)?;
        }
        for image in self.images.iter() {
            match image.source_kind() {
                SourceKind::Png => writer.write_all(image.payload())?,
                SourceKind::Bmp => {
                    write_bmp_header(&mut writer, image)?;
                    writer.write_all(image.pixel_data())?;
                    writer.write_all(image.mask_data())?;
                }
            }
        }
        writer.flush()?;
        Ok(())
    }

    /// Encodes the container into a new buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(self.encoded_len());
        self.write(&mut data)?;
        Ok(data)
    }
}

// Computes the (size, offset) pair of each directory entry from the payload
// sizes.  Offsets trail by one image: the first two entries share an offset,
// and entry N advances by the size of entry N - 2.  Every size, offset and the
// total container length must fit in a u32.
fn directory_entries(sizes: &[usize]) -> Result<Vec<(u32, u32)>> {
    let table = ICONDIR_LEN as usize + ICONDIRENTRY_LEN as usize * sizes.len();
    let mut end = match u32::try_from(table) {
        Ok(table) => table,
        Err(_) => {
            unsupported!("Container too large (directory is {} bytes)", table)
        }
    };
    let mut data_offset = end;
    let mut entries = Vec::with_capacity(sizes.len());
    for (index, &size) in sizes.iter().enumerate() {
        let size = match u32::try_from(size) {
            Ok(size) => size,
            Err(_) => unsupported!(
                "Container too large (image {} is {} bytes, but max is {})",
                index,
                size,
                u32::MAX
            ),
        };
        end = match end.checked_add(size) {
            Some(end) => end,
            None => unsupported!(
                "Container too large (exceeds {} bytes at image {})",
                u32::MAX,
                index
            ),
        };
        entries.push((size, data_offset));
        if index > 0 {
            // Bounded by `end`, which already includes this size.
            data_offset += entries[index - 1].0;
        }
    }
    Ok(entries)
}

// Writes the BITMAPINFOHEADER of an embedded bitmap.  The height is doubled
// to cover the rows of the AND mask.
fn write_bmp_header<W: Write>(writer: &mut W, image: &SourceImage) -> Result<()> {
    writer.write_u32::<LittleEndian>(BMP_HEADER_LEN)?;
    writer.write_u32::<LittleEndian>(image.width())?;
    writer.write_u32::<LittleEndian>(image.height() * 2)?;
    writer.write_u16::<LittleEndian>(image.plane_count())?;
    writer.write_u16::<LittleEndian>(image.bits_per_pixel())?;
    writer.write_u32::<LittleEndian>(0)?; // compression (BI_RGB)
    writer.write_u32::<LittleEndian>(image.pixel_size() as u32)?;
    writer.write_u32::<LittleEndian>(0)?; // horz ppm
    writer.write_u32::<LittleEndian>(0)?; // vert ppm
    writer.write_u32::<LittleEndian>(0)?; // colors used
    writer.write_u32::<LittleEndian>(0)?; // colors important
    Ok(())
}

//===========================================================================//


//===========================================================================//
