use crate::error::Result;
use crate::fields::pack_rgb;
use crate::image::{MaskPolicy, SourceImage};
use crate::restype::ResourceType;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

//===========================================================================//

// ANI defaults and limits:
const DEFAULT_DISPLAY_RATE: u32 = 30;
const MAX_DISPLAY_RATE: u32 = 120;
const DEFAULT_NUM_STEPS: u32 = 1;

// Hotspot coordinates must fit within a 256x256 image.
const MAX_HOTSPOT: u32 = 255;

// Keys recognized in an animated cursor configuration:
const KEY_NAME: &str = "name";
const KEY_ARTIST: &str = "artist";
const KEY_FRAME_RATE: &str = "defaultframerate";
const KEY_SEQUENCE: &str = "sequenceinformation";
const KEY_HOTSPOT_H: &str = "cursorhotspot_h";
const KEY_HOTSPOT_V: &str = "cursorhotspot_v";

//===========================================================================//

/// Settings shared by every image of one conversion.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ContainerParams {
    restype: ResourceType,
    name: String,
    artist: Option<String>,
    image_count: u32,
    mask_policy: MaskPolicy,
    hotspot: (u32, u32),
    display_rate: u32,
    num_steps: u32,
    max_width: u32,
    max_height: u32,
    max_bits_per_pixel: u16,
}

impl ContainerParams {
    /// Creates settings for the given kind of container, named after that
    /// kind until `set_name` is called.
    pub fn new(resource_type: ResourceType) -> ContainerParams {
        ContainerParams {
            restype: resource_type,
            name: resource_type.default_name().to_string(),
            artist: None,
            image_count: 0,
            mask_policy: MaskPolicy::Opaque,
            hotspot: (0, 0),
            display_rate: DEFAULT_DISPLAY_RATE,
            num_steps: DEFAULT_NUM_STEPS,
            max_width: 0,
            max_height: 0,
            max_bits_per_pixel: 0,
        }
    }

    /// Returns the kind of container to produce.
    pub fn resource_type(&self) -> ResourceType {
        self.restype
    }

    /// Returns the output name, without directory or extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the output name.  An empty name restores the default.
    pub fn set_name(&mut self, name: &str) {
        if name.is_empty() {
            self.name = self.restype.default_name().to_string();
        } else {
            self.name = name.to_string();
        }
    }

    /// Returns the artist of an animated cursor, if one was configured.
    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    /// Returns the number of images recorded so far.
    pub fn image_count(&self) -> u32 {
        self.image_count
    }

    /// Returns how AND masks are built for true-color BMP sources.
    pub fn mask_policy(&self) -> MaskPolicy {
        self.mask_policy
    }

    /// Sets how AND masks are built for true-color BMP sources.
    pub fn set_mask_policy(&mut self, policy: MaskPolicy) {
        self.mask_policy = policy;
    }

    /// Makes pixels of the given color transparent in images decoded from
    /// now on.
    pub fn set_transparent_color(&mut self, red: u8, green: u8, blue: u8) {
        self.mask_policy = MaskPolicy::ColorKey { red, green, blue };
    }

    /// Returns the transparent color packed as `0x00RRGGBB`, or `None` if
    /// images are treated as opaque.
    pub fn transparent_color(&self) -> Option<u32> {
        match self.mask_policy {
            MaskPolicy::Opaque => None,
            MaskPolicy::ColorKey { red, green, blue } => {
                Some(pack_rgb(red, green, blue))
            }
        }
    }

    /// Returns the cursor hotspot (pixels right from the left edge, pixels
    /// down from the top edge).
    pub fn cursor_hotspot(&self) -> (u32, u32) {
        self.hotspot
    }

    /// Sets the cursor hotspot.  A coordinate that lies outside the largest
    /// recorded image (or beyond 255) is replaced by zero.
    pub fn set_cursor_hotspot(&mut self, h: u32, v: u32) {
        let h = if h <= MAX_HOTSPOT && h < self.max_width { h } else { 0 };
        let v = if v <= MAX_HOTSPOT && v < self.max_height { v } else { 0 };
        self.hotspot = (h, v);
    }

    /// Returns the default animated cursor frame rate.
    pub fn display_rate(&self) -> u32 {
        self.display_rate
    }

    /// Sets the default animated cursor frame rate, capped at 120.
    pub fn set_display_rate(&mut self, rate: u32) {
        self.display_rate = rate.min(MAX_DISPLAY_RATE);
    }

    /// Returns the number of animation steps.
    pub fn num_steps(&self) -> u32 {
        self.num_steps
    }

    /// Returns the largest width, height and bits-per-pixel among the
    /// recorded images.
    pub fn max_geometry(&self) -> (u32, u32, u16) {
        (self.max_width, self.max_height, self.max_bits_per_pixel)
    }

    /// Counts an image that will be part of the container and widens the
    /// maximum geometry to include it.
    pub fn record_image(&mut self, image: &SourceImage) {
        self.image_count += 1;
        self.max_width = self.max_width.max(image.width());
        self.max_height = self.max_height.max(image.height());
        self.max_bits_per_pixel =
            self.max_bits_per_pixel.max(image.bits_per_pixel());
    }

    /// Applies the key/value pairs of an animated cursor configuration.
    /// Keys are matched case-insensitively and unrecognized keys are
    /// ignored.  Returns an `Unknown` error if a numeric value is malformed;
    /// pairs before the malformed one have been applied.
    pub fn apply_ani_config(
        &mut self,
        config: &HashMap<String, String>,
    ) -> Result<()> {
        let mut entries: Vec<(String, &str)> = config
            .iter()
            .map(|(key, value)| (key.to_lowercase(), value.as_str()))
            .collect();
        // Apply in a fixed order so the hotspot sees both coordinates.
        entries.sort();
        let mut hotspot = self.hotspot;
        for (key, value) in entries {
            match key.as_str() {
                KEY_NAME => self.set_name(value),
                KEY_ARTIST => self.artist = Some(value.to_string()),
                KEY_FRAME_RATE => {
                    self.set_display_rate(parse_number(&key, value)?)
                }
                KEY_SEQUENCE => {}
                KEY_HOTSPOT_H => hotspot.0 = parse_number(&key, value)?,
                KEY_HOTSPOT_V => hotspot.1 = parse_number(&key, value)?,
                _ => {}
            }
        }
        self.set_cursor_hotspot(hotspot.0, hotspot.1);
        Ok(())
    }
}

fn parse_number(key: &str, value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(number) => Ok(number),
        Err(error) => {
            malformed_config!("Invalid value {:?} for {}: {}", value, key, error)
        }
    }
}

//===========================================================================//

#[cfg(test)]
mod tests {
    use super::ContainerParams;
    use crate::error::ErrorKind;
    use crate::image::{MaskPolicy, SourceImage};
    use crate::restype::ResourceType;
    use std::collections::HashMap;

    fn png_image(width: u32, height: u32) -> SourceImage {
        let mut data = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR".to_vec();
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 6, 0, 0, 0]);
        SourceImage::read_png(&data).unwrap()
    }

    fn config(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|&(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let params = ContainerParams::new(ResourceType::Cursor);
        assert_eq!(params.name(), "cursor");
        assert_eq!(params.image_count(), 0);
        assert_eq!(params.mask_policy(), MaskPolicy::Opaque);
        assert_eq!(params.transparent_color(), None);
        assert_eq!(params.display_rate(), 30);
        assert_eq!(params.num_steps(), 1);
        assert_eq!(params.cursor_hotspot(), (0, 0));
        assert_eq!(params.max_geometry(), (0, 0, 0));
    }

    #[test]
    fn transparent_color_selects_color_key() {
        let mut params = ContainerParams::new(ResourceType::Icon);
        params.set_transparent_color(0xff, 0x00, 0xff);
        assert_eq!(
            params.mask_policy(),
            MaskPolicy::ColorKey { red: 0xff, green: 0, blue: 0xff }
        );
        assert_eq!(params.transparent_color(), Some(0xff00ff));
    }

    #[test]
    fn record_image_tracks_maximums() {
        let mut params = ContainerParams::new(ResourceType::Icon);
        params.record_image(&png_image(16, 48));
        params.record_image(&png_image(32, 32));
        assert_eq!(params.image_count(), 2);
        assert_eq!(params.max_geometry(), (32, 48, 32));
    }

    #[test]
    fn hotspot_outside_images_becomes_zero() {
        let mut params = ContainerParams::new(ResourceType::Cursor);
        params.record_image(&png_image(32, 16));
        params.set_cursor_hotspot(31, 15);
        assert_eq!(params.cursor_hotspot(), (31, 15));
        params.set_cursor_hotspot(32, 16);
        assert_eq!(params.cursor_hotspot(), (0, 0));
        params.set_cursor_hotspot(300, 3);
        assert_eq!(params.cursor_hotspot(), (0, 3));
    }

    #[test]
    fn display_rate_is_capped() {
        let mut params = ContainerParams::new(ResourceType::AnimatedCursor);
        params.set_display_rate(500);
        assert_eq!(params.display_rate(), 120);
        params.set_display_rate(12);
        assert_eq!(params.display_rate(), 12);
    }

    #[test]
    fn apply_ani_config_values() {
        let mut params = ContainerParams::new(ResourceType::AnimatedCursor);
        params.record_image(&png_image(32, 32));
        let config = config(&[
            ("Name", "spinner"),
            ("artist", "Somebody"),
            ("DefaultFrameRate", "60"),
            ("SequenceInformation", "0,1,2"),
            ("cursorhotspot_h", "4"),
            ("cursorhotspot_v", " 9 "),
            ("colour", "blue"),
        ]);
        params.apply_ani_config(&config).unwrap();
        assert_eq!(params.name(), "spinner");
        assert_eq!(params.artist(), Some("Somebody"));
        assert_eq!(params.display_rate(), 60);
        assert_eq!(params.cursor_hotspot(), (4, 9));
    }

    #[test]
    fn malformed_number_is_unknown_error() {
        let mut params = ContainerParams::new(ResourceType::AnimatedCursor);
        let config = config(&[("defaultframerate", "fast")]);
        let error = params.apply_ani_config(&config).unwrap_err();
        assert!(error.is(ErrorKind::Unknown));
        assert_eq!(params.display_rate(), 30);
    }

    #[test]
    fn empty_name_restores_default() {
        let mut params = ContainerParams::new(ResourceType::Icon);
        params.set_name("app");
        assert_eq!(params.name(), "app");
        params.set_name("");
        assert_eq!(params.name(), "icon");
    }
}

//===========================================================================//
