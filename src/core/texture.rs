use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_metal::{MTLDevice, MTLPixelFormat, MTLTexture, MTLTextureDescriptor, MTLTextureUsage};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba8,
    Bgra8,
}

impl TextureFormat {
    #[must_use]
    pub fn metal_format(&self) -> MTLPixelFormat {
        match self {
            Self::Rgba8 => MTLPixelFormat::RGBA8Unorm,
            Self::Bgra8 => MTLPixelFormat::BGRA8Unorm,
        }
    }

    #[must_use]
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgba8 | Self::Bgra8 => 4,
        }
    }

    /// Byte length of a tightly packed `width` × `height` image in this
    /// format.
    #[must_use]
    pub fn byte_len(&self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.bytes_per_pixel()
    }
}

/// A GPU texture populated once from decoded pixel data. The pixel
/// contents never change after creation; the Metal object is released
/// when the value is dropped.
pub struct Texture {
    pub texture: Retained<ProtocolObject<dyn MTLTexture>>,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
}

impl Texture {
    /// Decodes an image file and uploads it as an RGBA8 texture.
    ///
    /// Any decode failure is an error for the caller to treat as fatal;
    /// there is no placeholder fallback.
    pub fn load(
        device: &ProtocolObject<dyn MTLDevice>,
        path: impl AsRef<Path>,
    ) -> Result<Self, String> {
        let path = path.as_ref();
        let image = image::open(path)
            .map_err(|e| format!("Failed to load image {}: {e}", path.display()))?;

        let rgba_image = image.to_rgba8();
        let (width, height) = rgba_image.dimensions();

        Self::create_from_data(
            device,
            rgba_image.as_raw(),
            width,
            height,
            TextureFormat::Rgba8,
        )
    }

    /// Uploads a raw, tightly packed pixel buffer.
    pub fn create_from_data(
        device: &ProtocolObject<dyn MTLDevice>,
        data: &[u8],
        width: u32,
        height: u32,
        format: TextureFormat,
    ) -> Result<Self, String> {
        let expected_len = format.byte_len(width, height);
        if data.len() != expected_len {
            return Err(format!(
                "Invalid data size: expected {expected_len}, got {}",
                data.len()
            ));
        }

        let descriptor = unsafe { MTLTextureDescriptor::new() };
        unsafe {
            descriptor.setPixelFormat(format.metal_format());
            descriptor.setWidth(width as usize);
            descriptor.setHeight(height as usize);
            descriptor.setUsage(MTLTextureUsage::ShaderRead);
        }

        let texture = device
            .newTextureWithDescriptor(&descriptor)
            .ok_or_else(|| "Failed to create texture".to_string())?;

        let bytes_per_row = width as usize * format.bytes_per_pixel();
        let region = objc2_metal::MTLRegion {
            origin: objc2_metal::MTLOrigin { x: 0, y: 0, z: 0 },
            size: objc2_metal::MTLSize {
                width: width as usize,
                height: height as usize,
                depth: 1,
            },
        };

        // Safety: `data` stays alive for the duration of the call and the
        // Metal API copies it into the texture before returning.
        unsafe {
            let data_ptr = std::ptr::NonNull::new(data.as_ptr().cast_mut().cast())
                .ok_or_else(|| "Failed to create NonNull pointer for texture data".to_string())?;

            texture.replaceRegion_mipmapLevel_withBytes_bytesPerRow(
                region,
                0,
                data_ptr,
                bytes_per_row,
            );
        }

        Ok(Self {
            texture,
            width,
            height,
            format,
        })
    }
}
