//! Material layer textures loaded from image files.

use std::path::Path;

pub const LAYER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Errors that can occur during texture creation.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),

    /// Pixel data length doesn't match width * height * 4.
    #[error("texture data size ({actual}) does not match expected ({expected}) for {width}x{height}")]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
    },

    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
}

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Decode any supported image file into tightly packed RGBA8.
pub fn decode_rgba(path: &Path) -> Result<DecodedImage, TextureError> {
    let rgba = image::open(path)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage {
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// A sampled 2D texture bound as one material layer.
pub struct LayerTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub dimensions: (u32, u32),
}

impl LayerTexture {
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        data: &[u8],
    ) -> Result<Self, TextureError> {
        validate(data, width, height)?;

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: None,
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            dimensions: (width, height),
        })
    }

    /// 1x1 texture of a single colour.
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, color: [u8; 4]) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("solid-layer"),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: LAYER_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &color,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: None,
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            dimensions: (1, 1),
        }
    }

    pub fn load(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
    ) -> Result<Self, TextureError> {
        let image = decode_rgba(path)?;
        let label = path.display().to_string();
        Self::from_rgba8(device, queue, &label, image.width, image.height, &image.pixels)
    }

    /// Load `path`, substituting a solid `fallback` colour if the file is
    /// missing or unreadable.
    pub fn load_or_solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        fallback: [u8; 4],
    ) -> Self {
        match Self::load(device, queue, path) {
            Ok(texture) => {
                log::info!(
                    "Loaded layer texture {} ({}x{})",
                    path.display(),
                    texture.dimensions.0,
                    texture.dimensions.1
                );
                texture
            }
            Err(e) => {
                log::warn!(
                    "Layer texture {} unavailable ({e}), using solid colour",
                    path.display()
                );
                Self::solid(device, queue, fallback)
            }
        }
    }
}

fn validate(data: &[u8], width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    let expected = width as usize * height as usize * 4;
    if data.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: data.len(),
            expected,
            width,
            height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::create_test_device_queue;

    fn write_png(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let img = image::RgbImage::from_fn(4, 2, |x, _| image::Rgb([x as u8 * 60, 128, 0]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_decode_rgba_expands_to_four_channels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "rock.png");
        let decoded = decode_rgba(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 2));
        assert_eq!(decoded.pixels.len(), 4 * 2 * 4);
        assert_eq!(&decoded.pixels[4..8], &[60, 128, 0, 255]);
    }

    #[test]
    fn test_decode_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = decode_rgba(&dir.path().join("missing.bmp"));
        assert!(matches!(result, Err(TextureError::Image(_))));
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(matches!(
            validate(&[], 0, 4),
            Err(TextureError::ZeroDimensions { width: 0, height: 4 })
        ));
        assert!(matches!(
            validate(&[0; 10], 2, 2),
            Err(TextureError::DataSizeMismatch { expected: 16, actual: 10, .. })
        ));
        assert!(validate(&[0; 16], 2, 2).is_ok());
    }

    #[test]
    fn test_load_uploads_dimensions() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "grass.png");
        let texture = LayerTexture::load(&device, &queue, &path).unwrap();
        assert_eq!(texture.dimensions, (4, 2));
        assert_eq!(texture.texture.format(), LAYER_FORMAT);
    }

    #[test]
    fn test_load_or_solid_falls_back() {
        let Some((device, queue)) = create_test_device_queue() else {
            return;
        };
        let texture = LayerTexture::load_or_solid(
            &device,
            &queue,
            Path::new("no/such/file.bmp"),
            [0, 192, 0, 255],
        );
        assert_eq!(texture.dimensions, (1, 1));
    }
}
