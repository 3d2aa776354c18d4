use image::RgbaImage;
use image::imageops::FilterType;

/// Texel format of every mesh texture.
///
/// Texels are sampled as stored, without sRGB decoding, and the render target
/// is a non-sRGB view, so image bytes reach the screen unchanged.
pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Errors that can occur while creating a texture.
#[derive(Debug)]
pub enum TextureError {
    /// The image has a zero width or height.
    Empty,
    /// The image is larger than the device's 2D texture limit.
    TooLarge { width: u32, height: u32, max: u32 },
    /// The image file could not be read or decoded.
    Image(image::ImageError),
}

impl std::fmt::Display for TextureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureError::Empty => write!(f, "Texture image is empty"),
            TextureError::TooLarge { width, height, max } => write!(
                f,
                "Texture image is {}x{}, larger than the device limit of {} pixels per side",
                width, height, max
            ),
            TextureError::Image(e) => write!(f, "Failed to load texture image: {}", e),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for TextureError {
    fn from(e: image::ImageError) -> Self {
        TextureError::Image(e)
    }
}

/// Checks that a `width` x `height` texture can be created on a device whose
/// largest 2D texture side is `max`.
pub fn check_dimensions(width: u32, height: u32, max: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::Empty);
    }
    if width > max || height > max {
        return Err(TextureError::TooLarge { width, height, max });
    }
    Ok(())
}

/// A mipmapped GPU texture bound to the mesh shader.
///
/// Sampling uses linear magnification, linear-mipmap-linear minification and
/// repeat wrapping on both axes.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
}

impl Texture {
    /// Create a texture from a decoded RGBA image, uploading a full mip chain.
    ///
    /// The size is checked against `device.limits()` before anything is
    /// allocated.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
    ) -> Result<Self, TextureError> {
        let (width, height) = image.dimensions();
        check_dimensions(width, height, device.limits().max_texture_dimension_2d)?;
        Ok(Self::upload(device, queue, &mip_chain(image), label))
    }

    /// Load a texture from an image file.
    pub fn from_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &str,
    ) -> Result<Self, TextureError> {
        let img = image::open(path)?.to_rgba8();
        Self::from_image(device, queue, &img, path)
    }

    /// Load a texture from encoded image bytes.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
    ) -> Result<Self, TextureError> {
        let img = image::load_from_memory(bytes)?.to_rgba8();
        Self::from_image(device, queue, &img, label)
    }

    /// A 1x1 texture of a single color.
    pub fn solid(device: &wgpu::Device, queue: &wgpu::Queue, rgba: [u8; 4], label: &str) -> Self {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba(rgba));
        Self::upload(device, queue, &[img], label)
    }

    fn upload(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        levels: &[RgbaImage],
        label: &str,
    ) -> Self {
        let (width, height) = levels[0].dimensions();
        let mip_levels = levels.len() as u32;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: mip_levels,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (level, mip) in levels.iter().enumerate() {
            let (w, h) = mip.dimensions();
            queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: level as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                mip.as_raw(),
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(4 * w),
                    rows_per_image: Some(h),
                },
                wgpu::Extent3d {
                    width: w,
                    height: h,
                    depth_or_array_layers: 1,
                },
            );
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        tracing::info!(label, width, height, mip_levels, "uploaded texture");

        Self {
            texture,
            view,
            sampler,
            width,
            height,
            mip_levels,
        }
    }
}

/// Number of mip levels down to 1x1 for a `width` x `height` image.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    32 - width.max(height).max(1).leading_zeros()
}

/// Builds the mip chain for `image`, level 0 first.
///
/// Each level halves both dimensions (never below 1) using a triangle filter.
pub fn mip_chain(image: &RgbaImage) -> Vec<RgbaImage> {
    let (width, height) = image.dimensions();
    let count = mip_level_count(width, height) as usize;

    let mut levels = Vec::with_capacity(count);
    levels.push(image.clone());
    for _ in 1..count {
        let prev = &levels[levels.len() - 1];
        let w = (prev.width() / 2).max(1);
        let h = (prev.height() / 2).max(1);
        let next = image::imageops::resize(prev, w, h, FilterType::Triangle);
        levels.push(next);
    }
    levels
}
