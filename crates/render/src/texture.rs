use crate::error::RenderError;
use meshrig_common::{DecodedImage, NativeId, ResourceKind};
use meshrig_device::{Filter, Gpu, GraphicsDevice, ResourceHandle, TextureParam, WrapMode};

/// Turns encoded image bytes into RGBA8 pixels.
///
/// Implementations must flip vertically so row 0 is the bottom of the image;
/// texture coordinates assume a bottom-left origin.
pub trait ImageDecoder {
    type Error: std::error::Error + Send + Sync + 'static;

    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage, Self::Error>;
}

/// An immutable RGBA8 2D texture with repeat wrapping, linear filtering and
/// a full mipmap chain.
pub struct Texture2D {
    handle: ResourceHandle,
    width: u32,
    height: u32,
}

impl Texture2D {
    pub const WRAP: WrapMode = WrapMode::Repeat;
    pub const FILTER: Filter = Filter::Linear;

    pub fn create<D: GraphicsDevice>(
        gpu: &mut Gpu<D>,
        image: &DecodedImage,
    ) -> Result<Self, RenderError> {
        let expected = image.expected_len();
        if image.width == 0 || image.height == 0 || image.pixels.len() != expected {
            return Err(RenderError::InvalidImage {
                width: image.width,
                height: image.height,
                len: image.pixels.len(),
                expected,
            });
        }

        let handle = gpu.acquire(ResourceKind::Texture)?;
        let device = gpu.device_mut();
        device.active_texture(0);
        device.bind_texture(Some(handle.id()));
        device.tex_image_2d_rgba8(image.width, image.height, &image.pixels);
        device.tex_parameter(TextureParam::WrapS(Self::WRAP));
        device.tex_parameter(TextureParam::WrapT(Self::WRAP));
        device.tex_parameter(TextureParam::MinFilter(Self::FILTER));
        device.tex_parameter(TextureParam::MagFilter(Self::FILTER));
        device.generate_mipmap();

        tracing::debug!(
            "created texture {} ({}x{})",
            handle.id(),
            image.width,
            image.height
        );
        Ok(Self {
            handle,
            width: image.width,
            height: image.height,
        })
    }

    /// Decode `bytes` with `decoder`, then [`create`](Self::create).
    pub fn from_encoded<D: GraphicsDevice, I: ImageDecoder>(
        gpu: &mut Gpu<D>,
        decoder: &I,
        bytes: &[u8],
    ) -> Result<Self, RenderError> {
        let image = decoder
            .decode(bytes)
            .map_err(|e| RenderError::Decode(Box::new(e)))?;
        Self::create(gpu, &image)
    }

    pub fn id(&self) -> NativeId {
        self.handle.id()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bind to texture unit `unit`. Distinct textures sampled by one draw
    /// need distinct units.
    pub fn bind<D: GraphicsDevice + ?Sized>(&self, device: &mut D, unit: u32) {
        device.active_texture(unit);
        device.bind_texture(Some(self.handle.id()));
    }

    pub fn dispose<D: GraphicsDevice>(mut self, gpu: &mut Gpu<D>) {
        gpu.release(&mut self.handle);
    }
}
