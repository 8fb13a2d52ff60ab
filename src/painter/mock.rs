use anyhow::{Result, bail};
use async_trait::async_trait;
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ImageLocator, ImageRequest, Painter};

/// Encode a solid-colour PNG, the kind of payload the image service returns.
pub fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([249, 115, 22, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("encoding to memory cannot fail");
    buf.into_inner()
}

/// A scripted painter for tests. Hands out the same image for every prompt,
/// records what it was asked, and fails on request.
pub struct MockPainter {
    image: Vec<u8>,
    failing_prompts: Vec<String>,
    generate_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl Default for MockPainter {
    fn default() -> Self {
        Self::new(sample_png(1, 1))
    }
}

impl MockPainter {
    pub fn new(image: Vec<u8>) -> Self {
        Self {
            image,
            failing_prompts: Vec::new(),
            generate_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Make generation fail whenever the prompt equals `prompt`.
    pub fn failing_on(mut self, prompt: &str) -> Self {
        self.failing_prompts.push(prompt.to_string());
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Every prompt passed to `generate`, in call order (failed ones included).
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Painter for MockPainter {
    async fn generate(&self, _api_key: &str, request: &ImageRequest) -> Result<ImageLocator> {
        let i = self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());

        if self.failing_prompts.contains(&request.prompt) {
            bail!("MockPainter: simulated network error for {:?}", request.prompt);
        }
        Ok(ImageLocator::Url(format!("mock://image/{}", i + 1)))
    }

    async fn fetch(&self, _locator: &ImageLocator) -> Result<Vec<u8>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.image.clone())
    }
}
