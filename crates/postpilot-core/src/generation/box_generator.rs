//! BoxTextGenerator -- object-safe dynamic dispatch wrapper for TextGenerator.
//!
//! 1. Define an object-safe `TextGeneratorDyn` trait with boxed futures
//! 2. Blanket-impl `TextGeneratorDyn` for all `T: TextGenerator`
//! 3. `BoxTextGenerator` wraps `Box<dyn TextGeneratorDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use postpilot_types::error::GenerationError;

use super::generator::TextGenerator;

/// Object-safe version of [`TextGenerator`] with boxed futures.
pub trait TextGeneratorDyn: Send + Sync {
    fn name(&self) -> &str;

    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>>;
}

impl<T: TextGenerator> TextGeneratorDyn for T {
    fn name(&self) -> &str {
        TextGenerator::name(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, GenerationError>> + Send + 'a>> {
        Box::pin(self.generate(prompt))
    }
}

/// Type-erased generator for runtime provider selection.
///
/// Since `TextGenerator` uses RPITIT, it cannot be used as a trait object
/// directly. `BoxTextGenerator` itself implements `TextGenerator`, so it can
/// be plugged into `ChatService` wherever a concrete generator would go.
pub struct BoxTextGenerator {
    inner: Box<dyn TextGeneratorDyn + Send + Sync>,
}

impl BoxTextGenerator {
    /// Wrap a concrete `TextGenerator` in a type-erased box.
    pub fn new<T: TextGenerator + 'static>(generator: T) -> Self {
        Self {
            inner: Box::new(generator),
        }
    }
}

impl TextGenerator for BoxTextGenerator {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.inner.generate_boxed(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl TextGenerator for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            Ok(format!("echo: {prompt}"))
        }
    }

    struct Broken;

    impl TextGenerator for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            Err(GenerationError::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn boxed_generator_delegates() {
        let boxed = BoxTextGenerator::new(Echo);
        assert_eq!(TextGenerator::name(&boxed), "echo");
        assert_eq!(boxed.generate("hi").await.unwrap(), "echo: hi");
    }

    #[tokio::test]
    async fn boxed_generator_propagates_errors() {
        let boxed = BoxTextGenerator::new(Broken);
        let err = boxed.generate("hi").await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }
}
