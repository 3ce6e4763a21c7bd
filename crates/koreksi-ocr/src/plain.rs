//! Reader for sheets that already come as text.

use async_trait::async_trait;

use koreksi_core::traits::TextExtractor;

/// Treats the input bytes as the transcript itself.
///
/// Invalid UTF-8 sequences are replaced rather than rejected, so a stray
/// byte in a scanner export does not lose the whole sheet.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &str {
        "plain"
    }

    async fn extract_text(&self, image: &[u8]) -> anyhow::Result<String> {
        Ok(String::from_utf8_lossy(image).into_owned())
    }
}
