use crate::shared::frame::Frame;
use crate::shared::source_metadata::SourceMetadata;

/// Produces the frame stream a scan runs over.
///
/// Implementations handle I/O details (decoding, directory walking, etc.)
/// while the pipeline works with the abstract `Frame` and `SourceMetadata`
/// types. The source target (path, device, address) belongs to the
/// implementation's constructor.
pub trait FrameSource: Send {
    /// Opens the source and returns its metadata.
    fn open(&mut self) -> Result<SourceMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in capture order.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
