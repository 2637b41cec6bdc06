//! Frame source abstraction.

use async_trait::async_trait;

use crate::error::Result;

/// Something that can shift a 32-bit frame out of the converter.
///
/// Implementations wrap the bus transport (typically a SPI device opened at
/// 5 MHz, mode 0). Bytes read from the bus must be combined most-significant
/// first, see [`Frame::from_be_bytes`](crate::protocol::Frame::from_be_bytes).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Check if the converter is available on the bus.
    fn is_present(&self) -> bool;

    /// Read one raw frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`](crate::Error::Transport) when the read
    /// cannot complete.
    async fn read_frame(&self) -> Result<u32>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn test_mock_frame_source() {
        let mut source = MockFrameSource::new();
        source.expect_is_present().return_const(true);
        source
            .expect_read_frame()
            .times(1)
            .returning(|| Ok(0x07D0_0000));

        assert!(source.is_present());
        assert_eq!(source.read_frame().await.unwrap(), 0x07D0_0000);
    }

    #[tokio::test]
    async fn test_mock_frame_source_error() {
        let mut source = MockFrameSource::new();
        source
            .expect_read_frame()
            .returning(|| Err(Error::transport("bus idle")));

        let err = source.read_frame().await.unwrap_err();
        assert!(err.is_transport());
    }
}
