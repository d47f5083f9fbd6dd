//! In-process stand-ins for the gateware side of the link.
//!
//! [`LocalLink`] delivers RTIO events straight to the addressed channel's
//! [`SampleStore`], in call order. [`AwgResetLine`] drives the same store's
//! output-domain reset.

use std::convert::Infallible;
use std::sync::Arc;

use embedded_hal::digital::{ErrorType, OutputPin};
use platform::RtioLink;
use playback::{CommandWord, SampleStore};

/// Channels a [`LocalLink`] can route to.
pub const MAX_LINK_CHANNELS: usize = 16;

/// Link delivery failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
pub enum LinkError {
    /// No store is registered for the target's channel.
    #[error("no AWG channel registered at RTIO channel {0}")]
    UnknownChannel(u32),
    /// The routing table already holds [`MAX_LINK_CHANNELS`] channels.
    #[error("link routing table is full")]
    ChannelTableFull,
}

/// RTIO link that applies command words to local sample stores.
#[derive(Debug, Default)]
pub struct LocalLink {
    routes: heapless::Vec<(u32, Arc<SampleStore>), MAX_LINK_CHANNELS>,
}

impl LocalLink {
    /// An empty link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `channel` to `store`, replacing any earlier route.
    pub fn register(&mut self, channel: u32, store: Arc<SampleStore>) -> Result<(), LinkError> {
        if let Some(route) = self.routes.iter_mut().find(|(c, _)| *c == channel) {
            route.1 = store;
            return Ok(());
        }
        self.routes
            .push((channel, store))
            .map_err(|_| LinkError::ChannelTableFull)?;
        tracing::debug!(channel, "AWG channel registered on link");
        Ok(())
    }

    /// Store routed to `channel`.
    pub fn store(&self, channel: u32) -> Option<&Arc<SampleStore>> {
        self.routes
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, store)| store)
    }
}

impl RtioLink for LocalLink {
    type Error = LinkError;

    fn output(&mut self, target: u32, data: u32) -> Result<(), Self::Error> {
        let (channel, word) = CommandWord::from_rtio(target, data);
        let store = self.store(channel).ok_or(LinkError::UnknownChannel(channel))?;
        let cmd = store.apply(word);
        tracing::trace!(
            channel,
            address = cmd.address,
            value = cmd.value,
            enable = cmd.enable,
            "sample word applied"
        );
        Ok(())
    }
}

/// Output pin driving a channel's output-domain reset. High = in reset.
#[derive(Debug, Clone)]
pub struct AwgResetLine {
    store: Arc<SampleStore>,
}

impl AwgResetLine {
    /// Reset line of `store`'s output domain.
    pub fn new(store: Arc<SampleStore>) -> Self {
        Self { store }
    }
}

impl ErrorType for AwgResetLine {
    type Error = Infallible;
}

impl OutputPin for AwgResetLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.store.set_domain_reset(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.store.set_domain_reset(true);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use playback::encode;

    #[test]
    fn output_routes_by_channel() {
        let a = Arc::new(SampleStore::new());
        let b = Arc::new(SampleStore::new());
        let mut link = LocalLink::new();
        link.register(1, Arc::clone(&a)).unwrap();
        link.register(2, Arc::clone(&b)).unwrap();

        let word = encode(0x155, 42, true);
        link.output(word.rtio_target(2), word.payload()).unwrap();

        assert_eq!(a.sample(0x155), Some(0));
        assert_eq!(b.sample(0x155), Some(42));
        assert!(b.is_enabled());
        assert!(!a.is_enabled());
    }

    #[test]
    fn unknown_channel_is_an_error() {
        let mut link = LocalLink::new();
        let word = encode(0, 0, false);
        assert_eq!(
            link.output(word.rtio_target(9), word.payload()),
            Err(LinkError::UnknownChannel(9))
        );
    }

    #[test]
    fn routing_table_is_bounded() {
        let mut link = LocalLink::new();
        for channel in 0..MAX_LINK_CHANNELS as u32 {
            link.register(channel, Arc::new(SampleStore::new())).unwrap();
        }
        assert_eq!(
            link.register(1000, Arc::new(SampleStore::new())),
            Err(LinkError::ChannelTableFull)
        );
        // Re-registering an existing channel still works.
        link.register(3, Arc::new(SampleStore::new())).unwrap();
    }

    #[test]
    fn reset_line_drives_domain_reset() {
        let store = Arc::new(SampleStore::new());
        let mut line = AwgResetLine::new(Arc::clone(&store));
        line.set_high().unwrap();
        assert!(store.domain_reset());
        line.set_low().unwrap();
        assert!(!store.domain_reset());
    }
}
