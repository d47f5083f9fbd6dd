//! Real-time command link abstraction

/// Output side of the real-time I/O link.
///
/// Each call delivers one event: a `target` word (RTIO channel in the upper
/// bits, the channel's own address field in the low 8 bits) and a data word.
/// Events are applied by the receiving channel in the order they are output.
pub trait RtioLink {
    /// Error type
    type Error: core::fmt::Debug;

    /// Output one event on the link.
    fn output(&mut self, target: u32, data: u32) -> Result<(), Self::Error>;
}

impl<T: RtioLink + ?Sized> RtioLink for &mut T {
    type Error = T::Error;

    fn output(&mut self, target: u32, data: u32) -> Result<(), Self::Error> {
        T::output(self, target, data)
    }
}
