/// Anything that can produce a raw 12-bit angle on demand
///
/// Implementations return the value exactly as read. Values above 4095 are
/// rejected by the consumer, never masked here.
pub trait RawAngleSource {
    /// Transport error
    type Error;

    /// Read one raw sample, blocking until the transfer completes
    fn read_raw(&mut self) -> Result<u16, Self::Error>;
}

impl<S> RawAngleSource for &mut S
where
    S: RawAngleSource + ?Sized,
{
    type Error = S::Error;

    fn read_raw(&mut self) -> Result<u16, Self::Error> {
        (**self).read_raw()
    }
}
