use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// A fully-parsed command, ready to run against the store. Validation
/// failures become `Frame::Error` replies; `Err` is reserved for failures
/// the connection cannot recover from.
pub trait Executable {
    fn exec(self, store: Store) -> Result<Frame, Error>;
}
