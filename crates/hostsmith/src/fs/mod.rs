//! Fs module — file-system capability shared by every stage.

pub mod fake;
pub mod lines;
pub mod live;
pub mod ops;

pub use fake::FakeFs;
pub use lines::{LineReader, ReadLine};
pub use live::OsFs;
pub use ops::FileOps;
