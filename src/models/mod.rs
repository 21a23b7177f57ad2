pub mod batch;
pub mod catalog;
pub mod operation;
pub mod request;

pub use batch::*;
pub use catalog::*;
pub use operation::*;
pub use request::*;
