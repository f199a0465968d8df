mod component;
mod status_line;

pub use component::Component;
pub use status_line::{
    ConnectionInfo, MessageKind, Priority, StatusLine, StatusSegment,
};
