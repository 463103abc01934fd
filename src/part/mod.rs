mod ids;
mod mount;
mod part;
mod rect;
mod segment;
mod tab;
mod validate;

pub use ids::{CornerId, PointKey, Side, StrategyKind, TabId};
pub use mount::Mount;
pub use part::Part;
pub use rect::Rectangle;
pub use segment::Segment;
pub use tab::Tab;
pub use validate::perimeter_is_simple;
