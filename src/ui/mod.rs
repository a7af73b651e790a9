mod target_select;
pub use target_select::*;

mod text;
pub use text::*;

mod scanner;
pub use scanner::*;

mod sweeping;
pub use sweeping::*;

mod logger;
pub use logger::*;

mod app;
pub use app::*;
