mod app;
mod surface;
mod widgets;

pub use app::TuiApp;
