pub use self::{
    app::App,
    event_loop::{RenderMode, run},
};

mod app;
mod event;
mod event_loop;
