//! Core modules for Goalring

pub mod geometry;
pub mod command_parser;
pub mod store;
pub mod engine;
pub mod render;
pub mod api;

pub use geometry::{point_on_circle, build_arc_path, arc_length, progress_offset, render_fraction};
pub use command_parser::CommandParser;
pub use store::{ProgressStore, MemoryStore, FileStore, StoreKeys};
pub use engine::GoalEngine;
pub use render::{RenderFrame, Labels};
pub use api::{create_router, run_server};
