pub mod apply;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod refresh;
pub mod state;
pub mod sweep;
pub mod validate;
