pub mod collision;
pub mod collision_model;
pub mod common;
pub mod geometry;
pub mod model;
pub mod object;
pub mod render_model;
pub mod scenario;

pub use collision::*;
pub use collision_model::*;
pub use common::*;
pub use geometry::*;
pub use model::*;
pub use object::*;
pub use render_model::*;
pub use scenario::*;
