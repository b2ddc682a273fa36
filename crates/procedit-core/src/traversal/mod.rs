pub mod coordinates;
pub mod walk;

pub use coordinates::{
    coordinates_of, is_predecessor, node_at, root_block_of, shared_ancestor, Coordinates,
};
pub use walk::{ancestors, collect_down, walk_down, WalkOrder};
